//! Shard implementation
//!
//! HashMap-based partition with RwLock for concurrency.

use std::collections::HashMap;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

type Map = HashMap<Vec<u8>, Vec<u8>>;

/// One independently locked partition of the store
pub(crate) struct Shard {
    data: RwLock<Map>,
}

impl Shard {
    pub(crate) fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Shared access for lookups
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Map> {
        self.data.read()
    }

    /// Exclusive access for mutations
    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Map> {
        self.data.write()
    }

    pub(crate) fn len(&self) -> usize {
        self.data.read().len()
    }
}
