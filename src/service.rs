//! Service Module
//!
//! The RPC-facing layer: one handler per remote procedure.
//!
//! ## Responsibilities
//! - Validate requests before they reach the engine
//! - Call exactly one engine operation per request
//! - Translate engine results into response messages
//!
//! Keys travel as length-prefixed bytes, so a missing key and an empty key
//! look the same on the wire. Both are rejected as `InvalidArgument`.

use std::sync::Arc;

use crate::engine::Engine;
use crate::error::{KvError, Result};
use crate::protocol::{
    DeleteRequest, DeleteResponse, GetRequest, GetResponse, PutRequest, PutResponse, Reply,
    Request,
};

/// Key-value service backed by a shared engine
#[derive(Clone)]
pub struct KvService {
    engine: Arc<Engine>,
}

impl KvService {
    /// Create a service over an already-initialized engine
    pub fn new(engine: Arc<Engine>) -> Self {
        Self { engine }
    }

    /// Route a decoded request to its handler
    pub fn dispatch(&self, request: Request) -> Result<Reply> {
        match request {
            Request::Get(get) => self.get(get).map(Reply::Get),
            Request::Put(put) => self.put(put).map(Reply::Put),
            Request::Delete(delete) => self.delete(delete).map(Reply::Delete),
            Request::Ping => Ok(Reply::Pong),
        }
    }

    /// Put handler
    pub fn put(&self, request: PutRequest) -> Result<PutResponse> {
        validate_key(&request.key)?;

        tracing::trace!(
            key_len = request.key.len(),
            value_len = request.value.len(),
            "put"
        );

        if let Err(e) = self.engine.put(request.key, request.value) {
            tracing::debug!("Put rejected: {}", e);
            return Err(e);
        }

        Ok(PutResponse { success: true })
    }

    /// Get handler
    pub fn get(&self, request: GetRequest) -> Result<GetResponse> {
        validate_key(&request.key)?;

        let response = match self.engine.get(&request.key) {
            Some(value) => GetResponse { found: true, value },
            None => GetResponse {
                found: false,
                value: Vec::new(),
            },
        };

        tracing::trace!(key_len = request.key.len(), found = response.found, "get");
        Ok(response)
    }

    /// Delete handler
    pub fn delete(&self, request: DeleteRequest) -> Result<DeleteResponse> {
        validate_key(&request.key)?;

        let success = self.engine.delete(&request.key);

        tracing::trace!(key_len = request.key.len(), success, "delete");
        Ok(DeleteResponse { success })
    }

    /// Get the engine behind this service
    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }
}

fn validate_key(key: &[u8]) -> Result<()> {
    if key.is_empty() {
        return Err(KvError::InvalidArgument("missing key".to_string()));
    }
    Ok(())
}
