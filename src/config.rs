//! Configuration for ShardKV
//!
//! Centralized configuration with sensible defaults.

use crate::error::{KvError, Result};

/// Main configuration for a ShardKV server instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Engine Configuration
    // -------------------------------------------------------------------------
    /// Settings for the in-memory store
    pub engine: EngineConfig,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent client connections
    pub max_connections: usize,

    /// Connection read timeout (milliseconds, 0 = none)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,
}

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of independently locked partitions
    pub shard_count: usize,

    /// Maximum number of entries (None = unlimited)
    pub max_entries: Option<usize>,

    /// Maximum total key + value bytes (None = unlimited)
    pub max_bytes: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            shard_count: 16,
            max_entries: None,
            max_bytes: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            listen_addr: "127.0.0.1:50051".to_string(),
            max_connections: 1024,
            read_timeout_ms: 0,
            write_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.engine.shard_count == 0 {
            return Err(KvError::Config("shard_count must be at least 1".to_string()));
        }
        if self.max_connections == 0 {
            return Err(KvError::Config(
                "max_connections must be at least 1".to_string(),
            ));
        }
        if self.listen_addr.is_empty() {
            return Err(KvError::Config("listen_addr must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the number of engine shards
    pub fn shard_count(mut self, count: usize) -> Self {
        self.config.engine.shard_count = count;
        self
    }

    /// Limit the number of stored entries
    pub fn max_entries(mut self, limit: Option<usize>) -> Self {
        self.config.engine.max_entries = limit;
        self
    }

    /// Limit the total bytes of stored keys and values
    pub fn max_bytes(mut self, limit: Option<usize>) -> Self {
        self.config.engine.max_bytes = limit;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
