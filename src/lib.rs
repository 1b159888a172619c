//! # ShardKV
//!
//! A concurrent in-memory key-value store with:
//! - Sharded reader/writer locking (no global lock)
//! - Opaque byte keys and values, preserved exactly
//! - Put / Get / Delete over a framed TCP protocol
//! - Optional entry and byte limits
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                             │
//! │            (one thread per client connection)               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  Request / Response frames
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    KvService                                │
//! │         (validation, one engine call per request)           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Engine                                 │
//! │   ┌─────────┐ ┌─────────┐ ┌─────────┐       ┌─────────┐     │
//! │   │ Shard 0 │ │ Shard 1 │ │ Shard 2 │  ...  │ Shard N │     │
//! │   │ (RwLock)│ │ (RwLock)│ │ (RwLock)│       │ (RwLock)│     │
//! │   └─────────┘ └─────────┘ └─────────┘       └─────────┘     │
//! └─────────────────────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod engine;
pub mod service;
pub mod protocol;
pub mod network;
pub mod client;
pub mod loadgen;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{KvError, Result};
pub use config::{Config, EngineConfig};
pub use engine::Engine;
pub use service::KvService;
pub use client::Client;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of ShardKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
