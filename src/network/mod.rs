//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single acceptor thread
//! - One thread per connection, capped by `max_connections`
//! - Requests routed through the service layer

mod server;
mod connection;

pub use server::{Server, ShutdownHandle};
pub use connection::Connection;
