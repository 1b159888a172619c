//! TCP Server
//!
//! Accepts connections and hands each one to its own thread.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use crate::config::Config;
use crate::engine::Engine;
use crate::error::Result;
use crate::service::KvService;

use super::Connection;

/// TCP server for ShardKV
pub struct Server {
    config: Config,
    service: KvService,
    listener: TcpListener,
    local_addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    active_connections: Arc<AtomicUsize>,
}

impl Server {
    /// Build a fresh engine from the config and bind the listener
    ///
    /// The engine exists before the socket does, so a successful connect
    /// always reaches a ready store.
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;
        let engine = Arc::new(Engine::new(config.engine.clone()));
        Self::bind(config, KvService::new(engine))
    }

    /// Bind the listen address for an existing service
    pub fn bind(config: Config, service: KvService) -> Result<Self> {
        config.validate()?;

        let listener = TcpListener::bind(&config.listen_addr)?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Listening on {}", local_addr);

        Ok(Self {
            config,
            service,
            listener,
            local_addr,
            shutdown: Arc::new(AtomicBool::new(false)),
            active_connections: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Accept connections until shutdown is requested (blocking)
    pub fn run(&self) -> Result<()> {
        for stream in self.listener.incoming() {
            if self.shutdown.load(Ordering::Acquire) {
                break;
            }

            match stream {
                Ok(stream) => self.spawn_connection(stream),
                Err(e) => tracing::warn!("Failed to accept connection: {}", e),
            }
        }

        tracing::info!("Server on {} stopped accepting connections", self.local_addr);
        Ok(())
    }

    fn spawn_connection(&self, stream: TcpStream) {
        let Some(slot) =
            ConnectionSlot::acquire(&self.active_connections, self.config.max_connections)
        else {
            tracing::warn!(
                "Connection limit ({}) reached, refusing {:?}",
                self.config.max_connections,
                stream.peer_addr().ok()
            );
            return;
        };

        let service = self.service.clone();
        let read_ms = self.config.read_timeout_ms;
        let write_ms = self.config.write_timeout_ms;

        let spawned = thread::Builder::new()
            .name("shardkv-conn".to_string())
            .spawn(move || {
                let _slot = slot;
                let result = Connection::new(stream, service).and_then(|mut connection| {
                    connection.set_timeouts(read_ms, write_ms)?;
                    connection.handle()
                });
                if let Err(e) = result {
                    tracing::warn!("Connection closed with error: {}", e);
                }
            });

        if let Err(e) = spawned {
            tracing::error!("Failed to spawn connection thread: {}", e);
        }
    }

    /// Get a handle that stops `run` from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
            wake_addr: wake_addr(self.local_addr),
        }
    }

    /// Get the bound address (useful when listening on port 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Get the number of connections currently being served
    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::Acquire)
    }

    /// Get the service this server dispatches to
    pub fn service(&self) -> &KvService {
        &self.service
    }
}

/// Signals a running server to stop accepting connections
#[derive(Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
    wake_addr: SocketAddr,
}

impl ShutdownHandle {
    /// Request shutdown
    ///
    /// Connections already being served run until their clients disconnect.
    pub fn shutdown(&self) {
        if self.flag.swap(true, Ordering::AcqRel) {
            return;
        }
        // Unblock the pending accept
        if let Err(e) = TcpStream::connect(self.wake_addr) {
            tracing::debug!("Shutdown wake-up connect failed: {}", e);
        }
    }
}

/// An accepted connection counted against `max_connections`
struct ConnectionSlot {
    active: Arc<AtomicUsize>,
}

impl ConnectionSlot {
    fn acquire(active: &Arc<AtomicUsize>, limit: usize) -> Option<Self> {
        active
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                (count < limit).then_some(count + 1)
            })
            .ok()?;
        Some(Self {
            active: Arc::clone(active),
        })
    }
}

impl Drop for ConnectionSlot {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Unspecified listen addresses are not connectable everywhere
fn wake_addr(addr: SocketAddr) -> SocketAddr {
    let mut addr = addr;
    if addr.ip().is_unspecified() {
        match addr {
            SocketAddr::V4(_) => addr.set_ip(Ipv4Addr::LOCALHOST.into()),
            SocketAddr::V6(_) => addr.set_ip(Ipv6Addr::LOCALHOST.into()),
        }
    }
    addr
}
