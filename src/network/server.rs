//! TCP Server
//!
//! Accepts connections and dispatches them to worker threads.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel;

use super::Connection;
use crate::backend::Backend;
use crate::config::Config;
use crate::error::{Result, ZcacheError};

/// TCP server for the cache daemon
pub struct Server {
    config: Config,
    backend: Arc<Backend>,
    listener: Option<TcpListener>,
    shutdown: Arc<AtomicBool>,
}

/// Stops a running server from another thread
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
    addr: SocketAddr,
}

impl ShutdownHandle {
    /// Ask the accept loop to stop
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::Release);
        // Wake the blocking accept
        let _ = TcpStream::connect(self.addr);
    }
}

impl Server {
    /// Create a new server with the given config and backend
    pub fn new(config: Config, backend: Arc<Backend>) -> Self {
        Self {
            config,
            backend,
            listener: None,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Bind the listen address, returning the bound address
    pub fn bind(&mut self) -> Result<SocketAddr> {
        let listener = TcpListener::bind(&self.config.listen_addr).map_err(|e| {
            ZcacheError::Network(format!("bind {}: {}", self.config.listen_addr, e))
        })?;
        let addr = listener.local_addr()?;
        self.listener = Some(listener);
        tracing::info!(%addr, "listening");
        Ok(addr)
    }

    /// Bound address, if bound
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// Handle for stopping the server; binds first if needed
    pub fn shutdown_handle(&mut self) -> Result<ShutdownHandle> {
        let addr = match self.local_addr() {
            Some(addr) => addr,
            None => self.bind()?,
        };
        Ok(ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
            addr,
        })
    }

    /// Start the server (blocking until shutdown)
    pub fn run(&mut self) -> Result<()> {
        if self.listener.is_none() {
            self.bind()?;
        }
        let listener = match self.listener.take() {
            Some(listener) => listener,
            None => return Err(ZcacheError::Network("listener not bound".to_string())),
        };

        let workers = self.config.max_connections.max(1);
        let (tx, rx) = channel::bounded::<TcpStream>(workers);
        let mut handles: Vec<JoinHandle<()>> = Vec::with_capacity(workers);

        for id in 0..workers {
            let rx = rx.clone();
            let backend = Arc::clone(&self.backend);
            let (read_ms, write_ms) = (self.config.read_timeout_ms, self.config.write_timeout_ms);

            let handle = thread::Builder::new()
                .name(format!("zcache-worker-{}", id))
                .spawn(move || {
                    for stream in rx.iter() {
                        serve(stream, Arc::clone(&backend), read_ms, write_ms);
                    }
                })?;
            handles.push(handle);
        }
        drop(rx);

        for stream in listener.incoming() {
            if self.shutdown.load(Ordering::Acquire) {
                break;
            }
            match stream {
                Ok(stream) => {
                    if tx.send(stream).is_err() {
                        break;
                    }
                }
                Err(e) => tracing::warn!(error = %e, "accept failed"),
            }
        }

        tracing::info!(workers = handles.len(), "shutting down");
        drop(tx);
        for handle in handles {
            let _ = handle.join();
        }
        Ok(())
    }
}

fn serve(stream: TcpStream, backend: Arc<Backend>, read_ms: u64, write_ms: u64) {
    let mut connection = match Connection::new(stream, backend) {
        Ok(connection) => connection,
        Err(e) => {
            tracing::warn!(error = %e, "connection setup failed");
            return;
        }
    };
    if let Err(e) = connection.set_timeouts(read_ms, write_ms) {
        tracing::warn!(peer = connection.peer_addr(), error = %e, "setting timeouts failed");
    }
    if let Err(e) = connection.handle() {
        tracing::debug!(peer = connection.peer_addr(), error = %e, "connection closed with error");
    }
}
