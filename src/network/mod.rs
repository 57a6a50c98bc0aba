//! Network Module
//!
//! TCP daemon and client for the cache.
//!
//! ## Architecture
//! - Single acceptor thread
//! - Fixed pool of worker threads fed over a crossbeam channel
//! - Commands routed through the Backend

mod server;
mod connection;
mod client;

pub use server::{Server, ShutdownHandle};
pub use connection::Connection;
pub use client::Client;
