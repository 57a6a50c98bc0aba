//! # zcache
//!
//! A memory-bounded, multi-pool compressed page cache:
//! - One pool per mounted filesystem, pages indexed by (inode, offset)
//! - Per-pool memory limit enforced by a synchronous eviction walk
//! - Reference-counted inode nodes so page work never holds the registry lock
//! - TCP daemon and admin control entries on top
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │              Filesystem hooks / TCP daemon                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   Backend Facade                             │
//! │        (codec, pool id checks, eviction triggers)            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ PoolManager │          │  Eviction   │
//!   │ (table lock)│          │   Walker    │
//!   └──────┬──────┘          └──────┬──────┘
//!          │                        │
//!          ▼                        ▼
//!   ┌─────────────────────────────────────┐
//!   │   InodeRegistry  (RwLock, per pool) │
//!   └──────────────────┬──────────────────┘
//!                      ▼
//!   ┌─────────────────────────────────────┐
//!   │   PageStore  (Mutex, per inode)     │
//!   └─────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod store;
pub mod registry;
pub mod pool;
pub mod evict;
pub mod codec;
pub mod backend;
pub mod control;
pub mod protocol;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, ZcacheError};
pub use config::Config;
pub use backend::Backend;
pub use registry::InodeKey;
pub use pool::PoolId;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of zcache
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
