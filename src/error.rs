//! Error types for zcache
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

use crate::pool::PoolId;

/// Result type alias using ZcacheError
pub type Result<T> = std::result::Result<T, ZcacheError>;

/// Unified error type for zcache operations
#[derive(Debug, Error)]
pub enum ZcacheError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Pool Errors
    // -------------------------------------------------------------------------
    #[error("Unknown pool: {0}")]
    UnknownPool(PoolId),

    #[error("Pool table full ({max} pools)")]
    PoolTableFull { max: usize },

    #[error("Invalid page size: {0}")]
    InvalidPageSize(usize),

    // -------------------------------------------------------------------------
    // Page Errors
    // -------------------------------------------------------------------------
    #[error("Page too large: {len} bytes (page size {page_size})")]
    PageTooLarge { len: usize, page_size: usize },

    #[error("Out of memory: {0}")]
    OutOfMemory(String),

    #[error("Codec error: {0}")]
    Codec(String),

    // -------------------------------------------------------------------------
    // Control Plane Errors
    // -------------------------------------------------------------------------
    #[error("Control error: {0}")]
    Control(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
