//! Command definitions
//!
//! Represents commands from clients. Each maps onto one backend facade call.

use serde::{Deserialize, Serialize};

use crate::pool::PoolId;

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    InitPool = 0x01,
    GetPage = 0x02,
    PutPage = 0x03,
    FlushPage = 0x04,
    FlushInode = 0x05,
    FlushPool = 0x06,
    ReadControl = 0x07,
    WriteControl = 0x08,
    ListControl = 0x09,
    Ping = 0x0a,
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Create a pool (page size 0 = daemon default)
    InitPool { page_size: u32 },

    /// Look up a page
    GetPage { pool: PoolId, inode: u64, offset: u64 },

    /// Stash a page
    PutPage {
        pool: PoolId,
        inode: u64,
        offset: u64,
        data: Vec<u8>,
    },

    /// Drop one page
    FlushPage { pool: PoolId, inode: u64, offset: u64 },

    /// Drop every page of an inode
    FlushInode { pool: PoolId, inode: u64 },

    /// Destroy a pool
    FlushPool { pool: PoolId },

    /// Read a control entry
    ReadControl { path: String },

    /// Write a control entry
    WriteControl { path: String, value: String },

    /// List control entries
    ListControl,

    /// Ping (health check)
    Ping,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::InitPool { .. } => CommandType::InitPool,
            Command::GetPage { .. } => CommandType::GetPage,
            Command::PutPage { .. } => CommandType::PutPage,
            Command::FlushPage { .. } => CommandType::FlushPage,
            Command::FlushInode { .. } => CommandType::FlushInode,
            Command::FlushPool { .. } => CommandType::FlushPool,
            Command::ReadControl { .. } => CommandType::ReadControl,
            Command::WriteControl { .. } => CommandType::WriteControl,
            Command::ListControl => CommandType::ListControl,
            Command::Ping => CommandType::Ping,
        }
    }
}

/// Result of executing a command against the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Succeeded with nothing to return
    Done,

    /// Succeeded with a payload
    Value(Vec<u8>),

    /// Page not cached
    NotFound,
}
