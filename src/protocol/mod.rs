//! Protocol Module
//!
//! Wire protocol between the cache daemon and its clients.
//!
//! ## Frame Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Len (4)  │ CRC (4)  │   Payload (bincode)         │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//! `Len` counts payload bytes only; `CRC` is the CRC32 of the payload.
//! Both are big-endian.
//!
//! ### Commands
//! InitPool, GetPage, PutPage, FlushPage, FlushInode, FlushPool,
//! ReadControl, WriteControl, ListControl, Ping
//!
//! ### Status Codes
//! - Ok: command succeeded, optional payload
//! - NotFound: page not cached
//! - Error: payload carries the error message

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType, Reply};
pub use response::{Response, Status};
pub use codec::{
    decode_command, decode_response, encode_command, encode_response, read_command,
    read_response, write_command, write_response, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
