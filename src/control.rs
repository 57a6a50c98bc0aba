//! Control Plane
//!
//! Administrative key/value entries, one directory per pool:
//!
//! ```text
//! pool0/memlimit          rw  memory limit in bytes
//! pool0/stored_bytes      ro  pages_stored * page_size
//! pool0/pages_stored      ro  live page count
//! pool0/compressed_bytes  ro  payload bytes held
//! pool0/page_size         ro  page size of the pool
//! ```
//!
//! Values are decimal text. Reads end in a newline; writes may carry
//! surrounding whitespace.

use crate::backend::Backend;
use crate::error::{Result, ZcacheError};
use crate::pool::PoolId;

const POOL_PREFIX: &str = "pool";

/// One entry in a pool directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    MemLimit,
    StoredBytes,
    PagesStored,
    CompressedBytes,
    PageSize,
}

impl Entry {
    pub const ALL: [Entry; 5] = [
        Entry::MemLimit,
        Entry::StoredBytes,
        Entry::PagesStored,
        Entry::CompressedBytes,
        Entry::PageSize,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Entry::MemLimit => "memlimit",
            Entry::StoredBytes => "stored_bytes",
            Entry::PagesStored => "pages_stored",
            Entry::CompressedBytes => "compressed_bytes",
            Entry::PageSize => "page_size",
        }
    }

    pub fn is_writable(self) -> bool {
        matches!(self, Entry::MemLimit)
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|entry| entry.name() == name)
    }
}

/// Borrowed administrative view over a backend
pub struct ControlPlane<'a> {
    backend: &'a Backend,
}

impl<'a> ControlPlane<'a> {
    pub fn new(backend: &'a Backend) -> Self {
        Self { backend }
    }

    /// Paths of every entry of every live pool
    pub fn list(&self) -> Vec<String> {
        self.backend
            .pools()
            .pool_ids()
            .into_iter()
            .flat_map(|id| Entry::ALL.into_iter().map(move |entry| entry_path(id, entry)))
            .collect()
    }

    /// Read an entry as decimal text
    pub fn read(&self, path: &str) -> Result<String> {
        let (id, entry) = parse_path(path)?;
        let pool = self.backend.pools().get(id)?;

        let value = match entry {
            Entry::MemLimit => pool.memlimit(),
            Entry::StoredBytes => pool.stored_bytes(),
            Entry::PagesStored => pool.pages_stored(),
            Entry::CompressedBytes => pool.compressed_bytes(),
            Entry::PageSize => pool.page_size() as u64,
        };
        Ok(format!("{}\n", value))
    }

    /// Write decimal text to a writable entry
    pub fn write(&self, path: &str, text: &str) -> Result<()> {
        let (id, entry) = parse_path(path)?;
        if !entry.is_writable() {
            return Err(ZcacheError::Control(format!("{} is read-only", path)));
        }

        let value: u64 = text.trim().parse().map_err(|_| {
            ZcacheError::Control(format!("{}: not a decimal value: {:?}", path, text.trim()))
        })?;

        // memlimit is the only writable entry
        self.backend.set_memory_limit(id, value)?;
        Ok(())
    }
}

/// `pool<ID>/<entry>`
pub fn entry_path(id: PoolId, entry: Entry) -> String {
    format!("{}{}/{}", POOL_PREFIX, id, entry.name())
}

fn parse_path(path: &str) -> Result<(PoolId, Entry)> {
    let bad = || ZcacheError::Control(format!("no such entry: {}", path));

    let (dir, name) = path.trim_matches('/').split_once('/').ok_or_else(bad)?;
    let id = dir
        .strip_prefix(POOL_PREFIX)
        .and_then(|id| id.parse::<PoolId>().ok())
        .ok_or_else(bad)?;
    let entry = Entry::from_name(name).ok_or_else(bad)?;

    Ok((id, entry))
}
