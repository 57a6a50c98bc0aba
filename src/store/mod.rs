//! Page Store Module
//!
//! Per-inode index of compressed pages.
//!
//! ## Responsibilities
//! - Map page offsets to stored compressed pages
//! - Keep the pool-wide page counter in step with every insert/delete
//! - Remove pages in increasing-offset batches for eviction and flush
//!
//! ## Data Structure Choice
//! BTreeMap wrapped in a single Mutex:
//! - Ordered keys give increasing-offset batch removal for free
//! - One lock serializes every mutator of a store

mod page_store;

use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;

use crate::error::{Result, ZcacheError};

pub use page_store::PageStore;

/// A compressed page owned by exactly one PageStore
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPage {
    offset: u64,
    data: Bytes,
}

impl StoredPage {
    /// Copy `data` into a freshly allocated payload.
    ///
    /// Allocation failure is reported as `OutOfMemory` instead of aborting,
    /// so a full heap turns into a cache miss later on.
    pub fn new(offset: u64, data: &[u8]) -> Result<Self> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(data.len()).map_err(|e| {
            ZcacheError::OutOfMemory(format!("page at offset {}: {}", offset, e))
        })?;
        buf.extend_from_slice(data);

        Ok(Self {
            offset,
            data: Bytes::from(buf),
        })
    }

    /// Offset of this page within its inode
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Compressed payload
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Payload size in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Pool-wide counters shared by every store of one pool
///
/// Updated inside the store lock at the point of insert/delete, never
/// recomputed by scanning.
#[derive(Debug, Default)]
pub struct PageCounter {
    pages: AtomicU64,
    compressed_bytes: AtomicU64,
}

impl PageCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live pages (the `pages_stored` statistic)
    pub fn pages(&self) -> u64 {
        self.pages.load(Ordering::Acquire)
    }

    /// Total payload bytes held
    pub fn compressed_bytes(&self) -> u64 {
        self.compressed_bytes.load(Ordering::Acquire)
    }

    pub(crate) fn add(&self, page: &StoredPage) {
        self.pages.fetch_add(1, Ordering::AcqRel);
        self.compressed_bytes
            .fetch_add(page.len() as u64, Ordering::AcqRel);
    }

    pub(crate) fn sub(&self, page: &StoredPage) {
        self.pages.fetch_sub(1, Ordering::AcqRel);
        self.compressed_bytes
            .fetch_sub(page.len() as u64, Ordering::AcqRel);
    }

    /// Zero both counters (pool teardown only)
    pub(crate) fn reset(&self) {
        self.pages.store(0, Ordering::Release);
        self.compressed_bytes.store(0, Ordering::Release);
    }
}
