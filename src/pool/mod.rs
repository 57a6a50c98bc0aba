//! Pool Module
//!
//! One pool per mounted filesystem: an inode registry, its page counters and
//! a memory limit.
//!
//! ## Responsibilities
//! - Own the inode registry and the shared page counter
//! - Hold the memory limit (many readers, exclusive writers)
//! - Translate the limit into a page budget and an excess
//! - Keep per-pool operation statistics

mod manager;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::config::UNLIMITED;
use crate::registry::InodeRegistry;
use crate::store::PageCounter;

pub use manager::PoolManager;

/// Small integer naming a pool in the pool table
pub type PoolId = u32;

/// An isolated cache namespace
pub struct Pool {
    id: PoolId,
    page_size: usize,
    registry: InodeRegistry,
    counter: Arc<PageCounter>,

    /// Memory limit in bytes (page-aligned, or UNLIMITED)
    memlimit: RwLock<u64>,

    stats: PoolStats,
}

impl Pool {
    pub(crate) fn new(id: PoolId, page_size: usize, memlimit: u64, batch: usize) -> Self {
        let counter = Arc::new(PageCounter::new());
        Self {
            id,
            page_size,
            registry: InodeRegistry::new(Arc::clone(&counter), batch),
            counter,
            memlimit: RwLock::new(align_limit(memlimit, page_size)),
            stats: PoolStats::default(),
        }
    }

    pub fn id(&self) -> PoolId {
        self.id
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn registry(&self) -> &InodeRegistry {
        &self.registry
    }

    pub fn stats(&self) -> &PoolStats {
        &self.stats
    }

    /// Live pages across every store of the pool
    pub fn pages_stored(&self) -> u64 {
        self.counter.pages()
    }

    /// Pages expressed in uncompressed bytes
    pub fn stored_bytes(&self) -> u64 {
        self.pages_stored().saturating_mul(self.page_size as u64)
    }

    /// Payload bytes actually held
    pub fn compressed_bytes(&self) -> u64 {
        self.counter.compressed_bytes()
    }

    /// Memory limit in bytes
    pub fn memlimit(&self) -> u64 {
        *self.memlimit.read()
    }

    /// Store a new limit, rounded down to a page multiple
    ///
    /// Returns the limit actually stored. Eviction is the caller's job.
    pub fn set_memlimit(&self, bytes: u64) -> u64 {
        let aligned = align_limit(bytes, self.page_size);
        *self.memlimit.write() = aligned;
        aligned
    }

    /// Memory limit as a page budget
    pub fn limit_in_pages(&self) -> u64 {
        let limit = self.memlimit();
        if limit == UNLIMITED {
            u64::MAX
        } else {
            limit / self.page_size as u64
        }
    }

    /// Pages over budget right now
    pub fn excess(&self) -> u64 {
        self.pages_stored().saturating_sub(self.limit_in_pages())
    }

    pub(crate) fn counter(&self) -> &PageCounter {
        &self.counter
    }

    pub fn snapshot(&self) -> PoolStatsSnapshot {
        PoolStatsSnapshot {
            pool_id: self.id,
            page_size: self.page_size,
            memlimit: self.memlimit(),
            pages_stored: self.pages_stored(),
            stored_bytes: self.stored_bytes(),
            compressed_bytes: self.compressed_bytes(),
            inodes: self.registry.len(),
            gets: self.stats.gets.load(Ordering::Relaxed),
            hits: self.stats.hits.load(Ordering::Relaxed),
            puts: self.stats.puts.load(Ordering::Relaxed),
            put_failures: self.stats.put_failures.load(Ordering::Relaxed),
            flushes: self.stats.flushes.load(Ordering::Relaxed),
            inode_flushes: self.stats.inode_flushes.load(Ordering::Relaxed),
            evicted: self.stats.evicted.load(Ordering::Relaxed),
            eviction_runs: self.stats.eviction_runs.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("id", &self.id)
            .field("page_size", &self.page_size)
            .field("pages_stored", &self.pages_stored())
            .field("memlimit", &self.memlimit())
            .finish()
    }
}

/// Round a byte limit down to a page multiple; UNLIMITED passes through
fn align_limit(bytes: u64, page_size: usize) -> u64 {
    if bytes == UNLIMITED {
        return UNLIMITED;
    }
    let page = page_size as u64;
    bytes - bytes % page
}

/// Monotonic operation counters of one pool
#[derive(Debug, Default)]
pub struct PoolStats {
    pub(crate) gets: AtomicU64,
    pub(crate) hits: AtomicU64,
    pub(crate) puts: AtomicU64,
    pub(crate) put_failures: AtomicU64,
    pub(crate) flushes: AtomicU64,
    pub(crate) inode_flushes: AtomicU64,
    pub(crate) evicted: AtomicU64,
    pub(crate) eviction_runs: AtomicU64,
}

impl PoolStats {
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Point-in-time copy of a pool's counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStatsSnapshot {
    pub pool_id: PoolId,
    pub page_size: usize,
    pub memlimit: u64,
    pub pages_stored: u64,
    pub stored_bytes: u64,
    pub compressed_bytes: u64,
    pub inodes: usize,
    pub gets: u64,
    pub hits: u64,
    pub puts: u64,
    pub put_failures: u64,
    pub flushes: u64,
    pub inode_flushes: u64,
    pub evicted: u64,
    pub eviction_runs: u64,
}
