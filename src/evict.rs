//! Eviction Walker
//!
//! Shrinks a pool back under its memory limit.
//!
//! ## Victim Order
//! Nodes are visited in increasing inode-key order and pages within a node
//! in increasing-offset order. This ignores recency and frequency entirely;
//! it is deterministic and cheap, and stands in for a recency-aware policy.
//!
//! ## Concurrency
//! The walker never holds the registry lock while freeing pages. It keeps
//! its place with node handles: the handle of the next node is taken
//! before the current one may be isolated, so traversal continues even
//! when the current node leaves the index mid-walk.

use std::sync::atomic::Ordering;
use std::thread;

use crate::pool::Pool;

/// Outcome of one eviction pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvictionReport {
    /// Pages freed by this pass
    pub freed: u64,

    /// Nodes visited
    pub visited: usize,

    /// Nodes removed from the registry
    pub isolated: usize,

    /// Excess still outstanding when the registry ran out of nodes
    pub unresolved: u64,
}

/// Walks a pool's registry freeing pages until the pool fits its limit
pub struct EvictionWalker<'a> {
    pool: &'a Pool,
}

impl<'a> EvictionWalker<'a> {
    pub fn new(pool: &'a Pool) -> Self {
        Self { pool }
    }

    /// Run one pass
    ///
    /// Returns immediately if the pool is within its limit. Nodes that are
    /// repopulated while being isolated are skipped and left for the next
    /// trigger.
    pub fn run(&self) -> EvictionReport {
        let pool = self.pool;
        let registry = pool.registry();
        let mut report = EvictionReport::default();

        let excess = pool.excess();
        if excess == 0 {
            return report;
        }

        tracing::debug!(
            pool = pool.id(),
            excess,
            pages_stored = pool.pages_stored(),
            limit_pages = pool.limit_in_pages(),
            "eviction started"
        );
        pool.stats().eviction_runs.fetch_add(1, Ordering::Relaxed);

        let mut current = match registry.first() {
            Some(node) => node,
            None => {
                report.unresolved = excess;
                tracing::warn!(
                    pool = pool.id(),
                    excess,
                    "eviction found no inodes while pages are accounted"
                );
                return report;
            }
        };

        loop {
            report.visited += 1;

            let excess = pool.excess();
            if excess == 0 {
                if current.store().is_empty() && registry.isolate(&current) {
                    report.isolated += 1;
                }
                break;
            }

            let next = registry.next_after(current.key());

            let freed = current.store().free_up_to(excess);
            report.freed += freed;
            if freed > 0 {
                tracing::trace!(pool = pool.id(), inode = %current.key(), freed, "victim shrunk");
            }

            if current.store().is_empty() && registry.isolate(&current) {
                report.isolated += 1;
            }
            drop(current);

            thread::yield_now();

            current = match next {
                Some(node) => node,
                None => {
                    report.unresolved = pool.excess();
                    if report.unresolved > 0 {
                        tracing::warn!(
                            pool = pool.id(),
                            unresolved = report.unresolved,
                            "eviction exhausted the registry while still over limit"
                        );
                    }
                    break;
                }
            };
        }

        pool.stats()
            .evicted
            .fetch_add(report.freed, Ordering::Relaxed);
        tracing::debug!(
            pool = pool.id(),
            freed = report.freed,
            visited = report.visited,
            isolated = report.isolated,
            pages_stored = pool.pages_stored(),
            "eviction finished"
        );

        report
    }
}
