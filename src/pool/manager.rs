//! Pool Manager
//!
//! Fixed-size table of pools addressed by small integer ids.
//!
//! ## Responsibilities
//! - Allocate pools into free table slots
//! - Resolve pool ids for every backend call
//! - Tear pools down at unmount

use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::Config;
use crate::error::{Result, ZcacheError};

use super::{Pool, PoolId};

/// Process-wide pool table
///
/// ## Concurrency:
/// - `pools`: RwLock held only for slot lookup, insert and removal,
///   never across pool work
pub struct PoolManager {
    /// Slot index is the pool id
    pools: RwLock<Vec<Option<Arc<Pool>>>>,

    /// Memory limit given to new pools
    default_memlimit: u64,

    /// Eviction batch size handed to new pools
    eviction_batch: usize,
}

impl PoolManager {
    /// Create an empty table with `config.max_pools` slots
    pub fn new(config: &Config) -> Self {
        Self {
            pools: RwLock::new(vec![None; config.max_pools]),
            default_memlimit: config.default_memlimit,
            eviction_batch: config.eviction_batch,
        }
    }

    /// Allocate a pool in the lowest free slot
    pub fn create_pool(&self, page_size: usize) -> Result<PoolId> {
        if !page_size.is_power_of_two() {
            return Err(ZcacheError::InvalidPageSize(page_size));
        }

        let mut pools = self.pools.write();
        let slot = pools
            .iter()
            .position(Option::is_none)
            .ok_or(ZcacheError::PoolTableFull { max: pools.len() })?;

        let id = slot as PoolId;
        pools[slot] = Some(Arc::new(Pool::new(
            id,
            page_size,
            self.default_memlimit,
            self.eviction_batch,
        )));

        tracing::info!(pool = id, page_size, "pool created");
        Ok(id)
    }

    /// Resolve a pool id
    pub fn get(&self, id: PoolId) -> Result<Arc<Pool>> {
        self.pools
            .read()
            .get(id as usize)
            .and_then(|slot| slot.clone())
            .ok_or(ZcacheError::UnknownPool(id))
    }

    /// Remove a pool from the table and free everything it holds
    ///
    /// Callers guarantee there is no I/O in flight on the pool, so nodes are
    /// dropped wholesale without visiting their stores. Returns the number
    /// of pages that were released.
    pub fn destroy_pool(&self, id: PoolId) -> Result<u64> {
        let pool = {
            let mut pools = self.pools.write();
            pools
                .get_mut(id as usize)
                .and_then(Option::take)
                .ok_or(ZcacheError::UnknownPool(id))?
        };

        let released = pool.pages_stored();
        let nodes = pool.registry().drain();
        let inodes = nodes.len();
        drop(nodes);
        pool.counter().reset();

        tracing::info!(pool = id, inodes, pages = released, "pool destroyed");
        Ok(released)
    }

    /// Ids of all live pools, in increasing order
    pub fn pool_ids(&self) -> Vec<PoolId> {
        self.pools
            .read()
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(id, _)| id as PoolId)
            .collect()
    }

    /// Number of live pools
    pub fn len(&self) -> usize {
        self.pools.read().iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the table
    pub fn capacity(&self) -> usize {
        self.pools.read().len()
    }
}
