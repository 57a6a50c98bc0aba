//! Backend Module
//!
//! The facade the filesystem-hook layer calls into.
//!
//! ## Responsibilities
//! - Resolve pool ids, rejecting unknown ones before touching pool internals
//! - Compress pages on put and restore them on get
//! - Route page and inode operations to the right registry and store
//! - Trigger eviction when a put or a limit change leaves a pool over limit
//!
//! Every failure below the facade degrades to "not cached": the backing
//! filesystem always holds the authoritative copy of a page.

use crate::codec::{PageCodec, ZlibCodec};
use crate::config::Config;
use crate::error::{Result, ZcacheError};
use crate::evict::{EvictionReport, EvictionWalker};
use crate::pool::{Pool, PoolId, PoolManager, PoolStats, PoolStatsSnapshot};
use crate::protocol::{Command, Reply};
use crate::registry::InodeKey;
use crate::store::StoredPage;

/// Attempts at landing a page in a live (non-isolated) node
const PUT_ATTEMPTS: usize = 4;

/// The compressed page cache
///
/// ## Lock order
/// pool table → inode registry → page store, never reversed. Each level is
/// released before the next is taken; node handles carry the caller from
/// the registry to the store.
pub struct Backend {
    /// Backend configuration
    config: Config,

    /// Pool table
    pools: PoolManager,

    /// Page compression
    codec: Box<dyn PageCodec>,
}

impl Backend {
    /// Create a backend with the zlib codec
    pub fn new(config: Config) -> Result<Self> {
        let codec = ZlibCodec::new(config.compression_level);
        Self::with_codec(config, codec)
    }

    /// Create a backend with a caller-supplied codec
    pub fn with_codec(config: Config, codec: impl PageCodec + 'static) -> Result<Self> {
        config.validate()?;

        tracing::info!(
            max_pools = config.max_pools,
            codec = codec.name(),
            eviction_batch = config.eviction_batch,
            "backend initialized"
        );

        Ok(Self {
            pools: PoolManager::new(&config),
            config,
            codec: Box::new(codec),
        })
    }

    /// Execute a protocol command
    pub fn execute(&self, command: Command) -> Result<Reply> {
        match command {
            Command::InitPool { page_size } => {
                let id = self.init_pool(page_size as usize)?;
                Ok(Reply::Value(id.to_string().into_bytes()))
            }
            Command::GetPage {
                pool,
                inode,
                offset,
            } => match self.get_page(pool, InodeKey(inode), offset)? {
                Some(page) => Ok(Reply::Value(page)),
                None => Ok(Reply::NotFound),
            },
            Command::PutPage {
                pool,
                inode,
                offset,
                data,
            } => {
                self.put_page(pool, InodeKey(inode), offset, &data)?;
                Ok(Reply::Done)
            }
            Command::FlushPage {
                pool,
                inode,
                offset,
            } => {
                self.flush_page(pool, InodeKey(inode), offset)?;
                Ok(Reply::Done)
            }
            Command::FlushInode { pool, inode } => {
                self.flush_inode(pool, InodeKey(inode))?;
                Ok(Reply::Done)
            }
            Command::FlushPool { pool } => {
                self.flush_pool(pool)?;
                Ok(Reply::Done)
            }
            Command::ReadControl { path } => {
                let value = self.control().read(&path)?;
                Ok(Reply::Value(value.into_bytes()))
            }
            Command::WriteControl { path, value } => {
                self.control().write(&path, &value)?;
                Ok(Reply::Done)
            }
            Command::ListControl => {
                let entries = self.control().list().join("\n");
                Ok(Reply::Value(entries.into_bytes()))
            }
            Command::Ping => Ok(Reply::Value(b"PONG".to_vec())),
        }
    }

    // =========================================================================
    // Filesystem Hooks
    // =========================================================================

    /// Create a pool for a newly mounted filesystem
    ///
    /// A page size of 0 selects the configured default.
    pub fn init_pool(&self, page_size: usize) -> Result<PoolId> {
        let page_size = if page_size == 0 {
            self.config.default_page_size
        } else {
            page_size
        };
        self.pools.create_pool(page_size)
    }

    /// Look up a page before the filesystem reads it from disk
    pub fn get_page(&self, pool_id: PoolId, inode: InodeKey, offset: u64) -> Result<Option<Vec<u8>>> {
        let pool = self.pools.get(pool_id)?;
        PoolStats::bump(&pool.stats().gets);

        let node = match pool.registry().find(inode) {
            Some(node) => node,
            None => return Ok(None),
        };
        let page = match node.store().get(offset) {
            Some(page) => page,
            None => return Ok(None),
        };

        match self.codec.decompress(page.data(), pool.page_size()) {
            Ok(data) => {
                PoolStats::bump(&pool.stats().hits);
                tracing::trace!(pool = pool_id, inode = %inode, offset, "page hit");
                Ok(Some(data))
            }
            Err(e) => {
                tracing::warn!(
                    pool = pool_id,
                    inode = %inode,
                    offset,
                    error = %e,
                    "dropping undecodable page"
                );
                node.store().delete(offset);
                if node.store().is_empty() {
                    pool.registry().isolate(&node);
                }
                Ok(None)
            }
        }
    }

    /// Stash a clean page the filesystem is evicting
    ///
    /// Compression or allocation failure leaves the page uncached and is not
    /// reported to the caller.
    pub fn put_page(&self, pool_id: PoolId, inode: InodeKey, offset: u64, data: &[u8]) -> Result<()> {
        let pool = self.pools.get(pool_id)?;
        if data.len() > pool.page_size() {
            return Err(ZcacheError::PageTooLarge {
                len: data.len(),
                page_size: pool.page_size(),
            });
        }
        PoolStats::bump(&pool.stats().puts);

        let page = match self
            .codec
            .compress(data)
            .and_then(|compressed| StoredPage::new(offset, &compressed))
        {
            Ok(page) => page,
            Err(e) => {
                PoolStats::bump(&pool.stats().put_failures);
                tracing::debug!(pool = pool_id, inode = %inode, offset, error = %e, "page not cached");
                return Ok(());
            }
        };

        if !self.store_page(&pool, inode, page) {
            PoolStats::bump(&pool.stats().put_failures);
            tracing::debug!(pool = pool_id, inode = %inode, offset, "inode kept being isolated; page not cached");
            return Ok(());
        }
        tracing::trace!(pool = pool_id, inode = %inode, offset, "page stored");

        if pool.excess() > 0 {
            EvictionWalker::new(&pool).run();
        }
        Ok(())
    }

    /// Drop one page (invalidation or truncation boundary)
    ///
    /// Returns whether a page was cached at that offset.
    pub fn flush_page(&self, pool_id: PoolId, inode: InodeKey, offset: u64) -> Result<bool> {
        let pool = self.pools.get(pool_id)?;
        PoolStats::bump(&pool.stats().flushes);

        let node = match pool.registry().find(inode) {
            Some(node) => node,
            None => return Ok(false),
        };

        let removed = node.store().delete(offset);
        if node.store().is_empty() {
            pool.registry().isolate(&node);
        }
        Ok(removed)
    }

    /// Drop every page of one inode (whole-file truncate or invalidate)
    ///
    /// Returns the number of pages dropped.
    pub fn flush_inode(&self, pool_id: PoolId, inode: InodeKey) -> Result<u64> {
        let pool = self.pools.get(pool_id)?;
        PoolStats::bump(&pool.stats().inode_flushes);

        let node = match pool.registry().find(inode) {
            Some(node) => node,
            None => return Ok(0),
        };

        let freed = node.store().free_all();
        pool.registry().isolate(&node);
        tracing::trace!(pool = pool_id, inode = %inode, freed, "inode flushed");
        Ok(freed)
    }

    /// Drop and destroy a pool at unmount
    ///
    /// The pool id is invalid afterwards. Returns the number of pages dropped.
    pub fn flush_pool(&self, pool_id: PoolId) -> Result<u64> {
        self.pools.destroy_pool(pool_id)
    }

    // =========================================================================
    // Administration
    // =========================================================================

    /// Set a pool's memory limit in bytes
    ///
    /// The limit is rounded down to a page multiple. If the pool is now over
    /// its limit, eviction runs before this returns. Returns the stored limit.
    pub fn set_memory_limit(&self, pool_id: PoolId, bytes: u64) -> Result<u64> {
        let pool = self.pools.get(pool_id)?;
        let limit = pool.set_memlimit(bytes);
        tracing::info!(pool = pool_id, memlimit = limit, "memory limit changed");

        if pool.excess() > 0 {
            EvictionWalker::new(&pool).run();
        }
        Ok(limit)
    }

    /// A pool's memory limit in bytes
    pub fn memory_limit(&self, pool_id: PoolId) -> Result<u64> {
        Ok(self.pools.get(pool_id)?.memlimit())
    }

    /// Pages held by a pool, in uncompressed bytes
    pub fn stored_bytes(&self, pool_id: PoolId) -> Result<u64> {
        Ok(self.pools.get(pool_id)?.stored_bytes())
    }

    /// Pages held by a pool
    pub fn pages_stored(&self, pool_id: PoolId) -> Result<u64> {
        Ok(self.pools.get(pool_id)?.pages_stored())
    }

    /// Run an eviction pass on a pool now
    pub fn evict(&self, pool_id: PoolId) -> Result<EvictionReport> {
        let pool = self.pools.get(pool_id)?;
        Ok(EvictionWalker::new(&pool).run())
    }

    /// Snapshot of a pool's counters
    pub fn pool_stats(&self, pool_id: PoolId) -> Result<PoolStatsSnapshot> {
        Ok(self.pools.get(pool_id)?.snapshot())
    }

    /// Administrative key/value view
    pub fn control(&self) -> crate::control::ControlPlane<'_> {
        crate::control::ControlPlane::new(self)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the pool table
    pub fn pools(&self) -> &PoolManager {
        &self.pools
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Name of the page codec in use
    pub fn codec_name(&self) -> &'static str {
        self.codec.name()
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Put `page` into the inode's store, re-resolving the node if it was
    /// isolated under us
    fn store_page(&self, pool: &Pool, inode: InodeKey, page: StoredPage) -> bool {
        for _ in 0..PUT_ATTEMPTS {
            let node = pool.registry().find_or_create(inode);
            if node.store().put(page.clone()) {
                return true;
            }
        }
        false
    }
}
