//! Configuration for zcache
//!
//! Centralized configuration with sensible defaults.

use crate::error::{Result, ZcacheError};

/// Memory limit meaning "no limit"
pub const UNLIMITED: u64 = u64::MAX;

/// Main configuration for a zcache instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Pool Configuration
    // -------------------------------------------------------------------------
    /// Size of the fixed pool table
    pub max_pools: usize,

    /// Page size used when a client asks for page size 0
    pub default_page_size: usize,

    /// Memory limit (bytes) given to newly created pools
    pub default_memlimit: u64,

    // -------------------------------------------------------------------------
    // Eviction Configuration
    // -------------------------------------------------------------------------
    /// Max pages removed per store-lock hold
    pub eviction_batch: usize,

    // -------------------------------------------------------------------------
    // Codec Configuration
    // -------------------------------------------------------------------------
    /// zlib level (0-9) used by the default codec
    pub compression_level: u32,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Worker threads serving client connections
    pub max_connections: usize,

    /// Connection read timeout (milliseconds)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds)
    pub write_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_pools: 16,
            default_page_size: 4096,
            default_memlimit: UNLIMITED,
            eviction_batch: 16,
            compression_level: 1,
            listen_addr: "127.0.0.1:7380".to_string(),
            max_connections: 64,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the configuration for values the cache cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.max_pools == 0 {
            return Err(ZcacheError::Config("max_pools must be at least 1".to_string()));
        }
        if self.eviction_batch == 0 {
            return Err(ZcacheError::Config(
                "eviction_batch must be at least 1".to_string(),
            ));
        }
        if !self.default_page_size.is_power_of_two() {
            return Err(ZcacheError::Config(format!(
                "default_page_size must be a power of two, got {}",
                self.default_page_size
            )));
        }
        if self.compression_level > 9 {
            return Err(ZcacheError::Config(format!(
                "compression_level must be 0-9, got {}",
                self.compression_level
            )));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the size of the pool table
    pub fn max_pools(mut self, count: usize) -> Self {
        self.config.max_pools = count;
        self
    }

    /// Set the page size used for pools created with page size 0
    pub fn default_page_size(mut self, size: usize) -> Self {
        self.config.default_page_size = size;
        self
    }

    /// Set the memory limit (in bytes) for new pools
    pub fn default_memlimit(mut self, bytes: u64) -> Self {
        self.config.default_memlimit = bytes;
        self
    }

    /// Set the eviction batch size
    pub fn eviction_batch(mut self, pages: usize) -> Self {
        self.config.eviction_batch = pages;
        self
    }

    /// Set the zlib compression level
    pub fn compression_level(mut self, level: u32) -> Self {
        self.config.compression_level = level;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the number of connection worker threads
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
