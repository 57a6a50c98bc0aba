//! Page Codec
//!
//! Compression boundary between the backend facade and the page stores.
//! Stores only ever see the codec's output.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::{Result, ZcacheError};

/// Compresses pages on the way in and restores them on the way out
pub trait PageCodec: Send + Sync {
    /// Compress one page
    fn compress(&self, page: &[u8]) -> Result<Vec<u8>>;

    /// Restore a page; the result never exceeds `page_size` bytes
    fn decompress(&self, data: &[u8], page_size: usize) -> Result<Vec<u8>>;

    /// Codec name for logs
    fn name(&self) -> &'static str;
}

/// zlib via flate2
#[derive(Debug, Clone, Copy)]
pub struct ZlibCodec {
    level: Compression,
}

impl ZlibCodec {
    pub fn new(level: u32) -> Self {
        Self {
            level: Compression::new(level.min(9)),
        }
    }
}

impl Default for ZlibCodec {
    fn default() -> Self {
        Self::new(1)
    }
}

impl PageCodec for ZlibCodec {
    fn compress(&self, page: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::with_capacity(page.len() / 2), self.level);
        encoder
            .write_all(page)
            .map_err(|e| ZcacheError::Codec(format!("compress: {}", e)))?;
        encoder
            .finish()
            .map_err(|e| ZcacheError::Codec(format!("compress: {}", e)))
    }

    fn decompress(&self, data: &[u8], page_size: usize) -> Result<Vec<u8>> {
        let mut page = Vec::with_capacity(page_size);
        // One byte past the page size is enough to detect oversized output
        let mut decoder = ZlibDecoder::new(data).take(page_size as u64 + 1);
        decoder
            .read_to_end(&mut page)
            .map_err(|e| ZcacheError::Codec(format!("decompress: {}", e)))?;

        if page.len() > page_size {
            return Err(ZcacheError::Codec(format!(
                "decompressed page exceeds page size {}",
                page_size
            )));
        }
        Ok(page)
    }

    fn name(&self) -> &'static str {
        "zlib"
    }
}

/// Stores pages as-is
#[derive(Debug, Clone, Copy, Default)]
pub struct RawCodec;

impl PageCodec for RawCodec {
    fn compress(&self, page: &[u8]) -> Result<Vec<u8>> {
        Ok(page.to_vec())
    }

    fn decompress(&self, data: &[u8], page_size: usize) -> Result<Vec<u8>> {
        if data.len() > page_size {
            return Err(ZcacheError::Codec(format!(
                "stored page of {} bytes exceeds page size {}",
                data.len(),
                page_size
            )));
        }
        Ok(data.to_vec())
    }

    fn name(&self) -> &'static str {
        "raw"
    }
}
