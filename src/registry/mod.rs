//! Inode Registry Module
//!
//! Per-pool ordered index from inode key to the inode's page store.
//!
//! ## Responsibilities
//! - Find or create the node of a cached inode
//! - Hand out reference-counted node handles so callers can drop the
//!   registry lock before touching a store
//! - Isolate empty nodes from the index
//! - In-order traversal for the eviction walker
//!
//! ## Lifecycle of a node
//! ```text
//! Absent ──find_or_create──▶ Created ──(pages come and go)──▶ Empty
//!                                                              │
//!                                    isolate (store retired)   ▼
//!                      Freed ◀──last handle dropped── Isolated
//! ```
//! Isolation and deallocation are separate events: an isolated node stays
//! valid until the last `Arc` handle is released.

mod index;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::store::{PageCounter, PageStore};

pub use index::InodeRegistry;

/// Identity of one cached file within a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InodeKey(pub u64);

impl From<u64> for InodeKey {
    fn from(ino: u64) -> Self {
        InodeKey(ino)
    }
}

impl fmt::Display for InodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One cached inode: its key and its page store
///
/// Shared as `Arc<InodeNode>`; the Arc strong count is the node's
/// reference count.
#[derive(Debug)]
pub struct InodeNode {
    key: InodeKey,
    store: PageStore,
}

impl InodeNode {
    pub(crate) fn new(key: InodeKey, counter: Arc<PageCounter>, batch: usize) -> Self {
        Self {
            key,
            store: PageStore::new(counter, batch),
        }
    }

    pub fn key(&self) -> InodeKey {
        self.key
    }

    pub fn store(&self) -> &PageStore {
        &self.store
    }
}
