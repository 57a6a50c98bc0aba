//! Inode Registry implementation
//!
//! BTreeMap of reference-counted nodes behind a reader/writer lock.

use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};
use std::sync::Arc;

use parking_lot::RwLock;

use super::{InodeKey, InodeNode};
use crate::store::PageCounter;

/// Ordered index of the inodes cached in one pool
///
/// ## Concurrency:
/// - `nodes`: RwLock guards structure only (insert/remove of nodes);
///   lookups share the read lock
/// - Page content is guarded by each node's own store lock, which is only
///   taken after `nodes` has been released
pub struct InodeRegistry {
    /// key → node, in increasing key order
    nodes: RwLock<BTreeMap<InodeKey, Arc<InodeNode>>>,

    /// Counters of the owning pool, handed to every new store
    counter: Arc<PageCounter>,

    /// Eviction batch size handed to every new store
    batch: usize,
}

impl InodeRegistry {
    pub fn new(counter: Arc<PageCounter>, batch: usize) -> Self {
        Self {
            nodes: RwLock::new(BTreeMap::new()),
            counter,
            batch,
        }
    }

    /// Return the node for `key`, creating it if absent
    ///
    /// Read-locked lookup first; on a miss the write lock is taken and the
    /// lookup repeated before inserting, so racing creators agree on one
    /// node. A retired node still in the index is replaced.
    pub fn find_or_create(&self, key: InodeKey) -> Arc<InodeNode> {
        if let Some(node) = self.find(key) {
            return node;
        }

        let mut nodes = self.nodes.write();
        if let Some(node) = nodes.get(&key) {
            if !node.store().is_retired() {
                return Arc::clone(node);
            }
        }

        let node = Arc::new(InodeNode::new(key, Arc::clone(&self.counter), self.batch));
        nodes.insert(key, Arc::clone(&node));
        tracing::trace!(inode = %key, "inode node created");
        node
    }

    /// Look up a live node
    pub fn find(&self, key: InodeKey) -> Option<Arc<InodeNode>> {
        let nodes = self.nodes.read();
        nodes
            .get(&key)
            .filter(|node| !node.store().is_retired())
            .cloned()
    }

    /// Remove `node` from the index if its store is empty
    ///
    /// Emptiness is checked under the store lock, which also retires the
    /// store so a racing `put` cannot repopulate it. Returns `true` only if
    /// this call removed the node. A non-empty node stays registered, and a
    /// node already removed or replaced under the same key is left alone.
    pub fn isolate(&self, node: &Arc<InodeNode>) -> bool {
        if !node.store().retire_if_empty() {
            return false;
        }

        let mut nodes = self.nodes.write();
        let registered = nodes
            .get(&node.key())
            .map_or(false, |current| Arc::ptr_eq(current, node));
        if registered {
            nodes.remove(&node.key());
            tracing::trace!(inode = %node.key(), "inode node isolated");
        }
        registered
    }

    /// First node in key order
    pub fn first(&self) -> Option<Arc<InodeNode>> {
        self.nodes.read().values().next().cloned()
    }

    /// First node whose key is strictly greater than `key`
    pub fn next_after(&self, key: InodeKey) -> Option<Arc<InodeNode>> {
        self.nodes
            .read()
            .range((Excluded(key), Unbounded))
            .next()
            .map(|(_, node)| Arc::clone(node))
    }

    /// Take every node out of the index
    pub fn drain(&self) -> Vec<Arc<InodeNode>> {
        let nodes = std::mem::take(&mut *self.nodes.write());
        nodes.into_values().collect()
    }

    /// Number of registered nodes
    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.read().is_empty()
    }

    /// Registered keys in increasing order
    pub fn keys(&self) -> Vec<InodeKey> {
        self.nodes.read().keys().copied().collect()
    }
}
