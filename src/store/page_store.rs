//! PageStore implementation
//!
//! BTreeMap-based page index behind a single Mutex.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use super::{PageCounter, StoredPage};

/// Index of the compressed pages of one cached inode
///
/// ## Concurrency:
/// - `pages`: one Mutex serializes get/put/delete/free
/// - `retired`: written only while `pages` is locked, read lock-free
///
/// The lock is never taken while the owning registry's lock is held.
pub struct PageStore {
    /// offset → page
    pages: Mutex<BTreeMap<u64, StoredPage>>,

    /// Counters of the owning pool
    counter: Arc<PageCounter>,

    /// Set once the store was found empty on its way out of the registry
    retired: AtomicBool,

    /// Pages removed per lock hold in `free_up_to`
    batch: usize,
}

impl PageStore {
    /// Create an empty store charging pages to `counter`
    pub fn new(counter: Arc<PageCounter>, batch: usize) -> Self {
        Self {
            pages: Mutex::new(BTreeMap::new()),
            counter,
            retired: AtomicBool::new(false),
            batch: batch.max(1),
        }
    }

    /// Look up a page, leaving it in place
    pub fn get(&self, offset: u64) -> Option<StoredPage> {
        self.pages.lock().get(&offset).cloned()
    }

    /// Insert or overwrite the page at `page.offset()`
    ///
    /// Returns `false` if the store has been retired; the page is dropped
    /// and the caller must look the inode up again.
    pub fn put(&self, page: StoredPage) -> bool {
        let mut pages = self.pages.lock();
        if self.retired.load(Ordering::Acquire) {
            return false;
        }

        self.counter.add(&page);
        if let Some(old) = pages.insert(page.offset(), page) {
            self.counter.sub(&old);
        }
        true
    }

    /// Remove the page at `offset`, returning whether one was present
    pub fn delete(&self, offset: u64) -> bool {
        let mut pages = self.pages.lock();
        match pages.remove(&offset) {
            Some(old) => {
                self.counter.sub(&old);
                true
            }
            None => false,
        }
    }

    /// Remove up to `n` pages in increasing-offset order
    ///
    /// Works in batches of at most `batch` pages per lock hold and yields
    /// between batches. Returns the number of pages removed.
    pub fn free_up_to(&self, n: u64) -> u64 {
        let mut freed = 0u64;

        while freed < n {
            let want = (n - freed).min(self.batch as u64);
            let mut removed = Vec::with_capacity(want as usize);
            let exhausted = {
                let mut pages = self.pages.lock();
                while (removed.len() as u64) < want {
                    match pages.pop_first() {
                        Some((_, page)) => {
                            self.counter.sub(&page);
                            removed.push(page);
                        }
                        None => break,
                    }
                }
                pages.is_empty()
            };

            freed += removed.len() as u64;
            // Payloads are released here, outside the lock
            drop(removed);

            if exhausted || freed >= n {
                break;
            }
            thread::yield_now();
        }

        freed
    }

    /// Remove every page
    pub fn free_all(&self) -> u64 {
        self.free_up_to(u64::MAX)
    }

    /// Mark the store retired if it holds no pages
    ///
    /// Once retired, `put` refuses new pages. Returns whether the store is
    /// now retired.
    pub fn retire_if_empty(&self) -> bool {
        let pages = self.pages.lock();
        if !pages.is_empty() {
            return false;
        }
        self.retired.store(true, Ordering::Release);
        true
    }

    pub fn is_retired(&self) -> bool {
        self.retired.load(Ordering::Acquire)
    }

    /// Number of pages held
    pub fn len(&self) -> usize {
        self.pages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.lock().is_empty()
    }

    /// Offsets currently held, in increasing order
    pub fn offsets(&self) -> Vec<u64> {
        self.pages.lock().keys().copied().collect()
    }
}

impl std::fmt::Debug for PageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageStore")
            .field("pages", &self.len())
            .field("retired", &self.is_retired())
            .finish()
    }
}
