//! PageStore Tests
//!
//! Tests verify:
//! - Get/put/delete semantics
//! - Overwrite releases the old page
//! - Shared page counter stays exact
//! - Batched increasing-offset removal
//! - Retirement blocks new pages
//! - Concurrent mutators

use std::sync::Arc;
use std::thread;

use zcache::store::{PageCounter, PageStore, StoredPage};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_store(batch: usize) -> (Arc<PageCounter>, PageStore) {
    let counter = Arc::new(PageCounter::new());
    let store = PageStore::new(Arc::clone(&counter), batch);
    (counter, store)
}

fn page(offset: u64, data: &[u8]) -> StoredPage {
    StoredPage::new(offset, data).unwrap()
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_new_store_is_empty() {
    let (counter, store) = setup_store(16);

    assert!(store.is_empty());
    assert_eq!(store.len(), 0);
    assert_eq!(counter.pages(), 0);
    assert!(!store.is_retired());
}

#[test]
fn test_put_and_get() {
    let (_counter, store) = setup_store(16);

    assert!(store.put(page(3, b"abc")));

    let found = store.get(3).unwrap();
    assert_eq!(found.offset(), 3);
    assert_eq!(found.data().as_ref(), b"abc");
}

#[test]
fn test_get_leaves_page_in_place() {
    let (counter, store) = setup_store(16);
    store.put(page(0, b"x"));

    assert!(store.get(0).is_some());
    assert!(store.get(0).is_some());
    assert_eq!(store.len(), 1);
    assert_eq!(counter.pages(), 1);
}

#[test]
fn test_get_missing_offset() {
    let (_counter, store) = setup_store(16);
    store.put(page(1, b"x"));

    assert!(store.get(2).is_none());
}

#[test]
fn test_put_overwrites_existing() {
    let (counter, store) = setup_store(16);

    store.put(page(7, b"first"));
    store.put(page(7, b"second!"));

    assert_eq!(store.len(), 1);
    assert_eq!(counter.pages(), 1);
    assert_eq!(counter.compressed_bytes(), b"second!".len() as u64);
    assert_eq!(store.get(7).unwrap().data().as_ref(), b"second!");
}

#[test]
fn test_delete_present_and_absent() {
    let (counter, store) = setup_store(16);
    store.put(page(1, b"a"));
    store.put(page(2, b"b"));

    assert!(store.delete(1));
    assert!(!store.delete(1));
    assert!(!store.delete(99));

    assert_eq!(store.offsets(), vec![2]);
    assert_eq!(counter.pages(), 1);
}

// =============================================================================
// Counter Tests
// =============================================================================

#[test]
fn test_counter_shared_across_stores() {
    let counter = Arc::new(PageCounter::new());
    let a = PageStore::new(Arc::clone(&counter), 16);
    let b = PageStore::new(Arc::clone(&counter), 16);

    a.put(page(0, b"1234"));
    a.put(page(1, b"56"));
    b.put(page(0, b"7"));

    assert_eq!(counter.pages(), 3);
    assert_eq!(counter.compressed_bytes(), 7);

    a.free_all();
    assert_eq!(counter.pages(), 1);
    assert_eq!(counter.compressed_bytes(), 1);
}

// =============================================================================
// free_up_to Tests
// =============================================================================

#[test]
fn test_free_up_to_removes_lowest_offsets_first() {
    let (counter, store) = setup_store(16);
    for offset in [9, 3, 5, 1, 7] {
        store.put(page(offset, b"p"));
    }

    let freed = store.free_up_to(2);

    assert_eq!(freed, 2);
    assert_eq!(store.offsets(), vec![5, 7, 9]);
    assert_eq!(counter.pages(), 3);
}

#[test]
fn test_free_up_to_spans_batches() {
    let (counter, store) = setup_store(3);
    for offset in 0..10 {
        store.put(page(offset, b"p"));
    }

    let freed = store.free_up_to(8);

    assert_eq!(freed, 8);
    assert_eq!(store.offsets(), vec![8, 9]);
    assert_eq!(counter.pages(), 2);
}

#[test]
fn test_free_up_to_more_than_present() {
    let (counter, store) = setup_store(4);
    for offset in 0..5 {
        store.put(page(offset, b"p"));
    }

    assert_eq!(store.free_up_to(100), 5);
    assert!(store.is_empty());
    assert_eq!(counter.pages(), 0);
}

#[test]
fn test_free_up_to_zero_is_noop() {
    let (_counter, store) = setup_store(4);
    store.put(page(0, b"p"));

    assert_eq!(store.free_up_to(0), 0);
    assert_eq!(store.len(), 1);
}

#[test]
fn test_free_all_on_empty_store() {
    let (_counter, store) = setup_store(4);
    assert_eq!(store.free_all(), 0);
}

// =============================================================================
// Retirement Tests
// =============================================================================

#[test]
fn test_retire_refused_when_not_empty() {
    let (_counter, store) = setup_store(16);
    store.put(page(0, b"p"));

    assert!(!store.retire_if_empty());
    assert!(!store.is_retired());
}

#[test]
fn test_retired_store_refuses_put() {
    let (counter, store) = setup_store(16);

    assert!(store.retire_if_empty());
    assert!(store.is_retired());
    assert!(!store.put(page(0, b"late")));

    assert!(store.is_empty());
    assert_eq!(counter.pages(), 0);
}

// =============================================================================
// StoredPage Tests
// =============================================================================

#[test]
fn test_stored_page_copies_payload() {
    let mut source = b"payload".to_vec();
    let stored = StoredPage::new(42, &source).unwrap();
    source[0] = b'X';

    assert_eq!(stored.offset(), 42);
    assert_eq!(stored.len(), 7);
    assert_eq!(stored.data().as_ref(), b"payload");
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_puts_and_frees_keep_counter_exact() {
    let counter = Arc::new(PageCounter::new());
    let store = Arc::new(PageStore::new(Arc::clone(&counter), 4));

    let writers: Vec<_> = (0..4u64)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..250u64 {
                    store.put(StoredPage::new(t * 1000 + i, b"data").unwrap());
                }
            })
        })
        .collect();

    let freer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            let mut freed = 0;
            for _ in 0..50 {
                freed += store.free_up_to(5);
            }
            freed
        })
    };

    for w in writers {
        w.join().unwrap();
    }
    let freed = freer.join().unwrap();

    assert_eq!(store.len() as u64 + freed, 1000);
    assert_eq!(counter.pages(), store.len() as u64);
    assert_eq!(counter.compressed_bytes(), store.len() as u64 * 4);
}
