//! InodeRegistry Tests
//!
//! Tests verify:
//! - find / find_or_create
//! - Isolation of empty nodes only
//! - Isolated nodes stay usable by their holders
//! - Key-ordered traversal across removals
//! - Racing creators agree on one node

use std::sync::{Arc, Barrier};
use std::thread;

use zcache::registry::{InodeKey, InodeRegistry};
use zcache::store::{PageCounter, StoredPage};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_registry() -> (Arc<PageCounter>, InodeRegistry) {
    let counter = Arc::new(PageCounter::new());
    let registry = InodeRegistry::new(Arc::clone(&counter), 16);
    (counter, registry)
}

fn key(ino: u64) -> InodeKey {
    InodeKey(ino)
}

// =============================================================================
// Lookup Tests
// =============================================================================

#[test]
fn test_find_on_empty_registry() {
    let (_counter, registry) = setup_registry();

    assert!(registry.find(key(1)).is_none());
    assert!(registry.is_empty());
}

#[test]
fn test_find_or_create_inserts_once() {
    let (_counter, registry) = setup_registry();

    let a = registry.find_or_create(key(5));
    let b = registry.find_or_create(key(5));

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(registry.len(), 1);
    assert_eq!(a.key(), key(5));
}

#[test]
fn test_find_returns_created_node() {
    let (_counter, registry) = setup_registry();
    let created = registry.find_or_create(key(9));

    let found = registry.find(key(9)).unwrap();
    assert!(Arc::ptr_eq(&created, &found));
}

#[test]
fn test_handles_count_references() {
    let (_counter, registry) = setup_registry();
    let node = registry.find_or_create(key(1));

    // registry + our handle
    assert_eq!(Arc::strong_count(&node), 2);

    let other = registry.find(key(1)).unwrap();
    assert_eq!(Arc::strong_count(&node), 3);
    drop(other);
    assert_eq!(Arc::strong_count(&node), 2);
}

// =============================================================================
// Isolation Tests
// =============================================================================

#[test]
fn test_isolate_empty_node() {
    let (_counter, registry) = setup_registry();
    let node = registry.find_or_create(key(1));

    assert!(registry.isolate(&node));
    assert!(registry.find(key(1)).is_none());
    assert!(registry.is_empty());
}

#[test]
fn test_isolate_skips_nonempty_node() {
    let (_counter, registry) = setup_registry();
    let node = registry.find_or_create(key(1));
    node.store().put(StoredPage::new(0, b"p").unwrap());

    assert!(!registry.isolate(&node));
    assert!(registry.find(key(1)).is_some());
}

#[test]
fn test_isolated_node_outlives_registry_entry() {
    let (_counter, registry) = setup_registry();
    let node = registry.find_or_create(key(1));
    registry.isolate(&node);

    // Only our handle remains
    assert_eq!(Arc::strong_count(&node), 1);
    assert_eq!(node.key(), key(1));
    assert!(node.store().is_empty());
}

#[test]
fn test_find_or_create_after_isolation_makes_fresh_node() {
    let (counter, registry) = setup_registry();
    let old = registry.find_or_create(key(1));
    registry.isolate(&old);

    let fresh = registry.find_or_create(key(1));

    assert!(!Arc::ptr_eq(&old, &fresh));
    assert!(!old.store().put(StoredPage::new(0, b"lost").unwrap()));
    assert!(fresh.store().put(StoredPage::new(0, b"kept").unwrap()));
    assert_eq!(counter.pages(), 1);
}

#[test]
fn test_stale_isolate_does_not_remove_replacement() {
    let (_counter, registry) = setup_registry();
    let old = registry.find_or_create(key(1));
    registry.isolate(&old);
    let fresh = registry.find_or_create(key(1));

    // Isolating the old handle again must leave the new node registered
    assert!(!registry.isolate(&old));

    let found = registry.find(key(1)).unwrap();
    assert!(Arc::ptr_eq(&found, &fresh));
}

#[test]
fn test_isolate_twice_reports_one_removal() {
    let (_counter, registry) = setup_registry();
    let node = registry.find_or_create(key(1));
    let other = registry.find(key(1)).unwrap();

    assert!(registry.isolate(&node));
    assert!(!registry.isolate(&other));
    assert!(registry.is_empty());
}

// =============================================================================
// Traversal Tests
// =============================================================================

#[test]
fn test_first_and_next_follow_key_order() {
    let (_counter, registry) = setup_registry();
    for ino in [30, 10, 20] {
        registry.find_or_create(key(ino));
    }

    let first = registry.first().unwrap();
    assert_eq!(first.key(), key(10));
    let second = registry.next_after(first.key()).unwrap();
    assert_eq!(second.key(), key(20));
    let third = registry.next_after(second.key()).unwrap();
    assert_eq!(third.key(), key(30));
    assert!(registry.next_after(third.key()).is_none());
}

#[test]
fn test_next_after_removed_key() {
    let (_counter, registry) = setup_registry();
    for ino in [1, 2, 3] {
        registry.find_or_create(key(ino));
    }

    let middle = registry.find(key(2)).unwrap();
    registry.isolate(&middle);

    // Traversal continues from a key no longer in the index
    assert_eq!(registry.next_after(key(2)).unwrap().key(), key(3));
    assert_eq!(registry.keys(), vec![key(1), key(3)]);
}

#[test]
fn test_drain_empties_registry() {
    let (_counter, registry) = setup_registry();
    for ino in 0..5 {
        registry.find_or_create(key(ino));
    }

    let drained = registry.drain();

    assert_eq!(drained.len(), 5);
    assert!(registry.is_empty());
    assert!(registry.first().is_none());
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_racing_creators_share_one_node() {
    let counter = Arc::new(PageCounter::new());
    let registry = Arc::new(InodeRegistry::new(counter, 16));
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                registry.find_or_create(InodeKey(77))
            })
        })
        .collect();

    let nodes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(registry.len(), 1);
    for node in &nodes[1..] {
        assert!(Arc::ptr_eq(&nodes[0], node));
    }
}
