//! Integration tests: end-to-end scenarios over the allocator contract.
//!
//! Each scenario is written once against `Allocator` and run for every
//! backend where the property is backend-independent.

use burrow_arena::{
    AllocError, Allocator, Arena, Backend, BackendConfig, BackendKind, BuddyAllocator, BuddyConfig,
    SegregatedAllocator, SegregatedConfig,
};
use burrow_test_utils::LiveSet;

// ── Helpers ──────────────────────────────────────────────────────────

/// Allocate, time nothing, free, and tear down: the reference benchmark
/// shape (4096-byte arena, one 2048-byte request).
fn reference_cycle<'a, A: Allocator<'a>>(mut allocator: A) {
    let block = allocator.alloc(2048).unwrap();
    assert!(block.size() >= 2048);
    assert!(block.end() <= 4096);
    allocator.free(block);
    allocator.destroy();
}

fn every_alloc_in_range<'a, A: Allocator<'a>>(allocator: &mut A, arena_len: usize) {
    let mut live = LiveSet::new();
    for size in [1, 7, 16, 33, 100, 250, 512, 1000] {
        if let Ok(block) = live.alloc(allocator, size) {
            assert!(block.end() <= arena_len, "{block} outside arena");
            assert!(block.size() >= size);
        }
    }
    live.verify(allocator);
    live.free_all(allocator);
}

// ── Reference profile ────────────────────────────────────────────────

#[test]
fn reference_profile_runs_on_every_backend() {
    for kind in BackendKind::ALL {
        let mut arena = Arena::new(4096).unwrap();
        let backend = Backend::from_config(arena.as_mut_slice(), &BackendConfig::new(kind)).unwrap();
        reference_cycle(backend);
    }
}

#[test]
fn allocations_stay_inside_the_arena() {
    let mut arena = Arena::new(8192).unwrap();
    every_alloc_in_range(&mut SegregatedAllocator::create(arena.as_mut_slice()).unwrap(), 8192);

    let mut arena = Arena::new(8192).unwrap();
    every_alloc_in_range(&mut BuddyAllocator::create(arena.as_mut_slice()).unwrap(), 8192);
}

// ── Buddy: the 4096/2048 walkthrough ─────────────────────────────────

#[test]
fn buddy_4096_arena_with_2048_blocks() {
    let mut arena = Arena::new(4096).unwrap();
    let config = BuddyConfig::new(2048).unwrap();
    let mut buddy = BuddyAllocator::with_config(arena.as_mut_slice(), config).unwrap();

    // First request splits the root and leaves one free 2048-byte sibling.
    let first = buddy.alloc(2048).unwrap();
    assert_eq!(buddy.free_blocks(11), 1);
    assert_eq!(buddy.free_blocks(12), 0);

    // Second request takes that sibling; nothing else is split.
    let second = buddy.alloc(2048).unwrap();
    assert_eq!(buddy.free_blocks(11), 0);
    assert_ne!(first.offset(), second.offset());

    // Only two 2048-byte blocks exist in 4096 bytes.
    assert_eq!(
        buddy.alloc(2048),
        Err(AllocError::NoFitFound { requested: 2048 })
    );

    buddy.free(first);
    buddy.free(second);
    assert_eq!(buddy.free_blocks(12), 1);
    assert_eq!(buddy.free_bytes(), 4096);
}

// ── Exhaustion bounds ────────────────────────────────────────────────

#[test]
fn segregated_max_class_succeeds_floor_n_over_max_times() {
    for n in [4096, 4096 * 3 - 1, 4096 * 5, 4096 * 5 + 4095] {
        let mut arena = Arena::new(n).unwrap();
        let mut alloc = SegregatedAllocator::create(arena.as_mut_slice()).unwrap();
        let max = alloc.max_block_size();
        let successes = std::iter::from_fn(|| alloc.alloc(max).ok()).count();
        assert_eq!(successes, n / max, "arena of {n} bytes");
        assert!(matches!(
            alloc.alloc(max),
            Err(AllocError::ArenaExhausted { .. })
        ));
    }
}

#[test]
fn buddy_max_order_succeeds_floor_n_over_max_times() {
    let config = BuddyConfig::new(16).unwrap().with_max_block(1024).unwrap();
    for n in [1024, 1024 * 3 - 1, 1024 * 7, 1024 * 7 + 1000] {
        let mut arena = Arena::new(n).unwrap();
        let mut alloc = BuddyAllocator::with_config(arena.as_mut_slice(), config).unwrap();
        let max = alloc.max_block_size();
        let successes = std::iter::from_fn(|| alloc.alloc(max).ok()).count();
        assert_eq!(successes, n / max, "arena of {n} bytes");
        assert!(matches!(alloc.alloc(max), Err(AllocError::NoFitFound { .. })));
    }
}

// ── Recycling ────────────────────────────────────────────────────────

#[test]
fn segregated_reuse_does_not_consume_arena() {
    let mut arena = Arena::new(4096).unwrap();
    let config = SegregatedConfig::new(16, 1024).unwrap();
    let mut alloc = SegregatedAllocator::with_config(arena.as_mut_slice(), config).unwrap();

    let blocks: Vec<_> = [20, 200, 700]
        .iter()
        .map(|&size| alloc.alloc(size).unwrap())
        .collect();
    let cursor = alloc.cursor();
    for &block in &blocks {
        alloc.free(block);
    }
    for _ in 0..100 {
        let a = alloc.alloc(20).unwrap();
        let b = alloc.alloc(200).unwrap();
        let c = alloc.alloc(700).unwrap();
        alloc.free(a);
        alloc.free(b);
        alloc.free(c);
    }
    assert_eq!(alloc.cursor(), cursor);
}

// ── Teardown ─────────────────────────────────────────────────────────

#[test]
fn destroy_twice_preserves_caller_bytes() {
    for kind in BackendKind::ALL {
        let mut arena = Arena::new(4096).unwrap();
        let offset;
        {
            let mut backend =
                Backend::from_config(arena.as_mut_slice(), &BackendConfig::new(kind)).unwrap();
            let block = backend.alloc(1024).unwrap();
            backend.bytes_mut(block).fill(0xC3);
            offset = block.offset();
            backend.destroy();
            backend.destroy();
            backend.free(block);
            backend.free(None);
            assert_eq!(backend.capacity(), 0);
        }
        let bytes = &arena.as_slice()[offset..offset + 1024];
        assert!(bytes.iter().all(|&b| b == 0xC3), "{kind} corrupted the arena");
    }
}

#[test]
fn arena_too_small_for_each_backend() {
    let mut arena = Arena::new(8).unwrap();
    assert!(matches!(
        SegregatedAllocator::create(arena.as_mut_slice()),
        Err(AllocError::ArenaTooSmall { size: 8, .. })
    ));
    assert!(matches!(
        BuddyAllocator::create(arena.as_mut_slice()),
        Err(AllocError::ArenaTooSmall { size: 8, .. })
    ));
}
