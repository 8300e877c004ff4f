//! Benchmark profiles and workloads for the Burrow allocators.
//!
//! - [`REFERENCE_ARENA_BYTES`] / [`REFERENCE_REQUEST_BYTES`]: the reference
//!   profile, one 2048-byte request against a 4096-byte arena
//! - [`churn_sizes`]: deterministic request sizes from a seed
//! - [`run_churn`]: a sliding-window alloc/free workload over any backend

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::collections::VecDeque;

use burrow_arena::{BackendConfig, BackendKind};
use burrow_core::{Allocator, Block};
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Arena size of the reference profile.
pub const REFERENCE_ARENA_BYTES: usize = 4096;

/// Request size of the reference profile.
pub const REFERENCE_REQUEST_BYTES: usize = 2048;

/// Backend configuration used by the reference profile.
pub fn reference_config(kind: BackendKind) -> BackendConfig {
    BackendConfig::new(kind)
}

/// Generate `count` request sizes in `1..=max_size`.
///
/// Sizes are skewed towards small requests: each draw picks an order
/// uniformly, then a size uniformly within that order, so a 16-byte and a
/// 2048-byte request are equally likely even though the range is lopsided.
pub fn churn_sizes(seed: u64, count: usize, max_size: usize) -> Vec<usize> {
    assert!(max_size > 0, "max_size must be positive");
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let top = usize::BITS - max_size.leading_zeros();
    (0..count)
        .map(|_| {
            let bits = (rng.next_u32() % top) + 1;
            let ceiling = (1usize << bits).min(max_size + 1);
            1 + (rng.next_u64() as usize) % (ceiling - 1).max(1)
        })
        .collect()
}

/// Outcome of a [`run_churn`] pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChurnStats {
    /// Requests that were satisfied.
    pub allocated: usize,
    /// Requests refused for lack of space.
    pub refused: usize,
    /// Most blocks live at once.
    pub peak_live: usize,
}

/// Allocate each size in turn, keeping at most `window` blocks live and
/// freeing the oldest one whenever the window is full or a request fails.
///
/// Every live block is released before returning.
pub fn run_churn<'a, A: Allocator<'a>>(
    allocator: &mut A,
    sizes: &[usize],
    window: usize,
) -> ChurnStats {
    let mut live: VecDeque<Block> = VecDeque::with_capacity(window);
    let mut stats = ChurnStats::default();
    for &size in sizes {
        if live.len() >= window {
            allocator.free(live.pop_front());
        }
        match allocator.alloc(size) {
            Ok(block) => {
                stats.allocated += 1;
                live.push_back(block);
            }
            Err(_) => {
                stats.refused += 1;
                allocator.free(live.pop_front());
            }
        }
        stats.peak_live = stats.peak_live.max(live.len());
    }
    for block in live.drain(..) {
        allocator.free(block);
    }
    stats
}
