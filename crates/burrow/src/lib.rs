//! Burrow: fixed-arena block allocators.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the Burrow sub-crates. For most users, adding `burrow` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use burrow::prelude::*;
//!
//! // The arena owns the memory and outlives the allocator.
//! let mut arena = Arena::new(4096).unwrap();
//!
//! // Pick a backend by name, e.g. from a command-line flag.
//! let kind: BackendKind = "buddy".parse().unwrap();
//! let mut alloc = Backend::from_config(arena.as_mut_slice(), &BackendConfig::new(kind)).unwrap();
//!
//! let block = alloc.alloc(2048).unwrap();
//! alloc.bytes_mut(block).fill(0xFF);
//! assert_eq!(alloc.bytes(block)[0], 0xFF);
//!
//! alloc.free(block);
//! alloc.destroy();
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`arena`] | `burrow-arena` | `Arena`, both allocators, `Backend`, `Checked`, configs |
//! | [`types`] | `burrow-core` | `Block`, order arithmetic, `AllocError`, `Allocator` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Arenas, allocators, and backend selection (`burrow-arena`).
pub use burrow_arena as arena;

/// Block handles, order arithmetic, errors, and the allocator trait
/// (`burrow-core`).
pub use burrow_core as types;

/// Common imports for typical Burrow usage.
///
/// ```rust
/// use burrow::prelude::*;
/// ```
pub mod prelude {
    // Core contract
    pub use burrow_core::{AllocError, Allocator, Block};

    // Backends
    pub use burrow_arena::{Backend, BuddyAllocator, SegregatedAllocator};

    // Memory and configuration
    pub use burrow_arena::{
        Arena, BackendConfig, BackendKind, BuddyConfig, ConfigError, SegregatedConfig,
    };

    // Validation
    pub use burrow_arena::{Checked, UsageError};
}
