//! Fixed-arena block allocators.
//!
//! Two interchangeable strategies turn one borrowed byte buffer into a
//! source of reusable power-of-two blocks:
//!
//! ```text
//! Arena (owned Vec<u8>, outlives every allocator)
//! └── &mut [u8] lent to one of:
//!     ├── SegregatedAllocator  class ladder + bump cursor, per-class LIFO lists
//!     └── BuddyAllocator       split on alloc, coalesce on free
//!
//! Backend      enum over both, chosen by BackendConfig::kind
//! Checked<A>   opt-in wrapper that rejects foreign and double frees
//! ```
//!
//! # Block model
//!
//! Blocks are `(offset, order)` pairs ([`Block`]) rather than raw pointers.
//! Free-list links live inside free blocks as offsets; a block's order
//! travels with its handle, so `free` never guesses a size from the bytes
//! it is given back.
//!
//! # Safety
//!
//! All arena access goes through slice indexing. There is no `unsafe` in
//! this crate.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod arena;
pub mod backend;
pub mod buddy;
pub mod checked;
pub mod config;
mod link;
pub mod segregated;

// Public re-exports for the primary API surface.
pub use arena::Arena;
pub use backend::Backend;
pub use buddy::BuddyAllocator;
pub use burrow_core::{AllocError, Allocator, Block};
pub use checked::{Checked, UsageError};
pub use config::{BackendConfig, BackendKind, BuddyConfig, ConfigError, SegregatedConfig};
pub use segregated::SegregatedAllocator;
