//! Core types and traits for the Burrow allocators.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! vocabulary shared by every backend: the [`Block`] handle, power-of-two
//! order arithmetic, the [`AllocError`] taxonomy, and the [`Allocator`]
//! contract that callers are polymorphic over.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod block;
pub mod error;
pub mod order;
pub mod traits;

pub use block::Block;
pub use error::AllocError;
pub use order::{block_size, ceil_order, floor_order, Order, WORD};
pub use traits::Allocator;
