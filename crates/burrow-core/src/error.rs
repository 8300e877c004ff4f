//! Error types shared by every allocator backend.
//!
//! Allocation failures are ordinary values: no operation in Burrow aborts
//! the process on exhaustion, and a failed call leaves the allocator exactly
//! as it found it so the caller can retry, fall back, or report upward.

use std::error::Error;
use std::fmt;

/// Errors reported by arena bootstrap and allocator operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// The arena is smaller than the smallest block the backend manages.
    ArenaTooSmall {
        /// Length of the arena in bytes.
        size: usize,
        /// Minimum arena length the backend accepts.
        minimum: usize,
    },
    /// The backing store could not be acquired.
    MapFailure {
        /// Number of bytes that were requested.
        size: usize,
    },
    /// The request is zero or larger than the largest block.
    InvalidSize {
        /// Number of bytes requested.
        requested: usize,
        /// Largest request the backend can satisfy.
        max: usize,
    },
    /// The segregated allocator's bump cursor cannot fit another block of
    /// the requested class and the class free list is empty.
    ArenaExhausted {
        /// Size of the class instance that was needed, in bytes.
        requested: usize,
        /// Bytes left between the cursor and the end of the arena.
        remaining: usize,
    },
    /// The buddy allocator has no free block large enough to split.
    NoFitFound {
        /// Size of the block that was needed, in bytes.
        requested: usize,
    },
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArenaTooSmall { size, minimum } => {
                write!(f, "arena of {size} bytes is below the minimum of {minimum} bytes")
            }
            Self::MapFailure { size } => {
                write!(f, "could not acquire {size} bytes of backing memory")
            }
            Self::InvalidSize { requested, max } => {
                write!(f, "invalid allocation size {requested}, must be in 1..={max}")
            }
            Self::ArenaExhausted {
                requested,
                remaining,
            } => {
                write!(
                    f,
                    "arena exhausted: needed {requested} bytes, {remaining} bytes remain"
                )
            }
            Self::NoFitFound { requested } => {
                write!(f, "no free block of {requested} bytes or larger")
            }
        }
    }
}

impl Error for AllocError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_values() {
        let err = AllocError::InvalidSize {
            requested: 0,
            max: 4096,
        };
        assert_eq!(err.to_string(), "invalid allocation size 0, must be in 1..=4096");

        let err = AllocError::ArenaExhausted {
            requested: 4096,
            remaining: 12,
        };
        assert!(err.to_string().contains("12 bytes remain"));
    }

    #[test]
    fn usable_as_dyn_error() {
        let err: Box<dyn Error> = Box::new(AllocError::NoFitFound { requested: 2048 });
        assert!(err.source().is_none());
    }
}
