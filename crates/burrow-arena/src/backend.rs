//! Backend selection by configuration value.
//!
//! [`Backend`] is a closed enum over the registered allocators. Code that
//! knows its backend at compile time uses the concrete type directly; code
//! that picks one from configuration (a CLI flag, a settings file) builds a
//! `Backend` from a [`BackendConfig`] and drives it through the same
//! [`Allocator`] contract.

use burrow_core::{AllocError, Allocator, Block};

use crate::buddy::BuddyAllocator;
use crate::config::{BackendConfig, BackendKind};
use crate::segregated::SegregatedAllocator;

/// One of the registered allocator backends.
pub enum Backend<'a> {
    /// Segregated size-class free lists.
    Segregated(SegregatedAllocator<'a>),
    /// Binary buddy allocator.
    Buddy(BuddyAllocator<'a>),
}

impl<'a> Backend<'a> {
    /// Build the backend named by `config.kind` over `memory`.
    ///
    /// # Errors
    ///
    /// Whatever the chosen backend's constructor reports.
    pub fn from_config(memory: &'a mut [u8], config: &BackendConfig) -> Result<Self, AllocError> {
        match config.kind {
            BackendKind::Segregated => {
                SegregatedAllocator::with_config(memory, config.segregated).map(Self::Segregated)
            }
            BackendKind::Buddy => BuddyAllocator::with_config(memory, config.buddy).map(Self::Buddy),
        }
    }

    /// Which backend this is.
    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Segregated(_) => BackendKind::Segregated,
            Self::Buddy(_) => BackendKind::Buddy,
        }
    }
}

impl<'a> Allocator<'a> for Backend<'a> {
    fn create(memory: &'a mut [u8]) -> Result<Self, AllocError> {
        Self::from_config(memory, &BackendConfig::default())
    }

    fn alloc(&mut self, size: usize) -> Result<Block, AllocError> {
        match self {
            Self::Segregated(a) => a.alloc(size),
            Self::Buddy(a) => a.alloc(size),
        }
    }

    fn free(&mut self, block: impl Into<Option<Block>>) {
        match self {
            Self::Segregated(a) => a.free(block),
            Self::Buddy(a) => a.free(block),
        }
    }

    fn destroy(&mut self) {
        match self {
            Self::Segregated(a) => a.destroy(),
            Self::Buddy(a) => a.destroy(),
        }
    }

    fn bytes(&self, block: Block) -> &[u8] {
        match self {
            Self::Segregated(a) => a.bytes(block),
            Self::Buddy(a) => a.bytes(block),
        }
    }

    fn bytes_mut(&mut self, block: Block) -> &mut [u8] {
        match self {
            Self::Segregated(a) => a.bytes_mut(block),
            Self::Buddy(a) => a.bytes_mut(block),
        }
    }

    fn capacity(&self) -> usize {
        match self {
            Self::Segregated(a) => a.capacity(),
            Self::Buddy(a) => a.capacity(),
        }
    }

    fn max_block_size(&self) -> usize {
        match self {
            Self::Segregated(a) => a.max_block_size(),
            Self::Buddy(a) => a.max_block_size(),
        }
    }
}
