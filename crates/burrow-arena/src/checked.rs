//! Opt-in misuse detection for any allocator.
//!
//! The allocators themselves trust their callers: freeing a foreign or
//! already-freed block is undefined by contract and costs nothing to not
//! check. [`Checked`] wraps an allocator and records every live block so
//! tests and debugging sessions can catch those mistakes. It adds a map
//! lookup to every call and is never used implicitly.

use std::error::Error;
use std::fmt;

use burrow_core::{AllocError, Allocator, Block};
use indexmap::IndexMap;

/// Misuse detected by [`Checked::try_free`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UsageError {
    /// The block was never allocated by this allocator.
    ForeignBlock {
        /// The offending block.
        block: Block,
    },
    /// The block was already freed and has not been reallocated since.
    DoubleFree {
        /// The offending block.
        block: Block,
    },
    /// A live block starts at this offset but with a different order.
    OrderMismatch {
        /// The block passed to `free`.
        block: Block,
        /// The block actually allocated at that offset.
        live: Block,
    },
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ForeignBlock { block } => write!(f, "{block} was not allocated here"),
            Self::DoubleFree { block } => write!(f, "{block} freed twice"),
            Self::OrderMismatch { block, live } => {
                write!(f, "{block} freed but {live} is allocated at that offset")
            }
        }
    }
}

impl Error for UsageError {}

/// An allocator wrapper that validates every `free`.
pub struct Checked<A> {
    inner: A,
    /// Live blocks keyed by offset, in allocation order.
    live: IndexMap<usize, Block>,
    /// Freed blocks not yet overlapped by a newer allocation.
    freed: IndexMap<usize, Block>,
    /// Set by `destroy`; every later `free` is a no-op.
    destroyed: bool,
}

impl<A> Checked<A> {
    /// Wrap an allocator that has not handed out any blocks yet.
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            live: IndexMap::new(),
            freed: IndexMap::new(),
            destroyed: false,
        }
    }

    /// The wrapped allocator.
    pub fn inner(&self) -> &A {
        &self.inner
    }

    /// Unwrap, discarding the live-block record.
    pub fn into_inner(self) -> A {
        self.inner
    }

    /// Blocks currently allocated, oldest first.
    pub fn live_blocks(&self) -> impl Iterator<Item = Block> + '_ {
        self.live.values().copied()
    }

    /// Number of blocks currently allocated.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    fn check_free(&self, block: Block) -> Result<(), UsageError> {
        match self.live.get(&block.offset()) {
            Some(&live) if live == block => Ok(()),
            Some(&live) => Err(UsageError::OrderMismatch { block, live }),
            None if self.freed.contains_key(&block.offset()) => {
                Err(UsageError::DoubleFree { block })
            }
            None => Err(UsageError::ForeignBlock { block }),
        }
    }
}

impl<'a, A: Allocator<'a>> Checked<A> {
    /// Free `block`, or report why freeing it would be misuse.
    ///
    /// On error the wrapped allocator is not touched. After
    /// [`destroy`](Allocator::destroy) every block is accepted and ignored.
    pub fn try_free(&mut self, block: Block) -> Result<(), UsageError> {
        if self.destroyed {
            return Ok(());
        }
        self.check_free(block)?;
        self.live.shift_remove(&block.offset());
        self.freed.insert(block.offset(), block);
        self.inner.free(block);
        Ok(())
    }
}

impl<'a, A: Allocator<'a>> Allocator<'a> for Checked<A> {
    fn create(memory: &'a mut [u8]) -> Result<Self, AllocError> {
        A::create(memory).map(Self::new)
    }

    fn alloc(&mut self, size: usize) -> Result<Block, AllocError> {
        let block = self.inner.alloc(size)?;
        self.freed.retain(|_, freed| !freed.overlaps(&block));
        self.live.insert(block.offset(), block);
        Ok(block)
    }

    /// # Panics
    ///
    /// Panics on a foreign block, a double free, or an order mismatch,
    /// unless the allocator has been destroyed.
    fn free(&mut self, block: impl Into<Option<Block>>) {
        if let Some(block) = block.into() {
            if let Err(err) = self.try_free(block) {
                panic!("allocator misuse: {err}");
            }
        }
    }

    fn destroy(&mut self) {
        self.destroyed = true;
        self.live.clear();
        self.freed.clear();
        self.inner.destroy();
    }

    /// # Panics
    ///
    /// Panics if `block` is not live.
    fn bytes(&self, block: Block) -> &[u8] {
        assert_eq!(self.live.get(&block.offset()), Some(&block), "{block} is not live");
        self.inner.bytes(block)
    }

    /// # Panics
    ///
    /// Panics if `block` is not live.
    fn bytes_mut(&mut self, block: Block) -> &mut [u8] {
        assert_eq!(self.live.get(&block.offset()), Some(&block), "{block} is not live");
        self.inner.bytes_mut(block)
    }

    fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    fn max_block_size(&self) -> usize {
        self.inner.max_block_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buddy::BuddyAllocator;
    use crate::segregated::SegregatedAllocator;

    #[test]
    fn valid_free_passes() {
        let mut memory = vec![0u8; 1024];
        let mut alloc = Checked::<BuddyAllocator<'_>>::create(&mut memory).unwrap();
        let a = alloc.alloc(100).unwrap();
        let b = alloc.alloc(100).unwrap();
        assert_eq!(alloc.live_count(), 2);
        assert_eq!(alloc.try_free(a), Ok(()));
        assert_eq!(alloc.live_blocks().collect::<Vec<_>>(), vec![b]);
        assert_eq!(alloc.try_free(b), Ok(()));
        assert_eq!(alloc.inner().free_blocks(10), 1);
    }

    #[test]
    fn double_free_is_reported() {
        let mut memory = vec![0u8; 1024];
        let mut alloc = Checked::<SegregatedAllocator<'_>>::create(&mut memory).unwrap();
        let a = alloc.alloc(64).unwrap();
        alloc.try_free(a).unwrap();
        assert_eq!(alloc.try_free(a), Err(UsageError::DoubleFree { block: a }));
        // The rejected free must not have corrupted the class list.
        assert_eq!(alloc.inner().free_blocks(a.order()), 1);
    }

    #[test]
    fn foreign_block_is_reported() {
        let mut memory = vec![0u8; 1024];
        let mut alloc = Checked::<BuddyAllocator<'_>>::create(&mut memory).unwrap();
        let _a = alloc.alloc(64).unwrap();
        let foreign = Block::new(512, 6);
        assert_eq!(
            alloc.try_free(foreign),
            Err(UsageError::ForeignBlock { block: foreign })
        );
    }

    #[test]
    fn order_mismatch_is_reported() {
        let mut memory = vec![0u8; 1024];
        let mut alloc = Checked::<BuddyAllocator<'_>>::create(&mut memory).unwrap();
        let a = alloc.alloc(64).unwrap();
        let wrong = Block::new(a.offset(), a.order() + 1);
        assert_eq!(
            alloc.try_free(wrong),
            Err(UsageError::OrderMismatch {
                block: wrong,
                live: a
            })
        );
    }

    #[test]
    fn reallocation_clears_double_free_record() {
        let mut memory = vec![0u8; 1024];
        let mut alloc = Checked::<BuddyAllocator<'_>>::create(&mut memory).unwrap();
        let a = alloc.alloc(64).unwrap();
        alloc.free(a);
        let b = alloc.alloc(1024).unwrap();
        assert_eq!(b.offset(), a.offset());
        assert_eq!(
            alloc.try_free(a),
            Err(UsageError::OrderMismatch { block: a, live: b })
        );
    }

    #[test]
    #[should_panic(expected = "allocator misuse")]
    fn trait_free_panics_on_misuse() {
        let mut memory = vec![0u8; 1024];
        let mut alloc = Checked::<BuddyAllocator<'_>>::create(&mut memory).unwrap();
        alloc.free(Block::new(0, 4));
    }

    #[test]
    fn free_after_destroy_is_noop() {
        let mut memory = vec![0u8; 4096];
        let mut alloc = Checked::<BuddyAllocator<'_>>::create(&mut memory).unwrap();
        let a = alloc.alloc(64).unwrap();
        alloc.destroy();
        alloc.free(a);
        assert_eq!(alloc.try_free(a), Ok(()));
        assert_eq!(alloc.try_free(Block::new(2048, 11)), Ok(()));
        alloc.destroy();
        assert_eq!(alloc.live_count(), 0);
        assert_eq!(alloc.capacity(), 0);
        assert!(alloc.alloc(64).is_err());
    }

    #[test]
    fn into_inner_keeps_allocator_state() {
        let mut memory = vec![0u8; 1024];
        let mut alloc = Checked::<SegregatedAllocator<'_>>::create(&mut memory).unwrap();
        let a = alloc.alloc(32).unwrap();
        alloc.free(a);
        let inner = alloc.into_inner();
        assert_eq!(inner.free_blocks(a.order()), 1);
        assert_eq!(inner.cursor(), 32);
    }

    #[test]
    fn free_none_is_noop() {
        let mut memory = vec![0u8; 1024];
        let mut alloc = Checked::<BuddyAllocator<'_>>::create(&mut memory).unwrap();
        alloc.free(None);
        assert_eq!(alloc.live_count(), 0);
    }
}
