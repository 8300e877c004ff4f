//! Block handles.
//!
//! A [`Block`] is an `(offset, order)` pair naming a power-of-two byte range
//! inside an arena. Allocators hand blocks out from `alloc` and take them
//! back in `free`; the order travels with the handle so no allocator ever
//! has to recover a block's size by inspecting its bytes.

use std::fmt;
use std::ops::Range;

use crate::order::{block_size, Order};

/// Location and size of an allocated block within an arena.
///
/// Blocks are plain values: copying one does not duplicate the underlying
/// memory, and dropping one does not release it. Pass the block back to
/// the allocator that produced it to free it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[must_use]
pub struct Block {
    /// Byte offset of the block from the start of the arena.
    pub(crate) offset: usize,
    /// Base-2 logarithm of the block size.
    pub(crate) order: Order,
}

impl Block {
    /// Create a block handle.
    ///
    /// Allocators create handles; callers normally only receive them.
    pub fn new(offset: usize, order: Order) -> Self {
        Self { offset, order }
    }

    /// Byte offset of the block from the start of the arena.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Base-2 logarithm of the block size.
    pub fn order(&self) -> Order {
        self.order
    }

    /// Size of the block in bytes.
    pub fn size(&self) -> usize {
        block_size(self.order)
    }

    /// One past the last byte of the block.
    pub fn end(&self) -> usize {
        self.offset + self.size()
    }

    /// Byte range of the block within the arena.
    pub fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }

    /// Whether two blocks share at least one byte.
    pub fn overlaps(&self, other: &Block) -> bool {
        self.offset < other.end() && other.offset < self.end()
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block@{}+{}", self.offset, self.size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_and_range_follow_order() {
        let block = Block::new(2048, 11);
        assert_eq!(block.size(), 2048);
        assert_eq!(block.end(), 4096);
        assert_eq!(block.range(), 2048..4096);
    }

    #[test]
    fn adjacent_blocks_do_not_overlap() {
        let a = Block::new(0, 4);
        let b = Block::new(16, 4);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn nested_blocks_overlap() {
        let outer = Block::new(0, 12);
        let inner = Block::new(1024, 4);
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn display_shows_offset_and_size() {
        assert_eq!(Block::new(32, 5).to_string(), "block@32+32");
    }
}
