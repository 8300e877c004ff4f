//! Test fixtures and invariant checks for Burrow development.
//!
//! Helpers shared by the allocator test suites: byte patterns that detect
//! when one block's writes leak into another, a disjointness check over a
//! set of live blocks, and a [`LiveSet`] that drives an allocator while
//! recording what it handed out.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use burrow_core::{AllocError, Allocator, Block};

/// Byte written at `index` of a block tagged `tag`.
///
/// Mixing the tag with the position makes neighbouring blocks (and shifted
/// copies of the same block) produce different bytes.
pub fn pattern_byte(tag: usize, index: usize) -> u8 {
    (tag.wrapping_mul(31) ^ index.wrapping_mul(7)) as u8
}

/// Fill `bytes` with the pattern for `tag`.
pub fn fill_pattern(bytes: &mut [u8], tag: usize) {
    for (i, b) in bytes.iter_mut().enumerate() {
        *b = pattern_byte(tag, i);
    }
}

/// Whether `bytes` still holds the pattern for `tag`.
pub fn has_pattern(bytes: &[u8], tag: usize) -> bool {
    bytes
        .iter()
        .enumerate()
        .all(|(i, &b)| b == pattern_byte(tag, i))
}

/// Panic if any two blocks overlap or any block leaves `0..arena_len`.
pub fn assert_disjoint_within(blocks: &[Block], arena_len: usize) {
    let mut sorted = blocks.to_vec();
    sorted.sort_by_key(|b| b.offset());
    for block in &sorted {
        assert!(
            block.end() <= arena_len,
            "{block} extends past the {arena_len}-byte arena"
        );
    }
    for pair in sorted.windows(2) {
        assert!(
            !pair[0].overlaps(&pair[1]),
            "{} overlaps {}",
            pair[0],
            pair[1]
        );
    }
}

/// Live blocks handed out by an allocator, each stamped with a pattern.
///
/// Every successful [`alloc`](LiveSet::alloc) fills the block with a
/// pattern keyed by a running tag; [`verify`](LiveSet::verify) checks that
/// no later allocation or free disturbed those bytes.
#[derive(Default)]
pub struct LiveSet {
    blocks: Vec<(Block, usize)>,
    next_tag: usize,
}

impl LiveSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate `size` bytes, stamp the block, and record it.
    pub fn alloc<'a, A: Allocator<'a>>(
        &mut self,
        allocator: &mut A,
        size: usize,
    ) -> Result<Block, AllocError> {
        let block = allocator.alloc(size)?;
        let tag = self.next_tag;
        self.next_tag += 1;
        fill_pattern(allocator.bytes_mut(block), tag);
        self.blocks.push((block, tag));
        Ok(block)
    }

    /// Free the `index`-th live block (modulo the live count).
    ///
    /// Returns the freed block, or `None` if nothing is live.
    pub fn free_nth<'a, A: Allocator<'a>>(
        &mut self,
        allocator: &mut A,
        index: usize,
    ) -> Option<Block> {
        if self.blocks.is_empty() {
            return None;
        }
        let (block, _) = self.blocks.swap_remove(index % self.blocks.len());
        allocator.free(block);
        Some(block)
    }

    /// Free every live block, oldest first.
    pub fn free_all<'a, A: Allocator<'a>>(&mut self, allocator: &mut A) {
        for (block, _) in self.blocks.drain(..) {
            allocator.free(block);
        }
    }

    /// Panic if live blocks overlap or any block lost its pattern.
    pub fn verify<'a, A: Allocator<'a>>(&self, allocator: &A) {
        let blocks = self.blocks();
        assert_disjoint_within(&blocks, allocator.capacity());
        for &(block, tag) in &self.blocks {
            assert!(
                has_pattern(allocator.bytes(block), tag),
                "{block} was overwritten while live"
            );
        }
    }

    /// The live blocks, in no particular order.
    pub fn blocks(&self) -> Vec<Block> {
        self.blocks.iter().map(|&(block, _)| block).collect()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Sum of live block sizes in bytes.
    pub fn live_bytes(&self) -> usize {
        self.blocks.iter().map(|(block, _)| block.size()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_round_trip() {
        let mut bytes = vec![0u8; 64];
        fill_pattern(&mut bytes, 3);
        assert!(has_pattern(&bytes, 3));
        assert!(!has_pattern(&bytes, 4));
    }

    #[test]
    fn disjoint_blocks_pass() {
        assert_disjoint_within(&[Block::new(16, 4), Block::new(0, 4)], 32);
    }

    #[test]
    #[should_panic(expected = "overlaps")]
    fn overlapping_blocks_panic() {
        assert_disjoint_within(&[Block::new(0, 5), Block::new(16, 4)], 64);
    }

    #[test]
    #[should_panic(expected = "extends past")]
    fn out_of_range_block_panics() {
        assert_disjoint_within(&[Block::new(32, 5)], 48);
    }
}
