//! Intrusive free-list links stored inside free blocks.
//!
//! A free block's first word holds the offset of the next free block of
//! the same size; buddy blocks also keep the previous offset in their
//! second word. Links are offsets from the arena start, never addresses,
//! and [`NIL`] ends a list. They are only read while the block is free.

use burrow_core::WORD;

/// Offset value that terminates a free list.
pub(crate) const NIL: usize = usize::MAX;

fn read_word(memory: &[u8], at: usize) -> usize {
    let mut word = [0u8; WORD];
    word.copy_from_slice(&memory[at..at + WORD]);
    usize::from_ne_bytes(word)
}

fn write_word(memory: &mut [u8], at: usize, value: usize) {
    memory[at..at + WORD].copy_from_slice(&value.to_ne_bytes());
}

/// Offset of the block after the free block at `block`.
pub(crate) fn next(memory: &[u8], block: usize) -> usize {
    read_word(memory, block)
}

pub(crate) fn set_next(memory: &mut [u8], block: usize, next: usize) {
    write_word(memory, block, next);
}

/// Offset of the block before the free block at `block` (doubly linked lists only).
pub(crate) fn prev(memory: &[u8], block: usize) -> usize {
    read_word(memory, block + WORD)
}

pub(crate) fn set_prev(memory: &mut [u8], block: usize, prev: usize) {
    write_word(memory, block + WORD, prev);
}

/// Iterate the offsets of a free list starting at `head`.
pub(crate) fn walk(memory: &[u8], head: usize) -> impl Iterator<Item = usize> + '_ {
    std::iter::successors((head != NIL).then_some(head), move |&block| {
        let next = next(memory, block);
        (next != NIL).then_some(next)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_round_trip_through_bytes() {
        let mut memory = vec![0u8; 64];
        set_next(&mut memory, 16, 48);
        set_prev(&mut memory, 16, NIL);
        assert_eq!(next(&memory, 16), 48);
        assert_eq!(prev(&memory, 16), NIL);
    }

    #[test]
    fn walk_follows_next_links() {
        let mut memory = vec![0u8; 64];
        set_next(&mut memory, 0, 32);
        set_next(&mut memory, 32, 16);
        set_next(&mut memory, 16, NIL);
        let offsets: Vec<_> = walk(&memory, 0).collect();
        assert_eq!(offsets, vec![0, 32, 16]);
    }

    #[test]
    fn walk_of_empty_list_yields_nothing() {
        let memory = vec![0u8; 16];
        assert_eq!(walk(&memory, NIL).count(), 0);
    }
}
