//! Binary buddy allocator.
//!
//! The arena is treated as a tree of power-of-two blocks. An allocation
//! takes the smallest free block that fits and halves it until it matches
//! the request, pushing each upper half onto the free list one order down
//! and keeping the lower half. A release looks up the block's *buddy*
//! (its sibling from the split one order up, at `offset ^ size`) and, if
//! the buddy is free at the same order, merges the two and repeats one
//! order higher.
//!
//! ```text
//! order 12  [               4096               ]
//! order 11  [      2048       |      2048      ]   alloc(2048) keeps the
//!            ^ returned          ^ free list        lower half
//! ```
//!
//! Free lists are doubly linked through the free blocks so a buddy can be
//! unlinked in O(1). Whether a buddy is free, and at which order, is kept
//! in a side table outside the arena: the bytes of an allocated block
//! belong to the caller and are never interpreted by the allocator.
//!
//! Every block's offset is a multiple of its own size. Splitting preserves
//! this, and it is what makes `offset ^ size` the buddy.

use burrow_core::{block_size, ceil_order, floor_order, AllocError, Allocator, Block, Order};
use log::{debug, trace};
use smallvec::{smallvec, SmallVec};

use crate::config::BuddyConfig;
use crate::link::{self, NIL};

/// Side-table marker for "no free block starts here".
const NOT_FREE: Order = Order::MAX;

/// Buddy allocator over a borrowed arena.
pub struct BuddyAllocator<'a> {
    memory: &'a mut [u8],
    min_order: Order,
    max_order: Order,
    /// Bytes covered by the initial top-level blocks; zero once destroyed.
    total_size: usize,
    /// Head offset of each order's free list, indexed by order.
    free_lists: SmallVec<[usize; 32]>,
    /// Order of the free block starting at each `min_block` slot, or `NOT_FREE`.
    free_order: Vec<Order>,
}

impl<'a> BuddyAllocator<'a> {
    /// Build an allocator over `memory` with the given block bounds.
    ///
    /// A power-of-two arena starts as one free block. Any other length is
    /// carved into the largest aligned power-of-two blocks that fit, largest
    /// first; a tail shorter than `min_block` is left unmanaged.
    ///
    /// # Errors
    ///
    /// [`AllocError::ArenaTooSmall`] if `memory` is shorter than one
    /// `min_block`.
    pub fn with_config(memory: &'a mut [u8], config: BuddyConfig) -> Result<Self, AllocError> {
        let len = memory.len();
        let min_order = config.min_order();
        let top = match floor_order(len) {
            Some(top) if top >= min_order => top,
            _ => {
                return Err(AllocError::ArenaTooSmall {
                    size: len,
                    minimum: config.min_block(),
                })
            }
        };
        let max_order = config.max_order().map_or(top, |cap| cap.min(top));

        let mut this = Self {
            memory,
            min_order,
            max_order,
            total_size: 0,
            free_lists: smallvec![NIL; max_order as usize + 1],
            free_order: vec![NOT_FREE; len >> min_order],
        };

        let mut offset = 0;
        let mut order = max_order;
        loop {
            while len - offset >= block_size(order) {
                this.push(offset, order);
                offset += block_size(order);
            }
            if order == min_order {
                break;
            }
            order -= 1;
        }
        this.total_size = offset;

        debug!(
            "buddy allocator over {len} bytes ({offset} managed), orders {min_order}..={max_order}"
        );
        Ok(this)
    }

    /// Order of the smallest block.
    pub fn min_order(&self) -> Order {
        self.min_order
    }

    /// Order of the largest block.
    pub fn max_order(&self) -> Order {
        self.max_order
    }

    /// Number of free blocks of exactly `order`.
    pub fn free_blocks(&self, order: Order) -> usize {
        match self.free_lists.get(order as usize) {
            Some(&head) => link::walk(self.memory, head).count(),
            None => 0,
        }
    }

    /// Total bytes held in free blocks across all orders.
    pub fn free_bytes(&self) -> usize {
        (self.min_order..=self.max_order)
            .map(|order| self.free_blocks(order) * block_size(order))
            .sum()
    }

    /// Order of the largest free block, if any.
    pub fn largest_free_order(&self) -> Option<Order> {
        (self.min_order..=self.max_order)
            .rev()
            .find(|&order| self.free_lists[order as usize] != NIL)
    }

    fn slot(&self, offset: usize) -> usize {
        offset >> self.min_order
    }

    /// Link a free block at the head of its order's list.
    fn push(&mut self, offset: usize, order: Order) {
        let head = self.free_lists[order as usize];
        link::set_next(self.memory, offset, head);
        link::set_prev(self.memory, offset, NIL);
        if head != NIL {
            link::set_prev(self.memory, head, offset);
        }
        self.free_lists[order as usize] = offset;
        let slot = self.slot(offset);
        self.free_order[slot] = order;
    }

    /// Remove a free block from anywhere in its order's list.
    fn unlink(&mut self, offset: usize, order: Order) {
        let next = link::next(self.memory, offset);
        let prev = link::prev(self.memory, offset);
        if prev == NIL {
            self.free_lists[order as usize] = next;
        } else {
            link::set_next(self.memory, prev, next);
        }
        if next != NIL {
            link::set_prev(self.memory, next, prev);
        }
        let slot = self.slot(offset);
        self.free_order[slot] = NOT_FREE;
    }

    fn is_destroyed(&self) -> bool {
        self.total_size == 0
    }
}

impl<'a> Allocator<'a> for BuddyAllocator<'a> {
    fn create(memory: &'a mut [u8]) -> Result<Self, AllocError> {
        Self::with_config(memory, BuddyConfig::default())
    }

    fn alloc(&mut self, size: usize) -> Result<Block, AllocError> {
        let invalid = AllocError::InvalidSize {
            requested: size,
            max: self.max_block_size(),
        };
        if size > self.max_block_size() {
            return Err(invalid);
        }
        let wanted = match ceil_order(size) {
            Some(order) => order.max(self.min_order),
            None => return Err(invalid),
        };

        let Some(found) =
            (wanted..=self.max_order).find(|&order| self.free_lists[order as usize] != NIL)
        else {
            debug!("no free block of order {wanted} or above");
            return Err(AllocError::NoFitFound {
                requested: block_size(wanted),
            });
        };

        let offset = self.free_lists[found as usize];
        self.unlink(offset, found);
        let mut order = found;
        while order > wanted {
            order -= 1;
            let upper = offset + block_size(order);
            trace!("split order {} at {offset}, upper half {upper}", order + 1);
            self.push(upper, order);
        }
        Ok(Block::new(offset, wanted))
    }

    fn free(&mut self, block: impl Into<Option<Block>>) {
        let Some(block) = block.into() else {
            return;
        };
        if self.is_destroyed() {
            return;
        }
        debug_assert!(
            (self.min_order..=self.max_order).contains(&block.order())
                && block.end() <= self.total_size
                && block.offset() % block.size() == 0,
            "{block} was never handed out by this allocator"
        );

        let mut offset = block.offset();
        let mut order = block.order();
        while order < self.max_order {
            let size = block_size(order);
            let buddy = offset ^ size;
            if buddy + size > self.total_size {
                break;
            }
            if self.free_order[self.slot(buddy)] != order {
                break;
            }
            self.unlink(buddy, order);
            trace!("coalesce order {order} at {offset} with buddy {buddy}");
            offset = offset.min(buddy);
            order += 1;
        }
        self.push(offset, order);
    }

    fn destroy(&mut self) {
        if self.is_destroyed() {
            return;
        }
        debug!(
            "buddy allocator destroyed with {} of {} bytes free",
            self.free_bytes(),
            self.total_size
        );
        self.free_lists.fill(NIL);
        self.free_order = Vec::new();
        self.total_size = 0;
    }

    fn bytes(&self, block: Block) -> &[u8] {
        &self.memory[block.range()]
    }

    fn bytes_mut(&mut self, block: Block) -> &mut [u8] {
        &mut self.memory[block.range()]
    }

    fn capacity(&self) -> usize {
        self.total_size
    }

    fn max_block_size(&self) -> usize {
        block_size(self.max_order)
    }
}
