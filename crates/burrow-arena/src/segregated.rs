//! Segregated size-class free-list allocator.
//!
//! Requests are rounded up to the nearest class on a doubling ladder
//! (16, 32, ..., 4096 bytes by default). Each class keeps its own singly
//! linked free list threaded through the freed blocks. A request whose
//! list is empty is bump-allocated from a cursor that only ever moves
//! forward, so once the cursor reaches the end of the arena the free
//! lists are the only remaining source of blocks.
//!
//! ```text
//! arena: [ 16 | 16 | 4096 ............ | 32 | 16 |      unused       ]
//!                                                 ^ cursor
//! free_lists[0] (16B):  ─► 16 ─► 0 ─► NIL
//! free_lists[1] (32B):  NIL
//! ```
//!
//! Classes never merge: a freed 16-byte block only ever satisfies later
//! 16-byte-class requests.

use burrow_core::{block_size, ceil_order, AllocError, Allocator, Block, Order};
use log::{debug, trace};
use smallvec::{smallvec, SmallVec};

use crate::config::SegregatedConfig;
use crate::link::{self, NIL};

/// Size-class allocator over a borrowed arena.
pub struct SegregatedAllocator<'a> {
    memory: &'a mut [u8],
    config: SegregatedConfig,
    /// Head offset of each class's free list, `NIL` when empty.
    free_lists: SmallVec<[usize; 16]>,
    /// Bump pointer: offset of the next never-used byte.
    cursor: usize,
    /// Bytes under management; zero once destroyed.
    total_size: usize,
}

impl<'a> SegregatedAllocator<'a> {
    /// Build an allocator over `memory` with the given class ladder.
    ///
    /// # Errors
    ///
    /// [`AllocError::ArenaTooSmall`] if `memory` cannot hold one block of
    /// the smallest class.
    pub fn with_config(memory: &'a mut [u8], config: SegregatedConfig) -> Result<Self, AllocError> {
        let size = memory.len();
        if size < config.min_class() {
            return Err(AllocError::ArenaTooSmall {
                size,
                minimum: config.min_class(),
            });
        }
        debug!(
            "segregated allocator over {size} bytes, classes {}..={} bytes",
            config.min_class(),
            config.max_class()
        );
        Ok(Self {
            memory,
            config,
            free_lists: smallvec![NIL; config.class_count()],
            cursor: 0,
            total_size: size,
        })
    }

    /// The class ladder in use.
    pub fn config(&self) -> &SegregatedConfig {
        &self.config
    }

    /// Index of the smallest class that holds `size` bytes.
    ///
    /// Returns `None` for zero or for sizes above the largest class.
    pub fn class_of(&self, size: usize) -> Option<usize> {
        if size > self.config.max_class() {
            return None;
        }
        let order = ceil_order(size)?.max(self.config.min_order());
        Some((order - self.config.min_order()) as usize)
    }

    /// Size in bytes of class `class`, or `None` past the top of the ladder.
    pub fn class_size(&self, class: usize) -> Option<usize> {
        (class < self.free_lists.len()).then(|| block_size(self.class_order(class)))
    }

    /// Offset of the bump cursor.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of blocks waiting on the free list for blocks of `order`.
    pub fn free_blocks(&self, order: Order) -> usize {
        match self.class_index(order) {
            Some(class) => link::walk(self.memory, self.free_lists[class]).count(),
            None => 0,
        }
    }

    /// Bytes available without advancing past the arena end: recycled
    /// blocks plus the untouched tail behind the cursor.
    pub fn free_bytes(&self) -> usize {
        let recycled: usize = (0..self.free_lists.len())
            .map(|class| {
                let count = link::walk(self.memory, self.free_lists[class]).count();
                count * block_size(self.class_order(class))
            })
            .sum();
        recycled + (self.total_size - self.cursor)
    }

    fn class_order(&self, class: usize) -> Order {
        self.config.min_order() + class as Order
    }

    fn class_index(&self, order: Order) -> Option<usize> {
        let class = order.checked_sub(self.config.min_order())? as usize;
        (class < self.free_lists.len()).then_some(class)
    }

    fn is_destroyed(&self) -> bool {
        self.total_size == 0
    }
}

impl<'a> Allocator<'a> for SegregatedAllocator<'a> {
    fn create(memory: &'a mut [u8]) -> Result<Self, AllocError> {
        Self::with_config(memory, SegregatedConfig::default())
    }

    fn alloc(&mut self, size: usize) -> Result<Block, AllocError> {
        let class = self.class_of(size).ok_or(AllocError::InvalidSize {
            requested: size,
            max: self.config.max_class(),
        })?;
        let order = self.class_order(class);

        let head = self.free_lists[class];
        if head != NIL {
            self.free_lists[class] = link::next(self.memory, head);
            trace!("recycled {}-byte block at {head}", block_size(order));
            return Ok(Block::new(head, order));
        }

        let needed = block_size(order);
        let remaining = self.total_size - self.cursor;
        if needed > remaining {
            debug!("arena exhausted: {needed}-byte class, {remaining} bytes left");
            return Err(AllocError::ArenaExhausted {
                requested: needed,
                remaining,
            });
        }
        let offset = self.cursor;
        self.cursor += needed;
        Ok(Block::new(offset, order))
    }

    fn free(&mut self, block: impl Into<Option<Block>>) {
        let Some(block) = block.into() else {
            return;
        };
        if self.is_destroyed() {
            return;
        }
        debug_assert!(
            block.end() <= self.cursor,
            "{block} was never handed out by this allocator"
        );
        let class = self.class_index(block.order());
        debug_assert!(class.is_some(), "{block} is not on the class ladder");
        let Some(class) = class else {
            return;
        };
        link::set_next(self.memory, block.offset(), self.free_lists[class]);
        self.free_lists[class] = block.offset();
    }

    fn destroy(&mut self) {
        if self.is_destroyed() {
            return;
        }
        debug!("segregated allocator destroyed, cursor was at {}", self.cursor);
        self.free_lists.fill(NIL);
        self.cursor = 0;
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
        self.config.max_class()
    }
}
