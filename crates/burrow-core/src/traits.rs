//! The allocator contract every backend implements.

use crate::block::Block;
use crate::error::AllocError;

/// A fixed-arena block allocator.
///
/// Implementations borrow an externally owned byte buffer for `'a` and carve
/// it into power-of-two [`Block`]s. The four lifecycle operations are
/// `create`, `alloc`, `free`, and `destroy`; callers written against this
/// trait work with any backend.
///
/// Allocators are single-owner. Every mutating operation takes `&mut self`
/// and none of them lock, so sharing one across threads requires the caller
/// to wrap it (e.g. in a single `Mutex`).
pub trait Allocator<'a>: Sized {
    /// Build an allocator over `memory` with the backend's default settings.
    ///
    /// The whole slice is the arena; its length is the arena size.
    ///
    /// # Errors
    ///
    /// [`AllocError::ArenaTooSmall`] if `memory` cannot hold the backend's
    /// smallest block.
    fn create(memory: &'a mut [u8]) -> Result<Self, AllocError>;

    /// Allocate a block of at least `size` bytes.
    ///
    /// The returned block is disjoint from every other block currently
    /// allocated from this allocator. A failed call leaves the allocator
    /// unchanged.
    ///
    /// # Errors
    ///
    /// [`AllocError::InvalidSize`] for `size == 0` or `size` above
    /// [`max_block_size`](Allocator::max_block_size); otherwise the
    /// backend's exhaustion error.
    fn alloc(&mut self, size: usize) -> Result<Block, AllocError>;

    /// Return a block to the allocator. Passing `None` is a no-op.
    ///
    /// The block must have been returned by [`alloc`](Allocator::alloc) on
    /// this allocator and not freed since. Anything else is a contract
    /// violation that is not checked at runtime.
    fn free(&mut self, block: impl Into<Option<Block>>);

    /// Release internal bookkeeping.
    ///
    /// The arena bytes are left untouched and remain the caller's. After
    /// `destroy`, allocation fails and `free` does nothing; calling
    /// `destroy` again is harmless.
    fn destroy(&mut self);

    /// Payload bytes of an allocated block.
    fn bytes(&self, block: Block) -> &[u8];

    /// Mutable payload bytes of an allocated block.
    fn bytes_mut(&mut self, block: Block) -> &mut [u8];

    /// Number of arena bytes under management.
    fn capacity(&self) -> usize;

    /// Largest request `alloc` accepts.
    fn max_block_size(&self) -> usize;
}
