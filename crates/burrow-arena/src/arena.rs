//! Owned backing memory for allocators.
//!
//! [`Arena`] is the bootstrap side of the allocator contract: it acquires a
//! fixed, zeroed byte buffer up front and lends it to exactly one allocator
//! at a time. The allocator never grows or frees it; the arena outlives
//! every allocator built over it.

use burrow_core::AllocError;

/// A fixed-size, zero-initialised byte buffer.
pub struct Arena {
    data: Vec<u8>,
}

impl Arena {
    /// Acquire `size` bytes of zeroed memory.
    ///
    /// # Errors
    ///
    /// [`AllocError::MapFailure`] if the memory cannot be reserved.
    pub fn new(size: usize) -> Result<Self, AllocError> {
        let mut data = Vec::new();
        data.try_reserve_exact(size).map_err(|_| AllocError::MapFailure { size })?;
        data.resize(size, 0);
        Ok(Self { data })
    }

    /// Length of the arena in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the arena holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The arena bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// The arena bytes, for handing to an allocator's `create`.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }
}
