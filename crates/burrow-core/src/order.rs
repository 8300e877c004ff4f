//! Power-of-two order arithmetic shared by every backend.
//!
//! An *order* is the base-2 logarithm of a block size: an order-11 block
//! spans 2048 bytes. Both allocators index their free-list tables by order
//! (the segregated ladder simply offsets it by its smallest class).

/// Base-2 logarithm of a block size.
pub type Order = u8;

/// Size of a machine word in bytes. Free-list links occupy whole words.
pub const WORD: usize = std::mem::size_of::<usize>();

/// Size in bytes of a block of the given order.
///
/// # Panics
///
/// Panics in debug builds if `order` does not fit in a `usize` shift.
#[inline]
pub fn block_size(order: Order) -> usize {
    debug_assert!((order as u32) < usize::BITS, "order {order} out of range");
    1usize << order
}

/// Smallest order whose block size is at least `size`.
///
/// Returns `None` for `size == 0` or when no power of two representable in
/// `usize` can hold `size`.
#[inline]
pub fn ceil_order(size: usize) -> Option<Order> {
    if size == 0 {
        return None;
    }
    size.checked_next_power_of_two().map(|p| p.trailing_zeros() as Order)
}

/// Largest order whose block size fits within `len` bytes.
///
/// Returns `None` for `len == 0`.
#[inline]
pub fn floor_order(len: usize) -> Option<Order> {
    if len == 0 {
        return None;
    }
    Some((usize::BITS - 1 - len.leading_zeros()) as Order)
}
