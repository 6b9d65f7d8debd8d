//! Alignment arithmetic for region-based allocation strategies.
//!
//! Kept as plain functions on offsets and addresses so strategies can unit
//! test their placement math without touching real memory.

use std::ptr::NonNull;

/// Round `addr` up to the next multiple of `align`.
///
/// `align` must be a power of two. Returns `None` if rounding would
/// overflow `usize` — callers treat that the same as region exhaustion.
pub fn align_up(addr: usize, align: usize) -> Option<usize> {
    debug_assert!(align.is_power_of_two());
    let mask = align - 1;
    Some(addr.checked_add(mask)? & !mask)
}

/// A well-aligned sentinel pointer for zero-size allocations.
///
/// The pointer has no backing storage and is valid only for zero-size
/// access. `align` must be a power of two.
pub fn dangling_for(align: usize) -> NonNull<u8> {
    debug_assert!(align.is_power_of_two());
    // A power of two is never zero, so the address is never null.
    NonNull::new(align as *mut u8).expect("power-of-two alignment is non-zero")
}
