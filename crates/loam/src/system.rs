//! The process-heap capability.

use std::alloc::{self, Layout};
use std::ptr::NonNull;

use loam_core::align::dangling_for;
use loam_core::{AllocError, MemoryResource};

/// A memory resource backed by the global process heap.
///
/// Every instance draws from the same backing store, so equality is by
/// singleton: take the shared instance through [`system`] and the trait's
/// identity default gives the right answer. The usual role of this type is
/// the [`Delegate`](loam_core::UpstreamPolicy::Delegate) target of a
/// [`BumpRegion`](crate::BumpRegion) that is allowed to spill.
pub struct SystemResource {
    _private: (),
}

static SYSTEM: SystemResource = SystemResource { _private: () };

/// The shared process-heap resource.
pub fn system() -> &'static SystemResource {
    &SYSTEM
}

impl MemoryResource for SystemResource {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        if layout.size() == 0 {
            // The global allocator contract forbids zero-size requests.
            return Ok(dangling_for(layout.align()));
        }
        // SAFETY: layout has non-zero size, checked above.
        let ptr = unsafe { alloc::alloc(layout) };
        NonNull::new(ptr).ok_or_else(|| AllocError::for_layout(layout))
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() == 0 {
            // Zero-size blocks are dangling sentinels, nothing to free.
            return;
        }
        // SAFETY: caller contract — `ptr` came from `allocate` with this
        // exact layout, and non-zero size was checked at allocation time.
        unsafe { alloc::dealloc(ptr.as_ptr(), layout) };
    }
}
