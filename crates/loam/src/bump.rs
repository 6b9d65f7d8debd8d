//! The bump-region strategy: monotonic allocation from a fixed region.
//!
//! [`BumpRegion`] hands out consecutive aligned slices of a caller-supplied
//! byte region by advancing a cursor. Allocation is O(1) with no search and
//! no per-block bookkeeping; `deallocate` does not reclaim anything, the
//! whole region is released at once when the allocator is dropped. The
//! trade is deliberate: no individual frees in exchange for burst
//! allocation of values that live and die together.

use std::alloc::Layout;
use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;
use std::mem::MaybeUninit;
use std::ptr::NonNull;

use loam_core::align::{align_up, dangling_for};
use loam_core::{AllocError, MemoryResource, UpstreamPolicy};

/// Monotonic bump allocator over a caller-owned byte region.
///
/// The region is borrowed mutably for the allocator's lifetime: the caller
/// keeps ownership but cannot touch the bytes while the allocator lives.
/// Region contents are never read before being written through a returned
/// pointer, so an uninitialized buffer is the expected starting point:
///
/// ```
/// use std::alloc::Layout;
/// use std::mem::MaybeUninit;
/// use loam::{BumpRegion, MemoryResource};
///
/// let mut raw = [MaybeUninit::<u8>::uninit(); 1000];
/// let bump = BumpRegion::new(&mut raw);
///
/// let block = bump.allocate(Layout::from_size_align(64, 8).unwrap()).unwrap();
/// assert_eq!(block.as_ptr() as usize % 8, 0);
/// ```
///
/// The cursor lives in a [`Cell`] so containers can share the allocator by
/// `&` reference; the same `Cell` makes the type `!Sync`. This strategy is
/// deliberately single-threaded.
pub struct BumpRegion<'a> {
    /// Start of the backing region.
    base: NonNull<u8>,
    /// Region capacity in bytes.
    capacity: usize,
    /// Offset of the first free byte. Monotonically non-decreasing.
    cursor: Cell<usize>,
    /// What happens when the region cannot satisfy a request.
    upstream: UpstreamPolicy<'a>,
    /// Holds the exclusive region borrow for `'a`.
    _region: PhantomData<&'a mut [MaybeUninit<u8>]>,
}

impl<'a> BumpRegion<'a> {
    /// Create an allocator over `region` that fails on exhaustion.
    pub fn new(region: &'a mut [MaybeUninit<u8>]) -> Self {
        Self::with_upstream(region, UpstreamPolicy::Fail)
    }

    /// Create an allocator over `region` with an explicit exhaustion
    /// policy.
    ///
    /// With [`UpstreamPolicy::Delegate`], requests the region cannot hold
    /// are forwarded to the fallback resource; the fallback must outlive
    /// the allocator, like the region itself.
    pub fn with_upstream(region: &'a mut [MaybeUninit<u8>], upstream: UpstreamPolicy<'a>) -> Self {
        let capacity = region.len();
        let base = NonNull::new(region.as_mut_ptr().cast::<u8>())
            .expect("slice pointers are never null");
        Self {
            base,
            capacity,
            cursor: Cell::new(0),
            upstream,
            _region: PhantomData,
        }
    }

    /// Region capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes consumed so far, including alignment padding.
    pub fn used(&self) -> usize {
        self.cursor.get()
    }

    /// Bytes still available for future requests, before alignment.
    pub fn remaining(&self) -> usize {
        self.capacity - self.cursor.get()
    }

    /// Try to satisfy `layout` from the region. `None` means the region is
    /// exhausted for this request; the cursor is left untouched in that
    /// case.
    fn bump(&self, layout: Layout) -> Option<NonNull<u8>> {
        if layout.size() == 0 {
            // Valid for zero-size access only; consumes no region bytes.
            return Some(dangling_for(layout.align()));
        }
        let base = self.base.as_ptr() as usize;
        // base + cursor stays within one allocation, but stay checked:
        // an overflow must read as exhaustion, never as a wrap-around.
        let next = base.checked_add(self.cursor.get())?;
        let aligned = align_up(next, layout.align())?;
        let start = aligned - base;
        let end = start.checked_add(layout.size())?;
        if end > self.capacity {
            return None;
        }
        self.cursor.set(end);
        // SAFETY: start < end <= capacity, so the offset lands inside the
        // region borrow held by `_region`.
        let ptr = unsafe { self.base.as_ptr().add(start) };
        NonNull::new(ptr)
    }
}

impl MemoryResource for BumpRegion<'_> {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        if let Some(ptr) = self.bump(layout) {
            return Ok(ptr);
        }
        match self.upstream {
            UpstreamPolicy::Delegate(up) => up.allocate(layout),
            UpstreamPolicy::Fail => Err(AllocError::for_layout(layout)),
        }
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() == 0 {
            return;
        }
        // Blocks carved from the region are never individually reclaimed.
        // Blocks outside the region must have come from the upstream
        // (caller contract) and are handed back to it.
        let addr = ptr.as_ptr() as usize;
        let base = self.base.as_ptr() as usize;
        if addr < base || addr >= base + self.capacity {
            if let UpstreamPolicy::Delegate(up) = self.upstream {
                // SAFETY: forwarding the caller's own contract — the block
                // was allocated by `up` with this exact layout.
                unsafe { up.deallocate(ptr, layout) };
            }
        }
    }

    // is_equal: identity default. Two distinct regions never safely
    // interchange ownership of their blocks.
}

impl fmt::Debug for BumpRegion<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BumpRegion")
            .field("capacity", &self.capacity)
            .field("used", &self.cursor.get())
            .field("upstream", &self.upstream)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(len: usize) -> Vec<MaybeUninit<u8>> {
        vec![MaybeUninit::uninit(); len]
    }

    fn layout(size: usize, align: usize) -> Layout {
        Layout::from_size_align(size, align).unwrap()
    }

    #[test]
    fn sequential_blocks_are_disjoint_and_in_region() {
        let mut raw = region(256);
        let bump = BumpRegion::new(&mut raw);
        let base = bump.base.as_ptr() as usize;

        let a = bump.allocate(layout(32, 1)).unwrap().as_ptr() as usize;
        let b = bump.allocate(layout(64, 1)).unwrap().as_ptr() as usize;
        let c = bump.allocate(layout(16, 1)).unwrap().as_ptr() as usize;

        assert_eq!(a, base);
        assert_eq!(b, base + 32);
        assert_eq!(c, base + 96);
        assert!(c + 16 <= base + 256);
        assert_eq!(bump.used(), 112);
    }

    #[test]
    fn alignment_is_honored() {
        let mut raw = region(4096);
        let bump = BumpRegion::new(&mut raw);
        for shift in 0..8 {
            let align = 1usize << shift;
            // A 1-byte allocation first, to knock the cursor off alignment.
            bump.allocate(layout(1, 1)).unwrap();
            let ptr = bump.allocate(layout(8, align)).unwrap();
            assert_eq!(ptr.as_ptr() as usize % align, 0);
        }
    }

    #[test]
    fn over_aligned_request_skips_padding_bytes() {
        let mut raw = region(256);
        let bump = BumpRegion::new(&mut raw);
        bump.allocate(layout(1, 1)).unwrap();
        let before = bump.used();
        let ptr = bump.allocate(layout(8, 64)).unwrap();
        assert_eq!(ptr.as_ptr() as usize % 64, 0);
        // The cursor lands exactly at the end of the aligned block; the
        // skipped padding bytes are gone for good.
        let start = ptr.as_ptr() as usize - bump.base.as_ptr() as usize;
        assert!(start >= before);
        assert_eq!(bump.used(), start + 8);
    }

    #[test]
    fn exhaustion_fails_without_upstream() {
        let mut raw = region(64);
        let bump = BumpRegion::new(&mut raw);
        bump.allocate(layout(48, 1)).unwrap();
        let err = bump.allocate(layout(32, 1)).unwrap_err();
        assert_eq!(err.requested, 32);
        // The failed request left the cursor alone.
        assert_eq!(bump.used(), 48);
        // A smaller request still fits.
        assert!(bump.allocate(layout(16, 1)).is_ok());
    }

    #[test]
    fn request_larger_than_region_fails_cleanly() {
        let mut raw = region(64);
        let bump = BumpRegion::new(&mut raw);
        assert!(bump.allocate(layout(65, 1)).is_err());
        assert!(bump.allocate(layout(usize::MAX / 2, 1)).is_err());
        assert_eq!(bump.used(), 0);
    }

    #[test]
    fn zero_size_requests_are_aligned_and_free() {
        let mut raw = region(64);
        let bump = BumpRegion::new(&mut raw);
        for shift in 0..6 {
            let align = 1usize << shift;
            let ptr = bump.allocate(layout(0, align)).unwrap();
            assert_eq!(ptr.as_ptr() as usize % align, 0);
        }
        assert_eq!(bump.used(), 0);
    }

    #[test]
    fn deallocate_never_enables_reuse() {
        let mut raw = region(128);
        let bump = BumpRegion::new(&mut raw);
        let l = layout(64, 1);
        let first = bump.allocate(l).unwrap();
        // SAFETY: exact pointer and layout from the allocation above.
        unsafe { bump.deallocate(first, l) };
        let second = bump.allocate(l).unwrap();
        assert_ne!(first, second);
        assert_eq!(bump.used(), 128);
        assert!(bump.allocate(layout(1, 1)).is_err());
    }

    #[test]
    fn distinct_regions_are_never_equal() {
        let mut raw_a = region(64);
        let mut raw_b = region(64);
        let a = BumpRegion::new(&mut raw_a);
        let b = BumpRegion::new(&mut raw_b);
        assert!(a.is_equal(&a));
        assert!(b.is_equal(&b));
        assert!(!a.is_equal(&b));
        assert!(!b.is_equal(&a));
    }

    #[test]
    fn writes_land_in_the_region() {
        let mut raw = region(64);
        let bump = BumpRegion::new(&mut raw);
        let ptr = bump.allocate(layout(4, 4)).unwrap();
        // SAFETY: the block is 4 writable bytes inside the region.
        unsafe {
            ptr.as_ptr().cast::<u32>().write(0xdead_beef);
            assert_eq!(ptr.as_ptr().cast::<u32>().read(), 0xdead_beef);
        }
    }

    mod upstream {
        use super::*;
        use crate::system::system;

        /// Counts requests it forwards to the process heap.
        struct CountingUpstream {
            allocs: Cell<usize>,
            deallocs: Cell<usize>,
        }

        impl CountingUpstream {
            fn new() -> Self {
                Self {
                    allocs: Cell::new(0),
                    deallocs: Cell::new(0),
                }
            }
        }

        impl MemoryResource for CountingUpstream {
            fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
                self.allocs.set(self.allocs.get() + 1);
                system().allocate(layout)
            }

            unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
                self.deallocs.set(self.deallocs.get() + 1);
                // SAFETY: forwarding the caller's contract to the heap the
                // block came from.
                unsafe { system().deallocate(ptr, layout) };
            }
        }

        #[test]
        fn in_region_requests_never_reach_the_upstream() {
            let up = CountingUpstream::new();
            let mut raw = region(128);
            let bump = BumpRegion::with_upstream(&mut raw, UpstreamPolicy::Delegate(&up));
            bump.allocate(layout(64, 1)).unwrap();
            bump.allocate(layout(64, 1)).unwrap();
            assert_eq!(up.allocs.get(), 0);
        }

        #[test]
        fn exhausted_region_delegates() {
            let up = CountingUpstream::new();
            let mut raw = region(64);
            let bump = BumpRegion::with_upstream(&mut raw, UpstreamPolicy::Delegate(&up));
            bump.allocate(layout(64, 1)).unwrap();

            let l = layout(32, 8);
            let ptr = bump.allocate(l).unwrap();
            assert_eq!(up.allocs.get(), 1);

            // The delegated block is outside the region and flows back to
            // the upstream on deallocate.
            // SAFETY: exact pointer and layout from the allocation above.
            unsafe { bump.deallocate(ptr, l) };
            assert_eq!(up.deallocs.get(), 1);
        }

        #[test]
        fn delegated_failure_propagates() {
            struct Refusing(#[allow(dead_code)] u8);
            impl MemoryResource for Refusing {
                fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
                    Err(AllocError::for_layout(layout))
                }
                unsafe fn deallocate(&self, _ptr: NonNull<u8>, _layout: Layout) {}
            }

            let up = Refusing(0);
            let mut raw = region(16);
            let bump = BumpRegion::with_upstream(&mut raw, UpstreamPolicy::Delegate(&up));
            assert!(bump.allocate(layout(64, 1)).is_err());
        }
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn blocks_are_aligned_disjoint_and_contained(
                requests in proptest::collection::vec((1usize..64, 0u32..5), 1..32),
            ) {
                let mut raw = region(4096);
                let bump = BumpRegion::new(&mut raw);
                let base = bump.base.as_ptr() as usize;
                let mut live: Vec<(usize, usize)> = Vec::new();

                for (size, shift) in requests {
                    let align = 1usize << shift;
                    let l = Layout::from_size_align(size, align).unwrap();
                    let Ok(ptr) = bump.allocate(l) else {
                        // Exhausted: everything after this must also fail
                        // for at-least-as-large requests, which the unit
                        // tests cover. Stop here.
                        break;
                    };
                    let addr = ptr.as_ptr() as usize;
                    prop_assert_eq!(addr % align, 0);
                    prop_assert!(addr >= base);
                    prop_assert!(addr + size <= base + 4096);
                    for &(start, end) in &live {
                        prop_assert!(addr + size <= start || addr >= end);
                    }
                    live.push((addr, addr + size));
                }
            }

            #[test]
            fn used_never_decreases(
                requests in proptest::collection::vec(1usize..64, 1..64),
            ) {
                let mut raw = region(1024);
                let bump = BumpRegion::new(&mut raw);
                let mut last = 0;
                for size in requests {
                    let _ = bump.allocate(Layout::from_size_align(size, 1).unwrap());
                    prop_assert!(bump.used() >= last);
                    prop_assert!(bump.used() <= bump.capacity());
                    last = bump.used();
                }
            }
        }
    }
}
