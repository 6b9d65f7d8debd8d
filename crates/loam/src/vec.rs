//! A growable vector that allocates through a memory resource.

use std::alloc::Layout;
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr::{self, NonNull};
use std::slice;

use loam_core::{AllocError, MemoryResource};

/// Smallest non-zero capacity a growth step will produce.
const MIN_NON_ZERO_CAP: usize = 4;

/// A contiguous growable array backed by a [`MemoryResource`].
///
/// The familiar `Vec` shape, narrowed to what region allocation supports:
/// every operation that may allocate is fallible, because the backing
/// resource may be a fixed region that runs out. The resource is held by
/// shared reference and must outlive the vector.
///
/// Growth allocates a fresh block, moves the elements across, and releases
/// the old block through the resource. Under the bump strategy that
/// release is a no-op — the old block is simply abandoned, which is the
/// strategy's documented trade.
pub struct RegionVec<'a, T> {
    ptr: NonNull<T>,
    cap: usize,
    len: usize,
    resource: &'a dyn MemoryResource,
    _marker: PhantomData<T>,
}

impl<'a, T> RegionVec<'a, T> {
    const ELEM: usize = mem::size_of::<T>();

    /// Create an empty vector that will allocate from `resource`.
    ///
    /// Does not allocate. Zero-sized element types never allocate at all.
    pub fn new_in(resource: &'a dyn MemoryResource) -> Self {
        Self {
            ptr: NonNull::dangling(),
            cap: if Self::ELEM == 0 { usize::MAX } else { 0 },
            len: 0,
            resource,
            _marker: PhantomData,
        }
    }

    /// Create a vector with room for exactly `cap` elements.
    pub fn with_capacity_in(cap: usize, resource: &'a dyn MemoryResource) -> Result<Self, AllocError> {
        let mut v = Self::new_in(resource);
        if cap > v.cap {
            v.grow_to(cap)?;
        }
        Ok(v)
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the vector holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of elements the current buffer can hold.
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// The resource this vector allocates from.
    pub fn resource(&self) -> &'a dyn MemoryResource {
        self.resource
    }

    /// View the elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: the first `len` slots are initialized; for len == 0 the
        // dangling pointer is valid for an empty slice.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// View the elements as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as for `as_slice`, with exclusive access through `self`.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Ensure capacity for at least `additional` more elements.
    ///
    /// Grows geometrically, so a push loop does O(log n) allocations.
    pub fn reserve(&mut self, additional: usize) -> Result<(), AllocError> {
        let needed = self.len.checked_add(additional).ok_or(AllocError {
            requested: usize::MAX,
            align: mem::align_of::<T>(),
        })?;
        if needed <= self.cap {
            return Ok(());
        }
        let new_cap = needed.max(self.cap.saturating_mul(2)).max(MIN_NON_ZERO_CAP);
        self.grow_to(new_cap)
    }

    /// Append an element, growing through the resource if needed.
    ///
    /// On failure the vector is unchanged and `value` is dropped with the
    /// error's return.
    pub fn push(&mut self, value: T) -> Result<(), AllocError> {
        if self.len == self.cap {
            self.reserve(1)?;
        }
        // SAFETY: len < cap after the reserve, so the slot is inside the
        // allocated block (or T is zero-sized and the write is a no-op).
        unsafe { ptr::write(self.ptr.as_ptr().add(self.len), value) };
        self.len += 1;
        Ok(())
    }

    /// Remove and return the last element.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: the slot at the old last index was initialized by push.
        Some(unsafe { ptr::read(self.ptr.as_ptr().add(self.len)) })
    }

    /// Drop every element, keeping the buffer.
    pub fn clear(&mut self) {
        let len = self.len;
        // Guard against observing dropped elements if a destructor panics.
        self.len = 0;
        // SAFETY: the first `len` slots were initialized and are now out
        // of reach of safe code.
        unsafe { ptr::drop_in_place(slice::from_raw_parts_mut(self.ptr.as_ptr(), len)) };
    }

    /// Append a copy of every element in `src`.
    pub fn extend_from_slice(&mut self, src: &[T]) -> Result<(), AllocError>
    where
        T: Copy,
    {
        self.reserve(src.len())?;
        // SAFETY: capacity was reserved, and a fresh tail can never
        // overlap a caller-visible slice.
        unsafe {
            ptr::copy_nonoverlapping(src.as_ptr(), self.ptr.as_ptr().add(self.len), src.len());
        }
        self.len += src.len();
        Ok(())
    }

    /// Move every element of `other` to the end of `self`, leaving `other`
    /// empty.
    ///
    /// When `self` holds no elements and both vectors draw from equal
    /// resources, the buffer changes owner without copying — this is what
    /// [`MemoryResource::is_equal`] exists for. Otherwise the elements are
    /// moved block-wise, which may allocate.
    pub fn append(&mut self, other: &mut Self) -> Result<(), AllocError> {
        if self.len == 0 && self.resource.is_equal(other.resource) {
            // Equal resources may deallocate each other's blocks, so the
            // buffers can swap owners outright.
            mem::swap(&mut self.ptr, &mut other.ptr);
            mem::swap(&mut self.cap, &mut other.cap);
            mem::swap(&mut self.len, &mut other.len);
            return Ok(());
        }
        self.reserve(other.len)?;
        // SAFETY: room for `other.len` more elements was reserved, the two
        // buffers are disjoint, and `other.len` is cleared before the
        // moved-out slots can be observed again.
        unsafe {
            ptr::copy_nonoverlapping(
                other.ptr.as_ptr(),
                self.ptr.as_ptr().add(self.len),
                other.len,
            );
        }
        self.len += other.len;
        other.len = 0;
        Ok(())
    }

    /// Replace the buffer with one of `new_cap` elements.
    fn grow_to(&mut self, new_cap: usize) -> Result<(), AllocError> {
        debug_assert!(new_cap > self.cap);
        debug_assert!(Self::ELEM != 0, "zero-sized elements never grow");
        let new_layout = Layout::array::<T>(new_cap).map_err(|_| AllocError {
            requested: new_cap.saturating_mul(Self::ELEM),
            align: mem::align_of::<T>(),
        })?;
        let new_ptr = self.resource.allocate(new_layout)?.cast::<T>();
        if self.len > 0 {
            // SAFETY: both blocks hold at least `len` elements, and the
            // resource never returns a block overlapping a live one.
            unsafe { ptr::copy_nonoverlapping(self.ptr.as_ptr(), new_ptr.as_ptr(), self.len) };
        }
        if self.cap > 0 {
            let old_layout =
                Layout::array::<T>(self.cap).expect("old capacity fit a layout when allocated");
            // SAFETY: exact pointer and layout of the previous allocation.
            unsafe { self.resource.deallocate(self.ptr.cast::<u8>(), old_layout) };
        }
        self.ptr = new_ptr;
        self.cap = new_cap;
        Ok(())
    }
}

impl<T> Drop for RegionVec<'_, T> {
    fn drop(&mut self) {
        self.clear();
        if Self::ELEM != 0 && self.cap > 0 {
            let layout =
                Layout::array::<T>(self.cap).expect("capacity fit a layout when allocated");
            // SAFETY: exact pointer and layout of the live allocation;
            // elements were dropped by `clear`.
            unsafe { self.resource.deallocate(self.ptr.cast::<u8>(), layout) };
        }
    }
}

impl<T> Deref for RegionVec<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for RegionVec<'_, T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: fmt::Debug> fmt::Debug for RegionVec<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}
