//! The polymorphic allocation capability.

use std::alloc::Layout;
use std::fmt;
use std::ptr::NonNull;

use crate::error::AllocError;

/// The capability every memory provider implements.
///
/// Containers that want to be allocator-aware hold a `&dyn MemoryResource`
/// and route every internal allocation through it instead of the global
/// allocator. The trait is a single-level seam: concrete strategies
/// implement it directly, nothing sits behind it.
///
/// Allocation takes `&self`. Strategies with mutable state (a bump cursor,
/// say) use interior mutability, so several containers can share one
/// provider by plain reference.
pub trait MemoryResource {
    /// Allocate at least `layout.size()` bytes aligned to `layout.align()`.
    ///
    /// Never returns a short allocation: on success the full request is
    /// satisfied, otherwise the failure surfaces as [`AllocError`]. A
    /// zero-size request still returns a valid pointer aligned for
    /// `layout.align()`, with no backing storage behind it.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Release a block previously returned by
    /// [`allocate`](MemoryResource::allocate).
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `allocate` on this resource, or on
    /// one equal to it under [`is_equal`](MemoryResource::is_equal), with
    /// this exact `layout`. Passing a mismatched pointer, size, or
    /// alignment is undefined behavior; nothing is validated.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

    /// Whether memory allocated by `self` may be deallocated by `other`.
    ///
    /// Containers use this to decide if a buffer can change owners without
    /// being copied. Defaults to address identity — the only safe answer
    /// for strategies with per-instance backing storage. Strategies that
    /// share one backing store get the right answer by exposing a
    /// singleton instance instead of overriding.
    fn is_equal(&self, other: &dyn MemoryResource) -> bool {
        let this: *const Self = self;
        std::ptr::addr_eq(this, other as *const dyn MemoryResource)
    }
}

/// What a region-backed strategy does when its region is exhausted.
///
/// Fixed at construction and never changed afterwards. The always-failing
/// variant replaces the "null upstream" pattern: disabling fallback is an
/// explicit configuration value, not a special-cased null pointer.
#[derive(Clone, Copy)]
pub enum UpstreamPolicy<'up> {
    /// Report [`AllocError`] to the caller.
    Fail,
    /// Forward the request to a fallback resource.
    Delegate(&'up dyn MemoryResource),
}

impl fmt::Debug for UpstreamPolicy<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fail => f.write_str("Fail"),
            Self::Delegate(up) => write!(f, "Delegate({:p})", *up),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A resource that refuses every request. Only `is_equal` matters
    /// here. Deliberately not zero-sized so distinct instances have
    /// distinct addresses.
    struct Refusing(#[allow(dead_code)] u8);

    impl MemoryResource for Refusing {
        fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
            Err(AllocError::for_layout(layout))
        }

        unsafe fn deallocate(&self, _ptr: NonNull<u8>, _layout: Layout) {}
    }

    #[test]
    fn default_equality_is_reflexive() {
        let a = Refusing(0);
        assert!(a.is_equal(&a));
    }

    #[test]
    fn default_equality_distinguishes_instances() {
        let a = Refusing(0);
        let b = Refusing(0);
        assert!(!a.is_equal(&b));
        assert!(!b.is_equal(&a));
    }

    #[test]
    fn equality_holds_through_trait_objects() {
        let a = Refusing(0);
        let via_dyn: &dyn MemoryResource = &a;
        assert!(a.is_equal(via_dyn));
        assert!(via_dyn.is_equal(&a));
    }

    #[test]
    fn upstream_policy_debug_names_the_variant() {
        assert_eq!(format!("{:?}", UpstreamPolicy::Fail), "Fail");
        let up = Refusing(0);
        let rendered = format!("{:?}", UpstreamPolicy::Delegate(&up));
        assert!(rendered.starts_with("Delegate("));
    }
}
