//! Allocation failure type.

use std::alloc::Layout;
use std::error::Error;
use std::fmt;

/// Error returned when a memory resource cannot satisfy a request.
///
/// A resource never returns a short allocation: either the full request
/// succeeds or the failure surfaces as this error, carrying the request
/// that could not be met. Strategies with no recovery path of their own
/// (the common case) simply propagate it to their caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllocError {
    /// Number of bytes requested.
    pub requested: usize,
    /// Requested alignment in bytes (a power of two).
    pub align: usize,
}

impl AllocError {
    /// Build an error describing a failed request for `layout`.
    pub fn for_layout(layout: Layout) -> Self {
        Self {
            requested: layout.size(),
            align: layout.align(),
        }
    }
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "allocation failed: {} bytes aligned to {}",
            self.requested, self.align
        )
    }
}

impl Error for AllocError {}
