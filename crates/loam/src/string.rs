//! A UTF-8 string that allocates through a memory resource.

use std::fmt;
use std::ops::Deref;
use std::str;

use loam_core::{AllocError, MemoryResource};

use crate::vec::RegionVec;

/// A UTF-8 string backed by a [`MemoryResource`].
///
/// There is no inline short-string representation: every non-empty
/// string's bytes live in a block handed out by the resource, so even a
/// one-byte string consumes resource space. That keeps the layout trivial
/// and makes the allocation traffic visible, which is the point of an
/// allocator-aware string.
///
/// As with [`RegionVec`], anything that may allocate is fallible.
pub struct RegionString<'a> {
    bytes: RegionVec<'a, u8>,
}

impl<'a> RegionString<'a> {
    /// Create an empty string that will allocate from `resource`.
    ///
    /// Does not allocate.
    pub fn new_in(resource: &'a dyn MemoryResource) -> Self {
        Self {
            bytes: RegionVec::new_in(resource),
        }
    }

    /// Copy `s` into a string allocated from `resource`.
    pub fn from_str_in(s: &str, resource: &'a dyn MemoryResource) -> Result<Self, AllocError> {
        let mut out = Self {
            bytes: RegionVec::with_capacity_in(s.len(), resource)?,
        };
        out.push_str(s)?;
        Ok(out)
    }

    /// Append `s`, growing through the resource if needed.
    pub fn push_str(&mut self, s: &str) -> Result<(), AllocError> {
        self.bytes.extend_from_slice(s.as_bytes())
    }

    /// Append a single character.
    pub fn push(&mut self, ch: char) -> Result<(), AllocError> {
        let mut buf = [0u8; 4];
        self.push_str(ch.encode_utf8(&mut buf))
    }

    /// View as `&str`.
    pub fn as_str(&self) -> &str {
        // SAFETY: the bytes only ever come from `&str` input, appended
        // whole, so they are always valid UTF-8.
        unsafe { str::from_utf8_unchecked(&self.bytes) }
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the string is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Capacity of the backing buffer in bytes.
    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    /// The resource this string allocates from.
    pub fn resource(&self) -> &'a dyn MemoryResource {
        self.bytes.resource()
    }
}

impl Deref for RegionString<'_> {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for RegionString<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for RegionString<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl PartialEq for RegionString<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for RegionString<'_> {}

impl PartialEq<str> for RegionString<'_> {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for RegionString<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}
