//! Region-backed bump allocation behind a polymorphic capability.
//!
//! # Architecture
//!
//! ```text
//! &mut [MaybeUninit<u8>]          (caller-owned, deliberately uninitialized)
//! └── BumpRegion                  (monotonic cursor + UpstreamPolicy)
//!     ├── implements MemoryResource (allocate / deallocate / is_equal)
//!     └── on exhaustion: Fail, or Delegate → e.g. SystemResource
//!
//! RegionVec<T> / RegionString    (allocator-aware containers)
//! └── hold &dyn MemoryResource, route every buffer through it
//! ```
//!
//! The trait and its core types live in `loam-core` and are re-exported
//! here. This crate is the workspace's home of bounded `unsafe`: pointer
//! arithmetic on the region and raw buffer management in the containers,
//! each operation behind a `// SAFETY:` comment.
//!
//! # Typical use
//!
//! Carve a fixed buffer on the stack, allocate a burst of values that live
//! and die together, let the whole region go at once:
//!
//! ```
//! use std::mem::MaybeUninit;
//! use loam::{BumpRegion, RegionString, RegionVec};
//!
//! let mut raw = [MaybeUninit::<u8>::uninit(); 1000];
//! let bump = BumpRegion::new(&mut raw);
//!
//! let mut strings = RegionVec::new_in(&bump);
//! strings.push(RegionString::from_str_in("routed through the region", &bump)?)?;
//! assert_eq!(&strings[0], "routed through the region");
//! # Ok::<(), loam::AllocError>(())
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod bump;
pub mod string;
pub mod system;
pub mod vec;

pub use bump::BumpRegion;
pub use loam_core::{align, AllocError, MemoryResource, UpstreamPolicy};
pub use string::RegionString;
pub use system::{system, SystemResource};
pub use vec::RegionVec;
