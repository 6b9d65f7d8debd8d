//! Core capability trait and types for the loam memory-resource workspace.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! polymorphic allocation contract ([`MemoryResource`]), the allocation
//! failure type ([`AllocError`]), the exhaustion policy
//! ([`UpstreamPolicy`]), and the alignment arithmetic shared by concrete
//! strategies.
//!
//! Concrete strategies and allocator-aware containers live in the `loam`
//! crate; this one stays dependency-free so any provider can implement the
//! contract without pulling in a strategy it does not use.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod align;
pub mod error;
pub mod resource;

pub use error::AllocError;
pub use resource::{MemoryResource, UpstreamPolicy};
