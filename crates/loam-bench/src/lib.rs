//! Benchmark workloads for the loam memory-resource workspace.
//!
//! Provides deterministic allocation traffic shared by the criterion
//! benches, so bump-region and process-heap numbers are measured against
//! identical request streams.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::alloc::Layout;

/// A deterministic stream of mixed small-object layouts.
///
/// Sizes cycle through 8..=120 bytes with alignments of 1, 2, 4, and 8 —
/// the profile of building a batch of strings and small containers.
pub fn mixed_layouts(n: usize) -> Vec<Layout> {
    (0..n)
        .map(|i| {
            let size = 8 + (i * 17) % 113;
            let align = 1usize << (i % 4);
            Layout::from_size_align(size, align).expect("sizes and aligns are valid")
        })
        .collect()
}

/// Strings long enough to defeat any inline representation.
pub fn long_strings(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| format!("benchmark payload string number {i:04}, long enough to allocate"))
        .collect()
}

/// Total bytes a request stream asks for, ignoring alignment padding.
pub fn payload_bytes(layouts: &[Layout]) -> usize {
    layouts.iter().map(|l| l.size()).sum()
}
