//! Fixed-size sequential chunking of segments for translation calls.
//!
//! Larger chunks mean fewer provider round trips and more context for
//! translation consistency, at the cost of coarser progress ticks and a
//! larger failure blast radius (a chunk fails atomically, never
//! half-applied).

use crate::segment::Segment;

/// Default number of segments per translation call.
pub const DEFAULT_CHUNK_SIZE: usize = 10;

/// Partition `segments` into ordered, contiguous chunks of at most `size`.
///
/// Produces `ceil(len / size)` chunks; only the final chunk may be smaller.
/// Concatenating the chunks reproduces the input sequence exactly.
pub fn split_chunks(segments: &[Segment], size: usize) -> Vec<&[Segment]> {
    debug_assert!(size > 0, "chunk size must be positive");
    let size = size.max(1);
    segments.chunks(size).collect()
}
