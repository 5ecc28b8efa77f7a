//! # subgen-core
//!
//! Domain types and pure logic for the subtitle generation pipeline:
//!
//! - [`Segment`]: a timestamped transcript utterance
//! - [`merge_segments`]: join short adjacent utterances into readable cues
//! - [`split_chunks`]: fixed-size partition of segments for translation calls
//! - [`srt::render`]: deterministic SRT assembly
//! - [`Job`] / [`JobState`]: the polling status contract
//! - [`RetryConfig`]: backoff math for transient provider errors
//!
//! ## Crate Position
//!
//! Standalone (no subgen crate dependencies).
//! Depended on by: subgen-stt, subgen-translate, subgen-server.

pub mod chunk;
pub mod job;
pub mod language;
pub mod logging;
pub mod retry;
pub mod segment;
pub mod srt;

pub use chunk::{DEFAULT_CHUNK_SIZE, split_chunks};
pub use job::{Job, JobResult, JobState};
pub use language::language_from_code;
pub use retry::{RetryConfig, backoff_delay};
pub use segment::{MergePolicy, Segment, merge_segments};
