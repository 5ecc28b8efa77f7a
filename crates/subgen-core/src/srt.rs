//! Deterministic SRT assembly.

use crate::segment::Segment;

/// Format a time in seconds as an SRT timestamp: `HH:MM:SS,mmm`.
///
/// Sub-millisecond precision is truncated, never rounded up, and all
/// fields are computed by integer floor division and zero-padded.
/// Negative inputs are clamped to zero.
pub fn format_timestamp(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let total_millis = (seconds * 1000.0) as u64;
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis % 3_600_000) / 60_000;
    let secs = (total_millis % 60_000) / 1000;
    let millis = total_millis % 1000;
    format!("{hours:02}:{minutes:02}:{secs:02},{millis:03}")
}

/// Render ordered segments as an SRT document.
///
/// Each segment becomes a numbered block: a 1-based index line, a
/// `start --> end` timestamp line, the trimmed text, and a blank
/// separator. Output is byte-stable for identical input.
pub fn render(segments: &[Segment]) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        out.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            i + 1,
            format_timestamp(segment.start),
            format_timestamp(segment.end),
            segment.text.trim(),
        ));
    }
    out
}
