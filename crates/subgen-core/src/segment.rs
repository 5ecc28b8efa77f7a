//! Transcript segments and the cue-merging policy.

use serde::{Deserialize, Serialize};

/// A transcribed utterance with half-open time bounds in seconds.
///
/// Ordering by `start` is the canonical sequence order; the transcription
/// provider is expected to return segments already sorted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds (`start < end` for real utterances).
    pub end: f64,
    /// Utterance text.
    pub text: String,
}

impl Segment {
    /// Create a segment with trimmed text.
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into().trim().to_string(),
        }
    }
}

/// Policy for merging short adjacent segments into readable subtitle cues.
#[derive(Clone, Debug)]
pub struct MergePolicy {
    /// Maximum silence between cues that still allows a merge (seconds).
    pub max_gap: f64,
    /// Maximum character count of a merged cue.
    pub max_chars: usize,
    /// Cues shorter than this are merged even after end punctuation.
    pub min_chars: usize,
}

impl Default for MergePolicy {
    fn default() -> Self {
        Self {
            max_gap: 0.70,
            max_chars: 90,
            min_chars: 20,
        }
    }
}

/// Sentence-final punctuation that marks a cue as complete.
const END_PUNCTUATION: [&str; 4] = [".", "!", "?", "..."];

/// Merge short segments based on time gap and character count.
///
/// Two adjacent segments are joined when the gap between them is at most
/// `max_gap`, the merged text fits in `max_chars`, and the current cue
/// either does not end in sentence punctuation or is still shorter than
/// `min_chars`. Timing of a merged cue spans from the first start to the
/// last end.
pub fn merge_segments(segments: &[Segment], policy: &MergePolicy) -> Vec<Segment> {
    let Some(first) = segments.first() else {
        return Vec::new();
    };

    let mut merged = Vec::new();
    let mut current = Segment::new(first.start, first.end, first.text.clone());

    for next in &segments[1..] {
        let next_text = next.text.trim();
        let time_gap = next.start - current.end;
        // +1 for the joining space
        let estimated_len = current.text.len() + next_text.len() + 1;

        let ends_with_punctuation = END_PUNCTUATION
            .iter()
            .any(|p| current.text.ends_with(p));

        let should_merge = if time_gap > policy.max_gap || estimated_len > policy.max_chars {
            false
        } else {
            !ends_with_punctuation || current.text.len() < policy.min_chars
        };

        if should_merge {
            if !next_text.is_empty() {
                if !current.text.is_empty() {
                    current.text.push(' ');
                }
                current.text.push_str(next_text);
            }
            current.end = next.end;
        } else {
            merged.push(current);
            current = Segment::new(next.start, next.end, next_text);
        }
    }

    merged.push(current);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start: f64, end: f64, text: &str) -> Segment {
        Segment::new(start, end, text)
    }

    #[test]
    fn empty_input_yields_no_cues() {
        assert!(merge_segments(&[], &MergePolicy::default()).is_empty());
    }

    #[test]
    fn single_segment_passes_through() {
        let out = merge_segments(&[seg(0.0, 1.5, " hello ")], &MergePolicy::default());
        assert_eq!(out, vec![seg(0.0, 1.5, "hello")]);
    }

    #[test]
    fn merges_unpunctuated_adjacent_segments() {
        let input = [seg(0.0, 1.0, "hello"), seg(1.2, 2.0, "world")];
        let out = merge_segments(&input, &MergePolicy::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "hello world");
        assert_eq!(out[0].start, 0.0);
        assert_eq!(out[0].end, 2.0);
    }

    #[test]
    fn does_not_merge_across_large_gap() {
        let input = [seg(0.0, 1.0, "hello"), seg(3.0, 4.0, "world")];
        let out = merge_segments(&input, &MergePolicy::default());
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn does_not_merge_past_max_chars() {
        let long_a = "a".repeat(60);
        let long_b = "b".repeat(60);
        let input = [seg(0.0, 1.0, &long_a), seg(1.1, 2.0, &long_b)];
        let out = merge_segments(&input, &MergePolicy::default());
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn punctuated_long_cue_stays_separate() {
        let input = [
            seg(0.0, 1.0, "This is a complete sentence."),
            seg(1.1, 2.0, "next part"),
        ];
        let out = merge_segments(&input, &MergePolicy::default());
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn short_punctuated_cue_still_merges() {
        // "Hi." ends with punctuation but is under min_chars.
        let input = [seg(0.0, 0.5, "Hi."), seg(0.6, 1.5, "How are you?")];
        let out = merge_segments(&input, &MergePolicy::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "Hi. How are you?");
    }

    #[test]
    fn merged_cue_spans_full_time_range() {
        let input = [
            seg(0.0, 0.8, "one"),
            seg(0.9, 1.6, "two"),
            seg(1.7, 2.4, "three"),
        ];
        let out = merge_segments(&input, &MergePolicy::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].start, 0.0);
        assert_eq!(out[0].end, 2.4);
    }
}
