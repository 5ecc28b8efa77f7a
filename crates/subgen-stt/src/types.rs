//! Wire types for the Whisper `verbose_json` response format.

use serde::Deserialize;

/// Top-level `verbose_json` transcription response.
#[derive(Debug, Deserialize)]
pub(crate) struct VerboseTranscription {
    /// Full transcript text.
    #[serde(default)]
    pub text: String,
    /// Detected (or requested) language.
    #[serde(default)]
    pub language: Option<String>,
    /// Audio duration in seconds.
    #[serde(default)]
    pub duration: Option<f64>,
    /// Timestamped segments; absent on some short inputs.
    #[serde(default)]
    pub segments: Option<Vec<ApiSegment>>,
}

/// One timestamped segment from the provider.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiSegment {
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub end: f64,
    #[serde(default)]
    pub text: String,
}
