//! # subgen-stt
//!
//! Speech-to-text boundary of the pipeline.
//!
//! The orchestrator consumes transcription through the [`Transcriber`]
//! capability trait so providers can be substituted (or mocked) without
//! touching the pipeline. [`GroqTranscriber`] is the hosted Whisper
//! implementation.
//!
//! ## Crate Position
//!
//! Depends on: subgen-core.
//! Depended on by: subgen-server.

mod groq;
mod types;

use async_trait::async_trait;

use subgen_core::Segment;

pub use groq::GroqTranscriber;

/// Errors that can occur while transcribing audio.
#[derive(Debug, thiserror::Error)]
pub enum SttError {
    /// No API key was configured for the provider.
    #[error("missing API key: {0} is not set")]
    MissingApiKey(&'static str),

    /// Transport-level failure (connect, timeout, TLS).
    #[error("transcription request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider returned a non-success status.
    #[error("transcription provider returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated by the caller if needed.
        message: String,
    },

    /// The provider response could not be interpreted as a transcript.
    #[error("invalid transcription response: {0}")]
    InvalidResponse(String),
}

/// A speech-to-text provider.
///
/// Returns timestamped segments in canonical (start-time) order.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe raw audio bytes.
    ///
    /// `file_name` hints the container format to the provider;
    /// `language` is an ISO code, or `None` for auto-detection.
    async fn transcribe(
        &self,
        audio: &[u8],
        file_name: &str,
        language: Option<&str>,
    ) -> Result<Vec<Segment>, SttError>;

    /// The provider model identifier, for logging.
    fn model_name(&self) -> &str;
}
