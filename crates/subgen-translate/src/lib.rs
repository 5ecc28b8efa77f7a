//! # subgen-translate
//!
//! Translation boundary of the pipeline.
//!
//! The orchestrator consumes translation through the [`TranslationClient`]
//! capability trait: ordered texts in, equally many translated texts out,
//! or an error. [`LlmTranslator`] implements it on top of a [`ChatModel`]
//! (prompt in, completion out), with bounded retries and strict response
//! validation. [`GeminiModel`] and [`OpenRouterModel`] are the two hosted
//! chat backends.
//!
//! ## Crate Position
//!
//! Depends on: subgen-core.
//! Depended on by: subgen-server.

mod gemini;
mod openrouter;
mod prompt;
mod translator;

use async_trait::async_trait;

pub use gemini::GeminiModel;
pub use openrouter::OpenRouterModel;
pub use translator::LlmTranslator;

/// Errors that can occur while translating a chunk.
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    /// No API key was configured for the provider.
    #[error("missing API key: {0} is not set")]
    MissingApiKey(&'static str),

    /// Transport-level failure (connect, timeout, TLS).
    #[error("translation request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider returned a non-success status.
    #[error("translation provider returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },

    /// The provider refused the prompt (safety block).
    #[error("translation blocked by provider: {0}")]
    Blocked(String),

    /// The completion could not be parsed into translated lines.
    #[error("invalid translation response: {0}")]
    InvalidResponse(String),

    /// The provider returned a different number of lines than requested.
    ///
    /// Treated as a hard failure rather than repaired: a short response
    /// would silently misalign text with timestamps.
    #[error("translation length mismatch: expected {expected} lines, got {got}")]
    LengthMismatch {
        /// Number of input lines.
        expected: usize,
        /// Number of lines in the response.
        got: usize,
    },
}

impl TranslateError {
    /// Whether a retry with backoff may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) | Self::InvalidResponse(_) | Self::LengthMismatch { .. } => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::MissingApiKey(_) | Self::Blocked(_) => false,
        }
    }
}

/// A chat-completion backend: one prompt in, one completion out.
///
/// Mirrors the minimal surface the translator needs so hosted models can
/// be swapped without touching prompt construction or parsing.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Run a single completion.
    async fn complete(&self, prompt: &str) -> Result<String, TranslateError>;

    /// The model identifier, for logging.
    fn model_name(&self) -> &str;
}

/// A chunk translation provider.
#[async_trait]
pub trait TranslationClient: Send + Sync {
    /// Translate `texts` into `target_lang`, preserving order and length.
    ///
    /// `context` is optional free text about the source material that is
    /// folded into the prompt for terminology consistency.
    async fn translate(
        &self,
        texts: &[String],
        target_lang: &str,
        context: Option<&str>,
    ) -> Result<Vec<String>, TranslateError>;
}
