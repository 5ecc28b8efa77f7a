//! Groq Whisper API transcriber.
//!
//! POSTs audio as multipart to the OpenAI-compatible
//! `/audio/transcriptions` endpoint with `response_format=verbose_json`
//! to get per-segment timestamps.

use tracing::{info, warn};

use subgen_core::Segment;

use crate::types::VerboseTranscription;
use crate::{SttError, Transcriber};

/// Default hosted Whisper model.
const DEFAULT_MODEL: &str = "whisper-large-v3";

/// Default Groq API base URL.
const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Transcriber backed by Groq's hosted Whisper models.
pub struct GroqTranscriber {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GroqTranscriber {
    /// Create a transcriber with the default model and base URL.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a transcriber from the `GROQ_API_KEY` environment variable.
    pub fn from_env() -> Result<Self, SttError> {
        let key =
            std::env::var("GROQ_API_KEY").map_err(|_| SttError::MissingApiKey("GROQ_API_KEY"))?;
        Ok(Self::new(key))
    }

    /// Override the Whisper model (e.g. `whisper-large-v3-turbo`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the API base URL (used by tests against a local server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_form(
        &self,
        audio: &[u8],
        file_name: &str,
        language: Option<&str>,
    ) -> reqwest::multipart::Form {
        let part = reqwest::multipart::Part::bytes(audio.to_vec()).file_name(file_name.to_string());
        let mut form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("response_format", "verbose_json")
            .text("temperature", "0");
        // Omitting the field entirely means auto-detect
        if let Some(lang) = language {
            form = form.text("language", lang.to_string());
        }
        form
    }
}

#[async_trait::async_trait]
impl Transcriber for GroqTranscriber {
    async fn transcribe(
        &self,
        audio: &[u8],
        file_name: &str,
        language: Option<&str>,
    ) -> Result<Vec<Segment>, SttError> {
        info!(
            model = %self.model,
            bytes = audio.len(),
            language = language.unwrap_or("auto"),
            "transcribing audio"
        );

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(self.build_form(audio, file_name, language))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(SttError::Api { status, message });
        }

        let transcription: VerboseTranscription = response
            .json()
            .await
            .map_err(|e| SttError::InvalidResponse(format!("malformed verbose_json: {e}")))?;

        if let Some(lang) = &transcription.language {
            info!(detected_language = %lang, "transcription language");
        }

        let segments: Vec<Segment> = transcription
            .segments
            .unwrap_or_default()
            .into_iter()
            .filter(|s| !s.text.trim().is_empty())
            .map(|s| Segment::new(s.start, s.end, s.text))
            .collect();

        if !segments.is_empty() {
            info!(segment_count = segments.len(), "transcription complete");
            return Ok(segments);
        }

        // Some short clips come back without a segment list; fold the full
        // text into one segment spanning the reported duration.
        let text = transcription.text.trim();
        if text.is_empty() {
            return Err(SttError::InvalidResponse(
                "transcription returned no segments and no text".to_string(),
            ));
        }
        warn!("no segments in response, using full text as a single segment");
        // Keep start < end even when the provider omits the duration.
        let end = transcription.duration.unwrap_or(0.0).max(1.0);
        Ok(vec![Segment::new(0.0, end, text)])
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
