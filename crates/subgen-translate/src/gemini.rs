//! Gemini chat backend via the `generateContent` REST API.

use serde::Serialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::{ChatModel, TranslateError};

/// Default Gemini model.
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Default API base URL.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Safety categories relaxed for subtitle text.
///
/// Subtitle content is user media, not model-authored; blocking on these
/// categories turns ordinary dialogue into failed jobs.
const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// Request body for `models/{model}:generateContent`.
#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<serde_json::Value>,
    #[serde(rename = "generationConfig")]
    generation_config: serde_json::Value,
    #[serde(rename = "safetySettings")]
    safety_settings: Vec<serde_json::Value>,
}

/// Chat backend over Google's Gemini API.
pub struct GeminiModel {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiModel {
    /// Create a Gemini backend with the default model and base URL.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a backend from the `GEMINI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self, TranslateError> {
        let key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| TranslateError::MissingApiKey("GEMINI_API_KEY"))?;
        Ok(Self::new(key))
    }

    /// Override the model (e.g. `gemini-2.5-flash`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the API base URL (used by tests against a local server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_request(prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![json!({ "parts": [{ "text": prompt }] })],
            generation_config: json!({
                "temperature": 0.1,
                "response_mime_type": "application/json",
            }),
            safety_settings: SAFETY_CATEGORIES
                .iter()
                .map(|c| json!({ "category": c, "threshold": "BLOCK_NONE" }))
                .collect(),
        }
    }
}

#[async_trait::async_trait]
impl ChatModel for GeminiModel {
    async fn complete(&self, prompt: &str) -> Result<String, TranslateError> {
        debug!(model = %self.model, prompt_chars = prompt.len(), "gemini completion");

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .json(&Self::build_request(prompt))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(TranslateError::Api { status, message });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| TranslateError::InvalidResponse(format!("malformed response: {e}")))?;

        if let Some(reason) = body
            .pointer("/promptFeedback/blockReason")
            .and_then(|r| r.as_str())
        {
            warn!(reason, "gemini blocked the prompt");
            return Err(TranslateError::Blocked(reason.to_string()));
        }

        body.pointer("/candidates/0/content/parts/0/text")
            .and_then(|t| t.as_str())
            .map(ToString::to_string)
            .ok_or_else(|| {
                TranslateError::InvalidResponse("no candidate text in response".to_string())
            })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
