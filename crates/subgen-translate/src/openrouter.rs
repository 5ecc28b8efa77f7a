//! OpenRouter chat backend via the OpenAI-compatible chat completions API.
//!
//! Tries a priority model first and falls over to a fallback model on any
//! failure, so a single flaky free-tier model does not fail the chunk.

use serde::Serialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::{ChatModel, TranslateError};

/// Default priority model.
const DEFAULT_PRIORITY_MODEL: &str = "xiaomi/mimo-v2-flash:free";

/// Default fallback model.
const DEFAULT_FALLBACK_MODEL: &str = "mistralai/devstral-2512:free";

/// Default API base URL.
const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Request body for `/chat/completions`.
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning: Option<serde_json::Value>,
}

/// Chat backend over the OpenRouter API with model fallover.
pub struct OpenRouterModel {
    api_key: String,
    priority_model: String,
    fallback_model: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenRouterModel {
    /// Create a backend with the default model pair and base URL.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            priority_model: DEFAULT_PRIORITY_MODEL.to_string(),
            fallback_model: DEFAULT_FALLBACK_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a backend from the `OPENROUTER_API_KEY` environment variable.
    pub fn from_env() -> Result<Self, TranslateError> {
        let key = std::env::var("OPENROUTER_API_KEY")
            .map_err(|_| TranslateError::MissingApiKey("OPENROUTER_API_KEY"))?;
        Ok(Self::new(key))
    }

    /// Override the priority/fallback model pair.
    pub fn with_models(
        mut self,
        priority: impl Into<String>,
        fallback: impl Into<String>,
    ) -> Self {
        self.priority_model = priority.into();
        self.fallback_model = fallback.into();
        self
    }

    /// Override the API base URL (used by tests against a local server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_request(&self, model: &str, prompt: &str) -> ChatRequest {
        ChatRequest {
            model: model.to_string(),
            messages: vec![json!({ "role": "user", "content": prompt })],
            // The mimo free tier only emits usable output with reasoning on.
            reasoning: (model == DEFAULT_PRIORITY_MODEL)
                .then(|| json!({ "enabled": true })),
        }
    }

    async fn complete_with_model(
        &self,
        model: &str,
        prompt: &str,
    ) -> Result<String, TranslateError> {
        debug!(model, prompt_chars = prompt.len(), "openrouter completion");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&self.build_request(model, prompt))
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

        let content = body
            .pointer("/choices/0/message/content")
            .and_then(|c| c.as_str())
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(ToString::to_string)
            .ok_or_else(|| {
                TranslateError::InvalidResponse("empty completion content".to_string())
            })?;

        // Attribute the completion to the model that actually served it,
        // which differs from `model_name()` once fallover kicks in.
        debug!(model, completion_chars = content.len(), "completion received");
        Ok(content)
    }
}

#[async_trait::async_trait]
impl ChatModel for OpenRouterModel {
    async fn complete(&self, prompt: &str) -> Result<String, TranslateError> {
        match self.complete_with_model(&self.priority_model, prompt).await {
            Ok(text) => Ok(text),
            Err(e) => {
                warn!(
                    priority_model = %self.priority_model,
                    fallback_model = %self.fallback_model,
                    error = %e,
                    "priority model failed, trying fallback"
                );
                self.complete_with_model(&self.fallback_model, prompt).await
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.priority_model
    }
}
