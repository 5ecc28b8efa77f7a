//! [`LlmTranslator`] — chunk translation over any [`ChatModel`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use subgen_core::{RetryConfig, backoff_delay};

use crate::prompt::{build_prompt, parse_completion};
use crate::{ChatModel, TranslateError, TranslationClient};

/// Translates chunks by prompting a chat model and parsing its JSON reply.
///
/// Transient failures (transport errors, 429/5xx, garbled completions) are
/// retried with exponential backoff up to the configured bound, then
/// surfaced to the orchestrator which fails the job.
pub struct LlmTranslator {
    model: Arc<dyn ChatModel>,
    retry: RetryConfig,
}

impl LlmTranslator {
    /// Create a translator over `model` with default retry behavior.
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            retry: RetryConfig::default(),
        }
    }

    /// Override the retry configuration.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

#[async_trait]
impl TranslationClient for LlmTranslator {
    async fn translate(
        &self,
        texts: &[String],
        target_lang: &str,
        context: Option<&str>,
    ) -> Result<Vec<String>, TranslateError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let prompt = build_prompt(texts, target_lang, context);
        let mut last_err = None;

        for attempt in 0..=self.retry.max_retries {
            if attempt > 0 {
                let delay = backoff_delay(&self.retry, attempt - 1);
                warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    backend = self.model.model_name(),
                    "retrying chunk translation"
                );
                tokio::time::sleep(delay).await;
            }

            let result = match self.model.complete(&prompt).await {
                Ok(completion) => parse_completion(&completion, texts.len()),
                Err(e) => Err(e),
            };

            match result {
                Ok(lines) => {
                    debug!(
                        lines = lines.len(),
                        backend = self.model.model_name(),
                        "chunk translated"
                    );
                    return Ok(lines);
                }
                Err(e) if e.is_transient() => last_err = Some(e),
                Err(e) => return Err(e),
            }
        }

        Err(last_err.unwrap_or_else(|| {
            TranslateError::InvalidResponse("translation retries exhausted".to_string())
        }))
    }
}
