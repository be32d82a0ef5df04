//! Remote classification model boundary.
//!
//! The classifier only needs text in, text out. [`ChatCompletionsBackend`]
//! speaks the OpenAI-compatible chat completions protocol (Groq, OpenAI,
//! Ollama, vLLM, ...); tests substitute their own [`CompletionBackend`].

use std::num::NonZeroU32;
use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};

use crate::config::ModelConfig;
use crate::error::{ModelError, ModelResult};

/// Instructions sent with every classification request.
pub const SYSTEM_PROMPT: &str = "You sort research publications into two kinds based on \
     their title and publication venue: papers published in journals and papers published \
     at conferences or workshops. Answer with exactly one word: Journal or Conference.";

/// Per-publication request text.
#[must_use]
pub fn user_prompt(title: &str, venue: &str) -> String {
    let venue = if venue.trim().is_empty() {
        "Unknown"
    } else {
        venue
    };
    format!(
        "Classify this publication. Title: {title}. Venue: {venue}. \
         Respond with only 'Journal' or 'Conference'."
    )
}

/// Text-in, text-out model capability.
#[async_trait::async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Send one prompt pair and return the raw completion text.
    async fn classify_text(&self, system_prompt: &str, user_prompt: &str) -> ModelResult<String>;
}

/// OpenAI-compatible `/chat/completions` client.
pub struct ChatCompletionsBackend {
    /// HTTP client with middleware.
    client: ClientWithMiddleware,

    /// Request pacing.
    limiter: Option<DefaultDirectRateLimiter>,

    /// API key.
    api_key: Option<String>,

    /// Full endpoint URL.
    endpoint: String,

    /// Model name.
    model: String,

    /// Request timeout, reported in timeout errors.
    request_timeout: Duration,
}

impl ChatCompletionsBackend {
    /// Create a backend from model configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &ModelConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .gzip(true)
            .build()?;

        // No retry middleware: the classifier owns the retry policy.
        let client = ClientBuilder::new(client).build();

        let limiter = config
            .requests_per_minute
            .and_then(NonZeroU32::new)
            .map(|rpm| RateLimiter::direct(Quota::per_minute(rpm)));

        Ok(Self {
            client,
            limiter,
            api_key: config.api_key.clone(),
            endpoint: format!("{}/chat/completions", config.api_url.trim_end_matches('/')),
            model: config.model.clone(),
            request_timeout: config.request_timeout,
        })
    }

    /// Model name requests are sent with.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Map status codes to errors.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> ModelResult<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        match status.as_u16() {
            429 => {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.trim().parse().ok())
                    .unwrap_or(1);

                Err(ModelError::rate_limited(retry_after))
            }
            401 | 403 => {
                let text = response.text().await.unwrap_or_default();
                Err(ModelError::Unauthorized {
                    status: status.as_u16(),
                    message: text,
                })
            }
            400 | 404 | 422 => {
                let text = response.text().await.unwrap_or_default();
                Err(ModelError::bad_request(text))
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(ModelError::server(status.as_u16(), text))
            }
        }
    }

    fn transport_error(&self, err: reqwest_middleware::Error) -> ModelError {
        match err {
            reqwest_middleware::Error::Reqwest(e) if e.is_timeout() => {
                ModelError::Timeout(self.request_timeout)
            }
            reqwest_middleware::Error::Reqwest(e) => ModelError::Http(e),
            other => ModelError::Middleware(other),
        }
    }
}

#[async_trait::async_trait]
impl CompletionBackend for ChatCompletionsBackend {
    fn name(&self) -> &str {
        "chat-completions"
    }

    async fn classify_text(&self, system_prompt: &str, user_prompt: &str) -> ModelResult<String> {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }

        let body = serde_json::json!({
            "model": self.model,
            "temperature": 0,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt},
            ],
        });
        let body_str = serde_json::to_string(&body)?;

        let mut request = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .body(body_str);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let response = self.handle_response(response).await?;
        let value: serde_json::Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ModelError::Timeout(self.request_timeout)
            } else {
                ModelError::Http(e)
            }
        })?;

        let content = value["choices"][0]["message"]["content"]
            .as_str()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or(ModelError::EmptyCompletion)?;

        Ok(content.to_string())
    }
}

impl std::fmt::Debug for ChatCompletionsBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsBackend")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}
