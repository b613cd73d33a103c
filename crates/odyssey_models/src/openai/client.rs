//! OpenAI REST client.

use super::conversion;
use super::dto::{ApiErrorBody, ChatCompletionResponse, ImageGenerationResponse};
use async_trait::async_trait;
use derive_builder::Builder;
use derive_getters::Getters;
use odyssey_core::{GenerateRequest, GenerateResponse, ImageRequest, ImageResponse};
use odyssey_error::{
    BuilderError, GenerationError, GenerationErrorKind, OdysseyResult, RetryableError,
};
use odyssey_interface::{ImageGenerator, TextGenerator};
use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::future::Future;
use std::time::Duration;
use tokio_retry2::{Retry, RetryError, strategy::ExponentialBackoff, strategy::jitter};
use tracing::{debug, error, info, instrument, warn};

const API_KEY_VAR: &str = "OPENAI_API_KEY";

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_text_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_image_model() -> String {
    "dall-e-3".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

/// Connection settings for [`OpenAIClient`].
///
/// # Examples
///
/// ```
/// use odyssey_models::OpenAIConfig;
///
/// let config = OpenAIConfig::builder()
///     .text_model("gpt-4o-mini")
///     .max_retries(Some(2))
///     .build()
///     .unwrap();
///
/// assert_eq!(config.base_url(), "https://api.openai.com/v1");
/// assert_eq!(config.image_model(), "dall-e-3");
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    Builder,
)]
#[setters(prefix = "with_")]
#[builder(setter(into), build_fn(error = "BuilderError"))]
pub struct OpenAIConfig {
    /// API root, without a trailing slash
    #[serde(default = "default_base_url")]
    #[builder(default = "default_base_url()")]
    base_url: String,

    /// Chat model used when a request does not name one
    #[serde(default = "default_text_model")]
    #[builder(default = "default_text_model()")]
    text_model: String,

    /// Image model used when a request does not name one
    #[serde(default = "default_image_model")]
    #[builder(default = "default_image_model()")]
    image_model: String,

    /// Retry budget override; the error's own strategy applies when unset
    #[serde(default)]
    #[builder(default)]
    max_retries: Option<usize>,

    /// Per-request HTTP timeout
    #[serde(default = "default_timeout_secs")]
    #[builder(default = "default_timeout_secs()")]
    timeout_secs: u64,

    /// Disable retries entirely
    #[serde(default)]
    #[builder(default)]
    no_retry: bool,
}

impl OpenAIConfig {
    /// Start building a config.
    pub fn builder() -> OpenAIConfigBuilder {
        OpenAIConfigBuilder::default()
    }
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            text_model: default_text_model(),
            image_model: default_image_model(),
            max_retries: None,
            timeout_secs: default_timeout_secs(),
            no_retry: false,
        }
    }
}

/// Client for the OpenAI chat completions and image generations endpoints.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct OpenAIClient {
    http: Client,
    api_key: String,
    config: OpenAIConfig,
}

impl std::fmt::Debug for OpenAIClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIClient")
            .field("config", &self.config)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl OpenAIClient {
    /// Create a client using the `OPENAI_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// [`GenerationErrorKind::MissingApiKey`] when the variable is unset or
    /// empty, or a transport error if the HTTP client cannot be built.
    #[instrument(skip_all, fields(base_url = %config.base_url()))]
    pub fn new(config: OpenAIConfig) -> OdysseyResult<Self> {
        let api_key = std::env::var(API_KEY_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| GenerationError::new(GenerationErrorKind::MissingApiKey))?;
        Self::with_api_key(api_key, config)
    }

    /// Create a client with an explicit API key.
    #[instrument(skip_all, fields(base_url = %config.base_url()))]
    pub fn with_api_key(api_key: impl Into<String>, config: OpenAIConfig) -> OdysseyResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                GenerationError::new(GenerationErrorKind::Transport(format!(
                    "Failed to build HTTP client: {}",
                    e
                )))
            })?;

        info!(
            text_model = %config.text_model,
            image_model = %config.image_model,
            "Created OpenAI client"
        );
        Ok(Self {
            http,
            api_key: api_key.into(),
            config,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    /// POST `body` to `{base_url}/{path}` once.
    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, GenerationError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);
        debug!(url = %url, "Sending OpenAI request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::new(GenerationErrorKind::Timeout(self.config.timeout_secs))
                } else {
                    GenerationError::new(GenerationErrorKind::Transport(e.to_string()))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|body| body.error.message)
                .unwrap_or(text);
            return Err(GenerationError::new(GenerationErrorKind::Api {
                status_code: status.as_u16(),
                message,
            }));
        }

        response.json::<R>().await.map_err(|e| {
            GenerationError::new(GenerationErrorKind::ResponseParsing(e.to_string()))
        })
    }

    /// Run `call`, retrying transient failures with jittered exponential
    /// backoff. The first error picks the strategy.
    async fn with_retry<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T, GenerationError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, GenerationError>>,
    {
        let first = match call().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        if self.config.no_retry || !first.is_retryable() {
            error!(operation, error = %first, "OpenAI request failed");
            return Err(first);
        }

        let (initial_ms, mut retries, max_delay_secs) = first.retry_strategy_params();
        if let Some(max_retries) = self.config.max_retries {
            retries = max_retries;
        }
        warn!(
            operation,
            error = %first,
            initial_backoff_ms = initial_ms,
            max_retries = retries,
            max_delay_secs,
            "Transient OpenAI failure, retrying"
        );

        let strategy = ExponentialBackoff::from_millis(initial_ms)
            .factor(2)
            .max_delay(Duration::from_secs(max_delay_secs))
            .map(jitter)
            .take(retries);

        Retry::spawn(strategy, || {
            let attempt = call();
            async move {
                match attempt.await {
                    Ok(value) => Ok(value),
                    Err(e) if e.is_retryable() => {
                        warn!(error = %e, "Retryable OpenAI failure");
                        Err(RetryError::Transient {
                            err: e,
                            retry_after: None,
                        })
                    }
                    Err(e) => {
                        warn!(error = %e, "Permanent OpenAI failure, giving up");
                        Err(RetryError::Permanent(e))
                    }
                }
            }
        })
        .await
        .inspect_err(|e| error!(operation, error = %e, "OpenAI request failed after retries"))
    }
}

#[async_trait]
impl TextGenerator for OpenAIClient {
    #[instrument(skip(self, req), fields(messages = req.messages().len()))]
    async fn generate(&self, req: &GenerateRequest) -> OdysseyResult<GenerateResponse> {
        let body = conversion::to_chat_request(req, &self.config.text_model)?;
        let response: ChatCompletionResponse = self
            .with_retry("chat completion", || self.post_json("chat/completions", &body))
            .await?;
        let generated = conversion::from_chat_response(response)?;
        debug!(chars = generated.text().len(), "Received completion");
        Ok(generated)
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.config.text_model
    }
}

#[async_trait]
impl ImageGenerator for OpenAIClient {
    #[instrument(skip(self, req), fields(size = %req.size()))]
    async fn generate_image(&self, req: &ImageRequest) -> OdysseyResult<ImageResponse> {
        let body = conversion::to_image_request(req, &self.config.image_model)?;
        let response: ImageGenerationResponse = self
            .with_retry("image generation", || {
                self.post_json("images/generations", &body)
            })
            .await?;
        let image = conversion::from_image_response(response)?;
        info!(bytes = image.data().len(), "Received image");
        Ok(image)
    }

    fn image_model_name(&self) -> &str {
        &self.config.image_model
    }
}
