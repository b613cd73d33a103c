//! Wire types for the chat completions and image generations endpoints.

use derive_builder::Builder;
use derive_getters::Getters;
use odyssey_error::BuilderError;
use serde::{Deserialize, Serialize};

/// Chat message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// System instructions
    System,
    /// End user
    User,
    /// Model reply
    Assistant,
}

/// One chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ChatMessage {
    /// Author role
    role: ChatRole,
    /// Message text; absent for some tool-call replies
    #[serde(default)]
    content: Option<String>,
}

impl ChatMessage {
    /// Create a message.
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
        }
    }
}

/// `POST /chat/completions` body.
#[derive(Debug, Clone, Serialize, Builder, Getters)]
#[builder(setter(into), build_fn(error = "BuilderError"))]
pub struct ChatCompletionRequest {
    /// Model identifier
    model: String,
    /// Conversation
    messages: Vec<ChatMessage>,
    /// Completion length cap
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    /// Sampling temperature
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

impl ChatCompletionRequest {
    /// Start building a request.
    pub fn builder() -> ChatCompletionRequestBuilder {
        ChatCompletionRequestBuilder::default()
    }
}

/// One completion alternative.
#[derive(Debug, Clone, Deserialize, Getters)]
pub struct ChatChoice {
    /// Generated message
    message: ChatMessage,
    /// Why generation stopped
    #[serde(default)]
    finish_reason: Option<String>,
}

/// `POST /chat/completions` response.
#[derive(Debug, Clone, Deserialize, Getters)]
pub struct ChatCompletionResponse {
    /// Model that served the request
    #[serde(default)]
    model: Option<String>,
    /// Alternatives, normally exactly one
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

/// `POST /images/generations` body.
#[derive(Debug, Clone, Serialize, Builder, Getters)]
#[builder(setter(into), build_fn(error = "BuilderError"))]
pub struct ImageGenerationRequest {
    /// Model identifier
    model: String,
    /// Illustration description
    prompt: String,
    /// Number of images
    #[builder(default = "1")]
    n: u32,
    /// Resolution such as `1024x1024`
    size: String,
    /// Always `b64_json` so the bytes come back inline
    #[builder(default = "\"b64_json\".to_string()")]
    response_format: String,
}

impl ImageGenerationRequest {
    /// Start building a request.
    pub fn builder() -> ImageGenerationRequestBuilder {
        ImageGenerationRequestBuilder::default()
    }
}

/// One generated image.
#[derive(Debug, Clone, Deserialize, Getters)]
pub struct ImageDatum {
    /// Base64 encoded bytes
    #[serde(default)]
    b64_json: Option<String>,
    /// Prompt after the service's own rewriting
    #[serde(default)]
    revised_prompt: Option<String>,
}

/// `POST /images/generations` response.
#[derive(Debug, Clone, Deserialize, Getters)]
pub struct ImageGenerationResponse {
    /// Generated images
    #[serde(default)]
    data: Vec<ImageDatum>,
}

/// Error envelope returned with non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// Error details
    pub error: ApiErrorDetail,
}

/// Error details.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    /// Human-readable message
    pub message: String,
}
