//! Request and response types for text generation.

use crate::Message;
use derive_builder::Builder;
use derive_getters::Getters;
use odyssey_error::BuilderError;
use serde::{Deserialize, Serialize};

/// A text generation request: one prompt plus an optional short history.
///
/// # Examples
///
/// ```
/// use odyssey_core::{GenerateRequest, Message};
///
/// let request = GenerateRequest::builder()
///     .messages(vec![Message::user("Hello!")])
///     .max_tokens(Some(400))
///     .build()
///     .unwrap();
///
/// assert_eq!(request.messages().len(), 1);
/// assert_eq!(*request.max_tokens(), Some(400));
/// assert!(request.model().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default, Getters, Builder)]
#[builder(setter(into), build_fn(error = "BuilderError"))]
pub struct GenerateRequest {
    /// The conversation messages to send
    messages: Vec<Message>,
    /// Maximum number of tokens to generate
    #[builder(default)]
    max_tokens: Option<u32>,
    /// Sampling temperature (0.0 to 2.0)
    #[builder(default)]
    temperature: Option<f32>,
    /// Model override; the generator's default is used when absent
    #[builder(default)]
    model: Option<String>,
}

impl GenerateRequest {
    /// Start building a request.
    pub fn builder() -> GenerateRequestBuilder {
        GenerateRequestBuilder::default()
    }
}

/// A text completion.
///
/// # Examples
///
/// ```
/// use odyssey_core::GenerateResponse;
///
/// let response = GenerateResponse::new("Once upon a time...");
/// assert_eq!(response.text(), "Once upon a time...");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct GenerateResponse {
    /// Completion text
    text: String,
    /// Model that produced the completion, when reported
    model: Option<String>,
}

impl GenerateResponse {
    /// Response with text only.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: None,
        }
    }

    /// Record which model produced the completion.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Consume the response, keeping the text.
    pub fn into_text(self) -> String {
        self.text
    }
}
