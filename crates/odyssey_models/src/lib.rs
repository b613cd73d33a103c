//! Hosted model clients for Odyssey.
//!
//! [`OpenAIClient`] speaks the OpenAI REST API and implements both
//! [`TextGenerator`](odyssey_interface::TextGenerator) (chat completions) and
//! [`ImageGenerator`](odyssey_interface::ImageGenerator) (image generations).
//! Any service exposing the same endpoints can be used by pointing
//! `base_url` at it.
//!
//! # Example
//!
//! ```no_run
//! use odyssey_core::{GenerateRequest, Message};
//! use odyssey_interface::TextGenerator;
//! use odyssey_models::{OpenAIClient, OpenAIConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenAIClient::new(OpenAIConfig::default())?;
//! let request = GenerateRequest::builder()
//!     .messages(vec![Message::user("Tell me a one-line story.")])
//!     .build()?;
//! let response = client.generate(&request).await?;
//! println!("{}", response.text());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod openai;

pub use openai::{OpenAIClient, OpenAIConfig, OpenAIConfigBuilder};
