//! OpenAI REST API integration.

mod client;
mod conversion;
mod dto;

pub use client::{OpenAIClient, OpenAIConfig, OpenAIConfigBuilder};
