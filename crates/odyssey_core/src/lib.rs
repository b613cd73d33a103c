//! Core data types for the Odyssey story engine.
//!
//! This crate provides the types shared by every Odyssey crate: the hero's
//! character profile, model request/response shapes, story events and the
//! parsed scenario that drives each turn.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod audience;
mod character;
mod event;
mod image;
mod message;
mod request;
mod role;
mod scenario;
mod telemetry;

pub use audience::{AgeBand, ArtStyle, Vocabulary};
pub use character::{CharacterProfile, CharacterProfileBuilder, SUGGESTED_CHALLENGES};
pub use event::{StoryEvent, StoryEventKind};
pub use image::{ImageHandle, ImageRequest, ImageRequestBuilder, ImageResponse, ImageSize};
pub use message::Message;
pub use request::{GenerateRequest, GenerateRequestBuilder, GenerateResponse};
pub use role::Role;
pub use scenario::{FALLBACK_CHOICES, FallbackChoice, ParsedScenario};
pub use telemetry::init_tracing;
