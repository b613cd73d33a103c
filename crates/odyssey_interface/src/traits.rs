//! Trait definitions for model backends and session persistence.

use async_trait::async_trait;
use odyssey_core::{GenerateRequest, GenerateResponse, ImageRequest, ImageResponse};
use odyssey_error::OdysseyResult;
use serde::{Serialize, de::DeserializeOwned};

/// A hosted text model.
///
/// One call produces one completion; the pipeline never issues concurrent
/// calls on behalf of a single session.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for the request.
    async fn generate(&self, req: &GenerateRequest) -> OdysseyResult<GenerateResponse>;

    /// Provider name (e.g., "openai").
    fn provider_name(&self) -> &'static str;

    /// Default model identifier (e.g., "gpt-3.5-turbo").
    fn model_name(&self) -> &str;
}

/// A hosted image model.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Render an image for the request.
    async fn generate_image(&self, req: &ImageRequest) -> OdysseyResult<ImageResponse>;

    /// Default model identifier (e.g., "dall-e-3").
    fn image_model_name(&self) -> &str;
}

/// Best-effort persistence of session snapshots keyed by session id.
///
/// Generic over the snapshot type so backends stay independent of the
/// narrative crate.
#[async_trait]
pub trait SessionStore<S>: Send + Sync
where
    S: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Persist a snapshot, replacing any earlier one with the same id.
    async fn save(&self, session_id: &str, snapshot: &S) -> OdysseyResult<()>;

    /// Load a snapshot; `None` when nothing is stored under the id.
    async fn load(&self, session_id: &str) -> OdysseyResult<Option<S>>;

    /// Remove a snapshot; returns whether one existed.
    async fn delete(&self, session_id: &str) -> OdysseyResult<bool>;

    /// Ids of all stored snapshots.
    async fn list(&self) -> OdysseyResult<Vec<String>>;
}
