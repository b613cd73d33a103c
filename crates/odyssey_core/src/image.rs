//! Illustration request, response and handle types.

use derive_builder::Builder;
use derive_getters::Getters;
use odyssey_error::BuilderError;
use serde::{Deserialize, Serialize};

/// Output resolution accepted by the image model.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
pub enum ImageSize {
    /// 1024x1024
    #[default]
    #[strum(serialize = "1024x1024")]
    #[serde(rename = "1024x1024")]
    Square,
    /// 1792x1024
    #[strum(serialize = "1792x1024")]
    #[serde(rename = "1792x1024")]
    Landscape,
    /// 1024x1792
    #[strum(serialize = "1024x1792")]
    #[serde(rename = "1024x1792")]
    Portrait,
}

/// A request to illustrate a scenario.
///
/// # Examples
///
/// ```
/// use odyssey_core::{ImageRequest, ImageSize};
///
/// let request = ImageRequest::builder()
///     .prompt("A hedgehog with a glowing tail at the forest edge")
///     .build()
///     .unwrap();
///
/// assert_eq!(*request.size(), ImageSize::Square);
/// assert_eq!(request.size().to_string(), "1024x1024");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, Builder)]
#[builder(setter(into), build_fn(error = "BuilderError"))]
pub struct ImageRequest {
    /// Illustration description
    prompt: String,
    /// Output resolution
    #[builder(default)]
    size: ImageSize,
    /// Model override
    #[builder(default)]
    model: Option<String>,
}

impl ImageRequest {
    /// Start building a request.
    pub fn builder() -> ImageRequestBuilder {
        ImageRequestBuilder::default()
    }
}

/// Raw image returned by the image model.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct ImageResponse {
    /// Encoded image bytes
    data: Vec<u8>,
    /// MIME type of `data`
    mime: String,
    /// Prompt as rewritten by the service, if it reports one
    revised_prompt: Option<String>,
}

impl ImageResponse {
    /// Create a response from decoded bytes.
    pub fn new(data: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            data,
            mime: mime.into(),
            revised_prompt: None,
        }
    }

    /// Attach the service's rewritten prompt.
    pub fn with_revised_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.revised_prompt = Some(prompt.into());
        self
    }

    /// Turn the response into a story image with a caption.
    pub fn into_handle(self, caption: impl Into<String>) -> ImageHandle {
        ImageHandle {
            data: self.data,
            mime: self.mime,
            caption: caption.into(),
        }
    }
}

/// An illustration recorded in the story.
///
/// Bytes are opaque to the engine. In JSON they are carried as base64.
///
/// # Examples
///
/// ```
/// use odyssey_core::ImageHandle;
///
/// let image = ImageHandle::new(vec![0x89, 0x50, 0x4E, 0x47], "image/png", "Pip at dawn");
/// let json = serde_json::to_string(&image).unwrap();
/// assert!(json.contains("iVBORw=="));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters)]
pub struct ImageHandle {
    /// Encoded image bytes
    #[serde(with = "base64_bytes")]
    data: Vec<u8>,
    /// MIME type of `data`
    mime: String,
    /// Short description of what the image shows
    caption: String,
}

impl ImageHandle {
    /// Create a handle.
    pub fn new(data: Vec<u8>, mime: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            data,
            mime: mime.into(),
            caption: caption.into(),
        }
    }

    /// File extension matching the MIME type.
    pub fn extension(&self) -> &'static str {
        match self.mime.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "png",
        }
    }
}

mod base64_bytes {
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_parse_from_config_strings() {
        assert_eq!("1792x1024".parse::<ImageSize>().ok(), Some(ImageSize::Landscape));
        assert!("800x600".parse::<ImageSize>().is_err());
    }

    #[test]
    fn handle_survives_json() {
        let image = ImageHandle::new(vec![1, 2, 3, 255], "image/webp", "caption");
        let json = serde_json::to_string(&image).unwrap();
        let back: ImageHandle = serde_json::from_str(&json).unwrap();
        assert_eq!(back, image);
        assert_eq!(back.extension(), "webp");
    }
}
