//! Conversions between Odyssey request types and OpenAI wire types.

use super::dto::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ChatRole, ImageGenerationRequest,
    ImageGenerationResponse,
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use odyssey_core::{GenerateRequest, GenerateResponse, ImageRequest, ImageResponse, Role};
use odyssey_error::{GenerationError, GenerationErrorKind, OdysseyResult};

/// MIME type of `b64_json` image payloads.
const IMAGE_MIME: &str = "image/png";

/// Build a chat completion body, falling back to `default_model`.
pub fn to_chat_request(
    request: &GenerateRequest,
    default_model: &str,
) -> OdysseyResult<ChatCompletionRequest> {
    let messages: Vec<ChatMessage> = request
        .messages()
        .iter()
        .map(|message| {
            let role = match message.role() {
                Role::System => ChatRole::System,
                Role::User => ChatRole::User,
                Role::Assistant => ChatRole::Assistant,
            };
            ChatMessage::new(role, message.content().clone())
        })
        .collect();

    let model = request
        .model()
        .clone()
        .unwrap_or_else(|| default_model.to_string());

    Ok(ChatCompletionRequest::builder()
        .model(model)
        .messages(messages)
        .max_tokens(*request.max_tokens())
        .temperature(*request.temperature())
        .build()?)
}

/// Extract the first completion's text.
///
/// # Errors
///
/// [`GenerationErrorKind::EmptyResponse`] when the service returned no
/// choices or only whitespace.
pub fn from_chat_response(
    response: ChatCompletionResponse,
) -> Result<GenerateResponse, GenerationError> {
    let text = response
        .choices()
        .first()
        .and_then(|choice| choice.message().content().clone())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(GenerationError::new(GenerationErrorKind::EmptyResponse));
    }

    let mut generated = GenerateResponse::new(text);
    if let Some(model) = response.model() {
        generated = generated.with_model(model.clone());
    }
    Ok(generated)
}

/// Build an image generation body, falling back to `default_model`.
pub fn to_image_request(
    request: &ImageRequest,
    default_model: &str,
) -> OdysseyResult<ImageGenerationRequest> {
    let model = request
        .model()
        .clone()
        .unwrap_or_else(|| default_model.to_string());

    Ok(ImageGenerationRequest::builder()
        .model(model)
        .prompt(request.prompt().clone())
        .size(request.size().to_string())
        .build()?)
}

/// Decode the first image.
///
/// # Errors
///
/// [`GenerationErrorKind::EmptyResponse`] when no image data came back, or
/// [`GenerationErrorKind::Base64Decode`] when it is not valid base64.
pub fn from_image_response(
    response: ImageGenerationResponse,
) -> Result<ImageResponse, GenerationError> {
    let datum = response
        .data()
        .first()
        .ok_or_else(|| GenerationError::new(GenerationErrorKind::EmptyResponse))?;
    let encoded = datum
        .b64_json()
        .as_deref()
        .ok_or_else(|| GenerationError::new(GenerationErrorKind::EmptyResponse))?;

    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| GenerationError::new(GenerationErrorKind::Base64Decode(e.to_string())))?;

    let mut image = ImageResponse::new(bytes, IMAGE_MIME);
    if let Some(revised) = datum.revised_prompt() {
        image = image.with_revised_prompt(revised.clone());
    }
    Ok(image)
}
