//! Image encoding: uploaded photo → base64 wrapped in [`ImageData`].
//!
//! Both engines take the photo inline as base64. The provider decides the
//! wire shape (`image_url` data URL for chat completions, `inlineData` for
//! Gemini). The original bytes are sent as-is; re-encoding a phone JPEG to
//! PNG would only inflate the request.

use crate::pipeline::intake::UploadedImage;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use tracing::debug;

/// Base64-encode an uploaded image for a vision request.
///
/// `detail = "high"` asks OpenAI-style APIs not to downsample the photo;
/// small handwriting is unreadable at low detail.
pub fn encode_image(image: &UploadedImage) -> ImageData {
    let b64 = STANDARD.encode(&image.bytes);
    debug!("Encoded '{}' → {} bytes base64", image.name, b64.len());
    ImageData::new(b64, image.mime_type()).with_detail("high")
}
