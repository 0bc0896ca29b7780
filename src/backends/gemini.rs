//! Google Gemini backend.
//!
//! Gemini gets a single user turn: the combined instruction text with the
//! photo attached. There is no system turn and the transcription mode is
//! ignored; the prompt already allows fixing obvious spelling errors in
//! chemistry terms. Sampling settings are left at the API defaults.

use super::{send_chat, BackendResponse, TranscriptionBackend};
use crate::config::{ConversionConfig, Engine, TranscriptionMode};
use crate::error::TranscriptionError;
use crate::pipeline::encode::encode_image;
use crate::pipeline::intake::UploadedImage;
use crate::prompts::GEMINI_PROMPT;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, GeminiProvider, LLMProvider};
use std::sync::Arc;
use tracing::{debug, warn};

/// Gemini vision client.
pub struct GeminiBackend {
    provider: Arc<dyn LLMProvider>,
    timeout_secs: Option<u64>,
}

impl GeminiBackend {
    pub fn new(api_key: String, config: &ConversionConfig) -> Self {
        let provider = GeminiProvider::new(api_key).with_model(config.effective_model());
        Self::with_provider(Arc::new(provider), config)
    }

    pub fn with_provider(provider: Arc<dyn LLMProvider>, config: &ConversionConfig) -> Self {
        Self {
            provider,
            timeout_secs: config.api_timeout_secs,
        }
    }
}

fn build_messages(image: &UploadedImage) -> Vec<ChatMessage> {
    vec![ChatMessage::user_with_images(
        GEMINI_PROMPT,
        vec![encode_image(image)],
    )]
}

#[async_trait]
impl TranscriptionBackend for GeminiBackend {
    fn engine(&self) -> Engine {
        Engine::Gemini
    }

    fn model(&self) -> &str {
        self.provider.model()
    }

    async fn transcribe(
        &self,
        image: &UploadedImage,
        mode: TranscriptionMode,
    ) -> Result<BackendResponse, TranscriptionError> {
        if mode == TranscriptionMode::Strict {
            warn!("Gemini ignores the transcription mode; using its built-in instructions");
        }

        let messages = build_messages(image);
        debug!("generateContent via {} (model {})", self.provider.name(), self.provider.model());

        send_chat(
            self.provider.as_ref(),
            &messages,
            &CompletionOptions::default(),
            self.timeout_secs,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::test_support::RecordingProvider;
    use edgequake_llm::{ChatRole, LlmError};

    fn gemini_config() -> ConversionConfig {
        ConversionConfig::builder()
            .engine(Engine::Gemini)
            .build()
            .unwrap()
    }

    fn jpeg_upload() -> UploadedImage {
        UploadedImage::from_bytes(vec![0xFF, 0xD8, 0xFF], "page.jpg").unwrap()
    }

    #[test]
    fn single_user_turn_carries_prompt_and_photo() {
        let messages = build_messages(&jpeg_upload());
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, ChatRole::User);
        assert_eq!(messages[0].content, GEMINI_PROMPT);
        let images = messages[0].images.as_ref().unwrap();
        assert_eq!(images[0].mime_type, "image/jpeg");
        assert!(!images[0].data.is_empty());
    }

    #[test]
    fn real_provider_uses_configured_model() {
        let backend = GeminiBackend::new("AIza-test".into(), &gemini_config());
        assert_eq!(backend.model(), "gemini-1.5-flash");
        assert_eq!(backend.engine(), Engine::Gemini);
    }

    #[tokio::test]
    async fn strict_mode_sends_same_prompt() {
        let provider = Arc::new(RecordingProvider::replying("# Redox\n- OIL RIG"));
        let backend = GeminiBackend::with_provider(provider.clone(), &gemini_config());

        let resp = backend
            .transcribe(&jpeg_upload(), TranscriptionMode::Strict)
            .await
            .unwrap();
        assert_eq!(resp.content, "# Redox\n- OIL RIG");
        assert_eq!(resp.prompt_tokens, Some(900));

        let sent = provider.messages.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].content, GEMINI_PROMPT);
        let opts = provider.options.lock().unwrap().clone().unwrap();
        assert!(opts.temperature.is_none());
    }

    #[tokio::test]
    async fn provider_failure_is_reported() {
        let provider = Arc::new(RecordingProvider::failing(LlmError::ProviderError(
            "prompt blocked: SAFETY".into(),
        )));
        let backend = GeminiBackend::with_provider(provider, &gemini_config());

        let err = backend
            .transcribe(&jpeg_upload(), TranscriptionMode::Relaxed)
            .await
            .unwrap_err();
        assert!(matches!(err, TranscriptionError::Api(ref m) if m.contains("SAFETY")));
    }

    #[tokio::test]
    async fn empty_candidate_is_empty_content() {
        let provider = Arc::new(RecordingProvider::replying(""));
        let backend = GeminiBackend::with_provider(provider, &gemini_config());

        let err = backend
            .transcribe(&jpeg_upload(), TranscriptionMode::Relaxed)
            .await
            .unwrap_err();
        assert_eq!(err, TranscriptionError::EmptyContent);
    }
}
