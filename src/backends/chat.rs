//! OpenAI-compatible chat-completions backend (Groq by default).
//!
//! ## Message Layout
//!
//! 1. **System message**: the transcription rules plus the mode suffix
//! 2. **User message**: a short instruction plus the photo as an image part
//!
//! Temperature defaults to 0.2: transcription wants determinism, not
//! creativity.

use super::{send_chat, BackendResponse, TranscriptionBackend};
use crate::config::{ConversionConfig, Engine, TranscriptionMode};
use crate::error::TranscriptionError;
use crate::pipeline::encode::encode_image;
use crate::pipeline::intake::UploadedImage;
use crate::prompts::{chat_system_prompt, CHAT_USER_INSTRUCTION};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, OpenAIProvider};
use std::sync::Arc;
use tracing::debug;

/// Chat-completions client for vision models.
pub struct ChatCompletionsBackend {
    provider: Arc<dyn LLMProvider>,
    options: CompletionOptions,
    timeout_secs: Option<u64>,
}

impl ChatCompletionsBackend {
    /// Build against `config.effective_base_url()` with the given key.
    pub fn new(api_key: String, config: &ConversionConfig) -> Self {
        let base_url = config.effective_base_url().trim_end_matches('/').to_string();
        let provider =
            OpenAIProvider::compatible(api_key, base_url).with_model(config.effective_model());
        Self::with_provider(Arc::new(provider), config)
    }

    /// Use an already-built provider (any OpenAI-style [`LLMProvider`]).
    pub fn with_provider(provider: Arc<dyn LLMProvider>, config: &ConversionConfig) -> Self {
        Self {
            provider,
            options: build_options(config),
            timeout_secs: config.api_timeout_secs,
        }
    }
}

fn build_options(config: &ConversionConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

fn build_messages(image: &UploadedImage, mode: TranscriptionMode) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(chat_system_prompt(mode)),
        ChatMessage::user_with_images(CHAT_USER_INSTRUCTION, vec![encode_image(image)]),
    ]
}

#[async_trait]
impl TranscriptionBackend for ChatCompletionsBackend {
    fn engine(&self) -> Engine {
        Engine::Groq
    }

    fn model(&self) -> &str {
        self.provider.model()
    }

    async fn transcribe(
        &self,
        image: &UploadedImage,
        mode: TranscriptionMode,
    ) -> Result<BackendResponse, TranscriptionError> {
        let messages = build_messages(image, mode);
        debug!(
            "Chat completion via {} (model {}, mode {:?})",
            self.provider.name(),
            self.provider.model(),
            mode
        );
        send_chat(
            self.provider.as_ref(),
            &messages,
            &self.options,
            self.timeout_secs,
        )
        .await
    }
}
