//! Transcription backends: one capability, two engines.
//!
//! The rest of the crate only sees [`TranscriptionBackend`]:
//! "given a photo and a mode, return Markdown or a reason it failed".
//! Both implementations sit on an `edgequake-llm` provider and differ only in
//! how they lay out the messages. [`resolve_backend`] picks the
//! implementation from the configuration, so there is exactly one call site
//! for either engine.
//!
//! | Implementation | Engine | Provider |
//! |----------------|--------|----------|
//! | [`ChatCompletionsBackend`] | [`Engine::Groq`] | `OpenAIProvider::compatible` |
//! | [`GeminiBackend`] | [`Engine::Gemini`] | `GeminiProvider` |

pub mod chat;
pub mod gemini;

pub use chat::ChatCompletionsBackend;
pub use gemini::GeminiBackend;

use crate::config::{ConversionConfig, Engine, TranscriptionMode};
use crate::error::{NotesError, TranscriptionError};
use crate::pipeline::intake::UploadedImage;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Raw answer from a backend, before post-processing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendResponse {
    pub content: String,
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
}

/// A vision model that can read a photo of notes.
///
/// Implementations must not retry; a failure is reported once and the
/// request ends there.
#[async_trait]
pub trait TranscriptionBackend: Send + Sync {
    /// Engine name reported in the document metadata line.
    fn engine(&self) -> Engine;

    /// Model identifier sent to the API.
    fn model(&self) -> &str;

    /// Send the image and instructions; return the model's Markdown.
    async fn transcribe(
        &self,
        image: &UploadedImage,
        mode: TranscriptionMode,
    ) -> Result<BackendResponse, TranscriptionError>;
}

/// Resolve the backend for a request.
///
/// 1. **Pre-built backend** (`config.backend`) is used as-is.
/// 2. Otherwise the API key comes from `config.api_key`, then from the
///    engine's environment variable. No key means
///    [`NotesError::MissingApiKey`], raised before any network call.
pub fn resolve_backend(
    config: &ConversionConfig,
) -> Result<Arc<dyn TranscriptionBackend>, NotesError> {
    if let Some(ref backend) = config.backend {
        return Ok(Arc::clone(backend));
    }

    let api_key = resolve_api_key(config)?;

    let backend: Arc<dyn TranscriptionBackend> = match config.engine {
        Engine::Groq => Arc::new(ChatCompletionsBackend::new(api_key, config)),
        Engine::Gemini => Arc::new(GeminiBackend::new(api_key, config)),
    };
    debug!(
        "Resolved {} backend (model {})",
        backend.engine(),
        backend.model()
    );
    Ok(backend)
}

fn resolve_api_key(config: &ConversionConfig) -> Result<String, NotesError> {
    let from_config = config
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string);

    let env_var = config.engine.api_key_env();
    from_config
        .or_else(|| {
            std::env::var(env_var)
                .ok()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
        })
        .ok_or_else(|| NotesError::MissingApiKey {
            engine: config.engine,
            env_var: env_var.to_string(),
        })
}

/// Send one chat request through the provider.
///
/// The provider's own HTTP client has no per-call deadline, so
/// `timeout_secs` is enforced here. An empty string is the only answer
/// treated as "no content"; whitespace still yields an (empty) document.
pub(crate) async fn send_chat(
    provider: &dyn LLMProvider,
    messages: &[ChatMessage],
    options: &CompletionOptions,
    timeout_secs: Option<u64>,
) -> Result<BackendResponse, TranscriptionError> {
    let call = provider.chat(messages, Some(options));
    let response = match timeout_secs {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), call)
            .await
            .map_err(|_| TranscriptionError::Timeout { secs })??,
        None => call.await?,
    };

    if response.content.is_empty() {
        return Err(TranscriptionError::EmptyContent);
    }

    Ok(BackendResponse {
        content: response.content,
        prompt_tokens: token_count(response.prompt_tokens),
        completion_tokens: token_count(response.completion_tokens),
    })
}

/// Providers report 0 when the API sent no usage block.
fn token_count(n: usize) -> Option<u32> {
    (n > 0).then(|| u32::try_from(n).unwrap_or(u32::MAX))
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use edgequake_llm::{
        ChatMessage, CompletionOptions, LLMProvider, LLMResponse, LlmError, Result,
    };
    use std::sync::Mutex;
    use std::time::Duration;

    /// Provider that records what it was sent and replays one answer.
    pub(crate) struct RecordingProvider {
        pub answer: Mutex<Option<Result<LLMResponse>>>,
        pub delay: Option<Duration>,
        pub messages: Mutex<Vec<ChatMessage>>,
        pub options: Mutex<Option<CompletionOptions>>,
    }

    impl RecordingProvider {
        pub(crate) fn replying(content: &str) -> Self {
            let mut response = LLMResponse::new(content, "recorded-model");
            response.prompt_tokens = 900;
            response.completion_tokens = 30;
            Self::with_answer(Ok(response))
        }

        pub(crate) fn failing(err: LlmError) -> Self {
            Self::with_answer(Err(err))
        }

        fn with_answer(answer: Result<LLMResponse>) -> Self {
            Self {
                answer: Mutex::new(Some(answer)),
                delay: None,
                messages: Mutex::new(Vec::new()),
                options: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl LLMProvider for RecordingProvider {
        fn name(&self) -> &str {
            "recording"
        }

        fn model(&self) -> &str {
            "recorded-model"
        }

        fn max_context_length(&self) -> usize {
            8192
        }

        async fn complete(&self, prompt: &str) -> Result<LLMResponse> {
            self.chat(&[ChatMessage::user(prompt)], None).await
        }

        async fn complete_with_options(
            &self,
            prompt: &str,
            options: &CompletionOptions,
        ) -> Result<LLMResponse> {
            self.chat(&[ChatMessage::user(prompt)], Some(options)).await
        }

        async fn chat(
            &self,
            messages: &[ChatMessage],
            options: Option<&CompletionOptions>,
        ) -> Result<LLMResponse> {
            self.messages.lock().unwrap().extend_from_slice(messages);
            *self.options.lock().unwrap() = options.cloned();
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.answer
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(LlmError::Unknown("no answer queued".into())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::RecordingProvider;
    use super::*;
    use edgequake_llm::LlmError;

    #[test]
    fn explicit_key_wins() {
        let config = ConversionConfig::builder()
            .engine(Engine::Gemini)
            .api_key("  from-config ")
            .build()
            .unwrap();
        assert_eq!(resolve_api_key(&config).unwrap(), "from-config");
    }

    #[test]
    fn resolve_builds_engine_specific_backend() {
        let config = ConversionConfig::builder()
            .engine(Engine::Gemini)
            .api_key("k")
            .build()
            .unwrap();
        let backend = resolve_backend(&config).unwrap();
        assert_eq!(backend.engine(), Engine::Gemini);
        assert_eq!(backend.model(), "gemini-1.5-flash");

        let config = ConversionConfig::builder()
            .api_key("k")
            .model("llama-custom")
            .build()
            .unwrap();
        let backend = resolve_backend(&config).unwrap();
        assert_eq!(backend.engine(), Engine::Groq);
        assert_eq!(backend.model(), "llama-custom");
    }

    #[tokio::test]
    async fn send_chat_reports_usage() {
        let provider = RecordingProvider::replying("# Title");
        let resp = send_chat(
            &provider,
            &[ChatMessage::user("x")],
            &CompletionOptions::default(),
            None,
        )
        .await
        .unwrap();
        assert_eq!(resp.content, "# Title");
        assert_eq!(resp.prompt_tokens, Some(900));
        assert_eq!(resp.completion_tokens, Some(30));
    }

    #[tokio::test]
    async fn empty_string_is_empty_content_but_whitespace_is_not() {
        let provider = RecordingProvider::replying("");
        let err = send_chat(&provider, &[], &CompletionOptions::default(), None)
            .await
            .unwrap_err();
        assert_eq!(err, TranscriptionError::EmptyContent);

        let provider = RecordingProvider::replying("  \n");
        let resp = send_chat(&provider, &[], &CompletionOptions::default(), None)
            .await
            .unwrap();
        assert_eq!(resp.content, "  \n");
    }

    #[tokio::test]
    async fn provider_errors_are_mapped() {
        let provider = RecordingProvider::failing(LlmError::AuthError("bad key".into()));
        let err = send_chat(&provider, &[], &CompletionOptions::default(), None)
            .await
            .unwrap_err();
        assert_eq!(err, TranscriptionError::Auth("bad key".into()));
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let mut provider = RecordingProvider::replying("late");
        provider.delay = Some(Duration::from_secs(30));
        let err = send_chat(&provider, &[], &CompletionOptions::default(), Some(1))
            .await
            .unwrap_err();
        assert_eq!(err, TranscriptionError::Timeout { secs: 1 });
    }

    #[test]
    fn zero_tokens_means_unreported() {
        assert_eq!(token_count(0), None);
        assert_eq!(token_count(42), Some(42));
    }
}
