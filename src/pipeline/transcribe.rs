//! Transcription client: drive one backend call and never propagate errors.
//!
//! This module is intentionally thin. Prompt wording lives in
//! [`crate::prompts`] and the wire protocols in [`crate::backends`]; here we
//! only time the call, log it, and fold any failure into a
//! [`TranscriptionResult::Failed`] so callers get a value back in every case.
//!
//! There is no retry. A failed call ends the request.

use crate::backends::TranscriptionBackend;
use crate::config::TranscriptionMode;
use crate::output::{Transcript, TranscriptionResult};
use crate::pipeline::intake::UploadedImage;
use std::time::Instant;
use tracing::{debug, error, info};

/// Transcribe a photo with the given backend.
///
/// Always returns a `TranscriptionResult`; check `is_success()` or match on
/// it to decide whether to build a document.
pub async fn transcribe(
    backend: &dyn TranscriptionBackend,
    image: &UploadedImage,
    mode: TranscriptionMode,
) -> TranscriptionResult {
    let engine = backend.engine();
    let start = Instant::now();
    info!(
        "{} ({}) is analyzing '{}'",
        engine,
        backend.model(),
        image.name
    );

    match backend.transcribe(image, mode).await {
        Ok(response) => {
            let duration = start.elapsed();
            debug!(
                "{}: {:?} input tokens, {:?} output tokens, {} chars, {:?}",
                engine,
                response.prompt_tokens,
                response.completion_tokens,
                response.content.len(),
                duration
            );
            TranscriptionResult::Success(Transcript {
                engine,
                model: backend.model().to_string(),
                markdown: response.content,
                input_tokens: response.prompt_tokens,
                output_tokens: response.completion_tokens,
                duration_ms: duration.as_millis() as u64,
            })
        }
        Err(e) => {
            error!("{} error: {}", engine, e);
            TranscriptionResult::Failed { engine, error: e }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::BackendResponse;
    use crate::config::Engine;
    use crate::error::TranscriptionError;
    use async_trait::async_trait;

    struct Fixed(Result<BackendResponse, TranscriptionError>);

    #[async_trait]
    impl TranscriptionBackend for Fixed {
        fn engine(&self) -> Engine {
            Engine::Gemini
        }

        fn model(&self) -> &str {
            "fixed"
        }

        async fn transcribe(
            &self,
            _image: &UploadedImage,
            _mode: TranscriptionMode,
        ) -> Result<BackendResponse, TranscriptionError> {
            self.0.clone()
        }
    }

    fn upload() -> UploadedImage {
        UploadedImage::from_bytes(vec![0], "a.png").unwrap()
    }

    #[tokio::test]
    async fn success_carries_markdown_and_usage() {
        let backend = Fixed(Ok(BackendResponse {
            content: "# Title".into(),
            prompt_tokens: Some(10),
            completion_tokens: Some(2),
        }));
        let result = transcribe(&backend, &upload(), TranscriptionMode::Relaxed).await;

        assert!(result.is_success());
        assert_eq!(result.markdown(), Some("# Title"));
        match result {
            TranscriptionResult::Success(t) => {
                assert_eq!(t.engine, Engine::Gemini);
                assert_eq!(t.model, "fixed");
                assert_eq!(t.input_tokens, Some(10));
            }
            TranscriptionResult::Failed { .. } => unreachable!(),
        }
    }

    #[tokio::test]
    async fn backend_error_becomes_failed_result() {
        let backend = Fixed(Err(TranscriptionError::Network("connection refused".into())));
        let result = transcribe(&backend, &upload(), TranscriptionMode::Strict).await;

        assert!(!result.is_success());
        assert_eq!(result.markdown(), None);
        assert_eq!(result.engine(), Engine::Gemini);
        match result {
            TranscriptionResult::Failed { error, .. } => {
                assert!(error.to_string().contains("connection refused"));
            }
            TranscriptionResult::Success(_) => unreachable!(),
        }
    }

    #[test]
    fn empty_content_fails_without_a_runtime() {
        let backend = Fixed(Err(TranscriptionError::EmptyContent));
        let result = tokio_test::block_on(transcribe(
            &backend,
            &upload(),
            TranscriptionMode::Relaxed,
        ));
        assert!(matches!(
            result,
            TranscriptionResult::Failed {
                error: TranscriptionError::EmptyContent,
                ..
            }
        ));
    }
}
