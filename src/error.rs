//! Error types for the edgequake-notes2docx library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`NotesError`] — **Fatal**: the request cannot produce a document
//!   (unsupported image, missing API key, transcription failed, output not
//!   writable). Returned as `Err(NotesError)` from the top-level `convert*`
//!   functions.
//!
//! * [`TranscriptionError`] — the reason a single backend call failed. It is
//!   stored inside [`crate::output::TranscriptionResult::Failed`] so the
//!   transcription client can report failure without propagating an error.
//!   [`crate::convert::convert`] turns it into
//!   [`NotesError::TranscriptionFailed`].
//!
//! Image-embedding failures are not errors at all: the assembler recovers
//! locally with a placeholder paragraph.

use crate::config::Engine;
use edgequake_llm::LlmError;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-notes2docx library.
#[derive(Debug, Error)]
pub enum NotesError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input image was not found at the given path.
    #[error("Image file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The upload is not a jpg, jpeg or png file.
    #[error("Unsupported image type '{extension}' for '{name}'\nAccepted types: jpg, jpeg, png.")]
    UnsupportedImageType { name: String, extension: String },

    // ── Backend errors ────────────────────────────────────────────────────
    /// No API key was supplied for the selected engine.
    #[error("API key required for {engine}.\nSet {env_var} or pass --api-key.")]
    MissingApiKey { engine: Engine, env_var: String },

    /// The transcription backend call failed; no document was produced.
    #[error("Failed to process with {engine}: {reason}")]
    TranscriptionFailed { engine: Engine, reason: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// The Word document could not be serialised.
    #[error("Failed to build Word document: {0}")]
    DocumentBuildFailed(String),

    /// Could not create or write the output document.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Why a transcription backend call failed.
///
/// None of these are retried. They are reported identically to the user as
/// "failed to process", with the message attached.
#[derive(Debug, Clone, Error, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TranscriptionError {
    /// The provider rejected the API key.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The provider is throttling this key.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Transport-level failure (DNS, TLS, connection reset, …).
    #[error("request failed: {0}")]
    Network(String),

    /// The API answered with an error (bad request, unknown model, …).
    #[error("API error: {0}")]
    Api(String),

    /// The response body was not the shape the provider expects.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The model answered but returned no text.
    #[error("the model returned no content")]
    EmptyContent,

    /// The call exceeded the configured `api_timeout_secs`.
    #[error("timed out after {secs}s")]
    Timeout { secs: u64 },
}

impl From<LlmError> for TranscriptionError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::AuthError(msg) => TranscriptionError::Auth(msg),
            LlmError::RateLimited(msg) => TranscriptionError::RateLimited(msg),
            LlmError::NetworkError(msg) => TranscriptionError::Network(msg),
            LlmError::ApiError(msg) => TranscriptionError::Api(msg),
            LlmError::Timeout => TranscriptionError::Network("request timed out".into()),
            LlmError::SerializationError(e) => TranscriptionError::MalformedResponse(e.to_string()),
            other => TranscriptionError::Api(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_display_names_env_var() {
        let e = NotesError::MissingApiKey {
            engine: Engine::Groq,
            env_var: "GROQ_API_KEY".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("GROQ_API_KEY"), "got: {msg}");
        assert!(msg.contains("groq"), "got: {msg}");
    }

    #[test]
    fn transcription_failed_display() {
        let e = NotesError::TranscriptionFailed {
            engine: Engine::Gemini,
            reason: TranscriptionError::EmptyContent.to_string(),
        };
        let msg = e.to_string();
        assert!(msg.starts_with("Failed to process with gemini"), "got: {msg}");
        assert!(msg.contains("no content"));
    }

    #[test]
    fn unsupported_type_display() {
        let e = NotesError::UnsupportedImageType {
            name: "notes.gif".into(),
            extension: "gif".into(),
        };
        assert!(e.to_string().contains("'gif'"));
        assert!(e.to_string().contains("jpg, jpeg, png"));
    }

    #[test]
    fn llm_errors_keep_their_category() {
        assert_eq!(
            TranscriptionError::from(LlmError::AuthError("invalid api key".into())),
            TranscriptionError::Auth("invalid api key".into())
        );
        assert_eq!(
            TranscriptionError::from(LlmError::RateLimited("slow down".into())),
            TranscriptionError::RateLimited("slow down".into())
        );
        assert!(matches!(
            TranscriptionError::from(LlmError::Timeout),
            TranscriptionError::Network(_)
        ));
        let e = TranscriptionError::from(LlmError::ModelNotFound("llama-9".into()));
        assert!(matches!(e, TranscriptionError::Api(_)));
        assert!(e.to_string().contains("llama-9"), "got: {e}");
        assert_eq!(
            TranscriptionError::from(LlmError::ApiError("No choices".into())),
            TranscriptionError::Api("No choices".into())
        );
    }

    #[test]
    fn bad_json_is_malformed() {
        let json_err = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        assert!(matches!(
            TranscriptionError::from(LlmError::SerializationError(json_err)),
            TranscriptionError::MalformedResponse(_)
        ));
    }

    #[test]
    fn timeout_display() {
        let e = TranscriptionError::Timeout { secs: 30 };
        assert!(e.to_string().contains("30s"));
    }
}
