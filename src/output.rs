//! Result types returned by the transcription client and the converters.

use crate::config::Engine;
use crate::document::Block;
use crate::error::TranscriptionError;
use serde::{Deserialize, Serialize};

/// MIME type of the produced document.
pub const DOCX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// File name offered when the document is handed to a user for download.
pub const DEFAULT_DOWNLOAD_NAME: &str = "chemistry_notes_structured.docx";

/// A successful transcription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub engine: Engine,
    pub model: String,
    /// Markdown exactly as returned by the model.
    pub markdown: String,
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
    pub duration_ms: u64,
}

/// Outcome of one transcription call: the full Markdown or a failure.
///
/// There are no partial results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TranscriptionResult {
    Success(Transcript),
    Failed {
        engine: Engine,
        error: TranscriptionError,
    },
}

impl TranscriptionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, TranscriptionResult::Success(_))
    }

    pub fn engine(&self) -> Engine {
        match self {
            TranscriptionResult::Success(t) => t.engine,
            TranscriptionResult::Failed { engine, .. } => *engine,
        }
    }

    /// The Markdown, if the call succeeded.
    pub fn markdown(&self) -> Option<&str> {
        match self {
            TranscriptionResult::Success(t) => Some(&t.markdown),
            TranscriptionResult::Failed { .. } => None,
        }
    }
}

/// Everything produced by one conversion.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionOutput {
    /// Cleaned Markdown that was mapped into the document.
    pub markdown: String,
    /// Document blocks in source-line order.
    pub blocks: Vec<Block>,
    /// Serialised `.docx` file.
    #[serde(skip)]
    pub docx: Vec<u8>,
    pub stats: ConversionStats,
}

/// Per-conversion statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    pub engine: Engine,
    pub model: String,
    pub block_count: usize,
    /// False when the reference photo was replaced by a placeholder.
    pub image_embedded: bool,
    pub document_bytes: usize,
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
    pub transcription_duration_ms: u64,
    pub total_duration_ms: u64,
}
