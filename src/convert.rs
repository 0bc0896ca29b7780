//! Conversion entry points: photo in, `.docx` out.
//!
//! Every entry point funnels into the same linear pipeline:
//!
//! ```text
//! intake ──▶ backend ──▶ transcribe ──▶ postprocess ──▶ map ──▶ assemble ──▶ render
//! ```
//!
//! The request ends at the first fatal error. A failed transcription
//! produces no document; an image that cannot be embedded does not fail the
//! request.

use crate::backends::resolve_backend;
use crate::config::ConversionConfig;
use crate::document::{assemble, map_markdown, render_docx};
use crate::error::NotesError;
use crate::output::{ConversionOutput, ConversionStats, TranscriptionResult};
use crate::pipeline::{intake::UploadedImage, postprocess, transcribe};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Convert a photo on disk to a Word document held in memory.
///
/// # Errors
/// - File not found, permission denied, or not a jpg/jpeg/png
/// - No API key for the selected engine (before any network call)
/// - The backend call failed ([`NotesError::TranscriptionFailed`])
/// - The document could not be serialised
pub async fn convert(
    input: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, NotesError> {
    let input = input.as_ref();
    info!("Starting conversion: {}", input.display());
    let upload = UploadedImage::from_path(input)?;
    convert_upload(upload, config).await
}

/// Convert an uploaded photo held in memory.
///
/// `file_name` supplies the extension used for validation and the MIME type.
///
/// # Example
/// ```rust,no_run
/// use edgequake_notes2docx::{convert_from_bytes, ConversionConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes = std::fs::read("notes.jpg")?;
/// let output = convert_from_bytes(bytes, "notes.jpg", &ConversionConfig::default()).await?;
/// std::fs::write("notes.docx", &output.docx)?;
/// # Ok(())
/// # }
/// ```
pub async fn convert_from_bytes(
    bytes: Vec<u8>,
    file_name: &str,
    config: &ConversionConfig,
) -> Result<ConversionOutput, NotesError> {
    info!("Starting conversion of upload '{}'", file_name);
    let upload = UploadedImage::from_bytes(bytes, file_name)?;
    convert_upload(upload, config).await
}

/// Convert a photo and write the document to `output_path`.
///
/// Uses atomic write (temp file + rename) so a failed request never leaves
/// a half-written document behind.
pub async fn convert_to_file(
    input: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionStats, NotesError> {
    let output = convert(input, config).await?;
    let path = output_path.as_ref();
    write_atomic(path, &output.docx).await?;
    info!("Wrote {}", path.display());
    Ok(output.stats)
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, NotesError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| NotesError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(input, config))
}

/// Per-request output path: `<stem>_structured.docx` next to the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "notes".to_string());
    input.with_file_name(format!("{stem}_structured.docx"))
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn convert_upload(
    upload: UploadedImage,
    config: &ConversionConfig,
) -> Result<ConversionOutput, NotesError> {
    let total_start = Instant::now();

    // ── Step 1: Resolve backend (fails here on a missing key) ────────────
    let backend = resolve_backend(config)?;
    let engine = backend.engine();

    // ── Step 2: Stage the upload ─────────────────────────────────────────
    let staged = upload.stage()?;

    // ── Step 3: Transcribe ───────────────────────────────────────────────
    if let Some(ref cb) = config.progress_callback {
        cb.on_transcription_start(engine);
    }
    let transcript =
        match transcribe::transcribe(backend.as_ref(), staged.image(), config.mode).await {
            TranscriptionResult::Success(t) => {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_transcription_complete(engine, t.markdown.len());
                }
                t
            }
            TranscriptionResult::Failed { engine, error } => {
                let reason = error.to_string();
                if let Some(ref cb) = config.progress_callback {
                    cb.on_transcription_error(engine, &reason);
                }
                return Err(NotesError::TranscriptionFailed { engine, reason });
            }
        };

    // ── Step 4: Clean and map Markdown ───────────────────────────────────
    let markdown = postprocess::clean_markdown(&transcript.markdown);
    let blocks = map_markdown(&markdown);
    debug!("Mapped {} blocks", blocks.len());

    // ── Step 5: Assemble and render (CPU-bound: image decode + zip) ──────
    let image_path = staged.path().to_path_buf();
    let body = blocks.clone();
    let width = config.image_width_inches;
    let (docx, image_embedded) = tokio::task::spawn_blocking(move || {
        let model = assemble(body, engine, &image_path, width);
        let embedded = model
            .reference_image()
            .map(|img| img.is_embedded())
            .unwrap_or(false);
        render_docx(&model).map(|bytes| (bytes, embedded))
    })
    .await
    .map_err(|e| NotesError::Internal(format!("Render task panicked: {}", e)))??;

    // ── Step 6: Remove the temp file ─────────────────────────────────────
    let staged_path = staged.cleanup();
    debug!("Removed {}", staged_path.display());

    if let Some(ref cb) = config.progress_callback {
        cb.on_document_ready(blocks.len(), docx.len());
    }

    let stats = ConversionStats {
        engine,
        model: transcript.model,
        block_count: blocks.len(),
        image_embedded,
        document_bytes: docx.len(),
        input_tokens: transcript.input_tokens,
        output_tokens: transcript.output_tokens,
        transcription_duration_ms: transcript.duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Conversion complete: {} blocks, {} bytes, {}ms total",
        stats.block_count, stats.document_bytes, stats.total_duration_ms
    );

    Ok(ConversionOutput {
        markdown,
        blocks,
        docx,
        stats,
    })
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), NotesError> {
    let write_err = |source| NotesError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("docx.tmp");
    tokio::fs::write(&tmp_path, bytes).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)
}
