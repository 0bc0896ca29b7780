//! # edgequake-notes2docx
//!
//! Turn a photo of handwritten chemistry notes into a structured Word
//! document using a Vision Language Model.
//!
//! ## Why this crate?
//!
//! Classic OCR engines read printed text well but stumble on handwriting,
//! subscripts, reaction arrows and boxed side notes. A VLM reads the page as
//! a student would and can return clean Markdown with headings and lists.
//! This crate sends the photo to the model, maps the answer onto Word
//! headings, bullets and paragraphs, and attaches the original photo at the
//! end so every line can be checked against the source.
//!
//! ## Pipeline Overview
//!
//! ```text
//! photo (jpg/png)
//!  │
//!  ├─ 1. Intake      validate type, stage to a temp file
//!  ├─ 2. Transcribe  Groq (chat completions) or Gemini (generateContent)
//!  ├─ 3. Polish      strip fences, CRLF, invisible and control characters
//!  ├─ 4. Map         one block per non-blank line (heading/bullet/diagram/paragraph)
//!  ├─ 5. Assemble    title, engine line, blocks, reference photo
//!  └─ 6. Render      .docx bytes via docx-rs
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_notes2docx::{convert_to_file, ConversionConfig, Engine};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // API key read from GROQ_API_KEY
//!     let config = ConversionConfig::builder().engine(Engine::Groq).build()?;
//!     let stats = convert_to_file("notes.jpg", "notes.docx", &config).await?;
//!     eprintln!("{} blocks via {}", stats.block_count, stats.engine);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `notes2docx` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ## Engines
//!
//! | Engine | Default model | Key | Mode flag |
//! |--------|---------------|-----|-----------|
//! | `groq`   | `meta-llama/llama-4-maverick-17b-128e-instruct` | `GROQ_API_KEY` | yes |
//! | `gemini` | `gemini-1.5-flash` | `GEMINI_API_KEY` | no |
//!
//! Both engines run through [`edgequake_llm`] providers
//! (`OpenAIProvider::compatible` for Groq, `GeminiProvider` for Gemini).

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backends;
pub mod config;
pub mod convert;
pub mod document;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use backends::{resolve_backend, BackendResponse, TranscriptionBackend};
pub use config::{ConversionConfig, ConversionConfigBuilder, Engine, TranscriptionMode};
pub use convert::{convert, convert_from_bytes, convert_sync, convert_to_file, default_output_path};
pub use document::{assemble, map_markdown, render_docx, Block, DocumentModel, ReferenceImage};
pub use error::{NotesError, TranscriptionError};
pub use output::{
    ConversionOutput, ConversionStats, Transcript, TranscriptionResult, DEFAULT_DOWNLOAD_NAME,
    DOCX_MIME_TYPE,
};
pub use pipeline::intake::{StagedImage, UploadedImage};
pub use pipeline::transcribe::transcribe;
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
