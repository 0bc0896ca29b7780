//! Progress-callback trait for conversion stage events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to be told
//! when the backend call starts and ends and when the document is ready.
//! The CLI uses it to drive a spinner while the model is reading the photo;
//! a server could forward the same events to a WebSocket.
//!
//! # Example
//!
//! ```rust
//! use edgequake_notes2docx::{ConversionConfig, ConversionProgressCallback, Engine};
//! use std::sync::Arc;
//!
//! struct Announce;
//!
//! impl ConversionProgressCallback for Announce {
//!     fn on_transcription_start(&self, engine: Engine) {
//!         eprintln!("{engine} is analyzing your note…");
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(Arc::new(Announce))
//!     .build()
//!     .unwrap();
//! ```

use crate::config::Engine;
use std::sync::Arc;

/// Called by the conversion pipeline at each stage boundary.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called just before the backend request is sent.
    fn on_transcription_start(&self, engine: Engine) {
        let _ = engine;
    }

    /// Called when the backend returned Markdown.
    ///
    /// * `markdown_len` — byte length of the raw Markdown
    fn on_transcription_complete(&self, engine: Engine, markdown_len: usize) {
        let _ = (engine, markdown_len);
    }

    /// Called when the backend call failed. No document follows.
    fn on_transcription_error(&self, engine: Engine, error: &str) {
        let _ = (engine, error);
    }

    /// Called once the `.docx` bytes have been produced.
    ///
    /// * `block_count`    — transcribed blocks in the body
    /// * `document_bytes` — size of the serialised document
    fn on_document_ready(&self, block_count: usize, document_bytes: usize) {
        let _ = (block_count, document_bytes);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
