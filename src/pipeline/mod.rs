//! Pipeline stages between the uploaded photo and the Markdown text.
//!
//! Each submodule implements exactly one step, so each is independently
//! testable and a backend can change without touching intake or cleanup.
//!
//! ## Data Flow
//!
//! ```text
//! intake ──▶ encode ──▶ transcribe ──▶ postprocess
//! (temp file) (base64)   (VLM call)     (cleanup)
//! ```
//!
//! 1. [`intake`]      — validate jpg/jpeg/png and stage the upload on disk
//! 2. [`encode`]      — base64-wrap the photo as provider `ImageData`
//! 3. [`transcribe`]  — one backend call; failures become a value, not an error
//! 4. [`postprocess`] — strip fences and invisible characters the mapper would trip on

pub mod encode;
pub mod intake;
pub mod postprocess;
pub mod transcribe;
