//! Document model: from transcribed Markdown to a Word file.
//!
//! ```text
//! markdown ──▶ map_markdown ──▶ assemble ──▶ render_docx
//!  (text)       (Vec<Block>)    (DocumentModel)  (.docx bytes)
//! ```
//!
//! 1. [`markdown`] — line-prefix classification, one block per non-blank line
//! 2. [`assemble`] — title, engine line, separators, blocks, reference photo
//! 3. [`docx`]     — Office Open XML serialisation via `docx-rs`

pub mod assemble;
pub mod docx;
pub mod markdown;

pub use assemble::{assemble, DocumentModel, DocumentPart, ReferenceImage};
pub use docx::render_docx;
pub use markdown::map_markdown;

use serde::{Deserialize, Serialize};

/// One typed element of the document body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Block {
    /// `#`, `##` or `###` heading; the prefix is stripped.
    Heading { level: u8, text: String },
    /// `- ` or `* ` list item; the marker is stripped.
    Bullet(String),
    /// A `[DIAGRAM…]` placeholder line, kept verbatim.
    Diagram(String),
    /// Anything else.
    Paragraph(String),
}
