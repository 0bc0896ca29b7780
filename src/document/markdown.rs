//! Markdown-to-block mapping.
//!
//! This is deliberately a line classifier, not a Markdown parser. Each
//! non-blank line becomes exactly one [`Block`], in input order. The first
//! matching prefix wins:
//!
//! | Prefix (after trimming) | Block |
//! |-------------------------|-------|
//! | `### `            | `Heading { level: 3 }` |
//! | `## `             | `Heading { level: 2 }` |
//! | `# `              | `Heading { level: 1 }` |
//! | `- ` or `* `      | `Bullet` |
//! | `[DIAGRAM`        | `Diagram` (verbatim) |
//! | anything else     | `Paragraph` |
//!
//! No nested lists, inline emphasis or tables: `**bold**` stays literal and
//! a table row becomes a paragraph.

use super::Block;

/// Heading prefixes, longest first so `### ` is never read as `# `.
const HEADING_PREFIXES: [(&str, u8); 3] = [("### ", 3), ("## ", 2), ("# ", 1)];

const BULLET_PREFIXES: [&str; 2] = ["- ", "* "];

const DIAGRAM_PREFIX: &str = "[DIAGRAM";

/// Map Markdown text to document blocks, one per non-blank line.
pub fn map_markdown(markdown: &str) -> Vec<Block> {
    markdown
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(classify_line)
        .collect()
}

/// Classify a single trimmed, non-blank line.
pub fn classify_line(line: &str) -> Block {
    for (prefix, level) in HEADING_PREFIXES {
        if let Some(text) = line.strip_prefix(prefix) {
            return Block::Heading {
                level,
                text: text.to_string(),
            };
        }
    }

    for prefix in BULLET_PREFIXES {
        if let Some(text) = line.strip_prefix(prefix) {
            return Block::Bullet(text.to_string());
        }
    }

    if line.starts_with(DIAGRAM_PREFIX) {
        return Block::Diagram(line.to_string());
    }

    Block::Paragraph(line.to_string())
}
