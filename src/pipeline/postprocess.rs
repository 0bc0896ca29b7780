//! Post-processing: deterministic cleanup of model output before mapping.
//!
//! Even with "output Markdown only" in the prompt, vision models sometimes
//! wrap the answer in a ```` ```markdown ```` fence, answer with CRLF line
//! endings, or leak zero-width characters copied from training data. The
//! mapper classifies lines by their first characters, so each of these would
//! turn into a stray paragraph or hide a heading prefix.
//!
//! Rules (applied in order):
//! 1. Strip one outer code fence around the whole answer
//! 2. Normalise line endings (CRLF / CR → LF)
//! 3. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens, …)
//! 4. Strip control characters that XML 1.0 forbids (everything below
//!    U+0020 except tab and newline, plus U+FFFE/U+FFFF); Word refuses to
//!    open a document containing them
//!
//! Blank lines are left alone; the mapper drops them.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all post-processing rules to the raw model output.
pub fn clean_markdown(input: &str) -> String {
    let s = strip_markdown_fences(input);
    let s = normalise_line_endings(&s);
    let s = remove_invisible_chars(&s);
    remove_control_chars(&s)
}

// ── Rule 1: Strip outer markdown fences ──────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^```(?:markdown|md)?[ \t]*\r?\n(.*?)\r?\n```\s*$").unwrap()
});

fn strip_markdown_fences(input: &str) -> String {
    if let Some(caps) = RE_OUTER_FENCES.captures(input.trim()) {
        caps[1].to_string()
    } else {
        input.to_string()
    }
}

// ── Rule 2: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 3: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 4: Remove XML-illegal control characters ────────────────────────────

fn remove_control_chars(input: &str) -> String {
    input
        .chars()
        .filter(|&c| !is_xml_illegal(c))
        .collect()
}

fn is_xml_illegal(c: char) -> bool {
    matches!(
        c,
        '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}'
    )
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fences() {
        let input = "```markdown\n# Hello\nWorld\n```";
        assert_eq!(strip_markdown_fences(input), "# Hello\nWorld");
    }

    #[test]
    fn test_strip_fences_no_lang() {
        let input = "```\n# Hello\nWorld\n```";
        assert_eq!(strip_markdown_fences(input), "# Hello\nWorld");
    }

    #[test]
    fn test_strip_fences_crlf() {
        let input = "```md\r\n# Hello\r\n```\r\n";
        assert_eq!(strip_markdown_fences(input), "# Hello");
    }

    #[test]
    fn test_no_fences_passthrough() {
        let input = "# Hello\nWorld";
        assert_eq!(strip_markdown_fences(input), "# Hello\nWorld");
    }

    #[test]
    fn test_inner_code_block_kept() {
        let input = "# Rates\n```\nk = A e^(-Ea/RT)\n```\nend";
        assert_eq!(strip_markdown_fences(input), input);
    }

    #[test]
    fn test_normalise_line_endings() {
        assert_eq!(normalise_line_endings("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn test_remove_invisible() {
        let input = "hello\u{200B}world\u{FEFF}foo\u{00AD}bar";
        assert_eq!(remove_invisible_chars(input), "helloworldfoobar");
    }

    #[test]
    fn test_remove_control_chars() {
        let input = "H\u{8}Cl\u{0} + \u{B}NaOH\u{1B}[0m\u{C}";
        assert_eq!(remove_control_chars(input), "HCl + NaOH[0m");
    }

    #[test]
    fn test_tab_and_newline_survive() {
        let input = "- a\tb\n- c\u{1F}";
        assert_eq!(remove_control_chars(input), "- a\tb\n- c");
    }

    #[test]
    fn test_carriage_return_becomes_newline_not_dropped() {
        assert_eq!(clean_markdown("# A\r- b\u{7}"), "# A\n- b");
    }

    #[test]
    fn test_bom_before_heading_is_removed() {
        assert_eq!(clean_markdown("\u{FEFF}# Acids"), "# Acids");
    }

    #[test]
    fn test_clean_markdown_full_pipeline() {
        let input = "```markdown\r\n# Title\r\n\r\n- H\u{200B}Cl\r\n```";
        assert_eq!(clean_markdown(input), "# Title\n\n- HCl");
    }
}
