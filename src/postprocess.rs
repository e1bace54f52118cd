//! Deterministic cleanup of raw LLM output before conversion.
//!
//! Even with explicit formatting rules in the prompt, models occasionally:
//!
//! - wrap the whole answer in ` ```markdown ... ``` ` fences,
//! - answer with Windows-style `\r\n` line endings,
//! - sprinkle zero-width spaces or a BOM into the text.
//!
//! None of these carry content, and each would otherwise surface in the
//! Word document as a stray paragraph or invisible junk. The rules here are
//! pure `&str → String` passes, applied in a fixed order.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules, in order:
///
/// 1. Normalise line endings (CRLF / CR → LF)
/// 2. Strip an outer markdown fence wrapping the whole response
/// 3. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens, …)
pub fn tidy_response(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = strip_markdown_fences(&s);
    remove_invisible_chars(&s)
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Strip outer markdown fences ──────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:markdown|md)?[ \t]*\n(.*)\n```\s*$").unwrap());

fn strip_markdown_fences(input: &str) -> String {
    if let Some(caps) = RE_OUTER_FENCES.captures(input.trim()) {
        caps[1].to_string()
    } else {
        input.to_string()
    }
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
