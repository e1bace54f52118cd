//! Markdown-subset to [`Document`] conversion.
//!
//! LLM output is treated as a stream of independent lines. Each line is
//! classified into exactly one [`Line`] variant and rendered as one
//! [`Block`], so the output always has one block per input line. There is
//! no multi-line state: lists are not grouped, paragraphs are not joined.
//!
//! Recognised syntax is deliberately narrow:
//!
//! | Input | Result |
//! |-------|--------|
//! | blank line | empty paragraph |
//! | `#`…`####…` + text | heading, level clamped to 1–4 |
//! | `- `, `* `, `• ` (any indent) | bullet, nesting = leading whitespace / 2 |
//! | `1. ` … `9) ` | numbered item (single digit only) |
//! | anything else | plain paragraph |
//!
//! Bold markers (`**text**`) are removed everywhere; the text keeps no
//! styling. Single asterisks, links and code spans pass through untouched.

use crate::document::{Block, Document};
use once_cell::sync::Lazy;
use regex::Regex;

/// Deepest heading level emitted.
pub const MAX_HEADING_LEVEL: u8 = 4;

/// Leading whitespace characters per nesting level.
pub const SPACES_PER_LEVEL: usize = 2;

const BULLET_MARKERS: [char; 3] = ['-', '*', '•'];

/// One classified input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Blank,
    Heading { level: u8, text: String },
    BulletItem { indent_level: usize, text: String },
    NumberedItem { text: String },
    Plain { text: String },
}

impl Line {
    /// Render this line as a block.
    ///
    /// Bullet nesting survives only when `hierarchy_aware` is set; otherwise
    /// every bullet is flat.
    pub fn into_block(self, hierarchy_aware: bool) -> Block {
        match self {
            Line::Blank => Block::Empty,
            Line::Heading { level, text } => Block::Heading { level, text },
            Line::BulletItem { indent_level, text } => Block::Bullet {
                indent_level: if hierarchy_aware { indent_level } else { 0 },
                text,
            },
            Line::NumberedItem { text } => Block::Numbered { text },
            Line::Plain { text } => Block::Paragraph { text },
        }
    }
}

/// Convert raw model output into a document body.
///
/// Splits on `\n` only; a trailing `\r` is removed by the trimming each
/// rule performs. Never fails.
pub fn convert(text: &str, hierarchy_aware: bool) -> Document {
    let mut doc = Document::new();
    for raw in text.split('\n') {
        doc.push(classify_line(raw).into_block(hierarchy_aware));
    }
    doc
}

/// Classify a single line. Rules are tried in order; the first match wins.
pub fn classify_line(raw: &str) -> Line {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Line::Blank;
    }

    if let Some(heading) = heading(trimmed) {
        return heading;
    }

    if let Some(bullet) = bullet(raw) {
        return bullet;
    }

    if let Some(text) = numbered_text(trimmed) {
        return Line::NumberedItem {
            text: strip_bold(text.trim()),
        };
    }

    Line::Plain {
        text: strip_bold(trimmed),
    }
}

/// `trimmed` must already be trimmed. A run of `#` with nothing after it
/// is not a heading.
fn heading(trimmed: &str) -> Option<Line> {
    let rest = trimmed.trim_start_matches('#');
    let hash_count = trimmed.len() - rest.len();
    if hash_count == 0 {
        return None;
    }
    let text = rest.trim();
    if text.is_empty() {
        return None;
    }
    let level = hash_count.min(MAX_HEADING_LEVEL as usize) as u8;
    Some(Line::Heading {
        level,
        text: strip_bold(text),
    })
}

fn bullet(raw: &str) -> Option<Line> {
    let body = raw.trim_start();
    let mut chars = body.chars();
    let marker = chars.next()?;
    if !BULLET_MARKERS.contains(&marker) || chars.next() != Some(' ') {
        return None;
    }

    let leading = raw.chars().count() - body.chars().count();
    let text = &body[marker.len_utf8() + 1..];
    Some(Line::BulletItem {
        indent_level: leading / SPACES_PER_LEVEL,
        text: strip_bold(text.trim()),
    })
}

/// Text after a single-digit ordinal such as `3. ` or `7) `.
fn numbered_text(trimmed: &str) -> Option<&str> {
    let bytes = trimmed.as_bytes();
    if bytes.len() < 3 || !bytes[0].is_ascii_digit() {
        return None;
    }
    match &bytes[1..3] {
        b". " | b") " => Some(&trimmed[3..]),
        _ => None,
    }
}

static RE_BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());

/// Replace every `**text**` pair with `text`, left to right.
/// An unpaired `**` is left as is.
pub fn strip_bold(text: &str) -> String {
    RE_BOLD.replace_all(text, "$1").into_owned()
}
