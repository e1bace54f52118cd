//! In-memory document model shared by the converter and the serializer.

use crate::locale::Locale;
use crate::request::DocumentRequest;
use serde::{Deserialize, Serialize};

/// One rendered unit of document structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// Centered document title (heading level 0).
    Title { text: String },
    /// Heading, level 1–4.
    Heading { level: u8, text: String },
    /// Bulleted paragraph; `indent_level` adds 0.25" of left indent per level.
    Bullet { indent_level: usize, text: String },
    /// Numbered paragraph.
    Numbered { text: String },
    /// Plain paragraph.
    Paragraph { text: String },
    /// Empty paragraph, keeps vertical spacing.
    Empty,
}

/// An append-only sequence of blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Append all blocks of `other`, in order.
    pub fn append(&mut self, other: Document) {
        self.blocks.extend(other.blocks);
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Fixed blocks that open every generated document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentHeader {
    pub title: String,
    pub topic: String,
    pub grade_level: String,
    pub duration_minutes: Option<u32>,
}

impl DocumentHeader {
    /// Header for `request`: title is `"{subject} - {label}"`, with the
    /// label in `locale` unless the request names one.
    pub fn for_request(request: &DocumentRequest, locale: Locale) -> Self {
        Self {
            title: format!(
                "{} - {}",
                request.subject.trim(),
                request.display_label(locale)
            ),
            topic: request.topic.trim().to_string(),
            grade_level: request.grade_level.trim().to_string(),
            duration_minutes: request.duration_minutes(),
        }
    }

    /// Title, topic heading, grade heading, then the optional duration line.
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        doc.push(Block::Title {
            text: self.title.clone(),
        });
        doc.push(Block::Heading {
            level: 2,
            text: format!("Topic: {}", self.topic),
        });
        doc.push(Block::Heading {
            level: 3,
            text: format!("Grade Level: {}", self.grade_level),
        });
        if let Some(minutes) = self.duration_minutes {
            doc.push(Block::Paragraph {
                text: format!("Duration: {minutes} minutes"),
            });
        }
        doc
    }
}

/// Header blocks followed by the converted body.
pub fn compose(header: &DocumentHeader, body: Document) -> Document {
    let mut doc = header.to_document();
    doc.append(body);
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::DocumentKind;

    #[test]
    fn lesson_plan_header_has_duration() {
        let req = DocumentRequest::new(DocumentKind::LessonPlan, "History", "Grade 8", "Rome");
        let doc = DocumentHeader::for_request(&req, Locale::En).to_document();
        assert_eq!(
            doc.blocks(),
            &[
                Block::Title {
                    text: "History - Lesson Plan".into()
                },
                Block::Heading {
                    level: 2,
                    text: "Topic: Rome".into()
                },
                Block::Heading {
                    level: 3,
                    text: "Grade Level: Grade 8".into()
                },
                Block::Paragraph {
                    text: "Duration: 50 minutes".into()
                },
            ]
        );
    }

    #[test]
    fn portuguese_title_uses_portuguese_label() {
        let req = DocumentRequest::new(DocumentKind::MindMap, "História", "8º ano", "Roma");
        let header = DocumentHeader::for_request(&req, Locale::Pt);
        assert_eq!(header.title, "História - Mapa Mental da Aula");
    }

    #[test]
    fn mind_map_header_has_no_duration() {
        let req = DocumentRequest::new(DocumentKind::MindMap, "History", "Grade 8", "Rome");
        let doc = DocumentHeader::for_request(&req, Locale::En).to_document();
        assert_eq!(doc.len(), 3);
        assert_eq!(
            doc.blocks()[0],
            Block::Title {
                text: "History - Lesson Mind Map".into()
            }
        );
    }

    #[test]
    fn compose_keeps_body_order() {
        let header = DocumentHeader {
            title: "T".into(),
            topic: "x".into(),
            grade_level: "y".into(),
            duration_minutes: None,
        };
        let mut body = Document::new();
        body.push(Block::Paragraph { text: "one".into() });
        body.push(Block::Empty);
        let doc = compose(&header, body);
        assert_eq!(doc.len(), 5);
        assert_eq!(doc.blocks()[3], Block::Paragraph { text: "one".into() });
        assert_eq!(doc.blocks()[4], Block::Empty);
    }
}
