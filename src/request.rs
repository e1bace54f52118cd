//! What the user asked for: document kind, shared fields, per-kind options.
//!
//! [`DocumentRequest`] replaces the loose parameter map the form used to
//! hand around. Options live in a [`KindOptions`] enum so a lesson plan can
//! never carry mind-map knobs and vice versa.

use crate::locale::Locale;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kinds of document the generator knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    LessonPlan,
    LectureNotes,
    ExerciseList,
    MindMap,
    /// Listed in the form but not generated yet.
    Assessment,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 5] = [
        DocumentKind::LessonPlan,
        DocumentKind::LectureNotes,
        DocumentKind::ExerciseList,
        DocumentKind::MindMap,
        DocumentKind::Assessment,
    ];

    /// Canonical machine key, e.g. `lesson_plan`.
    pub fn key(&self) -> &'static str {
        match self {
            DocumentKind::LessonPlan => "lesson_plan",
            DocumentKind::LectureNotes => "lecture_notes",
            DocumentKind::ExerciseList => "exercise",
            DocumentKind::MindMap => "mind_map",
            DocumentKind::Assessment => "assessment",
        }
    }

    /// Look up a kind by its canonical key (case-insensitive).
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_lowercase();
        Self::ALL.into_iter().find(|k| k.key() == key)
    }

    /// Map a display label in any supported language to a kind.
    ///
    /// Exact labels are tried first, then the loose keyword rules that older
    /// saved forms relied on ("plano … aula", "mapa mental", ...).
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }

        for locale in Locale::ALL {
            if let Some(kind) = Self::ALL
                .into_iter()
                .find(|k| locale.kind_label(*k).to_lowercase() == normalized)
            {
                return Some(kind);
            }
        }

        let has = |needle: &str| normalized.contains(needle);
        if (has("plano") && has("aula")) || has("lesson plan") {
            Some(DocumentKind::LessonPlan)
        } else if (has("notas") && has("aula")) || has("lecture notes") {
            Some(DocumentKind::LectureNotes)
        } else if has("exercise") || has("exercício") {
            Some(DocumentKind::ExerciseList)
        } else if has("mind map") || has("mapa mental") {
            Some(DocumentKind::MindMap)
        } else if has("assessment") || has("avalia") {
            Some(DocumentKind::Assessment)
        } else {
            None
        }
    }

    /// Whether generation is available for this kind.
    pub fn is_supported(&self) -> bool {
        !matches!(self, DocumentKind::Assessment)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Locale::En.kind_label(*self))
    }
}

// ── Per-kind options ─────────────────────────────────────────────────────

/// Lesson plan fields. Text fields left as `None` (or blank) are sent to
/// the model as "Not specified".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LessonPlanOptions {
    /// Lesson length in minutes. Default: 50.
    pub duration_minutes: Option<u32>,
    pub learning_objectives: Option<String>,
    pub materials: Option<String>,
    pub methodology: Option<String>,
    pub assessment_strategy: Option<String>,
    pub lesson_flow: Option<String>,
    /// Ask for adaptations for diverse learners. Default: true.
    pub include_differentiation: bool,
}

impl Default for LessonPlanOptions {
    fn default() -> Self {
        Self {
            duration_minutes: Some(50),
            learning_objectives: None,
            materials: None,
            methodology: None,
            assessment_strategy: None,
            lesson_flow: None,
            include_differentiation: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LectureNotesOptions {
    /// e.g. "Basic", "Standard", "Detailed". Default: "Standard".
    pub detail_level: Option<String>,
    /// e.g. "Paragraphs", "Bullet Points", "Outline". Default: "Paragraphs".
    pub format_style: Option<String>,
    pub include_examples: bool,
    pub include_references: bool,
}

impl Default for LectureNotesOptions {
    fn default() -> Self {
        Self {
            detail_level: None,
            format_style: None,
            include_examples: true,
            include_references: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExerciseListOptions {
    /// Number of questions, at least 1. Default: 10.
    pub num_questions: u32,
    /// Default: "Medium".
    pub difficulty: String,
    /// Default: multiple choice and short answer.
    pub question_types: Vec<String>,
    pub include_answer_key: bool,
}

impl Default for ExerciseListOptions {
    fn default() -> Self {
        Self {
            num_questions: 10,
            difficulty: "Medium".to_string(),
            question_types: vec!["Multiple Choice".to_string(), "Short Answer".to_string()],
            include_answer_key: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MindMapOptions {
    /// Number of first-level branches, at least 3. Default: 6.
    pub main_branches: u32,
    /// Nesting depth, 2–6. Default: 3.
    pub depth_levels: u32,
    pub include_examples: bool,
    /// Ask the model to stress parent/child relationships. Default: true.
    pub highlight_hierarchy: bool,
}

impl Default for MindMapOptions {
    fn default() -> Self {
        Self {
            main_branches: 6,
            depth_levels: 3,
            include_examples: true,
            highlight_hierarchy: true,
        }
    }
}

impl MindMapOptions {
    /// Branch count after applying the default for 0 and the form minimum.
    pub fn effective_branches(&self) -> u32 {
        match self.main_branches {
            0 => 6,
            n => n.max(3),
        }
    }

    /// Depth after applying the default for 0 and the 2–6 range.
    pub fn effective_depth(&self) -> u32 {
        match self.depth_levels {
            0 => 3,
            n => n.clamp(2, 6),
        }
    }
}

/// Options specific to one document kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KindOptions {
    LessonPlan(LessonPlanOptions),
    LectureNotes(LectureNotesOptions),
    #[serde(rename = "exercise")]
    ExerciseList(ExerciseListOptions),
    MindMap(MindMapOptions),
    Assessment,
}

impl KindOptions {
    /// Default options for `kind`.
    pub fn defaults_for(kind: DocumentKind) -> Self {
        match kind {
            DocumentKind::LessonPlan => KindOptions::LessonPlan(LessonPlanOptions::default()),
            DocumentKind::LectureNotes => {
                KindOptions::LectureNotes(LectureNotesOptions::default())
            }
            DocumentKind::ExerciseList => {
                KindOptions::ExerciseList(ExerciseListOptions::default())
            }
            DocumentKind::MindMap => KindOptions::MindMap(MindMapOptions::default()),
            DocumentKind::Assessment => KindOptions::Assessment,
        }
    }

    pub fn kind(&self) -> DocumentKind {
        match self {
            KindOptions::LessonPlan(_) => DocumentKind::LessonPlan,
            KindOptions::LectureNotes(_) => DocumentKind::LectureNotes,
            KindOptions::ExerciseList(_) => DocumentKind::ExerciseList,
            KindOptions::MindMap(_) => DocumentKind::MindMap,
            KindOptions::Assessment => DocumentKind::Assessment,
        }
    }
}

// ── Request ──────────────────────────────────────────────────────────────

/// Everything needed to generate one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRequest {
    pub subject: String,
    pub grade_level: String,
    pub topic: String,
    /// Label shown in the title and file name. Defaults to the kind's
    /// English label when `None`.
    pub label: Option<String>,
    pub options: KindOptions,
}

impl DocumentRequest {
    /// A request for `kind` with the form's default options.
    pub fn new(
        kind: DocumentKind,
        subject: impl Into<String>,
        grade_level: impl Into<String>,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            grade_level: grade_level.into(),
            topic: topic.into(),
            label: None,
            options: KindOptions::defaults_for(kind),
        }
    }

    pub fn with_options(mut self, options: KindOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn kind(&self) -> DocumentKind {
        self.options.kind()
    }

    /// The label used for the document title: the explicit `label`, or the
    /// kind's name in `locale`.
    pub fn display_label(&self, locale: Locale) -> String {
        match self.label.as_deref().map(str::trim) {
            Some(l) if !l.is_empty() => l.to_string(),
            _ => locale.kind_label(self.kind()).to_string(),
        }
    }

    /// Lesson duration, when this is a lesson plan that has one.
    pub fn duration_minutes(&self) -> Option<u32> {
        match &self.options {
            KindOptions::LessonPlan(o) => o.duration_minutes.filter(|m| *m > 0),
            _ => None,
        }
    }

    /// Suggested download name: `{subject}_{label}.docx` with spaces in the
    /// label replaced by underscores.
    pub fn file_name(&self, locale: Locale) -> String {
        format!(
            "{}_{}.docx",
            self.subject.trim(),
            self.display_label(locale).replace(' ', "_")
        )
    }
}
