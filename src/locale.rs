//! User-facing strings in the supported interface languages.
//!
//! The active language is an explicit [`Locale`] value passed to the
//! validator and carried by [`crate::config::GenerationConfig`]; nothing in
//! the library reads a process-wide language setting.

use crate::error::ValidationField;
use crate::request::DocumentKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Interface language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// English (default).
    #[default]
    En,
    /// Portuguese.
    Pt,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Pt];

    /// Two-letter language code.
    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Pt => "pt",
        }
    }

    /// Message shown when the given input check fails.
    pub fn validation_message(&self, field: ValidationField) -> &'static str {
        use ValidationField::*;
        match (self, field) {
            (Locale::En, Subject) => "Subject is required",
            (Locale::En, Topic) => "Topic description is required",
            (Locale::En, LlmConfig) => "AI model configuration is required",
            (Locale::En, ApiKey) => "OpenAI API key is required",
            (Locale::En, OllamaHostModel) => "Ollama host and model are required",
            (Locale::En, OllamaNotConnected) => {
                "Ollama is not connected. Please start Ollama and try again"
            }
            (Locale::En, HuggingFaceModel) => "Hugging Face model is required",

            (Locale::Pt, Subject) => "A disciplina é obrigatória",
            (Locale::Pt, Topic) => "A descrição do tema é obrigatória",
            (Locale::Pt, LlmConfig) => "A configuração do modelo de IA é obrigatória",
            (Locale::Pt, ApiKey) => "A chave de API da OpenAI é obrigatória",
            (Locale::Pt, OllamaHostModel) => "O host e o modelo do Ollama são obrigatórios",
            (Locale::Pt, OllamaNotConnected) => {
                "O Ollama não está conectado. Inicie o Ollama e tente novamente"
            }
            (Locale::Pt, HuggingFaceModel) => "O modelo do Hugging Face é obrigatório",
        }
    }

    /// Display label of a document kind, as offered in the form.
    pub fn kind_label(&self, kind: DocumentKind) -> &'static str {
        match (self, kind) {
            (Locale::En, DocumentKind::LessonPlan) => "Lesson Plan",
            (Locale::En, DocumentKind::LectureNotes) => "Lecture Notes",
            (Locale::En, DocumentKind::ExerciseList) => "Exercise List",
            (Locale::En, DocumentKind::MindMap) => "Lesson Mind Map",
            (Locale::En, DocumentKind::Assessment) => "Assessment",

            (Locale::Pt, DocumentKind::LessonPlan) => "Plano de Aula",
            (Locale::Pt, DocumentKind::LectureNotes) => "Notas de Aula",
            (Locale::Pt, DocumentKind::ExerciseList) => "Lista de Exercícios",
            (Locale::Pt, DocumentKind::MindMap) => "Mapa Mental da Aula",
            (Locale::Pt, DocumentKind::Assessment) => "Avaliação",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = String;

    /// Accepts bare codes and region-tagged ones (`pt-BR`, `en_US`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lang = s
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_lowercase();
        match lang.as_str() {
            "en" => Ok(Locale::En),
            "pt" => Ok(Locale::Pt),
            _ => Err(format!("unsupported locale '{s}' (expected en or pt)")),
        }
    }
}
