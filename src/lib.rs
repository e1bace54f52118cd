//! # edgequake-lessondoc
//!
//! Generate classroom documents (lesson plans, lecture notes, exercise lists,
//! mind maps) with an LLM and export them as Word (`.docx`) files.
//!
//! ## Pipeline Overview
//!
//! ```text
//! DocumentRequest (subject, grade, topic, kind options)
//!  │
//!  ├─ 1. Validate  required fields + LLM selection, localised messages
//!  ├─ 2. Prompt    per-kind template ending in formatting rules
//!  ├─ 3. LLM       one call to openai / anthropic / gemini / ollama / …
//!  ├─ 4. Tidy      strip fences, CRLF, invisible characters
//!  ├─ 5. Convert   line-by-line markdown subset → Document blocks
//!  └─ 6. Package   Document → .docx bytes
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_lessondoc::{
//!     generate_document, DocumentKind, DocumentRequest, GenerationConfig, LlmConfig, ProviderKind,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let key = std::env::var("OPENAI_API_KEY")?;
//!     let config = GenerationConfig::builder()
//!         .llm(LlmConfig::new(ProviderKind::OpenAi).with_api_key(key))
//!         .build()?;
//!     let request = DocumentRequest::new(
//!         DocumentKind::MindMap,
//!         "Biology",
//!         "High School",
//!         "Photosynthesis",
//!     );
//!     let doc = generate_document(&request, &config).await?;
//!     std::fs::write(&doc.file_name, &doc.docx)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Converting text you already have
//!
//! The converter is usable on its own and never fails:
//!
//! ```rust
//! use edgequake_lessondoc::{markdown, Block};
//!
//! let doc = markdown::convert("# Title\n  - nested\n10. not a list", true);
//! assert_eq!(doc.len(), 3);
//! assert!(matches!(doc.blocks()[1], Block::Bullet { indent_level: 1, .. }));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `lessondoc` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod document;
pub mod docx;
pub mod error;
pub mod generate;
pub mod llm;
pub mod locale;
pub mod markdown;
pub mod postprocess;
pub mod prompts;
pub mod request;
pub mod validation;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{GenerationConfig, GenerationConfigBuilder, HierarchyMode, LlmConfig, ProviderKind};
pub use document::{Block, Document, DocumentHeader};
pub use docx::to_docx;
pub use error::{LessonDocError, ValidationError, ValidationField};
pub use generate::{generate, generate_document, generate_to_file, render, GeneratedDocument};
pub use llm::{probe_ollama, ProviderGenerator, TextGenerator};
pub use locale::Locale;
pub use markdown::convert;
pub use request::{
    DocumentKind, DocumentRequest, ExerciseListOptions, KindOptions, LectureNotesOptions,
    LessonPlanOptions, MindMapOptions,
};
pub use validation::validate_inputs;
