//! Generation entry points.
//!
//! ```text
//! DocumentRequest
//!  │
//!  ├─ 1. Check     kind available, subject/topic/LLM selection valid
//!  ├─ 2. Prompt    per-kind template (prompts)
//!  ├─ 3. LLM       single call through TextGenerator, no retry
//!  ├─ 4. Tidy      strip fences / CRLF / invisible chars (optional)
//!  ├─ 5. Convert   markdown subset → Document body
//!  └─ 6. Package   header + body → .docx bytes
//! ```
//!
//! Steps 4–6 are also available on their own through [`render`] for text
//! that did not come from a model.

use crate::config::GenerationConfig;
use crate::document::{compose, Document, DocumentHeader};
use crate::docx;
use crate::error::LessonDocError;
use crate::llm::{ProviderGenerator, TextGenerator};
use crate::locale::Locale;
use crate::markdown;
use crate::postprocess;
use crate::prompts;
use crate::request::{DocumentKind, DocumentRequest};
use crate::validation::{validate_fields, validate_llm};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Result of a successful generation.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedDocument {
    pub kind: DocumentKind,
    /// Raw model answer, for on-screen preview.
    pub content: String,
    /// The document that was serialized.
    pub document: Document,
    /// `.docx` bytes, ready to download or write.
    #[serde(skip)]
    pub docx: Vec<u8>,
    /// Suggested download name.
    pub file_name: String,
    pub duration_ms: u64,
}

/// Generate a document with the provider described by `config`.
///
/// Validation runs before the provider is created, so a missing API key is
/// reported as a validation message rather than a provider error.
pub async fn generate_document(
    request: &DocumentRequest,
    config: &GenerationConfig,
) -> Result<GeneratedDocument, LessonDocError> {
    check_request(request, config)?;
    let generator = ProviderGenerator::from_config(config)?;
    generate(request, config, &generator).await
}

/// Generate a document using `generator` for the LLM step.
///
/// # Errors
/// - [`LessonDocError::Unsupported`] for kinds that cannot be generated yet;
///   nothing is sent to the model.
/// - [`LessonDocError::Validation`] when a required field is missing.
/// - LLM errors from `generator`, unchanged.
/// - [`LessonDocError::DocumentWrite`] if packaging fails.
pub async fn generate(
    request: &DocumentRequest,
    config: &GenerationConfig,
    generator: &dyn TextGenerator,
) -> Result<GeneratedDocument, LessonDocError> {
    let start = Instant::now();
    check_request(request, config)?;

    let kind = request.kind();
    let prompt = prompts::build_prompt(request).ok_or_else(|| unsupported(request, config.locale))?;
    info!("Generating {} for '{}'", kind, request.subject.trim());
    debug!("Prompt is {} bytes", prompt.len());

    let content = generator.generate(&prompt).await?;
    let (document, docx) = render(request, &content, config)?;

    let duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Generated {} blocks, {} bytes in {}ms",
        document.len(),
        docx.len(),
        duration_ms
    );

    Ok(GeneratedDocument {
        kind,
        content,
        document,
        docx,
        file_name: request.file_name(config.locale),
        duration_ms,
    })
}

/// Turn already-generated text into the final document and its bytes.
pub fn render(
    request: &DocumentRequest,
    content: &str,
    config: &GenerationConfig,
) -> Result<(Document, Vec<u8>), LessonDocError> {
    let hierarchy_aware = config.hierarchy.applies_to(request.kind());
    let body = if config.tidy_response {
        markdown::convert(&postprocess::tidy_response(content), hierarchy_aware)
    } else {
        markdown::convert(content, hierarchy_aware)
    };

    let document = compose(&DocumentHeader::for_request(request, config.locale), body);
    let bytes = docx::to_docx(&document)?;
    Ok((document, bytes))
}

/// Generate and write the `.docx` to `output_path`.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn generate_to_file(
    request: &DocumentRequest,
    config: &GenerationConfig,
    generator: &dyn TextGenerator,
    output_path: impl AsRef<Path>,
) -> Result<GeneratedDocument, LessonDocError> {
    let generated = generate(request, config, generator).await?;
    write_docx(output_path.as_ref(), &generated.docx).await?;
    Ok(generated)
}

/// Atomically write `bytes` to `path`, creating parent directories.
pub async fn write_docx(path: &Path, bytes: &[u8]) -> Result<(), LessonDocError> {
    let write_err = |source| LessonDocError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("docx.tmp");
    tokio::fs::write(&tmp_path, bytes).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    debug!("Wrote {}", path.display());
    Ok(())
}

/// Availability and input checks shared by every entry point.
///
/// The LLM selection is only checked when no pre-built provider was given.
fn check_request(
    request: &DocumentRequest,
    config: &GenerationConfig,
) -> Result<(), LessonDocError> {
    if !request.kind().is_supported() {
        return Err(unsupported(request, config.locale));
    }
    validate_fields(&request.subject, &request.topic, config.locale)?;
    if config.provider.is_none() {
        validate_llm(config.llm.as_ref(), config.locale)?;
    }
    Ok(())
}

fn unsupported(request: &DocumentRequest, locale: Locale) -> LessonDocError {
    LessonDocError::Unsupported {
        kind: request.display_label(locale),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HierarchyMode, LlmConfig, ProviderKind};
    use crate::document::Block;

    fn config() -> GenerationConfig {
        GenerationConfig::builder()
            .llm(LlmConfig::new(ProviderKind::Anthropic))
            .build()
            .unwrap()
    }

    const MIND_MAP: &str = "# Water Cycle\n## Evaporation\n- Sun heats water\n  - Vapour rises";

    fn bullets(doc: &Document) -> Vec<usize> {
        doc.blocks()
            .iter()
            .filter_map(|b| match b {
                Block::Bullet { indent_level, .. } => Some(*indent_level),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn render_prepends_header() {
        let req = DocumentRequest::new(DocumentKind::LessonPlan, "Science", "Grade 6", "Water");
        let (doc, bytes) = render(&req, "# Plan\n- step", &config()).unwrap();
        assert!(!bytes.is_empty());
        assert_eq!(
            doc.blocks()[0],
            Block::Title {
                text: "Science - Lesson Plan".into()
            }
        );
        // title, topic, grade, duration, then two body lines
        assert_eq!(doc.len(), 6);
    }

    #[test]
    fn portuguese_locale_names_title_and_file() {
        let req = DocumentRequest::new(
            DocumentKind::LectureNotes,
            "Química",
            "Ensino Médio",
            "Ligações covalentes",
        );
        let pt = GenerationConfig::builder().locale(Locale::Pt).build().unwrap();
        let (doc, _) = render(&req, "# Ligações", &pt).unwrap();
        assert_eq!(
            doc.blocks()[0],
            Block::Title {
                text: "Química - Notas de Aula".into()
            }
        );
        assert_eq!(req.file_name(pt.locale), "Química_Notas_de_Aula.docx");
    }

    #[test]
    fn mind_maps_keep_nesting_by_default() {
        let req = DocumentRequest::new(DocumentKind::MindMap, "Science", "Grade 6", "Water");
        let (doc, _) = render(&req, MIND_MAP, &config()).unwrap();
        assert_eq!(bullets(&doc), vec![0, 1]);
    }

    #[test]
    fn other_kinds_flatten_by_default() {
        let req = DocumentRequest::new(DocumentKind::LectureNotes, "Science", "Grade 6", "Water");
        let (doc, _) = render(&req, MIND_MAP, &config()).unwrap();
        assert_eq!(bullets(&doc), vec![0, 0]);
    }

    #[test]
    fn hierarchy_mode_overrides_kind() {
        let req = DocumentRequest::new(DocumentKind::LectureNotes, "Science", "Grade 6", "Water");
        let always = GenerationConfig::builder()
            .hierarchy(HierarchyMode::Always)
            .build()
            .unwrap();
        let (doc, _) = render(&req, MIND_MAP, &always).unwrap();
        assert_eq!(bullets(&doc), vec![0, 1]);

        let mm = DocumentRequest::new(DocumentKind::MindMap, "Science", "Grade 6", "Water");
        let never = GenerationConfig::builder()
            .hierarchy(HierarchyMode::Never)
            .build()
            .unwrap();
        let (doc, _) = render(&mm, MIND_MAP, &never).unwrap();
        assert_eq!(bullets(&doc), vec![0, 0]);
    }

    #[test]
    fn tidy_toggle() {
        let req = DocumentRequest::new(DocumentKind::LectureNotes, "Science", "Grade 6", "Water");
        let fenced = "```markdown\n# Notes\n```";

        let (tidy, _) = render(&req, fenced, &config()).unwrap();
        assert_eq!(tidy.len(), 3 + 1);

        let raw_cfg = GenerationConfig::builder().tidy_response(false).build().unwrap();
        let (raw, _) = render(&req, fenced, &raw_cfg).unwrap();
        assert_eq!(raw.len(), 3 + 3);
    }

    #[test]
    fn assessment_is_rejected_before_validation() {
        let req = DocumentRequest::new(DocumentKind::Assessment, "", "", "");
        let err = check_request(&req, &GenerationConfig::default()).unwrap_err();
        assert!(matches!(err, LessonDocError::Unsupported { .. }));
    }

    #[test]
    fn missing_llm_selection_is_a_validation_error() {
        let req = DocumentRequest::new(DocumentKind::MindMap, "Art", "Grade 1", "Colours");
        let err = check_request(&req, &GenerationConfig::default()).unwrap_err();
        assert!(matches!(err, LessonDocError::Validation(_)), "got {err:?}");
    }
}
