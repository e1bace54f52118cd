//! Input checks run before any prompt is built or any LLM is called.

use crate::config::{LlmConfig, ProviderKind};
use crate::error::{ValidationError, ValidationField};
use crate::locale::Locale;

fn blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Check the shared form fields and the LLM selection.
///
/// Checks run in a fixed order and stop at the first failure: subject,
/// topic, presence of an LLM selection, then the provider-specific fields.
pub fn validate_inputs(
    subject: &str,
    topic: &str,
    llm: Option<&LlmConfig>,
    locale: Locale,
) -> Result<(), ValidationError> {
    validate_fields(subject, topic, locale)?;
    validate_llm(llm, locale)
}

/// Subject and topic must not be blank.
pub fn validate_fields(subject: &str, topic: &str, locale: Locale) -> Result<(), ValidationError> {
    if subject.trim().is_empty() {
        return Err(failure(ValidationField::Subject, locale));
    }
    if topic.trim().is_empty() {
        return Err(failure(ValidationField::Topic, locale));
    }
    Ok(())
}

/// Provider-specific checks. Anthropic and Gemini have none here; their
/// keys are looked up when the client is created.
pub fn validate_llm(llm: Option<&LlmConfig>, locale: Locale) -> Result<(), ValidationError> {
    let Some((c, kind)) = llm.and_then(|c| c.provider.map(|p| (c, p))) else {
        return Err(failure(ValidationField::LlmConfig, locale));
    };

    let field = match kind {
        ProviderKind::OpenAi if blank(c.api_key.as_deref()) => ValidationField::ApiKey,
        ProviderKind::Ollama if blank(c.host.as_deref()) || blank(c.model.as_deref()) => {
            ValidationField::OllamaHostModel
        }
        ProviderKind::Ollama if !c.connected => ValidationField::OllamaNotConnected,
        ProviderKind::HuggingFace if blank(c.model.as_deref()) => {
            ValidationField::HuggingFaceModel
        }
        _ => return Ok(()),
    };
    Err(failure(field, locale))
}

fn failure(field: ValidationField, locale: Locale) -> ValidationError {
    ValidationError::new(field, locale.validation_message(field))
}
