//! Error types for the edgequake-lessondoc library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ValidationError`] is **recoverable**: the user left a required field
//!   empty or the LLM connection is incomplete. The message is already
//!   localised and can be shown verbatim; the user corrects the input and
//!   resubmits.
//!
//! * [`LessonDocError`] is **fatal** for this request: the provider could not
//!   be reached, the document kind is not available yet, or the `.docx`
//!   package could not be written.
//!
//! The markdown converter itself never fails, so neither type has a variant
//! for it.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Which input check rejected the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationField {
    Subject,
    Topic,
    LlmConfig,
    ApiKey,
    OllamaHostModel,
    OllamaNotConnected,
    HuggingFaceModel,
}

/// A failed input check, carrying a user-facing (localised) message.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ValidationError {
    pub field: ValidationField,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: ValidationField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// All fatal errors returned by the edgequake-lessondoc library.
#[derive(Debug, Error)]
pub enum LessonDocError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The request did not pass input validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The document kind exists in the form but cannot be generated yet.
    #[error("{kind} generation is not available yet.\nThis document type is under development.")]
    Unsupported { kind: String },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The LLM API returned an error. Not retried.
    #[error("LLM API error: {message}")]
    LlmApiError { message: String },

    /// The LLM call did not finish within the configured timeout.
    #[error("LLM call timed out after {secs}s\nIncrease --api-timeout.")]
    ApiTimeout { secs: u64 },

    /// The provider answered with no text at all.
    #[error("LLM returned an empty response")]
    EmptyResponse,

    // ── Output errors ─────────────────────────────────────────────────────
    /// Building the `.docx` package failed.
    #[error("Failed to build Word document: {0}")]
    DocumentWrite(String),

    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<zip::result::ZipError> for LessonDocError {
    fn from(e: zip::result::ZipError) -> Self {
        LessonDocError::DocumentWrite(e.to_string())
    }
}
