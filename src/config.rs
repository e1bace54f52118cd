//! Configuration types for document generation.
//!
//! All generation behaviour is controlled through [`GenerationConfig`], built
//! via its [`GenerationConfigBuilder`]. The interface language and the LLM
//! selection travel inside this value rather than living in process-wide
//! state, so two requests with different settings can run side by side.

use crate::error::LessonDocError;
use crate::locale::Locale;
use crate::request::DocumentKind;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Ollama address used when `OLLAMA_HOST` is not set.
pub const OLLAMA_DEFAULT_HOST: &str = "http://localhost:11434";

/// Which LLM backend to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Ollama,
    HuggingFace,
    Anthropic,
    Gemini,
}

impl ProviderKind {
    /// Provider name understood by `edgequake_llm::ProviderFactory`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Ollama => "ollama",
            ProviderKind::HuggingFace => "huggingface",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Gemini => "gemini",
        }
    }

    /// Model used when none is configured. Ollama and Hugging Face have no
    /// sensible default and must be told which model to run.
    pub fn default_model(&self) -> Option<&'static str> {
        match self {
            ProviderKind::OpenAi => Some("gpt-4.1-nano"),
            ProviderKind::Anthropic => Some("claude-sonnet-4-20250514"),
            ProviderKind::Gemini => Some("gemini-2.0-flash"),
            ProviderKind::Ollama | ProviderKind::HuggingFace => None,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "ollama" => Ok(ProviderKind::Ollama),
            "huggingface" | "hf" => Ok(ProviderKind::HuggingFace),
            "anthropic" => Ok(ProviderKind::Anthropic),
            "gemini" => Ok(ProviderKind::Gemini),
            other => Err(format!("unknown provider '{other}'")),
        }
    }
}

/// The model selection made by the user.
#[derive(Clone, Default)]
pub struct LlmConfig {
    pub provider: Option<ProviderKind>,
    pub model: Option<String>,
    /// API key for hosted providers. Only checked for presence; the provider
    /// client itself reads the key from the environment.
    pub api_key: Option<String>,
    /// Base URL of a local Ollama server.
    pub host: Option<String>,
    /// Result of the last Ollama reachability probe.
    pub connected: bool,
}

impl LlmConfig {
    pub fn new(provider: ProviderKind) -> Self {
        Self {
            provider: Some(provider),
            ..Self::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_connected(mut self, connected: bool) -> Self {
        self.connected = connected;
        self
    }

    /// Configured model, or the provider default.
    pub fn model_or_default(&self) -> Option<&str> {
        match self.model.as_deref().map(str::trim) {
            Some(m) if !m.is_empty() => Some(m),
            _ => self.provider.and_then(|p| p.default_model()),
        }
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("host", &self.host)
            .field("connected", &self.connected)
            .finish()
    }
}

/// When bullet nesting from the model output is kept as visual indent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HierarchyMode {
    /// Mind maps keep nesting, every other kind is flattened. (default)
    #[default]
    Auto,
    /// Keep nesting for every kind.
    Always,
    /// Flatten every kind.
    Never,
}

impl HierarchyMode {
    pub fn applies_to(&self, kind: DocumentKind) -> bool {
        match self {
            HierarchyMode::Auto => kind == DocumentKind::MindMap,
            HierarchyMode::Always => true,
            HierarchyMode::Never => false,
        }
    }
}

/// Configuration for generating one document.
///
/// # Example
/// ```rust
/// use edgequake_lessondoc::{GenerationConfig, LlmConfig, ProviderKind, Locale};
///
/// let config = GenerationConfig::builder()
///     .llm(LlmConfig::new(ProviderKind::OpenAi).with_model("gpt-4.1-mini"))
///     .locale(Locale::Pt)
///     .build()
///     .unwrap();
/// assert_eq!(config.locale, Locale::Pt);
/// ```
#[derive(Clone)]
pub struct GenerationConfig {
    /// LLM selection. `None` fails validation unless `provider` is set.
    pub llm: Option<LlmConfig>,

    /// Pre-constructed LLM provider. Takes precedence over `llm` when
    /// creating the client.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Language of validation messages. Default: English.
    pub locale: Locale,

    /// Bullet nesting policy. Default: [`HierarchyMode::Auto`].
    pub hierarchy: HierarchyMode,

    /// Sampling temperature. Default: 0.7.
    pub temperature: f32,

    /// Maximum tokens the LLM may generate. Default: 4096.
    pub max_tokens: usize,

    /// Timeout for the single LLM call, in seconds. Default: 120.
    pub api_timeout_secs: u64,

    /// Clean fences and line endings from the raw response before
    /// conversion. Default: true.
    pub tidy_response: bool,

    /// Custom system message. If None, uses the built-in default.
    pub system_prompt: Option<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            llm: None,
            provider: None,
            locale: Locale::default(),
            hierarchy: HierarchyMode::default(),
            temperature: 0.7,
            max_tokens: 4096,
            api_timeout_secs: 120,
            tidy_response: true,
            system_prompt: None,
        }
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("llm", &self.llm)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("locale", &self.locale)
            .field("hierarchy", &self.hierarchy)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("tidy_response", &self.tidy_response)
            .finish()
    }
}

impl GenerationConfig {
    /// Create a new builder for `GenerationConfig`.
    pub fn builder() -> GenerationConfigBuilder {
        GenerationConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`GenerationConfig`].
#[derive(Debug)]
pub struct GenerationConfigBuilder {
    config: GenerationConfig,
}

impl GenerationConfigBuilder {
    pub fn llm(mut self, llm: LlmConfig) -> Self {
        self.config.llm = Some(llm);
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn locale(mut self, locale: Locale) -> Self {
        self.config.locale = locale;
        self
    }

    pub fn hierarchy(mut self, mode: HierarchyMode) -> Self {
        self.config.hierarchy = mode;
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn tidy_response(mut self, v: bool) -> Self {
        self.config.tidy_response = v;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<GenerationConfig, LessonDocError> {
        let c = &self.config;
        if c.max_tokens == 0 {
            return Err(LessonDocError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.api_timeout_secs == 0 {
            return Err(LessonDocError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}
