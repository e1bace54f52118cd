//! LLM interaction: one prompt in, one markdown answer out.
//!
//! The pipeline talks to the model through the [`TextGenerator`] trait so
//! tests (and embedders with their own clients) can substitute a canned
//! generator. [`ProviderGenerator`] is the production implementation on top
//! of `edgequake_llm`.
//!
//! There is no retry: a failed or timed-out call is reported to the user as
//! a generation error and they decide whether to submit again.

use crate::config::{GenerationConfig, LlmConfig, ProviderKind, OLLAMA_DEFAULT_HOST};
use crate::error::LessonDocError;
use crate::prompts::DEFAULT_SYSTEM_PROMPT;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

/// Produces text for a prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send `prompt` and return the model's raw answer.
    async fn generate(&self, prompt: &str) -> Result<String, LessonDocError>;
}

/// [`TextGenerator`] backed by an `edgequake_llm` provider.
pub struct ProviderGenerator {
    provider: Arc<dyn LLMProvider>,
    system_prompt: String,
    options: CompletionOptions,
    timeout_secs: u64,
}

impl ProviderGenerator {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &GenerationConfig) -> Self {
        Self {
            provider,
            system_prompt: config
                .system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            options: build_options(config),
            timeout_secs: config.api_timeout_secs,
        }
    }

    /// Resolve the provider described by `config` and wrap it.
    pub fn from_config(config: &GenerationConfig) -> Result<Self, LessonDocError> {
        let provider = resolve_provider(config)?;
        Ok(Self::new(provider, config))
    }
}

#[async_trait]
impl TextGenerator for ProviderGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, LessonDocError> {
        let start = Instant::now();
        let messages = vec![
            ChatMessage::system(self.system_prompt.as_str()),
            ChatMessage::user(prompt),
        ];

        let call = self.provider.chat(&messages, Some(&self.options));
        let response = match timeout(Duration::from_secs(self.timeout_secs), call).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!("LLM call failed — {}", e);
                return Err(LessonDocError::LlmApiError {
                    message: e.to_string(),
                });
            }
            Err(_) => {
                warn!("LLM call timed out after {}s", self.timeout_secs);
                return Err(LessonDocError::ApiTimeout {
                    secs: self.timeout_secs,
                });
            }
        };

        debug!(
            "{} input tokens, {} output tokens, {:?}",
            response.prompt_tokens,
            response.completion_tokens,
            start.elapsed()
        );

        if response.content.trim().is_empty() {
            return Err(LessonDocError::EmptyResponse);
        }
        Ok(response.content)
    }
}

/// Build `CompletionOptions` from the generation config.
fn build_options(config: &GenerationConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`): used as-is.
/// 2. **User selection** (`config.llm`): provider kind plus model (or the
///    provider's default model) via [`ProviderFactory::create_llm_provider`],
///    which reads API keys and `OLLAMA_HOST` from the environment.
/// 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`).
/// 4. **Full auto-detection** (`ProviderFactory::from_env`).
pub fn resolve_provider(config: &GenerationConfig) -> Result<Arc<dyn LLMProvider>, LessonDocError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(llm) = config.llm.as_ref().filter(|l| l.provider.is_some()) {
        return create_provider(llm);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_named(&prov, &model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| LessonDocError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or choose a provider with --provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

fn create_provider(llm: &LlmConfig) -> Result<Arc<dyn LLMProvider>, LessonDocError> {
    let Some(kind) = llm.provider else {
        return Err(LessonDocError::ProviderNotConfigured {
            provider: "none".to_string(),
            hint: "Choose a provider with --provider.".to_string(),
        });
    };
    let Some(model) = llm.model_or_default() else {
        return Err(LessonDocError::ProviderNotConfigured {
            provider: kind.to_string(),
            hint: format!("No model selected for {kind}. Pass one with --model."),
        });
    };
    if kind == ProviderKind::Ollama {
        check_ollama_host(llm.host.as_deref(), &factory_ollama_host())?;
    }
    create_named(kind.as_str(), model)
}

/// Address the provider factory connects to for Ollama.
fn factory_ollama_host() -> String {
    std::env::var("OLLAMA_HOST")
        .ok()
        .filter(|h| !h.trim().is_empty())
        .unwrap_or_else(|| OLLAMA_DEFAULT_HOST.to_string())
}

/// The factory only reads `OLLAMA_HOST`, so a configured host that points
/// elsewhere would be probed but never used for the chat call.
fn check_ollama_host(configured: Option<&str>, factory_host: &str) -> Result<(), LessonDocError> {
    let Some(host) = configured.filter(|h| !h.trim().is_empty()) else {
        return Ok(());
    };
    if normalise_host(host) == normalise_host(factory_host) {
        return Ok(());
    }
    Err(LessonDocError::ProviderNotConfigured {
        provider: ProviderKind::Ollama.to_string(),
        hint: format!(
            "Ollama host {host} differs from the one the client will use ({factory_host}). \
            Set OLLAMA_HOST={host} instead of passing --ollama-host."
        ),
    })
}

fn normalise_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/').to_lowercase();
    host.strip_prefix("http://")
        .map(str::to_string)
        .unwrap_or(host)
}

fn create_named(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, LessonDocError> {
    info!("Using provider {} with model {}", provider_name, model);
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        LessonDocError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Check whether an Ollama server answers at `host`.
///
/// Any connection error, timeout or non-2xx status counts as "not
/// connected"; the caller turns that into a validation message.
pub async fn probe_ollama(host: &str, timeout_secs: u64) -> bool {
    let url = format!("{}/api/tags", host.trim_end_matches('/'));
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            warn!("Could not build HTTP client: {}", e);
            return false;
        }
    };

    match client.get(&url).send().await {
        Ok(resp) if resp.status().is_success() => {
            debug!("Ollama reachable at {}", host);
            true
        }
        Ok(resp) => {
            debug!("Ollama at {} answered {}", host, resp.status());
            false
        }
        Err(e) => {
            debug!("Ollama unreachable at {}: {}", host, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_options_defaults() {
        let config = GenerationConfig::default();
        let opts = build_options(&config);
        assert_eq!(opts.temperature, Some(0.7));
        assert_eq!(opts.max_tokens, Some(4096));
    }

    #[test]
    fn ollama_without_model_is_not_configured() {
        let config = GenerationConfig::builder()
            .llm(LlmConfig::new(ProviderKind::Ollama).with_host("http://localhost:11434"))
            .build()
            .unwrap();
        match resolve_provider(&config) {
            Err(LessonDocError::ProviderNotConfigured { provider, hint }) => {
                assert_eq!(provider, "ollama");
                assert!(hint.contains("--model"), "got: {hint}");
            }
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("expected an error"),
        }
    }

    #[test]
    fn ollama_host_must_match_client_host() {
        assert!(check_ollama_host(None, OLLAMA_DEFAULT_HOST).is_ok());
        assert!(check_ollama_host(Some("http://localhost:11434/"), OLLAMA_DEFAULT_HOST).is_ok());
        assert!(check_ollama_host(Some("localhost:11434"), OLLAMA_DEFAULT_HOST).is_ok());

        match check_ollama_host(Some("http://gpu-box:11434"), OLLAMA_DEFAULT_HOST) {
            Err(LessonDocError::ProviderNotConfigured { provider, hint }) => {
                assert_eq!(provider, "ollama");
                assert!(hint.contains("OLLAMA_HOST=http://gpu-box:11434"), "got: {hint}");
            }
            other => panic!("expected a host mismatch, got {other:?}"),
        }
    }

    #[test]
    fn ollama_host_mismatch_stops_provider_creation() {
        if std::env::var("OLLAMA_HOST").is_ok() {
            println!("SKIP: OLLAMA_HOST is set");
            return;
        }
        let llm = LlmConfig::new(ProviderKind::Ollama)
            .with_model("llama3.2")
            .with_host("http://gpu-box:11434")
            .with_connected(true);
        assert!(matches!(
            create_provider(&llm),
            Err(LessonDocError::ProviderNotConfigured { .. })
        ));
    }

    #[tokio::test]
    async fn probe_reports_unreachable_host() {
        // Port 9 (discard) is closed on test machines.
        assert!(!probe_ollama("http://127.0.0.1:9/", 2).await);
    }
}
