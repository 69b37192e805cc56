//! LLM: multi-provider adapter for the bots' completion calls.
//!
//! DESIGN
//! ======
//! Configured from environment variables. The `LlmClient` dispatches to
//! `OpenAI` (default) or Anthropic based on `LLM_PROVIDER`. Services only see
//! the `LlmChat` trait so tests can substitute a mock.

pub mod anthropic;
pub mod config;
pub mod openai;
pub mod types;

use config::{LlmConfig, LlmProviderKind};
pub use types::{ChatRequest, ChatResponse, LlmChat, LlmError, Message, Role};

// =============================================================================
// CLIENT DISPATCH
// =============================================================================

/// Concrete LLM client that dispatches to either `OpenAI` or Anthropic.
///
/// Configured from environment variables by [`LlmClient::from_env`].
pub struct LlmClient {
    inner: LlmProvider,
    model: String,
}

enum LlmProvider {
    Anthropic(anthropic::AnthropicClient),
    OpenAi(openai::OpenAiClient),
}

impl LlmClient {
    /// Build an LLM client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing or the HTTP client fails.
    pub fn from_env() -> Result<Self, LlmError> {
        let config = LlmConfig::from_env()?;
        Self::from_config(config)
    }

    /// Build an LLM client from a parsed typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider HTTP client fails to build.
    pub fn from_config(config: LlmConfig) -> Result<Self, LlmError> {
        let model = config.model.clone();
        let inner = match config.provider {
            LlmProviderKind::Anthropic => LlmProvider::Anthropic(anthropic::AnthropicClient::new(
                config.api_key,
                config.base_url,
                config.timeouts,
            )?),
            LlmProviderKind::OpenAi => LlmProvider::OpenAi(openai::OpenAiClient::new(
                config.api_key,
                config.openai_mode,
                config.base_url,
                config.timeouts,
            )?),
        };
        Ok(Self { inner, model })
    }

    /// Return the configured model name (e.g. `"gpt-3.5-turbo"`).
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait::async_trait]
impl LlmChat for LlmClient {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        let response = match &self.inner {
            LlmProvider::Anthropic(c) => c.chat(&self.model, request).await?,
            LlmProvider::OpenAi(c) => c.chat(&self.model, request).await?,
        };
        tracing::debug!(
            model = %response.model,
            stop_reason = %response.stop_reason,
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            "LLM call completed"
        );
        if response.stop_reason == "max_tokens" {
            tracing::warn!(model = %response.model, "LLM output truncated at max_tokens");
        }
        Ok(response)
    }
}

/// Build the optional shared LLM client from the environment.
///
/// AI features degrade to their documented fallbacks when this returns `None`.
#[must_use]
pub fn from_env_optional() -> Option<std::sync::Arc<dyn LlmChat>> {
    match LlmClient::from_env() {
        Ok(client) => {
            tracing::info!(model = client.model(), "LLM client initialized");
            Some(std::sync::Arc::new(client))
        }
        Err(e) => {
            tracing::warn!(error = %e, "LLM client not configured; AI features disabled");
            None
        }
    }
}
