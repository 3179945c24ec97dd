//! AI suggestion proxy
//!
//! Resolves which upstream backend (OpenRouter, Groq, Anthropic) serves a
//! user's request and which key it uses, builds the prompt, and reduces the
//! raw completion to a single suggestion label.

use reqwest::Client as HttpClient;
use secrecy::{ExposeSecret, Secret};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{AiProvider, DecisionType, OnboardingAnswers},
};

pub mod anthropic;
pub mod openai_compat;
pub mod prompt;

pub use anthropic::AnthropicProvider;
pub use openai_compat::OpenAiCompatibleProvider;
pub use prompt::Prompt;

/// Everything the proxy needs to ask for one suggestion
#[derive(Debug, Clone)]
pub struct SuggestionRequest {
    pub decision_type: DecisionType,
    pub context: Option<Value>,
    /// Learned weights for `decision_type`
    pub weights: BTreeMap<String, f64>,
    pub user_data: Option<OnboardingAnswers>,
    /// Labels offered or chosen recently, to steer the model away from them
    pub recent_suggestions: Vec<String>,
    pub preferred_provider: Option<AiProvider>,
    pub user_api_key: Option<Secret<String>>,
}

/// A suggestion and the backend that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct AiSuggestion {
    pub suggestion: String,
    pub provider: String,
}

/// An upstream chat-completion backend
#[async_trait::async_trait]
pub trait SuggestionProvider: Send + Sync {
    /// Sends the prompt and returns the raw completion text
    async fn complete(&self, prompt: &Prompt) -> AppResult<String>;

    /// Provider name for logging and `providerUsed`
    fn name(&self) -> &'static str;
}

/// Source of AI suggestions for the decision engine
///
/// `Ok(None)` means no backend could be used and the caller should fall back
/// to static candidates.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Suggester: Send + Sync {
    async fn suggest(&self, request: &SuggestionRequest) -> AppResult<Option<AiSuggestion>>;
}

/// Production [`Suggester`] that talks to the configured providers
pub struct AiProxy {
    http_client: HttpClient,
    config: Config,
}

impl AiProxy {
    pub fn new(config: &Config) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(config.ai_timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            config: config.clone(),
        })
    }

    /// Picks the provider and key for a request
    ///
    /// The user's own key wins for their chosen provider (or the default when
    /// they have none). Otherwise a server key for that provider, then a server
    /// key for the default provider.
    fn resolve(
        &self,
        preferred: Option<AiProvider>,
        user_key: Option<&Secret<String>>,
    ) -> Option<(AiProvider, Secret<String>)> {
        let default = self.config.default_provider;
        let candidate = preferred.unwrap_or(default);

        if let Some(key) = user_key.filter(|k| !k.expose_secret().trim().is_empty()) {
            return Some((candidate, key.clone()));
        }

        self.config
            .server_key(candidate)
            .map(|key| (candidate, key))
            .or_else(|| self.config.server_key(default).map(|key| (default, key)))
    }

    fn backend(&self, provider: AiProvider, api_key: Secret<String>) -> Box<dyn SuggestionProvider> {
        let model = self.config.model_for(provider).to_string();
        let client = self.http_client.clone();

        match provider {
            AiProvider::OpenRouter => {
                Box::new(OpenAiCompatibleProvider::openrouter(client, api_key, model))
            }
            AiProvider::Groq => Box::new(OpenAiCompatibleProvider::groq(client, api_key, model)),
            AiProvider::Anthropic => Box::new(AnthropicProvider::new(client, api_key, model)),
        }
    }
}

#[async_trait::async_trait]
impl Suggester for AiProxy {
    async fn suggest(&self, request: &SuggestionRequest) -> AppResult<Option<AiSuggestion>> {
        let Some((provider, api_key)) =
            self.resolve(request.preferred_provider, request.user_api_key.as_ref())
        else {
            tracing::info!(
                decision_type = %request.decision_type,
                "No AI provider credentials available, using fallback options"
            );
            return Ok(None);
        };

        let backend = self.backend(provider, api_key);
        let prompt = prompt::build_prompt(request);
        let raw = backend.complete(&prompt).await?;

        let suggestion = prompt::parse_suggestion(&raw).ok_or_else(|| {
            AppError::ExternalApi(format!("{} returned an empty suggestion", backend.name()))
        })?;

        tracing::info!(
            provider = backend.name(),
            decision_type = %request.decision_type,
            "AI suggestion received"
        );

        Ok(Some(AiSuggestion {
            suggestion,
            provider: backend.name().to_string(),
        }))
    }
}

/// Turns a non-2xx upstream response into an `ExternalApi` error
pub(crate) async fn ensure_success(
    provider: &str,
    response: reqwest::Response,
) -> AppResult<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    tracing::error!(provider, status = %status, body = %body, "AI provider request failed");

    Err(AppError::ExternalApi(format!(
        "{} returned status {}",
        provider, status
    )))
}
