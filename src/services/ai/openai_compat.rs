//! OpenAI-compatible chat-completions backend
//!
//! OpenRouter and Groq both expose `/chat/completions` with bearer auth, so
//! one implementation serves both with a different base URL.

use reqwest::Client as HttpClient;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use super::{ensure_success, Prompt, SuggestionProvider};
use crate::error::{AppError, AppResult};

const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1";
const GROQ_API_URL: &str = "https://api.groq.com/openai/v1";
const MAX_TOKENS: u32 = 200;
const TEMPERATURE: f32 = 0.8;

pub struct OpenAiCompatibleProvider {
    http_client: HttpClient,
    name: &'static str,
    api_url: String,
    api_key: Secret<String>,
    model: String,
}

impl OpenAiCompatibleProvider {
    pub fn openrouter(http_client: HttpClient, api_key: Secret<String>, model: String) -> Self {
        Self {
            http_client,
            name: "openrouter",
            api_url: OPENROUTER_API_URL.to_string(),
            api_key,
            model,
        }
    }

    pub fn groq(http_client: HttpClient, api_key: Secret<String>, model: String) -> Self {
        Self {
            http_client,
            name: "groq",
            api_url: GROQ_API_URL.to_string(),
            api_key,
            model,
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_url)
    }

    fn to_request(&self, prompt: &Prompt) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: prompt.system.clone(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.user.clone(),
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        }
    }
}

#[async_trait::async_trait]
impl SuggestionProvider for OpenAiCompatibleProvider {
    async fn complete(&self, prompt: &Prompt) -> AppResult<String> {
        let response = self
            .http_client
            .post(self.completions_url())
            .bearer_auth(self.api_key.expose_secret().as_str())
            .json(&self.to_request(prompt))
            .send()
            .await?;

        let response = ensure_success(self.name, response).await?;
        let body: ChatResponse = response.json().await?;

        first_choice_content(body)
            .ok_or_else(|| AppError::ExternalApi(format!("{} returned no choices", self.name)))
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

fn first_choice_content(body: ChatResponse) -> Option<String> {
    body.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> OpenAiCompatibleProvider {
        OpenAiCompatibleProvider::groq(
            HttpClient::new(),
            Secret::new("gsk_test".to_string()),
            "llama-3.1-8b-instant".to_string(),
        )
    }

    #[test]
    fn test_completions_url() {
        assert_eq!(
            provider().completions_url(),
            "https://api.groq.com/openai/v1/chat/completions"
        );
        let openrouter = OpenAiCompatibleProvider::openrouter(
            HttpClient::new(),
            Secret::new("sk-or".to_string()),
            "m".to_string(),
        );
        assert_eq!(
            openrouter.completions_url(),
            "https://openrouter.ai/api/v1/chat/completions"
        );
        assert_eq!(openrouter.name(), "openrouter");
    }

    #[test]
    fn test_request_body_shape() {
        let prompt = Prompt {
            system: "sys".to_string(),
            user: "usr".to_string(),
        };
        let body = serde_json::to_value(provider().to_request(&prompt)).unwrap();
        assert_eq!(body["model"], "llama-3.1-8b-instant");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "usr");
        assert_eq!(body["max_tokens"], 200);
    }

    #[test]
    fn test_response_parsing() {
        let json = r#"{
            "id": "chatcmpl-1",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": "{\"suggestion\": \"Poha\"}" } }
            ]
        }"#;
        let body: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            first_choice_content(body),
            Some(r#"{"suggestion": "Poha"}"#.to_string())
        );
    }

    #[test]
    fn test_response_without_choices() {
        let body: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert_eq!(first_choice_content(body), None);
    }
}
