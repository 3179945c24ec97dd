//! Anthropic Messages API backend

use reqwest::Client as HttpClient;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use super::{ensure_success, Prompt, SuggestionProvider};
use crate::error::{AppError, AppResult};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 200;
const TEMPERATURE: f32 = 0.8;

pub struct AnthropicProvider {
    http_client: HttpClient,
    api_url: String,
    api_key: Secret<String>,
    model: String,
}

impl AnthropicProvider {
    pub fn new(http_client: HttpClient, api_key: Secret<String>, model: String) -> Self {
        Self {
            http_client,
            api_url: ANTHROPIC_API_URL.to_string(),
            api_key,
            model,
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.api_url)
    }

    fn to_request(&self, prompt: &Prompt) -> MessagesRequest {
        MessagesRequest {
            model: self.model.clone(),
            system: prompt.system.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.user.clone(),
            }],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        }
    }
}

#[async_trait::async_trait]
impl SuggestionProvider for AnthropicProvider {
    async fn complete(&self, prompt: &Prompt) -> AppResult<String> {
        let response = self
            .http_client
            .post(self.messages_url())
            .header("x-api-key", self.api_key.expose_secret().as_str())
            .header("anthropic-version", ANTHROPIC_API_VERSION)
            .json(&self.to_request(prompt))
            .send()
            .await?;

        let response = ensure_success(self.name(), response).await?;
        let body: MessagesResponse = response.json().await?;

        let text = join_text_blocks(body);
        if text.trim().is_empty() {
            return Err(AppError::ExternalApi(
                "anthropic returned no text content".to_string(),
            ));
        }

        Ok(text)
    }

    fn name(&self) -> &'static str {
        "anthropic"
    }
}

fn join_text_blocks(body: MessagesResponse) -> String {
    body.content
        .into_iter()
        .filter(|block| block.block_type == "text")
        .filter_map(|block| block.text)
        .collect::<Vec<_>>()
        .join("")
}

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    system: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> AnthropicProvider {
        AnthropicProvider::new(
            HttpClient::new(),
            Secret::new("sk-ant-test".to_string()),
            "claude-3-5-haiku-latest".to_string(),
        )
    }

    #[test]
    fn test_messages_url() {
        assert_eq!(provider().messages_url(), "https://api.anthropic.com/v1/messages");
    }

    #[test]
    fn test_request_puts_system_at_top_level() {
        let prompt = Prompt {
            system: "sys".to_string(),
            user: "usr".to_string(),
        };
        let body = serde_json::to_value(provider().to_request(&prompt)).unwrap();
        assert_eq!(body["system"], "sys");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["model"], "claude-3-5-haiku-latest");
    }

    #[test]
    fn test_join_text_blocks_skips_other_types() {
        let json = r#"{
            "id": "msg_1",
            "content": [
                { "type": "text", "text": "{\"suggestion\": " },
                { "type": "tool_use", "id": "t1" },
                { "type": "text", "text": "\"Oversized linen shirt\"}" }
            ],
            "stop_reason": "end_turn"
        }"#;
        let body: MessagesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            join_text_blocks(body),
            r#"{"suggestion": "Oversized linen shirt"}"#
        );
    }
}
