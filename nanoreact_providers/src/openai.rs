use async_trait::async_trait;
use nanoreact_core::{ChatMessage, ChatOptions, LLMProvider, LLMResponse, Usage};
use reqwest::Client;
use serde_json::json;
use tracing::{debug, info};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Client for any OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
    default_model: String,
}

impl OpenAIProvider {
    pub fn new(api_key: String) -> Self {
        info!("Creating OpenAIProvider");
        Self {
            client: Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: ChatOptions::default().model,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, request: &serde_json::Value) -> anyhow::Result<LLMResponse> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Chat completion failed with status {status}: {body}");
        }

        let body = response.json::<serde_json::Value>().await?;
        parse_completion(&body)
    }
}

/// Pull the reply text and token usage out of a completion body.
pub fn parse_completion(body: &serde_json::Value) -> anyhow::Result<LLMResponse> {
    let content = body["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid response format: missing content"))?
        .to_string();

    let count = |u: &serde_json::Map<String, serde_json::Value>, key: &str| {
        u.get(key)
            .and_then(serde_json::Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0)
    };
    let usage = body["usage"].as_object().map(|u| Usage {
        prompt_tokens: count(u, "prompt_tokens"),
        completion_tokens: count(u, "completion_tokens"),
        total_tokens: count(u, "total_tokens"),
    });

    Ok(LLMResponse { content, usage })
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> anyhow::Result<LLMResponse> {
        let request = json!({
            "model": options.model,
            "messages": messages,
            "temperature": options.temperature,
            "max_tokens": options.max_tokens,
        });

        info!("Sending request to {}: model={}", self.base_url, options.model);
        let response = self.send(&request).await?;

        if let Some(usage) = response.usage {
            debug!(
                "Tokens: {} prompt + {} completion = {} total",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }
        info!("Received response from {}", self.base_url);
        Ok(response)
    }

    fn get_default_model(&self) -> &str {
        &self.default_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_content_and_usage() {
        let body = json!({
            "choices": [{"message": {"role": "assistant", "content": "行动: echo {\"query\": \"hi\"}"}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 7, "total_tokens": 19}
        });
        let response = parse_completion(&body).unwrap_or_else(|e| panic!("parse failed: {e}"));
        assert_eq!(response.content, "行动: echo {\"query\": \"hi\"}");
        assert_eq!(
            response.usage,
            Some(Usage {
                prompt_tokens: 12,
                completion_tokens: 7,
                total_tokens: 19,
            })
        );
    }

    #[test]
    fn usage_is_optional() {
        let body = json!({"choices": [{"message": {"content": "hello"}}]});
        let response = parse_completion(&body).unwrap_or_else(|e| panic!("parse failed: {e}"));
        assert_eq!(response.content, "hello");
        assert!(response.usage.is_none());
    }

    #[test]
    fn missing_content_is_an_error() {
        let body = json!({"error": {"message": "invalid api key"}});
        assert!(parse_completion(&body).is_err());
    }

    #[test]
    fn base_url_is_normalised() {
        let provider = OpenAIProvider::new("key".to_string())
            .with_base_url("https://open.bigmodel.cn/api/paas/v4/".to_string());
        assert_eq!(provider.base_url(), "https://open.bigmodel.cn/api/paas/v4");
        assert_eq!(provider.get_default_model(), "gpt-4o-mini");
    }

    #[tokio::test]
    async fn unreachable_endpoint_fails() {
        let provider =
            OpenAIProvider::new("key".to_string()).with_base_url("http://127.0.0.1:9".to_string());
        let result = provider
            .chat(&[ChatMessage::user("hi")], &ChatOptions::default())
            .await;
        assert!(result.is_err());
    }
}
