//! Client for an OpenAI-compatible chat-completions endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::config::ModelConfig;
use crate::error::ModelError;
use crate::types::ChatMessage;

/// Per-call overrides of the configured sampling parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sampling {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// Anything that can turn a conversation into the next assistant reply.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        sampling: Sampling,
    ) -> Result<String, ModelError>;
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    stop: &'a [String],
    stream: bool,
}

pub struct Brain {
    client: Client,
    config: ModelConfig,
}

impl Brain {
    pub fn new(config: ModelConfig) -> Result<Self, ModelError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ModelError::Network(e.to_string()))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl ChatModel for Brain {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        sampling: Sampling,
    ) -> Result<String, ModelError> {
        if messages.len() > 20 {
            tracing::warn!(messages = messages.len(), "conversation history is long");
        }

        let body = CompletionRequest {
            model: &self.config.model,
            messages,
            temperature: sampling.temperature.unwrap_or(self.config.temperature),
            max_tokens: sampling.max_tokens.unwrap_or(self.config.max_tokens),
            top_p: self.config.top_p,
            stop: &self.config.stop,
            stream: false,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(String::from))
                .unwrap_or_else(|| text.chars().take(500).collect());
            tracing::error!(status = status.as_u16(), %message, "model API error");
            return Err(ModelError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let json: Value =
            serde_json::from_str(&text).map_err(|e| ModelError::MalformedBody(e.to_string()))?;
        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(ModelError::MissingContent)?;

        tracing::debug!(reply = content, "model replied");
        Ok(content.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> ModelConfig {
        ModelConfig {
            endpoint: format!("{}/v1/chat/completions", server.uri()),
            ..ModelConfig::new("test-key")
        }
    }

    fn conversation() -> Vec<ChatMessage> {
        vec![ChatMessage::system("rules"), ChatMessage::user("capital of France?")]
    }

    #[tokio::test]
    async fn sends_payload_and_reads_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({
                "model": "llama3-70b-8192",
                "messages": [
                    {"role": "system", "content": "rules"},
                    {"role": "user", "content": "capital of France?"}
                ],
                "max_tokens": 1024,
                "stop": ["<|eot_id|>"],
                "stream": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "Paris"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let brain = Brain::new(config_for(&server)).unwrap();
        let reply = brain
            .complete(&conversation(), Sampling::default())
            .await
            .unwrap();
        assert_eq!(reply, "Paris");
    }

    #[tokio::test]
    async fn sampling_overrides_are_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"max_tokens": 2048})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "ok"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let brain = Brain::new(config_for(&server)).unwrap();
        let sampling = Sampling {
            temperature: Some(0.7),
            max_tokens: Some(2048),
        };
        assert_eq!(brain.complete(&conversation(), sampling).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn non_success_status_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "Invalid API Key"}
            })))
            .mount(&server)
            .await;

        let brain = Brain::new(config_for(&server)).unwrap();
        let err = brain
            .complete(&conversation(), Sampling::default())
            .await
            .unwrap_err();
        match err {
            ModelError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid API Key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&server)
            .await;

        let brain = Brain::new(config_for(&server)).unwrap();
        let err = brain
            .complete(&conversation(), Sampling::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::MalformedBody(_)));
    }

    #[tokio::test]
    async fn missing_content_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let brain = Brain::new(config_for(&server)).unwrap();
        let err = brain
            .complete(&conversation(), Sampling::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::MissingContent));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_network_error() {
        let config = ModelConfig {
            endpoint: "http://127.0.0.1:1/v1/chat/completions".to_string(),
            ..ModelConfig::new("k")
        };
        let brain = Brain::new(config).unwrap();
        let err = brain
            .complete(&conversation(), Sampling::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::Network(_)));
    }
}
