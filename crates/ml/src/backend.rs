use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::ClassifierConfig;
use crate::error::{ClassifierError, ModelError};
use crate::prompt::ClassificationPrompt;

/// A structured-output model service. Returns the raw message text; validation
/// happens in [`crate::response`].
#[async_trait]
pub trait ModelBackend: Send + Sync {
    fn model_name(&self) -> &str;
    async fn complete(&self, prompt: &ClassificationPrompt) -> Result<String, ModelError>;
}

/// OpenAI-compatible `chat/completions` backend in JSON-object mode.
pub struct OpenAiChatBackend {
    http: Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
}

impl OpenAiChatBackend {
    pub fn from_config(config: &ClassifierConfig) -> Result<Self, ClassifierError> {
        let api_key = config.api_key.clone().ok_or(ClassifierError::NotConfigured)?;
        let http = Client::builder()
            .connect_timeout(config.timeout.min(Duration::from_secs(2)))
            .timeout(config.timeout)
            .build()
            .map_err(ModelError::Network)?;

        Ok(Self {
            http,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            temperature: config.temperature,
        })
    }

    fn request_body(&self, prompt: &ClassificationPrompt) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "temperature": self.temperature,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": prompt.system },
                { "role": "user", "content": prompt.user }
            ]
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[async_trait]
impl ModelBackend for OpenAiChatBackend {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &ClassificationPrompt) -> Result<String, ModelError> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!(model = %self.model, prompt_len = prompt.user.len(), "complete: sending classification request");

        let response = self
            .http
            .post(url)
            .bearer_auth(self.api_key.as_str())
            .json(&self.request_body(prompt))
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(ModelError::RateLimited { retry_after });
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ModelError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: ChatCompletion = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ModelError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memo_core::RawRequest;

    #[test]
    fn refuses_to_build_without_api_key() {
        let result = OpenAiChatBackend::from_config(&ClassifierConfig::default());
        assert!(matches!(result, Err(ClassifierError::NotConfigured)));
    }

    #[test]
    fn body_requests_json_mode_at_low_temperature() {
        let config = ClassifierConfig {
            api_key: Some("sk-test".to_string()),
            base_url: "http://localhost:9/v1/".to_string(),
            ..ClassifierConfig::default()
        };
        let backend = OpenAiChatBackend::from_config(&config).unwrap();
        assert_eq!(backend.base_url, "http://localhost:9/v1");

        let body = backend.request_body(&ClassificationPrompt::for_request(&RawRequest::default()));
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["messages"][0]["role"], "system");
        assert!(body["temperature"].as_f64().unwrap() < 0.2);
    }

    #[test]
    fn completion_payload_parses() {
        let completion: ChatCompletion = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"{}"}}]}"#,
        )
        .unwrap();
        assert_eq!(completion.choices[0].message.content.as_deref(), Some("{}"));
    }
}
