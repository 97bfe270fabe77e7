//! Ollama adapter using the native `/api/generate` endpoint.
//!
//! No authentication is required by default; a configured key is sent as a
//! bearer token for hosted instances behind a proxy.

use async_trait::async_trait;
use serde::Deserialize;

use super::chat;
use super::protocol::{Backend, BackendError, Completion};
use super::usage::UsageCounters;
use crate::config::{BackendConfig, Provider};

pub struct OllamaBackend {
    client: reqwest::Client,
    config: BackendConfig,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    prompt_eval_count: Option<u64>,
    #[serde(default)]
    eval_count: Option<u64>,
}

impl From<GenerateResponse> for Completion {
    fn from(r: GenerateResponse) -> Self {
        Completion {
            usage: UsageCounters::from_parts(
                r.prompt_eval_count.unwrap_or(0),
                r.eval_count.unwrap_or(0),
            ),
            text: r.response,
        }
    }
}

impl OllamaBackend {
    pub fn from_config(config: &BackendConfig) -> Self {
        Self {
            client: chat::http_client(config),
            api_key: config.resolve_api_key(),
            config: config.clone(),
        }
    }
}

#[async_trait]
impl Backend for OllamaBackend {
    fn provider(&self) -> Provider {
        Provider::Ollama
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, prompt: &str) -> Result<Completion, BackendError> {
        let url = format!("{}/api/generate", self.config.base_url());

        let body = serde_json::json!({
            "model":  self.config.model,
            "prompt": prompt,
            "stream": false,
            "options": { "temperature": self.config.temperature }
        });

        let mut req = self.client.post(&url).json(&body);
        if let Some(key) = self.api_key.as_deref() {
            req = req.bearer_auth(key);
        }

        let response = req
            .send()
            .await
            .map_err(|e| BackendError::transport(Provider::Ollama, e))?;
        let response = chat::check_status(Provider::Ollama, response).await?;

        let parsed: GenerateResponse = response.json().await.map_err(|e| BackendError::Parse {
            provider: Provider::Ollama,
            message: e.to_string(),
        })?;
        Ok(parsed.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eval_counts_become_usage() {
        let json = r#"{"model":"llama3.1:8b","response":"```\nrex\n```","done":true,
                       "prompt_eval_count":26,"eval_count":9}"#;
        let parsed: GenerateResponse = serde_json::from_str(json).unwrap();
        let completion = Completion::from(parsed);
        assert_eq!(completion.text, "```\nrex\n```");
        assert_eq!(completion.usage, UsageCounters::new(26, 9, 35));
    }

    #[test]
    fn missing_counts_are_zero() {
        let parsed: GenerateResponse = serde_json::from_str(r#"{"response":"hi"}"#).unwrap();
        assert!(Completion::from(parsed).usage.is_zero());
    }

    #[tokio::test]
    async fn unreachable_host_is_a_retryable_transport_error() {
        let config = BackendConfig {
            base_url: Some("http://127.0.0.1:9".into()),
            timeout_secs: 2,
            ..BackendConfig::default()
        };
        let backend = OllamaBackend::from_config(&config);
        let err = backend.complete("hi").await.unwrap_err();
        assert!(err.is_retryable(), "unexpected error: {err}");
    }
}
