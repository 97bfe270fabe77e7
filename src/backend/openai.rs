//! OpenAI chat-completions adapter.

use async_trait::async_trait;

use super::chat;
use super::protocol::{Backend, BackendError, Completion};
use super::usage::UsageCounters;
use crate::config::{BackendConfig, Provider};

/// Calls `{base_url}/v1/chat/completions` with a bearer key.
///
/// A reply without a `usage` object is accepted with zero counters and a
/// warning.
pub struct OpenAiBackend {
    client: reqwest::Client,
    config: BackendConfig,
    api_key: Option<String>,
}

impl OpenAiBackend {
    pub fn from_config(config: &BackendConfig) -> Self {
        Self {
            client: chat::http_client(config),
            api_key: config.resolve_api_key(),
            config: config.clone(),
        }
    }
}

#[async_trait]
impl Backend for OpenAiBackend {
    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, prompt: &str) -> Result<Completion, BackendError> {
        let key = self.api_key.as_deref().ok_or(BackendError::MissingApiKey {
            provider: Provider::OpenAi,
        })?;

        let response =
            chat::chat_completion(Provider::OpenAi, &self.client, &self.config, Some(key), prompt)
                .await?;

        if response.usage.is_none() {
            log::warn!("backend: OpenAI reply carried no usage, counting zero");
        }
        Ok(chat::into_completion(response, UsageCounters::default()))
    }
}
