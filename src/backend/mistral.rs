//! Mistral chat-completions adapter.

use async_trait::async_trait;

use super::chat;
use super::protocol::{Backend, BackendError, Completion};
use super::usage::UsageCounters;
use crate::config::{BackendConfig, Provider};

/// Same wire format as OpenAI; a missing `usage` object counts as zero.
pub struct MistralBackend {
    client: reqwest::Client,
    config: BackendConfig,
    api_key: Option<String>,
}

impl MistralBackend {
    pub fn from_config(config: &BackendConfig) -> Self {
        Self {
            client: chat::http_client(config),
            api_key: config.resolve_api_key(),
            config: config.clone(),
        }
    }
}

#[async_trait]
impl Backend for MistralBackend {
    fn provider(&self) -> Provider {
        Provider::Mistral
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, prompt: &str) -> Result<Completion, BackendError> {
        let key = self.api_key.as_deref().ok_or(BackendError::MissingApiKey {
            provider: Provider::Mistral,
        })?;

        let response =
            chat::chat_completion(Provider::Mistral, &self.client, &self.config, Some(key), prompt)
                .await?;
        Ok(chat::into_completion(response, UsageCounters::default()))
    }
}
