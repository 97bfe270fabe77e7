//! Provider selection from configuration.

use async_trait::async_trait;

use super::mistral::MistralBackend;
use super::ollama::OllamaBackend;
use super::openai::OpenAiBackend;
use super::protocol::{Backend, BackendError, Completion};
use crate::config::{BackendConfig, Provider};

/// A backend chosen at runtime from [`BackendConfig::provider`].
pub enum Connection {
    OpenAi(OpenAiBackend),
    Mistral(MistralBackend),
    Ollama(OllamaBackend),
}

impl Connection {
    pub fn from_config(config: &BackendConfig) -> Self {
        log::info!(
            "backend: {} model={} url={}",
            config.provider,
            config.model,
            config.base_url()
        );
        match config.provider {
            Provider::OpenAi => Connection::OpenAi(OpenAiBackend::from_config(config)),
            Provider::Mistral => Connection::Mistral(MistralBackend::from_config(config)),
            Provider::Ollama => Connection::Ollama(OllamaBackend::from_config(config)),
        }
    }

    fn inner(&self) -> &dyn Backend {
        match self {
            Connection::OpenAi(b) => b,
            Connection::Mistral(b) => b,
            Connection::Ollama(b) => b,
        }
    }
}

#[async_trait]
impl Backend for Connection {
    fn provider(&self) -> Provider {
        self.inner().provider()
    }

    fn model(&self) -> &str {
        self.inner().model()
    }

    async fn complete(&self, prompt: &str) -> Result<Completion, BackendError> {
        self.inner().complete(prompt).await
    }
}
