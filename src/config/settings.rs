//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across tasks.
//! Missing tables or fields fall back to their defaults.

use std::fmt;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Selects which generative-model backend produces annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    /// OpenAI chat-completions API (or any wire-compatible host).
    OpenAi,
    /// Mistral chat-completions API.
    Mistral,
    /// Ollama, local or hosted. No authentication required by default.
    Ollama,
}

impl Default for Provider {
    fn default() -> Self {
        Self::Ollama
    }
}

impl Provider {
    /// Base URL used when the config does not set one.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::OpenAi => "https://api.openai.com",
            Provider::Mistral => "https://api.mistral.ai",
            Provider::Ollama => "http://localhost:11434",
        }
    }

    /// Environment variable consulted when no API key is configured.
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            Provider::OpenAi => Some("OPENAI_API_KEY"),
            Provider::Mistral => Some("MISTRAL_API_KEY"),
            Provider::Ollama => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Provider::OpenAi => "OpenAI",
            Provider::Mistral => "Mistral",
            Provider::Ollama => "Ollama",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// BackendConfig
// ---------------------------------------------------------------------------

/// Connection settings for the selected backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Which backend to use.
    pub provider: Provider,
    /// Base URL of the API endpoint; `None` uses the provider default.
    pub base_url: Option<String>,
    /// API key. `None` falls back to the provider's environment variable.
    pub api_key: Option<String>,
    /// Model identifier sent to the API (e.g. `"gpt-4.1-mini"`).
    pub model: String,
    /// Sampling temperature (0.0 – 1.0).
    pub temperature: f32,
    /// Maximum seconds to wait for one HTTP round trip.
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            base_url: None,
            api_key: None,
            model: "llama3.1:8b".into(),
            temperature: 0.1,
            timeout_secs: 120,
        }
    }
}

impl BackendConfig {
    /// Configured base URL, or the provider default, without a trailing `/`.
    pub fn base_url(&self) -> String {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
            .trim_end_matches('/')
            .to_string()
    }

    /// Configured key if non-empty, else the provider's environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            return Some(key.to_string());
        }
        let var = self.provider.api_key_env()?;
        std::env::var(var).ok().filter(|k| !k.is_empty())
    }
}

// ---------------------------------------------------------------------------
// DispatchConfig
// ---------------------------------------------------------------------------

/// What happens to a document when one sentence cannot be annotated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailurePolicy {
    /// The whole call fails, naming the first failing sentence.
    FailDocument,
    /// The failing sentence is left untouched and reported on the document.
    Isolate,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        Self::FailDocument
    }
}

/// Settings for the per-sentence dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Maximum number of backend calls in flight at once.
    pub concurrency_limit: usize,
    /// Attempts per sentence before giving up.
    pub max_retries: u32,
    pub failure_policy: FailurePolicy,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: 4,
            max_retries: 3,
            failure_policy: FailurePolicy::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// PromptConfig
// ---------------------------------------------------------------------------

/// Which prompts to use and the values they are rendered with.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Prompt profile name.
    pub profile: String,
    /// Explicit version; `None` uses the profile's default.
    pub version: Option<String>,
    /// Extra TOML template file loaded at startup.
    pub template_file: Option<PathBuf>,
    /// Language of the texts being annotated.
    pub language: String,
    /// Target language of enrichment translations.
    pub translation_language: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            profile: crate::prompts::DEFAULT_PROFILE.into(),
            version: None,
            template_file: None,
            language: "Latin".into(),
            translation_language: "English".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level configuration, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use glossator::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub dispatch: DispatchConfig,
    pub prompts: PromptConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(original.backend.provider, loaded.backend.provider);
        assert_eq!(original.backend.model, loaded.backend.model);
        assert_eq!(original.backend.timeout_secs, loaded.backend.timeout_secs);
        assert_eq!(original.backend.temperature, loaded.backend.temperature);
        assert_eq!(
            original.dispatch.concurrency_limit,
            loaded.dispatch.concurrency_limit
        );
        assert_eq!(original.dispatch.max_retries, loaded.dispatch.max_retries);
        assert_eq!(
            original.dispatch.failure_policy,
            loaded.dispatch.failure_policy
        );
        assert_eq!(original.prompts.profile, loaded.prompts.profile);
        assert_eq!(original.prompts.language, loaded.prompts.language);
    }

    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        assert_eq!(config.backend.provider, Provider::Ollama);
        assert_eq!(config.dispatch.concurrency_limit, 4);
        assert_eq!(config.prompts.profile, "default");
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("partial.toml");
        std::fs::write(
            &path,
            "[backend]\nprovider = \"Mistral\"\nmodel = \"mistral-large-latest\"\n\n[dispatch]\nfailure_policy = \"Isolate\"\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&path).expect("load");
        assert_eq!(config.backend.provider, Provider::Mistral);
        assert_eq!(config.backend.model, "mistral-large-latest");
        assert_eq!(config.backend.base_url(), "https://api.mistral.ai");
        assert_eq!(config.dispatch.failure_policy, FailurePolicy::Isolate);
        assert_eq!(config.dispatch.max_retries, 3);
        assert_eq!(config.prompts.language, "Latin");
    }

    #[test]
    fn base_url_override_drops_trailing_slash() {
        let cfg = BackendConfig {
            base_url: Some("http://gpu-box:11434/".into()),
            ..BackendConfig::default()
        };
        assert_eq!(cfg.base_url(), "http://gpu-box:11434");
    }

    #[test]
    fn configured_api_key_wins_and_empty_is_ignored() {
        let cfg = BackendConfig {
            provider: Provider::Ollama,
            api_key: Some("sk-test".into()),
            ..BackendConfig::default()
        };
        assert_eq!(cfg.resolve_api_key().as_deref(), Some("sk-test"));

        let cfg = BackendConfig {
            provider: Provider::Ollama,
            api_key: Some(String::new()),
            ..BackendConfig::default()
        };
        // Ollama has no environment fallback.
        assert_eq!(cfg.resolve_api_key(), None);
    }
}
