//! The call protocol shared by every backend.
//!
//! Providers only implement one wire call ([`Backend::complete`]).  The retry
//! skeleton in [`generate`] is written once: each attempt sends the prompt,
//! looks for a fenced block in the reply and retries when there is none.
//! Usage is accumulated over *every* attempt that got a reply, including the
//! ones whose reply had no usable block.

use async_trait::async_trait;
use thiserror::Error;

use super::usage::UsageCounters;
use crate::config::Provider;

/// Delimiter of the structured block inside a reply.
pub const FENCE: &str = "```";

// ---------------------------------------------------------------------------
// BackendError
// ---------------------------------------------------------------------------

/// Errors that can occur while talking to a backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP transport or connection error.
    #[error("{provider} request failed: {message}")]
    Request { provider: Provider, message: String },

    /// The request did not complete within the configured timeout.
    #[error("{provider} request timed out")]
    Timeout { provider: Provider },

    /// The provider answered with a non-success status.
    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        provider: Provider,
        status: u16,
        body: String,
    },

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse {provider} response: {message}")]
    Parse { provider: Provider, message: String },

    /// No API key in config or environment for a provider that needs one.
    #[error("no API key configured for {provider}")]
    MissingApiKey { provider: Provider },

    /// Transport/provider failures exhausted the retry budget.
    #[error("{provider} inference failed after {attempts} attempt(s): {source}")]
    Inference {
        provider: Provider,
        attempts: u32,
        usage: UsageCounters,
        #[source]
        source: Box<BackendError>,
    },

    /// Every reply lacked a fenced block.
    #[error("no fenced block in {provider} reply after {attempts} attempt(s)")]
    NoStructuredBlock {
        provider: Provider,
        attempts: u32,
        usage: UsageCounters,
    },

    /// A runtime for the blocking entry point could not be created.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

impl BackendError {
    /// Map a `reqwest` failure for `provider`, distinguishing timeouts.
    pub fn transport(provider: Provider, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            BackendError::Timeout { provider }
        } else {
            BackendError::Request {
                provider,
                message: e.to_string(),
            }
        }
    }

    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            BackendError::Request { .. } | BackendError::Timeout { .. } => true,
            BackendError::Parse { .. } => true,
            BackendError::Status { status, .. } => {
                *status == 408 || *status == 429 || *status >= 500
            }
            _ => false,
        }
    }

    /// Usage consumed before the failure, when the error records it.
    pub fn usage(&self) -> UsageCounters {
        match self {
            BackendError::Inference { usage, .. } | BackendError::NoStructuredBlock { usage, .. } => {
                *usage
            }
            _ => UsageCounters::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Completion / Generation
// ---------------------------------------------------------------------------

/// One raw reply from one wire call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    pub text: String,
    pub usage: UsageCounters,
}

/// Result of [`generate`]: the extracted block plus accounting.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    /// Contents of the fenced block (fences and language tag removed).
    pub block: String,
    /// The full reply the block came from.
    pub raw: String,
    /// Usage summed over all attempts.
    pub usage: UsageCounters,
    /// Number of attempts made, including the successful one.
    pub attempts: u32,
}

// ---------------------------------------------------------------------------
// Backend trait
// ---------------------------------------------------------------------------

/// Uniform interface to a remote generative model.
///
/// Implementors must be `Send + Sync` so they can be shared across tasks
/// behind an `Arc<dyn Backend>`.
#[async_trait]
pub trait Backend: Send + Sync {
    fn provider(&self) -> Provider;

    fn model(&self) -> &str;

    /// Send `prompt` once and return the raw reply.
    async fn complete(&self, prompt: &str) -> Result<Completion, BackendError>;

    /// Retry until a fenced block comes back; see [`generate`].
    async fn generate(&self, prompt: &str, max_retries: u32) -> Result<Generation, BackendError> {
        generate(self, prompt, max_retries).await
    }
}

/// Submit `prompt` up to `max_retries` times (at least once) until the reply
/// contains a fenced block.
///
/// # Errors
/// * [`BackendError::Inference`] — the last attempt failed at the transport
///   or provider level, or a non-retryable provider error occurred.
/// * [`BackendError::NoStructuredBlock`] — replies arrived but none carried a
///   block.
pub async fn generate<B>(backend: &B, prompt: &str, max_retries: u32) -> Result<Generation, BackendError>
where
    B: Backend + ?Sized,
{
    let provider = backend.provider();
    let budget = max_retries.max(1);
    let mut usage = UsageCounters::default();
    let mut last_error = None;

    for attempt in 1..=budget {
        match backend.complete(prompt).await {
            Ok(completion) => {
                usage += completion.usage;
                last_error = None;
                if let Some(block) = extract_fenced_block(&completion.text) {
                    log::debug!("backend: {provider} block found on attempt {attempt}/{budget}");
                    return Ok(Generation {
                        block,
                        raw: completion.text,
                        usage,
                        attempts: attempt,
                    });
                }
                log::warn!(
                    "backend: {provider} reply had no fenced block (attempt {attempt}/{budget}, {} chars)",
                    completion.text.len()
                );
            }
            Err(e) => {
                log::warn!("backend: {provider} attempt {attempt}/{budget} failed: {e}");
                let retryable = e.is_retryable();
                last_error = Some(e);
                if !retryable {
                    return Err(inference_error(provider, attempt, usage, last_error));
                }
            }
        }
    }

    match last_error {
        Some(_) => Err(inference_error(provider, budget, usage, last_error)),
        None => Err(BackendError::NoStructuredBlock {
            provider,
            attempts: budget,
            usage,
        }),
    }
}

fn inference_error(
    provider: Provider,
    attempts: u32,
    usage: UsageCounters,
    source: Option<BackendError>,
) -> BackendError {
    let source = source.unwrap_or(BackendError::Request {
        provider,
        message: "unknown failure".into(),
    });
    BackendError::Inference {
        provider,
        attempts,
        usage,
        source: Box::new(source),
    }
}

/// Blocking form of [`generate`] for synchronous callers.
pub fn generate_blocking<B>(backend: &B, prompt: &str, max_retries: u32) -> Result<Generation, BackendError>
where
    B: Backend + ?Sized,
{
    crate::runtime::run_blocking(generate(backend, prompt, max_retries))?
}

// ---------------------------------------------------------------------------
// Fenced block extraction
// ---------------------------------------------------------------------------

/// Return the contents of the first ```` ``` ````-delimited block in `text`.
///
/// A language tag on the opening fence line (```` ```tsv ````) is skipped.
/// Returns `None` when there is no closing fence or the block is blank.
pub fn extract_fenced_block(text: &str) -> Option<String> {
    let open = text.find(FENCE)?;
    let after_open = &text[open + FENCE.len()..];

    let body_start = match after_open.find('\n') {
        Some(nl) if is_language_tag(&after_open[..nl]) => nl + 1,
        _ => 0,
    };
    let body = &after_open[body_start..];
    let close = body.find(FENCE)?;

    let block = body[..close].trim();
    if block.is_empty() {
        None
    } else {
        Some(block.to_string())
    }
}

fn is_language_tag(line: &str) -> bool {
    line.trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '+')
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
