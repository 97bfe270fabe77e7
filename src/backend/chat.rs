//! Shared wire plumbing for chat-completions style endpoints.
//!
//! OpenAI and Mistral speak the same `/v1/chat/completions` format; their
//! adapters only differ in defaults and in how a reply without a `usage`
//! object is treated.

use serde::Deserialize;

use super::protocol::{BackendError, Completion};
use super::usage::{ChatUsage, UsageCounters};
use crate::config::{BackendConfig, Provider};

/// Build the HTTP client with the per-request timeout from `config`.
///
/// Falls back to a default client if the builder fails.
pub(crate) fn http_client(config: &BackendConfig) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.timeout_secs))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoice {
    pub message: ChatMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    /// Text of the first choice, empty when absent.
    pub fn text(&self) -> String {
        self.choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default()
    }
}

/// Turn a non-success HTTP response into [`BackendError::Status`].
pub(crate) async fn check_status(
    provider: Provider,
    response: reqwest::Response,
) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(BackendError::Status {
        provider,
        status: status.as_u16(),
        body: truncate(&body, 512),
    })
}

/// One chat-completions round trip.
///
/// Returns the parsed response; the caller decides what a missing `usage`
/// object means.
pub(crate) async fn chat_completion(
    provider: Provider,
    client: &reqwest::Client,
    config: &BackendConfig,
    api_key: Option<&str>,
    prompt: &str,
) -> Result<ChatResponse, BackendError> {
    let url = format!("{}/v1/chat/completions", config.base_url());

    let body = serde_json::json!({
        "model":       config.model,
        "messages": [
            { "role": "user", "content": prompt }
        ],
        "stream":      false,
        "temperature": config.temperature
    });

    let mut req = client.post(&url).json(&body);
    if let Some(key) = api_key.filter(|k| !k.is_empty()) {
        req = req.bearer_auth(key);
    }

    let response = req
        .send()
        .await
        .map_err(|e| BackendError::transport(provider, e))?;
    let response = check_status(provider, response).await?;

    response
        .json::<ChatResponse>()
        .await
        .map_err(|e| BackendError::Parse {
            provider,
            message: e.to_string(),
        })
}

/// Completion from a chat response, using `missing` when it has no usage.
pub(crate) fn into_completion(response: ChatResponse, missing: UsageCounters) -> Completion {
    let text = response.text();
    let usage = response.usage.map(UsageCounters::from).unwrap_or(missing);
    Completion { text, usage }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_reply_with_usage() {
        let json = r#"{
            "choices": [{ "message": { "role": "assistant", "content": "```\nx\n```" } }],
            "usage": { "prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15 }
        }"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        let completion = into_completion(response, UsageCounters::default());
        assert_eq!(completion.text, "```\nx\n```");
        assert_eq!(completion.usage, UsageCounters::new(12, 3, 15));
    }

    #[test]
    fn reply_without_choices_is_empty_text() {
        let response: ChatResponse = serde_json::from_str("{}").unwrap();
        let completion = into_completion(response, UsageCounters::default());
        assert!(completion.text.is_empty());
        assert!(completion.usage.is_zero());
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("abc", 5), "abc");
        assert_eq!(truncate("ἀγαθός", 3), "ἀγα…");
    }
}
