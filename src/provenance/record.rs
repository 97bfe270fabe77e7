//! Provenance records and redacted configuration snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::prompts::PromptInfo;

/// Substrings that mark a configuration key as sensitive (matched on the
/// lowercased key with `-` mapped to `_`).
pub const SENSITIVE_KEY_PARTS: &[&str] = &[
    "api_key",
    "apikey",
    "secret",
    "password",
    "passwd",
    "access_token",
    "auth_token",
    "authorization",
    "bearer",
];

/// Placeholder written in place of a sensitive value.
pub const REDACTED: &str = "[redacted]";

fn is_sensitive(key: &str) -> bool {
    let key = key.to_lowercase().replace('-', "_");
    SENSITIVE_KEY_PARTS.iter().any(|part| key.contains(part))
}

/// Copy of `value` with every sensitive object key's value replaced by
/// [`REDACTED`], recursively.  `null` values are left as they are so an
/// unset key stays distinguishable from a set one.
pub fn redact_config(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    let v = if is_sensitive(k) && !v.is_null() {
                        Value::String(REDACTED.into())
                    } else {
                        redact_config(v)
                    };
                    (k.clone(), v)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact_config).collect()),
        other => other.clone(),
    }
}

/// Hex SHA-256 of the compact JSON encoding of an (already redacted)
/// snapshot.
pub fn config_digest(redacted: &Value) -> String {
    crate::prompts::template::sha256_hex(&redacted.to_string())
}

// ---------------------------------------------------------------------------
// ConfigSnapshot
// ---------------------------------------------------------------------------

/// A redacted configuration captured once per run and shared by its records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub value: Value,
    pub digest: String,
}

impl ConfigSnapshot {
    pub fn capture<T: Serialize>(config: &T) -> Result<Self, serde_json::Error> {
        let value = redact_config(&serde_json::to_value(config)?);
        let digest = config_digest(&value);
        Ok(Self { value, digest })
    }
}

// ---------------------------------------------------------------------------
// ProvenanceRecord
// ---------------------------------------------------------------------------

/// Which call produced an annotation.  Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceRecord {
    pub id: String,
    pub backend: String,
    pub model: String,
    pub prompt_kind: String,
    pub prompt_version: String,
    pub prompt_digest: String,
    pub config_snapshot: Value,
    pub config_digest: String,
    pub created_at: DateTime<Utc>,
}

impl ProvenanceRecord {
    /// New record with a fresh v4 id, stamped now.
    pub fn new(backend: &str, model: &str, prompt: &PromptInfo, config: &ConfigSnapshot) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            backend: backend.to_string(),
            model: model.to_string(),
            prompt_kind: prompt.kind.clone(),
            prompt_version: prompt.version.clone(),
            prompt_digest: prompt.digest.clone(),
            config_snapshot: config.value.clone(),
            config_digest: config.digest.clone(),
            created_at: Utc::now(),
        }
    }
}
