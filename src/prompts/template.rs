//! Immutable prompt templates, digests and rendering.
//!
//! A [`PromptTemplate`] is either a single text or a map of named variants
//! (e.g. "table from raw text" vs "table from given tokens").  Its digest is
//! a SHA-256 over the canonicalized text, so two templates with the same
//! wording always hash the same regardless of profile or version labels.
//!
//! Placeholders use `{name}`; `{{` and `}}` produce literal braces.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

// ---------------------------------------------------------------------------
// PromptError
// ---------------------------------------------------------------------------

/// Errors raised while looking up or rendering prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    /// No version of the profile has been registered or marked default.
    #[error("no prompts registered for profile {0:?}")]
    UnknownProfile(String),

    /// The profile/version exists but lacks this process.
    #[error("no {process:?} prompt in profile {profile:?} version {version:?}")]
    NotFound {
        profile: String,
        process: String,
        version: String,
    },

    /// The template has named variants and the caller did not pick one.
    #[error("prompt {process:?} has variants {available:?}; one must be chosen")]
    VariantRequired {
        process: String,
        available: Vec<String>,
    },

    /// The requested variant does not exist on this template.
    #[error("prompt {process:?} has no variant {variant:?}")]
    UnknownVariant { process: String, variant: String },

    /// A `{placeholder}` had no value supplied.
    #[error("no value supplied for placeholder {{{0}}}")]
    MissingVariable(String),

    /// A template file could not be read.
    #[error("failed to read template file: {0}")]
    Io(#[from] std::io::Error),

    /// A template file is not valid TOML for the expected layout.
    #[error("invalid template file: {0}")]
    Format(String),
}

// ---------------------------------------------------------------------------
// TemplateBody
// ---------------------------------------------------------------------------

/// Template text: one string, or variant name → string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplateBody {
    Text(String),
    Variants(BTreeMap<String, String>),
}

impl From<&str> for TemplateBody {
    fn from(text: &str) -> Self {
        TemplateBody::Text(text.to_string())
    }
}

impl From<String> for TemplateBody {
    fn from(text: String) -> Self {
        TemplateBody::Text(text)
    }
}

impl<const N: usize> From<[(&str, &str); N]> for TemplateBody {
    fn from(variants: [(&str, &str); N]) -> Self {
        TemplateBody::Variants(
            variants
                .into_iter()
                .map(|(name, text)| (name.to_string(), text.to_string()))
                .collect(),
        )
    }
}

impl TemplateBody {
    /// Canonical form hashed into the template digest.  Variants are taken in
    /// name order so map iteration never affects the result.
    fn canonical(&self) -> String {
        match self {
            TemplateBody::Text(text) => canonicalize(text),
            TemplateBody::Variants(map) => map
                .iter()
                .map(|(name, text)| format!("[{name}]\n{}", canonicalize(text)))
                .collect::<Vec<_>>()
                .join("\n\u{1e}\n"),
        }
    }
}

// ---------------------------------------------------------------------------
// PromptInfo
// ---------------------------------------------------------------------------

/// A concrete, rendered prompt ready to send to a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptInfo {
    /// Process id the template was registered under.
    pub kind: String,
    pub profile: String,
    pub version: String,
    pub variant: Option<String>,
    pub text: String,
    /// Digest of the template text that was rendered.
    pub digest: String,
}

// ---------------------------------------------------------------------------
// PromptTemplate
// ---------------------------------------------------------------------------

/// Immutable registered template.  The digest is computed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    profile: String,
    process: String,
    version: String,
    body: TemplateBody,
    digest: String,
}

impl PromptTemplate {
    pub fn new(
        profile: impl Into<String>,
        process: impl Into<String>,
        version: impl Into<String>,
        body: TemplateBody,
    ) -> Self {
        let digest = sha256_hex(&body.canonical());
        Self {
            profile: profile.into(),
            process: process.into(),
            version: version.into(),
            body,
            digest,
        }
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn process(&self) -> &str {
        &self.process
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn body(&self) -> &TemplateBody {
        &self.body
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn has_variants(&self) -> bool {
        matches!(self.body, TemplateBody::Variants(_))
    }

    pub fn variant_names(&self) -> Vec<&str> {
        match &self.body {
            TemplateBody::Text(_) => Vec::new(),
            TemplateBody::Variants(map) => map.keys().map(String::as_str).collect(),
        }
    }

    /// Substitute `vars` into the template (or into `variant` of it).
    ///
    /// Templates with variants require `variant`; single-text templates
    /// reject one.
    pub fn render(
        &self,
        variant: Option<&str>,
        vars: &[(&str, &str)],
    ) -> Result<PromptInfo, PromptError> {
        let (text, digest) = match (&self.body, variant) {
            (TemplateBody::Text(text), None) => (text.as_str(), self.digest.clone()),
            (TemplateBody::Text(_), Some(v)) => {
                return Err(PromptError::UnknownVariant {
                    process: self.process.clone(),
                    variant: v.to_string(),
                })
            }
            (TemplateBody::Variants(map), None) => {
                return Err(PromptError::VariantRequired {
                    process: self.process.clone(),
                    available: map.keys().cloned().collect(),
                })
            }
            (TemplateBody::Variants(map), Some(v)) => {
                let text = map.get(v).ok_or_else(|| PromptError::UnknownVariant {
                    process: self.process.clone(),
                    variant: v.to_string(),
                })?;
                (text.as_str(), digest(text))
            }
        };

        Ok(PromptInfo {
            kind: self.process.clone(),
            profile: self.profile.clone(),
            version: self.version.clone(),
            variant: variant.map(str::to_string),
            text: substitute(text, vars)?,
            digest,
        })
    }
}

// ---------------------------------------------------------------------------
// Canonicalization and digests
// ---------------------------------------------------------------------------

/// Normalize line endings, strip trailing whitespace on each line and trim
/// the whole text.
pub fn canonicalize(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Lowercase hex SHA-256 of the canonicalized `text`.
pub fn digest(text: &str) -> String {
    sha256_hex(&canonicalize(text))
}

pub(crate) fn sha256_hex(data: &str) -> String {
    format!("{:x}", Sha256::digest(data.as_bytes()))
}

// ---------------------------------------------------------------------------
// Substitution
// ---------------------------------------------------------------------------

fn substitute(text: &str, vars: &[(&str, &str)]) -> Result<String, PromptError> {
    let mut out = String::with_capacity(text.len() + 256);
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '{' => {
                if matches!(chars.peek(), Some((_, '{'))) {
                    chars.next();
                    out.push('{');
                    continue;
                }
                let rest = &text[i + 1..];
                match rest.find('}') {
                    Some(end) if is_placeholder(&rest[..end]) => {
                        let name = &rest[..end];
                        let value = vars
                            .iter()
                            .find(|(k, _)| *k == name)
                            .map(|(_, v)| *v)
                            .ok_or_else(|| PromptError::MissingVariable(name.to_string()))?;
                        out.push_str(value);
                        // Placeholder names are ASCII: one char per byte, plus '}'.
                        for _ in 0..=name.len() {
                            chars.next();
                        }
                    }
                    _ => out.push('{'),
                }
            }
            '}' => {
                if matches!(chars.peek(), Some((_, '}'))) {
                    chars.next();
                }
                out.push('}');
            }
            _ => out.push(c),
        }
    }
    Ok(out)
}

fn is_placeholder(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
