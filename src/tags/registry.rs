//! Closed-vocabulary validation for part-of-speech tags, morphological
//! features and dependency relations.
//!
//! [`TagRegistry::validate`] never invents a tag: a pair is accepted when it
//! is canonical, or when the static remap tables turn it into a canonical
//! pair.  Anything else is a [`TagError::Unknown`] naming the rejected pair.
//! Relation subtypes outside the per-relation allow-list are dropped rather
//! than rejected.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::tables::{DEPRELS, DEPREL_REMAP, FEATURES, FEATURE_REMAP, UPOS, UPOS_REMAP};

/// Registry key for universal part-of-speech tags.
pub const UPOS_KEY: &str = "UPOS";

/// Registry key for dependency relations.
pub const DEPREL_KEY: &str = "deprel";

// ---------------------------------------------------------------------------
// TagError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    /// Neither the canonical tables nor the remap tables know this pair.
    #[error("unknown tag {key}={value}")]
    Unknown { key: String, value: String },
}

// ---------------------------------------------------------------------------
// Tag
// ---------------------------------------------------------------------------

/// A validated `(code, label)` pair drawn from one of the closed registries.
///
/// `key` names the vocabulary: [`UPOS_KEY`], [`DEPREL_KEY`] or a feature key
/// such as `"Case"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub code: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
}

impl Tag {
    fn new(key: &str, code: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            code: code.to_string(),
            label: label.to_string(),
            subtype: None,
        }
    }

    /// Code including the subtype, e.g. `nsubj:pass`.
    pub fn full_code(&self) -> String {
        match &self.subtype {
            Some(sub) => format!("{}:{}", self.code, sub),
            None => self.code.clone(),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.key.as_str() {
            UPOS_KEY | DEPREL_KEY => write!(f, "{}", self.full_code()),
            key => write!(f, "{}={}", key, self.code),
        }
    }
}

// ---------------------------------------------------------------------------
// TagSet
// ---------------------------------------------------------------------------

/// Order-preserving set of feature tags with unique keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet {
    tags: Vec<Tag>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `tag`, replacing (in place) any tag with the same key.
    ///
    /// Returns the replaced tag, if any.
    pub fn insert(&mut self, tag: Tag) -> Option<Tag> {
        match self.tags.iter_mut().find(|t| t.key == tag.key) {
            Some(slot) => Some(std::mem::replace(slot, tag)),
            None => {
                self.tags.push(tag);
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl fmt::Display for TagSet {
    /// CoNLL-U `FEATS` rendering; `_` when empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tags.is_empty() {
            return write!(f, "_");
        }
        let parts: Vec<String> = self.tags.iter().map(|t| t.to_string()).collect();
        write!(f, "{}", parts.join("|"))
    }
}

// ---------------------------------------------------------------------------
// TagRegistry
// ---------------------------------------------------------------------------

struct FeatureEntry {
    values: HashMap<&'static str, &'static str>,
}

struct RelationEntry {
    label: &'static str,
    subtypes: &'static [&'static str],
}

/// The canonical vocabularies plus their remap tables.
pub struct TagRegistry {
    upos: HashMap<&'static str, &'static str>,
    features: HashMap<&'static str, FeatureEntry>,
    deprels: HashMap<&'static str, RelationEntry>,
}

impl TagRegistry {
    /// Build a registry from the static UD tables.
    pub fn new() -> Self {
        let upos = UPOS.iter().copied().collect();
        let features = FEATURES
            .iter()
            .map(|def| {
                let values = def.values.iter().copied().collect();
                (def.key, FeatureEntry { values })
            })
            .collect();
        let deprels = DEPRELS
            .iter()
            .map(|def| {
                (
                    def.code,
                    RelationEntry {
                        label: def.label,
                        subtypes: def.subtypes,
                    },
                )
            })
            .collect();
        Self {
            upos,
            features,
            deprels,
        }
    }

    /// Process-wide registry, built on first use.
    pub fn global() -> &'static TagRegistry {
        static REGISTRY: OnceLock<TagRegistry> = OnceLock::new();
        REGISTRY.get_or_init(TagRegistry::new)
    }

    // -----------------------------------------------------------------------
    // Normalization
    // -----------------------------------------------------------------------

    /// Map an observed pair onto its canonical spelling.
    ///
    /// Pure: pairs absent from the remap tables come back unchanged (apart
    /// from trimming and, for UPOS / deprel, case folding).
    pub fn normalize(&self, key: &str, value: &str) -> (String, String) {
        let key = key.trim();
        let value = value.trim();
        match key {
            UPOS_KEY => {
                let upper = value.to_ascii_uppercase();
                let mapped = UPOS_REMAP
                    .iter()
                    .find(|(old, _)| *old == upper)
                    .map(|(_, new)| new.to_string())
                    .unwrap_or(upper);
                (key.to_string(), mapped)
            }
            DEPREL_KEY => (key.to_string(), normalize_deprel(&value.to_ascii_lowercase())),
            _ => FEATURE_REMAP
                .iter()
                .find(|((k, v), _)| *k == key && *v == value)
                .map(|(_, (k, v))| (k.to_string(), v.to_string()))
                .unwrap_or_else(|| (key.to_string(), value.to_string())),
        }
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    /// Validate `key=value` against the registry named by `key`.
    pub fn validate(&self, key: &str, value: &str) -> Result<Tag, TagError> {
        if let Some(tag) = self.lookup(key, value) {
            return Ok(tag);
        }

        let (norm_key, norm_value) = self.normalize(key, value);
        if norm_key != key || norm_value != value {
            if let Some(tag) = self.lookup(&norm_key, &norm_value) {
                log::info!("tags: normalized {key}={value} -> {norm_key}={norm_value}");
                return Ok(tag);
            }
        }

        Err(TagError::Unknown {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    pub fn validate_upos(&self, code: &str) -> Result<Tag, TagError> {
        self.validate(UPOS_KEY, code)
    }

    pub fn validate_deprel(&self, code: &str) -> Result<Tag, TagError> {
        self.validate(DEPREL_KEY, code)
    }

    /// Parse a CoNLL-U `FEATS` column into a [`TagSet`].
    ///
    /// Lossy: unknown pairs are logged and skipped.  For multi-valued
    /// features (`Case=Nom,Acc`) the first valid value is kept.
    pub fn parse_features(&self, raw: &str) -> TagSet {
        let mut set = TagSet::new();
        let raw = raw.trim();
        if raw.is_empty() || raw == "_" {
            return set;
        }

        for part in raw.split('|') {
            let Some((key, values)) = part.split_once('=') else {
                log::warn!("tags: malformed feature {part:?} dropped");
                continue;
            };

            let accepted = values
                .split(',')
                .find_map(|value| match self.validate(key, value) {
                    Ok(tag) => Some(tag),
                    Err(e) => {
                        log::warn!("tags: {e}, dropped");
                        None
                    }
                });

            if let Some(tag) = accepted {
                if let Some(old) = set.insert(tag) {
                    log::debug!("tags: duplicate feature key, replaced {old}");
                }
            }
        }
        set
    }

    /// Canonical UPOS codes, sorted.
    pub fn upos_codes(&self) -> Vec<&'static str> {
        let mut codes: Vec<_> = self.upos.keys().copied().collect();
        codes.sort_unstable();
        codes
    }

    /// Canonical relation codes (no subtypes), sorted.
    pub fn deprel_codes(&self) -> Vec<&'static str> {
        let mut codes: Vec<_> = self.deprels.keys().copied().collect();
        codes.sort_unstable();
        codes
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    /// Exact lookup against the canonical tables, no remapping.
    fn lookup(&self, key: &str, value: &str) -> Option<Tag> {
        match key {
            UPOS_KEY => self
                .upos
                .get_key_value(value)
                .map(|(code, label)| Tag::new(UPOS_KEY, code, label)),
            DEPREL_KEY => self.lookup_deprel(value),
            _ => {
                let entry = self.features.get(key)?;
                entry
                    .values
                    .get_key_value(value)
                    .map(|(code, label)| Tag::new(key, code, label))
            }
        }
    }

    fn lookup_deprel(&self, value: &str) -> Option<Tag> {
        let (base, subtype) = match value.split_once(':') {
            Some((base, sub)) => (base, Some(sub)),
            None => (value, None),
        };
        let (code, entry) = self.deprels.get_key_value(base)?;
        let mut tag = Tag::new(DEPREL_KEY, code, entry.label);

        if let Some(sub) = subtype {
            if entry.subtypes.contains(&sub) {
                tag.subtype = Some(sub.to_string());
            } else {
                log::info!("tags: subtype {sub:?} not allowed for {code}, dropped");
            }
        }
        Some(tag)
    }
}

impl Default for TagRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Remap a lower-cased relation, first as a whole, then by its base.
fn normalize_deprel(value: &str) -> String {
    if let Some((_, new)) = DEPREL_REMAP.iter().find(|(old, _)| *old == value) {
        return new.to_string();
    }
    if let Some((base, sub)) = value.split_once(':') {
        if let Some((_, new)) = DEPREL_REMAP.iter().find(|(old, _)| *old == base) {
            // The remapped relation already carries a subtype; keep that one.
            return if new.contains(':') {
                log::info!("tags: subtype {sub:?} of {base} dropped, remapped to {new}");
                new.to_string()
            } else {
                format!("{new}:{sub}")
            };
        }
    }
    value.to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TagRegistry {
        TagRegistry::new()
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    #[test]
    fn accepts_canonical_upos() {
        let tag = registry().validate_upos("NOUN").unwrap();
        assert_eq!(tag.code, "NOUN");
        assert_eq!(tag.label, "noun");
        assert_eq!(tag.key, UPOS_KEY);
    }

    #[test]
    fn legacy_upos_is_remapped() {
        let tag = registry().validate_upos("CONJ").unwrap();
        assert_eq!(tag.code, "CCONJ");
    }

    #[test]
    fn lowercase_upos_is_accepted() {
        let tag = registry().validate_upos("verb").unwrap();
        assert_eq!(tag.code, "VERB");
    }

    #[test]
    fn unknown_upos_names_the_pair() {
        let err = registry().validate_upos("BANANA").unwrap_err();
        assert_eq!(
            err,
            TagError::Unknown {
                key: UPOS_KEY.into(),
                value: "BANANA".into()
            }
        );
        assert!(err.to_string().contains("UPOS=BANANA"));
    }

    #[test]
    fn feature_long_form_is_remapped() {
        let tag = registry().validate("Number", "Singular").unwrap();
        assert_eq!((tag.key.as_str(), tag.code.as_str()), ("Number", "Sing"));
    }

    #[test]
    fn misfiled_feature_moves_key() {
        let tag = registry().validate("Tense", "Perf").unwrap();
        assert_eq!((tag.key.as_str(), tag.code.as_str()), ("Aspect", "Perf"));
    }

    #[test]
    fn unknown_feature_key_is_rejected() {
        assert!(registry().validate("Flavour", "Sweet").is_err());
    }

    #[test]
    fn allowed_deprel_subtype_is_kept() {
        let tag = registry().validate_deprel("nsubj:pass").unwrap();
        assert_eq!(tag.code, "nsubj");
        assert_eq!(tag.subtype.as_deref(), Some("pass"));
        assert_eq!(tag.to_string(), "nsubj:pass");
    }

    #[test]
    fn disallowed_deprel_subtype_is_dropped_not_rejected() {
        let tag = registry().validate_deprel("obl:instr").unwrap();
        assert_eq!(tag.code, "obl");
        assert_eq!(tag.subtype, None);
    }

    #[test]
    fn legacy_deprel_is_remapped_with_subtype() {
        let tag = registry().validate_deprel("nsubjpass").unwrap();
        assert_eq!(tag.full_code(), "nsubj:pass");
        let tag = registry().validate_deprel("dobj").unwrap();
        assert_eq!(tag.full_code(), "obj");
    }

    #[test]
    fn legacy_deprel_subtype_yields_to_remapped_subtype() {
        let reg = registry();
        assert_eq!(
            reg.normalize(DEPREL_KEY, "nsubjpass:xyz"),
            (DEPREL_KEY.to_string(), "nsubj:pass".to_string())
        );
        assert_eq!(reg.validate_deprel("nsubjpass:xyz").unwrap().full_code(), "nsubj:pass");
        assert_eq!(
            reg.normalize(DEPREL_KEY, "dobj:cogn"),
            (DEPREL_KEY.to_string(), "obj:cogn".to_string())
        );
    }

    #[test]
    fn unknown_deprel_is_rejected() {
        assert!(registry().validate_deprel("frobnicate").is_err());
    }

    // -----------------------------------------------------------------------
    // Normalization idempotence
    // -----------------------------------------------------------------------

    #[test]
    fn normalization_is_idempotent_for_every_remap_entry() {
        let reg = registry();
        let mut pairs: Vec<(String, String)> = Vec::new();
        pairs.extend(UPOS_REMAP.iter().map(|(old, _)| (UPOS_KEY.into(), old.to_string())));
        pairs.extend(
            DEPREL_REMAP
                .iter()
                .map(|(old, _)| (DEPREL_KEY.into(), old.to_string())),
        );
        pairs.extend(
            FEATURE_REMAP
                .iter()
                .map(|((k, v), _)| (k.to_string(), v.to_string())),
        );

        for (key, value) in pairs {
            let direct = reg.validate(&key, &value);
            assert!(direct.is_ok(), "remap entry {key}={value} must validate");

            let (nk, nv) = reg.normalize(&key, &value);
            assert_eq!(reg.validate(&nk, &nv), direct, "{key}={value}");

            // Normalizing twice lands on the same pair.
            assert_eq!(reg.normalize(&nk, &nv), (nk.clone(), nv.clone()));
        }
    }

    #[test]
    fn normalize_leaves_unknown_pairs_alone() {
        let (k, v) = registry().normalize("Case", "Nom");
        assert_eq!((k.as_str(), v.as_str()), ("Case", "Nom"));
    }

    // -----------------------------------------------------------------------
    // FEATS parsing / TagSet
    // -----------------------------------------------------------------------

    #[test]
    fn parse_features_keeps_order_and_drops_unknown() {
        let set = registry().parse_features("Case=Nom|Bogus=Yes|Number=Plural|Gender=Masc");
        let keys: Vec<&str> = set.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(keys, vec!["Case", "Number", "Gender"]);
        assert_eq!(set.to_string(), "Case=Nom|Number=Plur|Gender=Masc");
    }

    #[test]
    fn parse_features_underscore_is_empty() {
        let set = registry().parse_features("_");
        assert!(set.is_empty());
        assert_eq!(set.to_string(), "_");
    }

    #[test]
    fn parse_features_multi_value_keeps_first_valid() {
        let set = registry().parse_features("Case=Xyz,Acc,Nom");
        assert_eq!(set.get("Case").map(|t| t.code.as_str()), Some("Acc"));
    }

    #[test]
    fn tagset_insert_replaces_in_place() {
        let reg = registry();
        let mut set = TagSet::new();
        set.insert(reg.validate("Case", "Nom").unwrap());
        set.insert(reg.validate("Number", "Sing").unwrap());
        let old = set.insert(reg.validate("Case", "Acc").unwrap());

        assert_eq!(old.map(|t| t.code), Some("Nom".to_string()));
        assert_eq!(set.len(), 2);
        assert_eq!(set.to_string(), "Case=Acc|Number=Sing");
    }

    #[test]
    fn code_lists_are_sorted() {
        let reg = registry();
        let upos = reg.upos_codes();
        assert_eq!(upos.len(), 17);
        assert!(upos.windows(2).all(|w| w[0] < w[1]));
        assert!(reg.deprel_codes().contains(&"root"));
    }
}
