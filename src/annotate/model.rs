//! Token- and sentence-level annotation types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::parse::TableLayout;
use crate::tags::{Tag, TagSet};

// ---------------------------------------------------------------------------
// Span
// ---------------------------------------------------------------------------

/// Half-open `[start, stop)` range of char offsets into the normalized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub stop: usize,
}

impl Span {
    pub fn new(start: usize, stop: usize) -> Self {
        Self { start, stop }
    }

    pub fn len(&self) -> usize {
        self.stop.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// AnnotationField
// ---------------------------------------------------------------------------

/// Token fields that a backend call can populate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationField {
    Lemma,
    Upos,
    Features,
    DependencyRelation,
    Governor,
    Gloss,
}

impl AnnotationField {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnotationField::Lemma => "lemma",
            AnnotationField::Upos => "upos",
            AnnotationField::Features => "features",
            AnnotationField::DependencyRelation => "dependency_relation",
            AnnotationField::Governor => "governor",
            AnnotationField::Gloss => "gloss",
        }
    }
}

impl fmt::Display for AnnotationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Process
// ---------------------------------------------------------------------------

/// An annotation pass; its id is the prompt process id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Process {
    /// `FORM LEMMA UPOS FEATS`
    Morphosyntax,
    /// `FORM HEAD DEPREL`
    Dependency,
    /// JSON: glosses, idioms, translation, notes, confidence.
    Enrichment,
}

impl Process {
    pub const ALL: [Process; 3] = [Process::Morphosyntax, Process::Dependency, Process::Enrichment];

    pub fn id(&self) -> &'static str {
        match self {
            Process::Morphosyntax => "morphosyntax",
            Process::Dependency => "dependency",
            Process::Enrichment => "enrichment",
        }
    }

    /// Table layout of the reply; `None` for JSON replies.
    pub fn layout(&self) -> Option<TableLayout> {
        match self {
            Process::Morphosyntax => Some(TableLayout::MORPHOSYNTAX),
            Process::Dependency => Some(TableLayout::DEPENDENCY),
            Process::Enrichment => None,
        }
    }

    /// Token fields this process populates.
    pub fn fields(&self) -> &'static [AnnotationField] {
        match self {
            Process::Morphosyntax => &[
                AnnotationField::Lemma,
                AnnotationField::Upos,
                AnnotationField::Features,
            ],
            Process::Dependency => &[AnnotationField::DependencyRelation, AnnotationField::Governor],
            Process::Enrichment => &[AnnotationField::Gloss],
        }
    }
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Process {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Process::ALL
            .into_iter()
            .find(|p| p.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown process {s:?}"))
    }
}

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

/// One token of a document.
///
/// `governor` is a document-global token index; `None` with a
/// `dependency_relation` set means the token is the sentence root.
/// `annotation_sources` maps each populated field to the provenance record
/// that produced it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub index_token: usize,
    pub index_sentence: usize,
    pub string: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lemma: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upos: Option<Tag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<TagSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_relation: Option<Tag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub governor: Option<usize>,
    #[serde(default)]
    pub index_char_start: Option<usize>,
    #[serde(default)]
    pub index_char_stop: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gloss: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotation_sources: BTreeMap<AnnotationField, String>,
}

impl Token {
    pub fn new(string: impl Into<String>) -> Self {
        Self {
            string: string.into(),
            ..Self::default()
        }
    }

    pub fn has_field(&self, field: AnnotationField) -> bool {
        match field {
            AnnotationField::Lemma => self.lemma.is_some(),
            AnnotationField::Upos => self.upos.is_some(),
            AnnotationField::Features => self.features.is_some(),
            AnnotationField::DependencyRelation => self.dependency_relation.is_some(),
            AnnotationField::Governor => self.governor.is_some(),
            AnnotationField::Gloss => self.gloss.is_some(),
        }
    }

    /// Unset `field` and forget its source.
    pub fn clear_field(&mut self, field: AnnotationField) {
        match field {
            AnnotationField::Lemma => self.lemma = None,
            AnnotationField::Upos => self.upos = None,
            AnnotationField::Features => self.features = None,
            AnnotationField::DependencyRelation => self.dependency_relation = None,
            AnnotationField::Governor => self.governor = None,
            AnnotationField::Gloss => self.gloss = None,
        }
        self.annotation_sources.remove(&field);
    }

    /// Source record of `field`, if it was produced by a backend call.
    pub fn source(&self, field: AnnotationField) -> Option<&str> {
        self.annotation_sources.get(&field).map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// SentenceAnnotation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Idiom {
    pub phrase: String,
    #[serde(default)]
    pub meaning: String,
}

/// Sentence-level results of the enrichment process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentenceAnnotation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub idioms: Vec<Idiom>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Provenance record of the call that produced this annotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl SentenceAnnotation {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
