//! Per-sentence annotation builder.
//!
//! A [`SentenceBuilder`] turns one backend reply into tokens for one
//! sentence, moving through `Empty → Parsing → Validating → Aligned → Done`:
//!
//! * **Parsing** runs the structured parser on the fenced block.
//! * **Validating** checks every tag against the [`TagRegistry`]; invalid
//!   values are normalized or dropped, never fatal.
//! * **Aligned** creates tokens with char offsets, or matches rows onto the
//!   tokens the sentence already has, and resolves HEAD values.
//! * **Done** stamps every field this call populated with the provenance
//!   record id.
//!
//! All indices in the output are sentence-local (`index_token` 0..n,
//! governors into the same range).  The document shifts them when merging.

use std::collections::{BTreeSet, HashMap};

use serde_json::{Map, Value};
use thiserror::Error;

use super::align::align_tokens;
use super::model::{AnnotationField, Idiom, Process, SentenceAnnotation, Span, Token};
use crate::parse::{parse_json_object, ParseError, Record, ENRICHMENT_KEYS};
use crate::tags::{Tag, TagRegistry, TagSet};

// ---------------------------------------------------------------------------
// BuildError / BuildState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    Empty,
    Parsing,
    Validating,
    Aligned,
    Done,
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid builder transition {from:?} -> {to:?}")]
    InvalidTransition { from: BuildState, to: BuildState },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("invalid sentence spans: {0}")]
    InvalidSpans(String),

    #[error("document invariant violated: {0}")]
    Invariant(String),
}

// ---------------------------------------------------------------------------
// SentenceOutput
// ---------------------------------------------------------------------------

/// Result of one finished sentence, in sentence-local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct SentenceOutput {
    pub sentence: usize,
    pub tokens: Vec<Token>,
    pub annotation: Option<SentenceAnnotation>,
}

// ---------------------------------------------------------------------------
// Internal row representation
// ---------------------------------------------------------------------------

enum Reply {
    Rows(Vec<Record>),
    Object(Map<String, Value>),
}

/// One validated row.  `head` keeps the raw 1-based value (0 = root).
#[derive(Debug, Default)]
struct Draft {
    form: String,
    lemma: Option<String>,
    upos: Option<Tag>,
    features: Option<TagSet>,
    deprel: Option<Tag>,
    head: Option<usize>,
    gloss: Option<String>,
}

// ---------------------------------------------------------------------------
// SentenceBuilder
// ---------------------------------------------------------------------------

pub struct SentenceBuilder<'a> {
    process: Process,
    sentence: usize,
    span: Span,
    text: &'a str,
    registry: &'a TagRegistry,
    existing: Vec<Token>,
    state: BuildState,
    reply: Option<Reply>,
    drafts: Vec<Draft>,
    annotation: Option<SentenceAnnotation>,
    tokens: Vec<Token>,
    populated: Vec<BTreeSet<AnnotationField>>,
}

impl<'a> SentenceBuilder<'a> {
    /// `text` is the sentence text and `span` its position in the document.
    /// `existing` are the tokens already attached to the sentence, with
    /// document-global indices; they are converted to local ones here.
    pub fn new(
        process: Process,
        sentence: usize,
        span: Span,
        text: &'a str,
        existing: Vec<Token>,
        registry: &'a TagRegistry,
    ) -> Self {
        Self {
            process,
            sentence,
            span,
            text,
            registry,
            existing: localize(existing),
            state: BuildState::Empty,
            reply: None,
            drafts: Vec::new(),
            annotation: None,
            tokens: Vec::new(),
            populated: Vec::new(),
        }
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    /// Run every stage on `block` and stamp with `record_id`.
    pub fn run(mut self, block: &str, record_id: &str) -> Result<SentenceOutput, BuildError> {
        self.parse(block)?;
        self.validate()?;
        self.align()?;
        self.finish(record_id)
    }

    fn expect(&self, from: BuildState, to: BuildState) -> Result<(), BuildError> {
        if self.state == from {
            Ok(())
        } else {
            Err(BuildError::InvalidTransition {
                from: self.state,
                to,
            })
        }
    }

    // -----------------------------------------------------------------------
    // Empty → Parsing
    // -----------------------------------------------------------------------

    pub fn parse(&mut self, block: &str) -> Result<(), BuildError> {
        self.expect(BuildState::Empty, BuildState::Parsing)?;
        let reply = match self.process.layout() {
            Some(layout) => {
                let rows = layout.parse(block);
                if rows.is_empty() {
                    log::warn!("builder: sentence {} {} reply has no rows", self.sentence, self.process);
                }
                Reply::Rows(rows)
            }
            None => Reply::Object(parse_json_object(block, ENRICHMENT_KEYS)?),
        };
        self.reply = Some(reply);
        self.state = BuildState::Parsing;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Parsing → Validating
    // -----------------------------------------------------------------------

    pub fn validate(&mut self) -> Result<(), BuildError> {
        self.expect(BuildState::Parsing, BuildState::Validating)?;
        match self.reply.take() {
            Some(Reply::Rows(rows)) => {
                self.drafts = rows.iter().map(|row| self.validate_row(row)).collect();
            }
            Some(Reply::Object(object)) => {
                let (drafts, annotation) = self.validate_enrichment(object);
                self.drafts = drafts;
                self.annotation = Some(annotation);
            }
            None => {}
        }
        self.state = BuildState::Validating;
        Ok(())
    }

    fn validate_row(&self, row: &Record) -> Draft {
        let cell = |key: &str| {
            row.get(key)
                .map(String::as_str)
                .filter(|v| !v.is_empty() && *v != "_")
        };

        let mut draft = Draft {
            form: row.get("form").cloned().unwrap_or_default(),
            ..Draft::default()
        };

        match self.process {
            Process::Morphosyntax => {
                draft.lemma = cell("lemma").map(str::to_string);
                draft.upos = cell("upos").and_then(|code| {
                    self.registry
                        .validate_upos(code)
                        .map_err(|e| log::warn!("builder: {e} for {:?}, dropped", draft.form))
                        .ok()
                });
                draft.features = Some(self.registry.parse_features(cell("feats").unwrap_or("_")));
            }
            Process::Dependency => {
                draft.deprel = cell("deprel").and_then(|code| {
                    self.registry
                        .validate_deprel(code)
                        .map_err(|e| log::warn!("builder: {e} for {:?}, dropped", draft.form))
                        .ok()
                });
                draft.head = cell("head").and_then(|h| match h.parse::<usize>() {
                    Ok(n) => Some(n),
                    Err(_) => {
                        log::warn!("builder: HEAD {h:?} for {:?} is not a number", draft.form);
                        None
                    }
                });
            }
            Process::Enrichment => {}
        }
        draft
    }

    fn validate_enrichment(&self, mut object: Map<String, Value>) -> (Vec<Draft>, SentenceAnnotation) {
        let mut annotation = SentenceAnnotation::default();

        annotation.translation = object
            .remove("translation")
            .and_then(|v| v.as_str().map(str::trim).map(str::to_string))
            .filter(|t| !t.is_empty());

        annotation.confidence = object.remove("confidence").and_then(|v| v.as_f64()).map(|c| {
            if !(0.0..=1.0).contains(&c) {
                log::warn!("builder: confidence {c} outside [0, 1], clamped");
            }
            c.clamp(0.0, 1.0)
        });

        annotation.notes = match object.remove("notes") {
            Some(Value::String(note)) => vec![note],
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        };

        annotation.idioms = match object.remove("idioms") {
            Some(Value::Array(items)) => items.into_iter().filter_map(idiom_from_value).collect(),
            _ => Vec::new(),
        };

        let drafts = match object.remove("tokens") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| {
                    let form = item.get("form")?.as_str()?.to_string();
                    let gloss = item
                        .get("gloss")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .filter(|g| !g.is_empty());
                    Some(Draft {
                        form,
                        gloss,
                        ..Draft::default()
                    })
                })
                .collect(),
            _ => Vec::new(),
        };

        (drafts, annotation)
    }

    // -----------------------------------------------------------------------
    // Validating → Aligned
    // -----------------------------------------------------------------------

    pub fn align(&mut self) -> Result<(), BuildError> {
        self.expect(BuildState::Validating, BuildState::Aligned)?;

        let drafts = std::mem::take(&mut self.drafts);
        let mapping = if self.existing.is_empty() {
            self.tokens_from_drafts(&drafts)
        } else {
            self.match_existing(&drafts)
        };
        self.populated = vec![BTreeSet::new(); self.tokens.len()];

        for (draft, target) in drafts.iter().zip(&mapping) {
            if let Some(j) = *target {
                self.apply(j, draft);
            }
        }
        self.resolve_heads(&drafts, &mapping);

        self.state = BuildState::Aligned;
        Ok(())
    }

    /// New tokens, one per row, with offsets searched in the sentence text.
    fn tokens_from_drafts(&mut self, drafts: &[Draft]) -> Vec<Option<usize>> {
        let forms: Vec<&str> = drafts.iter().map(|d| d.form.as_str()).collect();
        let offsets = align_tokens(self.text, &forms, self.span.start);

        self.tokens = drafts
            .iter()
            .zip(offsets)
            .enumerate()
            .map(|(j, (draft, offset))| Token {
                index_token: j,
                index_sentence: self.sentence,
                string: draft.form.clone(),
                index_char_start: offset.map(|(start, _)| start),
                index_char_stop: offset.map(|(_, stop)| stop),
                ..Token::default()
            })
            .collect();
        (0..drafts.len()).map(Some).collect()
    }

    /// Match rows onto existing tokens by surface form with a forward cursor.
    fn match_existing(&mut self, drafts: &[Draft]) -> Vec<Option<usize>> {
        self.tokens = std::mem::take(&mut self.existing);
        let mut cursor = 0;
        drafts
            .iter()
            .map(|draft| {
                let found = self.tokens[cursor..]
                    .iter()
                    .position(|t| t.string == draft.form)
                    .map(|rel| cursor + rel);
                match found {
                    Some(j) => {
                        cursor = j + 1;
                        Some(j)
                    }
                    None => {
                        log::info!(
                            "builder: sentence {} row {:?} matches no remaining token, dropped",
                            self.sentence,
                            draft.form
                        );
                        None
                    }
                }
            })
            .collect()
    }

    fn apply(&mut self, j: usize, draft: &Draft) {
        let token = &mut self.tokens[j];
        let populated = &mut self.populated[j];
        match self.process {
            Process::Morphosyntax => {
                token.lemma = draft.lemma.clone();
                token.upos = draft.upos.clone();
                token.features = draft.features.clone();
                populated.extend([
                    AnnotationField::Lemma,
                    AnnotationField::Upos,
                    AnnotationField::Features,
                ]);
            }
            Process::Dependency => {
                token.dependency_relation = draft.deprel.clone();
                token.governor = None;
                populated.extend([AnnotationField::DependencyRelation, AnnotationField::Governor]);
            }
            Process::Enrichment => {
                token.gloss = draft.gloss.clone();
                populated.insert(AnnotationField::Gloss);
            }
        }
    }

    /// Translate 1-based HEAD values through the row → token mapping.
    fn resolve_heads(&mut self, drafts: &[Draft], mapping: &[Option<usize>]) {
        for (draft, target) in drafts.iter().zip(mapping) {
            let (Some(j), Some(head)) = (*target, draft.head) else {
                continue;
            };
            if head == 0 {
                continue;
            }
            match mapping.get(head - 1).copied().flatten() {
                Some(governor) if governor != j => self.tokens[j].governor = Some(governor),
                Some(_) => log::warn!("builder: {:?} governs itself, left unresolved", draft.form),
                None => log::warn!(
                    "builder: HEAD {head} of {:?} does not resolve in sentence {}",
                    draft.form,
                    self.sentence
                ),
            }
        }
    }

    // -----------------------------------------------------------------------
    // Aligned → Done
    // -----------------------------------------------------------------------

    /// Stamp populated fields with `record_id` and hand out the result.
    pub fn finish(&mut self, record_id: &str) -> Result<SentenceOutput, BuildError> {
        self.expect(BuildState::Aligned, BuildState::Done)?;

        let mut tokens = std::mem::take(&mut self.tokens);
        for (token, fields) in tokens.iter_mut().zip(&self.populated) {
            for &field in fields {
                if token.has_field(field) {
                    token.annotation_sources.insert(field, record_id.to_string());
                } else {
                    token.annotation_sources.remove(&field);
                }
            }
        }

        let annotation = self.annotation.take().map(|mut a| {
            a.source = Some(record_id.to_string());
            a
        });

        self.state = BuildState::Done;
        Ok(SentenceOutput {
            sentence: self.sentence,
            tokens,
            annotation,
        })
    }
}

fn idiom_from_value(value: Value) -> Option<Idiom> {
    match value {
        Value::String(phrase) => Some(Idiom {
            phrase,
            meaning: String::new(),
        }),
        Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    }
}

/// Renumber `tokens` to 0..n and map governors into the same range.
fn localize(mut tokens: Vec<Token>) -> Vec<Token> {
    let positions: HashMap<usize, usize> = tokens
        .iter()
        .enumerate()
        .map(|(local, t)| (t.index_token, local))
        .collect();

    for (local, token) in tokens.iter_mut().enumerate() {
        token.index_token = local;
        if let Some(global) = token.governor {
            match positions.get(&global) {
                Some(&g) => token.governor = Some(g),
                None => {
                    log::warn!("builder: governor {global} of {:?} is outside its sentence", token.string);
                    token.clear_field(AnnotationField::Governor);
                }
            }
        }
    }
    tokens
}
