//! The annotated document.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::builder::{BuildError, SentenceOutput};
use super::model::{AnnotationField, Process, SentenceAnnotation, Span, Token};
use super::splitter::SentenceSplitter;
use crate::backend::UsageCounters;
use crate::provenance::{LedgerError, ProvenanceLedger, ProvenanceRecord};

/// A sentence that could not be annotated under the isolate policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceFailure {
    pub sentence: usize,
    pub process: Process,
    pub message: String,
}

/// Raw text, its sentences and every annotation produced for it.
///
/// Tokens are kept in sentence order with `index_token` contiguous from 0.
/// Only the dispatch coordinator mutates tokens and provenance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    raw: String,
    normalized: String,
    sentences: Vec<Span>,
    tokens: Vec<Token>,
    sentence_annotations: Vec<SentenceAnnotation>,
    provenance: ProvenanceLedger,
    /// Backend of the most recent run.
    pub backend: Option<String>,
    pub model: Option<String>,
    /// First record of the most recent run, in sentence order.
    pub default_provenance_id: Option<String>,
    /// Usage summed over every run on this document.
    pub usage: UsageCounters,
    pub failures: Vec<SentenceFailure>,
}

/// CRLF and CR to LF, no-break spaces to spaces, trailing whitespace removed.
pub fn normalize_text(raw: &str) -> String {
    raw.replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\u{a0}', " ")
        .trim_end()
        .to_string()
}

/// Slice `text` by char offsets.  Out-of-range offsets are clamped.
pub(crate) fn char_slice(text: &str, start: usize, stop: usize) -> &str {
    let byte = |n: usize| text.char_indices().nth(n).map(|(b, _)| b).unwrap_or(text.len());
    let (from, to) = (byte(start), byte(stop));
    &text[from..to.max(from)]
}

impl Document {
    /// New document with the whole normalized text as one sentence (none if
    /// the text is blank).
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let normalized = normalize_text(&raw);
        let sentences = match normalized.chars().count() {
            0 => Vec::new(),
            n => vec![Span::new(0, n)],
        };
        Self {
            sentence_annotations: vec![SentenceAnnotation::default(); sentences.len()],
            raw,
            normalized,
            sentences,
            ..Self::default()
        }
    }

    /// Replace the sentence spans.  Spans must be non-empty, ordered,
    /// non-overlapping and inside the normalized text, and the document
    /// must not carry tokens yet.
    pub fn with_sentences(mut self, spans: Vec<Span>) -> Result<Self, BuildError> {
        if !self.tokens.is_empty() {
            return Err(BuildError::InvalidSpans(
                "cannot re-split a document that already has tokens".into(),
            ));
        }
        let len = self.normalized.chars().count();
        let mut previous_stop = 0;
        for (i, span) in spans.iter().enumerate() {
            if span.is_empty() || span.start < previous_stop || span.stop > len {
                return Err(BuildError::InvalidSpans(format!(
                    "span {i} [{}, {}) is empty, overlaps or exceeds {len} chars",
                    span.start, span.stop
                )));
            }
            previous_stop = span.stop;
        }
        self.sentence_annotations = vec![SentenceAnnotation::default(); spans.len()];
        self.sentences = spans;
        Ok(self)
    }

    /// Split with `splitter` over the normalized text.
    pub fn split_with<S: SentenceSplitter + ?Sized>(self, splitter: &S) -> Result<Self, BuildError> {
        let spans = splitter.split(&self.normalized);
        self.with_sentences(spans)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn sentences(&self) -> &[Span] {
        &self.sentences
    }

    pub fn sentence_text(&self, sentence: usize) -> Option<&str> {
        let span = self.sentences.get(sentence)?;
        Some(char_slice(&self.normalized, span.start, span.stop))
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn sentence_tokens(&self, sentence: usize) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(move |t| t.index_sentence == sentence)
    }

    pub fn sentence_annotation(&self, sentence: usize) -> Option<&SentenceAnnotation> {
        self.sentence_annotations.get(sentence)
    }

    pub fn provenance(&self) -> &ProvenanceLedger {
        &self.provenance
    }

    // -----------------------------------------------------------------------
    // Annotation state
    // -----------------------------------------------------------------------

    /// Whether `process` already populated anything in `sentence`.
    pub fn is_annotated(&self, process: Process, sentence: usize) -> bool {
        let fields = process.fields();
        let token_hit = self
            .sentence_tokens(sentence)
            .any(|t| fields.iter().any(|&f| t.has_field(f)));
        let sentence_hit = process == Process::Enrichment
            && self
                .sentence_annotation(sentence)
                .map(|a| !a.is_empty())
                .unwrap_or(false);
        token_hit || sentence_hit
    }

    /// Sentences already annotated by `process`.
    pub fn annotated_sentences(&self, process: Process) -> Vec<usize> {
        (0..self.sentences.len())
            .filter(|&s| self.is_annotated(process, s))
            .collect()
    }

    /// Remove everything `process` populated so it can be run again.
    ///
    /// Tokens themselves and the provenance ledger are kept.
    pub fn clear_process(&mut self, process: Process) {
        for token in &mut self.tokens {
            for &field in process.fields() {
                token.clear_field(field);
            }
        }
        if process == Process::Enrichment {
            for annotation in &mut self.sentence_annotations {
                *annotation = SentenceAnnotation::default();
            }
        }
        self.failures.retain(|f| f.process != process);
    }

    // -----------------------------------------------------------------------
    // Coordinator-only mutation
    // -----------------------------------------------------------------------

    pub(crate) fn append_provenance(&mut self, record: ProvenanceRecord) -> Result<String, LedgerError> {
        self.provenance.append(record)
    }

    /// Splice sentence outputs (sentence-local indices) into the token
    /// stream in sentence order and renumber everything from 0.
    pub(crate) fn merge(&mut self, mut outputs: BTreeMap<usize, SentenceOutput>) {
        let sentence_count = self.sentences.len();
        let mut kept: Vec<Vec<Token>> = vec![Vec::new(); sentence_count];
        for token in std::mem::take(&mut self.tokens) {
            match kept.get_mut(token.index_sentence) {
                Some(bucket) => bucket.push(token),
                None => log::warn!(
                    "document: token {} has sentence {} of {sentence_count}, dropped",
                    token.index_token,
                    token.index_sentence
                ),
            }
        }

        let mut merged: Vec<Token> = Vec::new();
        let mut remap: HashMap<usize, usize> = HashMap::new();
        let mut carried: Vec<bool> = Vec::new();

        for (sentence, bucket) in kept.into_iter().enumerate() {
            let base = merged.len();
            match outputs.remove(&sentence) {
                Some(output) => {
                    for mut token in output.tokens {
                        token.index_token += base;
                        token.index_sentence = sentence;
                        token.governor = token.governor.map(|g| g + base);
                        merged.push(token);
                        carried.push(false);
                    }
                    if let Some(annotation) = output.annotation {
                        self.sentence_annotations[sentence] = annotation;
                    }
                }
                None => {
                    for mut token in bucket {
                        remap.insert(token.index_token, merged.len());
                        token.index_token = merged.len();
                        merged.push(token);
                        carried.push(true);
                    }
                }
            }
        }

        for (token, carried) in merged.iter_mut().zip(carried) {
            if !carried {
                continue;
            }
            if let Some(old) = token.governor {
                match remap.get(&old) {
                    Some(&new) => token.governor = Some(new),
                    None => token.clear_field(AnnotationField::Governor),
                }
            }
        }

        if !outputs.is_empty() {
            log::warn!("document: {} outputs for unknown sentences ignored", outputs.len());
        }
        self.tokens = merged;
    }

    // -----------------------------------------------------------------------
    // Invariants
    // -----------------------------------------------------------------------

    /// Check index contiguity, governor resolution, offset ordering and that
    /// every recorded source names a populated field and a known record.
    pub fn check_invariants(&self) -> Result<(), BuildError> {
        let fail = |msg: String| Err(BuildError::Invariant(msg));
        let mut previous: Option<&Token> = None;

        for (i, token) in self.tokens.iter().enumerate() {
            if token.index_token != i {
                return fail(format!("token at {i} has index_token {}", token.index_token));
            }
            if token.index_sentence >= self.sentences.len() {
                return fail(format!("token {i} names missing sentence {}", token.index_sentence));
            }
            if let Some(g) = token.governor {
                if g >= self.tokens.len() || g == i {
                    return fail(format!("token {i} has invalid governor {g}"));
                }
            }
            for (field, id) in &token.annotation_sources {
                if !token.has_field(*field) {
                    return fail(format!("token {i} has a source for unset {field}"));
                }
                if !self.provenance.contains(id) {
                    return fail(format!("token {i} {field} cites unknown record {id}"));
                }
            }
            if let (Some(start), Some(stop)) = (token.index_char_start, token.index_char_stop) {
                if start > stop {
                    return fail(format!("token {i} has inverted offsets"));
                }
            }

            if let Some(prev) = previous {
                if prev.index_sentence > token.index_sentence {
                    return fail(format!("token {i} is out of sentence order"));
                }
                if prev.index_sentence == token.index_sentence {
                    if let (Some(stop), Some(start)) = (prev.index_char_stop, token.index_char_start) {
                        if stop > start {
                            return fail(format!("token {i} overlaps the previous token"));
                        }
                    }
                }
            }
            previous = Some(token);
        }

        for (s, annotation) in self.sentence_annotations.iter().enumerate() {
            if let Some(id) = &annotation.source {
                if !self.provenance.contains(id) {
                    return fail(format!("sentence {s} cites unknown record {id}"));
                }
            }
        }
        Ok(())
    }
}
