//! Annotation builder and the document model.
//!
//! * [`Document`] — normalized text, sentence spans, tokens, provenance.
//! * [`SentenceBuilder`] — one backend reply to tokens for one sentence.
//! * [`align_tokens`] — left-to-right char-offset recovery.
//! * [`SentenceSplitter`] / [`PunctuationSplitter`] — sentence spans.

pub mod align;
pub mod builder;
pub mod document;
pub mod model;
pub mod splitter;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use align::align_tokens;
pub use builder::{BuildError, BuildState, SentenceBuilder, SentenceOutput};
pub use document::{normalize_text, Document, SentenceFailure};
pub use model::{AnnotationField, Idiom, Process, SentenceAnnotation, Span, Token};
pub use splitter::{PunctuationSplitter, SentenceSplitter};
