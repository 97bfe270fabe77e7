//! Errors surfaced by [`Annotator`](super::Annotator).

use thiserror::Error;

use crate::annotate::{BuildError, Process};
use crate::backend::{BackendError, UsageCounters};
use crate::prompts::PromptError;
use crate::provenance::LedgerError;

/// Why one sentence could not be annotated.
#[derive(Debug, Error)]
pub enum SentenceError {
    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Failure of a whole `annotate` call.  The document is left unchanged.
#[derive(Debug, Error)]
pub enum AnnotateError {
    #[error("sentence {sentence} is already annotated by {process}; clear it first")]
    AlreadyAnnotated { process: Process, sentence: usize },

    #[error("sentence {index} does not exist")]
    NoSuchSentence { index: usize },

    /// `usage` is what the whole run billed, failed sentences included.
    #[error("sentence {index} failed: {source}")]
    Sentence {
        index: usize,
        #[source]
        source: SentenceError,
        usage: UsageCounters,
    },

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error("failed to snapshot configuration: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("sentence task did not complete: {0}")]
    Task(String),

    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
}
