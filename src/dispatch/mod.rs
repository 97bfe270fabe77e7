//! Dispatch orchestrator.
//!
//! * [`Annotator`] — fans a document's sentences out to a backend with
//!   bounded concurrency and merges the results in sentence order.
//! * [`RunReport`] — what one run annotated, isolated and spent.
//! * [`AnnotateError`] / [`SentenceError`] — whole-call and per-sentence
//!   failures.

pub mod error;
pub mod orchestrator;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use crate::annotate::Process;
pub use crate::config::FailurePolicy;
pub use crate::runtime::run_blocking;
pub use error::{AnnotateError, SentenceError};
pub use orchestrator::{Annotator, RunReport};
