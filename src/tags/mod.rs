//! Closed linguistic vocabularies (Universal Dependencies).
//!
//! * [`TagRegistry`] — validation and legacy-value normalization.
//! * [`Tag`] / [`TagSet`] — validated values attached to tokens.
//! * [`TagError`] — the rejected pair when nothing matches.

pub mod registry;
mod tables;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use registry::{Tag, TagError, TagRegistry, TagSet, DEPREL_KEY, UPOS_KEY};
