//! Provenance ledger: which backend call produced which annotation.
//!
//! One [`ProvenanceRecord`] is created per successful backend call and
//! appended to the document's [`ProvenanceLedger`].  Annotated fields store
//! the record id, never a copy of the metadata.

pub mod ledger;
pub mod record;

pub use ledger::{LedgerError, ProvenanceLedger};
pub use record::{config_digest, redact_config, ConfigSnapshot, ProvenanceRecord, REDACTED};
