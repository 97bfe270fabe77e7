//! Structured parser for backend replies.
//!
//! * [`parse_table`] / [`TableLayout`] — tab-separated tables with a known
//!   header; malformed lines are dropped, never fatal.
//! * [`parse_json_object`] — a JSON object with named top-level keys.

pub mod json;
pub mod table;

use thiserror::Error;

pub use json::{parse_json_object, ENRICHMENT_KEYS};
pub use table::{parse_table, Record, TableLayout};

/// Errors from [`parse_json_object`].  Table parsing cannot fail.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("reply contains no JSON object")]
    NoJsonObject,

    #[error("invalid JSON in reply: {0}")]
    Json(#[from] serde_json::Error),
}
