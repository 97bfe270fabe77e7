//! LLM-backed linguistic annotation.
//!
//! A [`Document`](annotate::Document) is split into sentences, each sentence
//! is sent to a generative model through a versioned prompt, and the model's
//! fenced reply is parsed, validated against Universal Dependencies
//! vocabularies and merged back into document-global tokens.  Every
//! annotated field points at the [`ProvenanceRecord`](provenance::ProvenanceRecord)
//! of the call that produced it.

pub mod annotate;
pub mod backend;
pub mod config;
pub mod dispatch;
pub mod parse;
pub mod prompts;
pub mod provenance;
pub mod runtime;
pub mod tags;
