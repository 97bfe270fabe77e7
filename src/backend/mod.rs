//! Backend connection to remote generative models.
//!
//! This module provides:
//! * [`Backend`] — async trait implemented by every provider adapter.
//! * [`generate`] / [`generate_blocking`] — retry until the reply contains a
//!   fenced block, summing usage over every attempt.
//! * [`OpenAiBackend`], [`MistralBackend`], [`OllamaBackend`] — adapters.
//! * [`Connection`] — adapter chosen from [`BackendConfig`](crate::config::BackendConfig).
//! * [`UsageCounters`] — additive token accounting.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use glossator::backend::{Backend, Connection};
//! use glossator::config::AppConfig;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let backend = Connection::from_config(&config.backend);
//!
//!     let generation = backend
//!         .generate("Reply with a fenced block containing OK.", 3)
//!         .await
//!         .unwrap();
//!     println!("{} ({} tokens)", generation.block, generation.usage.total);
//! }
//! ```

mod chat;
pub mod connection;
pub mod mistral;
pub mod ollama;
pub mod openai;
pub mod protocol;
pub mod usage;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use connection::Connection;
pub use mistral::MistralBackend;
pub use ollama::OllamaBackend;
pub use openai::OpenAiBackend;
pub use protocol::{
    extract_fenced_block, generate, generate_blocking, Backend, BackendError, Completion,
    Generation, FENCE,
};
pub use usage::UsageCounters;
