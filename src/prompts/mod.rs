//! Versioned, digest-stamped prompt templates.
//!
//! * [`PromptRegistry`] — templates keyed by `(profile, version, process)`.
//! * [`PromptTemplate`] — immutable template with its SHA-256 digest.
//! * [`PromptInfo`] — a rendered prompt plus the digest it came from.
//!
//! # Quick start
//!
//! ```rust
//! use glossator::prompts::{PromptRegistry, TemplateBody};
//!
//! let mut registry = PromptRegistry::new();
//! registry.register("p", "1.0", [("greet", TemplateBody::from("Hello {name}"))]);
//!
//! let info = registry
//!     .get("p", "greet", None)
//!     .unwrap()
//!     .render(None, &[("name", "Rome")])
//!     .unwrap();
//! assert_eq!(info.text, "Hello Rome");
//! ```

pub mod builtin;
pub mod registry;
pub mod template;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use builtin::{DEFAULT_PROFILE, DEFAULT_VERSION};
pub use registry::PromptRegistry;
pub use template::{canonicalize, digest, PromptError, PromptInfo, PromptTemplate, TemplateBody};
