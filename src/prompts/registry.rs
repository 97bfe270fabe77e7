//! Versioned prompt registry keyed by `(profile, version, process)`.
//!
//! Each profile has a currently-marked default version used when callers do
//! not ask for one explicitly.  Registration computes digests eagerly; a
//! re-registration under the same key replaces the template and its digest
//! is recomputed from the new text.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, OnceLock, RwLock};

use serde::Deserialize;

use super::builtin::register_builtins;
use super::template::{PromptError, PromptTemplate, TemplateBody};

// ---------------------------------------------------------------------------
// Template files
// ---------------------------------------------------------------------------

/// On-disk layout of a TOML template file.
///
/// ```toml
/// profile = "latin"
/// version = "2.0"
/// default = true
///
/// [templates]
/// enrichment = "Translate {sentence} ..."
///
/// [templates.morphosyntax]
/// raw_text = "..."
/// tokens = "..."
/// ```
#[derive(Debug, Deserialize)]
struct TemplateFile {
    profile: String,
    version: String,
    #[serde(default)]
    default: bool,
    templates: BTreeMap<String, TemplateBody>,
}

// ---------------------------------------------------------------------------
// PromptRegistry
// ---------------------------------------------------------------------------

type Key = (String, String, String);

/// Registry of immutable [`PromptTemplate`]s.
///
/// Cloning is cheap (templates are shared behind `Arc`), which lets a caller
/// take a snapshot for the duration of one document.
#[derive(Debug, Clone, Default)]
pub struct PromptRegistry {
    templates: HashMap<Key, Arc<PromptTemplate>>,
    defaults: HashMap<String, String>,
}

impl PromptRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-loaded with the built-in `default` profile.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        register_builtins(&mut registry);
        registry
    }

    /// Process-wide registry, initialised with the built-ins on first use.
    pub fn global() -> &'static RwLock<PromptRegistry> {
        static REGISTRY: OnceLock<RwLock<PromptRegistry>> = OnceLock::new();
        REGISTRY.get_or_init(|| RwLock::new(PromptRegistry::with_builtins()))
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Register templates for `profile` at `version`.
    ///
    /// The first version registered for a profile becomes its default.
    pub fn register<I, P>(&mut self, profile: &str, version: &str, templates: I)
    where
        I: IntoIterator<Item = (P, TemplateBody)>,
        P: Into<String>,
    {
        for (process, body) in templates {
            let process = process.into();
            let template = PromptTemplate::new(profile, process.clone(), version, body);
            log::debug!(
                "prompts: registered {profile}/{version}/{process} digest={}",
                template.digest()
            );
            let key = (profile.to_string(), version.to_string(), process);
            if self.templates.insert(key, Arc::new(template)).is_some() {
                log::info!("prompts: replaced {profile}/{version} template");
            }
        }
        self.defaults
            .entry(profile.to_string())
            .or_insert_with(|| version.to_string());
    }

    /// Mark `version` as the default for `profile`.
    pub fn set_default(&mut self, profile: &str, version: &str) -> Result<(), PromptError> {
        let known = self
            .templates
            .keys()
            .any(|(p, v, _)| p == profile && v == version);
        if !known {
            return Err(PromptError::UnknownProfile(format!("{profile}@{version}")));
        }
        self.defaults
            .insert(profile.to_string(), version.to_string());
        Ok(())
    }

    /// Load a TOML template file and register its contents.
    pub fn load_file(&mut self, path: &Path) -> Result<(), PromptError> {
        let content = std::fs::read_to_string(path)?;
        let file: TemplateFile =
            toml::from_str(&content).map_err(|e| PromptError::Format(e.to_string()))?;

        self.register(&file.profile, &file.version, file.templates);
        if file.default {
            self.set_default(&file.profile, &file.version)?;
        }
        log::info!(
            "prompts: loaded {}@{} from {}",
            file.profile,
            file.version,
            path.display()
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    pub fn default_version(&self, profile: &str) -> Option<&str> {
        self.defaults.get(profile).map(String::as_str)
    }

    /// Fetch the template for `process`, at `version` or the profile default.
    pub fn get(
        &self,
        profile: &str,
        process: &str,
        version: Option<&str>,
    ) -> Result<Arc<PromptTemplate>, PromptError> {
        let version = match version {
            Some(v) => v,
            None => self
                .default_version(profile)
                .ok_or_else(|| PromptError::UnknownProfile(profile.to_string()))?,
        };

        let key = (profile.to_string(), version.to_string(), process.to_string());
        self.templates
            .get(&key)
            .cloned()
            .ok_or_else(|| PromptError::NotFound {
                profile: profile.to_string(),
                process: process.to_string(),
                version: version.to_string(),
            })
    }

    /// Process ids registered under `profile` at `version`, sorted.
    pub fn processes(&self, profile: &str, version: &str) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .templates
            .keys()
            .filter(|(p, v, _)| p == profile && v == version)
            .map(|(_, _, process)| process.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::template::digest;
    use tempfile::tempdir;

    #[test]
    fn greet_scenario_renders_and_digests_match() {
        let mut reg = PromptRegistry::new();
        reg.register("p", "1.0", [("greet", TemplateBody::from("Hello {name}"))]);

        let tpl = reg.get("p", "greet", None).unwrap();
        let info = tpl.render(None, &[("name", "Rome")]).unwrap();
        assert_eq!(info.text, "Hello Rome");

        let mut other = PromptRegistry::new();
        other.register("elsewhere", "7", [("hi", TemplateBody::from("Hello {name}"))]);
        let second = other.get("elsewhere", "hi", None).unwrap();
        assert_eq!(info.digest, second.digest());
    }

    #[test]
    fn repeated_registration_keeps_digest() {
        let mut reg = PromptRegistry::new();
        reg.register("p", "1.0", [("greet", TemplateBody::from("Hello {name}"))]);
        let first = reg.get("p", "greet", None).unwrap().digest().to_string();
        reg.register("p", "1.0", [("greet", TemplateBody::from("Hello {name}"))]);
        let second = reg.get("p", "greet", None).unwrap().digest().to_string();
        assert_eq!(first, second);
    }

    #[test]
    fn reregistration_replaces_text_and_recomputes_digest() {
        let mut reg = PromptRegistry::new();
        reg.register("p", "1.0", [("greet", TemplateBody::from("Hello {name}"))]);
        reg.register("p", "1.0", [("greet", TemplateBody::from("Salve {name}"))]);
        let tpl = reg.get("p", "greet", Some("1.0")).unwrap();
        assert_eq!(tpl.digest(), digest("Salve {name}"));
    }

    #[test]
    fn default_version_is_first_registered_until_marked() {
        let mut reg = PromptRegistry::new();
        reg.register("p", "1.0", [("greet", TemplateBody::from("v1"))]);
        reg.register("p", "2.0", [("greet", TemplateBody::from("v2"))]);
        assert_eq!(reg.default_version("p"), Some("1.0"));

        reg.set_default("p", "2.0").unwrap();
        let info = reg
            .get("p", "greet", None)
            .unwrap()
            .render(None, &[])
            .unwrap();
        assert_eq!(info.text, "v2");
        assert_eq!(info.version, "2.0");
    }

    #[test]
    fn set_default_rejects_unknown_version() {
        let mut reg = PromptRegistry::new();
        reg.register("p", "1.0", [("greet", TemplateBody::from("v1"))]);
        assert!(reg.set_default("p", "3.0").is_err());
    }

    #[test]
    fn missing_lookups_are_errors() {
        let reg = PromptRegistry::with_builtins();
        assert!(matches!(
            reg.get("nope", "morphosyntax", None),
            Err(PromptError::UnknownProfile(_))
        ));
        assert!(matches!(
            reg.get("default", "scansion", None),
            Err(PromptError::NotFound { .. })
        ));
    }

    #[test]
    fn builtins_cover_all_processes() {
        let reg = PromptRegistry::with_builtins();
        assert_eq!(
            reg.processes("default", "1.0"),
            vec!["dependency", "enrichment", "morphosyntax"]
        );
        let morph = reg.get("default", "morphosyntax", None).unwrap();
        assert_eq!(morph.variant_names(), vec!["raw_text", "tokens"]);
        assert!(!reg.get("default", "enrichment", None).unwrap().has_variants());
    }

    #[test]
    fn builtin_enrichment_renders_literal_json_braces() {
        let reg = PromptRegistry::with_builtins();
        let info = reg
            .get("default", "enrichment", None)
            .unwrap()
            .render(
                None,
                &[
                    ("language", "Latin"),
                    ("translation_language", "English"),
                    ("sentence", "Gallia est omnis divisa."),
                ],
            )
            .unwrap();
        assert!(info.text.contains(r#""translation": "...""#));
        assert!(info.text.contains("Gallia est omnis divisa."));
        assert!(!info.text.contains("{{"));
    }

    #[test]
    fn load_file_registers_and_marks_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("latin.toml");
        std::fs::write(
            &path,
            r#"
profile = "default"
version = "2.0"
default = true

[templates]
enrichment = "Translate: {sentence}"

[templates.morphosyntax]
raw_text = "Tag: {sentence}"
tokens = "Tag these: {tokens}"
"#,
        )
        .unwrap();

        let mut reg = PromptRegistry::with_builtins();
        reg.load_file(&path).unwrap();

        assert_eq!(reg.default_version("default"), Some("2.0"));
        let tpl = reg.get("default", "morphosyntax", None).unwrap();
        assert_eq!(tpl.variant_names(), vec!["raw_text", "tokens"]);
        let info = reg
            .get("default", "enrichment", None)
            .unwrap()
            .render(None, &[("sentence", "x")])
            .unwrap();
        assert_eq!(info.text, "Translate: x");
        // 1.0 is still reachable explicitly.
        assert!(reg.get("default", "dependency", Some("1.0")).is_ok());
    }

    #[test]
    fn load_file_reports_format_errors() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "profile = 3").unwrap();
        let mut reg = PromptRegistry::new();
        assert!(matches!(reg.load_file(&path), Err(PromptError::Format(_))));
    }

    #[test]
    fn global_registry_has_builtins() {
        let reg = PromptRegistry::global().read().unwrap();
        assert_eq!(reg.default_version("default"), Some("1.0"));
    }
}
