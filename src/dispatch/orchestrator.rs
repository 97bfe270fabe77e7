//! Concurrent per-sentence dispatch.
//!
//! ```text
//! Annotator::annotate(document, process)
//!   ├─ refuse sentences the process already annotated
//!   ├─ spawn one task per sentence, at most `concurrency_limit` in flight
//!   │     render prompt → Backend::generate (retries) → SentenceBuilder
//!   │     → (SentenceOutput, ProvenanceRecord, usage)
//!   └─ after every task returned, in sentence order:
//!         append records, splice tokens, renumber, sum usage
//! ```
//!
//! Sentence tasks never touch the document.  All mutation happens in the
//! coordinator once the tasks are done, so completion order cannot leak into
//! the result.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::error::{AnnotateError, SentenceError};
use crate::annotate::{Document, Process, SentenceBuilder, SentenceFailure, SentenceOutput, Span, Token};
use crate::backend::{Backend, Connection, UsageCounters};
use crate::config::{AppConfig, FailurePolicy};
use crate::prompts::{PromptRegistry, PromptTemplate};
use crate::provenance::{ConfigSnapshot, ProvenanceRecord};
use crate::tags::TagRegistry;

// ---------------------------------------------------------------------------
// RunReport
// ---------------------------------------------------------------------------

/// Summary of one successful `annotate` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub process: Option<Process>,
    /// Sentences that received annotations.
    pub annotated: Vec<usize>,
    /// Sentences isolated after a failure.
    pub failed: Vec<usize>,
    /// Usage of this run only, failed attempts included.
    pub usage: UsageCounters,
}

// ---------------------------------------------------------------------------
// Per-sentence task
// ---------------------------------------------------------------------------

/// Everything a sentence task needs, owned.
struct SentenceJob {
    index: usize,
    span: Span,
    text: String,
    existing: Vec<Token>,
}

/// Shared, read-only inputs of one run.
struct RunContext {
    process: Process,
    backend: Arc<dyn Backend>,
    template: Arc<PromptTemplate>,
    snapshot: ConfigSnapshot,
    language: String,
    translation_language: String,
    max_retries: u32,
}

struct SentenceResult {
    index: usize,
    usage: UsageCounters,
    outcome: Result<(SentenceOutput, ProvenanceRecord), SentenceError>,
}

impl RunContext {
    async fn run(&self, job: SentenceJob) -> SentenceResult {
        let index = job.index;
        let mut usage = UsageCounters::default();
        let outcome = self.annotate_sentence(job, &mut usage).await;
        SentenceResult {
            index,
            usage,
            outcome,
        }
    }

    /// Render, call, build.  `usage` receives whatever the backend reported,
    /// including for calls whose reply is later rejected.
    async fn annotate_sentence(
        &self,
        job: SentenceJob,
        usage: &mut UsageCounters,
    ) -> Result<(SentenceOutput, ProvenanceRecord), SentenceError> {
        let registry = TagRegistry::global();
        let token_list = job
            .existing
            .iter()
            .map(|t| t.string.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let upos = registry.upos_codes().join(", ");
        let deprels = registry.deprel_codes().join(", ");

        let variant = self.template.has_variants().then(|| {
            if job.existing.is_empty() {
                "raw_text"
            } else {
                "tokens"
            }
        });
        let prompt = self.template.render(
            variant,
            &[
                ("language", self.language.as_str()),
                ("sentence", job.text.as_str()),
                ("tokens", token_list.as_str()),
                ("upos_tags", upos.as_str()),
                ("deprels", deprels.as_str()),
                ("translation_language", self.translation_language.as_str()),
            ],
        )?;

        let generation = match self.backend.generate(&prompt.text, self.max_retries).await {
            Ok(generation) => generation,
            Err(e) => {
                *usage += e.usage();
                return Err(e.into());
            }
        };
        *usage += generation.usage;
        log::debug!(
            "dispatch: sentence {} {} answered after {} attempt(s)",
            job.index,
            self.process,
            generation.attempts
        );

        let record = ProvenanceRecord::new(
            &self.backend.provider().to_string(),
            self.backend.model(),
            &prompt,
            &self.snapshot,
        );
        let output = SentenceBuilder::new(
            self.process,
            job.index,
            job.span,
            &job.text,
            job.existing,
            registry,
        )
        .run(&generation.block, &record.id)?;

        Ok((output, record))
    }
}

// ---------------------------------------------------------------------------
// Annotator
// ---------------------------------------------------------------------------

/// Annotates documents with one backend and one prompt registry snapshot.
///
/// ```rust,no_run
/// use glossator::annotate::{Document, Process, PunctuationSplitter};
/// use glossator::config::AppConfig;
/// use glossator::dispatch::Annotator;
///
/// # fn main() -> anyhow::Result<()> {
/// let annotator = Annotator::from_config(AppConfig::load()?);
/// let mut doc = Document::new("Gallia est omnis divisa in partes tres.")
///     .split_with(&PunctuationSplitter::default())?;
///
/// annotator.annotate_blocking(&mut doc, Process::Morphosyntax)?;
/// annotator.annotate_blocking(&mut doc, Process::Dependency)?;
/// println!("{}", serde_json::to_string_pretty(&doc)?);
/// # Ok(())
/// # }
/// ```
pub struct Annotator {
    backend: Arc<dyn Backend>,
    prompts: Arc<PromptRegistry>,
    config: AppConfig,
}

impl Annotator {
    /// Use `backend` with a snapshot of the global prompt registry.
    pub fn new(backend: Arc<dyn Backend>, config: AppConfig) -> Self {
        let prompts = PromptRegistry::global()
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        Self {
            backend,
            prompts: Arc::new(prompts),
            config,
        }
    }

    /// Backend chosen by `config.backend.provider`.
    pub fn from_config(config: AppConfig) -> Self {
        let backend = Arc::new(Connection::from_config(&config.backend));
        Self::new(backend, config)
    }

    /// Replace the prompt registry snapshot.
    pub fn with_prompts(mut self, prompts: PromptRegistry) -> Self {
        self.prompts = Arc::new(prompts);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run `process` over every sentence of `document`.
    ///
    /// On error the document is left exactly as it was.
    pub async fn annotate(&self, document: &mut Document, process: Process) -> Result<RunReport, AnnotateError> {
        let all: Vec<usize> = (0..document.sentences().len()).collect();
        self.annotate_sentences(document, process, &all).await
    }

    /// Run `process` over the given sentences only, e.g. to retry isolated
    /// failures.
    pub async fn annotate_sentences(
        &self,
        document: &mut Document,
        process: Process,
        sentences: &[usize],
    ) -> Result<RunReport, AnnotateError> {
        let mut selected = sentences.to_vec();
        selected.sort_unstable();
        selected.dedup();

        for &index in &selected {
            if index >= document.sentences().len() {
                return Err(AnnotateError::NoSuchSentence { index });
            }
            if document.is_annotated(process, index) {
                return Err(AnnotateError::AlreadyAnnotated {
                    process,
                    sentence: index,
                });
            }
        }

        let prompts = &self.config.prompts;
        let context = Arc::new(RunContext {
            process,
            backend: Arc::clone(&self.backend),
            template: self
                .prompts
                .get(&prompts.profile, process.id(), prompts.version.as_deref())?,
            snapshot: ConfigSnapshot::capture(&self.config)?,
            language: prompts.language.clone(),
            translation_language: prompts.translation_language.clone(),
            max_retries: self.config.dispatch.max_retries,
        });

        let limit = self.config.dispatch.concurrency_limit.max(1);
        log::info!(
            "dispatch: {process} over {} sentence(s), {limit} in flight, {} via {}",
            selected.len(),
            self.backend.model(),
            self.backend.provider()
        );

        let results = spawn_all(document, &selected, &context, limit).await?;
        self.apply(document, process, results)
    }

    /// Blocking form of [`annotate`](Self::annotate), usable from inside or
    /// outside a tokio runtime.
    pub fn annotate_blocking(&self, document: &mut Document, process: Process) -> Result<RunReport, AnnotateError> {
        crate::runtime::run_blocking(self.annotate(document, process))?
    }

    // -----------------------------------------------------------------------
    // Coordinator
    // -----------------------------------------------------------------------

    fn apply(
        &self,
        document: &mut Document,
        process: Process,
        mut results: BTreeMap<usize, SentenceResult>,
    ) -> Result<RunReport, AnnotateError> {
        let policy = self.config.dispatch.failure_policy;
        let usage: UsageCounters = results.values().map(|r| r.usage).sum();

        if policy == FailurePolicy::FailDocument {
            let first_failure = results
                .iter()
                .find(|(_, r)| r.outcome.is_err())
                .map(|(&index, _)| index);
            if let Some(index) = first_failure {
                if let Some(SentenceResult {
                    outcome: Err(source),
                    ..
                }) = results.remove(&index)
                {
                    log::warn!(
                        "dispatch: sentence {index} failed, document left unchanged ({} tokens billed)",
                        usage.total
                    );
                    return Err(AnnotateError::Sentence {
                        index,
                        source,
                        usage,
                    });
                }
            }
        }

        let mut report = RunReport {
            process: Some(process),
            usage,
            ..RunReport::default()
        };
        let mut outputs = BTreeMap::new();
        let mut first_record = None;
        let mut failures = Vec::new();

        for (index, result) in results {
            match result.outcome {
                Ok((output, record)) => {
                    let id = document.append_provenance(record)?;
                    first_record.get_or_insert(id);
                    outputs.insert(index, output);
                    report.annotated.push(index);
                }
                Err(e) => {
                    log::warn!("dispatch: sentence {index} isolated: {e}");
                    failures.push(SentenceFailure {
                        sentence: index,
                        process,
                        message: e.to_string(),
                    });
                    report.failed.push(index);
                }
            }
        }

        document.merge(outputs);
        document
            .failures
            .retain(|f| f.process != process || !report.annotated.contains(&f.sentence));
        document.failures.extend(failures);
        document.backend = Some(self.backend.provider().to_string());
        document.model = Some(self.backend.model().to_string());
        if first_record.is_some() {
            document.default_provenance_id = first_record;
        }
        document.usage += usage;

        log::info!(
            "dispatch: {process} done, {} annotated, {} failed, {} tokens used",
            report.annotated.len(),
            report.failed.len(),
            usage.total
        );
        Ok(report)
    }
}

/// Spawn one task per selected sentence under a semaphore and collect the
/// results keyed by sentence index.
async fn spawn_all(
    document: &Document,
    selected: &[usize],
    context: &Arc<RunContext>,
    limit: usize,
) -> Result<BTreeMap<usize, SentenceResult>, AnnotateError> {
    let semaphore = Arc::new(Semaphore::new(limit));
    let mut join_set = JoinSet::new();

    for &index in selected {
        let span = document.sentences()[index];
        let job = SentenceJob {
            index,
            span,
            text: document.sentence_text(index).unwrap_or_default().to_string(),
            existing: document.sentence_tokens(index).cloned().collect(),
        };
        let context = Arc::clone(context);
        let semaphore = Arc::clone(&semaphore);
        join_set.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            context.run(job).await
        });
    }

    let mut results = BTreeMap::new();
    while let Some(joined) = join_set.join_next().await {
        let result = joined.map_err(|e| AnnotateError::Task(e.to_string()))?;
        results.insert(result.index, result);
    }
    Ok(results)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::annotate::{AnnotationField, PunctuationSplitter};
    use crate::backend::{BackendError, Completion};
    use crate::config::Provider;
    use crate::prompts::TemplateBody;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Answers from the prompt alone: the first line names the process, the
    /// rest are the words to annotate.
    ///
    /// * a word `FAIL` makes every reply lack a fenced block;
    /// * a word `FLAKY` makes the first reply for that prompt lack one;
    /// * each reply sleeps 10 ms per word, so longer sentences finish later.
    #[derive(Default)]
    struct Philologist {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        calls: AtomicUsize,
        billed: Mutex<UsageCounters>,
        seen: Mutex<HashMap<String, u32>>,
    }

    impl Philologist {
        fn reply(&self, prompt: &str) -> String {
            let mut lines = prompt.lines();
            let kind = lines.next().unwrap_or_default();
            let words: Vec<&str> = lines.flat_map(str::split_whitespace).collect();

            let attempt = {
                let mut seen = self.seen.lock().unwrap();
                let n = seen.entry(prompt.to_string()).or_insert(0);
                *n += 1;
                *n
            };
            if words.contains(&"FAIL") || (words.contains(&"FLAKY") && attempt == 1) {
                return "I cannot help with that.".into();
            }

            let body = match kind {
                "morph" => {
                    let mut rows = vec!["FORM\tLEMMA\tUPOS\tFEATS".to_string()];
                    rows.extend(words.iter().map(|w| format!("{w}\t{}\tNOUN\tCase=Nom", w.to_lowercase())));
                    rows.join("\n")
                }
                "dep" => {
                    let mut rows = vec!["FORM\tHEAD\tDEPREL".to_string()];
                    rows.extend(words.iter().enumerate().map(|(i, w)| match i {
                        0 => format!("{w}\t0\troot"),
                        _ => format!("{w}\t1\tdep"),
                    }));
                    rows.join("\n")
                }
                _ => {
                    let tokens: Vec<_> = words
                        .iter()
                        .map(|w| serde_json::json!({ "form": w, "gloss": w.to_uppercase() }))
                        .collect();
                    serde_json::json!({
                        "tokens": tokens,
                        "translation": words.join(" ").to_uppercase(),
                        "confidence": 0.9
                    })
                    .to_string()
                }
            };
            format!("Here it is:\n```\n{body}\n```")
        }
    }

    #[async_trait]
    impl Backend for Philologist {
        fn provider(&self) -> Provider {
            Provider::Ollama
        }

        fn model(&self) -> &str {
            "philologist-1"
        }

        async fn complete(&self, prompt: &str) -> Result<Completion, BackendError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            self.calls.fetch_add(1, Ordering::SeqCst);

            let words = prompt.split_whitespace().count() as u64;
            tokio::time::sleep(Duration::from_millis(10 * words)).await;

            let usage = UsageCounters::from_parts(words, 1);
            *self.billed.lock().unwrap() += usage;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(Completion {
                text: self.reply(prompt),
                usage,
            })
        }
    }

    fn prompts() -> PromptRegistry {
        let mut registry = PromptRegistry::new();
        registry.register(
            "test",
            "1",
            [
                (
                    "morphosyntax",
                    TemplateBody::from([("raw_text", "morph\n{sentence}"), ("tokens", "morph\n{tokens}")]),
                ),
                (
                    "dependency",
                    TemplateBody::from([("raw_text", "dep\n{sentence}"), ("tokens", "dep\n{tokens}")]),
                ),
                ("enrichment", TemplateBody::from("enrich\n{sentence}")),
            ],
        );
        registry
    }

    fn annotator(backend: Arc<Philologist>, limit: usize, policy: FailurePolicy) -> Annotator {
        let mut config = AppConfig::default();
        config.prompts.profile = "test".into();
        config.dispatch.concurrency_limit = limit;
        config.dispatch.max_retries = 2;
        config.dispatch.failure_policy = policy;
        Annotator::new(backend, config).with_prompts(prompts())
    }

    fn document(text: &str) -> Document {
        Document::new(text)
            .split_with(&PunctuationSplitter::default())
            .unwrap()
    }

    const TEXT: &str = "a b c d e f. g h i j. k l m. n o. p.";

    fn shape(doc: &Document) -> Vec<(usize, usize, String, Option<usize>)> {
        doc.tokens()
            .iter()
            .map(|t| (t.index_token, t.index_sentence, t.string.clone(), t.governor))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Ordering and concurrency
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn concurrent_result_equals_sequential_result() {
        let mut concurrent = document(TEXT);
        let mut sequential = document(TEXT);

        let fast = annotator(Arc::new(Philologist::default()), 8, FailurePolicy::FailDocument);
        let slow = annotator(Arc::new(Philologist::default()), 1, FailurePolicy::FailDocument);

        for process in [Process::Morphosyntax, Process::Dependency] {
            fast.annotate(&mut concurrent, process).await.unwrap();
            slow.annotate(&mut sequential, process).await.unwrap();
        }

        assert_eq!(shape(&concurrent), shape(&sequential));
        assert_eq!(concurrent.tokens().len(), 16);
        assert!(concurrent.check_invariants().is_ok());
        // First token of the second sentence governs the rest of it.
        assert_eq!(concurrent.tokens()[7].governor, Some(6));
    }

    #[tokio::test]
    async fn in_flight_calls_never_exceed_the_limit() {
        let backend = Arc::new(Philologist::default());
        let mut doc = document(TEXT);
        annotator(Arc::clone(&backend), 2, FailurePolicy::FailDocument)
            .annotate(&mut doc, Process::Morphosyntax)
            .await
            .unwrap();

        assert_eq!(backend.calls.load(Ordering::SeqCst), 5);
        assert!(backend.max_in_flight.load(Ordering::SeqCst) <= 2);
    }

    // -----------------------------------------------------------------------
    // Usage and provenance
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn usage_matches_every_call_made_including_retries() {
        let backend = Arc::new(Philologist::default());
        let mut doc = document("rex venit. FLAKY regina manet. servi laborant.");
        let report = annotator(Arc::clone(&backend), 3, FailurePolicy::FailDocument)
            .annotate(&mut doc, Process::Morphosyntax)
            .await
            .unwrap();

        assert_eq!(backend.calls.load(Ordering::SeqCst), 4);
        let billed = *backend.billed.lock().unwrap();
        assert_eq!(report.usage, billed);
        assert_eq!(doc.usage, billed);
    }

    #[tokio::test]
    async fn every_populated_field_cites_a_ledger_record() {
        let mut doc = document("rex venit. regina manet.");
        let annotator = annotator(Arc::new(Philologist::default()), 2, FailurePolicy::FailDocument);
        annotator.annotate(&mut doc, Process::Morphosyntax).await.unwrap();

        assert_eq!(doc.provenance().len(), 2);
        let first = doc.provenance().iter().next().unwrap();
        assert_eq!(doc.default_provenance_id.as_deref(), Some(first.id.as_str()));
        assert_eq!(first.model, "philologist-1");
        assert_eq!(first.prompt_kind, "morphosyntax");
        assert_eq!(doc.backend.as_deref(), Some("Ollama"));

        let record_of = |t: &Token| t.source(AnnotationField::Lemma).map(str::to_string);
        let sentence0 = record_of(&doc.tokens()[0]);
        let sentence1 = record_of(&doc.tokens()[2]);
        assert_eq!(sentence0.as_deref(), Some(first.id.as_str()));
        assert_ne!(sentence0, sentence1);
        assert!(doc.check_invariants().is_ok());
    }

    // -----------------------------------------------------------------------
    // Re-use of earlier annotations
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn later_processes_reuse_existing_tokens() {
        let mut doc = document("Gallia est omnis divisa.");
        let annotator = annotator(Arc::new(Philologist::default()), 2, FailurePolicy::FailDocument);
        annotator.annotate(&mut doc, Process::Morphosyntax).await.unwrap();
        annotator.annotate(&mut doc, Process::Dependency).await.unwrap();
        annotator.annotate(&mut doc, Process::Enrichment).await.unwrap();

        assert_eq!(doc.tokens().len(), 4);
        let est = &doc.tokens()[1];
        assert_eq!(est.lemma.as_deref(), Some("est"));
        assert_eq!(est.governor, Some(0));
        assert_eq!(est.gloss.as_deref(), Some("EST"));
        assert_eq!((est.index_char_start, est.index_char_stop), (Some(7), Some(10)));
        assert_ne!(est.source(AnnotationField::Lemma), est.source(AnnotationField::Governor));

        let sentence = doc.sentence_annotation(0).unwrap();
        assert_eq!(sentence.translation.as_deref(), Some("GALLIA EST OMNIS DIVISA."));
        assert_eq!(doc.provenance().len(), 3);
        assert!(doc.check_invariants().is_ok());
    }

    #[tokio::test]
    async fn re_annotating_is_refused_until_cleared() {
        let mut doc = document("rex venit.");
        let annotator = annotator(Arc::new(Philologist::default()), 1, FailurePolicy::FailDocument);
        annotator.annotate(&mut doc, Process::Morphosyntax).await.unwrap();

        let err = annotator.annotate(&mut doc, Process::Morphosyntax).await.unwrap_err();
        assert!(matches!(
            err,
            AnnotateError::AlreadyAnnotated {
                process: Process::Morphosyntax,
                sentence: 0
            }
        ));

        doc.clear_process(Process::Morphosyntax);
        annotator.annotate(&mut doc, Process::Morphosyntax).await.unwrap();
        assert_eq!(doc.provenance().len(), 2);
    }

    // -----------------------------------------------------------------------
    // Failure policies
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn failing_sentence_fails_the_document_and_leaves_it_unchanged() {
        let backend = Arc::new(Philologist::default());
        let mut doc = document("rex venit. FAIL hic. regina manet.");
        let before = shape(&doc);
        let err = annotator(Arc::clone(&backend), 3, FailurePolicy::FailDocument)
            .annotate(&mut doc, Process::Morphosyntax)
            .await
            .unwrap_err();

        match err {
            AnnotateError::Sentence {
                index,
                source,
                usage,
            } => {
                assert_eq!(index, 1);
                assert_eq!(usage, *backend.billed.lock().unwrap());
                if let SentenceError::Backend(e) = &source {
                    assert!(usage.input > e.usage().input);
                }
                assert!(matches!(
                    source,
                    SentenceError::Backend(BackendError::NoStructuredBlock { attempts: 2, .. })
                ));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(shape(&doc), before);
        assert!(doc.provenance().is_empty());
        assert!(doc.usage.is_zero());
    }

    #[tokio::test]
    async fn isolate_policy_reports_and_keeps_the_rest() {
        let backend = Arc::new(Philologist::default());
        let mut doc = document("rex venit. FAIL hic. regina manet.");
        let report = annotator(Arc::clone(&backend), 3, FailurePolicy::Isolate)
            .annotate(&mut doc, Process::Morphosyntax)
            .await
            .unwrap();

        assert_eq!(report.annotated, vec![0, 2]);
        assert_eq!(report.failed, vec![1]);
        assert_eq!(doc.failures.len(), 1);
        assert_eq!(doc.failures[0].sentence, 1);
        assert_eq!(doc.sentence_tokens(1).count(), 0);
        assert_eq!(doc.tokens().len(), 4);
        assert_eq!(doc.usage, *backend.billed.lock().unwrap());
        assert!(doc.check_invariants().is_ok());
    }

    #[tokio::test]
    async fn unknown_profile_is_reported_before_any_call() {
        let backend = Arc::new(Philologist::default());
        let mut config = AppConfig::default();
        config.prompts.profile = "nowhere".into();
        let annotator = Annotator::new(backend.clone(), config).with_prompts(prompts());

        let err = annotator
            .annotate(&mut document("rex venit."), Process::Morphosyntax)
            .await
            .unwrap_err();
        assert!(matches!(err, AnnotateError::Prompt(_)));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    // -----------------------------------------------------------------------
    // Blocking entry point
    // -----------------------------------------------------------------------

    #[test]
    fn blocking_annotate_outside_a_runtime() {
        let mut doc = document("rex venit. regina manet.");
        annotator(Arc::new(Philologist::default()), 2, FailurePolicy::FailDocument)
            .annotate_blocking(&mut doc, Process::Morphosyntax)
            .unwrap();
        assert_eq!(doc.tokens().len(), 4);
    }

    #[tokio::test]
    async fn blocking_annotate_inside_a_runtime() {
        let mut doc = document("rex venit.");
        annotator(Arc::new(Philologist::default()), 2, FailurePolicy::FailDocument)
            .annotate_blocking(&mut doc, Process::Enrichment)
            .unwrap();
        assert_eq!(doc.tokens()[0].gloss.as_deref(), Some("REX"));
    }
}
