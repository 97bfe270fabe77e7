//! Command-line entry point.
//!
//! ```text
//! glossator <text-file> [process ...]
//! ```
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Load the extra prompt template file, if configured.
//! 4. Read and split the text file.
//! 5. Run each requested process (default: morphosyntax, dependency).
//! 6. Print the annotated document as JSON on stdout.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use glossator::{
    annotate::{Document, Process, PunctuationSplitter},
    config::{AppConfig, AppPaths},
    dispatch::Annotator,
    prompts::PromptRegistry,
};

fn parse_args() -> Result<(PathBuf, Vec<Process>)> {
    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        bail!("usage: glossator <text-file> [morphosyntax|dependency|enrichment ...]");
    };

    let processes = args
        .map(|a| a.parse::<Process>().map_err(anyhow::Error::msg))
        .collect::<Result<Vec<_>>>()?;
    let processes = if processes.is_empty() {
        vec![Process::Morphosyntax, Process::Dependency]
    } else {
        processes
    };
    Ok((PathBuf::from(path), processes))
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (path, processes) = parse_args()?;

    // 2. Config
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Prompt templates: the configured file, else `prompts.toml` beside
    //    the settings when present.
    let template_file = config
        .prompts
        .template_file
        .clone()
        .or_else(|| Some(AppPaths::new().prompts_file).filter(|p| p.exists()));
    if let Some(file) = template_file {
        PromptRegistry::global()
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .load_file(&file)
            .with_context(|| format!("loading prompt templates from {}", file.display()))?;
        log::info!("Prompt templates loaded: {}", file.display());
    }

    // 4. Document
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;
    let mut document = Document::new(text).split_with(&PunctuationSplitter::default())?;
    log::info!(
        "{}: {} sentence(s)",
        path.display(),
        document.sentences().len()
    );

    // 5. Annotation
    let annotator = Annotator::from_config(config);
    for process in processes {
        let report = annotator.annotate(&mut document, process).await?;
        if !report.failed.is_empty() {
            log::warn!("{process}: sentences {:?} were not annotated", report.failed);
        }
    }

    // 6. Output
    println!("{}", serde_json::to_string_pretty(&document)?);
    log::info!(
        "Done: {} tokens, {} input / {} output tokens billed",
        document.tokens().len(),
        document.usage.input,
        document.usage.output
    );
    Ok(())
}
