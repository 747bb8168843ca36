//! Analyze command handler.
//!
//! Loads the corpus once, analyzes every input file (directories are
//! expanded per the batch configuration) and renders one batch report.

use super::ensure_valid;
use crate::config::AppConfig;
use crate::corpus::{open_store, CorpusCache};
use crate::extract::CompositeExtractor;
use crate::generic::GenericityFilter;
use crate::matching::SignatureMatcher;
use crate::model::BatchAnalysisResult;
use crate::pipeline::{collect_files, exit_codes, write_output, Analyzer, BatchOrchestrator, OutputTarget};
use crate::reports::reporter_for;
use anyhow::Result;
use indexmap::IndexSet;
use std::path::PathBuf;
use std::sync::Arc;

/// Per-invocation switches that are not part of [`AppConfig`].
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    /// Files and directories to analyze
    pub inputs: Vec<PathBuf>,
    /// Exit with `COMPONENTS_FOUND` when anything matched
    pub fail_on_match: bool,
    /// Colored summary output
    pub colored: bool,
}

/// Build the session analyzer: corpus cache, matcher and extractors.
///
/// A missing or unreadable corpus yields an analyzer over an empty cache;
/// the failure is logged and every file then reports zero matches.
pub fn open_session(config: &AppConfig) -> Analyzer {
    let filter = GenericityFilter::from_config(&config.genericity);
    let cache = match open_store(&config.corpus) {
        Ok(store) => CorpusCache::load(store.as_ref(), filter, &config.matching, &config.fuzzy),
        Err(err) => {
            tracing::error!("Corpus unavailable, continuing with an empty corpus: {err}");
            CorpusCache::degraded(filter, &config.fuzzy)
        }
    };

    let matcher = SignatureMatcher::new(Arc::new(cache), config);
    let extractor = CompositeExtractor::with_defaults(
        config.batch.min_string_len,
        config.batch.max_strings,
    );
    Analyzer::new(matcher, Arc::new(extractor))
        .with_threshold(config.matching.threshold)
        .with_deep(config.fuzzy.deep)
}

/// Expand directories into their collected files, keeping first-seen order.
fn expand_inputs(config: &AppConfig, inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = IndexSet::new();
    for input in inputs {
        if input.is_dir() {
            let found = collect_files(
                input,
                config.batch.recursive,
                &config.batch.patterns,
                &config.batch.excluded_dirs,
            )?;
            tracing::debug!("{}: {} files collected", input.display(), found.len());
            files.extend(found);
        } else {
            files.insert(input.clone());
        }
    }
    Ok(files.into_iter().collect())
}

/// Analyze without rendering.
pub fn analyze_inputs(config: &AppConfig, inputs: &[PathBuf]) -> Result<BatchAnalysisResult> {
    let files = expand_inputs(config, inputs)?;
    let orchestrator = BatchOrchestrator::new(Arc::new(open_session(config)));
    Ok(orchestrator.analyze_many(&files, config.batch.parallel, config.batch.max_workers))
}

/// Run the analyze command
pub fn run_analyze(config: &AppConfig, options: &AnalyzeOptions) -> Result<i32> {
    ensure_valid(config)?;

    let batch = analyze_inputs(config, &options.inputs)?;

    let reporter = reporter_for(&config.output, options.colored);
    let rendered = reporter.generate(&batch)?;
    write_output(&rendered, &OutputTarget::from_option(config.output.file.clone()))?;

    if batch.failure_count() > 0 {
        tracing::warn!("{} of {} files failed", batch.failure_count(), batch.len());
    }

    if options.fail_on_match && batch.total_matches() > 0 {
        Ok(exit_codes::COMPONENTS_FOUND)
    } else {
        Ok(exit_codes::SUCCESS)
    }
}
