//! Many-file analysis with per-file failure isolation.

use super::{collect_files, FileAnalyzer};
use crate::config::BatchConfig;
use crate::error::{AnalysisErrorKind, Result, SnifferError};
use crate::model::{AnalysisResult, BatchAnalysisResult};
use rayon::prelude::*;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Runs a [`FileAnalyzer`] over many files.
///
/// Every input path yields exactly one result. An error or panic while
/// analyzing one file becomes that file's `error` and never affects the
/// others.
#[derive(Clone)]
pub struct BatchOrchestrator {
    analyzer: Arc<dyn FileAnalyzer>,
}

impl BatchOrchestrator {
    pub fn new(analyzer: Arc<dyn FileAnalyzer>) -> Self {
        Self { analyzer }
    }

    /// Analyze `files`, on a pool of at most `max_workers` threads when
    /// `parallel` is set.
    ///
    /// `max_workers` defaults to the available parallelism. If the pool
    /// cannot be created the batch runs sequentially.
    pub fn analyze_many(
        &self,
        files: &[PathBuf],
        parallel: bool,
        max_workers: Option<usize>,
    ) -> BatchAnalysisResult {
        let mut batch = BatchAnalysisResult::new();
        if files.is_empty() {
            return batch;
        }

        let start = Instant::now();
        let workers = worker_count(max_workers, files.len());
        tracing::info!(
            "Analyzing {} files ({})",
            files.len(),
            if parallel && workers > 1 {
                format!("{workers} workers")
            } else {
                "sequential".to_string()
            }
        );

        let results = if parallel && workers > 1 {
            self.run_pool(files, workers)
                .unwrap_or_else(|| self.run_sequential(files))
        } else {
            self.run_sequential(files)
        };

        for result in results {
            batch.add_result(result);
        }
        batch.total_time_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        tracing::info!(
            "Analyzed {} files in {} ms: {} matches, {} failures",
            batch.len(),
            batch.total_time_ms,
            batch.total_matches(),
            batch.failure_count()
        );
        batch
    }

    /// Collect files under `dir` per `config` and analyze them.
    pub fn analyze_directory(&self, dir: &Path, config: &BatchConfig) -> Result<BatchAnalysisResult> {
        let files = collect_files(dir, config.recursive, &config.patterns, &config.excluded_dirs)?;
        Ok(self.analyze_many(&files, config.parallel, config.max_workers))
    }

    fn run_sequential(&self, files: &[PathBuf]) -> Vec<AnalysisResult> {
        files.iter().map(|path| self.analyze_one(path)).collect()
    }

    fn run_pool(&self, files: &[PathBuf], workers: usize) -> Option<Vec<AnalysisResult>> {
        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("binsniff-worker-{i}"))
            .build()
        {
            Ok(pool) => pool,
            Err(err) => {
                tracing::warn!("Could not start worker pool, running sequentially: {err}");
                return None;
            }
        };
        Some(pool.install(|| files.par_iter().map(|path| self.analyze_one(path)).collect()))
    }

    /// One file, with errors and panics converted into an error result.
    fn analyze_one(&self, path: &Path) -> AnalysisResult {
        let key = path.display().to_string();
        match catch_unwind(AssertUnwindSafe(|| self.analyzer.analyze(path))) {
            Ok(Ok(mut result)) => {
                result.file_path = key;
                result
            }
            Ok(Err(err)) => {
                tracing::error!("Analysis of {key} failed: {err}");
                AnalysisResult::failed(key, err)
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!("Analysis of {key} panicked: {message}");
                let err = SnifferError::analysis(key.clone(), AnalysisErrorKind::Panicked(message));
                AnalysisResult::failed(key, err)
            }
        }
    }
}

fn worker_count(max_workers: Option<usize>, files: usize) -> usize {
    let available = std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get);
    max_workers.unwrap_or(available).max(1).min(files)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingAnalyzer {
        calls: AtomicUsize,
    }

    impl FileAnalyzer for CountingAnalyzer {
        fn analyze(&self, path: &Path) -> Result<AnalysisResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let name = path.to_string_lossy();
            if name.contains("broken") {
                return Err(SnifferError::extraction(name.to_string(), "truncated header"));
            }
            if name.contains("panic") {
                panic!("extractor blew up");
            }
            let mut result = AnalysisResult::new(name.to_string());
            result.features_extracted = name.len();
            Ok(result)
        }
    }

    fn orchestrator() -> (BatchOrchestrator, Arc<CountingAnalyzer>) {
        let analyzer = Arc::new(CountingAnalyzer {
            calls: AtomicUsize::new(0),
        });
        (BatchOrchestrator::new(analyzer.clone()), analyzer)
    }

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_empty_list() {
        let (orch, analyzer) = orchestrator();
        let batch = orch.analyze_many(&[], true, Some(4));
        assert!(batch.is_empty());
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_failures_isolated_sequential_and_parallel() {
        let files = paths(&["a.so", "broken.so", "c.so", "panic.so", "e.so"]);
        for parallel in [false, true] {
            let (orch, _) = orchestrator();
            let batch = orch.analyze_many(&files, parallel, Some(3));
            assert_eq!(batch.len(), 5);
            assert_eq!(batch.failure_count(), 2);
            assert!(batch.get("broken.so").and_then(|r| r.error.as_ref()).is_some());
            let panicked = batch.get("panic.so").and_then(|r| r.error.clone()).expect("error");
            assert!(panicked.contains("panic"));
            assert!(batch.get("a.so").is_some_and(AnalysisResult::is_success));
        }
    }

    #[test]
    fn test_sequential_keeps_input_order() {
        let files = paths(&["z.so", "a.so", "m.so"]);
        let (orch, _) = orchestrator();
        let batch = orch.analyze_many(&files, false, None);
        let order: Vec<&str> = batch.iter().map(|r| r.file_path.as_str()).collect();
        assert_eq!(order, vec!["z.so", "a.so", "m.so"]);
    }

    #[test]
    fn test_repeated_path_overwrites() {
        let files = paths(&["a.so", "a.so"]);
        let (orch, analyzer) = orchestrator();
        let batch = orch.analyze_many(&files, true, Some(2));
        assert_eq!(batch.len(), 1);
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_worker_count_bounds() {
        assert_eq!(worker_count(Some(8), 3), 3);
        assert_eq!(worker_count(Some(0), 3), 1);
        assert_eq!(worker_count(Some(2), 10), 2);
    }
}
