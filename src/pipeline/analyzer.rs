//! Analysis of a single file.

use crate::error::Result;
use crate::extract::FeatureExtractor;
use crate::matching::SignatureMatcher;
use crate::model::AnalysisResult;
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Analyzes one file into one [`AnalysisResult`].
///
/// Implementations may fail or panic; the batch orchestrator turns either
/// into an error entry for that file.
pub trait FileAnalyzer: Send + Sync {
    fn analyze(&self, path: &Path) -> Result<AnalysisResult>;
}

/// Extract, then match against the session corpus.
#[derive(Clone)]
pub struct Analyzer {
    matcher: SignatureMatcher,
    extractor: Arc<dyn FeatureExtractor>,
    threshold: f64,
    deep: bool,
}

impl Analyzer {
    pub fn new(matcher: SignatureMatcher, extractor: Arc<dyn FeatureExtractor>) -> Self {
        Self {
            matcher,
            extractor,
            threshold: crate::config::DEFAULT_MATCHING_THRESHOLD,
            deep: false,
        }
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_deep(mut self, deep: bool) -> Self {
        self.deep = deep;
        self
    }

    pub fn matcher(&self) -> &SignatureMatcher {
        &self.matcher
    }

    /// Whole-file digest when deep analysis can use it.
    fn file_hash(&self, path: &Path) -> Option<String> {
        if !self.deep {
            return None;
        }
        let hasher = self.matcher.whole_file_hasher()?;
        match std::fs::read(path) {
            Ok(data) => hasher.digest(&data),
            Err(err) => {
                tracing::debug!("No whole-file hash for {}: {err}", path.display());
                None
            }
        }
    }
}

impl FileAnalyzer for Analyzer {
    fn analyze(&self, path: &Path) -> Result<AnalysisResult> {
        let start = Instant::now();
        let analyzed_at = Utc::now();
        let file_size = std::fs::metadata(path)
            .map_err(|e| crate::error::SnifferError::io(path, e))?
            .len();

        let features = self.extractor.extract(path)?;
        let file_hash = self.file_hash(path);
        let matches = self
            .matcher
            .match_artifact(&features, file_hash.as_deref(), self.threshold, self.deep);

        let elapsed = start.elapsed();
        tracing::debug!(
            "{}: {} features, {} matches in {:?}",
            path.display(),
            features.total(),
            matches.len(),
            elapsed
        );

        Ok(AnalysisResult {
            file_path: path.display().to_string(),
            file_size,
            features_extracted: features.total(),
            matches,
            analysis_time_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            analyzed_at,
            error: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::corpus::{CorpusCache, MemoryStore};
    use crate::extract::PrintableStringsExtractor;
    use crate::generic::GenericityFilter;
    use crate::model::{Component, Signature, SignatureType};

    #[test]
    fn test_analyze_binary_file() {
        let config = AppConfig::default();
        let store = MemoryStore::new()
            .with_component(Component::new(1, "SQLite").with_version("3.45.0"))
            .with_signature(Signature::new(1, 1, "sqlite3_open_v2", SignatureType::Function, 0.9))
            .with_signature(Signature::new(2, 1, "sqlite3_prepare_v2", SignatureType::Function, 0.9));
        let cache = CorpusCache::build(&store, GenericityFilter::new(), &config.matching, &config.fuzzy)
            .expect("cache");
        let analyzer = Analyzer::new(
            SignatureMatcher::new(Arc::new(cache), &config),
            Arc::new(PrintableStringsExtractor::default()),
        );

        let tmp = tempfile::NamedTempFile::new().expect("tempfile");
        std::fs::write(tmp.path(), b"\x00\x01sqlite3_open_v2\x00sqlite3_prepare_v2\x00\x02").expect("write");

        let result = analyzer.analyze(tmp.path()).expect("analyzes");
        assert!(result.is_success());
        assert_eq!(result.features_extracted, 2);
        assert_eq!(result.component_names(), vec!["SQLite@3.45.0"]);
        assert!((result.matches[0].confidence - 0.94).abs() < 1e-9);
    }

    #[test]
    fn test_missing_file_is_error() {
        let config = AppConfig::default();
        let cache = CorpusCache::empty(GenericityFilter::new(), &config.fuzzy);
        let analyzer = Analyzer::new(
            SignatureMatcher::new(Arc::new(cache), &config),
            Arc::new(PrintableStringsExtractor::default()),
        );
        assert!(analyzer.analyze(Path::new("/no/such/file.bin")).is_err());
    }
}
