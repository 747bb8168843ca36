//! Feature extraction seam.
//!
//! Format-specific extractors (ELF symbol tables, archive walkers, source
//! tokenizers) live outside this crate and plug in through
//! [`FeatureExtractor`]. Two generic extractors are built in so any file can
//! be analyzed:
//!
//! - [`FeatureFileExtractor`] reads features produced ahead of time, stored
//!   as `<name>.features.json`.
//! - [`PrintableStringsExtractor`] takes printable ASCII runs from raw bytes.

mod strings;

pub use strings::PrintableStringsExtractor;

use crate::error::{AnalysisErrorKind, Result, SnifferError};
use crate::model::ExtractedFeatures;
use std::path::Path;

/// Suffix identifying pre-extracted feature files.
pub const FEATURE_FILE_SUFFIX: &str = ".features.json";

/// Produces the feature vector of one artifact.
pub trait FeatureExtractor: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Whether this extractor handles `path`.
    fn can_extract(&self, path: &Path) -> bool;

    fn extract(&self, path: &Path) -> Result<ExtractedFeatures>;
}

/// Reads `*.features.json` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureFileExtractor;

impl FeatureExtractor for FeatureFileExtractor {
    fn name(&self) -> &'static str {
        "feature-file"
    }

    fn can_extract(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.to_ascii_lowercase().ends_with(FEATURE_FILE_SUFFIX))
    }

    fn extract(&self, path: &Path) -> Result<ExtractedFeatures> {
        let text = std::fs::read_to_string(path).map_err(|e| SnifferError::io(path, e))?;
        serde_json::from_str(&text)
            .map_err(|e| SnifferError::extraction(path.display().to_string(), e.to_string()))
    }
}

/// Tries extractors in order and uses the first that accepts the input.
pub struct CompositeExtractor {
    extractors: Vec<Box<dyn FeatureExtractor>>,
}

impl CompositeExtractor {
    pub fn new(extractors: Vec<Box<dyn FeatureExtractor>>) -> Self {
        Self { extractors }
    }

    /// Feature files first, printable strings for everything else.
    pub fn with_defaults(min_string_len: usize, max_strings: usize) -> Self {
        Self::new(vec![
            Box::new(FeatureFileExtractor),
            Box::new(PrintableStringsExtractor::new(min_string_len, max_strings)),
        ])
    }

    /// Put `extractor` ahead of the existing ones.
    #[must_use]
    pub fn prepend(mut self, extractor: Box<dyn FeatureExtractor>) -> Self {
        self.extractors.insert(0, extractor);
        self
    }

    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

impl FeatureExtractor for CompositeExtractor {
    fn name(&self) -> &'static str {
        "composite"
    }

    fn can_extract(&self, path: &Path) -> bool {
        self.extractors.iter().any(|e| e.can_extract(path))
    }

    fn extract(&self, path: &Path) -> Result<ExtractedFeatures> {
        let extractor = self
            .extractors
            .iter()
            .find(|e| e.can_extract(path))
            .ok_or_else(|| {
                SnifferError::analysis(path.display().to_string(), AnalysisErrorKind::UnsupportedInput)
            })?;
        tracing::trace!("Extracting {} with {}", path.display(), extractor.name());
        extractor.extract(path)
    }
}
