//! Signature matching and scoring.
//!
//! Matching one artifact runs in three steps:
//!
//! 1. [`CandidateMatcher`] finds exact and bounded-substring hits against the
//!    cached corpus.
//! 2. When requested, or when direct evidence is sparse and the automatic
//!    backstop is on, [`FuzzyMatcher`] adds one low-weight entry per
//!    component that direct matching missed but that looks similar.
//! 3. [`ConfidenceAggregator`] groups evidence by component, scores each
//!    group, and drops groups below the threshold.
//!
//! [`SignatureMatcher`] wires the three together over a shared
//! [`CorpusCache`].
//!
//! # Example
//!
//! ```ignore
//! use binsniff::matching::SignatureMatcher;
//!
//! let matcher = SignatureMatcher::new(Arc::new(cache), &config);
//! let matches = matcher.match_features(&features, 0.3, false);
//! ```

mod aggregate;
mod candidate;
mod fuzzy;

pub use aggregate::{ConfidenceAggregator, DIRECT_METHOD, FUZZY_METHOD};
pub use candidate::{CandidateMatcher, TokenSet};
pub use fuzzy::{
    containment, distance_similarity, FuzzyMatcher, MinHashSketch, MinHasher, WholeFileHasher,
    SKETCH_METHOD, WHOLE_FILE_METHOD,
};

use crate::config::{AppConfig, FuzzyConfig, MatchingConfig};
use crate::corpus::CorpusCache;
use crate::model::{ComponentId, ComponentMatch, Evidence, ExtractedFeatures};
use std::collections::HashSet;
use std::sync::Arc;

/// Matches artifacts against one session's corpus.
///
/// Cheap to clone; the corpus is shared.
#[derive(Clone)]
#[must_use]
pub struct SignatureMatcher {
    cache: Arc<CorpusCache>,
    matching: MatchingConfig,
    fuzzy: FuzzyConfig,
    aggregator: ConfidenceAggregator,
    whole_file: Option<Arc<dyn WholeFileHasher>>,
}

impl std::fmt::Debug for SignatureMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureMatcher")
            .field("signatures", &self.cache.signatures().len())
            .field("matching", &self.matching)
            .field("fuzzy", &self.fuzzy)
            .field("whole_file_hasher", &self.whole_file.is_some())
            .finish()
    }
}

impl SignatureMatcher {
    pub fn new(cache: Arc<CorpusCache>, config: &AppConfig) -> Self {
        Self {
            cache,
            matching: config.matching.clone(),
            fuzzy: config.fuzzy.clone(),
            aggregator: ConfidenceAggregator::new(config.scoring.clone()),
            whole_file: None,
        }
    }

    pub fn with_whole_file_hasher(mut self, hasher: Arc<dyn WholeFileHasher>) -> Self {
        self.whole_file = Some(hasher);
        self
    }

    pub fn cache(&self) -> &Arc<CorpusCache> {
        &self.cache
    }

    pub fn whole_file_hasher(&self) -> Option<&Arc<dyn WholeFileHasher>> {
        self.whole_file.as_ref()
    }

    /// Exact and substring evidence only.
    pub fn find_evidence(&self, features: &ExtractedFeatures) -> Vec<Evidence> {
        CandidateMatcher::new(&self.cache, &self.matching).find(features)
    }

    /// Scored matches for one artifact's features.
    pub fn match_features(
        &self,
        features: &ExtractedFeatures,
        threshold: f64,
        deep: bool,
    ) -> Vec<ComponentMatch> {
        self.match_artifact(features, None, threshold, deep)
    }

    /// Like [`Self::match_features`], with the artifact's whole-file hash for
    /// the fuzzy backstop.
    pub fn match_artifact(
        &self,
        features: &ExtractedFeatures,
        file_hash: Option<&str>,
        threshold: f64,
        deep: bool,
    ) -> Vec<ComponentMatch> {
        if self.cache.is_empty() {
            return Vec::new();
        }

        let mut evidence = self.find_evidence(features);
        if self.wants_fuzzy(deep, evidence.len()) {
            let direct: HashSet<ComponentId> = evidence.iter().map(|e| e.component_id).collect();
            let fuzzy = FuzzyMatcher::new(&self.cache, &self.fuzzy)
                .with_whole_file_hasher(self.whole_file.as_ref())
                .find(features, file_hash, &direct);
            evidence.extend(fuzzy);
        }

        self.aggregator
            .aggregate(evidence, self.cache.components(), threshold)
    }

    fn wants_fuzzy(&self, deep: bool, direct_evidence: usize) -> bool {
        deep || (self.fuzzy.auto_backstop && direct_evidence < self.fuzzy.sparse_evidence_threshold)
    }
}
