//! Configuration types for binsniff operations.
//!
//! Every section is `#[serde(default)]`, so a config file only needs to name
//! the values it changes.

use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Unified application configuration that can be loaded from CLI args or config files.
///
/// Aggregates every section; config files are layered over presets and CLI
/// flags are applied last.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// Where the signature corpus lives
    pub corpus: CorpusConfig,
    /// Candidate matching knobs
    pub matching: MatchingConfig,
    /// Confidence aggregation
    pub scoring: ScoringConfig,
    /// Fuzzy-similarity backstop
    pub fuzzy: FuzzyConfig,
    /// Genericity filter extensions
    pub genericity: GenericityConfig,
    /// Batch analysis and file collection
    pub batch: BatchConfig,
    /// Output configuration
    pub output: OutputConfig,
}

impl AppConfig {
    /// Create a new `AppConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an `AppConfig` builder.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

// ============================================================================
// Builder for AppConfig
// ============================================================================

/// Builder for constructing `AppConfig` with fluent API.
#[derive(Debug, Default)]
#[must_use]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Set the corpus location.
    pub fn corpus_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.corpus.path = Some(path.into());
        self
    }

    /// Set the minimum aggregate confidence for reported matches.
    pub const fn threshold(mut self, threshold: f64) -> Self {
        self.config.matching.threshold = threshold;
        self
    }

    /// Request fuzzy matching for every file.
    pub const fn deep(mut self, deep: bool) -> Self {
        self.config.fuzzy.deep = deep;
        self
    }

    /// Enable or disable parallel batch analysis.
    pub const fn parallel(mut self, parallel: bool) -> Self {
        self.config.batch.parallel = parallel;
        self
    }

    /// Bound the worker pool.
    pub const fn max_workers(mut self, workers: Option<usize>) -> Self {
        self.config.batch.max_workers = workers;
        self
    }

    /// Set the output format.
    pub const fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.output.format = format;
        self
    }

    /// Set the output file.
    pub fn output_file(mut self, file: Option<PathBuf>) -> Self {
        self.config.output.file = file;
        self
    }

    /// Build the `AppConfig`.
    #[must_use]
    pub fn build(self) -> AppConfig {
        self.config
    }
}

// ============================================================================
// Corpus
// ============================================================================

/// Storage format of the signature corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CorpusFormat {
    /// SQLite for files, JSON for directories
    #[default]
    Auto,
    Sqlite,
    Json,
}

/// Signature corpus location.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CorpusConfig {
    /// SQLite database file or directory of signature documents
    pub path: Option<PathBuf>,
    /// How to read `path`
    pub format: CorpusFormat,
}

// ============================================================================
// Matching
// ============================================================================

/// Candidate matcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MatchingConfig {
    /// Minimum aggregate confidence for a reported match
    #[schemars(range(min = 0.0, max = 1.0))]
    pub threshold: f64,
    /// Features and patterns shorter than this are never match keys
    pub min_pattern_len: usize,
    /// Features shorter than this never take part in substring matching
    pub substring_min_token_len: usize,
    /// Patterns shorter than this are only matched exactly
    pub substring_min_pattern_len: usize,
    /// Multiplier applied to a signature's confidence for substring hits
    #[schemars(range(min = 0.0, max = 1.0))]
    pub substring_discount: f64,
    /// Upper bound on substring evidence per signature
    pub max_substring_hits: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            threshold: super::DEFAULT_MATCHING_THRESHOLD,
            min_pattern_len: 3,
            substring_min_token_len: 6,
            substring_min_pattern_len: 5,
            substring_discount: 0.8,
            max_substring_hits: 5,
        }
    }
}

// ============================================================================
// Scoring
// ============================================================================

/// Confidence aggregation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ScoringConfig {
    /// Evidence entries averaged into the base score
    pub top_k: usize,
    /// Bonus per evidence entry
    pub per_hit_bonus: f64,
    /// Ceiling for the total bonus
    pub bonus_cap: f64,
    /// Matched patterns listed in each evidence summary
    pub max_reported_patterns: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            per_hit_bonus: 0.02,
            bonus_cap: 0.2,
            max_reported_patterns: 20,
        }
    }
}

// ============================================================================
// Fuzzy
// ============================================================================

/// Fuzzy-similarity backstop configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FuzzyConfig {
    /// Always run fuzzy matching
    pub deep: bool,
    /// Run fuzzy matching when direct evidence is sparse even without `deep`
    pub auto_backstop: bool,
    /// "Sparse" means fewer direct evidence entries than this
    pub sparse_evidence_threshold: usize,
    /// MinHash sketch width
    pub num_hashes: usize,
    /// Character shingle size
    pub shingle_size: usize,
    /// Minimum similarity before any fuzzy evidence is emitted
    #[schemars(range(min = 0.0, max = 1.0))]
    pub min_similarity: f64,
    /// Fuzzy evidence confidence is `similarity * weight`
    #[schemars(range(min = 0.0, max = 1.0))]
    pub weight: f64,
    /// Whole-file hash distance mapped to zero similarity
    pub max_hash_distance: u32,
}

impl Default for FuzzyConfig {
    fn default() -> Self {
        Self {
            deep: false,
            auto_backstop: false,
            sparse_evidence_threshold: 3,
            num_hashes: 64,
            shingle_size: 3,
            min_similarity: 0.5,
            weight: 0.5,
            max_hash_distance: 300,
        }
    }
}

// ============================================================================
// Genericity
// ============================================================================

/// Extensions to the built-in genericity vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct GenericityConfig {
    /// Patterns shorter than this need a namespace separator
    pub min_length: usize,
    /// Additional generic terms
    pub extra_terms: Vec<String>,
    /// Terms that are never generic
    pub allowed_terms: Vec<String>,
    /// Additional library symbol prefixes (`foo` exempts `foo_*`)
    pub library_prefixes: Vec<String>,
}

impl Default for GenericityConfig {
    fn default() -> Self {
        Self {
            min_length: crate::generic::DEFAULT_MIN_LENGTH,
            extra_terms: Vec::new(),
            allowed_terms: Vec::new(),
            library_prefixes: Vec::new(),
        }
    }
}

// ============================================================================
// Batch
// ============================================================================

/// Batch analysis and directory collection.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BatchConfig {
    /// Analyze files on a worker pool
    pub parallel: bool,
    /// Worker count; defaults to available parallelism
    pub max_workers: Option<usize>,
    /// Descend into subdirectories
    pub recursive: bool,
    /// Glob patterns selecting files (empty selects all)
    pub patterns: Vec<String>,
    /// Directory names never descended into (dot-directories are always skipped)
    pub excluded_dirs: Vec<String>,
    /// Minimum printable run length for the strings extractor
    pub min_string_len: usize,
    /// Cap on strings taken from one file
    pub max_strings: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            max_workers: None,
            recursive: true,
            patterns: Vec::new(),
            excluded_dirs: crate::pipeline::DEFAULT_EXCLUDED_DIRS
                .iter()
                .map(|d| (*d).to_string())
                .collect(),
            min_string_len: 4,
            max_strings: 100_000,
        }
    }
}

// ============================================================================
// Output
// ============================================================================

/// Result rendering format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable summary
    #[default]
    Summary,
    /// Full JSON document
    Json,
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Write to this file instead of stdout
    pub file: Option<PathBuf>,
    /// Include matched patterns in the summary
    pub show_evidence: bool,
    /// Pretty-print JSON
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Summary,
            file: None,
            show_evidence: false,
            pretty: true,
        }
    }
}
