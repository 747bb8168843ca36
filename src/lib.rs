//! **Signature matching and confidence scoring for software composition analysis.**
//!
//! `binsniff` identifies third-party components embedded in binaries, archives
//! and source trees. Features extracted from an artifact (strings, function
//! names, constants, symbols) are matched against a curated signature corpus,
//! and the hits are combined into one confidence score per component.
//!
//! ## Core Concepts & Modules
//!
//! - **[`corpus`]**: signature stores (SQLite, a directory of JSON documents,
//!   in-memory) and the [`CorpusCache`] every matcher reads from.
//! - **[`generic`]**: the [`GenericityFilter`], which keeps common programming
//!   vocabulary from counting as evidence.
//! - **[`matching`]**: exact, bounded-substring and fuzzy candidate matching,
//!   plus the [`ConfidenceAggregator`]. [`SignatureMatcher`] ties them together.
//! - **[`pipeline`]**: per-file [`Analyzer`] and the [`BatchOrchestrator`] for
//!   many files, sequential or on a worker pool.
//! - **[`extract`]**: the [`FeatureExtractor`] seam and two generic extractors.
//! - **[`reports`]**: JSON and terminal summary rendering.
//!
//! ## Getting Started
//!
//! ```no_run
//! use binsniff::{
//!     AppConfig, CorpusCache, ExtractedFeatures, GenericityFilter, MemoryStore,
//!     SignatureMatcher,
//! };
//! use binsniff::model::{Component, Signature, SignatureType};
//! use std::sync::Arc;
//!
//! let store = MemoryStore::new()
//!     .with_component(Component::new(1, "FFmpeg").with_version("6.0"))
//!     .with_signature(Signature::new(1, 1, "av_register_all", SignatureType::Function, 0.9));
//!
//! let config = AppConfig::default();
//! let cache = CorpusCache::load(
//!     &store,
//!     GenericityFilter::from_config(&config.genericity),
//!     &config.matching,
//!     &config.fuzzy,
//! );
//! let matcher = SignatureMatcher::new(Arc::new(cache), &config);
//!
//! let features = ExtractedFeatures::from_strings(["av_register_all", "unused_noise"]);
//! for m in matcher.match_features(&features, 0.3, false) {
//!     println!("{} {:.2}", m.component, m.confidence);
//! }
//! ```
//!
//! ### Analyzing Many Files
//!
//! ```no_run
//! use binsniff::{cli::open_session, AppConfig, BatchOrchestrator};
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! let config = AppConfig::builder().corpus_path("signatures.db").build();
//! let orchestrator = BatchOrchestrator::new(Arc::new(open_session(&config)));
//! let files = vec![PathBuf::from("libfoo.so"), PathBuf::from("app.bin")];
//! let batch = orchestrator.analyze_many(&files, true, Some(4));
//! println!("{} components found", batch.total_matches());
//! ```

#![warn(clippy::unwrap_used)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod corpus;
pub mod error;
pub mod extract;
pub mod generic;
pub mod matching;
pub mod model;
pub mod pipeline;
pub mod reports;
pub mod utils;

// Re-export main types for convenience
pub use config::{AppConfig, ConfigPreset, Validatable};
pub use corpus::{
    open_store, CorpusCache, JsonSignatureStore, MemoryStore, SignatureStore, SqliteSignatureStore,
};
pub use error::{ErrorContext, OptionContext, Result, SnifferError};
pub use extract::{CompositeExtractor, FeatureExtractor};
pub use generic::GenericityFilter;
pub use matching::{ConfidenceAggregator, SignatureMatcher, WholeFileHasher};
pub use model::{AnalysisResult, BatchAnalysisResult, ComponentMatch, ExtractedFeatures};
pub use pipeline::{Analyzer, BatchOrchestrator, FileAnalyzer};
pub use reports::{ReportGenerator, ReportError};
