//! Configuration module for binsniff.
//!
//! This module provides a unified configuration system with:
//! - Type-safe configuration structures
//! - Validation for all configuration values
//! - Named presets for common use cases
//! - YAML config file loading and discovery
//! - Layering of config files over presets
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use binsniff::config::{AppConfig, ConfigPreset};
//!
//! let config = AppConfig::from_preset(ConfigPreset::Strict);
//!
//! let config = AppConfig::builder()
//!     .corpus_path("signatures.db")
//!     .threshold(0.4)
//!     .deep(true)
//!     .build();
//!
//! use binsniff::config::file::load_or_default;
//! let (config, loaded_from) = load_or_default(None);
//! ```
//!
//! # Configuration File
//!
//! Place a `.binsniff.yaml` file in your project root or `~/.config/binsniff/`:
//!
//! ```yaml
//! corpus:
//!   path: /var/lib/binsniff/signatures.db
//! matching:
//!   threshold: 0.4
//! genericity:
//!   extra_terms: [webview, jni_onload]
//! ```

mod defaults;
pub mod file;
mod types;
mod validation;

pub use defaults::{ConfigPreset, DEFAULT_MATCHING_THRESHOLD};
pub use types::{
    AppConfig, AppConfigBuilder, BatchConfig, CorpusConfig, CorpusFormat, FuzzyConfig,
    GenericityConfig, MatchingConfig, OutputConfig, OutputFormat, ScoringConfig,
};
pub use validation::{ConfigError, Validatable};

pub use file::{
    discover_config_file, generate_example_config, load_config_file, load_config_over, load_or,
    load_or_default, ConfigFileError,
};

/// Generate a JSON Schema for the `AppConfig` configuration format.
///
/// Documents every option that can be set in `.binsniff.yaml`.
#[must_use]
pub fn generate_json_schema() -> String {
    let schema = schemars::schema_for!(AppConfig);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}
