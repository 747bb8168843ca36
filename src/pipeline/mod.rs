//! Batch analysis pipeline: collect files, analyze each, merge by path.
//!
//! Command handlers build one [`Analyzer`] per session and hand it to a
//! [`BatchOrchestrator`], which owns concurrency and failure isolation.

mod analyzer;
mod batch;
mod collect;
mod output;

pub use analyzer::{Analyzer, FileAnalyzer};
pub use batch::BatchOrchestrator;
pub use collect::{build_globset, collect_files, DEFAULT_EXCLUDED_DIRS};
pub use output::{write_output, OutputTarget};

/// Exit codes for CI/CD integration
pub mod exit_codes {
    /// Success - no components found (or no `--fail-on-match`)
    pub const SUCCESS: i32 = 0;
    /// Components were identified and `--fail-on-match` was given
    pub const COMPONENTS_FOUND: i32 = 1;
    /// An error occurred
    pub const ERROR: i32 = 3;
}
