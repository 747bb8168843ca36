//! JSON report generator.

use super::{ReportError, ReportGenerator};
use crate::config::OutputFormat;
use crate::model::{AnalysisResult, BatchAnalysisResult};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ReportMetadata {
    tool: &'static str,
    version: &'static str,
    generated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct BatchSummary<'a> {
    files_analyzed: usize,
    successful: usize,
    failed: usize,
    total_matches: usize,
    unique_components: Vec<&'a str>,
    total_time_ms: u64,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    metadata: ReportMetadata,
    summary: BatchSummary<'a>,
    results: &'a IndexMap<String, AnalysisResult>,
}

/// JSON report generator
pub struct JsonReporter {
    /// Pretty print output
    pretty: bool,
}

impl JsonReporter {
    /// Create a new JSON reporter
    #[must_use]
    pub const fn new() -> Self {
        Self { pretty: true }
    }

    /// Set pretty printing
    #[must_use]
    pub const fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for JsonReporter {
    fn generate(&self, batch: &BatchAnalysisResult) -> Result<String, ReportError> {
        let report = JsonReport {
            metadata: ReportMetadata {
                tool: env!("CARGO_PKG_NAME"),
                version: env!("CARGO_PKG_VERSION"),
                generated_at: Utc::now(),
            },
            summary: BatchSummary {
                files_analyzed: batch.len(),
                successful: batch.successful().count(),
                failed: batch.failure_count(),
                total_matches: batch.total_matches(),
                unique_components: batch.unique_components().into_iter().collect(),
                total_time_ms: batch.total_time_ms,
            },
            results: &batch.results,
        };

        let rendered = if self.pretty {
            serde_json::to_string_pretty(&report)
        } else {
            serde_json::to_string(&report)
        };
        rendered.map_err(|e| ReportError::SerializationError(e.to_string()))
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}
