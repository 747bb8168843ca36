//! Rendering batch results.
//!
//! - JSON: the full [`BatchAnalysisResult`] with run metadata, for tooling
//! - Summary: compact terminal output, one block per file

mod json;
mod summary;

pub use json::JsonReporter;
pub use summary::SummaryReporter;

use crate::config::{OutputConfig, OutputFormat};
use crate::model::BatchAnalysisResult;
use std::io::Write;
use thiserror::Error;

/// Errors that can occur during report generation
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Format error: {0}")]
    FormatError(#[from] std::fmt::Error),
}

/// Trait for report generators
pub trait ReportGenerator {
    /// Render a whole batch
    fn generate(&self, batch: &BatchAnalysisResult) -> Result<String, ReportError>;

    /// Write report to a writer
    fn write_report(
        &self,
        batch: &BatchAnalysisResult,
        writer: &mut dyn Write,
    ) -> Result<(), ReportError> {
        let report = self.generate(batch)?;
        writer.write_all(report.as_bytes())?;
        Ok(())
    }

    /// Get the format this generator produces
    fn format(&self) -> OutputFormat;
}

/// The reporter selected by output configuration.
pub fn reporter_for(config: &OutputConfig, colored: bool) -> Box<dyn ReportGenerator> {
    match config.format {
        OutputFormat::Json => Box::new(JsonReporter::new().pretty(config.pretty)),
        OutputFormat::Summary => {
            let reporter = SummaryReporter::new().show_evidence(config.show_evidence);
            if colored {
                Box::new(reporter)
            } else {
                Box::new(reporter.no_color())
            }
        }
    }
}
