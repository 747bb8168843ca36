//! Summary report generator for shell output.
//!
//! Provides a compact, human-readable summary for terminal usage.

use super::{ReportError, ReportGenerator};
use crate::config::OutputFormat;
use crate::model::{AnalysisResult, BatchAnalysisResult};

/// Apply ANSI color formatting if colored output is enabled.
fn ansi_color(text: &str, color: &str, colored: bool) -> String {
    if colored {
        match color {
            "red" => format!("\x1b[31m{text}\x1b[0m"),
            "green" => format!("\x1b[32m{text}\x1b[0m"),
            "yellow" => format!("\x1b[33m{text}\x1b[0m"),
            "cyan" => format!("\x1b[36m{text}\x1b[0m"),
            "bold" => format!("\x1b[1m{text}\x1b[0m"),
            "dim" => format!("\x1b[2m{text}\x1b[0m"),
            _ => text.to_string(),
        }
    } else {
        text.to_string()
    }
}

/// Summary reporter for shell output
pub struct SummaryReporter {
    /// Use colored output
    colored: bool,
    /// List matched patterns under each component
    show_evidence: bool,
}

impl SummaryReporter {
    /// Create a new summary reporter
    #[must_use]
    pub const fn new() -> Self {
        Self {
            colored: true,
            show_evidence: false,
        }
    }

    /// Disable colored output
    #[must_use]
    pub const fn no_color(mut self) -> Self {
        self.colored = false;
        self
    }

    #[must_use]
    pub const fn show_evidence(mut self, show: bool) -> Self {
        self.show_evidence = show;
        self
    }

    fn color(&self, text: &str, color: &str) -> String {
        ansi_color(text, color, self.colored)
    }

    fn file_block(&self, result: &AnalysisResult, lines: &mut Vec<String>) {
        lines.push(self.color(&result.file_path, "bold"));

        if let Some(error) = &result.error {
            lines.push(format!("  {} {}", self.color("error:", "red"), error));
            return;
        }

        if result.matches.is_empty() {
            lines.push(format!(
                "  {}",
                self.color(
                    &format!("no components ({} features)", result.features_extracted),
                    "dim"
                )
            ));
            return;
        }

        for m in &result.matches {
            let license = m.license.as_deref().unwrap_or("-");
            lines.push(format!(
                "  {:<40} {:>6}  {:<10} {:<10} {}",
                m.component,
                self.color(&format!("{:.1}%", m.confidence_percent()), confidence_color(m.confidence)),
                m.match_type,
                m.ecosystem,
                license
            ));
            if self.show_evidence {
                for p in &m.evidence.matched_patterns {
                    lines.push(format!(
                        "      {} {} <- {} ({:.2})",
                        self.color(&p.kind.to_string(), "dim"),
                        p.pattern,
                        p.matched_string,
                        p.confidence
                    ));
                }
            }
        }
    }
}

fn confidence_color(confidence: f64) -> &'static str {
    if confidence >= 0.8 {
        "green"
    } else if confidence >= 0.5 {
        "yellow"
    } else {
        "dim"
    }
}

impl Default for SummaryReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for SummaryReporter {
    fn generate(&self, batch: &BatchAnalysisResult) -> Result<String, ReportError> {
        let mut lines = Vec::new();

        // Header
        lines.push(self.color("Component Analysis Summary", "bold"));
        lines.push(self.color("─".repeat(40).as_str(), "dim"));

        for result in batch.iter() {
            self.file_block(result, &mut lines);
        }

        lines.push(self.color("─".repeat(40).as_str(), "dim"));
        let unique = batch.unique_components();
        lines.push(format!(
            "{}  {} analyzed, {} failed",
            self.color("Files:", "cyan"),
            batch.len(),
            batch.failure_count()
        ));
        lines.push(format!(
            "{}  {} matches, {} distinct",
            self.color("Components:", "cyan"),
            batch.total_matches(),
            unique.len()
        ));
        if !unique.is_empty() {
            lines.push(format!(
                "{}  {}",
                self.color("Found:", "cyan"),
                unique.into_iter().collect::<Vec<_>>().join(", ")
            ));
        }
        lines.push(format!(
            "{}  {} ms",
            self.color("Time:", "cyan"),
            batch.total_time_ms
        ));

        Ok(lines.join("\n"))
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Summary
    }
}
