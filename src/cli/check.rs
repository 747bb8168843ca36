//! Check command handler.
//!
//! Loads the configured corpus the way `analyze` would and reports what
//! survived decoding and filtering, without analyzing any files.

use super::ensure_valid;
use crate::config::{AppConfig, OutputFormat};
use crate::corpus::{open_store, CacheStats, CorpusCache};
use crate::generic::GenericityFilter;
use crate::pipeline::{exit_codes, write_output, OutputTarget};
use anyhow::{Context, Result};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct CheckReport {
    store: String,
    usable: bool,
    #[serde(flatten)]
    stats: CacheStats,
}

/// Run the check command
///
/// Exits with `ERROR` when the store cannot be read or holds no usable
/// signatures.
pub fn run_check(config: &AppConfig) -> Result<i32> {
    ensure_valid(config)?;

    let store = match open_store(&config.corpus) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("Corpus unavailable: {err}");
            return Ok(exit_codes::ERROR);
        }
    };
    let filter = GenericityFilter::from_config(&config.genericity);
    let cache = match CorpusCache::build(store.as_ref(), filter, &config.matching, &config.fuzzy) {
        Ok(cache) => cache,
        Err(err) => {
            eprintln!("Corpus unreadable: {err}");
            return Ok(exit_codes::ERROR);
        }
    };

    let report = CheckReport {
        store: store.describe(),
        usable: !cache.is_empty(),
        stats: cache.stats().clone(),
    };

    let rendered = match config.output.format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(&report).context("failed to serialize check report")?
        }
        OutputFormat::Summary => render_summary(&report),
    };
    write_output(&rendered, &OutputTarget::from_option(config.output.file.clone()))?;

    Ok(if report.usable {
        exit_codes::SUCCESS
    } else {
        exit_codes::ERROR
    })
}

fn render_summary(report: &CheckReport) -> String {
    let stats = &report.stats;
    let load = &stats.load_report;
    let mut lines = vec![
        format!("Corpus:      {}", report.store),
        format!("Components:  {}", stats.components),
        format!(
            "Signatures:  {} usable of {} records",
            stats.signatures, load.total_records
        ),
        format!(
            "Dropped:     {} generic, {} short, {} undecodable, {} orphaned",
            stats.filtered_generic, stats.filtered_short, load.skipped, load.orphaned
        ),
    ];
    if load.skipped_documents > 0 {
        lines.push(format!("Unreadable documents: {}", load.skipped_documents));
    }
    if !report.usable {
        lines.push("No usable signatures; analysis would report nothing.".to_string());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_check_counts_generic_patterns() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        let corpus = tmp.path().join("corpus");
        std::fs::create_dir(&corpus).expect("mkdir");
        let doc = json!({
            "component": { "name": "zlib", "version": "1.2.13" },
            "signatures": [
                { "type": "function", "pattern": "deflateInit2_", "confidence": 0.9 },
                { "type": "string", "pattern": "error", "confidence": 0.9 }
            ]
        });
        std::fs::write(corpus.join("zlib.json"), doc.to_string()).expect("write");

        let report_path = tmp.path().join("check.json");
        let mut config = AppConfig::builder()
            .corpus_path(&corpus)
            .output_format(OutputFormat::Json)
            .output_file(Some(report_path.clone()))
            .build();
        config.output.pretty = true;

        assert_eq!(run_check(&config).expect("runs"), exit_codes::SUCCESS);
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(report_path).expect("read")).expect("json");
        assert_eq!(value["signatures"], 1);
        assert_eq!(value["filtered_generic"], 1);
        assert_eq!(value["usable"], true);
    }

    #[test]
    fn test_check_missing_corpus_is_an_error_code() {
        let config = AppConfig::builder().corpus_path("/nonexistent/signatures.db").build();
        assert_eq!(run_check(&config).expect("runs"), exit_codes::ERROR);
    }
}
