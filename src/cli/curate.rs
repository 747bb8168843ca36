//! Curate command handler.
//!
//! Applies the genericity filter to signature documents on disk so the
//! stored corpus agrees with what live matching accepts.

use super::document_paths;
use crate::config::AppConfig;
use crate::corpus::AnyDocument;
use crate::generic::{curate_document, curate_symbols, CurationOutcome, GenericityFilter};
use crate::pipeline::exit_codes;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Options for the curate command.
#[derive(Debug, Clone, Default)]
pub struct CurateOptions {
    /// Documents or directories of documents
    pub inputs: Vec<PathBuf>,
    /// Report what would be removed without writing anything
    pub dry_run: bool,
    /// Write curated documents here instead of in place
    pub output_dir: Option<PathBuf>,
    /// Print the full report as JSON
    pub json: bool,
}

#[derive(Debug, Default, Serialize)]
struct CurationReport {
    documents: usize,
    changed: usize,
    unreadable: Vec<String>,
    removed_total: usize,
    outcomes: Vec<CurationOutcome>,
}

/// Run the curate command
pub fn run_curate(config: &AppConfig, options: &CurateOptions) -> Result<i32> {
    let filter = GenericityFilter::from_config(&config.genericity);
    let paths = document_paths(&options.inputs)?;

    if let Some(dir) = &options.output_dir {
        if !options.dry_run {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
    }

    let mut report = CurationReport::default();
    for path in &paths {
        report.documents += 1;
        let outcome = match curate_file(&filter, path, options) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!("Skipping {}: {err:#}", path.display());
                report.unreadable.push(path.display().to_string());
                continue;
            }
        };
        if outcome.changed() {
            report.changed += 1;
        }
        report.removed_total += outcome.removed_count();
        report.outcomes.push(outcome);
    }

    if options.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("failed to serialize curation report")?
        );
    } else {
        print_summary(&report, options.dry_run);
    }

    Ok(if report.unreadable.is_empty() {
        exit_codes::SUCCESS
    } else {
        exit_codes::ERROR
    })
}

fn curate_file(filter: &GenericityFilter, path: &Path, options: &CurateOptions) -> Result<CurationOutcome> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let mut document: AnyDocument = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a signature document", path.display()))?;

    let outcome = match &mut document {
        AnyDocument::Signatures(doc) => curate_document(filter, doc),
        AnyDocument::Symbols(doc) => curate_symbols(filter, doc),
    };

    if options.dry_run || (!outcome.changed() && options.output_dir.is_none()) {
        return Ok(outcome);
    }

    let target = match (&options.output_dir, path.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    };
    let rendered = serde_json::to_string_pretty(&document).context("failed to serialize document")?;
    std::fs::write(&target, rendered).with_context(|| format!("failed to write {}", target.display()))?;
    tracing::debug!("Wrote {}", target.display());
    Ok(outcome)
}

fn print_summary(report: &CurationReport, dry_run: bool) {
    for outcome in report.outcomes.iter().filter(|o| o.changed()) {
        println!(
            "{:<32} {:>6} -> {:<6} ({} generic, {} malformed)",
            outcome.component,
            outcome.original_count,
            outcome.kept,
            outcome.removed.len(),
            outcome.malformed
        );
        for removed in &outcome.removed {
            tracing::debug!("  - {} ({:?})", removed.pattern, removed.verdict);
        }
    }
    let verb = if dry_run { "would remove" } else { "removed" };
    println!(
        "{} documents, {} changed, {verb} {} patterns",
        report.documents, report.changed, report.removed_total
    );
    if !report.unreadable.is_empty() {
        println!("{} documents could not be read", report.unreadable.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::parse_document;
    use serde_json::json;

    fn write_docs(dir: &Path) {
        let doc = json!({
            "component": { "name": "zlib", "version": "1.2.13" },
            "signatures": [
                { "type": "function", "pattern": "deflateInit2_", "confidence": 0.9 },
                { "type": "string", "pattern": "buffer", "confidence": 0.6 }
            ]
        });
        std::fs::write(dir.join("zlib.json"), doc.to_string()).expect("write");
        let symbols = json!({
            "package": "libpng",
            "symbols": ["png_create_read_struct", "init"]
        });
        std::fs::write(dir.join("libpng.json"), symbols.to_string()).expect("write");
    }

    #[test]
    fn test_dry_run_leaves_files_untouched() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        write_docs(tmp.path());
        let before = std::fs::read_to_string(tmp.path().join("zlib.json")).expect("read");

        let options = CurateOptions {
            inputs: vec![tmp.path().to_path_buf()],
            dry_run: true,
            ..CurateOptions::default()
        };
        assert_eq!(run_curate(&AppConfig::default(), &options).expect("runs"), exit_codes::SUCCESS);

        let after = std::fs::read_to_string(tmp.path().join("zlib.json")).expect("read");
        assert_eq!(before, after);
    }

    #[test]
    fn test_curate_rewrites_both_shapes() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        write_docs(tmp.path());
        let out = tmp.path().join("curated");

        let options = CurateOptions {
            inputs: vec![tmp.path().to_path_buf()],
            output_dir: Some(out.clone()),
            ..CurateOptions::default()
        };
        run_curate(&AppConfig::default(), &options).expect("runs");

        let zlib = parse_document(&std::fs::read_to_string(out.join("zlib.json")).expect("read"))
            .expect("parses");
        assert_eq!(zlib.signatures.len(), 1);
        assert_eq!(zlib.signature_metadata.signature_count, 1);

        let libpng: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out.join("libpng.json")).expect("read"))
                .expect("json");
        assert_eq!(libpng["symbols"], json!(["png_create_read_struct"]));
    }

    #[test]
    fn test_unreadable_document_sets_error_code() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        std::fs::write(tmp.path().join("broken.json"), "{ not json").expect("write");
        let options = CurateOptions {
            inputs: vec![tmp.path().to_path_buf()],
            dry_run: true,
            ..CurateOptions::default()
        };
        assert_eq!(run_curate(&AppConfig::default(), &options).expect("runs"), exit_codes::ERROR);
    }
}
