//! Import command handler.
//!
//! Loads signature documents (either shape) into a SQLite corpus.

use super::document_paths;
use crate::config::AppConfig;
use crate::corpus::{parse_document, ImportSummary, SqliteSignatureStore};
use crate::generic::GenericityFilter;
use crate::matching::MinHasher;
use crate::pipeline::exit_codes;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Options for the import command.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Documents or directories of documents
    pub inputs: Vec<PathBuf>,
    /// Database to create or extend
    pub database: PathBuf,
    /// Keep generic patterns instead of dropping them
    pub keep_generic: bool,
    /// Skip per-signature MinHash sketches
    pub no_sketches: bool,
}

/// Run the import command
pub fn run_import(config: &AppConfig, options: &ImportOptions) -> Result<i32> {
    let store = SqliteSignatureStore::create(&options.database)
        .with_context(|| format!("failed to open {}", options.database.display()))?;
    let filter = GenericityFilter::from_config(&config.genericity);
    let hasher = MinHasher::from_config(&config.fuzzy);

    let filter = (!options.keep_generic).then_some(&filter);
    let hasher = (!options.no_sketches).then_some(&hasher);

    let mut totals = ImportSummary::default();
    let mut failed = 0usize;
    for path in document_paths(&options.inputs)? {
        let parsed = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))
            .and_then(|text| {
                parse_document(&text)
                    .with_context(|| format!("{} is not a signature document", path.display()))
            });
        let document = match parsed {
            Ok(document) => document,
            Err(err) => {
                tracing::warn!("Skipping {err:#}");
                failed += 1;
                continue;
            }
        };

        let summary = match store.import_document(&document, filter, hasher) {
            Ok(summary) => summary,
            Err(err) => {
                tracing::error!("Import of {} failed: {err}", path.display());
                failed += 1;
                continue;
            }
        };
        tracing::info!(
            "{}: {} inserted, {} duplicate, {} generic, {} rejected",
            summary.component,
            summary.inserted,
            summary.duplicates,
            summary.filtered,
            summary.rejected
        );
        totals.inserted += summary.inserted;
        totals.duplicates += summary.duplicates;
        totals.filtered += summary.filtered;
        totals.rejected += summary.rejected;
    }

    let stored = store.signature_count()?;
    println!(
        "Imported into {}: {} new signatures ({} duplicates, {} generic dropped, {} rejected); {} stored in total",
        options.database.display(),
        totals.inserted,
        totals.duplicates,
        totals.filtered,
        totals.rejected,
        stored
    );
    if failed > 0 {
        println!("{failed} documents could not be imported");
        return Ok(exit_codes::ERROR);
    }
    Ok(exit_codes::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::SignatureStore;
    use serde_json::json;

    #[test]
    fn test_import_then_load() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        let docs = tmp.path().join("docs");
        std::fs::create_dir(&docs).expect("mkdir");
        let doc = json!({
            "component": { "name": "zlib", "version": "1.2.13", "license": "Zlib" },
            "signatures": [
                { "type": "function", "pattern": "deflateInit2_", "confidence": 0.9 },
                { "type": "function", "pattern": "inflateEnd", "confidence": 0.8 },
                { "type": "string", "pattern": "buffer", "confidence": 0.6 }
            ]
        });
        std::fs::write(docs.join("zlib.json"), doc.to_string()).expect("write");

        let options = ImportOptions {
            inputs: vec![docs],
            database: tmp.path().join("signatures.db"),
            ..ImportOptions::default()
        };
        assert_eq!(run_import(&AppConfig::default(), &options).expect("runs"), exit_codes::SUCCESS);

        let store = SqliteSignatureStore::open_read_only(&options.database).expect("opens");
        let loaded = store.load_all().expect("loads");
        assert_eq!(loaded.signatures.len(), 2);
        assert!(loaded.signatures.iter().all(|s| s.fuzzy_sketch.is_some()));
    }

    #[test]
    fn test_import_counts_unparsable_documents() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        let bad = tmp.path().join("bad.json");
        std::fs::write(&bad, "[1, 2, 3]").expect("write");

        let options = ImportOptions {
            inputs: vec![bad],
            database: tmp.path().join("signatures.db"),
            keep_generic: true,
            no_sketches: true,
        };
        assert_eq!(run_import(&AppConfig::default(), &options).expect("runs"), exit_codes::ERROR);
    }
}
