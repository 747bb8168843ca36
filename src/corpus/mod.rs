//! Signature corpus storage and the in-memory corpus cache.
//!
//! A [`SignatureStore`] owns the persistent (component, signature) set and
//! hands it over in bulk through [`SignatureStore::load_all`]. Raw rows and
//! document entries are decoded into typed records at this boundary; a record
//! that fails to decode is skipped and counted in the [`LoadReport`].
//!
//! [`CorpusCache`] is built once per session from a store and shared
//! read-only (behind `Arc`) by every matcher and worker.

mod cache;
mod document;
mod json_dir;
mod memory;
mod sqlite;

pub use cache::{CacheStats, CachedSignature, CorpusCache};
pub use document::{
    parse_document, AnyDocument, DocumentComponent, SignatureDocument, SignatureEntry,
    SignatureMetadata, SymbolDocument, DEFAULT_SIGNATURE_CONFIDENCE,
};
pub use json_dir::JsonSignatureStore;
pub use memory::MemoryStore;
pub use sqlite::{ImportSummary, SqliteSignatureStore};

use crate::config::{CorpusConfig, CorpusFormat};
use crate::error::{CorpusErrorKind, RecordDecodeError, Result, SnifferError};
use crate::model::{Component, ComponentId, Signature};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Bulk read access to a signature corpus.
pub trait SignatureStore: Send + Sync {
    /// Short description used in logs.
    fn describe(&self) -> String;

    /// Every decodable signature joined with its component.
    ///
    /// Returns an error only when the store as a whole cannot be read.
    fn load_all(&self) -> Result<LoadedCorpus>;
}

/// Counters describing one corpus load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Signature records seen
    pub total_records: usize,
    /// Records decoded and kept
    pub loaded: usize,
    /// Records that failed to decode
    pub skipped: usize,
    /// Records referencing a component that does not exist
    pub orphaned: usize,
    /// Components in the store
    pub components: usize,
    /// Whole documents or files that could not be parsed
    pub skipped_documents: usize,
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} components, {}/{} signatures loaded ({} undecodable, {} orphaned)",
            self.components, self.loaded, self.total_records, self.skipped, self.orphaned
        )?;
        if self.skipped_documents > 0 {
            write!(f, ", {} unreadable documents", self.skipped_documents)?;
        }
        Ok(())
    }
}

/// Typed contents of a store.
#[derive(Debug, Clone, Default)]
pub struct LoadedCorpus {
    pub components: HashMap<ComponentId, Component>,
    pub signatures: Vec<Signature>,
    pub report: LoadReport,
}

impl LoadedCorpus {
    /// Assemble decoded components and per-record decode results.
    ///
    /// Failed records are counted and logged at debug level; orphaned
    /// signatures are dropped. A single warning summarizes any skips.
    pub fn assemble<I>(components: Vec<Component>, records: I) -> Self
    where
        I: IntoIterator<Item = (String, std::result::Result<Signature, RecordDecodeError>)>,
    {
        let components: HashMap<ComponentId, Component> =
            components.into_iter().map(|c| (c.id, c)).collect();
        let mut report = LoadReport {
            components: components.len(),
            ..LoadReport::default()
        };
        let mut signatures = Vec::new();

        for (label, record) in records {
            report.total_records += 1;
            match record {
                Ok(sig) if components.contains_key(&sig.component_id) => {
                    report.loaded += 1;
                    signatures.push(sig);
                }
                Ok(sig) => {
                    report.orphaned += 1;
                    tracing::debug!(
                        "{label}: {}",
                        RecordDecodeError::OrphanSignature(sig.component_id.value())
                    );
                }
                Err(err) => {
                    report.skipped += 1;
                    tracing::debug!("{label}: skipping record: {err}");
                }
            }
        }

        if report.skipped > 0 || report.orphaned > 0 {
            tracing::warn!(
                "Skipped {} undecodable and {} orphaned signature records",
                report.skipped,
                report.orphaned
            );
        }

        Self {
            components,
            signatures,
            report,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

/// Open the store described by configuration.
///
/// `Auto` picks the JSON store for directories and SQLite for files.
pub fn open_store(config: &CorpusConfig) -> Result<Box<dyn SignatureStore>> {
    let path = config.path.as_deref().ok_or_else(|| {
        SnifferError::corpus(
            "no corpus path configured",
            CorpusErrorKind::NotFound("<unset>".to_string()),
        )
    })?;

    let format = match config.format {
        CorpusFormat::Auto if path.is_dir() => CorpusFormat::Json,
        CorpusFormat::Auto => CorpusFormat::Sqlite,
        other => other,
    };

    match format {
        CorpusFormat::Json => Ok(Box::new(JsonSignatureStore::new(path))),
        _ => Ok(Box::new(SqliteSignatureStore::open_read_only(path)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SignatureType;

    #[test]
    fn test_assemble_counts_skips_and_orphans() {
        let components = vec![Component::new(1, "zlib")];
        let records = vec![
            (
                "a".to_string(),
                Ok(Signature::new(1, 1, "deflateInit2_", SignatureType::Function, 0.9)),
            ),
            ("b".to_string(), Err(RecordDecodeError::InvalidUtf8)),
            (
                "c".to_string(),
                Ok(Signature::new(3, 99, "orphan_pattern", SignatureType::String, 0.9)),
            ),
        ];

        let corpus = LoadedCorpus::assemble(components, records);

        assert_eq!(corpus.signatures.len(), 1);
        assert_eq!(
            corpus.report,
            LoadReport {
                total_records: 3,
                loaded: 1,
                skipped: 1,
                orphaned: 1,
                components: 1,
                skipped_documents: 0,
            }
        );
    }

    #[test]
    fn test_open_store_without_path() {
        let err = open_store(&CorpusConfig::default()).err().expect("no path");
        assert!(err.is_corpus_unavailable());
    }
}
