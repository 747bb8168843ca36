//! Directory of signature documents as a store.

use super::{parse_document, LoadedCorpus, SignatureStore};
use crate::error::{CorpusErrorKind, Result, SnifferError};
use crate::model::ComponentId;
use std::path::{Path, PathBuf};

/// File names in a signature directory that are not component documents.
const RESERVED_FILE_NAMES: &[&str] = &["manifest.json", "template.json"];

/// Reads every `*.json` document in one directory.
///
/// Files are visited in name order so component and signature ids are stable
/// between runs. An unreadable or unparsable file is skipped and counted.
#[derive(Debug, Clone)]
pub struct JsonSignatureStore {
    dir: PathBuf,
}

impl JsonSignatureStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Component document paths, sorted.
    pub fn document_paths(&self) -> Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| SnifferError::io(&self.dir, e))?;
        let mut paths: Vec<PathBuf> = entries
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_component_document(path))
            .collect();
        paths.sort();
        Ok(paths)
    }
}

fn is_component_document(path: &Path) -> bool {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let reserved = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| RESERVED_FILE_NAMES.contains(&n));
    is_json && !reserved
}

impl SignatureStore for JsonSignatureStore {
    fn describe(&self) -> String {
        format!("signature directory {}", self.dir.display())
    }

    fn load_all(&self) -> Result<LoadedCorpus> {
        if !self.dir.is_dir() {
            return Err(SnifferError::corpus(
                self.describe(),
                CorpusErrorKind::NotFound(self.dir.display().to_string()),
            ));
        }

        let mut components = Vec::new();
        let mut records = Vec::new();
        let mut skipped_documents = 0;
        let mut next_signature = 1_i64;

        for path in self.document_paths()? {
            let parsed = std::fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|text| parse_document(&text).map_err(|e| e.to_string()));
            let doc = match parsed {
                Ok(doc) => doc,
                Err(err) => {
                    tracing::warn!("Skipping signature document {}: {err}", path.display());
                    skipped_documents += 1;
                    continue;
                }
            };
            let component_id = ComponentId(components.len() as i64 + 1);
            let (component, doc_records) = doc.to_records(component_id, &mut next_signature);
            tracing::debug!(
                "Loaded {} ({} entries) from {}",
                component.name,
                doc_records.len(),
                path.display()
            );
            components.push(component);
            records.extend(doc_records);
        }

        let mut corpus = LoadedCorpus::assemble(components, records);
        corpus.report.skipped_documents = skipped_documents;
        Ok(corpus)
    }
}
