//! In-memory signature store.

use super::{LoadedCorpus, SignatureDocument, SignatureStore};
use crate::error::Result;
use crate::model::{Component, ComponentId, Signature};

/// A store held entirely in memory.
///
/// Accepts typed records directly and signature documents, which are given
/// ids after the highest typed id.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    components: Vec<Component>,
    signatures: Vec<Signature>,
    documents: Vec<SignatureDocument>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_component(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }

    #[must_use]
    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signatures.push(signature);
        self
    }

    #[must_use]
    pub fn with_document(mut self, document: SignatureDocument) -> Self {
        self.documents.push(document);
        self
    }

    pub fn add_document(&mut self, document: SignatureDocument) {
        self.documents.push(document);
    }
}

impl SignatureStore for MemoryStore {
    fn describe(&self) -> String {
        format!(
            "in-memory store ({} components, {} documents)",
            self.components.len(),
            self.documents.len()
        )
    }

    fn load_all(&self) -> Result<LoadedCorpus> {
        let mut components = self.components.clone();
        let mut records: Vec<_> = self
            .signatures
            .iter()
            .map(|s| (format!("signature {}", s.id), Ok(s.clone())))
            .collect();

        let mut next_component = components.iter().map(|c| c.id.value()).max().unwrap_or(0) + 1;
        let mut next_signature = self.signatures.iter().map(|s| s.id.value()).max().unwrap_or(0) + 1;

        for doc in &self.documents {
            let (component, doc_records) =
                doc.to_records(ComponentId(next_component), &mut next_signature);
            next_component += 1;
            components.push(component);
            records.extend(doc_records);
        }

        Ok(LoadedCorpus::assemble(components, records))
    }
}
