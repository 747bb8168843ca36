//! Signature documents: the JSON files signature corpora are authored in.
//!
//! A document describes one component and its signatures. Signature entries
//! are kept as raw JSON values and decoded one at a time, so a single bad
//! entry is skipped instead of rejecting the whole document.

use crate::error::RecordDecodeError;
use crate::model::{clamp_confidence, Component, ComponentId, Signature, SignatureId, SignatureType};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Confidence used when an entry carries none.
pub const DEFAULT_SIGNATURE_CONFIDENCE: f64 = 0.5;

/// Legacy symbol lists shorter than this are dropped on conversion.
const MIN_SYMBOL_LEN: usize = 3;

/// Component section of a signature document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentComponent {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ecosystem: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Provenance section of a signature document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignatureMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(default)]
    pub signature_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One decoded signature entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub sig_type: String,
    pub pattern: String,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default)]
    pub platforms: Vec<String>,
}

fn default_confidence() -> f64 {
    DEFAULT_SIGNATURE_CONFIDENCE
}

impl SignatureEntry {
    /// Decode and validate one raw entry.
    pub fn decode(raw: &Value) -> Result<Self, RecordDecodeError> {
        let entry: Self = serde_json::from_value(raw.clone())
            .map_err(|e| RecordDecodeError::MalformedEntry(e.to_string()))?;
        if entry.pattern.trim().is_empty() {
            return Err(RecordDecodeError::EmptyPattern);
        }
        if !entry.confidence.is_finite() {
            return Err(RecordDecodeError::InvalidConfidence(entry.confidence));
        }
        Ok(entry)
    }

    /// Typed signature for this entry.
    pub fn to_signature(&self, id: SignatureId, component_id: ComponentId) -> Signature {
        Signature::new(
            id,
            component_id,
            self.pattern.clone(),
            SignatureType::from_label(&self.sig_type),
            self.confidence,
        )
    }
}

/// A component together with its signatures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureDocument {
    pub component: DocumentComponent,
    #[serde(default)]
    pub signature_metadata: SignatureMetadata,
    #[serde(default)]
    pub signatures: Vec<Value>,
    /// Whole-file fuzzy hash of a reference build
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tlsh_hash: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SignatureDocument {
    /// An empty document for the named component.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            component: DocumentComponent {
                name: name.into(),
                ..DocumentComponent::default()
            },
            signature_metadata: SignatureMetadata::default(),
            signatures: Vec::new(),
            tlsh_hash: None,
            extra: Map::new(),
        }
    }

    /// Append an entry and keep `signature_count` current.
    pub fn push_signature(&mut self, entry: &SignatureEntry) {
        if let Ok(value) = serde_json::to_value(entry) {
            self.signatures.push(value);
            self.signature_metadata.signature_count = self.signatures.len();
        }
    }

    /// Component record for this document under the given id.
    ///
    /// The ecosystem falls back to an `ecosystem` key inside the component's
    /// `metadata` object, then to the default ecosystem.
    pub fn to_component(&self, id: ComponentId) -> Component {
        let doc = &self.component;
        let mut component = Component::new(id, doc.name.clone());
        component.version = doc.version.clone();
        component.license = doc.license.clone();
        component.publisher = doc.publisher.clone();
        component.category = doc.category.clone();
        component.description = doc.description.clone();
        component.whole_file_hash = self.tlsh_hash.clone();
        component.metadata = doc.extra.clone();
        if !doc.platforms.is_empty() {
            component
                .metadata
                .insert("platforms".to_string(), Value::from(doc.platforms.clone()));
        }
        if !doc.languages.is_empty() {
            component
                .metadata
                .insert("languages".to_string(), Value::from(doc.languages.clone()));
        }
        let ecosystem = doc.ecosystem.clone().or_else(|| {
            doc.extra
                .get("metadata")
                .and_then(|m| m.get("ecosystem"))
                .and_then(Value::as_str)
                .map(str::to_string)
        });
        if let Some(ecosystem) = ecosystem.filter(|e| !e.trim().is_empty()) {
            component.ecosystem = ecosystem;
        }
        component
    }

    /// Decode every entry, preserving per-entry failures.
    pub fn decode_entries(&self) -> impl Iterator<Item = Result<SignatureEntry, RecordDecodeError>> + '_ {
        self.signatures.iter().map(SignatureEntry::decode)
    }

    /// Typed records for this document.
    ///
    /// Signature ids are assigned sequentially from `next_signature_id`,
    /// which is advanced past every entry (decodable or not). Each record is
    /// labelled `<component>#<index>` for load diagnostics.
    pub fn to_records(
        &self,
        component_id: ComponentId,
        next_signature_id: &mut i64,
    ) -> (Component, Vec<(String, Result<Signature, RecordDecodeError>)>) {
        let component = self.to_component(component_id);
        let records = self
            .decode_entries()
            .enumerate()
            .map(|(index, entry)| {
                let id = SignatureId(*next_signature_id);
                *next_signature_id += 1;
                let label = format!("{}#{index}", self.component.name);
                (label, entry.map(|e| e.to_signature(id, component_id)))
            })
            .collect();
        (component, records)
    }
}

/// The older flat format: a package name and a bare symbol list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolDocument {
    pub package: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    pub symbols: Vec<String>,
}

impl SymbolDocument {
    /// Convert into a [`SignatureDocument`].
    ///
    /// Symbols shorter than three characters are dropped. Confidence starts
    /// at 0.7, rises to 0.8 for long symbols, 0.85 for well-known library
    /// prefixes and 0.9 when the symbol names the package or publisher.
    pub fn into_signature_document(self) -> SignatureDocument {
        let package_word = self
            .package
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_lowercase();
        let publisher = self.publisher.clone().unwrap_or_default().to_lowercase();
        let id_stem = self.package.to_lowercase().replace([' ', '-'], "_");

        let mut doc = SignatureDocument::new(self.package.clone());
        doc.component.version = self.version.clone().or_else(|| Some("unknown".to_string()));
        doc.component.license = self.license.clone();
        doc.component.publisher = self.publisher.clone();
        doc.component.category = Some("imported".to_string());
        doc.signature_metadata.updated = self.updated.clone();
        doc.signature_metadata.source = Some("symbol_list".to_string());

        for (i, symbol) in self.symbols.iter().enumerate() {
            if symbol.chars().count() < MIN_SYMBOL_LEN {
                continue;
            }
            let lower = symbol.to_lowercase();
            let mut confidence = 0.7;
            if symbol.len() > 10 {
                confidence = 0.8;
            }
            if (!package_word.is_empty() && lower.contains(&package_word))
                || (!publisher.is_empty() && lower.contains(&publisher))
            {
                confidence = 0.9;
            }
            if ["com_", "org_", "lib", "av_", "google_", "facebook_"]
                .iter()
                .any(|p| symbol.starts_with(p))
            {
                confidence = 0.85;
            }
            doc.push_signature(&SignatureEntry {
                id: Some(format!("{id_stem}_{i}")),
                sig_type: "string_pattern".to_string(),
                pattern: symbol.clone(),
                confidence: clamp_confidence(confidence),
                context: None,
                platforms: vec!["all".to_string()],
            });
        }
        doc
    }
}

/// Either document shape, as found on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnyDocument {
    Signatures(SignatureDocument),
    Symbols(SymbolDocument),
}

impl AnyDocument {
    /// Normalize to a [`SignatureDocument`].
    pub fn into_signature_document(self) -> SignatureDocument {
        match self {
            Self::Signatures(doc) => doc,
            Self::Symbols(doc) => doc.into_signature_document(),
        }
    }
}

/// Parse either document shape from JSON text.
pub fn parse_document(json: &str) -> Result<SignatureDocument, serde_json::Error> {
    serde_json::from_str::<AnyDocument>(json).map(AnyDocument::into_signature_document)
}
