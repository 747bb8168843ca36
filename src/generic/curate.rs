//! Offline corpus curation with the live genericity rule.

use super::{GenericityFilter, Verdict};
use crate::corpus::{SignatureDocument, SymbolDocument};
use serde::Serialize;

/// A pattern removed during curation and the rule that removed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovedPattern {
    pub pattern: String,
    pub verdict: Verdict,
}

/// Result of curating one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CurationOutcome {
    pub component: String,
    pub original_count: usize,
    pub kept: usize,
    pub removed: Vec<RemovedPattern>,
    /// Entries that could not be decoded and were dropped
    pub malformed: usize,
}

impl CurationOutcome {
    pub fn removed_count(&self) -> usize {
        self.removed.len() + self.malformed
    }

    pub fn changed(&self) -> bool {
        self.removed_count() > 0
    }
}

/// Drop generic and undecodable signatures from a document in place.
///
/// `signature_metadata.signature_count` is updated to the surviving count.
pub fn curate_document(filter: &GenericityFilter, doc: &mut SignatureDocument) -> CurationOutcome {
    let mut outcome = CurationOutcome {
        component: doc.component.name.clone(),
        original_count: doc.signatures.len(),
        ..CurationOutcome::default()
    };

    let entries = std::mem::take(&mut doc.signatures);
    for raw in entries {
        let pattern = match crate::corpus::SignatureEntry::decode(&raw) {
            Ok(entry) => entry.pattern,
            Err(err) => {
                tracing::debug!("{}: dropping malformed entry: {err}", outcome.component);
                outcome.malformed += 1;
                continue;
            }
        };
        let verdict = filter.classify(&pattern);
        if verdict.is_generic() {
            outcome.removed.push(RemovedPattern { pattern, verdict });
        } else {
            doc.signatures.push(raw);
        }
    }

    outcome.kept = doc.signatures.len();
    doc.signature_metadata.signature_count = outcome.kept;
    outcome
}

/// Drop generic symbols from a legacy symbol document in place.
pub fn curate_symbols(filter: &GenericityFilter, doc: &mut SymbolDocument) -> CurationOutcome {
    let original_count = doc.symbols.len();
    let mut removed = Vec::new();
    doc.symbols.retain(|symbol| {
        let verdict = filter.classify(symbol);
        if verdict.is_generic() {
            removed.push(RemovedPattern {
                pattern: symbol.clone(),
                verdict,
            });
            false
        } else {
            true
        }
    });

    CurationOutcome {
        component: doc.package.clone(),
        original_count,
        kept: doc.symbols.len(),
        removed,
        malformed: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{parse_document, SignatureEntry};

    fn entry(pattern: &str) -> SignatureEntry {
        SignatureEntry {
            id: None,
            sig_type: "string_pattern".to_string(),
            pattern: pattern.to_string(),
            confidence: 0.9,
            context: None,
            platforms: Vec::new(),
        }
    }

    #[test]
    fn test_curate_removes_generic_entries() {
        let mut doc = SignatureDocument::new("libpng");
        for p in ["png_create_read_struct", "init", "http", "get_value", "png_set_IHDR"] {
            doc.push_signature(&entry(p));
        }
        doc.signatures.push(serde_json::json!({"type": "string_pattern"}));

        let outcome = curate_document(&GenericityFilter::new(), &mut doc);

        assert_eq!(outcome.original_count, 6);
        assert_eq!(outcome.kept, 2);
        assert_eq!(outcome.removed.len(), 3);
        assert_eq!(outcome.malformed, 1);
        assert_eq!(doc.signature_metadata.signature_count, 2);
        assert!(outcome
            .removed
            .iter()
            .any(|r| r.pattern == "get_value" && r.verdict == Verdict::GenericTokens));
    }

    #[test]
    fn test_curated_document_reparses() {
        let mut doc = SignatureDocument::new("zlib");
        doc.push_signature(&entry("deflateInit2_"));
        doc.push_signature(&entry("crc32"));
        curate_document(&GenericityFilter::new(), &mut doc);

        let json = serde_json::to_string(&doc).expect("serializes");
        let reparsed = parse_document(&json).expect("reparses");
        assert_eq!(reparsed.signatures.len(), 1);
    }

    #[test]
    fn test_curate_symbols() {
        let mut doc = SymbolDocument {
            package: "Foo".to_string(),
            version: None,
            publisher: None,
            license: None,
            updated: None,
            symbols: vec!["free".to_string(), "foo_bar_baz".to_string()],
        };
        let outcome = curate_symbols(&GenericityFilter::new(), &mut doc);
        assert_eq!(doc.symbols, vec!["foo_bar_baz"]);
        assert_eq!(outcome.removed_count(), 1);
    }
}
