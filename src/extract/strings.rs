//! Printable string runs from raw bytes.

use super::FeatureExtractor;
use crate::error::{Result, SnifferError};
use crate::model::ExtractedFeatures;
use std::collections::HashSet;
use std::path::Path;

/// Extracts runs of printable ASCII, like `strings(1)`.
///
/// Runs are trimmed and deduplicated in first-seen order. At most
/// `max_strings` distinct runs are kept.
#[derive(Debug, Clone, Copy)]
pub struct PrintableStringsExtractor {
    min_len: usize,
    max_strings: usize,
}

impl Default for PrintableStringsExtractor {
    fn default() -> Self {
        Self::new(4, 100_000)
    }
}

impl PrintableStringsExtractor {
    pub fn new(min_len: usize, max_strings: usize) -> Self {
        Self {
            min_len: min_len.max(1),
            max_strings,
        }
    }

    /// Printable runs of `data`.
    pub fn strings_from_bytes(&self, data: &[u8]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let mut push = |run: &[u8], out: &mut Vec<String>| {
            let text = String::from_utf8_lossy(run);
            let text = text.trim();
            if text.len() >= self.min_len && seen.insert(text.to_string()) {
                out.push(text.to_string());
            }
        };

        let mut start = None;
        for (i, &byte) in data.iter().enumerate() {
            if out.len() >= self.max_strings {
                return out;
            }
            let printable = byte == b'\t' || (0x20..0x7f).contains(&byte);
            match (printable, start) {
                (true, None) => start = Some(i),
                (false, Some(s)) => {
                    push(&data[s..i], &mut out);
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            if out.len() < self.max_strings {
                push(&data[s..], &mut out);
            }
        }
        out
    }
}

impl FeatureExtractor for PrintableStringsExtractor {
    fn name(&self) -> &'static str {
        "printable-strings"
    }

    fn can_extract(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn extract(&self, path: &Path) -> Result<ExtractedFeatures> {
        let data = std::fs::read(path).map_err(|e| SnifferError::io(path, e))?;
        Ok(ExtractedFeatures::from_strings(self.strings_from_bytes(&data)))
    }
}
