//! Per-file and per-batch analysis results.

use super::ComponentMatch;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Outcome of analyzing one file.
///
/// A failed file carries `error` and no matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub file_path: String,
    pub file_size: u64,
    pub features_extracted: usize,
    pub matches: Vec<ComponentMatch>,
    pub analysis_time_ms: u64,
    pub analyzed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResult {
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            file_size: 0,
            features_extracted: 0,
            matches: Vec::new(),
            analysis_time_ms: 0,
            analyzed_at: Utc::now(),
            error: None,
        }
    }

    /// A result recording that the file could not be analyzed.
    pub fn failed(file_path: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::new(file_path)
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn has_matches(&self) -> bool {
        !self.matches.is_empty()
    }

    /// Display names of all matched components, in rank order.
    pub fn component_names(&self) -> Vec<&str> {
        self.matches.iter().map(|m| m.component.as_str()).collect()
    }
}

/// Results of analyzing many files, keyed by path.
///
/// Adding a result for a path already present replaces it, so the map always
/// holds exactly one entry per distinct path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchAnalysisResult {
    pub results: IndexMap<String, AnalysisResult>,
    pub total_time_ms: u64,
}

impl BatchAnalysisResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a result, replacing any earlier one for the same path.
    pub fn add_result(&mut self, result: AnalysisResult) {
        self.results.insert(result.file_path.clone(), result);
    }

    pub fn get(&self, path: &str) -> Option<&AnalysisResult> {
        self.results.get(path)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnalysisResult> {
        self.results.values()
    }

    pub fn successful(&self) -> impl Iterator<Item = &AnalysisResult> {
        self.iter().filter(|r| r.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &AnalysisResult> {
        self.iter().filter(|r| !r.is_success())
    }

    pub fn failure_count(&self) -> usize {
        self.failed().count()
    }

    pub fn total_matches(&self) -> usize {
        self.iter().map(|r| r.matches.len()).sum()
    }

    /// Distinct component display names across all files, sorted.
    pub fn unique_components(&self) -> BTreeSet<&str> {
        self.iter()
            .flat_map(|r| r.matches.iter().map(|m| m.component.as_str()))
            .collect()
    }
}
