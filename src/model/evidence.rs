//! Raw match evidence and the scored component matches built from it.

use super::{ComponentId, Signature, SignatureId, SignatureType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a piece of evidence was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceKind {
    /// Case-insensitive equality between a feature and a pattern
    Exact,
    /// Pattern contained in a longer feature
    Substring,
    /// Sketch or whole-file similarity against a component
    Fuzzy,
}

impl fmt::Display for EvidenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Substring => write!(f, "substring"),
            Self::Fuzzy => write!(f, "fuzzy"),
        }
    }
}

/// One (signature, feature) correspondence found while matching an artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    /// Absent for synthetic fuzzy evidence
    pub signature_id: Option<SignatureId>,
    pub component_id: ComponentId,
    pub sig_type: SignatureType,
    pub confidence: f64,
    pub matched_pattern: String,
    pub matched_feature: String,
    pub kind: EvidenceKind,
}

impl Evidence {
    /// Exact hit at the signature's full confidence.
    pub fn exact(signature: &Signature, feature: impl Into<String>) -> Self {
        Self {
            signature_id: Some(signature.id),
            component_id: signature.component_id,
            sig_type: signature.sig_type,
            confidence: signature.confidence,
            matched_pattern: signature.pattern.clone(),
            matched_feature: feature.into(),
            kind: EvidenceKind::Exact,
        }
    }

    /// Substring hit at `signature.confidence * discount`.
    pub fn substring(signature: &Signature, feature: impl Into<String>, discount: f64) -> Self {
        Self {
            signature_id: Some(signature.id),
            component_id: signature.component_id,
            sig_type: signature.sig_type,
            confidence: super::clamp_confidence(signature.confidence * discount),
            matched_pattern: signature.pattern.clone(),
            matched_feature: feature.into(),
            kind: EvidenceKind::Substring,
        }
    }

    /// Synthetic similarity evidence for a whole component.
    pub fn fuzzy(
        component_id: ComponentId,
        confidence: f64,
        method: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            signature_id: None,
            component_id,
            sig_type: SignatureType::Pattern,
            confidence: super::clamp_confidence(confidence),
            matched_pattern: method.into(),
            matched_feature: detail.into(),
            kind: EvidenceKind::Fuzzy,
        }
    }

    #[must_use]
    pub const fn is_direct(&self) -> bool {
        matches!(self.kind, EvidenceKind::Exact | EvidenceKind::Substring)
    }
}

/// One matched pattern as reported in a [`EvidenceSummary`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedPattern {
    pub pattern: String,
    pub matched_string: String,
    pub confidence: f64,
    pub kind: EvidenceKind,
}

/// Human-facing digest of the evidence behind a [`ComponentMatch`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceSummary {
    /// Total evidence entries for the component, not just the scored top-K
    pub signatures_matched: usize,
    pub exact_hits: usize,
    pub substring_hits: usize,
    pub fuzzy_hits: usize,
    pub match_method: String,
    /// Aggregate confidence formatted as a percentage
    pub confidence_score: String,
    pub matched_patterns: Vec<MatchedPattern>,
}

/// A confidence-scored identification of a component within one artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentMatch {
    pub component_id: ComponentId,
    /// Display name, `name@version` when the version is known
    pub component: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub ecosystem: String,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    pub match_type: SignatureType,
    pub evidence: EvidenceSummary,
}

impl ComponentMatch {
    /// Confidence as a whole percentage, for display.
    #[must_use]
    pub fn confidence_percent(&self) -> f64 {
        (self.confidence * 1000.0).round() / 10.0
    }
}
