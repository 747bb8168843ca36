//! Signature patterns and their types.

use super::{ComponentId, SignatureId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of program artifact a signature pattern was taken from.
///
/// The store persists these as integer codes 1..=4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureType {
    String,
    Function,
    Constant,
    /// Compound or prefix pattern
    Pattern,
}

impl SignatureType {
    /// All types, highest tie-break priority first.
    pub const BY_PRIORITY: [Self; 4] = [Self::String, Self::Function, Self::Constant, Self::Pattern];

    /// Integer code used by the SQLite store.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::String => 1,
            Self::Function => 2,
            Self::Constant => 3,
            Self::Pattern => 4,
        }
    }

    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::String),
            2 => Some(Self::Function),
            3 => Some(Self::Constant),
            4 => Some(Self::Pattern),
            _ => None,
        }
    }

    /// Map a document `type` label onto a signature type.
    ///
    /// Documents use labels such as `string_pattern`, `function_pattern` or
    /// `prefix_pattern`. Anything that names neither a string, a function nor
    /// a constant is treated as a compound pattern.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_ascii_lowercase();
        if label.starts_with("function") || label == "func" || label == "symbol_function" {
            Self::Function
        } else if label.starts_with("constant") || label == "const" {
            Self::Constant
        } else if label.starts_with("string") || label == "symbol" || label.is_empty() {
            Self::String
        } else {
            Self::Pattern
        }
    }

    /// Tie-break rank; lower wins.
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::String => 0,
            Self::Function => 1,
            Self::Constant => 2,
            Self::Pattern => 3,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Function => "function",
            Self::Constant => "constant",
            Self::Pattern => "pattern",
        }
    }
}

impl fmt::Display for SignatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clamp a confidence value into `[0, 1]`, mapping NaN to 0.
#[must_use]
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// A text pattern indicating the presence of one component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    pub id: SignatureId,
    pub component_id: ComponentId,
    pub pattern: String,
    pub sig_type: SignatureType,
    /// Weight in `[0, 1]`
    pub confidence: f64,
    /// Stored MinHash values over the pattern's character trigrams
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuzzy_sketch: Option<Vec<u64>>,
}

impl Signature {
    /// Create a signature. The confidence is clamped into `[0, 1]`.
    pub fn new(
        id: impl Into<SignatureId>,
        component_id: impl Into<ComponentId>,
        pattern: impl Into<String>,
        sig_type: SignatureType,
        confidence: f64,
    ) -> Self {
        Self {
            id: id.into(),
            component_id: component_id.into(),
            pattern: pattern.into(),
            sig_type,
            confidence: clamp_confidence(confidence),
            fuzzy_sketch: None,
        }
    }

    #[must_use]
    pub fn with_sketch(mut self, sketch: Vec<u64>) -> Self {
        self.fuzzy_sketch = Some(sketch);
        self
    }
}
