//! Feature vectors produced by extractors.

use serde::{Deserialize, Serialize};

/// Textual and symbolic features of one artifact.
///
/// Lists are unordered and may contain duplicates. Extractors are expected to
/// cap their volume; nothing here enforces a bound.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractedFeatures {
    pub strings: Vec<String>,
    pub functions: Vec<String>,
    pub constants: Vec<String>,
    pub symbols: Vec<String>,
}

impl ExtractedFeatures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Features consisting only of strings.
    pub fn from_strings<I, S>(strings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            strings: strings.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_functions<I, S>(mut self, functions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.functions.extend(functions.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_constants<I, S>(mut self, constants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constants.extend(constants.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_symbols<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.symbols.extend(symbols.into_iter().map(Into::into));
        self
    }

    /// Iterate over every feature of every kind.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.strings
            .iter()
            .chain(&self.functions)
            .chain(&self.constants)
            .chain(&self.symbols)
            .map(String::as_str)
    }

    /// Total number of features, duplicates included.
    pub fn total(&self) -> usize {
        self.strings.len() + self.functions.len() + self.constants.len() + self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Append all features of `other`.
    pub fn merge(&mut self, other: Self) {
        self.strings.extend(other.strings);
        self.functions.extend(other.functions);
        self.constants.extend(other.constants);
        self.symbols.extend(other.symbols);
    }
}
