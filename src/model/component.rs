//! Components known to the signature corpus.

use super::ComponentId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Version placeholder that is never shown in display names.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Ecosystem assigned when the store carries none.
pub const DEFAULT_ECOSYSTEM: &str = "native";

/// A third-party component that signatures can identify.
///
/// Immutable once the corpus is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: ComponentId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub ecosystem: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Free-form metadata carried through from the store
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
    /// Whole-file fuzzy hash of a reference build, if the corpus has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whole_file_hash: Option<String>,
}

impl Component {
    /// Create a component with the default ecosystem and no optional fields.
    pub fn new(id: impl Into<ComponentId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: None,
            ecosystem: DEFAULT_ECOSYSTEM.to_string(),
            license: None,
            publisher: None,
            category: None,
            description: None,
            metadata: Map::new(),
            whole_file_hash: None,
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    #[must_use]
    pub fn with_ecosystem(mut self, ecosystem: impl Into<String>) -> Self {
        self.ecosystem = ecosystem.into();
        self
    }

    #[must_use]
    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = Some(license.into());
        self
    }

    #[must_use]
    pub fn with_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = Some(publisher.into());
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn with_whole_file_hash(mut self, hash: impl Into<String>) -> Self {
        self.whole_file_hash = Some(hash.into());
        self
    }

    /// The version, unless it is absent, blank or the `unknown` placeholder.
    pub fn known_version(&self) -> Option<&str> {
        self.version
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case(UNKNOWN_VERSION))
    }

    /// `name@version` when the version is known, otherwise just the name.
    pub fn display_name(&self) -> String {
        match self.known_version() {
            Some(version) => format!("{}@{}", self.name, version),
            None => self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_with_version() {
        let c = Component::new(1, "ffmpeg").with_version("4.4.1");
        assert_eq!(c.display_name(), "ffmpeg@4.4.1");
    }

    #[test]
    fn test_display_name_suppresses_unknown() {
        let c = Component::new(1, "zlib").with_version("unknown");
        assert_eq!(c.display_name(), "zlib");
        let c = Component::new(1, "zlib").with_version("UNKNOWN");
        assert_eq!(c.display_name(), "zlib");
        let c = Component::new(1, "zlib").with_version("  ");
        assert_eq!(c.display_name(), "zlib");
        assert_eq!(Component::new(2, "zlib").display_name(), "zlib");
    }

    #[test]
    fn test_default_ecosystem() {
        assert_eq!(Component::new(1, "x").ecosystem, DEFAULT_ECOSYSTEM);
    }
}
