//! Default configurations and presets for binsniff.
//!
//! Provides named presets for common use cases and default values.

use super::types::{AppConfig, FuzzyConfig, MatchingConfig};

/// Default minimum aggregate confidence for a reported match.
pub const DEFAULT_MATCHING_THRESHOLD: f64 = 0.3;

// ============================================================================
// Configuration Presets
// ============================================================================

/// Named configuration presets for common use cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPreset {
    /// Default balanced settings suitable for most cases
    Balanced,
    /// Fewer, higher-confidence matches
    Strict,
    /// Lower threshold with the fuzzy backstop on sparse evidence
    Permissive,
    /// Fuzzy similarity on every file
    Deep,
}

impl ConfigPreset {
    /// Get the preset name as a string.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Balanced => "balanced",
            Self::Strict => "strict",
            Self::Permissive => "permissive",
            Self::Deep => "deep",
        }
    }

    /// Parse a preset from a string name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "balanced" | "default" => Some(Self::Balanced),
            "strict" | "precise" => Some(Self::Strict),
            "permissive" | "loose" => Some(Self::Permissive),
            "deep" | "thorough" => Some(Self::Deep),
            _ => None,
        }
    }

    /// Get a description of this preset.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Balanced => "Threshold 0.3, direct matching only",
            Self::Strict => "Threshold 0.5 and at most 3 substring hits per signature",
            Self::Permissive => "Threshold 0.2 with the fuzzy backstop on sparse evidence",
            Self::Deep => "Direct matching plus fuzzy similarity for every file",
        }
    }

    /// Get all available presets.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Balanced, Self::Strict, Self::Permissive, Self::Deep]
    }
}

impl std::fmt::Display for ConfigPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Preset Implementations
// ============================================================================

impl AppConfig {
    /// Create an `AppConfig` from a named preset.
    #[must_use]
    pub fn from_preset(preset: ConfigPreset) -> Self {
        match preset {
            ConfigPreset::Balanced => Self::default(),
            ConfigPreset::Strict => Self::strict_preset(),
            ConfigPreset::Permissive => Self::permissive_preset(),
            ConfigPreset::Deep => Self::deep_preset(),
        }
    }

    /// Strict preset.
    #[must_use]
    pub fn strict_preset() -> Self {
        Self {
            matching: MatchingConfig {
                threshold: 0.5,
                max_substring_hits: 3,
                ..MatchingConfig::default()
            },
            ..Self::default()
        }
    }

    /// Permissive preset.
    #[must_use]
    pub fn permissive_preset() -> Self {
        Self {
            matching: MatchingConfig {
                threshold: 0.2,
                ..MatchingConfig::default()
            },
            fuzzy: FuzzyConfig {
                auto_backstop: true,
                ..FuzzyConfig::default()
            },
            ..Self::default()
        }
    }

    /// Deep preset.
    #[must_use]
    pub fn deep_preset() -> Self {
        Self {
            fuzzy: FuzzyConfig {
                deep: true,
                ..FuzzyConfig::default()
            },
            ..Self::default()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_from_name() {
        assert_eq!(ConfigPreset::from_name("default"), Some(ConfigPreset::Balanced));
        assert_eq!(ConfigPreset::from_name("STRICT"), Some(ConfigPreset::Strict));
        assert_eq!(ConfigPreset::from_name("loose"), Some(ConfigPreset::Permissive));
        assert_eq!(ConfigPreset::from_name("invalid"), None);
        for preset in ConfigPreset::all() {
            assert_eq!(ConfigPreset::from_name(preset.name()), Some(*preset));
        }
    }

    #[test]
    fn test_balanced_is_default() {
        let config = AppConfig::from_preset(ConfigPreset::Balanced);
        assert_eq!(config.matching.threshold, DEFAULT_MATCHING_THRESHOLD);
        assert!(!config.fuzzy.deep);
        assert!(!config.fuzzy.auto_backstop);
    }

    #[test]
    fn test_strict_preset() {
        let config = AppConfig::strict_preset();
        assert_eq!(config.matching.threshold, 0.5);
        assert_eq!(config.matching.max_substring_hits, 3);
    }

    #[test]
    fn test_permissive_and_deep_presets() {
        assert!(AppConfig::permissive_preset().fuzzy.auto_backstop);
        assert_eq!(AppConfig::permissive_preset().matching.threshold, 0.2);
        assert!(AppConfig::deep_preset().fuzzy.deep);
    }
}
