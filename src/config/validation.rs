//! Configuration validation for binsniff.
//!
//! Provides validation traits and implementations for all configuration types.

use super::types::*;

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

fn check_unit_range(errors: &mut Vec<ConfigError>, field: &str, value: f64) {
    if !(0.0..=1.0).contains(&value) {
        errors.push(ConfigError::new(
            field,
            format!("must be between 0.0 and 1.0, got {value}"),
        ));
    }
}

fn check_positive(errors: &mut Vec<ConfigError>, field: &str, value: usize) {
    if value == 0 {
        errors.push(ConfigError::new(field, "must be greater than 0"));
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for AppConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.corpus.validate());
        errors.extend(self.matching.validate());
        errors.extend(self.scoring.validate());
        errors.extend(self.fuzzy.validate());
        errors.extend(self.genericity.validate());
        errors.extend(self.batch.validate());
        errors.extend(self.output.validate());
        errors
    }
}

impl Validatable for CorpusConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if let Some(ref path) = self.path {
            if self.format == CorpusFormat::Json && path.is_file() {
                errors.push(ConfigError::new(
                    "corpus.path",
                    format!("JSON corpus must be a directory: {}", path.display()),
                ));
            }
        }
        errors
    }
}

impl Validatable for MatchingConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        check_unit_range(&mut errors, "matching.threshold", self.threshold);
        check_unit_range(&mut errors, "matching.substring_discount", self.substring_discount);
        check_positive(&mut errors, "matching.min_pattern_len", self.min_pattern_len);
        if self.substring_min_token_len < self.min_pattern_len {
            errors.push(ConfigError::new(
                "matching.substring_min_token_len",
                format!(
                    "must be at least min_pattern_len ({}), got {}",
                    self.min_pattern_len, self.substring_min_token_len
                ),
            ));
        }
        errors
    }
}

impl Validatable for ScoringConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        check_positive(&mut errors, "scoring.top_k", self.top_k);
        check_unit_range(&mut errors, "scoring.per_hit_bonus", self.per_hit_bonus);
        check_unit_range(&mut errors, "scoring.bonus_cap", self.bonus_cap);
        errors
    }
}

impl Validatable for FuzzyConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        check_positive(&mut errors, "fuzzy.num_hashes", self.num_hashes);
        check_positive(&mut errors, "fuzzy.shingle_size", self.shingle_size);
        check_unit_range(&mut errors, "fuzzy.min_similarity", self.min_similarity);
        check_unit_range(&mut errors, "fuzzy.weight", self.weight);
        if self.max_hash_distance == 0 {
            errors.push(ConfigError::new("fuzzy.max_hash_distance", "must be greater than 0"));
        }
        errors
    }
}

impl Validatable for GenericityConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        for term in &self.allowed_terms {
            if self.extra_terms.iter().any(|t| t.eq_ignore_ascii_case(term)) {
                errors.push(ConfigError::new(
                    "genericity.allowed_terms",
                    format!("'{term}' is also listed in extra_terms; the allow-list wins"),
                ));
            }
        }
        errors
    }
}

impl Validatable for BatchConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.max_workers == Some(0) {
            errors.push(ConfigError::new("batch.max_workers", "must be greater than 0"));
        }
        check_positive(&mut errors, "batch.min_string_len", self.min_string_len);
        for pattern in &self.patterns {
            if let Err(e) = globset::Glob::new(pattern) {
                errors.push(ConfigError::new(
                    "batch.patterns",
                    format!("invalid glob '{pattern}': {e}"),
                ));
            }
        }
        errors
    }
}

impl Validatable for OutputConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if let Some(ref file_path) = self.file {
            if let Some(parent) = file_path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    errors.push(ConfigError::new(
                        "output.file",
                        format!("Parent directory does not exist: {}", parent.display()),
                    ));
                }
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let errors = AppConfig::default().validate();
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn test_threshold_out_of_range() {
        let config = MatchingConfig {
            threshold: 1.5,
            ..MatchingConfig::default()
        };
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "matching.threshold");
    }

    #[test]
    fn test_zero_workers_rejected() {
        let config = BatchConfig {
            max_workers: Some(0),
            ..BatchConfig::default()
        };
        assert!(!config.is_valid());
    }

    #[test]
    fn test_invalid_glob_reported() {
        let config = BatchConfig {
            patterns: vec!["*.{so".to_string()],
            ..BatchConfig::default()
        };
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field == "batch.patterns"));
    }

    #[test]
    fn test_scoring_top_k_positive() {
        let config = ScoringConfig {
            top_k: 0,
            ..ScoringConfig::default()
        };
        assert!(!config.is_valid());
    }

    #[test]
    fn test_conflicting_genericity_terms() {
        let config = GenericityConfig {
            extra_terms: vec!["Widget".to_string()],
            allowed_terms: vec!["widget".to_string()],
            ..GenericityConfig::default()
        };
        assert_eq!(config.validate().len(), 1);
    }

    #[test]
    fn test_output_missing_parent_dir() {
        let config = OutputConfig {
            file: Some("/definitely/not/a/real/dir/out.json".into()),
            ..OutputConfig::default()
        };
        assert!(!config.is_valid());
    }
}
