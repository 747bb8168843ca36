//! Genericity classification of signature patterns.
//!
//! Shared vocabulary (`http`, `init`, cipher names, libc symbols) is the main
//! source of cross-component false positives. [`GenericityFilter`] decides
//! whether a pattern is too common to count as evidence, and the same filter
//! instance drives both offline curation ([`curate_document`]) and live
//! scoring (the corpus cache and the matcher's substring-eligible tokens).
//!
//! Decision order:
//!
//! 1. Blank patterns are generic; configured allow-list terms are not.
//! 2. A case-folded pattern found in the term set is generic.
//! 3. Library-specific forms (`png_read_info`, `zlib 1.2.11`, `zstd`) are
//!    exempt from the remaining rules.
//! 4. A pattern shorter than the minimum length without a namespace
//!    separator is generic, as is a short run of hex digits.
//! 5. A pattern whose separator-delimited tokens are all generic is generic.

mod curate;
mod terms;

pub use curate::{curate_document, curate_symbols, CurationOutcome, RemovedPattern};

use crate::config::GenericityConfig;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

/// Patterns shorter than this (in characters) need a separator to be specific.
pub const DEFAULT_MIN_LENGTH: usize = 6;

/// Separators that mark a namespaced or prefixed identifier.
pub const NAMESPACE_SEPARATORS: [&str; 4] = ["_", "::", ".", "->"];

/// `name 1.2`, `name-1.2.3`, `name/v1.2` style version banners.
///
/// Only banners whose name is a known library count as library-specific.
static VERSIONED_FORM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z][a-z0-9+]+?)[ _/-]?v?\d+\.\d+").expect("static regex")
});

/// Why a pattern was or was not classified generic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Not generic; usable as evidence
    Specific,
    /// Explicitly allowed by configuration
    Allowed,
    /// Library-prefixed, versioned or a known library name
    LibrarySpecific,
    /// Blank or separator-only
    Empty,
    /// Found in the generic term set
    GenericTerm,
    /// Shorter than the minimum length and not namespaced
    TooShort,
    /// Short hexadecimal or numeric constant
    ShortNumeric,
    /// Every separator-delimited token is generic
    GenericTokens,
}

impl Verdict {
    #[must_use]
    pub const fn is_generic(self) -> bool {
        !matches!(self, Self::Specific | Self::Allowed | Self::LibrarySpecific)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Specific => "specific",
            Self::Allowed => "allowed by configuration",
            Self::LibrarySpecific => "library-specific form",
            Self::Empty => "empty",
            Self::GenericTerm => "generic term",
            Self::TooShort => "too short without namespace separator",
            Self::ShortNumeric => "short numeric constant",
            Self::GenericTokens => "only generic tokens",
        };
        f.write_str(text)
    }
}

/// Pure, deterministic classifier for pattern genericity.
#[derive(Debug, Clone)]
pub struct GenericityFilter {
    terms: HashSet<String>,
    allowed: HashSet<String>,
    library_prefixes: HashSet<String>,
    library_names: HashSet<String>,
    min_length: usize,
}

impl Default for GenericityFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl GenericityFilter {
    /// Filter with the built-in vocabulary and default minimum length.
    pub fn new() -> Self {
        let terms = terms::PROGRAMMING_TERMS
            .iter()
            .chain(terms::RUNTIME_SYMBOLS)
            .chain(terms::CRYPTO_TERMS)
            .chain(terms::PROTOCOL_TERMS)
            .chain(terms::BYTECODE_OPS)
            .chain(terms::MONTHS)
            .map(|t| (*t).to_string())
            .collect();

        Self {
            terms,
            allowed: HashSet::new(),
            library_prefixes: terms::LIBRARY_PREFIXES.iter().map(|t| (*t).to_string()).collect(),
            library_names: terms::LIBRARY_NAMES.iter().map(|t| (*t).to_string()).collect(),
            min_length: DEFAULT_MIN_LENGTH,
        }
    }

    /// Filter extended by configuration.
    pub fn from_config(config: &GenericityConfig) -> Self {
        Self::new()
            .with_min_length(config.min_length)
            .with_extra_terms(&config.extra_terms)
            .with_allowed_terms(&config.allowed_terms)
            .with_library_prefixes(&config.library_prefixes)
    }

    #[must_use]
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    #[must_use]
    pub fn with_extra_terms<S: AsRef<str>>(mut self, terms: &[S]) -> Self {
        self.terms.extend(terms.iter().map(|t| fold(t.as_ref())));
        self
    }

    /// Terms that are never generic, overriding every other rule.
    #[must_use]
    pub fn with_allowed_terms<S: AsRef<str>>(mut self, terms: &[S]) -> Self {
        self.allowed.extend(terms.iter().map(|t| fold(t.as_ref())));
        self
    }

    #[must_use]
    pub fn with_library_prefixes<S: AsRef<str>>(mut self, prefixes: &[S]) -> Self {
        self.library_prefixes
            .extend(prefixes.iter().map(|p| fold(p.as_ref())));
        self
    }

    pub const fn min_length(&self) -> usize {
        self.min_length
    }

    /// Number of terms in the generic set.
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Iterate over the generic term set (unordered).
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }

    /// Whether `pattern` is too common to serve as evidence.
    pub fn is_generic(&self, pattern: &str) -> bool {
        self.classify(pattern).is_generic()
    }

    /// Classify a pattern, reporting which rule decided.
    pub fn classify(&self, pattern: &str) -> Verdict {
        let folded = fold(pattern);
        if folded.is_empty() {
            return Verdict::Empty;
        }
        if self.allowed.contains(&folded) {
            return Verdict::Allowed;
        }
        if self.terms.contains(&folded) {
            return Verdict::GenericTerm;
        }
        if self.is_library_form(&folded) {
            return Verdict::LibrarySpecific;
        }
        if folded.chars().count() < self.min_length && !has_namespace_separator(&folded) {
            return Verdict::TooShort;
        }
        if is_short_numeric(&folded) {
            return Verdict::ShortNumeric;
        }
        if tokenize(&folded).all(|token| self.is_generic_token(token)) {
            return if tokenize(&folded).next().is_none() {
                Verdict::Empty
            } else {
                Verdict::GenericTokens
            };
        }
        Verdict::Specific
    }

    fn is_generic_token(&self, token: &str) -> bool {
        if self.allowed.contains(token) {
            return false;
        }
        self.terms.contains(token) || token.chars().all(|c| c.is_ascii_digit())
    }

    fn is_library_form(&self, folded: &str) -> bool {
        if self.library_names.contains(folded) || self.is_library_banner(folded) {
            return true;
        }
        NAMESPACE_SEPARATORS.iter().any(|sep| {
            folded.split_once(sep).is_some_and(|(head, tail)| {
                self.library_prefixes.contains(head) && tail.chars().any(char::is_alphanumeric)
            })
        })
    }

    /// A version banner naming a known, non-generic library.
    fn is_library_banner(&self, folded: &str) -> bool {
        VERSIONED_FORM
            .captures(folded)
            .and_then(|caps| caps.get(1))
            .is_some_and(|name| {
                let name = name.as_str();
                (self.library_names.contains(name) || self.library_prefixes.contains(name))
                    && !self.terms.contains(name)
            })
    }
}

/// Case-fold and trim a pattern the way every comparison in the crate does.
pub fn fold(pattern: &str) -> String {
    pattern.trim().to_lowercase()
}

/// Whether the text contains one of [`NAMESPACE_SEPARATORS`].
pub fn has_namespace_separator(text: &str) -> bool {
    NAMESPACE_SEPARATORS.iter().any(|sep| text.contains(sep))
}

/// Split on every non-alphanumeric character, dropping empty pieces.
fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
}

/// Hex digit runs under eight characters that contain at least one digit.
fn is_short_numeric(text: &str) -> bool {
    text.len() < 8
        && text.chars().all(|c| c.is_ascii_hexdigit())
        && text.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_terms() {
        let filter = GenericityFilter::new();
        for pattern in ["log", "init", "http", "AES", "sha256", "malloc", "Error", "  trace "] {
            assert!(filter.is_generic(pattern), "{pattern} should be generic");
        }
    }

    #[test]
    fn test_protocol_and_runtime_version_tags_are_generic() {
        let filter = GenericityFilter::new();
        for pattern in ["HTTP/1.1", "GLIBC_2.17", "TLS 1.2", "utf8 1.0", "GLIBCXX_3.4.21", "CXXABI_1.3"] {
            assert!(filter.is_generic(pattern), "{pattern} should be generic");
        }
        assert_eq!(filter.classify("HTTP/1.1"), Verdict::GenericTokens);
        assert_eq!(filter.classify("zlib 1.2.11"), Verdict::LibrarySpecific);
        assert_eq!(filter.classify("pcre2-10.42"), Verdict::LibrarySpecific);
    }

    #[test]
    fn test_short_without_separator() {
        let filter = GenericityFilter::new();
        assert_eq!(filter.classify("abcde"), Verdict::TooShort);
        assert_eq!(filter.classify("qzx"), Verdict::TooShort);
        assert!(!filter.is_generic("qz_x"));
    }

    #[test]
    fn test_only_generic_tokens() {
        let filter = GenericityFilter::new();
        assert_eq!(filter.classify("get_value"), Verdict::GenericTokens);
        assert_eq!(filter.classify("init::config"), Verdict::GenericTokens);
        assert_eq!(filter.classify("read_buffer_2"), Verdict::GenericTokens);
        assert_eq!(filter.classify("___"), Verdict::Empty);
    }

    #[test]
    fn test_library_specific_exempt() {
        let filter = GenericityFilter::new();
        assert_eq!(filter.classify("av_register_all"), Verdict::LibrarySpecific);
        assert_eq!(filter.classify("png_init"), Verdict::LibrarySpecific);
        assert_eq!(filter.classify("zlib 1.2.11"), Verdict::LibrarySpecific);
        assert_eq!(filter.classify("zstd"), Verdict::LibrarySpecific);
        assert!(!filter.is_generic("avcodec_decode_video2"));
    }

    #[test]
    fn test_specific_patterns() {
        let filter = GenericityFilter::new();
        assert_eq!(filter.classify("inflateInit2_"), Verdict::Specific);
        assert_eq!(filter.classify("deflateBound"), Verdict::Specific);
        assert_eq!(filter.classify("xmlParseFile"), Verdict::Specific);
    }

    #[test]
    fn test_short_numeric() {
        let filter = GenericityFilter::new();
        assert_eq!(filter.classify("1a2b3c"), Verdict::ShortNumeric);
        assert!(!filter.is_generic("facade_cafe_4242"));
        assert!(!filter.is_generic("deadbeef01"));
    }

    #[test]
    fn test_configured_terms() {
        let filter = GenericityFilter::new()
            .with_extra_terms(&["webrtc_internal"])
            .with_allowed_terms(&["Trace"]);
        assert!(filter.is_generic("WebRTC_Internal"));
        assert_eq!(filter.classify("trace"), Verdict::Allowed);
    }

    #[test]
    fn test_min_length_configurable() {
        let filter = GenericityFilter::new().with_min_length(10);
        assert_eq!(filter.classify("qwertyui"), Verdict::TooShort);
    }
}
