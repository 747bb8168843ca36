//! Unified error types for binsniff.
//!
//! Corpus-level failures are process-wide but recoverable (the engine degrades
//! to an empty corpus). Record decode failures are per-signature and counted by
//! the loader. Analysis failures are per-file and end up in that file's result.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for binsniff operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SnifferError {
    /// The signature corpus could not be opened or read
    #[error("Signature corpus unavailable: {context}")]
    Corpus {
        context: String,
        #[source]
        source: CorpusErrorKind,
    },

    /// A single stored record could not be decoded
    #[error("Failed to decode signature record: {context}")]
    Decode {
        context: String,
        #[source]
        source: RecordDecodeError,
    },

    /// Analysis of one artifact failed
    #[error("Analysis failed: {context}")]
    Analysis {
        context: String,
        #[source]
        source: AnalysisErrorKind,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Specific corpus error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CorpusErrorKind {
    #[error("Store not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Unexpected schema: {0}")]
    Schema(String),

    #[error("Invalid signature document: {0}")]
    InvalidDocument(String),

    #[error("Corpus contains no usable signatures")]
    Empty,
}

/// Why one stored signature or document entry could not be decoded.
///
/// The loader treats every variant the same way (skip and count), the variant
/// only feeds the debug log.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum RecordDecodeError {
    #[error("Decompression failed: {0}")]
    Decompress(String),

    #[error("Pattern is not valid UTF-8")]
    InvalidUtf8,

    #[error("Unknown signature type: {0}")]
    UnknownSignatureType(String),

    #[error("Confidence {0} is not a finite number")]
    InvalidConfidence(f64),

    #[error("Empty pattern")]
    EmptyPattern,

    #[error("Signature references unknown component {0}")]
    OrphanSignature(i64),

    #[error("Malformed entry: {0}")]
    MalformedEntry(String),
}

/// Specific per-file analysis error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AnalysisErrorKind {
    #[error("Feature extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("No extractor accepts this input")]
    UnsupportedInput,

    #[error("Analysis panicked: {0}")]
    Panicked(String),
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for binsniff operations
pub type Result<T> = std::result::Result<T, SnifferError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl SnifferError {
    /// Create a corpus error with context
    pub fn corpus(context: impl Into<String>, source: CorpusErrorKind) -> Self {
        Self::Corpus {
            context: context.into(),
            source,
        }
    }

    /// Create a decode error with context
    pub fn decode(context: impl Into<String>, source: RecordDecodeError) -> Self {
        Self::Decode {
            context: context.into(),
            source,
        }
    }

    /// Create an analysis error with context
    pub fn analysis(context: impl Into<String>, source: AnalysisErrorKind) -> Self {
        Self::Analysis {
            context: context.into(),
            source,
        }
    }

    /// Create an extraction failure for a file
    pub fn extraction(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::analysis(
            format!("extracting features from {}", path.into()),
            AnalysisErrorKind::ExtractionFailed(message.into()),
        )
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether this error means the corpus itself is unusable.
    #[must_use]
    pub const fn is_corpus_unavailable(&self) -> bool {
        matches!(self, Self::Corpus { .. })
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for SnifferError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for SnifferError {
    fn from(err: serde_json::Error) -> Self {
        Self::corpus(
            "JSON deserialization",
            CorpusErrorKind::InvalidDocument(err.to_string()),
        )
    }
}

impl From<rusqlite::Error> for SnifferError {
    fn from(err: rusqlite::Error) -> Self {
        Self::corpus("SQLite", CorpusErrorKind::Database(err.to_string()))
    }
}

impl From<RecordDecodeError> for SnifferError {
    fn from(err: RecordDecodeError) -> Self {
        Self::decode("", err)
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// Contexts chain outermost first, e.g. `"loading corpus: reading row 12"`.
///
/// # Example
///
/// ```ignore
/// use binsniff::error::ErrorContext;
///
/// fn load(path: &Path) -> Result<SignatureDocument> {
///     let content = std::fs::read_to_string(path)
///         .with_context(|| format!("reading {}", path.display()))?;
///     serde_json::from_str(&content).context("parsing signature document")
/// }
/// ```
pub trait ErrorContext<T> {
    /// Add context to an error.
    ///
    /// The context string is prepended to the error's existing context.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure, only evaluated on error.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<SnifferError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
fn add_context_to_error(err: SnifferError, new_ctx: &str) -> SnifferError {
    match err {
        SnifferError::Corpus {
            context: existing,
            source,
        } => SnifferError::Corpus {
            context: chain_context(new_ctx, &existing),
            source,
        },
        SnifferError::Decode {
            context: existing,
            source,
        } => SnifferError::Decode {
            context: chain_context(new_ctx, &existing),
            source,
        },
        SnifferError::Analysis {
            context: existing,
            source,
        } => SnifferError::Analysis {
            context: chain_context(new_ctx, &existing),
            source,
        },
        SnifferError::Io {
            path,
            message,
            source,
        } => SnifferError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        SnifferError::Config(msg) => SnifferError::Config(chain_context(new_ctx, &msg)),
        SnifferError::Validation(msg) => SnifferError::Validation(chain_context(new_ctx, &msg)),
    }
}

/// Chain two context strings together.
///
/// If the existing context is empty, returns just the new context.
/// Otherwise, returns "`new_context`: `existing_context`".
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}

/// Extension trait for Option types to convert to errors with context.
pub trait OptionContext<T> {
    /// Convert None to an error with the given context.
    fn context_none(self, context: impl Into<String>) -> Result<T>;

    /// Convert None to an error with context from a closure.
    fn with_context_none<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T> OptionContext<T> for Option<T> {
    fn context_none(self, context: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| SnifferError::Validation(context.into()))
    }

    fn with_context_none<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.ok_or_else(|| SnifferError::Validation(f().into()))
    }
}
