//! Stable identifiers for corpus records.
//!
//! Both identifiers are the integer row ids of the backing store. They are
//! kept as distinct newtypes so a signature id can never be passed where a
//! component id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a [`Component`](super::Component) in the corpus.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ComponentId(pub i64);

/// Identifier of a [`Signature`](super::Signature) in the corpus.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SignatureId(pub i64);

impl ComponentId {
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl SignatureId {
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SignatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ComponentId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<i64> for SignatureId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}
