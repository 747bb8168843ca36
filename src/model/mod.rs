//! Data model shared by the corpus, matcher and batch layers.
//!
//! Corpus records ([`Component`], [`Signature`]) are decoded once at the store
//! boundary and never change afterwards. [`Evidence`] is ephemeral and only
//! lives inside one matching call. [`ComponentMatch`], [`AnalysisResult`] and
//! [`BatchAnalysisResult`] are the outputs handed back to callers.

mod component;
mod evidence;
mod features;
mod identifiers;
mod results;
mod signature;

pub use component::*;
pub use evidence::*;
pub use features::*;
pub use identifiers::*;
pub use results::*;
pub use signature::*;
