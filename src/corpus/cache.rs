//! The owned, in-memory corpus used for one analysis session.

use super::{LoadReport, LoadedCorpus, SignatureStore};
use crate::config::{FuzzyConfig, MatchingConfig};
use crate::error::Result;
use crate::generic::{fold, GenericityFilter};
use crate::matching::{MinHashSketch, MinHasher};
use crate::model::{Component, ComponentId, Signature};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// A signature prepared for matching.
#[derive(Debug, Clone)]
pub struct CachedSignature {
    pub signature: Signature,
    /// Case-folded pattern
    pub folded: String,
    /// Long enough to be matched inside longer features
    pub substring_eligible: bool,
}

/// Union sketch of one component's signature patterns.
#[derive(Debug, Clone)]
pub struct ComponentSketch {
    pub sketch: MinHashSketch,
    /// Distinct shingles across the component's patterns
    pub shingles: HashSet<u64>,
}

/// What went into the cache.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    pub components: usize,
    pub signatures: usize,
    /// Patterns dropped by the genericity filter
    pub filtered_generic: usize,
    /// Patterns shorter than the minimum pattern length
    pub filtered_short: usize,
    /// The store could not be read; the cache is empty
    pub degraded: bool,
    pub load_report: LoadReport,
}

/// Read-only corpus shared by every matcher in a session.
///
/// Generic and too-short patterns are removed at build time, so nothing
/// downstream needs to consult the filter for stored patterns again.
#[derive(Debug, Clone)]
pub struct CorpusCache {
    components: HashMap<ComponentId, Component>,
    signatures: Vec<CachedSignature>,
    sketches: HashMap<ComponentId, ComponentSketch>,
    filter: GenericityFilter,
    min_hasher: MinHasher,
    stats: CacheStats,
}

impl CorpusCache {
    /// Load every record from `store` and prepare it for matching.
    pub fn build(
        store: &dyn SignatureStore,
        filter: GenericityFilter,
        matching: &MatchingConfig,
        fuzzy: &FuzzyConfig,
    ) -> Result<Self> {
        let loaded = store.load_all()?;
        let cache = Self::from_loaded(loaded, filter, matching, fuzzy);
        tracing::info!(
            "Corpus loaded from {}: {} components, {} signatures ({} generic, {} short patterns dropped)",
            store.describe(),
            cache.stats.components,
            cache.stats.signatures,
            cache.stats.filtered_generic,
            cache.stats.filtered_short
        );
        Ok(cache)
    }

    /// Like [`Self::build`], but an unreadable store yields an empty,
    /// degraded cache instead of an error.
    pub fn load(
        store: &dyn SignatureStore,
        filter: GenericityFilter,
        matching: &MatchingConfig,
        fuzzy: &FuzzyConfig,
    ) -> Self {
        match Self::build(store, filter.clone(), matching, fuzzy) {
            Ok(cache) => {
                if cache.is_empty() {
                    tracing::warn!("Corpus {} contains no usable signatures", store.describe());
                }
                cache
            }
            Err(err) => {
                tracing::error!("Corpus unavailable, continuing with an empty corpus: {err}");
                Self::degraded(filter, fuzzy)
            }
        }
    }

    /// An empty cache flagged as standing in for an unavailable store.
    pub fn degraded(filter: GenericityFilter, fuzzy: &FuzzyConfig) -> Self {
        let mut cache = Self::empty(filter, fuzzy);
        cache.stats.degraded = true;
        cache
    }

    /// A cache with no components.
    pub fn empty(filter: GenericityFilter, fuzzy: &FuzzyConfig) -> Self {
        Self {
            components: HashMap::new(),
            signatures: Vec::new(),
            sketches: HashMap::new(),
            filter,
            min_hasher: MinHasher::from_config(fuzzy),
            stats: CacheStats::default(),
        }
    }

    pub fn from_loaded(
        loaded: LoadedCorpus,
        filter: GenericityFilter,
        matching: &MatchingConfig,
        fuzzy: &FuzzyConfig,
    ) -> Self {
        let LoadedCorpus {
            components,
            mut signatures,
            report,
        } = loaded;
        signatures.sort_by_key(|s| s.id);

        let mut stats = CacheStats {
            components: components.len(),
            load_report: report,
            ..CacheStats::default()
        };

        let mut kept = Vec::with_capacity(signatures.len());
        for signature in signatures {
            let folded = fold(&signature.pattern);
            let len = folded.chars().count();
            if len < matching.min_pattern_len {
                stats.filtered_short += 1;
                continue;
            }
            if filter.is_generic(&signature.pattern) {
                stats.filtered_generic += 1;
                continue;
            }
            kept.push(CachedSignature {
                substring_eligible: len >= matching.substring_min_pattern_len,
                folded,
                signature,
            });
        }
        stats.signatures = kept.len();

        let min_hasher = MinHasher::from_config(fuzzy);
        let sketches = build_sketches(&kept, &min_hasher);

        Self {
            components,
            signatures: kept,
            sketches,
            filter,
            min_hasher,
            stats,
        }
    }

    pub fn components(&self) -> &HashMap<ComponentId, Component> {
        &self.components
    }

    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(&id)
    }

    pub fn signatures(&self) -> &[CachedSignature] {
        &self.signatures
    }

    pub fn sketch(&self, id: ComponentId) -> Option<&ComponentSketch> {
        self.sketches.get(&id)
    }

    pub fn filter(&self) -> &GenericityFilter {
        &self.filter
    }

    pub fn min_hasher(&self) -> &MinHasher {
        &self.min_hasher
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    pub fn is_degraded(&self) -> bool {
        self.stats.degraded
    }
}

/// One union sketch per component.
///
/// Stored per-signature sketches are merged when every signature of the
/// component carries one of the right width; otherwise the sketch is
/// computed from the patterns.
fn build_sketches(
    signatures: &[CachedSignature],
    hasher: &MinHasher,
) -> HashMap<ComponentId, ComponentSketch> {
    let mut groups: HashMap<ComponentId, Vec<&CachedSignature>> = HashMap::new();
    for cached in signatures {
        groups
            .entry(cached.signature.component_id)
            .or_default()
            .push(cached);
    }

    groups
        .into_par_iter()
        .map(|(id, group)| {
            let mut shingles = HashSet::new();
            for cached in &group {
                hasher.extend_shingles(&cached.folded, &mut shingles);
            }

            let stored: Option<Vec<MinHashSketch>> = group
                .iter()
                .map(|cached| {
                    cached
                        .signature
                        .fuzzy_sketch
                        .as_ref()
                        .filter(|values| values.len() == hasher.num_hashes())
                        .map(|values| MinHashSketch::from_values(values.clone()))
                })
                .collect();

            let sketch = match stored {
                Some(mut parts) if !parts.is_empty() => {
                    let mut merged = parts.swap_remove(0);
                    for part in &parts {
                        merged.merge_min(part);
                    }
                    merged
                }
                _ => hasher.sketch(&shingles),
            };

            (
                id,
                ComponentSketch { sketch, shingles },
            )
        })
        .collect()
}
