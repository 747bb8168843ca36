//! Fuzzy-similarity backstop.
//!
//! Two coarse signals, both used only to recover components that direct
//! matching missed:
//!
//! - Character shingles. Each component's signature shingles are compared
//!   with the artifact's shingle set, and the fraction of the component's
//!   shingles present in the artifact (its containment) is the similarity.
//!   MinHash sketches of both sets are kept for the stored `minhash` column
//!   and reported as an estimated Jaccard alongside the containment.
//! - An optional whole-file fuzzy hash, compared through [`WholeFileHasher`].
//!
//! Each component that has no direct evidence and reaches the configured
//! minimum similarity gets one synthetic [`Evidence`] at
//! `similarity * weight`.

use crate::config::FuzzyConfig;
use crate::corpus::CorpusCache;
use crate::model::{ComponentId, Evidence, ExtractedFeatures};
use crate::utils::{content_hash, seeded_hash};
use std::collections::HashSet;
use std::sync::Arc;

/// Large prime close to 2^64 for the universal hash family.
const PRIME: u64 = 0xFFFF_FFFF_FFFF_FFC5;

/// Seed namespace for coefficient generation.
const COEFF_SEED: u64 = 0x6269_6e73_6e69_6666;

/// Method label on evidence produced from sketches.
pub const SKETCH_METHOD: &str = "minhash similarity";

/// Method label on evidence produced from whole-file hashes.
pub const WHOLE_FILE_METHOD: &str = "whole-file fuzzy hash";

/// External whole-file fuzzy hash (TLSH or similar).
///
/// Implementations compute a digest of a file's bytes and a distance between
/// two digests, where 0 means identical.
pub trait WholeFileHasher: Send + Sync {
    /// Digest of `data`, or `None` when the input is too small to hash.
    fn digest(&self, data: &[u8]) -> Option<String>;

    /// Distance between two digests, or `None` if either is malformed.
    fn distance(&self, a: &str, b: &str) -> Option<u32>;
}

/// MinHash values for one shingle set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinHashSketch {
    values: Vec<u64>,
}

impl MinHashSketch {
    pub fn from_values(values: Vec<u64>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[u64] {
        &self.values
    }

    pub fn into_values(self) -> Vec<u64> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Fraction of positions with equal values, an estimate of Jaccard
    /// similarity. Sketches of different width never match.
    pub fn estimated_similarity(&self, other: &Self) -> f64 {
        if self.values.len() != other.values.len() || self.values.is_empty() {
            return 0.0;
        }
        let matching = self
            .values
            .iter()
            .zip(&other.values)
            .filter(|(a, b)| a == b && **a != u64::MAX)
            .count();
        matching as f64 / self.values.len() as f64
    }

    /// Fold another sketch in, giving the sketch of the union of both sets.
    pub fn merge_min(&mut self, other: &Self) {
        if self.values.len() != other.values.len() {
            return;
        }
        for (mine, theirs) in self.values.iter_mut().zip(&other.values) {
            *mine = (*mine).min(*theirs);
        }
    }

    /// Little-endian encoding used for the store's `minhash` column.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    /// Decode [`Self::to_bytes`] output. Returns `None` for empty or ragged input.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() || bytes.len() % 8 != 0 {
            return None;
        }
        let values = bytes
            .chunks_exact(8)
            .map(|chunk| {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(chunk);
                u64::from_le_bytes(buf)
            })
            .collect();
        Some(Self { values })
    }
}

/// Deterministic MinHash family over character shingles.
///
/// Coefficients are derived from fixed seeds, so sketches written at import
/// time stay comparable with sketches computed during analysis.
#[derive(Debug, Clone)]
pub struct MinHasher {
    coeffs: Vec<(u64, u64)>,
    shingle_size: usize,
}

impl MinHasher {
    pub fn new(num_hashes: usize, shingle_size: usize) -> Self {
        let coeffs = (0..num_hashes as u64)
            .map(|i| {
                let a = seeded_hash(&i.to_le_bytes(), COEFF_SEED) | 1;
                let b = seeded_hash(&i.to_le_bytes(), COEFF_SEED.rotate_left(17));
                (a, b)
            })
            .collect();
        Self {
            coeffs,
            shingle_size: shingle_size.max(1),
        }
    }

    pub fn from_config(config: &FuzzyConfig) -> Self {
        Self::new(config.num_hashes, config.shingle_size)
    }

    pub fn num_hashes(&self) -> usize {
        self.coeffs.len()
    }

    /// Case-folded character shingles of `text`, hashed.
    ///
    /// Text shorter than the shingle size becomes a single shingle.
    pub fn shingles(&self, text: &str) -> HashSet<u64> {
        let mut out = HashSet::new();
        self.extend_shingles(text, &mut out);
        out
    }

    pub fn extend_shingles(&self, text: &str, out: &mut HashSet<u64>) {
        let folded = text.trim().to_lowercase();
        if folded.is_empty() {
            return;
        }
        let chars: Vec<char> = folded.chars().collect();
        if chars.len() < self.shingle_size {
            out.insert(content_hash(folded.as_bytes()));
            return;
        }
        let mut buf = String::with_capacity(self.shingle_size * 4);
        for window in chars.windows(self.shingle_size) {
            buf.clear();
            buf.extend(window);
            out.insert(content_hash(buf.as_bytes()));
        }
    }

    pub fn sketch(&self, shingles: &HashSet<u64>) -> MinHashSketch {
        let mut values = vec![u64::MAX; self.coeffs.len()];
        for &shingle in shingles {
            for (slot, &(a, b)) in values.iter_mut().zip(&self.coeffs) {
                let hash = a.wrapping_mul(shingle).wrapping_add(b) % PRIME;
                if hash < *slot {
                    *slot = hash;
                }
            }
        }
        MinHashSketch { values }
    }

    pub fn sketch_text(&self, text: &str) -> MinHashSketch {
        self.sketch(&self.shingles(text))
    }
}

/// Fraction of `component` shingles that also occur in `artifact`.
///
/// Computed over the exact sets. A Jaccard estimate from a fixed-width
/// sketch cannot resolve containment of a small set in a much larger one.
pub fn containment(artifact: &HashSet<u64>, component: &HashSet<u64>) -> f64 {
    if component.is_empty() {
        return 0.0;
    }
    let shared = component.iter().filter(|s| artifact.contains(s)).count();
    shared as f64 / component.len() as f64
}

/// Similarity from a whole-file hash distance, 1 at distance 0 and 0 at
/// `max_distance` or beyond.
pub fn distance_similarity(distance: u32, max_distance: u32) -> f64 {
    if max_distance == 0 {
        return if distance == 0 { 1.0 } else { 0.0 };
    }
    (1.0 - f64::from(distance) / f64::from(max_distance)).clamp(0.0, 1.0)
}

/// Produces synthetic fuzzy evidence against a corpus cache.
pub struct FuzzyMatcher<'a> {
    cache: &'a CorpusCache,
    config: &'a FuzzyConfig,
    whole_file: Option<&'a Arc<dyn WholeFileHasher>>,
}

impl<'a> FuzzyMatcher<'a> {
    pub fn new(cache: &'a CorpusCache, config: &'a FuzzyConfig) -> Self {
        Self {
            cache,
            config,
            whole_file: None,
        }
    }

    #[must_use]
    pub fn with_whole_file_hasher(mut self, hasher: Option<&'a Arc<dyn WholeFileHasher>>) -> Self {
        self.whole_file = hasher;
        self
    }

    /// Evidence for components not in `direct`, sorted by component id.
    pub fn find(
        &self,
        features: &ExtractedFeatures,
        file_hash: Option<&str>,
        direct: &HashSet<ComponentId>,
    ) -> Vec<Evidence> {
        let hasher = self.cache.min_hasher();
        let mut shingles = HashSet::new();
        for feature in features.iter() {
            hasher.extend_shingles(feature, &mut shingles);
        }
        let artifact_sketch = (!shingles.is_empty()).then(|| hasher.sketch(&shingles));

        let mut ids: Vec<ComponentId> = self
            .cache
            .components()
            .keys()
            .copied()
            .filter(|id| !direct.contains(id))
            .collect();
        ids.sort();

        let mut evidence = Vec::new();
        for id in ids {
            let mut best: Option<(f64, &'static str, String)> = None;

            if let (Some(artifact), Some(group)) = (&artifact_sketch, self.cache.sketch(id)) {
                let similarity = containment(&shingles, &group.shingles);
                if similarity > 0.0 {
                    let jaccard = artifact.estimated_similarity(&group.sketch);
                    best = Some((
                        similarity,
                        SKETCH_METHOD,
                        format!("containment {similarity:.3}, jaccard {jaccard:.3}"),
                    ));
                }
            }

            if let Some(similarity) = self.whole_file_similarity(id, file_hash) {
                if best.as_ref().map_or(true, |(s, _, _)| similarity > *s) {
                    best = Some((similarity, WHOLE_FILE_METHOD, format!("similarity {similarity:.3}")));
                }
            }

            if let Some((similarity, method, detail)) = best {
                if similarity >= self.config.min_similarity {
                    evidence.push(Evidence::fuzzy(
                        id,
                        similarity * self.config.weight,
                        method,
                        detail,
                    ));
                }
            }
        }

        if !evidence.is_empty() {
            tracing::debug!("Fuzzy backstop produced {} evidence entries", evidence.len());
        }
        evidence
    }

    fn whole_file_similarity(&self, id: ComponentId, file_hash: Option<&str>) -> Option<f64> {
        let hasher = self.whole_file?;
        let file_hash = file_hash?;
        let reference = self.cache.component(id)?.whole_file_hash.as_deref()?;
        let distance = hasher.distance(file_hash, reference)?;
        Some(distance_similarity(distance, self.config.max_hash_distance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hasher_is_deterministic() {
        let a = MinHasher::new(32, 3);
        let b = MinHasher::new(32, 3);
        assert_eq!(a.sketch_text("png_read_info"), b.sketch_text("png_read_info"));
        assert_eq!(a.sketch_text("png_read_info").len(), 32);
    }

    #[test]
    fn test_similarity_bounds() {
        let hasher = MinHasher::new(128, 3);
        let x = hasher.sketch_text("avcodec_decode_video2");
        let y = hasher.sketch_text("avcodec_decode_video2");
        let z = hasher.sketch_text("qwertyuiopasdfgh");
        assert_eq!(x.estimated_similarity(&y), 1.0);
        assert!(x.estimated_similarity(&z) < 0.2);
    }

    #[test]
    fn test_merge_min_is_union_sketch() {
        let hasher = MinHasher::new(64, 3);
        let mut merged = hasher.sketch_text("deflateInit2_");
        merged.merge_min(&hasher.sketch_text("inflateBackEnd"));

        let mut union = hasher.shingles("deflateInit2_");
        union.extend(hasher.shingles("inflateBackEnd"));
        assert_eq!(merged, hasher.sketch(&union));
    }

    #[test]
    fn test_bytes_roundtrip_and_rejects_ragged() {
        let sketch = MinHasher::new(8, 3).sketch_text("sqlite3_open_v2");
        let bytes = sketch.to_bytes();
        assert_eq!(bytes.len(), 64);
        assert_eq!(MinHashSketch::from_bytes(&bytes), Some(sketch));
        assert_eq!(MinHashSketch::from_bytes(&bytes[..7]), None);
        assert_eq!(MinHashSketch::from_bytes(&[]), None);
    }

    #[test]
    fn test_short_text_single_shingle() {
        let hasher = MinHasher::new(4, 3);
        assert_eq!(hasher.shingles("ab").len(), 1);
        assert!(hasher.shingles("   ").is_empty());
    }

    #[test]
    fn test_containment() {
        let hasher = MinHasher::new(64, 3);
        let component = hasher.shingles("deflateInit2_");
        let mut artifact = component.clone();
        artifact.extend((0..5000_u64).map(|i| i.wrapping_mul(0x9E37_79B9_7F4A_7C15)));

        assert_eq!(containment(&artifact, &component), 1.0);
        assert_eq!(containment(&artifact, &HashSet::new()), 0.0);

        let half: HashSet<u64> = component.iter().copied().take(component.len() / 2).collect();
        let expected = half.len() as f64 / component.len() as f64;
        assert!((containment(&half, &component) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_one_shared_shingle_in_large_artifact_stays_low() {
        let hasher = MinHasher::new(64, 3);
        // 16 n-z characters plus one trigram from the artifact alphabet
        let component = hasher.shingles("nopqrstuvwxyznop_abc");
        let mut artifact = hasher.shingles("abc");
        artifact.extend((0..2197_u64).map(|i| i.wrapping_mul(0xD6E8_FEB8_6659_FD93)));

        assert!(containment(&artifact, &component) < 0.1);
    }

    #[test]
    fn test_distance_similarity() {
        assert_eq!(distance_similarity(0, 300), 1.0);
        assert_eq!(distance_similarity(150, 300), 0.5);
        assert_eq!(distance_similarity(900, 300), 0.0);
    }
}
