//! Direct matching of extracted features against cached signatures.

use crate::config::MatchingConfig;
use crate::corpus::{CachedSignature, CorpusCache};
use crate::generic::fold;
use crate::model::{Evidence, ExtractedFeatures};
use std::collections::{BTreeMap, HashMap};

/// Case-folded view of one artifact's features.
///
/// `tokens` maps every folded feature of at least the minimum pattern length
/// to its first original spelling. `eligible` holds the sorted subset used
/// for substring matching, with a trigram posting index over it.
#[derive(Debug, Default)]
pub struct TokenSet<'f> {
    tokens: HashMap<String, &'f str>,
    eligible: Vec<(String, &'f str)>,
    trigrams: HashMap<[char; 3], Vec<usize>>,
}

impl<'f> TokenSet<'f> {
    pub fn build(
        features: &'f ExtractedFeatures,
        config: &MatchingConfig,
        cache: &CorpusCache,
    ) -> Self {
        let mut tokens: HashMap<String, &'f str> = HashMap::new();
        for feature in features.iter() {
            let folded = fold(feature);
            if folded.chars().count() >= config.min_pattern_len {
                tokens.entry(folded).or_insert(feature);
            }
        }

        let filter = cache.filter();
        let eligible: BTreeMap<&String, &'f str> = tokens
            .iter()
            .filter(|(folded, _)| {
                folded.chars().count() >= config.substring_min_token_len
                    && !filter.is_generic(folded)
            })
            .map(|(folded, original)| (folded, *original))
            .collect();
        let eligible: Vec<(String, &'f str)> = eligible
            .into_iter()
            .map(|(folded, original)| (folded.clone(), original))
            .collect();

        let mut trigrams: HashMap<[char; 3], Vec<usize>> = HashMap::new();
        for (index, (folded, _)) in eligible.iter().enumerate() {
            let chars: Vec<char> = folded.chars().collect();
            let mut seen = std::collections::HashSet::new();
            for window in chars.windows(3) {
                let key = [window[0], window[1], window[2]];
                if seen.insert(key) {
                    trigrams.entry(key).or_default().push(index);
                }
            }
        }

        Self {
            tokens,
            eligible,
            trigrams,
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn eligible_len(&self) -> usize {
        self.eligible.len()
    }

    /// Original spelling of a folded token, if present.
    pub fn get(&self, folded: &str) -> Option<&'f str> {
        self.tokens.get(folded).copied()
    }

    /// Eligible tokens that could contain `pattern`, in sorted order.
    ///
    /// Only tokens sharing the pattern's rarest trigram are returned; a
    /// pattern with a trigram absent from every token has no candidates.
    fn candidates(&self, pattern: &str) -> &[usize] {
        let chars: Vec<char> = pattern.chars().collect();
        let mut best: Option<&[usize]> = None;
        for window in chars.windows(3) {
            let key = [window[0], window[1], window[2]];
            let postings = match self.trigrams.get(&key) {
                Some(postings) => postings.as_slice(),
                None => return &[],
            };
            if best.map_or(true, |b| postings.len() < b.len()) {
                best = Some(postings);
            }
        }
        best.unwrap_or(&[])
    }
}

/// Exact and bounded-substring matching against a [`CorpusCache`].
pub struct CandidateMatcher<'a> {
    cache: &'a CorpusCache,
    config: &'a MatchingConfig,
}

impl<'a> CandidateMatcher<'a> {
    pub fn new(cache: &'a CorpusCache, config: &'a MatchingConfig) -> Self {
        Self { cache, config }
    }

    /// Raw evidence for every signature hit by `features`.
    ///
    /// An exact, case-insensitive hit is recorded at the signature's full
    /// confidence and ends the search for that signature. Otherwise each
    /// eligible token containing the pattern adds one discounted hit, up to
    /// `max_substring_hits`.
    pub fn find(&self, features: &ExtractedFeatures) -> Vec<Evidence> {
        let tokens = TokenSet::build(features, self.config, self.cache);
        if tokens.is_empty() {
            return Vec::new();
        }

        let mut evidence = Vec::new();
        for cached in self.cache.signatures() {
            self.match_signature(cached, &tokens, &mut evidence);
        }

        tracing::trace!(
            "{} tokens ({} substring-eligible) produced {} evidence entries",
            tokens.len(),
            tokens.eligible_len(),
            evidence.len()
        );
        evidence
    }

    fn match_signature(&self, cached: &CachedSignature, tokens: &TokenSet<'_>, out: &mut Vec<Evidence>) {
        if let Some(original) = tokens.get(&cached.folded) {
            out.push(Evidence::exact(&cached.signature, original));
            return;
        }
        if !cached.substring_eligible || self.config.max_substring_hits == 0 {
            return;
        }

        let mut hits = 0;
        for &index in tokens.candidates(&cached.folded) {
            let (folded, original) = &tokens.eligible[index];
            if folded.contains(cached.folded.as_str()) {
                out.push(Evidence::substring(
                    &cached.signature,
                    *original,
                    self.config.substring_discount,
                ));
                hits += 1;
                if hits >= self.config.max_substring_hits {
                    break;
                }
            }
        }
    }
}
