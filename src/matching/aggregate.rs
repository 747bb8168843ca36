//! Turning raw evidence into scored component matches.

use crate::config::ScoringConfig;
use crate::model::{
    Component, ComponentId, ComponentMatch, Evidence, EvidenceKind, EvidenceSummary,
    MatchedPattern, SignatureType,
};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Method label for exact and substring evidence.
pub const DIRECT_METHOD: &str = "direct string matching";

/// Method label for fuzzy evidence.
pub const FUZZY_METHOD: &str = "fuzzy similarity";

/// Groups evidence by component and scores each group.
///
/// The score of a group is the mean of its `top_k` highest confidences plus
/// `min(bonus_cap, n * per_hit_bonus)` where `n` counts every entry in the
/// group, clamped to `[0, 1]`.
#[derive(Debug, Clone, Default)]
pub struct ConfidenceAggregator {
    config: ScoringConfig,
}

impl ConfidenceAggregator {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Aggregate confidence for one component's evidence confidences.
    pub fn score(&self, confidences: &[f64]) -> f64 {
        let mut sorted = confidences.to_vec();
        sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));
        self.score_sorted(&sorted)
    }

    /// Like [`Self::score`] for confidences already in descending order.
    pub fn score_sorted(&self, descending: &[f64]) -> f64 {
        if descending.is_empty() {
            return 0.0;
        }
        let top = &descending[..descending.len().min(self.config.top_k.max(1))];
        let base = top.iter().sum::<f64>() / top.len() as f64;
        let bonus = (descending.len() as f64 * self.config.per_hit_bonus).min(self.config.bonus_cap);
        (base + bonus).clamp(0.0, 1.0)
    }

    /// Scored matches at or above `threshold`, best first.
    ///
    /// Evidence for components missing from `components` is ignored. Ties
    /// are ordered by component name, then id.
    pub fn aggregate(
        &self,
        evidence: Vec<Evidence>,
        components: &HashMap<ComponentId, Component>,
        threshold: f64,
    ) -> Vec<ComponentMatch> {
        let mut groups: HashMap<ComponentId, Vec<Evidence>> = HashMap::new();
        for entry in evidence {
            groups.entry(entry.component_id).or_default().push(entry);
        }

        let mut matches: Vec<ComponentMatch> = groups
            .into_iter()
            .filter_map(|(id, group)| {
                let Some(component) = components.get(&id) else {
                    tracing::debug!("Evidence for unknown component {id} ignored");
                    return None;
                };
                let result = self.build_match(component, group);
                (result.confidence >= threshold).then_some(result)
            })
            .collect();

        matches.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.component_id.cmp(&b.component_id))
        });
        matches
    }

    fn build_match(&self, component: &Component, mut group: Vec<Evidence>) -> ComponentMatch {
        group.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.matched_pattern.cmp(&b.matched_pattern))
                .then_with(|| a.matched_feature.cmp(&b.matched_feature))
        });

        let confidences: Vec<f64> = group.iter().map(|e| e.confidence).collect();
        let confidence = self.score_sorted(&confidences);
        let top_k = self.config.top_k.max(1).min(group.len());

        let count = |kind: EvidenceKind| group.iter().filter(|e| e.kind == kind).count();
        let exact_hits = count(EvidenceKind::Exact);
        let substring_hits = count(EvidenceKind::Substring);
        let fuzzy_hits = count(EvidenceKind::Fuzzy);

        let match_method = match (exact_hits + substring_hits > 0, fuzzy_hits > 0) {
            (true, true) => format!("{DIRECT_METHOD} + {FUZZY_METHOD}"),
            (false, true) => FUZZY_METHOD.to_string(),
            _ => DIRECT_METHOD.to_string(),
        };

        let matched_patterns = group
            .iter()
            .take(self.config.max_reported_patterns)
            .map(|e| MatchedPattern {
                pattern: e.matched_pattern.clone(),
                matched_string: e.matched_feature.clone(),
                confidence: e.confidence,
                kind: e.kind,
            })
            .collect();

        ComponentMatch {
            component_id: component.id,
            component: component.display_name(),
            name: component.name.clone(),
            version: component.known_version().map(str::to_string),
            ecosystem: component.ecosystem.clone(),
            confidence,
            license: component.license.clone(),
            match_type: majority_type(&group[..top_k]),
            evidence: EvidenceSummary {
                signatures_matched: group.len(),
                exact_hits,
                substring_hits,
                fuzzy_hits,
                match_method,
                confidence_score: format!("{:.1}%", confidence * 100.0),
                matched_patterns,
            },
        }
    }
}

/// Most frequent signature type, ties going to the higher-priority type.
fn majority_type(evidence: &[Evidence]) -> SignatureType {
    let mut counts = [0usize; 4];
    for entry in evidence {
        counts[usize::from(entry.sig_type.priority())] += 1;
    }
    SignatureType::BY_PRIORITY
        .into_iter()
        .zip(counts)
        .fold((SignatureType::String, 0), |best, (ty, n)| {
            if n > best.1 {
                (ty, n)
            } else {
                best
            }
        })
        .0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Signature;

    fn components() -> HashMap<ComponentId, Component> {
        [
            Component::new(1, "FFmpeg").with_version("4.4").with_license("LGPL-2.1"),
            Component::new(2, "zlib").with_version("unknown"),
            Component::new(3, "aardvark"),
        ]
        .into_iter()
        .map(|c| (c.id, c))
        .collect()
    }

    fn exact(id: i64, component: i64, pattern: &str, ty: SignatureType, confidence: f64) -> Evidence {
        Evidence::exact(&Signature::new(id, component, pattern, ty, confidence), pattern)
    }

    #[test]
    fn test_single_hit_score() {
        let agg = ConfidenceAggregator::default();
        let matches = agg.aggregate(
            vec![exact(1, 1, "av_register_all", SignatureType::Function, 0.9)],
            &components(),
            0.3,
        );
        assert_eq!(matches.len(), 1);
        assert!((matches[0].confidence - 0.92).abs() < 1e-9);
        assert_eq!(matches[0].component, "FFmpeg@4.4");
        assert_eq!(matches[0].match_type, SignatureType::Function);
        assert_eq!(matches[0].evidence.match_method, DIRECT_METHOD);
        assert_eq!(matches[0].evidence.confidence_score, "92.0%");
    }

    #[test]
    fn test_top_k_and_bonus_cap() {
        let agg = ConfidenceAggregator::default();
        let mut confidences = vec![0.9; 10];
        confidences.extend(vec![0.1; 15]);
        // mean of top ten is 0.9, bonus capped at 0.2
        assert_eq!(agg.score(&confidences), 1.0);
        assert!((agg.score(&[0.5, 0.3]) - 0.44).abs() < 1e-9);
        assert_eq!(agg.score(&[]), 0.0);
    }

    #[test]
    fn test_score_sorted_agrees_with_score() {
        let agg = ConfidenceAggregator::default();
        let unordered = [0.4, 0.95, 0.1, 0.7, 0.7, 0.85, 0.2, 0.6, 0.3, 0.9, 0.5, 0.05];
        let mut descending = unordered.to_vec();
        descending.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));

        assert_eq!(agg.score(&unordered), agg.score_sorted(&descending));
        assert_eq!(agg.score_sorted(&[]), 0.0);
    }

    #[test]
    fn test_unknown_version_suppressed() {
        let agg = ConfidenceAggregator::default();
        let matches = agg.aggregate(
            vec![exact(1, 2, "deflateInit2_", SignatureType::Function, 0.8)],
            &components(),
            0.3,
        );
        assert_eq!(matches[0].component, "zlib");
        assert_eq!(matches[0].version, None);
    }

    #[test]
    fn test_threshold_drops_and_ties_sort_by_name() {
        let agg = ConfidenceAggregator::default();
        let evidence = vec![
            exact(1, 1, "av_register_all", SignatureType::Function, 0.5),
            exact(2, 3, "aardvark_init", SignatureType::String, 0.5),
            exact(3, 2, "deflateBound", SignatureType::Function, 0.1),
        ];
        let matches = agg.aggregate(evidence, &components(), 0.3);
        let names: Vec<&str> = matches.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["FFmpeg", "aardvark"]);
    }

    #[test]
    fn test_majority_type_with_priority_tiebreak() {
        let tie = vec![
            exact(1, 1, "a_one", SignatureType::Function, 0.9),
            exact(2, 1, "a_two", SignatureType::Constant, 0.9),
        ];
        assert_eq!(majority_type(&tie), SignatureType::Function);

        let majority = vec![
            exact(1, 1, "a_one", SignatureType::String, 0.9),
            exact(2, 1, "a_two", SignatureType::Constant, 0.9),
            exact(3, 1, "a_three", SignatureType::Constant, 0.9),
        ];
        assert_eq!(majority_type(&majority), SignatureType::Constant);
    }

    #[test]
    fn test_reported_patterns_capped() {
        let agg = ConfidenceAggregator::default();
        let evidence: Vec<Evidence> = (0..30)
            .map(|i| exact(i, 1, &format!("av_sym_{i:02}"), SignatureType::Function, 0.9))
            .collect();
        let matches = agg.aggregate(evidence, &components(), 0.3);
        assert_eq!(matches[0].evidence.signatures_matched, 30);
        assert_eq!(matches[0].evidence.matched_patterns.len(), 20);
    }

    #[test]
    fn test_fuzzy_only_method() {
        let agg = ConfidenceAggregator::default();
        let evidence = vec![Evidence::fuzzy(ComponentId(1), 0.45, "minhash similarity", "")];
        let matches = agg.aggregate(evidence, &components(), 0.3);
        assert_eq!(matches[0].evidence.match_method, FUZZY_METHOD);
        assert_eq!(matches[0].match_type, SignatureType::Pattern);
    }
}
