//! End-to-end matching tests: corpus cache, candidate matching, fuzzy
//! backstop and confidence aggregation through [`SignatureMatcher`].

use binsniff::config::AppConfig;
use binsniff::model::{
    Component, EvidenceKind, ExtractedFeatures, Signature, SignatureType,
};
use binsniff::{CorpusCache, GenericityFilter, MemoryStore, SignatureMatcher};
use std::sync::Arc;

// ============================================================================
// Fixtures
// ============================================================================

fn matcher_for(store: &MemoryStore, config: &AppConfig) -> SignatureMatcher {
    let cache = CorpusCache::load(
        store,
        GenericityFilter::from_config(&config.genericity),
        &config.matching,
        &config.fuzzy,
    );
    SignatureMatcher::new(Arc::new(cache), config)
}

fn ffmpeg_store() -> MemoryStore {
    MemoryStore::new()
        .with_component(Component::new(1, "Z"))
        .with_signature(Signature::new(1, 1, "av_register_all", SignatureType::Function, 0.9))
        .with_signature(Signature::new(2, 1, "avcodec_decode_video2", SignatureType::Function, 0.9))
}

/// Two libraries that share generic vocabulary but own distinct symbols.
fn overlapping_store() -> MemoryStore {
    MemoryStore::new()
        .with_component(
            Component::new(1, "zlib")
                .with_version("1.2.13")
                .with_license("Zlib"),
        )
        .with_component(
            Component::new(2, "libpng")
                .with_version("1.6.40")
                .with_license("libpng-2.0"),
        )
        .with_signature(Signature::new(1, 1, "deflateInit2_", SignatureType::Function, 0.9))
        .with_signature(Signature::new(2, 1, "inflateEnd", SignatureType::Function, 0.85))
        .with_signature(Signature::new(3, 1, "buffer", SignatureType::String, 0.6))
        .with_signature(Signature::new(4, 2, "png_create_read_struct", SignatureType::Function, 0.9))
        .with_signature(Signature::new(5, 2, "buffer", SignatureType::String, 0.6))
        .with_signature(Signature::new(6, 2, "init", SignatureType::String, 0.5))
}

// ============================================================================
// Scenarios
// ============================================================================

mod scenarios {
    use super::*;

    #[test]
    fn single_exact_hit_scores_092() {
        let matcher = matcher_for(&ffmpeg_store(), &AppConfig::default());
        let features = ExtractedFeatures::from_strings(["av_register_all", "unused_noise"]);

        let matches = matcher.match_features(&features, 0.3, false);

        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(m.component, "Z");
        assert!((m.confidence - 0.92).abs() < 1e-9, "got {}", m.confidence);
        assert_eq!(m.evidence.signatures_matched, 1);
        assert_eq!(m.evidence.match_method, "direct string matching");
        assert_eq!(m.match_type, SignatureType::Function);
    }

    #[test]
    fn generic_term_never_yields_evidence() {
        let store = MemoryStore::new()
            .with_component(Component::new(1, "logger"))
            .with_signature(Signature::new(1, 1, "log", SignatureType::String, 0.9));
        let matcher = matcher_for(&store, &AppConfig::default());
        let features = ExtractedFeatures::from_strings(["log", "LOG", "log_message"]);

        assert!(matcher.find_evidence(&features).is_empty());
        assert!(matcher.match_features(&features, 0.0, false).is_empty());
    }

    #[test]
    fn shared_generic_vocabulary_does_not_identify_anything() {
        let matcher = matcher_for(&overlapping_store(), &AppConfig::default());
        let features = ExtractedFeatures::from_strings(["buffer", "init", "BUFFER"]);

        assert!(matcher.match_features(&features, 0.0, false).is_empty());
    }

    #[test]
    fn specific_symbols_pick_the_right_component() {
        let matcher = matcher_for(&overlapping_store(), &AppConfig::default());
        let features = ExtractedFeatures::from_strings(["buffer"])
            .with_functions(["deflateInit2_", "inflateEnd"]);

        let matches = matcher.match_features(&features, 0.3, false);

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].component, "zlib@1.2.13");
        assert_eq!(matches[0].license.as_deref(), Some("Zlib"));
        assert_eq!(matches[0].evidence.exact_hits, 2);
    }

    #[test]
    fn matches_are_ranked_by_confidence() {
        let matcher = matcher_for(&overlapping_store(), &AppConfig::default());
        let features = ExtractedFeatures::from_strings(["png_create_read_struct", "inflateEnd"]);

        let matches = matcher.match_features(&features, 0.3, false);

        let names: Vec<_> = matches.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["libpng", "zlib"]);
        assert!(matches[0].confidence >= matches[1].confidence);
    }

    #[test]
    fn unknown_version_is_not_displayed() {
        let store = MemoryStore::new()
            .with_component(Component::new(7, "libwebp").with_version("unknown"))
            .with_signature(Signature::new(1, 7, "WebPDecodeRGBA", SignatureType::Function, 0.8));
        let matcher = matcher_for(&store, &AppConfig::default());

        let matches =
            matcher.match_features(&ExtractedFeatures::from_strings(["WebPDecodeRGBA"]), 0.3, false);

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].component, "libwebp");
        assert_eq!(matches[0].version, None);
    }
}

// ============================================================================
// Candidate matching
// ============================================================================

mod candidates {
    use super::*;

    #[test]
    fn exact_match_ignores_case() {
        let matcher = matcher_for(&ffmpeg_store(), &AppConfig::default());
        let features = ExtractedFeatures::new().with_symbols(["AV_REGISTER_ALL"]);

        let evidence = matcher.find_evidence(&features);

        assert_eq!(evidence.len(), 1);
        assert_eq!(evidence[0].kind, EvidenceKind::Exact);
        assert!((evidence[0].confidence - 0.9).abs() < 1e-12);
        assert_eq!(evidence[0].matched_feature, "AV_REGISTER_ALL");
    }

    #[test]
    fn substring_hit_is_discounted() {
        let matcher = matcher_for(&ffmpeg_store(), &AppConfig::default());
        let features = ExtractedFeatures::from_strings(["wrapped_avcodec_decode_video2_legacy"]);

        let evidence = matcher.find_evidence(&features);

        assert_eq!(evidence.len(), 1);
        assert_eq!(evidence[0].kind, EvidenceKind::Substring);
        assert!((evidence[0].confidence - 0.72).abs() < 1e-9);
    }

    #[test]
    fn substring_hits_are_capped_per_signature() {
        let matcher = matcher_for(&ffmpeg_store(), &AppConfig::default());
        let features = ExtractedFeatures::from_strings(
            (0..12).map(|i| format!("call_{i}_av_register_all_wrapper")),
        );

        let evidence = matcher.find_evidence(&features);

        assert_eq!(evidence.len(), 5);
        assert!(evidence.iter().all(|e| e.kind == EvidenceKind::Substring));
    }

    #[test]
    fn exact_hit_suppresses_substring_hits_for_the_same_signature() {
        let matcher = matcher_for(&ffmpeg_store(), &AppConfig::default());
        let features = ExtractedFeatures::from_strings([
            "av_register_all",
            "my_av_register_all_shim",
        ]);

        let evidence = matcher.find_evidence(&features);

        assert_eq!(evidence.len(), 1);
        assert_eq!(evidence[0].kind, EvidenceKind::Exact);
    }
}

// ============================================================================
// Fuzzy backstop
// ============================================================================

mod fuzzy {
    use super::*;

    fn zlib_store() -> MemoryStore {
        MemoryStore::new()
            .with_component(Component::new(1, "zlib").with_version("1.3"))
            .with_signature(Signature::new(1, 1, "deflateInit2_", SignatureType::Function, 0.9))
            .with_signature(Signature::new(2, 1, "deflateSetDictionary", SignatureType::Function, 0.9))
            .with_signature(Signature::new(3, 1, "inflateGetHeader", SignatureType::Function, 0.9))
    }

    fn near_miss_features() -> ExtractedFeatures {
        ExtractedFeatures::new().with_functions([
            "deflateInit2",
            "deflateSetDictionar",
            "inflateGetHeade",
        ])
    }

    #[test]
    fn deep_mode_adds_similarity_evidence() {
        let matcher = matcher_for(&zlib_store(), &AppConfig::default());

        assert!(matcher.match_features(&near_miss_features(), 0.3, false).is_empty());

        let matches = matcher.match_features(&near_miss_features(), 0.3, true);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].evidence.fuzzy_hits, 1);
        assert_eq!(matches[0].evidence.match_method, "fuzzy similarity");
        assert!(matches[0].confidence <= 0.5 + 0.02 + 1e-9);
    }

    /// Deterministic lowercase text over `alphabet`.
    fn pseudo_random_word(state: &mut u64, alphabet: &[u8], len: usize) -> String {
        (0..len)
            .map(|_| {
                *state = state
                    .wrapping_mul(6_364_136_223_846_793_005)
                    .wrapping_add(1_442_695_040_888_963_407);
                let index = usize::try_from(*state >> 33).unwrap_or(0) % alphabet.len();
                char::from(alphabet[index])
            })
            .collect()
    }

    #[test]
    fn deep_mode_ignores_unrelated_components_in_large_artifacts() {
        const ARTIFACT: &[u8] = b"abcdefghijklm";
        const OTHER: &[u8] = b"nopqrstuvwxyz";
        let mut state = 0x5eed_u64;

        // every component shares exactly one trigram with the artifact
        let mut store = zlib_store();
        for c in 2..=400_i64 {
            let pattern = format!(
                "{}_{}",
                pseudo_random_word(&mut state, OTHER, 16),
                pseudo_random_word(&mut state, ARTIFACT, 3)
            );
            store = store
                .with_component(Component::new(c, format!("comp{c}")))
                .with_signature(Signature::new(c + 100, c, pattern, SignatureType::String, 0.9));
        }

        let noise: Vec<String> = (0..5000)
            .map(|_| pseudo_random_word(&mut state, ARTIFACT, 8))
            .collect();
        let features = near_miss_features().with_symbols(noise);
        let matcher = matcher_for(&store, &AppConfig::default());

        let matches = matcher.match_features(&features, 0.3, true);

        let names: Vec<_> = matches.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["zlib"]);
    }

    #[test]
    fn auto_backstop_runs_on_sparse_evidence() {
        let mut config = AppConfig::default();
        config.fuzzy.auto_backstop = true;
        let matcher = matcher_for(&zlib_store(), &config);

        let matches = matcher.match_features(&near_miss_features(), 0.3, false);

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, "zlib");
    }
}

// ============================================================================
// Thresholds
// ============================================================================

#[test]
fn raising_the_threshold_only_shrinks_results() {
    let matcher = matcher_for(&overlapping_store(), &AppConfig::default());
    let features = ExtractedFeatures::from_strings([
        "png_create_read_struct",
        "deflateInit2_",
        "inflateEnd",
    ]);

    let mut previous = usize::MAX;
    for step in 0..=20 {
        let threshold = f64::from(step) / 20.0;
        let matches = matcher.match_features(&features, threshold, false);
        assert!(matches.iter().all(|m| m.confidence >= threshold));
        assert!(matches.len() <= previous);
        previous = matches.len();
    }
}

#[test]
fn empty_corpus_matches_nothing() {
    let matcher = matcher_for(&MemoryStore::new(), &AppConfig::default());
    let features = ExtractedFeatures::from_strings(["av_register_all"]);

    assert!(matcher.match_features(&features, 0.0, true).is_empty());
    assert!(matcher.cache().is_empty());
}
