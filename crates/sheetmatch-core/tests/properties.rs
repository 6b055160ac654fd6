use std::collections::BTreeMap;

use proptest::prelude::*;
use sheetmatch_core::{
    FuzzyMatcher, HybridMatcher, MatchResult, MatchType, MultiMatchResult, SimilarityCalculator,
    StringMatcher,
};

fn word() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,12}"
}

/// Any score a matcher can report, not just short decimals
fn score() -> impl Strategy<Value = f64> {
    prop_oneof![
        0.0f64..=1.0,
        (1u32..=64, 1u32..=64).prop_map(|(a, b)| f64::from(a.min(b)) / f64::from(a.max(b))),
    ]
}

fn match_result() -> impl Strategy<Value = MatchResult> {
    prop_oneof![
        Just(MatchResult::none()),
        ("[a-z]{1,8}", score()).prop_map(|(value, s)| MatchResult::scored(value, s, MatchType::Fuzzy)),
        "[a-z]{1,8}".prop_map(MatchResult::exact),
    ]
}

proptest! {
    /// Every string is fully similar to itself, the empty string included.
    #[test]
    fn similarity_identity(s in ".{0,16}") {
        prop_assert_eq!(SimilarityCalculator::calculate_similarity(&s, &s), 1.0);
    }

    #[test]
    fn similarity_symmetric(a in word(), b in word()) {
        prop_assert_eq!(
            SimilarityCalculator::calculate_similarity(&a, &b),
            SimilarityCalculator::calculate_similarity(&b, &a)
        );
    }

    #[test]
    fn similarity_in_unit_range(a in ".{0,16}", b in ".{0,16}") {
        let s = SimilarityCalculator::calculate_similarity(&a, &b);
        prop_assert!((0.0..=1.0).contains(&s));
    }

    /// The fuzzy matcher never reports a candidate below its threshold.
    #[test]
    fn fuzzy_respects_threshold(
        query in word(),
        candidates in prop::collection::vec(word(), 0..8),
        threshold in 1u32..=100,
    ) {
        let threshold = f64::from(threshold) / 100.0;
        let matcher = FuzzyMatcher::new(threshold).unwrap();
        if let Some((_, s)) = matcher.match_string_with_score(&query, &candidates) {
            prop_assert!(s >= threshold);
            prop_assert!(s <= 1.0);
        }
    }

    /// An equal candidate always wins with score 1.0, wherever it sits.
    #[test]
    fn hybrid_prefers_equal_candidate(
        query in "[a-z]{1,10}",
        mut candidates in prop::collection::vec("[a-z]{1,10}", 0..8),
        position in 0usize..8,
    ) {
        let position = position.min(candidates.len());
        candidates.insert(position, query.clone());

        let matcher = HybridMatcher::new(0.6).unwrap();
        let found = matcher.match_string_with_score(&query, &candidates);
        prop_assert_eq!(found, Some((query.as_str(), 1.0)));
    }

    /// Result scores stay in [0, 1] whatever the caller passes in.
    #[test]
    fn result_scores_clamped(s in proptest::num::f64::ANY, c in proptest::num::f64::ANY) {
        let result = MatchResult::new(Some("x".to_string()), s, MatchType::Fuzzy, c);
        prop_assert!((0.0..=1.0).contains(&result.similarity_score()));
        prop_assert!((0.0..=1.0).contains(&result.confidence()));
    }

    #[test]
    fn multi_result_json_round_trip(
        matches in prop::collection::btree_map("[a-z]{1,6}", match_result(), 0..5),
        overall in score(),
        source in ".{0,20}",
    ) {
        let missing: Vec<String> = matches
            .iter()
            .filter(|(_, m)| !m.is_matched())
            .map(|(name, _)| name.clone())
            .collect();
        let result = MultiMatchResult::new(source, matches, overall, missing);

        let restored = MultiMatchResult::from_json(&result.to_json().unwrap()).unwrap();
        prop_assert_eq!(restored.source_string(), result.source_string());
        prop_assert_eq!(restored.overall_score(), result.overall_score());
        prop_assert_eq!(restored.matched_values(), result.matched_values());
        for (name, m) in result.matches() {
            prop_assert_eq!(restored.get_match_score(name), m.similarity_score());
        }
        prop_assert_eq!(restored.is_complete(), result.is_complete());
        prop_assert_eq!(restored, result);
    }
}

#[test]
fn empty_btree_round_trip() {
    let result = MultiMatchResult::new("", BTreeMap::new(), 0.0, Vec::new());
    let restored = MultiMatchResult::from_json(&result.to_json().unwrap()).unwrap();
    assert_eq!(restored, result);
}
