//! Threshold-gated similarity matching

use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::strategies::fold;
use super::StringMatcher;
use crate::error::{check_threshold, ConfigResult};
use crate::result::{MatchResult, MatchType};
use crate::similarity::SimilarityCalculator;

/// Threshold used when none is given
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.6;

/// Candidate lists at least this long are scored on the rayon pool
const PARALLEL_THRESHOLD: usize = 1000;

/// Picks the most similar candidate if it clears the threshold.
///
/// Ties at the best score go to the first candidate in input order. Case is
/// folded before scoring unless the matcher is case sensitive.
#[derive(Debug, Clone)]
pub struct FuzzyMatcher {
    threshold: f64,
    case_sensitive: bool,
    debug: bool,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_FUZZY_THRESHOLD,
            case_sensitive: false,
            debug: false,
        }
    }
}

impl FuzzyMatcher {
    /// Fails unless `threshold` is in (0, 1]
    pub fn new(threshold: f64) -> ConfigResult<Self> {
        Ok(Self {
            threshold: check_threshold(threshold)?,
            ..Self::default()
        })
    }

    /// Matcher for a threshold constant already known to be in range
    pub(super) fn preset(threshold: f64) -> Self {
        debug_assert!(check_threshold(threshold).is_ok());
        Self {
            threshold,
            ..Self::default()
        }
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn set_threshold(&mut self, threshold: f64) -> ConfigResult<()> {
        self.threshold = check_threshold(threshold)?;
        if self.debug {
            debug!(threshold, "fuzzy threshold updated");
        }
        Ok(())
    }

    /// Similarity of `query` to `candidate` under this matcher's case handling
    pub fn score(&self, query: &str, candidate: &str) -> f64 {
        SimilarityCalculator::calculate_similarity(
            &fold(query, self.case_sensitive),
            &fold(candidate, self.case_sensitive),
        )
    }

    /// Score every candidate, in input order
    #[cfg(feature = "parallel")]
    fn scores<S: AsRef<str> + Sync>(&self, query: &str, candidates: &[S]) -> Vec<f64> {
        let q = fold(query, self.case_sensitive);
        if candidates.len() >= PARALLEL_THRESHOLD {
            candidates
                .par_iter()
                .map(|c| self.score_folded(&q, c.as_ref()))
                .collect()
        } else {
            candidates
                .iter()
                .map(|c| self.score_folded(&q, c.as_ref()))
                .collect()
        }
    }

    /// Score every candidate, in input order
    #[cfg(not(feature = "parallel"))]
    fn scores<S: AsRef<str>>(&self, query: &str, candidates: &[S]) -> Vec<f64> {
        let q = fold(query, self.case_sensitive);
        candidates
            .iter()
            .map(|c| self.score_folded(&q, c.as_ref()))
            .collect()
    }

    #[inline]
    fn score_folded(&self, folded_query: &str, candidate: &str) -> f64 {
        SimilarityCalculator::calculate_similarity(folded_query, &fold(candidate, self.case_sensitive))
    }

    /// Best candidate regardless of threshold, first wins ties
    pub(crate) fn best<S: AsRef<str> + Sync>(&self, query: &str, candidates: &[S]) -> Option<(usize, f64)> {
        if query.is_empty() || candidates.is_empty() {
            return None;
        }
        argmax(self.scores(query, candidates))
    }

    /// All candidates scoring at least the threshold, best first; equal
    /// scores keep input order
    pub fn matches_above_threshold<'a, S: AsRef<str> + Sync>(
        &self,
        query: &str,
        candidates: &'a [S],
    ) -> Vec<(&'a str, f64)> {
        if query.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<(&'a str, f64)> = self
            .scores(query, candidates)
            .into_iter()
            .enumerate()
            .filter(|(_, score)| *score >= self.threshold)
            .map(|(idx, score)| (candidates[idx].as_ref(), score))
            .collect();

        matches.sort_by(|a, b| b.1.total_cmp(&a.1));
        if self.debug {
            debug!(query, count = matches.len(), "matches above threshold");
        }
        matches
    }

    /// Like [`match_string_with_score`](StringMatcher::match_string_with_score)
    /// but scores `weight * prefix + (1 - weight) * overall`, favouring
    /// candidates that start like the query. `weight` is clamped to [0, 1].
    pub fn match_with_prefix_bias<'a, S: AsRef<str>>(
        &self,
        query: &str,
        candidates: &'a [S],
        weight: f64,
    ) -> Option<(&'a str, f64)> {
        if query.is_empty() {
            return None;
        }
        let weight = if weight.is_nan() { 0.0 } else { weight.clamp(0.0, 1.0) };
        let q = fold(query, self.case_sensitive);

        let combined = candidates.iter().map(|c| {
            let (prefix, overall) =
                SimilarityCalculator::prefix_similarity(&q, &fold(c.as_ref(), self.case_sensitive), None);
            prefix * weight + overall * (1.0 - weight)
        });

        let (idx, score) = argmax(combined)?;
        let found = (score >= self.threshold).then(|| (candidates[idx].as_ref(), score));
        if self.debug {
            debug!(query, score, matched = found.is_some(), "prefix-biased fuzzy match");
        }
        found
    }
}

/// Index and value of the maximum, first wins ties
pub(crate) fn argmax(scores: impl IntoIterator<Item = f64>) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, score) in scores.into_iter().enumerate() {
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((idx, score)),
        }
    }
    best
}

impl StringMatcher for FuzzyMatcher {
    fn match_string_with_score<'a, S: AsRef<str> + Sync>(
        &self,
        query: &str,
        candidates: &'a [S],
    ) -> Option<(&'a str, f64)> {
        let (idx, score) = self.best(query, candidates)?;
        if score >= self.threshold {
            if self.debug {
                debug!(query, matched = candidates[idx].as_ref(), score, "fuzzy match");
            }
            Some((candidates[idx].as_ref(), score))
        } else {
            if self.debug {
                debug!(query, best_score = score, threshold = self.threshold, "no fuzzy match");
            }
            None
        }
    }

    fn match_with_result<S: AsRef<str> + Sync>(&self, query: &str, candidates: &[S]) -> MatchResult {
        match self.best(query, candidates) {
            Some((idx, score)) if score >= self.threshold => {
                MatchResult::scored(candidates[idx].as_ref(), score, MatchType::Fuzzy)
            }
            Some((_, score)) => MatchResult::new(None, score, MatchType::None, 0.0),
            None => MatchResult::none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use pretty_assertions::assert_eq;

    fn matcher(threshold: f64) -> FuzzyMatcher {
        FuzzyMatcher::new(threshold).unwrap()
    }

    #[test]
    fn test_transposition_matches() {
        let found = matcher(0.6).match_string_with_score("tset", &["test", "example", "sample"]);
        assert_eq!(found, Some(("test", 0.75)));
    }

    #[test]
    fn test_below_threshold() {
        assert_eq!(matcher(0.6).match_string("xyz", &["abc", "def", "ghi"]), None);
        let result = matcher(0.9).match_with_result("tset", &["test"]);
        assert!(!result.is_matched());
        assert_eq!(result.similarity_score(), 0.75);
    }

    #[test]
    fn test_first_wins_ties() {
        assert_eq!(matcher(0.5).match_string("abcd", &["abcx", "abcy"]), Some("abcx"));
    }

    #[test]
    fn test_case_folding() {
        assert_eq!(matcher(0.9).match_string("TEST", &["test"]), Some("test"));
        let sensitive = matcher(0.9).with_case_sensitive(true);
        assert_eq!(sensitive.match_string("TEST", &["test"]), None);
    }

    #[test]
    fn test_invalid_threshold() {
        assert!(matches!(FuzzyMatcher::new(0.0), Err(ConfigError::InvalidThreshold { .. })));
        assert!(FuzzyMatcher::new(1.5).is_err());

        let mut m = FuzzyMatcher::default();
        assert!(m.set_threshold(-0.1).is_err());
        assert_eq!(m.threshold(), DEFAULT_FUZZY_THRESHOLD);
        m.set_threshold(0.8).unwrap();
        assert_eq!(m.threshold(), 0.8);
    }

    #[test]
    fn test_matches_above_threshold() {
        let all = matcher(0.5).matches_above_threshold("test", &["tent", "xyz", "test", "best"]);
        assert_eq!(all, vec![("test", 1.0), ("tent", 0.75), ("best", 0.75)]);
    }

    #[test]
    fn test_prefix_bias() {
        let candidates = ["H48E012_final", "X48E012"];
        let biased = matcher(0.6).match_with_prefix_bias("H48E012", &candidates, 0.7);
        assert_eq!(biased.map(|(m, _)| m), Some("H48E012_final"));
        assert_eq!(matcher(0.6).match_string("H48E012", &candidates), Some("X48E012"));
    }

    #[test]
    fn test_empty_inputs() {
        let empty: [&str; 0] = [];
        assert_eq!(matcher(0.6).match_string("abc", &empty), None);
        assert_eq!(matcher(0.6).match_string("", &["abc"]), None);
    }

    #[test]
    fn test_argmax() {
        assert_eq!(argmax([0.2, 0.9, 0.9, 0.1]), Some((1, 0.9)));
        assert_eq!(argmax(Vec::<f64>::new()), None);
    }
}
