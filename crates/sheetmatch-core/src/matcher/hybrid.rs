//! Exact-first, fuzzy-fallback matching

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::exact::ExactMatcher;
use super::fuzzy::{FuzzyMatcher, DEFAULT_FUZZY_THRESHOLD};
use super::StringMatcher;
use crate::error::{check_threshold, ConfigResult};
use crate::result::MatchResult;

/// Which layer of a [`HybridMatcher`] produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchLayer {
    Exact,
    Fuzzy,
    /// Second fuzzy pass at the fallback threshold
    Fallback,
    None,
}

/// Tries an [`ExactMatcher`] and falls back to a [`FuzzyMatcher`].
///
/// An exact hit always wins with score 1.0 and the fuzzy layer is not
/// evaluated. Both layers share the case setting, folding case by default.
#[derive(Debug, Clone)]
pub struct HybridMatcher {
    exact: ExactMatcher,
    fuzzy: FuzzyMatcher,
    debug: bool,
}

impl Default for HybridMatcher {
    fn default() -> Self {
        Self {
            exact: ExactMatcher::new().with_case_sensitive(false),
            fuzzy: FuzzyMatcher::default(),
            debug: false,
        }
    }
}

impl HybridMatcher {
    pub const DEFAULT_THRESHOLD: f64 = DEFAULT_FUZZY_THRESHOLD;

    pub fn new(fuzzy_threshold: f64) -> ConfigResult<Self> {
        Ok(Self {
            fuzzy: FuzzyMatcher::new(fuzzy_threshold)?,
            ..Self::default()
        })
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.exact = self.exact.with_case_sensitive(case_sensitive);
        self.fuzzy = self.fuzzy.with_case_sensitive(case_sensitive);
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.exact = self.exact.with_debug(debug);
        self.fuzzy = self.fuzzy.with_debug(debug);
        self.debug = debug;
        self
    }

    pub fn exact(&self) -> &ExactMatcher {
        &self.exact
    }

    pub fn fuzzy(&self) -> &FuzzyMatcher {
        &self.fuzzy
    }

    pub fn fuzzy_threshold(&self) -> f64 {
        self.fuzzy.threshold()
    }

    pub fn set_fuzzy_threshold(&mut self, threshold: f64) -> ConfigResult<()> {
        self.fuzzy.set_threshold(threshold)
    }

    /// Match and report which layer answered
    pub fn match_with_strategy<'a, S: AsRef<str> + Sync>(
        &self,
        query: &str,
        candidates: &'a [S],
    ) -> (Option<(&'a str, f64)>, MatchLayer) {
        if let Some(found) = self.exact.match_string_with_score(query, candidates) {
            return (Some(found), MatchLayer::Exact);
        }
        match self.fuzzy.match_string_with_score(query, candidates) {
            Some(found) => (Some(found), MatchLayer::Fuzzy),
            None => (None, MatchLayer::None),
        }
    }

    /// Regular hybrid match, then a second fuzzy pass accepting anything at
    /// or above `fallback` when the first pass found nothing.
    ///
    /// `fallback` must be in (0, 1]; a value above the configured threshold
    /// never adds matches.
    pub fn match_with_fallback_threshold<'a, S: AsRef<str> + Sync>(
        &self,
        query: &str,
        candidates: &'a [S],
        fallback: f64,
    ) -> ConfigResult<(Option<(&'a str, f64)>, MatchLayer)> {
        let fallback = check_threshold(fallback)?;

        let (found, layer) = self.match_with_strategy(query, candidates);
        if found.is_some() {
            return Ok((found, layer));
        }

        Ok(match self.fuzzy.best(query, candidates) {
            Some((idx, score)) if score >= fallback => {
                if self.debug {
                    debug!(query, matched = candidates[idx].as_ref(), score, fallback, "fallback match");
                }
                (Some((candidates[idx].as_ref(), score)), MatchLayer::Fallback)
            }
            _ => (None, MatchLayer::None),
        })
    }
}

impl StringMatcher for HybridMatcher {
    fn match_string_with_score<'a, S: AsRef<str> + Sync>(
        &self,
        query: &str,
        candidates: &'a [S],
    ) -> Option<(&'a str, f64)> {
        let (found, layer) = self.match_with_strategy(query, candidates);
        if self.debug {
            debug!(query, ?layer, "hybrid match");
        }
        found
    }

    fn match_with_result<S: AsRef<str> + Sync>(&self, query: &str, candidates: &[S]) -> MatchResult {
        let exact = self.exact.match_with_result(query, candidates);
        if exact.is_matched() {
            return exact;
        }
        self.fuzzy.match_with_result(query, candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::MatchType;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_exact_wins() {
        let matcher = HybridMatcher::new(0.6).unwrap();
        assert_eq!(
            matcher.match_string_with_score("test", &["test", "tset"]),
            Some(("test", 1.0))
        );
        let result = matcher.match_with_result("test", &["tset", "test"]);
        assert_eq!(result.match_type(), MatchType::Exact);
        assert_eq!(result.matched_string(), Some("test"));
    }

    #[test]
    fn test_fuzzy_fallback() {
        let matcher = HybridMatcher::new(0.6).unwrap();
        let (found, layer) = matcher.match_with_strategy("tset", &["test", "example"]);
        assert_eq!(found, Some(("test", 0.75)));
        assert_eq!(layer, MatchLayer::Fuzzy);
        assert_eq!(matcher.match_with_result("tset", &["test"]).match_type(), MatchType::Fuzzy);
    }

    #[test]
    fn test_no_match() {
        let matcher = HybridMatcher::new(0.6).unwrap();
        assert_eq!(matcher.match_with_strategy("xyz", &["abc"]), (None, MatchLayer::None));
    }

    #[test]
    fn test_folds_case_by_default() {
        let matcher = HybridMatcher::default();
        assert_eq!(matcher.match_with_strategy("BEIJING", &["beijing"]).1, MatchLayer::Exact);
        let sensitive = HybridMatcher::default().with_case_sensitive(true);
        assert_eq!(sensitive.match_with_strategy("BEIJING", &["beijing"]).1, MatchLayer::None);
    }

    #[test]
    fn test_fallback_threshold() {
        let matcher = HybridMatcher::new(0.9).unwrap();
        let (found, layer) = matcher
            .match_with_fallback_threshold("tset", &["test"], 0.4)
            .unwrap();
        assert_eq!(found, Some(("test", 0.75)));
        assert_eq!(layer, MatchLayer::Fallback);

        let (found, _) = matcher
            .match_with_fallback_threshold("xyz", &["abc"], 0.4)
            .unwrap();
        assert_eq!(found, None);
        assert!(matcher.match_with_fallback_threshold("x", &["x"], 0.0).is_err());
    }

    #[test]
    fn test_set_fuzzy_threshold() {
        let mut matcher = HybridMatcher::default();
        assert_eq!(matcher.fuzzy_threshold(), HybridMatcher::DEFAULT_THRESHOLD);
        matcher.set_fuzzy_threshold(0.7).unwrap();
        assert_eq!(matcher.fuzzy_threshold(), 0.7);
        assert!(matcher.set_fuzzy_threshold(2.0).is_err());
    }
}
