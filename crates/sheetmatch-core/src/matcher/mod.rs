//! Single-query matchers
//!
//! Every matcher implements [`StringMatcher`]: given a query and an ordered
//! candidate list it returns the best candidate, borrowed from the list, and
//! its score. "No match" is `None`, never an error.
//!
//! - [`ExactMatcher`]: equality or containment, score 1.0
//! - [`FuzzyMatcher`]: best edit-distance similarity above a threshold
//! - [`HybridMatcher`]: exact first, fuzzy fallback
//! - [`RomanizationMatcher`](crate::romanize::RomanizationMatcher): hybrid
//!   plus sound-alike rules and transliteration variants
//!
//! [`Matcher`] closes over all four for callers that pick a strategy at
//! runtime. [`NameMatcher`] applies the exact and fuzzy layers to names and
//! patterns embedded in filenames.

mod exact;
mod fuzzy;
mod hybrid;
mod name;
pub mod strategies;

pub use exact::{ExactMatcher, ExactMode};
pub use fuzzy::{FuzzyMatcher, DEFAULT_FUZZY_THRESHOLD};
pub use hybrid::{HybridMatcher, MatchLayer};
pub use name::{NameMatcher, FILE_NAME_THRESHOLD, PREFIX_WEIGHT};

pub(crate) use fuzzy::argmax;

use crate::error::{ConfigError, ConfigResult};
use crate::result::{MatchResult, MatchType};
use crate::romanize::{RomanizationConfig, RomanizationMatcher};
use crate::target::MatchStrategy;

/// Common matcher interface
pub trait StringMatcher {
    /// Best candidate and its score in [0, 1], or `None`
    fn match_string_with_score<'a, S: AsRef<str> + Sync>(
        &self,
        query: &str,
        candidates: &'a [S],
    ) -> Option<(&'a str, f64)>;

    fn match_string<'a, S: AsRef<str> + Sync>(&self, query: &str, candidates: &'a [S]) -> Option<&'a str> {
        self.match_string_with_score(query, candidates)
            .map(|(matched, _)| matched)
    }

    /// Owned result; a perfect score is reported as an exact match
    fn match_with_result<S: AsRef<str> + Sync>(&self, query: &str, candidates: &[S]) -> MatchResult {
        match self.match_string_with_score(query, candidates) {
            Some((matched, score)) if score >= 1.0 => MatchResult::exact(matched),
            Some((matched, score)) => MatchResult::scored(matched, score, MatchType::Fuzzy),
            None => MatchResult::none(),
        }
    }

    /// One answer per query, in query order
    fn match_multiple<'a, Q: AsRef<str>, S: AsRef<str> + Sync>(
        &self,
        queries: &[Q],
        candidates: &'a [S],
    ) -> Vec<Option<&'a str>> {
        queries
            .iter()
            .map(|query| self.match_string(query.as_ref(), candidates))
            .collect()
    }
}

/// Threshold of [`Matcher::strict`]
pub const STRICT_THRESHOLD: f64 = 0.8;

/// Threshold of [`Matcher::relaxed`]
pub const RELAXED_THRESHOLD: f64 = 0.5;

/// Any matcher, chosen at runtime
#[derive(Debug, Clone)]
pub enum Matcher {
    Exact(ExactMatcher),
    Fuzzy(FuzzyMatcher),
    Hybrid(HybridMatcher),
    Romanization(Box<RomanizationMatcher>),
}

impl Matcher {
    /// Build the matcher for `strategy`.
    ///
    /// Similarity-based strategies require a threshold in (0, 1]. The
    /// threshold is ignored for [`MatchStrategy::Exact`].
    pub fn from_strategy(
        strategy: MatchStrategy,
        threshold: Option<f64>,
        case_sensitive: bool,
    ) -> ConfigResult<Self> {
        Self::from_strategy_with(strategy, threshold, case_sensitive, &RomanizationConfig::default())
    }

    /// Like [`from_strategy`](Self::from_strategy), taking the romanization
    /// layer switches from `romanization`. Its threshold and case setting
    /// are replaced by `threshold` and `case_sensitive`.
    pub fn from_strategy_with(
        strategy: MatchStrategy,
        threshold: Option<f64>,
        case_sensitive: bool,
        romanization: &RomanizationConfig,
    ) -> ConfigResult<Self> {
        let required = || threshold.ok_or(ConfigError::MissingThreshold(strategy));

        Ok(match strategy {
            MatchStrategy::Exact => {
                Self::Exact(ExactMatcher::new().with_case_sensitive(case_sensitive))
            }
            MatchStrategy::Fuzzy => {
                Self::Fuzzy(FuzzyMatcher::new(required()?)?.with_case_sensitive(case_sensitive))
            }
            MatchStrategy::Hybrid => {
                Self::Hybrid(HybridMatcher::new(required()?)?.with_case_sensitive(case_sensitive))
            }
            MatchStrategy::Romanization => {
                let config = romanization
                    .clone()
                    .with_threshold(required()?)
                    .with_case_sensitive(case_sensitive);
                Self::Romanization(Box::new(RomanizationMatcher::new(config)?))
            }
        })
    }

    /// Case-sensitive matcher at [`STRICT_THRESHOLD`]
    pub fn strict(strategy: MatchStrategy) -> ConfigResult<Self> {
        Self::from_strategy(strategy, Some(STRICT_THRESHOLD), true)
    }

    /// Case-folding matcher at [`RELAXED_THRESHOLD`]
    pub fn relaxed(strategy: MatchStrategy) -> ConfigResult<Self> {
        Self::from_strategy(strategy, Some(RELAXED_THRESHOLD), false)
    }

    pub fn strategy(&self) -> MatchStrategy {
        match self {
            Self::Exact(_) => MatchStrategy::Exact,
            Self::Fuzzy(_) => MatchStrategy::Fuzzy,
            Self::Hybrid(_) => MatchStrategy::Hybrid,
            Self::Romanization(_) => MatchStrategy::Romanization,
        }
    }

    pub fn with_debug(self, debug: bool) -> Self {
        match self {
            Self::Exact(m) => Self::Exact(m.with_debug(debug)),
            Self::Fuzzy(m) => Self::Fuzzy(m.with_debug(debug)),
            Self::Hybrid(m) => Self::Hybrid(m.with_debug(debug)),
            Self::Romanization(m) => Self::Romanization(Box::new((*m).with_debug(debug))),
        }
    }
}

impl From<ExactMatcher> for Matcher {
    fn from(m: ExactMatcher) -> Self {
        Self::Exact(m)
    }
}

impl From<FuzzyMatcher> for Matcher {
    fn from(m: FuzzyMatcher) -> Self {
        Self::Fuzzy(m)
    }
}

impl From<HybridMatcher> for Matcher {
    fn from(m: HybridMatcher) -> Self {
        Self::Hybrid(m)
    }
}

impl From<RomanizationMatcher> for Matcher {
    fn from(m: RomanizationMatcher) -> Self {
        Self::Romanization(Box::new(m))
    }
}

impl StringMatcher for Matcher {
    fn match_string_with_score<'a, S: AsRef<str> + Sync>(
        &self,
        query: &str,
        candidates: &'a [S],
    ) -> Option<(&'a str, f64)> {
        match self {
            Self::Exact(m) => m.match_string_with_score(query, candidates),
            Self::Fuzzy(m) => m.match_string_with_score(query, candidates),
            Self::Hybrid(m) => m.match_string_with_score(query, candidates),
            Self::Romanization(m) => m.match_string_with_score(query, candidates),
        }
    }

    fn match_with_result<S: AsRef<str> + Sync>(&self, query: &str, candidates: &[S]) -> MatchResult {
        match self {
            Self::Exact(m) => m.match_with_result(query, candidates),
            Self::Fuzzy(m) => m.match_with_result(query, candidates),
            Self::Hybrid(m) => m.match_with_result(query, candidates),
            Self::Romanization(m) => m.match_with_result(query, candidates),
        }
    }
}
