//! Exact matching by equality or containment

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::strategies::{contains, fold};
use super::StringMatcher;
use crate::result::MatchResult;

/// What counts as an exact hit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExactMode {
    /// Query equals the candidate
    Equals,
    /// Query occurs inside the candidate
    Substring,
    /// Either string occurs inside the other. Covers a canonical name
    /// embedded in a longer filename.
    #[default]
    Contains,
}

/// Matches with score 1.0 or not at all.
///
/// An equal candidate beats one that only satisfies containment; otherwise
/// the first candidate in input order wins. An empty query never matches
/// and empty candidates are skipped.
#[derive(Debug, Clone)]
pub struct ExactMatcher {
    case_sensitive: bool,
    mode: ExactMode,
    debug: bool,
}

impl Default for ExactMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ExactMatcher {
    /// Case-sensitive containment matcher
    pub fn new() -> Self {
        Self {
            case_sensitive: true,
            mode: ExactMode::Contains,
            debug: false,
        }
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_mode(mut self, mode: ExactMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn mode(&self) -> ExactMode {
        self.mode
    }

    /// Whether `candidate` is an exact hit for `query` under this matcher's
    /// mode and case handling
    pub fn is_match(&self, query: &str, candidate: &str) -> bool {
        if query.is_empty() || candidate.is_empty() {
            return false;
        }
        let q = fold(query, self.case_sensitive);
        let c = fold(candidate, self.case_sensitive);
        self.hit(&q, &c)
    }

    fn hit(&self, q: &str, c: &str) -> bool {
        match self.mode {
            ExactMode::Equals => q == c,
            ExactMode::Substring => contains(c, q),
            ExactMode::Contains => contains(c, q) || contains(q, c),
        }
    }

    /// Index of the winning candidate
    pub(crate) fn find_index<S: AsRef<str>>(&self, query: &str, candidates: &[S]) -> Option<usize> {
        if query.is_empty() {
            return None;
        }
        let q = fold(query, self.case_sensitive);

        let mut first_hit = None;
        for (idx, candidate) in candidates.iter().enumerate() {
            let candidate = candidate.as_ref();
            if candidate.is_empty() {
                continue;
            }
            let c = fold(candidate, self.case_sensitive);
            if q == c {
                return Some(idx);
            }
            if first_hit.is_none() && self.mode != ExactMode::Equals && self.hit(&q, &c) {
                first_hit = Some(idx);
            }
        }
        first_hit
    }
}

impl StringMatcher for ExactMatcher {
    fn match_string_with_score<'a, S: AsRef<str> + Sync>(
        &self,
        query: &str,
        candidates: &'a [S],
    ) -> Option<(&'a str, f64)> {
        let found = self
            .find_index(query, candidates)
            .map(|idx| (candidates[idx].as_ref(), 1.0));

        if self.debug {
            match found {
                Some((matched, _)) => debug!(query, matched, mode = ?self.mode, "exact match"),
                None => debug!(query, mode = ?self.mode, "no exact match"),
            }
        }
        found
    }

    fn match_with_result<S: AsRef<str> + Sync>(&self, query: &str, candidates: &[S]) -> MatchResult {
        match self.match_string_with_score(query, candidates) {
            Some((matched, _)) => MatchResult::exact(matched),
            None => MatchResult::none(),
        }
    }
}
