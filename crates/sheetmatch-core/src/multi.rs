//! Matching one source string against several named targets
//!
//! Each target is matched independently with the matcher its
//! [`TargetConfig`] implies. The per-target results are combined into a
//! [`MultiMatchResult`] with a weighted overall score and a completeness
//! flag covering the required targets.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use regex::Regex;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::ConfigResult;
use crate::matcher::{Matcher, StringMatcher};
use crate::result::{MatchResult, MatchType, MultiMatchResult};
use crate::romanize::RomanizationConfig;
use crate::target::TargetConfig;

/// Confidence reported for a regex extraction
const PATTERN_CONFIDENCE: f64 = 0.9;

/// A registered target with its prepared matcher
#[derive(Debug, Clone)]
struct TargetEntry {
    name: String,
    config: TargetConfig,
    matcher: Matcher,
    regex: Option<Regex>,
}

impl TargetEntry {
    fn build(
        name: String,
        config: TargetConfig,
        romanization: &RomanizationConfig,
        debug: bool,
    ) -> ConfigResult<Self> {
        config.validate()?;
        let matcher = Matcher::from_strategy_with(
            config.matcher_strategy,
            config.fuzzy_threshold,
            config.case_sensitive,
            romanization,
        )?
        .with_debug(debug);
        let regex = config.compile_regex()?;
        Ok(Self {
            name,
            config,
            matcher,
            regex,
        })
    }

    fn extract<'s>(&self, source: &'s str) -> Option<&'s str> {
        let caps = self.regex.as_ref()?.captures(source)?;
        caps.get(1).or_else(|| caps.get(0)).map(|m| m.as_str())
    }

    fn passes_validator(&self, value: &str) -> bool {
        self.config
            .validator
            .as_ref()
            .map_or(true, |validator| validator.validate(value))
    }

    /// Regex extraction first, then the candidate matcher. `min_score` and
    /// the validator can veto either.
    fn match_source<S: AsRef<str> + Sync>(&self, source: &str, candidates: &[S]) -> MatchResult {
        if let Some(value) = self.extract(source) {
            return if self.passes_validator(value) {
                MatchResult::new(Some(value.to_string()), 1.0, MatchType::Pattern, PATTERN_CONFIDENCE)
            } else {
                MatchResult::none()
            };
        }

        let result = self.matcher.match_with_result(source, candidates);
        match result.matched_string() {
            Some(_) if result.similarity_score() < self.config.min_score => MatchResult::none(),
            Some(value) if !self.passes_validator(value) => MatchResult::none(),
            _ => result,
        }
    }
}

/// Matches a source string against every registered target.
///
/// Targets are kept in registration order; registering an existing name
/// replaces its configuration in place.
#[derive(Debug, Clone, Default)]
pub struct MultiTargetMatcher {
    targets: Vec<TargetEntry>,
    romanization: RomanizationConfig,
    debug: bool,
}

impl MultiTargetMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable debug events. Applies to targets added afterwards.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Layer switches for romanization targets. Each target keeps its own
    /// threshold and case setting. Applies to targets added afterwards.
    pub fn with_romanization_config(mut self, config: RomanizationConfig) -> Self {
        self.romanization = config;
        self
    }

    /// Register or replace a target
    pub fn add_target(&mut self, name: impl Into<String>, config: TargetConfig) -> ConfigResult<&mut Self> {
        let entry = TargetEntry::build(name.into(), config, &self.romanization, self.debug)?;
        if self.debug {
            debug!(
                target_name = %entry.name,
                strategy = %entry.config.matcher_strategy,
                required = entry.config.required,
                "target registered"
            );
        }
        self.upsert(entry);
        Ok(self)
    }

    /// Register several targets. Nothing is registered if any config is
    /// invalid.
    pub fn add_targets<I, K>(&mut self, targets: I) -> ConfigResult<&mut Self>
    where
        I: IntoIterator<Item = (K, TargetConfig)>,
        K: Into<String>,
    {
        let entries = targets
            .into_iter()
            .map(|(name, config)| TargetEntry::build(name.into(), config, &self.romanization, self.debug))
            .collect::<ConfigResult<Vec<_>>>()?;
        for entry in entries {
            self.upsert(entry);
        }
        Ok(self)
    }

    fn upsert(&mut self, entry: TargetEntry) {
        match self.targets.iter_mut().find(|t| t.name == entry.name) {
            Some(existing) => *existing = entry,
            None => self.targets.push(entry),
        }
    }

    /// Returns whether the target existed
    pub fn remove_target(&mut self, name: &str) -> bool {
        let before = self.targets.len();
        self.targets.retain(|t| t.name != name);
        self.targets.len() != before
    }

    pub fn clear_targets(&mut self) {
        self.targets.clear();
    }

    /// Target names in registration order
    pub fn target_names(&self) -> Vec<&str> {
        self.targets.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn target(&self, name: &str) -> Option<&TargetConfig> {
        self.targets.iter().find(|t| t.name == name).map(|t| &t.config)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Match every target against its own patterns
    pub fn match_string(&self, source: &str) -> MultiMatchResult {
        self.match_targets(source, |entry| entry.config.patterns.as_slice())
    }

    /// Match with per-target candidate lists. A target missing from
    /// `candidates` falls back to its patterns.
    pub fn match_with_candidates<H: BuildHasher>(
        &self,
        source: &str,
        candidates: &HashMap<String, Vec<String>, H>,
    ) -> MultiMatchResult {
        self.match_targets(source, |entry| {
            candidates
                .get(&entry.name)
                .unwrap_or(&entry.config.patterns)
                .as_slice()
        })
    }

    fn match_targets<'a, F>(&'a self, source: &str, candidates_for: F) -> MultiMatchResult
    where
        F: Fn(&'a TargetEntry) -> &'a [String],
    {
        if self.targets.is_empty() {
            return MultiMatchResult::empty(source);
        }

        let mut matches = BTreeMap::new();
        let mut missing = Vec::new();
        let mut weighted = 0.0;
        let mut total_weight = 0.0;

        for entry in &self.targets {
            let result = entry.match_source(source, candidates_for(entry));
            if self.debug {
                debug!(
                    target_name = %entry.name,
                    matched = result.matched_string(),
                    score = result.similarity_score(),
                    "target matched"
                );
            }

            if result.is_matched() {
                weighted += result.similarity_score() * entry.config.weight;
            } else if entry.config.required {
                missing.push(entry.name.clone());
            }
            total_weight += entry.config.weight;
            matches.insert(entry.name.clone(), result);
        }

        let overall = if total_weight > 0.0 {
            weighted / total_weight
        } else {
            0.0
        };
        MultiMatchResult::new(source, matches, overall, missing)
    }

    /// One result per source, in input order
    #[cfg(feature = "parallel")]
    pub fn match_multiple<S: AsRef<str> + Sync>(&self, sources: &[S]) -> Vec<MultiMatchResult> {
        sources
            .par_iter()
            .map(|source| self.match_string(source.as_ref()))
            .collect()
    }

    /// One result per source, in input order
    #[cfg(not(feature = "parallel"))]
    pub fn match_multiple<S: AsRef<str> + Sync>(&self, sources: &[S]) -> Vec<MultiMatchResult> {
        sources
            .iter()
            .map(|source| self.match_string(source.as_ref()))
            .collect()
    }

    /// Results with an overall score of at least `min_overall_score`, best
    /// first. Equal scores keep input order.
    pub fn find_best_matches<S: AsRef<str> + Sync>(
        &self,
        sources: &[S],
        min_overall_score: f64,
    ) -> Vec<MultiMatchResult> {
        let mut results: Vec<MultiMatchResult> = self
            .match_multiple(sources)
            .into_iter()
            .filter(|r| r.overall_score() >= min_overall_score)
            .collect();
        results.sort_by(|a, b| b.overall_score().total_cmp(&a.overall_score()));
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::target::{MatchStrategy, ValueValidator};
    use pretty_assertions::assert_eq;

    fn sheet_matcher() -> MultiTargetMatcher {
        let mut matcher = MultiTargetMatcher::new();
        matcher
            .add_target("sheet", TargetConfig::name(["H48E011", "H48E012"]))
            .unwrap()
            .add_target("date", TargetConfig::date())
            .unwrap()
            .add_target("ext", TargetConfig::extension(["kmz", "xlsx"]))
            .unwrap();
        matcher
    }

    #[test]
    fn test_all_targets_match() {
        let result = sheet_matcher().match_string("20240601_H48E012.kmz");
        assert_eq!(result.get_matched_value("sheet"), Some("H48E012"));
        assert_eq!(result.get_matched_value("date"), Some("20240601"));
        assert_eq!(result.get_matched_value("ext"), Some(".kmz"));
        assert_eq!(result.get_match("date").unwrap().match_type(), MatchType::Pattern);
        assert_eq!(result.get_match("date").unwrap().confidence(), 0.9);
        assert!(result.is_complete());
        assert_eq!(result.overall_score(), 1.0);
    }

    #[test]
    fn test_weighted_score_and_missing() {
        // sheet (w1) misses, date (w1) hits, ext (w0.5) hits
        let result = sheet_matcher().match_string("2024-06-01_report.kmz");
        assert_eq!(result.missing_targets(), ["sheet".to_string()]);
        assert!(!result.is_complete());
        assert!((result.overall_score() - 1.5 / 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_optional_target_not_missing() {
        let result = sheet_matcher().match_string("20240601_H48E012.pdf");
        assert!(!result.has_match("ext"));
        assert!(result.is_complete());
    }

    #[test]
    fn test_validator_vetoes_regex() {
        let result = sheet_matcher().match_string("20241399_H48E012.kmz");
        assert!(!result.has_match("date"));
        assert_eq!(result.missing_targets(), ["date".to_string()]);
    }

    #[test]
    fn test_no_targets() {
        let result = MultiTargetMatcher::new().match_string("anything");
        assert_eq!(result.overall_score(), 0.0);
        assert!(result.is_complete());
        assert!(result.matches().is_empty());
    }

    #[test]
    fn test_upsert_keeps_position() {
        let mut matcher = sheet_matcher();
        matcher
            .add_target("sheet", TargetConfig::name(["H49E001"]).with_required(false))
            .unwrap();
        assert_eq!(matcher.target_names(), vec!["sheet", "date", "ext"]);
        assert!(!matcher.target("sheet").unwrap().required);

        assert!(matcher.remove_target("date"));
        assert!(!matcher.remove_target("date"));
        assert_eq!(matcher.len(), 2);
        matcher.clear_targets();
        assert!(matcher.is_empty());
    }

    #[test]
    fn test_add_targets_is_atomic() {
        let mut matcher = MultiTargetMatcher::new();
        let mut bad = TargetConfig::name(["x"]);
        bad.fuzzy_threshold = None;
        let err = matcher
            .add_targets([("good", TargetConfig::name(["a"])), ("bad", bad)])
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingThreshold(MatchStrategy::Hybrid));
        assert!(matcher.is_empty());
    }

    #[test]
    fn test_candidates_override_patterns() {
        let mut matcher = MultiTargetMatcher::new();
        matcher
            .add_target("city", TargetConfig::name(["上海"]).with_strategy(MatchStrategy::Romanization))
            .unwrap();

        let mut candidates = HashMap::new();
        candidates.insert("city".to_string(), vec!["北京".to_string(), "广州".to_string()]);
        let result = matcher.match_with_candidates("Peking", &candidates);
        assert_eq!(result.get_matched_value("city"), Some("北京"));
        assert_eq!(result.get_match("city").unwrap().match_type(), MatchType::Transliteration);

        assert!(!matcher.match_string("Peking").has_match("city"));
    }

    #[test]
    fn test_romanization_config_reaches_targets() {
        let city = || {
            TargetConfig::name(["北京", "Chingdao"])
                .with_strategy(MatchStrategy::Romanization)
                .with_fuzzy_threshold(0.9)
        };

        let mut plain = MultiTargetMatcher::new().with_romanization_config(
            RomanizationConfig::default()
                .with_phonetic_matching(false)
                .with_cross_language(false),
        );
        plain.add_target("city", city()).unwrap();
        assert!(!plain.match_string("Peking").has_match("city"));
        assert!(!plain.match_string("Qingdao").has_match("city"));

        let mut layered = MultiTargetMatcher::new();
        layered.add_target("city", city()).unwrap();
        assert_eq!(layered.match_string("Peking").get_matched_value("city"), Some("北京"));
    }

    #[test]
    fn test_min_score_and_validator() {
        let mut matcher = MultiTargetMatcher::new();
        matcher
            .add_target(
                "code",
                TargetConfig::custom("code", ["ABCD"], MatchStrategy::Fuzzy)
                    .with_fuzzy_threshold(0.5)
                    .with_min_score(0.8),
            )
            .unwrap()
            .add_target(
                "short",
                TargetConfig::custom("short", ["abcdef"], MatchStrategy::Exact)
                    .with_validator(ValueValidator::length(0, Some(3))),
            )
            .unwrap();

        let result = matcher.match_string("ABCX");
        assert!(!result.has_match("code"));
        let result = matcher.match_string("abcdef");
        assert!(!result.has_match("short"));
    }

    #[test]
    fn test_find_best_matches() {
        let sources = ["notes.txt", "20240601_H48E012.kmz", "2024-06-01_report.kmz"];
        let best = sheet_matcher().find_best_matches(&sources, 0.5);
        let names: Vec<&str> = best.iter().map(|r| r.source_string()).collect();
        assert_eq!(names, vec!["20240601_H48E012.kmz", "2024-06-01_report.kmz"]);

        let all = sheet_matcher().match_multiple(&sources);
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].source_string(), "notes.txt");
    }
}
