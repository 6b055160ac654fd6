//! Filename-oriented matching
//!
//! [`NameMatcher`] answers two questions about a filename: which canonical
//! name (a map sheet number, say) it carries, and which filename pattern
//! it follows. Both return the canonical entry as given, with its score.

use tracing::debug;

use super::fuzzy::FuzzyMatcher;
use super::strategies::{contains, fold};
use super::StringMatcher;
use crate::error::{ConfigError, ConfigResult};
use crate::similarity::SimilarityCalculator;
use crate::target::MatchStrategy;

/// Threshold of [`NameMatcher::file_names`]
pub const FILE_NAME_THRESHOLD: f64 = 0.65;

/// Weight of the prefix score when a name is matched against a filename
pub const PREFIX_WEIGHT: f64 = 0.7;

/// Filename segments shorter than this are not matched on their own
const MIN_SEGMENT_CHARS: usize = 3;

/// A pattern word counts as present when some filename word is more
/// similar than this
const WORD_SIMILARITY: f64 = 0.7;

/// Share of a pattern's combined score taken by whole-string similarity;
/// the rest comes from word coverage
const WHOLE_STRING_SHARE: f64 = 0.4;

/// Matches names and patterns inside filenames.
///
/// The strategy picks the layers: `Exact` only checks containment, `Fuzzy`
/// only scores similarity and `Hybrid` tries containment first. Case is
/// folded unless the matcher is case sensitive.
#[derive(Debug, Clone)]
pub struct NameMatcher {
    strategy: MatchStrategy,
    fuzzy: FuzzyMatcher,
    case_sensitive: bool,
    debug: bool,
}

impl Default for NameMatcher {
    fn default() -> Self {
        Self {
            strategy: MatchStrategy::Hybrid,
            fuzzy: FuzzyMatcher::preset(FILE_NAME_THRESHOLD),
            case_sensitive: false,
            debug: false,
        }
    }
}

impl NameMatcher {
    /// Fails for [`MatchStrategy::Romanization`] or a threshold outside (0, 1]
    pub fn new(strategy: MatchStrategy, threshold: f64) -> ConfigResult<Self> {
        if strategy == MatchStrategy::Romanization {
            return Err(ConfigError::UnsupportedStrategy(strategy));
        }
        Ok(Self {
            strategy,
            fuzzy: FuzzyMatcher::new(threshold)?,
            ..Self::default()
        })
    }

    /// Hybrid matcher at [`FILE_NAME_THRESHOLD`]
    pub fn file_names() -> Self {
        Self::default()
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self.fuzzy = self.fuzzy.with_case_sensitive(case_sensitive);
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self.fuzzy = self.fuzzy.with_debug(debug);
        self
    }

    pub fn strategy(&self) -> MatchStrategy {
        self.strategy
    }

    pub fn threshold(&self) -> f64 {
        self.fuzzy.threshold()
    }

    pub fn set_threshold(&mut self, threshold: f64) -> ConfigResult<()> {
        self.fuzzy.set_threshold(threshold)
    }

    fn exact_layer(&self) -> bool {
        self.strategy != MatchStrategy::Fuzzy
    }

    fn fuzzy_layer(&self) -> bool {
        self.strategy != MatchStrategy::Exact
    }

    /// The name `filename` carries.
    ///
    /// Exact: the first name contained in the filename, score 1.0. Fuzzy:
    /// the better of a prefix-biased score over the whole filename and a
    /// plain score for each segment between `_`, `-`, `.` and spaces, so a
    /// misspelt name is found wherever it sits.
    pub fn match_mapsheet_name<'a, S: AsRef<str> + Sync>(
        &self,
        filename: &str,
        names: &'a [S],
    ) -> Option<(&'a str, f64)> {
        if filename.is_empty() {
            return None;
        }

        if self.exact_layer() {
            let folded = fold(filename, self.case_sensitive);
            let hit = names.iter().map(|name| name.as_ref()).find(|name| {
                !name.is_empty() && contains(&folded, &fold(name, self.case_sensitive))
            });
            if let Some(name) = hit {
                if self.debug {
                    debug!(filename, matched = name, "name contained in filename");
                }
                return Some((name, 1.0));
            }
        }

        if !self.fuzzy_layer() {
            return None;
        }

        let mut best = self.fuzzy.match_with_prefix_bias(filename, names, PREFIX_WEIGHT);
        let segments = filename
            .split(|c: char| c.is_whitespace() || matches!(c, '_' | '-' | '.'))
            .filter(|segment| segment.chars().count() >= MIN_SEGMENT_CHARS);
        for segment in segments {
            if let Some((name, score)) = self.fuzzy.match_string_with_score(segment, names) {
                if best.map_or(true, |(_, top)| score > top) {
                    best = Some((name, score));
                }
            }
        }

        if self.debug {
            match best {
                Some((matched, score)) => debug!(filename, matched, score, "fuzzy name match"),
                None => debug!(filename, threshold = self.threshold(), "no name match"),
            }
        }
        best
    }

    /// The pattern `filename` follows. Underscores count as spaces on both
    /// sides.
    ///
    /// Exact: the first pattern contained in the filename, score 1.0.
    /// Fuzzy: `0.4 * similarity + 0.6 * word coverage`, where word coverage
    /// is the share of pattern words with a close filename word. The first
    /// pattern reaching the best score wins if it clears the threshold.
    pub fn match_file_pattern<'a, S: AsRef<str>>(
        &self,
        filename: &str,
        patterns: &'a [S],
    ) -> Option<(&'a str, f64)> {
        let clean_filename = fold(&filename.replace('_', " "), self.case_sensitive).into_owned();
        let clean_patterns: Vec<String> = patterns
            .iter()
            .map(|p| fold(p.as_ref().replace('_', " ").trim(), self.case_sensitive).into_owned())
            .collect();

        if self.exact_layer() {
            let hit = clean_patterns
                .iter()
                .position(|p| !p.is_empty() && contains(&clean_filename, p));
            if let Some(idx) = hit {
                if self.debug {
                    debug!(filename, pattern = patterns[idx].as_ref(), "pattern contained in filename");
                }
                return Some((patterns[idx].as_ref(), 1.0));
            }
        }

        if !self.fuzzy_layer() {
            return None;
        }

        let filename_words: Vec<&str> = clean_filename.split_whitespace().collect();
        let mut best: Option<(usize, f64)> = None;
        for (idx, pattern) in clean_patterns.iter().enumerate() {
            let score = pattern_score(&clean_filename, &filename_words, pattern);
            if score > best.map_or(0.0, |(_, top)| top) {
                best = Some((idx, score));
            }
        }

        let found = best
            .filter(|(_, score)| *score >= self.threshold())
            .map(|(idx, score)| (patterns[idx].as_ref(), score));
        if self.debug {
            debug!(
                filename,
                best_score = best.map_or(0.0, |(_, score)| score),
                matched = found.is_some(),
                "fuzzy pattern match"
            );
        }
        found
    }
}

fn pattern_score(filename: &str, filename_words: &[&str], pattern: &str) -> f64 {
    let similarity = SimilarityCalculator::calculate_similarity(filename, pattern);

    let pattern_words: Vec<&str> = pattern.split_whitespace().collect();
    let coverage = if pattern_words.is_empty() {
        0.0
    } else {
        let present = pattern_words
            .iter()
            .filter(|word| {
                filename_words
                    .iter()
                    .any(|fw| SimilarityCalculator::calculate_similarity(word, fw) > WORD_SIMILARITY)
            })
            .count();
        present as f64 / pattern_words.len() as f64
    };

    similarity * WHOLE_STRING_SHARE + coverage * (1.0 - WHOLE_STRING_SHARE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SHEETS: [&str; 2] = ["H48E011", "H48E012"];

    fn fuzzy() -> NameMatcher {
        NameMatcher::new(MatchStrategy::Fuzzy, FILE_NAME_THRESHOLD).unwrap()
    }

    #[test]
    fn test_name_contained_in_filename() {
        let matcher = NameMatcher::file_names();
        assert_eq!(matcher.match_mapsheet_name("survey_H48E012_final.kmz", &SHEETS), Some(("H48E012", 1.0)));
        assert_eq!(matcher.match_mapsheet_name("h48e011.kml", &SHEETS), Some(("H48E011", 1.0)));
        assert_eq!(matcher.match_mapsheet_name("notes.txt", &SHEETS), None);
        assert_eq!(matcher.match_mapsheet_name("", &SHEETS), None);
    }

    #[test]
    fn test_prefix_bias_finds_misspelt_name() {
        // Prefix 6/7 weighted 0.7, whole string 6/16 weighted 0.3
        let (name, score) = fuzzy().match_mapsheet_name("H48E0I2final.kmz", &SHEETS).unwrap();
        assert_eq!(name, "H48E012");
        assert!((score - 0.7125).abs() < 1e-9, "got {}", score);
    }

    #[test]
    fn test_segment_finds_misspelt_name() {
        let (name, score) = fuzzy().match_mapsheet_name("20240601_H48E0I2.kmz", &SHEETS).unwrap();
        assert_eq!(name, "H48E012");
        assert!((score - 6.0 / 7.0).abs() < 1e-9, "got {}", score);
    }

    #[test]
    fn test_exact_strategy_skips_similarity() {
        let exact = NameMatcher::new(MatchStrategy::Exact, FILE_NAME_THRESHOLD).unwrap();
        assert_eq!(exact.match_mapsheet_name("20240601_H48E0I2.kmz", &SHEETS), None);
        assert_eq!(exact.match_mapsheet_name("20240601_H48E012.kmz", &SHEETS), Some(("H48E012", 1.0)));
    }

    #[test]
    fn test_case_sensitive_containment() {
        let sensitive = NameMatcher::new(MatchStrategy::Exact, FILE_NAME_THRESHOLD)
            .unwrap()
            .with_case_sensitive(true);
        assert_eq!(sensitive.match_mapsheet_name("h48e012.kmz", &SHEETS), None);
        assert_eq!(sensitive.match_mapsheet_name("H48E012.kmz", &SHEETS), Some(("H48E012", 1.0)));
    }

    #[test]
    fn test_pattern_with_underscores() {
        let patterns = ["weekly_summary", "daily_report"];
        assert_eq!(
            NameMatcher::file_names().match_file_pattern("daily_report_2024.kmz", &patterns),
            Some(("daily_report", 1.0))
        );
    }

    #[test]
    fn test_misspelt_pattern() {
        let patterns = ["weekly summary", "daily report"];
        let (pattern, score) = fuzzy().match_file_pattern("dialy_reprot_2024.kmz", &patterns).unwrap();
        assert_eq!(pattern, "daily report");
        assert!(score > 0.75 && score < 0.8, "got {}", score);

        let exact = NameMatcher::new(MatchStrategy::Exact, FILE_NAME_THRESHOLD).unwrap();
        assert_eq!(exact.match_file_pattern("dialy_reprot_2024.kmz", &patterns), None);
        assert_eq!(fuzzy().match_file_pattern("random.kmz", &patterns), None);
    }

    #[test]
    fn test_empty_pattern_never_contained() {
        assert_eq!(NameMatcher::file_names().match_file_pattern("abc", &["", "_"]), None);
    }

    #[test]
    fn test_construction() {
        let matcher = NameMatcher::file_names();
        assert_eq!(matcher.strategy(), MatchStrategy::Hybrid);
        assert_eq!(matcher.threshold(), FILE_NAME_THRESHOLD);

        assert_eq!(
            NameMatcher::new(MatchStrategy::Romanization, 0.7).unwrap_err(),
            ConfigError::UnsupportedStrategy(MatchStrategy::Romanization)
        );
        assert!(NameMatcher::new(MatchStrategy::Fuzzy, 0.0).is_err());

        let mut matcher = fuzzy();
        matcher.set_threshold(0.9).unwrap();
        assert_eq!(matcher.match_mapsheet_name("H48E0I2final.kmz", &SHEETS), None);
    }
}
