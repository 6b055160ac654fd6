//! Composite result across all targets of a multi-target match

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{unit, MatchResult};

/// Per-target results for one source string.
///
/// `is_complete` holds iff `missing_targets` is empty, i.e. every required
/// target produced a match. Deserialized results re-derive `is_complete`
/// and clamp `overall_score`, so stored JSON cannot break either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "MultiMatchResultRecord", from = "MultiMatchResultRecord")]
pub struct MultiMatchResult {
    source_string: String,
    matches: BTreeMap<String, MatchResult>,
    overall_score: f64,
    is_complete: bool,
    missing_targets: Vec<String>,
    metadata: BTreeMap<String, Value>,
}

/// Wire shape of [`MultiMatchResult`]. `is_complete` is written for
/// consumers and ignored on read.
#[derive(Serialize, Deserialize)]
struct MultiMatchResultRecord {
    source_string: String,
    #[serde(default)]
    matches: BTreeMap<String, MatchResult>,
    overall_score: f64,
    #[serde(default)]
    is_complete: bool,
    #[serde(default)]
    missing_targets: Vec<String>,
    #[serde(default)]
    metadata: BTreeMap<String, Value>,
}

impl From<MultiMatchResult> for MultiMatchResultRecord {
    fn from(result: MultiMatchResult) -> Self {
        Self {
            source_string: result.source_string,
            matches: result.matches,
            overall_score: result.overall_score,
            is_complete: result.is_complete,
            missing_targets: result.missing_targets,
            metadata: result.metadata,
        }
    }
}

impl From<MultiMatchResultRecord> for MultiMatchResult {
    fn from(record: MultiMatchResultRecord) -> Self {
        let mut result = Self::new(
            record.source_string,
            record.matches,
            record.overall_score,
            record.missing_targets,
        );
        result.metadata = record.metadata;
        result
    }
}

/// Flattened overview of a [`MultiMatchResult`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub source: String,
    pub overall_score: f64,
    pub is_complete: bool,
    pub matched_count: usize,
    pub total_targets: usize,
    pub missing_targets: Vec<String>,
    pub matched_values: BTreeMap<String, String>,
}

impl MultiMatchResult {
    pub fn new(
        source_string: impl Into<String>,
        matches: BTreeMap<String, MatchResult>,
        overall_score: f64,
        missing_targets: Vec<String>,
    ) -> Self {
        let mut missing = Vec::with_capacity(missing_targets.len());
        for name in missing_targets {
            if !missing.contains(&name) {
                missing.push(name);
            }
        }

        Self {
            source_string: source_string.into(),
            matches,
            overall_score: unit(overall_score),
            is_complete: missing.is_empty(),
            missing_targets: missing,
            metadata: BTreeMap::new(),
        }
    }

    /// Result for a matcher with no targets: score 0.0, vacuously complete
    pub fn empty(source_string: impl Into<String>) -> Self {
        Self::new(source_string, BTreeMap::new(), 0.0, Vec::new())
    }

    /// Attach a metadata entry, consuming the result
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn source_string(&self) -> &str {
        &self.source_string
    }

    pub fn matches(&self) -> &BTreeMap<String, MatchResult> {
        &self.matches
    }

    pub fn overall_score(&self) -> f64 {
        self.overall_score
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    pub fn missing_targets(&self) -> &[String] {
        &self.missing_targets
    }

    pub fn metadata(&self) -> &BTreeMap<String, Value> {
        &self.metadata
    }

    pub fn get_match(&self, target_name: &str) -> Option<&MatchResult> {
        self.matches.get(target_name)
    }

    pub fn get_matched_value(&self, target_name: &str) -> Option<&str> {
        self.get_match(target_name).and_then(MatchResult::matched_string)
    }

    pub fn has_match(&self, target_name: &str) -> bool {
        self.get_match(target_name).is_some_and(MatchResult::is_matched)
    }

    /// Similarity score for a target, 0.0 when the target is unknown
    pub fn get_match_score(&self, target_name: &str) -> f64 {
        self.get_match(target_name)
            .map_or(0.0, MatchResult::similarity_score)
    }

    pub fn matched_targets(&self) -> Vec<&str> {
        self.matches
            .iter()
            .filter(|(_, m)| m.is_matched())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn failed_targets(&self) -> Vec<&str> {
        self.matches
            .iter()
            .filter(|(_, m)| !m.is_matched())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Matched value per matched target
    pub fn matched_values(&self) -> BTreeMap<String, String> {
        self.matches
            .iter()
            .filter_map(|(name, m)| m.matched_string().map(|v| (name.clone(), v.to_string())))
            .collect()
    }

    pub fn get_summary(&self) -> MatchSummary {
        MatchSummary {
            source: self.source_string.clone(),
            overall_score: self.overall_score,
            is_complete: self.is_complete,
            matched_count: self.matched_targets().len(),
            total_targets: self.matches.len(),
            missing_targets: self.missing_targets.clone(),
            matched_values: self.matched_values(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl std::fmt::Display for MultiMatchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let preview: String = self.source_string.chars().take(30).collect();
        write!(
            f,
            "MultiMatchResult('{}', score={:.3}, matched={}/{}, complete={})",
            preview,
            self.overall_score,
            self.matched_targets().len(),
            self.matches.len(),
            self.is_complete
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::MatchType;
    use pretty_assertions::assert_eq;

    fn sample() -> MultiMatchResult {
        let mut matches = BTreeMap::new();
        matches.insert(
            "city".to_string(),
            MatchResult::scored("北京", 0.95, MatchType::Fuzzy),
        );
        matches.insert(
            "district".to_string(),
            MatchResult::scored("朝阳区", 0.88, MatchType::Fuzzy),
        );
        matches.insert("street".to_string(), MatchResult::none());
        MultiMatchResult::new("北京朝阳区", matches, 0.61, vec!["street".into()])
    }

    #[test]
    fn test_summary() {
        let result = sample();
        let summary = result.get_summary();
        assert_eq!(summary.matched_count, 2);
        assert_eq!(summary.total_targets, 3);
        assert!(!result.is_complete());
        assert_eq!(summary.matched_values.get("city").map(String::as_str), Some("北京"));
    }

    #[test]
    fn test_queries() {
        let result = sample();
        assert_eq!(result.get_matched_value("district"), Some("朝阳区"));
        assert_eq!(result.get_matched_value("street"), None);
        assert_eq!(result.get_matched_value("unknown"), None);
        assert!(result.has_match("city"));
        assert!(!result.has_match("street"));
        assert_eq!(result.get_match_score("city"), 0.95);
        assert_eq!(result.get_match_score("unknown"), 0.0);
        assert_eq!(result.matched_targets(), vec!["city", "district"]);
        assert_eq!(result.failed_targets(), vec!["street"]);
    }

    #[test]
    fn test_missing_targets_deduplicated() {
        let result = MultiMatchResult::new("x", BTreeMap::new(), 0.0, vec!["a".into(), "a".into()]);
        assert_eq!(result.missing_targets(), &["a".to_string()]);
    }

    #[test]
    fn test_json_round_trip() {
        let result = sample().with_metadata("batch", "2024-06-01");
        let json = result.to_json().unwrap();
        let back = MultiMatchResult::from_json(&json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn test_json_rederives_completeness() {
        let json = r#"{
            "source_string": "H48E012.kmz",
            "matches": {},
            "overall_score": 1.7,
            "is_complete": true,
            "missing_targets": ["date", "date"]
        }"#;
        let result = MultiMatchResult::from_json(json).unwrap();
        assert!(!result.is_complete());
        assert_eq!(result.missing_targets(), &["date".to_string()]);
        assert_eq!(result.overall_score(), 1.0);

        let complete = MultiMatchResult::from_json(
            r#"{ "source_string": "x", "overall_score": 0.5, "is_complete": false }"#,
        )
        .unwrap();
        assert!(complete.is_complete());
    }

    #[test]
    fn test_json_keeps_exact_scores() {
        let mut matches = BTreeMap::new();
        matches.insert("sheet".to_string(), MatchResult::scored("H48E012", 5.0 / 6.0, MatchType::Fuzzy));
        let result = MultiMatchResult::new("H48E0l2.kmz", matches, 0.9856906946328695, Vec::new());

        let back = MultiMatchResult::from_json(&result.to_json().unwrap()).unwrap();
        assert_eq!(back.overall_score(), 0.9856906946328695);
        assert_eq!(back.get_match_score("sheet"), 5.0 / 6.0);
    }

    #[test]
    fn test_empty() {
        let result = MultiMatchResult::empty("anything");
        assert!(result.is_complete());
        assert_eq!(result.overall_score(), 0.0);
        assert!(result.matches().is_empty());
    }
}
