//! Single-target results with position and quality grading

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ConfidenceLevel, MatchResult, MatchType};

/// A [`MatchResult`] annotated with the target it belongs to and, when
/// known, where in the source string the value was found.
///
/// Positions and lengths count characters, not bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleMatchResult {
    pub target_name: String,
    #[serde(default)]
    pub original_target: String,
    pub result: MatchResult,
    #[serde(default)]
    match_position: Option<usize>,
    #[serde(default)]
    match_length: Option<usize>,
    #[serde(default)]
    pub preprocessing_applied: Vec<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

impl SingleMatchResult {
    pub fn new(target_name: impl Into<String>, result: MatchResult) -> Self {
        Self {
            target_name: target_name.into(),
            original_target: String::new(),
            result,
            match_position: None,
            match_length: None,
            preprocessing_applied: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_original_target(mut self, original: impl Into<String>) -> Self {
        self.original_target = original.into();
        self
    }

    /// Record where the match sits in the source. A zero length clears both.
    pub fn with_position(mut self, position: usize, length: usize) -> Self {
        if length == 0 {
            self.match_position = None;
            self.match_length = None;
        } else {
            self.match_position = Some(position);
            self.match_length = Some(length);
        }
        self
    }

    pub fn with_preprocessing(mut self, step: impl Into<String>) -> Self {
        self.preprocessing_applied.push(step.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn matched_string(&self) -> Option<&str> {
        self.result.matched_string()
    }

    pub fn is_matched(&self) -> bool {
        self.result.is_matched()
    }

    pub fn similarity_score(&self) -> f64 {
        self.result.similarity_score()
    }

    pub fn confidence(&self) -> f64 {
        self.result.confidence()
    }

    pub fn match_type(&self) -> MatchType {
        self.result.match_type()
    }

    pub fn confidence_level(&self) -> ConfidenceLevel {
        self.result.confidence_level()
    }

    pub fn is_high_confidence(&self) -> bool {
        self.result.confidence() >= 0.7
    }

    pub fn match_position(&self) -> Option<usize> {
        self.match_position
    }

    pub fn match_length(&self) -> Option<usize> {
        self.match_length
    }

    /// `(start, end)` character range of the match
    pub fn match_span(&self) -> Option<(usize, usize)> {
        match (self.match_position, self.match_length) {
            (Some(pos), Some(len)) => pos.checked_add(len).map(|end| (pos, end)),
            _ => None,
        }
    }

    /// Snippet of `source` around the match with the match wrapped in `**`.
    ///
    /// Falls back to the matched string when there is no position or the
    /// span does not fit inside `source`.
    pub fn context(&self, source: &str, context_length: usize) -> String {
        let fallback = || self.matched_string().unwrap_or_default().to_string();

        let Some((start, end)) = self.match_span() else {
            return fallback();
        };
        let chars: Vec<char> = source.chars().collect();
        if chars.is_empty() || end > chars.len() {
            return fallback();
        }

        let from = start.saturating_sub(context_length);
        let to = end.saturating_add(context_length).min(chars.len());

        let mut out = String::with_capacity(source.len() + 4);
        out.extend(&chars[from..start]);
        out.push_str("**");
        out.extend(&chars[start..end]);
        out.push_str("**");
        out.extend(&chars[end..to]);
        out
    }

    /// Consistency problems with this result; empty when valid
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.target_name.is_empty() {
            errors.push("target name is empty".to_string());
        }
        if self.matched_string() == Some("") {
            errors.push("matched string is empty".to_string());
        }
        if self.match_position.is_some() && !self.is_matched() {
            errors.push("position recorded for an unmatched result".to_string());
        }
        if self.match_position.is_some() && self.match_span().is_none() {
            errors.push("match span overflows".to_string());
        }
        if let (Some((_, end)), Some(value)) = (self.match_span(), self.matched_string()) {
            let len = value.chars().count();
            if self.match_length != Some(len) && self.match_type() != MatchType::Fuzzy {
                errors.push(format!(
                    "match length {} does not cover matched string of length {} (ends at {})",
                    self.match_length.unwrap_or_default(),
                    len,
                    end
                ));
            }
        }

        errors
    }

    /// Quality in [0, 1], see [`SingleResultAnalyzer::quality_score`]
    pub fn quality_score(&self) -> f64 {
        SingleResultAnalyzer::quality_score(self)
    }
}

impl std::fmt::Display for SingleMatchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = if self.is_matched() { "matched" } else { "unmatched" };
        write!(
            f,
            "SingleMatchResult({} {}: '{}', score={:.3}, confidence={})",
            status,
            self.target_name,
            self.matched_string().unwrap_or("None"),
            self.similarity_score(),
            self.confidence_level()
        )
    }
}

/// Which of two results [`SingleResultAnalyzer::compare`] prefers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preference {
    First,
    Second,
    Tie,
}

/// Side-by-side comparison of two single results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultComparison {
    pub both_matched: bool,
    pub neither_matched: bool,
    pub similarity_diff: f64,
    pub confidence_diff: f64,
    pub same_type: bool,
    pub quality: (f64, f64),
    pub preferred: Preference,
}

/// Grades single results
pub struct SingleResultAnalyzer;

impl SingleResultAnalyzer {
    /// Mean of similarity and confidence scaled by the match type's weight,
    /// plus 0.05 when a position is known. Unmatched results grade 0.
    pub fn quality_score(result: &SingleMatchResult) -> f64 {
        if !result.is_matched() {
            return 0.0;
        }

        let base = (result.similarity_score() + result.confidence()) / 2.0;
        let bonus = if result.match_position.is_some() { 0.05 } else { 0.0 };
        (base * result.match_type().quality_weight() + bonus).min(1.0)
    }

    pub fn quality_level(score: f64) -> &'static str {
        if score >= 0.9 {
            "excellent"
        } else if score >= 0.7 {
            "good"
        } else if score >= 0.5 {
            "fair"
        } else if score >= 0.3 {
            "poor"
        } else {
            "very_poor"
        }
    }

    pub fn compare(first: &SingleMatchResult, second: &SingleMatchResult) -> ResultComparison {
        let q1 = Self::quality_score(first);
        let q2 = Self::quality_score(second);
        let preferred = if q1 > q2 {
            Preference::First
        } else if q2 > q1 {
            Preference::Second
        } else {
            Preference::Tie
        };

        ResultComparison {
            both_matched: first.is_matched() && second.is_matched(),
            neither_matched: !first.is_matched() && !second.is_matched(),
            similarity_diff: first.similarity_score() - second.similarity_score(),
            confidence_diff: first.confidence() - second.confidence(),
            same_type: first.match_type() == second.match_type(),
            quality: (q1, q2),
            preferred,
        }
    }
}
