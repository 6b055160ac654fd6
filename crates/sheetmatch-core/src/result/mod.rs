//! Match results
//!
//! Value objects produced per query and never mutated afterwards:
//!
//! - [`MatchResult`]: outcome of matching one query against one candidate list
//! - [`SingleMatchResult`]: a `MatchResult` annotated with target and position
//! - [`MultiMatchResult`]: composite record for every target of a
//!   [`MultiTargetMatcher`](crate::multi::MultiTargetMatcher)
//!
//! [`ResultAnalyzer`] summarises batches and [`ResultExporter`] renders
//! CSV, Markdown and JSON without touching the source objects.

mod analyze;
mod export;
mod multi;
mod single;

pub use analyze::{
    AnalyzerConfig, BatchAnalysis, BatchSummary, BestMatch, FailurePattern, PatternReport,
    ResultAnalyzer, ScoreDistribution, ScoreRanges, TargetStatistics, WorstMatch,
};
pub use export::{ResultExporter, SingleResultExporter};
pub use multi::{MatchSummary, MultiMatchResult};
pub use single::{Preference, ResultComparison, SingleMatchResult, SingleResultAnalyzer};

use serde::{Deserialize, Serialize};

/// How a match was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// No match
    None,
    /// Case-normalized equality or containment
    Exact,
    /// Similarity above threshold
    Fuzzy,
    /// Similarity above threshold after sound-alike normalization
    Phonetic,
    /// Known transliteration variant of the same name
    Transliteration,
    /// Extracted by a target's regex pattern
    Pattern,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Exact => "exact",
            Self::Fuzzy => "fuzzy",
            Self::Phonetic => "phonetic",
            Self::Transliteration => "transliteration",
            Self::Pattern => "pattern",
        }
    }

    /// Multiplier applied when grading result quality
    pub(crate) fn quality_weight(&self) -> f64 {
        match self {
            Self::Exact => 1.0,
            Self::Pattern => 0.95,
            Self::Transliteration => 0.9,
            Self::Phonetic => 0.88,
            Self::Fuzzy => 0.85,
            Self::None => 0.0,
        }
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse confidence bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl ConfidenceLevel {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.9 {
            Self::VeryHigh
        } else if confidence >= 0.7 {
            Self::High
        } else if confidence >= 0.5 {
            Self::Medium
        } else if confidence >= 0.3 {
            Self::Low
        } else {
            Self::VeryLow
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VeryHigh => "very_high",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::VeryLow => "very_low",
        }
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of matching a query against a candidate list.
///
/// `is_matched` is derived from `matched_string`. Scores are clamped to
/// [0, 1] on construction and an unmatched result always has type
/// [`MatchType::None`] and zero confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "MatchResultRecord", from = "MatchResultRecord")]
pub struct MatchResult {
    matched_string: Option<String>,
    similarity_score: f64,
    match_type: MatchType,
    confidence: f64,
}

impl MatchResult {
    pub fn new(
        matched_string: Option<String>,
        similarity_score: f64,
        match_type: MatchType,
        confidence: f64,
    ) -> Self {
        let similarity_score = unit(similarity_score);
        match matched_string {
            Some(value) => Self {
                matched_string: Some(value),
                similarity_score,
                match_type,
                confidence: unit(confidence),
            },
            None => Self {
                matched_string: None,
                similarity_score,
                match_type: MatchType::None,
                confidence: 0.0,
            },
        }
    }

    /// Result with no match and zero scores
    pub fn none() -> Self {
        Self::new(None, 0.0, MatchType::None, 0.0)
    }

    /// Exact match: score and confidence 1.0
    pub fn exact(value: impl Into<String>) -> Self {
        Self::new(Some(value.into()), 1.0, MatchType::Exact, 1.0)
    }

    /// Similarity match whose confidence equals its score
    pub fn scored(value: impl Into<String>, score: f64, match_type: MatchType) -> Self {
        Self::new(Some(value.into()), score, match_type, score)
    }

    pub fn matched_string(&self) -> Option<&str> {
        self.matched_string.as_deref()
    }

    pub fn similarity_score(&self) -> f64 {
        self.similarity_score
    }

    pub fn match_type(&self) -> MatchType {
        self.match_type
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn is_matched(&self) -> bool {
        self.matched_string.is_some()
    }

    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_confidence(self.confidence)
    }
}

impl Default for MatchResult {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Display for MatchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.matched_string {
            Some(value) => write!(
                f,
                "MatchResult(match='{}', score={:.3}, type={})",
                value, self.similarity_score, self.match_type
            ),
            None => write!(f, "MatchResult(no_match, best_score={:.3})", self.similarity_score),
        }
    }
}

/// Wire shape of [`MatchResult`], carrying the derived `is_matched` flag
#[derive(Serialize, Deserialize)]
struct MatchResultRecord {
    matched_string: Option<String>,
    similarity_score: f64,
    match_type: MatchType,
    confidence: f64,
    #[serde(default)]
    is_matched: bool,
}

impl From<MatchResult> for MatchResultRecord {
    fn from(result: MatchResult) -> Self {
        Self {
            is_matched: result.is_matched(),
            matched_string: result.matched_string,
            similarity_score: result.similarity_score,
            match_type: result.match_type,
            confidence: result.confidence,
        }
    }
}

impl From<MatchResultRecord> for MatchResult {
    fn from(record: MatchResultRecord) -> Self {
        Self::new(
            record.matched_string,
            record.similarity_score,
            record.match_type,
            record.confidence,
        )
    }
}

/// Clamp to [0, 1], mapping NaN to 0
pub(crate) fn unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
