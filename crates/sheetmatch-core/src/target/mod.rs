//! Match targets
//!
//! A target is one named thing to find in a source string: a sheet name, a
//! date, a file extension. [`TargetConfig`] says how to find it (strategy,
//! candidate patterns, optional regex extraction) and how much it counts
//! towards the overall score.

mod validate;

pub use validate::{ValueValidator, DEFAULT_DATE_FORMATS};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{check_threshold, ConfigError, ConfigResult};

/// Matching strategy for a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    Exact,
    Fuzzy,
    Hybrid,
    Romanization,
}

impl MatchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Fuzzy => "fuzzy",
            Self::Hybrid => "hybrid",
            Self::Romanization => "romanization",
        }
    }

    /// Whether the strategy gates on a similarity threshold
    pub fn needs_threshold(&self) -> bool {
        !matches!(self, Self::Exact)
    }
}

impl std::fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic category of a target
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    Name,
    FileExtension,
    Number,
    Date,
    Email,
    /// Caller-defined category
    Custom(String),
}

impl std::fmt::Display for TargetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name => f.write_str("name"),
            Self::FileExtension => f.write_str("file_extension"),
            Self::Number => f.write_str("number"),
            Self::Date => f.write_str("date"),
            Self::Email => f.write_str("email"),
            Self::Custom(kind) => write!(f, "custom:{}", kind),
        }
    }
}

/// Default threshold of the name and custom presets
pub const DEFAULT_TARGET_THRESHOLD: f64 = 0.65;

const DATE_REGEX: &str = r"(\d{4}[-/]?\d{2}[-/]?\d{2}|\d{2}[-/]?\d{2}[-/]?\d{4})";
const NUMBER_REGEX: &str = r"(\d+(?:[.,]\d+)*)";

fn default_true() -> bool {
    true
}

fn default_weight() -> f64 {
    1.0
}

fn default_strategy() -> MatchStrategy {
    MatchStrategy::Hybrid
}

/// How to find one target in a source string.
///
/// `fuzzy_threshold` is required for every strategy except
/// [`MatchStrategy::Exact`], which ignores it. Deserialized configs should
/// be checked with [`validate`](Self::validate) before use;
/// [`MultiTargetMatcher::add_target`](crate::multi::MultiTargetMatcher::add_target)
/// does this itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetConfig {
    pub target_type: TargetType,
    /// Candidate strings, in priority order
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default = "default_strategy")]
    pub matcher_strategy: MatchStrategy,
    #[serde(default)]
    pub fuzzy_threshold: Option<f64>,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default = "default_true")]
    pub required: bool,
    /// Share of the overall score, in [0, 10]
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Matches scoring below this are discarded
    #[serde(default)]
    pub min_score: f64,
    /// Extraction pattern tried before the candidates. Capture group 1 is
    /// the value if present, else the whole match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator: Option<ValueValidator>,
}

impl TargetConfig {
    /// Required target with the given strategy and no patterns
    pub fn new(target_type: TargetType, matcher_strategy: MatchStrategy) -> Self {
        Self {
            target_type,
            patterns: Vec::new(),
            matcher_strategy,
            fuzzy_threshold: matcher_strategy
                .needs_threshold()
                .then_some(DEFAULT_TARGET_THRESHOLD),
            case_sensitive: false,
            required: true,
            weight: 1.0,
            min_score: 0.0,
            regex_pattern: None,
            validator: None,
        }
    }

    /// Person or place name, hybrid at 0.65
    pub fn name<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(TargetType::Name, MatchStrategy::Hybrid).with_patterns(names)
    }

    /// Date extracted by regex and checked against common formats
    pub fn date() -> Self {
        Self::new(TargetType::Date, MatchStrategy::Fuzzy)
            .with_fuzzy_threshold(0.8)
            .with_regex(DATE_REGEX)
            .with_validator(ValueValidator::date())
    }

    /// Optional file extension, exact, half weight. A missing leading dot
    /// is added.
    pub fn extension<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns = extensions.into_iter().map(|ext| {
            let ext = ext.into();
            if ext.starts_with('.') {
                ext
            } else {
                format!(".{}", ext)
            }
        });
        Self::new(TargetType::FileExtension, MatchStrategy::Exact)
            .with_patterns(patterns)
            .with_required(false)
            .with_weight(0.5)
    }

    /// Optional number extracted by regex
    pub fn number() -> Self {
        Self::new(TargetType::Number, MatchStrategy::Fuzzy)
            .with_fuzzy_threshold(0.9)
            .with_regex(NUMBER_REGEX)
            .with_validator(ValueValidator::number())
            .with_required(false)
            .with_weight(0.8)
    }

    /// Caller-defined category
    pub fn custom<I, S>(kind: impl Into<String>, patterns: I, strategy: MatchStrategy) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(TargetType::Custom(kind.into()), strategy).with_patterns(patterns)
    }

    pub fn with_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Switch strategy. A threshold-gated strategy keeps the current
    /// threshold, or takes the default when there is none.
    pub fn with_strategy(mut self, strategy: MatchStrategy) -> Self {
        self.matcher_strategy = strategy;
        if strategy.needs_threshold() && self.fuzzy_threshold.is_none() {
            self.fuzzy_threshold = Some(DEFAULT_TARGET_THRESHOLD);
        }
        self
    }

    pub fn with_fuzzy_threshold(mut self, threshold: f64) -> Self {
        self.fuzzy_threshold = Some(threshold);
        self
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn with_regex(mut self, pattern: impl Into<String>) -> Self {
        self.regex_pattern = Some(pattern.into());
        self
    }

    pub fn with_validator(mut self, validator: ValueValidator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Check ranges and compile the regex
    pub fn validate(&self) -> ConfigResult<()> {
        if self.matcher_strategy.needs_threshold() {
            let threshold = self
                .fuzzy_threshold
                .ok_or(ConfigError::MissingThreshold(self.matcher_strategy))?;
            check_threshold(threshold)?;
        }
        if !(0.0..=10.0).contains(&self.weight) {
            return Err(ConfigError::InvalidWeight(self.weight));
        }
        if !(0.0..=1.0).contains(&self.min_score) {
            return Err(ConfigError::InvalidMinScore(self.min_score));
        }
        self.compile_regex()?;
        Ok(())
    }

    pub(crate) fn compile_regex(&self) -> ConfigResult<Option<Regex>> {
        self.regex_pattern
            .as_deref()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegex {
                    pattern: pattern.to_string(),
                    message: e.to_string(),
                })
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_presets() {
        let name = TargetConfig::name(["H48E012"]);
        assert_eq!(name.matcher_strategy, MatchStrategy::Hybrid);
        assert_eq!(name.fuzzy_threshold, Some(0.65));
        assert!(name.required);

        let ext = TargetConfig::extension(["kmz", ".xlsx"]);
        assert_eq!(ext.patterns, vec![".kmz", ".xlsx"]);
        assert_eq!(ext.fuzzy_threshold, None);
        assert!(!ext.required);
        assert_eq!(ext.weight, 0.5);

        let number = TargetConfig::number();
        assert_eq!(number.weight, 0.8);
        assert_eq!(number.fuzzy_threshold, Some(0.9));

        for preset in [name, ext, number, TargetConfig::date()] {
            assert_eq!(preset.validate(), Ok(()));
        }
    }

    #[test]
    fn test_validate() {
        let mut config = TargetConfig::name(["a"]);
        config.fuzzy_threshold = None;
        assert_eq!(config.validate(), Err(ConfigError::MissingThreshold(MatchStrategy::Hybrid)));

        let exact = TargetConfig::custom("code", ["a"], MatchStrategy::Exact);
        assert_eq!(exact.validate(), Ok(()));

        assert_eq!(
            TargetConfig::name(["a"]).with_weight(11.0).validate(),
            Err(ConfigError::InvalidWeight(11.0))
        );
        assert_eq!(
            TargetConfig::name(["a"]).with_min_score(-0.5).validate(),
            Err(ConfigError::InvalidMinScore(-0.5))
        );
        assert!(matches!(
            TargetConfig::name(["a"]).with_regex("(unclosed").validate(),
            Err(ConfigError::InvalidRegex { .. })
        ));
        assert!(TargetConfig::name(["a"]).with_fuzzy_threshold(1.5).validate().is_err());
    }

    #[test]
    fn test_with_strategy_fills_threshold() {
        let config = TargetConfig::extension(["kmz"]).with_strategy(MatchStrategy::Fuzzy);
        assert_eq!(config.fuzzy_threshold, Some(DEFAULT_TARGET_THRESHOLD));
        let kept = TargetConfig::date().with_strategy(MatchStrategy::Hybrid);
        assert_eq!(kept.fuzzy_threshold, Some(0.8));
    }

    #[test]
    fn test_deserialize_defaults() {
        let config: TargetConfig = serde_json::from_str(
            r#"{"target_type": "name", "patterns": ["北京"], "fuzzy_threshold": 0.7}"#,
        )
        .unwrap();
        assert_eq!(config.matcher_strategy, MatchStrategy::Hybrid);
        assert!(config.required);
        assert_eq!(config.weight, 1.0);
        assert_eq!(config.validate(), Ok(()));

        let custom: TargetConfig =
            serde_json::from_str(r#"{"target_type": {"custom": "sheet"}, "matcher_strategy": "exact"}"#)
                .unwrap();
        assert_eq!(custom.target_type, TargetType::Custom("sheet".into()));
    }

    #[test]
    fn test_display() {
        assert_eq!(MatchStrategy::Romanization.to_string(), "romanization");
        assert_eq!(TargetType::Custom("sheet".into()).to_string(), "custom:sheet");
    }
}
