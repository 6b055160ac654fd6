//! Engine defaults read from the environment
//!
//! - `SHEETMATCH_FUZZY_THRESHOLD`: similarity threshold 0.0-1.0 (default: 0.6)
//! - `SHEETMATCH_CASE_SENSITIVE`: exact and fuzzy layers respect case (default: false)
//! - `SHEETMATCH_DEBUG`: matcher debug events (default: false)
//! - `SHEETMATCH_PHONETIC`: sound-alike layer in romanization matching (default: true)
//! - `SHEETMATCH_CROSS_LANGUAGE`: transliteration variants (default: true)
//! - `SHEETMATCH_ADAPTIVE`: adaptive learning (default: false)
//!
//! Booleans accept `1/true/yes/on` and `0/false/no/off`.

use sheetmatch_core::{
    FuzzyMatcher, HybridMatcher, MatchStrategy, Matcher, NameMatcher, RomanizationConfig,
    RomanizationMatcher, DEFAULT_FUZZY_THRESHOLD,
};
use tracing::warn;

use crate::error::Result;

const PREFIX: &str = "SHEETMATCH_";

/// Defaults applied to matchers built by a host
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub fuzzy_threshold: f64,
    pub case_sensitive: bool,
    pub debug: bool,
    pub phonetic: bool,
    pub cross_language: bool,
    pub adaptive: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            case_sensitive: false,
            debug: false,
            phonetic: true,
            cross_language: true,
            adaptive: false,
        }
    }
}

impl Settings {
    /// Read `SHEETMATCH_*` variables from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_vars(std::env::vars())
    }

    /// Build from explicit key/value pairs. Unknown keys are ignored and
    /// unparsable values keep the default with a warning. A parsed threshold
    /// outside (0, 1] is an error.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut settings = Self::default();

        for (key, value) in vars {
            let Some(name) = key.as_ref().strip_prefix(PREFIX) else {
                continue;
            };
            let value = value.as_ref().trim();

            match name {
                "FUZZY_THRESHOLD" => match value.parse::<f64>() {
                    Ok(threshold) => {
                        // Range is checked by the matcher constructor
                        FuzzyMatcher::new(threshold)?;
                        settings.fuzzy_threshold = threshold;
                    }
                    Err(_) => warn!(key = key.as_ref(), value, "ignoring unparsable threshold"),
                },
                "CASE_SENSITIVE" => set_flag(&mut settings.case_sensitive, key.as_ref(), value),
                "DEBUG" => set_flag(&mut settings.debug, key.as_ref(), value),
                "PHONETIC" => set_flag(&mut settings.phonetic, key.as_ref(), value),
                "CROSS_LANGUAGE" => set_flag(&mut settings.cross_language, key.as_ref(), value),
                "ADAPTIVE" => set_flag(&mut settings.adaptive, key.as_ref(), value),
                _ => {}
            }
        }

        Ok(settings)
    }

    pub fn romanization_config(&self) -> RomanizationConfig {
        RomanizationConfig::default()
            .with_threshold(self.fuzzy_threshold)
            .with_case_sensitive(self.case_sensitive)
            .with_debug(self.debug)
            .with_phonetic_matching(self.phonetic)
            .with_cross_language(self.cross_language)
            .with_adaptive_learning(self.adaptive)
    }

    pub fn hybrid_matcher(&self) -> Result<HybridMatcher> {
        Ok(HybridMatcher::new(self.fuzzy_threshold)?
            .with_case_sensitive(self.case_sensitive)
            .with_debug(self.debug))
    }

    /// Filename matcher for `strategy`. Romanization is rejected.
    pub fn name_matcher(&self, strategy: MatchStrategy) -> Result<NameMatcher> {
        Ok(NameMatcher::new(strategy, self.fuzzy_threshold)?
            .with_case_sensitive(self.case_sensitive)
            .with_debug(self.debug))
    }

    /// Matcher for `strategy` with these defaults
    pub fn matcher(&self, strategy: MatchStrategy) -> Result<Matcher> {
        let matcher = match strategy {
            MatchStrategy::Romanization => {
                Matcher::from(RomanizationMatcher::new(self.romanization_config())?)
            }
            other => {
                Matcher::from_strategy(other, Some(self.fuzzy_threshold), self.case_sensitive)?
                    .with_debug(self.debug)
            }
        };
        Ok(matcher)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn set_flag(slot: &mut bool, key: &str, value: &str) {
    match parse_flag(value) {
        Some(flag) => *slot = flag,
        None => warn!(key, value, "ignoring unparsable flag"),
    }
}
