//! Cross-script name matching
//!
//! [`RomanizationMatcher`] extends hybrid matching for names written in
//! different scripts or romanization systems. Per candidate it takes the best
//! of three signals:
//!
//! - known transliteration variants ([`VariantTable`], plus pairs learned at
//!   runtime when adaptive learning is on)
//! - plain edit-distance similarity
//! - similarity after sound-alike normalization ([`PhoneticTable`]), plus a
//!   Double Metaphone agreement with the `phonetic` feature
//!
//! An exact hit short-circuits with score 1.0. A best score below the
//! threshold is no match.

mod learning;
mod rules;
mod variants;

pub use learning::{AdaptiveLearner, LEARN_AFTER, LEARN_MIN_SCORE, MAX_PENDING_PAIRS};
pub use rules::{strip_diacritics, PhoneticTable, SoundRule};
pub use variants::{detect_script, is_native_script, VariantGroup, VariantTable};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{check_threshold, ConfigResult};
use crate::matcher::{strategies, HybridMatcher, StringMatcher};
use crate::result::{MatchResult, MatchType};
use crate::similarity::SimilarityCalculator;

/// Default acceptance threshold for romanization matching
pub const DEFAULT_ROMANIZATION_THRESHOLD: f64 = 0.7;

/// Romanization matcher settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RomanizationConfig {
    pub threshold: f64,
    pub case_sensitive: bool,
    pub debug: bool,
    /// Compare sound-alike normalized forms
    pub phonetic_matching: bool,
    /// Consult transliteration variant groups
    pub cross_language: bool,
    /// Learn variant pairs from repeated confident matches
    pub adaptive_learning: bool,
}

impl Default for RomanizationConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_ROMANIZATION_THRESHOLD,
            case_sensitive: false,
            debug: false,
            phonetic_matching: true,
            cross_language: true,
            adaptive_learning: false,
        }
    }
}

impl RomanizationConfig {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_phonetic_matching(mut self, enabled: bool) -> Self {
        self.phonetic_matching = enabled;
        self
    }

    pub fn with_cross_language(mut self, enabled: bool) -> Self {
        self.cross_language = enabled;
        self
    }

    pub fn with_adaptive_learning(mut self, enabled: bool) -> Self {
        self.adaptive_learning = enabled;
        self
    }
}

/// Hybrid matching plus sound-alike rules and transliteration variants.
///
/// The phonetic and transliteration layers always ignore case; the
/// `case_sensitive` setting applies to the exact and fuzzy layers.
#[derive(Debug)]
pub struct RomanizationMatcher {
    config: RomanizationConfig,
    hybrid: HybridMatcher,
    rules: PhoneticTable,
    variants: VariantTable,
    learner: RwLock<AdaptiveLearner>,
}

impl Clone for RomanizationMatcher {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            hybrid: self.hybrid.clone(),
            rules: self.rules.clone(),
            variants: self.variants.clone(),
            learner: RwLock::new(self.learner.read().clone()),
        }
    }
}

impl Default for RomanizationMatcher {
    fn default() -> Self {
        Self::build(RomanizationConfig::default(), HybridMatcher::default())
    }
}

impl RomanizationMatcher {
    /// Fails unless `config.threshold` is in (0, 1]
    pub fn new(config: RomanizationConfig) -> ConfigResult<Self> {
        let threshold = check_threshold(config.threshold)?;
        let hybrid = HybridMatcher::new(threshold)?
            .with_case_sensitive(config.case_sensitive)
            .with_debug(config.debug);
        Ok(Self::build(config, hybrid))
    }

    fn build(config: RomanizationConfig, hybrid: HybridMatcher) -> Self {
        Self {
            config,
            hybrid,
            rules: PhoneticTable::builtin(),
            variants: VariantTable::builtin(),
            learner: RwLock::new(AdaptiveLearner::new()),
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self.hybrid = self.hybrid.with_debug(debug);
        self
    }

    pub fn config(&self) -> &RomanizationConfig {
        &self.config
    }

    pub fn threshold(&self) -> f64 {
        self.config.threshold
    }

    pub fn set_threshold(&mut self, threshold: f64) -> ConfigResult<()> {
        let threshold = check_threshold(threshold)?;
        self.hybrid.set_fuzzy_threshold(threshold)?;
        self.config.threshold = threshold;
        Ok(())
    }

    /// Register a transliteration pair. Confidence is clamped to [0, 1].
    pub fn add_custom_mapping(&mut self, original: &str, romanized: &str, language: &str, confidence: f64) {
        self.variants
            .add(VariantGroup::new(original, romanized, language, confidence));
        if self.config.debug {
            debug!(original, romanized, language, confidence, "custom mapping added");
        }
    }

    /// Register a sound rule, replacing any rule with the same pattern
    pub fn add_sound_rule(&mut self, pattern: &str, replacement: &str) -> ConfigResult<()> {
        self.rules.add_rule(pattern, replacement)?;
        if self.config.debug {
            debug!(pattern, replacement, "sound rule added");
        }
        Ok(())
    }

    /// Variant groups `text` belongs to, learned ones included, highest
    /// confidence first
    pub fn romanization_suggestions(&self, text: &str) -> Vec<VariantGroup> {
        let mut found = self.variants.suggestions(text);
        found.extend(self.learner.read().suggestions(text));
        found.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        found
    }

    /// Sound-alike canonical form of `text`
    pub fn normalize_romanization(&self, text: &str) -> String {
        self.rules.normalize(text)
    }

    /// Groups learned so far
    pub fn learned_mappings(&self) -> Vec<VariantGroup> {
        self.learner.read().learned().to_vec()
    }

    /// Best non-exact score of `candidate` for `query` and the layer that
    /// produced it
    pub fn score(&self, query: &str, candidate: &str) -> (f64, MatchType) {
        let mut best = (0.0, MatchType::None);

        if self.config.cross_language {
            let variant = self
                .variants
                .score(query, candidate)
                .max(self.learner.read().score(query, candidate));
            if variant > 0.0 {
                best = (variant, MatchType::Transliteration);
            }
        }

        let fuzzy = self.hybrid.fuzzy().score(query, candidate);
        if fuzzy > best.0 {
            best = (fuzzy, MatchType::Fuzzy);
        }

        if self.config.phonetic_matching {
            let phonetic = self.phonetic_score(query, candidate);
            if phonetic > best.0 {
                best = (phonetic, MatchType::Phonetic);
            }
        }

        best
    }

    fn phonetic_score(&self, query: &str, candidate: &str) -> f64 {
        let q = self.rules.normalize(query);
        let c = self.rules.normalize(candidate);
        let normalized = if q.is_empty() || c.is_empty() {
            0.0
        } else {
            SimilarityCalculator::calculate_similarity(&q, &c)
        };
        normalized.max(strategies::phonetic_match(query, candidate).unwrap_or(0.0))
    }

    /// Winning candidate index, its score and type, regardless of threshold
    fn evaluate<S: AsRef<str>>(&self, query: &str, candidates: &[S]) -> Option<(usize, f64, MatchType)> {
        if query.is_empty() {
            return None;
        }
        if let Some(idx) = self.hybrid.exact().find_index(query, candidates) {
            return Some((idx, 1.0, MatchType::Exact));
        }

        let mut best: Option<(usize, f64, MatchType)> = None;
        for (idx, candidate) in candidates.iter().enumerate() {
            let (score, kind) = self.score(query, candidate.as_ref());
            match best {
                Some((_, top, _)) if score <= top => {}
                _ => best = Some((idx, score, kind)),
            }
        }
        best
    }

    /// Accepted match, after feeding the learner
    fn accept<S: AsRef<str>>(&self, query: &str, candidates: &[S]) -> Option<(usize, f64, MatchType)> {
        let found = self.evaluate(query, candidates);
        let accepted = found.filter(|(_, score, _)| *score >= self.config.threshold);

        if self.config.debug {
            match (found, accepted) {
                (_, Some((idx, score, kind))) => {
                    debug!(query, matched = candidates[idx].as_ref(), score, match_type = %kind, "romanization match")
                }
                (Some((_, score, _)), None) => {
                    debug!(query, best_score = score, threshold = self.config.threshold, "no romanization match")
                }
                (None, None) => debug!(query, "no candidates"),
            }
        }

        if let Some((idx, score, kind)) = accepted {
            if self.config.adaptive_learning && kind != MatchType::Exact {
                let mut learner = self.learner.write();
                if let Some(group) = learner.observe(query, candidates[idx].as_ref(), score) {
                    if self.config.debug {
                        debug!(original = %group.original, romanized = %group.romanized, "learned variant");
                    }
                }
            }
        }
        accepted
    }
}

impl StringMatcher for RomanizationMatcher {
    fn match_string_with_score<'a, S: AsRef<str> + Sync>(
        &self,
        query: &str,
        candidates: &'a [S],
    ) -> Option<(&'a str, f64)> {
        self.accept(query, candidates)
            .map(|(idx, score, _)| (candidates[idx].as_ref(), score))
    }

    fn match_with_result<S: AsRef<str> + Sync>(&self, query: &str, candidates: &[S]) -> MatchResult {
        match self.accept(query, candidates) {
            Some((idx, _, MatchType::Exact)) => MatchResult::exact(candidates[idx].as_ref()),
            Some((idx, score, kind)) => MatchResult::scored(candidates[idx].as_ref(), score, kind),
            None => MatchResult::none(),
        }
    }
}
