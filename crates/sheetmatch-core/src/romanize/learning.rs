//! Learning transliteration pairs from repeated confident matches

use ahash::AHashMap;

use super::variants::{detect_script, is_native_script, VariantGroup, VariantTable};

/// Accepted matches of the same pair before it is learned
pub const LEARN_AFTER: u32 = 3;

/// Minimum score for a match to count towards learning
pub const LEARN_MIN_SCORE: f64 = 0.8;

/// Confidence ceiling for learned groups
const LEARNED_CONFIDENCE_CAP: f64 = 0.95;

/// Pairs tracked before single sightings are dropped
pub const MAX_PENDING_PAIRS: usize = 4096;

/// Counts accepted (query, match) pairs and promotes frequent ones to
/// [`VariantGroup`]s.
///
/// A promoted pair stops being counted. At most [`MAX_PENDING_PAIRS`]
/// pairs wait for promotion; when full, pairs seen only once are dropped
/// and new pairs are ignored until there is room.
#[derive(Debug, Clone, Default)]
pub struct AdaptiveLearner {
    counts: AHashMap<(String, String), u32>,
    learned: VariantTable,
}

impl AdaptiveLearner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an accepted match. Returns the new group when this
    /// observation promotes the pair.
    pub fn observe(&mut self, query: &str, matched: &str, score: f64) -> Option<&VariantGroup> {
        if score < LEARN_MIN_SCORE || query == matched || self.is_learned(query, matched) {
            return None;
        }

        let key = (query.to_string(), matched.to_string());
        if !self.counts.contains_key(&key) && self.counts.len() >= MAX_PENDING_PAIRS {
            self.counts.retain(|_, seen| *seen > 1);
            if self.counts.len() >= MAX_PENDING_PAIRS {
                return None;
            }
        }

        let seen = self.counts.entry(key.clone()).or_insert(0);
        *seen += 1;
        if *seen < LEARN_AFTER {
            return None;
        }
        self.counts.remove(&key);

        // The native-script side becomes the original
        let (original, romanized) = if is_native_script(query) && !is_native_script(matched) {
            (query, matched)
        } else {
            (matched, query)
        };
        let language = detect_script(original);
        self.learned.add(VariantGroup::new(
            original,
            romanized,
            language,
            score.min(LEARNED_CONFIDENCE_CAP),
        ));
        self.learned.groups().last()
    }

    fn is_learned(&self, query: &str, matched: &str) -> bool {
        self.learned
            .groups()
            .iter()
            .any(|g| g.contains(query) && g.contains(matched))
    }

    pub fn learned(&self) -> &[VariantGroup] {
        self.learned.groups()
    }

    /// Variant score of `a` against `b` over learned groups only
    pub fn score(&self, a: &str, b: &str) -> f64 {
        self.learned.score(a, b)
    }

    pub fn suggestions(&self, text: &str) -> Vec<VariantGroup> {
        self.learned.suggestions(text)
    }

    /// Times the pair has been observed while waiting for promotion
    pub fn count(&self, query: &str, matched: &str) -> u32 {
        self.counts
            .get(&(query.to_string(), matched.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Pairs waiting for promotion
    pub fn pending(&self) -> usize {
        self.counts.len()
    }

    pub fn clear(&mut self) {
        self.counts.clear();
        self.learned = VariantTable::empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_promotes_after_three() {
        let mut learner = AdaptiveLearner::new();
        assert!(learner.observe("Tsingtau", "青岛", 0.9).is_none());
        assert!(learner.observe("Tsingtau", "青岛", 0.9).is_none());

        let group = learner.observe("Tsingtau", "青岛", 0.99).cloned().unwrap();
        assert_eq!(group.original, "青岛");
        assert_eq!(group.romanized, "Tsingtau");
        assert_eq!(group.language, "chinese");
        assert_eq!(group.confidence, 0.95);

        // Promoted once only, and no longer counted
        assert!(learner.observe("Tsingtau", "青岛", 0.9).is_none());
        assert_eq!(learner.learned().len(), 1);
        assert_eq!(learner.count("Tsingtau", "青岛"), 0);
        assert_eq!(learner.pending(), 0);
        assert_eq!(learner.score("青岛", "tsingtau"), 0.95);
    }

    #[test]
    fn test_low_scores_ignored() {
        let mut learner = AdaptiveLearner::new();
        for _ in 0..5 {
            learner.observe("Mohamad", "Muhammad", 0.7);
        }
        assert_eq!(learner.count("Mohamad", "Muhammad"), 0);
        assert!(learner.learned().is_empty());
    }

    #[test]
    fn test_latin_pair_keeps_match_as_original() {
        let mut learner = AdaptiveLearner::new();
        for _ in 0..3 {
            learner.observe("Mohamad", "Muhammad", 0.85);
        }
        let group = &learner.learned()[0];
        assert_eq!(group.original, "Muhammad");
        assert_eq!(group.romanized, "Mohamad");
        assert_eq!(group.language, "latin");
        assert_eq!(group.confidence, 0.85);

        learner.clear();
        assert!(learner.learned().is_empty());
    }

    #[test]
    fn test_pending_pairs_bounded() {
        let mut learner = AdaptiveLearner::new();
        learner.observe("Kanton", "Canton", 0.9);
        learner.observe("Kanton", "Canton", 0.9);
        for i in 0..MAX_PENDING_PAIRS * 2 {
            learner.observe(&format!("name{i}"), "Target", 0.9);
        }
        assert!(learner.pending() <= MAX_PENDING_PAIRS);

        // Pairs seen more than once survive the sweep and still promote
        assert_eq!(learner.count("Kanton", "Canton"), 2);
        assert!(learner.observe("Kanton", "Canton", 0.9).is_some());
    }
}
