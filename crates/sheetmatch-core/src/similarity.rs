//! Edit-distance similarity
//!
//! Similarity is `1 - distance / max_len`, where distance is the optimal
//! string alignment distance (Levenshtein plus adjacent transpositions) over
//! Unicode scalar values. Case folding is the caller's job.

use strsim::osa_distance;

/// Stateless similarity calculator
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityCalculator;

impl SimilarityCalculator {
    /// Normalized similarity in [0, 1].
    ///
    /// Identical strings score 1.0, including two empty strings. An empty
    /// string against a non-empty one scores 0.0.
    pub fn calculate_similarity(a: &str, b: &str) -> f64 {
        if a == b {
            return 1.0;
        }

        let max_len = a.chars().count().max(b.chars().count());
        if max_len == 0 {
            return 1.0;
        }

        let distance = osa_distance(a, b);
        (1.0 - distance as f64 / max_len as f64).clamp(0.0, 1.0)
    }

    /// Returns `(prefix_similarity, overall_similarity)`.
    ///
    /// The prefix is the first `prefix_len` characters of each string, or the
    /// length of the shorter string when `None`.
    pub fn prefix_similarity(a: &str, b: &str, prefix_len: Option<usize>) -> (f64, f64) {
        let overall = Self::calculate_similarity(a, b);
        let len = prefix_len.unwrap_or_else(|| a.chars().count().min(b.chars().count()));

        let prefix_a: String = a.chars().take(len).collect();
        let prefix_b: String = b.chars().take(len).collect();
        (Self::calculate_similarity(&prefix_a, &prefix_b), overall)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings() {
        assert_eq!(SimilarityCalculator::calculate_similarity("test", "test"), 1.0);
    }

    #[test]
    fn empty_strings() {
        assert_eq!(SimilarityCalculator::calculate_similarity("", ""), 1.0);
        assert_eq!(SimilarityCalculator::calculate_similarity("", "abc"), 0.0);
        assert_eq!(SimilarityCalculator::calculate_similarity("abc", ""), 0.0);
    }

    #[test]
    fn transposition_costs_one_edit() {
        let sim = SimilarityCalculator::calculate_similarity("tset", "test");
        assert!((sim - 0.75).abs() < 1e-9, "got {}", sim);
    }

    #[test]
    fn disjoint_strings() {
        assert_eq!(SimilarityCalculator::calculate_similarity("xyz", "abc"), 0.0);
    }

    #[test]
    fn counts_characters_not_bytes() {
        // One substitution out of three characters
        let sim = SimilarityCalculator::calculate_similarity("朝阳区", "朝阳县");
        assert!((sim - 2.0 / 3.0).abs() < 1e-9, "got {}", sim);
    }

    #[test]
    fn symmetric() {
        let pairs = [("kitten", "sitting"), ("北京", "Beijing"), ("", "a")];
        for (a, b) in pairs {
            assert_eq!(
                SimilarityCalculator::calculate_similarity(a, b),
                SimilarityCalculator::calculate_similarity(b, a)
            );
        }
    }

    #[test]
    fn prefix_similarity_uses_shorter_length() {
        let (prefix, overall) = SimilarityCalculator::prefix_similarity("mahrous", "mahrous_new", None);
        assert_eq!(prefix, 1.0);
        assert!(overall < 1.0);
    }

    #[test]
    fn prefix_similarity_explicit_length() {
        let (prefix, _) = SimilarityCalculator::prefix_similarity("abcd", "abxy", Some(2));
        assert_eq!(prefix, 1.0);
    }
}
