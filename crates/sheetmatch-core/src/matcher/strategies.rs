//! Low-level comparison primitives shared by the matchers
//!
//! Feature-specific implementations:
//! - `simd`: substring search via memchr
//! - `phonetic`: Double Metaphone via rphonetic
//!
//! Without those features the pure Rust fallbacks are used.

use std::borrow::Cow;

/// Lowercase unless matching is case sensitive
#[inline]
pub fn fold(s: &str, case_sensitive: bool) -> Cow<'_, str> {
    if case_sensitive || !s.chars().any(char::is_uppercase) {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(s.to_lowercase())
    }
}

/// Byte offset of the first occurrence of `needle` in `haystack`
#[inline]
pub fn find(haystack: &str, needle: &str) -> Option<usize> {
    #[cfg(feature = "simd")]
    {
        memchr::memmem::find(haystack.as_bytes(), needle.as_bytes())
    }

    #[cfg(not(feature = "simd"))]
    {
        haystack.find(needle)
    }
}

#[inline]
pub fn contains(haystack: &str, needle: &str) -> bool {
    find(haystack, needle).is_some()
}

/// Sound-alike score using Double Metaphone (0.70-0.75).
///
/// Only ASCII input is encoded; anything else returns `None`.
#[cfg(feature = "phonetic")]
pub fn phonetic_match(a: &str, b: &str) -> Option<f64> {
    use rphonetic::DoubleMetaphone;

    if !a.is_ascii() || !b.is_ascii() {
        return None;
    }

    let encoder = DoubleMetaphone::default();
    let split = |s: &str| -> Vec<String> {
        s.split(|c: char| c.is_whitespace() || c == '_' || c == '-')
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect()
    };
    let a_words = split(a);
    let b_words = split(b);

    if a_words.len() == 1 && b_words.len() == 1 {
        let ra = encoder.double_metaphone(&a_words[0]);
        let rb = encoder.double_metaphone(&b_words[0]);

        if !ra.primary().is_empty() && ra.primary() == rb.primary() {
            return Some(0.75);
        }
        if !ra.alternate().is_empty() && ra.alternate() == rb.primary() {
            return Some(0.70);
        }
        if !rb.alternate().is_empty() && ra.primary() == rb.alternate() {
            return Some(0.70);
        }
        return None;
    }

    // Multi-word names must agree word by word
    if a_words.len() > 1 && a_words.len() == b_words.len() {
        let all_match = a_words.iter().zip(&b_words).all(|(wa, wb)| {
            let ra = encoder.double_metaphone(wa);
            let rb = encoder.double_metaphone(wb);
            !ra.primary().is_empty() && ra.primary() == rb.primary()
        });
        if all_match {
            return Some(0.72);
        }
    }

    None
}

#[cfg(not(feature = "phonetic"))]
pub fn phonetic_match(_a: &str, _b: &str) -> Option<f64> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold() {
        assert_eq!(fold("Beijing", false), "beijing");
        assert_eq!(fold("Beijing", true), "Beijing");
        assert!(matches!(fold("beijing", false), Cow::Borrowed(_)));
        assert_eq!(fold("ÀÉ", false), "àé");
    }

    #[test]
    fn test_find() {
        assert_eq!(find("report_H48E012.kmz", "H48E012"), Some(7));
        assert_eq!(find("abc", "x"), None);
        assert!(contains("北京朝阳区", "朝阳"));
    }

    #[cfg(feature = "phonetic")]
    #[test]
    fn test_phonetic_match() {
        assert!(phonetic_match("smith", "smyth").is_some());
        assert!(phonetic_match("北京", "beijing").is_none());
    }

    #[cfg(not(feature = "phonetic"))]
    #[test]
    fn test_phonetic_disabled() {
        assert_eq!(phonetic_match("smith", "smyth"), None);
    }
}
