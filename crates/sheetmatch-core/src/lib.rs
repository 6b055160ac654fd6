//! Sheetmatch Core Engine
//!
//! Reconciles messy, user-supplied strings (filenames, transliterated names)
//! against canonical names. Matching is pure and synchronous: "no match" is
//! `None`, and only malformed configuration returns an error.
//!
//! # Features
//!
//! - `native` - Enable all native optimizations (SIMD, parallel, phonetic)
//! - `simd` - SIMD-accelerated substring search via memchr
//! - `parallel` - Parallel scoring via rayon for large candidate lists and batches
//! - `phonetic` - Double Metaphone sound-alike signal in romanization matching
//!
//! # Example
//!
//! ```rust
//! use sheetmatch_core::{HybridMatcher, MultiTargetMatcher, StringMatcher, TargetConfig};
//!
//! // Single query
//! let matcher = HybridMatcher::new(0.6).unwrap();
//! assert_eq!(matcher.match_string("tset", &["test", "example"]), Some("test"));
//!
//! // Several targets in one filename
//! let mut multi = MultiTargetMatcher::new();
//! multi
//!     .add_target("sheet", TargetConfig::name(["H48E011", "H48E012"]))
//!     .unwrap()
//!     .add_target("date", TargetConfig::date())
//!     .unwrap();
//! let result = multi.match_string("20240601_H48E012.kmz");
//! assert_eq!(result.get_matched_value("sheet"), Some("H48E012"));
//! assert!(result.is_complete());
//! ```

pub mod error;
pub mod matcher;
pub mod multi;
pub mod result;
pub mod romanize;
pub mod similarity;
pub mod target;

// Re-export main types at crate root
pub use error::{ConfigError, ConfigResult, ExportError};
pub use matcher::{
    ExactMatcher, ExactMode, FuzzyMatcher, HybridMatcher, MatchLayer, Matcher, NameMatcher,
    StringMatcher, DEFAULT_FUZZY_THRESHOLD, FILE_NAME_THRESHOLD, RELAXED_THRESHOLD, STRICT_THRESHOLD,
};
pub use multi::MultiTargetMatcher;
pub use result::{
    AnalyzerConfig, BatchAnalysis, ConfidenceLevel, MatchResult, MatchType, MultiMatchResult,
    PatternReport, ResultAnalyzer, ResultExporter, SingleMatchResult, SingleResultAnalyzer,
    SingleResultExporter,
};
pub use romanize::{RomanizationConfig, RomanizationMatcher, VariantGroup};
pub use similarity::SimilarityCalculator;
pub use target::{MatchStrategy, TargetConfig, TargetType, ValueValidator};
