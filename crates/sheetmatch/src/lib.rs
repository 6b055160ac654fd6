//! # Sheetmatch Shared Rust Library
//!
//! Infrastructure for hosts embedding the matching engine:
//! - **settings**: engine defaults from `SHEETMATCH_*` environment variables
//! - **targets**: JSON target sets and ready-built multi-target matchers
//! - **error**: Common error types with context
//! - **tracing**: Logging setup
//!
//! The engine itself is re-exported as [`engine`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use sheetmatch::{targets, Settings};
//!
//! # fn main() -> sheetmatch::Result<()> {
//! sheetmatch::tracing::init();
//! let settings = Settings::from_env()?;
//! let matcher = targets::build_matcher(targets::load_targets("targets.json")?, &settings)?;
//! let result = matcher.match_string("20240601_H48E012.kmz");
//! println!("{}", result);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod settings;
pub mod targets;
pub mod tracing;

pub use sheetmatch_core as engine;

// Re-export commonly used items at crate root
pub use error::{Error, Result};
pub use settings::Settings;
pub use sheetmatch_core::{
    MatchResult, MatchStrategy, Matcher, MultiMatchResult, MultiTargetMatcher, StringMatcher,
    TargetConfig,
};
