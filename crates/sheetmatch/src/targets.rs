//! Loading target sets from JSON
//!
//! A target set is a JSON object mapping target names to
//! [`TargetConfig`]s:
//!
//! ```json
//! {
//!   "sheet": { "target_type": "name", "patterns": ["H48E011", "H48E012"] },
//!   "date":  { "target_type": "date", "matcher_strategy": "fuzzy",
//!              "regex_pattern": "(\\d{8})", "validator": { "kind": "date" } }
//! }
//! ```
//!
//! Targets come back sorted by name. Threshold-gated targets without a
//! `fuzzy_threshold` take the one from [`Settings`] when built, and
//! romanization targets take its layer switches.

use std::collections::BTreeMap;
use std::path::Path;

use sheetmatch_core::{MultiTargetMatcher, TargetConfig};
use tracing::info;

use crate::error::Result;
use crate::settings::Settings;

/// Parse a target set. Configs are not validated yet.
pub fn targets_from_json(json: &str) -> Result<Vec<(String, TargetConfig)>> {
    let targets: BTreeMap<String, TargetConfig> = serde_json::from_str(json)?;
    Ok(targets.into_iter().collect())
}

/// Read and parse a target set file
pub fn load_targets(path: impl AsRef<Path>) -> Result<Vec<(String, TargetConfig)>> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)?;
    let targets = targets_from_json(&json)?;
    info!(path = %path.display(), count = targets.len(), "loaded targets");
    Ok(targets)
}

/// Apply settings defaults, validate and register every target
pub fn build_matcher(
    targets: impl IntoIterator<Item = (String, TargetConfig)>,
    settings: &Settings,
) -> Result<MultiTargetMatcher> {
    let targets = targets.into_iter().map(|(name, mut config)| {
        if config.matcher_strategy.needs_threshold() && config.fuzzy_threshold.is_none() {
            config.fuzzy_threshold = Some(settings.fuzzy_threshold);
        }
        (name, config)
    });

    let mut matcher = MultiTargetMatcher::new()
        .with_debug(settings.debug)
        .with_romanization_config(settings.romanization_config());
    matcher.add_targets(targets)?;
    Ok(matcher)
}
