//! Batch analysis of multi-target results

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use super::MultiMatchResult;
use crate::error::{ConfigError, ConfigResult};

/// Score bucket boundaries. A score `>= high` is high, `>= medium` medium,
/// anything else low.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    pub high: f64,
    pub medium: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            high: 0.8,
            medium: 0.5,
        }
    }
}

impl AnalyzerConfig {
    pub fn new(high: f64, medium: f64) -> ConfigResult<Self> {
        for value in [high, medium] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidThreshold {
                    value,
                    range: "[0, 1]",
                });
            }
        }
        if medium > high {
            return Err(ConfigError::InvalidThreshold {
                value: medium,
                range: "[0, high]",
            });
        }
        Ok(Self { high, medium })
    }

    fn bucket(&self, score: f64) -> Bucket {
        if score >= self.high {
            Bucket::High
        } else if score >= self.medium {
            Bucket::Medium
        } else {
            Bucket::Low
        }
    }
}

enum Bucket {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total_count: usize,
    pub complete_count: usize,
    pub complete_rate: f64,
    pub avg_score: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreDistribution {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetStatistics {
    /// Results in which the target appears
    pub seen_count: usize,
    pub matched_count: usize,
    pub match_rate: f64,
    pub avg_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestMatch {
    pub source: String,
    pub score: f64,
    pub matched_values: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorstMatch {
    pub source: String,
    pub score: f64,
    pub missing_targets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchAnalysis {
    pub summary: BatchSummary,
    pub score_distribution: ScoreDistribution,
    pub target_statistics: BTreeMap<String, TargetStatistics>,
    pub best_match: Option<BestMatch>,
    pub worst_match: Option<WorstMatch>,
}

/// Source strings grouped by score bucket
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreRanges {
    pub high: Vec<String>,
    pub medium: Vec<String>,
    pub low: Vec<String>,
}

/// A set of missing targets and how many incomplete results share it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailurePattern {
    pub missing: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternReport {
    /// Most frequent first, ties ordered by the missing set
    pub common_failures: Vec<FailurePattern>,
    /// How often each target matched
    pub frequent_targets: BTreeMap<String, usize>,
    /// How often each target was required but missing
    pub missing_frequency: BTreeMap<String, usize>,
    pub score_ranges: ScoreRanges,
}

impl PatternReport {
    /// Up to `limit` targets, most often missing first
    pub fn most_missed_targets(&self, limit: usize) -> Vec<(&str, usize)> {
        let mut missed: Vec<(&str, usize)> = self
            .missing_frequency
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        missed.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        missed.truncate(limit);
        missed
    }
}

/// Read-only aggregation over batches of [`MultiMatchResult`]
#[derive(Debug, Clone, Default)]
pub struct ResultAnalyzer {
    config: AnalyzerConfig,
}

impl ResultAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn analyze_batch_results(&self, results: &[MultiMatchResult]) -> BatchAnalysis {
        let Some(first) = results.first() else {
            return BatchAnalysis::default();
        };

        let total_count = results.len();
        let complete_count = results.iter().filter(|r| r.is_complete()).count();
        let score_sum: f64 = results.iter().map(MultiMatchResult::overall_score).sum();

        let mut distribution = ScoreDistribution::default();
        let mut stats: BTreeMap<String, TargetStatistics> = BTreeMap::new();
        let mut best = first;
        let mut worst = first;

        for result in results {
            match self.config.bucket(result.overall_score()) {
                Bucket::High => distribution.high += 1,
                Bucket::Medium => distribution.medium += 1,
                Bucket::Low => distribution.low += 1,
            }

            for (name, m) in result.matches() {
                let entry = stats.entry(name.clone()).or_default();
                entry.seen_count += 1;
                if m.is_matched() {
                    entry.matched_count += 1;
                }
                entry.avg_score += m.similarity_score();
            }

            if result.overall_score() > best.overall_score() {
                best = result;
            }
            if result.overall_score() < worst.overall_score() {
                worst = result;
            }
        }

        for entry in stats.values_mut() {
            let seen = entry.seen_count as f64;
            entry.match_rate = entry.matched_count as f64 / seen;
            entry.avg_score /= seen;
        }

        BatchAnalysis {
            summary: BatchSummary {
                total_count,
                complete_count,
                complete_rate: complete_count as f64 / total_count as f64,
                avg_score: score_sum / total_count as f64,
            },
            score_distribution: distribution,
            target_statistics: stats,
            best_match: Some(BestMatch {
                source: best.source_string().to_string(),
                score: best.overall_score(),
                matched_values: best.matched_values(),
            }),
            worst_match: Some(WorstMatch {
                source: worst.source_string().to_string(),
                score: worst.overall_score(),
                missing_targets: worst.missing_targets().to_vec(),
            }),
        }
    }

    pub fn find_patterns(&self, results: &[MultiMatchResult]) -> PatternReport {
        let mut failures: BTreeMap<Vec<String>, usize> = BTreeMap::new();
        let mut report = PatternReport::default();

        for result in results {
            if !result.is_complete() {
                let mut key = result.missing_targets().to_vec();
                key.sort();
                *failures.entry(key).or_default() += 1;

                for name in result.missing_targets() {
                    *report.missing_frequency.entry(name.clone()).or_default() += 1;
                }
            }

            for name in result.matched_targets() {
                *report.frequent_targets.entry(name.to_string()).or_default() += 1;
            }

            let source = result.source_string().to_string();
            match self.config.bucket(result.overall_score()) {
                Bucket::High => report.score_ranges.high.push(source),
                Bucket::Medium => report.score_ranges.medium.push(source),
                Bucket::Low => report.score_ranges.low.push(source),
            }
        }

        report.common_failures = failures
            .into_iter()
            .map(|(missing, count)| FailurePattern { missing, count })
            .collect();
        // Stable sort keeps the BTreeMap key order among equal counts
        report.common_failures.sort_by(|a, b| b.count.cmp(&a.count));
        report
    }

    /// Plain-text report of [`analyze_batch_results`](Self::analyze_batch_results)
    /// and, optionally, [`find_patterns`](Self::find_patterns)
    pub fn generate_report(&self, results: &[MultiMatchResult], include_patterns: bool) -> String {
        let analysis = self.analyze_batch_results(results);
        let AnalyzerConfig { high, medium } = self.config;
        let mut out = String::new();

        // Writing into a String cannot fail
        let _ = writeln!(out, "Batch match analysis");
        let _ = writeln!(out, "{}", "=".repeat(50));

        let s = &analysis.summary;
        let _ = writeln!(out, "\nSummary:");
        let _ = writeln!(out, "  Total results: {}", s.total_count);
        let _ = writeln!(
            out,
            "  Complete: {} ({:.1}%)",
            s.complete_count,
            s.complete_rate * 100.0
        );
        let _ = writeln!(out, "  Average score: {:.3}", s.avg_score);

        let d = &analysis.score_distribution;
        let _ = writeln!(out, "\nScore distribution:");
        let _ = writeln!(out, "  High (>={high}): {}", d.high);
        let _ = writeln!(out, "  Medium ({medium}-{high}): {}", d.medium);
        let _ = writeln!(out, "  Low (<{medium}): {}", d.low);

        let _ = writeln!(out, "\nTargets:");
        for (name, stats) in &analysis.target_statistics {
            let _ = writeln!(
                out,
                "  {}: {:.1}% matched (average score {:.3})",
                name,
                stats.match_rate * 100.0,
                stats.avg_score
            );
        }

        if let Some(best) = &analysis.best_match {
            let _ = writeln!(out, "\nBest match:");
            let _ = writeln!(out, "  Source: {}", best.source);
            let _ = writeln!(out, "  Score: {:.3}", best.score);
            let values: Vec<String> = best
                .matched_values
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            let _ = writeln!(out, "  Values: {}", values.join(", "));
        }

        if let Some(worst) = &analysis.worst_match {
            let _ = writeln!(out, "\nWorst match:");
            let _ = writeln!(out, "  Source: {}", worst.source);
            let _ = writeln!(out, "  Score: {:.3}", worst.score);
            let _ = writeln!(out, "  Missing: {}", worst.missing_targets.join(", "));
        }

        if include_patterns {
            let patterns = self.find_patterns(results);
            let _ = writeln!(out, "\nPatterns:");
            if !patterns.common_failures.is_empty() {
                let _ = writeln!(out, "  Common failures:");
                for failure in &patterns.common_failures {
                    let _ = writeln!(
                        out,
                        "    [{}]: {} times",
                        failure.missing.join(", "),
                        failure.count
                    );
                }
            }
            let r = &patterns.score_ranges;
            let _ = writeln!(out, "  High: {}", r.high.len());
            let _ = writeln!(out, "  Medium: {}", r.medium.len());
            let _ = writeln!(out, "  Low: {}", r.low.len());
        }

        out
    }
}
