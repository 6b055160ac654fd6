//! CSV, Markdown and JSON renderings of results
//!
//! Exporters borrow results and never modify them. Column sets are fixed so
//! downstream report generators can rely on them.

use super::{MultiMatchResult, SingleMatchResult, SingleResultAnalyzer};
use crate::error::ExportError;

const MULTI_HEADERS: [&str; 7] = [
    "source_string",
    "overall_score",
    "is_complete",
    "matched_count",
    "total_targets",
    "missing_targets",
    "matched_values",
];

const SINGLE_HEADERS: [&str; 10] = [
    "target_name",
    "matched_string",
    "similarity_score",
    "match_type",
    "confidence",
    "confidence_level",
    "is_matched",
    "match_position",
    "match_length",
    "preprocessing_applied",
];

/// Exports [`MultiMatchResult`]s
pub struct ResultExporter;

impl ResultExporter {
    pub fn csv_headers() -> &'static [&'static str] {
        &MULTI_HEADERS
    }

    /// One flattened row matching [`csv_headers`](Self::csv_headers).
    ///
    /// Missing targets are `;`-joined and matched values are `;`-joined
    /// `target:value` pairs.
    pub fn to_csv_row(result: &MultiMatchResult) -> Vec<String> {
        let matched_values: Vec<String> = result
            .matched_values()
            .into_iter()
            .map(|(name, value)| format!("{name}:{value}"))
            .collect();

        vec![
            result.source_string().to_string(),
            result.overall_score().to_string(),
            result.is_complete().to_string(),
            result.matched_targets().len().to_string(),
            result.matches().len().to_string(),
            result.missing_targets().join(";"),
            matched_values.join(";"),
        ]
    }

    /// Header plus one row per result
    pub fn to_csv(results: &[MultiMatchResult]) -> Result<String, ExportError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(Self::csv_headers())?;
        for result in results {
            writer.write_record(Self::to_csv_row(result))?;
        }
        finish(writer)
    }

    /// Table with one column per target holding its matched value, empty
    /// when the target did not match
    pub fn to_csv_table<S: AsRef<str>>(
        results: &[MultiMatchResult],
        target_names: &[S],
    ) -> Result<String, ExportError> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        let mut header = vec!["source_string", "overall_score", "is_complete"];
        header.extend(target_names.iter().map(|name| name.as_ref()));
        writer.write_record(&header)?;

        for result in results {
            let mut row = vec![
                result.source_string().to_string(),
                result.overall_score().to_string(),
                result.is_complete().to_string(),
            ];
            row.extend(target_names.iter().map(|name| {
                result
                    .get_matched_value(name.as_ref())
                    .unwrap_or_default()
                    .to_string()
            }));
            writer.write_record(&row)?;
        }
        finish(writer)
    }

    pub fn to_markdown(result: &MultiMatchResult) -> String {
        let mut md = Vec::new();
        let status = if result.is_complete() { "complete" } else { "partial" };

        md.push(format!("## [{status}] Multi-target match"));
        md.push(String::new());
        md.push("### Overview".to_string());
        md.push(format!("- **Source**: `{}`", result.source_string()));
        md.push(format!("- **Overall score**: {:.3}", result.overall_score()));
        md.push(format!(
            "- **Matched**: {}/{}",
            result.matched_targets().len(),
            result.matches().len()
        ));
        md.push(String::new());

        md.push("### Targets".to_string());
        for (name, m) in result.matches() {
            let state = if m.is_matched() { "matched" } else { "unmatched" };
            md.push(format!(
                "- **{}**: {} | `{}` | score {:.3}",
                name,
                state,
                m.matched_string().unwrap_or("N/A"),
                m.similarity_score()
            ));
        }
        md.push(String::new());

        if !result.missing_targets().is_empty() {
            md.push("### Missing targets".to_string());
            for name in result.missing_targets() {
                md.push(format!("- {name}"));
            }
            md.push(String::new());
        }

        md.join("\n")
    }

    /// One Markdown table row per result
    pub fn to_markdown_table(results: &[MultiMatchResult]) -> String {
        let mut md = vec![
            "| Source | Score | Complete | Matched | Missing |".to_string(),
            "|---|---|---|---|---|".to_string(),
        ];
        for result in results {
            md.push(format!(
                "| {} | {:.3} | {} | {}/{} | {} |",
                escape_cell(result.source_string()),
                result.overall_score(),
                if result.is_complete() { "yes" } else { "no" },
                result.matched_targets().len(),
                result.matches().len(),
                escape_cell(&result.missing_targets().join(", "))
            ));
        }
        md.join("\n")
    }

    pub fn to_json(result: &MultiMatchResult) -> Result<String, ExportError> {
        Ok(result.to_json()?)
    }

    pub fn from_json(json: &str) -> Result<MultiMatchResult, ExportError> {
        Ok(MultiMatchResult::from_json(json)?)
    }
}

/// Exports [`SingleMatchResult`]s
pub struct SingleResultExporter;

impl SingleResultExporter {
    pub fn csv_headers() -> &'static [&'static str] {
        &SINGLE_HEADERS
    }

    pub fn to_csv_row(result: &SingleMatchResult) -> Vec<String> {
        let opt = |v: Option<usize>| v.map(|n| n.to_string()).unwrap_or_default();
        vec![
            result.target_name.clone(),
            result.matched_string().unwrap_or_default().to_string(),
            result.similarity_score().to_string(),
            result.match_type().to_string(),
            result.confidence().to_string(),
            result.confidence_level().to_string(),
            result.is_matched().to_string(),
            opt(result.match_position()),
            opt(result.match_length()),
            result.preprocessing_applied.join(";"),
        ]
    }

    pub fn to_markdown(result: &SingleMatchResult, include_analysis: bool) -> String {
        let mut md = Vec::new();
        let state = if result.is_matched() { "matched" } else { "unmatched" };

        md.push(format!("## [{state}] {}", result.target_name));
        md.push(String::new());
        md.push("### Overview".to_string());
        md.push(format!(
            "- **Matched string**: `{}`",
            result.matched_string().unwrap_or("N/A")
        ));
        md.push(format!("- **Similarity**: {:.3}", result.similarity_score()));
        md.push(format!(
            "- **Confidence**: {:.3} ({})",
            result.confidence(),
            result.confidence_level()
        ));
        md.push(format!("- **Match type**: {}", result.match_type()));
        md.push(String::new());

        if let Some((start, end)) = result.match_span() {
            md.push("### Position".to_string());
            md.push(format!("- **Span**: {start}..{end}"));
            md.push(String::new());
        }

        if !result.preprocessing_applied.is_empty() {
            md.push("### Preprocessing".to_string());
            for step in &result.preprocessing_applied {
                md.push(format!("- {step}"));
            }
            md.push(String::new());
        }

        if include_analysis {
            let score = SingleResultAnalyzer::quality_score(result);
            md.push("### Quality".to_string());
            md.push(format!("- **Score**: {score:.3}"));
            md.push(format!(
                "- **Level**: {}",
                SingleResultAnalyzer::quality_level(score)
            ));
            md.push(String::new());
        }

        md.join("\n")
    }
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{MatchResult, MatchType};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn sample() -> MultiMatchResult {
        let mut matches = BTreeMap::new();
        matches.insert("city".to_string(), MatchResult::scored("北京", 0.95, MatchType::Fuzzy));
        matches.insert("district".to_string(), MatchResult::scored("朝阳区", 0.88, MatchType::Fuzzy));
        matches.insert("street".to_string(), MatchResult::none());
        MultiMatchResult::new("北京朝阳区", matches, 0.61, vec!["street".into()])
    }

    #[test]
    fn test_csv_row() {
        let row = ResultExporter::to_csv_row(&sample());
        assert_eq!(row.len(), ResultExporter::csv_headers().len());
        assert_eq!(
            row,
            vec!["北京朝阳区", "0.61", "false", "2", "3", "street", "city:北京;district:朝阳区"]
        );
    }

    #[test]
    fn test_csv_batch() {
        let csv = ResultExporter::to_csv(&[sample()]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("source_string,overall_score,is_complete,matched_count,total_targets,missing_targets,matched_values")
        );
        assert_eq!(
            lines.next(),
            Some("北京朝阳区,0.61,false,2,3,street,city:北京;district:朝阳区")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_csv_table() {
        let csv = ResultExporter::to_csv_table(&[sample()], &["city", "street"]).unwrap();
        assert_eq!(
            csv,
            "source_string,overall_score,is_complete,city,street\n北京朝阳区,0.61,false,北京,\n"
        );
    }

    #[test]
    fn test_markdown() {
        let md = ResultExporter::to_markdown(&sample());
        assert!(md.starts_with("## [partial] Multi-target match"));
        assert!(md.contains("- **street**: unmatched | `N/A` | score 0.000"));
        assert!(md.contains("### Missing targets\n- street"));

        let table = ResultExporter::to_markdown_table(&[sample()]);
        assert_eq!(table.lines().count(), 3);
        assert!(table.ends_with("| 北京朝阳区 | 0.610 | no | 2/3 | street |"));
    }

    #[test]
    fn test_json_round_trip_is_read_only() {
        let original = sample();
        let json = ResultExporter::to_json(&original).unwrap();
        let back = ResultExporter::from_json(&json).unwrap();
        assert_eq!(back, original);
        assert!(ResultExporter::from_json("{not json").is_err());
    }

    #[test]
    fn test_single_exporter() {
        let single = SingleMatchResult::new("sheet", MatchResult::exact("H48E012"))
            .with_position(6, 7)
            .with_preprocessing("lowercase");
        let row = SingleResultExporter::to_csv_row(&single);
        assert_eq!(row.len(), SingleResultExporter::csv_headers().len());
        assert_eq!(
            row,
            vec!["sheet", "H48E012", "1", "exact", "1", "very_high", "true", "6", "7", "lowercase"]
        );

        let md = SingleResultExporter::to_markdown(&single, true);
        assert!(md.contains("- **Span**: 6..13"));
        assert!(md.contains("- **Level**: excellent"));
    }
}
