//! Value checks applied to a target's matched string

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Formats tried by [`ValueValidator::Date`] when none are given
pub const DEFAULT_DATE_FORMATS: &[&str] = &[
    "%Y%m%d",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%Y.%m.%d",
    "%Y-%m-%d %H:%M:%S",
];

fn default_date_formats() -> Vec<String> {
    DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect()
}

/// Rejects matched values that do not look like the target's type.
///
/// A failing validator turns the target into a non-match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueValidator {
    /// Parses with any of the chrono `formats`
    Date {
        #[serde(default = "default_date_formats")]
        formats: Vec<String>,
    },
    /// Number, optionally integral, within optional bounds. Thousands
    /// separators and spaces are ignored.
    Number {
        #[serde(default = "default_true")]
        allow_float: bool,
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
    /// Character count within bounds
    Length {
        #[serde(default)]
        min: usize,
        #[serde(default)]
        max: Option<usize>,
    },
}

fn default_true() -> bool {
    true
}

impl ValueValidator {
    /// Date validator with [`DEFAULT_DATE_FORMATS`]
    pub fn date() -> Self {
        Self::Date {
            formats: default_date_formats(),
        }
    }

    /// Unbounded number validator accepting decimals
    pub fn number() -> Self {
        Self::Number {
            allow_float: true,
            min: None,
            max: None,
        }
    }

    pub fn length(min: usize, max: Option<usize>) -> Self {
        Self::Length { min, max }
    }

    pub fn validate(&self, value: &str) -> bool {
        match self {
            Self::Date { formats } => formats.iter().any(|fmt| {
                NaiveDate::parse_from_str(value, fmt).is_ok()
                    || NaiveDateTime::parse_from_str(value, fmt).is_ok()
            }),
            Self::Number {
                allow_float,
                min,
                max,
            } => {
                let cleaned: String = value.chars().filter(|c| *c != ',' && *c != ' ').collect();
                let parsed = if *allow_float {
                    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
                } else {
                    cleaned.parse::<i64>().ok().map(|n| n as f64)
                };
                match parsed {
                    Some(n) => min.map_or(true, |lo| n >= lo) && max.map_or(true, |hi| n <= hi),
                    None => false,
                }
            }
            Self::Length { min, max } => {
                let len = value.chars().count();
                len >= *min && max.map_or(true, |hi| len <= hi)
            }
        }
    }

    /// Human-readable reason a value was rejected
    pub fn error_message(&self) -> String {
        match self {
            Self::Date { formats } => {
                format!("invalid date format, supported formats: {}", formats.join(", "))
            }
            Self::Number {
                allow_float,
                min,
                max,
            } => {
                let mut msg = String::from("invalid number format");
                if !allow_float {
                    msg.push_str(" (integers only)");
                }
                if min.is_some() || max.is_some() {
                    let bound = |b: &Option<f64>| b.map_or_else(|| "-".to_string(), |v| v.to_string());
                    msg.push_str(&format!(" (range: {}..{})", bound(min), bound(max)));
                }
                msg
            }
            Self::Length { min, max: Some(max) } => {
                format!("length must be between {} and {}", min, max)
            }
            Self::Length { min, max: None } => format!("length must be at least {}", min),
        }
    }
}
