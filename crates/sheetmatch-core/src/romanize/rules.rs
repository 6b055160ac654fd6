//! Sound-alike normalization rules
//!
//! A [`PhoneticTable`] maps spelling variants of the same sound onto one
//! canonical form so that "Qingdao" and "Chingdao", or "Mo7ammed" and
//! "Mohammed", compare equal after normalization.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::error::{ConfigError, ConfigResult};

/// Replace `pattern` with `replacement` during normalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundRule {
    pub pattern: String,
    pub replacement: String,
}

impl SoundRule {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }
}

/// (pattern, replacement) pairs of the built-in table
const BUILTIN_RULES: &[(&str, &str)] = &[
    // Pinyin, Wade-Giles and Yale initials
    ("zh", "j"),
    ("ch", "j"),
    ("q", "j"),
    ("sh", "s"),
    ("x", "s"),
    // Common digraphs
    ("ph", "f"),
    ("kh", "h"),
    ("gh", "g"),
    ("dh", "d"),
    ("th", "t"),
    ("ck", "k"),
    // Apostrophes and separators
    ("'", ""),
    ("\u{2019}", ""),
    ("\u{2018}", ""),
    ("`", ""),
    ("\u{02bc}", ""),
    ("\u{02bf}", ""),
    ("\u{02be}", ""),
    ("-", ""),
    ("_", ""),
    (".", ""),
    (" ", ""),
];

lazy_static! {
    static ref BUILTIN: PhoneticTable = {
        let mut table = PhoneticTable::empty();
        for (pattern, replacement) in BUILTIN_RULES {
            table.insert(SoundRule::new(*pattern, *replacement));
        }
        table
    };
}

/// Arabic chat alphabet digit, if `c` is one
fn chat_digit(c: char) -> Option<&'static str> {
    match c {
        // hamza, ain, qaf: glottal sounds usually dropped in Latin spelling
        '2' | '3' | '9' => Some(""),
        '7' | '5' => Some("h"),
        '6' | '4' => Some("t"),
        '8' => Some("g"),
        _ => None,
    }
}

/// Ordered rule table, longest pattern first
#[derive(Debug, Clone, PartialEq)]
pub struct PhoneticTable {
    rules: Vec<SoundRule>,
    patterns: Vec<Vec<char>>,
}

impl Default for PhoneticTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PhoneticTable {
    /// Table without any rules. Normalization still folds case, strips
    /// diacritics, rewrites chat digits and collapses doubled letters.
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            patterns: Vec::new(),
        }
    }

    /// Built-in pinyin, digraph and separator rules
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    pub fn rules(&self) -> &[SoundRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Add a rule, replacing any rule with the same pattern.
    ///
    /// Patterns are matched case-insensitively and must not be empty.
    pub fn add_rule(&mut self, pattern: &str, replacement: &str) -> ConfigResult<()> {
        if pattern.is_empty() {
            return Err(ConfigError::InvalidRule(format!(
                "empty pattern (replacement '{}')",
                replacement
            )));
        }
        self.insert(SoundRule::new(pattern.to_lowercase(), replacement.to_lowercase()));
        Ok(())
    }

    fn insert(&mut self, rule: SoundRule) {
        self.rules.retain(|r| r.pattern != rule.pattern);
        self.rules.push(rule);
        // Stable: among equal lengths, earlier rules keep priority
        self.rules
            .sort_by(|a, b| b.pattern.chars().count().cmp(&a.pattern.chars().count()));
        self.patterns = self.rules.iter().map(|r| r.pattern.chars().collect()).collect();
    }

    /// Canonical sound-alike form of `text`.
    ///
    /// Steps: lowercase, strip diacritics, rewrite chat digits, apply rules
    /// in one left-to-right pass (longest pattern wins at each position,
    /// output is not rescanned), then collapse doubled letters.
    pub fn normalize(&self, text: &str) -> String {
        let chars = rewrite_chat_digits(&strip_diacritics(&text.to_lowercase()));

        let mut out = String::with_capacity(text.len());
        let mut i = 0;
        'scan: while i < chars.len() {
            for (pattern, rule) in self.patterns.iter().zip(&self.rules) {
                if chars[i..].starts_with(pattern) {
                    out.push_str(&rule.replacement);
                    i += pattern.len();
                    continue 'scan;
                }
            }
            out.push(chars[i]);
            i += 1;
        }

        collapse_doubled_letters(&out)
    }
}

/// Remove combining marks: "Tōkyō" becomes "Tokyo"
pub fn strip_diacritics(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).nfc().collect()
}

/// Lowercased, diacritic-free, alphanumeric-only form used as a lookup key
pub(crate) fn comparison_key(text: &str) -> String {
    strip_diacritics(&text.to_lowercase())
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// Rewrite digits standing in for Arabic letters.
///
/// Only a digit with no digit neighbour and at least one letter neighbour is
/// rewritten, so "mo7ammed" changes but "48-12" and "2024" do not.
fn rewrite_chat_digits(text: &str) -> Vec<char> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = Vec::with_capacity(chars.len());

    for (i, &c) in chars.iter().enumerate() {
        let prev = i.checked_sub(1).map(|p| chars[p]);
        let next = chars.get(i + 1).copied();

        let replacement = chat_digit(c).filter(|_| {
            let isolated = !prev.is_some_and(|p| p.is_ascii_digit())
                && !next.is_some_and(|n| n.is_ascii_digit());
            let touches_letter =
                prev.is_some_and(char::is_alphabetic) || next.is_some_and(char::is_alphabetic);
            isolated && touches_letter
        });

        match replacement {
            Some(r) => out.extend(r.chars()),
            None => out.push(c),
        }
    }
    out
}

fn collapse_doubled_letters(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last: Option<char> = None;
    for c in text.chars() {
        if last == Some(c) && c.is_alphabetic() {
            continue;
        }
        out.push(c);
        last = Some(c);
    }
    out
}
