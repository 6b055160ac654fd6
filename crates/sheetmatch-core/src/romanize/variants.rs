//! Known transliteration variants
//!
//! A [`VariantGroup`] ties a name in its native script to its standard
//! romanization and the other spellings seen in the wild ("Peking" for
//! 北京, "Pusan" for 부산). Lookups compare forms by
//! [`comparison_key`], so case, diacritics, spaces and apostrophes do not
//! matter.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use super::rules::comparison_key;
use crate::result::unit;

/// One canonical name with its romanization and alternative spellings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantGroup {
    pub original: String,
    pub romanized: String,
    pub language: String,
    pub confidence: f64,
    #[serde(default)]
    pub variants: Vec<String>,
}

impl VariantGroup {
    pub fn new(
        original: impl Into<String>,
        romanized: impl Into<String>,
        language: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            original: original.into(),
            romanized: romanized.into(),
            language: language.into(),
            confidence: unit(confidence),
            variants: Vec::new(),
        }
    }

    pub fn with_variants<I, S>(mut self, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variants = variants.into_iter().map(Into::into).collect();
        self
    }

    /// Whether `text` is any form of this group
    pub fn contains(&self, text: &str) -> bool {
        self.keyed().role(&comparison_key(text)).is_some()
    }

    fn keyed(&self) -> KeyedGroup {
        KeyedGroup {
            original: comparison_key(&self.original),
            romanized: comparison_key(&self.romanized),
            variants: self.variants.iter().map(|v| comparison_key(v)).collect(),
            confidence: self.confidence,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Original,
    Romanized,
    Variant,
}

/// A group with every form reduced to its comparison key
#[derive(Debug, Clone)]
struct KeyedGroup {
    original: String,
    romanized: String,
    variants: Vec<String>,
    confidence: f64,
}

impl KeyedGroup {
    fn role(&self, key: &str) -> Option<Role> {
        if key.is_empty() {
            None
        } else if key == self.original {
            Some(Role::Original)
        } else if key == self.romanized {
            Some(Role::Romanized)
        } else if self.variants.iter().any(|v| v == key) {
            Some(Role::Variant)
        } else {
            None
        }
    }

    /// Score for two forms of this group, 0.0 unless both belong to it
    fn score(&self, a: &str, b: &str) -> f64 {
        let (Some(ra), Some(rb)) = (self.role(a), self.role(b)) else {
            return 0.0;
        };
        let factor = match (ra, rb) {
            (Role::Original, Role::Original) | (Role::Romanized, Role::Romanized) => 1.0,
            (Role::Original, Role::Romanized) | (Role::Romanized, Role::Original) => 1.0,
            (Role::Variant, Role::Original) | (Role::Original, Role::Variant) => 0.95,
            (Role::Variant, Role::Romanized) | (Role::Romanized, Role::Variant) => 0.9,
            (Role::Variant, Role::Variant) if a == b => 1.0,
            (Role::Variant, Role::Variant) => 0.85,
        };
        self.confidence * factor
    }
}

/// Built-in groups: (original, romanized, language, variants)
const BUILTIN_GROUPS: &[(&str, &str, &str, &[&str])] = &[
    // Chinese cities
    ("北京", "Beijing", "chinese", &["Peking"]),
    ("上海", "Shanghai", "chinese", &["Shang Hai"]),
    ("广州", "Guangzhou", "chinese", &["Canton", "Kwangchow"]),
    ("深圳", "Shenzhen", "chinese", &["Sham Chun"]),
    ("杭州", "Hangzhou", "chinese", &["Hang-chou"]),
    ("南京", "Nanjing", "chinese", &["Nanking"]),
    ("成都", "Chengdu", "chinese", &["Cheng-tu"]),
    ("西安", "Xi'an", "chinese", &["Sian"]),
    ("重庆", "Chongqing", "chinese", &["Chungking"]),
    ("天津", "Tianjin", "chinese", &["Tientsin"]),
    ("苏州", "Suzhou", "chinese", &["Soochow"]),
    ("青岛", "Qingdao", "chinese", &["Tsingtao"]),
    ("大连", "Dalian", "chinese", &["Dairen", "Talien"]),
    ("沈阳", "Shenyang", "chinese", &["Mukden"]),
    // Chinese names
    ("张伟", "Zhang Wei", "chinese", &["Chang Wei"]),
    ("王芳", "Wang Fang", "chinese", &["Wong Fong"]),
    ("李娜", "Li Na", "chinese", &["Lee Na"]),
    ("陈敏", "Chen Min", "chinese", &["Chan Man"]),
    ("杨静", "Yang Jing", "chinese", &["Yeung Ching"]),
    // Japanese
    ("東京", "Tokyo", "japanese", &["Toukyou"]),
    ("大阪", "Osaka", "japanese", &["Oosaka"]),
    ("京都", "Kyoto", "japanese", &["Kyouto"]),
    ("福岡", "Fukuoka", "japanese", &["Hukuoka"]),
    ("広島", "Hiroshima", "japanese", &["Hirosima"]),
    ("田中太郎", "Tanaka Taro", "japanese", &["Tanaka Tarou"]),
    ("佐藤花子", "Sato Hanako", "japanese", &["Satou Hanako"]),
    // Korean
    ("서울", "Seoul", "korean", &["Soul"]),
    ("부산", "Busan", "korean", &["Pusan"]),
    ("대구", "Daegu", "korean", &["Taegu"]),
    ("인천", "Incheon", "korean", &["Inchon"]),
    ("광주", "Gwangju", "korean", &["Kwangju"]),
    ("대전", "Daejeon", "korean", &["Taejon"]),
    ("박준호", "Park Junho", "korean", &["Pak Chun-ho"]),
    // Arabic names
    ("محمد", "Muhammad", "arabic", &["Mohammed", "Mohamed", "Mohammad", "Muhammed"]),
    ("أحمد", "Ahmad", "arabic", &["Ahmed", "Achmad"]),
    ("علي", "Ali", "arabic", &["Aly"]),
    ("عبدالله", "Abdullah", "arabic", &["Abd Allah", "Abdallah"]),
    ("خالد", "Khalid", "arabic", &["Khaled", "Halid"]),
    ("عمر", "Omar", "arabic", &["Umar", "Omer"]),
    ("حسن", "Hassan", "arabic", &["Hasan"]),
    ("حسين", "Hussein", "arabic", &["Hussain", "Hosein", "Hossein"]),
    ("يوسف", "Yusuf", "arabic", &["Youssef", "Yousef"]),
    ("فاطمة", "Fatima", "arabic", &["Fatma", "Fatimah"]),
    ("عائشة", "Aisha", "arabic", &["Aysha", "Ayesha"]),
    ("ليلى", "Layla", "arabic", &["Laila", "Leila"]),
    // Arabic places
    ("الرياض", "Riyadh", "arabic", &["Ar-Riyadh", "Riyad"]),
    ("القاهرة", "Cairo", "arabic", &["Al-Qahirah", "El Qahira"]),
    ("دبي", "Dubai", "arabic", &["Dubayy"]),
    ("بغداد", "Baghdad", "arabic", &["Bagdad"]),
    ("دمشق", "Damascus", "arabic", &["Dimashq"]),
    ("بيروت", "Beirut", "arabic", &["Beyrouth"]),
    ("الخرطوم", "Khartoum", "arabic", &["Khartum"]),
    // Russian
    ("Москва", "Moscow", "russian", &["Moskva", "Moskwa"]),
    ("Санкт-Петербург", "Saint Petersburg", "russian", &["Sankt-Peterburg", "St. Petersburg"]),
    ("Екатеринбург", "Yekaterinburg", "russian", &["Ekaterinburg"]),
    ("Александр", "Alexander", "russian", &["Aleksandr"]),
    ("Дмитрий", "Dmitry", "russian", &["Dmitri", "Dimitri"]),
    // Greek
    ("Αθήνα", "Athens", "greek", &["Athina"]),
    ("Θεσσαλονίκη", "Thessaloniki", "greek", &["Saloniki"]),
    ("Ηράκλειο", "Heraklion", "greek", &["Iraklion"]),
    ("Γιάννης", "Yannis", "greek", &["Giannis", "Ioannis"]),
];

lazy_static! {
    static ref BUILTIN: VariantTable = {
        let mut table = VariantTable::empty();
        for (original, romanized, language, variants) in BUILTIN_GROUPS {
            table.add(
                VariantGroup::new(*original, *romanized, *language, 1.0)
                    .with_variants(variants.iter().copied()),
            );
        }
        table
    };
}

/// Lookup table of [`VariantGroup`]s
#[derive(Debug, Clone, Default)]
pub struct VariantTable {
    groups: Vec<VariantGroup>,
    keyed: Vec<KeyedGroup>,
}

impl VariantTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Chinese, Japanese, Korean, Arabic, Russian and Greek place and
    /// person names
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    pub fn add(&mut self, group: VariantGroup) {
        self.keyed.push(group.keyed());
        self.groups.push(group);
    }

    pub fn groups(&self) -> &[VariantGroup] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Best score over all groups containing both `a` and `b`, 0.0 if none.
    /// Symmetric in its arguments.
    pub fn score(&self, a: &str, b: &str) -> f64 {
        let (ka, kb) = (comparison_key(a), comparison_key(b));
        self.keyed
            .iter()
            .map(|group| group.score(&ka, &kb))
            .fold(0.0, f64::max)
    }

    /// Groups `text` belongs to, highest confidence first
    pub fn suggestions(&self, text: &str) -> Vec<VariantGroup> {
        let key = comparison_key(text);
        let mut found: Vec<VariantGroup> = self
            .keyed
            .iter()
            .zip(&self.groups)
            .filter(|(keyed, _)| keyed.role(&key).is_some())
            .map(|(_, group)| group.clone())
            .collect();
        found.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        found
    }
}

/// Dominant script of `text` by letter count, "latin" if there is none
pub fn detect_script(text: &str) -> &'static str {
    let mut counts = [0usize; 7];
    const NAMES: [&str; 7] = ["latin", "chinese", "japanese", "korean", "arabic", "russian", "greek"];

    for c in text.chars().filter(|c| c.is_alphabetic()) {
        let slot = match c as u32 {
            0x3040..=0x30FF => 2,
            0xAC00..=0xD7AF | 0x1100..=0x11FF | 0x3130..=0x318F => 3,
            0x4E00..=0x9FFF | 0x3400..=0x4DBF => 1,
            0x0600..=0x06FF | 0x0750..=0x077F => 4,
            0x0400..=0x04FF => 5,
            0x0370..=0x03FF => 6,
            _ => 0,
        };
        counts[slot] += 1;
    }

    // Kana anywhere marks the text as Japanese even if kanji dominate
    if counts[2] > 0 {
        return NAMES[2];
    }
    let best = counts
        .iter()
        .enumerate()
        .skip(1)
        .max_by_key(|(_, n)| **n)
        .filter(|(_, n)| **n > 0)
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    NAMES[best]
}

/// Whether `text` contains letters outside the Latin script
pub fn is_native_script(text: &str) -> bool {
    text.chars().any(|c| c.is_alphabetic() && !is_latin(c))
}

fn is_latin(c: char) -> bool {
    matches!(c as u32, 0x0041..=0x024F | 0x1E00..=0x1EFF)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scores_by_role() {
        let table = VariantTable::builtin();
        assert_eq!(table.score("北京", "Beijing"), 1.0);
        assert_eq!(table.score("Peking", "北京"), 0.95);
        assert_eq!(table.score("Peking", "Beijing"), 0.9);
        assert_eq!(table.score("Canton", "Kwangchow"), 0.85);
        assert_eq!(table.score("Beijing", "Shanghai"), 0.0);
    }

    #[test]
    fn test_score_is_symmetric() {
        let table = VariantTable::builtin();
        for (a, b) in [("Mohammed", "محمد"), ("Pusan", "Busan"), ("Xi'an", "Sian")] {
            assert_eq!(table.score(a, b), table.score(b, a));
            assert!(table.score(a, b) > 0.0);
        }
    }

    #[test]
    fn test_keys_ignore_case_and_separators() {
        let table = VariantTable::builtin();
        assert_eq!(table.score("xian", "西安"), 1.0);
        assert_eq!(table.score("ST PETERSBURG", "Санкт-Петербург"), 0.95);
        assert_eq!(table.score("Tōkyō", "東京"), 1.0);
    }

    #[test]
    fn test_custom_group_confidence() {
        let mut table = VariantTable::empty();
        table.add(VariantGroup::new("河内", "Hanoi", "vietnamese", 0.8).with_variants(["Ha Noi"]));
        assert_eq!(table.score("Hanoi", "河内"), 0.8);
        assert!((table.score("Ha Noi", "Hanoi") - 0.72).abs() < 1e-9);
        assert_eq!(VariantGroup::new("a", "b", "x", 3.0).confidence, 1.0);
    }

    #[test]
    fn test_suggestions() {
        let mut table = VariantTable::builtin();
        table.add(VariantGroup::new("北平", "Peking", "chinese", 0.6));
        let found = table.suggestions("peking");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].original, "北京");
        assert_eq!(found[1].original, "北平");
        assert!(table.suggestions("Atlantis").is_empty());
        assert!(table.suggestions("").is_empty());
    }

    #[test]
    fn test_detect_script() {
        assert_eq!(detect_script("北京"), "chinese");
        assert_eq!(detect_script("とうきょう"), "japanese");
        assert_eq!(detect_script("東京タワー"), "japanese");
        assert_eq!(detect_script("서울"), "korean");
        assert_eq!(detect_script("محمد"), "arabic");
        assert_eq!(detect_script("Москва"), "russian");
        assert_eq!(detect_script("Αθήνα"), "greek");
        assert_eq!(detect_script("Beijing"), "latin");
        assert_eq!(detect_script("123"), "latin");
        assert!(is_native_script("北京"));
        assert!(!is_native_script("Tōkyō"));
    }
}
