//! Casing transforms used to derive field labels from field names.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// A named string-formatting transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CasingType {
    Sentence,
    #[default]
    Title,
    Camel,
    Lower,
    Upper,
    Pascal,
    Snake,
    ScreamingSnake,
    Flat,
    Kebab,
}

/// Every supported casing, in declaration order.
pub const CASING_TYPES: [CasingType; 10] = [
    CasingType::Sentence,
    CasingType::Title,
    CasingType::Camel,
    CasingType::Lower,
    CasingType::Upper,
    CasingType::Pascal,
    CasingType::Snake,
    CasingType::ScreamingSnake,
    CasingType::Flat,
    CasingType::Kebab,
];

/// Casing applied when neither the field nor its step picks one.
pub const DEFAULT_CASING: CasingType = CasingType::Title;

impl CasingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CasingType::Sentence => "sentence",
            CasingType::Title => "title",
            CasingType::Camel => "camel",
            CasingType::Lower => "lower",
            CasingType::Upper => "upper",
            CasingType::Pascal => "pascal",
            CasingType::Snake => "snake",
            CasingType::ScreamingSnake => "screaming-snake",
            CasingType::Flat => "flat",
            CasingType::Kebab => "kebab",
        }
    }
}

impl fmt::Display for CasingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown casing name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCasing(pub String);

impl fmt::Display for UnknownCasing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is not a valid casing type", self.0)
    }
}

impl std::error::Error for UnknownCasing {}

impl FromStr for CasingType {
    type Err = UnknownCasing;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CASING_TYPES
            .iter()
            .copied()
            .find(|casing| casing.as_str() == s)
            .ok_or_else(|| UnknownCasing(s.to_string()))
    }
}

fn camel_boundary_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([a-z])([A-Z])").unwrap())
}

fn separator_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[-_]+").unwrap())
}

/// Splits an identifier into lowercase words.
///
/// camelCase boundaries, `-` and `_` runs, and whitespace all separate words.
///
/// # Examples
///
/// ```
/// use step_form_util::casing::split_words;
///
/// assert_eq!(split_words("firstName"), vec!["first", "name"]);
/// assert_eq!(split_words("zip_code-extra"), vec!["zip", "code", "extra"]);
/// ```
pub fn split_words(input: &str) -> Vec<String> {
    let spaced = camel_boundary_regex().replace_all(input, "$1 $2");
    let spaced = separator_regex().replace_all(&spaced, " ");
    spaced.split_whitespace().map(str::to_lowercase).collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Changes the casing of `input` according to `casing`.
///
/// # Examples
///
/// ```
/// use step_form_util::casing::{change_casing, CasingType};
///
/// assert_eq!(change_casing("firstName", CasingType::Title), "First Name");
/// assert_eq!(change_casing("first_name", CasingType::Camel), "firstName");
/// assert_eq!(change_casing("firstName", CasingType::ScreamingSnake), "FIRST_NAME");
/// ```
pub fn change_casing(input: &str, casing: CasingType) -> String {
    let words = split_words(input);
    let Some((head, tail)) = words.split_first() else {
        return String::new();
    };

    match casing {
        CasingType::Sentence => {
            let mut out = capitalize(head);
            for word in tail {
                out.push(' ');
                out.push_str(word);
            }
            out
        }
        CasingType::Title => words.iter().map(|w| capitalize(w)).collect::<Vec<_>>().join(" "),
        CasingType::Camel => {
            let mut out = head.clone();
            out.extend(tail.iter().map(|w| capitalize(w)));
            out
        }
        CasingType::Pascal => words.iter().map(|w| capitalize(w)).collect(),
        CasingType::Lower => words.join(" "),
        CasingType::Upper => words.join(" ").to_uppercase(),
        CasingType::Snake => words.join("_"),
        CasingType::ScreamingSnake => words.join("_").to_uppercase(),
        CasingType::Kebab => words.join("-"),
        CasingType::Flat => words.concat(),
    }
}
