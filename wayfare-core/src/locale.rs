use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// Locales the site is served in. Carried as the first path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ja,
    Fr,
    De,
}

impl Locale {
    pub const SUPPORTED: [Locale; 4] = [Locale::En, Locale::Ja, Locale::Fr, Locale::De];

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ja => "ja",
            Locale::Fr => "fr",
            Locale::De => "de",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::SUPPORTED
            .into_iter()
            .find(|locale| locale.as_str() == s)
            .ok_or_else(|| CoreError::ValidationError(format!("unsupported locale {:?}", s)))
    }
}

/// Countries with a destination landing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Country {
    Jp,
    Fr,
    De,
    Gb,
    Us,
    Th,
    Sg,
    Au,
}

impl Country {
    pub const ALL: [Country; 8] = [
        Country::Jp,
        Country::Fr,
        Country::De,
        Country::Gb,
        Country::Us,
        Country::Th,
        Country::Sg,
        Country::Au,
    ];

    /// ISO 3166-1 alpha-2 code
    pub fn code(&self) -> &'static str {
        match self {
            Country::Jp => "JP",
            Country::Fr => "FR",
            Country::De => "DE",
            Country::Gb => "GB",
            Country::Us => "US",
            Country::Th => "TH",
            Country::Sg => "SG",
            Country::Au => "AU",
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Country {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Country::ALL
            .into_iter()
            .find(|country| country.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::ValidationError(format!("unsupported country {:?}", s)))
    }
}

/// Outcome of checking the locale segment of a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocaleRoute {
    /// `rest` is the remainder of the path, always starting with `/`.
    Valid { locale: Locale, rest: String },
    Redirect(String),
}

/// Validate the leading locale segment of `path`.
///
/// A segment shaped like a language tag (`xx` or `xx-YY`) but not in the
/// allow-list is swapped for `default`. Any other path is treated as having
/// no locale at all and gets `default` prefixed.
pub fn resolve_path(path: &str, default: Locale) -> LocaleRoute {
    let trimmed = path.trim_start_matches('/');
    let (first, rest) = match trimmed.split_once('/') {
        Some((first, rest)) => (first, format!("/{}", rest)),
        None => (trimmed, "/".to_string()),
    };

    if let Ok(locale) = first.parse::<Locale>() {
        return LocaleRoute::Valid { locale, rest };
    }

    let target = if looks_like_locale(first) {
        join(default, &rest)
    } else if trimmed.is_empty() {
        format!("/{}", default)
    } else {
        format!("/{}/{}", default, trimmed)
    };
    LocaleRoute::Redirect(target)
}

/// Swap the leading locale segment of an already-localized path.
pub fn localized(locale: Locale, rest: &str) -> String {
    join(locale, rest)
}

fn join(locale: Locale, rest: &str) -> String {
    if rest == "/" || rest.is_empty() {
        format!("/{}", locale)
    } else {
        format!("/{}/{}", locale, rest.trim_start_matches('/'))
    }
}

fn looks_like_locale(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    match bytes.len() {
        2 => bytes.iter().all(|b| b.is_ascii_lowercase()),
        5 => {
            bytes[..2].iter().all(|b| b.is_ascii_lowercase())
                && bytes[2] == b'-'
                && bytes[3..].iter().all(|b| b.is_ascii_alphabetic())
        }
        _ => false,
    }
}
