//! Lenient readers shared by the hotel and flight criteria decoders.
//! Every reader falls back to a default instead of failing.

use chrono::NaiveDate;
use std::str::FromStr;
use tracing::warn;
use wayfare_core::QueryParams;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn read_text(params: &QueryParams, key: &str) -> String {
    params.get(key).map(str::trim).unwrap_or_default().to_string()
}

pub fn read_optional_text(params: &QueryParams, key: &str) -> Option<String> {
    params
        .get(key)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

pub fn read_date(params: &QueryParams, key: &str) -> Option<NaiveDate> {
    let raw = params.get(key)?.trim();
    if raw.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            warn!("Ignoring malformed date {}={:?}", key, raw);
            None
        }
    }
}

/// Read a positive count, clamping anything below 1 up to 1.
pub fn read_count(params: &QueryParams, key: &str, default: u32) -> u32 {
    match params.get(key).map(|raw| raw.trim().parse::<i64>()) {
        None => default,
        Some(Ok(count)) => count.clamp(1, u32::MAX as i64) as u32,
        Some(Err(_)) => {
            warn!("Ignoring malformed count {}, using {}", key, default);
            default
        }
    }
}

pub fn read_parsed<T: FromStr>(params: &QueryParams, key: &str) -> Option<T> {
    let raw = params.get(key)?.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring malformed value {}={:?}", key, raw);
            None
        }
    }
}

pub fn read_or_default<T: FromStr + Default>(params: &QueryParams, key: &str) -> T {
    read_parsed(params, key).unwrap_or_default()
}

/// Split a comma-joined value, parsing each element and dropping the ones
/// that do not parse.
pub fn read_list<T: FromStr>(params: &QueryParams, key: &str) -> Vec<T> {
    let Some(raw) = params.get(key) else {
        return Vec::new();
    };
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .filter_map(|item| match item.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Dropping unknown {} entry {:?}", key, item);
                None
            }
        })
        .collect()
}

pub fn write_date(params: &mut QueryParams, key: &str, date: Option<NaiveDate>) {
    if let Some(date) = date {
        params.set(key, date.format(DATE_FORMAT).to_string());
    }
}

pub fn write_list<T: ToString>(params: &mut QueryParams, key: &str, items: &[T]) {
    if !items.is_empty() {
        let joined = items.iter().map(ToString::to_string).collect::<Vec<_>>().join(",");
        params.set(key, joined);
    }
}

/// Wire names of a fieldless enum carried in the query string.
macro_rules! wire_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $wire:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = wayfare_core::CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(wayfare_core::CoreError::ValidationError(
                        format!("unknown {} {:?}", $kind, other),
                    )),
                }
            }
        }
    };
}

pub(crate) use wire_enum;
