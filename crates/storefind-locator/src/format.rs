//! Rendering of query results as human-readable lines or structured records.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use storefind_core::{CoreError, StoreRecord};
use storefind_index::QueryResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(CoreError::InvalidOutputMode(other.to_string())),
        }
    }
}

/// One structured hit: every store field at the top level plus `distance`.
#[derive(Debug, Serialize)]
pub struct StoreDistance<'a> {
    #[serde(flatten)]
    pub store: &'a StoreRecord,
    pub distance: f64,
}

/// Borrows each hit as a [`StoreDistance`], nearest first.
#[must_use]
pub fn format_structured(result: &QueryResult) -> Vec<StoreDistance<'_>> {
    result
        .hits
        .iter()
        .map(|hit| StoreDistance {
            store: &hit.store,
            distance: hit.distance,
        })
        .collect()
}

/// Shortest round-trip digits, with `.0` kept on whole numbers.
///
/// Magnitudes below `1e-4` or from `1e16` up switch to exponent notation with
/// a signed two-digit exponent (`5e-05`, `1e+16`).
fn format_distance(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let scientific = format!("{value:e}");
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if value != 0.0 && !(-4..16).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs());
    }

    let plain = value.to_string();
    if plain.contains('.') {
        plain
    } else {
        format!("{plain}.0")
    }
}

/// One line per hit, newline-separated, no trailing newline.
///
/// `{name}: {address}, {city}, {state} {zip_code} | {distance} {unit} away`
#[must_use]
pub fn format_text(result: &QueryResult) -> String {
    let unit = result.unit.label();
    result
        .hits
        .iter()
        .map(|hit| {
            let s = &hit.store;
            format!(
                "{}: {}, {}, {} {} | {} {unit} away",
                s.name,
                s.address,
                s.city,
                s.state,
                s.zip_code,
                format_distance(hit.distance)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A rendered result, ready to print or return over the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum FormattedStores {
    Text(String),
    Structured(serde_json::Value),
}

impl FormattedStores {
    #[must_use]
    pub fn render(result: &QueryResult, mode: OutputMode) -> Self {
        match mode {
            OutputMode::Text => Self::Text(format_text(result)),
            OutputMode::Json => Self::Structured(serde_json::json!(format_structured(result))),
        }
    }
}

impl fmt::Display for FormattedStores {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Structured(value) => {
                let pretty = serde_json::to_string_pretty(value).map_err(|_| fmt::Error)?;
                f.write_str(&pretty)
            }
        }
    }
}
