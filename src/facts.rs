//! Upstream fact records
//!
//! The extraction engine hands us loosely-typed fact records. Each field is
//! decoded on its own: a value or date that cannot be parsed, or a field of
//! the wrong JSON type, becomes `None` for that field and the rest of the
//! fact is kept. A malformed record never fails the batch it arrived in.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use fac_types::{PeriodKind, RawFact};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

/// A fact exactly as emitted by the extraction engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFactRecord {
    /// Local name of the concept
    #[serde(default, alias = "tag", deserialize_with = "lenient_text")]
    pub concept: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub namespace: Option<String>,
    /// Number, numeric text, or null
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub unit: Option<String>,
    /// Reported precision; carried on the wire but not used
    #[serde(default)]
    pub decimals: Option<Value>,
    #[serde(default, alias = "context_id", deserialize_with = "lenient_text")]
    pub context_ref: Option<String>,
    /// `instant`, `duration` or `unknown`
    #[serde(default, deserialize_with = "lenient_text")]
    pub period_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub end_date: Option<String>,
}

/// Text field that tolerates the wrong JSON type: anything but a string is `None`
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Ok(Some(text)),
        None | Some(Value::Null) => Ok(None),
        Some(other) => {
            debug!(value = %other, "Non-text fact field, dropping it");
            Ok(None)
        }
    }
}

/// Decode a batch element by element.
///
/// An element that is not a fact object at all is kept as a blank record, so
/// it still counts toward the batch total but can never be classified.
pub fn decode_records(values: Vec<Value>) -> Vec<RawFactRecord> {
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value(value).unwrap_or_else(|e| {
                debug!(index, error = %e, "Undecodable fact record, keeping it blank");
                RawFactRecord::default()
            })
        })
        .collect()
}

/// `deserialize_with` adapter for a batch of records
pub(crate) fn lenient_records<'de, D>(deserializer: D) -> Result<Vec<RawFactRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<Value>::deserialize(deserializer).map(decode_records)
}

/// `deserialize_with` adapter for an optional batch of records
#[cfg(feature = "server")]
pub(crate) fn lenient_optional_records<'de, D>(
    deserializer: D,
) -> Result<Option<Vec<RawFactRecord>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?.map(decode_records))
}

impl From<RawFactRecord> for RawFact {
    fn from(record: RawFactRecord) -> Self {
        let tag = record.concept.unwrap_or_default();

        let value = record.value.as_ref().and_then(|v| {
            let parsed = parse_fact_value(v);
            if parsed.is_none() && !v.is_null() {
                debug!(tag = %tag, value = %v, "Unparsable fact value, dropping it");
            }
            parsed
        });

        let period_start = record
            .start_date
            .as_deref()
            .and_then(|s| decode_date(&tag, "start_date", s));
        let period_end = record
            .end_date
            .as_deref()
            .and_then(|s| decode_date(&tag, "end_date", s));

        RawFact {
            tag,
            namespace: record.namespace.filter(|ns| !ns.is_empty()),
            value,
            unit: record.unit.filter(|u| !u.is_empty()),
            period_kind: record
                .period_type
                .as_deref()
                .map(parse_period_kind)
                .unwrap_or_default(),
            period_start,
            period_end,
            context_id: record.context_ref,
        }
    }
}

fn decode_date(tag: &str, field: &'static str, text: &str) -> Option<NaiveDate> {
    let parsed = parse_iso_date(text);
    if parsed.is_none() && !text.trim().is_empty() {
        debug!(tag, field, text, "Unparsable period date, dropping it");
    }
    parsed
}

/// Numeric value of a fact: JSON numbers as-is, numeric text with thousands
/// separators removed. Anything else, including non-finite numbers, is `None`.
pub fn parse_fact_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
            if cleaned.is_empty() {
                None
            } else {
                cleaned.parse::<f64>().ok()
            }
        }
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

/// Period kind from its wire name; unrecognised names are `Unknown`
pub fn parse_period_kind(text: &str) -> PeriodKind {
    match text.trim().to_ascii_lowercase().as_str() {
        "instant" => PeriodKind::Instant,
        "duration" => PeriodKind::Duration,
        _ => PeriodKind::Unknown,
    }
}

/// Calendar date from `YYYY-MM-DD`, or the date part of a timestamp
pub fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S"))
        .map(|dt| dt.date())
        .ok()
}
