//! Normalization of loosely-typed JSON objects into startup records.
//!
//! # Responsibility
//! - Map canonical and legacy display keys onto `StartupRecord` fields.
//! - Skip and count malformed records instead of failing the batch.
//!
//! # Invariants
//! - Unknown extra fields are ignored.
//! - Missing `id`, `name`, `valuation` or founded year skips the record.
//! - The first occurrence of an id wins; later duplicates are skipped.

use crate::model::dataset::{Dataset, Provenance};
use crate::model::record::{RecordValidationError, StartupRecord, UNKNOWN};
use crate::source::{SourceError, SourceResult};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

const ID_KEYS: &[&str] = &["id", "ID", "Id"];
const NAME_KEYS: &[&str] = &["name", "Company", "company"];
const VALUATION_KEYS: &[&str] = &["valuation", "Valuation ($B)", "valuation_billions"];
const FOUNDED_KEYS: &[&str] = &["foundingYear", "foundedYear", "founded_year", "Founded Year"];
const COUNTRY_KEYS: &[&str] = &["country", "Country"];
const SECTOR_KEYS: &[&str] = &["industry", "sector", "Sector", "Industry"];
const IMPACT_KEYS: &[&str] = &["aiImpactScore", "ai_impact_score", "AI Impact Score"];
const GROWTH_KEYS: &[&str] = &["growthRate", "growth_rate", "Growth Rate (%)"];

/// Matches `$41.5B`, `900M`, `1.2 t`; the suffix scales to billions.
static CURRENCY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*\$?\s*([0-9]+(?:\.[0-9]+)?)\s*([kmbt])?\s*$")
        .expect("valid currency regex")
});

/// Why one input record was dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordError {
    NotAnObject,
    MissingField(&'static str),
    InvalidField { field: &'static str, reason: String },
    Validation(RecordValidationError),
    DuplicateId(String),
}

impl Display for RecordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "record is not a JSON object"),
            Self::MissingField(field) => write!(f, "record is missing required field `{field}`"),
            Self::InvalidField { field, reason } => {
                write!(f, "record field `{field}` is invalid: {reason}")
            }
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateId(id) => write!(f, "duplicate record id `{id}`"),
        }
    }
}

impl Error for RecordError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RecordValidationError> for RecordError {
    fn from(value: RecordValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Converts one JSON object into a validated record.
pub fn record_from_value(value: &Value) -> Result<StartupRecord, RecordError> {
    let object = value.as_object().ok_or(RecordError::NotAnObject)?;

    let id = required(object, ID_KEYS, "id", parse_identifier)?;
    let name = required(object, NAME_KEYS, "name", parse_text)?;
    let valuation = required(object, VALUATION_KEYS, "valuation", parse_valuation)?;
    let founded_year = required(object, FOUNDED_KEYS, "foundingYear", parse_year)?;

    let record = StartupRecord {
        id,
        name,
        valuation,
        founded_year,
        country: optional(object, COUNTRY_KEYS, "country", parse_text)?
            .unwrap_or_else(|| UNKNOWN.to_string()),
        sector: optional(object, SECTOR_KEYS, "industry", parse_text)?
            .unwrap_or_else(|| UNKNOWN.to_string()),
        ai_impact_score: optional(object, IMPACT_KEYS, "aiImpactScore", parse_number)?,
        growth_rate: optional(object, GROWTH_KEYS, "growthRate", parse_number)?,
    };
    record.validate()?;
    Ok(record)
}

/// Builds a dataset from raw values, skipping malformed entries.
///
/// Stops collecting once `limit` valid records are gathered.
///
/// # Errors
/// - `SourceError::Empty` when no value produced a valid record.
pub fn records_from_values(
    values: &[Value],
    provenance: Provenance,
    limit: usize,
) -> SourceResult<Dataset> {
    let mut records = Vec::new();
    let mut seen = HashSet::new();
    let mut skipped = 0_usize;

    for (index, value) in values.iter().enumerate() {
        if records.len() >= limit {
            break;
        }
        let outcome = record_from_value(value).and_then(|record| {
            if seen.insert(record.id.clone()) {
                Ok(record)
            } else {
                Err(RecordError::DuplicateId(record.id))
            }
        });
        match outcome {
            Ok(record) => records.push(record),
            Err(err) => {
                skipped += 1;
                debug!(
                    "event=record_skipped module=normalize provenance={} index={} reason={}",
                    provenance, index, err
                );
            }
        }
    }

    if records.is_empty() {
        return Err(SourceError::Empty { skipped });
    }

    let dataset = Dataset::new(provenance, records)
        .map_err(|err| SourceError::Parse(err.to_string()))?;
    Ok(dataset.with_skipped(skipped))
}

/// Extracts the record array from a document body.
///
/// Accepts a bare array, or an object holding a `records` or `data` array.
/// Items carrying a `fields` object (open-data record envelopes) are
/// unwrapped to that object.
pub fn extract_record_array(body: Value) -> SourceResult<Vec<Value>> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut object) => {
            match object.remove("records").or_else(|| object.remove("data")) {
                Some(Value::Array(items)) => items,
                Some(_) => {
                    return Err(SourceError::Parse(
                        "`records`/`data` must be an array".to_string(),
                    ))
                }
                None => {
                    return Err(SourceError::Parse(
                        "expected an array or an object with `records`/`data`".to_string(),
                    ))
                }
            }
        }
        _ => {
            return Err(SourceError::Parse(
                "expected an array of record objects".to_string(),
            ))
        }
    };

    Ok(items
        .into_iter()
        .map(|item| match item {
            Value::Object(mut object) if object.get("fields").is_some_and(Value::is_object) => {
                object.remove("fields").unwrap_or(Value::Null)
            }
            other => other,
        })
        .collect())
}

/// Parses a valuation in billions from a number or currency string.
pub fn parse_valuation(value: &Value) -> Result<f64, String> {
    match value {
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| "number is not representable as f64".to_string()),
        Value::String(text) => {
            let compact = text.replace(',', "");
            let captures = CURRENCY_RE
                .captures(&compact)
                .ok_or_else(|| format!("unrecognized currency `{text}`"))?;
            let amount: f64 = captures[1]
                .parse()
                .map_err(|_| format!("unrecognized amount `{text}`"))?;
            let billions = match captures.get(2).map(|m| m.as_str().to_ascii_lowercase()) {
                Some(suffix) if suffix == "k" => amount / 1_000_000.0,
                Some(suffix) if suffix == "m" => amount / 1_000.0,
                Some(suffix) if suffix == "t" => amount * 1_000.0,
                _ => amount,
            };
            Ok(billions)
        }
        _ => Err("expected a number or currency string".to_string()),
    }
}

fn parse_identifier(value: &Value) -> Result<String, String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
        Value::Number(number) => Ok(number.to_string()),
        _ => Err("expected a non-blank string or number".to_string()),
    }
}

fn parse_text(value: &Value) -> Result<String, String> {
    match value {
        Value::String(text) => Ok(text.trim().to_string()),
        _ => Err("expected a string".to_string()),
    }
}

fn parse_number(value: &Value) -> Result<f64, String> {
    match value {
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| "number is not representable as f64".to_string()),
        Value::String(text) => text
            .trim()
            .trim_end_matches('%')
            .parse::<f64>()
            .map_err(|_| format!("expected a number, got `{text}`")),
        _ => Err("expected a number".to_string()),
    }
}

fn parse_year(value: &Value) -> Result<i32, String> {
    let raw = parse_number(value)?;
    if raw.fract() != 0.0 || raw < f64::from(i32::MIN) || raw > f64::from(i32::MAX) {
        return Err(format!("expected a whole year, got {raw}"));
    }
    Ok(raw as i32)
}

fn lookup<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| !value.is_null())
}

fn required<T>(
    object: &Map<String, Value>,
    keys: &[&str],
    field: &'static str,
    parse: fn(&Value) -> Result<T, String>,
) -> Result<T, RecordError> {
    let value = lookup(object, keys).ok_or(RecordError::MissingField(field))?;
    parse(value).map_err(|reason| RecordError::InvalidField { field, reason })
}

fn optional<T>(
    object: &Map<String, Value>,
    keys: &[&str],
    field: &'static str,
    parse: fn(&Value) -> Result<T, String>,
) -> Result<Option<T>, RecordError> {
    lookup(object, keys)
        .map(|value| parse(value).map_err(|reason| RecordError::InvalidField { field, reason }))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::{
        extract_record_array, parse_valuation, record_from_value, records_from_values,
        RecordError,
    };
    use crate::model::dataset::Provenance;
    use crate::source::SourceError;
    use serde_json::json;

    #[test]
    fn accepts_legacy_display_keys() {
        let record = record_from_value(&json!({
            "id": "openai",
            "Company": "OpenAI",
            "Valuation ($B)": 157.0,
            "AI Impact Score": 95,
            "Growth Rate (%)": 180,
            "Sector": "AI/ML",
            "Founded Year": 2015,
            "Country": "USA",
            "Status": "Unicorn"
        }))
        .expect("legacy record should normalize");

        assert_eq!(record.name, "OpenAI");
        assert_eq!(record.sector, "AI/ML");
        assert_eq!(record.ai_impact_score, Some(95.0));
        assert_eq!(record.growth_rate, Some(180.0));
    }

    #[test]
    fn missing_optional_fields_fall_back_to_defaults() {
        let record = record_from_value(&json!({
            "id": 17,
            "name": "Acme",
            "valuation": "$2.5B",
            "foundingYear": "2019",
            "aiImpactScore": null
        }))
        .expect("minimal record should normalize");

        assert_eq!(record.id, "17");
        assert_eq!(record.country, "Unknown");
        assert_eq!(record.sector, "Unknown");
        assert_eq!(record.valuation, 2.5);
        assert_eq!(record.ai_impact_score, None);
    }

    #[test]
    fn missing_id_is_reported() {
        let err = record_from_value(&json!({
            "name": "Nameless",
            "valuation": 1.0,
            "foundingYear": 2020
        }))
        .expect_err("record without id must be rejected");
        assert_eq!(err, RecordError::MissingField("id"));
    }

    #[test]
    fn currency_suffixes_scale_to_billions() {
        assert_eq!(parse_valuation(&json!("900M")), Ok(0.9));
        assert_eq!(parse_valuation(&json!("$1,200m")), Ok(1.2));
        assert_eq!(parse_valuation(&json!("1.5T")), Ok(1500.0));
        assert!(parse_valuation(&json!("lots")).is_err());
    }

    #[test]
    fn duplicates_and_malformed_entries_are_skipped() {
        let values = vec![
            json!({"id": "a", "name": "A", "valuation": 1.0, "foundingYear": 2015}),
            json!({"id": "a", "name": "A again", "valuation": 2.0, "foundingYear": 2016}),
            json!("not an object"),
            json!({"id": "b", "name": "B", "valuation": -3.0, "foundingYear": 2016}),
        ];

        let dataset = records_from_values(&values, Provenance::StaticFile, 100)
            .expect("one valid record should survive");
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.skipped(), 3);
    }

    #[test]
    fn all_malformed_yields_empty_error() {
        let values = vec![json!({"name": "no id"})];
        let err = records_from_values(&values, Provenance::RemoteApi, 10)
            .expect_err("no valid records must fail");
        assert!(matches!(err, SourceError::Empty { skipped: 1 }));
    }

    #[test]
    fn extracts_wrapped_record_arrays() {
        let items = extract_record_array(json!({
            "records": [{"fields": {"id": "x"}}, {"id": "y"}]
        }))
        .expect("records array should extract");
        assert_eq!(items[0], json!({"id": "x"}));
        assert_eq!(items[1], json!({"id": "y"}));

        assert!(extract_record_array(json!({"unexpected": true})).is_err());
        assert!(extract_record_array(json!(42)).is_err());
    }
}
