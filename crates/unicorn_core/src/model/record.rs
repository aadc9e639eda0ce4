//! Startup record domain model.
//!
//! # Responsibility
//! - Define the canonical row shared by every data source and layout mapper.
//! - Enforce field invariants before a record may enter a dataset.
//!
//! # Invariants
//! - `id` and `name` are non-blank.
//! - `valuation` is finite and `>= 0` (billions USD).
//! - `founded_year` lies within `MIN_FOUNDED_YEAR..=current UTC year`.
//! - `ai_impact_score`, when set, lies within `0..=100`.

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Identifier of a startup record, unique inside one dataset.
pub type RecordId = String;

/// Earliest founding year accepted as plausible.
pub const MIN_FOUNDED_YEAR: i32 = 1900;

/// Maximum AI impact score.
pub const MAX_IMPACT_SCORE: f64 = 100.0;

/// Valuation tier derived from a record's valuation.
///
/// Never persisted; always recomputed from `StartupRecord::valuation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartupStatus {
    /// Below one billion.
    Soonicorn,
    /// One to ten billion.
    Unicorn,
    /// Ten to one hundred billion.
    Decacorn,
    /// One hundred billion and above.
    Hectocorn,
}

impl StartupStatus {
    /// Classifies a valuation expressed in billions.
    pub fn from_valuation(valuation_billions: f64) -> Self {
        if valuation_billions >= 100.0 {
            Self::Hectocorn
        } else if valuation_billions >= 10.0 {
            Self::Decacorn
        } else if valuation_billions >= 1.0 {
            Self::Unicorn
        } else {
            Self::Soonicorn
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Soonicorn => "soonicorn",
            Self::Unicorn => "unicorn",
            Self::Decacorn => "decacorn",
            Self::Hectocorn => "hectocorn",
        }
    }
}

/// One startup company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartupRecord {
    /// Stable identifier, unique within a dataset.
    pub id: RecordId,
    /// Display name.
    pub name: String,
    /// Valuation in billions USD.
    pub valuation: f64,
    /// Serialized as `foundingYear` to match the external record schema.
    #[serde(rename = "foundingYear", alias = "foundedYear")]
    pub founded_year: i32,
    pub country: String,
    /// Industry category from an open vocabulary.
    #[serde(alias = "industry")]
    pub sector: String,
    /// Optional 0..=100 score used for color encoding.
    #[serde(default)]
    pub ai_impact_score: Option<f64>,
    /// Optional growth percentage used for size encoding.
    #[serde(default)]
    pub growth_rate: Option<f64>,
}

impl StartupRecord {
    /// Creates a record with required fields only.
    ///
    /// Country and sector start as `Unknown`; optional metrics start as `None`.
    /// This constructor does not validate; call `validate()` before use.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        valuation: f64,
        founded_year: i32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            valuation,
            founded_year,
            country: UNKNOWN.to_string(),
            sector: UNKNOWN.to_string(),
            ai_impact_score: None,
            growth_rate: None,
        }
    }

    /// Valuation tier derived from `valuation`.
    pub fn status(&self) -> StartupStatus {
        StartupStatus::from_valuation(self.valuation)
    }

    /// Checks every field invariant.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        if self.id.trim().is_empty() {
            return Err(RecordValidationError::BlankId);
        }
        if self.name.trim().is_empty() {
            return Err(RecordValidationError::BlankName {
                id: self.id.clone(),
            });
        }
        if !self.valuation.is_finite() || self.valuation < 0.0 {
            return Err(RecordValidationError::InvalidValuation {
                id: self.id.clone(),
                value: self.valuation,
            });
        }
        let max_year = current_year();
        if self.founded_year < MIN_FOUNDED_YEAR || self.founded_year > max_year {
            return Err(RecordValidationError::FoundedYearOutOfRange {
                id: self.id.clone(),
                year: self.founded_year,
                max: max_year,
            });
        }
        if let Some(score) = self.ai_impact_score {
            if !score.is_finite() || !(0.0..=MAX_IMPACT_SCORE).contains(&score) {
                return Err(RecordValidationError::InvalidImpactScore {
                    id: self.id.clone(),
                    value: score,
                });
            }
        }
        if let Some(growth) = self.growth_rate {
            if !growth.is_finite() {
                return Err(RecordValidationError::InvalidGrowthRate {
                    id: self.id.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Placeholder for missing country/sector values.
pub const UNKNOWN: &str = "Unknown";

/// Current UTC calendar year, the upper bound for `founded_year`.
pub fn current_year() -> i32 {
    Utc::now().year()
}

/// Field-level validation failures.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValidationError {
    BlankId,
    BlankName { id: RecordId },
    InvalidValuation { id: RecordId, value: f64 },
    FoundedYearOutOfRange { id: RecordId, year: i32, max: i32 },
    InvalidImpactScore { id: RecordId, value: f64 },
    InvalidGrowthRate { id: RecordId },
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankId => write!(f, "record id must not be blank"),
            Self::BlankName { id } => write!(f, "record `{id}` has a blank name"),
            Self::InvalidValuation { id, value } => {
                write!(f, "record `{id}` has invalid valuation {value}")
            }
            Self::FoundedYearOutOfRange { id, year, max } => write!(
                f,
                "record `{id}` founded year {year} outside {MIN_FOUNDED_YEAR}..={max}"
            ),
            Self::InvalidImpactScore { id, value } => {
                write!(f, "record `{id}` has impact score {value} outside 0..=100")
            }
            Self::InvalidGrowthRate { id } => {
                write!(f, "record `{id}` has a non-finite growth rate")
            }
        }
    }
}

impl Error for RecordValidationError {}
