//! Attribute normalization shared by all layout styles.
//!
//! # Invariants
//! - Every normalized value lies in `[0, 1]`.
//! - Missing, non-finite or degenerate (zero-width range) inputs map to
//!   `DEFAULT_NORMALIZED`.

use crate::model::record::StartupRecord;
use std::collections::BTreeMap;

/// Fallback for missing attributes: the midpoint of the normalized range.
pub const DEFAULT_NORMALIZED: f64 = 0.5;

const MIN_RANGE: f64 = 1e-9;

/// Min/max fitted over the finite values of one attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalizer {
    min: f64,
    max: f64,
}

impl Normalizer {
    pub fn fit(values: impl IntoIterator<Item = Option<f64>>) -> Self {
        values
            .into_iter()
            .flatten()
            .filter(|value| value.is_finite())
            .fold(
                Self {
                    min: f64::INFINITY,
                    max: f64::NEG_INFINITY,
                },
                |acc, value| Self {
                    min: acc.min.min(value),
                    max: acc.max.max(value),
                },
            )
    }

    pub fn normalize(&self, value: Option<f64>) -> f64 {
        let Some(value) = value.filter(|value| value.is_finite()) else {
            return DEFAULT_NORMALIZED;
        };
        let range = self.max - self.min;
        if !(range > MIN_RANGE) {
            return DEFAULT_NORMALIZED;
        }
        ((value - self.min) / range).clamp(0.0, 1.0)
    }
}

/// Normalized attributes of every record, in dataset order.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeFrame {
    pub valuation: Vec<f64>,
    pub impact: Vec<f64>,
    pub growth: Vec<f64>,
    pub founded_year: Vec<f64>,
}

impl AttributeFrame {
    pub fn fit(records: &[StartupRecord]) -> Self {
        let valuation = column(records, |record| Some(record.valuation));
        let impact = column(records, |record| record.ai_impact_score);
        let growth = column(records, |record| record.growth_rate);
        let founded_year = column(records, |record| Some(f64::from(record.founded_year)));
        Self {
            valuation,
            impact,
            growth,
            founded_year,
        }
    }
}

fn column(records: &[StartupRecord], pick: impl Fn(&StartupRecord) -> Option<f64>) -> Vec<f64> {
    let normalizer = Normalizer::fit(records.iter().map(&pick));
    records
        .iter()
        .map(|record| normalizer.normalize(pick(record)))
        .collect()
}

/// Position of `index` along `[0, 1]`; `0.5` when there is at most one row.
pub fn spread(index: usize, count: usize) -> f64 {
    if count <= 1 {
        return DEFAULT_NORMALIZED;
    }
    index as f64 / (count - 1) as f64
}

/// Maps each distinct sector to a stable lane index (alphabetical order).
pub fn sector_lanes(records: &[StartupRecord]) -> BTreeMap<&str, usize> {
    let mut lanes: BTreeMap<&str, usize> = records
        .iter()
        .map(|record| (record.sector.as_str(), 0))
        .collect();
    for (lane, slot) in lanes.values_mut().enumerate() {
        *slot = lane;
    }
    lanes
}

/// FNV-1a hash; stable across platforms and releases.
pub fn stable_hash(text: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    text.bytes()
        .fold(OFFSET, |hash, byte| (hash ^ u64::from(byte)).wrapping_mul(PRIME))
}

/// Angle in `[0, 2π)` derived from an identifier.
pub fn hashed_angle(text: &str) -> f64 {
    (stable_hash(text) as f64 / u64::MAX as f64) * std::f64::consts::TAU % std::f64::consts::TAU
}
