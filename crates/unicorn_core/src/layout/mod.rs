//! Layout mappers turning a dataset into renderable 3D coordinates.
//!
//! # Responsibility
//! - Define the style catalog and the tunable layout parameters.
//! - Dispatch a record slice to the mapper of the selected style.
//!
//! # Invariants
//! - Mapping is total and pure: one point per record, in record order.
//! - Every emitted coordinate, color and size is finite for parameters that
//!   pass `LayoutParams::validate`.
//! - The same records, style and params always yield the same set.

use crate::model::dataset::Dataset;
use crate::model::record::StartupRecord;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub mod ripple;
pub mod scale;
pub mod spiral;
pub mod tunnel;
pub mod undulating;
pub mod wave;

use scale::AttributeFrame;

/// Visualization styles offered by the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleTag {
    #[default]
    Wave,
    Tunnel,
    Ripple,
    Spiral,
    Undulating,
}

impl StyleTag {
    pub const ALL: [StyleTag; 5] = [
        StyleTag::Wave,
        StyleTag::Tunnel,
        StyleTag::Ripple,
        StyleTag::Spiral,
        StyleTag::Undulating,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wave => "wave",
            Self::Tunnel => "tunnel",
            Self::Ripple => "ripple",
            Self::Spiral => "spiral",
            Self::Undulating => "undulating",
        }
    }
}

impl Display for StyleTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StyleTag {
    type Err = LayoutError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|style| style.as_str() == wanted)
            .ok_or_else(|| LayoutError::UnknownStyle(value.to_string()))
    }
}

/// Wave surface: records march along x, sectors fan out along y.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveParams {
    pub extent: f64,
    pub lane_spacing: f64,
    pub amplitude: f64,
    pub frequency: f64,
    pub phase: f64,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            extent: 10.0,
            lane_spacing: 1.0,
            amplitude: 2.0,
            frequency: 1.0,
            phase: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TunnelParams {
    pub turns: f64,
    pub radius: f64,
    pub depth: f64,
}

impl Default for TunnelParams {
    fn default() -> Self {
        Self {
            turns: 6.0,
            radius: 40.0,
            depth: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RippleParams {
    pub radius: f64,
    pub amplitude: f64,
    pub frequency: f64,
    pub decay: f64,
}

impl Default for RippleParams {
    fn default() -> Self {
        Self {
            radius: 10.0,
            amplitude: 5.0,
            frequency: 1.0,
            decay: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpiralParams {
    pub spacing: f64,
    pub height: f64,
}

impl Default for SpiralParams {
    fn default() -> Self {
        Self {
            spacing: 1.0,
            height: 10.0,
        }
    }
}

/// Undulating surface; `jitter` is expressed in normalized units.
///
/// Jitter above `MAX_JITTER` is treated as `MAX_JITTER` when mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UndulatingParams {
    pub extent: f64,
    pub amplitude: f64,
    pub frequency: f64,
    /// `0` disables the noise term entirely.
    pub jitter: f64,
    /// Seed for the noise term; ignored while `jitter` is `0`.
    pub seed: u64,
}

impl Default for UndulatingParams {
    fn default() -> Self {
        Self {
            extent: 10.0,
            amplitude: 1.0,
            frequency: 10.0,
            jitter: 0.0,
            seed: 42,
        }
    }
}

/// Largest jitter offset, one full normalized axis.
pub const MAX_JITTER: f64 = 1.0;

/// Tunable constants for every style.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutParams {
    pub wave: WaveParams,
    pub tunnel: TunnelParams,
    pub ripple: RippleParams,
    pub spiral: SpiralParams,
    pub undulating: UndulatingParams,
}

impl LayoutParams {
    /// Rejects non-finite values, negative scale parameters and jitter
    /// beyond `MAX_JITTER`.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let scales = [
            ("wave.extent", self.wave.extent),
            ("wave.lane_spacing", self.wave.lane_spacing),
            ("wave.amplitude", self.wave.amplitude),
            ("tunnel.radius", self.tunnel.radius),
            ("tunnel.depth", self.tunnel.depth),
            ("ripple.radius", self.ripple.radius),
            ("ripple.amplitude", self.ripple.amplitude),
            ("ripple.decay", self.ripple.decay),
            ("spiral.spacing", self.spiral.spacing),
            ("spiral.height", self.spiral.height),
            ("undulating.extent", self.undulating.extent),
            ("undulating.amplitude", self.undulating.amplitude),
            ("undulating.jitter", self.undulating.jitter),
        ];
        let unbounded = [
            ("wave.frequency", self.wave.frequency),
            ("wave.phase", self.wave.phase),
            ("tunnel.turns", self.tunnel.turns),
            ("ripple.frequency", self.ripple.frequency),
            ("undulating.frequency", self.undulating.frequency),
        ];

        for (name, value) in scales.into_iter().chain(unbounded) {
            if !value.is_finite() {
                return Err(LayoutError::NonFinite { param: name, value });
            }
        }
        for (name, value) in scales {
            if value < 0.0 {
                return Err(LayoutError::Negative { param: name, value });
            }
        }
        if self.undulating.jitter > MAX_JITTER {
            return Err(LayoutError::AboveMax {
                param: "undulating.jitter",
                value: self.undulating.jitter,
                max: MAX_JITTER,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutError {
    NonFinite { param: &'static str, value: f64 },
    Negative { param: &'static str, value: f64 },
    AboveMax { param: &'static str, value: f64, max: f64 },
    UnknownStyle(String),
}

impl Display for LayoutError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFinite { param, value } => {
                write!(f, "layout.{param} must be finite, got {value}")
            }
            Self::Negative { param, value } => {
                write!(f, "layout.{param} must not be negative, got {value}")
            }
            Self::AboveMax { param, value, max } => {
                write!(f, "layout.{param} must be at most {max}, got {value}")
            }
            Self::UnknownStyle(value) => write!(f, "unknown visualization style `{value}`"),
        }
    }
}

impl Error for LayoutError {}

/// One rendered marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinatePoint {
    pub id: String,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Normalized intensity in `[0, 1]`.
    pub color: f64,
    pub size: f64,
}

impl CoordinatePoint {
    fn at(record: &StartupRecord, (x, y, z): (f64, f64, f64), color: f64, size: f64) -> Self {
        Self {
            id: record.id.clone(),
            label: record.name.clone(),
            x,
            y,
            z,
            color,
            size,
        }
    }

    pub fn is_finite(&self) -> bool {
        [self.x, self.y, self.z, self.color, self.size]
            .iter()
            .all(|value| value.is_finite())
    }
}

/// Output of a mapper, ready for a rendering surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinateSet {
    pub style: StyleTag,
    /// Noise seed, present only when the style drew random numbers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub points: Vec<CoordinatePoint>,
}

impl CoordinateSet {
    pub fn empty(style: StyleTag) -> Self {
        Self {
            style,
            seed: None,
            points: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn point(&self, id: &str) -> Option<&CoordinatePoint> {
        self.points.iter().find(|point| point.id == id)
    }
}

/// Maps `records` with `style`. An empty slice yields an empty set.
pub fn map_records(
    records: &[StartupRecord],
    style: StyleTag,
    params: &LayoutParams,
) -> CoordinateSet {
    if records.is_empty() {
        return CoordinateSet::empty(style);
    }

    let frame = AttributeFrame::fit(records);
    let (points, seed) = match style {
        StyleTag::Wave => (wave::place(records, &frame, &params.wave), None),
        StyleTag::Tunnel => (tunnel::place(records, &frame, &params.tunnel), None),
        StyleTag::Ripple => (ripple::place(records, &frame, &params.ripple), None),
        StyleTag::Spiral => (spiral::place(records, &frame, &params.spiral), None),
        StyleTag::Undulating => undulating::place(records, &frame, &params.undulating),
    };

    debug_assert_eq!(points.len(), records.len());
    CoordinateSet {
        style,
        seed,
        points,
    }
}

/// Maps a resolved dataset with `style`.
pub fn map(dataset: &Dataset, style: StyleTag, params: &LayoutParams) -> CoordinateSet {
    map_records(dataset.records(), style, params)
}
