//! Spiral tunnel: records wind around the z axis, receding by founding year.

use super::scale::AttributeFrame;
use super::{CoordinatePoint, TunnelParams};
use crate::model::record::StartupRecord;
use std::f64::consts::TAU;

const MARKER_SIZE: f64 = 7.0;

pub(crate) fn place(
    records: &[StartupRecord],
    frame: &AttributeFrame,
    params: &TunnelParams,
) -> Vec<CoordinatePoint> {
    let count = records.len() as f64;

    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let theta = params.turns * TAU * index as f64 / count;
            let radius = params.radius * (1.0 + 0.5 * frame.growth[index]);
            let year = frame.founded_year[index];
            let position = (radius * theta.cos(), radius * theta.sin(), year * params.depth);
            CoordinatePoint::at(record, position, year, MARKER_SIZE)
        })
        .collect()
}
