//! Wave surface: records spread along x, one lane per sector along y, and a
//! valuation-modulated sine for height.

use super::scale::{sector_lanes, spread, AttributeFrame};
use super::{CoordinatePoint, WaveParams};
use crate::model::record::StartupRecord;
use std::f64::consts::PI;

const BASE_SIZE: f64 = 8.0;
const GROWTH_SIZE: f64 = 12.0;

pub(crate) fn place(
    records: &[StartupRecord],
    frame: &AttributeFrame,
    params: &WaveParams,
) -> Vec<CoordinatePoint> {
    let lanes = sector_lanes(records);
    let count = records.len();

    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let x = spread(index, count) * params.extent;
            let lane = lanes.get(record.sector.as_str()).copied().unwrap_or_default();
            let y = lane as f64 * params.lane_spacing;

            let v = frame.valuation[index];
            let z = params.amplitude
                * (0.25 + 0.75 * v)
                * (params.frequency * x + params.phase + v * PI).sin();

            let size = BASE_SIZE + GROWTH_SIZE * frame.growth[index];
            CoordinatePoint::at(record, (x, y, z), frame.impact[index], size)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::layout::{map_records, LayoutParams, StyleTag};
    use crate::model::record::StartupRecord;

    #[test]
    fn sectors_share_lanes_and_x_spans_extent() {
        let mut records = Vec::new();
        for (index, sector) in ["SaaS", "Fintech", "SaaS"].iter().enumerate() {
            let mut record =
                StartupRecord::new(format!("w{index}"), "Wave Co", 2.0 + index as f64, 2018);
            record.sector = sector.to_string();
            records.push(record);
        }
        let params = LayoutParams::default();
        let set = map_records(&records, StyleTag::Wave, &params);

        assert_eq!(set.points[0].y, set.points[2].y);
        assert_eq!(set.points[1].y, 0.0);
        assert_eq!(set.points[0].y, params.wave.lane_spacing);
        assert_eq!(set.points[0].x, 0.0);
        assert_eq!(set.points[2].x, params.wave.extent);
        for point in &set.points {
            assert!(point.z.abs() <= params.wave.amplitude);
            assert!((8.0..=20.0).contains(&point.size));
        }
    }

    #[test]
    fn singleton_sits_mid_extent() {
        let record = StartupRecord::new("solo", "Solo", 5.0, 2020);
        let params = LayoutParams::default();
        let set = map_records(&[record], StyleTag::Wave, &params);
        assert_eq!(set.points[0].x, params.wave.extent / 2.0);
        assert_eq!(set.points[0].color, 0.5);
    }
}
