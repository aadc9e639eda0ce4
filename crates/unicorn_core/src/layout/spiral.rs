//! Golden-angle spiral (phyllotaxis) with valuation as height.

use super::scale::AttributeFrame;
use super::{CoordinatePoint, SpiralParams};
use crate::model::record::StartupRecord;
use std::f64::consts::PI;

const MIN_SIZE: f64 = 8.0;
const MAX_SIZE: f64 = 40.0;
const VALUATION_SIZE: f64 = 1.2;

/// `π·(3 − √5)`, about 137.5 degrees.
pub fn golden_angle() -> f64 {
    PI * (3.0 - 5.0_f64.sqrt())
}

pub(crate) fn place(
    records: &[StartupRecord],
    frame: &AttributeFrame,
    params: &SpiralParams,
) -> Vec<CoordinatePoint> {
    let step = golden_angle();

    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let theta = index as f64 * step;
            let radius = params.spacing * (index as f64).sqrt();
            let z = params.height * frame.valuation[index];
            let size = (MIN_SIZE + VALUATION_SIZE * record.valuation).clamp(MIN_SIZE, MAX_SIZE);
            CoordinatePoint::at(
                record,
                (radius * theta.cos(), radius * theta.sin(), z),
                frame.growth[index],
                size,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::golden_angle;
    use crate::layout::{map_records, LayoutParams, StyleTag};
    use crate::model::record::StartupRecord;

    #[test]
    fn single_record_sits_on_axis_at_half_height() {
        let record = StartupRecord::new("only", "Only", 3.0, 2019);
        let params = LayoutParams::default();
        let set = map_records(&[record], StyleTag::Spiral, &params);

        let point = &set.points[0];
        assert_eq!((point.x, point.y), (0.0, 0.0));
        assert_eq!(point.z, params.spiral.height / 2.0);
        assert!((point.size - 11.6).abs() < 1e-9);
    }

    #[test]
    fn radius_grows_with_square_root_of_index() {
        let records: Vec<_> = (0..5)
            .map(|index| StartupRecord::new(format!("s{index}"), "S", 50.0, 2015))
            .collect();
        let params = LayoutParams::default();
        let set = map_records(&records, StyleTag::Spiral, &params);

        for (index, point) in set.points.iter().enumerate() {
            let expected = params.spiral.spacing * (index as f64).sqrt();
            assert!((point.x.hypot(point.y) - expected).abs() < 1e-9);
            assert_eq!(point.size, 40.0);
        }
        assert!((golden_angle().to_degrees() - 137.507_764).abs() < 1e-5);
    }
}
