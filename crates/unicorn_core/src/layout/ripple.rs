//! Ripple field: high-impact records gather at the center and height follows
//! a damped cosine of the distance.

use super::scale::{hashed_angle, AttributeFrame};
use super::{CoordinatePoint, RippleParams};
use crate::model::record::StartupRecord;

const VALUATION_SIZE: f64 = 0.7;
const MIN_SIZE: f64 = 6.0;
const MAX_SIZE: f64 = 30.0;

pub(crate) fn place(
    records: &[StartupRecord],
    frame: &AttributeFrame,
    params: &RippleParams,
) -> Vec<CoordinatePoint> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let impact = frame.impact[index];
            // Angle depends on the id only, so points keep their bearing
            // across refreshes.
            let theta = hashed_angle(&record.id);
            let radius = params.radius * (1.0 - impact);
            let z = params.amplitude
                * (-params.decay * radius).exp()
                * (params.frequency * radius).cos();
            let size = (record.valuation * VALUATION_SIZE).clamp(MIN_SIZE, MAX_SIZE);
            CoordinatePoint::at(
                record,
                (radius * theta.cos(), radius * theta.sin(), z),
                impact,
                size,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::layout::{map_records, LayoutParams, StyleTag};
    use crate::model::record::StartupRecord;

    #[test]
    fn highest_impact_lands_at_center_with_peak_height() {
        let mut top = StartupRecord::new("top", "Top", 120.0, 2015);
        top.ai_impact_score = Some(95.0);
        let mut low = StartupRecord::new("low", "Low", 1.0, 2015);
        low.ai_impact_score = Some(5.0);
        let params = LayoutParams::default();
        let set = map_records(&[top, low], StyleTag::Ripple, &params);

        let center = &set.points[0];
        assert!(center.x.abs() < 1e-9 && center.y.abs() < 1e-9);
        assert_eq!(center.z, params.ripple.amplitude);
        assert_eq!(center.size, 30.0);

        let edge = &set.points[1];
        assert!((edge.x.hypot(edge.y) - params.ripple.radius).abs() < 1e-9);
        assert_eq!(edge.size, 6.0);
    }

    #[test]
    fn bearing_depends_only_on_id() {
        let a = StartupRecord::new("stable-id", "A", 2.0, 2016);
        let b = StartupRecord::new("other", "B", 4.0, 2017);
        let params = LayoutParams::default();
        let alone = map_records(&[a.clone(), b.clone()], StyleTag::Ripple, &params);
        let swapped = map_records(&[b, a], StyleTag::Ripple, &params);
        let first = alone.point("stable-id").expect("point");
        let second = swapped.point("stable-id").expect("point");
        assert!((first.y.atan2(first.x) - second.y.atan2(second.x)).abs() < 1e-9);
    }
}
