//! Undulating surface over the valuation/growth plane.
//!
//! Height is `sin(frequency * distance)` from the origin of the plane. An
//! optional seeded jitter breaks up records sharing identical attributes;
//! its seed is reported back so the layout can be reproduced.

use super::scale::AttributeFrame;
use super::{CoordinatePoint, UndulatingParams, MAX_JITTER};
use crate::model::record::StartupRecord;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const MARKER_SIZE: f64 = 5.0;

pub(crate) fn place(
    records: &[StartupRecord],
    frame: &AttributeFrame,
    params: &UndulatingParams,
) -> (Vec<CoordinatePoint>, Option<u64>) {
    // NaN fails the comparison and leaves jitter off.
    let jitter_on = params.jitter > 0.0;
    let jitter = params.jitter.min(MAX_JITTER);
    let mut noise = jitter_on.then(|| ChaCha8Rng::seed_from_u64(params.seed));

    let points = records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let mut u = frame.valuation[index];
            let mut w = frame.growth[index];
            if let Some(rng) = noise.as_mut() {
                u = (u + rng.gen_range(-jitter..=jitter)).clamp(0.0, 1.0);
                w = (w + rng.gen_range(-jitter..=jitter)).clamp(0.0, 1.0);
            }
            let z = params.amplitude * (params.frequency * u.hypot(w)).sin();
            CoordinatePoint::at(
                record,
                (u * params.extent, w * params.extent, z),
                frame.impact[index],
                MARKER_SIZE,
            )
        })
        .collect();

    let seed = noise.is_some().then_some(params.seed);
    (points, seed)
}
