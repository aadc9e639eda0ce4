//! Synthetic startup generator, the terminal fallback of the chain.
//!
//! # Responsibility
//! - Produce plausible startup records from a fixed vocabulary.
//! - Make every run reproducible from its recorded seed.
//!
//! # Invariants
//! - The same `(count, seed)` pair always yields identical records.
//! - Every generated record passes `StartupRecord::validate()`.
//! - When enabled and `count > 0`, loading cannot fail.

use crate::model::dataset::{Dataset, Provenance};
use crate::model::record::{current_year, StartupRecord};
use crate::source::{DataSource, SourceError, SourceResult};
use log::info;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::Builder;

pub const SYNTHETIC_SOURCE_ID: &str = "synthetic";

pub const SECTORS: &[&str] = &[
    "Fintech",
    "Healthtech",
    "AI/ML",
    "E-commerce",
    "SaaS",
    "Edtech",
    "Gaming",
    "Aerospace",
    "Cybersecurity",
    "Biotech",
    "Cleantech",
    "Mobility",
    "Foodtech",
    "Proptech",
    "Adtech",
    "Logistics",
];

pub const COUNTRIES: &[&str] = &[
    "USA",
    "China",
    "India",
    "UK",
    "Germany",
    "Israel",
    "Canada",
    "Sweden",
    "Singapore",
    "Australia",
    "France",
    "Netherlands",
    "South Korea",
];

const FIRST_FOUNDED_YEAR: i32 = 2010;
const LAST_FOUNDED_YEAR: i32 = 2024;

/// Per-sector ranges: (valuation billions, impact score, growth percent).
struct SectorProfile {
    valuation: (f64, f64),
    impact: (f64, f64),
    growth: (f64, f64),
}

fn profile_for(sector: &str) -> SectorProfile {
    match sector {
        "AI/ML" => SectorProfile {
            valuation: (1.0, 300.0),
            impact: (70.0, 95.0),
            growth: (200.0, 2000.0),
        },
        "Fintech" => SectorProfile {
            valuation: (1.0, 150.0),
            impact: (40.0, 80.0),
            growth: (100.0, 800.0),
        },
        "Healthtech" | "Biotech" => SectorProfile {
            valuation: (0.5, 100.0),
            impact: (60.0, 90.0),
            growth: (80.0, 500.0),
        },
        "E-commerce" => SectorProfile {
            valuation: (1.0, 200.0),
            impact: (30.0, 70.0),
            growth: (150.0, 1000.0),
        },
        _ => SectorProfile {
            valuation: (0.5, 80.0),
            impact: (20.0, 70.0),
            growth: (50.0, 400.0),
        },
    }
}

/// Generates `count` records from `seed`.
pub fn generate_records(count: usize, seed: u64) -> Vec<StartupRecord> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let last_year = LAST_FOUNDED_YEAR.min(current_year());

    (0..count)
        .map(|index| {
            let sector = SECTORS.choose(&mut rng).copied().unwrap_or("SaaS");
            let country = COUNTRIES.choose(&mut rng).copied().unwrap_or("USA");
            let profile = profile_for(sector);

            // Cubing a uniform draw skews valuations toward the low end.
            let skew: f64 = rng.gen::<f64>().powi(3);
            let (low, high) = profile.valuation;
            let correlation = rng.gen_range(0.8..1.2);
            let valuation = (low + (high - low) * skew) * correlation;

            let impact = (rng.gen_range(profile.impact.0..profile.impact.1)
                + rng.gen_range(-10.0..10.0))
            .clamp(1.0, 95.0);
            let growth = rng.gen_range(profile.growth.0..profile.growth.1) * correlation;

            let mut id_bytes = [0_u8; 16];
            rng.fill(&mut id_bytes);
            let id = Builder::from_random_bytes(id_bytes).into_uuid();

            StartupRecord {
                id: id.to_string(),
                name: format!("{sector} Startup {}", index + 1),
                valuation,
                founded_year: rng.gen_range(FIRST_FOUNDED_YEAR..=last_year),
                country: country.to_string(),
                sector: sector.to_string(),
                ai_impact_score: Some(impact),
                growth_rate: Some(growth),
            }
        })
        .collect()
}

/// Generates records on demand; never touches I/O.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    enabled: bool,
    count: usize,
    seed: Option<u64>,
}

impl SyntheticSource {
    pub fn new(count: usize, seed: Option<u64>) -> Self {
        Self {
            enabled: true,
            count,
            seed,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            count: 0,
            seed: None,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

impl DataSource for SyntheticSource {
    fn source_id(&self) -> &str {
        SYNTHETIC_SOURCE_ID
    }

    fn provenance(&self) -> Provenance {
        Provenance::Synthetic
    }

    fn load(&self, limit: usize) -> SourceResult<Dataset> {
        if !self.enabled {
            return Err(SourceError::Disabled);
        }

        let seed = self.seed.unwrap_or_else(rand::random);
        let count = self.count.min(limit);
        let records = generate_records(count, seed);
        if records.is_empty() {
            return Err(SourceError::Empty { skipped: 0 });
        }

        info!(
            "event=synthetic_generated module=synthetic count={} seed={}",
            records.len(),
            seed
        );

        let dataset = Dataset::new(Provenance::Synthetic, records)
            .map_err(|err| SourceError::Parse(err.to_string()))?;
        Ok(dataset.with_seed(seed))
    }
}
