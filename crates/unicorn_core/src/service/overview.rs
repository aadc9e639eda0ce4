//! Summary statistics for the dataset overview panel.

use crate::model::dataset::{Dataset, Provenance};
use crate::model::record::StartupStatus;
use serde::Serialize;
use std::collections::BTreeMap;

/// Number of countries listed in `DatasetOverview::top_countries`.
pub const TOP_COUNTRY_COUNT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetOverview {
    pub record_count: usize,
    pub provenance: Provenance,
    pub skipped: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub by_sector: BTreeMap<String, usize>,
    pub by_status: BTreeMap<StartupStatus, usize>,
    /// Most frequent countries, highest count first; ties break by name.
    pub top_countries: Vec<(String, usize)>,
    /// Sum of valuations in billions USD.
    pub total_valuation: f64,
    /// Mean AI impact over records that carry a score.
    pub mean_ai_impact: Option<f64>,
}

impl DatasetOverview {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let mut by_sector = BTreeMap::new();
        let mut by_status = BTreeMap::new();
        let mut by_country: BTreeMap<&str, usize> = BTreeMap::new();
        let mut total_valuation = 0.0;
        let (mut impact_sum, mut impact_count) = (0.0, 0_usize);

        for record in dataset.records() {
            *by_sector.entry(record.sector.clone()).or_insert(0) += 1;
            *by_status.entry(record.status()).or_insert(0) += 1;
            *by_country.entry(record.country.as_str()).or_insert(0) += 1;
            total_valuation += record.valuation;
            if let Some(score) = record.ai_impact_score {
                impact_sum += score;
                impact_count += 1;
            }
        }

        let mut top_countries: Vec<(String, usize)> = by_country
            .into_iter()
            .map(|(country, count)| (country.to_string(), count))
            .collect();
        // Stable sort keeps the alphabetical order of the map for ties.
        top_countries.sort_by(|a, b| b.1.cmp(&a.1));
        top_countries.truncate(TOP_COUNTRY_COUNT);

        Self {
            record_count: dataset.len(),
            provenance: dataset.provenance(),
            skipped: dataset.skipped(),
            seed: dataset.seed(),
            by_sector,
            by_status,
            top_countries,
            total_valuation,
            mean_ai_impact: (impact_count > 0).then(|| impact_sum / impact_count as f64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DatasetOverview;
    use crate::model::dataset::{Dataset, Provenance};
    use crate::model::record::{StartupRecord, StartupStatus};

    fn record(id: &str, valuation: f64, country: &str, sector: &str) -> StartupRecord {
        let mut record = StartupRecord::new(id, id.to_uppercase(), valuation, 2018);
        record.country = country.to_string();
        record.sector = sector.to_string();
        record
    }

    #[test]
    fn counts_and_totals_match_records() {
        let mut records = vec![
            record("a", 0.5, "UK", "Fintech"),
            record("b", 5.0, "USA", "Fintech"),
            record("c", 50.0, "USA", "AI/ML"),
            record("d", 150.0, "India", "AI/ML"),
        ];
        records[2].ai_impact_score = Some(80.0);
        records[3].ai_impact_score = Some(90.0);
        let dataset = Dataset::new(Provenance::StaticFile, records)
            .expect("valid dataset")
            .with_skipped(2);

        let overview = DatasetOverview::from_dataset(&dataset);
        assert_eq!(overview.record_count, 4);
        assert_eq!(overview.skipped, 2);
        assert_eq!(overview.by_sector.get("AI/ML"), Some(&2));
        for status in [
            StartupStatus::Soonicorn,
            StartupStatus::Unicorn,
            StartupStatus::Decacorn,
            StartupStatus::Hectocorn,
        ] {
            assert_eq!(overview.by_status.get(&status), Some(&1));
        }
        assert_eq!(
            overview.top_countries,
            vec![
                ("USA".to_string(), 2),
                ("India".to_string(), 1),
                ("UK".to_string(), 1)
            ]
        );
        assert_eq!(overview.total_valuation, 205.5);
        assert_eq!(overview.mean_ai_impact, Some(85.0));
    }

    #[test]
    fn top_countries_is_capped() {
        let records = (0..15)
            .map(|index| record(&format!("r{index}"), 1.0, &format!("C{index:02}"), "SaaS"))
            .collect();
        let dataset = Dataset::new(Provenance::Synthetic, records).expect("valid dataset");
        let overview = DatasetOverview::from_dataset(&dataset);
        assert_eq!(overview.top_countries.len(), 10);
        assert_eq!(overview.top_countries[0].0, "C00");
        assert_eq!(overview.mean_ai_impact, None);
    }
}
