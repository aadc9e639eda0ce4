use serde_json::json;
use std::path::Path;
use unicorn_core::source::StaticFileSource;
use unicorn_core::{DataSource, Provenance, SourceError};

fn write_json(path: &Path, value: &serde_json::Value) {
    std::fs::write(path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
}

#[test]
fn malformed_record_is_skipped_and_counted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("unicorn_data.json");
    write_json(
        &path,
        &json!([
            {
                "id": "openai",
                "name": "OpenAI",
                "valuation": 157.0,
                "foundingYear": 2015,
                "country": "USA",
                "industry": "AI/ML",
                "aiImpactScore": 95,
                "growthRate": 250.5,
                "unusedField": true
            },
            { "name": "No Id Inc", "valuation": 2.0, "foundingYear": 2019 }
        ]),
    );

    let dataset = StaticFileSource::single(&path).load(500).unwrap();
    assert_eq!(dataset.provenance(), Provenance::StaticFile);
    assert_eq!(dataset.len(), 1);
    assert_eq!(dataset.skipped(), 1);

    let record = &dataset.records()[0];
    assert_eq!(record.sector, "AI/ML");
    assert_eq!(record.ai_impact_score, Some(95.0));
    assert_eq!(record.growth_rate, Some(250.5));
}

#[test]
fn display_keys_and_currency_strings_are_normalized() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.json");
    write_json(
        &path,
        &json!({
            "records": [
                {
                    "fields": {
                        "id": "stripe",
                        "Company": "Stripe",
                        "Valuation ($B)": "$65B",
                        "Founded Year": 2010,
                        "Sector": "Fintech",
                        "Country": "USA",
                        "AI Impact Score": 40,
                        "Growth Rate (%)": 120
                    }
                },
                {
                    "id": "tiny",
                    "name": "Tiny",
                    "valuation": "900M",
                    "foundedYear": 2021
                }
            ]
        }),
    );

    let dataset = StaticFileSource::single(&path).load(500).unwrap();
    assert_eq!(dataset.len(), 2);
    let stripe = &dataset.records()[0];
    assert_eq!(stripe.name, "Stripe");
    assert_eq!(stripe.valuation, 65.0);
    assert_eq!(stripe.founded_year, 2010);
    let tiny = &dataset.records()[1];
    assert_eq!(tiny.valuation, 0.9);
    assert_eq!(tiny.country, "Unknown");
    assert_eq!(tiny.sector, "Unknown");
}

#[test]
fn candidates_are_probed_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let comprehensive = dir.path().join("unicorn_data_comprehensive.json");
    let large = dir.path().join("unicorn_data_large.json");
    let basic = dir.path().join("unicorn_data.json");

    std::fs::write(&large, "{ not json").unwrap();
    write_json(
        &basic,
        &json!([
            { "id": "a", "name": "A", "valuation": 1, "foundingYear": 2016 },
            { "id": "a", "name": "A again", "valuation": 2, "foundingYear": 2017 },
            { "id": "b", "name": "B", "valuation": 3, "foundingYear": 2018 }
        ]),
    );

    let source = StaticFileSource::new(vec![comprehensive, large, basic]);
    let dataset = source.load(500).unwrap();
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.skipped(), 1);
    assert_eq!(dataset.records()[0].name, "A");

    let capped = source.load(1).unwrap();
    assert_eq!(capped.len(), 1);
}

#[test]
fn missing_or_unusable_files_fail() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");
    assert!(matches!(
        StaticFileSource::single(&missing).load(10),
        Err(SourceError::Missing(_))
    ));

    let all_bad = dir.path().join("bad.json");
    write_json(&all_bad, &json!([{ "id": "x" }, 42]));
    assert!(matches!(
        StaticFileSource::single(&all_bad).load(10),
        Err(SourceError::Empty { skipped: 2 })
    ));

    let wrong_shape = dir.path().join("shape.json");
    write_json(&wrong_shape, &json!({ "unicorns": [] }));
    assert!(matches!(
        StaticFileSource::single(&wrong_shape).load(10),
        Err(SourceError::Parse(_))
    ));
}
