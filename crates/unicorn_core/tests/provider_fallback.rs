use serde_json::json;
use std::path::Path;
use unicorn_core::service::data_provider::AttemptOutcome;
use unicorn_core::source::synthetic::generate_records;
use unicorn_core::{DashboardConfig, DataProvider, Provenance, ProviderError, SourceError};

fn config_in(dir: &Path) -> DashboardConfig {
    let mut config = DashboardConfig::default();
    config.store.path = Some(dir.join("unicorns.db"));
    config.static_file.paths = vec![
        dir.join("unicorn_data_comprehensive.json"),
        dir.join("unicorn_data.json"),
    ];
    config.synthetic.count = 50;
    config.synthetic.seed = Some(7);
    config
}

fn write_snapshot(dir: &Path) {
    let records: Vec<_> = (0..4)
        .map(|index| {
            json!({
                "id": format!("snap-{index}"),
                "name": format!("Snapshot {index}"),
                "valuation": 2.0 + index as f64,
                "foundingYear": 2015 + index,
                "industry": "SaaS",
                "country": "Germany"
            })
        })
        .collect();
    std::fs::write(
        dir.join("unicorn_data.json"),
        serde_json::to_vec(&records).unwrap(),
    )
    .unwrap();
}

#[test]
fn empty_environment_falls_through_to_synthetic() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let provider = DataProvider::from_config(&config);
    assert_eq!(
        provider.source_ids(),
        ["persistent_store", "static_file", "synthetic"]
    );

    let resolution = provider.resolve().unwrap();
    assert_eq!(resolution.dataset.provenance(), Provenance::Synthetic);
    assert_eq!(resolution.dataset.len(), 50);
    assert_eq!(resolution.dataset.seed(), Some(7));
    assert_eq!(resolution.dataset.records(), generate_records(50, 7).as_slice());

    let outcomes: Vec<_> = resolution
        .attempts
        .iter()
        .map(|attempt| (attempt.source_id.as_str(), attempt.succeeded()))
        .collect();
    assert_eq!(
        outcomes,
        [
            ("persistent_store", false),
            ("static_file", false),
            ("synthetic", true)
        ]
    );
    assert!(!dir.path().join("unicorns.db").exists());
}

#[test]
fn static_snapshot_wins_over_remote_and_synthetic() {
    let dir = tempfile::tempdir().unwrap();
    write_snapshot(dir.path());
    let mut config = config_in(dir.path());
    config.remote.url = Some("http://127.0.0.1:9/unreachable".to_string());

    let resolution = DataProvider::from_config(&config).resolve().unwrap();
    assert_eq!(resolution.dataset.provenance(), Provenance::StaticFile);
    assert_eq!(resolution.dataset.len(), 4);
    assert_eq!(resolution.attempts.len(), 2);
}

#[test]
fn unreachable_remote_falls_back_to_synthetic() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.remote.url = Some("http://127.0.0.1:9/unreachable".to_string());
    config.remote.retries = 0;

    let resolution = DataProvider::from_config(&config).resolve().unwrap();
    assert_eq!(resolution.dataset.provenance(), Provenance::Synthetic);
    let remote = &resolution.attempts[2];
    assert_eq!(remote.source_id, "remote_api");
    assert!(matches!(
        remote.outcome,
        AttemptOutcome::Failed(SourceError::Connect { .. } | SourceError::Timeout { .. })
    ));
}

#[test]
fn static_dataset_seeds_store_for_next_resolution() {
    let dir = tempfile::tempdir().unwrap();
    write_snapshot(dir.path());
    let mut config = config_in(dir.path());
    config.store.seed_from_static = true;
    let provider = DataProvider::from_config(&config);

    let first = provider.resolve().unwrap();
    assert_eq!(first.dataset.provenance(), Provenance::StaticFile);
    assert!(dir.path().join("unicorns.db").exists());

    let second = provider.resolve().unwrap();
    assert_eq!(second.dataset.provenance(), Provenance::PersistentStore);
    assert_eq!(second.dataset.records(), first.dataset.records());
    assert_eq!(second.attempts.len(), 1);
}

#[test]
fn dataset_cap_bounds_every_source() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.dataset_size_cap = 20;
    config.synthetic.count = 1000;

    let resolution = DataProvider::from_config(&config).resolve().unwrap();
    assert_eq!(resolution.dataset.len(), 20);
}

#[test]
fn disabled_synthetic_can_exhaust_the_chain() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.synthetic.enabled = false;

    match DataProvider::from_config(&config).resolve() {
        Err(ProviderError::AllSourcesExhausted { attempts }) => {
            assert_eq!(attempts.len(), 3);
            assert!(matches!(attempts[2].error(), Some(SourceError::Disabled)));
        }
        other => panic!("expected exhaustion, got {other:?}"),
    }
}
