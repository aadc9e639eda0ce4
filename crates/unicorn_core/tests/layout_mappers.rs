use unicorn_core::source::synthetic::generate_records;
use unicorn_core::{map, map_records, Dataset, LayoutParams, Provenance, StartupRecord, StyleTag};

#[test]
fn single_record_spiral_sits_on_axis() {
    let record = StartupRecord::new("solo", "Solo Corp", 4.0, 2020);
    let params = LayoutParams::default();
    let set = map_records(&[record], StyleTag::Spiral, &params);

    assert_eq!(set.len(), 1);
    let point = &set.points[0];
    assert_eq!((point.x, point.y), (0.0, 0.0));
    assert_eq!(point.z, params.spiral.height / 2.0);
    assert_eq!(point.label, "Solo Corp");
}

#[test]
fn synthetic_dataset_maps_cleanly_in_every_style() {
    let dataset = Dataset::new(Provenance::Synthetic, generate_records(300, 11)).unwrap();
    let params = LayoutParams::default();

    for style in StyleTag::ALL {
        let set = map(&dataset, style, &params);
        assert_eq!(set.len(), dataset.len());
        assert!(set.points.iter().all(|point| point.is_finite()));
        assert!(set
            .points
            .iter()
            .zip(dataset.records())
            .all(|(point, record)| point.id == record.id));
        assert_eq!(set, map(&dataset, style, &params));
    }
}

#[test]
fn missing_optional_attributes_use_midpoint_defaults() {
    let records: Vec<_> = (0..4)
        .map(|index| StartupRecord::new(format!("m{index}"), "M", 1.0 + index as f64, 2015))
        .collect();
    let set = map_records(&records, StyleTag::Wave, &LayoutParams::default());
    for point in &set.points {
        assert_eq!(point.color, 0.5);
        assert_eq!(point.size, 14.0);
    }
}

#[test]
fn coordinate_set_serializes_for_renderers() {
    let record = StartupRecord::new("r", "Render Me", 2.0, 2018);
    let set = map_records(&[record], StyleTag::Ripple, &LayoutParams::default());
    let value = serde_json::to_value(&set).unwrap();

    assert_eq!(value["style"], "ripple");
    assert!(value.get("seed").is_none());
    assert_eq!(value["points"][0]["id"], "r");
    assert_eq!(value["points"][0]["label"], "Render Me");
}
