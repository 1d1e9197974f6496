mod fixtures;

use fixtures::{cell_calculation, sphere_in_box};
use mcvol_calc::report::{report_path, REPORT_SCHEMA};
use mcvol_calc::{stamp_provenance, VolumeReport};
use mcvol_core::{SampleRange, SchemaVersion};
use tempfile::tempdir;

fn report_for(seed_offset: u64) -> VolumeReport {
    let model = sphere_in_box();
    let calc = cell_calculation(vec![10, 20], 1_000, seed_offset);
    let results = calc.execute(&model, &model).unwrap();
    VolumeReport::new(
        &calc,
        &results,
        stamp_provenance("abc".into(), seed_offset, 1_000, 1),
        &model,
    )
    .unwrap()
}

#[test]
fn report_round_trips_through_disk() {
    let dir = tempdir().unwrap();
    let report = report_for(0);
    let path = report_path(dir.path(), 0);
    assert!(path.ends_with("volume_1.json"));

    report.write(&path).unwrap();
    let loaded = VolumeReport::load(&path).unwrap();
    assert_eq!(loaded, report);
    assert_eq!(loaded.schema_version, REPORT_SCHEMA);
    assert_eq!(loaded.samples, 1_000);
    assert_eq!(loaded.provenance.input_hash, "abc");
    assert!(loaded.provenance.tool_versions.contains_key("mcvol-calc"));
    assert_eq!(loaded.provenance.sample_ranges, vec![SampleRange::new(0, 1_000)]);
}

#[test]
fn nuclide_names_come_from_registry() {
    let report = report_for(0);
    let sphere = &report.domains[0];
    let names: Vec<_> = sphere.nuclides.iter().map(|entry| entry.name.as_str()).collect();
    assert_eq!(names, vec!["U235", "U238"]);

    let results = report.results();
    assert_eq!(results[0].nuclides.len(), 2);
    assert_eq!(results[0].volume, sphere.volume);
}

#[test]
fn merged_reports_sum_samples() {
    let a = report_for(0);
    let b = report_for(1_000);
    let merged = a.merge(&b).unwrap();

    assert_eq!(merged.samples, 2_000);
    assert_eq!(merged.provenance.workers, 1);
    assert_eq!(
        merged.provenance.sample_ranges,
        vec![SampleRange::new(0, 1_000), SampleRange::new(1_000, 1_000)]
    );
    let expected = (a.domains[0].volume[0] + b.domains[0].volume[0]) / 2.0;
    assert!((merged.domains[0].volume[0] - expected).abs() < 1e-12);
    assert_eq!(merged.domains[1].nuclides[0].name, "H1");
}

#[test]
fn merging_a_report_with_itself_is_rejected() {
    let report = report_for(0);
    let err = report.merge(&report).unwrap_err();
    assert!(matches!(err, mcvol_core::VolError::Combine(_)));
    assert_eq!(err.info().code, "report-overlap");
    assert_eq!(err.info().context.get("left").map(String::as_str), Some("0..1000"));
}

#[test]
fn partially_shared_sample_streams_do_not_merge() {
    let a = report_for(0);
    let b = report_for(500);
    assert_eq!(a.merge(&b).unwrap_err().info().code, "report-overlap");

    let merged = a.merge(&report_for(1_000)).unwrap();
    let err = merged.merge(&report_for(1_999)).unwrap_err();
    assert_eq!(err.info().code, "report-overlap");
    assert_eq!(err.info().context.get("right").map(String::as_str), Some("1999..2999"));
}

#[test]
fn reports_of_different_calculations_do_not_merge() {
    let a = report_for(0);
    let mut b = report_for(5);
    b.upper_right.x = 2.0;
    let err = a.merge(&b).unwrap_err();
    assert_eq!(err.info().code, "report-mismatch");
}

#[test]
fn report_rejects_results_for_other_domains() {
    let model = sphere_in_box();
    let calc = cell_calculation(vec![10, 20], 100, 0);
    let mut results = calc.execute(&model, &model).unwrap();
    results.swap(0, 1);
    let err = VolumeReport::new(&calc, &results, stamp_provenance(String::new(), 0, 100, 1), &model)
        .unwrap_err();
    assert_eq!(err.info().code, "report-domains");
}

#[test]
fn loading_garbage_reports_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("volume_1.json");
    std::fs::write(&path, "not json").unwrap();
    let err = VolumeReport::load(&path).unwrap_err();
    assert_eq!(err.info().code, "report-parse");
}

#[test]
fn reports_from_another_major_schema_are_rejected() {
    let dir = tempdir().unwrap();
    let path = report_path(dir.path(), 2);
    let mut report = report_for(0);
    report.schema_version = SchemaVersion::new(REPORT_SCHEMA.major + 1, 0, 0);
    report.write(&path).unwrap();

    let err = VolumeReport::load(&path).unwrap_err();
    assert_eq!(err.info().code, "report-schema");
    assert_eq!(
        err.info().context.get("found").map(String::as_str),
        Some("2.0.0")
    );
}
