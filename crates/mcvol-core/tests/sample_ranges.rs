use mcvol_core::{RunProvenance, SampleRange};

#[test]
fn adjacent_ranges_are_disjoint() {
    let first = SampleRange::new(0, 1_000);
    let second = SampleRange::new(1_000, 500);
    assert!(!first.overlaps(&second));
    assert!(!second.overlaps(&first));
    assert_eq!(second.to_string(), "1000..1500");
}

#[test]
fn shared_positions_overlap_both_ways() {
    let outer = SampleRange::new(10, 100);
    let inner = SampleRange::new(50, 5);
    assert!(outer.overlaps(&inner));
    assert!(inner.overlaps(&outer));
    assert!(outer.overlaps(&outer));
}

#[test]
fn empty_range_overlaps_nothing() {
    let empty = SampleRange::new(20, 0);
    assert!(!empty.overlaps(&SampleRange::new(0, 100)));
}

#[test]
fn range_end_saturates() {
    let range = SampleRange::new(u64::MAX - 1, 10);
    assert_eq!(range.end, u64::MAX);
}

#[test]
fn provenance_without_ranges_still_decodes() {
    let json = r#"{
        "input_hash": "abc",
        "seed_offset": 0,
        "workers": 1,
        "created_at": "",
        "tool_versions": {}
    }"#;
    let provenance: RunProvenance = serde_json::from_str(json).unwrap();
    assert!(provenance.sample_ranges.is_empty());
}
