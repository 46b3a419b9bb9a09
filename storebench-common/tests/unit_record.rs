use rand::{rngs::StdRng, SeedableRng};
use std::time::Duration;
use storebench_common::record::random_lowercase;
use storebench_common::{PerformanceRecord, RECORD_TTL_SECS};

#[test]
fn test_generated_fields_stay_in_range() {
    let mut rng = StdRng::seed_from_u64(7);

    for i in 0..200 {
        let r = PerformanceRecord::generate(i.to_string(), &mut rng);
        assert_eq!(r.id, i.to_string());
        assert!(r.string_value.len() >= 16, "string too short: {}", r.string_value.len());
        assert!(r.string_value.len() < 64, "string too long: {}", r.string_value.len());
        assert!(r.string_value.bytes().all(|b| b.is_ascii_lowercase()));
        assert!(r.int_value >= 0);
        assert!(r.double_value >= 0.0);
        assert_eq!(r.double_value.fract(), 0.0);
        assert!(r.time_value < Duration::from_secs(1));
        assert_eq!(r.ttl, RECORD_TTL_SECS);
    }
}

#[test]
fn test_payload_varies_between_records() {
    let mut rng = StdRng::seed_from_u64(42);
    let a = PerformanceRecord::generate("k", &mut rng);
    let b = PerformanceRecord::generate("k", &mut rng);
    assert_ne!(a.string_value, b.string_value);
}

#[test]
fn test_random_ids_are_unique() {
    let mut rng = StdRng::seed_from_u64(1);
    let a = PerformanceRecord::with_random_id(&mut rng);
    let b = PerformanceRecord::with_random_id(&mut rng);
    assert_ne!(a.id, b.id);
    assert_eq!(a.id.len(), 36);
}

#[test]
fn test_random_lowercase_length() {
    let mut rng = StdRng::seed_from_u64(3);
    assert_eq!(random_lowercase(&mut rng, 0), "");
    assert_eq!(random_lowercase(&mut rng, 25).len(), 25);
}

#[test]
fn test_record_json_field_names() {
    let mut rng = StdRng::seed_from_u64(9);
    let r = PerformanceRecord::generate("42", &mut rng);
    let json = serde_json::to_value(&r).unwrap();

    let fields = [
        "id",
        "timestamp",
        "string_value",
        "int_value",
        "double_value",
        "time_value",
        "ttl",
    ];
    for field in fields {
        assert!(json.get(field).is_some(), "missing field {field}");
    }
    assert_eq!(json["id"], "42");
    assert_eq!(json["ttl"], 86_400);

    let back: PerformanceRecord = serde_json::from_value(json).unwrap();
    assert_eq!(back, r);
}
