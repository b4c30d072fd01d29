use std::fs;
use std::path::{Path, PathBuf};

use thermolink_core::{DecodedRecord, Envelope, decode_envelope};

fn repo_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..")
}

fn load_envelope(dir: &str) -> Envelope {
    let path = repo_root().join(dir).join("envelope.json");
    let json = fs::read_to_string(&path).expect("read envelope.json");
    serde_json::from_str(&json).expect("parse envelope")
}

fn load_expected_record(dir: &str) -> DecodedRecord {
    let path = repo_root().join(dir).join("expected_record.json");
    let json = fs::read_to_string(&path).expect("read expected_record.json");
    serde_json::from_str(&json).expect("parse expected record")
}

fn run_golden(dir: &str) {
    let envelope = load_envelope(dir);
    let expected = load_expected_record(dir);

    let actual = decode_envelope(&envelope).expect("decode envelope");

    let actual_value = serde_json::to_value(actual).expect("serialize actual");
    let expected_value = serde_json::to_value(expected).expect("serialize expected");

    assert_eq!(actual_value, expected_value, "golden mismatch in {dir}");
}

#[test]
fn golden_current() {
    run_golden("tests/golden/current");
}

#[test]
fn golden_history() {
    run_golden("tests/golden/history");
}

#[test]
fn golden_aggregate() {
    run_golden("tests/golden/aggregate");
}

#[test]
fn golden_alarm_on() {
    run_golden("tests/golden/alarm_on");
}

#[test]
fn golden_alarm_off() {
    run_golden("tests/golden/alarm_off");
}

#[test]
fn golden_system() {
    run_golden("tests/golden/system");
}

#[test]
fn golden_current_is_newest_first() {
    let record = load_expected_record("tests/golden/current");
    let DecodedRecord::TemperatureBatch { samples } = record else {
        panic!("expected temperature batch");
    };
    assert!(samples.windows(2).all(|w| w[0].timestamp > w[1].timestamp));
}
