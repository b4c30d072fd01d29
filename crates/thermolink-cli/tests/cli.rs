use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("thermolink"))
}

fn repo_root() -> std::path::PathBuf {
    let manifest = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest
        .parent()
        .and_then(|p| p.parent())
        .expect("repo root")
        .to_path_buf()
}

fn golden_envelope(case: &str) -> std::path::PathBuf {
    repo_root()
        .join("tests")
        .join("golden")
        .join(case)
        .join("envelope.json")
}

#[test]
fn help_supports_envelope_decode() {
    cmd()
        .arg("envelope")
        .arg("decode")
        .arg("--help")
        .assert()
        .success();
}

#[test]
fn missing_input_shows_error_and_hint() {
    let temp = TempDir::new().expect("tempdir");
    let missing = temp.path().join("missing.json");
    let record = temp.path().join("record.json");

    cmd()
        .arg("envelope")
        .arg("decode")
        .arg(missing)
        .arg("-o")
        .arg(record)
        .assert()
        .failure()
        .stderr(contains("error:").and(contains("hint:")));
}

#[test]
fn decode_alarm_envelope_to_stdout() {
    let output = cmd()
        .arg("envelope")
        .arg("decode")
        .arg(golden_envelope("alarm_on"))
        .arg("--stdout")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let value: Value = serde_json::from_slice(&output).expect("record json");
    assert_eq!(value["kind"], "alarm_event");
    assert_eq!(value["active"], true);
}

#[test]
fn decode_writes_record_file() {
    let temp = TempDir::new().expect("tempdir");
    let record = temp.path().join("record.json");

    cmd()
        .arg("envelope")
        .arg("decode")
        .arg(golden_envelope("current"))
        .arg("-o")
        .arg(&record)
        .assert()
        .success()
        .stderr(contains("OK: record written"));

    let json = std::fs::read_to_string(&record).expect("read record");
    let value: Value = serde_json::from_str(&json).expect("record json");
    assert_eq!(value["kind"], "temperature_batch");
    assert_eq!(value["samples"][0]["temperature"], 19.1);
    assert_eq!(value["samples"][0]["device_id"], "1B2DEB");
}

#[test]
fn list_samples_prints_rfc3339_timestamps() {
    cmd()
        .arg("envelope")
        .arg("decode")
        .arg(golden_envelope("current"))
        .arg("--stdout")
        .arg("--list-samples")
        .assert()
        .success()
        .stderr(contains("Decoded samples:").and(contains("2018-08-06T14:03:28Z")));
}

#[test]
fn pretty_and_compact_conflict() {
    cmd()
        .arg("envelope")
        .arg("decode")
        .arg(golden_envelope("alarm_on"))
        .arg("--stdout")
        .arg("--pretty")
        .arg("--compact")
        .assert()
        .failure();
}

#[test]
fn unsupported_mode_shows_error_and_hint() {
    let temp = TempDir::new().expect("tempdir");
    let envelope = temp.path().join("envelope.json");
    std::fs::write(
        &envelope,
        r#"{"data":"YzlmZjAwMDE=","attributes":{"device":"1B2DEB","time":"1533564208"}}"#,
    )
    .expect("write envelope");

    cmd()
        .arg("envelope")
        .arg("decode")
        .arg(envelope)
        .arg("--stdout")
        .assert()
        .failure()
        .stderr(contains("unsupported frame mode").and(contains("hint:")));
}

#[test]
fn rejects_non_json_input() {
    let temp = TempDir::new().expect("tempdir");
    let input = temp.path().join("envelope.txt");
    std::fs::write(&input, "not an envelope").expect("write input");

    cmd()
        .arg("envelope")
        .arg("decode")
        .arg(input)
        .arg("--stdout")
        .assert()
        .failure()
        .stderr(contains("unsupported input format"));
}
