// crates/rota_cli/tests/cli.rs
//
// End-to-end runs of the `rota` binary against a temp data file.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

const CLAN: &str = r#"{
  "version": "1.0",
  "players": [
    {"nickname": "A", "preferences": ["Tank", "Healer"], "role_assignments": {}},
    {"nickname": "B", "preferences": ["Tank"], "role_assignments": {"Tank": [4, "01.10.26"]}},
    {"nickname": "C", "preferences": ["Scout"]}
  ],
  "roles": [{"name": "Tank", "priority": 0}, {"name": "Healer", "priority": 1}]
}"#;

fn setup() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("clan.json");
    fs::write(&data, CLAN).unwrap();
    (dir, data)
}

fn rota() -> Command {
    let mut cmd = Command::cargo_bin("rota").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

fn read_json(p: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(p).unwrap()).unwrap()
}

#[test]
fn assigns_prints_and_updates_history() {
    let (_dir, data) = setup();
    rota()
        .arg("--data")
        .arg(&data)
        .args(["--role", "Tank", "--role", "Healer", "--pool", "A", "--pool", "B", "--date", "15.10.26"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tank: B\n"))
        .stdout(predicate::str::contains("Healer: A\n"));

    let v = read_json(&data);
    let players = v["players"].as_array().unwrap();
    assert_eq!(players[0]["role_assignments"]["Healer"], serde_json::json!([1, "15.10.26"]));
    assert_eq!(players[1]["role_assignments"]["Tank"], serde_json::json!([5, "15.10.26"]));
}

#[test]
fn unfillable_role_prints_dash_and_succeeds() {
    let (_dir, data) = setup();
    rota()
        .arg("--data")
        .arg(&data)
        .args(["--role", "DPS", "--pool", "C", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::eq("DPS: -\n"));
}

#[test]
fn out_dir_gets_canonical_artifacts() {
    let (dir, data) = setup();
    let out = dir.path().join("out");
    rota()
        .arg("--data")
        .arg(&data)
        .args(["--role", "Tank=2", "--pool", "A", "--pool", "B", "--date", "15.10.26", "--quiet"])
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Tank: B, A"));

    let result = read_json(&out.join("result.json"));
    assert!(result["id"].as_str().unwrap().starts_with("RES:"));
    assert_eq!(result["assignments"]["Tank"], serde_json::json!(["B", "A"]));

    let record = read_json(&out.join("run_record.json"));
    assert!(record["id"].as_str().unwrap().starts_with("RUN:"));
    assert_eq!(record["recorded"], true);
    assert_eq!(record["result_id"], result["id"]);

    let raw = fs::read_to_string(out.join("result.json")).unwrap();
    assert!(!raw.contains('\n'));
}

#[test]
fn pool_file_and_manifest_mode() {
    let (dir, _data) = setup();
    fs::write(dir.path().join("pool.txt"), "# tonight\nA\n").unwrap();
    fs::write(dir.path().join("params.json"), r#"{"date_format": "%Y"}"#).unwrap();
    let manifest = dir.path().join("manifest.json");
    fs::write(&manifest, r#"{"data_path": "clan.json", "params_path": "params.json"}"#).unwrap();

    rota()
        .arg("--manifest")
        .arg(&manifest)
        .arg("--pool-file")
        .arg(dir.path().join("pool.txt"))
        .args(["--role", "Tank", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::eq("Tank: A\n"));

    let v = read_json(&dir.path().join("clan.json"));
    let stamped = v["players"][0]["role_assignments"]["Tank"][1].as_str().unwrap().to_string();
    assert_eq!(stamped.len(), 4, "year-only marker expected, got {stamped}");
}

#[test]
fn run_without_pool_is_a_usage_error() {
    let (_dir, data) = setup();
    rota()
        .arg("--data")
        .arg(&data)
        .args(["--role", "Tank"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--pool or --pool-file"));
    assert_eq!(fs::read_to_string(&data).unwrap(), CLAN);
}

/// The data file is read through the process's stdin link, so the atomic
/// write (temp file next to it, inside /proc/self/fd) cannot succeed.
#[cfg(target_os = "linux")]
#[test]
fn unwritable_history_exits_6_after_printing_and_writing_artifacts() {
    use assert_cmd::prelude::*;
    use std::process::{Command as StdCommand, Stdio};

    let (dir, data) = setup();
    let out = dir.path().join("out");
    let mut cmd = StdCommand::new(assert_cmd::cargo::cargo_bin("rota"));
    cmd.env_remove("RUST_LOG")
        .stdin(Stdio::from(fs::File::open(&data).unwrap()))
        .args(["--data", "/proc/self/fd/0", "--role", "Tank", "--pool", "A", "--pool", "B", "--quiet"])
        .arg("--out")
        .arg(&out);

    cmd.assert()
        .code(6)
        .stdout(predicate::eq("Tank: B\n"))
        .stderr(predicate::str::contains("history not recorded"));

    let record = read_json(&out.join("run_record.json"));
    assert_eq!(record["recorded"], false);
    assert_eq!(record["increments"][0]["candidate"], "B");
    assert_eq!(fs::read_to_string(&data).unwrap(), CLAN);
}

#[test]
fn validate_only_writes_nothing() {
    let (_dir, data) = setup();
    rota().arg("--data").arg(&data).arg("--validate-only").assert().success();
    assert_eq!(fs::read_to_string(&data).unwrap(), CLAN);
}

#[test]
fn usage_errors_exit_2() {
    rota().args(["--role", "Tank"]).assert().code(2).stderr(predicate::str::contains("--data or --manifest"));
    rota()
        .args(["--data", "https://example.org/clan.json", "--role", "Tank"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no scheme"));
    rota().args(["--data", "does-not-exist.json", "--role", "Tank"]).assert().code(2);
}

#[test]
fn corrupt_data_and_rejected_pool_exit_2() {
    let (dir, data) = setup();
    let bad = dir.path().join("bad.json");
    fs::write(&bad, r#"{"players": [{"nickname": "A"}, {"nickname": "A"}]}"#).unwrap();
    rota().arg("--data").arg(&bad).args(["--role", "Tank", "--pool", "A"]).assert().code(2);

    fs::write(dir.path().join("strict.json"), r#"{"unknown_pool_policy": "reject"}"#).unwrap();
    rota()
        .arg("--data")
        .arg(&data)
        .arg("--params")
        .arg(dir.path().join("strict.json"))
        .args(["--role", "Tank", "--pool", "A", "--pool", "Ghost"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Ghost"));
    assert_eq!(fs::read_to_string(&data).unwrap(), CLAN);
}
