//! Integration tests for the add/remove/list commands

use assert_cmd::cargo;
use predicates::str::contains;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Point the binary at a temp home and scrub ambient overrides, so tests
/// never touch a real store or a real Telegram chat.
fn set_home_env(cmd: &mut assert_cmd::Command, temp_dir: &TempDir) {
    cmd.env("PW_HOME", temp_dir.path())
        .env_remove("PW_STORE_PATH")
        .env_remove("PW_TELEGRAM_BOT_TOKEN")
        .env_remove("PW_TELEGRAM_CHAT_ID");
}

fn store_path(temp_dir: &TempDir) -> PathBuf {
    temp_dir
        .path()
        .join(".config/parcel-watch/tracking.json")
}

#[test]
fn test_add_creates_store_entry() {
    let temp_dir = TempDir::new().unwrap();

    let mut cmd = cargo::cargo_bin_cmd!("pw");
    set_home_env(&mut cmd, &temp_dir);
    cmd.arg("add")
        .arg("UUS123")
        .assert()
        .success()
        .stdout(contains("Now tracking UUS123 via uniuni"));

    let content = fs::read_to_string(store_path(&temp_dir)).unwrap();
    let store: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(store["packages"][0]["number"], "UUS123");
    assert_eq!(store["packages"][0]["courier"], "uniuni");
}

#[test]
fn test_add_infers_fedex_from_digits() {
    let temp_dir = TempDir::new().unwrap();

    let mut cmd = cargo::cargo_bin_cmd!("pw");
    set_home_env(&mut cmd, &temp_dir);
    cmd.arg("add")
        .arg("961109199021")
        .assert()
        .success()
        .stdout(contains("via fedex"));
}

#[test]
fn test_add_unknown_courier_fails() {
    let temp_dir = TempDir::new().unwrap();

    let mut cmd = cargo::cargo_bin_cmd!("pw");
    set_home_env(&mut cmd, &temp_dir);
    cmd.arg("add")
        .arg("X1")
        .arg("--courier")
        .arg("pigeon")
        .assert()
        .failure()
        .stderr(contains("no courier backend registered for 'pigeon'"));

    assert!(!store_path(&temp_dir).exists());
}

#[test]
fn test_readd_keeps_existing_entry() {
    let temp_dir = TempDir::new().unwrap();

    let mut cmd = cargo::cargo_bin_cmd!("pw");
    set_home_env(&mut cmd, &temp_dir);
    cmd.arg("add").arg("UUS123").assert().success();

    let mut cmd = cargo::cargo_bin_cmd!("pw");
    set_home_env(&mut cmd, &temp_dir);
    cmd.arg("add")
        .arg("UUS123")
        .assert()
        .success()
        .stdout(contains("already tracked"));
}

#[test]
fn test_remove_tracked_number() {
    let temp_dir = TempDir::new().unwrap();

    let mut cmd = cargo::cargo_bin_cmd!("pw");
    set_home_env(&mut cmd, &temp_dir);
    cmd.arg("add").arg("UUS123").assert().success();

    let mut cmd = cargo::cargo_bin_cmd!("pw");
    set_home_env(&mut cmd, &temp_dir);
    cmd.arg("remove")
        .arg("UUS123")
        .assert()
        .success()
        .stdout(contains("Stopped tracking UUS123"));

    let content = fs::read_to_string(store_path(&temp_dir)).unwrap();
    let store: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(store["packages"].as_array().unwrap().len(), 0);
}

#[test]
fn test_remove_untracked_is_reported_not_fatal() {
    let temp_dir = TempDir::new().unwrap();

    let mut cmd = cargo::cargo_bin_cmd!("pw");
    set_home_env(&mut cmd, &temp_dir);
    cmd.arg("remove")
        .arg("NEVER-SEEN")
        .assert()
        .success()
        .stdout(contains("was not tracked"));
}

#[test]
fn test_list_empty_store() {
    let temp_dir = TempDir::new().unwrap();

    let mut cmd = cargo::cargo_bin_cmd!("pw");
    set_home_env(&mut cmd, &temp_dir);
    cmd.arg("list")
        .assert()
        .success()
        .stdout(contains("No shipments tracked"));
}

#[test]
fn test_list_shows_tracked_items() {
    let temp_dir = TempDir::new().unwrap();

    // Seed a store with an observed item directly
    let path = store_path(&temp_dir);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        &path,
        serde_json::to_string_pretty(&serde_json::json!({
            "version": 1,
            "packages": [{
                "number": "UUS123",
                "courier": "uniuni",
                "last_status": "In Transit",
                "last_checkpoint": "Warehouse A"
            }]
        }))
        .unwrap(),
    )
    .unwrap();

    let mut cmd = cargo::cargo_bin_cmd!("pw");
    set_home_env(&mut cmd, &temp_dir);
    cmd.arg("list")
        .assert()
        .success()
        .stdout(contains("(uniuni) UUS123: In Transit"))
        .stdout(contains("Warehouse A"));
}

#[test]
fn test_list_json_output() {
    let temp_dir = TempDir::new().unwrap();

    let mut cmd = cargo::cargo_bin_cmd!("pw");
    set_home_env(&mut cmd, &temp_dir);
    cmd.arg("add").arg("UUS123").assert().success();

    let mut cmd = cargo::cargo_bin_cmd!("pw");
    set_home_env(&mut cmd, &temp_dir);
    let output = cmd.arg("list").arg("--json").assert().success();

    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let items: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(items[0]["number"], "UUS123");
}
