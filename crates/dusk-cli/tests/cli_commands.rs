//! End-to-end tests for the command-line interface.

#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn dusk() -> Command {
    Command::cargo_bin("dusk").unwrap()
}

/// Export the demo level into a temp directory and return both.
fn demo_map_file() -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("demo.json");
    dusk()
        .args(["export", "map", "-o"])
        .arg(&path)
        .assert()
        .success();
    (dir, path)
}

// -----------------------------------------------------------------------
// dusk inspect
// -----------------------------------------------------------------------

#[test]
fn inspect_demo_summarizes_map() {
    dusk()
        .arg("inspect")
        .assert()
        .success()
        .stdout(predicate::str::contains("'DEMO'"))
        .stdout(predicate::str::contains("5 sectors"))
        .stdout(predicate::str::contains("Sectors"))
        .stdout(predicate::str::contains("Line Specials"))
        .stdout(predicate::str::contains("absent"));
}

#[test]
fn inspect_lists_things_on_request() {
    dusk()
        .args(["inspect", "--things"])
        .assert()
        .success()
        .stdout(predicate::str::contains("player start"))
        .stdout(predicate::str::contains("zombieman"))
        .stdout(predicate::str::contains("blue keycard"));
}

#[test]
fn inspect_missing_file_fails() {
    dusk()
        .args(["inspect", "--map", "/nonexistent/map.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: cannot read"));
}

#[test]
fn inspect_rejects_invalid_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();

    dusk()
        .arg("inspect")
        .arg("--map")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid map document"));
}

#[test]
fn inspect_rejects_map_without_sectors() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.json");
    fs::write(
        &path,
        r#"{"name": "EMPTY", "vertices": [], "linedefs": [], "sidedefs": [], "sectors": []}"#,
    )
    .unwrap();

    dusk()
        .arg("inspect")
        .arg("--map")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("has no sectors"));
}

#[test]
fn exported_map_loads_back() {
    let (_dir, path) = demo_map_file();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"name\": \"DEMO\""));

    dusk()
        .arg("inspect")
        .arg("--map")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("'DEMO'"))
        .stdout(predicate::str::contains("5 sectors"));
}

// -----------------------------------------------------------------------
// dusk locate
// -----------------------------------------------------------------------

#[test]
fn locate_finds_start_room() {
    dusk()
        .args(["locate", "64", "128"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(64, 128)"))
        .stdout(predicate::str::contains("Subsector"));
}

#[test]
fn locate_finds_raised_exit_room() {
    dusk()
        .args(["locate", "700", "128"])
        .assert()
        .success()
        .stdout(predicate::str::contains("192"));
}

#[test]
fn locate_outside_bounds_notes_it() {
    dusk()
        .args(["locate", "--", "-500", "-500"])
        .assert()
        .success()
        .stdout(predicate::str::contains("outside the map bounds"));
}

// -----------------------------------------------------------------------
// dusk run
// -----------------------------------------------------------------------

#[test]
fn run_demo_one_second() {
    dusk()
        .args(["run", "--ticks", "35"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Simulation"))
        .stdout(predicate::str::contains("35 ticks"))
        .stdout(predicate::str::contains("35 frames presented"))
        .stdout(predicate::str::contains("Player"))
        .stdout(predicate::str::contains("zombieman"));
}

#[test]
fn run_with_events_shows_log() {
    dusk()
        .args(["run", "--ticks", "35", "--fire", "--events"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Event Log"))
        .stdout(predicate::str::contains("pistol fired"));
}

#[test]
fn run_seed_flag_overrides_config() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");
    fs::write(&config, r#"{"seed": 7}"#).unwrap();

    dusk()
        .args(["run", "--ticks", "5", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("seed=7"));

    dusk()
        .args(["run", "--ticks", "5", "--seed", "9", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("seed=9"));
}

#[test]
fn run_rejects_bad_config() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");
    fs::write(&config, r#"{"seed": "seven"}"#).unwrap();

    dusk()
        .args(["run", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid JSON document"));
}

#[test]
fn run_on_exported_map_matches_demo() {
    let (_dir, path) = demo_map_file();
    dusk()
        .args(["run", "--ticks", "10", "--map"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("'DEMO'"));
}

// -----------------------------------------------------------------------
// dusk export
// -----------------------------------------------------------------------

#[test]
fn export_save_to_stdout() {
    dusk()
        .args(["export", "save", "--ticks", "10", "--forward", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"tick\": 10"))
        .stdout(predicate::str::contains("\"map\": \"DEMO\""));
}

#[test]
fn export_snapshot_to_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snapshot.json");

    dusk()
        .args(["export", "snapshot", "--ticks", "35", "-o"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported to"));

    let text = fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["tick"], 35);
    assert_eq!(value["sectors"].as_array().unwrap().len(), 5);
    assert!(value["fps"].as_f64().unwrap() > 0.0);
}

#[test]
fn export_unknown_kind_fails() {
    dusk()
        .args(["export", "screenshot"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported export"));
}
