//! Command line behaviour that needs no model files.

#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;
use tempfile::TempDir;

/// Command isolated from the user's config file and environment.
fn birdnetlib(config_dir: &TempDir) -> Command {
    let mut cmd = Command::new(cargo_bin("birdnetlib"));
    cmd.env("BIRDNETLIB_CONFIG", config_dir.path().join("config.toml"))
        .env_remove("BIRDNETLIB_LATITUDE")
        .env_remove("BIRDNETLIB_LONGITUDE")
        .env_remove("BIRDNETLIB_SPECIES_LIST")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_config_path_honours_env() {
    let dir = TempDir::new().unwrap();

    birdnetlib(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"))
        .stdout(predicate::str::contains(
            dir.path().to_string_lossy().into_owned(),
        ));
}

#[test]
fn test_config_init_then_show() {
    let dir = TempDir::new().unwrap();

    birdnetlib(&dir)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));
    assert!(dir.path().join("config.toml").exists());

    birdnetlib(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[defaults]"))
        .stdout(predicate::str::contains("relevance_floor"));

    birdnetlib(&dir)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_no_inputs_prints_setup_help() {
    let dir = TempDir::new().unwrap();

    birdnetlib(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("birdnetlib config init"));
}

#[test]
fn test_lat_without_lon_is_rejected() {
    let dir = TempDir::new().unwrap();

    birdnetlib(&dir)
        .args(["recording.wav", "--lat", "35.4244"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--lon"));
}

#[test]
fn test_location_with_species_list_is_rejected() {
    let dir = TempDir::new().unwrap();

    birdnetlib(&dir)
        .args([
            "recording.wav",
            "--lat",
            "35.4244",
            "--lon",
            "-120.7463",
            "--slist",
            "species_list.txt",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("custom species list"));
}

#[test]
fn test_week_and_date_are_exclusive() {
    let dir = TempDir::new().unwrap();

    birdnetlib(&dir)
        .args(["recording.wav", "--week", "18", "--date", "2022-05-10"])
        .assert()
        .failure();
}

#[test]
fn test_missing_inputs_reported() {
    let dir = TempDir::new().unwrap();

    birdnetlib(&dir)
        .arg(dir.path().join("missing.wav"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("no valid audio files"));
}

#[test]
fn test_species_requires_configured_model() {
    let dir = TempDir::new().unwrap();

    birdnetlib(&dir)
        .args(["species", "--lat", "42.5", "--lon", "-76.45", "--week", "18"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no model configured"));
}
