//! End-to-end tests of output generation against an in-memory repository

mod common;

use common::*;
use rockmatrix::cli::Args;
use rockmatrix::error::CiError;
use rockmatrix::system::{MockSystem, System};
use rockmatrix::{generate_outputs, run};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};

const CONFIG_PATH: &str = "/repo/.github/ci.yaml";
const OUTPUT_PATH: &str = "/out/github_output";

fn args() -> Args {
    Args {
        config_path: PathBuf::from(CONFIG_PATH),
        repo_root: PathBuf::from(REPO_ROOT),
        verbose: false,
    }
}

fn repo_with_config(images: &str) -> MockSystem {
    let yaml = with_images(GENERAL_CI_YAML_WITH_REGISTRIES, images);
    mock_repo().with_file(CONFIG_PATH, yaml.as_bytes()).unwrap()
}

#[test]
fn test_generate_outputs_order_and_values() {
    let system = repo_with_config("  - directory: another-rock/2.0\n    registries: [acr]\n");

    let rendered = generate_outputs(&args(), &system)
        .unwrap()
        .render(false)
        .unwrap();
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "ghcr-upload=true");
    assert_eq!(lines[1], "ghcr-cve-scan=false");
    let (key, value) = lines[2].split_once('=').unwrap();
    assert_eq!(key, "build-matrix");
    assert_eq!(
        serde_json::from_str::<Value>(value).unwrap(),
        json!({"include": [{
            "name": "another-rock",
            "tag": "2.0-24.04_edge",
            "directory": "another-rock/2.0",
            "pro-services": "",
            "artifact-name": "another-rock-2.0",
            "run-tests": false,
            "lfs": false,
            "lfs-include": "",
        }]})
    );

    let (key, value) = lines[3].split_once('=').unwrap();
    assert_eq!(key, "upload-matrix");
    assert_eq!(
        serde_json::from_str::<Value>(value).unwrap(),
        json!({"include": [{
            "name": "another-rock",
            "tag": "2.0-24.04_edge",
            "artifact-name": "another-rock-2.0",
            "pro-enabled": false,
            "registry-uri": "myregistry.azurecr.io/ubuntu",
            "registry-auth-method": "bearer",
            "registry-auth-token": "ACR_PASSWORD",
        }]})
    );
}

#[test]
fn test_cve_scan_output_reflects_its_own_flag() {
    let yaml = GENERAL_CI_YAML_WITHOUT_REGISTRIES.replace("cve-scan: false", "cve-scan: true");
    let system = mock_repo()
        .with_file(CONFIG_PATH, with_images(&yaml, "").as_bytes())
        .unwrap();

    let rendered = generate_outputs(&args(), &system)
        .unwrap()
        .render(false)
        .unwrap();
    assert!(rendered.contains("ghcr-upload=true\nghcr-cve-scan=true\n"));
}

#[test]
fn test_run_appends_to_github_output() {
    let system = repo_with_config("  - directory: mock-rock/1.0\n")
        .with_env("GITHUB_OUTPUT", OUTPUT_PATH)
        .unwrap()
        .with_file(OUTPUT_PATH, b"earlier=1\n")
        .unwrap();

    run(&args(), &system).unwrap();

    let written = system.read_to_string(Path::new(OUTPUT_PATH)).unwrap();
    assert!(written.starts_with("earlier=1\nghcr-upload=true\n"));
    assert!(written.contains("\"artifact-name\":\"mock-rock-1.0\""));
    assert!(written.ends_with("upload-matrix={\"include\":[]}\n"));
}

#[test]
fn test_run_writes_nothing_on_failure() {
    let system = repo_with_config("  - directory: mock-rock/1.0\n    registries: [quay]\n")
        .with_env("GITHUB_OUTPUT", OUTPUT_PATH)
        .unwrap()
        .with_dir("/out")
        .unwrap();

    let err = run(&args(), &system).unwrap_err();
    assert_eq!(err.downcast_ref::<CiError>().unwrap().exit_code(), 2);
    assert!(!system.exists(Path::new(OUTPUT_PATH)));
}

#[test]
fn test_run_with_unwritable_output_fails() {
    let system = repo_with_config("")
        .with_env("GITHUB_OUTPUT", "/missing/github_output")
        .unwrap();

    let err = run(&args(), &system).unwrap_err();
    assert_eq!(err.downcast_ref::<CiError>().unwrap().exit_code(), 6);
}

#[test]
fn test_missing_config_file_fails() {
    let system = mock_repo();
    let err = generate_outputs(&args(), &system).unwrap_err();
    assert!(err.to_string().contains("Configuration file not found"));
}
