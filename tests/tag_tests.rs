//! Image name and tag derivation tests

mod common;

use common::*;
use rockmatrix::error::CiError;
use rockmatrix::matrix::image_name_and_tag;
use rockmatrix::metadata::Workspace;
use std::io;
use std::sync::{Arc, Mutex};

/// Log sink shared between the subscriber and the test
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn name_and_tag(directory: &str, base_override: Option<&str>) -> anyhow::Result<(String, String)> {
    let system = mock_repo();
    let workspace = Workspace::new(&system, REPO_ROOT);
    image_name_and_tag(&workspace, directory, base_override)
}

#[test]
fn test_name_and_tag_from_build_base() {
    assert_eq!(
        name_and_tag("mock-rock/1.0", None).unwrap(),
        ("mock-rock".to_owned(), "1.0-24.04_edge".to_owned())
    );
    assert_eq!(
        name_and_tag("another-rock/2.0", None).unwrap(),
        ("another-rock".to_owned(), "2.0-24.04_edge".to_owned())
    );
}

#[test]
fn test_devel_build_base() {
    assert_eq!(
        name_and_tag("devel-rock/1.0", None).unwrap(),
        ("devel-rock".to_owned(), "1.0-devel_edge".to_owned())
    );
}

#[test]
fn test_non_bare_base_is_used_directly() {
    assert_eq!(
        name_and_tag("jammy-rock/3.1", None).unwrap(),
        ("jammy-rock".to_owned(), "3.1-22.04_edge".to_owned())
    );
}

#[test]
fn test_invalid_base_should_fail() {
    let err = name_and_tag("invalid-rock/1.0", None).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Base 'ubuntu:noble'"));
    assert!(message.contains("'invalid-rock/1.0/rockcraft.yaml'"));
    assert!(message.contains("does not match the expected pattern"));
    assert_eq!(err.downcast_ref::<CiError>().unwrap().exit_code(), 3);
}

#[test]
fn test_latest_version_warns() {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let result = tracing::subscriber::with_default(subscriber, || {
        name_and_tag("latest-rock/latest", None)
    });

    assert_eq!(
        result.unwrap(),
        ("latest-rock".to_owned(), "latest-24.04_edge".to_owned())
    );
    let logs = buffer.contents();
    assert!(logs.contains("WARN"));
    assert!(logs.contains("Using 'latest' as version for 'latest-rock/latest'"));
}

#[test]
fn test_regular_version_does_not_warn() {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, || name_and_tag("mock-rock/1.0", None))
        .unwrap();

    assert!(!buffer.contents().contains("WARN"));
}

#[test]
fn test_base_override_replaces_bare_build_base() {
    assert_eq!(
        name_and_tag("mock-rock/1.0", Some("ubuntu@22.04")).unwrap(),
        ("mock-rock".to_owned(), "1.0-22.04_edge".to_owned())
    );
}

#[test]
fn test_invalid_base_override_should_fail() {
    let err = name_and_tag("mock-rock/1.0", Some("ubuntu:noble")).unwrap_err();
    assert!(err.to_string().contains("Base 'ubuntu:noble'"));
}

// The override only applies to bare rocks; a rock with a concrete base keeps it
#[test]
fn test_base_override_ignored_for_non_bare_base() {
    assert_eq!(
        name_and_tag("jammy-rock/3.1", Some("ubuntu@24.04")).unwrap(),
        ("jammy-rock".to_owned(), "3.1-22.04_edge".to_owned())
    );
}

#[test]
fn test_bare_base_without_build_base_should_fail() {
    let system = mock_repo()
        .with_file(
            "/repo/bare-rock/1.0/rockcraft.yaml",
            b"name: bare-rock\nversion: '1.0'\nbase: bare\n",
        )
        .unwrap();
    let workspace = Workspace::new(&system, REPO_ROOT);

    let err = image_name_and_tag(&workspace, "bare-rock/1.0", None).unwrap_err();
    assert!(err.to_string().contains("requires a build-base"));
    assert_eq!(err.downcast_ref::<CiError>().unwrap().exit_code(), 5);
}

#[test]
fn test_malformed_metadata_should_fail() {
    let system = mock_repo()
        .with_file("/repo/broken-rock/1.0/rockcraft.yaml", b"name: broken-rock\n")
        .unwrap();
    let workspace = Workspace::new(&system, REPO_ROOT);

    let err = image_name_and_tag(&workspace, "broken-rock/1.0", None).unwrap_err();
    assert!(
        err.to_string()
            .contains("Failed to parse 'broken-rock/1.0/rockcraft.yaml'")
    );
}
