//! End-to-end CLI tests using the scripted recognizer, so no OCR service
//! or camera is needed.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn docsnap() -> Command {
    Command::cargo_bin("docsnap").expect("binary builds")
}

fn write_test_image(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("pan.png");
    image::RgbaImage::new(64, 64)
        .save(&path)
        .expect("test image saves");
    path
}

#[test]
fn test_capture_then_reveal_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let image_path = write_test_image(&dir);
    let records = dir.path().join("records.json");

    docsnap()
        .args([
            "capture",
            "--image",
            image_path.to_str().unwrap(),
            "--user",
            "user@example.com",
            "--shift",
            "3",
            "--records",
            records.to_str().unwrap(),
            "--mock-text",
            "ABCDE1234F",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Document field stored!"));

    // Letters shifted by 3, digits unchanged.
    let stored = std::fs::read_to_string(&records).unwrap();
    assert!(stored.contains("pan_card"));
    assert!(stored.contains("DEFGH1234I"));
    assert!(!stored.contains("ABCDE1234F"), "raw value must not be stored");

    docsnap()
        .args([
            "reveal",
            "--user",
            "user@example.com",
            "--shift",
            "3",
            "--records",
            records.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("ABCDE1234F"));
}

#[test]
fn test_undetected_field_fails_with_data_error() {
    let dir = tempfile::tempdir().unwrap();
    let image_path = write_test_image(&dir);
    let records = dir.path().join("records.json");

    docsnap()
        .args([
            "capture",
            "--image",
            image_path.to_str().unwrap(),
            "--user",
            "user@example.com",
            "--shift",
            "3",
            "--records",
            records.to_str().unwrap(),
            "--mock-text",
            "blurry nonsense",
        ])
        .assert()
        .failure()
        .code(65)
        .stderr(predicate::str::contains("not detected"));

    assert!(!records.exists(), "failed run must not create a record");
}

#[test]
fn test_unknown_doc_type_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let image_path = write_test_image(&dir);

    docsnap()
        .args([
            "capture",
            "--image",
            image_path.to_str().unwrap(),
            "--user",
            "user@example.com",
            "--shift",
            "3",
            "--doc-type",
            "bogus",
            "--mock-text",
            "ABCDE1234F",
        ])
        .assert()
        .failure()
        .code(64)
        .stderr(predicate::str::contains("unknown document type"));
}

#[test]
fn test_missing_image_is_input_error() {
    let dir = tempfile::tempdir().unwrap();

    docsnap()
        .args([
            "capture",
            "--image",
            dir.path().join("absent.png").to_str().unwrap(),
            "--user",
            "user@example.com",
            "--shift",
            "3",
            "--mock-text",
            "ABCDE1234F",
        ])
        .assert()
        .failure()
        .code(66)
        .stderr(predicate::str::contains("Failed to read image"));
}

#[test]
fn test_reveal_unknown_user_fails() {
    let dir = tempfile::tempdir().unwrap();
    let records = dir.path().join("records.json");

    docsnap()
        .args([
            "reveal",
            "--user",
            "nobody@example.com",
            "--shift",
            "3",
            "--records",
            records.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no record stored"));
}
