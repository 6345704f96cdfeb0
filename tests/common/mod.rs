//! Shared test helpers for integration tests
//!
//! This module provides common utilities used across all test files.

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use tempfile::TempDir;

/// Helper to get a sut command
pub fn sut() -> Command {
    Command::new(cargo::cargo_bin!("sut"))
}

/// Helper to create a test project in a temp directory
pub fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    sut().current_dir(tmp.path()).arg("init").assert().success();
    tmp
}

/// Helper to set a budget parameter on an assessment
pub fn set_param(tmp: &TempDir, assessment: &str, name: &str, value: &str) {
    sut()
        .current_dir(tmp.path())
        .args(["param", "set", name, value, "--assessment", assessment])
        .assert()
        .success();
}

/// Helper to commit the budget of an assessment
pub fn save_assessment(tmp: &TempDir, assessment: &str) {
    sut()
        .current_dir(tmp.path())
        .args(["assess", "save", "--assessment", assessment])
        .assert()
        .success();
}
