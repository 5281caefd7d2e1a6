//! Integration tests for the pageocr binary.
//!
//! None of these need OCR models or pdfium: they cover argument handling, empty inputs and
//! runs where every document is already complete.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

fn pageocr(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pageocr"))
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run pageocr binary")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_help_lists_commands() {
    let dir = tempdir().unwrap();
    let output = pageocr(&["--help"], dir.path());

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("process-dir"));
    assert!(stdout.contains("process-pdf"));
}

#[test]
fn test_process_dir_help_shows_options() {
    let dir = tempdir().unwrap();
    let output = pageocr(&["process-dir", "--help"], dir.path());

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for option in ["--langs", "--batch-size", "--time-profile", "--on-error", "--model-dir"] {
        assert!(stdout.contains(option), "missing {} in help", option);
    }
}

#[test]
fn test_process_dir_empty_input_succeeds() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in");
    let output_dir = dir.path().join("out");
    fs::create_dir_all(input.join("Invoices")).unwrap();

    let output = pageocr(&["process-dir", "in", "out"], dir.path());

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(!output_dir.exists() || fs::read_dir(&output_dir).unwrap().next().is_none());
}

#[test]
fn test_process_dir_skips_completed_without_models() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("in/Invoices")).unwrap();
    fs::write(dir.path().join("in/Invoices/a.pdf"), b"%PDF-1.4").unwrap();
    fs::create_dir_all(dir.path().join("out/Invoices")).unwrap();
    fs::write(dir.path().join("out/Invoices/a.json"), "[]").unwrap();

    // No models directory exists, so any attempt to load them would fail the run.
    let output = pageocr(
        &["process-dir", "in", "out", "--model-dir", "no-models"],
        dir.path(),
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(fs::read_to_string(dir.path().join("out/Invoices/a.json")).unwrap(), "[]");
}

#[test]
fn test_process_dir_missing_models_fails_even_with_continue() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("in/Invoices")).unwrap();
    fs::write(dir.path().join("in/Invoices/a.pdf"), b"%PDF-1.4").unwrap();

    let output = pageocr(
        &["process-dir", "in", "out", "--model-dir", "no-models", "--on-error", "continue"],
        dir.path(),
    );

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Model load error"));
    assert!(!dir.path().join("out/Invoices/a.json").exists());
}

#[test]
fn test_process_dir_rejects_zero_batch_size() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("in")).unwrap();

    let output = pageocr(&["process-dir", "in", "out", "--batch-size", "0"], dir.path());

    assert!(!output.status.success());
    assert!(stderr(&output).contains("batch_size"));
}

#[test]
fn test_process_dir_rejects_empty_languages() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("in")).unwrap();

    let output = pageocr(&["process-dir", "in", "out", "--langs", " , "], dir.path());

    assert!(!output.status.success());
    assert!(stderr(&output).contains("language"));
}

#[test]
fn test_process_dir_missing_input_fails() {
    let dir = tempdir().unwrap();
    let output = pageocr(&["process-dir", "missing", "out"], dir.path());

    assert!(!output.status.success());
    assert!(stderr(&output).contains("not a directory"));
}

#[test]
fn test_process_pdf_missing_file_fails() {
    let dir = tempdir().unwrap();
    let output = pageocr(&["process-pdf", "missing.pdf", "out.json"], dir.path());

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Input PDF not found"));
    assert!(!dir.path().join("out.json").exists());
}

#[test]
fn test_unknown_error_policy_rejected() {
    let dir = tempdir().unwrap();
    let output = pageocr(&["process-dir", "in", "out", "--on-error", "retry"], dir.path());

    assert!(!output.status.success());
}
