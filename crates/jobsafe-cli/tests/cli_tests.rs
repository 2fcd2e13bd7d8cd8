//! Integration tests for the JobSafe CLI
//!
//! These tests invoke the actual jobsafe-cli binary and verify:
//! - Exit codes (0 = accepted/success, 1 = rejected, 2 = error)
//! - stdout/stderr output
//! - JSON output format
//! - Classifier configuration files

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

// ── Helpers ───────────────────────────────────────────────

fn jobsafe_bin() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_BIN_EXE_jobsafe-cli"));
    if !path.exists() {
        path = PathBuf::from("target/debug/jobsafe-cli");
    }
    path
}

fn fixture_valid(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join(format!("../../tests/fixtures/contracts/valid/{}", name))
}

fn fixture_invalid(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join(format!("../../tests/fixtures/contracts/invalid/{}", name))
}

fn fixture_custom(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join(format!("../../tests/fixtures/contracts/custom/{}", name))
}

fn fixture_config(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(format!("../../tests/fixtures/config/{}", name))
}

fn run_jobsafe(args: &[&str]) -> std::process::Output {
    Command::new(jobsafe_bin())
        .args(args)
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to execute jobsafe-cli")
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).expect("should be valid JSON")
}

// ── Version ───────────────────────────────────────────────

#[test]
fn test_version_command() {
    let output = run_jobsafe(&["version"]);
    assert!(output.status.success(), "version should exit 0");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("jobsafe"));
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
    assert!(stdout.contains(&format!("(jobsafe-core {})", jobsafe_core::VERSION)));
}

#[test]
fn test_version_flag() {
    let output = run_jobsafe(&["--version"]);
    assert!(output.status.success(), "--version should exit 0");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

// ── Check ─────────────────────────────────────────────────

#[test]
fn test_check_valid_contract() {
    let output = run_jobsafe(&[
        "check",
        fixture_valid("standard-contract.txt").to_str().unwrap(),
    ]);
    assert!(output.status.success(), "valid contract should exit 0");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("CONTRACT ACCEPTED"));
    assert!(stdout.contains("H R D S S C B F T X X"));
}

#[test]
fn test_check_rejected_contract() {
    let output = run_jobsafe(&[
        "check",
        fixture_invalid("pay-before-duties.txt").to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(1), "rejected contract should exit 1");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("CONTRACT REJECTED"));
    assert!(stdout.contains("Unexpected token 'C'"));
    assert!(stdout.contains("'role'"));
}

#[test]
fn test_check_trace_flag() {
    let output = run_jobsafe(&[
        "check",
        "--trace",
        fixture_valid("standard-contract.txt").to_str().unwrap(),
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("PUSH: 'role_marker'"));
    assert!(stdout.contains("POP: 'pay_marker'"));
    assert!(stdout.contains("TRANSITION: term_clause --X--> accept"));
}

#[test]
fn test_check_json_valid() {
    let output = run_jobsafe(&[
        "check",
        "--json",
        fixture_valid("repeated-sections.txt").to_str().unwrap(),
    ]);
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["accepted"], true);
    assert_eq!(json["final_state"], "accept");
    assert_eq!(json["final_stack"], serde_json::json!([]));
    assert_eq!(json["tokens"], "H H R R D D S S C C B B F T T X X");
    assert!(json["rejection"].is_null());
    assert_eq!(json["fingerprint"].as_str().unwrap().len(), 64);
    assert_eq!(json["lines"][0]["line_number"], 1);
    assert_eq!(json["lines"][0]["symbol"], "H");
}

#[test]
fn test_check_json_incomplete() {
    let output = run_jobsafe(&[
        "check",
        "--json",
        fixture_invalid("missing-signatures.txt").to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(1));
    let json = stdout_json(&output);
    assert_eq!(json["accepted"], false);
    assert_eq!(json["rejection"]["reason"], "incomplete_contract");
    assert_eq!(json["rejection"]["state"], "term_clause");
}

#[test]
fn test_check_document_without_sections() {
    let output = run_jobsafe(&[
        "check",
        "--json",
        fixture_invalid("no-sections.txt").to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(1));
    let json = stdout_json(&output);
    assert_eq!(json["rejection"]["reason"], "empty_input");
    assert_eq!(json["tokens"], "");
}

#[test]
fn test_check_nonexistent_file() {
    let output = run_jobsafe(&["check", "nonexistent.txt"]);
    assert_eq!(output.status.code(), Some(2), "missing file should exit 2");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error"));
}

#[test]
fn test_check_quiet() {
    let output = run_jobsafe(&[
        "--quiet",
        "check",
        fixture_valid("standard-contract.txt").to_str().unwrap(),
    ]);
    assert!(output.status.success());
    assert!(output.stdout.is_empty(), "quiet mode should produce no stdout");

    let output = run_jobsafe(&[
        "--quiet",
        "check",
        fixture_invalid("pay-before-duties.txt").to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_check_reads_stdin() {
    let text = std::fs::read_to_string(fixture_valid("standard-contract.txt")).unwrap();
    let mut child = Command::new(jobsafe_bin())
        .args(["check", "--json", "-"])
        .env("NO_COLOR", "1")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn jobsafe-cli");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(text.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["accepted"], true);
}

// ── Configuration ─────────────────────────────────────────

#[test]
fn test_check_with_custom_rules() {
    let contract = fixture_custom("memorandum.txt");
    let config = fixture_config("memorandum.json");

    let output = run_jobsafe(&[
        "check",
        "--config",
        config.to_str().unwrap(),
        contract.to_str().unwrap(),
    ]);
    assert!(
        output.status.success(),
        "custom rules should accept: stdout={}",
        String::from_utf8_lossy(&output.stdout)
    );

    let output = run_jobsafe(&["check", contract.to_str().unwrap()]);
    assert_eq!(
        output.status.code(),
        Some(1),
        "standard rules should reject the memorandum"
    );
}

#[test]
fn test_verbose_logs_config_loading() {
    let output = Command::new(jobsafe_bin())
        .args([
            "-v",
            "rules",
            "--config",
            fixture_config("memorandum.json").to_str().unwrap(),
        ])
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to execute jobsafe-cli");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("loaded classifier config"), "stderr={}", stderr);
    assert!(stderr.contains("memorandum.json"));

    let quiet = run_jobsafe(&[
        "rules",
        "--config",
        fixture_config("memorandum.json").to_str().unwrap(),
    ]);
    let stderr = String::from_utf8_lossy(&quiet.stderr);
    assert!(!stderr.contains("loaded classifier config"));
}

#[test]
fn test_invalid_config_exits_2() {
    let output = run_jobsafe(&[
        "check",
        "--config",
        fixture_config("invalid-pattern.json").to_str().unwrap(),
        fixture_valid("standard-contract.txt").to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid pattern"));
}

#[test]
fn test_missing_config_exits_2() {
    let output = run_jobsafe(&[
        "rules",
        "--config",
        "does-not-exist.json",
    ]);
    assert_eq!(output.status.code(), Some(2));
}

// ── Classify ──────────────────────────────────────────────

#[test]
fn test_classify_text_output() {
    let output = run_jobsafe(&[
        "classify",
        fixture_invalid("pay-before-duties.txt").to_str().unwrap(),
    ]);
    assert!(output.status.success(), "classify always exits 0");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[C]"));
    assert!(stdout.contains("Compensation"));
    assert!(stdout.contains("Token stream: H R C B S F T X"));
}

#[test]
fn test_classify_json_output() {
    let output = run_jobsafe(&[
        "classify",
        "--json",
        fixture_valid("standard-contract.txt").to_str().unwrap(),
    ]);
    assert!(output.status.success());
    let json = stdout_json(&output);
    let lines = json.as_array().unwrap();
    assert_eq!(lines.len(), 11);
    assert_eq!(lines[1]["symbol"], "R");
    assert_eq!(lines[1]["line_number"], 5);
    assert_eq!(lines[1]["pattern"], "position");
}

// ── Validate ──────────────────────────────────────────────

#[test]
fn test_validate_accepts_full_stream() {
    let output = run_jobsafe(&["validate", "H R D S C B F T X"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("CONTRACT ACCEPTED"));
}

#[test]
fn test_validate_json_rejection() {
    let output = run_jobsafe(&["validate", "--json", "H,R,C,B"]);
    assert_eq!(output.status.code(), Some(1));
    let json = stdout_json(&output);
    assert_eq!(json["accepted"], false);
    assert_eq!(json["consumed"], 2);
    assert_eq!(json["rejection"]["reason"], "unexpected_token");
    assert_eq!(json["rejection"]["symbol"], "C");
    assert_eq!(json["rejection"]["expected"], serde_json::json!(["R", "D"]));
    let trace = json["trace"].as_array().unwrap();
    assert!(trace.last().unwrap().as_str().unwrap().starts_with("REJECT"));
}

#[test]
fn test_validate_empty_stream() {
    let output = run_jobsafe(&["validate", ""]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Empty token stream"));
}

#[test]
fn test_validate_unknown_symbol() {
    let output = run_jobsafe(&["validate", "H Q"]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown symbol"));
}

// ── Rules ─────────────────────────────────────────────────

#[test]
fn test_rules_lists_standard_table() {
    let output = run_jobsafe(&["rules"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("rank*"));
    assert!(stdout.contains("employment agreement"));
    assert!(stdout.contains("first 15 words"));
}

#[test]
fn test_rules_json_with_config() {
    let output = run_jobsafe(&[
        "rules",
        "--json",
        "--config",
        fixture_config("memorandum.json").to_str().unwrap(),
    ]);
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["truncation"]["threshold"], 30);
    assert_eq!(json["rules"][0]["symbol"], "H");
    assert_eq!(json["rules"][8]["patterns"][0]["regex"], true);
}

// ── Hash ──────────────────────────────────────────────────

#[test]
fn test_hash_is_sha256_hex() {
    let output = run_jobsafe(&[
        "hash",
        fixture_valid("standard-contract.txt").to_str().unwrap(),
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    assert_eq!(stdout.len(), 64);
    assert!(stdout.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_hash_matches_for_same_structure() {
    let a = run_jobsafe(&[
        "hash",
        fixture_valid("standard-contract.txt").to_str().unwrap(),
    ]);
    let b = run_jobsafe(&[
        "hash",
        fixture_valid("repeated-sections.txt").to_str().unwrap(),
    ]);
    let c = run_jobsafe(&[
        "hash",
        fixture_invalid("pay-before-duties.txt").to_str().unwrap(),
    ]);
    let a = String::from_utf8_lossy(&a.stdout).trim().to_string();
    let b = String::from_utf8_lossy(&b.stdout).trim().to_string();
    let c = String::from_utf8_lossy(&c.stdout).trim().to_string();
    assert_eq!(a, b, "same section structure should share a fingerprint");
    assert_ne!(a, c);
}

// ── Fixtures ──────────────────────────────────────────────

#[test]
fn test_all_valid_fixtures_accepted() {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../tests/fixtures/contracts/valid");
    for entry in std::fs::read_dir(&dir).unwrap() {
        let path = entry.unwrap().path();
        let output = run_jobsafe(&["check", path.to_str().unwrap()]);
        assert!(
            output.status.success(),
            "{} should be accepted: {}",
            path.display(),
            String::from_utf8_lossy(&output.stdout)
        );
    }
}

#[test]
fn test_all_invalid_fixtures_rejected() {
    let dir =
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../tests/fixtures/contracts/invalid");
    for entry in std::fs::read_dir(&dir).unwrap() {
        let path = entry.unwrap().path();
        let output = run_jobsafe(&["check", path.to_str().unwrap()]);
        assert_eq!(
            output.status.code(),
            Some(1),
            "{} should be rejected",
            path.display()
        );
    }
}

#[test]
fn test_cli_check_determinism_10_iterations() {
    let path = fixture_invalid("pay-before-duties.txt");
    let first = run_jobsafe(&["check", "--json", path.to_str().unwrap()]);
    for i in 0..10 {
        let output = run_jobsafe(&["check", "--json", path.to_str().unwrap()]);
        assert_eq!(first.stdout, output.stdout, "Non-determinism at iteration {}", i);
    }
}
