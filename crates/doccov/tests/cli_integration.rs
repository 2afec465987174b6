//! Integration tests that run the doccov binary

use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn doccov_bin() -> Command {
    // Use cargo to find the binary
    Command::new(env!("CARGO_BIN_EXE_doccov"))
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

/// A project where half of one file is documented.
fn half_covered_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let content: String = (1..=40).map(|i| format!("// line {i}\n")).collect();
    write(dir.path(), "src/api.ts", &content);
    write(
        dir.path(),
        "docrefs.json",
        r#"{ "owners": [ { "id": "n1", "title": "API", "sources": ["src/api.ts:1-20"] } ] }"#,
    );
    dir
}

#[test]
fn test_report_json_output() {
    let project = half_covered_project();

    let output = doccov_bin()
        .arg("report")
        .arg("--root")
        .arg(project.path())
        .arg("--format")
        .arg("json")
        .arg("--threshold")
        .arg("40")
        .output()
        .expect("Failed to run doccov");

    assert!(output.status.success(), "50% >= 40% threshold should pass");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let report: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON report");
    assert_eq!(report["summary"]["totalFiles"], 1);
    assert_eq!(report["summary"]["totalLines"], 40);
    assert_eq!(report["summary"]["coveredLines"], 20);
    assert_eq!(report["summary"]["coveragePercentage"], 50.0);
}

#[test]
fn test_report_exit_code_below_threshold() {
    let project = half_covered_project();

    let output = doccov_bin()
        .arg("report")
        .arg("--root")
        .arg(project.path())
        .output()
        .expect("Failed to run doccov");

    // 50% against the default 80% threshold
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_report_invalid_threshold_is_usage_error() {
    let project = half_covered_project();

    let output = doccov_bin()
        .arg("report")
        .arg("--root")
        .arg(project.path())
        .arg("--threshold")
        .arg("250")
        .output()
        .expect("Failed to run doccov");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("threshold"), "stderr: {stderr}");
}

#[test]
fn test_report_missing_store_degrades_to_vacuous_success() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "src/api.ts", "// one line\n");
    // No docrefs.json: the store is "unreachable" and the report is the
    // empty vacuous-100 one.

    let output = doccov_bin()
        .arg("report")
        .arg("--root")
        .arg(dir.path())
        .arg("--format")
        .arg("json")
        .output()
        .expect("Failed to run doccov");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let report: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON report");
    assert_eq!(report["summary"]["totalFiles"], 0);
    assert_eq!(report["summary"]["coveragePercentage"], 100.0);
}

#[test]
fn test_dry_run_lists_files() {
    let project = half_covered_project();
    // One file that discovery must preview as excluded
    write(project.path(), "src/api.test.ts", "// test\n");

    let output = doccov_bin()
        .arg("dry-run")
        .arg("--root")
        .arg(project.path())
        .output()
        .expect("Failed to run doccov");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("src/api.ts"), "stdout: {stdout}");
    assert!(stdout.contains("src/api.test.ts"), "stdout: {stdout}");
    assert!(stdout.contains("1 files would be analyzed"), "stdout: {stdout}");
}
