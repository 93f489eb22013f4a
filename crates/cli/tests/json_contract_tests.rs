// Integration tests enforcing the `itacv` stdout and exit-code contract.
//
// These tests guarantee that stdout from --json commands is:
//   1. Valid JSON
//   2. Exactly one JSON value (no extra lines, no banners, no log output)
//   3. The correct shape for its command type
// and that exit codes follow the registry in src/exit_codes.rs.
//
// Run with: cargo test -p itacv-cli --test json_contract_tests -- --nocapture

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn itacv() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_itacv"));
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"));
    cmd.env_remove("ITACV_SCHEMA");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../compare/tests/fixtures")
        .join(name)
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

/// Assert stdout is a single, parseable JSON value with no extra lines.
fn assert_single_json(stdout: &str) -> serde_json::Value {
    let trimmed = stdout.trim();
    assert!(!trimmed.is_empty(), "stdout should not be empty");

    serde_json::from_str(trimmed).unwrap_or_else(|e| {
        panic!("stdout must be valid JSON.\nParse error: {}\nstdout:\n{}", e, trimmed)
    })
}

fn code(output: &Output) -> i32 {
    output.status.code().expect("process exited by signal")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Matching line items and totals for `cross-check.schema.toml`.
const MATCHING_DOCX: &str = r#"{
  "energy_usage": {
    "electricity_cost": "$10.00",
    "gas_cost": "$20.00",
    "water_cost": "$30.50",
    "total_cost": "$60.50"
  }
}"#;

const MATCHING_EXCEL: &str = r#"{
  "energy_usage": {
    "electricity_cost": 10,
    "gas_cost": 20,
    "water_cost": 30.5,
    "Total Cost": 61
  }
}"#;

fn write_pair(dir: &Path, docx: &str, excel: &str) -> (PathBuf, PathBuf) {
    let docx_path = dir.join("report.json");
    let excel_path = dir.join("template.json");
    std::fs::write(&docx_path, docx).unwrap();
    std::fs::write(&excel_path, excel).unwrap();
    (docx_path, excel_path)
}

// ===========================================================================
// itacv compare --json
// ===========================================================================

#[test]
fn compare_json_fixture_shape_and_mismatch_exit() {
    let output = itacv()
        .args([
            "compare",
            path_arg(&fixture("report.docx.json")),
            path_arg(&fixture("template.excel.json")),
            "--json",
        ])
        .output()
        .expect("itacv compare --json");

    assert_eq!(code(&output), 3, "stderr: {}", stderr(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let val = assert_single_json(&stdout);

    assert_eq!(val["meta"]["schema_name"], "ITAC assessment");
    assert_eq!(val["overall"]["counts"]["total"], 31);
    assert_eq!(val["overall"]["counts"]["mismatches"], 2);
    assert_eq!(val["overall"]["totals_reconcile"], true);
    assert!(val["sections"]["general_info"]["fields"].is_array());
    assert!(val["overall"]["cross_check"]["cross_side"].is_object());
    assert_eq!(val["unclaimed"]["excel"]["general_info"][0], "Lead Assessor");

    let err = stderr(&output);
    assert!(err.contains("no_of_employees: mismatch"), "stderr: {err}");
    assert!(err.contains("error: mismatches found"), "stderr: {err}");
}

#[test]
fn compare_without_json_keeps_stdout_empty() {
    let output = itacv()
        .args([
            "compare",
            path_arg(&fixture("report.docx.json")),
            path_arg(&fixture("template.excel.json")),
            "-vv",
        ])
        .output()
        .unwrap();

    assert_eq!(code(&output), 3);
    assert!(output.stdout.is_empty(), "human summary and logs belong on stderr");
    let err = stderr(&output);
    assert!(err.contains("overall: 31 fields"), "stderr: {err}");
    assert!(err.contains("unclaimed docx keys in general_info: assessment_date"), "stderr: {err}");
    assert!(err.contains("unclaimed excel keys in general_info: Lead Assessor"), "stderr: {err}");
}

#[test]
fn compare_matching_pair_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let (docx, excel) = write_pair(dir.path(), MATCHING_DOCX, MATCHING_EXCEL);

    let output = itacv()
        .args([
            "compare",
            path_arg(&docx),
            path_arg(&excel),
            "--schema",
            path_arg(&fixture("cross-check.schema.toml")),
            "--json",
        ])
        .output()
        .unwrap();

    assert_eq!(code(&output), 0, "stderr: {}", stderr(&output));
    let val = assert_single_json(&String::from_utf8_lossy(&output.stdout));
    assert_eq!(val["overall"]["counts"]["matches"], 4);
    assert_eq!(val["overall"]["cross_check"]["docx"]["reconciles"], true);
    assert_eq!(val["overall"]["cross_check"]["excel"]["reconciles"], true);
    assert_eq!(val["unclaimed"]["docx"], serde_json::json!({}));
}

#[test]
fn compare_tolerance_flag_overrides_schema() {
    let dir = tempfile::tempdir().unwrap();
    let (docx, excel) = write_pair(dir.path(), MATCHING_DOCX, MATCHING_EXCEL);

    let output = itacv()
        .args([
            "compare",
            path_arg(&docx),
            path_arg(&excel),
            "--schema",
            path_arg(&fixture("cross-check.schema.toml")),
            "--tolerance",
            "0.005",
            "--json",
        ])
        .output()
        .unwrap();

    assert_eq!(code(&output), 3);
    let val = assert_single_json(&String::from_utf8_lossy(&output.stdout));
    assert_eq!(val["meta"]["tolerance"], 0.005);
    assert_eq!(val["overall"]["totals_reconcile"], false);
}

#[test]
fn compare_missing_only_needs_strict_to_fail() {
    let dir = tempfile::tempdir().unwrap();
    let docx_no_total = r#"{"energy_usage": {"electricity_cost": 10, "gas_cost": 20, "water_cost": 30.5}}"#;
    let excel_no_total = r#"{"energy_usage": {"electricity_cost": 10, "gas_cost": 20, "water_cost": 30.5, "total_cost": 60.5}}"#;
    let (docx, excel) = write_pair(dir.path(), docx_no_total, excel_no_total);
    let schema = fixture("cross-check.schema.toml");

    let lenient = itacv()
        .args(["compare", path_arg(&docx), path_arg(&excel), "--schema", path_arg(&schema)])
        .output()
        .unwrap();
    assert_eq!(code(&lenient), 0, "stderr: {}", stderr(&lenient));
    assert!(stderr(&lenient).contains("total_cost: missing_in_docx"));

    let strict = itacv()
        .args([
            "compare",
            path_arg(&docx),
            path_arg(&excel),
            "--schema",
            path_arg(&schema),
            "--strict",
        ])
        .output()
        .unwrap();
    assert_eq!(code(&strict), 4);
}

#[test]
fn compare_output_file_matches_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let (docx, excel) = write_pair(dir.path(), MATCHING_DOCX, MATCHING_EXCEL);
    let out = dir.path().join("result.json");

    let output = itacv()
        .args([
            "compare",
            path_arg(&docx),
            path_arg(&excel),
            "--schema",
            path_arg(&fixture("cross-check.schema.toml")),
            "--json",
            "--output",
            path_arg(&out),
        ])
        .output()
        .unwrap();

    assert_eq!(code(&output), 0);
    let written = std::fs::read_to_string(&out).unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(written.trim(), stdout.trim());
}

// ===========================================================================
// Error exits
// ===========================================================================

#[test]
fn invalid_schema_exits_5() {
    let dir = tempfile::tempdir().unwrap();
    let (docx, excel) = write_pair(dir.path(), MATCHING_DOCX, MATCHING_EXCEL);
    let schema = dir.path().join("empty.toml");
    std::fs::write(&schema, "name = \"empty\"\nfields = []\n").unwrap();

    let output = itacv()
        .args(["compare", path_arg(&docx), path_arg(&excel), "--schema", path_arg(&schema), "--json"])
        .output()
        .unwrap();

    assert_eq!(code(&output), 5);
    assert!(output.stdout.is_empty());
    assert!(stderr(&output).contains("error: schema declares no fields"));
}

#[test]
fn malformed_extraction_exits_6() {
    let dir = tempfile::tempdir().unwrap();
    let (docx, excel) = write_pair(dir.path(), "{not json", MATCHING_EXCEL);

    let output = itacv()
        .args(["compare", path_arg(&docx), path_arg(&excel)])
        .output()
        .unwrap();

    assert_eq!(code(&output), 6);
    let err = stderr(&output);
    assert!(err.contains("extraction parse error"), "stderr: {err}");
    assert!(err.contains("hint:"), "stderr: {err}");
}

#[test]
fn unreadable_extraction_exits_6() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");

    let output = itacv()
        .args(["compare", path_arg(&missing), path_arg(&fixture("template.excel.json"))])
        .output()
        .unwrap();

    assert_eq!(code(&output), 6);
}

#[test]
fn negative_tolerance_exits_2() {
    let output = itacv()
        .args([
            "compare",
            path_arg(&fixture("report.docx.json")),
            path_arg(&fixture("template.excel.json")),
            "--tolerance=-0.5",
        ])
        .output()
        .unwrap();

    assert_eq!(code(&output), 2);
    assert!(stderr(&output).contains("tolerance must be a finite non-negative number"));
}

// ===========================================================================
// itacv schema
// ===========================================================================

#[test]
fn schema_validate_reports_fields() {
    let output = itacv()
        .args(["schema", "validate", path_arg(&fixture("cross-check.schema.toml"))])
        .output()
        .unwrap();

    assert_eq!(code(&output), 0, "stderr: {}", stderr(&output));
    let err = stderr(&output);
    assert!(err.contains("valid: schema 'Cross-check' with 4 field(s)"), "stderr: {err}");
    assert!(err.contains("total: total_cost"), "stderr: {err}");
}

#[test]
fn schema_validate_rejects_duplicate_fields() {
    let dir = tempfile::tempdir().unwrap();
    let schema = dir.path().join("dup.toml");
    std::fs::write(
        &schema,
        r#"
name = "dup"

[[fields]]
name = "sic_no"
section = "general_info"
kind = "numeric"
docx_keys = ["sic_no"]
excel_keys = ["sic_no"]

[[fields]]
name = "sic_no"
section = "general_info"
kind = "numeric"
docx_keys = ["sic_no"]
excel_keys = ["SIC No."]
"#,
    )
    .unwrap();

    let output = itacv().args(["schema", "validate", path_arg(&schema)]).output().unwrap();
    assert_eq!(code(&output), 5);
    assert!(stderr(&output).contains("duplicate field name: 'sic_no'"));
}

#[test]
fn schema_show_prints_builtin_toml() {
    let output = itacv().args(["schema", "show"]).output().unwrap();
    assert_eq!(code(&output), 0);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("name = \"ITAC assessment\""));
    assert!(stdout.contains("[[fields]]"));
}

#[test]
fn schema_show_json_is_single_value() {
    let output = itacv().args(["schema", "show", "--json"]).output().unwrap();
    assert_eq!(code(&output), 0);

    let val = assert_single_json(&String::from_utf8_lossy(&output.stdout));
    assert_eq!(val["name"], "ITAC assessment");
    assert_eq!(val["tolerance"], 0.01);
    assert_eq!(val["fields"].as_array().unwrap().len(), 31);
    assert_eq!(val["fields"][0]["name"], "sic_no");
}
