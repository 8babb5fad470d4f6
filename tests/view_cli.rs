//! End-to-end tests driving the viewer binary over fixture run directories.

mod common;

use common::{run_aview, stdout_text, write_file};
use serde_json::Value;
use tempfile::TempDir;

#[test]
fn intent_only_directory_renders_the_fixed_layout() {
    let dir = TempDir::new().expect("temp dir");
    write_file(&dir.path().join("intent.json"), r#"{"problem_spec": "x"}"#);

    let output = run_aview("view", dir.path());
    assert!(output.status.success());
    let stdout = stdout_text(&output);

    assert!(stdout.contains("== Intent =="));
    assert!(stdout.contains("problem_spec: x"));
    assert_eq!(stdout.matches("(absent)").count(), 8);
    assert!(!stdout.contains("Raw JSON:"));
}

#[test]
fn unparseable_artifact_degrades_and_signals_partial_success() {
    let dir = TempDir::new().expect("temp dir");
    write_file(&dir.path().join("intent.json"), r#"{"problem_spec": "x"}"#);
    write_file(&dir.path().join("ca.json"), r#"{"summary": "trunc"#);

    let output = run_aview("view", dir.path());
    assert_eq!(output.status.code(), Some(2));
    let stdout = stdout_text(&output);

    assert!(stdout.contains("== Build (cA) =="));
    assert!(stdout.contains("(unparseable JSON:"));
    // The rest of the layout still renders normally.
    assert!(stdout.contains("problem_spec: x"));
    assert!(stdout.contains("== Harness Report =="));
}

#[test]
fn pack_header_annotates_the_reasoning_panel() {
    let dir = TempDir::new().expect("temp dir");
    write_file(
        &dir.path().join("coga.json"),
        r#"{"summary": "s", "reasoning_pack": {"id": "rp1", "version": "2.0"}}"#,
    );

    let output = run_aview("view", dir.path());
    assert!(output.status.success());
    let stdout = stdout_text(&output);
    assert!(stdout.contains("== Reasoning (CogA) [pack: rp1 / 2.0] =="));
}

#[test]
fn fixture_badges_compare_receipt_against_replay() {
    let dir = TempDir::new().expect("temp dir");
    write_file(
        &dir.path().join("receipt.json"),
        r#"{"fixtures": [{"id": "f1", "hash": "abc"}, {"id": "f2", "hash": "eq"}]}"#,
    );
    write_file(
        &dir.path().join("replay_report.json"),
        r#"{"fixtures": [{"id": "f1", "hash": "xyz"}, {"id": "f2", "hash": "eq"}]}"#,
    );

    let output = run_aview("view", dir.path());
    assert!(output.status.success());
    let stdout = stdout_text(&output);
    assert!(stdout.contains("[mismatch] id=f1 hash=abc"));
    assert!(stdout.contains("[verified] id=f2 hash=eq"));
}

#[test]
fn single_file_input_renders_exactly_one_panel() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("verdicts.json");
    write_file(
        &path,
        r#"{"verdicts": [{"id": "v1", "status": "pass", "message": "ok"}]}"#,
    );

    let output = run_aview("view", &path);
    assert!(output.status.success());
    let stdout = stdout_text(&output);
    assert!(stdout.contains("== Verdicts =="));
    assert!(stdout.contains("id=v1 status=pass message=ok"));
    assert!(!stdout.contains("(absent)"));
    assert!(!stdout.contains("== Intent =="));
}

#[test]
fn json_mode_reports_all_slots_and_raw_files() {
    let dir = TempDir::new().expect("temp dir");
    write_file(
        &dir.path().join("verdicts.json"),
        r#"{"verdicts": [{"id": "v1", "status": "pass", "message": "ok"}]}"#,
    );
    write_file(&dir.path().join("notes.json"), r#"{"note": "scratch"}"#);

    let output = run_aview("json", dir.path());
    assert!(output.status.success());
    let report: Value = serde_json::from_str(&stdout_text(&output)).expect("valid json");

    assert_eq!(report["schema_version"], 1);
    let panels = report["panels"].as_array().expect("panels array");
    assert_eq!(panels.len(), 10);
    assert_eq!(panels[9]["title"], "Raw JSON: notes.json");
    assert_eq!(panels[9]["body"]["kind"], "raw");
    assert_eq!(panels[9]["body"]["value"]["note"], "scratch");

    let verdicts = panels
        .iter()
        .find(|panel| panel["title"] == "Verdicts")
        .expect("verdicts panel");
    assert_eq!(verdicts["sections"][0]["kind"], "verdicts");
    assert_eq!(verdicts["sections"][0]["entries"][0]["id"], "v1");
    assert_eq!(verdicts["sections"][0]["entries"][0]["status"], "pass");
}

#[test]
fn run_graph_timeline_lists_nodes_in_order() {
    let dir = TempDir::new().expect("temp dir");
    write_file(
        &dir.path().join("execution_receipt.json"),
        r#"{"steps": [{"id": "fetch", "status": "ok"}, {"status": "failed", "hash": "h2"}]}"#,
    );

    let output = run_aview("view", dir.path());
    assert!(output.status.success());
    let stdout = stdout_text(&output);
    assert!(stdout.contains("Run Steps:"));
    assert!(stdout.contains("- id=fetch status=ok hash= timestamp="));
    assert!(stdout.contains("- id= status=failed hash=h2 timestamp="));
}

#[test]
fn missing_input_path_fails_outright() {
    let dir = TempDir::new().expect("temp dir");
    let output = run_aview("view", &dir.path().join("missing"));
    assert!(!output.status.success());
    assert_ne!(output.status.code(), Some(2));
}

#[test]
fn identical_inputs_render_identically() {
    let dir = TempDir::new().expect("temp dir");
    write_file(
        &dir.path().join("receipt.json"),
        r#"{"timestamp": "t0", "versions": {"tool": {"requested": "^1", "resolved": "1.4"}}}"#,
    );

    let first = stdout_text(&run_aview("json", dir.path()));
    let second = stdout_text(&run_aview("json", dir.path()));
    assert_eq!(first, second);
    assert!(first.contains("$.versions.tool"));
}
