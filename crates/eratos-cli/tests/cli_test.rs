use assert_cmd::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn repo_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("expected crates/<name> layout")
        .to_path_buf()
}

fn fixture(name: &str) -> String {
    repo_root()
        .join("fixtures")
        .join("sdf")
        .join(name)
        .to_string_lossy()
        .to_string()
}

fn run_json(args: &[&str]) -> Value {
    let exe = assert_cmd::cargo_bin!("eratos-cli");
    let out = Command::new(exe).args(args).output().expect("run eratos-cli");
    assert!(
        out.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    serde_json::from_slice(&out.stdout).expect("stdout is JSON")
}

#[test]
fn normalize_drops_dangling_links_and_rounds_importance() {
    let doc = run_json(&["normalize", &fixture("attack.json")]);
    let attack = &doc["events"][0];
    let children = attack["children"].as_array().unwrap();
    assert_eq!(children.len(), 2);
    assert_eq!(children[1]["importance"], 0.123);

    let provenance: Vec<&str> = doc["provenanceData"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["provenanceID"].as_str().unwrap())
        .collect();
    assert_eq!(provenance, ["prov1", "prov2"]);
    assert_eq!(doc["@id"], "cmu:Schema/attack");
}

#[test]
fn validate_reports_the_raw_document() {
    let report = run_json(&["validate", &fixture("attack.json")]);
    assert!(!report.as_array().unwrap().is_empty());

    let tmp = tempfile::tempdir().expect("tempdir");
    let clean = tmp.path().join("clean.json");
    let normalized = run_json(&["normalize", &fixture("attack.json")]);
    fs::write(&clean, normalized.to_string()).expect("write normalized");
    let report = run_json(&["validate", clean.to_string_lossy().as_ref()]);
    assert_eq!(report, Value::Array(vec![]));
}

#[test]
fn project_emits_nodes_edges_and_warnings() {
    let graph = run_json(&[
        "project",
        "--catalog",
        &fixture("primitives.json"),
        "--summary",
        &fixture("summaries.json"),
        &fixture("attack.json"),
    ]);
    let nodes = graph["nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), 6);

    let node = |suffix: &str| {
        nodes
            .iter()
            .find(|n| n["id"].as_str().unwrap().ends_with(suffix))
            .unwrap()
    };
    let codes = |n: &Value| -> Vec<String> {
        n["warnings"]
            .as_array()
            .unwrap()
            .iter()
            .map(|w| w["code"].as_str().unwrap().to_string())
            .collect()
    };
    assert_eq!(codes(node("/Strike")), ["missing-explanation"]);
    assert_eq!(
        codes(node("/Report")),
        ["unknown-type", "missing-description", "missing-explanation"]
    );
    assert_eq!(node("/Report")["category"], "graphg");
    assert_eq!(node("/Plan")["category"], "matched");
    assert_eq!(codes(node("/Target")), ["duplicate-entity-type"]);

    let edges = graph["edges"].as_array().unwrap();
    let coref: Vec<&Value> = edges.iter().filter(|e| e["kind"] == "coreference").collect();
    assert_eq!(coref.len(), 1);
    assert_eq!(coref[0]["provenance"], "prov1");
}

#[test]
fn layout_reads_yaml_config_and_sizes() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let sizes = tmp.path().join("sizes.json");
    fs::write(
        &sizes,
        r#"{"cmu:Schema/attack/Entities/n1/Attacker": {"width": 220, "height": 40}}"#,
    )
    .expect("write sizes");

    let out = run_json(&[
        "layout",
        "--config",
        &fixture("layout.yaml"),
        "--sizes",
        sizes.to_string_lossy().as_ref(),
        "--expand-all",
        &fixture("attack.json"),
    ]);
    let nodes = out["layout"]["nodes"].as_object().unwrap();
    assert_eq!(nodes.len(), 6);
    let attacker = &nodes["cmu:Schema/attack/Entities/n1/Attacker"];
    assert_eq!(attacker["width"], 220.0);
    assert_eq!(out["layout"]["regions"].as_array().unwrap().len(), 4);

    let visibility = out["visibility"].as_object().unwrap();
    assert!(!visibility.is_empty());
    assert!(visibility.values().all(|v| v == true));
}

#[test]
fn reads_stdin_when_no_path_is_given() {
    let exe = assert_cmd::cargo_bin!("eratos-cli");
    let out = assert_cmd::Command::new(exe)
        .arg("normalize")
        .write_stdin(r#"{"@id": "d", "events": [{"@id": "a", "name": "a"}]}"#)
        .output()
        .expect("run eratos-cli");
    assert!(out.status.success());
    let doc: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(doc["events"][0]["@id"], "a");
}

#[test]
fn malformed_input_and_bad_flags_fail() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let bad = tmp.path().join("bad.json");
    fs::write(&bad, r#"{"events": []}"#).expect("write bad input");

    let exe = assert_cmd::cargo_bin!("eratos-cli");
    Command::new(&exe)
        .args(["normalize", bad.to_string_lossy().as_ref()])
        .assert()
        .code(1);

    Command::new(&exe).args(["--bogus"]).assert().code(2);
}
