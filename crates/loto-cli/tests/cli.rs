use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::tempdir;

fn write(dir: &std::path::Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn simple_graphs_json() -> &'static str {
    r#"{
        "steam": {
            "nodes": [
                {"id": "S", "is_source": true},
                {"id": "V", "is_isolation_point": true},
                {"id": "T", "tag": "asset"}
            ],
            "edges": [
                {"from": "S", "to": "V", "is_isolation_point": true},
                {"from": "V", "to": "T"}
            ]
        }
    }"#
}

fn empty_rules_json() -> &'static str {
    r#"{"domain_rules": [], "verification_rules": []}"#
}

#[test]
fn plan_produces_an_isolation_plan() {
    let dir = tempdir().unwrap();
    let graphs = write(dir.path(), "graphs.json", simple_graphs_json());
    let rules = write(dir.path(), "rules.json", empty_rules_json());
    let out = dir.path().join("plan.json");

    Command::cargo_bin("loto-cli")
        .unwrap()
        .args([
            "plan",
            "--graphs",
            graphs.to_str().unwrap(),
            "--asset",
            "asset",
            "--rules",
            rules.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
        ])
        .assert()
        .success();

    let written: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert!(written["actions"].as_array().unwrap().len() >= 1);
}

#[test]
fn apply_writes_resulting_graph_state() {
    let dir = tempdir().unwrap();
    let graphs = write(dir.path(), "graphs.json", simple_graphs_json());
    let rules = write(dir.path(), "rules.json", empty_rules_json());
    // Disable node splitting so the emitted cut names a real edge in this
    // graph ("steam:S->V") rather than a synthetic "V_in->V_out" pair.
    let config = write(dir.path(), "config.json", r#"{"node_split": false}"#);
    let plan_out = dir.path().join("plan.json");

    Command::cargo_bin("loto-cli")
        .unwrap()
        .args([
            "plan",
            "--graphs",
            graphs.to_str().unwrap(),
            "--asset",
            "asset",
            "--rules",
            rules.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
            "-o",
            plan_out.to_str().unwrap(),
        ])
        .assert()
        .success();

    let applied_out = dir.path().join("applied.json");
    Command::cargo_bin("loto-cli")
        .unwrap()
        .args([
            "apply",
            "--plan",
            plan_out.to_str().unwrap(),
            "--graphs",
            graphs.to_str().unwrap(),
            "-o",
            applied_out.to_str().unwrap(),
        ])
        .assert()
        .success();

    let written: Value = serde_json::from_str(&fs::read_to_string(&applied_out).unwrap()).unwrap();
    assert_eq!(written["steam"]["nodes"].as_array().unwrap().len(), 3);
    assert_eq!(written["steam"]["edges"].as_array().unwrap().len(), 1);
}

#[test]
fn simulate_runs_and_reports_stimuli() {
    let dir = tempdir().unwrap();
    let graphs = write(dir.path(), "graphs.json", simple_graphs_json());
    let out = dir.path().join("report.json");

    Command::cargo_bin("loto-cli")
        .unwrap()
        .args([
            "simulate",
            "--graphs",
            graphs.to_str().unwrap(),
            "--stimuli",
            "ESD_RESET",
            "--seed",
            "7",
            "-o",
            out.to_str().unwrap(),
        ])
        .assert()
        .success();

    let written: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(written["seed"], 7);
    assert_eq!(written["results"].as_array().unwrap().len(), 1);
}

#[test]
fn evaluate_reports_unit_impact() {
    let dir = tempdir().unwrap();
    let isolated = r#"{
        "steam": {
            "nodes": [
                {"id": "S", "is_source": true},
                {"id": "T", "tag": "asset"}
            ],
            "edges": [
                {"from": "S", "to": "T", "state": "closed"}
            ]
        }
    }"#;
    let graphs = write(dir.path(), "graphs.json", isolated);
    let units = write(
        dir.path(),
        "units.json",
        r#"{
            "asset_units": {"T": "UNIT1"},
            "unit_data": {"UNIT1": {"rated_mw": 50.0, "scheme": "SPOF"}},
            "unit_areas": {"UNIT1": "AREA1"}
        }"#,
    );
    let out = dir.path().join("impact.json");

    Command::cargo_bin("loto-cli")
        .unwrap()
        .args([
            "evaluate",
            "--graphs",
            graphs.to_str().unwrap(),
            "--units",
            units.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
        ])
        .assert()
        .success();

    let written: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(written["unavailable_assets"], serde_json::json!(["T"]));
    assert_eq!(written["unit_mw_delta"]["UNIT1"], 50.0);
}

#[test]
fn approve_reaches_ready_after_two_distinct_users() {
    let dir = tempdir().unwrap();
    let gate = dir.path().join("gate.json");

    Command::cargo_bin("loto-cli")
        .unwrap()
        .args(["approve", "--gate", gate.to_str().unwrap(), "--user", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pending"));

    Command::cargo_bin("loto-cli")
        .unwrap()
        .args(["approve", "--gate", gate.to_str().unwrap(), "--user", "bob"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ready"));
}
