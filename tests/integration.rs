use std::fs;
use std::path::Path;
use std::process::Command;

use serde_json::Value;

const GRAPH_JSON: &str = r#"{
  "nodes": [
    {"id": "person:ada", "category": "person", "radius": 2.0, "activity": 0.8},
    {"id": "person:grace", "category": "person", "activity": 0.3},
    {"id": "meeting:standup", "category": "meeting"},
    {"id": "doc:roadmap", "category": "document", "radius": 1.5},
    {"id": "task:ship", "category": "task", "fixed": true, "position": [10.0, 0.0, -4.0]}
  ],
  "edges": [
    {"source": "person:ada", "target": "meeting:standup"},
    {"source": "person:grace", "target": "meeting:standup", "strength": 0.5},
    {"source": "doc:roadmap", "target": "task:ship", "rest_length": 4.0},
    {"source": "doc:roadmap", "target": "deleted:node"}
  ]
}"#;

const GRAPH_YAML: &str = "\
nodes:
  - id: a
    position: [0.0, 0.0, 0.0]
    fixed: true
  - id: b
    position: [0.5, 0.0, 0.0]
    fixed: true
  - id: c
    position: [0.0, 0.0, 0.5]
    fixed: true
  - id: far
    position: [50.0, 0.0, 0.0]
    fixed: true
";

fn constellation(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_constellation"))
        .args(args)
        .output()
        .expect("Failed to execute constellation")
}

fn write_fixture(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, contents).expect("Failed to write fixture");
    path.to_str().unwrap().to_string()
}

#[test]
fn layout_prints_positions_and_bounds() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path(), "graph.json", GRAPH_JSON);

    let output = constellation(&["layout", "--input", &input, "--strategy", "grid"]);
    assert!(output.status.success(), "constellation exited with error");

    let json: Value = serde_json::from_slice(&output.stdout).expect("stdout is not JSON");
    let positions = json["positions"].as_object().unwrap();
    assert_eq!(positions.len(), 5);
    assert_eq!(json["positions"]["task:ship"], serde_json::json!([10.0, 0.0, -4.0]));
    assert!(json["bounds"]["min"].is_array());
    assert!(json["bounds"]["center"].is_array());
}

#[test]
fn layout_is_deterministic_and_writes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path(), "graph.json", GRAPH_JSON);
    let first = dir.path().join("first.json");
    let second = dir.path().join("second.json");

    for out in [&first, &second] {
        let output = constellation(&[
            "layout",
            "--input",
            &input,
            "--strategy",
            "force",
            "--output",
            out.to_str().unwrap(),
        ]);
        assert!(output.status.success());
        assert!(output.stdout.is_empty());
    }

    let a = fs::read_to_string(&first).unwrap();
    let b = fs::read_to_string(&second).unwrap();
    assert_eq!(a, b);
}

#[test]
fn run_reports_final_frame() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path(), "graph.json", GRAPH_JSON);

    let output = constellation(&[
        "run",
        "--input",
        &input,
        "--ticks",
        "40",
        "--focus",
        "person:ada",
    ]);
    assert!(output.status.success(), "constellation exited with error");

    let frame: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(frame["iteration"], 40);
    assert_eq!(frame["active"], true);
    assert_eq!(frame["camera_mode"]["mode"], "focused");
    assert_eq!(frame["camera_mode"]["node"], "person:ada");
    assert_eq!(frame["positions"]["task:ship"], serde_json::json!([10.0, 0.0, -4.0]));
}

#[test]
fn run_expands_requested_cluster_from_yaml_with_config() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path(), "graph.yaml", GRAPH_YAML);
    let config = write_fixture(
        dir.path(),
        "engine.yaml",
        "cluster:\n  cluster_distance: 2.0\n  min_cluster_size: 3\n  expand_radius: 4.0\n",
    );

    let output = constellation(&[
        "run",
        "--input",
        &input,
        "--config",
        &config,
        "--ticks",
        "1",
        "--expand",
        "cluster:a",
    ]);
    assert!(output.status.success(), "constellation exited with error");

    let frame: Value = serde_json::from_slice(&output.stdout).unwrap();
    let clusters = frame["clusters"].as_array().unwrap();
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0]["state"], "expanded");
    assert_eq!(clusters[0]["cluster"]["id"], "cluster:a");
    assert_eq!(clusters[0]["members"].as_array().unwrap().len(), 3);
    assert_eq!(frame["standalone"], serde_json::json!(["far"]));
}

#[test]
fn missing_input_fails_with_context() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");

    let output = constellation(&["layout", "--input", missing.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read graph"), "stderr: {stderr}");
}

#[test]
fn unsupported_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path(), "graph.toml", "nodes = []");

    let output = constellation(&["layout", "--input", &input]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unsupported format"), "stderr: {stderr}");
}
