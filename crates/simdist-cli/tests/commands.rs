//! Integration tests for CLI commands.

use std::process::{Command, Output};

use tempfile::TempDir;

/// Runs the built binary with `args` and returns its output.
fn simdist(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_simdist"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("SIMDIST_MAX_TIER")
        .env_remove("SIMDIST_DISABLE")
        .output()
        .expect("run simdist")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_info_table() {
    let output = simdist(&["info"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Detected tiers"));
    assert!(text.contains("f32_dot"));
    assert!(text.contains("sparse_f16_sl2"));
}

#[test]
fn test_info_json() {
    let output = simdist(&["info", "--format", "json"]);
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(json["selected"].as_array().map(Vec::len), Some(26));
    assert!(
        json["detected"]
            .as_array()
            .expect("detected tiers")
            .contains(&"scalar".into())
    );
}

#[test]
fn test_eval_dense() {
    let output = simdist(&["eval", "f32_dot", "--a", "1,2,3,4,5", "--b", "5,4,3,2,1", "--format", "json"]);
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(json["operation"], "f32_dot");
    assert_eq!(json["result"], 35.0);
}

#[test]
fn test_eval_negative_values() {
    let output = simdist(&["eval", "f32-min-max", "--a", "-3,2,-1", "--format", "json"]);
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(json["result"]["min"], -3.0);
    assert_eq!(json["result"]["max"], 2.0);
}

#[test]
fn test_eval_from_input_file() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = temp_dir.path().join("operands.json");
    std::fs::write(&path, r#"{"a": "1:1,3:1,5:1", "b": "2:1,3:1,4:1"}"#).expect("write input");

    let output = simdist(&["eval", "sparse_dot", "--input", path.to_str().unwrap(), "--format", "json"]);
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(json["result"], 1.0);
}

#[test]
fn test_eval_quiet() {
    let output = simdist(&["eval", "binary_dot", "--a", "0b1010", "--b", "0b1100", "--quiet"]);
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_eval_errors() {
    let unknown = simdist(&["eval", "f64_dot", "--a", "1"]);
    assert!(!unknown.status.success());
    assert!(String::from_utf8_lossy(&unknown.stderr).contains("unknown operation"));

    let mismatch = simdist(&["eval", "f32_sl2", "--a", "1,2,3", "--b", "1,2"]);
    assert!(!mismatch.status.success());
    assert!(String::from_utf8_lossy(&mismatch.stderr).contains("length mismatch"));
}

#[test]
fn test_scalar_only_environment() {
    let output = Command::new(env!("CARGO_BIN_EXE_simdist"))
        .args(["info", "--format", "json"])
        .env("SIMDIST_MAX_TIER", "scalar")
        .output()
        .expect("run simdist");
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    for selection in json["selected"].as_array().expect("selections") {
        assert_eq!(selection["tier"], "scalar");
    }
}

#[test]
fn test_bench_json() {
    let output = simdist(&["bench", "--dims", "32", "--iters", "10", "--format", "json"]);
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(json[0]["tier"], "scalar");
}
