// CLI integration tests for parse/fetch flows that need no network.
use std::io::Write;
use std::process::{Command, Stdio};

use serde_json::{Value, json};

fn cmd() -> Command {
    let exe = env!("CARGO_BIN_EXE_backbone");
    Command::new(exe)
}

fn parse_json(output: &[u8]) -> Value {
    let text = std::str::from_utf8(output).expect("utf8");
    serde_json::from_str(text.trim()).expect("valid json")
}

#[test]
fn parse_reads_payload_file() {
    let temp = tempfile::tempdir().expect("tempdir");
    let input = temp.path().join("payload.json");
    std::fs::write(
        &input,
        r#"{"dd":"hola","juancarlos":"value","n":42,"rows":[{"k":1}],"flag":true}"#,
    )
    .expect("write");

    let output = cmd()
        .args(["parse", "--field", "dd", "--field", "n", "--field", "flag"])
        .args(["--list-field", "rows", "--input"])
        .arg(&input)
        .output()
        .expect("parse");
    assert!(output.status.success());
    assert_eq!(
        parse_json(&output.stdout),
        json!({"dd": "hola", "n": "42", "rows": [{"k": 1}]})
    );
}

#[test]
fn parse_reads_stdin_and_reports_levels() {
    let mut child = cmd()
        .args(["parse", "--field", "uri", "--pointer", "/page/items/0", "--levels"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(br#"{"page":{"items":[{"uri":"http://localhost/v/1"}]}}"#)
        .expect("write stdin");
    let output = child.wait_with_output().expect("wait");
    assert!(output.status.success());

    let value = parse_json(&output.stdout);
    assert_eq!(value["attributes"], json!({"uri": "http://localhost/v/1"}));
    assert_eq!(
        value["levels"],
        json!([
            {"name": "uri", "level": 0, "kind": "text"},
            {"name": "url", "level": 1, "kind": "text"},
        ])
    );
}

#[test]
fn parse_rejects_non_object_payload() {
    let temp = tempfile::tempdir().expect("tempdir");
    let input = temp.path().join("payload.json");
    std::fs::write(&input, r#""just a string""#).expect("write");

    let output = cmd()
        .args(["parse", "--field", "dd", "--input"])
        .arg(&input)
        .output()
        .expect("parse");
    assert_eq!(output.status.code(), Some(3));
    let err = parse_json(&output.stderr);
    assert_eq!(err["error"]["message"], "payload is not a json object");
    assert_eq!(err["error"]["kind"], "Parsing");
}

#[test]
fn fetch_rejects_invalid_url_without_network() {
    let output = cmd()
        .args(["fetch", "not a url", "--field", "dd"])
        .output()
        .expect("fetch");
    assert_eq!(output.status.code(), Some(2));
    let stderr = std::str::from_utf8(&output.stderr).expect("utf8");
    assert_eq!(stderr.lines().count(), 1, "stderr: {stderr}");
    let err = parse_json(&output.stderr);
    assert_eq!(err["error"]["kind"], "InvalidUrl");
    assert!(output.stdout.is_empty());
}
