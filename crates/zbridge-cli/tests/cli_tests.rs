use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

const MESSAGE_ID: &str = "4f2a9c1e7b3d4e5fa6b7c8d9e0f1a2b3";

fn zbridge() -> Command {
    let mut cmd = Command::cargo_bin("zbridge").unwrap();
    cmd.env_remove("ZBRIDGE_MESSAGE_ID")
        .env_remove("ZBRIDGE_ROOT_TAG")
        .env("RUST_LOG", "info");
    cmd
}

#[test]
fn stdin_xml_to_stdout_json() {
    zbridge()
        .args(["--from", "xml", "--to", "json", "--message-id", MESSAGE_ID])
        .write_stdin(r#"<a x="1"><b>2</b></a>"#)
        .assert()
        .success()
        .stdout("{\n    \"a\": {\n        \"@x\": \"1\",\n        \"b\": 2\n    }\n}")
        .stderr(predicate::str::contains("transformation from XML to JSON was started"))
        .stderr(predicate::str::contains("4f2a9c1e-7b3d-4e5f-a6b7-c8d9e0f1a2b3"));
}

#[test]
fn file_json_to_xml_with_root_tag_from_env() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("order.json");
    let output = dir.path().join("order.xml");
    fs::write(&input, r#"{"id": 7, "item": ["a", "b"]}"#).unwrap();

    zbridge()
        .env("ZBRIDGE_MESSAGE_ID", MESSAGE_ID)
        .env("ZBRIDGE_ROOT_TAG", "Order")
        .arg(&input)
        .args(["--to", "xml", "--output"])
        .arg(&output)
        .assert()
        .success()
        .stdout("");

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        r#"<?xml version="1.0" encoding="utf-8"?><Order><id>7</id><item>a</item><item>b</item></Order>"#
    );
}

#[test]
fn unwrap_root_flag() {
    zbridge()
        .args([
            "--from",
            "xml",
            "--to",
            "json",
            "--unwrap-root",
            "--message-id",
            MESSAGE_ID,
        ])
        .write_stdin("<message><id>5</id></message>")
        .assert()
        .success()
        .stdout("{\n    \"id\": 5\n}");
}

#[test]
fn malformed_message_id_fails() {
    zbridge()
        .args(["--from", "xml", "--to", "json", "--message-id", "abc"])
        .write_stdin("<a>1</a>")
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("message id must be 32 hexadecimal characters"))
        .stderr(predicate::str::contains("Error in transformation"));
}

#[test]
fn malformed_xml_fails_without_output_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("broken.xml");
    let output = dir.path().join("out.json");
    fs::write(&input, "<a><b></a>").unwrap();

    zbridge()
        .arg(&input)
        .args(["--to", "json", "--message-id", MESSAGE_ID, "--output"])
        .arg(&output)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("mismatched closing tag"));

    assert!(!output.exists());
}

#[test]
fn no_audit_suppresses_records() {
    zbridge()
        .args([
            "--from",
            "json",
            "--to",
            "xml",
            "--no-audit",
            "--message-id",
            MESSAGE_ID,
        ])
        .write_stdin(r#"{"a": true}"#)
        .assert()
        .success()
        .stderr(predicate::str::contains("transformation").not());
}

#[test]
fn missing_format_is_reported() {
    zbridge()
        .args(["--to", "json", "--message-id", MESSAGE_ID])
        .write_stdin("<a/>")
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not infer input format"));
}

#[test]
fn same_format_is_rejected() {
    zbridge()
        .args(["--from", "json", "--to", "json", "--message-id", MESSAGE_ID])
        .write_stdin("{}")
        .assert()
        .failure()
        .stderr(predicate::str::contains("formats must differ"));
}

#[test]
fn missing_input_file_is_reported() {
    zbridge()
        .args(["missing.xml", "--to", "json", "--message-id", MESSAGE_ID])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read input file"))
        .stderr(predicate::str::contains("Error in transformation"));
}
