//! CLI integration tests for the describe-openapi binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("describe-openapi"))
}

// Helper to create a temp descriptor file
fn write_temp_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

mod convert_command {
    use super::*;

    #[test]
    fn basic_convert() {
        let dir = TempDir::new().unwrap();
        let descriptor = write_temp_file(
            &dir,
            "user.json",
            r#"{
                "type": "object",
                "fields": {
                    "name": { "type": "string", "tests": [{ "name": "min", "params": { "min": 3 } }] },
                    "bio": { "type": "string", "optional": true }
                }
            }"#,
        );

        cmd()
            .args(["convert", descriptor.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""required":["name"]"#))
            .stdout(predicate::str::contains(r#""minLength":3"#));
    }

    #[test]
    fn convert_with_pretty() {
        let dir = TempDir::new().unwrap();
        let descriptor = write_temp_file(&dir, "flag.json", r#"{"type":"boolean"}"#);

        cmd()
            .args(["convert", descriptor.to_str().unwrap(), "--pretty"])
            .assert()
            .success()
            // Pretty output has newlines and indentation
            .stdout(predicate::str::contains("{\n"));
    }

    #[test]
    fn convert_with_output_file() {
        let dir = TempDir::new().unwrap();
        let descriptor = write_temp_file(&dir, "tags.json", r#"{"type":"array"}"#);
        let output = dir.path().join("output.json");

        cmd()
            .args([
                "convert",
                descriptor.to_str().unwrap(),
                "--output",
                output.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::is_empty());

        let content = fs::read_to_string(&output).unwrap();
        assert!(content.contains(r#""type":"array""#));
    }

    #[test]
    fn convert_explicit_defaults() {
        let dir = TempDir::new().unwrap();
        let descriptor = write_temp_file(&dir, "count.json", r#"{"type":"number","default":0}"#);

        cmd()
            .args(["convert", descriptor.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("default").not());

        cmd()
            .args(["convert", descriptor.to_str().unwrap(), "--explicit-defaults"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""default":0"#));
    }

    #[test]
    fn convert_float_fallback() {
        let dir = TempDir::new().unwrap();
        let descriptor = write_temp_file(&dir, "price.json", r#"{"type":"number"}"#);

        cmd()
            .args(["convert", descriptor.to_str().unwrap(), "--float-fallback"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""format":"float""#));
    }

    #[test]
    fn convert_unsupported_kind_exits_2() {
        let dir = TempDir::new().unwrap();
        let descriptor = write_temp_file(&dir, "pair.json", r#"{"type":"tuple"}"#);

        cmd()
            .args(["convert", descriptor.to_str().unwrap()])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("unsupported kind \"tuple\""));
    }

    #[test]
    fn convert_invalid_json_exits_2() {
        let dir = TempDir::new().unwrap();
        let descriptor = write_temp_file(&dir, "broken.json", "{ nope");

        cmd()
            .args(["convert", descriptor.to_str().unwrap()])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("invalid JSON"));
    }

    #[test]
    fn convert_missing_file_exits_3() {
        cmd()
            .args(["convert", "/nonexistent/descriptor.json"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("file not found"));
    }
}

mod lint_command {
    use super::*;

    #[test]
    fn lint_clean_directory() {
        let dir = TempDir::new().unwrap();
        write_temp_file(&dir, "a.json", r#"{"type":"string","tests":[{"name":"email"}]}"#);

        cmd()
            .args(["lint", dir.path().to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("all passed"));
    }

    #[test]
    fn lint_errors_exit_1() {
        let dir = TempDir::new().unwrap();
        write_temp_file(&dir, "bad.json", r#"{"type":"set"}"#);

        cmd()
            .args(["lint", dir.path().to_str().unwrap()])
            .assert()
            .code(1)
            .stdout(predicate::str::contains("E002"));
    }

    #[test]
    fn lint_warnings_pass_unless_strict() {
        let dir = TempDir::new().unwrap();
        write_temp_file(
            &dir,
            "when.json",
            r#"{"type":"date","tests":[{"name":"max","params":{"max":"2030-01-01"}}]}"#,
        );

        cmd()
            .args(["lint", dir.path().to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("W001"));

        cmd()
            .args(["lint", dir.path().to_str().unwrap(), "--strict"])
            .assert()
            .code(1);
    }

    #[test]
    fn lint_json_output() {
        let dir = TempDir::new().unwrap();
        write_temp_file(&dir, "ok.json", r#"{"type":"boolean"}"#);

        let output = cmd()
            .args(["lint", dir.path().to_str().unwrap(), "--format", "json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(parsed["files_checked"], 1);
        assert_eq!(parsed["results"][0]["status"], "ok");
    }

    #[test]
    fn lint_missing_path_exits_2() {
        cmd()
            .args(["lint", "/nonexistent/dir"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("path not found"));
    }
}
