//! Descriptor linting - static analysis of descriptor files.
//!
//! Checks descriptor files for:
//! - JSON syntax errors
//! - Descriptors that cannot be converted (unsupported kinds, malformed entries)
//! - Rules the converter will drop without a trace

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::infer::{is_mapped_rule, is_truthy};
use crate::loader::{escape_segment, load_json, parse_descriptor, pointer};
use crate::schema::{DefaultSpec, DefaultValue, Schema, Shape};

/// Rules that express presence, which the converter reads from the
/// nullable and optional flags instead.
const PRESENCE_RULES: &[&str] = &["required", "defined", "nullable", "optional"];

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single diagnostic message from linting.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: String,
    pub file: PathBuf,
    /// JSON path to the issue (e.g., "/fields/name/tests/0")
    pub path: String,
    pub message: String,
}

/// Result of linting a single file.
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub file: PathBuf,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

/// Status of a linted file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Ok,
    Error,
    Warning,
}

/// Result of linting a directory or set of files.
#[derive(Debug, Clone, Serialize)]
pub struct LintResult {
    pub path: PathBuf,
    pub files_checked: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub warnings: usize,
    pub results: Vec<FileResult>,
}

impl LintResult {
    /// Returns true if all files passed (no errors).
    pub fn is_ok(&self) -> bool {
        self.errors == 0
    }
}

/// Lint a file or directory.
///
/// If path is a directory, recursively finds all .json files.
/// If `strict` is true, warnings are treated as errors.
/// Returns aggregated results for all files.
pub fn lint(path: &Path, strict: bool) -> LintResult {
    let files = collect_descriptor_files(path);
    let mut results = Vec::new();
    let mut total_errors = 0;
    let mut total_warnings = 0;

    for file in &files {
        let file_result = lint_file(file, path);
        total_errors += count(&file_result, Severity::Error);
        total_warnings += count(&file_result, Severity::Warning);
        results.push(file_result);
    }

    let failed = results
        .iter()
        .filter(|r| {
            if strict {
                r.status != FileStatus::Ok
            } else {
                r.status == FileStatus::Error
            }
        })
        .count();

    LintResult {
        path: path.to_path_buf(),
        files_checked: files.len(),
        passed: files.len() - failed,
        failed,
        errors: total_errors,
        warnings: total_warnings,
        results,
    }
}

/// Lint a single descriptor file.
pub fn lint_file(file: &Path, base_path: &Path) -> FileResult {
    let mut diagnostics = Vec::new();
    let display_file = file.strip_prefix(base_path).unwrap_or(file).to_path_buf();

    let value = match load_json(file) {
        Ok(v) => v,
        Err(e) => {
            diagnostics.push(error(file, "E001", "/".to_string(), format!("syntax error: {}", e)));
            return FileResult {
                file: display_file,
                status: FileStatus::Error,
                diagnostics,
            };
        }
    };

    match parse_descriptor(&value) {
        Ok(schema) => check_node(&schema, file, "", &mut diagnostics),
        Err(e) => {
            let path = e.pointer().unwrap_or("/").to_string();
            diagnostics.push(error(file, "E002", path, e.to_string()));
        }
    }

    let has_errors = diagnostics.iter().any(|d| d.severity == Severity::Error);
    let has_warnings = diagnostics.iter().any(|d| d.severity == Severity::Warning);

    let status = if has_errors {
        FileStatus::Error
    } else if has_warnings {
        FileStatus::Warning
    } else {
        FileStatus::Ok
    };

    FileResult {
        file: display_file,
        status,
        diagnostics,
    }
}

/// Recursively check a node and its children.
fn check_node(schema: &Schema, file: &Path, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    // Nothing below a lazy node is converted.
    if let Shape::Lazy(_) = schema.shape {
        return;
    }

    check_rules(schema, file, path, diagnostics);
    check_default(schema, file, path, diagnostics);

    match &schema.shape {
        Shape::Object(fields) => {
            for (name, field) in fields {
                let child_path = format!("{}/fields/{}", path, escape_segment(name));
                check_node(field, file, &child_path, diagnostics);
            }
        }
        Shape::Array(Some(inner)) => {
            let child_path = format!("{}/innerType", path);
            check_node(inner, file, &child_path, diagnostics);
        }
        _ => {}
    }
}

/// Flag rules that no conversion step reads.
fn check_rules(schema: &Schema, file: &Path, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    let kind = schema.kind();

    for (i, rule) in schema.descriptor.rules.iter().enumerate() {
        let rule_path = format!("{}/tests/{}", path, i);
        match rule.name.as_deref() {
            None => diagnostics.push(warning(
                file,
                "W002",
                rule_path,
                "rule has no name and is skipped".to_string(),
            )),
            Some(name) if PRESENCE_RULES.contains(&name) || is_mapped_rule(kind, name) => {}
            Some(name) => diagnostics.push(warning(
                file,
                "W001",
                rule_path,
                format!("rule \"{}\" has no OpenAPI mapping for {} nodes", name, kind),
            )),
        }
    }
}

/// Flag literal defaults that the truthy presence policy drops.
///
/// Object and array nodes never emit a default, so only scalars are checked.
fn check_default(schema: &Schema, file: &Path, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    if let Shape::Object(_) | Shape::Array(_) = schema.shape {
        return;
    }
    if let Some(DefaultSpec::Value(DefaultValue::Json(value))) = &schema.descriptor.default {
        if !is_truthy(value) {
            diagnostics.push(warning(
                file,
                "W003",
                format!("{}/default", path),
                format!(
                    "default {} is dropped unless explicit default presence is enabled",
                    value
                ),
            ));
        }
    }
}

fn error(file: &Path, code: &str, path: String, message: String) -> Diagnostic {
    Diagnostic {
        severity: Severity::Error,
        code: code.to_string(),
        file: file.to_path_buf(),
        path,
        message,
    }
}

fn warning(file: &Path, code: &str, path: String, message: String) -> Diagnostic {
    Diagnostic {
        severity: Severity::Warning,
        code: code.to_string(),
        file: file.to_path_buf(),
        path: pointer(&path),
        message,
    }
}

fn count(result: &FileResult, severity: Severity) -> usize {
    result
        .diagnostics
        .iter()
        .filter(|d| d.severity == severity)
        .count()
}

/// Collect all .json files in a path (file or directory).
fn collect_descriptor_files(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            return vec![path.to_path_buf()];
        }
        return vec![];
    }

    let mut files = Vec::new();
    collect_files_recursive(path, &mut files);
    files.sort();
    files
}

fn collect_files_recursive(dir: &Path, files: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files_recursive(&path, files);
        } else if path.extension().map(|e| e == "json").unwrap_or(false) {
            files.push(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn lint_str(content: &str) -> FileResult {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        lint_file(file.path(), file.path().parent().unwrap())
    }

    #[test]
    fn lint_valid_descriptor() {
        let result = lint_str(
            r#"{
                "type": "object",
                "fields": {
                    "email": { "type": "string", "tests": [{ "name": "email" }, { "name": "required" }] },
                    "age": { "type": "number", "tests": [{ "name": "integer" }, { "name": "min", "params": { "min": 0 } }] }
                }
            }"#,
        );
        assert_eq!(result.status, FileStatus::Ok);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn lint_invalid_json_syntax() {
        let result = lint_str("{ not valid json }");
        assert_eq!(result.status, FileStatus::Error);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].code, "E001");
    }

    #[test]
    fn lint_unsupported_kind() {
        let result = lint_str(r#"{ "type": "object", "fields": { "pair": { "type": "tuple" } } }"#);
        assert_eq!(result.status, FileStatus::Error);
        assert_eq!(result.diagnostics[0].code, "E002");
        assert_eq!(result.diagnostics[0].path, "/fields/pair");
    }

    #[test]
    fn lint_unmapped_rule() {
        let result = lint_str(
            r#"{ "type": "date", "tests": [{ "name": "min", "params": { "min": "2020-01-01" } }] }"#,
        );
        assert_eq!(result.status, FileStatus::Warning);
        assert_eq!(result.diagnostics[0].code, "W001");
        assert_eq!(result.diagnostics[0].path, "/tests/0");
        assert!(result.diagnostics[0].message.contains("date"));
    }

    #[test]
    fn lint_unnamed_rule() {
        let result = lint_str(
            r#"{ "type": "array", "innerType": { "type": "string", "tests": [{ "params": {} }] } }"#,
        );
        assert_eq!(result.status, FileStatus::Warning);
        assert_eq!(result.diagnostics[0].code, "W002");
        assert_eq!(result.diagnostics[0].path, "/innerType/tests/0");
    }

    #[test]
    fn lint_falsy_default() {
        let result = lint_str(r#"{ "type": "number", "default": 0 }"#);
        assert_eq!(result.status, FileStatus::Warning);
        assert_eq!(result.diagnostics[0].code, "W003");
        assert_eq!(result.diagnostics[0].path, "/default");
    }

    #[test]
    fn lint_falsy_default_only_on_scalars() {
        let result = lint_str(
            r#"{ "type": "object", "default": null, "fields": {
                "tags": { "type": "array", "default": null },
                "count": { "type": "number", "default": 0 }
            } }"#,
        );
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].code, "W003");
        assert_eq!(result.diagnostics[0].path, "/fields/count/default");
    }

    #[test]
    fn lint_paths_escape_field_names() {
        let result = lint_str(
            r#"{ "type": "object", "fields": {
                "a/b": { "type": "string", "tests": [{ "name": "trim" }] }
            } }"#,
        );
        assert_eq!(result.diagnostics[0].code, "W001");
        assert_eq!(result.diagnostics[0].path, "/fields/a~1b/tests/0");

        let result = lint_str(r#"{ "type": "object", "fields": { "x~y": { "type": "set" } } }"#);
        assert_eq!(result.diagnostics[0].code, "E002");
        assert_eq!(result.diagnostics[0].path, "/fields/x~0y");
    }

    #[test]
    fn lint_skips_lazy_nodes() {
        let result = lint_str(r#"{ "type": "lazy", "tests": [{ "name": "whatever" }] }"#);
        assert_eq!(result.status, FileStatus::Ok);
    }

    #[test]
    fn lint_directory() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("ok.json"), r#"{ "type": "string" }"#).unwrap();
        fs::write(dir.path().join("bad.json"), r#"{ "type": "set" }"#).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(
            dir.path().join("nested").join("warn.json"),
            r#"{ "type": "boolean", "default": false }"#,
        )
        .unwrap();

        let result = lint(dir.path(), false);
        assert_eq!(result.files_checked, 3);
        assert_eq!(result.failed, 1);
        assert_eq!(result.passed, 2);
        assert_eq!(result.errors, 1);
        assert_eq!(result.warnings, 1);
        assert!(!result.is_ok());
    }

    #[test]
    fn lint_strict_mode() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("warn.json"),
            r#"{ "type": "string", "default": "" }"#,
        )
        .unwrap();

        let result = lint(dir.path(), false);
        assert_eq!(result.failed, 0);
        assert!(result.is_ok());

        let result = lint(dir.path(), true);
        assert_eq!(result.failed, 1);
    }
}
