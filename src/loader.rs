//! Descriptor loading from files, strings and JSON values.
//!
//! Reads the JSON form of a validation library's `describe()` output:
//!
//! ```json
//! {
//!   "type": "string",
//!   "label": "Name",
//!   "meta": { "title": "Name", "description": "Display name" },
//!   "tests": [{ "name": "matches", "params": { "regex": { "$regex": "^[a-z]+$" } } }],
//!   "oneOf": [],
//!   "nullable": false,
//!   "optional": true,
//!   "default": { "$date": "2024-01-01T00:00:00Z" }
//! }
//! ```
//!
//! `fields` (object) and `innerType` (array) hold child descriptors. Two
//! tagged forms stand in for values JSON cannot carry: `{"$regex": .., "$flags": ..}`
//! for a pattern parameter and `{"$date": ..}` for a date default.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::DescriptorError;
use crate::schema::{
    DefaultSpec, DefaultValue, Descriptor, LazySchema, Meta, Param, Params, Pattern, Rule,
    Schema, Shape,
};
use crate::types::{json_type_name, Kind};

/// Tag key of a pattern parameter.
pub const REGEX_TAG: &str = "$regex";
/// Tag key of pattern flags, next to [`REGEX_TAG`].
pub const FLAGS_TAG: &str = "$flags";
/// Tag key of a date default.
pub const DATE_TAG: &str = "$date";

/// Load a descriptor from a file path.
///
/// # Errors
///
/// Returns `DescriptorError::FileNotFound` if the file doesn't exist,
/// `DescriptorError::InvalidJson` if the file isn't valid JSON, or a
/// descriptor error if the JSON isn't a valid descriptor.
pub fn load_descriptor(path: &Path) -> Result<Schema, DescriptorError> {
    let value = load_json(path)?;
    parse_descriptor(&value)
}

/// Load a descriptor from a JSON string.
///
/// # Errors
///
/// Returns `DescriptorError::InvalidJson` if the string isn't valid JSON,
/// or a descriptor error if the JSON isn't a valid descriptor.
pub fn load_descriptor_str(content: &str) -> Result<Schema, DescriptorError> {
    let value: Value =
        serde_json::from_str(content).map_err(|source| DescriptorError::InvalidJson { source })?;
    parse_descriptor(&value)
}

/// Read a file as JSON without interpreting it.
pub fn load_json(path: &Path) -> Result<Value, DescriptorError> {
    if !path.exists() {
        return Err(DescriptorError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| DescriptorError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| DescriptorError::InvalidJson { source })
}

/// Build a schema tree from a descriptor value.
///
/// # Errors
///
/// Returns `DescriptorError::UnsupportedKind` for a `type` outside the known
/// kinds, and `DescriptorError::InvalidDescriptor` or
/// `DescriptorError::InvalidDate` for malformed entries. Errors carry the
/// JSON pointer of the offending entry.
pub fn parse_descriptor(value: &Value) -> Result<Schema, DescriptorError> {
    parse_node(value, "")
}

/// Render a pointer, using `/` for the root.
pub fn pointer(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}

/// Escape a key for use as one JSON pointer segment (`~` as `~0`, `/` as `~1`).
pub fn escape_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

// --- Internal implementation ---

fn parse_node(value: &Value, path: &str) -> Result<Schema, DescriptorError> {
    let map = value
        .as_object()
        .ok_or_else(|| invalid(path, format!("expected object, got {}", json_type_name(value))))?;

    let kind_name = match map.get("type") {
        Some(Value::String(s)) => s,
        Some(other) => {
            return Err(invalid(
                &format!("{}/type", path),
                format!("expected string, got {}", json_type_name(other)),
            ))
        }
        None => return Err(invalid(path, "missing \"type\"")),
    };
    let kind = Kind::parse(kind_name).ok_or_else(|| DescriptorError::UnsupportedKind {
        path: pointer(path),
        kind: kind_name.clone(),
    })?;

    let descriptor = parse_common(map, path)?;
    let shape = match kind {
        Kind::Mixed => Shape::Mixed,
        Kind::Lazy => Shape::Lazy(LazySchema::unresolved()),
        Kind::Array => Shape::Array(parse_inner_type(map, path)?),
        Kind::Object => Shape::Object(parse_fields(map, path)?),
        Kind::Boolean => Shape::Boolean,
        Kind::Number => Shape::Number,
        Kind::String => Shape::String,
        Kind::Date => Shape::Date,
    };

    Ok(Schema { descriptor, shape })
}

fn parse_common(map: &Map<String, Value>, path: &str) -> Result<Descriptor, DescriptorError> {
    Ok(Descriptor {
        rules: parse_tests(map.get("tests"), &format!("{}/tests", path))?,
        one_of: parse_one_of(map.get("oneOf"), &format!("{}/oneOf", path))?,
        meta: parse_meta(map.get("meta"), &format!("{}/meta", path))?,
        label: optional_string(map.get("label"), &format!("{}/label", path))?,
        nullable: flag(map.get("nullable"), &format!("{}/nullable", path))?,
        optional: flag(map.get("optional"), &format!("{}/optional", path))?,
        default: parse_default(map.get("default"), &format!("{}/default", path))?,
    })
}

fn parse_fields(
    map: &Map<String, Value>,
    path: &str,
) -> Result<Vec<(String, Schema)>, DescriptorError> {
    let fields_path = format!("{}/fields", path);
    let fields = match map.get("fields") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Object(fields)) => fields,
        Some(other) => {
            return Err(invalid(
                &fields_path,
                format!("expected object, got {}", json_type_name(other)),
            ))
        }
    };

    let mut result = Vec::with_capacity(fields.len());
    for (name, field) in fields {
        let field_path = format!("{}/{}", fields_path, escape_segment(name));
        result.push((name.clone(), parse_node(field, &field_path)?));
    }
    Ok(result)
}

fn parse_inner_type(
    map: &Map<String, Value>,
    path: &str,
) -> Result<Option<Box<Schema>>, DescriptorError> {
    match map.get("innerType") {
        None | Some(Value::Null) => Ok(None),
        Some(inner) => {
            let inner_path = format!("{}/innerType", path);
            Ok(Some(Box::new(parse_node(inner, &inner_path)?)))
        }
    }
}

fn parse_tests(value: Option<&Value>, path: &str) -> Result<Vec<Rule>, DescriptorError> {
    let tests = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(tests)) => tests,
        Some(other) => {
            return Err(invalid(
                path,
                format!("expected array, got {}", json_type_name(other)),
            ))
        }
    };

    let mut rules = Vec::with_capacity(tests.len());
    for (i, test) in tests.iter().enumerate() {
        let test_path = format!("{}/{}", path, i);
        let Some(test) = test.as_object() else {
            return Err(invalid(
                &test_path,
                format!("expected object, got {}", json_type_name(test)),
            ));
        };

        let name = optional_string(test.get("name"), &format!("{}/name", test_path))?;
        let params = parse_params(test.get("params"), &format!("{}/params", test_path))?;
        rules.push(Rule { name, params });
    }
    Ok(rules)
}

fn parse_params(value: Option<&Value>, path: &str) -> Result<Params, DescriptorError> {
    let params = match value {
        None | Some(Value::Null) => return Ok(Params::new()),
        Some(Value::Object(params)) => params,
        Some(other) => {
            return Err(invalid(
                path,
                format!("expected object, got {}", json_type_name(other)),
            ))
        }
    };

    let mut result = Params::new();
    for (key, param) in params {
        let param_path = format!("{}/{}", path, escape_segment(key));
        result.insert(key.clone(), parse_param(param, &param_path)?);
    }
    Ok(result)
}

fn parse_param(value: &Value, path: &str) -> Result<Param, DescriptorError> {
    let Some(map) = value.as_object() else {
        return Ok(Param::Value(value.clone()));
    };
    let Some(source) = map.get(REGEX_TAG) else {
        return Ok(Param::Value(value.clone()));
    };

    let source = source.as_str().ok_or_else(|| {
        invalid(
            &format!("{}/{}", path, REGEX_TAG),
            format!("expected string, got {}", json_type_name(source)),
        )
    })?;
    let flags = optional_string(map.get(FLAGS_TAG), &format!("{}/{}", path, FLAGS_TAG))?;

    Ok(Param::Pattern(Pattern::with_flags(
        source,
        flags.unwrap_or_default(),
    )))
}

fn parse_one_of(value: Option<&Value>, path: &str) -> Result<Vec<Value>, DescriptorError> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(values)) => Ok(values.clone()),
        Some(other) => Err(invalid(
            path,
            format!("expected array, got {}", json_type_name(other)),
        )),
    }
}

fn parse_meta(value: Option<&Value>, path: &str) -> Result<Option<Meta>, DescriptorError> {
    let meta = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Object(meta)) => meta,
        Some(other) => {
            return Err(invalid(
                path,
                format!("expected object, got {}", json_type_name(other)),
            ))
        }
    };

    // Other meta keys are application data and are not documented.
    Ok(Some(Meta {
        title: optional_string(meta.get("title"), &format!("{}/title", path))?,
        description: optional_string(
            meta.get("description"),
            &format!("{}/description", path),
        )?,
    }))
}

fn parse_default(
    value: Option<&Value>,
    path: &str,
) -> Result<Option<DefaultSpec>, DescriptorError> {
    let Some(value) = value else {
        return Ok(None);
    };

    let date = value.as_object().and_then(|map| map.get(DATE_TAG));
    let default = match date {
        Some(Value::String(text)) => {
            let parsed = DateTime::parse_from_rfc3339(text).map_err(|source| {
                DescriptorError::InvalidDate {
                    path: pointer(path),
                    value: text.clone(),
                    source,
                }
            })?;
            DefaultValue::Date(parsed.with_timezone(&Utc))
        }
        Some(other) => {
            return Err(invalid(
                &format!("{}/{}", path, DATE_TAG),
                format!("expected string, got {}", json_type_name(other)),
            ))
        }
        None => DefaultValue::Json(value.clone()),
    };

    Ok(Some(DefaultSpec::Value(default)))
}

fn optional_string(value: Option<&Value>, path: &str) -> Result<Option<String>, DescriptorError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(invalid(
            path,
            format!("expected string, got {}", json_type_name(other)),
        )),
    }
}

fn flag(value: Option<&Value>, path: &str) -> Result<bool, DescriptorError> {
    match value {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(invalid(
            path,
            format!("expected boolean, got {}", json_type_name(other)),
        )),
    }
}

fn invalid(path: &str, message: impl Into<String>) -> DescriptorError {
    DescriptorError::InvalidDescriptor {
        path: pointer(path),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn parses_scalar_descriptor() {
        let schema = parse_descriptor(&json!({
            "type": "string",
            "label": "Name",
            "meta": { "title": "Full name", "description": "Display name", "extra": 1 },
            "tests": [
                { "name": "min", "params": { "min": 3 } },
                { "name": "email" }
            ],
            "oneOf": ["a", "b"],
            "nullable": true,
            "optional": false,
            "default": "a"
        }))
        .unwrap();

        assert_eq!(schema.kind(), Kind::String);
        let d = &schema.descriptor;
        assert_eq!(d.label.as_deref(), Some("Name"));
        assert_eq!(
            d.meta,
            Some(Meta {
                title: Some("Full name".into()),
                description: Some("Display name".into()),
            })
        );
        assert_eq!(d.rules.len(), 2);
        assert_eq!(d.rules[0].params["min"].as_u64(), Some(3));
        assert!(d.rules[1].params.is_empty());
        assert_eq!(d.one_of, vec![json!("a"), json!("b")]);
        assert!(d.nullable);
        assert!(!d.optional);
        assert!(matches!(
            d.default,
            Some(DefaultSpec::Value(DefaultValue::Json(ref v))) if v == &json!("a")
        ));
    }

    #[test]
    fn parses_nested_fields_in_order() {
        let schema = parse_descriptor(&json!({
            "type": "object",
            "fields": {
                "zeta": { "type": "number" },
                "alpha": {
                    "type": "array",
                    "innerType": { "type": "string" }
                }
            }
        }))
        .unwrap();

        let Shape::Object(fields) = &schema.shape else {
            panic!("expected object shape");
        };
        let names: Vec<_> = fields.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);

        let Shape::Array(Some(inner)) = &fields[1].1.shape else {
            panic!("expected array with inner type");
        };
        assert_eq!(inner.kind(), Kind::String);
    }

    #[test]
    fn fields_ignored_on_other_kinds() {
        let schema = parse_descriptor(&json!({
            "type": "string",
            "fields": { "x": { "type": "bogus" } },
            "innerType": { "type": "bogus" }
        }))
        .unwrap();
        assert!(matches!(schema.shape, Shape::String));
    }

    #[test]
    fn parses_lazy_as_unresolved() {
        let schema = parse_descriptor(&json!({ "type": "lazy" })).unwrap();
        let Shape::Lazy(lazy) = &schema.shape else {
            panic!("expected lazy shape");
        };
        assert!(lazy.resolve().is_none());
    }

    #[test]
    fn parses_pattern_param() {
        let schema = parse_descriptor(&json!({
            "type": "string",
            "tests": [{
                "name": "matches",
                "params": { "regex": { "$regex": "^[a-z]+$", "$flags": "i" }, "excludeEmptyString": false }
            }]
        }))
        .unwrap();

        let params = &schema.descriptor.rules[0].params;
        assert_eq!(
            params["regex"].as_pattern(),
            Some(&Pattern::with_flags("^[a-z]+$", "i"))
        );
        assert_eq!(params["excludeEmptyString"], Param::Value(json!(false)));
    }

    #[test]
    fn plain_object_param_stays_a_value() {
        let schema = parse_descriptor(&json!({
            "type": "string",
            "tests": [{ "name": "matches", "params": { "regex": {} } }]
        }))
        .unwrap();
        assert!(schema.descriptor.rules[0].params["regex"]
            .as_pattern()
            .is_none());
    }

    #[test]
    fn parses_date_default() {
        let schema = parse_descriptor(&json!({
            "type": "date",
            "default": { "$date": "2024-03-01T10:00:00+02:00" }
        }))
        .unwrap();

        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        assert!(matches!(
            schema.descriptor.default,
            Some(DefaultSpec::Value(DefaultValue::Date(d))) if d == expected
        ));
    }

    #[test]
    fn unnamed_tests_are_kept() {
        let schema = parse_descriptor(&json!({
            "type": "mixed",
            "tests": [{ "params": { "x": 1 } }, { "name": null }]
        }))
        .unwrap();
        assert_eq!(schema.descriptor.rules.len(), 2);
        assert!(schema.descriptor.rules.iter().all(|r| r.name.is_none()));
    }

    // === Errors ===

    #[test]
    fn unsupported_kind_reports_path() {
        let result = parse_descriptor(&json!({
            "type": "object",
            "fields": { "pair": { "type": "tuple" } }
        }));
        assert!(matches!(
            result,
            Err(DescriptorError::UnsupportedKind { ref path, ref kind })
                if path == "/fields/pair" && kind == "tuple"
        ));
    }

    #[test]
    fn error_pointer_escapes_field_names() {
        let err = parse_descriptor(&json!({
            "type": "object",
            "fields": {
                "a/b": { "type": "tuple" }
            }
        }))
        .unwrap_err();
        assert_eq!(err.pointer(), Some("/fields/a~1b"));

        let err = parse_descriptor(&json!({
            "type": "object",
            "fields": {
                "a~b": { "type": "string", "optional": 1 }
            }
        }))
        .unwrap_err();
        assert_eq!(err.pointer(), Some("/fields/a~0b/optional"));
    }

    #[test]
    fn escape_segment_order() {
        assert_eq!(escape_segment("plain"), "plain");
        assert_eq!(escape_segment("~/"), "~0~1");
        assert_eq!(escape_segment("a~1"), "a~01");
    }

    #[test]
    fn unsupported_root_kind() {
        let result = parse_descriptor(&json!({ "type": "bigint" }));
        assert!(matches!(
            result,
            Err(DescriptorError::UnsupportedKind { ref path, .. }) if path == "/"
        ));
    }

    #[test]
    fn missing_type_errors() {
        let result = parse_descriptor(&json!({ "tests": [] }));
        assert!(matches!(
            result,
            Err(DescriptorError::InvalidDescriptor { .. })
        ));
    }

    #[test]
    fn non_object_descriptor_errors() {
        let result = parse_descriptor(&json!([1, 2]));
        assert!(matches!(
            result,
            Err(DescriptorError::InvalidDescriptor { ref message, .. }) if message.contains("array")
        ));
    }

    #[test]
    fn wrong_flag_type_errors() {
        let result = parse_descriptor(&json!({ "type": "string", "nullable": "yes" }));
        assert!(matches!(
            result,
            Err(DescriptorError::InvalidDescriptor { ref path, .. }) if path == "/nullable"
        ));
    }

    #[test]
    fn bad_date_errors() {
        let result = parse_descriptor(&json!({
            "type": "date",
            "default": { "$date": "yesterday" }
        }));
        assert!(matches!(result, Err(DescriptorError::InvalidDate { .. })));
    }

    #[test]
    fn load_from_file_and_str() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "type": "boolean" }}"#).unwrap();

        let schema = load_descriptor(file.path()).unwrap();
        assert_eq!(schema.kind(), Kind::Boolean);

        let schema = load_descriptor_str(r#"{ "type": "number" }"#).unwrap();
        assert_eq!(schema.kind(), Kind::Number);
    }

    #[test]
    fn load_missing_file() {
        let result = load_descriptor(Path::new("/nonexistent/descriptor.json"));
        assert!(matches!(result, Err(DescriptorError::FileNotFound { .. })));
    }

    #[test]
    fn load_invalid_json() {
        let result = load_descriptor_str("{ not json }");
        assert!(matches!(result, Err(DescriptorError::InvalidJson { .. })));
    }
}
