//! Per-node inference: type, format, constraints, enum, default and title.
//!
//! The kind tables are exhaustive `match`es, so adding a [`Kind`] without
//! an entry here fails to compile.

use serde_json::Value;

use crate::output::Constraints;
use crate::rules::RuleIndex;
use crate::schema::{DefaultSpec, Descriptor, Param};
use crate::types::{ConvertOptions, DefaultPresence, FieldType, Kind};

/// Rule that marks a number as an integer.
pub const INTEGER_RULE: &str = "integer";

/// Format assumed for plain numbers when the float fallback is enabled.
pub const FLOAT_FORMAT: &str = "float";

const STRING_FORMATS: &[&str] = &[
    "byte",
    "binary",
    "password",
    "email",
    "hostname",
    "image",
    "ipv4",
    "ipv6",
    "phone-number",
    "uri",
    "url",
    "uuid",
    "video",
];

const NUMBER_FORMATS: &[&str] = &["int32", "int64", "float", "double"];

const DATE_FORMATS: &[&str] = &["date", "date-time"];

/// Subtype candidates and fallback type for a kind.
#[derive(Debug, Clone, Copy)]
pub struct TypeEntry {
    pub subtypes: &'static [FieldType],
    pub default: FieldType,
}

/// Format tags recognized for a kind, in priority order, and its fallback.
#[derive(Debug, Clone, Copy)]
pub struct FormatEntry {
    pub tags: &'static [&'static str],
    pub default: Option<&'static str>,
}

pub fn type_entry(kind: Kind) -> TypeEntry {
    let default = match kind {
        Kind::Mixed | Kind::Lazy | Kind::Object => FieldType::Object,
        Kind::Array => FieldType::Array,
        Kind::Boolean => FieldType::Boolean,
        Kind::Number => FieldType::Number,
        Kind::String | Kind::Date => FieldType::String,
    };
    let subtypes: &'static [FieldType] = match kind {
        Kind::Number => &[FieldType::Integer],
        Kind::Mixed
        | Kind::Lazy
        | Kind::Array
        | Kind::Object
        | Kind::Boolean
        | Kind::String
        | Kind::Date => &[],
    };
    TypeEntry { subtypes, default }
}

pub fn format_entry(kind: Kind) -> FormatEntry {
    match kind {
        Kind::Mixed | Kind::Lazy | Kind::Array | Kind::Object | Kind::Boolean => FormatEntry {
            tags: &[],
            default: None,
        },
        Kind::Number => FormatEntry {
            tags: NUMBER_FORMATS,
            default: None,
        },
        Kind::String => FormatEntry {
            tags: STRING_FORMATS,
            default: None,
        },
        Kind::Date => FormatEntry {
            tags: DATE_FORMATS,
            default: Some("date"),
        },
    }
}

/// Rule names that translate into constraint fields for a kind.
pub fn constraint_rules(kind: Kind) -> &'static [&'static str] {
    match kind {
        Kind::Array | Kind::Number => &["min", "max"],
        Kind::String => &["min", "max", "matches"],
        Kind::Mixed | Kind::Lazy | Kind::Object | Kind::Boolean | Kind::Date => &[],
    }
}

/// Whether any inference step reads `rule` on a node of this kind.
pub fn is_mapped_rule(kind: Kind, rule: &str) -> bool {
    rule == INTEGER_RULE
        || type_entry(kind).subtypes.iter().any(|t| t.as_str() == rule)
        || format_entry(kind).tags.contains(&rule)
        || constraint_rules(kind).contains(&rule)
}

/// Resolve the OpenAPI `type` of a node.
///
/// A subtype candidate whose rule is present wins over the kind's default.
pub fn resolve_type(kind: Kind, rules: &RuleIndex) -> FieldType {
    let entry = type_entry(kind);
    entry
        .subtypes
        .iter()
        .copied()
        .find(|subtype| rules.contains(subtype.as_str()))
        .unwrap_or(entry.default)
}

pub fn is_integer(rules: &RuleIndex) -> bool {
    rules.contains(INTEGER_RULE)
}

/// Resolve the OpenAPI `format` of a node.
///
/// An `integer` rule forces `int32` regardless of kind or other format rules.
/// Otherwise the first format tag present wins, in the kind's tag order.
pub fn resolve_format(
    kind: Kind,
    rules: &RuleIndex,
    options: &ConvertOptions,
) -> Option<&'static str> {
    if is_integer(rules) {
        return Some("int32");
    }

    let entry = format_entry(kind);
    if let Some(tag) = rules.first_of(entry.tags) {
        return Some(tag);
    }

    match (kind, entry.default) {
        (Kind::Number, None) if options.float_fallback => Some(FLOAT_FORMAT),
        (_, default) => default,
    }
}

/// Translate bound, length and pattern rules into constraint fields.
///
/// Rules with parameters of the wrong shape contribute nothing.
pub fn extract_constraints(kind: Kind, rules: &RuleIndex) -> Constraints {
    let mut constraints = Constraints::default();

    for name in rules.find(constraint_rules(kind)) {
        match (kind, name) {
            (Kind::Number, "min") => {
                if let Some(more) = rules.param("min", "more").and_then(Param::as_number) {
                    constraints.minimum = Some(more.clone());
                    constraints.exclusive_minimum = Some(true);
                } else if let Some(min) = rules.param("min", "min").and_then(Param::as_number) {
                    constraints.minimum = Some(min.clone());
                }
            }
            (Kind::Number, "max") => {
                if let Some(less) = rules.param("max", "less").and_then(Param::as_number) {
                    constraints.maximum = Some(less.clone());
                    constraints.exclusive_maximum = Some(true);
                } else if let Some(max) = rules.param("max", "max").and_then(Param::as_number) {
                    constraints.maximum = Some(max.clone());
                }
            }
            (Kind::String, "min") => {
                constraints.min_length = rules.param("min", "min").and_then(Param::as_u64);
            }
            (Kind::String, "max") => {
                constraints.max_length = rules.param("max", "max").and_then(Param::as_u64);
            }
            (Kind::String, "matches") => {
                constraints.pattern = rules
                    .param("matches", "regex")
                    .and_then(Param::as_pattern)
                    .map(|pattern| pattern.source.clone());
            }
            (Kind::Array, "min") => {
                constraints.min_items = rules.param("min", "min").and_then(Param::as_u64);
            }
            (Kind::Array, "max") => {
                constraints.max_items = rules.param("max", "max").and_then(Param::as_u64);
            }
            _ => {}
        }
    }

    constraints
}

/// Allowed literal values, when the node is an enumeration.
pub fn resolve_enum(descriptor: &Descriptor) -> Option<Vec<Value>> {
    if descriptor.one_of.is_empty() {
        None
    } else {
        Some(descriptor.one_of.clone())
    }
}

/// Normalize a node's default into a JSON value.
///
/// Factories are invoked once and their result is used as produced. Dates
/// become ISO-8601 strings. Under [`DefaultPresence::Truthy`] a literal
/// falsy default is treated as no default at all.
pub fn resolve_default(descriptor: &Descriptor, options: &ConvertOptions) -> Option<Value> {
    match descriptor.default.as_ref()? {
        DefaultSpec::Factory(factory) => Some(factory.produce().to_json()),
        DefaultSpec::Value(value) => {
            let value = value.to_json();
            match options.default_presence {
                DefaultPresence::Truthy if !is_truthy(&value) => {
                    tracing::debug!(default = %value, "dropping falsy default");
                    None
                }
                _ => Some(value),
            }
        }
    }
}

/// JavaScript truthiness of a JSON value.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Title of a scalar node: meta title, then label.
pub fn resolve_title(descriptor: &Descriptor) -> Option<String> {
    meta_title(descriptor).or_else(|| non_empty(descriptor.label.as_deref()))
}

/// Title from the node's own meta only.
pub fn meta_title(descriptor: &Descriptor) -> Option<String> {
    non_empty(descriptor.meta.as_ref().and_then(|m| m.title.as_deref()))
}

pub fn meta_description(descriptor: &Descriptor) -> Option<String> {
    non_empty(descriptor.meta.as_ref().and_then(|m| m.description.as_deref()))
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.filter(|s| !s.is_empty()).map(String::from)
}
