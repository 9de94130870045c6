//! Core types shared by the loader, the converter and the linter.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Structural category of a validation schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Mixed,
    Lazy,
    Array,
    Object,
    Boolean,
    Number,
    String,
    Date,
}

impl Kind {
    /// Every kind the converter understands.
    pub const ALL: [Kind; 8] = [
        Kind::Mixed,
        Kind::Lazy,
        Kind::Array,
        Kind::Object,
        Kind::Boolean,
        Kind::Number,
        Kind::String,
        Kind::Date,
    ];

    /// Parse a kind from its descriptor string.
    ///
    /// Returns `None` for unknown kinds (caller should error).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "mixed" => Some(Kind::Mixed),
            "lazy" => Some(Kind::Lazy),
            "array" => Some(Kind::Array),
            "object" => Some(Kind::Object),
            "boolean" => Some(Kind::Boolean),
            "number" => Some(Kind::Number),
            "string" => Some(Kind::String),
            "date" => Some(Kind::Date),
            _ => None,
        }
    }

    /// Returns the descriptor string for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Mixed => "mixed",
            Kind::Lazy => "lazy",
            Kind::Array => "array",
            Kind::Object => "object",
            Kind::Boolean => "boolean",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Date => "date",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primitive `type` of an OpenAPI schema object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Integer,
    Number,
    String,
    Boolean,
    Object,
    Null,
    Array,
}

impl FieldType {
    /// Returns the OpenAPI name of this type.
    ///
    /// Subtype candidates are matched against rule names, so this doubles as
    /// the rule name that selects the subtype.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::String => "string",
            FieldType::Boolean => "boolean",
            FieldType::Object => "object",
            FieldType::Null => "null",
            FieldType::Array => "array",
        }
    }
}

/// How the presence of a default value is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DefaultPresence {
    /// A default counts only when it is truthy: `0`, `""`, `false` and `null`
    /// produce no `default` field.
    #[default]
    Truthy,
    /// Any default that was set is emitted, falsy values included.
    Explicit,
}

/// Options for descriptor conversion.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Policy for emitting falsy default values.
    pub default_presence: DefaultPresence,
    /// When true, number nodes without a format rule get `format: "float"`.
    /// Defaults to false, which leaves the format off.
    pub float_fallback: bool,
}

impl ConvertOptions {
    /// Create options with the truthy default policy and no float fallback.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default presence policy.
    pub fn default_presence(mut self, presence: DefaultPresence) -> Self {
        self.default_presence = presence;
        self
    }

    /// Emit `format: "float"` for plain number nodes.
    pub fn float_fallback(mut self, enabled: bool) -> Self {
        self.float_fallback = enabled;
        self
    }
}
