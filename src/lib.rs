//! Validation Descriptor to OpenAPI
//!
//! Converts the introspected descriptor of a validation schema into an
//! OpenAPI 3 Schema Object, so one schema serves both runtime validation and
//! API documentation.
//!
//! # Example
//!
//! ```
//! use describe_openapi::{convert, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::object([
//!     ("name", Schema::string().test("min", json!({ "min": 3 }))),
//!     ("age", Schema::number().test("integer", json!({})).optional()),
//! ]);
//!
//! let openapi = convert(&schema).to_value();
//!
//! assert_eq!(openapi, json!({
//!     "type": "object",
//!     "properties": {
//!         "name": { "type": "string", "minLength": 3 },
//!         "age": { "type": "integer", "format": "int32" }
//!     },
//!     "required": ["name"]
//! }));
//! ```
//!
//! # Rule Mapping
//!
//! | Kind | Rule | Output |
//! |------|------|--------|
//! | `number` | `integer` | `type: integer`, `format: int32` |
//! | `number` | `min` (`more` / `min`) | `minimum` (+ `exclusiveMinimum`) |
//! | `number` | `max` (`less` / `max`) | `maximum` (+ `exclusiveMaximum`) |
//! | `string` | `min` / `max` | `minLength` / `maxLength` |
//! | `string` | `matches` | `pattern` |
//! | `array` | `min` / `max` | `minItems` / `maxItems` |
//! | `string`, `number`, `date` | format names (`email`, `int64`, `date-time`, ...) | `format` |
//!
//! Lazy (self-referential) nodes become `{"type": "object"}` and are never
//! expanded.

mod converter;
mod error;
mod infer;
mod linter;
mod loader;
mod output;
mod rules;
mod schema;
mod types;

pub use converter::{convert, convert_value, convert_with};
pub use error::DescriptorError;
pub use infer::{
    constraint_rules, extract_constraints, format_entry, is_mapped_rule, resolve_default,
    resolve_enum, resolve_format, resolve_type, type_entry, FormatEntry, TypeEntry,
};
pub use linter::{lint, lint_file, Diagnostic, FileResult, FileStatus, LintResult, Severity};
pub use loader::{load_descriptor, load_descriptor_str, load_json, parse_descriptor};
pub use output::{Constraints, Properties, SchemaObject};
pub use rules::RuleIndex;
pub use schema::{
    iso_string, DefaultFactory, DefaultSpec, DefaultValue, Descriptor, LazySchema, Meta, Param,
    Params, Pattern, Rule, Schema, Shape,
};
pub use types::{ConvertOptions, DefaultPresence, FieldType, Kind};
