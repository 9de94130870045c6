//! Descriptor conversion - turns validation schema nodes into OpenAPI schema objects.

use serde_json::Value;

use crate::error::DescriptorError;
use crate::infer::{
    extract_constraints, meta_description, meta_title, resolve_default, resolve_enum,
    resolve_format, resolve_title, resolve_type,
};
use crate::loader::{escape_segment, parse_descriptor};
use crate::output::{Properties, SchemaObject};
use crate::rules::RuleIndex;
use crate::schema::{Schema, Shape};
use crate::types::{ConvertOptions, FieldType, Kind};

/// Convert a schema with default options.
pub fn convert(schema: &Schema) -> SchemaObject {
    convert_with(schema, &ConvertOptions::default())
}

/// Convert a schema into an OpenAPI schema object.
///
/// Lazy nodes become a bare `{"type": "object"}` placeholder and are never
/// expanded, so self-referential schemas convert in bounded time.
pub fn convert_with(schema: &Schema, options: &ConvertOptions) -> SchemaObject {
    convert_node(schema, options, "")
}

/// Load a descriptor from its JSON form and convert it.
///
/// # Errors
///
/// Returns `DescriptorError` if the descriptor uses an unsupported kind or
/// is malformed.
pub fn convert_value(
    descriptor: &Value,
    options: &ConvertOptions,
) -> Result<SchemaObject, DescriptorError> {
    let schema = parse_descriptor(descriptor)?;
    Ok(convert_with(&schema, options))
}

// --- Internal implementation ---

fn convert_node(schema: &Schema, options: &ConvertOptions, path: &str) -> SchemaObject {
    if let Shape::Lazy(_) = schema.shape {
        return lazy_placeholder(path);
    }

    let rules = RuleIndex::new(&schema.descriptor.rules);
    let schema_type = resolve_type(schema.kind(), &rules);
    tracing::trace!(
        path,
        kind = %schema.kind(),
        field_type = schema_type.as_str(),
        "converting node"
    );

    match (&schema.shape, schema_type) {
        (Shape::Object(fields), FieldType::Object) => {
            convert_object(schema, fields, options, path)
        }
        (Shape::Array(inner), FieldType::Array) => {
            convert_array(schema, inner.as_deref(), &rules, options, path)
        }
        _ => convert_scalar(schema, schema_type, &rules, options),
    }
}

/// Placeholder for deferred nodes. The lazy resolver is not consulted.
fn lazy_placeholder(path: &str) -> SchemaObject {
    tracing::debug!(path, "lazy node replaced with object placeholder");
    SchemaObject::new(FieldType::Object)
}

fn convert_object(
    schema: &Schema,
    fields: &[(String, Schema)],
    options: &ConvertOptions,
    path: &str,
) -> SchemaObject {
    let properties: Properties = fields
        .iter()
        .map(|(name, field)| {
            let field_path = format!("{}/properties/{}", path, escape_segment(name));
            (name.clone(), convert_node(field, options, &field_path))
        })
        .collect();

    let required: Vec<String> = fields
        .iter()
        .filter(|(_, field)| field.is_required())
        .map(|(name, _)| name.clone())
        .collect();

    let mut result = SchemaObject::new(FieldType::Object);
    result.properties = Some(properties);
    result.title = meta_title(&schema.descriptor);
    result.description = meta_description(&schema.descriptor);
    if !required.is_empty() {
        result.required = Some(required);
    }
    result
}

fn convert_array(
    schema: &Schema,
    inner: Option<&Schema>,
    rules: &RuleIndex,
    options: &ConvertOptions,
    path: &str,
) -> SchemaObject {
    let mut result = SchemaObject::new(FieldType::Array);
    result.title = meta_title(&schema.descriptor);
    result.description = meta_description(&schema.descriptor);
    result.items = inner.map(|inner| {
        let items_path = format!("{}/items", path);
        Box::new(convert_node(inner, options, &items_path))
    });
    result.merge_constraints(extract_constraints(Kind::Array, rules));
    result
}

fn convert_scalar(
    schema: &Schema,
    schema_type: FieldType,
    rules: &RuleIndex,
    options: &ConvertOptions,
) -> SchemaObject {
    let kind = schema.kind();
    let descriptor = &schema.descriptor;

    let mut result = SchemaObject::new(schema_type);
    result.format = resolve_format(kind, rules, options).map(String::from);
    result.enum_values = resolve_enum(descriptor);
    result.nullable = descriptor.nullable.then_some(true);
    result.default = resolve_default(descriptor, options);
    result.title = resolve_title(descriptor);
    result.description = meta_description(descriptor);
    result.merge_constraints(extract_constraints(kind, rules));
    result
}
