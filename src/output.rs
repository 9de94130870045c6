//! Output model: OpenAPI 3 schema objects.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Number, Value};

use crate::types::FieldType;

/// An OpenAPI 3 Schema Object.
///
/// Serializes to the OpenAPI vocabulary; fields left as `None` are omitted.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaObject {
    #[serde(rename = "type")]
    pub schema_type: FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaObject>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
}

impl SchemaObject {
    /// A schema object with only `type` set.
    pub fn new(schema_type: FieldType) -> Self {
        Self {
            schema_type,
            format: None,
            title: None,
            description: None,
            enum_values: None,
            nullable: None,
            default: None,
            properties: None,
            required: None,
            items: None,
            minimum: None,
            exclusive_minimum: None,
            maximum: None,
            exclusive_maximum: None,
            min_length: None,
            max_length: None,
            pattern: None,
            min_items: None,
            max_items: None,
        }
    }

    /// Merge constraint fields in. Fields already set are kept.
    pub fn merge_constraints(&mut self, constraints: Constraints) {
        let Constraints {
            minimum,
            exclusive_minimum,
            maximum,
            exclusive_maximum,
            min_length,
            max_length,
            pattern,
            min_items,
            max_items,
        } = constraints;

        fill(&mut self.minimum, minimum);
        fill(&mut self.exclusive_minimum, exclusive_minimum);
        fill(&mut self.maximum, maximum);
        fill(&mut self.exclusive_maximum, exclusive_maximum);
        fill(&mut self.min_length, min_length);
        fill(&mut self.max_length, max_length);
        fill(&mut self.pattern, pattern);
        fill(&mut self.min_items, min_items);
        fill(&mut self.max_items, max_items);
    }

    /// Serialize into a `serde_json::Value`.
    pub fn to_value(&self) -> Value {
        // Every field is plain data with string keys, so this cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

fn fill<T>(slot: &mut Option<T>, value: Option<T>) {
    if slot.is_none() {
        *slot = value;
    }
}

/// Bound, length, pattern and item-count fields derived from rules.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Constraints {
    pub minimum: Option<Number>,
    pub exclusive_minimum: Option<bool>,
    pub maximum: Option<Number>,
    pub exclusive_maximum: Option<bool>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<String>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
}

impl Constraints {
    pub fn is_empty(&self) -> bool {
        *self == Constraints::default()
    }
}

/// Object properties in field declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Properties(Vec<(String, SchemaObject)>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a property; a repeated name replaces the earlier entry in place.
    pub fn insert(&mut self, name: String, schema: SchemaObject) {
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = schema,
            None => self.0.push((name, schema)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&SchemaObject> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, schema)| schema)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaObject)> {
        self.0.iter().map(|(name, schema)| (name.as_str(), schema))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, SchemaObject)> for Properties {
    fn from_iter<I: IntoIterator<Item = (String, SchemaObject)>>(iter: I) -> Self {
        let mut properties = Properties::new();
        for (name, schema) in iter {
            properties.insert(name, schema);
        }
        properties
    }
}

impl Serialize for Properties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, schema) in &self.0 {
            map.serialize_entry(name, schema)?;
        }
        map.end()
    }
}
