//! Input model: validation schema nodes and their introspected descriptors.
//!
//! A [`Schema`] pairs the data every node carries (its [`Descriptor`]) with a
//! [`Shape`] that holds what only some kinds carry: object fields, the array
//! element schema, or the deferred resolver of a lazy node.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Number, Value};

use crate::types::Kind;

/// Parameters of a single rule, keyed by parameter name.
pub type Params = BTreeMap<String, Param>;

/// A regular expression as the validation library holds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    /// Expression text without delimiters.
    pub source: String,
    /// Flag letters (e.g. `"i"`), possibly empty.
    pub flags: String,
}

impl Pattern {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            flags: String::new(),
        }
    }

    pub fn with_flags(source: impl Into<String>, flags: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            flags: flags.into(),
        }
    }
}

/// A rule parameter value.
///
/// Patterns are kept apart from plain JSON so that a string that merely
/// looks like a regex is never mistaken for one.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Value(Value),
    Pattern(Pattern),
}

impl Param {
    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Param::Value(Value::Number(n)) => Some(n),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Param::Value(v) => v.as_u64(),
            Param::Pattern(_) => None,
        }
    }

    pub fn as_pattern(&self) -> Option<&Pattern> {
        match self {
            Param::Pattern(p) => Some(p),
            Param::Value(_) => None,
        }
    }
}

impl From<Value> for Param {
    fn from(value: Value) -> Self {
        Param::Value(value)
    }
}

impl From<Pattern> for Param {
    fn from(pattern: Pattern) -> Self {
        Param::Pattern(pattern)
    }
}

/// A validation rule applied to a node, e.g. `min` with `{ "min": 3 }`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Rule {
    /// Rule name. Anonymous rules cannot be indexed and are skipped.
    pub name: Option<String>,
    pub params: Params,
}

impl Rule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            params: Params::new(),
        }
    }

    /// A rule with no name, as produced by ad-hoc custom tests.
    pub fn unnamed() -> Self {
        Self::default()
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Param>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// Documentation metadata attached to a node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Meta {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// A concrete default value.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Json(Value),
    Date(DateTime<Utc>),
}

impl DefaultValue {
    /// Render as JSON; dates become ISO-8601 strings.
    pub fn to_json(&self) -> Value {
        match self {
            DefaultValue::Json(value) => value.clone(),
            DefaultValue::Date(date) => Value::String(iso_string(date)),
        }
    }
}

impl From<Value> for DefaultValue {
    fn from(value: Value) -> Self {
        DefaultValue::Json(value)
    }
}

impl From<DateTime<Utc>> for DefaultValue {
    fn from(date: DateTime<Utc>) -> Self {
        DefaultValue::Date(date)
    }
}

/// Format a timestamp the way `Date.prototype.toISOString` does:
/// millisecond precision, `Z` suffix.
pub fn iso_string(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// A zero-argument function producing a default on demand.
#[derive(Clone)]
pub struct DefaultFactory(Arc<dyn Fn() -> DefaultValue + Send + Sync>);

impl DefaultFactory {
    pub fn new(f: impl Fn() -> DefaultValue + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn produce(&self) -> DefaultValue {
        (self.0)()
    }
}

impl fmt::Debug for DefaultFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DefaultFactory(..)")
    }
}

/// How a node's default is specified.
#[derive(Debug, Clone)]
pub enum DefaultSpec {
    Value(DefaultValue),
    Factory(DefaultFactory),
}

/// Introspected data common to every node kind.
#[derive(Debug, Clone, Default)]
pub struct Descriptor {
    /// Applied rules, in application order.
    pub rules: Vec<Rule>,
    /// Allowed literal values; empty when the node is not an enumeration.
    pub one_of: Vec<Value>,
    pub meta: Option<Meta>,
    /// Generic label, used as a title fallback on scalar nodes.
    pub label: Option<String>,
    pub nullable: bool,
    pub optional: bool,
    pub default: Option<DefaultSpec>,
}

/// A node whose definition is deferred, typically to allow recursion.
#[derive(Clone, Default)]
pub struct LazySchema {
    resolver: Option<Arc<dyn Fn() -> Schema + Send + Sync>>,
}

impl LazySchema {
    pub fn new(resolver: impl Fn() -> Schema + Send + Sync + 'static) -> Self {
        Self {
            resolver: Some(Arc::new(resolver)),
        }
    }

    /// A lazy node whose definition is not available, as loaded from JSON.
    pub fn unresolved() -> Self {
        Self::default()
    }

    /// Build the deferred schema. Never called during conversion.
    pub fn resolve(&self) -> Option<Schema> {
        self.resolver.as_ref().map(|f| f())
    }
}

impl fmt::Debug for LazySchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazySchema")
            .field("resolved", &self.resolver.is_some())
            .finish()
    }
}

/// Kind-specific structure of a node.
#[derive(Debug, Clone)]
pub enum Shape {
    Mixed,
    Lazy(LazySchema),
    /// Element schema, when the array declares one.
    Array(Option<Box<Schema>>),
    /// Fields in declaration order.
    Object(Vec<(String, Schema)>),
    Boolean,
    Number,
    String,
    Date,
}

impl Shape {
    pub fn kind(&self) -> Kind {
        match self {
            Shape::Mixed => Kind::Mixed,
            Shape::Lazy(_) => Kind::Lazy,
            Shape::Array(_) => Kind::Array,
            Shape::Object(_) => Kind::Object,
            Shape::Boolean => Kind::Boolean,
            Shape::Number => Kind::Number,
            Shape::String => Kind::String,
            Shape::Date => Kind::Date,
        }
    }
}

/// A validation schema node.
#[derive(Debug, Clone)]
pub struct Schema {
    pub descriptor: Descriptor,
    pub shape: Shape,
}

impl Schema {
    pub fn new(shape: Shape) -> Self {
        Self {
            descriptor: Descriptor::default(),
            shape,
        }
    }

    pub fn mixed() -> Self {
        Self::new(Shape::Mixed)
    }

    pub fn boolean() -> Self {
        Self::new(Shape::Boolean)
    }

    pub fn number() -> Self {
        Self::new(Shape::Number)
    }

    pub fn string() -> Self {
        Self::new(Shape::String)
    }

    pub fn date() -> Self {
        Self::new(Shape::Date)
    }

    /// An object with the given fields, in order.
    ///
    /// A repeated name replaces the earlier field in its original position.
    pub fn object<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Schema)>,
        K: Into<String>,
    {
        let mut result: Vec<(String, Schema)> = Vec::new();
        for (name, schema) in fields {
            let name = name.into();
            match result.iter_mut().find(|(existing, _)| *existing == name) {
                Some((_, slot)) => *slot = schema,
                None => result.push((name, schema)),
            }
        }
        Self::new(Shape::Object(result))
    }

    /// An array without an element schema.
    pub fn array() -> Self {
        Self::new(Shape::Array(None))
    }

    pub fn array_of(inner: Schema) -> Self {
        Self::new(Shape::Array(Some(Box::new(inner))))
    }

    pub fn lazy(resolver: impl Fn() -> Schema + Send + Sync + 'static) -> Self {
        Self::new(Shape::Lazy(LazySchema::new(resolver)))
    }

    pub fn kind(&self) -> Kind {
        self.shape.kind()
    }

    /// A field is required when it is neither nullable nor optional.
    pub fn is_required(&self) -> bool {
        !self.descriptor.nullable && !self.descriptor.optional
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.descriptor.rules.push(rule);
        self
    }

    /// Append a rule whose params are given as a JSON object.
    ///
    /// Non-object `params` produce a rule without parameters.
    pub fn test(self, name: &str, params: Value) -> Self {
        let mut rule = Rule::new(name);
        if let Value::Object(map) = params {
            for (key, value) in map {
                rule = rule.param(key, value);
            }
        }
        self.rule(rule)
    }

    /// Append a `matches` rule carrying a genuine pattern.
    pub fn matches(self, pattern: Pattern) -> Self {
        self.rule(Rule::new("matches").param("regex", pattern))
    }

    pub fn one_of(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.descriptor.one_of = values.into_iter().collect();
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.descriptor.meta.get_or_insert_with(Meta::default).title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.descriptor
            .meta
            .get_or_insert_with(Meta::default)
            .description = Some(description.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.descriptor.label = Some(label.into());
        self
    }

    pub fn nullable(mut self) -> Self {
        self.descriptor.nullable = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.descriptor.optional = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<DefaultValue>) -> Self {
        self.descriptor.default = Some(DefaultSpec::Value(value.into()));
        self
    }

    pub fn default_with(mut self, f: impl Fn() -> DefaultValue + Send + Sync + 'static) -> Self {
        self.descriptor.default = Some(DefaultSpec::Factory(DefaultFactory::new(f)));
        self
    }
}
