//! Flat, attribute-oriented resource state.
//!
//! [`FlatState`] is the representation the host diffs. Values are validated
//! against the resource's [`ResourceSchema`] on the way in; after that the
//! typed accessors can be trusted without casts.
//!
//! An absent collection means "not configured" or "not read yet"; a present
//! empty collection means "explicitly empty". The two are kept apart all the
//! way to the wire.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde_json::{Map, Value};

use crate::error::SchemaError;
use crate::schema::{FieldSchema, Kind, RecordField, ResourceSchema, Shape, check_allowed};

/// A single primitive value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Primitive {
    String(String),
    Int(i64),
    Bool(bool),
}

impl Primitive {
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Self::String(_) => Kind::String,
            Self::Int(_) => Kind::Int,
            Self::Bool(_) => Kind::Bool,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Self::String(s) => Value::String(s.clone()),
            Self::Int(i) => Value::from(*i),
            Self::Bool(b) => Value::Bool(*b),
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for Primitive {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Primitive {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for Primitive {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for Primitive {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// A structured member of a record-set field.
///
/// Identity is structural: two records are the same set element only if
/// every member is equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Record(BTreeMap<String, Primitive>);

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a string member.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.0.insert(key.to_string(), Primitive::String(value.into()));
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Primitive> {
        self.0.get(key)
    }

    /// String member, `""` when missing.
    #[must_use]
    pub fn get_str(&self, key: &str) -> &str {
        self.0.get(key).and_then(Primitive::as_str).unwrap_or("")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Primitive)> {
        self.0.iter()
    }

    /// Fills missing members with defaults and rejects undeclared or
    /// disallowed ones.
    fn normalize(mut self, field: &str, members: &[RecordField]) -> Result<Self, SchemaError> {
        for key in self.0.keys() {
            if !members.iter().any(|member| member.name == key) {
                return Err(SchemaError::unknown_field(format!("{field}.{key}")));
            }
        }
        for member in members {
            let value = self
                .0
                .entry(member.name.to_string())
                .or_insert_with(|| Primitive::from(member.default));
            let name = format!("{field}.{}", member.name);
            let Some(text) = value.as_str() else {
                return Err(SchemaError::shape_mismatch(
                    name,
                    Kind::String.to_string(),
                    value.kind().to_string(),
                ));
            };
            check_allowed(&name, text, member.allowed)?;
        }
        Ok(self)
    }

    fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

/// Value of a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Scalar(Primitive),
    List(Vec<Primitive>),
    Set(BTreeSet<Primitive>),
    RecordSet(BTreeSet<Record>),
}

impl FieldValue {
    /// Set of strings.
    pub fn string_set<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Set(values.into_iter().map(|v| Primitive::String(v.into())).collect())
    }

    /// Ordered list of strings.
    pub fn string_list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(values.into_iter().map(|v| Primitive::String(v.into())).collect())
    }

    pub fn records<I: IntoIterator<Item = Record>>(records: I) -> Self {
        Self::RecordSet(records.into_iter().collect())
    }

    fn describe(&self) -> String {
        fn element_kind<'a>(mut items: impl Iterator<Item = &'a Primitive>) -> String {
            items
                .next()
                .map_or_else(|| "empty".to_string(), |p| p.kind().to_string())
        }
        match self {
            Self::Scalar(p) => p.kind().to_string(),
            Self::List(items) => format!("list<{}>", element_kind(items.iter())),
            Self::Set(items) => format!("set<{}>", element_kind(items.iter())),
            Self::RecordSet(_) => "set<record>".to_string(),
        }
    }

    /// Checks the value against a declaration, returning it normalized.
    fn conform(self, field: &FieldSchema) -> Result<Self, SchemaError> {
        let mismatch = |value: &Self| {
            SchemaError::shape_mismatch(field.name, field.shape.to_string(), value.describe())
        };
        match (field.shape, self) {
            (Shape::Scalar(kind), Self::Scalar(p)) if p.kind() == kind => {
                if let Some(text) = p.as_str() {
                    check_allowed(field.name, text, field.allowed)?;
                }
                Ok(Self::Scalar(p))
            }
            (Shape::List(kind), Self::List(items)) if items.iter().all(|p| p.kind() == kind) => {
                Ok(Self::List(items))
            }
            (Shape::Set(kind), Self::Set(items)) if items.iter().all(|p| p.kind() == kind) => {
                Ok(Self::Set(items))
            }
            (Shape::RecordSet(members), Self::RecordSet(records)) => records
                .into_iter()
                .map(|record| record.normalize(field.name, members))
                .collect::<Result<BTreeSet<_>, _>>()
                .map(Self::RecordSet),
            (_, value) => Err(mismatch(&value)),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Self::Scalar(p) => p.to_json(),
            Self::List(items) => Value::Array(items.iter().map(Primitive::to_json).collect()),
            Self::Set(items) => Value::Array(items.iter().map(Primitive::to_json).collect()),
            Self::RecordSet(records) => {
                Value::Array(records.iter().map(Record::to_json).collect())
            }
        }
    }
}

/// Flat state of one resource instance.
#[derive(Debug, Clone)]
pub struct FlatState {
    schema: &'static ResourceSchema,
    values: BTreeMap<&'static str, FieldValue>,
}

impl PartialEq for FlatState {
    fn eq(&self, other: &Self) -> bool {
        self.schema.type_name == other.schema.type_name && self.values == other.values
    }
}

impl Eq for FlatState {}

impl FlatState {
    /// Empty state for `schema`.
    #[must_use]
    pub fn new(schema: &'static ResourceSchema) -> Self {
        Self {
            schema,
            values: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn schema(&self) -> &'static ResourceSchema {
        self.schema
    }

    /// Writes a field, rejecting undeclared names and mismatched shapes.
    ///
    /// Record members are filled with their defaults.
    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<(), SchemaError> {
        let field = self.schema.require_field(name)?;
        let value = value.into().conform(field)?;
        self.values.insert(field.name, value);
        Ok(())
    }

    /// Writes a field whose shape is known to be right.
    ///
    /// Used when flattening API responses, where values are built directly
    /// in the declared shape. Undeclared names are ignored.
    pub(crate) fn put(&mut self, name: &str, value: FieldValue) {
        if let Some(field) = self.schema.field(name) {
            self.values.insert(field.name, value);
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.values.remove(name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.values.get(name)? {
            FieldValue::Scalar(p) => p.as_str(),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_int(&self, name: &str) -> Option<i64> {
        match self.values.get(name)? {
            FieldValue::Scalar(p) => p.as_int(),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.values.get(name)? {
            FieldValue::Scalar(p) => p.as_bool(),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_list(&self, name: &str) -> Option<&[Primitive]> {
        match self.values.get(name)? {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_set(&self, name: &str) -> Option<&BTreeSet<Primitive>> {
        match self.values.get(name)? {
            FieldValue::Set(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_records(&self, name: &str) -> Option<&BTreeSet<Record>> {
        match self.values.get(name)? {
            FieldValue::RecordSet(records) => Some(records),
            _ => None,
        }
    }

    /// Overwrites fields present in `other`; fields only in `self` are kept.
    pub fn merge(&mut self, other: FlatState) {
        self.values.extend(other.values);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.values.iter().map(|(name, value)| (*name, value))
    }

    /// Builds a validated state from a JSON configuration object.
    ///
    /// `null` members are treated as absent. Scalar defaults are applied to
    /// absent fields, then required fields are checked.
    pub fn from_config(schema: &'static ResourceSchema, doc: &Value) -> Result<Self, SchemaError> {
        let object = doc
            .as_object()
            .ok_or_else(|| SchemaError::InvalidDocument("expected a JSON object".into()))?;

        let mut state = Self::new(schema);
        for (name, raw) in object {
            if raw.is_null() {
                continue;
            }
            let field = schema.require_field(name)?;
            let value = value_from_json(field, raw)?;
            state.set(name, value)?;
        }

        for field in schema.fields {
            if state.contains(field.name) {
                continue;
            }
            if let Some(default) = field.default {
                state.set(field.name, FieldValue::Scalar(default.into()))?;
            } else if field.required {
                return Err(SchemaError::missing_required(field.name));
            }
        }

        for field in schema.fields.iter().filter(|f| f.required) {
            if state.get_str(field.name).is_some_and(str::is_empty) {
                return Err(SchemaError::missing_required(field.name));
            }
        }
        Ok(state)
    }

    /// JSON object with one member per present field.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .values
            .iter()
            .map(|(name, value)| ((*name).to_string(), value.to_json()))
            .collect();
        Value::Object(map)
    }
}

impl From<Primitive> for FieldValue {
    fn from(value: Primitive) -> Self {
        Self::Scalar(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Scalar(value.into())
    }
}

fn primitive_from_json(field: &str, kind: Kind, raw: &Value) -> Result<Primitive, SchemaError> {
    let found = || match raw {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    let primitive = match (kind, raw) {
        (Kind::String, Value::String(s)) => Some(Primitive::String(s.clone())),
        (Kind::Int, Value::Number(n)) => n.as_i64().map(Primitive::Int),
        (Kind::Bool, Value::Bool(b)) => Some(Primitive::Bool(*b)),
        _ => None,
    };
    primitive.ok_or_else(|| SchemaError::shape_mismatch(field, kind.to_string(), found()))
}

fn array<'a>(field: &FieldSchema, raw: &'a Value) -> Result<&'a Vec<Value>, SchemaError> {
    raw.as_array()
        .ok_or_else(|| SchemaError::shape_mismatch(field.name, field.shape.to_string(), "non-array"))
}

fn value_from_json(field: &FieldSchema, raw: &Value) -> Result<FieldValue, SchemaError> {
    match field.shape {
        Shape::Scalar(kind) => primitive_from_json(field.name, kind, raw).map(FieldValue::Scalar),
        Shape::List(kind) => array(field, raw)?
            .iter()
            .map(|item| primitive_from_json(field.name, kind, item))
            .collect::<Result<Vec<_>, _>>()
            .map(FieldValue::List),
        Shape::Set(kind) => array(field, raw)?
            .iter()
            .map(|item| primitive_from_json(field.name, kind, item))
            .collect::<Result<BTreeSet<_>, _>>()
            .map(FieldValue::Set),
        Shape::RecordSet(_) => array(field, raw)?
            .iter()
            .map(|item| -> Result<Record, SchemaError> {
                let object = item.as_object().ok_or_else(|| {
                    SchemaError::shape_mismatch(field.name, field.shape.to_string(), "non-object member")
                })?;
                let mut record = Record::new();
                for (key, value) in object {
                    if value.is_null() {
                        continue;
                    }
                    let member = format!("{}.{key}", field.name);
                    let primitive = primitive_from_json(&member, Kind::String, value)?;
                    record.0.insert(key.clone(), primitive);
                }
                Ok(record)
            })
            .collect::<Result<BTreeSet<_>, _>>()
            .map(FieldValue::RecordSet),
    }
}

/// Per-instance data the host hands to resource hooks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceData {
    /// Remote identifier, set once the object exists.
    pub id: Option<String>,
    pub state: FlatState,
}

impl ResourceData {
    #[must_use]
    pub fn new(schema: &'static ResourceSchema) -> Self {
        Self {
            id: None,
            state: FlatState::new(schema),
        }
    }

    #[must_use]
    pub fn from_state(state: FlatState) -> Self {
        Self { id: None, state }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// The identifier, if one has been captured and is non-empty.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}
