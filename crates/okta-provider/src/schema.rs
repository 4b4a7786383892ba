//! Declared shapes of resource fields.
//!
//! A [`ResourceSchema`] is a static table: every field has a stable name and
//! exactly one [`Shape`]. [`crate::state::FlatState`] consults it whenever a
//! value is written so that readers never have to guess at types.

use std::fmt;

use crate::error::SchemaError;

/// Primitive kind of a scalar or collection element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    String,
    Int,
    Bool,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Bool => "bool",
        })
    }
}

/// Declared shape of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Scalar(Kind),
    /// Ordered collection; order is significant for comparison.
    List(Kind),
    /// Unordered collection of distinct primitives.
    Set(Kind),
    /// Unordered collection of string-valued records.
    RecordSet(&'static [RecordField]),
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(kind) => write!(f, "{kind}"),
            Self::List(kind) => write!(f, "list<{kind}>"),
            Self::Set(kind) => write!(f, "set<{kind}>"),
            Self::RecordSet(fields) => {
                let names: Vec<&str> = fields.iter().map(|field| field.name).collect();
                write!(f, "set<{{{}}}>", names.join(", "))
            }
        }
    }
}

/// Member of a record in a [`Shape::RecordSet`] field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordField {
    pub name: &'static str,
    /// Value filled in when the member is not supplied.
    pub default: &'static str,
    pub allowed: Option<&'static [&'static str]>,
}

impl RecordField {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            default: "",
            allowed: None,
        }
    }

    #[must_use]
    pub const fn with_default(mut self, default: &'static str) -> Self {
        self.default = default;
        self
    }

    #[must_use]
    pub const fn one_of(mut self, allowed: &'static [&'static str]) -> Self {
        self.allowed = Some(allowed);
        self
    }
}

/// Declaration of a single resource field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSchema {
    pub name: &'static str,
    pub shape: Shape,
    pub required: bool,
    /// Scalar value applied by [`crate::state::FlatState::from_config`] when
    /// the field is not configured.
    pub default: Option<&'static str>,
    pub allowed: Option<&'static [&'static str]>,
    pub description: &'static str,
}

impl FieldSchema {
    #[must_use]
    pub const fn new(name: &'static str, shape: Shape, description: &'static str) -> Self {
        Self {
            name,
            shape,
            required: false,
            default: None,
            allowed: None,
            description,
        }
    }

    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub const fn with_default(mut self, default: &'static str) -> Self {
        self.default = Some(default);
        self
    }

    #[must_use]
    pub const fn one_of(mut self, allowed: &'static [&'static str]) -> Self {
        self.allowed = Some(allowed);
        self
    }
}

/// All fields of one resource type.
#[derive(Debug, PartialEq, Eq)]
pub struct ResourceSchema {
    /// Resource type name, e.g. `okta_policy_rule_idp_discovery`.
    pub type_name: &'static str,
    pub fields: &'static [FieldSchema],
}

impl ResourceSchema {
    /// Looks up a field declaration by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static FieldSchema> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Like [`Self::field`], failing with [`SchemaError::UnknownField`].
    pub fn require_field(&self, name: &str) -> Result<&'static FieldSchema, SchemaError> {
        self.field(name)
            .ok_or_else(|| SchemaError::unknown_field(name))
    }
}

/// Rejects `value` unless it is in `allowed`.
pub(crate) fn check_allowed(
    field: &str,
    value: &str,
    allowed: Option<&'static [&'static str]>,
) -> Result<(), SchemaError> {
    match allowed {
        Some(allowed) if !allowed.contains(&value) => Err(SchemaError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            allowed: format!("{allowed:?}"),
        }),
        _ => Ok(()),
    }
}
