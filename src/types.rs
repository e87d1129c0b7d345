//! Resolved type descriptors.
//!
//! A [`Type`] is the generation-ready view of one schema node. The variant
//! set is closed and mirrors the JSON-Schema primitive vocabulary, plus
//! `Enum` for fixed value sets and `Reference` for the back edge of a
//! recursive schema.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::example;
use crate::validations::Validation;

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

/// Options for document resolution.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Base URL of the described API. Overrides the document's `rel: "self"`
    /// root link when set.
    pub base_url: Option<String>,
    /// When true, a node declaring more than one non-null primitive type is
    /// an error instead of resolving as its first declared type.
    pub strict_types: bool,
}

impl ResolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL used to build link URLs.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set strict multi-type handling.
    pub fn strict_types(mut self, strict: bool) -> Self {
        self.strict_types = strict;
        self
    }
}

/// Persistence-layer hint read from the `column` extension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnHint {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
}

impl ColumnHint {
    /// Read the `column` extension of a node.
    ///
    /// Accepts `{"name": .., "type": ..}` or a bare column name string.
    pub fn from_node(node: &Value) -> Option<Self> {
        match node.get("column")? {
            Value::String(name) => Some(Self {
                name: name.clone(),
                column_type: String::new(),
            }),
            Value::Object(map) => {
                let field = |k: &str| {
                    map.get(k)
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string()
                };
                Some(Self {
                    name: field("name"),
                    column_type: field("type"),
                })
            }
            _ => None,
        }
    }
}

static NULL: Value = Value::Null;

/// Attributes shared by every type variant.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TypeMeta<'a> {
    /// The schema node inside the document this type was resolved from.
    #[serde(skip)]
    pub raw: Option<&'a Value>,
    pub key: String,
    pub name: String,
    /// Identifier templates use for the generated type. Same as `name`.
    #[serde(rename = "Type")]
    pub type_name: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Primitive type names as declared, including `null`.
    pub declared_types: Vec<String>,
    pub nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    pub read_only: bool,
    pub write_only: bool,
    pub is_private: bool,
    pub column_name: String,
    pub column_type: String,
    pub validations: Vec<Validation>,
}

impl TypeMeta<'_> {
    /// Declared `examples`/`example` first, then `default`.
    pub fn declared_example(&self) -> Option<&Value> {
        self.example.as_ref().or(self.default.as_ref())
    }
}

/// Scalar value types (`string`, `number`, `integer`, `boolean`).
#[derive(Debug, Clone, Serialize)]
pub struct PrimitiveType<'a> {
    #[serde(flatten)]
    pub meta: TypeMeta<'a>,
}

/// A named object property.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Property<'a> {
    pub name: String,
    pub schema: Arc<Type<'a>>,
}

/// Object with declared properties, in declaration order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectType<'a> {
    #[serde(flatten)]
    pub meta: TypeMeta<'a>,
    pub properties: Vec<Property<'a>>,
    pub required: Vec<String>,
}

impl<'a> ObjectType<'a> {
    /// Look up a property by name.
    pub fn property(&self, name: &str) -> Option<&Type<'a>> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.schema.as_ref())
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }
}

/// Item specification of an array.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase", tag = "Form", content = "Schemas")]
pub enum Items<'a> {
    /// One schema shared by every element.
    List(Arc<Type<'a>>),
    /// One schema per position.
    Tuple(Vec<Arc<Type<'a>>>),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ArrayType<'a> {
    #[serde(flatten)]
    pub meta: TypeMeta<'a>,
    pub items: Items<'a>,
}

impl<'a> ArrayType<'a> {
    /// Resolved item types: one for list form, one per position for tuples.
    pub fn item_types(&self) -> &[Arc<Type<'a>>] {
        match &self.items {
            Items::List(item) => std::slice::from_ref(item),
            Items::Tuple(items) => items,
        }
    }

    pub fn is_tuple(&self) -> bool {
        matches!(self.items, Items::Tuple(_))
    }
}

/// A schema restricted to an explicit value set.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EnumType<'a> {
    #[serde(flatten)]
    pub meta: TypeMeta<'a>,
    pub values: Vec<Value>,
    /// First declared non-null primitive type, when any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_type: Option<String>,
}

/// A `$ref` back to a schema that is still being expanded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReferenceType<'a> {
    #[serde(flatten)]
    pub meta: TypeMeta<'a>,
    /// The `$ref` target, as written.
    pub target: String,
}

/// A resolved schema node.
///
/// Children are reference counted: every `$ref` to a named definition
/// shares that definition's resolved type.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "NativeType", rename_all = "lowercase")]
pub enum Type<'a> {
    Object(ObjectType<'a>),
    Array(ArrayType<'a>),
    String(PrimitiveType<'a>),
    Number(PrimitiveType<'a>),
    Integer(PrimitiveType<'a>),
    Boolean(PrimitiveType<'a>),
    Enum(EnumType<'a>),
    Reference(ReferenceType<'a>),
}

impl<'a> Type<'a> {
    /// Shared attributes of this type.
    pub fn meta(&self) -> &TypeMeta<'a> {
        match self {
            Type::Object(t) => &t.meta,
            Type::Array(t) => &t.meta,
            Type::String(t) | Type::Number(t) | Type::Integer(t) | Type::Boolean(t) => &t.meta,
            Type::Enum(t) => &t.meta,
            Type::Reference(t) => &t.meta,
        }
    }

    /// The schema node this type was resolved from.
    pub fn raw(&self) -> &'a Value {
        self.meta().raw.unwrap_or(&NULL)
    }

    /// Schema title as written (may be empty).
    pub fn title(&self) -> &str {
        &self.meta().title
    }

    /// Key path at which this type was created.
    pub fn key(&self) -> &str {
        &self.meta().key
    }

    /// Generation-facing identifier.
    pub fn name(&self) -> &str {
        &self.meta().name
    }

    pub fn is_private(&self) -> bool {
        self.meta().is_private
    }

    /// Lowercase JSON-Schema name of the variant.
    pub fn native_type(&self) -> &'static str {
        match self {
            Type::Object(_) => "object",
            Type::Array(_) => "array",
            Type::String(_) => "string",
            Type::Number(_) => "number",
            Type::Integer(_) => "integer",
            Type::Boolean(_) => "boolean",
            Type::Enum(_) => "enum",
            Type::Reference(_) => "reference",
        }
    }

    /// Declared primitive types joined by `sep` (e.g. `string | null`).
    pub fn joined_types(&self, sep: &str) -> String {
        self.meta().declared_types.join(sep)
    }

    /// Example value for this type. See [`example::generate`].
    pub fn example(&self, writable: bool) -> Value {
        example::generate(self, writable)
    }

    pub fn as_object(&self) -> Option<&ObjectType<'a>> {
        match self {
            Type::Object(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayType<'a>> {
        match self {
            Type::Array(t) => Some(t),
            _ => None,
        }
    }
}
