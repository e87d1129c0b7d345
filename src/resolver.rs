//! Type resolution - turns schema nodes into [`Type`] descriptors.

use std::sync::Arc;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::context::Context;
use crate::error::{GenerateError, ResolutionError};
use crate::link::{placeholders, Link, LinkDef};
use crate::naming::{name_from_key, upper_camel_case};
use crate::root::{Definition, Root};
use crate::types::{
    json_type_name, ArrayType, ColumnHint, EnumType, Items, ObjectType, PrimitiveType, Property,
    ReferenceType, Type, TypeMeta,
};
use crate::validations;

/// Everything a rendering layer needs from one document.
#[derive(Debug)]
pub struct ResolvedDocument<'a> {
    /// The document root, when it declares a type of its own.
    pub root: Option<Arc<Type<'a>>>,
    /// Named definitions in declaration order.
    pub definitions: Vec<Arc<Type<'a>>>,
    /// Links of the root and of every definition, in document order.
    pub links: Vec<Link<'a>>,
}

impl<'a> ResolvedDocument<'a> {
    /// Look up a definition by name.
    pub fn definition(&self, name: &str) -> Option<&Arc<Type<'a>>> {
        self.definitions.iter().find(|t| t.key() == name)
    }
}

impl Serialize for ResolvedDocument<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ResolvedDocument", 3)?;
        state.serialize_field("Root", &self.root)?;
        state.serialize_field("Definitions", &self.definitions)?;
        state.serialize_field("Links", &self.links)?;
        state.end()
    }
}

/// Resolve a whole document: definitions, the root type and every link.
///
/// Each named definition is resolved once; every `$ref` to it shares the
/// same [`Arc<Type>`]. Any resolution failure aborts the run.
///
/// # Errors
///
/// Returns `GenerateError::Resolution` for unsupported schema constructs and
/// `GenerateError::Url` for malformed link URLs.
pub fn resolve_document(root: &Root) -> Result<ResolvedDocument<'_>, GenerateError> {
    let base = Context::new(root, "");

    let mut definitions = Vec::new();
    for def in root.definitions() {
        let resolved = resolve_definition(&base, &def)?;
        debug!(key = resolved.key(), name = resolved.name(), "resolved definition");
        definitions.push(resolved);
    }

    let document = root.document();
    let root_type = if declares_type(document) {
        Some(resolve(&base.at("").expanding("#"), document)?)
    } else {
        None
    };

    let mut links = Vec::new();
    resolve_links(&base, "", document, root_type.as_ref(), &mut links)?;
    for (def, owner) in root.definitions().into_iter().zip(&definitions) {
        resolve_links(&base, def.name, def.node, Some(owner), &mut links)?;
    }

    Ok(ResolvedDocument {
        root: root_type,
        definitions,
        links,
    })
}

/// Resolve one schema node at the position described by `ctx`.
///
/// # Errors
///
/// Returns `ResolutionError` when the node is not an object, declares an
/// unknown or ambiguous type, is an array without items, or holds a `$ref`
/// that cannot be found.
pub fn resolve<'a>(ctx: &Context<'a>, node: &'a Value) -> Result<Arc<Type<'a>>, ResolutionError> {
    let Some(map) = node.as_object() else {
        return Err(ResolutionError::InvalidSchema {
            path: ctx.key().to_string(),
            actual: json_type_name(node).to_string(),
        });
    };

    if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
        return resolve_ref(ctx, node, reference);
    }

    let declared = declared_types(ctx, map)?;
    ensure_unambiguous(ctx, &declared)?;
    let meta = build_meta(ctx, node, map, declared);
    trace!(key = ctx.key(), "resolving node");

    if let Some(values) = map.get("enum").and_then(Value::as_array) {
        let base_type = meta
            .declared_types
            .iter()
            .find(|t| *t != "null")
            .cloned();
        return Ok(Arc::new(Type::Enum(EnumType {
            meta,
            values: values.clone(),
            base_type,
        })));
    }

    let primary = primary_type(ctx, map, &meta.declared_types)?;
    let resolved = match primary.as_str() {
        "object" => resolve_object(ctx, node, map, meta)?,
        "array" => resolve_array(ctx, node, map, meta)?,
        "string" => Type::String(PrimitiveType { meta }),
        "number" => Type::Number(PrimitiveType { meta }),
        "integer" => Type::Integer(PrimitiveType { meta }),
        "boolean" => Type::Boolean(PrimitiveType { meta }),
        other => {
            return Err(ResolutionError::UnsupportedType {
                path: ctx.key().to_string(),
                type_name: other.to_string(),
            })
        }
    };
    Ok(Arc::new(resolved))
}

// --- Internal implementation ---

/// Resolve a named definition once per run, keyed by its pointer.
fn resolve_definition<'a>(
    ctx: &Context<'a>,
    def: &Definition<'a>,
) -> Result<Arc<Type<'a>>, ResolutionError> {
    if let Some(resolved) = ctx.cached(&def.pointer) {
        return Ok(resolved);
    }
    let resolved = resolve(&ctx.at(def.name).expanding(def.pointer.clone()), def.node)?;
    ctx.remember(def.pointer.clone(), Arc::clone(&resolved));
    Ok(resolved)
}

fn resolve_ref<'a>(
    ctx: &Context<'a>,
    node: &'a Value,
    reference: &str,
) -> Result<Arc<Type<'a>>, ResolutionError> {
    let root = ctx.root();
    let (pointer, target) = root
        .resolve_ref(reference)
        .ok_or_else(|| ResolutionError::UnresolvedRef {
            path: ctx.key().to_string(),
            reference: reference.to_string(),
        })?;

    if ctx.is_expanding(&pointer) {
        trace!(key = ctx.key(), pointer = %pointer, "recursive reference");
        let title = target
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let name = if title.trim().is_empty() {
            name_from_key(&pointer.replace('/', "."))
        } else {
            upper_camel_case(&title)
        };
        return Ok(Arc::new(Type::Reference(ReferenceType {
            meta: TypeMeta {
                raw: Some(node),
                key: ctx.key().to_string(),
                type_name: name.clone(),
                name,
                title,
                is_private: ctx.is_nested(),
                ..TypeMeta::default()
            },
            target: reference.to_string(),
        })));
    }

    if let Some(def) = root.definition(&pointer) {
        return resolve_definition(ctx, &def);
    }
    resolve(&ctx.clone().expanding(pointer), target)
}

fn resolve_object<'a>(
    ctx: &Context<'a>,
    node: &'a Value,
    map: &'a Map<String, Value>,
    meta: TypeMeta<'a>,
) -> Result<Type<'a>, ResolutionError> {
    let mut properties = Vec::new();
    if let Some(props) = map.get("properties").and_then(Value::as_object) {
        for (name, child) in props {
            let schema = resolve(&ctx.child(name, node), child)?;
            properties.push(Property {
                name: name.clone(),
                schema,
            });
        }
    }

    let required = map
        .get("required")
        .and_then(Value::as_array)
        .map(|names| {
            names
                .iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default();

    Ok(Type::Object(ObjectType {
        meta,
        properties,
        required,
    }))
}

fn resolve_array<'a>(
    ctx: &Context<'a>,
    node: &'a Value,
    map: &'a Map<String, Value>,
    meta: TypeMeta<'a>,
) -> Result<Type<'a>, ResolutionError> {
    let items = match map.get("items") {
        Some(item @ Value::Object(_)) => Items::List(resolve(&ctx.child("items", node), item)?),
        Some(Value::Array(schemas)) => Items::Tuple(
            schemas
                .iter()
                .enumerate()
                .map(|(i, item)| resolve(&ctx.child(&i.to_string(), node), item))
                .collect::<Result<_, _>>()?,
        ),
        Some(other) => {
            return Err(ResolutionError::InvalidItems {
                path: ctx.key().to_string(),
                actual: json_type_name(other).to_string(),
            })
        }
        None => {
            return Err(ResolutionError::MissingItems {
                path: ctx.key().to_string(),
            })
        }
    };

    Ok(Type::Array(ArrayType { meta, items }))
}

fn declared_types(
    ctx: &Context<'_>,
    map: &Map<String, Value>,
) -> Result<Vec<String>, ResolutionError> {
    let invalid = |actual: &Value| ResolutionError::InvalidTypeDeclaration {
        path: ctx.key().to_string(),
        actual: json_type_name(actual).to_string(),
    };

    match map.get("type") {
        None => Ok(Vec::new()),
        Some(Value::String(name)) => Ok(vec![name.clone()]),
        Some(Value::Array(names)) => names
            .iter()
            .map(|v| v.as_str().map(String::from).ok_or_else(|| invalid(v)))
            .collect(),
        Some(other) => Err(invalid(other)),
    }
}

/// Under `strict_types`, more than one non-null declared type is an error,
/// enums included.
fn ensure_unambiguous(ctx: &Context<'_>, declared: &[String]) -> Result<(), ResolutionError> {
    let concrete = declared.iter().filter(|t| *t != "null").count();
    if ctx.root().strict_types() && concrete > 1 {
        return Err(ResolutionError::AmbiguousType {
            path: ctx.key().to_string(),
            types: declared.to_vec(),
        });
    }
    Ok(())
}

/// Pick the type that drives structure.
///
/// `null` only marks nullability and the first remaining declared type
/// wins. Untyped nodes are inferred from `properties` / `items`.
fn primary_type(
    ctx: &Context<'_>,
    map: &Map<String, Value>,
    declared: &[String],
) -> Result<String, ResolutionError> {
    if let Some(first) = declared.iter().find(|t| *t != "null") {
        return Ok(first.clone());
    }
    if !declared.is_empty() {
        return Err(ResolutionError::UnsupportedType {
            path: ctx.key().to_string(),
            type_name: "null".to_string(),
        });
    }
    if map.contains_key("properties") {
        return Ok("object".to_string());
    }
    if map.contains_key("items") {
        return Ok("array".to_string());
    }
    Err(ResolutionError::MissingType {
        path: ctx.key().to_string(),
    })
}

fn build_meta<'a>(
    ctx: &Context<'a>,
    node: &'a Value,
    map: &Map<String, Value>,
    declared_types: Vec<String>,
) -> TypeMeta<'a> {
    let text = |k: &str| map.get(k).and_then(Value::as_str).map(String::from);
    let flag = |k: &str| map.get(k).and_then(Value::as_bool).unwrap_or(false);

    let title = text("title").unwrap_or_default();
    let name = if title.trim().is_empty() {
        name_from_key(ctx.key())
    } else {
        upper_camel_case(&title)
    };
    let column = ColumnHint::from_node(node)
        .or_else(|| ctx.column().cloned())
        .unwrap_or_default();
    let example = map.get("example").cloned().or_else(|| {
        map.get("examples")
            .and_then(Value::as_array)
            .and_then(|e| e.first())
            .cloned()
    });

    TypeMeta {
        raw: Some(node),
        key: ctx.key().to_string(),
        type_name: name.clone(),
        name,
        title,
        description: text("description"),
        nullable: declared_types.iter().any(|t| t == "null"),
        declared_types,
        format: text("format"),
        default: map.get("default").cloned(),
        example,
        read_only: flag("readOnly"),
        write_only: flag("writeOnly"),
        is_private: ctx.is_nested() || flag("private"),
        column_name: column.name,
        column_type: column.column_type,
        validations: validations::extract(node),
    }
}

fn declares_type(node: &Value) -> bool {
    ["type", "properties", "items", "enum"]
        .iter()
        .any(|k| node.get(*k).is_some())
}

/// Build the links declared on `owner_node`.
fn resolve_links<'a>(
    base: &Context<'a>,
    owner_key: &str,
    owner_node: &'a Value,
    owner: Option<&Arc<Type<'a>>>,
    out: &mut Vec<Link<'a>>,
) -> Result<(), GenerateError> {
    let Some(defs) = owner_node.get("links").and_then(Value::as_array) else {
        return Ok(());
    };

    for (i, raw) in defs.iter().enumerate() {
        let ctx = base.at(owner_key).child(&format!("links.{}", i), owner_node);
        let def: LinkDef =
            serde_json::from_value(raw.clone()).map_err(|e| ResolutionError::InvalidLink {
                path: ctx.key().to_string(),
                message: e.to_string(),
            })?;

        // The root "self" link declares the base URL, not an operation.
        if owner_key.is_empty() && def.rel.as_deref() == Some("self") {
            continue;
        }

        let schema = raw
            .get("schema")
            .map(|s| resolve(&ctx.child("schema", raw), s))
            .transpose()?;
        let target_schema = match raw.get("targetSchema") {
            Some(s) => Some(resolve(&ctx.child("targetSchema", raw), s)?),
            None if def.rel.as_deref() == Some("self") => owner.cloned(),
            None => None,
        };
        let url_parameters = url_parameters(&ctx, raw, &def.href, owner_node)?;

        let link = Link::new(
            &def,
            schema,
            target_schema,
            base.root(),
            url_parameters,
            ctx.key(),
        )?;
        debug!(key = ctx.key(), method = %link.method, url = %link.url, "resolved link");
        out.push(link);
    }
    Ok(())
}

/// Resolve the `{...}` placeholders of an href, in order of appearance.
fn url_parameters<'a>(
    ctx: &Context<'a>,
    link: &'a Value,
    href: &str,
    owner_node: &'a Value,
) -> Result<Vec<Arc<Type<'a>>>, ResolutionError> {
    placeholders(href)
        .into_iter()
        .map(|param| {
            let node = if param.reference.starts_with('#') {
                ctx.root().lookup(&param.reference)
            } else {
                owner_node
                    .get("properties")
                    .and_then(|props| props.get(&param.reference))
            };
            let node = node.ok_or_else(|| ResolutionError::UnknownUrlParameter {
                path: ctx.key().to_string(),
                name: param.reference.clone(),
            })?;
            resolve(&ctx.child(&param.name, link), node)
        })
        .collect()
}
