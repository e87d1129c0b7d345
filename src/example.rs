//! Example values for resolved types.
//!
//! Output is deterministic: declared `example`/`default` values win, and
//! everything else gets a fixed placeholder (`""`, `0`, `false`).

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::types::Type;

/// Generate an example value for `ty`.
///
/// `writable` selects the request view: read-only properties are left out.
/// Otherwise write-only properties are left out (the response view).
pub fn generate(ty: &Type<'_>, writable: bool) -> Value {
    Expander {
        writable,
        active: HashSet::new(),
    }
    .expand(ty)
}

/// Walks a type tree, tracking the key paths currently being expanded.
struct Expander<'t> {
    writable: bool,
    active: HashSet<&'t str>,
}

impl<'t> Expander<'t> {
    fn expand(&mut self, ty: &'t Type<'_>) -> Value {
        if !self.active.insert(ty.key()) {
            return Value::Null;
        }
        let value = self.expand_inner(ty);
        self.active.remove(ty.key());
        value
    }

    fn expand_inner(&mut self, ty: &'t Type<'_>) -> Value {
        let declared = ty.meta().declared_example().cloned();
        match ty {
            Type::Object(obj) => {
                let mut map = Map::new();
                for prop in &obj.properties {
                    let meta = prop.schema.meta();
                    if (self.writable && meta.read_only) || (!self.writable && meta.write_only) {
                        continue;
                    }
                    map.insert(prop.name.clone(), self.expand(&prop.schema));
                }
                Value::Object(map)
            }
            Type::Array(arr) => Value::Array(
                arr.item_types()
                    .iter()
                    .map(|item| self.expand(item))
                    .collect(),
            ),
            Type::String(_) => declared.unwrap_or_else(|| Value::String(String::new())),
            Type::Number(_) | Type::Integer(_) => declared.unwrap_or_else(|| Value::from(0)),
            Type::Boolean(_) => declared.unwrap_or(Value::Bool(false)),
            Type::Enum(e) => declared
                .or_else(|| e.values.first().cloned())
                .unwrap_or(Value::Null),
            Type::Reference(_) => Value::Null,
        }
    }
}
