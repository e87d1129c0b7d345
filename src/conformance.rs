//! Checking generated examples against their source schema.

use serde_json::Value;

use crate::error::{ValidateError, Violation};
use crate::root::Root;
use crate::types::Type;

/// Document keywords copied next to a type's raw schema so that internal
/// `$ref`s and the declared dialect still apply.
const CARRIED_KEYWORDS: &[&str] = &["$schema", "definitions", "$defs"];

/// Validate `example` against the schema `ty` was resolved from.
///
/// # Errors
///
/// Returns `ValidateError::Schema` if the schema cannot be compiled, or
/// `ValidateError::Invalid` listing every violation.
pub fn validate_example(root: &Root, ty: &Type<'_>, example: &Value) -> Result<(), ValidateError> {
    let schema = standalone_schema(root, ty);
    let validator = jsonschema::validator_for(&schema).map_err(|e| ValidateError::Schema {
        message: e.to_string(),
    })?;

    let errors: Vec<Violation> = validator
        .iter_errors(example)
        .map(|e| Violation {
            path: e.instance_path.to_string(),
            message: e.to_string(),
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidateError::Invalid { errors })
    }
}

fn standalone_schema(root: &Root, ty: &Type<'_>) -> Value {
    let mut schema = ty.raw().clone();
    if let Value::Object(map) = &mut schema {
        for keyword in CARRIED_KEYWORDS {
            if let Some(value) = root.document().get(*keyword) {
                map.entry(keyword.to_string())
                    .or_insert_with(|| value.clone());
            }
        }
    }
    schema
}
