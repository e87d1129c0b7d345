//! Constraint keyword extraction.
//!
//! Maps the constraint keywords of a single schema node onto a flat,
//! deterministically ordered list of [`Validation`] directives. Child nodes
//! are never inspected; each resolved type extracts its own.

use serde::Serialize;
use serde_json::{Map, Value};

/// Kind of constraint carried by a [`Validation`].
///
/// Declaration order is the sort order of extracted validations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationKind {
    MinLength,
    MaxLength,
    Pattern,
    Minimum,
    Maximum,
    ExclusiveMinimum,
    ExclusiveMaximum,
    MultipleOf,
    MinItems,
    MaxItems,
    UniqueItems,
    MinProperties,
    MaxProperties,
    Required,
    Enum,
    Const,
}

impl ValidationKind {
    /// The schema keyword this kind is read from.
    pub fn keyword(&self) -> &'static str {
        match self {
            ValidationKind::MinLength => "minLength",
            ValidationKind::MaxLength => "maxLength",
            ValidationKind::Pattern => "pattern",
            ValidationKind::Minimum => "minimum",
            ValidationKind::Maximum => "maximum",
            ValidationKind::ExclusiveMinimum => "exclusiveMinimum",
            ValidationKind::ExclusiveMaximum => "exclusiveMaximum",
            ValidationKind::MultipleOf => "multipleOf",
            ValidationKind::MinItems => "minItems",
            ValidationKind::MaxItems => "maxItems",
            ValidationKind::UniqueItems => "uniqueItems",
            ValidationKind::MinProperties => "minProperties",
            ValidationKind::MaxProperties => "maxProperties",
            ValidationKind::Required => "required",
            ValidationKind::Enum => "enum",
            ValidationKind::Const => "const",
        }
    }
}

/// Keywords whose value is a plain number.
const NUMERIC: &[ValidationKind] = &[
    ValidationKind::MinLength,
    ValidationKind::MaxLength,
    ValidationKind::MultipleOf,
    ValidationKind::MinItems,
    ValidationKind::MaxItems,
    ValidationKind::MinProperties,
    ValidationKind::MaxProperties,
];

/// A single constraint directive.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Validation {
    pub kind: ValidationKind,
    pub value: Value,
}

impl Validation {
    pub fn new(kind: ValidationKind, value: Value) -> Self {
        Self { kind, value }
    }
}

/// Extract the validations declared directly on `node`.
///
/// Unrecognized keywords and values of the wrong JSON type are ignored.
pub fn extract(node: &Value) -> Vec<Validation> {
    let Some(map) = node.as_object() else {
        return Vec::new();
    };

    let mut out: Vec<Validation> = NUMERIC
        .iter()
        .filter_map(|kind| {
            map.get(kind.keyword())
                .filter(|v| v.is_number())
                .map(|v| Validation::new(*kind, v.clone()))
        })
        .collect();

    if let Some(pattern) = map.get("pattern").filter(|v| v.is_string()) {
        out.push(Validation::new(ValidationKind::Pattern, pattern.clone()));
    }

    extract_bounds(map, &mut out);

    if map.get("uniqueItems") == Some(&Value::Bool(true)) {
        out.push(Validation::new(ValidationKind::UniqueItems, Value::Bool(true)));
    }

    for kind in [ValidationKind::Required, ValidationKind::Enum] {
        if let Some(list) = map
            .get(kind.keyword())
            .filter(|v| v.as_array().map_or(false, |a| !a.is_empty()))
        {
            out.push(Validation::new(kind, list.clone()));
        }
    }

    if let Some(constant) = map.get("const") {
        out.push(Validation::new(ValidationKind::Const, constant.clone()));
    }

    out.sort_by(|a, b| {
        a.kind
            .cmp(&b.kind)
            .then_with(|| a.value.to_string().cmp(&b.value.to_string()))
    });
    out
}

/// Range keywords, accepting both the numeric form of `exclusiveMinimum`
/// and the older boolean modifier on `minimum`.
fn extract_bounds(map: &Map<String, Value>, out: &mut Vec<Validation>) {
    let bounds = [
        (ValidationKind::Minimum, ValidationKind::ExclusiveMinimum),
        (ValidationKind::Maximum, ValidationKind::ExclusiveMaximum),
    ];

    for (inclusive, exclusive) in bounds {
        let limit = map.get(inclusive.keyword()).filter(|v| v.is_number());
        match (map.get(exclusive.keyword()), limit) {
            (Some(Value::Bool(true)), Some(limit)) => {
                out.push(Validation::new(exclusive, limit.clone()));
            }
            (Some(v @ Value::Number(_)), limit) => {
                out.push(Validation::new(exclusive, v.clone()));
                if let Some(limit) = limit {
                    out.push(Validation::new(inclusive, limit.clone()));
                }
            }
            (_, Some(limit)) => out.push(Validation::new(inclusive, limit.clone())),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn kinds(validations: &[Validation]) -> Vec<ValidationKind> {
        validations.iter().map(|v| v.kind).collect()
    }

    #[test]
    fn extracts_string_constraints() {
        let node = json!({
            "type": "string",
            "pattern": "^[a-z]+$",
            "maxLength": 32,
            "minLength": 1
        });
        let v = extract(&node);
        assert_eq!(
            kinds(&v),
            [
                ValidationKind::MinLength,
                ValidationKind::MaxLength,
                ValidationKind::Pattern
            ]
        );
        assert_eq!(v[0].value, json!(1));
        assert_eq!(v[2].value, json!("^[a-z]+$"));
    }

    #[test]
    fn order_is_independent_of_declaration_order() {
        let a = json!({ "maximum": 10, "minimum": 1, "multipleOf": 2 });
        let b = json!({ "multipleOf": 2, "minimum": 1, "maximum": 10 });
        assert_eq!(extract(&a), extract(&b));
    }

    #[test]
    fn boolean_exclusive_minimum() {
        let node = json!({ "minimum": 0, "exclusiveMinimum": true, "maximum": 5 });
        let v = extract(&node);
        assert_eq!(
            kinds(&v),
            [ValidationKind::Maximum, ValidationKind::ExclusiveMinimum]
        );
        assert_eq!(v[1].value, json!(0));
    }

    #[test]
    fn numeric_exclusive_maximum() {
        let node = json!({ "exclusiveMaximum": 100 });
        let v = extract(&node);
        assert_eq!(v, vec![Validation::new(ValidationKind::ExclusiveMaximum, json!(100))]);
    }

    #[test]
    fn required_and_enum_lists() {
        let node = json!({
            "required": ["id", "name"],
            "enum": ["a", "b"],
            "uniqueItems": true
        });
        let v = extract(&node);
        assert_eq!(
            kinds(&v),
            [
                ValidationKind::UniqueItems,
                ValidationKind::Required,
                ValidationKind::Enum
            ]
        );
        assert_eq!(v[1].value, json!(["id", "name"]));
    }

    #[test]
    fn ignores_unknown_and_mistyped_keywords() {
        let node = json!({
            "x-vendor": 1,
            "minLength": "three",
            "required": [],
            "uniqueItems": false
        });
        assert!(extract(&node).is_empty());
    }

    #[test]
    fn does_not_descend_into_children() {
        let node = json!({
            "type": "object",
            "properties": { "name": { "minLength": 1 } }
        });
        assert!(extract(&node).is_empty());
    }
}
