//! The hyper-schema document being resolved.

use std::collections::HashMap;

use serde_json::Value;
use url::Url;

use crate::error::UrlError;
use crate::loader::navigate_fragment;
use crate::types::ResolveOptions;

/// Keywords holding named sub-schemas.
const DEFINITION_KEYWORDS: &[&str] = &["definitions", "$defs"];

/// A named sub-schema of the document.
#[derive(Debug, Clone)]
pub struct Definition<'a> {
    pub name: &'a str,
    /// Canonical JSON-Pointer fragment, e.g. `#/definitions/user`.
    pub pointer: String,
    pub node: &'a Value,
}

/// Owns the parsed document and its base URL for one generation run.
#[derive(Debug)]
pub struct Root {
    document: Value,
    url: Url,
    strict_types: bool,
    /// Declared `id`/`$id` values mapped to canonical pointers.
    ids: HashMap<String, String>,
}

impl Root {
    /// Wrap a parsed document.
    ///
    /// The base URL comes from `options.base_url`, falling back to the href
    /// of the document's root link with `rel: "self"`.
    ///
    /// # Errors
    ///
    /// Returns `UrlError` if no base URL is available or it is not an
    /// absolute URL.
    pub fn new(document: Value, options: &ResolveOptions) -> Result<Self, UrlError> {
        let base = options
            .base_url
            .clone()
            .or_else(|| self_href(&document))
            .ok_or(UrlError::MissingBaseUrl)?;

        let url = Url::parse(&base).map_err(|source| UrlError::InvalidBaseUrl {
            url: base.clone(),
            source,
        })?;
        if url.cannot_be_a_base() {
            return Err(UrlError::InvalidBaseUrl {
                url: base,
                source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
            });
        }

        let mut root = Self {
            document,
            url,
            strict_types: options.strict_types,
            ids: HashMap::new(),
        };
        root.ids = root.collect_ids();
        Ok(root)
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Absolute base URL of the API.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn strict_types(&self) -> bool {
        self.strict_types
    }

    /// Named sub-schemas in declaration order.
    pub fn definitions(&self) -> Vec<Definition<'_>> {
        DEFINITION_KEYWORDS
            .iter()
            .filter_map(|keyword| {
                self.document
                    .get(*keyword)
                    .and_then(Value::as_object)
                    .map(|defs| (*keyword, defs))
            })
            .flat_map(|(keyword, defs)| {
                defs.iter().map(move |(name, node)| Definition {
                    name,
                    pointer: format!("#/{}/{}", keyword, escape_pointer_token(name)),
                    node,
                })
            })
            .collect()
    }

    /// The named definition at a canonical pointer.
    pub fn definition(&self, pointer: &str) -> Option<Definition<'_>> {
        self.definitions().into_iter().find(|d| d.pointer == pointer)
    }

    /// Find the node a `$ref` points at.
    pub fn lookup(&self, reference: &str) -> Option<&Value> {
        self.resolve_ref(reference).map(|(_, node)| node)
    }

    /// Find the node a `$ref` points at, along with its canonical pointer.
    ///
    /// Accepts document fragments (`#/definitions/user`), declared ids
    /// (`#user`, `user`, `https://example.com/schemata/user`) and ids
    /// followed by a fragment (`user#/properties/id`).
    pub fn resolve_ref(&self, reference: &str) -> Option<(String, &Value)> {
        let (base, fragment) = match reference.find('#') {
            Some(idx) => (&reference[..idx], &reference[idx + 1..]),
            None => (reference, ""),
        };

        let pointer = if base.is_empty() {
            if fragment.is_empty() || fragment.starts_with('/') {
                format!("#{}", fragment)
            } else {
                // Plain-name fragment: `#user`
                self.id_pointer(reference)?.to_string()
            }
        } else {
            let prefix = self.id_pointer(base)?;
            format!("{}{}", prefix, fragment)
        };

        navigate_fragment(&self.document, &pointer)
            .ok()
            .map(|node| (pointer, node))
    }

    fn id_pointer(&self, id: &str) -> Option<&str> {
        self.ids
            .get(id)
            .or_else(|| self.ids.get(id.trim_start_matches('#')))
            .map(String::as_str)
    }

    fn collect_ids(&self) -> HashMap<String, String> {
        let mut ids = HashMap::new();
        for def in self.definitions() {
            let declared = ["id", "$id"]
                .iter()
                .find_map(|k| def.node.get(*k).and_then(Value::as_str));
            if let Some(id) = declared {
                ids.insert(id.to_string(), def.pointer.clone());
                ids.insert(id.trim_start_matches('#').to_string(), def.pointer.clone());
            }
        }
        ids
    }
}

fn self_href(document: &Value) -> Option<String> {
    document
        .get("links")?
        .as_array()?
        .iter()
        .find(|link| link.get("rel").and_then(Value::as_str) == Some("self"))
        .and_then(|link| link.get("href"))
        .and_then(Value::as_str)
        .map(String::from)
}

fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options() -> ResolveOptions {
        ResolveOptions::new().base_url("https://api.example.com")
    }

    #[test]
    fn base_url_from_options() {
        let root = Root::new(json!({}), &options()).unwrap();
        assert_eq!(root.url().host_str(), Some("api.example.com"));
    }

    #[test]
    fn base_url_from_self_link() {
        let doc = json!({
            "links": [{ "rel": "self", "href": "https://example.org/v1" }]
        });
        let root = Root::new(doc, &ResolveOptions::new()).unwrap();
        assert_eq!(root.url().as_str(), "https://example.org/v1");
    }

    #[test]
    fn missing_base_url() {
        let result = Root::new(json!({}), &ResolveOptions::new());
        assert!(matches!(result, Err(UrlError::MissingBaseUrl)));
    }

    #[test]
    fn relative_base_url_rejected() {
        let result = Root::new(json!({}), &ResolveOptions::new().base_url("/v1"));
        assert!(matches!(result, Err(UrlError::InvalidBaseUrl { .. })));

        let result = Root::new(json!({}), &ResolveOptions::new().base_url("mailto:a@b.c"));
        assert!(matches!(result, Err(UrlError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn definitions_in_declaration_order() {
        let doc = json!({
            "definitions": { "user": {}, "app": {} },
            "$defs": { "a/b": {} }
        });
        let root = Root::new(doc, &options()).unwrap();
        let defs = root.definitions();
        let names: Vec<&str> = defs.iter().map(|d| d.name).collect();
        assert_eq!(names, ["user", "app", "a/b"]);
        assert_eq!(defs[2].pointer, "#/$defs/a~1b");

        assert_eq!(root.definition("#/$defs/a~1b").unwrap().name, "a/b");
        assert!(root.definition("#/definitions/user/properties").is_none());
    }

    #[test]
    fn lookup_by_pointer_and_id() {
        let doc = json!({
            "definitions": {
                "user": {
                    "id": "schemata/user",
                    "type": "object",
                    "properties": { "id": { "type": "integer" } }
                },
                "app": { "$id": "#app", "type": "string" }
            }
        });
        let root = Root::new(doc, &options()).unwrap();

        assert_eq!(root.lookup("#/definitions/user").unwrap()["type"], "object");
        assert_eq!(root.lookup("schemata/user").unwrap()["type"], "object");
        assert_eq!(
            root.lookup("schemata/user#/properties/id").unwrap()["type"],
            "integer"
        );
        assert_eq!(root.lookup("#app").unwrap()["type"], "string");

        let (pointer, _) = root.resolve_ref("schemata/user").unwrap();
        assert_eq!(pointer, "#/definitions/user");
        assert!(root.lookup("#/definitions/missing").is_none());
        assert!(root.lookup("unknown").is_none());
    }
}
