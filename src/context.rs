//! Resolution-time state threaded through recursive descent.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use serde_json::Value;

use crate::root::Root;
use crate::types::{ColumnHint, Type};

/// Where the resolver currently is in the document.
///
/// Cloned into every recursive call; the root reference never changes after
/// creation. Contexts derived from one another share a table of named
/// definitions already resolved, keyed by pointer.
#[derive(Debug, Clone)]
pub struct Context<'a> {
    root: &'a Root,
    key: String,
    raw: Option<&'a Value>,
    column: Option<ColumnHint>,
    expanding: Vec<String>,
    depth: usize,
    resolved: Rc<RefCell<HashMap<String, Arc<Type<'a>>>>>,
}

impl<'a> Context<'a> {
    /// Top-level context at `key`.
    pub fn new(root: &'a Root, key: impl Into<String>) -> Self {
        Self {
            root,
            key: key.into(),
            raw: None,
            column: None,
            expanding: Vec::new(),
            depth: 0,
            resolved: Rc::default(),
        }
    }

    /// Top-level context at `key` that keeps the expansion stack and the
    /// resolved-definition table of `self`.
    pub fn at(&self, key: impl Into<String>) -> Self {
        Self {
            root: self.root,
            key: key.into(),
            raw: None,
            column: None,
            expanding: self.expanding.clone(),
            depth: 0,
            resolved: Rc::clone(&self.resolved),
        }
    }

    pub fn root(&self) -> &'a Root {
        self.root
    }

    /// Dotted key path of the node being resolved.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The enclosing schema node, if any.
    pub fn raw(&self) -> Option<&'a Value> {
        self.raw
    }

    /// Column hint of the nearest enclosing node that declares one.
    pub fn column(&self) -> Option<&ColumnHint> {
        self.column.as_ref()
    }

    pub fn is_nested(&self) -> bool {
        self.depth > 0
    }

    /// Context for a child of `parent`, one segment deeper.
    pub fn child(&self, segment: &str, parent: &'a Value) -> Self {
        let key = if self.key.is_empty() {
            segment.to_string()
        } else {
            format!("{}.{}", self.key, segment)
        };
        Self {
            root: self.root,
            key,
            raw: Some(parent),
            column: ColumnHint::from_node(parent).or_else(|| self.column.clone()),
            expanding: self.expanding.clone(),
            depth: self.depth + 1,
            resolved: Rc::clone(&self.resolved),
        }
    }

    /// Whether `pointer` is already being expanded on the current path.
    pub fn is_expanding(&self, pointer: &str) -> bool {
        self.expanding.iter().any(|p| p == pointer)
    }

    /// Same position, with `pointer` marked as being expanded.
    pub fn expanding(mut self, pointer: impl Into<String>) -> Self {
        self.expanding.push(pointer.into());
        self
    }

    /// The already resolved definition at `pointer`, if any.
    pub fn cached(&self, pointer: &str) -> Option<Arc<Type<'a>>> {
        self.resolved.borrow().get(pointer).cloned()
    }

    /// Record the resolved definition at `pointer`.
    pub fn remember(&self, pointer: impl Into<String>, resolved: Arc<Type<'a>>) {
        self.resolved.borrow_mut().insert(pointer.into(), resolved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResolveOptions;
    use serde_json::json;

    fn root() -> Root {
        Root::new(json!({}), &ResolveOptions::new().base_url("https://api.example.com")).unwrap()
    }

    #[test]
    fn child_extends_key_path() {
        let root = root();
        let parent = json!({});
        let ctx = Context::new(&root, "user");
        let child = ctx.child("address", &parent).child("city", &parent);
        assert_eq!(child.key(), "user.address.city");
        assert!(child.is_nested());
        assert!(!ctx.is_nested());
    }

    #[test]
    fn child_of_empty_key() {
        let root = root();
        let parent = json!({});
        let child = Context::new(&root, "").child("name", &parent);
        assert_eq!(child.key(), "name");
    }

    #[test]
    fn column_inherited_from_nearest_declaring_ancestor() {
        let root = root();
        let outer = json!({ "column": { "name": "profile", "type": "JSONB" } });
        let inner = json!({ "type": "object" });
        let ctx = Context::new(&root, "user")
            .child("profile", &outer)
            .child("bio", &inner);
        assert_eq!(ctx.column().unwrap().name, "profile");
        assert_eq!(ctx.raw(), Some(&inner));
    }

    #[test]
    fn expanding_tracks_pointers() {
        let root = root();
        let parent = json!({});
        let ctx = Context::new(&root, "user").expanding("#/definitions/user");
        let child = ctx.child("friend", &parent);
        assert!(child.is_expanding("#/definitions/user"));
        assert!(!child.is_expanding("#/definitions/app"));
    }

    #[test]
    fn at_shares_resolved_definitions() {
        let root = root();
        let parent = json!({});
        let ctx = Context::new(&root, "user").expanding("#/definitions/user");
        let child = ctx.child("address", &parent);
        let resolved = Arc::new(Type::String(crate::types::PrimitiveType {
            meta: crate::types::TypeMeta {
                key: "email".into(),
                ..Default::default()
            },
        }));
        child.remember("#/definitions/email", Arc::clone(&resolved));

        let other = child.at("app");
        assert_eq!(other.key(), "app");
        assert!(!other.is_nested());
        assert!(other.is_expanding("#/definitions/user"));
        assert!(Arc::ptr_eq(&other.cached("#/definitions/email").unwrap(), &resolved));
        assert!(Context::new(&root, "app").cached("#/definitions/email").is_none());
    }
}
