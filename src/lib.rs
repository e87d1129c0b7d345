//! Schema Type Generator
//!
//! Resolves JSON Hyper-Schema documents into a template-ready type graph.
//!
//! Every schema node becomes a [`Type`] (object, array, string, number,
//! integer, boolean or enum) carrying a generated name, its key path,
//! persistence hints and validation directives. Every hyper-schema link
//! becomes a [`Link`] with a resolved URL, conventional status line,
//! sorted headers and example request/response bodies.
//!
//! # Example
//!
//! ```
//! use schema_typegen::{resolve_document, ResolveOptions, Root};
//! use serde_json::json;
//!
//! let document = json!({
//!     "definitions": {
//!         "user": {
//!             "type": "object",
//!             "title": "User",
//!             "properties": { "name": { "type": "string" } },
//!             "required": ["name"],
//!             "links": [
//!                 { "href": "/users", "method": "POST", "rel": "create",
//!                   "schema": { "$ref": "#/definitions/user" } }
//!             ]
//!         }
//!     }
//! });
//!
//! let options = ResolveOptions::new().base_url("https://api.example.com");
//! let root = Root::new(document, &options).unwrap();
//! let resolved = resolve_document(&root).unwrap();
//!
//! let user = resolved.definition("user").unwrap();
//! assert_eq!(user.name(), "User");
//! assert_eq!(user.example(true), json!({ "name": "" }));
//!
//! let create = &resolved.links[0];
//! assert_eq!(create.url.as_str(), "https://api.example.com/users");
//! assert_eq!(create.res_status_code(), 201);
//! ```
//!
//! # Naming
//!
//! | Source | Name |
//! |--------|------|
//! | `"title": "user profile"` | `UserProfile` |
//! | `"title": "user_profile"` | `UserProfile` |
//! | no title, key `user.home_address` | `HomeAddress` |
//! | no title, tuple position `point.1` | `Item1` |

mod conformance;
mod context;
mod error;
mod example;
mod link;
mod loader;
mod naming;
mod resolver;
mod root;
mod types;
mod validations;

pub use conformance::validate_example;
pub use context::Context;
pub use error::{
    GenerateError, LoadError, ResolutionError, SerializationError, UrlError, ValidateError,
    Violation,
};
pub use example::generate as generate_example;
pub use link::{
    placeholders, reason_phrase, status_code, Header, Link, LinkDef, Placeholder,
    DEFAULT_STATUS_CODE,
};
pub use loader::{is_url, load_schema, load_schema_auto, load_schema_str, navigate_fragment};
pub use naming::{link_function_name, name_from_key, upper_camel_case};
pub use resolver::{resolve, resolve_document, ResolvedDocument};
pub use root::{Definition, Root};
pub use types::{
    json_type_name, ArrayType, ColumnHint, EnumType, Items, ObjectType, PrimitiveType, Property,
    ReferenceType, ResolveOptions, Type, TypeMeta,
};
pub use validations::{extract as extract_validations, Validation, ValidationKind};

#[cfg(feature = "remote")]
pub use loader::load_schema_url;
