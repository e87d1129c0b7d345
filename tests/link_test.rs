//! Integration tests for hyper-schema links.

use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};
use schema_typegen::{
    load_schema, resolve_document, GenerateError, Header, Link, ResolutionError, ResolveOptions,
    ResolvedDocument, Root, Type, UrlError,
};

fn blog() -> Root {
    let document = load_schema(Path::new("tests/fixtures/blog.json")).unwrap();
    Root::new(document, &ResolveOptions::new()).unwrap()
}

fn link_titled<'d, 'a>(doc: &'d ResolvedDocument<'a>, title: &str) -> &'d Link<'a> {
    doc.links.iter().find(|l| l.title == title).unwrap()
}

mod fixture {
    use super::*;

    #[test]
    fn base_url_from_self_link() {
        let root = blog();
        let doc = resolve_document(&root).unwrap();
        assert_eq!(root.url().host_str(), Some("api.blog.example"));
        // The root self link is not an operation.
        assert_eq!(doc.links.len(), 4);
        assert!(doc.root.is_none());
    }

    #[test]
    fn links_in_document_order() {
        let root = blog();
        let doc = resolve_document(&root).unwrap();
        let keys: Vec<&str> = doc.links.iter().map(|l| l.key()).collect();
        assert_eq!(
            keys,
            ["post.links.0", "post.links.1", "post.links.2", "post.links.3"]
        );
    }

    #[test]
    fn status_lines_per_method() {
        let root = blog();
        let doc = resolve_document(&root).unwrap();
        let lines: Vec<(String, u16, &str)> = doc
            .links
            .iter()
            .map(|l| (l.method.clone(), l.res_status_code(), l.res_reason_phrase()))
            .collect();
        assert_eq!(
            lines,
            [
                ("GET".to_string(), 200, "OK"),
                ("POST".to_string(), 201, "Created"),
                ("GET".to_string(), 200, "OK"),
                ("DELETE".to_string(), 204, "No Content"),
            ]
        );
    }

    #[test]
    fn create_shares_definition_type() {
        let root = blog();
        let doc = resolve_document(&root).unwrap();
        let post = doc.definition("post").unwrap();
        let create = link_titled(&doc, "create");
        assert!(Arc::ptr_eq(create.schema.as_ref().unwrap(), post));
        assert!(Arc::ptr_eq(create.target_schema.as_ref().unwrap(), post));
    }

    #[test]
    fn create_exchange() {
        let root = blog();
        let doc = resolve_document(&root).unwrap();
        let create = link_titled(&doc, "create");

        assert_eq!(create.url.as_str(), "https://api.blog.example/posts");
        assert_eq!(create.request_target(), "/posts");
        assert_eq!(create.function_name(""), "postCreate");
        assert_eq!(
            create.req_headers(),
            vec![
                Header::new("Content-Type", "application/json"),
                Header::new("Host", "api.blog.example"),
            ]
        );
        assert_eq!(
            create.res_headers(),
            vec![Header::new("Content-Type", "application/json")]
        );

        let request: Value = serde_json::from_str(&create.req_body()).unwrap();
        assert_eq!(
            request,
            json!({ "title": "Hello", "tags": [""], "status": "draft" })
        );
        let response: Value = serde_json::from_str(&create.res_body()).unwrap();
        assert_eq!(
            response,
            json!({ "id": 42, "title": "Hello", "tags": [""], "status": "draft" })
        );
    }

    #[test]
    fn list_response_is_array_of_definition() {
        let root = blog();
        let doc = resolve_document(&root).unwrap();
        let list = link_titled(&doc, "list");
        assert!(list.schema.is_none());
        assert_eq!(list.req_body(), "");

        let target = list.target_schema.as_ref().unwrap();
        assert_eq!(target.key(), "post.links.0.targetSchema");
        let response: Value = serde_json::from_str(&list.res_body()).unwrap();
        assert_eq!(response.as_array().unwrap().len(), 1);
        assert_eq!(response[0]["id"], 42);
    }

    #[test]
    fn pointer_placeholder_filled_from_example() {
        let root = blog();
        let doc = resolve_document(&root).unwrap();
        let info = link_titled(&doc, "info");
        assert_eq!(info.url.as_str(), "https://api.blog.example/posts/42");
        assert_eq!(info.url_parameters.len(), 1);
        assert_eq!(info.url_parameters[0].key(), "post.links.2.id");
        assert!(matches!(*info.url_parameters[0], Type::Integer(_)));
    }

    #[test]
    fn self_link_targets_owner() {
        let root = blog();
        let doc = resolve_document(&root).unwrap();
        let post = doc.definition("post").unwrap();
        let info = link_titled(&doc, "info");
        assert!(Arc::ptr_eq(info.target_schema.as_ref().unwrap(), post));
    }

    #[test]
    fn delete_has_no_bodies() {
        let root = blog();
        let doc = resolve_document(&root).unwrap();
        let delete = link_titled(&doc, "delete");
        assert_eq!(delete.url.path(), "/posts/42");
        assert_eq!(delete.req_body(), "");
        assert_eq!(delete.res_body(), "");
    }

    #[test]
    fn serialized_link_fields() {
        let root = blog();
        let doc = resolve_document(&root).unwrap();
        let v = serde_json::to_value(link_titled(&doc, "delete")).unwrap();
        assert_eq!(v["Title"], "delete");
        assert_eq!(v["URL"], "https://api.blog.example/posts/42");
        assert_eq!(v["Method"], "DELETE");
        assert_eq!(v["Schema"], Value::Null);
        assert_eq!(v["UrlParameter"][0]["NativeType"], "integer");
    }
}

mod placeholders {
    use super::*;

    fn root_with_link(link: Value) -> Root {
        let document = json!({
            "definitions": {
                "app": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "path": { "type": "string", "example": "a/b?x=1#frag" }
                    },
                    "links": [link]
                }
            }
        });
        Root::new(document, &ResolveOptions::new().base_url("https://api.example.com/")).unwrap()
    }

    fn resolve_err(link: Value) -> GenerateError {
        resolve_document(&root_with_link(link)).unwrap_err()
    }

    #[test]
    fn placeholder_without_example_uses_name() {
        let root = root_with_link(json!({ "href": "/apps/{name}" }));
        let doc = resolve_document(&root).unwrap();
        let link = &doc.links[0];
        assert_eq!(link.url.as_str(), "https://api.example.com/apps/:name");
        assert_eq!(link.method, "GET");
    }

    #[test]
    fn trailing_slash_on_base_url_not_doubled() {
        let root = root_with_link(json!({ "href": "/apps", "method": "post" }));
        let doc = resolve_document(&root).unwrap();
        assert_eq!(doc.links[0].url.as_str(), "https://api.example.com/apps");
        assert_eq!(doc.links[0].method, "POST");
    }

    #[test]
    fn reserved_characters_in_example_stay_in_one_segment() {
        let root = root_with_link(json!({ "href": "/apps/{path}/meta" }));
        let doc = resolve_document(&root).unwrap();
        let url = &doc.links[0].url;
        assert_eq!(
            url.as_str(),
            "https://api.example.com/apps/a%2Fb%3Fx=1%23frag/meta"
        );
        assert_eq!(url.path_segments().unwrap().count(), 3);
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn unknown_parameter_reports_link_key() {
        let err = resolve_err(json!({ "href": "/apps/{owner}" }));
        match err {
            GenerateError::Resolution(e @ ResolutionError::UnknownUrlParameter { .. }) => {
                assert_eq!(e.path(), "app.links.0");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn malformed_url_reports_link_key() {
        let err = resolve_err(json!({ "href": ":99999/apps" }));
        assert!(matches!(
            err,
            GenerateError::Url(UrlError::InvalidLinkUrl { ref path, .. }) if path == "app.links.0"
        ));
    }

    #[test]
    fn link_without_href_is_invalid() {
        let err = resolve_err(json!({ "method": "GET" }));
        assert!(matches!(
            err,
            GenerateError::Resolution(ResolutionError::InvalidLink { .. })
        ));
    }
}
