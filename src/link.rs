//! Hyper-schema links: HTTP operations with illustrative exchanges.

use std::sync::Arc;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use tracing::warn;
use url::Url;

use crate::error::{SerializationError, UrlError};
use crate::naming::link_function_name;
use crate::root::Root;
use crate::types::Type;

/// Conventional success status per method.
const STATUS_CODES: &[(&str, u16)] = &[
    ("GET", 200),
    ("POST", 201),
    ("PUT", 204),
    ("DELETE", 204),
];

/// Status used for methods without a conventional mapping.
pub const DEFAULT_STATUS_CODE: u16 = 200;

const REASON_PHRASES: &[(u16, &str)] = &[
    (100, "Continue"),
    (101, "Switching Protocols"),
    (102, "Processing"),
    (103, "Early Hints"),
    (200, "OK"),
    (201, "Created"),
    (202, "Accepted"),
    (203, "Non-Authoritative Information"),
    (204, "No Content"),
    (205, "Reset Content"),
    (206, "Partial Content"),
    (207, "Multi-Status"),
    (300, "Multiple Choices"),
    (301, "Moved Permanently"),
    (302, "Found"),
    (303, "See Other"),
    (304, "Not Modified"),
    (305, "Use Proxy"),
    (307, "Temporary Redirect"),
    (308, "Permanent Redirect"),
    (400, "Bad Request"),
    (401, "Unauthorized"),
    (402, "Payment Required"),
    (403, "Forbidden"),
    (404, "Not Found"),
    (405, "Method Not Allowed"),
    (406, "Not Acceptable"),
    (407, "Proxy Authentication Required"),
    (408, "Request Timeout"),
    (409, "Conflict"),
    (410, "Gone"),
    (411, "Length Required"),
    (412, "Precondition Failed"),
    (413, "Content Too Large"),
    (414, "URI Too Long"),
    (415, "Unsupported Media Type"),
    (416, "Range Not Satisfiable"),
    (417, "Expectation Failed"),
    (421, "Misdirected Request"),
    (422, "Unprocessable Content"),
    (425, "Too Early"),
    (426, "Upgrade Required"),
    (428, "Precondition Required"),
    (429, "Too Many Requests"),
    (431, "Request Header Fields Too Large"),
    (451, "Unavailable For Legal Reasons"),
    (500, "Internal Server Error"),
    (501, "Not Implemented"),
    (502, "Bad Gateway"),
    (503, "Service Unavailable"),
    (504, "Gateway Timeout"),
    (505, "HTTP Version Not Supported"),
    (511, "Network Authentication Required"),
];

const JSON_CONTENT_TYPE: &str = "application/json";

/// Bytes escaped when an example value fills one path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Success status for a request method (case-insensitive).
pub fn status_code(method: &str) -> u16 {
    STATUS_CODES
        .iter()
        .find(|(m, _)| m.eq_ignore_ascii_case(method))
        .map_or(DEFAULT_STATUS_CODE, |(_, code)| *code)
}

/// Standard reason phrase for a status code; empty when unknown.
pub fn reason_phrase(code: u16) -> &'static str {
    REASON_PHRASES
        .iter()
        .find(|(c, _)| *c == code)
        .map_or("", |(_, phrase)| *phrase)
}

/// A link as declared in the document.
///
/// `schema` and `targetSchema` are resolved separately and handed to
/// [`Link::new`] as types.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkDef {
    pub href: String,
    #[serde(default = "default_method")]
    pub method: String,
    pub rel: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

fn default_method() -> String {
    "GET".to_string()
}

/// A `{...}` URI-template variable inside an href.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// The placeholder as written, braces included.
    pub raw: String,
    /// Percent-decoded target: a JSON pointer (`#/...`) or a property name.
    pub reference: String,
    /// Last segment of `reference`.
    pub name: String,
}

/// Placeholders of an href, in order of appearance.
///
/// Handles both `{id}` and the `{(%23%2Fdefinitions%2Fuser%2Fproperties%2Fid)}`
/// pointer form.
pub fn placeholders(href: &str) -> Vec<Placeholder> {
    let mut out = Vec::new();
    let mut rest = href;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        let raw = &rest[start..=start + len];
        let inner = &raw[1..raw.len() - 1];
        let decoded = percent_decode_str(inner).decode_utf8_lossy();
        let reference = decoded
            .trim_start_matches('(')
            .trim_end_matches(')')
            .to_string();
        let name = reference.rsplit('/').next().unwrap_or_default().to_string();
        out.push(Placeholder {
            raw: raw.to_string(),
            reference,
            name,
        });
        rest = &rest[start + len + 1..];
    }
    out
}

/// A key/value header line.
///
/// Ordering is by key, then value, byte-wise.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Header {
    pub key: String,
    pub value: String,
}

impl Header {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// One resolved hyper-schema operation.
#[derive(Debug, Clone)]
pub struct Link<'a> {
    pub title: String,
    pub description: String,
    /// Upper-cased HTTP method.
    pub method: String,
    pub rel: String,
    /// The href as declared, placeholders included.
    pub href: String,
    /// Base URL joined with the href, placeholders filled in.
    pub url: Url,
    pub url_parameters: Vec<Arc<Type<'a>>>,
    pub schema: Option<Arc<Type<'a>>>,
    pub target_schema: Option<Arc<Type<'a>>>,
    key: String,
}

impl<'a> Link<'a> {
    /// Build a link from its declaration and already-resolved types.
    ///
    /// `url_parameters` must be in the order of the href's placeholders.
    /// Each placeholder is replaced by its parameter's declared example when
    /// that is a non-empty scalar, percent-encoded as one path segment, and
    /// otherwise by `:<name>`.
    ///
    /// # Errors
    ///
    /// Returns `UrlError::InvalidLinkUrl` if the joined URL does not parse.
    pub fn new(
        def: &LinkDef,
        schema: Option<Arc<Type<'a>>>,
        target_schema: Option<Arc<Type<'a>>>,
        root: &Root,
        url_parameters: Vec<Arc<Type<'a>>>,
        key: &str,
    ) -> Result<Self, UrlError> {
        let mut path = def.href.clone();
        for (placeholder, param) in placeholders(&def.href).iter().zip(&url_parameters) {
            path = path.replacen(&placeholder.raw, &path_segment(&placeholder.name, param), 1);
        }

        let joined = format!("{}{}", root.url().as_str().trim_end_matches('/'), path);
        let url = Url::parse(&joined).map_err(|source| UrlError::InvalidLinkUrl {
            path: key.to_string(),
            url: joined.clone(),
            source,
        })?;

        Ok(Self {
            title: def.title.clone().unwrap_or_default(),
            description: def.description.clone().unwrap_or_default(),
            method: def.method.to_ascii_uppercase(),
            rel: def.rel.clone().unwrap_or_default(),
            href: def.href.clone(),
            url,
            url_parameters,
            schema,
            target_schema,
            key: key.to_string(),
        })
    }

    /// Key path of the link declaration (e.g. `user.links.0`).
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Handler name for templates, e.g. `getUserList`.
    pub fn function_name(&self, suffix: &str) -> String {
        link_function_name(&self.title, &self.method, suffix)
    }

    /// Path and query of the URL, as sent on the request line.
    pub fn request_target(&self) -> String {
        match self.url.query() {
            Some(query) => format!("{}?{}", self.url.path(), query),
            None => self.url.path().to_string(),
        }
    }

    pub fn res_status_code(&self) -> u16 {
        status_code(&self.method)
    }

    pub fn res_reason_phrase(&self) -> &'static str {
        reason_phrase(self.res_status_code())
    }

    /// `Content-Type` and `Host`, sorted by key.
    pub fn req_headers(&self) -> Vec<Header> {
        let host = match (self.url.host_str(), self.url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => String::new(),
        };
        let mut headers = vec![
            Header::new("Host", host),
            Header::new("Content-Type", JSON_CONTENT_TYPE),
        ];
        headers.sort();
        headers
    }

    /// `Content-Type`, sorted by key.
    pub fn res_headers(&self) -> Vec<Header> {
        let mut headers = vec![Header::new("Content-Type", JSON_CONTENT_TYPE)];
        headers.sort();
        headers
    }

    /// Pretty-printed example of the request schema (writable view).
    pub fn try_req_body(&self) -> Result<String, SerializationError> {
        render_body(self.schema.as_deref(), true)
    }

    /// Pretty-printed example of the target schema (read view).
    pub fn try_res_body(&self) -> Result<String, SerializationError> {
        render_body(self.target_schema.as_deref(), false)
    }

    /// Like [`Link::try_req_body`], empty on failure.
    pub fn req_body(&self) -> String {
        self.try_req_body().unwrap_or_else(|e| {
            warn!(key = %self.key, error = %e, "request body left empty");
            String::new()
        })
    }

    /// Like [`Link::try_res_body`], empty on failure.
    pub fn res_body(&self) -> String {
        self.try_res_body().unwrap_or_else(|e| {
            warn!(key = %self.key, error = %e, "response body left empty");
            String::new()
        })
    }
}

impl Serialize for Link<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(6))?;
        map.serialize_entry("Title", &self.title)?;
        map.serialize_entry("URL", self.url.as_str())?;
        map.serialize_entry("Schema", &self.schema)?;
        map.serialize_entry("TargetSchema", &self.target_schema)?;
        map.serialize_entry("Method", &self.method)?;
        map.serialize_entry("UrlParameter", &self.url_parameters)?;
        map.end()
    }
}

fn path_segment(name: &str, param: &Type<'_>) -> String {
    match param.meta().declared_example() {
        Some(Value::String(s)) if !s.is_empty() => {
            utf8_percent_encode(s, PATH_SEGMENT).to_string()
        }
        Some(v @ (Value::Number(_) | Value::Bool(_))) => v.to_string(),
        _ => format!(":{}", name),
    }
}

fn render_body(schema: Option<&Type<'_>>, writable: bool) -> Result<String, SerializationError> {
    let Some(schema) = schema else {
        return Ok(String::new());
    };
    let example = schema.example(writable);
    if example.is_null() {
        return Ok(String::new());
    }
    serde_json::to_string_pretty(&example).map_err(|source| SerializationError {
        path: schema.key().to_string(),
        source,
    })
}
