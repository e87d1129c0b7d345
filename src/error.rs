//! Error types for schema loading, type resolution and link construction.

use std::path::PathBuf;
use thiserror::Error;

/// Errors while reading a schema document from disk or the network.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("fragment {fragment} not found in document")]
    FragmentNotFound { fragment: String },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            _ => 2,
        }
    }
}

/// Unsupported or malformed schema constructs.
///
/// `path` is always the dotted key path of the node being resolved.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("invalid schema at {path}: expected object, got {actual}")]
    InvalidSchema { path: String, actual: String },

    #[error("schema at {path} declares no type")]
    MissingType { path: String },

    #[error("unsupported type \"{type_name}\" at {path}")]
    UnsupportedType { path: String, type_name: String },

    #[error("ambiguous type at {path}: {}", types.join(", "))]
    AmbiguousType { path: String, types: Vec<String> },

    #[error("invalid type declaration at {path}: expected string or array, got {actual}")]
    InvalidTypeDeclaration { path: String, actual: String },

    #[error("array at {path} has no items")]
    MissingItems { path: String },

    #[error("invalid items at {path}: expected object or array, got {actual}")]
    InvalidItems { path: String, actual: String },

    #[error("unresolved reference \"{reference}\" at {path}")]
    UnresolvedRef { path: String, reference: String },

    #[error("invalid link at {path}: {message}")]
    InvalidLink { path: String, message: String },

    #[error("unknown url parameter \"{name}\" at {path}")]
    UnknownUrlParameter { path: String, name: String },
}

impl ResolutionError {
    /// Key path of the offending schema node.
    pub fn path(&self) -> &str {
        match self {
            Self::InvalidSchema { path, .. }
            | Self::MissingType { path }
            | Self::UnsupportedType { path, .. }
            | Self::AmbiguousType { path, .. }
            | Self::InvalidTypeDeclaration { path, .. }
            | Self::MissingItems { path }
            | Self::InvalidItems { path, .. }
            | Self::UnresolvedRef { path, .. }
            | Self::InvalidLink { path, .. }
            | Self::UnknownUrlParameter { path, .. } => path,
        }
    }
}

/// Malformed base or link URLs.
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("no base url: pass one explicitly or declare a root link with rel \"self\"")]
    MissingBaseUrl,

    #[error("invalid base url \"{url}\": {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid link url \"{url}\" at {path}: {source}")]
    InvalidLinkUrl {
        path: String,
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Failure to encode an example body as JSON.
#[derive(Debug, Error)]
#[error("cannot serialize example at {path}: {source}")]
pub struct SerializationError {
    pub path: String,
    #[source]
    pub source: serde_json::Error,
}

/// Errors that abort a generation run.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Url(#[from] UrlError),
}

impl GenerateError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            GenerateError::Load(e) => e.exit_code(),
            GenerateError::Resolution(_) | GenerateError::Url(_) => 2,
        }
    }
}

/// Errors while checking an example against its schema.
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error("invalid schema: {message}")]
    Schema { message: String },

    #[error("example failed validation with {} error(s)", errors.len())]
    Invalid { errors: Vec<Violation> },
}

impl ValidateError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ValidateError::Schema { .. } => 2,
            ValidateError::Invalid { .. } => 1,
        }
    }
}

/// Single schema violation with path context.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Violation {
    /// JSON Pointer (RFC 6901) to the offending part of the example.
    pub path: String,
    /// Human-readable error message.
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_error_exit_codes() {
        let err: GenerateError = LoadError::FileNotFound {
            path: PathBuf::from("api.json"),
        }
        .into();
        assert_eq!(err.exit_code(), 3);

        let err: GenerateError = ResolutionError::MissingItems {
            path: "user.tags".into(),
        }
        .into();
        assert_eq!(err.exit_code(), 2);

        let err: GenerateError = UrlError::MissingBaseUrl.into();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn resolution_error_carries_path() {
        let err = ResolutionError::UnsupportedType {
            path: "user.avatar".into(),
            type_name: "file".into(),
        };
        assert_eq!(err.path(), "user.avatar");
        assert_eq!(
            err.to_string(),
            "unsupported type \"file\" at user.avatar"
        );
    }

    #[test]
    fn validate_error_exit_codes() {
        let err = ValidateError::Invalid {
            errors: vec![Violation {
                path: "/id".into(),
                message: "expected integer".into(),
            }],
        };
        assert_eq!(err.exit_code(), 1);
        assert_eq!(
            ValidateError::Schema {
                message: "bad".into()
            }
            .exit_code(),
            2
        );
    }

    #[test]
    fn violation_display() {
        let err = Violation {
            path: "/owner/email".into(),
            message: "expected string, got number".into(),
        };
        assert_eq!(err.to_string(), "/owner/email: expected string, got number");
    }
}
