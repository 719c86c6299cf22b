use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("document is neither Swagger 2.0 nor OpenAPI 3.x (no `swagger` or `openapi` field)")]
    UnknownDialect,

    #[error("invalid {dialect} document: {source}")]
    Shape {
        dialect: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid node at {pointer}: {source}")]
    Fragment {
        pointer: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid reference format: {0}")]
    InvalidPointer(String),

    #[error("reference {pointer} points into unsupported collection `{collection}`")]
    UnsupportedCollection { pointer: String, collection: String },

    #[error("external fragment not loaded: {0}")]
    MissingFragment(String),

    #[error("reference target not found: {0}")]
    TargetNotFound(String),
}

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("operation {operation_id}: {source}")]
    Operation {
        operation_id: String,
        #[source]
        source: ResolveError,
    },
}

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("template render failed: {0}")]
    Render(String),

    #[error("invalid generation options: {0}")]
    Options(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("override names status {0}, which the operation does not declare")]
    UnknownStatus(u16),

    #[error("no response decoder matched status {status}")]
    NoMatch { status: u16 },
}
