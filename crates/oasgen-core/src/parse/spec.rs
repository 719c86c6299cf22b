use serde::{Deserialize, Serialize};

use super::openapi::OpenApiDocument;
use super::swagger::SwaggerDocument;

/// Info object describing the API.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub version: String,
}

/// Tag definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The specification dialects the generator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Swagger2,
    OpenApi3,
}

impl Dialect {
    /// The top-level field whose presence identifies the dialect.
    pub fn marker(&self) -> &'static str {
        match self {
            Dialect::Swagger2 => "swagger",
            Dialect::OpenApi3 => "openapi",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Dialect::Swagger2 => "Swagger 2.0",
            Dialect::OpenApi3 => "OpenAPI 3",
        }
    }
}

/// A parsed specification document, tagged by dialect once at load time.
#[derive(Debug, Clone, PartialEq)]
pub enum SpecDocument {
    Swagger(Box<SwaggerDocument>),
    OpenApi(Box<OpenApiDocument>),
}

impl SpecDocument {
    pub fn dialect(&self) -> Dialect {
        match self {
            SpecDocument::Swagger(_) => Dialect::Swagger2,
            SpecDocument::OpenApi(_) => Dialect::OpenApi3,
        }
    }

    pub fn info(&self) -> &Info {
        match self {
            SpecDocument::Swagger(doc) => &doc.info,
            SpecDocument::OpenApi(doc) => &doc.info,
        }
    }

    /// The declared dialect version string (`"2.0"`, `"3.0.3"`, ...).
    pub fn declared_version(&self) -> &str {
        match self {
            SpecDocument::Swagger(doc) => &doc.swagger,
            SpecDocument::OpenApi(doc) => &doc.openapi,
        }
    }
}
