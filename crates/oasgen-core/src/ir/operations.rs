use std::collections::BTreeSet;

use super::definition::{DataType, Definition};
use super::types::NormalizedName;

/// HTTP methods the generator emits operations for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Parse a lower-case path item key. Other methods are unsupported.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "get" => Some(HttpMethod::Get),
            "post" => Some(HttpMethod::Post),
            "put" => Some(HttpMethod::Put),
            "patch" => Some(HttpMethod::Patch),
            "delete" => Some(HttpMethod::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
        }
    }

    pub fn carries_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

/// The type of a parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    /// A top-level definition.
    Named(String),
    Inline(Box<Definition>),
    /// Multipart upload.
    File,
    Binary,
}

impl TypeRef {
    pub fn string() -> Self {
        TypeRef::Inline(Box::new(Definition::of_type(DataType::String)))
    }

    pub fn referenced_names(&self, out: &mut Vec<String>) {
        match self {
            TypeRef::Named(name) => {
                if !out.contains(name) {
                    out.push(name.clone());
                }
            }
            TypeRef::Inline(def) => def.referenced_names(out),
            TypeRef::File | TypeRef::Binary => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
    Body,
    FormData,
}

/// How a security scheme transports its token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Basic,
    ApiKey,
    OAuth2,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Basic => "basic",
            TokenKind::ApiKey => "apiKey",
            TokenKind::OAuth2 => "oauth2",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterKind {
    Plain,
    Header {
        header_name: String,
    },
    AuthHeader {
        header_name: String,
        token_kind: TokenKind,
        /// `Bearer` or `Basic` prefix for the header value, if any.
        auth_scheme: Option<String>,
    },
}

/// A resolved operation parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterInfo {
    pub name: String,
    pub required: bool,
    pub type_ref: TypeRef,
    pub location: ParameterLocation,
    pub kind: ParameterKind,
}

impl ParameterInfo {
    /// The name with its optional marker: `limit?` when not required.
    pub fn marked_name(&self) -> String {
        if self.required {
            self.name.clone()
        } else {
            format!("{}?", self.name)
        }
    }

    pub fn header_name(&self) -> Option<&str> {
        match &self.kind {
            ParameterKind::Plain => None,
            ParameterKind::Header { header_name }
            | ParameterKind::AuthHeader { header_name, .. } => Some(header_name),
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self.kind, ParameterKind::AuthHeader { .. })
    }
}

/// The payload type declared for one response status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseType {
    Named(String),
    Binary,
    /// No schema reference on a `2xx` status.
    DefaultSuccess,
    /// No schema reference on any other status.
    DefaultError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseInfo {
    /// Status as declared: `200`, `default`, `2XX`.
    pub status: String,
    pub response_type: ResponseType,
    /// Declared response header names.
    pub headers: Vec<String>,
}

impl ResponseInfo {
    /// The numeric status for three-digit codes.
    pub fn status_code(&self) -> Option<u16> {
        if self.status.len() == 3 && self.status.bytes().all(|b| b.is_ascii_digit()) {
            self.status.parse().ok()
        } else {
            None
        }
    }
}

/// One API operation, resolved and dialect-independent.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationInfo {
    pub method: HttpMethod,
    pub path: String,
    pub operation_id: String,
    pub name: NormalizedName,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub deprecated: bool,
    /// Path-level, then auth headers, then operation parameters, then body.
    pub parameters: Vec<ParameterInfo>,
    pub responses: Vec<ResponseInfo>,
    pub headers: Vec<String>,
    pub imported_types: BTreeSet<String>,
    /// Absent for `get`.
    pub consumes: Option<String>,
    pub produces: String,
}

impl OperationInfo {
    pub fn body_parameter(&self) -> Option<&ParameterInfo> {
        self.parameters
            .iter()
            .find(|p| p.location == ParameterLocation::Body)
    }

    pub fn auth_parameters(&self) -> impl Iterator<Item = &ParameterInfo> {
        self.parameters.iter().filter(|p| p.is_auth())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marked_name() {
        let mut p = ParameterInfo {
            name: "limit".into(),
            required: false,
            type_ref: TypeRef::string(),
            location: ParameterLocation::Query,
            kind: ParameterKind::Plain,
        };
        assert_eq!(p.marked_name(), "limit?");
        p.required = true;
        assert_eq!(p.marked_name(), "limit");
    }

    #[test]
    fn test_status_code() {
        let response = |status: &str| ResponseInfo {
            status: status.into(),
            response_type: ResponseType::DefaultError,
            headers: vec![],
        };
        assert_eq!(response("200").status_code(), Some(200));
        assert_eq!(response("default").status_code(), None);
        assert_eq!(response("2XX").status_code(), None);
        assert_eq!(response("2000").status_code(), None);
    }

    #[test]
    fn test_method_keys() {
        assert_eq!(HttpMethod::from_key("patch"), Some(HttpMethod::Patch));
        assert_eq!(HttpMethod::from_key("head"), None);
        assert!(HttpMethod::Put.carries_body());
        assert!(!HttpMethod::Delete.carries_body());
    }
}
