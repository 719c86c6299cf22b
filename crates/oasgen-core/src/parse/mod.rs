pub mod bundle;
pub mod media_type;
pub mod openapi;
pub mod operation;
pub mod parameter;
pub mod pointer;
pub mod request_body;
pub mod response;
pub mod schema;
pub mod security;
pub mod server;
pub mod spec;
pub mod swagger;

use log::warn;
use serde_json::Value;

use crate::error::ParseError;
use spec::{Dialect, SpecDocument};

/// Parse a specification document from YAML.
pub fn from_yaml(input: &str) -> Result<SpecDocument, ParseError> {
    let value: Value = serde_yaml_ng::from_str(input)?;
    from_value(value)
}

/// Parse a specification document from JSON.
pub fn from_json(input: &str) -> Result<SpecDocument, ParseError> {
    let value: Value = serde_json::from_str(input)?;
    from_value(value)
}

/// Decide the dialect from the top-level marker field and deserialize the
/// matching document shape. The declared version is not validated.
pub fn from_value(mut value: Value) -> Result<SpecDocument, ParseError> {
    let dialect = detect_dialect(&value).ok_or(ParseError::UnknownDialect)?;
    // `swagger: 2.0` unquoted is a YAML float.
    if let Some(marker) = value.get_mut(dialect.marker())
        && marker.is_number()
    {
        *marker = Value::String(marker.to_string());
    }
    let shape_error = |source| ParseError::Shape {
        dialect: dialect.display_name(),
        source,
    };

    let doc = match dialect {
        Dialect::Swagger2 => {
            SpecDocument::Swagger(Box::new(serde_json::from_value(value).map_err(shape_error)?))
        }
        Dialect::OpenApi3 => {
            SpecDocument::OpenApi(Box::new(serde_json::from_value(value).map_err(shape_error)?))
        }
    };

    let expected = match dialect {
        Dialect::Swagger2 => "2.",
        Dialect::OpenApi3 => "3.",
    };
    if !doc.declared_version().starts_with(expected) {
        warn!(
            "{} document declares version {:?}; continuing",
            dialect.display_name(),
            doc.declared_version()
        );
    }
    Ok(doc)
}

/// `swagger` wins when a document carries both markers.
pub fn detect_dialect(value: &Value) -> Option<Dialect> {
    let map = value.as_object()?;
    [Dialect::Swagger2, Dialect::OpenApi3]
        .into_iter()
        .find(|dialect| map.contains_key(dialect.marker()))
}
