//! A uniform accessor surface over both specification dialects.
//!
//! The dialect is decided once when the document is parsed; everything
//! downstream talks to a [`SpecAdapter`] and never branches on it again.

mod openapi;
mod swagger;

pub use openapi::OpenApiAdapter;
pub use swagger::SwaggerAdapter;

use indexmap::IndexMap;

use crate::error::ResolveError;
use crate::ir::SpecMetaInfo;
use crate::parse::media_type::MediaType;
use crate::parse::operation::{Operation, PathItem};
use crate::parse::parameter::ParameterOrRef;
use crate::parse::pointer::{PointerKind, expect_kind};
use crate::parse::request_body::{RequestBody, RequestBodyOrRef};
use crate::parse::response::{Response, ResponseOrRef};
use crate::parse::schema::SchemaOrRef;
use crate::parse::security::{SecurityRequirement, SecurityScheme};
use crate::parse::spec::{Dialect, SpecDocument};

/// Content type assumed when neither the operation nor the document names one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

pub trait SpecAdapter: Sync {
    fn dialect(&self) -> Dialect;

    fn meta(&self) -> SpecMetaInfo;

    fn base_path(&self) -> Option<String>;

    fn security_schemes(&self) -> &IndexMap<String, SecurityScheme>;

    fn global_security(&self) -> &[SecurityRequirement];

    /// Top-level named schemas (`definitions` / `components.schemas`).
    fn definitions(&self) -> &IndexMap<String, SchemaOrRef>;

    fn parameters_registry(&self) -> &IndexMap<String, ParameterOrRef>;

    fn responses_registry(&self) -> &IndexMap<String, ResponseOrRef>;

    /// `components.requestBodies`; empty for Swagger.
    fn request_bodies_registry(&self) -> &IndexMap<String, RequestBodyOrRef>;

    fn path_items(&self) -> &IndexMap<String, PathItem>;

    fn global_consumes(&self) -> Option<&str>;

    fn global_produces(&self) -> Option<&str>;

    /// The body schema of a response, with the content type it was found
    /// under (Swagger responses carry no content type).
    fn response_schema<'r>(&self, response: &'r Response) -> Option<(Option<&'r str>, &'r SchemaOrRef)>;

    /// The operation's request body, resolved through the registry. Always
    /// `None` for Swagger, whose bodies are `in: body` parameters.
    fn request_body<'a>(&'a self, op: &'a Operation)
    -> Result<Option<&'a RequestBody>, ResolveError>;

    /// Content type the operation declares it accepts.
    fn operation_consumes(&self, op: &Operation) -> Option<String>;

    /// Content type the operation declares it returns.
    fn operation_produces(&self, op: &Operation) -> Option<String>;

    /// Follow a response pointer through the responses registry.
    fn resolve_response<'a>(
        &'a self,
        response: &'a ResponseOrRef,
    ) -> Result<&'a Response, ResolveError> {
        let mut current = response;
        let mut last_pointer = String::new();
        // Bounded so that a registry entry pointing at itself cannot loop.
        for _ in 0..=self.responses_registry().len() {
            match current {
                ResponseOrRef::Response(resp) => return Ok(resp),
                ResponseOrRef::Ref { ref_path } => {
                    let pointer = expect_kind(ref_path, PointerKind::Response)?;
                    current = self
                        .responses_registry()
                        .get(&pointer.name)
                        .filter(|_| !pointer.is_external())
                        .ok_or_else(|| ResolveError::TargetNotFound(ref_path.clone()))?;
                    last_pointer = ref_path.clone();
                }
            }
        }
        Err(ResolveError::TargetNotFound(last_pointer))
    }
}

/// Select the adapter for a parsed document.
pub fn adapter_for(doc: &SpecDocument) -> Box<dyn SpecAdapter + '_> {
    match doc {
        SpecDocument::Swagger(doc) => Box::new(SwaggerAdapter::new(doc)),
        SpecDocument::OpenApi(doc) => Box::new(OpenApiAdapter::new(doc)),
    }
}

/// The first declared media type of a content map.
pub(crate) fn first_content(content: &IndexMap<String, MediaType>) -> Option<(&str, &MediaType)> {
    content.first().map(|(ct, mt)| (ct.as_str(), mt))
}
