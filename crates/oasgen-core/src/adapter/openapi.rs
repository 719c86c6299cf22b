use indexmap::IndexMap;

use crate::error::ResolveError;
use crate::ir::SpecMetaInfo;
use crate::parse::openapi::OpenApiDocument;
use crate::parse::operation::{Operation, PathItem};
use crate::parse::parameter::ParameterOrRef;
use crate::parse::pointer::{PointerKind, expect_kind};
use crate::parse::request_body::{RequestBody, RequestBodyOrRef};
use crate::parse::response::{Response, ResponseOrRef};
use crate::parse::schema::SchemaOrRef;
use crate::parse::security::{SecurityRequirement, SecurityScheme};
use crate::parse::spec::Dialect;

use super::{SpecAdapter, first_content};

pub struct OpenApiAdapter<'a> {
    doc: &'a OpenApiDocument,
}

impl<'a> OpenApiAdapter<'a> {
    pub fn new(doc: &'a OpenApiDocument) -> Self {
        Self { doc }
    }
}

impl SpecAdapter for OpenApiAdapter<'_> {
    fn dialect(&self) -> Dialect {
        Dialect::OpenApi3
    }

    fn meta(&self) -> SpecMetaInfo {
        SpecMetaInfo {
            base_path: self.base_path(),
            version: self.doc.info.version.clone(),
            title: self.doc.info.title.clone(),
        }
    }

    fn base_path(&self) -> Option<String> {
        self.doc.servers.first().and_then(|s| s.base_path())
    }

    fn security_schemes(&self) -> &IndexMap<String, SecurityScheme> {
        &self.doc.components.security_schemes
    }

    fn global_security(&self) -> &[SecurityRequirement] {
        &self.doc.security
    }

    fn definitions(&self) -> &IndexMap<String, SchemaOrRef> {
        &self.doc.components.schemas
    }

    fn parameters_registry(&self) -> &IndexMap<String, ParameterOrRef> {
        &self.doc.components.parameters
    }

    fn responses_registry(&self) -> &IndexMap<String, ResponseOrRef> {
        &self.doc.components.responses
    }

    fn request_bodies_registry(&self) -> &IndexMap<String, RequestBodyOrRef> {
        &self.doc.components.request_bodies
    }

    fn path_items(&self) -> &IndexMap<String, PathItem> {
        &self.doc.paths
    }

    // OpenAPI 3 declares media types per body, never globally.
    fn global_consumes(&self) -> Option<&str> {
        None
    }

    fn global_produces(&self) -> Option<&str> {
        None
    }

    fn response_schema<'r>(
        &self,
        response: &'r Response,
    ) -> Option<(Option<&'r str>, &'r SchemaOrRef)> {
        let (content_type, media) = first_content(&response.content)?;
        media.schema.as_ref().map(|schema| (Some(content_type), schema))
    }

    fn request_body<'b>(
        &'b self,
        op: &'b Operation,
    ) -> Result<Option<&'b RequestBody>, ResolveError> {
        let mut current = match op.request_body {
            Some(ref body) => body,
            None => return Ok(None),
        };
        for _ in 0..=self.request_bodies_registry().len() {
            match current {
                RequestBodyOrRef::RequestBody(body) => return Ok(Some(body)),
                RequestBodyOrRef::Ref { ref_path } => {
                    let pointer = expect_kind(ref_path, PointerKind::RequestBody)?;
                    current = self
                        .request_bodies_registry()
                        .get(&pointer.name)
                        .filter(|_| !pointer.is_external())
                        .ok_or_else(|| ResolveError::TargetNotFound(ref_path.clone()))?;
                }
            }
        }
        Err(ResolveError::TargetNotFound(
            "cyclic request body reference".to_string(),
        ))
    }

    fn operation_consumes(&self, op: &Operation) -> Option<String> {
        let body = self.request_body(op).ok().flatten()?;
        body.content.keys().next().cloned()
    }

    fn operation_produces(&self, op: &Operation) -> Option<String> {
        op.responses
            .values()
            .filter_map(|r| self.resolve_response(r).ok())
            .find_map(|r| r.content.keys().next().cloned())
    }
}
