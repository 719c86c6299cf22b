use indexmap::IndexMap;

use crate::error::ResolveError;
use crate::ir::SpecMetaInfo;
use crate::parse::operation::{Operation, PathItem};
use crate::parse::parameter::ParameterOrRef;
use crate::parse::request_body::{RequestBody, RequestBodyOrRef};
use crate::parse::response::{Response, ResponseOrRef};
use crate::parse::schema::SchemaOrRef;
use crate::parse::security::{SecurityRequirement, SecurityScheme};
use crate::parse::spec::Dialect;
use crate::parse::swagger::SwaggerDocument;

use super::SpecAdapter;

pub struct SwaggerAdapter<'a> {
    doc: &'a SwaggerDocument,
    no_request_bodies: IndexMap<String, RequestBodyOrRef>,
}

impl<'a> SwaggerAdapter<'a> {
    pub fn new(doc: &'a SwaggerDocument) -> Self {
        Self {
            doc,
            no_request_bodies: IndexMap::new(),
        }
    }
}

impl SpecAdapter for SwaggerAdapter<'_> {
    fn dialect(&self) -> Dialect {
        Dialect::Swagger2
    }

    fn meta(&self) -> SpecMetaInfo {
        SpecMetaInfo {
            base_path: self.base_path(),
            version: self.doc.info.version.clone(),
            title: self.doc.info.title.clone(),
        }
    }

    fn base_path(&self) -> Option<String> {
        self.doc
            .base_path
            .as_deref()
            .map(|p| p.trim_end_matches('/'))
            .filter(|p| !p.is_empty())
            .map(str::to_string)
    }

    fn security_schemes(&self) -> &IndexMap<String, SecurityScheme> {
        &self.doc.security_definitions
    }

    fn global_security(&self) -> &[SecurityRequirement] {
        &self.doc.security
    }

    fn definitions(&self) -> &IndexMap<String, SchemaOrRef> {
        &self.doc.definitions
    }

    fn parameters_registry(&self) -> &IndexMap<String, ParameterOrRef> {
        &self.doc.parameters
    }

    fn responses_registry(&self) -> &IndexMap<String, ResponseOrRef> {
        &self.doc.responses
    }

    fn request_bodies_registry(&self) -> &IndexMap<String, RequestBodyOrRef> {
        &self.no_request_bodies
    }

    fn path_items(&self) -> &IndexMap<String, PathItem> {
        &self.doc.paths
    }

    fn global_consumes(&self) -> Option<&str> {
        self.doc.consumes.first().map(String::as_str)
    }

    fn global_produces(&self) -> Option<&str> {
        self.doc.produces.first().map(String::as_str)
    }

    fn response_schema<'r>(
        &self,
        response: &'r Response,
    ) -> Option<(Option<&'r str>, &'r SchemaOrRef)> {
        response.schema.as_ref().map(|schema| (None, schema))
    }

    fn request_body<'b>(
        &'b self,
        _op: &'b Operation,
    ) -> Result<Option<&'b RequestBody>, ResolveError> {
        Ok(None)
    }

    fn operation_consumes(&self, op: &Operation) -> Option<String> {
        op.consumes.first().cloned()
    }

    fn operation_produces(&self, op: &Operation) -> Option<String> {
        op.produces.first().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use crate::parse::spec::SpecDocument;

    fn swagger(yaml: &str) -> Box<SwaggerDocument> {
        match parse::from_yaml(yaml).unwrap() {
            SpecDocument::Swagger(doc) => doc,
            SpecDocument::OpenApi(_) => panic!("expected swagger"),
        }
    }

    #[test]
    fn test_base_path_and_media_types() {
        let doc = swagger(
            r#"
swagger: "2.0"
info: {title: Pets, version: "1.0"}
basePath: /api/v1/
consumes: [application/xml]
produces: [application/json, text/plain]
"#,
        );
        let adapter = SwaggerAdapter::new(&doc);
        assert_eq!(adapter.base_path().as_deref(), Some("/api/v1"));
        assert_eq!(adapter.global_consumes(), Some("application/xml"));
        assert_eq!(adapter.global_produces(), Some("application/json"));
        let meta = adapter.meta();
        assert_eq!(meta.title, "Pets");
        assert_eq!(meta.version, "1.0");
    }

    #[test]
    fn test_resolve_response_through_registry() {
        let doc = swagger(
            r##"
swagger: "2.0"
responses:
  NotFound:
    description: missing
    schema:
      $ref: "#/definitions/Problem"
  Gone:
    $ref: "#/responses/NotFound"
"##,
        );
        let adapter = SwaggerAdapter::new(&doc);
        let reference = ResponseOrRef::Ref {
            ref_path: "#/responses/Gone".into(),
        };
        let response = adapter.resolve_response(&reference).unwrap();
        assert_eq!(response.description, "missing");
        let (content_type, schema) = adapter.response_schema(response).unwrap();
        assert_eq!(content_type, None);
        assert_eq!(schema.as_ref_path(), Some("#/definitions/Problem"));

        let dangling = ResponseOrRef::Ref {
            ref_path: "#/responses/Missing".into(),
        };
        assert!(matches!(
            adapter.resolve_response(&dangling),
            Err(ResolveError::TargetNotFound(_))
        ));
    }
}
