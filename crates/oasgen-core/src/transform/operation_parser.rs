use std::collections::BTreeSet;

use crate::adapter::{DEFAULT_CONTENT_TYPE, SpecAdapter, first_content};
use crate::error::{ParseError, ResolveError, TransformError};
use crate::ir::{
    DataType, DefinitionOrRef, HttpMethod, OperationInfo, ParameterInfo, ParameterKind,
    ParameterLocation, ResponseInfo, ResponseType, TypeRef,
};
use crate::parse::operation::{Operation, PathItem};
use crate::parse::parameter::{Parameter, ParameterLocation as RawLocation, ParameterOrRef};
use crate::parse::pointer::{Pointer, PointerKind};
use crate::parse::response::Response;
use crate::parse::schema::{SchemaOrRef, SchemaType, TypeSet};

use super::auth_headers::auth_header_parameters;
use super::definition_normalizer::DefinitionNormalizer;
use super::name_normalizer::normalize_name;
use super::scope::Scope;

pub const CONTENT_TYPE_HEADER: &str = "Content-Type";

/// Builds [`OperationInfo`] records from path items, for either dialect.
pub struct OperationParser<'a> {
    adapter: &'a dyn SpecAdapter,
    normalizer: &'a DefinitionNormalizer<'a>,
}

impl<'a> OperationParser<'a> {
    pub fn new(adapter: &'a dyn SpecAdapter, normalizer: &'a DefinitionNormalizer<'a>) -> Self {
        Self {
            adapter,
            normalizer,
        }
    }

    /// Every supported operation of one path, in declaration order.
    pub fn parse_path(
        &self,
        path: &str,
        item: &PathItem,
        scope: &mut Scope,
    ) -> Result<Vec<OperationInfo>, TransformError> {
        scope.set_subject(path);
        if let Some(ref target) = item.ref_path {
            scope.warn(format!("path item reference {target} is not followed"));
        }

        let path_params = self.parameters(&item.parameters, path, scope)?;
        let global_auth = auth_header_parameters(
            self.adapter.security_schemes(),
            self.adapter.global_security(),
            scope,
        );
        let operations = item.operations().map_err(|source| ParseError::Shape {
            dialect: self.adapter.dialect().display_name(),
            source,
        })?;

        let mut out = Vec::new();
        for (key, op) in operations {
            scope.set_subject(format!("{} {path}", key.to_uppercase()));
            let Some(method) = HttpMethod::from_key(&key) else {
                scope.warn(format!("unsupported method {key}; operation skipped"));
                continue;
            };
            let Some(operation_id) = op.operation_id.clone() else {
                scope.warn("operation has no operationId; skipped");
                continue;
            };
            out.push(self.operation(
                method,
                path,
                operation_id,
                &op,
                &path_params,
                &global_auth,
                scope,
            )?);
        }
        Ok(out)
    }

    #[allow(clippy::too_many_arguments)]
    fn operation(
        &self,
        method: HttpMethod,
        path: &str,
        operation_id: String,
        op: &Operation,
        path_params: &[ParameterInfo],
        global_auth: &[ParameterInfo],
        scope: &mut Scope,
    ) -> Result<OperationInfo, TransformError> {
        let declared = self.parameters(&op.parameters, &operation_id, scope)?;
        // Swagger bodies are parameters; they go last like OpenAPI 3 bodies.
        let (mut bodies, op_params): (Vec<_>, Vec<_>) = declared
            .into_iter()
            .partition(|p| p.location == ParameterLocation::Body);

        let op_auth: Vec<ParameterInfo> = match op.security {
            Some(ref requirements) => {
                auth_header_parameters(self.adapter.security_schemes(), requirements, scope)
                    .into_iter()
                    .filter(|p| !global_auth.iter().any(|g| g.name == p.name))
                    .collect()
            }
            None => Vec::new(),
        };

        bodies.extend(self.request_body(op, scope)?);

        let mut parameters: Vec<ParameterInfo> = path_params
            .iter()
            .filter(|p| {
                !op_params
                    .iter()
                    .any(|o| o.name == p.name && o.location == p.location)
            })
            .cloned()
            .collect();
        parameters.extend(global_auth.iter().cloned());
        parameters.extend(op_auth.iter().cloned());
        parameters.extend(op_params);
        parameters.extend(bodies);

        let mut responses = Vec::new();
        for (status, node) in &op.responses {
            let response = match self.adapter.resolve_response(node) {
                Ok(response) => response,
                Err(err) => {
                    scope.warn(format!("response {status} dropped: {err}"));
                    continue;
                }
            };
            responses.push(ResponseInfo {
                status: status.clone(),
                response_type: self.response_type(status, response, scope)?,
                headers: response.headers.keys().cloned().collect(),
            });
        }

        let mut names = Vec::new();
        for param in &parameters {
            param.type_ref.referenced_names(&mut names);
        }
        let mut imported_types: BTreeSet<String> = names.into_iter().collect();
        for response in &responses {
            if let ResponseType::Named(ref name) = response.response_type {
                imported_types.insert(name.clone());
            }
        }

        let consumes = (method != HttpMethod::Get).then(|| {
            self.adapter
                .operation_consumes(op)
                .or_else(|| self.adapter.global_consumes().map(str::to_string))
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string())
        });
        let produces = self
            .adapter
            .operation_produces(op)
            .or_else(|| self.adapter.global_produces().map(str::to_string))
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        let mut headers = Vec::new();
        if method.carries_body() && !parameters.is_empty() {
            push_unique(&mut headers, CONTENT_TYPE_HEADER);
        }
        for auth in op_auth.iter().chain(global_auth) {
            if let Some(name) = auth.header_name() {
                push_unique(&mut headers, name);
            }
        }
        for param in &parameters {
            if let ParameterKind::Header { ref header_name } = param.kind {
                push_unique(&mut headers, header_name);
            }
        }

        Ok(OperationInfo {
            method,
            path: path.to_string(),
            name: normalize_name(&operation_id),
            operation_id,
            summary: op.summary.clone(),
            description: op.description.clone(),
            tags: op.tags.clone(),
            deprecated: op.deprecated.unwrap_or(false),
            parameters,
            responses,
            headers,
            imported_types,
            consumes,
            produces,
        })
    }

    fn parameters(
        &self,
        nodes: &[ParameterOrRef],
        subject: &str,
        scope: &mut Scope,
    ) -> Result<Vec<ParameterInfo>, TransformError> {
        let mut out = Vec::new();
        for node in nodes {
            let resolved = match node {
                ParameterOrRef::Parameter(param) => Some(((**param).clone(), None)),
                ParameterOrRef::Ref { ref_path } => {
                    self.resolve_parameter(ref_path, subject, scope)?
                }
            };
            if let Some((param, base_file)) = resolved {
                out.push(self.parameter_info(&param, base_file.as_deref(), scope)?);
            }
        }
        Ok(out)
    }

    /// Follow a parameter pointer. The registry entry's name, location and
    /// required-ness win over anything at the reference site.
    fn resolve_parameter(
        &self,
        raw: &str,
        subject: &str,
        scope: &mut Scope,
    ) -> Result<Option<(Parameter, Option<String>)>, TransformError> {
        let mut raw = raw.to_string();
        let mut base_file: Option<String> = None;

        for _ in 0..=self.adapter.parameters_registry().len() + 1 {
            let pointer = match Pointer::parse(&raw) {
                Ok(pointer) => pointer.relative_to(base_file.as_deref()),
                Err(err) => {
                    scope.warn(format!("parameter dropped: {err}"));
                    return Ok(None);
                }
            };
            match pointer.kind {
                PointerKind::Parameter => {}
                PointerKind::Other => {
                    return Err(TransformError::Operation {
                        operation_id: subject.to_string(),
                        source: ResolveError::UnsupportedCollection {
                            pointer: raw,
                            collection: pointer.collection,
                        },
                    });
                }
                kind => {
                    scope.warn(format!(
                        "parameter pointer {raw} addresses a {kind:?}; dropped"
                    ));
                    return Ok(None);
                }
            }

            let target = if pointer.is_external() {
                match self.normalizer.load::<ParameterOrRef>(&pointer) {
                    Ok(target) => Some(target),
                    Err(TransformError::Resolve(_)) => None,
                    Err(err) => return Err(err),
                }
            } else {
                self.adapter
                    .parameters_registry()
                    .get(&pointer.name)
                    .cloned()
            };

            match target {
                Some(ParameterOrRef::Parameter(param)) => {
                    return Ok(Some((*param, pointer.file)));
                }
                Some(ParameterOrRef::Ref { ref_path }) => {
                    raw = ref_path;
                    base_file = pointer.file;
                }
                None => {
                    scope.warn(format!("parameter pointer {raw} has no target; dropped"));
                    return Ok(None);
                }
            }
        }

        scope.warn(format!("parameter pointer {raw} is cyclic; dropped"));
        Ok(None)
    }

    fn parameter_info(
        &self,
        param: &Parameter,
        base_file: Option<&str>,
        scope: &mut Scope,
    ) -> Result<ParameterInfo, TransformError> {
        let type_ref = match param.effective_schema() {
            Some(node) => self.type_ref(&node, base_file, scope)?,
            None => {
                scope.warn(format!("parameter {} declares no type", param.name));
                TypeRef::Inline(Box::default())
            }
        };
        let location = match param.location {
            RawLocation::Query => ParameterLocation::Query,
            RawLocation::Header => ParameterLocation::Header,
            RawLocation::Path => ParameterLocation::Path,
            RawLocation::Cookie => ParameterLocation::Cookie,
            RawLocation::Body => ParameterLocation::Body,
            RawLocation::FormData => ParameterLocation::FormData,
        };
        let kind = match location {
            ParameterLocation::Header => ParameterKind::Header {
                header_name: param.name.clone(),
            },
            _ => ParameterKind::Plain,
        };
        Ok(ParameterInfo {
            name: param.name.clone(),
            required: param.is_required(),
            type_ref,
            location,
            kind,
        })
    }

    fn type_ref(
        &self,
        node: &SchemaOrRef,
        base_file: Option<&str>,
        scope: &mut Scope,
    ) -> Result<TypeRef, TransformError> {
        Ok(match self.normalizer.normalize(node, base_file, scope)? {
            DefinitionOrRef::Ref(name) => TypeRef::Named(name),
            DefinitionOrRef::Inline(def) if def.data_type == Some(DataType::File) => TypeRef::File,
            DefinitionOrRef::Inline(def) => TypeRef::Inline(def),
        })
    }

    /// OpenAPI 3 request body as a trailing `body` parameter.
    fn request_body(
        &self,
        op: &Operation,
        scope: &mut Scope,
    ) -> Result<Option<ParameterInfo>, TransformError> {
        let body = match self.adapter.request_body(op) {
            Ok(Some(body)) => body,
            Ok(None) => return Ok(None),
            Err(err) => {
                scope.warn(format!("request body dropped: {err}"));
                return Ok(None);
            }
        };
        let Some((content_type, media)) = first_content(&body.content) else {
            return Ok(None);
        };

        let type_ref = if content_type.starts_with("multipart/") {
            TypeRef::File
        } else {
            match media.schema {
                Some(ref node) => self.type_ref(node, None, scope)?,
                None => {
                    scope.warn(format!("request body {content_type} declares no schema"));
                    return Ok(None);
                }
            }
        };

        Ok(Some(ParameterInfo {
            name: "body".to_string(),
            required: body.required,
            type_ref,
            location: ParameterLocation::Body,
            kind: ParameterKind::Plain,
        }))
    }

    fn response_type(
        &self,
        status: &str,
        response: &Response,
        scope: &mut Scope,
    ) -> Result<ResponseType, TransformError> {
        match self.adapter.response_schema(response) {
            Some((_, node @ SchemaOrRef::Ref { .. })) => {
                if let DefinitionOrRef::Ref(name) = self.normalizer.normalize(node, None, scope)? {
                    return Ok(ResponseType::Named(name));
                }
            }
            Some((_, SchemaOrRef::Schema(schema))) => {
                let binary = schema.format.as_deref() == Some("binary")
                    || schema.schema_type == Some(TypeSet::Single(SchemaType::File));
                if binary {
                    return Ok(ResponseType::Binary);
                }
            }
            None => {}
        }
        Ok(if status.starts_with('2') {
            ResponseType::DefaultSuccess
        } else {
            ResponseType::DefaultError
        })
    }
}

fn push_unique(headers: &mut Vec<String>, name: &str) {
    if !headers.iter().any(|h| h == name) {
        headers.push(name.to_string());
    }
}
