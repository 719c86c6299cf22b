use log::warn;
use oasgen_core::config::GenerationOptions;
use oasgen_core::decoder::{DecoderPlan, DefaultTypes};
use oasgen_core::ir::{
    OperationInfo, ParameterInfo, ParameterKind, ParameterLocation, SpecMetaInfo, TypeRef,
};
use oasgen_core::transform::name_normalizer::normalize_name;
use oasgen_core::transform::operation_parser::CONTENT_TYPE_HEADER;
use oasgen_core::GeneratorError;
use serde::Serialize;

use crate::codec::string_literal;
use crate::templates::{CLIENT, Templates};

use super::{REQUESTS_MODULE, TYPES_MODULE};

pub const CLIENT_FILE: &str = "client.ts";

const MULTIPART: &str = "multipart/form-data";

#[derive(Debug, Serialize)]
struct ClientView<'a> {
    requests_module: &'a str,
    types_module: &'a str,
    request_imports: Vec<String>,
    base_path: String,
    operations: Vec<ClientOperationView>,
}

#[derive(Debug, Serialize)]
struct ClientOperationView {
    camel: String,
    pascal: String,
    method: &'static str,
    headers: String,
    url: String,
    body: Option<String>,
    query: String,
}

/// Render `client.ts`, binding every decodable operation to a fetch call.
pub fn render_client(
    operations: &[OperationInfo],
    meta: &SpecMetaInfo,
    opts: &GenerationOptions,
    templates: &Templates,
) -> Result<String, GeneratorError> {
    let defaults = DefaultTypes::from(opts);
    let mut request_imports = Vec::new();
    let mut views = Vec::new();

    for op in operations {
        if DecoderPlan::for_operation(op, &defaults).is_none() {
            warn!(
                "{}: no 2xx response, left out of the client",
                op.operation_id
            );
            continue;
        }
        request_imports.push(format!("{}T", op.name.pascal_case));
        request_imports.push(format!("{}DefaultDecoder", op.name.camel_case));
        views.push(operation_view(op));
    }

    let base_path = meta
        .base_path
        .as_deref()
        .unwrap_or_default()
        .trim_end_matches('/');
    let view = ClientView {
        requests_module: REQUESTS_MODULE,
        types_module: TYPES_MODULE,
        request_imports,
        base_path: string_literal(base_path),
        operations: views,
    };
    templates.render(CLIENT, &view)
}

fn operation_view(op: &OperationInfo) -> ClientOperationView {
    ClientOperationView {
        camel: op.name.camel_case.clone(),
        pascal: op.name.pascal_case.clone(),
        method: op.method.as_str(),
        headers: headers_producer(op),
        url: url_producer(op),
        body: op.method.carries_body().then(|| body_producer(op)),
        query: query_producer(op),
    }
}

fn ident(param: &ParameterInfo) -> String {
    normalize_name(&param.name).camel_case
}

/// `({ ["petId"]: petId, ["limit"]: limit })`
fn destructure(params: &[&ParameterInfo]) -> String {
    if params.is_empty() {
        return "()".to_string();
    }
    let fields: Vec<String> = params
        .iter()
        .map(|p| format!("[{}]: {}", string_literal(&p.name), ident(p)))
        .collect();
    format!("({{ {} }})", fields.join(", "))
}

fn is_multipart(op: &OperationInfo) -> bool {
    op.consumes.as_deref() == Some(MULTIPART)
}

fn headers_producer(op: &OperationInfo) -> String {
    let mut used: Vec<&ParameterInfo> = Vec::new();
    let mut entries: Vec<(String, String)> = Vec::new();

    if op.headers.iter().any(|h| h == CONTENT_TYPE_HEADER) && !is_multipart(op) {
        if let Some(ref consumes) = op.consumes {
            push_header(&mut entries, CONTENT_TYPE_HEADER, string_literal(consumes));
        }
    }
    for param in op.auth_parameters() {
        if let ParameterKind::AuthHeader {
            ref header_name,
            ref auth_scheme,
            ..
        } = param.kind
        {
            let value = match auth_scheme {
                Some(scheme) => format!("`{scheme} ${{{}}}`", ident(param)),
                None => ident(param),
            };
            push_header(&mut entries, header_name, value);
            used.push(param);
        }
    }
    for param in &op.parameters {
        if let ParameterKind::Header { ref header_name } = param.kind {
            push_header(&mut entries, header_name, ident(param));
            used.push(param);
        }
    }

    if entries.is_empty() {
        return "() => ({})".to_string();
    }
    let fields: Vec<String> = entries
        .iter()
        .map(|(name, value)| format!("{}: {value}", string_literal(name)))
        .collect();
    format!("{} => ({{ {} }})", destructure(&used), fields.join(", "))
}

fn push_header(entries: &mut Vec<(String, String)>, name: &str, value: String) {
    if !entries.iter().any(|(n, _)| n == name) {
        entries.push((name.to_string(), value));
    }
}

/// A template literal substituting the path parameters.
fn url_producer(op: &OperationInfo) -> String {
    let mut path = op.path.clone();
    let mut used = Vec::new();
    for param in op
        .parameters
        .iter()
        .filter(|p| p.location == ParameterLocation::Path)
    {
        let placeholder = format!("{{{}}}", param.name);
        if path.contains(&placeholder) {
            path = path.replace(&placeholder, &format!("${{{}}}", ident(param)));
            used.push(param);
        }
    }
    format!("{} => `${{basePath}}{path}`", destructure(&used))
}

fn query_producer(op: &OperationInfo) -> String {
    let params: Vec<&ParameterInfo> = op
        .parameters
        .iter()
        .filter(|p| p.location == ParameterLocation::Query)
        .collect();
    if params.is_empty() {
        return "() => ({})".to_string();
    }
    let fields: Vec<String> = params
        .iter()
        .map(|p| format!("[{}]: {}", string_literal(&p.name), ident(p)))
        .collect();
    format!(
        "{} => withoutUndefinedValues({{ {} }})",
        destructure(&params),
        fields.join(", ")
    )
}

fn body_producer(op: &OperationInfo) -> String {
    let form: Vec<&ParameterInfo> = op
        .parameters
        .iter()
        .filter(|p| {
            p.location == ParameterLocation::FormData
                || (p.location == ParameterLocation::Body && p.type_ref == TypeRef::File)
        })
        .collect();
    if !form.is_empty() || is_multipart(op) {
        let appends: String = form
            .iter()
            .map(|p| format!(" fd.append({}, {});", string_literal(&p.name), ident(p)))
            .collect();
        return format!(
            "{} => {{ const fd = new FormData();{appends} return fd; }}",
            destructure(&form)
        );
    }
    match op.body_parameter() {
        Some(body) => format!("{} => JSON.stringify({})", destructure(&[body]), ident(body)),
        None => "() => \"{}\"".to_string(),
    }
}
