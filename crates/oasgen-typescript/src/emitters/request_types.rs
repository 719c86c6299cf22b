use heck::ToPascalCase;
use indexmap::IndexMap;
use oasgen_core::config::GenerationOptions;
use oasgen_core::decoder::{DecoderEntry, DecoderPlan, DecoderStrategy, DefaultTypes};
use oasgen_core::ir::{Definition, OperationInfo, ParameterLocation};
use oasgen_core::GeneratorError;
use rayon::prelude::*;
use serde::Serialize;

use crate::codec::{quote_key, type_ref_ts};
use crate::context::RenderContext;
use crate::templates::{REQUEST_TYPES, Templates};

use super::{DEFINITIONS_DIR, ImportView, REQUESTS_MODULE, import_views, literal_union};

pub const REQUEST_TYPES_FILE: &str = "requestTypes.ts";

#[derive(Debug, Serialize)]
struct RequestTypesView<'a> {
    requests_module: &'a str,
    imports: Vec<ImportView>,
    operations: Vec<OperationView>,
}

#[derive(Debug, Serialize)]
struct OperationView {
    operation_id: String,
    summary: Option<String>,
    deprecated: bool,
    pascal: String,
    camel: String,
    method_pascal: String,
    params_type: String,
    headers_union: String,
    query_union: String,
    responses_union: String,
    decoder: Option<DecoderView>,
}

#[derive(Debug, Serialize)]
struct DecoderView {
    entries: Vec<EntryView>,
    generics_decl: String,
    generics_with_defaults: String,
    generics: String,
    primary_a: String,
    primary_c: String,
    primary_status: u16,
    result_union: String,
    composed: String,
}

#[derive(Debug, Serialize)]
struct EntryView {
    status: u16,
    default_codec: String,
    a: String,
    c: String,
    decoder: String,
    headers: String,
}

/// Render `requestTypes.ts`: one request type per operation and, when
/// enabled, its response decoders.
pub fn render_request_types(
    operations: &[OperationInfo],
    definitions: &IndexMap<String, Definition>,
    opts: &GenerationOptions,
    templates: &Templates,
) -> Result<String, GeneratorError> {
    let defaults = DefaultTypes::from(opts);
    let rendered: Vec<(OperationView, RenderContext)> = operations
        .par_iter()
        .map(|op| operation_view(op, &defaults, opts))
        .collect();

    let mut ctx = RenderContext::new();
    let mut views = Vec::with_capacity(rendered.len());
    for (view, op_ctx) in rendered {
        ctx.merge(op_ctx);
        views.push(view);
    }

    let prefix = format!("./{DEFINITIONS_DIR}/");
    let view = RequestTypesView {
        requests_module: REQUESTS_MODULE,
        imports: import_views(&ctx.imports, definitions, &prefix),
        operations: views,
    };
    templates.render(REQUEST_TYPES, &view)
}

fn operation_view(
    op: &OperationInfo,
    defaults: &DefaultTypes,
    opts: &GenerationOptions,
) -> (OperationView, RenderContext) {
    let mut ctx = RenderContext::new();

    let params_type = params_type(op, &mut ctx, opts);
    let query: Vec<&str> = op
        .parameters
        .iter()
        .filter(|p| p.location == ParameterLocation::Query)
        .map(|p| p.name.as_str())
        .collect();

    let entries = DecoderPlan::default_entries(op, defaults);
    let responses: Vec<String> = entries
        .iter()
        .map(|e| response_type(e.status, &payload_type(&e.strategy, &mut ctx), &e.headers))
        .collect();
    let responses_union = if responses.is_empty() {
        "never".to_string()
    } else {
        responses.join(" | ")
    };

    let decoder = if opts.response_decoders {
        DecoderPlan::for_operation(op, defaults).map(|plan| decoder_view(&plan))
    } else {
        None
    };

    let view = OperationView {
        operation_id: op.operation_id.clone(),
        summary: op.summary.clone(),
        deprecated: op.deprecated,
        pascal: op.name.pascal_case.clone(),
        camel: op.name.camel_case.clone(),
        method_pascal: op.method.as_str().to_pascal_case(),
        params_type,
        headers_union: literal_union(&op.headers),
        query_union: literal_union(&query),
        responses_union,
        decoder,
    };
    (view, ctx)
}

/// `{ readonly petId: number; readonly limit?: number }`
fn params_type(op: &OperationInfo, ctx: &mut RenderContext, opts: &GenerationOptions) -> String {
    if op.parameters.is_empty() {
        return "{}".to_string();
    }
    let fields: Vec<String> = op
        .parameters
        .iter()
        .map(|p| {
            let marker = if p.required { "" } else { "?" };
            format!(
                "readonly {}{marker}: {}",
                quote_key(&p.name),
                type_ref_ts(&p.type_ref, ctx, opts)
            )
        })
        .collect();
    format!("{{ {} }}", fields.join("; "))
}

fn payload_type(strategy: &DecoderStrategy, ctx: &mut RenderContext) -> String {
    match strategy {
        DecoderStrategy::Exact(name) | DecoderStrategy::ErrorEnvelope(name) => {
            ctx.import(name);
            name.clone()
        }
        DecoderStrategy::Binary => "Buffer".to_string(),
        DecoderStrategy::Constant => "undefined".to_string(),
    }
}

fn response_type(status: u16, payload: &str, headers: &[String]) -> String {
    format!("r.IResponseType<{status}, {payload}, {}>", literal_union(headers))
}

fn decoder_view(plan: &DecoderPlan) -> DecoderView {
    let entries: Vec<EntryView> = plan
        .entries
        .iter()
        .enumerate()
        .map(|(i, e)| entry_view(i, e))
        .collect();

    let generics: Vec<String> = entries
        .iter()
        .map(|e| format!("{}, {}", e.a, e.c))
        .collect();
    let with_defaults: Vec<String> = entries
        .iter()
        .map(|e| {
            let ty = default_type(&e.default_codec);
            format!("{} = {ty}, {} = {ty}", e.a, e.c)
        })
        .collect();
    let result: Vec<String> = entries
        .iter()
        .map(|e| format!("r.IResponseType<{}, {}, {}>", e.status, e.a, e.headers))
        .collect();

    let composed = entries
        .iter()
        .map(|e| format!("d{}", e.status))
        .reduce(|acc, d| format!("r.composeResponseDecoders({acc}, {d})"))
        .unwrap_or_default();

    let (primary_a, primary_c) = entries
        .iter()
        .find(|e| e.status == plan.primary_success)
        .map(|e| (e.a.clone(), e.c.clone()))
        .unwrap_or_else(|| ("unknown".to_string(), "unknown".to_string()));

    DecoderView {
        generics_decl: generics.join(", "),
        generics_with_defaults: with_defaults.join(", "),
        generics: generics.join(", "),
        primary_a,
        primary_c,
        primary_status: plan.primary_success,
        result_union: result.join(" | "),
        composed,
        entries,
    }
}

fn entry_view(index: usize, entry: &DecoderEntry) -> EntryView {
    let status = entry.status;
    let headers = literal_union(&entry.headers);
    let default_codec = match entry.strategy {
        DecoderStrategy::Exact(ref name) | DecoderStrategy::ErrorEnvelope(ref name) => name.clone(),
        DecoderStrategy::Binary => "t.unknown".to_string(),
        DecoderStrategy::Constant => "t.undefined".to_string(),
    };
    let decoder = match entry.strategy {
        DecoderStrategy::Binary => format!("r.bufferArrayResponseDecoder({status})"),
        _ => format!(
            "type[{status}].name === \"undefined\" \
             ? r.constantResponseDecoder<undefined, {status}, {headers}>({status}, undefined) \
             : r.ioResponseDecoder<{status}, (typeof type[{status}])[\"_A\"], (typeof type[{status}])[\"_O\"], {headers}>({status}, type[{status}])"
        ),
    };
    EntryView {
        status,
        default_codec,
        a: format!("A{index}"),
        c: format!("C{index}"),
        decoder,
        headers,
    }
}

/// The static type a default codec decodes to.
fn default_type(codec: &str) -> &str {
    match codec {
        "t.unknown" => "Buffer",
        "t.undefined" => "undefined",
        name => name,
    }
}
