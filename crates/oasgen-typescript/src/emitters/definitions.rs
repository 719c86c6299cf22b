use std::collections::HashSet;

use indexmap::IndexMap;
use log::debug;
use oasgen_core::config::GenerationOptions;
use oasgen_core::ir::{DataType, Definition, IrSpec};
use oasgen_core::{GeneratedFile, GeneratorError};
use rayon::prelude::*;
use serde::Serialize;

use crate::codec::{PropertyCodec, definition_codec, definition_ts_type, properties};
use crate::context::{RenderContext, TypeAlias};
use crate::templates::{DEFINITION, Templates};

use super::{DEFINITIONS_DIR, ImportView, import_views};

#[derive(Debug, Serialize)]
struct DefinitionView<'a> {
    name: &'a str,
    description: Option<&'a str>,
    kind: &'static str,
    imports: Vec<ImportView>,
    aliases: &'a [TypeAlias],
    strict: bool,
    required: Vec<PropertyCodec>,
    optional: Vec<PropertyCodec>,
    codec: String,
    ts_type: String,
}

/// Emit `definitions/<Name>.ts` for every definition not imported from
/// elsewhere.
pub fn emit_definitions(
    ir: &IrSpec,
    opts: &GenerationOptions,
    templates: &Templates,
) -> Result<Vec<GeneratedFile>, GeneratorError> {
    let entries: Vec<(&String, &Definition)> = ir
        .definitions
        .iter()
        .filter(|(name, def)| match def.import_hint {
            Some(ref hint) => {
                debug!("{name} is imported from {hint}; no module emitted");
                false
            }
            None => true,
        })
        .collect();

    entries
        .par_iter()
        .map(|(name, def)| {
            let (content, _) = render_definition(
                name,
                def,
                RenderContext::new(),
                &ir.definitions,
                opts,
                templates,
            )?;
            Ok(GeneratedFile {
                path: format!("{DEFINITIONS_DIR}/{name}.ts"),
                content,
            })
        })
        .collect()
}

/// Render the codec module of one definition.
pub fn render_definition(
    name: &str,
    def: &Definition,
    mut ctx: RenderContext,
    definitions: &IndexMap<String, Definition>,
    opts: &GenerationOptions,
    templates: &Templates,
) -> Result<(String, RenderContext), GeneratorError> {
    let mut required = Vec::new();
    let mut optional = Vec::new();
    let mut codec = String::new();
    let mut ts_type = String::new();

    let kind = if is_recursive(name, def, definitions) {
        ts_type = definition_ts_type(def, &mut ctx, opts);
        codec = definition_codec(def, &mut ctx, opts);
        "recursive"
    } else if is_plain_object(def) {
        let props = properties(def, Some(name), &mut ctx, opts);
        (required, optional) = props.into_iter().partition(|p| p.required);
        "object"
    } else {
        codec = definition_codec(def, &mut ctx, opts);
        "plain"
    };

    ctx.imports.remove(name);
    let view = DefinitionView {
        name,
        description: def.description.as_deref(),
        kind,
        imports: import_views(&ctx.imports, definitions, "./"),
        aliases: &ctx.type_aliases,
        strict: opts.strict_interfaces,
        required,
        optional,
        codec,
        ts_type,
    };
    let text = templates.render(DEFINITION, &view)?;
    Ok((text, ctx))
}

/// Whether `name` reaches itself through references, directly or through
/// other definitions. Every member of a reference cycle is recursive.
pub fn is_recursive(
    name: &str,
    def: &Definition,
    definitions: &IndexMap<String, Definition>,
) -> bool {
    let mut pending = Vec::new();
    def.referenced_names(&mut pending);
    let mut seen = HashSet::new();
    while let Some(next) = pending.pop() {
        if next == name {
            return true;
        }
        if !seen.insert(next.clone()) {
            continue;
        }
        if let Some(target) = definitions.get(&next) {
            target.referenced_names(&mut pending);
        }
    }
    false
}

fn is_plain_object(def: &Definition) -> bool {
    def.composition.is_none()
        && def.enumeration.is_none()
        && !def.nullable
        && !def.properties.is_empty()
        && matches!(def.data_type, None | Some(DataType::Object))
}
