use std::collections::VecDeque;

use indexmap::IndexMap;
use log::{debug, warn};
use rayon::prelude::*;
use serde_json::Value;

use crate::adapter::{SpecAdapter, adapter_for};
use crate::error::TransformError;
use crate::ir::*;
use crate::parse;
use crate::parse::bundle::BundledDocument;
use crate::parse::operation::PathItem;
use crate::parse::pointer::Pointer;
use crate::parse::schema::SchemaOrRef;
use crate::parse::spec::SpecDocument;

use super::definition_normalizer::DefinitionNormalizer;
use super::name_normalizer::promoted_name;
use super::operation_parser::OperationParser;
use super::scope::Scope;

/// Transform a self-contained document into the IR.
pub fn transform(doc: &SpecDocument) -> Result<IrSpec, TransformError> {
    transform_with_fragments(doc, &IndexMap::new())
}

/// Transform a bundled document, resolving external pointers against its fragments.
pub fn transform_bundle(bundle: &BundledDocument) -> Result<IrSpec, TransformError> {
    let doc = parse::from_value(bundle.root.clone())?;
    transform_with_fragments(&doc, &bundle.fragments)
}

pub fn transform_with_fragments(
    doc: &SpecDocument,
    fragments: &IndexMap<String, Value>,
) -> Result<IrSpec, TransformError> {
    let adapter = adapter_for(doc);
    let adapter: &dyn SpecAdapter = adapter.as_ref();
    debug!(
        "transforming {} document {:?}",
        adapter.dialect().display_name(),
        adapter.meta().title
    );

    // Phase 1: external targets published under a top-level name
    let mut aliases = published_aliases(adapter.definitions());

    // Phase 2: top-level definitions, one task per name
    let normalizer = DefinitionNormalizer::new(fragments, &aliases, adapter.definitions());
    let entries: Vec<(&String, &SchemaOrRef)> = adapter.definitions().iter().collect();
    let normalized = entries
        .par_iter()
        .map(|(name, node)| {
            let mut scope = Scope::new(name.as_str());
            let def = normalizer.normalize_top_level(node, &mut scope)?;
            Ok((name.to_string(), def, scope))
        })
        .collect::<Result<Vec<_>, TransformError>>()?;

    // Phase 3: operations, one task per path
    let parser = OperationParser::new(adapter, &normalizer);
    let paths: Vec<(&String, &PathItem)> = adapter.path_items().iter().collect();
    let parsed = paths
        .par_iter()
        .map(|(path, item)| {
            let mut scope = Scope::new(path.as_str());
            let operations = parser.parse_path(path, item, &mut scope)?;
            Ok((operations, scope))
        })
        .collect::<Result<Vec<_>, TransformError>>()?;

    let mut definitions = IndexMap::new();
    let mut diagnostics = Vec::new();
    let mut promoted: VecDeque<Pointer> = VecDeque::new();
    for (name, def, scope) in normalized {
        definitions.insert(name, def);
        diagnostics.extend(scope.diagnostics);
        promoted.extend(scope.promoted);
    }
    let mut operations: Vec<OperationInfo> = Vec::new();
    for (ops, scope) in parsed {
        operations.extend(ops);
        diagnostics.extend(scope.diagnostics);
        promoted.extend(scope.promoted);
    }

    // Phase 4: publish external targets that closed a cycle
    while let Some(pointer) = promoted.pop_front() {
        let key = pointer.key();
        if aliases.contains_key(&key) {
            continue;
        }
        let name = promoted_name(
            pointer.file.as_deref().unwrap_or_default(),
            &pointer.name,
            |n| adapter.definitions().contains_key(n),
        );
        if definitions.contains_key(&name) {
            warn!("promoted definition {name} ({key}) replaces an earlier one");
        }
        aliases.insert(key, name.clone());

        let normalizer = DefinitionNormalizer::new(fragments, &aliases, adapter.definitions());
        let mut scope = Scope::new(name.as_str());
        let def = normalizer.materialize(&pointer, &mut scope)?;
        debug!("promoted {pointer} to top-level definition {name}");
        definitions.insert(name, def);
        diagnostics.extend(scope.diagnostics);
        promoted.extend(scope.promoted);
    }

    diagnostics.extend(duplicate_operation_ids(&operations));
    diagnostics.extend(dangling_references(&definitions, &operations));

    Ok(IrSpec {
        meta: adapter.meta(),
        definitions,
        operations,
        diagnostics,
    })
}

/// Top-level definitions that are a bare pointer into an external file:
/// the external target is published under the top-level name.
fn published_aliases(definitions: &IndexMap<String, SchemaOrRef>) -> IndexMap<String, String> {
    let mut aliases = IndexMap::new();
    for (name, node) in definitions {
        let Some(raw) = node.as_ref_path() else {
            continue;
        };
        let Ok(pointer) = Pointer::parse(raw) else {
            continue;
        };
        if pointer.is_external() {
            aliases
                .entry(pointer.relative_to(None).key())
                .or_insert_with(|| name.clone());
        }
    }
    aliases
}

fn duplicate_operation_ids(operations: &[OperationInfo]) -> Vec<Diagnostic> {
    let mut seen: IndexMap<&str, &OperationInfo> = IndexMap::new();
    let mut out = Vec::new();
    for op in operations {
        if let Some(first) = seen.get(op.operation_id.as_str()) {
            let diagnostic = Diagnostic::new(
                format!("{} {}", op.method.as_str().to_uppercase(), op.path),
                format!(
                    "operationId {} is also used by {} {}",
                    op.operation_id,
                    first.method.as_str().to_uppercase(),
                    first.path
                ),
            );
            warn!("{diagnostic}");
            out.push(diagnostic);
        } else {
            seen.insert(&op.operation_id, op);
        }
    }
    out
}

fn dangling_references(
    definitions: &IndexMap<String, Definition>,
    operations: &[OperationInfo],
) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    let mut report = |subject: &str, names: Vec<String>| {
        for name in names {
            if !definitions.contains_key(&name) {
                let diagnostic =
                    Diagnostic::new(subject, format!("references unknown definition {name}"));
                warn!("{diagnostic}");
                out.push(diagnostic);
            }
        }
    };

    for (name, def) in definitions {
        let mut names = Vec::new();
        def.referenced_names(&mut names);
        report(name.as_str(), names);
    }
    for op in operations {
        report(op.operation_id.as_str(), op.imported_types.iter().cloned().collect());
    }
    out
}
