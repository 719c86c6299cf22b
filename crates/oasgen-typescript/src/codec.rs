use heck::{ToLowerCamelCase, ToPascalCase};
use oasgen_core::config::GenerationOptions;
use oasgen_core::ir::{
    AdditionalProperties, Composition, Constraints, DataType, Definition, DefinitionOrRef,
    Enumeration, TypeRef,
};
use serde_json::Value;

use crate::context::RenderContext;

/// One property of an object codec, ready to be placed in a `t.interface`
/// or `t.partial` block.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PropertyCodec {
    pub key: String,
    pub codec: String,
    pub required: bool,
}

/// The io-ts codec expression for a node. Pointers are registered as imports.
pub fn codec(node: &DefinitionOrRef, ctx: &mut RenderContext, opts: &GenerationOptions) -> String {
    match node {
        DefinitionOrRef::Ref(name) => {
            ctx.import(name);
            name.clone()
        }
        DefinitionOrRef::Inline(def) => definition_codec(def, ctx, opts),
    }
}

pub fn definition_codec(def: &Definition, ctx: &mut RenderContext, opts: &GenerationOptions) -> String {
    let base = base_codec(def, ctx, opts);
    if def.nullable && def.data_type != Some(DataType::Null) {
        format!("t.union([{base}, t.null])")
    } else {
        base
    }
}

fn base_codec(def: &Definition, ctx: &mut RenderContext, opts: &GenerationOptions) -> String {
    if let Some(ref composition) = def.composition {
        let members: Vec<String> = composition
            .members()
            .iter()
            .map(|m| codec(m, ctx, opts))
            .collect();
        let composed = match composition {
            Composition::OneOf(_) => combine("t.union", members),
            Composition::AllOf(_) => combine("t.intersection", members),
        };
        if def.properties.is_empty() {
            return composed;
        }
        let own = object_codec(def, ctx, opts);
        return format!("t.intersection([{composed}, {own}])");
    }

    if let Some(ref e) = def.enumeration {
        return enum_codec(e);
    }

    let c = &def.constraints;
    match def.data_type {
        Some(DataType::String) => refine("t.string", "s", string_checks(c, "s")),
        Some(DataType::Integer) => refine("t.Integer", "n", numeric_checks(c, "n")),
        Some(DataType::Number) => refine("t.number", "n", numeric_checks(c, "n")),
        Some(DataType::Boolean) => "t.boolean".to_string(),
        Some(DataType::Null) => "t.null".to_string(),
        Some(DataType::File) => "t.unknown".to_string(),
        Some(DataType::Array) => {
            let item = match def.items {
                Some(ref item) => codec(item, ctx, opts),
                None => "t.unknown".to_string(),
            };
            refine(&format!("t.array({item})"), "a", item_checks(c, "a"))
        }
        Some(DataType::Object) => object_codec(def, ctx, opts),
        None if !def.properties.is_empty() || def.additional_properties.is_some() => {
            object_codec(def, ctx, opts)
        }
        None => "t.unknown".to_string(),
    }
}

/// An inline object codec: required and optional properties split into
/// `t.interface` and `t.partial`.
fn object_codec(def: &Definition, ctx: &mut RenderContext, opts: &GenerationOptions) -> String {
    if def.properties.is_empty() {
        return match def.additional_properties {
            Some(AdditionalProperties::Definition(ref value)) => {
                format!("t.record(t.string, {})", codec(value, ctx, opts))
            }
            _ => "t.UnknownRecord".to_string(),
        };
    }

    let props = properties(def, None, ctx, opts);
    let block = |required: bool| -> Option<String> {
        let fields: Vec<String> = props
            .iter()
            .filter(|p| p.required == required)
            .map(|p| format!("{}: {}", p.key, p.codec))
            .collect();
        (!fields.is_empty()).then(|| fields.join(", "))
    };

    let mut parts = Vec::new();
    if let Some(fields) = block(true) {
        parts.push(format!("t.interface({{ {fields} }})"));
    }
    if let Some(fields) = block(false) {
        parts.push(format!("t.partial({{ {fields} }})"));
    }
    let shape = combine("t.intersection", parts);
    if opts.strict_interfaces {
        format!("t.exact({shape})")
    } else {
        shape
    }
}

/// Property codecs in declaration order. With an `owner`, inline
/// enumerations are hoisted into aliases named after owner and property.
pub fn properties(
    def: &Definition,
    owner: Option<&str>,
    ctx: &mut RenderContext,
    opts: &GenerationOptions,
) -> Vec<PropertyCodec> {
    def.properties
        .iter()
        .map(|(name, node)| {
            let codec = match (owner, node) {
                (Some(owner), DefinitionOrRef::Inline(inner))
                    if inner.enumeration.is_some() && inner.composition.is_none() =>
                {
                    let expr = definition_codec(inner, ctx, opts);
                    ctx.alias(&format!("{owner}{}", name.to_pascal_case()), expr)
                }
                _ => codec(node, ctx, opts),
            };
            PropertyCodec {
                key: property_key(name, opts),
                codec,
                required: def.is_required(name),
            }
        })
        .collect()
}

/// A property key as it appears in an object literal.
pub fn property_key(name: &str, opts: &GenerationOptions) -> String {
    let name = if opts.camel_case {
        name.to_lower_camel_case()
    } else {
        name.to_string()
    };
    quote_key(&name)
}

/// Quote a key unless it is a valid identifier.
pub fn quote_key(name: &str) -> String {
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if valid {
        name.to_string()
    } else {
        string_literal(name)
    }
}

pub fn string_literal(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}

fn enum_codec(e: &Enumeration) -> String {
    let all_strings = e.values.iter().all(Value::is_string);
    if all_strings && !e.extensible {
        let keys: Vec<String> = e
            .values
            .iter()
            .map(|v| format!("{v}: null"))
            .collect();
        return format!("t.keyof({{ {} }})", keys.join(", "));
    }

    let mut members: Vec<String> = e.values.iter().map(literal_codec).collect();
    if e.extensible {
        members.push(if all_strings { "t.string" } else { "t.unknown" }.to_string());
    }
    combine("t.union", members)
}

fn literal_codec(value: &Value) -> String {
    match value {
        Value::Null => "t.null".to_string(),
        other => format!("t.literal({other})"),
    }
}

fn combine(combinator: &str, mut members: Vec<String>) -> String {
    match members.len() {
        0 => "t.unknown".to_string(),
        1 => members.remove(0),
        _ => format!("{combinator}([{}])", members.join(", ")),
    }
}

fn refine(base: &str, var: &str, checks: Vec<String>) -> String {
    if checks.is_empty() {
        return base.to_string();
    }
    format!("t.refinement({base}, ({var}) => {})", checks.join(" && "))
}

fn string_checks(c: &Constraints, var: &str) -> Vec<String> {
    let mut checks = Vec::new();
    if let Some(ref pattern) = c.pattern {
        checks.push(format!("new RegExp({}).test({var})", string_literal(pattern)));
    }
    checks.extend(length_checks(c.min_length, c.max_length, var));
    checks
}

fn numeric_checks(c: &Constraints, var: &str) -> Vec<String> {
    let mut checks = Vec::new();
    if let Some(min) = c.minimum {
        let op = if c.exclusive_minimum { ">" } else { ">=" };
        checks.push(format!("{var} {op} {}", number(min)));
    }
    if let Some(max) = c.maximum {
        let op = if c.exclusive_maximum { "<" } else { "<=" };
        checks.push(format!("{var} {op} {}", number(max)));
    }
    checks
}

fn item_checks(c: &Constraints, var: &str) -> Vec<String> {
    length_checks(c.min_items, c.max_items, var)
}

fn length_checks(min: Option<u64>, max: Option<u64>, var: &str) -> Vec<String> {
    let mut checks = Vec::new();
    if let Some(min) = min {
        checks.push(format!("{var}.length >= {min}"));
    }
    if let Some(max) = max {
        checks.push(format!("{var}.length <= {max}"));
    }
    checks
}

fn number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// The static TypeScript type of a node, as `t.TypeOf` of its codec would
/// produce it.
pub fn ts_type(node: &DefinitionOrRef, ctx: &mut RenderContext, opts: &GenerationOptions) -> String {
    match node {
        DefinitionOrRef::Ref(name) => {
            ctx.import(name);
            name.clone()
        }
        DefinitionOrRef::Inline(def) => definition_ts_type(def, ctx, opts),
    }
}

pub fn definition_ts_type(
    def: &Definition,
    ctx: &mut RenderContext,
    opts: &GenerationOptions,
) -> String {
    let base = base_ts_type(def, ctx, opts);
    if def.nullable && def.data_type != Some(DataType::Null) {
        format!("{base} | null")
    } else {
        base
    }
}

fn base_ts_type(def: &Definition, ctx: &mut RenderContext, opts: &GenerationOptions) -> String {
    if let Some(ref composition) = def.composition {
        let members: Vec<String> = composition
            .members()
            .iter()
            .map(|m| parenthesize(ts_type(m, ctx, opts)))
            .collect();
        let separator = match composition {
            Composition::OneOf(_) => " | ",
            Composition::AllOf(_) => " & ",
        };
        let composed = members.join(separator);
        if def.properties.is_empty() {
            return composed;
        }
        return format!("({composed}) & {}", object_ts_type(def, ctx, opts));
    }

    if let Some(ref e) = def.enumeration {
        let mut members: Vec<String> = e.values.iter().map(Value::to_string).collect();
        if e.extensible {
            members.push("string".to_string());
        }
        return members.join(" | ");
    }

    match def.data_type {
        Some(DataType::String) => "string".to_string(),
        Some(DataType::Integer) | Some(DataType::Number) => "number".to_string(),
        Some(DataType::Boolean) => "boolean".to_string(),
        Some(DataType::Null) => "null".to_string(),
        Some(DataType::File) => "unknown".to_string(),
        Some(DataType::Array) => {
            let item = match def.items {
                Some(ref item) => ts_type(item, ctx, opts),
                None => "unknown".to_string(),
            };
            format!("Array<{item}>")
        }
        Some(DataType::Object) => object_ts_type(def, ctx, opts),
        None if !def.properties.is_empty() || def.additional_properties.is_some() => {
            object_ts_type(def, ctx, opts)
        }
        None => "unknown".to_string(),
    }
}

fn object_ts_type(def: &Definition, ctx: &mut RenderContext, opts: &GenerationOptions) -> String {
    if def.properties.is_empty() {
        return match def.additional_properties {
            Some(AdditionalProperties::Definition(ref value)) => {
                format!("Record<string, {}>", ts_type(value, ctx, opts))
            }
            _ => "Record<string, unknown>".to_string(),
        };
    }
    let fields: Vec<String> = def
        .properties
        .iter()
        .map(|(name, node)| {
            let marker = if def.is_required(name) { "" } else { "?" };
            format!(
                "{}{marker}: {}",
                property_key(name, opts),
                ts_type(node, ctx, opts)
            )
        })
        .collect();
    format!("{{ {} }}", fields.join("; "))
}

fn parenthesize(ty: String) -> String {
    if ty.contains(" | ") || ty.contains(" & ") {
        format!("({ty})")
    } else {
        ty
    }
}

/// The TypeScript type of an operation parameter.
pub fn type_ref_ts(type_ref: &TypeRef, ctx: &mut RenderContext, opts: &GenerationOptions) -> String {
    match type_ref {
        TypeRef::Named(name) => {
            ctx.import(name);
            name.clone()
        }
        TypeRef::Inline(def) => definition_ts_type(def, ctx, opts),
        TypeRef::File => "File".to_string(),
        TypeRef::Binary => "Blob".to_string(),
    }
}
