use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ParseError, TransformError};
use crate::ir::{
    AdditionalProperties, Composition, Constraints, DataType, Definition, DefinitionOrRef,
    Enumeration,
};
use crate::parse::bundle::lookup_fragment;
use crate::parse::pointer::{Pointer, PointerKind};
use crate::parse::schema::{
    AdditionalProperties as RawAdditionalProperties, ExclusiveBound, Items, Schema, SchemaOrRef,
    SchemaType, TypeSet,
};

use super::name_normalizer::promoted_name;
use super::scope::Scope;

/// Turns raw schema nodes of either dialect into [`Definition`]s.
///
/// Internal pointers stay pointers. External pointers follow the flattening
/// rule: a target published under a top-level name (see `aliases`) becomes a
/// pointer to that name; any other target is inlined by value, unless it is
/// already being inlined further up, in which case it is promoted.
pub struct DefinitionNormalizer<'a> {
    fragments: &'a IndexMap<String, Value>,
    /// External pointer key → top-level name it is published under.
    aliases: &'a IndexMap<String, String>,
    top_level: &'a IndexMap<String, SchemaOrRef>,
}

impl<'a> DefinitionNormalizer<'a> {
    pub fn new(
        fragments: &'a IndexMap<String, Value>,
        aliases: &'a IndexMap<String, String>,
        top_level: &'a IndexMap<String, SchemaOrRef>,
    ) -> Self {
        Self {
            fragments,
            aliases,
            top_level,
        }
    }

    /// Normalize a top-level definition of the working document.
    pub fn normalize_top_level(
        &self,
        node: &SchemaOrRef,
        scope: &mut Scope,
    ) -> Result<Definition, TransformError> {
        match node {
            SchemaOrRef::Ref { ref_path } => {
                let pointer = Pointer::parse(ref_path)?.relative_to(None);
                if pointer.is_external() {
                    return self.materialize(&pointer, scope);
                }
                if pointer.kind != PointerKind::Definition {
                    scope.warn(format!(
                        "pointer {ref_path} does not address a definition; left untyped"
                    ));
                    return Ok(Definition::default());
                }
                Ok(Definition::alias(pointer.name))
            }
            SchemaOrRef::Schema(schema) => self.normalize_schema(schema, None, scope),
        }
    }

    /// Expand an external target into a full definition, whatever the
    /// aliases say about it.
    pub fn materialize(
        &self,
        pointer: &Pointer,
        scope: &mut Scope,
    ) -> Result<Definition, TransformError> {
        let target: SchemaOrRef = self.load(pointer)?;
        scope.stack.push(pointer.key());
        let normalized = self.normalize(&target, pointer.file.as_deref(), scope);
        scope.stack.pop();
        Ok(match normalized? {
            DefinitionOrRef::Inline(def) => *def,
            DefinitionOrRef::Ref(name) => Definition::alias(name),
        })
    }

    /// Normalize a node found inside `base_file` (`None` for the root document).
    pub fn normalize(
        &self,
        node: &SchemaOrRef,
        base_file: Option<&str>,
        scope: &mut Scope,
    ) -> Result<DefinitionOrRef, TransformError> {
        match node {
            SchemaOrRef::Ref { ref_path } => self.normalize_pointer(ref_path, base_file, scope),
            SchemaOrRef::Schema(schema) => Ok(DefinitionOrRef::inline(self.normalize_schema(
                schema, base_file, scope,
            )?)),
        }
    }

    fn normalize_pointer(
        &self,
        raw: &str,
        base_file: Option<&str>,
        scope: &mut Scope,
    ) -> Result<DefinitionOrRef, TransformError> {
        let pointer = Pointer::parse(raw)?.relative_to(base_file);

        if !pointer.is_external() {
            if pointer.kind != PointerKind::Definition {
                scope.warn(format!(
                    "pointer {raw} does not address a definition; left untyped"
                ));
                return Ok(DefinitionOrRef::inline(Definition::default()));
            }
            return Ok(DefinitionOrRef::Ref(pointer.name));
        }

        let key = pointer.key();
        if let Some(name) = self.aliases.get(&key) {
            return Ok(DefinitionOrRef::Ref(name.clone()));
        }
        if scope.stack.contains(&key) {
            let name = promoted_name(
                pointer.file.as_deref().unwrap_or_default(),
                &pointer.name,
                |n| self.top_level.contains_key(n),
            );
            scope.promote(&pointer);
            return Ok(DefinitionOrRef::Ref(name));
        }

        let target: SchemaOrRef = self.load(&pointer)?;
        scope.stack.push(key);
        let inlined = self.normalize(&target, pointer.file.as_deref(), scope);
        scope.stack.pop();
        inlined
    }

    /// Deserialize the node an external pointer addresses.
    pub fn load<T: DeserializeOwned>(&self, pointer: &Pointer) -> Result<T, TransformError> {
        let value = lookup_fragment(self.fragments, pointer)?;
        serde_json::from_value(value.clone()).map_err(|source| {
            TransformError::Parse(ParseError::Fragment {
                pointer: pointer.key(),
                source,
            })
        })
    }

    pub fn normalize_schema(
        &self,
        schema: &Schema,
        base_file: Option<&str>,
        scope: &mut Scope,
    ) -> Result<Definition, TransformError> {
        let mut def = Definition {
            nullable: schema.nullable.unwrap_or(false),
            format: schema.format.clone(),
            required: schema.required.clone(),
            default: schema.default_value.clone(),
            title: schema.title.clone(),
            description: schema.description.clone(),
            import_hint: schema.x_import.clone(),
            constraints: constraints(schema),
            ..Definition::default()
        };

        let mut type_variants = Vec::new();
        match schema.schema_type {
            Some(TypeSet::Single(t)) => def.data_type = Some(data_type(t)),
            Some(TypeSet::Multiple(ref types)) => {
                def.nullable |= types.contains(&SchemaType::Null);
                let non_null: Vec<DataType> = types
                    .iter()
                    .filter(|t| **t != SchemaType::Null)
                    .map(|t| data_type(*t))
                    .collect();
                match non_null.as_slice() {
                    [] => def.data_type = Some(DataType::Null),
                    [single] => def.data_type = Some(*single),
                    _ => type_variants = non_null,
                }
            }
            None => {}
        }

        for (name, prop) in &schema.properties {
            let normalized = self.normalize(prop, base_file, scope)?;
            def.properties.insert(name.clone(), normalized);
        }

        def.items = match schema.items {
            Some(Items::Single(ref item)) => {
                Some(Box::new(self.normalize(item, base_file, scope)?))
            }
            Some(Items::List(ref list)) => {
                if list.len() > 1 {
                    scope.warn(format!(
                        "array declares {} item schemas; only the first is kept",
                        list.len()
                    ));
                }
                match list.first() {
                    Some(first) => Some(Box::new(self.normalize(first, base_file, scope)?)),
                    None => None,
                }
            }
            None => None,
        };

        def.additional_properties = match schema.additional_properties {
            Some(RawAdditionalProperties::Bool(b)) => Some(AdditionalProperties::Bool(b)),
            Some(RawAdditionalProperties::Schema(ref inner)) => Some(
                AdditionalProperties::Definition(Box::new(self.normalize(inner, base_file, scope)?)),
            ),
            None => None,
        };

        def.enumeration = if !schema.enum_values.is_empty() {
            Some(Enumeration {
                values: schema.enum_values.clone(),
                extensible: false,
            })
        } else if !schema.x_extensible_enum.is_empty() {
            Some(Enumeration {
                values: schema.x_extensible_enum.clone(),
                extensible: true,
            })
        } else {
            None
        };

        def.composition = self.composition(schema, base_file, scope)?;
        if def.composition.is_none() && !type_variants.is_empty() {
            def.composition = Some(Composition::OneOf(
                type_variants
                    .into_iter()
                    .map(|t| DefinitionOrRef::inline(Definition::of_type(t)))
                    .collect(),
            ));
        }

        Ok(def)
    }

    /// `oneOf` wins over `anyOf`, which wins over `allOf`. With `x-one-of`
    /// set and no `oneOf`, the `allOf` members form a disjoint union.
    fn composition(
        &self,
        schema: &Schema,
        base_file: Option<&str>,
        scope: &mut Scope,
    ) -> Result<Option<Composition>, TransformError> {
        let explicit_union = if !schema.one_of.is_empty() {
            Some(&schema.one_of)
        } else if !schema.any_of.is_empty() {
            Some(&schema.any_of)
        } else {
            None
        };

        if let Some(members) = explicit_union {
            if !schema.all_of.is_empty() {
                scope.warn("allOf ignored next to oneOf/anyOf");
            }
            let members = self.normalize_all(members, base_file, scope)?;
            return Ok(Some(Composition::OneOf(members)));
        }

        if schema.all_of.is_empty() {
            return Ok(None);
        }
        let members = self.normalize_all(&schema.all_of, base_file, scope)?;
        if schema.x_one_of == Some(true) {
            Ok(Some(Composition::OneOf(members)))
        } else {
            Ok(Some(Composition::AllOf(members)))
        }
    }

    fn normalize_all(
        &self,
        nodes: &[SchemaOrRef],
        base_file: Option<&str>,
        scope: &mut Scope,
    ) -> Result<Vec<DefinitionOrRef>, TransformError> {
        nodes
            .iter()
            .map(|node| self.normalize(node, base_file, scope))
            .collect()
    }
}

fn data_type(t: SchemaType) -> DataType {
    match t {
        SchemaType::String => DataType::String,
        SchemaType::Number => DataType::Number,
        SchemaType::Integer => DataType::Integer,
        SchemaType::Boolean => DataType::Boolean,
        SchemaType::Array => DataType::Array,
        SchemaType::Object => DataType::Object,
        SchemaType::Null => DataType::Null,
        SchemaType::File => DataType::File,
    }
}

fn constraints(schema: &Schema) -> Constraints {
    let mut c = Constraints {
        minimum: schema.minimum,
        maximum: schema.maximum,
        min_length: schema.min_length,
        max_length: schema.max_length,
        pattern: schema.pattern.clone(),
        min_items: schema.min_items,
        max_items: schema.max_items,
        ..Constraints::default()
    };
    match schema.exclusive_minimum {
        Some(ExclusiveBound::Flag(flag)) => c.exclusive_minimum = flag,
        Some(ExclusiveBound::Bound(bound)) => {
            c.minimum = Some(bound);
            c.exclusive_minimum = true;
        }
        None => {}
    }
    match schema.exclusive_maximum {
        Some(ExclusiveBound::Flag(flag)) => c.exclusive_maximum = flag,
        Some(ExclusiveBound::Bound(bound)) => {
            c.maximum = Some(bound);
            c.exclusive_maximum = true;
        }
        None => {}
    }
    c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(yaml: &str) -> SchemaOrRef {
        serde_yaml_ng::from_str(yaml).unwrap()
    }

    fn normalize(yaml: &str) -> (Definition, Scope) {
        let fragments = IndexMap::new();
        let aliases = IndexMap::new();
        let top_level = IndexMap::new();
        let normalizer = DefinitionNormalizer::new(&fragments, &aliases, &top_level);
        let mut scope = Scope::new("Test");
        let def = normalizer
            .normalize_top_level(&schema(yaml), &mut scope)
            .unwrap();
        (def, scope)
    }

    #[test]
    fn test_properties_keep_declaration_order() {
        let (def, _) = normalize(
            r##"
type: object
required: [zeta]
properties:
  zeta: {type: string}
  alpha: {$ref: "#/definitions/Alpha"}
  mid: {type: integer, minimum: 1}
"##,
        );
        let keys: Vec<&str> = def.properties.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(def.properties["alpha"], DefinitionOrRef::Ref("Alpha".into()));
        assert!(def.is_required("zeta"));
        assert!(!def.is_required("mid"));
    }

    #[test]
    fn test_x_one_of_remaps_all_of() {
        let (def, _) = normalize(
            r##"
x-one-of: true
allOf:
  - $ref: "#/definitions/A"
  - $ref: "#/definitions/B"
"##,
        );
        assert_eq!(
            def.composition,
            Some(Composition::OneOf(vec![
                DefinitionOrRef::Ref("A".into()),
                DefinitionOrRef::Ref("B".into()),
            ]))
        );
    }

    #[test]
    fn test_all_of_without_marker_stays_intersection() {
        let (def, _) = normalize(
            r##"
allOf:
  - $ref: "#/definitions/A"
  - type: object
    properties:
      extra: {type: string}
"##,
        );
        assert!(matches!(def.composition, Some(Composition::AllOf(ref m)) if m.len() == 2));
    }

    #[test]
    fn test_one_of_wins_over_all_of() {
        let (def, scope) = normalize(
            r##"
oneOf:
  - $ref: "#/definitions/A"
allOf:
  - $ref: "#/definitions/B"
"##,
        );
        assert_eq!(
            def.composition,
            Some(Composition::OneOf(vec![DefinitionOrRef::Ref("A".into())]))
        );
        assert_eq!(scope.diagnostics().len(), 1);
    }

    #[test]
    fn test_any_of_folds_into_one_of() {
        let (def, _) = normalize("anyOf:\n  - type: string\n  - type: integer\n");
        assert!(matches!(def.composition, Some(Composition::OneOf(ref m)) if m.len() == 2));
    }

    #[test]
    fn test_extensible_enum() {
        let (def, _) = normalize("type: string\nx-extensible-enum: [RED, GREEN]\n");
        let e = def.enumeration.unwrap();
        assert!(e.extensible);
        assert_eq!(e.values, vec![Value::from("RED"), Value::from("GREEN")]);

        let (def, _) = normalize("type: string\nenum: [A]\n");
        assert!(!def.enumeration.unwrap().extensible);
    }

    #[test]
    fn test_multiple_items_keeps_first_with_warning() {
        let (def, scope) = normalize(
            r##"
type: array
items:
  - $ref: "#/definitions/First"
  - $ref: "#/definitions/Second"
"##,
        );
        assert_eq!(
            def.items.as_deref(),
            Some(&DefinitionOrRef::Ref("First".into()))
        );
        assert_eq!(scope.diagnostics().len(), 1);
        assert!(scope.diagnostics()[0].message.contains("only the first"));
    }

    #[test]
    fn test_type_list_with_null() {
        let (def, _) = normalize("type: [string, 'null']\n");
        assert_eq!(def.data_type, Some(DataType::String));
        assert!(def.nullable);

        let (def, _) = normalize("type: [string, integer]\n");
        assert_eq!(def.data_type, None);
        assert!(matches!(def.composition, Some(Composition::OneOf(ref m)) if m.len() == 2));
    }

    #[test]
    fn test_exclusive_bounds() {
        let (def, _) = normalize("type: integer\nminimum: 1\nexclusiveMinimum: true\n");
        assert_eq!(def.constraints.minimum, Some(1.0));
        assert!(def.constraints.exclusive_minimum);

        let (def, _) = normalize("type: number\nexclusiveMaximum: 10\n");
        assert_eq!(def.constraints.maximum, Some(10.0));
        assert!(def.constraints.exclusive_maximum);
    }

    #[test]
    fn test_dictionary_and_import_hint() {
        let (def, _) = normalize(
            r##"
type: object
additionalProperties:
  $ref: "#/definitions/Value"
"##,
        );
        assert!(def.is_dictionary());

        let (def, _) = normalize("type: string\nx-import: '@pagopa/ts-commons/lib/strings'\n");
        assert_eq!(
            def.import_hint.as_deref(),
            Some("@pagopa/ts-commons/lib/strings")
        );
    }

    #[test]
    fn test_normalization_is_deterministic() {
        let yaml = r##"
type: object
properties:
  b: {type: string, pattern: "^[a-z]+$"}
  a: {type: array, items: {$ref: "#/definitions/A"}}
"##;
        assert_eq!(normalize(yaml).0, normalize(yaml).0);
    }

    #[test]
    fn test_top_level_internal_alias() {
        let (def, _) = normalize("$ref: '#/definitions/Other'\n");
        assert_eq!(def, Definition::alias("Other"));
    }
}
