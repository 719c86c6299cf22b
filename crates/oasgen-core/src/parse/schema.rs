use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A JSON Schema type keyword value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    Null,
    /// Swagger 2.0 only, for `formData` parameters.
    File,
}

/// The `type` field can be a single type or an array of types (3.1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeSet {
    Single(SchemaType),
    Multiple(Vec<SchemaType>),
}

/// A reference or inline schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Schema(Box<Schema>),
}

impl SchemaOrRef {
    pub fn as_ref_path(&self) -> Option<&str> {
        match self {
            SchemaOrRef::Ref { ref_path } => Some(ref_path),
            SchemaOrRef::Schema(_) => None,
        }
    }
}

/// `items` is normally one schema; Swagger-era documents sometimes list several.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Items {
    Single(Box<SchemaOrRef>),
    List(Vec<SchemaOrRef>),
}

/// `exclusiveMinimum` / `exclusiveMaximum`: a flag up to 3.0, a bound in 3.1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExclusiveBound {
    Flag(bool),
    Bound(f64),
}

/// Discriminator for polymorphic schemas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discriminator {
    #[serde(rename = "propertyName")]
    pub property_name: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub mapping: IndexMap<String, String>,
}

/// A JSON Schema object shared by both dialects, plus the extension
/// keywords the generator understands.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<TypeSet>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "default", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,

    // Object properties
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, SchemaOrRef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    #[serde(
        rename = "additionalProperties",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<AdditionalProperties>,

    // Array items
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Items>,

    // Composition
    #[serde(rename = "allOf", default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<SchemaOrRef>,

    #[serde(rename = "oneOf", default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<SchemaOrRef>,

    #[serde(rename = "anyOf", default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<SchemaOrRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Discriminator>,

    // Enum values
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<serde_json::Value>,

    // Numeric constraints
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(rename = "exclusiveMinimum", skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<ExclusiveBound>,
    #[serde(rename = "exclusiveMaximum", skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<ExclusiveBound>,

    // String constraints
    #[serde(rename = "minLength", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    // Array constraints
    #[serde(rename = "minItems", skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(rename = "maxItems", skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,

    // Extensions
    /// Reinterpret `allOf` as a disjoint union.
    #[serde(rename = "x-one-of", skip_serializing_if = "Option::is_none")]
    pub x_one_of: Option<bool>,

    /// Enum values that consumers must tolerate growing.
    #[serde(
        rename = "x-extensible-enum",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub x_extensible_enum: Vec<serde_json::Value>,

    /// Module the type should be imported from instead of generated.
    #[serde(rename = "x-import", skip_serializing_if = "Option::is_none")]
    pub x_import: Option<String>,
}

/// `additionalProperties` can be a boolean or a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Bool(bool),
    Schema(Box<SchemaOrRef>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_ref_is_ref_variant() {
        let s: SchemaOrRef = serde_json::from_str(r##"{"$ref": "#/definitions/Pet"}"##).unwrap();
        assert_eq!(s.as_ref_path(), Some("#/definitions/Pet"));
    }

    #[test]
    fn test_extensions_deserialize() {
        let s: Schema = serde_yaml_ng::from_str(
            r##"
x-one-of: true
x-extensible-enum: [A, B]
x-import: "@pagopa/ts-commons/lib/strings"
allOf:
  - $ref: "#/definitions/A"
"##,
        )
        .unwrap();
        assert_eq!(s.x_one_of, Some(true));
        assert_eq!(s.x_extensible_enum.len(), 2);
        assert_eq!(s.x_import.as_deref(), Some("@pagopa/ts-commons/lib/strings"));
        assert_eq!(s.all_of.len(), 1);
    }

    #[test]
    fn test_items_list_and_exclusive_forms() {
        let s: Schema = serde_yaml_ng::from_str(
            r#"
type: array
items:
  - type: string
  - type: integer
"#,
        )
        .unwrap();
        assert!(matches!(s.items, Some(Items::List(ref l)) if l.len() == 2));

        let flag: Schema = serde_yaml_ng::from_str("exclusiveMinimum: true\nminimum: 1").unwrap();
        assert_eq!(flag.exclusive_minimum, Some(ExclusiveBound::Flag(true)));

        let bound: Schema = serde_yaml_ng::from_str("exclusiveMaximum: 10").unwrap();
        assert_eq!(bound.exclusive_maximum, Some(ExclusiveBound::Bound(10.0)));
    }
}
