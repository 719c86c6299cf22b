use indexmap::IndexMap;
use serde_json::Value;

/// Primitive type of a normalized schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Null,
    /// Opaque file upload (Swagger `type: file`).
    File,
}

/// A property, item or composition member: either a pointer to a top-level
/// definition by name, or a structure inlined by value.
#[derive(Debug, Clone, PartialEq)]
pub enum DefinitionOrRef {
    Ref(String),
    Inline(Box<Definition>),
}

impl DefinitionOrRef {
    pub fn inline(definition: Definition) -> Self {
        DefinitionOrRef::Inline(Box::new(definition))
    }

    pub fn as_ref_name(&self) -> Option<&str> {
        match self {
            DefinitionOrRef::Ref(name) => Some(name),
            DefinitionOrRef::Inline(_) => None,
        }
    }

    /// Every top-level name this node points to, transitively through inline
    /// structure, in first-seen order.
    pub fn referenced_names(&self, out: &mut Vec<String>) {
        match self {
            DefinitionOrRef::Ref(name) => {
                if !out.contains(name) {
                    out.push(name.clone());
                }
            }
            DefinitionOrRef::Inline(def) => def.referenced_names(out),
        }
    }
}

/// How the members of a composed schema combine. A node holds at most one
/// kind, so `oneOf` and `allOf` can never both be populated.
#[derive(Debug, Clone, PartialEq)]
pub enum Composition {
    OneOf(Vec<DefinitionOrRef>),
    AllOf(Vec<DefinitionOrRef>),
}

impl Composition {
    pub fn members(&self) -> &[DefinitionOrRef] {
        match self {
            Composition::OneOf(members) | Composition::AllOf(members) => members,
        }
    }
}

/// Literal values a node is restricted to.
#[derive(Debug, Clone, PartialEq)]
pub struct Enumeration {
    pub values: Vec<Value>,
    /// Declared with `x-extensible-enum`: consumers must accept unknown values.
    pub extensible: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdditionalProperties {
    Bool(bool),
    Definition(Box<DefinitionOrRef>),
}

/// Numeric, string and array validation keywords.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Constraints {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: bool,
    pub exclusive_maximum: bool,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<String>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
}

impl Constraints {
    pub fn has_numeric_range(&self) -> bool {
        self.minimum.is_some() || self.maximum.is_some()
    }

    pub fn has_length_range(&self) -> bool {
        self.min_length.is_some() || self.max_length.is_some()
    }
}

/// A normalized schema node, independent of the dialect it came from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Definition {
    /// Absent for composed or untyped nodes.
    pub data_type: Option<DataType>,
    pub nullable: bool,
    pub format: Option<String>,
    /// Declaration order is the generated field order.
    pub properties: IndexMap<String, DefinitionOrRef>,
    pub required: Vec<String>,
    pub items: Option<Box<DefinitionOrRef>>,
    pub additional_properties: Option<AdditionalProperties>,
    pub enumeration: Option<Enumeration>,
    pub composition: Option<Composition>,
    pub constraints: Constraints,
    pub default: Option<Value>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Module to import the type from instead of generating it (`x-import`).
    pub import_hint: Option<String>,
}

impl Definition {
    pub fn of_type(data_type: DataType) -> Self {
        Self {
            data_type: Some(data_type),
            ..Self::default()
        }
    }

    /// A node that stands for another top-level definition.
    pub fn alias(name: impl Into<String>) -> Self {
        Self {
            composition: Some(Composition::AllOf(vec![DefinitionOrRef::Ref(name.into())])),
            ..Self::default()
        }
    }

    pub fn is_required(&self, property: &str) -> bool {
        self.required.iter().any(|r| r == property)
    }

    /// An object whose only shape is its `additionalProperties` schema.
    pub fn is_dictionary(&self) -> bool {
        self.properties.is_empty()
            && matches!(self.additional_properties, Some(AdditionalProperties::Definition(_)))
    }

    pub fn referenced_names(&self, out: &mut Vec<String>) {
        for prop in self.properties.values() {
            prop.referenced_names(out);
        }
        if let Some(ref items) = self.items {
            items.referenced_names(out);
        }
        if let Some(AdditionalProperties::Definition(ref def)) = self.additional_properties {
            def.referenced_names(out);
        }
        if let Some(ref composition) = self.composition {
            for member in composition.members() {
                member.referenced_names(out);
            }
        }
    }
}
