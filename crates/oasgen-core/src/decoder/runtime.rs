use indexmap::IndexMap;
use serde_json::Value;

use crate::error::DecodeError;
use crate::ir::{AdditionalProperties, Composition, DataType, Definition, DefinitionOrRef};

use super::plan::{DecoderPlan, DecoderStrategy};

const MAX_DEPTH: usize = 64;

/// A successfully decoded response.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub status: u16,
    pub value: Value,
    pub headers: Vec<String>,
}

/// Evaluates a [`DecoderPlan`] the way the generated decoder does: the
/// per-status decoders are tried left to right and the first one whose
/// status and payload shape both match wins.
///
/// Matching is structural only. `pattern` and `format` are not checked.
pub struct ComposedDecoder<'a> {
    plan: &'a DecoderPlan,
    definitions: &'a IndexMap<String, Definition>,
}

impl<'a> ComposedDecoder<'a> {
    pub fn new(plan: &'a DecoderPlan, definitions: &'a IndexMap<String, Definition>) -> Self {
        Self { plan, definitions }
    }

    /// Decode a response. An absent body is passed as `Value::Null`.
    pub fn decode(&self, status: u16, payload: &Value) -> Result<Decoded, DecodeError> {
        self.plan
            .entries
            .iter()
            .filter(|entry| entry.status == status)
            .find(|entry| self.accepts(&entry.strategy, payload))
            .map(|entry| Decoded {
                status,
                value: payload.clone(),
                headers: entry.headers.clone(),
            })
            .ok_or(DecodeError::NoMatch { status })
    }

    fn accepts(&self, strategy: &DecoderStrategy, payload: &Value) -> bool {
        match strategy {
            DecoderStrategy::Constant => payload.is_null(),
            DecoderStrategy::Binary => match payload {
                Value::String(_) => true,
                Value::Array(bytes) => bytes.iter().all(|b| b.as_u64().is_some_and(|b| b <= 255)),
                _ => false,
            },
            DecoderStrategy::Exact(name) | DecoderStrategy::ErrorEnvelope(name) => {
                self.matches_named(name, payload, 0)
            }
        }
    }

    fn matches_named(&self, name: &str, value: &Value, depth: usize) -> bool {
        match self.definitions.get(name) {
            Some(def) => self.matches_definition(def, value, depth + 1),
            None => false,
        }
    }

    fn matches(&self, node: &DefinitionOrRef, value: &Value, depth: usize) -> bool {
        match node {
            DefinitionOrRef::Ref(name) => self.matches_named(name, value, depth),
            DefinitionOrRef::Inline(def) => self.matches_definition(def, value, depth + 1),
        }
    }

    fn matches_definition(&self, def: &Definition, value: &Value, depth: usize) -> bool {
        if depth > MAX_DEPTH {
            return false;
        }
        if value.is_null() && def.nullable {
            return true;
        }
        if let Some(ref e) = def.enumeration
            && !e.extensible
            && !e.values.contains(value)
        {
            return false;
        }
        let composed = match def.composition {
            Some(Composition::OneOf(ref members)) => {
                members.iter().any(|m| self.matches(m, value, depth))
            }
            Some(Composition::AllOf(ref members)) => {
                members.iter().all(|m| self.matches(m, value, depth))
            }
            None => true,
        };
        composed && self.matches_shape(def, value, depth)
    }

    fn matches_shape(&self, def: &Definition, value: &Value, depth: usize) -> bool {
        let c = &def.constraints;
        match def.data_type {
            Some(DataType::String) => value.as_str().is_some_and(|s| {
                let len = s.chars().count() as u64;
                c.min_length.is_none_or(|min| len >= min) && c.max_length.is_none_or(|max| len <= max)
            }),
            Some(DataType::Integer) => {
                let integral = value.is_i64()
                    || value.is_u64()
                    || value.as_f64().is_some_and(|f| f.fract() == 0.0);
                integral && self.in_range(def, value)
            }
            Some(DataType::Number) => value.is_number() && self.in_range(def, value),
            Some(DataType::Boolean) => value.is_boolean(),
            Some(DataType::Null) => value.is_null(),
            Some(DataType::File) => value.is_string(),
            Some(DataType::Array) => match value.as_array() {
                Some(items) => {
                    let len = items.len() as u64;
                    c.min_items.is_none_or(|min| len >= min)
                        && c.max_items.is_none_or(|max| len <= max)
                        && match def.items {
                            Some(ref item) => items.iter().all(|v| self.matches(item, v, depth)),
                            None => true,
                        }
                }
                None => false,
            },
            Some(DataType::Object) => self.matches_object(def, value, depth),
            None if !def.properties.is_empty() || def.additional_properties.is_some() => {
                self.matches_object(def, value, depth)
            }
            None => true,
        }
    }

    fn matches_object(&self, def: &Definition, value: &Value, depth: usize) -> bool {
        let Some(map) = value.as_object() else {
            return false;
        };
        if def.required.iter().any(|r| !map.contains_key(r)) {
            return false;
        }
        for (key, field) in map {
            let accepted = match def.properties.get(key) {
                Some(prop) => self.matches(prop, field, depth),
                None => match def.additional_properties {
                    Some(AdditionalProperties::Definition(ref extra)) => {
                        self.matches(extra, field, depth)
                    }
                    Some(AdditionalProperties::Bool(allowed)) => allowed,
                    None => true,
                },
            };
            if !accepted {
                return false;
            }
        }
        true
    }

    fn in_range(&self, def: &Definition, value: &Value) -> bool {
        let c = &def.constraints;
        let Some(n) = value.as_f64() else {
            return false;
        };
        let above = match c.minimum {
            Some(min) if c.exclusive_minimum => n > min,
            Some(min) => n >= min,
            None => true,
        };
        let below = match c.maximum {
            Some(max) if c.exclusive_maximum => n < max,
            Some(max) => n <= max,
            None => true,
        };
        above && below
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::decoder::plan::DecoderEntry;

    fn definitions() -> IndexMap<String, Definition> {
        let mut message = Definition::of_type(DataType::Object);
        message.required = vec!["id".into()];
        message
            .properties
            .insert("id".into(), DefinitionOrRef::inline(Definition::of_type(DataType::String)));

        let mut limited = Definition::of_type(DataType::Integer);
        limited.constraints.minimum = Some(0.0);
        limited.constraints.maximum = Some(10.0);
        limited.constraints.exclusive_maximum = true;

        IndexMap::from([("Message".to_string(), message), ("Limited".to_string(), limited)])
    }

    fn plan(entries: Vec<(u16, DecoderStrategy)>) -> DecoderPlan {
        DecoderPlan {
            primary_success: 200,
            entries: entries
                .into_iter()
                .map(|(status, strategy)| DecoderEntry {
                    status,
                    strategy,
                    headers: vec![],
                })
                .collect(),
        }
    }

    #[test]
    fn test_status_must_match() {
        let defs = definitions();
        let plan = plan(vec![(200, DecoderStrategy::Exact("Message".into()))]);
        let decoder = ComposedDecoder::new(&plan, &defs);
        assert!(decoder.decode(200, &json!({"id": "a"})).is_ok());
        assert_eq!(
            decoder.decode(201, &json!({"id": "a"})),
            Err(DecodeError::NoMatch { status: 201 })
        );
        assert_eq!(
            decoder.decode(200, &json!({"name": "a"})),
            Err(DecodeError::NoMatch { status: 200 })
        );
    }

    #[test]
    fn test_ranges_and_binary() {
        let defs = definitions();
        let plan = plan(vec![
            (200, DecoderStrategy::Exact("Limited".into())),
            (206, DecoderStrategy::Binary),
        ]);
        let decoder = ComposedDecoder::new(&plan, &defs);
        assert!(decoder.decode(200, &json!(0)).is_ok());
        assert!(decoder.decode(200, &json!(10)).is_err());
        assert!(decoder.decode(200, &json!(2.5)).is_err());
        assert!(decoder.decode(206, &json!([0, 255])).is_ok());
        assert!(decoder.decode(206, &json!({})).is_err());
    }

    #[test]
    fn test_unknown_type_never_matches() {
        let defs = definitions();
        let plan = plan(vec![(200, DecoderStrategy::Exact("Missing".into()))]);
        let decoder = ComposedDecoder::new(&plan, &defs);
        assert!(decoder.decode(200, &json!({})).is_err());
    }
}
