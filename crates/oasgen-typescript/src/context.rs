use std::collections::BTreeSet;

use serde::Serialize;

/// A named codec hoisted out of a property so it can be reused by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeAlias {
    pub name: String,
    pub codec: String,
}

/// Accumulators threaded through one render call.
///
/// Each rendered module owns its context; nothing is shared between
/// parallel renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderContext {
    /// Definition names the module refers to.
    pub imports: BTreeSet<String>,
    /// Aliases to declare ahead of the module's main codec.
    pub type_aliases: Vec<TypeAlias>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn import(&mut self, name: &str) {
        if !self.imports.contains(name) {
            self.imports.insert(name.to_string());
        }
    }

    /// Register an alias and return the name to refer to it by. A name
    /// already registered with a different codec gets a numeric suffix.
    pub fn alias(&mut self, name: &str, codec: String) -> String {
        let mut candidate = name.to_string();
        let mut n = 1;
        loop {
            match self.type_aliases.iter().find(|a| a.name == candidate) {
                Some(existing) if existing.codec == codec => return candidate,
                Some(_) => {
                    n += 1;
                    candidate = format!("{name}{n}");
                }
                None => break,
            }
        }
        self.type_aliases.push(TypeAlias {
            name: candidate.clone(),
            codec,
        });
        candidate
    }

    pub fn merge(&mut self, other: RenderContext) {
        self.imports.extend(other.imports);
        for alias in other.type_aliases {
            self.alias(&alias.name, alias.codec);
        }
    }
}
