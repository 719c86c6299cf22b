use std::fmt;

use indexmap::IndexMap;

use super::definition::Definition;
use super::operations::OperationInfo;

/// A fully normalized, generator-ready view of a specification document.
#[derive(Debug, Clone, PartialEq)]
pub struct IrSpec {
    pub meta: SpecMetaInfo,
    /// Top-level definitions keyed by their name in the working document,
    /// followed by names promoted while resolving external cycles.
    pub definitions: IndexMap<String, Definition>,
    pub operations: Vec<OperationInfo>,
    /// Everything dropped or narrowed along the way.
    pub diagnostics: Vec<Diagnostic>,
}

/// Document-level metadata.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecMetaInfo {
    pub base_path: Option<String>,
    pub version: String,
    pub title: String,
}

/// A recoverable problem found while building the IR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// What the problem is attached to: `GET /pets`, `Pet.tags`, ...
    pub subject: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)
    }
}

/// A name with multiple casing variants pre-computed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedName {
    pub original: String,
    pub pascal_case: String,
    pub camel_case: String,
}

impl fmt::Display for NormalizedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}
