pub mod client;
pub mod definitions;
pub mod request_types;

use indexmap::IndexMap;
use oasgen_core::ir::Definition;
use serde::Serialize;

/// Directory holding one module per definition.
pub const DEFINITIONS_DIR: &str = "definitions";

/// Runtime module the generated request types and decoders build on.
pub const REQUESTS_MODULE: &str = "@pagopa/ts-commons/lib/requests";
pub const TYPES_MODULE: &str = "@pagopa/ts-commons/lib/types";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportView {
    pub name: String,
    pub path: String,
}

/// Import lines for definition names. A definition carrying an `x-import`
/// hint is imported from the hinted module instead of `prefix`.
pub fn import_views<'a>(
    names: impl IntoIterator<Item = &'a String>,
    definitions: &IndexMap<String, Definition>,
    prefix: &str,
) -> Vec<ImportView> {
    names
        .into_iter()
        .map(|name| ImportView {
            name: name.clone(),
            path: definitions
                .get(name)
                .and_then(|d| d.import_hint.clone())
                .unwrap_or_else(|| format!("{prefix}{name}")),
        })
        .collect()
}

/// `"a" | "b"`, or `never` for an empty set.
pub fn literal_union<S: AsRef<str>>(values: &[S]) -> String {
    if values.is_empty() {
        return "never".to_string();
    }
    values
        .iter()
        .map(|v| crate::codec::string_literal(v.as_ref()))
        .collect::<Vec<_>>()
        .join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_union() {
        assert_eq!(literal_union::<&str>(&[]), "never");
        assert_eq!(literal_union(&["X-Key", "Location"]), r#""X-Key" | "Location""#);
    }

    #[test]
    fn test_import_hint_wins() {
        let mut defs = IndexMap::new();
        defs.insert("Pet".to_string(), Definition::default());
        defs.insert(
            "FiscalCode".to_string(),
            Definition {
                import_hint: Some("@pagopa/ts-commons/lib/strings".into()),
                ..Definition::default()
            },
        );
        let names = ["FiscalCode".to_string(), "Pet".to_string()];
        let views = import_views(&names, &defs, "./definitions/");
        assert_eq!(views[0].path, "@pagopa/ts-commons/lib/strings");
        assert_eq!(views[1].path, "./definitions/Pet");
    }
}
