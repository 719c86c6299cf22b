use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::debug;
use serde_json::Value;

use crate::error::{BundleError, ParseError, ResolveError};

use super::pointer::Pointer;

/// A root document plus every external file its `$ref`s reach, keyed by
/// path relative to the root document's directory.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BundledDocument {
    pub root: Value,
    pub fragments: IndexMap<String, Value>,
}

impl BundledDocument {
    /// A document with no external fragments.
    pub fn from_root(root: Value) -> Self {
        Self {
            root,
            fragments: IndexMap::new(),
        }
    }

    /// Look up the node an external pointer addresses.
    pub fn lookup(&self, pointer: &Pointer) -> Result<&Value, ResolveError> {
        lookup_fragment(&self.fragments, pointer)
    }
}

/// Look up the node an external pointer addresses in a set of loaded files.
pub fn lookup_fragment<'a>(
    fragments: &'a IndexMap<String, Value>,
    pointer: &Pointer,
) -> Result<&'a Value, ResolveError> {
    let Some(file) = pointer.file.as_deref() else {
        return Err(ResolveError::MissingFragment(pointer.key()));
    };
    let fragment = fragments
        .get(file)
        .ok_or_else(|| ResolveError::MissingFragment(file.to_string()))?;
    fragment
        .pointer(&pointer.fragment)
        .ok_or_else(|| ResolveError::TargetNotFound(pointer.key()))
}

/// Loads a specification document together with the files it references.
pub trait Bundler {
    fn bundle(&self, path: &Path) -> Result<BundledDocument, BundleError>;
}

/// Reads documents from the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsBundler;

impl Bundler for FsBundler {
    fn bundle(&self, path: &Path) -> Result<BundledDocument, BundleError> {
        let root = read_document(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));

        let mut bundle = BundledDocument::from_root(root);
        let mut pending: Vec<(Option<String>, Value)> = vec![(None, bundle.root.clone())];

        while let Some((file, value)) = pending.pop() {
            let mut refs = Vec::new();
            collect_refs(&value, &mut refs);
            for raw in refs {
                if raw.contains("://") {
                    debug!("skipping remote reference {raw}");
                    continue;
                }
                let Ok(pointer) = Pointer::parse(&raw) else {
                    continue;
                };
                let Some(target) = pointer.relative_to(file.as_deref()).file else {
                    continue;
                };
                if bundle.fragments.contains_key(&target) {
                    continue;
                }
                debug!("loading fragment {target}");
                let loaded = read_document(&base_dir.join(&target))?;
                bundle.fragments.insert(target.clone(), loaded.clone());
                pending.push((Some(target), loaded));
            }
        }

        Ok(bundle)
    }
}

/// Read a YAML or JSON file into a generic value. JSON is chosen by extension.
pub fn read_document(path: &Path) -> Result<Value, BundleError> {
    let content = fs::read_to_string(path).map_err(|source| BundleError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_value(path, &content)
}

fn parse_value(path: &Path, content: &str) -> Result<Value, BundleError> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let parsed = if is_json {
        serde_json::from_str(content).map_err(ParseError::from)
    } else {
        serde_yaml_ng::from_str(content).map_err(ParseError::from)
    };
    parsed.map_err(|source| BundleError::Parse {
        path: PathBuf::from(path),
        source,
    })
}

fn collect_refs(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                match (key.as_str(), child) {
                    ("$ref", Value::String(raw)) => out.push(raw.clone()),
                    _ => collect_refs(child, out),
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|item| collect_refs(item, out)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_bundle_follows_nested_refs() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "api.yaml",
            r#"
swagger: "2.0"
definitions:
  Person:
    $ref: "defs/people.yaml#/Person"
"#,
        );
        write(
            dir.path(),
            "defs/people.yaml",
            r#"
Person:
  type: object
  properties:
    address:
      $ref: "../shared/address.yaml#/Address"
"#,
        );
        write(
            dir.path(),
            "shared/address.yaml",
            "Address:\n  type: object\n",
        );

        let bundle = FsBundler.bundle(&dir.path().join("api.yaml")).unwrap();
        let keys: Vec<&str> = bundle.fragments.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["defs/people.yaml", "shared/address.yaml"]);

        let pointer = Pointer::parse("shared/address.yaml#/Address").unwrap();
        assert_eq!(bundle.lookup(&pointer).unwrap()["type"], "object");
    }

    #[test]
    fn test_bundle_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "api.json",
            r##"{"openapi": "3.0.0", "components": {"schemas": {"A": {"$ref": "missing.yaml#/A"}}}}"##,
        );
        let err = FsBundler.bundle(&dir.path().join("api.json")).unwrap_err();
        assert!(matches!(err, BundleError::Io { ref path, .. } if path.ends_with("missing.yaml")));
    }

    #[test]
    fn test_lookup_errors() {
        let bundle = BundledDocument::from_root(Value::Null);
        let pointer = Pointer::parse("other.yaml#/X").unwrap();
        assert!(matches!(
            bundle.lookup(&pointer),
            Err(ResolveError::MissingFragment(_))
        ));

        let mut bundle = bundle;
        bundle
            .fragments
            .insert("other.yaml".to_string(), serde_json::json!({"Y": {}}));
        assert!(matches!(
            bundle.lookup(&pointer),
            Err(ResolveError::TargetNotFound(_))
        ));
    }
}
