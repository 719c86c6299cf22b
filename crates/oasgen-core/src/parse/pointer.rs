use std::fmt;

use crate::error::ResolveError;

/// What a pointer addresses, decided by its collection segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    Definition,
    Parameter,
    Response,
    RequestBody,
    Other,
}

/// A parsed `$ref` of the form `[file]#/<collection>/<name>`.
///
/// Recognized collections:
///
/// | pointer                             | kind          |
/// |-------------------------------------|---------------|
/// | `#/definitions/X`                   | `Definition`  |
/// | `#/components/schemas/X`            | `Definition`  |
/// | `#/parameters/X`                    | `Parameter`   |
/// | `#/components/parameters/X`         | `Parameter`   |
/// | `#/responses/X`                     | `Response`    |
/// | `#/components/responses/X`          | `Response`    |
/// | `#/components/requestBodies/X`      | `RequestBody` |
/// | `other.yaml#/X`                     | `Definition`  |
///
/// Everything else is `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pointer {
    pub file: Option<String>,
    pub kind: PointerKind,
    /// Decoded segments between `#/` and the name, joined with `/`.
    pub collection: String,
    pub name: String,
    /// The raw JSON pointer after `#` (still escaped).
    pub fragment: String,
}

impl Pointer {
    pub fn parse(raw: &str) -> Result<Self, ResolveError> {
        let (file, fragment) = match raw.split_once('#') {
            Some((file, fragment)) => (file, fragment),
            None => (raw, ""),
        };
        let file = (!file.is_empty()).then(|| file.to_string());

        if fragment.is_empty() {
            // A whole-file reference: the file itself is the target.
            return match file {
                Some(file) => Ok(Self {
                    name: file_stem(&file).to_string(),
                    file: Some(file),
                    kind: PointerKind::Other,
                    collection: String::new(),
                    fragment: String::new(),
                }),
                None => Err(ResolveError::InvalidPointer(raw.to_string())),
            };
        }

        let Some(path) = fragment.strip_prefix('/') else {
            return Err(ResolveError::InvalidPointer(raw.to_string()));
        };
        let segments: Vec<String> = path.split('/').map(unescape).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(ResolveError::InvalidPointer(raw.to_string()));
        }

        let segs: Vec<&str> = segments.iter().map(String::as_str).collect();
        let kind = match segs.as_slice() {
            ["definitions", _] | ["components", "schemas", _] => PointerKind::Definition,
            ["parameters", _] | ["components", "parameters", _] => PointerKind::Parameter,
            ["responses", _] | ["components", "responses", _] => PointerKind::Response,
            ["components", "requestBodies", _] => PointerKind::RequestBody,
            [_] if file.is_some() => PointerKind::Definition,
            _ => PointerKind::Other,
        };

        let (name, collection) = match segs.split_last() {
            Some((name, rest)) => (name.to_string(), rest.join("/")),
            None => return Err(ResolveError::InvalidPointer(raw.to_string())),
        };

        Ok(Self {
            file,
            kind,
            collection,
            name,
            fragment: fragment.to_string(),
        })
    }

    pub fn is_external(&self) -> bool {
        self.file.is_some()
    }

    /// Re-anchor a pointer found inside `base_file`: a local pointer refers
    /// to `base_file` itself; a relative file is resolved against its directory.
    pub fn relative_to(&self, base_file: Option<&str>) -> Pointer {
        let file = match (&self.file, base_file) {
            (None, base) => base.map(str::to_string),
            (Some(file), Some(base)) => Some(join_relative(base, file)),
            (Some(file), None) => Some(normalize_path(file)),
        };
        // `#/Name` inside a fragment file addresses a root-level definition.
        let kind = if self.kind == PointerKind::Other
            && self.collection.is_empty()
            && !self.fragment.is_empty()
            && file.is_some()
        {
            PointerKind::Definition
        } else {
            self.kind
        };
        Pointer {
            file,
            kind,
            ..self.clone()
        }
    }

    /// Canonical `file#fragment` string used as an identity key.
    pub fn key(&self) -> String {
        match &self.file {
            Some(file) => format!("{file}#{}", self.fragment),
            None => format!("#{}", self.fragment),
        }
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Parse a pointer expected to address `kind`, failing when it does not.
pub fn expect_kind(raw: &str, kind: PointerKind) -> Result<Pointer, ResolveError> {
    let pointer = Pointer::parse(raw)?;
    if pointer.kind == kind {
        Ok(pointer)
    } else {
        Err(ResolveError::UnsupportedCollection {
            pointer: raw.to_string(),
            collection: pointer.collection,
        })
    }
}

fn unescape(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

fn file_stem(file: &str) -> &str {
    let base = file.rsplit('/').next().unwrap_or(file);
    base.split('.').next().unwrap_or(base)
}

/// Resolve `target` against the directory of `base`, both `/`-separated.
pub fn join_relative(base: &str, target: &str) -> String {
    if target.starts_with('/') {
        return normalize_path(target);
    }
    match base.rsplit_once('/') {
        Some((dir, _)) => normalize_path(&format!("{dir}/{target}")),
        None => normalize_path(target),
    }
}

fn normalize_path(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if matches!(parts.last(), Some(last) if *last != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }
    let joined = parts.join("/");
    if absolute { format!("/{joined}") } else { joined }
}
