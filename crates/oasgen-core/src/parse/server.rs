use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A server variable for URL templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerVariable {
    pub default: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
}

/// A server URL definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub variables: IndexMap<String, ServerVariable>,
}

impl Server {
    /// The path component of the server URL, with `{variables}` replaced by
    /// their defaults. `https://api.example.com/v1/` → `/v1`.
    pub fn base_path(&self) -> Option<String> {
        let mut url = self.url.clone();
        for (name, var) in &self.variables {
            url = url.replace(&format!("{{{name}}}"), &var.default);
        }
        let path = match url.split_once("://") {
            Some((_, rest)) => rest.find('/').map(|i| &rest[i..]).unwrap_or(""),
            None => url.as_str(),
        };
        let trimmed = path.trim_end_matches('/');
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(url: &str) -> Server {
        Server {
            url: url.to_string(),
            description: None,
            variables: IndexMap::new(),
        }
    }

    #[test]
    fn test_base_path_absolute_url() {
        assert_eq!(
            server("https://api.example.com/api/v1/").base_path().as_deref(),
            Some("/api/v1")
        );
        assert_eq!(server("https://api.example.com").base_path(), None);
    }

    #[test]
    fn test_base_path_relative_url() {
        assert_eq!(server("/api/v1").base_path().as_deref(), Some("/api/v1"));
        assert_eq!(server("/").base_path(), None);
    }

    #[test]
    fn test_base_path_variables() {
        let mut s = server("https://{host}/{version}");
        s.variables.insert(
            "version".to_string(),
            ServerVariable {
                default: "v2".to_string(),
                description: None,
                enum_values: vec![],
            },
        );
        assert_eq!(s.base_path().as_deref(), Some("/v2"));
    }
}
