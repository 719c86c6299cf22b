use std::fs;
use std::path::Path;

use serde::Deserialize;

/// Sentinel type name meaning "no payload". Responses that fall back to a
/// default type spelled this way decode with a constant decoder.
pub const ABSENT_TYPE: &str = "undefined";

/// Top-level project configuration loaded from `.oasgen.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OasgenConfig {
    pub input: String,
    pub output: String,
    #[serde(flatten)]
    pub generation: GenerationOptions,
}

impl Default for OasgenConfig {
    fn default() -> Self {
        Self {
            input: "openapi.yaml".to_string(),
            output: "src/generated".to_string(),
            generation: GenerationOptions::default(),
        }
    }
}

/// Options the core and the renderers consume from their caller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    /// Generated object codecs reject properties they do not declare.
    pub strict_interfaces: bool,
    /// Rename generated property keys to camelCase.
    pub camel_case: bool,
    /// Type used for `2xx` responses that declare no schema reference.
    pub default_success_type: String,
    /// Type used for non-`2xx` responses that declare no schema reference.
    pub default_error_type: String,
    /// Emit `requestTypes.ts`.
    pub request_types: bool,
    /// Emit response decoders. Implies `request_types`.
    pub response_decoders: bool,
    /// Emit `client.ts`. Implies `response_decoders`.
    pub client: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            strict_interfaces: false,
            camel_case: false,
            default_success_type: ABSENT_TYPE.to_string(),
            default_error_type: ABSENT_TYPE.to_string(),
            request_types: false,
            response_decoders: false,
            client: false,
        }
    }
}

impl GenerationOptions {
    /// Apply the implication chain `client → response_decoders → request_types`.
    pub fn normalized(mut self) -> Self {
        if self.client {
            self.response_decoders = true;
        }
        if self.response_decoders {
            self.request_types = true;
        }
        self
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".oasgen.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<OasgenConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
    let config: OasgenConfig = serde_yaml_ng::from_str(&content)
        .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# oasgen configuration
input: openapi.yaml
output: src/generated

strict_interfaces: false     # object codecs reject undeclared properties
camel_case: false            # rename property keys to camelCase

# Types for responses without a schema reference. "undefined" means no payload.
default_success_type: undefined
default_error_type: undefined

request_types: false         # emit requestTypes.ts
response_decoders: false     # emit response decoders (implies request_types)
client: false                # emit client.ts (implies response_decoders)
"#
}
