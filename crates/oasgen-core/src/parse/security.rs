use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A security scheme type. `basic` is Swagger 2.0; `http`, `openIdConnect`
/// and `mutualTLS` are OpenAPI 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SecuritySchemeType {
    Basic,
    ApiKey,
    Http,
    #[serde(rename = "oauth2")]
    OAuth2,
    OpenIdConnect,
    #[serde(rename = "mutualTLS")]
    MutualTls,
}

/// Location of an API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    Query,
    Header,
    Cookie,
}

/// A security scheme definition, in the shape shared by both dialects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityScheme {
    #[serde(rename = "type")]
    pub scheme_type: SecuritySchemeType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<ApiKeyLocation>,

    /// HTTP auth scheme (`basic`, `bearer`, ...), OpenAPI 3 only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,

    #[serde(rename = "bearerFormat", skip_serializing_if = "Option::is_none")]
    pub bearer_format: Option<String>,

    /// Swagger 2.0 OAuth2 flow name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,

    /// OpenAPI 3 OAuth2 flows, kept opaque.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flows: Option<serde_json::Value>,

    #[serde(rename = "openIdConnectUrl", skip_serializing_if = "Option::is_none")]
    pub open_id_connect_url: Option<String>,

    /// Token prefix for an `apiKey` header. Swagger 2.0 has no `http`
    /// type, so bearer tokens are declared as `apiKey` with `bearer` here.
    #[serde(rename = "x-auth-scheme", skip_serializing_if = "Option::is_none")]
    pub x_auth_scheme: Option<String>,
}

/// A security requirement: map of scheme name → required scopes.
pub type SecurityRequirement = IndexMap<String, Vec<String>>;
