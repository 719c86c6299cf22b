use indexmap::IndexMap;

use crate::ir::{ParameterInfo, ParameterKind, ParameterLocation, TokenKind, TypeRef};
use crate::parse::security::{
    ApiKeyLocation, SecurityRequirement, SecurityScheme, SecuritySchemeType,
};

use super::scope::Scope;

pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Map a security requirement list to header parameters, in requirement order.
///
/// Only the first scheme named by each requirement object is used; the
/// others are reported. Schemes that are unknown or not carried in a header
/// are skipped with a warning.
pub fn auth_header_parameters(
    schemes: &IndexMap<String, SecurityScheme>,
    requirements: &[SecurityRequirement],
    scope: &mut Scope,
) -> Vec<ParameterInfo> {
    let mut params: Vec<ParameterInfo> = Vec::new();

    for requirement in requirements {
        let mut keys = requirement.keys();
        // `{}` marks authentication as optional.
        let Some(key) = keys.next() else {
            continue;
        };
        let ignored: Vec<&str> = keys.map(String::as_str).collect();
        if !ignored.is_empty() {
            scope.warn(format!(
                "security requirement combines {key} with {}; only {key} is used",
                ignored.join(", ")
            ));
        }

        if params.iter().any(|p| p.name == *key) {
            continue;
        }
        let Some(scheme) = schemes.get(key) else {
            scope.warn(format!("security requirement names unknown scheme {key}"));
            continue;
        };
        match header_transport(scheme) {
            Ok((header_name, token_kind, auth_scheme)) => params.push(ParameterInfo {
                name: key.clone(),
                required: true,
                type_ref: TypeRef::string(),
                location: ParameterLocation::Header,
                kind: ParameterKind::AuthHeader {
                    header_name,
                    token_kind,
                    auth_scheme: auth_scheme.map(str::to_string),
                },
            }),
            Err(reason) => scope.warn(format!("security scheme {key} skipped: {reason}")),
        }
    }

    params
}

type Transport = (String, TokenKind, Option<&'static str>);

fn header_transport(scheme: &SecurityScheme) -> Result<Transport, String> {
    let bearer = || -> Result<Transport, String> {
        Ok((
            AUTHORIZATION_HEADER.to_string(),
            TokenKind::OAuth2,
            Some("Bearer"),
        ))
    };
    let basic = || -> Result<Transport, String> {
        Ok((
            AUTHORIZATION_HEADER.to_string(),
            TokenKind::Basic,
            Some("Basic"),
        ))
    };

    match scheme.scheme_type {
        SecuritySchemeType::ApiKey => {
            if scheme.location != Some(ApiKeyLocation::Header) {
                return Err(format!(
                    "apiKey is sent in {:?}, not a header",
                    scheme.location
                ));
            }
            let is_bearer = scheme
                .x_auth_scheme
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case("bearer"));
            // The declared name is ignored for bearer tokens.
            if is_bearer {
                return Ok((
                    AUTHORIZATION_HEADER.to_string(),
                    TokenKind::ApiKey,
                    Some("Bearer"),
                ));
            }
            match scheme.name {
                Some(ref name) => Ok((name.clone(), TokenKind::ApiKey, None)),
                None => Err("apiKey scheme has no name".into()),
            }
        }
        SecuritySchemeType::Basic => basic(),
        SecuritySchemeType::Http => match scheme.scheme.as_deref().map(str::to_ascii_lowercase) {
            Some(ref s) if s == "bearer" => bearer(),
            Some(ref s) if s == "basic" => basic(),
            other => Err(format!("unsupported http scheme {other:?}")),
        },
        SecuritySchemeType::OAuth2 | SecuritySchemeType::OpenIdConnect => bearer(),
        SecuritySchemeType::MutualTls => Err("mutualTLS is not carried in a header".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schemes(yaml: &str) -> IndexMap<String, SecurityScheme> {
        serde_yaml_ng::from_str(yaml).unwrap()
    }

    fn requirement(keys: &[&str]) -> SecurityRequirement {
        keys.iter().map(|k| (k.to_string(), vec![])).collect()
    }

    fn header(p: &ParameterInfo) -> (&str, TokenKind, Option<&str>) {
        match &p.kind {
            ParameterKind::AuthHeader {
                header_name,
                token_kind,
                auth_scheme,
            } => (header_name.as_str(), *token_kind, auth_scheme.as_deref()),
            other => panic!("not an auth header: {other:?}"),
        }
    }

    #[test]
    fn test_api_key_header() {
        let registry = schemes("ApiKey: {type: apiKey, in: header, name: X-Key}\n");
        let mut scope = Scope::new("test");
        let params = auth_header_parameters(&registry, &[requirement(&["ApiKey"])], &mut scope);
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].name, "ApiKey");
        assert!(params[0].required);
        assert_eq!(header(&params[0]), ("X-Key", TokenKind::ApiKey, None));
    }

    #[test]
    fn test_bearer_forces_authorization_header() {
        let registry = schemes(
            r#"
Bearer: {type: http, scheme: bearer, name: X-Ignored}
OAuth: {type: oauth2, flows: {}}
Basic: {type: basic}
"#,
        );
        let mut scope = Scope::new("test");
        let params = auth_header_parameters(
            &registry,
            &[
                requirement(&["Bearer"]),
                requirement(&["OAuth"]),
                requirement(&["Basic"]),
            ],
            &mut scope,
        );
        assert_eq!(
            header(&params[0]),
            ("Authorization", TokenKind::OAuth2, Some("Bearer"))
        );
        assert_eq!(
            header(&params[1]),
            ("Authorization", TokenKind::OAuth2, Some("Bearer"))
        );
        assert_eq!(
            header(&params[2]),
            ("Authorization", TokenKind::Basic, Some("Basic"))
        );
        assert!(scope.diagnostics().is_empty());
    }

    #[test]
    fn test_api_key_with_bearer_extension_uses_authorization() {
        let registry = schemes(
            r#"
Bearer: {type: apiKey, in: header, name: X-Token, x-auth-scheme: bearer}
Plain: {type: apiKey, in: header, name: X-Token, x-auth-scheme: custom}
"#,
        );
        let mut scope = Scope::new("test");
        let params = auth_header_parameters(
            &registry,
            &[requirement(&["Bearer"]), requirement(&["Plain"])],
            &mut scope,
        );
        assert_eq!(params[0].name, "Bearer");
        assert_eq!(
            header(&params[0]),
            ("Authorization", TokenKind::ApiKey, Some("Bearer"))
        );
        assert_eq!(header(&params[1]), ("X-Token", TokenKind::ApiKey, None));
        assert!(scope.diagnostics().is_empty());
    }

    #[test]
    fn test_first_key_only_and_skips() {
        let registry = schemes(
            r#"
A: {type: apiKey, in: header, name: X-A}
B: {type: apiKey, in: header, name: X-B}
Q: {type: apiKey, in: query, name: key}
"#,
        );
        let mut scope = Scope::new("test");
        let params = auth_header_parameters(
            &registry,
            &[
                requirement(&["A", "B"]),
                requirement(&["Q"]),
                requirement(&["Missing"]),
                requirement(&[]),
                requirement(&["A"]),
            ],
            &mut scope,
        );
        let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["A"]);
        assert_eq!(scope.diagnostics().len(), 3);
    }
}
