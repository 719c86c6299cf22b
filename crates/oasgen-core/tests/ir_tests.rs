use insta::assert_snapshot;
use oasgen_core::error::{ResolveError, TransformError};
use oasgen_core::ir::{
    DataType, Definition, HttpMethod, IrSpec, OperationInfo, ParameterKind, ParameterLocation,
    ResponseType, TokenKind, TypeRef,
};
use oasgen_core::parse;
use oasgen_core::transform;

const PETSTORE_V2: &str = include_str!("fixtures/petstore-v2.yaml");
const PETSTORE_V3: &str = include_str!("fixtures/petstore-v3.yaml");

fn ir(yaml: &str) -> IrSpec {
    let spec = parse::from_yaml(yaml).unwrap();
    transform::transform(&spec).unwrap()
}

fn op<'a>(ir: &'a IrSpec, id: &str) -> &'a OperationInfo {
    ir.operations
        .iter()
        .find(|op| op.operation_id == id)
        .unwrap_or_else(|| panic!("should have {id}"))
}

#[test]
fn transform_swagger_petstore() {
    let ir = ir(PETSTORE_V2);
    assert_eq!(ir.meta.title, "Petstore");
    assert_eq!(ir.meta.version, "1.0.0");
    assert_eq!(ir.meta.base_path.as_deref(), Some("/api/v1"));

    let ids: Vec<&str> = ir.operations.iter().map(|o| o.operation_id.as_str()).collect();
    assert_eq!(ids, vec!["getPet", "updatePet", "listPets"]);

    let pet = ir.definitions.get("Pet").expect("should have Pet");
    assert_eq!(pet.data_type, Some(DataType::Object));
    assert_eq!(pet.required, vec!["id", "name"]);
    let keys: Vec<&str> = pet.properties.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["id", "name", "tag"]);
}

#[test]
fn transform_dialect_equivalence() {
    let v2 = ir(PETSTORE_V2);
    let v3 = ir(PETSTORE_V3);

    assert_eq!(v2.meta, v3.meta);
    assert_eq!(v2.definitions, v3.definitions);
    assert_eq!(v2.operations.len(), v3.operations.len());
    for (a, b) in v2.operations.iter().zip(&v3.operations) {
        assert_eq!(a.operation_id, b.operation_id);
        assert_eq!(a.parameters, b.parameters, "{}", a.operation_id);
        assert_eq!(a.responses, b.responses, "{}", a.operation_id);
        assert_eq!(a.headers, b.headers, "{}", a.operation_id);
        assert_eq!(a.imported_types, b.imported_types, "{}", a.operation_id);
        assert_eq!(a.consumes, b.consumes, "{}", a.operation_id);
        assert_eq!(a.produces, b.produces, "{}", a.operation_id);
    }
}

#[test]
fn transform_inline_parameter_constraints_match_across_dialects() {
    let v2 = ir(r#"
swagger: "2.0"
info: {title: Paging, version: "1"}
paths:
  /items:
    get:
      operationId: listItems
      parameters:
        - name: limit
          in: query
          type: integer
          minimum: 1
          maximum: 50
        - name: cursor
          in: query
          type: string
          pattern: "^[a-z0-9]+$"
          maxLength: 64
      responses:
        "200": {description: ok}
"#);
    let v3 = ir(r#"
openapi: 3.0.3
info: {title: Paging, version: "1"}
paths:
  /items:
    get:
      operationId: listItems
      parameters:
        - name: limit
          in: query
          schema: {type: integer, minimum: 1, maximum: 50}
        - name: cursor
          in: query
          schema: {type: string, pattern: "^[a-z0-9]+$", maxLength: 64}
      responses:
        "200": {description: ok}
"#);

    let v2_params = &op(&v2, "listItems").parameters;
    assert_eq!(v2_params, &op(&v3, "listItems").parameters);

    let TypeRef::Inline(ref limit) = v2_params[0].type_ref else {
        panic!("limit should be typed inline");
    };
    assert_eq!(limit.constraints.minimum, Some(1.0));
    assert_eq!(limit.constraints.maximum, Some(50.0));
    let TypeRef::Inline(ref cursor) = v2_params[1].type_ref else {
        panic!("cursor should be typed inline");
    };
    assert_eq!(cursor.constraints.pattern.as_deref(), Some("^[a-z0-9]+$"));
    assert_eq!(cursor.constraints.max_length, Some(64));
}

#[test]
fn transform_parameter_order() {
    let ir = ir(PETSTORE_V3);

    let get = op(&ir, "getPet");
    let names: Vec<&str> = get.parameters.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["petId", "ApiKey", "X-Request-Id"]);
    assert_eq!(get.parameters[0].location, ParameterLocation::Path);
    assert!(get.parameters[0].required);
    assert_eq!(get.parameters[0].marked_name(), "petId");
    assert_eq!(get.parameters[2].marked_name(), "X-Request-Id?");
    assert_eq!(get.headers, vec!["X-Key", "X-Request-Id"]);
    assert_eq!(get.consumes, None);

    let put = op(&ir, "updatePet");
    let names: Vec<&str> = put.parameters.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["petId", "ApiKey", "Bearer", "body"]);
    let body = put.body_parameter().expect("should have a body");
    assert_eq!(body.type_ref, TypeRef::Named("Pet".into()));
    assert!(body.required);
    assert_eq!(put.headers, vec!["Content-Type", "Authorization", "X-Key"]);
    assert_eq!(put.consumes.as_deref(), Some("application/json"));
    assert_eq!(put.produces, "application/json");
}

#[test]
fn transform_security_mapping() {
    let ir = ir(PETSTORE_V3);
    let put = op(&ir, "updatePet");

    let auth: Vec<(&str, &str, TokenKind, Option<&str>)> = put
        .auth_parameters()
        .map(|p| match p.kind {
            ParameterKind::AuthHeader {
                ref header_name,
                token_kind,
                ref auth_scheme,
            } => (
                p.name.as_str(),
                header_name.as_str(),
                token_kind,
                auth_scheme.as_deref(),
            ),
            _ => unreachable!(),
        })
        .collect();
    assert_eq!(
        auth,
        vec![
            ("ApiKey", "X-Key", TokenKind::ApiKey, None),
            ("Bearer", "Authorization", TokenKind::OAuth2, Some("Bearer")),
        ]
    );
    assert!(put.auth_parameters().all(|p| p.required));
}

#[test]
fn transform_responses() {
    let ir = ir(PETSTORE_V2);

    let get = op(&ir, "getPet");
    let statuses: Vec<(&str, &ResponseType)> = get
        .responses
        .iter()
        .map(|r| (r.status.as_str(), &r.response_type))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("200", &ResponseType::Named("Pet".into())),
            ("404", &ResponseType::DefaultError),
        ]
    );
    assert_eq!(get.responses[0].headers, vec!["X-Rate-Limit"]);
    assert_eq!(get.imported_types.iter().collect::<Vec<_>>(), vec!["Pet"]);

    let list = op(&ir, "listPets");
    assert_eq!(list.responses[0].response_type, ResponseType::DefaultSuccess);
    assert!(list.imported_types.is_empty());
}

#[test]
fn transform_records_skipped_operations() {
    let ir = ir(PETSTORE_V2);
    let messages: Vec<String> = ir.diagnostics.iter().map(|d| d.to_string()).collect();
    assert_snapshot!(messages.join("\n"), @r"
    OPTIONS /pets: unsupported method options; operation skipped
    GET /pets/{petId}/photo: operation has no operationId; skipped
    ");
}

#[test]
fn transform_is_deterministic() {
    let first = ir(PETSTORE_V3);
    for _ in 0..8 {
        assert_eq!(ir(PETSTORE_V3), first);
    }
}

#[test]
fn transform_composition_is_exclusive() {
    let yaml = r##"
openapi: 3.0.0
info: {title: Compose, version: "1"}
paths: {}
components:
  schemas:
    Cat: {type: object}
    Dog: {type: object}
    Union:
      oneOf:
        - $ref: "#/components/schemas/Cat"
      allOf:
        - $ref: "#/components/schemas/Dog"
    Disjoint:
      x-one-of: true
      allOf:
        - $ref: "#/components/schemas/Cat"
        - $ref: "#/components/schemas/Dog"
    Either:
      anyOf:
        - type: string
        - type: integer
"##;
    let ir = ir(yaml);
    let names = |def: &Definition| -> Vec<String> {
        def.composition
            .as_ref()
            .map(|c| c.members().iter().filter_map(|m| m.as_ref_name()).map(String::from).collect())
            .unwrap_or_default()
    };

    let union = &ir.definitions["Union"];
    assert!(matches!(union.composition, Some(oasgen_core::ir::Composition::OneOf(_))));
    assert_eq!(names(union), vec!["Cat"]);

    let disjoint = &ir.definitions["Disjoint"];
    assert!(matches!(disjoint.composition, Some(oasgen_core::ir::Composition::OneOf(_))));
    assert_eq!(names(disjoint), vec!["Cat", "Dog"]);

    let either = &ir.definitions["Either"];
    assert!(matches!(either.composition, Some(oasgen_core::ir::Composition::OneOf(ref m)) if m.len() == 2));

    assert!(
        ir.diagnostics
            .iter()
            .any(|d| d.subject == "Union" && d.message.contains("allOf ignored"))
    );
}

#[test]
fn transform_parameter_pointer_tiers() {
    let dropped = r##"
openapi: 3.0.0
info: {title: Params, version: "1"}
paths:
  /things:
    get:
      operationId: listThings
      parameters:
        - $ref: "#/components/parameters/Missing"
        - $ref: "#/components/schemas/Thing"
      responses:
        "200": {description: ok}
components:
  schemas:
    Thing: {type: string}
"##;
    let ir = ir(dropped);
    assert!(op(&ir, "listThings").parameters.is_empty());
    assert_eq!(ir.diagnostics.len(), 2);

    let fatal = r##"
openapi: 3.0.0
info: {title: Params, version: "1"}
paths:
  /things:
    get:
      operationId: listThings
      parameters:
        - $ref: "#/components/headers/Thing"
      responses:
        "200": {description: ok}
"##;
    let spec = parse::from_yaml(fatal).unwrap();
    let err = transform::transform(&spec).unwrap_err();
    match err {
        TransformError::Operation {
            operation_id,
            source: ResolveError::UnsupportedCollection { collection, .. },
        } => {
            assert_eq!(operation_id, "listThings");
            assert_eq!(collection, "components/headers");
        }
        other => panic!("expected an operation error, got {other:?}"),
    }
}

#[test]
fn transform_v3_body_variants() {
    let yaml = r##"
openapi: 3.0.0
info: {title: Bodies, version: "1"}
paths:
  /upload:
    post:
      operationId: upload
      requestBody:
        content:
          multipart/form-data:
            schema:
              type: object
      responses:
        "201":
          description: stored
          content:
            application/octet-stream:
              schema:
                type: string
                format: binary
  /notes:
    patch:
      operationId: patchNote
      requestBody:
        $ref: "#/components/requestBodies/Note"
      responses:
        "204": {description: done}
components:
  requestBodies:
    Note:
      required: true
      content:
        application/merge-patch+json:
          schema:
            type: object
            properties:
              text: {type: string}
"##;
    let ir = ir(yaml);

    let upload = op(&ir, "upload");
    assert_eq!(upload.method, HttpMethod::Post);
    let body = upload.body_parameter().unwrap();
    assert_eq!(body.type_ref, TypeRef::File);
    assert!(!body.required);
    assert_eq!(upload.consumes.as_deref(), Some("multipart/form-data"));
    assert_eq!(upload.produces, "application/octet-stream");
    assert_eq!(upload.responses[0].response_type, ResponseType::Binary);

    let patch = op(&ir, "patchNote");
    let body = patch.body_parameter().unwrap();
    assert!(body.required);
    assert!(matches!(body.type_ref, TypeRef::Inline(ref d) if d.properties.contains_key("text")));
    assert_eq!(patch.consumes.as_deref(), Some("application/merge-patch+json"));
}

#[test]
fn transform_reports_dangling_references() {
    let yaml = r##"
swagger: "2.0"
info: {title: Dangling, version: "1"}
paths: {}
definitions:
  Owner:
    type: object
    properties:
      pet:
        $ref: "#/definitions/Pet"
"##;
    let ir = ir(yaml);
    assert_eq!(ir.diagnostics.len(), 1);
    assert_eq!(
        ir.diagnostics[0].to_string(),
        "Owner: references unknown definition Pet"
    );
}
