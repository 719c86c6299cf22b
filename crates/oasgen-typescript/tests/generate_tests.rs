use oasgen_core::config::GenerationOptions;
use oasgen_core::error::GeneratorError;
use oasgen_core::ir::IrSpec;
use oasgen_core::{CodeGenerator, GeneratedFile, parse, transform};
use oasgen_typescript::TypeScriptGenerator;

const PETSTORE_V2: &str = include_str!("../../oasgen-core/tests/fixtures/petstore-v2.yaml");
const PETSTORE_V3: &str = include_str!("../../oasgen-core/tests/fixtures/petstore-v3.yaml");
const DECODERS: &str = include_str!("../../oasgen-core/tests/fixtures/decoders.yaml");

fn ir(source: &str) -> IrSpec {
    let spec = parse::from_yaml(source).unwrap();
    transform::transform(&spec).unwrap()
}

fn generate(source: &str, options: GenerationOptions) -> Vec<GeneratedFile> {
    TypeScriptGenerator.generate(&ir(source), &options).unwrap()
}

fn file<'a>(files: &'a [GeneratedFile], path: &str) -> &'a str {
    files
        .iter()
        .find(|f| f.path == path)
        .map(|f| f.content.as_str())
        .unwrap_or_else(|| panic!("{path} not generated"))
}

fn paths(files: &[GeneratedFile]) -> Vec<&str> {
    files.iter().map(|f| f.path.as_str()).collect()
}

#[test]
fn test_models_only_by_default() {
    let files = generate(PETSTORE_V2, GenerationOptions::default());
    assert_eq!(paths(&files), vec!["definitions/Pet.ts"]);

    let pet = file(&files, "definitions/Pet.ts");
    assert!(pet.contains("const PetR = t.interface({\n  id: t.Integer,\n  name: t.string,\n});"));
    assert!(pet.contains("const PetO = t.partial({\n  tag: t.string,\n});"));
}

#[test]
fn test_client_implies_request_types() {
    let options = GenerationOptions {
        client: true,
        ..GenerationOptions::default()
    };
    let files = generate(PETSTORE_V2, options);
    assert_eq!(
        paths(&files),
        vec!["definitions/Pet.ts", "requestTypes.ts", "client.ts"]
    );
    assert!(file(&files, "requestTypes.ts").contains("export const getPetDefaultDecoder"));
}

#[test]
fn test_dialects_generate_the_same_code() {
    let options = GenerationOptions {
        client: true,
        ..GenerationOptions::default()
    };
    let v2 = generate(PETSTORE_V2, options.clone());
    let v3 = generate(PETSTORE_V3, options);
    assert_eq!(v2, v3);
}

#[test]
fn test_generation_is_deterministic() {
    let options = GenerationOptions {
        response_decoders: true,
        strict_interfaces: true,
        ..GenerationOptions::default()
    };
    let first = generate(DECODERS, options.clone());
    for _ in 0..4 {
        assert_eq!(generate(DECODERS, options.clone()), first);
    }
}

#[test]
fn test_strict_and_camel_case() {
    let options = GenerationOptions {
        strict_interfaces: true,
        camel_case: true,
        ..GenerationOptions::default()
    };
    let files = generate(DECODERS, options);
    let one_of = file(&files, "definitions/OneOfTest.ts");
    assert!(one_of.contains(
        "export const OneOfTest = t.union([t.exact(t.interface({ limited: t.boolean })), t.exact(t.interface({ unlimited: t.refinement(t.Integer, (n) => n >= 0) }))]);"
    ));
    let message = file(&files, "definitions/Message.ts");
    assert!(message.contains("t.exact(t.intersection([MessageR, MessageO]), \"Message\")"));
}

#[test]
fn test_unknown_default_type_is_rejected() {
    let options = GenerationOptions {
        request_types: true,
        default_error_type: "ProblemJson".to_string(),
        ..GenerationOptions::default()
    };
    let err = TypeScriptGenerator
        .generate(&ir(DECODERS), &options)
        .unwrap_err();
    assert!(matches!(err, GeneratorError::Options(ref m) if m.contains("ProblemJson")));
}

#[test]
fn test_configured_error_type_is_decoded() {
    let options = GenerationOptions {
        response_decoders: true,
        default_error_type: "Message".to_string(),
        ..GenerationOptions::default()
    };
    let files = generate(DECODERS, options);
    let requests = file(&files, "requestTypes.ts");
    assert!(requests.contains("  404: Message,\n"));
    assert!(requests.contains("  202: t.undefined,\n"));
}
