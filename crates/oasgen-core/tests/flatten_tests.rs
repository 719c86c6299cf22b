use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use oasgen_core::error::{ResolveError, TransformError};
use oasgen_core::ir::{DataType, Definition, DefinitionOrRef, IrSpec, ResponseType};
use oasgen_core::parse;
use oasgen_core::parse::bundle::{Bundler, FsBundler};
use oasgen_core::transform;
use serde_json::json;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn bundled(name: &str) -> IrSpec {
    let bundle = FsBundler.bundle(&fixture(name)).expect("fixture should bundle");
    transform::transform_bundle(&bundle).expect("fixture should transform")
}

fn inline<'a>(node: &'a DefinitionOrRef) -> &'a Definition {
    match node {
        DefinitionOrRef::Inline(def) => def,
        DefinitionOrRef::Ref(name) => panic!("expected an inline definition, got Ref({name})"),
    }
}

#[test]
fn flatten_person_address_zip() {
    let ir = bundled("people/api.yaml");

    let names: Vec<&str> = ir.definitions.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["Person"]);

    let person = &ir.definitions["Person"];
    assert_eq!(person.data_type, Some(DataType::Object));
    assert_eq!(person.required, vec!["name"]);

    let address = inline(&person.properties["address"]);
    assert_eq!(address.data_type, Some(DataType::Object));

    let zip = inline(&address.properties["zip"]);
    assert_eq!(zip.data_type, Some(DataType::String));
    assert_eq!(zip.constraints.pattern.as_deref(), Some("^[0-9]{5}$"));
    assert_eq!(zip.constraints.min_length, Some(5));

    let get = &ir.operations[0];
    assert_eq!(get.responses[0].response_type, ResponseType::Named("Person".into()));
    assert!(ir.diagnostics.is_empty(), "{:?}", ir.diagnostics);
}

#[test]
fn flatten_book_author_person() {
    let ir = bundled("books/api.yaml");

    let names: Vec<&str> = ir.definitions.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["Book", "Person", "Books", "Chain", "Link"]);

    // Author is not published, so it is inlined; Person is, so it stays a pointer.
    let book = &ir.definitions["Book"];
    let author = inline(&book.properties["author"]);
    assert!(author.properties.contains_key("pseudonym"));
    assert_eq!(author.properties["person"], DefinitionOrRef::Ref("Person".into()));

    let person = &ir.definitions["Person"];
    assert_eq!(person.properties.keys().collect::<Vec<_>>(), vec!["name"]);

    let books = &ir.definitions["Books"];
    assert_eq!(books.items.as_deref(), Some(&DefinitionOrRef::Ref("Book".into())));

    let list = &ir.operations[0];
    assert_eq!(list.responses[0].response_type, ResponseType::Named("Books".into()));
    assert!(ir.diagnostics.is_empty(), "{:?}", ir.diagnostics);
}

#[test]
fn flatten_promotes_external_cycles() {
    let ir = bundled("books/api.yaml");

    let chain = &ir.definitions["Chain"];
    let head = inline(&chain.properties["head"]);
    assert_eq!(head.properties["next"], DefinitionOrRef::Ref("Link".into()));

    let link = &ir.definitions["Link"];
    assert_eq!(link.properties["next"], DefinitionOrRef::Ref("Link".into()));
    assert_eq!(
        inline(&link.properties["value"]).data_type,
        Some(DataType::Integer)
    );
}

#[test]
fn flatten_promoted_name_avoids_collisions() {
    let root = parse::from_yaml(
        r#"
swagger: "2.0"
info: {title: Clash, version: "1"}
paths: {}
definitions:
  Node:
    type: string
  Tree:
    type: object
    properties:
      root:
        $ref: "graph.yaml#/Node"
"#,
    )
    .unwrap();
    let fragments = IndexMap::from([(
        "graph.yaml".to_string(),
        json!({
            "Node": {
                "type": "object",
                "properties": {"child": {"$ref": "#/Node"}}
            }
        }),
    )]);
    let ir = transform::transform_with_fragments(&root, &fragments).unwrap();

    assert_eq!(ir.definitions["Node"].data_type, Some(DataType::String));
    let promoted = &ir.definitions["GraphNode"];
    assert_eq!(promoted.properties["child"], DefinitionOrRef::Ref("GraphNode".into()));
}

#[test]
fn flatten_missing_fragment_is_fatal() {
    let root = parse::from_yaml(
        r#"
swagger: "2.0"
info: {title: Missing, version: "1"}
paths: {}
definitions:
  Ghost:
    $ref: "nowhere.yaml#/Ghost"
"#,
    )
    .unwrap();
    let err = transform::transform(&root).unwrap_err();
    assert!(matches!(
        err,
        TransformError::Resolve(ResolveError::MissingFragment(ref file)) if file == "nowhere.yaml"
    ));
}

#[test]
fn flatten_bundler_collects_nested_files() {
    let bundle = FsBundler.bundle(&fixture("books/api.yaml")).unwrap();
    let files: Vec<&str> = bundle.fragments.keys().map(String::as_str).collect();
    assert_eq!(files, vec!["shelf/library.yaml"]);
}
