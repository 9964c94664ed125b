//! Entry point integration tests
//!
//! Every recognized input shape becomes a collection; everything else is
//! rejected before a collection exists.

use serde_json::json;

use treeshift::{wrap, Collection, Core, CoreError, ElementKind, Input, Node, NodePath};

fn identifier(name: &str) -> Node {
    Node::leaf("identifier", name)
}

// =============================================================================
// Recognized shapes
// =============================================================================

#[test]
fn test_every_recognized_shape_yields_a_collection() {
    let program = wrap("var foo;\n").unwrap().paths()[0].clone();
    let child = program.get(0).unwrap();

    let inputs: Vec<Input> = vec![
        Input::from("var foo;\n"),
        Input::from(identifier("a")),
        Input::from(vec![identifier("a"), identifier("b")]),
        Input::from(child.clone()),
        Input::from(vec![program.clone(), child]),
        Input::from(Vec::<Node>::new()),
        Input::from(Vec::<NodePath>::new()),
    ];

    for input in inputs {
        let kind = input.kind();
        let collection: Collection = wrap(input).unwrap_or_else(|e| panic!("{kind}: {e}"));
        assert!(collection.len() <= 2, "{kind}");
    }
}

#[test]
fn test_number_and_plain_object_are_rejected() {
    assert!(matches!(wrap(42), Err(CoreError::InvalidInput { .. })));
    assert!(matches!(wrap(json!({})), Err(CoreError::InvalidInput { .. })));
    assert!(matches!(wrap(json!(42)), Err(CoreError::InvalidInput { .. })));
}

#[test]
fn test_invalid_input_names_the_given_kind() {
    let err = wrap(json!({"type": "Identifier"})).unwrap_err();
    assert!(err.to_string().contains("object"));

    let err = wrap(true).unwrap_err();
    assert!(err.to_string().contains("boolean"));
}

// =============================================================================
// Shape semantics
// =============================================================================

#[test]
fn test_unmodified_text_round_trips() {
    let source = "\nvar foo;\n";
    assert_eq!(wrap(source).unwrap().to_source().unwrap(), source);
}

#[test]
fn test_node_sequence_keeps_order_as_distinct_roots() {
    let n1 = identifier("first");
    let n2 = identifier("second");

    let collection = wrap(vec![n1.clone(), n2.clone()]).unwrap();
    assert_eq!(collection.len(), 2);
    assert!(Node::ptr_eq(&collection.paths()[0].node(), &n1));
    assert!(Node::ptr_eq(&collection.paths()[1].node(), &n2));
    assert!(collection.iter().all(NodePath::is_root));
    assert!(!NodePath::ptr_eq(&collection.paths()[0], &collection.paths()[1]));
}

#[test]
fn test_duplicate_nodes_are_not_collapsed() {
    let n = identifier("same");
    let collection = wrap(vec![n.clone(), n.clone()]).unwrap();
    assert_eq!(collection.len(), 2);
    assert!(collection.paths()[0].same_element(&collection.paths()[1]));
}

#[test]
fn test_empty_sequence_gives_empty_collection() {
    let collection = wrap(Vec::<Node>::new()).unwrap();
    assert_eq!(collection.len(), 0);
    assert!(collection.is_empty());
    assert_eq!(collection.kind(), &ElementKind::Generic);
    assert_eq!(collection.to_source().unwrap(), "");
}

#[test]
fn test_bare_node_gets_parentless_root_path() {
    let collection = wrap(identifier("alone")).unwrap();
    let path = &collection.paths()[0];
    assert!(path.parent().is_none());
    assert!(path.name().is_none());
    assert_eq!(path.depth(), 0);
}

#[test]
fn test_path_input_is_kept_by_identity() {
    let program = wrap("f(x);\n").unwrap();
    let nested = program.descendants().paths()[3].clone();

    let collection = wrap(nested.clone()).unwrap();
    assert!(NodePath::ptr_eq(&collection.paths()[0], &nested));
    assert!(collection.paths()[0].parent().is_some());
}

#[test]
fn test_json_node_input() {
    let collection = wrap(json!({"kind": "identifier", "text": "fromJson"})).unwrap();
    assert!(collection.is_of_kind("identifier"));
    assert_eq!(
        collection.nodes()[0].text().as_deref(),
        Some("fromJson")
    );
}

#[test]
fn test_element_kind_tag() {
    let same = wrap(vec![identifier("a"), identifier("b")]).unwrap();
    assert_eq!(same.kind(), &ElementKind::Kind("identifier".to_string()));

    let mixed = wrap(vec![identifier("a"), Node::leaf("number", "1")]).unwrap();
    assert!(mixed.kind().is_generic());
}

// =============================================================================
// Separate cores
// =============================================================================

#[test]
fn test_collections_remember_their_core() {
    let core = Core::javascript();
    let collection = core.wrap("x;").unwrap();
    assert!(Core::ptr_eq(collection.core(), &core));
    assert!(!Core::ptr_eq(collection.core(), treeshift::global_core()));
}
