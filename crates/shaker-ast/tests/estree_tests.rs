//! Building arena trees from acorn ESTree output.

use serde_json::Value;
use shaker_ast::{
    AstError, FunctionData, LiteralValue, NodeArena, NodeIndex, NodeKind, build_program,
};

fn fixture(name: &str) -> (String, Value) {
    let all: Value = serde_json::from_str(include_str!("../../../tests/fixtures/fixtures.json"))
        .expect("fixtures.json is valid JSON");
    let entry = all.get(name).unwrap_or_else(|| panic!("missing fixture {name}"));
    (
        entry["code"].as_str().expect("code").to_string(),
        entry["ast"].clone(),
    )
}

fn build(name: &str) -> (String, NodeArena, NodeIndex) {
    let (code, ast) = fixture(name);
    let mut arena = NodeArena::new();
    let root = build_program(&mut arena, &ast, &code, 0).expect("fixture builds");
    (code, arena, root)
}

fn find<'a>(arena: &'a NodeArena, pred: impl Fn(&NodeKind) -> bool) -> Vec<(NodeIndex, &'a NodeKind)> {
    arena
        .iter()
        .filter(|(_, node)| pred(&node.kind))
        .map(|(idx, node)| (idx, &node.kind))
        .collect()
}

#[test]
fn builds_every_statement_of_kitchen_sink() {
    let (_, arena, root) = build("ast/kitchen_sink.js");
    let Some(NodeKind::Program { body }) = arena.kind(root) else {
        panic!("root is not a program");
    };
    let types: Vec<&str> = body
        .iter()
        .map(|&s| arena.kind(s).map_or("?", NodeKind::type_name))
        .collect();
    assert_eq!(
        types,
        vec![
            "ImportDeclaration",
            "ImportDeclaration",
            "ExportNamedDeclaration",
            "ExportDefaultDeclaration",
            "ClassDeclaration",
            "ExportNamedDeclaration",
            "ExportAllDeclaration",
            "ExpressionStatement",
            "VariableDeclaration",
        ]
    );
}

#[test]
fn parents_point_back_to_owner() {
    let (_, arena, root) = build("ast/kitchen_sink.js");
    for (idx, node) in arena.iter() {
        if idx == root {
            assert!(node.parent.is_none());
            continue;
        }
        assert!(
            arena.children(node.parent).contains(&idx),
            "{} is not a child of its parent",
            node.kind.type_name()
        );
        assert_eq!(arena.root_of(idx), root);
    }
}

#[test]
fn spans_slice_source_text() {
    let (code, arena, _) = build("ast/kitchen_sink.js");
    let templates = find(&arena, |k| matches!(k, NodeKind::TemplateLiteral { .. }));
    assert_eq!(templates.len(), 1);
    assert_eq!(arena.span(templates[0].0).slice(&code), "`x${a}y${b}z`");

    let (idx, _) = find(&arena, |k| matches!(k, NodeKind::ClassDeclaration(_)))[0];
    assert!(arena.span(idx).slice(&code).starts_with("class Point extends Object"));
}

#[test]
fn template_children_interleave_quasis_and_expressions() {
    let (code, arena, _) = build("ast/kitchen_sink.js");
    let (idx, _) = find(&arena, |k| matches!(k, NodeKind::TemplateLiteral { .. }))[0];
    let parts: Vec<&str> = arena
        .children(idx)
        .iter()
        .map(|&c| arena.span(c).slice(&code))
        .collect();
    assert_eq!(parts, vec!["x", "a", "y", "b", "z"]);
}

#[test]
fn function_data_records_params_and_flags() {
    let (_, arena, _) = build("ast/kitchen_sink.js");
    let functions: Vec<&FunctionData> = arena
        .iter()
        .filter_map(|(_, node)| node.kind.function_data())
        .collect();
    let main = functions
        .iter()
        .find(|f| arena.identifier_name(f.id).is_some_and(|n| &**n == "main"))
        .expect("main function");
    assert_eq!(main.params.len(), 3);
    assert!(!main.is_async && !main.is_arrow);

    let arrow = functions.iter().find(|f| f.is_arrow).expect("arrow");
    assert!(arrow.is_async);
    assert!(!arrow.expression_body);
}

#[test]
fn binding_identifiers_of_nested_patterns() {
    let (_, arena, _) = build("ast/kitchen_sink.js");
    let main = arena
        .iter()
        .find_map(|(_, node)| match &node.kind {
            NodeKind::FunctionDeclaration(data) => Some(data.clone()),
            _ => None,
        })
        .expect("main");
    let mut ids = Vec::new();
    for &param in &main.params {
        arena.collect_binding_identifiers(param, &mut ids);
    }
    let names: Vec<&str> = ids
        .iter()
        .filter_map(|&i| arena.identifier_name(i).map(|n| &**n))
        .collect();
    assert_eq!(names, vec!["a", "b", "rest", "more"]);
}

#[test]
fn literal_values() {
    let (_, arena, _) = build("ast/kitchen_sink.js");
    let literals: Vec<&LiteralValue> = arena
        .iter()
        .filter_map(|(_, node)| match &node.kind {
            NodeKind::Literal { value } => Some(value),
            _ => None,
        })
        .collect();
    assert!(literals.contains(&&LiteralValue::BigInt("10".into())));
    assert!(literals.contains(&&LiteralValue::RegExp {
        pattern: "ab+c".into(),
        flags: "gi".into(),
    }));
    assert!(literals.contains(&&LiteralValue::Number(42.0 / 6.0)));
    assert!(literals.contains(&&LiteralValue::String("./lazy.js".into())));
}

#[test]
fn static_keys_of_object_properties() {
    let (_, arena, _) = build("ast/kitchen_sink.js");
    let keys: Vec<Option<String>> = arena
        .iter()
        .filter_map(|(_, node)| match &node.kind {
            NodeKind::Property {
                key, computed, method: false, ..
            } if matches!(arena.kind(node.parent), Some(NodeKind::ObjectExpression { .. })) => {
                Some(arena.static_key(*key, *computed).map(|k| k.to_string()))
            }
            _ => None,
        })
        .collect();
    assert_eq!(
        keys,
        vec![None, Some("k".into()), Some("3".into()), Some("alias".into())]
    );
}

#[test]
fn utf16_offsets_become_byte_offsets() {
    let (code, arena, _) = build("ast/unicode.js");
    let declarators = find(&arena, |k| matches!(k, NodeKind::VariableDeclarator { .. }));
    let texts: Vec<&str> = declarators
        .iter()
        .map(|(idx, _)| arena.span(*idx).slice(&code))
        .collect();
    assert_eq!(texts, vec!["greeting = 'héllo wörld 😀'", "after = 1"]);
}

#[test]
fn rejects_non_program_roots() {
    let mut arena = NodeArena::new();
    let value = serde_json::json!({ "type": "Identifier", "name": "x", "start": 0, "end": 1 });
    assert_eq!(
        build_program(&mut arena, &value, "x", 0),
        Err(AstError::NotAProgram)
    );
}

#[test]
fn rejects_unknown_node_types() {
    let mut arena = NodeArena::new();
    let value = serde_json::json!({
        "type": "Program",
        "start": 0,
        "end": 3,
        "body": [{ "type": "JSXElement", "start": 0, "end": 3 }]
    });
    let err = build_program(&mut arena, &value, "<a>", 0).unwrap_err();
    assert_eq!(err, AstError::UnknownNodeType("JSXElement".to_string()));
}

#[test]
fn parenthesized_expressions_are_unwrapped() {
    let mut arena = NodeArena::new();
    let value = serde_json::json!({
        "type": "Program", "start": 0, "end": 4,
        "body": [{
            "type": "ExpressionStatement", "start": 0, "end": 4,
            "expression": {
                "type": "ParenthesizedExpression", "start": 0, "end": 3,
                "expression": { "type": "Identifier", "name": "a", "start": 1, "end": 2 }
            }
        }]
    });
    let root = build_program(&mut arena, &value, "(a);", 0).expect("builds");
    let Some(NodeKind::Program { body }) = arena.kind(root) else {
        panic!("program");
    };
    let Some(NodeKind::ExpressionStatement { expression, .. }) = arena.kind(body[0]) else {
        panic!("statement");
    };
    assert_eq!(arena.identifier_name(*expression).map(|n| &**n), Some("a"));
}
