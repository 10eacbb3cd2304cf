use super::*;
use crate::test_support::{init_of, linked, top_level};
use crate::values::JsValue;
use shaker_binder::{ModuleGraph, ModuleId};
use shaker_common::TreeshakeOptions;

const FIXTURE: &str = "analysis/returns.js";

fn returned(analyzer: &Analyzer<'_>, graph: &ModuleGraph, name: &str) -> Vec<Entity> {
    let function = Entity::Node(init_of(graph, ModuleId(0), name));
    analyzer.return_expressions(function, &[], &CallOptions::synthetic())
}

#[test]
fn single_return_is_the_call_value() {
    let graph = linked(&[FIXTURE]);
    let analyzer = Analyzer::new(&graph, TreeshakeOptions::default());
    let values = returned(&analyzer, &graph, "single");
    assert_eq!(values.len(), 1);
    assert!(matches!(
        values[0],
        Entity::Node(idx) if matches!(graph.arena.kind(idx), Some(NodeKind::ObjectExpression { .. }))
    ));
}

#[test]
fn several_returns_collapse_to_unknown() {
    let graph = linked(&[FIXTURE]);
    let analyzer = Analyzer::new(&graph, TreeshakeOptions::default());
    assert_eq!(returned(&analyzer, &graph, "many"), vec![Entity::Unknown]);
    assert_eq!(returned(&analyzer, &graph, "none"), vec![Entity::Unknown]);
}

#[test]
fn async_and_generator_functions_return_unknown() {
    let graph = linked(&[FIXTURE]);
    let analyzer = Analyzer::new(&graph, TreeshakeOptions::default());
    assert_eq!(returned(&analyzer, &graph, "later"), vec![Entity::Unknown]);
    assert_eq!(returned(&analyzer, &graph, "gen"), vec![Entity::Unknown]);
}

#[test]
fn bare_return_yields_undefined() {
    let graph = linked(&[FIXTURE]);
    let analyzer = Analyzer::new(&graph, TreeshakeOptions::default());
    assert_eq!(returned(&analyzer, &graph, "bare"), vec![Entity::Undefined]);
}

#[test]
fn arrow_expression_bodies_are_returned() {
    let graph = linked(&[FIXTURE]);
    let analyzer = Analyzer::new(&graph, TreeshakeOptions::default());
    let arrow = Entity::Variable(top_level(&graph, ModuleId(0), "arrow"));
    let values = analyzer.return_expressions(arrow, &[], &CallOptions::synthetic());
    assert_eq!(values.len(), 1);
    assert_eq!(
        analyzer.literal_at(values[0], &[], &AnalysisContext::new()),
        Some(JsValue::string("body"))
    );
}

#[test]
fn members_of_a_returned_object_fold() {
    let graph = linked(&[FIXTURE]);
    let analyzer = Analyzer::new(&graph, TreeshakeOptions::default());
    let chained = Entity::Variable(top_level(&graph, ModuleId(0), "chained"));
    assert_eq!(
        analyzer.literal_at(chained, &[], &AnalysisContext::new()),
        Some(JsValue::string("single"))
    );
}

#[test]
fn built_in_methods_return_known_primitives() {
    let graph = linked(&[FIXTURE]);
    let analyzer = Analyzer::new(&graph, TreeshakeOptions::default());
    let values = analyzer.return_expressions(
        Entity::Primitive(PrimitiveType::String),
        &[PathKey::name("toUpperCase")],
        &CallOptions::synthetic(),
    );
    assert_eq!(values, vec![Entity::Primitive(PrimitiveType::String)]);
    let values = analyzer.return_expressions(
        Entity::Primitive(PrimitiveType::Number),
        &[PathKey::name("toFixed")],
        &CallOptions::synthetic(),
    );
    assert_eq!(values, vec![Entity::Primitive(PrimitiveType::String)]);
}

#[test]
fn a_revisited_call_answers_true() {
    let graph = linked(&[FIXTURE]);
    let analyzer = Analyzer::new(&graph, TreeshakeOptions::default());
    let function = Entity::Node(init_of(&graph, ModuleId(0), "single"));
    let ctx = AnalysisContext::new().with_visited(VisitKind::Return, function, &[], NodeIndex::NONE);
    let mut seen = 0;
    let answer = analyzer.some_return_expression(function, &[], &CallOptions::synthetic(), &ctx, &mut |_, _| {
        seen += 1;
        false
    });
    assert!(answer);
    assert_eq!(seen, 0);
}
