use super::*;
use crate::test_support::{init_of, linked, top_level};
use shaker_binder::{ModuleGraph, ModuleId};
use shaker_common::TreeshakeOptions;

const FIXTURE: &str = "analysis/paths.js";

fn path(keys: &[&str]) -> Vec<PathKey> {
    keys.iter().map(|key| PathKey::name(key)).collect()
}

fn variable(graph: &ModuleGraph, name: &str) -> Entity {
    Entity::Variable(top_level(graph, ModuleId(0), name))
}

#[test]
fn reading_object_literal_members() {
    let graph = linked(&[FIXTURE]);
    let analyzer = Analyzer::new(&graph, TreeshakeOptions::default());
    let ctx = AnalysisContext::new();
    let plain = variable(&graph, "plain");

    assert!(!analyzer.accessed_at(plain, &path(&["a"]), &ctx));
    assert!(!analyzer.accessed_at(plain, &path(&["nested", "b"]), &ctx));
    assert!(!analyzer.accessed_at(plain, &path(&["missing"]), &ctx));
    assert!(analyzer.accessed_at(plain, &path(&["missing", "deeper"]), &ctx));
    assert!(analyzer.accessed_at(variable(&graph, "withGetter"), &path(&["value"]), &ctx));
}

#[test]
fn writing_object_literal_members() {
    let graph = linked(&[FIXTURE]);
    let analyzer = Analyzer::new(&graph, TreeshakeOptions::default());
    let ctx = AnalysisContext::new();

    assert!(!analyzer.assigned_at(variable(&graph, "plain"), &path(&["a"]), &ctx));
    assert!(!analyzer.assigned_at(variable(&graph, "plain"), &path(&["fresh"]), &ctx));
    assert!(analyzer.assigned_at(variable(&graph, "withSetter"), &path(&["value"]), &ctx));
    assert!(analyzer.assigned_at(variable(&graph, "text"), &path(&["prop"]), &ctx));
}

#[test]
fn writes_to_included_bindings_are_effects() {
    let graph = linked(&[FIXTURE]);
    let analyzer = Analyzer::new(&graph, TreeshakeOptions::default());
    let plain = variable(&graph, "plain");
    assert!(!analyzer.assigned_at(plain, &[], &AnalysisContext::new()));
    graph.variable(top_level(&graph, ModuleId(0), "plain")).include();
    assert!(analyzer.assigned_at(plain, &[], &AnalysisContext::new()));
}

#[test]
fn constructor_calls_bind_this_to_a_fresh_object() {
    let graph = linked(&[FIXTURE]);
    let analyzer = Analyzer::new(&graph, TreeshakeOptions::default());
    let ctx = AnalysisContext::new();
    let ctor = Entity::Node(init_of(&graph, ModuleId(0), "Ctor"));

    let construct = CallOptions::new(true, &[], NodeIndex::NONE);
    assert!(!analyzer.called_at(ctor, &[], &construct, &ctx));
    assert!(analyzer.called_at(ctor, &[], &CallOptions::synthetic(), &ctx));
}

#[test]
fn classes_run_their_constructor_chain() {
    let graph = linked(&[FIXTURE]);
    let analyzer = Analyzer::new(&graph, TreeshakeOptions::default());
    let ctx = AnalysisContext::new();
    let construct = CallOptions::new(true, &[], NodeIndex::NONE);

    assert!(!analyzer.called_at(variable(&graph, "Pure"), &[], &construct, &ctx));
    assert!(analyzer.called_at(variable(&graph, "Impure"), &[], &construct, &ctx));
    assert!(analyzer.called_at(variable(&graph, "Derived"), &[], &construct, &ctx));
    // Calling a class without `new` throws.
    assert!(analyzer.called_at(variable(&graph, "Pure"), &[], &CallOptions::synthetic(), &ctx));
}

#[test]
fn built_in_members_of_literals() {
    let graph = linked(&[FIXTURE]);
    let analyzer = Analyzer::new(&graph, TreeshakeOptions::default());
    let ctx = AnalysisContext::new();
    let call = CallOptions::synthetic();
    let list = variable(&graph, "list");
    let text = variable(&graph, "text");

    assert!(analyzer.called_at(list, &path(&["push"]), &call, &ctx));
    assert!(!analyzer.called_at(list, &path(&["slice"]), &call, &ctx));
    assert!(!analyzer.called_at(text, &path(&["toUpperCase"]), &call, &ctx));
    assert!(analyzer.called_at(text, &path(&["noSuchMethod"]), &call, &ctx));
    assert!(!analyzer.accessed_at(text, &path(&["length"]), &ctx));
}

#[test]
fn unknown_values_are_effectful_everywhere() {
    let graph = linked(&[FIXTURE]);
    let analyzer = Analyzer::new(&graph, TreeshakeOptions::default());
    let ctx = AnalysisContext::new();
    let key = path(&["x"]);
    assert!(analyzer.accessed_at(Entity::Unknown, &key, &ctx));
    assert!(analyzer.assigned_at(Entity::Unknown, &key, &ctx));
    assert!(analyzer.called_at(Entity::Unknown, &[], &CallOptions::synthetic(), &ctx));
    assert!(!analyzer.accessed_at(Entity::UnknownObject, &key, &ctx));
    assert!(analyzer.accessed_at(Entity::UnknownObject, &path(&["x", "y"]), &ctx));
}

#[test]
fn paths_beyond_the_cap_are_effectful() {
    let graph = linked(&[FIXTURE]);
    let analyzer = Analyzer::new(&graph, TreeshakeOptions::default());
    let deep = path(&["a", "b", "c", "d", "e", "f", "g", "h"]);
    assert!(analyzer.accessed_at(Entity::UnknownObject, &deep, &AnalysisContext::new()));
    assert!(analyzer.assigned_at(Entity::UnknownObject, &deep, &AnalysisContext::new()));
}
