use super::*;
use crate::test_support::{init_of, linked, top_level};
use crate::values::JsValue;
use shaker_binder::{ModuleGraph, ModuleId};
use shaker_common::TreeshakeOptions;

const FIXTURE: &str = "analysis/reassign.js";

fn member(analyzer: &Analyzer<'_>, graph: &ModuleGraph, name: &str, key: &str) -> Option<JsValue> {
    let variable = Entity::Variable(top_level(graph, ModuleId(0), name));
    analyzer.literal_at(variable, &[PathKey::name(key)], &AnalysisContext::new())
}

#[test]
fn member_writes_deoptimise_only_the_written_key() {
    let graph = linked(&[FIXTURE]);
    let analyzer = Analyzer::new(&graph, TreeshakeOptions::default());
    assert_eq!(member(&analyzer, &graph, "target", "a"), None);
    assert_eq!(member(&analyzer, &graph, "target", "b"), Some(JsValue::Number(2.0)));
}

#[test]
fn computed_writes_deoptimise_every_key() {
    let graph = linked(&[FIXTURE]);
    let analyzer = Analyzer::new(&graph, TreeshakeOptions::default());
    assert_eq!(member(&analyzer, &graph, "whole", "a"), None);
}

#[test]
fn values_passed_to_calls_escape() {
    let graph = linked(&[FIXTURE]);
    let analyzer = Analyzer::new(&graph, TreeshakeOptions::default());
    assert_eq!(member(&analyzer, &graph, "escaped", "a"), None);
    assert_eq!(member(&analyzer, &graph, "stable", "a"), Some(JsValue::Number(1.0)));
}

#[test]
fn updates_mark_the_binding_reassigned() {
    let graph = linked(&[FIXTURE]);
    let _analyzer = Analyzer::new(&graph, TreeshakeOptions::default());
    assert!(graph.variable(top_level(&graph, ModuleId(0), "counter")).is_reassigned());
    assert!(!graph.variable(top_level(&graph, ModuleId(0), "stable")).is_reassigned());
}

#[test]
fn replacing_a_prototype_makes_its_members_unknown() {
    let graph = linked(&[FIXTURE]);
    let analyzer = Analyzer::new(&graph, TreeshakeOptions::default());
    let ctx = AnalysisContext::new();
    let path = [PathKey::name("prototype"), PathKey::name("method")];
    let replaced = Entity::Node(init_of(&graph, ModuleId(0), "Proto"));
    let untouched = Entity::Node(init_of(&graph, ModuleId(0), "Other"));
    assert!(analyzer.accessed_at(replaced, &path, &ctx));
    assert!(!analyzer.accessed_at(untouched, &path, &ctx));
}

#[test]
fn reassignment_is_monotonic() {
    let graph = linked(&[FIXTURE]);
    let analyzer = Analyzer::new(&graph, TreeshakeOptions::default());
    let stable = Entity::Variable(top_level(&graph, ModuleId(0), "stable"));
    assert!(!analyzer.state_changed.get());

    analyzer.reassign_path(stable, &[PathKey::name("a")]);
    assert!(analyzer.state_changed.get());
    assert_eq!(member(&analyzer, &graph, "stable", "a"), None);

    // Repeating a recorded write changes nothing.
    analyzer.state_changed.set(false);
    analyzer.reassign_path(stable, &[PathKey::name("a")]);
    assert!(!analyzer.state_changed.get());

    analyzer.reassign_path(stable, &[]);
    assert!(analyzer.state_changed.get());
    analyzer.state_changed.set(false);
    analyzer.reassign_path(stable, &[]);
    assert!(!analyzer.state_changed.get());
}

#[test]
fn paths_beyond_the_cap_are_ignored() {
    let graph = linked(&[FIXTURE]);
    let analyzer = Analyzer::new(&graph, TreeshakeOptions::default());
    let stable = Entity::Variable(top_level(&graph, ModuleId(0), "stable"));
    let deep: Vec<PathKey> = (0..8).map(|i| PathKey::name(&format!("k{i}"))).collect();
    analyzer.reassign_path(stable, &deep);
    assert!(!analyzer.state_changed.get());
}
