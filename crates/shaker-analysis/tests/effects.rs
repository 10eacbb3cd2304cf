use super::*;
use crate::test_support::{linked, node_with_text, statements, text};
use shaker_binder::{ModuleGraph, ModuleId};
use shaker_common::TreeshakeOptions;

const FIXTURE: &str = "analysis/effects.js";

fn effectful_statements(graph: &ModuleGraph, options: TreeshakeOptions) -> Vec<String> {
    let analyzer = Analyzer::new(graph, options);
    statements(graph, ModuleId(0))
        .into_iter()
        .filter(|&statement| analyzer.has_effects(statement, &AnalysisContext::new()))
        .map(|statement| text(graph, statement).lines().next().unwrap_or_default().to_string())
        .collect()
}

#[test]
fn statements_with_observable_effects() {
    let graph = linked(&[FIXTURE]);
    assert_eq!(
        effectful_statements(&graph, TreeshakeOptions::default()),
        vec![
            "sideEffect();",
            "if (true) {",
            "obj.loud;",
            "recurse(3);",
            "mutateArg({});",
            "globalThing = 1;",
            "throw new Error('boom');",
        ]
    );
}

#[test]
fn property_reads_can_be_declared_pure() {
    let graph = linked(&[FIXTURE]);
    let options = TreeshakeOptions {
        property_read_side_effects: false,
        ..TreeshakeOptions::default()
    };
    let effectful = effectful_statements(&graph, options);
    assert!(!effectful.contains(&"obj.loud;".to_string()));
    assert!(effectful.contains(&"sideEffect();".to_string()));
}

#[test]
fn known_test_values_skip_the_dead_branch() {
    let graph = linked(&[FIXTURE]);
    let analyzer = Analyzer::new(&graph, TreeshakeOptions::default());
    let dead = node_with_text(&graph, ModuleId(0), "if (false) {\n  other();\n}");
    assert!(!analyzer.has_effects(dead, &AnalysisContext::new()));
    let other = node_with_text(&graph, ModuleId(0), "other()");
    assert!(analyzer.has_effects(other, &AnalysisContext::new()));
}

#[test]
fn break_is_an_effect_outside_the_analysed_loop() {
    let graph = linked(&[FIXTURE]);
    let analyzer = Analyzer::new(&graph, TreeshakeOptions::default());
    let statement = node_with_text(&graph, ModuleId(0), "break;");
    assert!(analyzer.has_effects(statement, &AnalysisContext::new()));
    assert!(!analyzer.has_effects(statement, &AnalysisContext::new().with_ignore_break()));

    let labelled = node_with_text(&graph, ModuleId(0), "break outer;");
    assert!(analyzer.has_effects(labelled, &AnalysisContext::new().with_ignore_break()));
    assert!(!analyzer.has_effects(
        labelled,
        &AnalysisContext::new().with_ignored_label(shaker_common::Name::from("outer"))
    ));
}

#[test]
fn returns_only_count_outside_call_analysis() {
    let graph = linked(&[FIXTURE]);
    let analyzer = Analyzer::new(&graph, TreeshakeOptions::default());
    let statement = node_with_text(&graph, ModuleId(0), "return y;");
    assert!(analyzer.has_effects(statement, &AnalysisContext::new()));
    let inner = AnalysisContext::new().for_called_function(None, &CallOptions::synthetic());
    assert!(!analyzer.has_effects(statement, &inner));
}
