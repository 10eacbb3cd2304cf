use super::*;
use crate::test_support::{linked, module};

fn ids(graph: &ModuleGraph, modules: &[ModuleId]) -> Vec<String> {
    modules.iter().map(|&m| graph.module(m).id.clone()).collect()
}

#[test]
fn dependencies_run_before_their_importers() {
    let graph = linked(&["inclusion/main.js", "inclusion/lib.js", "inclusion/effects.js"]);
    let order = analyse_execution(&graph, &[module(&graph, "inclusion/main.js")]);
    assert_eq!(
        ids(&graph, &order.ordered),
        vec!["inclusion/lib.js", "inclusion/effects.js", "inclusion/main.js"]
    );
    assert_eq!(order.exec_index(module(&graph, "inclusion/main.js")), Some(2));
    assert!(graph.diagnostics.is_empty());
}

#[test]
fn cycles_warn_with_the_full_path() {
    let graph = linked(&["chunking/cycle_a.js", "chunking/cycle_b.js"]);
    let order = analyse_execution(&graph, &[module(&graph, "chunking/cycle_a.js")]);
    assert_eq!(ids(&graph, &order.ordered), vec!["chunking/cycle_b.js", "chunking/cycle_a.js"]);
    let warnings = graph.diagnostics.take();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].code, DiagnosticCode::CircularDependency);
    assert_eq!(
        warnings[0].message,
        "Circular dependency: chunking/cycle_a.js -> chunking/cycle_b.js -> chunking/cycle_a.js"
    );
}

#[test]
fn dynamic_import_targets_become_entry_points() {
    let graph = linked(&["chunking/main.js", "chunking/shared.js", "chunking/lazy.js"]);
    let main = module(&graph, "chunking/main.js");
    let lazy = module(&graph, "chunking/lazy.js");
    let order = analyse_execution(&graph, &[main]);
    assert_eq!(order.dynamic_imports, vec![lazy]);
    assert_eq!(order.entry_points, vec![main, lazy]);
    assert!(order.is_entry_point(lazy));
    assert_eq!(ids(&graph, &order.ordered).last().map(String::as_str), Some("chunking/lazy.js"));
}

#[test]
fn modules_are_coloured_by_the_entries_that_load_them() {
    let graph = linked(&["chunking/main.js", "chunking/other.js", "chunking/shared.js", "chunking/lazy.js"]);
    let main = module(&graph, "chunking/main.js");
    let other = module(&graph, "chunking/other.js");
    let order = analyse_execution(&graph, &[main, other]);
    let bits = |key: &str| -> Vec<usize> {
        order
            .colour(module(&graph, key))
            .map(|colour| colour.ones().collect())
            .unwrap_or_default()
    };
    assert_eq!(bits("chunking/main.js"), vec![0]);
    assert_eq!(bits("chunking/other.js"), vec![1]);
    assert_eq!(bits("chunking/shared.js"), vec![0, 1]);
    assert_eq!(bits("chunking/lazy.js"), vec![2]);
}
