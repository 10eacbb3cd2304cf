//! Fixture graphs shared by the analysis unit and integration tests.

#![allow(dead_code)]

use serde_json::Value;
use shaker_ast::{NodeIndex, NodeKind};
use shaker_binder::{ModuleGraph, ModuleId, ModuleInput, VariableId};
use std::sync::OnceLock;

fn fixtures() -> &'static Value {
    static FIXTURES: OnceLock<Value> = OnceLock::new();
    FIXTURES.get_or_init(|| {
        serde_json::from_str(include_str!("../../../../tests/fixtures/fixtures.json"))
            .expect("fixtures.json is valid JSON")
    })
}

fn collect_sources(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            if let Some(source) = map
                .get("source")
                .and_then(|s| s.get("value"))
                .and_then(Value::as_str)
            {
                out.push(source.to_string());
            }
            map.values().for_each(|v| collect_sources(v, out));
        }
        Value::Array(items) => items.iter().for_each(|v| collect_sources(v, out)),
        _ => {}
    }
}

fn resolve_relative(importer: &str, specifier: &str) -> String {
    let mut parts: Vec<&str> = importer.split('/').collect();
    parts.pop();
    for segment in specifier.split('/') {
        match segment {
            "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

/// The module input for fixture `key`, resolving relative imports to the
/// other fixtures in `build`.
pub fn input(key: &str, build: &[&str]) -> ModuleInput {
    let entry = fixtures()
        .get(key)
        .unwrap_or_else(|| panic!("missing fixture {key}"));
    let mut input = ModuleInput::new(key, entry["code"].as_str().expect("code"), entry["ast"].clone());
    let mut sources = Vec::new();
    collect_sources(&entry["ast"], &mut sources);
    for source in sources {
        let resolved = resolve_relative(key, &source);
        if source.starts_with('.') && build.contains(&resolved.as_str()) {
            input = input.resolve(&source, &resolved);
        }
    }
    input
}

/// Bind and link the given fixtures; the first one is module 0.
pub fn linked(keys: &[&str]) -> ModuleGraph {
    let mut graph = ModuleGraph::new();
    for key in keys {
        graph.add_module(input(key, keys)).expect("fixture binds");
    }
    graph.link().expect("fixtures link");
    graph
}

pub fn module(graph: &ModuleGraph, key: &str) -> ModuleId {
    graph
        .module_by_id(key)
        .unwrap_or_else(|| panic!("{key} is not part of the graph"))
}

pub fn top_level(graph: &ModuleGraph, module: ModuleId, name: &str) -> VariableId {
    let scope = graph.module(module).scope;
    *graph
        .scope(scope)
        .variables
        .get(name)
        .unwrap_or_else(|| panic!("{name} is not declared at top level"))
}

/// The initialiser of a top-level binding.
pub fn init_of(graph: &ModuleGraph, module: ModuleId, name: &str) -> NodeIndex {
    let init = graph.variable(top_level(graph, module, name)).init;
    assert!(init.is_some(), "{name} has no initialiser");
    init
}

pub fn statements(graph: &ModuleGraph, module: ModuleId) -> Vec<NodeIndex> {
    match graph.arena.kind(graph.module(module).root) {
        Some(NodeKind::Program { body }) => body.clone(),
        _ => panic!("module root is not a program"),
    }
}

/// The source text of a node.
pub fn text(graph: &ModuleGraph, idx: NodeIndex) -> &str {
    let node = graph.arena.get(idx).expect("node exists");
    node.span.slice(&graph.module(ModuleId(node.file)).code)
}

/// The first node of `module`, in document order, whose text is `source`.
pub fn node_with_text(graph: &ModuleGraph, module: ModuleId, source: &str) -> NodeIndex {
    graph
        .arena
        .iter()
        .filter(|(_, node)| node.file == module.0)
        .filter(|(idx, _)| text(graph, *idx) == source)
        .min_by_key(|(_, node)| node.span.start)
        .map(|(idx, _)| idx)
        .unwrap_or_else(|| panic!("no node reads `{source}`"))
}

/// Source text of every included statement of `module`.
pub fn included_statements(graph: &ModuleGraph, module: ModuleId) -> Vec<String> {
    statements(graph, module)
        .into_iter()
        .filter(|&idx| graph.arena.is_included(idx))
        .map(|idx| text(graph, idx).to_string())
        .collect()
}

/// The variable an occurrence of `name` in `module` is bound to.
pub fn binding(graph: &ModuleGraph, module: ModuleId, name: &str) -> VariableId {
    graph
        .arena
        .iter()
        .filter(|(_, node)| node.file == module.0)
        .filter(|(idx, _)| matches!(graph.arena.kind(*idx), Some(NodeKind::Identifier { .. })))
        .filter(|(idx, _)| text(graph, *idx) == name)
        .find_map(|(idx, _)| graph.reference(idx))
        .unwrap_or_else(|| panic!("no bound occurrence of `{name}`"))
}
