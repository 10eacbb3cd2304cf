use super::*;
use crate::test_support::{binding, linked, module, top_level};
use shaker_analysis::Analyzer;
use shaker_common::TreeshakeOptions;

fn shaken(keys: &[&str]) -> ModuleGraph {
    let graph = linked(keys);
    let analyzer = Analyzer::new(&graph, TreeshakeOptions::default());
    analyzer.include_entry_exports(module(&graph, keys[0]));
    let modules: Vec<_> = graph.module_ids().collect();
    analyzer.run_inclusion(&modules);
    graph
}

/// One chunk holding `order`, entered at the first key.
fn names_for(graph: &ModuleGraph, entry: &str, order: &[&str], format: OutputFormat) -> ChunkNames {
    let mut chunks = ChunkSet::new(graph, &[]);
    let modules = order.iter().map(|key| module(graph, key)).collect();
    let id = chunks.add_chunk(modules, Some(module(graph, entry)));
    chunks.link();
    ChunkNames::assign(&chunks, id, NamingOptions { format, interop: true })
}

const CONFLICT: [&str; 3] = ["render/main.js", "render/a.js", "render/b.js"];
const CONFLICT_ORDER: [&str; 3] = ["render/a.js", "render/b.js", "render/main.js"];

#[test]
fn colliding_top_level_names_get_suffixes() {
    let graph = shaken(&CONFLICT);
    let names = names_for(&graph, CONFLICT[0], &CONFLICT_ORDER, OutputFormat::Es);
    let a = top_level(&graph, module(&graph, "render/a.js"), "value");
    let b = top_level(&graph, module(&graph, "render/b.js"), "value");
    assert_eq!(names.name_of(&graph, a), "value");
    assert_eq!(names.name_of(&graph, b), "value$1");
}

#[test]
fn nested_declarations_are_deshadowed() {
    let graph = shaken(&CONFLICT);
    let names = names_for(&graph, CONFLICT[0], &CONFLICT_ORDER, OutputFormat::Es);
    let inner = binding(&graph, module(&graph, "render/b.js"), "value$1");
    assert_eq!(names.name_of(&graph, inner), "value$1$1");
}

#[test]
fn nested_suffixes_use_the_compact_alphabet() {
    let graph = shaken(&["render/deep_shadow.js", "render/a.js"]);
    let names = names_for(
        &graph,
        "render/deep_shadow.js",
        &["render/a.js", "render/deep_shadow.js"],
        OutputFormat::Es,
    );
    let deep = module(&graph, "render/deep_shadow.js");
    assert_eq!(names.name_of(&graph, top_level(&graph, deep, "value")), "value$1");
    // value$1$1 through value$1$9 are taken by the function's own bindings.
    let inner = binding(&graph, deep, "value$1");
    assert_eq!(names.name_of(&graph, inner), "value$1$a");
    let ninth = binding(&graph, deep, "value$1$9");
    assert_eq!(names.name_of(&graph, ninth), "value$1$9");
}

#[test]
fn unrenamed_bindings_keep_their_own_name() {
    let graph = shaken(&CONFLICT);
    let names = names_for(&graph, CONFLICT[0], &CONFLICT_ORDER, OutputFormat::Es);
    let result = top_level(&graph, module(&graph, "render/main.js"), "result");
    assert_eq!(names.name_of(&graph, result), "result");
    assert!(!names.is_exports_member(&graph, result));
}

#[test]
fn external_imports_are_named_per_format() {
    let graph = shaken(&["render/externals.js"]);
    let entry = module(&graph, "render/externals.js");
    let join = binding(&graph, entry, "join");
    let path = binding(&graph, entry, "path");

    let es = names_for(&graph, "render/externals.js", &["render/externals.js"], OutputFormat::Es);
    assert_eq!(es.name_of(&graph, join), "join");
    assert_eq!(es.name_of(&graph, path), "path");

    let cjs = names_for(&graph, "render/externals.js", &["render/externals.js"], OutputFormat::Cjs);
    assert_eq!(cjs.name_of(&graph, join), "path.join");
    assert_eq!(cjs.name_of(&graph, path), "path__default");
}

#[test]
fn reassigned_exports_are_written_through_exports_in_cjs() {
    let graph = shaken(&["render/declarators.js"]);
    let entry = module(&graph, "render/declarators.js");
    let second = top_level(&graph, entry, "second");
    let first = top_level(&graph, entry, "first");

    let cjs = names_for(&graph, "render/declarators.js", &["render/declarators.js"], OutputFormat::Cjs);
    assert_eq!(cjs.name_of(&graph, second), "exports.second");
    assert!(cjs.is_exports_member(&graph, second));
    assert_eq!(cjs.name_of(&graph, first), "first");

    let system = names_for(&graph, "render/declarators.js", &["render/declarators.js"], OutputFormat::System);
    assert_eq!(system.name_of(&graph, second), "second");
}

#[test]
fn format_reserved_names_are_avoided() {
    let graph = shaken(&["render/externals.js"]);
    let mut chunks = ChunkSet::new(&graph, &[]);
    let entry = module(&graph, "render/externals.js");
    let id = chunks.add_chunk(vec![entry], Some(entry));
    chunks.link();
    let mut namer = Namer::new(&chunks, id, NamingOptions {
        format: OutputFormat::Cjs,
        interop: true,
    });
    assert_eq!(namer.safe_name("exports", true), "exports$1");
    assert_eq!(namer.safe_name("exports", true), "exports$2");
    assert_eq!(namer.safe_name("undefined", false), "undefined$1");
}
