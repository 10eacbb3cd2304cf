use super::*;
use crate::test_support::{linked, module, top_level};
use shaker_analysis::Analyzer;
use shaker_common::TreeshakeOptions;

fn shaken(keys: &[&str], entries: &[&str]) -> ModuleGraph {
    let graph = linked(keys);
    let analyzer = Analyzer::new(&graph, TreeshakeOptions::default());
    for entry in entries {
        analyzer.include_entry_exports(module(&graph, entry));
    }
    let modules: Vec<_> = graph.module_ids().collect();
    analyzer.run_inclusion(&modules);
    graph
}

fn export_names(chunk: &Chunk) -> Vec<&str> {
    chunk.exports.keys().map(|name| &**name).collect()
}

const CHUNKING: [&str; 4] = [
    "chunking/main.js",
    "chunking/other.js",
    "chunking/shared.js",
    "chunking/lazy.js",
];

#[test]
fn single_entry_chunk_stands_for_its_entry() {
    let keys = ["render/main.js", "render/a.js", "render/b.js"];
    let graph = shaken(&keys, &[keys[0]]);
    let mut chunks = ChunkSet::new(&graph, &[]);
    let modules = ["render/a.js", "render/b.js", "render/main.js"].map(|k| module(&graph, k));
    let id = chunks.add_chunk(modules.to_vec(), Some(module(&graph, keys[0])));
    let facades = chunks.link();

    assert!(facades.is_empty());
    let chunk = chunks.chunk(id);
    assert!(chunk.is_entry_facade);
    assert_eq!(export_names(chunk), vec!["result"]);
    assert!(chunk.imports.is_empty());
    assert!(chunk.dependencies.is_empty());
    assert_eq!(chunks.export_mode(id), ExportMode::Named);
}

#[test]
fn shared_modules_are_imported_across_chunks() {
    let graph = shaken(&CHUNKING, &["chunking/main.js", "chunking/other.js"]);
    let mut chunks = ChunkSet::new(&graph, &[]);
    let main = chunks.add_chunk(vec![module(&graph, "chunking/main.js")], Some(module(&graph, "chunking/main.js")));
    let other = chunks.add_chunk(vec![module(&graph, "chunking/other.js")], Some(module(&graph, "chunking/other.js")));
    let shared = chunks.add_chunk(vec![module(&graph, "chunking/shared.js")], None);
    chunks.link();

    let shared_fn = top_level(&graph, module(&graph, "chunking/shared.js"), "shared");
    assert_eq!(export_names(chunks.chunk(shared)), vec!["shared"]);
    assert_eq!(chunks.owner_of(shared_fn), Some(ChunkDependency::Chunk(shared)));
    for id in [main, other] {
        let chunk = chunks.chunk(id);
        assert_eq!(chunk.dependencies, vec![ChunkDependency::Chunk(shared)]);
        assert_eq!(chunk.imports.len(), 1);
        assert_eq!(chunk.imports[0].variables[0].variable, shared_fn);
        assert_eq!(&*chunk.imports[0].variables[0].imported, "shared");
        assert!(chunk.is_entry_facade);
    }
    assert!(!chunks.chunk(shared).is_entry_facade);
}

#[test]
fn export_names_are_deduplicated_per_chunk() {
    let keys = ["render/main.js", "render/a.js", "render/b.js"];
    let graph = shaken(&keys, &[keys[0]]);
    let mut chunks = ChunkSet::new(&graph, &[]);
    let id = chunks.add_chunk(vec![module(&graph, "render/a.js"), module(&graph, "render/b.js")], None);
    let a = top_level(&graph, module(&graph, "render/a.js"), "value");
    let b = top_level(&graph, module(&graph, "render/b.js"), "value");

    assert_eq!(&*chunks.ensure_export(id, a), "value");
    assert_eq!(&*chunks.ensure_export(id, b), "value$1");
    assert_eq!(&*chunks.ensure_export(id, a), "value");
    assert_eq!(chunks.chunk(id).exports.len(), 2);
}

#[test]
fn entry_chunks_with_extra_exports_get_a_facade() {
    let graph = shaken(&CHUNKING, &["chunking/main.js", "chunking/other.js"]);
    let mut chunks = ChunkSet::new(&graph, &[]);
    let main_module = module(&graph, "chunking/main.js");
    let main = chunks.add_chunk(vec![module(&graph, "chunking/shared.js"), main_module], Some(main_module));
    chunks.add_chunk(vec![module(&graph, "chunking/other.js")], Some(module(&graph, "chunking/other.js")));
    let facades = chunks.link();

    assert_eq!(facades.len(), 1);
    assert!(!chunks.chunk(main).is_entry_facade);
    let facade = chunks.chunk(facades[0]);
    assert!(facade.is_facade_only());
    assert_eq!(facade.entry_module, Some(main_module));
    assert_eq!(facade.dependencies, vec![ChunkDependency::Chunk(main)]);
    assert_eq!(export_names(facade), vec!["lazy"]);
    let lazy = top_level(&graph, main_module, "lazy");
    assert_eq!(
        facade.import_sources.get(&lazy).map(|(dependency, _)| *dependency),
        Some(ChunkDependency::Chunk(main))
    );
}

#[test]
fn export_mode_follows_the_exports() {
    let graph = shaken(&["inclusion/default_alias.js"], &["inclusion/default_alias.js"]);
    let mut chunks = ChunkSet::new(&graph, &[]);
    let entry = module(&graph, "inclusion/default_alias.js");
    let id = chunks.add_chunk(vec![entry], Some(entry));
    chunks.link();
    assert_eq!(chunks.export_mode(id), ExportMode::Default);

    let graph = shaken(&["inclusion/dead_branch.js"], &["inclusion/dead_branch.js"]);
    let mut chunks = ChunkSet::new(&graph, &[]);
    let entry = module(&graph, "inclusion/dead_branch.js");
    let id = chunks.add_chunk(vec![entry], Some(entry));
    chunks.link();
    assert_eq!(chunks.export_mode(id), ExportMode::None);
}

#[test]
fn external_dependencies_keep_import_order() {
    let graph = shaken(&["render/externals.js"], &["render/externals.js"]);
    let mut chunks = ChunkSet::new(&graph, &[]);
    let entry = module(&graph, "render/externals.js");
    let id = chunks.add_chunk(vec![entry], Some(entry));
    chunks.link();

    let mut paths = FxHashMap::default();
    paths.insert(String::from("fs"), String::from("node:fs"));
    let ids: Vec<String> = chunks
        .chunk(id)
        .dependencies
        .iter()
        .map(|&dependency| chunks.dependency_id(dependency, &paths))
        .collect();
    assert_eq!(ids, vec!["path", "node:fs", "polyfill"]);

    let names = ChunkNames::assign(&chunks, id, crate::names::NamingOptions {
        format: shaker_common::OutputFormat::Es,
        interop: true,
    });
    let declarations = chunks.module_declarations(id, &names, &paths);
    let path = &declarations.dependencies[0];
    assert!(path.exports_default);
    assert!(path.exports_names);
    let mut imported: Vec<&str> = path.imports.iter().map(|s| &*s.imported).collect();
    imported.sort_unstable();
    assert_eq!(imported, vec!["default", "join"]);
    assert!(declarations.dependencies[2].imports.is_empty());
    assert_eq!(declarations.exports.len(), 1);
    assert_eq!(&*declarations.exports[0].exported, "sep");
    assert!(!declarations.exports[0].hoisted);
}

#[test]
fn unused_pure_externals_are_not_loaded() {
    let graph = shaken(&["render/externals.js"], &["render/externals.js"]);
    let mut chunks = ChunkSet::new(&graph, &[String::from("polyfill"), String::from("path")]);
    let entry = module(&graph, "render/externals.js");
    let id = chunks.add_chunk(vec![entry], Some(entry));
    chunks.link();
    let ids: Vec<String> = chunks
        .chunk(id)
        .dependencies
        .iter()
        .map(|&dependency| chunks.dependency_id(dependency, &FxHashMap::default()))
        .collect();
    assert_eq!(ids, vec!["path", "fs"]);
}

#[test]
fn star_and_named_reexports_of_externals() {
    let graph = shaken(&["render/star.js"], &["render/star.js"]);
    let mut chunks = ChunkSet::new(&graph, &[]);
    let entry = module(&graph, "render/star.js");
    let id = chunks.add_chunk(vec![entry], Some(entry));
    chunks.link();
    assert_eq!(chunks.export_mode(id), ExportMode::Named);
    assert_eq!(chunks.chunk(id).star_reexports.len(), 1);

    let names = ChunkNames::default();
    let declarations = chunks.module_declarations(id, &names, &FxHashMap::default());
    let events = &declarations.dependencies[0];
    assert_eq!(events.id, "events");
    assert_eq!(&*events.reexports[0].reexported, "*");
    let path = &declarations.dependencies[1];
    assert_eq!(&*path.reexports[0].imported, "join");
    assert_eq!(&*path.reexports[0].reexported, "joinPath");
    assert_eq!(declarations.exports.len(), 1);
}

#[test]
fn hoisted_function_exports_are_flagged() {
    let graph = shaken(&["render/counter.js"], &["render/counter.js"]);
    let mut chunks = ChunkSet::new(&graph, &[]);
    let entry = module(&graph, "render/counter.js");
    let id = chunks.add_chunk(vec![entry], Some(entry));
    chunks.link();
    let declarations = chunks.module_declarations(id, &ChunkNames::default(), &FxHashMap::default());
    let hoisted: Vec<(&str, bool)> = declarations
        .exports
        .iter()
        .map(|export| (&*export.exported, export.hoisted))
        .collect();
    assert_eq!(hoisted, vec![("count", false), ("increment", true)]);
}
