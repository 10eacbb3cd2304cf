use super::*;
use crate::execution::analyse_execution;
use crate::test_support::{linked, module};

#[test]
fn entry_names_keep_js_extensions_and_fold_others() {
    let mut namer = ChunkNamer::new();
    assert_eq!(namer.name("src/main.js"), "main.js");
    assert_eq!(namer.name("lib/main.js"), "main2.js");
    assert_eq!(namer.name("worker.mjs"), "worker.mjs");
    assert_eq!(namer.name("styles.css"), "styles.css.js");
    assert_eq!(namer.name("chunk"), "chunk.js");
    assert_eq!(namer.name("chunk"), "chunk2.js");
    assert_eq!(namer.name("chunk"), "chunk3.js");
}

#[test]
fn shared_modules_get_their_own_group() {
    let graph = linked(&["chunking/main.js", "chunking/other.js", "chunking/shared.js", "chunking/lazy.js"]);
    let main = module(&graph, "chunking/main.js");
    let other = module(&graph, "chunking/other.js");
    let order = analyse_execution(&graph, &[main, other]);
    let groups = group_by_colour(&order);
    let shared = module(&graph, "chunking/shared.js");
    let lazy = module(&graph, "chunking/lazy.js");
    assert_eq!(
        groups,
        vec![
            ChunkGroup {
                modules: vec![shared],
                entry_module: None,
                extra_entries: Vec::new(),
            },
            ChunkGroup {
                modules: vec![main],
                entry_module: Some(main),
                extra_entries: Vec::new(),
            },
            ChunkGroup {
                modules: vec![other],
                entry_module: Some(other),
                extra_entries: Vec::new(),
            },
            ChunkGroup {
                modules: vec![lazy],
                entry_module: Some(lazy),
                extra_entries: Vec::new(),
            },
        ]
    );
}

#[test]
fn single_group_holds_every_reachable_module() {
    let graph = linked(&["chunking/main.js", "chunking/shared.js", "chunking/lazy.js"]);
    let main = module(&graph, "chunking/main.js");
    let order = analyse_execution(&graph, &[main]);
    let group = single_group(&order);
    assert_eq!(group.modules.len(), 3);
    assert_eq!(group.entry_module, Some(main));
}
