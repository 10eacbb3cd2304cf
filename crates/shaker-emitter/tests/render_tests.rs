//! Whole single-chunk bundles rendered from fixture graphs.

mod support;

use rustc_hash::FxHashMap;
use shaker_analysis::Analyzer;
use shaker_common::{DiagnosticCode, OutputFormat, TreeshakeOptions};
use shaker_emitter::{RenderOptions, render_chunk};
use support::{bundle, bundle_with, linked, module, shake, single_chunk};

#[test]
fn tree_shaken_modules_are_concatenated_in_execution_order() {
    assert_eq!(
        bundle(
            &["inclusion/main.js", "inclusion/lib.js", "inclusion/effects.js"],
            OutputFormat::Es
        ),
        "function used() {\n  return helper();\n}\nfunction helper() {\n  return 1;\n}\n\n\
         console.log('loaded');\n\n\
         const kept = used();\n\n\
         export { kept };\n"
    );
}

#[test]
fn colliding_names_are_renamed_and_deshadowed() {
    assert_eq!(
        bundle(&["render/main.js", "render/a.js", "render/b.js"], OutputFormat::Es),
        "const value = 'a';\nfunction a() {\n  return value;\n}\n\n\
         const value$1 = 'b';\nfunction b() {\n  const value$1$1 = 'inner';\n  return value$1 + value$1$1;\n}\n\n\
         const result = a() + b();\n\n\
         export { result };\n"
    );
}

#[test]
fn renaming_is_stable_across_builds() {
    let keys = ["render/main.js", "render/a.js", "render/b.js"];
    let first = bundle(&keys, OutputFormat::Es);
    let second = bundle(&keys, OutputFormat::Es);
    assert_eq!(first, second);
    assert!(first.contains("value$1$1"), "{first}");
}

#[test]
fn fully_included_module_renders_unchanged() {
    let graph = linked(&["render/verbatim.js"]);
    let entry = module(&graph, "render/verbatim.js");
    let analyzer = Analyzer::new(&graph, TreeshakeOptions::default());
    analyzer.include_everything();
    analyzer.run_inclusion(&[entry]);
    let folded = analyzer.folded_tests();
    let chunks = single_chunk(&graph, "render/verbatim.js");
    let id = chunks.chunk_ids().next().expect("one chunk");
    let rendered = render_chunk(&chunks, id, &RenderOptions::default(), &FxHashMap::default(), &folded);
    assert_eq!(rendered.code, graph.module(entry).code);
}

#[test]
fn namespace_used_as_a_value_is_reified() {
    assert_eq!(
        bundle(&["inclusion/namespace_all.js", "inclusion/lib.js"], OutputFormat::Es),
        "function used() {\n  return helper();\n}\nfunction unused() {\n  return 2;\n}\nfunction helper() {\n  return 1;\n}\n\n\
         var lib = Object.freeze({\n  used: used,\n  unused: unused\n});\n\n\
         export default lib;\n"
    );
}

#[test]
fn namespace_objects_honour_const_and_freeze() {
    let code = bundle_with(
        &["inclusion/namespace_all.js", "inclusion/lib.js"],
        RenderOptions {
            prefer_const: true,
            freeze: false,
            ..RenderOptions::default()
        },
    );
    assert!(code.contains("const lib = {\n  used: used,\n  unused: unused\n};"), "{code}");
}

#[test]
fn known_conditions_collapse_expressions() {
    let code = bundle(&["render/collapse.js"], OutputFormat::Es);
    assert!(code.contains("const pick = left();"), "{code}");
    assert!(code.contains("const either = fallback();"), "{code}");
    assert!(code.contains("const last = (effect(), 2);"), "{code}");
    assert!(!code.contains("right()"));
}

#[test]
fn banner_footer_intro_and_outro_wrap_the_output() {
    let code = bundle_with(
        &["inclusion/default_alias.js"],
        RenderOptions {
            banner: String::from("/* banner */"),
            footer: String::from("/* footer */"),
            intro: String::from("// intro"),
            outro: String::from("// outro"),
            ..RenderOptions::default()
        },
    );
    assert_eq!(
        code,
        "/* banner */\n// intro\n\nconst value = 1;\n\nexport default value;\n\n// outro\n/* footer */\n"
    );
}

#[test]
fn chunk_without_code_or_exports_warns() {
    let graph = linked(&["render/empty.js"]);
    let folded = shake(&graph, "render/empty.js");
    let chunks = single_chunk(&graph, "render/empty.js");
    let id = chunks.chunk_ids().next().expect("one chunk");
    let rendered = render_chunk(&chunks, id, &RenderOptions::default(), &FxHashMap::default(), &folded);
    assert_eq!(rendered.code, "\n");
    assert!(rendered.exports.is_empty());
    assert!(graph.diagnostics.contains(DiagnosticCode::EmptyBundle));
}

#[test]
fn rendered_chunk_reports_its_metadata() {
    let graph = linked(&["render/externals.js"]);
    let folded = shake(&graph, "render/externals.js");
    let chunks = single_chunk(&graph, "render/externals.js");
    let id = chunks.chunk_ids().next().expect("one chunk");
    let rendered = render_chunk(&chunks, id, &RenderOptions::default(), &FxHashMap::default(), &folded);
    assert_eq!(rendered.file_name, "main.js");
    assert_eq!(rendered.exports, vec!["sep"]);
    assert_eq!(rendered.imports, vec!["path", "fs", "polyfill"]);
    assert_eq!(rendered.modules, vec!["render/externals.js"]);
    assert!(rendered.is_entry);
}
