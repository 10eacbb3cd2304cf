//! Single-entry builds through the whole pipeline.

mod support;

use shaker::{BuildOptions, DiagnosticCode};
use support::{build_fixtures, single};

const INCLUSION: [&str; 3] = ["inclusion/main.js", "inclusion/lib.js", "inclusion/effects.js"];

#[test]
fn unused_code_is_dropped() {
    assert_eq!(
        single(&INCLUSION, BuildOptions::default()),
        "function used() {\n  return helper();\n}\nfunction helper() {\n  return 1;\n}\n\n\
         console.log('loaded');\n\n\
         const kept = used();\n\n\
         export { kept };\n"
    );
}

#[test]
fn renamed_bindings_match_a_direct_render() {
    assert_eq!(
        single(&["render/main.js", "render/a.js", "render/b.js"], BuildOptions::default()),
        "const value = 'a';\nfunction a() {\n  return value;\n}\n\n\
         const value$1 = 'b';\nfunction b() {\n  const value$1$1 = 'inner';\n  return value$1 + value$1$1;\n}\n\n\
         const result = a() + b();\n\n\
         export { result };\n"
    );
}

#[test]
fn disabling_treeshake_keeps_every_statement() {
    let code = single(&INCLUSION, BuildOptions {
        treeshake: None,
        ..BuildOptions::default()
    });
    assert!(code.contains("function unused() {\n  return 2;\n}"), "{code}");
    assert!(code.contains("const unusedValue = 1;"), "{code}");
    assert!(code.contains("const local = 1;"), "{code}");
    assert!(code.contains("const pureCall = Math.max(1, 2);"), "{code}");
    assert!(code.ends_with("export { kept };\n"), "{code}");
}

#[test]
fn wrappers_surround_the_chunk() {
    let code = single(&["inclusion/default_alias.js"], BuildOptions {
        banner: String::from("/* banner */"),
        footer: String::from("/* footer */"),
        intro: String::from("// intro"),
        outro: String::from("// outro"),
        ..BuildOptions::default()
    });
    assert_eq!(
        code,
        "/* banner */\n// intro\n\nconst value = 1;\n\nexport default value;\n\n// outro\n/* footer */\n"
    );
}

#[test]
fn output_reports_the_entry_chunk() {
    let output = build_fixtures(&INCLUSION, &["inclusion/main.js"], BuildOptions::default());
    let chunk = output.chunk("main.js").expect("named after the entry");
    assert!(chunk.is_entry);
    assert_eq!(chunk.exports, vec!["kept"]);
    assert_eq!(
        chunk.modules,
        vec!["inclusion/lib.js", "inclusion/effects.js", "inclusion/main.js"]
    );
    assert!(output.stats.passes >= 1);
    assert!(output.warnings.is_empty(), "{:?}", output.warnings);
}

#[test]
fn unused_external_imports_are_reported() {
    let output = build_fixtures(
        &["chunking/unused_external.js"],
        &["chunking/unused_external.js"],
        BuildOptions::default(),
    );
    let warning = output
        .warnings
        .iter()
        .find(|w| w.code == DiagnosticCode::UnusedExternalImport)
        .expect("writeFile is never used");
    assert_eq!(
        warning.message,
        "'writeFile' is imported from external module 'fs' but never used"
    );
    let code = &output.chunks[0].code;
    assert!(code.starts_with("import { readFile } from 'fs';"), "{code}");
}

#[test]
fn nothing_to_emit_warns_about_an_empty_bundle() {
    let output = build_fixtures(&["render/empty.js"], &["render/empty.js"], BuildOptions::default());
    assert_eq!(output.chunks[0].code, "\n");
    assert!(output.warnings.iter().any(|w| w.code == DiagnosticCode::EmptyBundle));
}
