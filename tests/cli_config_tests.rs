//! Config files on disk driven through the command-line front end.

use serde_json::{Value, json};
use shaker::DiagnosticCode;
use shaker::cli::{CliArgs, run};
use std::path::Path;
use tempfile::TempDir;

const FIXTURES: &str = include_str!("fixtures/fixtures.json");

/// Write the source and tree of every fixture in `keys` under `dir`, plus a
/// `shaker.json` listing them. `resolve` maps importer to specifier/target.
fn project(keys: &[&str], resolve: &[(&str, &str, &str)], extra: Value) -> TempDir {
    let fixtures: Value = serde_json::from_str(FIXTURES).expect("fixtures parse");
    let dir = tempfile::tempdir().expect("tempdir");
    let mut modules = Vec::new();
    for (index, key) in keys.iter().enumerate() {
        let fixture = &fixtures[*key];
        let code = format!("src/{index}.js");
        let ast = format!("ast/{index}.json");
        write(dir.path(), &code, fixture["code"].as_str().expect("code"));
        write(dir.path(), &ast, &fixture["ast"].to_string());
        let resolved: serde_json::Map<String, Value> = resolve
            .iter()
            .filter(|(importer, _, _)| importer == key)
            .map(|(_, specifier, target)| ((*specifier).to_string(), json!(target)))
            .collect();
        modules.push(json!({ "id": key, "code": code, "ast": ast, "resolve": resolved }));
    }
    let mut config = json!({ "modules": modules, "entries": [keys[0]] });
    if let (Some(config), Value::Object(extra)) = (config.as_object_mut(), extra) {
        config.extend(extra);
    }
    write(dir.path(), "shaker.json", &config.to_string());
    dir
}

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create dir");
    }
    std::fs::write(path, contents).expect("write file");
}

fn args(extra: &[&str]) -> CliArgs {
    use clap::Parser;
    let mut argv = vec!["shaker", "--config", "shaker.json"];
    argv.extend_from_slice(extra);
    CliArgs::try_parse_from(argv).expect("args parse")
}

const INCLUSION: [&str; 3] = ["inclusion/main.js", "inclusion/lib.js", "inclusion/effects.js"];
const INCLUSION_RESOLVE: [(&str, &str, &str); 2] = [
    ("inclusion/main.js", "./lib.js", "inclusion/lib.js"),
    ("inclusion/main.js", "./effects.js", "inclusion/effects.js"),
];

#[test]
fn a_single_chunk_goes_to_stdout() {
    let dir = project(&INCLUSION, &INCLUSION_RESOLVE, json!({}));
    let report = run(&args(&[]), dir.path()).expect("build succeeds");
    assert!(report.written.is_empty());
    assert_eq!(
        report.stdout.as_deref(),
        Some(
            "function used() {\n  return helper();\n}\nfunction helper() {\n  return 1;\n}\n\n\
             console.log('loaded');\n\n\
             const kept = used();\n\n\
             export { kept };\n"
        )
    );
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
}

#[test]
fn config_options_shape_the_output() {
    let dir = project(
        &INCLUSION,
        &INCLUSION_RESOLVE,
        json!({ "format": "cjs", "banner": "/* shaken */", "treeshake": false }),
    );
    let report = run(&args(&[]), dir.path()).expect("build succeeds");
    let code = report.stdout.expect("single chunk");
    assert!(code.starts_with("/* shaken */\n'use strict';"), "{code}");
    assert!(code.contains("function unused() {"), "{code}");
    assert!(code.ends_with("exports.kept = kept;\n"), "{code}");
}

#[test]
fn command_line_flags_override_the_config() {
    let dir = project(&INCLUSION, &INCLUSION_RESOLVE, json!({ "format": "amd", "treeshake": true }));
    let report = run(&args(&["--format", "es", "--no-treeshake"]), dir.path()).expect("build succeeds");
    let code = report.stdout.expect("single chunk");
    assert!(code.contains("const local = 1;"), "{code}");
    assert!(code.ends_with("export { kept };\n"), "{code}");
}

#[test]
fn chunks_are_written_to_the_output_directory() {
    let keys = ["chunking/main.js", "chunking/other.js", "chunking/shared.js", "chunking/lazy.js"];
    let resolve = [
        ("chunking/main.js", "./shared.js", "chunking/shared.js"),
        ("chunking/main.js", "./lazy.js", "chunking/lazy.js"),
        ("chunking/other.js", "./shared.js", "chunking/shared.js"),
    ];
    let dir = project(&keys, &resolve, json!({ "outDir": "dist" }));
    let report = run(
        &args(&["-i", "chunking/main.js", "-i", "chunking/other.js"]),
        dir.path(),
    )
    .expect("build succeeds");
    assert!(report.stdout.is_none());
    assert_eq!(report.written.len(), 4);
    for name in ["main.js", "other.js", "chunk.js", "lazy.js"] {
        let path = dir.path().join("dist").join(name);
        assert!(report.written.contains(&path), "{name} not written");
        assert!(path.is_file(), "{name} missing on disk");
    }
    let main = std::fs::read_to_string(dir.path().join("dist/main.js")).expect("read main.js");
    assert!(main.contains("import(\"./lazy.js\")"), "{main}");
}

#[test]
fn several_chunks_need_an_output_directory() {
    let keys = ["chunking/main.js", "chunking/shared.js", "chunking/lazy.js"];
    let resolve = [
        ("chunking/main.js", "./shared.js", "chunking/shared.js"),
        ("chunking/main.js", "./lazy.js", "chunking/lazy.js"),
    ];
    let dir = project(&keys, &resolve, json!({}));
    let err = run(&args(&[]), dir.path()).expect_err("two chunks and no out dir");
    assert_eq!(
        err.to_string(),
        "the build produced 2 chunks; pass --out-dir to write them"
    );
}

#[test]
fn invalid_formats_fail_as_build_errors() {
    let dir = project(&INCLUSION, &INCLUSION_RESOLVE, json!({}));
    let err = run(&args(&["-f", "umd"]), dir.path()).expect_err("umd is not a format");
    let build_error = err.downcast_ref::<shaker::BuildError>().expect("a build error");
    assert_eq!(build_error.code(), DiagnosticCode::InvalidOption);
}

#[test]
fn missing_module_files_are_reported_with_their_path() {
    let dir = project(&INCLUSION, &INCLUSION_RESOLVE, json!({}));
    std::fs::remove_file(dir.path().join("ast/1.json")).expect("remove tree");
    let err = run(&args(&[]), dir.path()).expect_err("tree is gone");
    assert!(format!("{err:#}").contains("failed to read module tree"), "{err:#}");
}
