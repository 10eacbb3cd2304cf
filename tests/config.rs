use super::*;

#[test]
fn empty_config_uses_defaults() {
    let config = parse_config("{}").expect("empty object parses");
    assert_eq!(config, ShakerConfig::default());
    let options = config.build_options().expect("defaults are valid");
    assert_eq!(options.format, OutputFormat::Es);
    assert_eq!(options.treeshake, Some(TreeshakeOptions::default()));
    assert!(options.freeze && options.interop && options.strict);
    assert!(!options.prefer_const && !options.inline_dynamic_imports);
}

#[test]
fn camel_case_keys_map_onto_build_options() {
    let config = parse_config(
        r#"{
            "modules": [
                { "id": "main.js", "code": "src/main.js", "ast": "ast/main.json", "resolve": { "./lib.js": "lib.js" } }
            ],
            "entries": ["main.js"],
            "outDir": "dist",
            "format": "commonjs",
            "paths": { "path": "node:path" },
            "preferConst": true,
            "freeze": false,
            "interop": false,
            "strict": false,
            "inlineDynamicImports": true,
            "banner": "/* banner */",
            "outro": "// end"
        }"#,
    )
    .expect("config parses");
    assert_eq!(config.modules[0].resolve.get("./lib.js").map(String::as_str), Some("lib.js"));
    assert_eq!(config.out_dir.as_deref(), Some(Path::new("dist")));

    let options = config.build_options().expect("options are valid");
    assert_eq!(options.entries, vec!["main.js"]);
    assert_eq!(options.format, OutputFormat::Cjs);
    assert_eq!(options.paths.get("path").map(String::as_str), Some("node:path"));
    assert!(options.prefer_const);
    assert!(!options.freeze && !options.interop && !options.strict);
    assert!(options.inline_dynamic_imports);
    assert_eq!(options.banner, "/* banner */");
    assert_eq!(options.outro, "// end");
    assert_eq!(options.intro, "");
}

#[test]
fn treeshake_accepts_a_flag_or_options() {
    let off = parse_config(r#"{ "treeshake": false }"#).expect("flag parses");
    assert_eq!(off.treeshake, TreeshakeConfig::Enabled(false));
    assert_eq!(off.treeshake.resolve(), None);

    let tuned = parse_config(
        r#"{ "treeshake": { "propertyReadSideEffects": false, "pureExternalModules": ["polyfill"] } }"#,
    )
    .expect("options parse");
    let options = tuned.treeshake.resolve().expect("enabled");
    assert!(!options.property_read_side_effects);
    assert_eq!(options.pure_external_modules, vec!["polyfill"]);
}

#[test]
fn unknown_formats_are_invalid_options() {
    let config = parse_config(r#"{ "format": "umd" }"#).expect("config parses");
    let err = config.build_options().expect_err("umd is not supported");
    assert_eq!(err.code(), DiagnosticCode::InvalidOption);
    assert_eq!(
        err.diagnostic().message,
        "Invalid format: umd - valid options are amd, cjs, system, es"
    );
}

#[test]
fn malformed_json_is_reported_with_context() {
    let err = parse_config("{ entries: ").expect_err("not JSON");
    assert_eq!(err.to_string(), "failed to parse config JSON");
}
