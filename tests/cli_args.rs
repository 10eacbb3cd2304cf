use super::*;

#[test]
fn short_flags() {
    let args = CliArgs::try_parse_from(["shaker", "-c", "shaker.json", "-i", "main.js", "-i", "worker.js", "-f", "cjs", "-d", "dist"])
        .expect("args parse");
    assert_eq!(args.config, PathBuf::from("shaker.json"));
    assert_eq!(args.entries, vec!["main.js", "worker.js"]);
    assert_eq!(args.format.as_deref(), Some("cjs"));
    assert_eq!(args.out_dir, Some(PathBuf::from("dist")));
    assert!(!args.no_treeshake && !args.json && !args.no_color);
}

#[test]
fn long_flags_and_camel_case_aliases() {
    let args = CliArgs::try_parse_from([
        "shaker",
        "--config",
        "build/shaker.json",
        "--entry",
        "main.js",
        "--outDir",
        "out",
        "--noTreeshake",
        "--json",
        "--noColor",
    ])
    .expect("args parse");
    assert_eq!(args.config, PathBuf::from("build/shaker.json"));
    assert_eq!(args.entries, vec!["main.js"]);
    assert_eq!(args.out_dir, Some(PathBuf::from("out")));
    assert!(args.no_treeshake);
    assert!(args.json);
    assert!(args.no_color);
}

#[test]
fn config_is_required() {
    let err = CliArgs::try_parse_from(["shaker", "--json"]).expect_err("missing --config");
    assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
}
