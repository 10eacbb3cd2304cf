//! Fixture inputs for whole-build tests.

#![allow(dead_code)]

#[path = "../../crates/shaker-analysis/tests/support/mod.rs"]
mod graph;

pub use graph::input;

use shaker::{BuildOptions, BuildOutput, ModuleInput, build};

/// Inputs for `keys`, each resolving relative imports to the others.
pub fn inputs(keys: &[&str]) -> Vec<ModuleInput> {
    keys.iter().map(|key| input(key, keys)).collect()
}

/// Build `keys` with `entries` as the entry modules.
pub fn build_fixtures(keys: &[&str], entries: &[&str], options: BuildOptions) -> BuildOutput {
    let options = BuildOptions {
        entries: entries.iter().map(ToString::to_string).collect(),
        ..options
    };
    build(inputs(keys), options).expect("fixtures build")
}

/// The code of the only chunk of a single-entry build.
pub fn single(keys: &[&str], options: BuildOptions) -> String {
    let output = build_fixtures(keys, &keys[..1], options);
    assert_eq!(output.chunks.len(), 1, "expected one chunk");
    output.chunks[0].code.clone()
}
