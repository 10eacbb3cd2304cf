//! The same fixture bundles finalised for every output format.

mod support;

use shaker_common::OutputFormat;
use shaker_emitter::RenderOptions;
use support::{bundle, bundle_with};

const COUNTER: [&str; 1] = ["render/counter.js"];
const EXTERNALS: [&str; 1] = ["render/externals.js"];
const STAR: [&str; 1] = ["render/star.js"];

#[test]
fn cjs_writes_reassigned_exports_through_exports() {
    assert_eq!(
        bundle(&COUNTER, OutputFormat::Cjs),
        "'use strict';\n\n\
         Object.defineProperty(exports, '__esModule', { value: true });\n\n\
         exports.count = 0;\n\
         function increment() {\n  exports.count += 1;\n  exports.count++;\n}\n\n\
         exports.increment = increment;\n"
    );
}

#[test]
fn system_keeps_exported_bindings_live() {
    assert_eq!(
        bundle(&COUNTER, OutputFormat::System),
        "System.register([], function (exports, module) {\n\
         \x20 'use strict';\n\
         \x20 return {\n\
         \x20   execute: function () {\n\n\
         \x20     exports('increment', increment);\n\n\
         \x20     let count = exports('count', 0);\n\
         \x20     function increment() {\n\
         \x20       exports('count', count += 1);\n\
         \x20       (exports('count', count + 1), count++);\n\
         \x20     }\n\n\
         \x20   }\n\
         \x20 };\n\
         });\n"
    );
}

#[test]
fn es_keeps_import_statements_for_externals() {
    assert_eq!(
        bundle(&EXTERNALS, OutputFormat::Es),
        "import path, { join } from 'path';\n\
         import * as fs from 'fs';\n\
         import 'polyfill';\n\n\
         const sep = join(path.sep, fs.readFileSync);\n\n\
         export { sep };\n"
    );
}

#[test]
fn cjs_requires_externals_with_interop() {
    assert_eq!(
        bundle(&EXTERNALS, OutputFormat::Cjs),
        "'use strict';\n\n\
         Object.defineProperty(exports, '__esModule', { value: true });\n\n\
         function _interopDefault (ex) { return (ex && (typeof ex === 'object') && 'default' in ex) ? ex['default'] : ex; }\n\n\
         var path = require('path');\n\
         var path__default = _interopDefault(path);\n\
         var fs = require('fs');\n\
         require('polyfill');\n\n\
         const sep = path.join(path__default.sep, fs.readFileSync);\n\n\
         exports.sep = sep;\n"
    );
}

#[test]
fn cjs_without_interop_reads_default_directly() {
    let code = bundle_with(
        &EXTERNALS,
        RenderOptions {
            format: OutputFormat::Cjs,
            interop: false,
            strict: false,
            ..RenderOptions::default()
        },
    );
    assert!(code.starts_with("Object.defineProperty(exports, '__esModule', { value: true });"), "{code}");
    assert!(code.contains("var path = require('path');\nvar path__default = path['default'];"), "{code}");
    assert!(!code.contains("_interopDefault"));
}

#[test]
fn amd_passes_dependencies_as_parameters() {
    assert_eq!(
        bundle(&EXTERNALS, OutputFormat::Amd),
        "define(['exports', 'path', 'fs', 'polyfill'], function (exports, path, fs, polyfill) { 'use strict';\n\n\
         \tvar path__default = 'default' in path ? path['default'] : path;\n\n\
         \tconst sep = path.join(path__default.sep, fs.readFileSync);\n\n\
         \texports.sep = sep;\n\n\
         \tObject.defineProperty(exports, '__esModule', { value: true });\n\n\
         });\n"
    );
}

#[test]
fn external_ids_can_be_remapped() {
    let mut options = RenderOptions {
        format: OutputFormat::Cjs,
        ..RenderOptions::default()
    };
    options.paths.insert(String::from("fs"), String::from("node:fs"));
    let code = bundle_with(&EXTERNALS, options);
    assert!(code.contains("var fs = require('node:fs');"), "{code}");
}

#[test]
fn reexports_in_es_and_cjs() {
    assert_eq!(
        bundle(&STAR, OutputFormat::Es),
        "export * from 'events';\n\
         export { join as joinPath } from 'path';\n\n\
         const own = 1;\n\n\
         export { own };\n"
    );
    assert_eq!(
        bundle(&STAR, OutputFormat::Cjs),
        "'use strict';\n\n\
         Object.defineProperty(exports, '__esModule', { value: true });\n\n\
         var events = require('events');\n\
         var path = require('path');\n\n\
         const own = 1;\n\n\
         Object.keys(events).forEach(function (key) { exports[key] = events[key]; });\n\
         exports.joinPath = path.join;\n\
         exports.own = own;\n"
    );
}

#[test]
fn default_only_chunks_assign_module_exports() {
    assert_eq!(
        bundle(&["inclusion/default_alias.js"], OutputFormat::Cjs),
        "'use strict';\n\nconst value = 1;\n\nmodule.exports = value;\n"
    );
    assert_eq!(
        bundle(&["inclusion/default_alias.js"], OutputFormat::Amd),
        "define(function () { 'use strict';\n\n\tconst value = 1;\n\n\treturn value;\n\n});\n"
    );
}
