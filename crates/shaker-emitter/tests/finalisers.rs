use super::*;
use crate::chunk::{DependencyDeclaration, ExportDeclaration, ImportSpecifier, ReexportSpecifier};
use crate::edit_buffer::EditBuffer;
use shaker_common::Name;

fn import(imported: &str, local: &str) -> ImportSpecifier {
    ImportSpecifier {
        local: local.to_string(),
        imported: Name::from(imported),
    }
}

fn reexport(imported: &str, reexported: &str) -> ReexportSpecifier {
    ReexportSpecifier {
        imported: Name::from(imported),
        reexported: Name::from(reexported),
    }
}

fn export(local: &str, exported: &str, hoisted: bool) -> ExportDeclaration {
    ExportDeclaration {
        local: local.to_string(),
        exported: Name::from(exported),
        hoisted,
    }
}

fn external(id: &str, imports: Vec<ImportSpecifier>, reexports: Vec<ReexportSpecifier>) -> DependencyDeclaration {
    let exports_default = imports.iter().any(|s| &*s.imported == "default")
        || reexports.iter().any(|s| &*s.imported == "default");
    let exports_names = imports.iter().any(|s| &*s.imported != "default")
        || reexports.iter().any(|s| &*s.imported != "default");
    DependencyDeclaration {
        id: id.to_string(),
        name: id.to_string(),
        is_chunk: false,
        imports,
        reexports,
        exports_default,
        exports_names,
    }
}

fn context(declarations: &ModuleDeclarations, export_mode: ExportMode) -> FinaliseContext<'_> {
    FinaliseContext {
        declarations,
        export_mode,
        indent: "\t",
        intro: String::new(),
        outro: String::new(),
        is_entry_facade: true,
        interop: true,
        strict: true,
        var_or_const: "var",
    }
}

fn run(format: OutputFormat, body: &str, ctx: &FinaliseContext<'_>) -> String {
    let mut bundle = BundleBuffer::new("\n\n");
    bundle.add_source(EditBuffer::from_string(body.to_string()));
    finalise(format, &mut bundle, ctx);
    bundle.to_string()
}

#[test]
fn es_imports_and_exports() {
    let declarations = ModuleDeclarations {
        dependencies: vec![
            external("path", vec![import("default", "path"), import("join", "join")], Vec::new()),
            external("fs", vec![import("*", "fs")], Vec::new()),
            external("polyfill", Vec::new(), Vec::new()),
        ],
        exports: vec![export("sep", "sep", false), export("main", "default", true)],
    };
    let ctx = context(&declarations, ExportMode::Named);
    assert_eq!(
        run(OutputFormat::Es, "const sep = join(path.sep, fs);", &ctx),
        "import path, { join } from 'path';\n\
         import * as fs from 'fs';\n\
         import 'polyfill';\n\
         \n\
         const sep = join(path.sep, fs);\n\
         \n\
         export default main;\n\
         export { sep };"
    );
}

#[test]
fn es_reexports() {
    let declarations = ModuleDeclarations {
        dependencies: vec![
            external("events", Vec::new(), vec![reexport("*", "*")]),
            external("path", Vec::new(), vec![reexport("join", "joinPath"), reexport("sep", "sep")]),
            external("fs", Vec::new(), vec![reexport("*", "files")]),
        ],
        exports: vec![export("own", "own", false)],
    };
    let ctx = context(&declarations, ExportMode::Named);
    assert_eq!(
        run(OutputFormat::Es, "const own = 1;", &ctx),
        "export * from 'events';\n\
         export { join as joinPath, sep } from 'path';\n\
         import * as fs from 'fs';\n\
         export { fs as files };\n\
         \n\
         const own = 1;\n\
         \n\
         export { own };"
    );
}

#[test]
fn cjs_requires_with_interop() {
    let declarations = ModuleDeclarations {
        dependencies: vec![
            external("path", vec![import("default", "path__default"), import("join", "path.join")], Vec::new()),
            external("fs", vec![import("*", "fs")], Vec::new()),
            external("chalk", vec![import("default", "chalk")], Vec::new()),
            external("polyfill", Vec::new(), Vec::new()),
        ],
        exports: vec![export("sep", "sep", false), export("exports.count", "count", false)],
    };
    let ctx = context(&declarations, ExportMode::Named);
    assert_eq!(
        run(OutputFormat::Cjs, "const sep = 1;", &ctx),
        "'use strict';\n\
         \n\
         Object.defineProperty(exports, '__esModule', { value: true });\n\
         \n\
         function _interopDefault (ex) { return (ex && (typeof ex === 'object') && 'default' in ex) ? ex['default'] : ex; }\n\
         \n\
         var path = require('path');\n\
         var path__default = _interopDefault(path);\n\
         var fs = require('fs');\n\
         var chalk = _interopDefault(require('chalk'));\n\
         require('polyfill');\n\
         \n\
         const sep = 1;\n\
         \n\
         exports.sep = sep;"
    );
}

#[test]
fn cjs_default_mode_without_interop_or_strict() {
    let declarations = ModuleDeclarations {
        dependencies: vec![external("chalk", vec![import("default", "chalk")], Vec::new())],
        exports: vec![export("main", "default", true)],
    };
    let mut ctx = context(&declarations, ExportMode::Default);
    ctx.interop = false;
    ctx.strict = false;
    assert_eq!(
        run(OutputFormat::Cjs, "function main () {}", &ctx),
        "var chalk = require('chalk');\n\nfunction main () {}\n\nmodule.exports = main;"
    );
}

#[test]
fn cjs_star_reexports_come_first() {
    let declarations = ModuleDeclarations {
        dependencies: vec![
            external("path", Vec::new(), vec![reexport("join", "joinPath")]),
            external("events", Vec::new(), vec![reexport("*", "*")]),
        ],
        exports: vec![export("own", "own", false)],
    };
    let ctx = context(&declarations, ExportMode::Named);
    let code = run(OutputFormat::Cjs, "const own = 1;", &ctx);
    assert!(code.ends_with(
        "const own = 1;\n\n\
         Object.keys(events).forEach(function (key) { exports[key] = events[key]; });\n\
         exports.joinPath = path.join;\n\
         exports.own = own;"
    ), "{code}");
}

#[test]
fn amd_wraps_and_indents_the_body() {
    let declarations = ModuleDeclarations {
        dependencies: vec![
            external("path", vec![import("default", "path__default"), import("join", "path.join")], Vec::new()),
            external("chalk", vec![import("default", "chalk")], Vec::new()),
        ],
        exports: vec![export("sep", "sep", false)],
    };
    let ctx = context(&declarations, ExportMode::Named);
    assert_eq!(
        run(OutputFormat::Amd, "const sep = 1;\nif (sep) {\n\tgo();\n}", &ctx),
        "define(['exports', 'path', 'chalk'], function (exports, path, chalk) { 'use strict';\n\
         \n\
         \tvar path__default = 'default' in path ? path['default'] : path;\n\
         \tchalk = chalk && chalk.hasOwnProperty('default') ? chalk['default'] : chalk;\n\
         \n\
         \tconst sep = 1;\n\
         \tif (sep) {\n\
         \t\tgo();\n\
         \t}\n\
         \n\
         \texports.sep = sep;\n\
         \n\
         \tObject.defineProperty(exports, '__esModule', { value: true });\n\
         \n\
         });"
    );
}

#[test]
fn amd_default_mode_returns_the_value() {
    let declarations = ModuleDeclarations {
        dependencies: Vec::new(),
        exports: vec![export("main", "default", true)],
    };
    let mut ctx = context(&declarations, ExportMode::Default);
    ctx.intro = String::from("// intro\n\n");
    assert_eq!(
        run(OutputFormat::Amd, "function main () {}", &ctx),
        "define(function () { 'use strict';\n\n\t// intro\n\n\tfunction main () {}\n\n\treturn main;\n\n});"
    );
}

#[test]
fn system_setters_and_hoisted_exports() {
    let declarations = ModuleDeclarations {
        dependencies: vec![
            external("path", vec![import("join", "join")], Vec::new()),
            external("polyfill", Vec::new(), Vec::new()),
        ],
        exports: vec![export("run", "run", true), export("count", "count", false)],
    };
    let ctx = context(&declarations, ExportMode::Named);
    assert_eq!(
        run(OutputFormat::System, "function run () {}\nlet count = exports('count', 0);", &ctx),
        "System.register(['path', 'polyfill'], function (exports, module) {\n\
         \t'use strict';\n\
         \tvar join;\n\
         \treturn {\n\
         \t\tsetters: [function (module) {\n\
         \t\t\tjoin = module.join;\n\
         \t\t}, function () {}],\n\
         \t\texecute: function () {\n\
         \n\
         \t\t\texports('run', run);\n\
         \n\
         \t\t\tfunction run () {}\n\
         \t\t\tlet count = exports('count', 0);\n\
         \n\
         \t\t}\n\
         \t};\n\
         });"
    );
}

#[test]
fn system_star_reexports_skip_explicit_names() {
    let declarations = ModuleDeclarations {
        dependencies: vec![
            external("events", Vec::new(), vec![reexport("*", "*")]),
            external("path", Vec::new(), vec![reexport("join", "joinPath")]),
        ],
        exports: vec![export("own", "own", false)],
    };
    let ctx = context(&declarations, ExportMode::Named);
    let code = run(OutputFormat::System, "const own = exports('own', 1);", &ctx);
    assert!(code.contains("\tvar _starExcludes = { own: 1, default: 1, joinPath: 1 };\n"), "{code}");
    assert!(code.contains(
        "function (module) {\n\
         \t\t\tvar _setter = {};\n\
         \t\t\tfor (var _$p in module) {\n\
         \t\t\t\tif (!_starExcludes[_$p]) _setter[_$p] = module[_$p];\n\
         \t\t\t}\n\
         \t\t\texports(_setter);\n\
         \t\t}"
    ), "{code}");
    assert!(code.contains("exports('joinPath', module.join);"), "{code}");
}
