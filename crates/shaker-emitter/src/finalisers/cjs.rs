use super::FinaliseContext;
use super::shared::{ES_MODULE_MARKER, export_block};
use crate::chunk::{DependencyDeclaration, ExportMode};
use crate::edit_buffer::BundleBuffer;

const INTEROP_DEFAULT: &str = "function _interopDefault (ex) { return (ex && (typeof ex === 'object') && 'default' in ex) ? ex['default'] : ex; }";

/// The `require` line of one dependency; the flag is set when it calls
/// `_interopDefault`.
fn require_line(dependency: &DependencyDeclaration, ctx: &FinaliseContext<'_>) -> (String, bool) {
    let DependencyDeclaration { id, name, .. } = dependency;
    let declare = ctx.var_or_const;
    if dependency.imports.is_empty() && dependency.reexports.is_empty() {
        return (format!("require('{id}');"), false);
    }
    if dependency.is_chunk || !dependency.exports_default {
        return (format!("{declare} {name} = require('{id}');"), false);
    }
    match (ctx.interop, dependency.exports_names) {
        (true, true) => (
            format!("{declare} {name} = require('{id}');\n{declare} {name}__default = _interopDefault({name});"),
            true,
        ),
        (true, false) => (format!("{declare} {name} = _interopDefault(require('{id}'));"), true),
        (false, true) => (
            format!("{declare} {name} = require('{id}');\n{declare} {name}__default = {name}['default'];"),
            false,
        ),
        (false, false) => (format!("{declare} {name} = require('{id}');"), false),
    }
}

pub(super) fn finalise(bundle: &mut BundleBuffer<'_>, ctx: &FinaliseContext<'_>) {
    let mut intro = if ctx.strict {
        format!("'use strict';\n\n{}", ctx.intro)
    } else {
        ctx.intro.clone()
    };
    if ctx.export_mode == ExportMode::Named && ctx.is_entry_facade {
        intro.push_str(ES_MODULE_MARKER);
        intro.push_str("\n\n");
    }

    let mut needs_interop = false;
    let mut requires = Vec::new();
    for dependency in &ctx.declarations.dependencies {
        let (line, interop) = require_line(dependency, ctx);
        needs_interop |= interop;
        requires.push(line);
    }
    if needs_interop {
        intro.push_str(INTEROP_DEFAULT);
        intro.push_str("\n\n");
    }
    if !requires.is_empty() {
        intro.push_str(&requires.join("\n"));
        intro.push_str("\n\n");
    }

    bundle.prepend(&intro);
    let exports = export_block(ctx, "module.exports =");
    if !exports.is_empty() {
        bundle.append(&format!("\n\n{exports}"));
    }
    if !ctx.outro.is_empty() {
        bundle.append(&ctx.outro);
    }
}
