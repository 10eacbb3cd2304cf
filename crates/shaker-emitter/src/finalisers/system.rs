use indexmap::IndexSet;

use super::FinaliseContext;
use crate::chunk::DependencyDeclaration;
use crate::edit_buffer::BundleBuffer;

/// Names a star re-export must not overwrite: the chunk's own exports,
/// `default` and every explicit re-export.
fn star_excludes(ctx: &FinaliseContext<'_>) -> IndexSet<String> {
    let mut excludes: IndexSet<String> = ctx
        .declarations
        .exports
        .iter()
        .map(|e| e.exported.to_string())
        .collect();
    excludes.insert(String::from("default"));
    for dependency in &ctx.declarations.dependencies {
        for reexport in &dependency.reexports {
            if &*reexport.imported != "*" {
                excludes.insert(reexport.reexported.to_string());
            }
        }
    }
    excludes
}

/// Statements of one dependency's setter, which runs whenever the
/// dependency's bindings change.
fn setter(
    dependency: &DependencyDeclaration,
    ctx: &FinaliseContext<'_>,
    bindings: &mut Vec<String>,
    needs_excludes: &mut bool,
) -> Vec<String> {
    let mut lines = Vec::new();
    for import in &dependency.imports {
        bindings.push(import.local.clone());
        if &*import.imported == "*" {
            lines.push(format!("{} = module;", import.local));
        } else {
            lines.push(format!("{} = module.{};", import.local, import.imported));
        }
    }
    let reexports = &dependency.reexports;
    let bulk = reexports.len() > 1
        || reexports
            .first()
            .is_some_and(|r| &*r.reexported == "*" || &*r.imported == "*");
    if !bulk {
        for reexport in reexports {
            lines.push(format!(
                "exports('{}', module.{});",
                reexport.reexported, reexport.imported
            ));
        }
        return lines;
    }

    let mut created = false;
    let mut open_setter = |lines: &mut Vec<String>| {
        if !created {
            lines.push(format!("{} _setter = {{}};", ctx.var_or_const));
            created = true;
        }
    };
    for _ in reexports.iter().filter(|r| &*r.reexported == "*") {
        *needs_excludes = true;
        open_setter(&mut lines);
        lines.push(String::from("for (var _$p in module) {"));
        lines.push(format!("{}if (!_starExcludes[_$p]) _setter[_$p] = module[_$p];", ctx.indent));
        lines.push(String::from("}"));
    }
    for reexport in reexports {
        if &*reexport.imported == "*" && &*reexport.reexported != "*" {
            lines.push(format!("exports('{}', module);", reexport.reexported));
        }
    }
    for reexport in reexports {
        if &*reexport.imported != "*" && &*reexport.reexported != "*" {
            open_setter(&mut lines);
            lines.push(format!("_setter.{} = module.{};", reexport.reexported, reexport.imported));
        }
    }
    if created {
        lines.push(String::from("exports(_setter);"));
    }
    lines
}

pub(super) fn finalise(bundle: &mut BundleBuffer<'_>, ctx: &FinaliseContext<'_>) {
    let indent = ctx.indent;
    let body_indent = indent.repeat(3);
    let dependencies = &ctx.declarations.dependencies;
    let ids: Vec<String> = dependencies.iter().map(|d| format!("'{}'", d.id)).collect();

    let mut bindings = Vec::new();
    let mut needs_excludes = false;
    let setters: Vec<String> = dependencies
        .iter()
        .map(|dependency| {
            let lines = setter(dependency, ctx, &mut bindings, &mut needs_excludes);
            if lines.is_empty() {
                String::from("function () {}")
            } else {
                format!(
                    "function (module) {{\n{body_indent}{}\n{indent}{indent}}}",
                    lines.join(&format!("\n{body_indent}"))
                )
            }
        })
        .collect();

    let mut header = format!("System.register([{}], function (exports, module) {{\n{indent}'use strict';", ids.join(", "));
    if needs_excludes {
        let excludes = star_excludes(ctx);
        let entries = excludes.iter().map(|name| format!("{name}: 1")).collect::<Vec<_>>();
        header.push_str(&format!("\n{indent}{} _starExcludes = {{ {} }};", ctx.var_or_const, entries.join(", ")));
    }
    if !bindings.is_empty() {
        header.push_str(&format!("\n{indent}var {};", bindings.join(", ")));
    }
    header.push_str(&format!("\n{indent}return {{"));
    if !setters.is_empty() {
        header.push_str(&format!("\n{indent}{indent}setters: [{}],", setters.join(", ")));
    }
    header.push_str(&format!("\n{indent}{indent}execute: function () {{\n\n"));
    let hoisted: Vec<String> = ctx
        .declarations
        .exports
        .iter()
        .filter(|e| e.hoisted)
        .map(|e| format!("exports('{}', {});", e.exported, e.local))
        .collect();
    if !hoisted.is_empty() {
        header.push_str(&format!("{body_indent}{}\n\n", hoisted.join(&format!("\n{body_indent}"))));
    }

    if !ctx.intro.is_empty() {
        bundle.prepend(&ctx.intro);
    }
    if !ctx.outro.is_empty() {
        bundle.append(&ctx.outro);
    }
    bundle.indent(&body_indent);
    bundle.append(&format!("\n\n{indent}{indent}}}\n{indent}}};\n}});"));
    bundle.prepend(&header);
}
