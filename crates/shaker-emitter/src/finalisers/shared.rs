use super::FinaliseContext;
use crate::chunk::{DependencyDeclaration, ExportMode};

pub(super) const ES_MODULE_MARKER: &str = "Object.defineProperty(exports, '__esModule', { value: true });";

/// Local name of an external module's default export, as named by the
/// require or interop lines.
fn external_default(dependency: &DependencyDeclaration) -> String {
    if dependency.exports_names {
        format!("{}__default", dependency.name)
    } else {
        dependency.name.clone()
    }
}

/// The value of a chunk exporting only its default: its local binding, or
/// a default re-exported from a dependency.
fn default_value(ctx: &FinaliseContext<'_>) -> Option<String> {
    let declarations = ctx.declarations;
    if let Some(export) = declarations.exports.iter().find(|e| &*e.exported == "default") {
        return Some(export.local.clone());
    }
    declarations.dependencies.iter().find_map(|dependency| {
        let reexport = dependency.reexports.iter().find(|r| &*r.reexported == "default")?;
        Some(match (&*reexport.imported, dependency.is_chunk) {
            ("default", false) => external_default(dependency),
            ("*", _) => dependency.name.clone(),
            (imported, _) => format!("{}.{imported}", dependency.name),
        })
    })
}

/// Export statements of the CommonJS and AMD formats: `mechanism value;`
/// in default mode, assignments to `exports` otherwise. Star re-exports
/// come first so explicit exports take precedence.
pub(super) fn export_block(ctx: &FinaliseContext<'_>, mechanism: &str) -> String {
    if ctx.export_mode == ExportMode::Default {
        return default_value(ctx).map_or_else(String::new, |value| format!("{mechanism} {value};"));
    }
    let mut lines = Vec::new();
    for dependency in &ctx.declarations.dependencies {
        if dependency.reexports.iter().any(|r| &*r.reexported == "*") {
            lines.push(format!(
                "Object.keys({name}).forEach(function (key) {{ exports[key] = {name}[key]; }});",
                name = dependency.name
            ));
        }
    }
    for dependency in &ctx.declarations.dependencies {
        for reexport in &dependency.reexports {
            let value = match &*reexport.imported {
                _ if &*reexport.reexported == "*" => continue,
                "default" if !dependency.is_chunk => external_default(dependency),
                "*" => dependency.name.clone(),
                imported => format!("{}.{imported}", dependency.name),
            };
            lines.push(format!("exports.{} = {value};", reexport.reexported));
        }
    }
    for export in &ctx.declarations.exports {
        let target = format!("exports.{}", export.exported);
        if target != export.local {
            lines.push(format!("{target} = {};", export.local));
        }
    }
    lines.join("\n")
}

/// `foo__default` bindings for external default imports, for formats whose
/// loaders hand over the raw module object.
pub(super) fn interop_block(ctx: &FinaliseContext<'_>) -> String {
    ctx.declarations
        .dependencies
        .iter()
        .filter(|dependency| dependency.exports_default && !dependency.is_chunk)
        .map(|dependency| {
            let name = &dependency.name;
            match (ctx.interop, dependency.exports_names) {
                (true, true) => format!(
                    "{} {name}__default = 'default' in {name} ? {name}['default'] : {name};",
                    ctx.var_or_const
                ),
                (true, false) => {
                    format!("{name} = {name} && {name}.hasOwnProperty('default') ? {name}['default'] : {name};")
                }
                (false, true) => format!("{} {name}__default = {name}['default'];", ctx.var_or_const),
                (false, false) => String::new(),
            }
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
