use super::FinaliseContext;
use crate::chunk::{DependencyDeclaration, ExportDeclaration, ImportSpecifier, ReexportSpecifier};
use crate::edit_buffer::BundleBuffer;

fn import_lines(dependency: &DependencyDeclaration) -> Vec<String> {
    let id = &dependency.id;
    if dependency.imports.is_empty() && dependency.reexports.is_empty() {
        return vec![format!("import '{id}';")];
    }
    let mut lines = Vec::new();
    let mut default: Option<&ImportSpecifier> = None;
    let mut named = Vec::new();
    for specifier in &dependency.imports {
        match &*specifier.imported {
            "*" => lines.push(format!("import * as {} from '{id}';", specifier.local)),
            "default" => default = Some(specifier),
            imported if imported == specifier.local => named.push(specifier.local.clone()),
            imported => named.push(format!("{imported} as {}", specifier.local)),
        }
    }
    match (default, named.is_empty()) {
        (Some(default), true) => lines.push(format!("import {} from '{id}';", default.local)),
        (Some(default), false) => lines.push(format!(
            "import {}, {{ {} }} from '{id}';",
            default.local,
            named.join(", ")
        )),
        (None, false) => lines.push(format!("import {{ {} }} from '{id}';", named.join(", "))),
        (None, true) => {}
    }
    lines.extend(reexport_lines(dependency));
    lines
}

fn reexport_lines(dependency: &DependencyDeclaration) -> Vec<String> {
    let id = &dependency.id;
    let mut lines = Vec::new();
    let mut named = Vec::new();
    for ReexportSpecifier { imported, reexported } in &dependency.reexports {
        match (&**imported, &**reexported) {
            ("*", "*") => lines.push(format!("export * from '{id}';")),
            ("*", reexported) => {
                let name = &dependency.name;
                let bound = dependency
                    .imports
                    .iter()
                    .any(|s| &*s.imported == "*" && s.local == *name);
                if !bound {
                    lines.push(format!("import * as {name} from '{id}';"));
                }
                if reexported == name {
                    lines.push(format!("export {{ {name} }};"));
                } else {
                    lines.push(format!("export {{ {name} as {reexported} }};"));
                }
            }
            (imported, reexported) if imported == reexported => named.push(imported.to_string()),
            (imported, reexported) => named.push(format!("{imported} as {reexported}")),
        }
    }
    if !named.is_empty() {
        lines.push(format!("export {{ {} }} from '{id}';", named.join(", ")));
    }
    lines
}

fn export_lines(exports: &[ExportDeclaration]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut named = Vec::new();
    for export in exports {
        if &*export.exported == "default" {
            lines.push(format!("export default {};", export.local));
        } else if *export.exported == *export.local {
            named.push(export.local.clone());
        } else {
            named.push(format!("{} as {}", export.local, export.exported));
        }
    }
    if !named.is_empty() {
        lines.push(format!("export {{ {} }};", named.join(", ")));
    }
    lines
}

pub(super) fn finalise(bundle: &mut BundleBuffer<'_>, ctx: &FinaliseContext<'_>) {
    let import_block = ctx
        .declarations
        .dependencies
        .iter()
        .flat_map(import_lines)
        .collect::<Vec<_>>()
        .join("\n");
    let mut intro = ctx.intro.clone();
    if !import_block.is_empty() {
        intro.push_str(&import_block);
        intro.push_str("\n\n");
    }
    if !intro.is_empty() {
        bundle.prepend(&intro);
    }
    let export_block = export_lines(&ctx.declarations.exports);
    if !export_block.is_empty() {
        bundle.append(&format!("\n\n{}", export_block.join("\n")));
    }
    if !ctx.outro.is_empty() {
        bundle.append(&ctx.outro);
    }
    bundle.trim();
}
