use super::FinaliseContext;
use super::shared::{ES_MODULE_MARKER, export_block, interop_block};
use crate::chunk::ExportMode;
use crate::edit_buffer::BundleBuffer;

pub(super) fn finalise(bundle: &mut BundleBuffer<'_>, ctx: &FinaliseContext<'_>) {
    let dependencies = &ctx.declarations.dependencies;
    let mut ids: Vec<String> = dependencies.iter().map(|d| format!("'{}'", d.id)).collect();
    let mut params: Vec<&str> = dependencies.iter().map(|d| d.name.as_str()).collect();
    if ctx.export_mode == ExportMode::Named {
        ids.insert(0, String::from("'exports'"));
        params.insert(0, "exports");
    }
    let ids = if ids.is_empty() {
        String::new()
    } else {
        format!("[{}], ", ids.join(", "))
    };
    let use_strict = if ctx.strict { " 'use strict';" } else { "" };
    let wrapper_start = format!("define({ids}function ({}) {{{use_strict}\n\n", params.join(", "));

    let interop = interop_block(ctx);
    if !interop.is_empty() {
        bundle.prepend(&format!("{interop}\n\n"));
    }
    if !ctx.intro.is_empty() {
        bundle.prepend(&ctx.intro);
    }
    let exports = export_block(ctx, "return");
    if !exports.is_empty() {
        bundle.append(&format!("\n\n{exports}"));
    }
    if ctx.export_mode == ExportMode::Named && ctx.is_entry_facade {
        bundle.append(&format!("\n\n{ES_MODULE_MARKER}"));
    }
    if !ctx.outro.is_empty() {
        bundle.append(&ctx.outro);
    }
    bundle.indent(ctx.indent);
    bundle.append("\n\n});");
    bundle.prepend(&wrapper_start);
}
