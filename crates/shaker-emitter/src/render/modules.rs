use shaker_ast::{NodeIndex, NodeKind};
use shaker_binder::{ModuleId, VariableId};
use shaker_common::OutputFormat;
use shaker_common::identifiers::is_legal_identifier;

use super::{DynamicImportTarget, RenderContext, Renderer};
use crate::edit_buffer::SourceEditor;

/// Left and right halves wrapped around the source of an `import()` by the
/// non-ES formats; the second pair is used for external modules when
/// interop is on.
fn dynamic_import_mechanism(format: OutputFormat, interop: bool) -> Option<(&'static str, &'static str)> {
    match (format, interop) {
        (OutputFormat::Es, _) => None,
        (OutputFormat::Cjs, false) => Some(("Promise.resolve(require(", "))")),
        (OutputFormat::Cjs, true) => Some(("Promise.resolve({ default: require(", ") })")),
        (OutputFormat::Amd, false) => Some((
            "new Promise(function (resolve, reject) { require([",
            "], resolve, reject) })",
        )),
        (OutputFormat::Amd, true) => Some((
            "new Promise(function (resolve, reject) { require([",
            "], function (m) { resolve({ default: m }) }, reject) })",
        )),
        (OutputFormat::System, _) => Some(("module.import(", ")")),
    }
}

/// Where the id of an anonymous default-exported function or class goes:
/// after the keyword, or after the `*` of a generator.
fn id_insert_position(text: &str, keyword: &str) -> Option<usize> {
    let keyword_end = text.find(keyword)? + keyword.len();
    let head = &text[keyword_end..];
    let head = head.find('{').map_or(head, |brace| &head[..brace]);
    Some(head.find('*').map_or(keyword_end, |star| keyword_end + star + 1))
}

impl<E: SourceEditor + ?Sized> Renderer<'_, '_, E> {
    /// Start of the declaration or expression after `export default`.
    fn declaration_start(&self, idx: NodeIndex) -> u32 {
        let start = self.start(idx);
        let text = self.text(start, self.end(idx));
        let after_keyword = text.find("default").map_or(0, |i| i + "default".len());
        let skipped = text[after_keyword..].len() - text[after_keyword..].trim_start().len();
        start + (after_keyword + skipped) as u32
    }

    pub(super) fn render_export_named(
        &mut self,
        idx: NodeIndex,
        declaration: NodeIndex,
        boundaries: Option<(u32, u32)>,
    ) {
        let graph = self.graph;
        let Some(kind) = graph.arena.kind(declaration) else {
            let (start, end) = boundaries.unwrap_or((self.start(idx), self.end(idx)));
            self.code.remove(start, end);
            return;
        };
        self.code.remove(self.start(idx), self.start(declaration));
        match kind {
            NodeKind::VariableDeclaration { kind, declarations } => {
                self.render_variable_declaration(declaration, *kind, declarations, boundaries);
            }
            _ => self.render(declaration),
        }
    }

    pub(super) fn render_export_default(
        &mut self,
        idx: NodeIndex,
        declaration: NodeIndex,
        boundaries: Option<(u32, u32)>,
    ) {
        let graph = self.graph;
        let default_variable = graph
            .module_of_node(idx)
            .and_then(|module| graph.module(module).default_variable);
        match graph.arena.kind(declaration) {
            Some(NodeKind::FunctionDeclaration(function)) => {
                self.render_default_declaration(idx, declaration, "function", function.id.is_none(), default_variable);
            }
            Some(NodeKind::ClassDeclaration(class)) => {
                self.render_default_declaration(idx, declaration, "class", class.id.is_none(), default_variable);
            }
            _ => self.render_default_expression(idx, declaration, default_variable, boundaries),
        }
    }

    fn render_default_declaration(
        &mut self,
        idx: NodeIndex,
        declaration: NodeIndex,
        keyword: &str,
        needs_id: bool,
        default_variable: Option<VariableId>,
    ) {
        let ctx = self.ctx;
        let declaration_start = self.declaration_start(idx);
        self.code.remove(self.start(idx), declaration_start);
        self.render(declaration);
        let (true, Some(variable)) = (needs_id, default_variable) else {
            return;
        };
        let name = ctx.names.name_of(self.graph, variable);
        let insert_at = id_insert_position(self.text(declaration_start, self.end(declaration)), keyword)
            .map(|offset| declaration_start + offset as u32);
        if let Some(position) = insert_at {
            self.code.append_left(position, &format!(" {name}"));
        }
        if keyword == "class"
            && let Some(export) = ctx.live_export_name(variable)
        {
            self.code.append_left(self.end(idx), &format!(" exports('{export}', {name});"));
        }
    }

    /// `export default <expression>` becomes `var name = <expression>;`
    /// when the default binding is used, or a plain expression statement
    /// kept for its effects.
    fn render_default_expression(
        &mut self,
        idx: NodeIndex,
        declaration: NodeIndex,
        default_variable: Option<VariableId>,
        boundaries: Option<(u32, u32)>,
    ) {
        let ctx = self.ctx;
        let graph = self.graph;
        if let Some(variable) = default_variable
            && graph.references_original(variable)
        {
            let (start, end) = boundaries.unwrap_or((self.start(idx), self.end(idx)));
            self.code.remove(start, end);
            return;
        }
        let declaration_start = self.declaration_start(idx);
        let (start, end) = (self.start(idx), self.end(idx));
        let has_semicolon = self.ends_with_semicolon(idx);
        self.render(declaration);
        match default_variable.filter(|&v| graph.variable(v).is_included()) {
            Some(variable) => {
                let name = ctx.names.name_of(graph, variable);
                let head = format!("{} {name} = ", ctx.var_or_const());
                match ctx.live_export_name(variable) {
                    Some(export) => {
                        self.code.overwrite(start, declaration_start, &format!("{head}exports('{export}', "));
                        self.code.append_left(self.end(declaration), ")");
                    }
                    None => self.code.overwrite(start, declaration_start, &head),
                }
            }
            None => self.code.remove(start, declaration_start),
        }
        if !has_semicolon {
            self.code.append_left(end, ";");
        }
    }

    /// Report an exported class to the module loader once it is defined.
    pub(super) fn render_class_export(&mut self, idx: NodeIndex, id: NodeIndex) {
        let ctx = self.ctx;
        let Some(variable) = self.graph.reference(id) else {
            return;
        };
        if let Some(export) = ctx.live_export_name(variable) {
            let name = ctx.names.name_of(self.graph, variable);
            self.code.append_left(self.end(idx), &format!(" exports('{export}', {name});"));
        }
    }

    pub(super) fn render_dynamic_import(&mut self, idx: NodeIndex, source: NodeIndex) {
        let ctx = self.ctx;
        let (start, end) = (self.start(idx), self.end(idx));
        let (source_start, source_end) = (self.start(source), self.end(source));
        let interop = match ctx.dynamic_imports.get(&idx) {
            Some(DynamicImportTarget::Namespace(namespace)) => {
                let name = ctx.names.name_of(self.graph, *namespace);
                self.code.overwrite(start, end, &format!("Promise.resolve({name})"));
                return;
            }
            Some(DynamicImportTarget::Chunk(path)) => {
                self.code.overwrite(source_start, source_end, &format!("\"{path}\""));
                false
            }
            Some(DynamicImportTarget::External(id)) => {
                self.code.overwrite(source_start, source_end, &format!("\"{id}\""));
                ctx.interop
            }
            None => {
                if self.is_included(source) {
                    self.render(source);
                }
                false
            }
        };
        if let Some((left, right)) = dynamic_import_mechanism(ctx.format, interop) {
            self.code.overwrite(start, source_start, left);
            self.code.overwrite(source_end, end, right);
        }
    }
}

/// The reified namespace object of `module`, when something uses it as a
/// value: a frozen object literal with one member per export. Members whose
/// binding is reassigned are getters so they stay live.
#[must_use]
pub fn namespace_block(ctx: &RenderContext<'_>, module: ModuleId) -> Option<String> {
    let graph = ctx.graph;
    let data = graph.module(module);
    if !graph.variable(data.namespace).is_included() {
        return None;
    }
    let members: Vec<String> = data
        .export_bindings
        .iter()
        .map(|(exported, &variable)| {
            let original = graph.original_variable(variable);
            let local = ctx.names.name_of(graph, original);
            let key = if is_legal_identifier(exported) {
                exported.to_string()
            } else {
                format!("'{exported}'")
            };
            if graph.variable(original).is_reassigned() {
                format!("{}get {key} () {{ return {local}; }}", ctx.indent)
            } else {
                format!("{}{key}: {local}", ctx.indent)
            }
        })
        .collect();
    let object = format!("{{\n{}\n}}", members.join(",\n"));
    let value = if ctx.freeze {
        format!("Object.freeze({object})")
    } else {
        object
    };
    let value = match ctx.live_export_name(data.namespace) {
        Some(export) => format!("exports('{export}', {value})"),
        None => value,
    };
    let name = ctx.names.name_of(graph, data.namespace);
    Some(format!("{} {name} = {value};", ctx.var_or_const()))
}
