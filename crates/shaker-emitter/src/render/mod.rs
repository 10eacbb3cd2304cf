//! Text emission for the included nodes of a module.
//!
//! Rendering edits a module's original text in place through a
//! [`SourceEditor`]: excluded statements are cut out, surviving nodes are
//! rewritten where the output needs something different (final names,
//! collapsed branches, export syntax, module-format idioms) and everything
//! else is left byte for byte.
//!
//! Node handlers are split across files by node family:
//! - `statements.rs`: statement lists, `if`, `switch` cases, variable
//!   declarations
//! - `expressions.rs`: identifiers, namespace members, collapsing
//!   expressions, live export bindings
//! - `modules.rs`: export declarations, dynamic imports, namespace objects

mod expressions;
mod modules;
mod statements;

pub use modules::namespace_block;

use rustc_hash::FxHashMap;
use shaker_ast::{NodeIndex, NodeKind};
use shaker_binder::{ModuleGraph, ModuleId, VariableId};
use shaker_common::{Name, OutputFormat};
use tracing::trace;

use crate::edit_buffer::SourceEditor;
use crate::names::ChunkNames;

/// What a resolved `import()` expression loads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DynamicImportTarget {
    /// A module rendered into the importing chunk; resolves to its namespace.
    Namespace(VariableId),
    /// Another chunk, by import path.
    Chunk(String),
    /// A module outside the build, by id.
    External(String),
}

/// Everything node rendering needs to know about the chunk being emitted.
pub struct RenderContext<'r> {
    pub graph: &'r ModuleGraph,
    pub names: &'r ChunkNames,
    pub format: OutputFormat,
    pub prefer_const: bool,
    pub freeze: bool,
    pub interop: bool,
    /// One indentation level of namespace object members.
    pub indent: &'r str,
    /// Export name of every variable the chunk owns and exports.
    pub exported: &'r FxHashMap<VariableId, Name>,
    pub dynamic_imports: &'r FxHashMap<NodeIndex, DynamicImportTarget>,
    /// Test values of `if` statements decided during inclusion.
    pub folded_tests: &'r FxHashMap<NodeIndex, bool>,
}

impl RenderContext<'_> {
    #[must_use]
    pub const fn var_or_const(&self) -> &'static str {
        if self.prefer_const { "const" } else { "var" }
    }

    /// The name to notify on assignment, for formats with live export
    /// bindings.
    fn live_export_name(&self, variable: VariableId) -> Option<&Name> {
        if !self.format.has_system_bindings() {
            return None;
        }
        self.exported.get(&self.graph.original_variable(variable))
    }
}

/// Render the included nodes of `module` into `code`, an editor over the
/// module's original text.
#[tracing::instrument(level = "trace", skip_all, fields(module = %ctx.graph.module(module).id))]
pub fn render_module<E: SourceEditor + ?Sized>(ctx: &RenderContext<'_>, module: ModuleId, code: &mut E) {
    let graph = ctx.graph;
    let data = graph.module(module);
    let mut renderer = Renderer {
        ctx,
        graph,
        source: &data.code,
        code,
    };
    if let Some(NodeKind::Program { body }) = graph.arena.kind(data.root) {
        renderer.render_statement_list(body, 0, data.code.len() as u32);
    }
    trace!("module rendered");
}

pub(crate) struct Renderer<'a, 'r, E: SourceEditor + ?Sized> {
    ctx: &'a RenderContext<'r>,
    graph: &'r ModuleGraph,
    source: &'r str,
    code: &'a mut E,
}

impl<E: SourceEditor + ?Sized> Renderer<'_, '_, E> {
    fn is_included(&self, idx: NodeIndex) -> bool {
        self.graph.arena.is_included(idx)
    }

    fn start(&self, idx: NodeIndex) -> u32 {
        self.graph.arena.span(idx).start
    }

    fn end(&self, idx: NodeIndex) -> u32 {
        self.graph.arena.span(idx).end
    }

    fn text(&self, start: u32, end: u32) -> &str {
        self.source.get(start as usize..end as usize).unwrap_or("")
    }

    fn ends_with_semicolon(&self, idx: NodeIndex) -> bool {
        self.text(self.start(idx), self.end(idx)).ends_with(';')
    }

    /// Render an included node.
    fn render(&mut self, idx: NodeIndex) {
        let graph = self.graph;
        let Some(kind) = graph.arena.kind(idx) else {
            return;
        };
        match kind {
            NodeKind::BlockStatement { body } => {
                let span = graph.arena.span(idx);
                self.render_statement_list(body, span.start + 1, span.end.saturating_sub(1));
            }
            NodeKind::SwitchCase { test, consequent } => self.render_switch_case(idx, *test, consequent),
            NodeKind::IfStatement {
                test,
                consequent,
                alternate,
            } => self.render_if(idx, *test, *consequent, *alternate),
            NodeKind::VariableDeclaration { kind, declarations } => {
                self.render_variable_declaration(idx, *kind, declarations, None);
            }
            NodeKind::ClassDeclaration(class) => {
                self.render_children(idx);
                self.render_class_export(idx, class.id);
            }
            NodeKind::ExportNamedDeclaration { declaration, .. } => {
                self.render_export_named(idx, *declaration, None);
            }
            NodeKind::ExportDefaultDeclaration { declaration } => {
                self.render_export_default(idx, *declaration, None);
            }
            NodeKind::Identifier { .. } => self.render_identifier(idx),
            NodeKind::ThisExpression => {
                if graph.is_top_level_this(idx) {
                    let span = graph.arena.span(idx);
                    self.code.overwrite(span.start, span.end, "undefined");
                }
            }
            NodeKind::MemberExpression { .. } => self.render_member(idx),
            NodeKind::Property {
                key,
                value,
                shorthand: true,
                ..
            } => self.render_shorthand_property(*key, *value),
            NodeKind::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => self.render_conditional(idx, *test, *consequent, *alternate),
            NodeKind::LogicalExpression { left, right, .. } => self.render_logical(idx, *left, *right),
            NodeKind::SequenceExpression { expressions } => self.render_sequence(expressions),
            NodeKind::AssignmentExpression { operator, left, right } => {
                self.render_children(idx);
                self.render_live_assignment(idx, operator.as_str(), *left, *right);
            }
            NodeKind::UpdateExpression {
                operator,
                prefix,
                argument,
            } => self.render_update(idx, operator.as_str(), *prefix, *argument),
            NodeKind::TemplateLiteral { .. } => {
                let span = graph.arena.span(idx);
                self.code.exclude_from_indent(span.start, span.end);
                self.render_children(idx);
            }
            NodeKind::ImportExpression { source } => self.render_dynamic_import(idx, *source),
            _ => self.render_children(idx),
        }
    }

    fn render_children(&mut self, idx: NodeIndex) {
        for child in self.graph.arena.children(idx) {
            if self.is_included(child) {
                self.render(child);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/render.rs"]
mod tests;
