use shaker_ast::{NodeIndex, NodeKind};
use shaker_binder::MemberResolution;

use super::Renderer;
use crate::edit_buffer::SourceEditor;

impl<E: SourceEditor + ?Sized> Renderer<'_, '_, E> {
    pub(super) fn render_identifier(&mut self, idx: NodeIndex) {
        let ctx = self.ctx;
        let Some(variable) = self.graph.reference(idx) else {
            return;
        };
        let name = ctx.names.name_of(self.graph, variable);
        let (start, end) = (self.start(idx), self.end(idx));
        if self.text(start, end) != name {
            self.code.overwrite(start, end, name);
            self.code.add_anchor(start);
        }
    }

    /// A statically resolved namespace member renders as the binding it
    /// names, or `undefined` when the module has no such export.
    pub(super) fn render_member(&mut self, idx: NodeIndex) {
        let ctx = self.ctx;
        let replacement = match self.graph.member_resolution(idx) {
            Some(MemberResolution::Variable(variable)) => ctx.names.name_of(self.graph, variable),
            Some(MemberResolution::Missing) => "undefined",
            None => return self.render_children(idx),
        };
        let (start, end) = (self.start(idx), self.end(idx));
        self.code.overwrite(start, end, replacement);
        self.code.add_anchor(start);
    }

    /// `{ a }` becomes `{ a: a$1 }` when the binding was renamed.
    pub(super) fn render_shorthand_property(&mut self, key: NodeIndex, value: NodeIndex) {
        let graph = self.graph;
        let binding = match graph.arena.kind(value) {
            Some(NodeKind::AssignmentPattern { left, .. }) => *left,
            _ => value,
        };
        if self.is_included(value) {
            self.render(value);
        }
        let Some(variable) = graph.reference(binding) else {
            return;
        };
        let key_text = self.text(self.start(key), self.end(key)).to_string();
        if self.ctx.names.name_of(graph, variable) != key_text {
            self.code.prepend_right(self.start(key), &format!("{key_text}: "));
        }
    }

    pub(super) fn render_conditional(
        &mut self,
        idx: NodeIndex,
        test: NodeIndex,
        consequent: NodeIndex,
        alternate: NodeIndex,
    ) {
        if self.is_included(test) {
            return self.render_children(idx);
        }
        let retained = if self.is_included(consequent) { consequent } else { alternate };
        self.render_single_retained(idx, retained);
    }

    pub(super) fn render_logical(&mut self, idx: NodeIndex, left: NodeIndex, right: NodeIndex) {
        if self.is_included(left) && self.is_included(right) {
            return self.render_children(idx);
        }
        let retained = if self.is_included(left) { left } else { right };
        self.render_single_retained(idx, retained);
    }

    fn render_single_retained(&mut self, idx: NodeIndex, retained: NodeIndex) {
        self.code.remove(self.start(idx), self.start(retained));
        self.code.remove(self.end(retained), self.end(idx));
        if self.is_included(retained) {
            self.render(retained);
        }
    }

    pub(super) fn render_sequence(&mut self, expressions: &[NodeIndex]) {
        for (i, &expression) in expressions.iter().enumerate() {
            if self.is_included(expression) {
                self.render(expression);
            } else {
                let next = expressions.get(i + 1).map_or(self.end(expression), |&n| self.start(n));
                self.code.remove(self.start(expression), next);
            }
        }
    }

    /// Export name of the variable an identifier refers to, when writes to
    /// it must be reported to the module loader.
    fn live_export_of(&self, identifier: NodeIndex) -> Option<String> {
        if !matches!(self.graph.arena.kind(identifier), Some(NodeKind::Identifier { .. })) {
            return None;
        }
        let variable = self.graph.reference(identifier)?;
        self.ctx.live_export_name(variable).map(ToString::to_string)
    }

    /// `x = v` becomes `x = exports('x', v)`; compound assignments are
    /// wrapped as a whole.
    pub(super) fn render_live_assignment(&mut self, idx: NodeIndex, operator: &str, left: NodeIndex, right: NodeIndex) {
        let Some(export) = self.live_export_of(left) else {
            return;
        };
        if operator == "=" {
            let left_end = self.end(left);
            let equals = self
                .text(left_end, self.start(right))
                .find('=')
                .map_or(left_end, |i| left_end + i as u32 + 1);
            self.code.prepend_left(equals, &format!(" exports('{export}',"));
            self.code.append_left(self.end(right), ")");
        } else {
            self.code.prepend_right(self.start(idx), &format!("exports('{export}', "));
            self.code.append_left(self.end(idx), ")");
        }
    }

    /// `++x` reports the new value; `x++` reports `x + 1` and still
    /// evaluates to the old one.
    pub(super) fn render_update(&mut self, idx: NodeIndex, operator: &str, prefix: bool, argument: NodeIndex) {
        let Some(export) = self.live_export_of(argument) else {
            return self.render_children(idx);
        };
        let Some(variable) = self.graph.reference(argument) else {
            return;
        };
        let name = self.ctx.names.name_of(self.graph, variable);
        let replacement = if prefix {
            format!("exports('{export}', {operator}{name})")
        } else {
            let step = if operator == "++" { '+' } else { '-' };
            format!("(exports('{export}', {name} {step} 1), {name}{operator})")
        };
        self.code.overwrite(self.start(idx), self.end(idx), &replacement);
    }
}
