use memchr::{memchr, memmem};
use shaker_ast::{NodeIndex, NodeKind, VariableKind};

use super::Renderer;
use crate::edit_buffer::SourceEditor;

/// Offset just past the first line break of `text` that is not inside a
/// block comment; a line comment before it stops the search. Zero when
/// there is no such line break.
pub(crate) fn line_break_boundary(text: &str) -> u32 {
    let bytes = text.as_bytes();
    let Some(mut line_break) = memchr(b'\n', bytes) else {
        return 0;
    };
    let mut from = 0;
    loop {
        let Some(slash) = memchr(b'/', &bytes[from..]).map(|i| from + i) else {
            return line_break as u32 + 1;
        };
        if slash > line_break {
            return line_break as u32 + 1;
        }
        match bytes.get(slash + 1) {
            Some(b'/') => return line_break as u32 + 1,
            Some(b'*') => {
                let Some(close) = memmem::find(&bytes[slash + 2..], b"*/") else {
                    return line_break as u32 + 1;
                };
                from = slash + 2 + close + 2;
                if from > line_break {
                    match memchr(b'\n', &bytes[from..]) {
                        Some(i) => line_break = from + i,
                        None => return 0,
                    }
                }
            }
            _ => from = slash + 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Declarator {
    Removed,
    Declared,
    /// Written as an assignment to the `exports` object.
    Assigned,
}

impl<E: SourceEditor + ?Sized> Renderer<'_, '_, E> {
    /// Render `statements`, cutting every excluded one out together with
    /// the lines that belong to it. `start..end` is the text the list spans.
    pub(super) fn render_statement_list(&mut self, statements: &[NodeIndex], start: u32, end: u32) {
        let Some(&first) = statements.first() else {
            return;
        };
        let mut next_start = start + line_break_boundary(self.text(start, self.start(first)));
        for (i, &statement) in statements.iter().enumerate() {
            let current_start = next_start;
            let current_end = self.end(statement);
            let following = statements.get(i + 1).map_or(end, |&next| self.start(next));
            next_start = current_end + line_break_boundary(self.text(current_end, following));
            if self.is_included(statement) {
                self.render_statement(statement, current_start, next_start);
            } else {
                self.code.remove(current_start, next_start);
            }
        }
    }

    /// Statements that may vanish entirely get their list region so that
    /// no blank lines are left behind.
    fn render_statement(&mut self, idx: NodeIndex, start: u32, end: u32) {
        let graph = self.graph;
        match graph.arena.kind(idx) {
            Some(NodeKind::VariableDeclaration { kind, declarations }) => {
                self.render_variable_declaration(idx, *kind, declarations, Some((start, end)));
            }
            Some(NodeKind::ExportNamedDeclaration { declaration, .. }) => {
                self.render_export_named(idx, *declaration, Some((start, end)));
            }
            Some(NodeKind::ExportDefaultDeclaration { declaration }) => {
                self.render_export_default(idx, *declaration, Some((start, end)));
            }
            _ => self.render(idx),
        }
    }

    pub(super) fn render_if(
        &mut self,
        idx: NodeIndex,
        test: NodeIndex,
        consequent: NodeIndex,
        alternate: NodeIndex,
    ) {
        let folded = self.ctx.folded_tests.get(&idx).copied();
        if !self.is_included(test)
            && let Some(truthy) = folded
        {
            let (retained, dropped) = if truthy {
                (consequent, alternate)
            } else {
                (alternate, consequent)
            };
            if self.is_included(retained) && !self.is_included(dropped) {
                self.code.remove(self.start(idx), self.start(retained));
                self.code.remove(self.end(retained), self.end(idx));
                self.render(retained);
                return;
            }
        }

        if self.is_included(test) {
            self.render(test);
        } else {
            let value = if folded == Some(false) { "false" } else { "true" };
            self.code.overwrite(self.start(test), self.end(test), value);
        }
        if self.is_included(consequent) {
            self.render(consequent);
        } else {
            self.code.overwrite(self.start(consequent), self.end(consequent), ";");
        }
        if alternate.is_some() {
            if self.is_included(alternate) {
                self.render(alternate);
            } else {
                self.code.remove(self.end(consequent), self.end(alternate));
            }
        }
    }

    pub(super) fn render_switch_case(&mut self, idx: NodeIndex, test: NodeIndex, consequent: &[NodeIndex]) {
        if self.is_included(test) {
            self.render(test);
        }
        let colon_from = if test.is_some() { self.end(test) } else { self.start(idx) };
        let body_start = self
            .text(colon_from, self.end(idx))
            .find(':')
            .map_or(colon_from, |i| colon_from + i as u32 + 1);
        self.render_statement_list(consequent, body_start, self.end(idx));
    }

    fn is_for_head(&self, idx: NodeIndex) -> bool {
        let arena = &self.graph.arena;
        match arena.kind(arena.parent(idx)) {
            Some(NodeKind::ForStatement { init, .. }) => *init == idx,
            Some(NodeKind::ForInStatement { left, .. } | NodeKind::ForOfStatement { left, .. }) => *left == idx,
            _ => false,
        }
    }

    fn declarator_state(&self, declarator: NodeIndex) -> Declarator {
        if !self.is_included(declarator) {
            return Declarator::Removed;
        }
        let Some(NodeKind::VariableDeclarator { id, init }) = self.graph.arena.kind(declarator) else {
            return Declarator::Removed;
        };
        let exports_member = self
            .graph
            .reference(*id)
            .is_some_and(|variable| self.ctx.names.is_exports_member(self.graph, variable));
        match (exports_member, init.is_some()) {
            (false, _) => Declarator::Declared,
            (true, true) => Declarator::Assigned,
            (true, false) => Declarator::Removed,
        }
    }

    /// Bindings of a declarator that carry a live export, with their
    /// export names.
    fn live_bindings(&self, declarator: NodeIndex) -> Vec<(NodeIndex, String)> {
        let Some(NodeKind::VariableDeclarator { id, init }) = self.graph.arena.kind(declarator) else {
            return Vec::new();
        };
        if init.is_none() || !self.ctx.format.has_system_bindings() {
            return Vec::new();
        }
        let mut identifiers = Vec::new();
        self.graph.arena.collect_binding_identifiers(*id, &mut identifiers);
        identifiers
            .into_iter()
            .filter_map(|identifier| {
                let variable = self.graph.reference(identifier)?;
                let export = self.ctx.live_export_name(variable)?;
                Some((identifier, export.to_string()))
            })
            .collect()
    }

    /// Render a `var`/`let`/`const` declaration. Excluded declarators are
    /// cut out, declarators written to `exports` become separate assignment
    /// statements, and the declaration disappears when nothing survives.
    pub(super) fn render_variable_declaration(
        &mut self,
        idx: NodeIndex,
        kind: VariableKind,
        declarations: &[NodeIndex],
        boundaries: Option<(u32, u32)>,
    ) {
        if self.is_for_head(idx) {
            for &declarator in declarations {
                if self.is_included(declarator) {
                    self.render(declarator);
                }
            }
            return;
        }

        let states: Vec<Declarator> = declarations.iter().map(|&d| self.declarator_state(d)).collect();
        let live: Vec<Vec<(NodeIndex, String)>> = declarations.iter().map(|&d| self.live_bindings(d)).collect();
        let span = self.graph.arena.span(idx);
        let has_semicolon = self.ends_with_semicolon(idx);

        if states.iter().all(|s| *s == Declarator::Declared) && live.iter().all(Vec::is_empty) {
            for &declarator in declarations {
                self.render(declarator);
            }
            if !has_semicolon {
                self.code.append_left(span.end, ";");
            }
            return;
        }

        let kept: Vec<usize> = (0..declarations.len())
            .filter(|&i| states[i] != Declarator::Removed)
            .collect();
        let (Some(&first), Some(&last)) = (kept.first(), kept.last()) else {
            let (start, end) = boundaries.unwrap_or((span.start, span.end));
            self.code.remove(start, end);
            return;
        };

        let keyword = format!("{} ", kind.as_str());
        if first != 0 || states[first] == Declarator::Assigned {
            let first_start = self.start(declarations[first]);
            self.code.remove(span.start, first_start);
            if states[first] == Declarator::Declared {
                self.code.append_left(first_start, &keyword);
            }
        }
        for pair in kept.windows(2) {
            let (previous, next) = (pair[0], pair[1]);
            let both_declared = states[previous] == Declarator::Declared && states[next] == Declarator::Declared;
            if both_declared && next == previous + 1 {
                continue;
            }
            let separator = match states[next] {
                Declarator::Declared if both_declared => String::from(", "),
                Declarator::Declared => format!("; {keyword}"),
                _ => String::from("; "),
            };
            let next_start = self.start(declarations[next]);
            self.code.remove(self.end(declarations[previous]), next_start);
            self.code.append_left(next_start, &separator);
        }
        if last != declarations.len() - 1 {
            let content_end = if has_semicolon { span.end - 1 } else { span.end };
            self.code.remove(self.end(declarations[last]), content_end);
        }

        for &i in &kept {
            self.render(declarations[i]);
        }
        if !has_semicolon {
            self.code.append_left(span.end, ";");
        }
        for &i in &kept {
            self.render_live_declarator(declarations[i], &live[i], span.end);
        }
    }

    /// `var x = exports('x', value)`; destructured bindings are reported
    /// after the statement.
    fn render_live_declarator(&mut self, declarator: NodeIndex, bindings: &[(NodeIndex, String)], statement_end: u32) {
        let Some(NodeKind::VariableDeclarator { id, init }) = self.graph.arena.kind(declarator) else {
            return;
        };
        let simple = matches!(self.graph.arena.kind(*id), Some(NodeKind::Identifier { .. }));
        for (identifier, export) in bindings {
            if simple {
                self.code.prepend_right(self.start(*init), &format!("exports('{export}', "));
                self.code.append_left(self.end(*init), ")");
            } else {
                let name = self.text(self.start(*identifier), self.end(*identifier)).to_string();
                let local = self
                    .graph
                    .reference(*identifier)
                    .map_or(name, |variable| self.ctx.names.name_of(self.graph, variable).to_string());
                self.code.append_left(statement_end, &format!(" exports('{export}', {local});"));
            }
        }
    }
}
