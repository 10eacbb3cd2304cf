//! Whether evaluating a node has an observable effect.

use crate::analyzer::Analyzer;
use crate::context::{AnalysisContext, CallOptions};
use crate::entity::Entity;
use shaker_ast::{NodeIndex, NodeKind, UnaryOperator};
use shaker_common::UNKNOWN_PATH;

impl Analyzer<'_> {
    /// Whether evaluating `idx` may be observable: calls with effects,
    /// throws, writes to included or global bindings, effectful reads, and
    /// control flow leaving the analysed region.
    pub fn has_effects(&self, idx: NodeIndex, ctx: &AnalysisContext) -> bool {
        let Some(kind) = self.kind(idx) else {
            return false;
        };
        match kind {
            NodeKind::EmptyStatement
            | NodeKind::Identifier { .. }
            | NodeKind::Literal { .. }
            | NodeKind::ThisExpression
            | NodeKind::Super
            | NodeKind::TemplateElement { .. }
            | NodeKind::MetaProperty { .. }
            | NodeKind::FunctionDeclaration(_)
            | NodeKind::FunctionExpression(_)
            | NodeKind::ArrowFunctionExpression(_)
            | NodeKind::ImportDeclaration { .. }
            | NodeKind::ImportSpecifier { .. }
            | NodeKind::ImportDefaultSpecifier { .. }
            | NodeKind::ImportNamespaceSpecifier { .. }
            | NodeKind::ExportSpecifier { .. }
            | NodeKind::ExportAllDeclaration { .. } => false,

            NodeKind::ThrowStatement { .. } | NodeKind::DebuggerStatement | NodeKind::ImportExpression { .. } => true,

            NodeKind::ReturnStatement { argument } => {
                !ctx.ignores_return_await_yield() || self.has_effects(*argument, ctx)
            }
            NodeKind::AwaitExpression { argument } | NodeKind::YieldExpression { argument, .. } => {
                !ctx.ignores_return_await_yield() || self.has_effects(*argument, ctx)
            }
            NodeKind::BreakStatement { label } | NodeKind::ContinueStatement { label } => {
                match self.arena().identifier_name(*label) {
                    Some(name) => !ctx.ignores_label(name),
                    None => !ctx.ignores_break(),
                }
            }
            NodeKind::LabeledStatement { label, body } => match self.arena().identifier_name(*label) {
                Some(name) => self.has_effects(*body, &ctx.with_ignored_label(name.clone())),
                None => self.has_effects(*body, ctx),
            },

            NodeKind::WhileStatement { test, body } | NodeKind::DoWhileStatement { body, test } => {
                self.has_effects(*test, ctx) || self.has_effects(*body, &ctx.with_ignore_break())
            }
            NodeKind::ForStatement {
                init,
                test,
                update,
                body,
            } => {
                self.has_effects(*init, ctx)
                    || self.has_effects(*test, ctx)
                    || self.has_effects(*update, ctx)
                    || self.has_effects(*body, &ctx.with_ignore_break())
            }
            NodeKind::ForInStatement { left, right, body } | NodeKind::ForOfStatement { left, right, body, .. } => {
                self.has_effects(*right, ctx)
                    || self.for_head_has_effects(*left, ctx)
                    || self.has_effects(*body, &ctx.with_ignore_break())
            }
            NodeKind::SwitchStatement { discriminant, cases } => {
                let inner = ctx.with_ignore_break();
                self.has_effects(*discriminant, ctx) || cases.iter().any(|&case| self.has_effects(case, &inner))
            }

            NodeKind::IfStatement {
                test,
                consequent,
                alternate,
            }
            | NodeKind::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => {
                if self.has_effects(*test, ctx) {
                    return true;
                }
                match self.known_truthiness(*test, ctx) {
                    Some(true) => self.has_effects(*consequent, ctx),
                    Some(false) => self.has_effects(*alternate, ctx),
                    None => self.has_effects(*consequent, ctx) || self.has_effects(*alternate, ctx),
                }
            }
            NodeKind::LogicalExpression {
                operator,
                left,
                right,
            } => {
                if self.has_effects(*left, ctx) {
                    return true;
                }
                match self.logical_short_circuit(*operator, *left, ctx) {
                    Some(true) => false,
                    _ => self.has_effects(*right, ctx),
                }
            }

            NodeKind::VariableDeclarator { id, init } => {
                if self.has_effects(*id, ctx) || self.has_effects(*init, ctx) {
                    return true;
                }
                let destructures = !matches!(self.kind(*id), Some(NodeKind::Identifier { .. }));
                destructures && init.is_some() && self.accessed_at(Entity::Node(*init), UNKNOWN_PATH, ctx)
            }

            NodeKind::CallExpression {
                callee, arguments, ..
            } => {
                if arguments.iter().any(|&arg| self.has_effects(arg, ctx)) || self.has_effects(*callee, ctx) {
                    return true;
                }
                let call = CallOptions::new(false, arguments, idx);
                self.called_at(Entity::Node(*callee), &[], &call, &ctx.for_nested_call())
            }
            NodeKind::NewExpression { callee, arguments } => {
                if arguments.iter().any(|&arg| self.has_effects(arg, ctx)) || self.has_effects(*callee, ctx) {
                    return true;
                }
                let call = CallOptions::new(true, arguments, idx);
                self.called_at(Entity::Node(*callee), &[], &call, &ctx.for_nested_call())
            }
            NodeKind::TaggedTemplateExpression { tag, quasi } => {
                if self.has_effects(*tag, ctx) || self.has_effects(*quasi, ctx) {
                    return true;
                }
                let call = CallOptions::new(false, &[], idx);
                self.called_at(Entity::Node(*tag), &[], &call, &ctx.for_nested_call())
            }

            NodeKind::MemberExpression {
                object,
                property,
                computed,
                ..
            } => {
                if self.namespace_member(idx).is_some() {
                    return false;
                }
                if self.has_effects(*object, ctx) || (*computed && self.has_effects(*property, ctx)) {
                    return true;
                }
                self.options.property_read_side_effects
                    && self.accessed_at(Entity::Node(*object), &[self.member_key(idx, ctx)], ctx)
            }

            NodeKind::AssignmentExpression { left, right, .. } => {
                self.has_effects(*right, ctx)
                    || self.target_has_effects(*left, ctx)
                    || self.assigned_at(Entity::Node(*left), &[], ctx)
            }
            NodeKind::UpdateExpression { argument, .. } => {
                self.target_has_effects(*argument, ctx) || self.assigned_at(Entity::Node(*argument), &[], ctx)
            }
            NodeKind::UnaryExpression {
                operator: UnaryOperator::Delete,
                argument,
            } => {
                self.target_has_effects(*argument, ctx) || self.assigned_at(Entity::Node(*argument), &[], ctx)
            }

            NodeKind::ClassBody { body } => body.iter().any(|&member| self.has_effects(member, ctx)),
            NodeKind::MethodDefinition { key, computed, .. } => *computed && self.has_effects(*key, ctx),
            NodeKind::Property {
                key, value, computed, ..
            } => (*computed && self.has_effects(*key, ctx)) || self.has_effects(*value, ctx),

            _ => self
                .arena()
                .children(idx)
                .into_iter()
                .any(|child| self.has_effects(child, ctx)),
        }
    }

    /// Effects of evaluating an assignment target as a reference, without
    /// reading it: the object and computed key of a member, defaults and
    /// computed keys inside a pattern.
    fn target_has_effects(&self, target: NodeIndex, ctx: &AnalysisContext) -> bool {
        match self.kind(target) {
            Some(NodeKind::MemberExpression {
                object,
                property,
                computed,
                ..
            }) => {
                self.namespace_member(target).is_none()
                    && (self.has_effects(*object, ctx) || (*computed && self.has_effects(*property, ctx)))
            }
            Some(NodeKind::Identifier { .. }) | None => false,
            Some(_) => self.has_effects(target, ctx),
        }
    }

    fn for_head_has_effects(&self, left: NodeIndex, ctx: &AnalysisContext) -> bool {
        match self.kind(left) {
            Some(NodeKind::VariableDeclaration { declarations, .. }) => {
                declarations.iter().any(|&declarator| match self.kind(declarator) {
                    Some(NodeKind::VariableDeclarator { id, .. }) => self.has_effects(*id, ctx),
                    _ => false,
                })
            }
            _ => self.target_has_effects(left, ctx) || self.assigned_at(Entity::Node(left), &[], ctx),
        }
    }
}

#[cfg(test)]
#[path = "../tests/effects.rs"]
mod tests;
