//! Node storage and structural accessors.

use crate::node::{LiteralValue, Node, NodeIndex, NodeKind};
use shaker_common::{ByteSpan, Name};
use smallvec::SmallVec;

pub type ChildList = SmallVec<[NodeIndex; 4]>;

/// Flat storage for the nodes of every module in a build.
///
/// Nodes are allocated parent-first, so within one module indices follow
/// document order of node starts.
#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add(&mut self, node: Node) -> NodeIndex {
        let idx = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(node);
        idx
    }

    /// Allocate a slot before its children exist; the kind is filled in by
    /// [`NodeArena::set_kind`] once they are built.
    pub(crate) fn reserve(&mut self, span: ByteSpan, parent: NodeIndex, file: u32) -> NodeIndex {
        self.add(Node::new(NodeKind::EmptyStatement, span, parent, file))
    }

    pub(crate) fn set_kind(&mut self, idx: NodeIndex, kind: NodeKind) {
        if let Some(node) = self.nodes.get_mut(idx.0 as usize) {
            node.kind = kind;
        }
    }

    #[inline]
    #[must_use]
    pub fn get(&self, idx: NodeIndex) -> Option<&Node> {
        if idx.is_none() {
            return None;
        }
        self.nodes.get(idx.0 as usize)
    }

    #[inline]
    #[must_use]
    pub fn kind(&self, idx: NodeIndex) -> Option<&NodeKind> {
        self.get(idx).map(|node| &node.kind)
    }

    #[must_use]
    pub fn span(&self, idx: NodeIndex) -> ByteSpan {
        self.get(idx).map(|node| node.span).unwrap_or_default()
    }

    #[must_use]
    pub fn parent(&self, idx: NodeIndex) -> NodeIndex {
        self.get(idx).map_or(NodeIndex::NONE, |node| node.parent)
    }

    #[must_use]
    pub fn is_included(&self, idx: NodeIndex) -> bool {
        self.get(idx).is_some_and(Node::is_included)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeIndex(i as u32), node))
    }

    #[must_use]
    pub fn identifier_name(&self, idx: NodeIndex) -> Option<&Name> {
        match self.kind(idx)? {
            NodeKind::Identifier { name } => Some(name),
            _ => None,
        }
    }

    #[must_use]
    pub fn string_literal(&self, idx: NodeIndex) -> Option<&Name> {
        match self.kind(idx)? {
            NodeKind::Literal {
                value: LiteralValue::String(value),
            } => Some(value),
            _ => None,
        }
    }

    /// Name of an identifier or string literal (import/export specifier names).
    #[must_use]
    pub fn name_or_string(&self, idx: NodeIndex) -> Option<&Name> {
        self.identifier_name(idx).or_else(|| self.string_literal(idx))
    }

    /// Static key of a property or member: a non-computed name, or a computed
    /// string/number literal.
    #[must_use]
    pub fn static_key(&self, key: NodeIndex, computed: bool) -> Option<Name> {
        if !computed && let Some(name) = self.identifier_name(key) {
            return Some(name.clone());
        }
        match self.kind(key)? {
            NodeKind::Literal {
                value: LiteralValue::String(value),
            } => Some(value.clone()),
            NodeKind::Literal {
                value: LiteralValue::Number(value),
            } => Some(Name::from(number_key(*value).as_str())),
            _ => None,
        }
    }

    /// The static key of a `MemberExpression`.
    #[must_use]
    pub fn member_key(&self, member: NodeIndex) -> Option<Name> {
        match self.kind(member)? {
            NodeKind::MemberExpression {
                property, computed, ..
            } => self.static_key(*property, *computed),
            _ => None,
        }
    }

    /// Children in source order, skipping absent slots and array holes.
    #[must_use]
    pub fn children(&self, idx: NodeIndex) -> ChildList {
        let mut out = ChildList::new();
        let Some(kind) = self.kind(idx) else {
            return out;
        };
        let mut push = |child: NodeIndex| {
            if child.is_some() {
                out.push(child);
            }
        };
        match kind {
            NodeKind::Program { body } | NodeKind::BlockStatement { body } => {
                body.iter().copied().for_each(&mut push);
            }
            NodeKind::ExpressionStatement { expression, .. } => push(*expression),
            NodeKind::EmptyStatement
            | NodeKind::DebuggerStatement
            | NodeKind::Identifier { .. }
            | NodeKind::Literal { .. }
            | NodeKind::ThisExpression
            | NodeKind::Super
            | NodeKind::TemplateElement { .. } => {}
            NodeKind::ReturnStatement { argument }
            | NodeKind::ThrowStatement { argument }
            | NodeKind::UnaryExpression { argument, .. }
            | NodeKind::UpdateExpression { argument, .. }
            | NodeKind::SpreadElement { argument }
            | NodeKind::YieldExpression { argument, .. }
            | NodeKind::AwaitExpression { argument }
            | NodeKind::RestElement { argument } => push(*argument),
            NodeKind::BreakStatement { label } | NodeKind::ContinueStatement { label } => {
                push(*label);
            }
            NodeKind::LabeledStatement { label, body } => {
                push(*label);
                push(*body);
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
                push(*test);
                push(*consequent);
                push(*alternate);
            }
            NodeKind::SwitchStatement {
                discriminant,
                cases,
            } => {
                push(*discriminant);
                cases.iter().copied().for_each(&mut push);
            }
            NodeKind::SwitchCase { test, consequent } => {
                push(*test);
                consequent.iter().copied().for_each(&mut push);
            }
            NodeKind::TryStatement {
                block,
                handler,
                finalizer,
            } => {
                push(*block);
                push(*handler);
                push(*finalizer);
            }
            NodeKind::CatchClause { param, body } => {
                push(*param);
                push(*body);
            }
            NodeKind::WhileStatement { test, body } => {
                push(*test);
                push(*body);
            }
            NodeKind::DoWhileStatement { body, test } => {
                push(*body);
                push(*test);
            }
            NodeKind::ForStatement {
                init,
                test,
                update,
                body,
            } => {
                push(*init);
                push(*test);
                push(*update);
                push(*body);
            }
            NodeKind::ForInStatement { left, right, body }
            | NodeKind::ForOfStatement {
                left, right, body, ..
            } => {
                push(*left);
                push(*right);
                push(*body);
            }
            NodeKind::FunctionDeclaration(data)
            | NodeKind::FunctionExpression(data)
            | NodeKind::ArrowFunctionExpression(data) => {
                push(data.id);
                data.params.iter().copied().for_each(&mut push);
                push(data.body);
            }
            NodeKind::VariableDeclaration { declarations, .. } => {
                declarations.iter().copied().for_each(&mut push);
            }
            NodeKind::VariableDeclarator { id, init } => {
                push(*id);
                push(*init);
            }
            NodeKind::ClassDeclaration(data) | NodeKind::ClassExpression(data) => {
                push(data.id);
                push(data.super_class);
                push(data.body);
            }
            NodeKind::ImportDeclaration { specifiers, source } => {
                specifiers.iter().copied().for_each(&mut push);
                push(*source);
            }
            NodeKind::ImportSpecifier { imported, local } => {
                push(*imported);
                push(*local);
            }
            NodeKind::ImportDefaultSpecifier { local }
            | NodeKind::ImportNamespaceSpecifier { local } => push(*local),
            NodeKind::ExportNamedDeclaration {
                declaration,
                specifiers,
                source,
            } => {
                push(*declaration);
                specifiers.iter().copied().for_each(&mut push);
                push(*source);
            }
            NodeKind::ExportSpecifier { local, exported } => {
                push(*local);
                push(*exported);
            }
            NodeKind::ExportDefaultDeclaration { declaration } => push(*declaration),
            NodeKind::ExportAllDeclaration { exported, source } => {
                push(*exported);
                push(*source);
            }
            NodeKind::ArrayExpression { elements } | NodeKind::ArrayPattern { elements } => {
                elements.iter().copied().for_each(&mut push);
            }
            NodeKind::ObjectExpression { properties } | NodeKind::ObjectPattern { properties } => {
                properties.iter().copied().for_each(&mut push);
            }
            NodeKind::Property { key, value, .. } | NodeKind::MethodDefinition { key, value, .. } => {
                push(*key);
                push(*value);
            }
            NodeKind::ClassBody { body } => body.iter().copied().for_each(&mut push),
            NodeKind::BinaryExpression { left, right, .. }
            | NodeKind::LogicalExpression { left, right, .. }
            | NodeKind::AssignmentExpression { left, right, .. }
            | NodeKind::AssignmentPattern { left, right } => {
                push(*left);
                push(*right);
            }
            NodeKind::CallExpression {
                callee, arguments, ..
            }
            | NodeKind::NewExpression { callee, arguments } => {
                push(*callee);
                arguments.iter().copied().for_each(&mut push);
            }
            NodeKind::MemberExpression {
                object, property, ..
            } => {
                push(*object);
                push(*property);
            }
            NodeKind::ChainExpression { expression } => push(*expression),
            NodeKind::SequenceExpression { expressions } => {
                expressions.iter().copied().for_each(&mut push);
            }
            NodeKind::TemplateLiteral {
                quasis,
                expressions,
            } => {
                for (i, quasi) in quasis.iter().enumerate() {
                    push(*quasi);
                    if let Some(expression) = expressions.get(i) {
                        push(*expression);
                    }
                }
            }
            NodeKind::TaggedTemplateExpression { tag, quasi } => {
                push(*tag);
                push(*quasi);
            }
            NodeKind::MetaProperty { meta, property } => {
                push(*meta);
                push(*property);
            }
            NodeKind::ImportExpression { source } => push(*source),
        }
        out
    }

    /// Collect the identifiers a binding pattern declares, in source order.
    pub fn collect_binding_identifiers(&self, pattern: NodeIndex, out: &mut Vec<NodeIndex>) {
        match self.kind(pattern) {
            Some(NodeKind::Identifier { .. }) => out.push(pattern),
            Some(NodeKind::ArrayPattern { elements }) => {
                for &element in elements {
                    self.collect_binding_identifiers(element, out);
                }
            }
            Some(NodeKind::ObjectPattern { properties }) => {
                for &property in properties {
                    match self.kind(property) {
                        Some(NodeKind::Property { value, .. }) => {
                            self.collect_binding_identifiers(*value, out);
                        }
                        _ => self.collect_binding_identifiers(property, out),
                    }
                }
            }
            Some(NodeKind::AssignmentPattern { left, .. }) => {
                self.collect_binding_identifiers(*left, out);
            }
            Some(NodeKind::RestElement { argument }) => {
                self.collect_binding_identifiers(*argument, out);
            }
            _ => {}
        }
    }

    /// Walk up from `idx` to its `Program` node.
    #[must_use]
    pub fn root_of(&self, mut idx: NodeIndex) -> NodeIndex {
        while let Some(node) = self.get(idx) {
            if node.parent.is_none() {
                return idx;
            }
            idx = node.parent;
        }
        NodeIndex::NONE
    }
}

/// Property key spelling of a number literal (`1.0` and `1` both key `"1"`).
#[must_use]
pub fn number_key(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e21 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
#[path = "../tests/arena.rs"]
mod tests;
