//! ESTree JSON → arena construction.
//!
//! Construction is single-pass and top-down: each node's slot is reserved
//! (so its index is known to its children as their parent) before the child
//! slots are built, then the finished variant is written into the slot.

use crate::arena::NodeArena;
use crate::node::{
    ClassData, FunctionData, LiteralValue, MethodKind, NodeIndex, NodeKind, PropertyKind,
    VariableKind,
};
use crate::operators::{
    AssignmentOperator, BinaryOperator, LogicalOperator, UnaryOperator, UpdateOperator,
};
use serde_json::Value;
use shaker_common::{ByteSpan, Name, Utf16Offsets};
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AstError {
    #[error("unsupported node type '{0}'")]
    UnknownNodeType(String),
    #[error("{node_type} is missing field '{field}'")]
    MissingField {
        node_type: &'static str,
        field: &'static str,
    },
    #[error("{node_type}.{field} has an invalid value")]
    InvalidField {
        node_type: &'static str,
        field: &'static str,
    },
    #[error("expected a Program node at the root")]
    NotAProgram,
}

/// Build the tree for one module from its ESTree JSON and return the
/// `Program` node.
pub fn build_program(
    arena: &mut NodeArena,
    ast: &Value,
    source: &str,
    file: u32,
) -> Result<NodeIndex, AstError> {
    if ast.get("type").and_then(Value::as_str) != Some("Program") {
        return Err(AstError::NotAProgram);
    }
    let mut builder = EstreeBuilder {
        arena,
        offsets: Utf16Offsets::new(source),
        file,
    };
    let root = builder.build(ast, NodeIndex::NONE)?;
    trace!(file, nodes = builder.arena.len(), "built module tree");
    Ok(root)
}

struct EstreeBuilder<'a> {
    arena: &'a mut NodeArena,
    offsets: Utf16Offsets,
    file: u32,
}

type NodeType = &'static str;

fn field<'v>(value: &'v Value, node_type: NodeType, name: &'static str) -> Result<&'v Value, AstError> {
    value.get(name).ok_or(AstError::MissingField {
        node_type,
        field: name,
    })
}

fn str_field<'v>(value: &'v Value, node_type: NodeType, name: &'static str) -> Result<&'v str, AstError> {
    field(value, node_type, name)?
        .as_str()
        .ok_or(AstError::InvalidField {
            node_type,
            field: name,
        })
}

fn bool_field(value: &Value, name: &'static str) -> bool {
    value.get(name).and_then(Value::as_bool).unwrap_or(false)
}

fn intern_type(type_name: &str) -> Option<NodeType> {
    const TYPES: &[&str] = &[
        "Program", "ExpressionStatement", "BlockStatement", "EmptyStatement", "DebuggerStatement",
        "ReturnStatement", "BreakStatement", "ContinueStatement", "LabeledStatement", "IfStatement",
        "SwitchStatement", "SwitchCase", "ThrowStatement", "TryStatement", "CatchClause",
        "WhileStatement", "DoWhileStatement", "ForStatement", "ForInStatement", "ForOfStatement",
        "FunctionDeclaration", "VariableDeclaration", "VariableDeclarator", "ClassDeclaration",
        "ImportDeclaration", "ImportSpecifier", "ImportDefaultSpecifier",
        "ImportNamespaceSpecifier", "ExportNamedDeclaration", "ExportSpecifier",
        "ExportDefaultDeclaration", "ExportAllDeclaration", "Identifier", "Literal",
        "ThisExpression", "Super", "ArrayExpression", "ObjectExpression", "Property",
        "FunctionExpression", "ArrowFunctionExpression", "ClassExpression", "ClassBody",
        "MethodDefinition", "UnaryExpression", "UpdateExpression", "BinaryExpression",
        "LogicalExpression", "AssignmentExpression", "ConditionalExpression", "CallExpression",
        "NewExpression", "MemberExpression", "ChainExpression", "SequenceExpression",
        "TemplateLiteral", "TemplateElement", "TaggedTemplateExpression", "SpreadElement",
        "YieldExpression", "AwaitExpression", "MetaProperty", "ImportExpression", "ArrayPattern",
        "ObjectPattern", "AssignmentPattern", "RestElement", "ParenthesizedExpression",
    ];
    TYPES.iter().copied().find(|t| *t == type_name)
}

impl EstreeBuilder<'_> {
    fn span_of(&self, value: &Value) -> ByteSpan {
        let offset = |name: &str| {
            value
                .get(name)
                .and_then(Value::as_u64)
                .map_or(0, |v| self.offsets.to_byte(v as u32))
        };
        ByteSpan::new(offset("start"), offset("end"))
    }

    fn build_opt(&mut self, value: Option<&Value>, parent: NodeIndex) -> Result<NodeIndex, AstError> {
        match value {
            None | Some(Value::Null) => Ok(NodeIndex::NONE),
            Some(child) => self.build(child, parent),
        }
    }

    fn child(&mut self, value: &Value, node_type: NodeType, name: &'static str, parent: NodeIndex) -> Result<NodeIndex, AstError> {
        let child = field(value, node_type, name)?;
        self.build(child, parent)
    }

    fn list(&mut self, value: &Value, node_type: NodeType, name: &'static str, parent: NodeIndex) -> Result<Vec<NodeIndex>, AstError> {
        let items = field(value, node_type, name)?
            .as_array()
            .ok_or(AstError::InvalidField {
                node_type,
                field: name,
            })?;
        items
            .iter()
            .map(|item| self.build_opt(Some(item), parent))
            .collect()
    }

    fn build(&mut self, value: &Value, parent: NodeIndex) -> Result<NodeIndex, AstError> {
        let raw_type = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(AstError::MissingField {
                node_type: "Node",
                field: "type",
            })?;
        let node_type =
            intern_type(raw_type).ok_or_else(|| AstError::UnknownNodeType(raw_type.to_string()))?;

        // Parentheses carry no semantics; the inner expression takes their place.
        if node_type == "ParenthesizedExpression" {
            return self.child(value, node_type, "expression", parent);
        }

        let idx = self.arena.reserve(self.span_of(value), parent, self.file);
        let kind = self.build_kind(value, node_type, idx)?;
        self.arena.set_kind(idx, kind);
        Ok(idx)
    }

    fn build_function(&mut self, value: &Value, node_type: NodeType, idx: NodeIndex) -> Result<FunctionData, AstError> {
        let id = self.build_opt(value.get("id"), idx)?;
        let params = self.list(value, node_type, "params", idx)?;
        let body = self.child(value, node_type, "body", idx)?;
        let is_arrow = node_type == "ArrowFunctionExpression";
        Ok(FunctionData {
            id,
            params,
            body,
            is_async: bool_field(value, "async"),
            is_generator: bool_field(value, "generator"),
            is_arrow,
            expression_body: is_arrow && bool_field(value, "expression"),
        })
    }

    fn build_class(&mut self, value: &Value, node_type: NodeType, idx: NodeIndex) -> Result<ClassData, AstError> {
        Ok(ClassData {
            id: self.build_opt(value.get("id"), idx)?,
            super_class: self.build_opt(value.get("superClass"), idx)?,
            body: self.child(value, node_type, "body", idx)?,
        })
    }

    fn literal_value(value: &Value) -> LiteralValue {
        if let Some(regex) = value.get("regex") {
            let part = |name: &str| Name::from(regex.get(name).and_then(Value::as_str).unwrap_or(""));
            return LiteralValue::RegExp {
                pattern: part("pattern"),
                flags: part("flags"),
            };
        }
        if let Some(bigint) = value.get("bigint").and_then(Value::as_str) {
            return LiteralValue::BigInt(Name::from(bigint));
        }
        match value.get("value") {
            Some(Value::String(s)) => LiteralValue::String(Name::from(s.as_str())),
            Some(Value::Bool(b)) => LiteralValue::Boolean(*b),
            Some(Value::Number(n)) => LiteralValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            _ => {
                // Numbers that overflow JSON (e.g. `1e999`) arrive as null; fall back to `raw`.
                match value.get("raw").and_then(Value::as_str) {
                    Some("null") | None => LiteralValue::Null,
                    Some(raw) => LiteralValue::Number(raw.parse().unwrap_or(f64::INFINITY)),
                }
            }
        }
    }

    fn build_kind(&mut self, value: &Value, node_type: NodeType, idx: NodeIndex) -> Result<NodeKind, AstError> {
        let invalid = |field: &'static str| AstError::InvalidField { node_type, field };
        let kind = match node_type {
            "Program" => NodeKind::Program {
                body: self.list(value, node_type, "body", idx)?,
            },
            "ExpressionStatement" => NodeKind::ExpressionStatement {
                expression: self.child(value, node_type, "expression", idx)?,
                directive: value
                    .get("directive")
                    .and_then(Value::as_str)
                    .map(Name::from),
            },
            "BlockStatement" => NodeKind::BlockStatement {
                body: self.list(value, node_type, "body", idx)?,
            },
            "EmptyStatement" => NodeKind::EmptyStatement,
            "DebuggerStatement" => NodeKind::DebuggerStatement,
            "ReturnStatement" => NodeKind::ReturnStatement {
                argument: self.build_opt(value.get("argument"), idx)?,
            },
            "BreakStatement" => NodeKind::BreakStatement {
                label: self.build_opt(value.get("label"), idx)?,
            },
            "ContinueStatement" => NodeKind::ContinueStatement {
                label: self.build_opt(value.get("label"), idx)?,
            },
            "LabeledStatement" => NodeKind::LabeledStatement {
                label: self.child(value, node_type, "label", idx)?,
                body: self.child(value, node_type, "body", idx)?,
            },
            "IfStatement" => NodeKind::IfStatement {
                test: self.child(value, node_type, "test", idx)?,
                consequent: self.child(value, node_type, "consequent", idx)?,
                alternate: self.build_opt(value.get("alternate"), idx)?,
            },
            "SwitchStatement" => NodeKind::SwitchStatement {
                discriminant: self.child(value, node_type, "discriminant", idx)?,
                cases: self.list(value, node_type, "cases", idx)?,
            },
            "SwitchCase" => NodeKind::SwitchCase {
                test: self.build_opt(value.get("test"), idx)?,
                consequent: self.list(value, node_type, "consequent", idx)?,
            },
            "ThrowStatement" => NodeKind::ThrowStatement {
                argument: self.child(value, node_type, "argument", idx)?,
            },
            "TryStatement" => NodeKind::TryStatement {
                block: self.child(value, node_type, "block", idx)?,
                handler: self.build_opt(value.get("handler"), idx)?,
                finalizer: self.build_opt(value.get("finalizer"), idx)?,
            },
            "CatchClause" => NodeKind::CatchClause {
                param: self.build_opt(value.get("param"), idx)?,
                body: self.child(value, node_type, "body", idx)?,
            },
            "WhileStatement" => NodeKind::WhileStatement {
                test: self.child(value, node_type, "test", idx)?,
                body: self.child(value, node_type, "body", idx)?,
            },
            "DoWhileStatement" => NodeKind::DoWhileStatement {
                body: self.child(value, node_type, "body", idx)?,
                test: self.child(value, node_type, "test", idx)?,
            },
            "ForStatement" => NodeKind::ForStatement {
                init: self.build_opt(value.get("init"), idx)?,
                test: self.build_opt(value.get("test"), idx)?,
                update: self.build_opt(value.get("update"), idx)?,
                body: self.child(value, node_type, "body", idx)?,
            },
            "ForInStatement" => NodeKind::ForInStatement {
                left: self.child(value, node_type, "left", idx)?,
                right: self.child(value, node_type, "right", idx)?,
                body: self.child(value, node_type, "body", idx)?,
            },
            "ForOfStatement" => NodeKind::ForOfStatement {
                left: self.child(value, node_type, "left", idx)?,
                right: self.child(value, node_type, "right", idx)?,
                body: self.child(value, node_type, "body", idx)?,
                is_await: bool_field(value, "await"),
            },
            "FunctionDeclaration" => {
                NodeKind::FunctionDeclaration(self.build_function(value, node_type, idx)?)
            }
            "FunctionExpression" => {
                NodeKind::FunctionExpression(self.build_function(value, node_type, idx)?)
            }
            "ArrowFunctionExpression" => {
                NodeKind::ArrowFunctionExpression(self.build_function(value, node_type, idx)?)
            }
            "VariableDeclaration" => NodeKind::VariableDeclaration {
                kind: match str_field(value, node_type, "kind")? {
                    "var" => VariableKind::Var,
                    "let" => VariableKind::Let,
                    "const" => VariableKind::Const,
                    _ => return Err(invalid("kind")),
                },
                declarations: self.list(value, node_type, "declarations", idx)?,
            },
            "VariableDeclarator" => NodeKind::VariableDeclarator {
                id: self.child(value, node_type, "id", idx)?,
                init: self.build_opt(value.get("init"), idx)?,
            },
            "ClassDeclaration" => NodeKind::ClassDeclaration(self.build_class(value, node_type, idx)?),
            "ClassExpression" => NodeKind::ClassExpression(self.build_class(value, node_type, idx)?),
            "ClassBody" => NodeKind::ClassBody {
                body: self.list(value, node_type, "body", idx)?,
            },
            "MethodDefinition" => NodeKind::MethodDefinition {
                key: self.child(value, node_type, "key", idx)?,
                value: self.child(value, node_type, "value", idx)?,
                kind: match str_field(value, node_type, "kind")? {
                    "constructor" => MethodKind::Constructor,
                    "method" => MethodKind::Method,
                    "get" => MethodKind::Get,
                    "set" => MethodKind::Set,
                    _ => return Err(invalid("kind")),
                },
                computed: bool_field(value, "computed"),
                is_static: bool_field(value, "static"),
            },
            "ImportDeclaration" => NodeKind::ImportDeclaration {
                specifiers: self.list(value, node_type, "specifiers", idx)?,
                source: self.child(value, node_type, "source", idx)?,
            },
            "ImportSpecifier" => NodeKind::ImportSpecifier {
                imported: self.child(value, node_type, "imported", idx)?,
                local: self.child(value, node_type, "local", idx)?,
            },
            "ImportDefaultSpecifier" => NodeKind::ImportDefaultSpecifier {
                local: self.child(value, node_type, "local", idx)?,
            },
            "ImportNamespaceSpecifier" => NodeKind::ImportNamespaceSpecifier {
                local: self.child(value, node_type, "local", idx)?,
            },
            "ExportNamedDeclaration" => NodeKind::ExportNamedDeclaration {
                declaration: self.build_opt(value.get("declaration"), idx)?,
                specifiers: self.list(value, node_type, "specifiers", idx)?,
                source: self.build_opt(value.get("source"), idx)?,
            },
            "ExportSpecifier" => NodeKind::ExportSpecifier {
                local: self.child(value, node_type, "local", idx)?,
                exported: self.child(value, node_type, "exported", idx)?,
            },
            "ExportDefaultDeclaration" => NodeKind::ExportDefaultDeclaration {
                declaration: self.child(value, node_type, "declaration", idx)?,
            },
            "ExportAllDeclaration" => NodeKind::ExportAllDeclaration {
                exported: self.build_opt(value.get("exported"), idx)?,
                source: self.child(value, node_type, "source", idx)?,
            },
            "Identifier" => NodeKind::Identifier {
                name: Name::from(str_field(value, node_type, "name")?),
            },
            "Literal" => NodeKind::Literal {
                value: Self::literal_value(value),
            },
            "ThisExpression" => NodeKind::ThisExpression,
            "Super" => NodeKind::Super,
            "ArrayExpression" => NodeKind::ArrayExpression {
                elements: self.list(value, node_type, "elements", idx)?,
            },
            "ObjectExpression" => NodeKind::ObjectExpression {
                properties: self.list(value, node_type, "properties", idx)?,
            },
            "Property" => NodeKind::Property {
                key: self.child(value, node_type, "key", idx)?,
                value: self.child(value, node_type, "value", idx)?,
                kind: match value.get("kind").and_then(Value::as_str).unwrap_or("init") {
                    "init" => PropertyKind::Init,
                    "get" => PropertyKind::Get,
                    "set" => PropertyKind::Set,
                    _ => return Err(invalid("kind")),
                },
                computed: bool_field(value, "computed"),
                shorthand: bool_field(value, "shorthand"),
                method: bool_field(value, "method"),
            },
            "UnaryExpression" => NodeKind::UnaryExpression {
                operator: UnaryOperator::parse(str_field(value, node_type, "operator")?)
                    .ok_or_else(|| invalid("operator"))?,
                argument: self.child(value, node_type, "argument", idx)?,
            },
            "UpdateExpression" => NodeKind::UpdateExpression {
                operator: UpdateOperator::parse(str_field(value, node_type, "operator")?)
                    .ok_or_else(|| invalid("operator"))?,
                prefix: bool_field(value, "prefix"),
                argument: self.child(value, node_type, "argument", idx)?,
            },
            "BinaryExpression" => NodeKind::BinaryExpression {
                operator: BinaryOperator::parse(str_field(value, node_type, "operator")?)
                    .ok_or_else(|| invalid("operator"))?,
                left: self.child(value, node_type, "left", idx)?,
                right: self.child(value, node_type, "right", idx)?,
            },
            "LogicalExpression" => NodeKind::LogicalExpression {
                operator: LogicalOperator::parse(str_field(value, node_type, "operator")?)
                    .ok_or_else(|| invalid("operator"))?,
                left: self.child(value, node_type, "left", idx)?,
                right: self.child(value, node_type, "right", idx)?,
            },
            "AssignmentExpression" => NodeKind::AssignmentExpression {
                operator: AssignmentOperator::parse(str_field(value, node_type, "operator")?)
                    .ok_or_else(|| invalid("operator"))?,
                left: self.child(value, node_type, "left", idx)?,
                right: self.child(value, node_type, "right", idx)?,
            },
            "ConditionalExpression" => NodeKind::ConditionalExpression {
                test: self.child(value, node_type, "test", idx)?,
                consequent: self.child(value, node_type, "consequent", idx)?,
                alternate: self.child(value, node_type, "alternate", idx)?,
            },
            "CallExpression" => NodeKind::CallExpression {
                callee: self.child(value, node_type, "callee", idx)?,
                arguments: self.list(value, node_type, "arguments", idx)?,
                optional: bool_field(value, "optional"),
            },
            "NewExpression" => NodeKind::NewExpression {
                callee: self.child(value, node_type, "callee", idx)?,
                arguments: self.list(value, node_type, "arguments", idx)?,
            },
            "MemberExpression" => NodeKind::MemberExpression {
                object: self.child(value, node_type, "object", idx)?,
                property: self.child(value, node_type, "property", idx)?,
                computed: bool_field(value, "computed"),
                optional: bool_field(value, "optional"),
            },
            "ChainExpression" => NodeKind::ChainExpression {
                expression: self.child(value, node_type, "expression", idx)?,
            },
            "SequenceExpression" => NodeKind::SequenceExpression {
                expressions: self.list(value, node_type, "expressions", idx)?,
            },
            "TemplateLiteral" => {
                // Quasis and expressions interleave in the source; build them in
                // that order so indices keep following document order.
                let quasis_json = field(value, node_type, "quasis")?
                    .as_array()
                    .ok_or_else(|| invalid("quasis"))?;
                let expressions_json = field(value, node_type, "expressions")?
                    .as_array()
                    .ok_or_else(|| invalid("expressions"))?;
                let mut quasis = Vec::with_capacity(quasis_json.len());
                let mut expressions = Vec::with_capacity(expressions_json.len());
                for (i, quasi) in quasis_json.iter().enumerate() {
                    quasis.push(self.build(quasi, idx)?);
                    if let Some(expression) = expressions_json.get(i) {
                        expressions.push(self.build(expression, idx)?);
                    }
                }
                NodeKind::TemplateLiteral {
                    quasis,
                    expressions,
                }
            }
            "TemplateElement" => NodeKind::TemplateElement {
                cooked: value
                    .get("value")
                    .and_then(|v| v.get("cooked"))
                    .and_then(Value::as_str)
                    .map(Name::from),
                tail: bool_field(value, "tail"),
            },
            "TaggedTemplateExpression" => NodeKind::TaggedTemplateExpression {
                tag: self.child(value, node_type, "tag", idx)?,
                quasi: self.child(value, node_type, "quasi", idx)?,
            },
            "SpreadElement" => NodeKind::SpreadElement {
                argument: self.child(value, node_type, "argument", idx)?,
            },
            "YieldExpression" => NodeKind::YieldExpression {
                argument: self.build_opt(value.get("argument"), idx)?,
                delegate: bool_field(value, "delegate"),
            },
            "AwaitExpression" => NodeKind::AwaitExpression {
                argument: self.child(value, node_type, "argument", idx)?,
            },
            "MetaProperty" => NodeKind::MetaProperty {
                meta: self.child(value, node_type, "meta", idx)?,
                property: self.child(value, node_type, "property", idx)?,
            },
            "ImportExpression" => NodeKind::ImportExpression {
                source: self.child(value, node_type, "source", idx)?,
            },
            "ArrayPattern" => NodeKind::ArrayPattern {
                elements: self.list(value, node_type, "elements", idx)?,
            },
            "ObjectPattern" => NodeKind::ObjectPattern {
                properties: self.list(value, node_type, "properties", idx)?,
            },
            "AssignmentPattern" => NodeKind::AssignmentPattern {
                left: self.child(value, node_type, "left", idx)?,
                right: self.child(value, node_type, "right", idx)?,
            },
            "RestElement" => NodeKind::RestElement {
                argument: self.child(value, node_type, "argument", idx)?,
            },
            other => return Err(AstError::UnknownNodeType(other.to_string())),
        };
        Ok(kind)
    }
}
