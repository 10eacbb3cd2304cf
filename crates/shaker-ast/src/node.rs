//! Node types.
//!
//! `NodeKind` is the closed set of ESTree variants the bundler understands.
//! Child slots hold `NodeIndex` values; an absent optional child (or an array
//! hole) is `NodeIndex::NONE`.

use crate::operators::{
    AssignmentOperator, BinaryOperator, LogicalOperator, UnaryOperator, UpdateOperator,
};
use shaker_common::{ByteSpan, Name};
use std::cell::Cell;

/// Index of a node in the `NodeArena`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    pub const NONE: Self = Self(u32::MAX);

    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    #[must_use]
    pub const fn is_some(self) -> bool {
        !self.is_none()
    }

    /// `None` for the sentinel, `Some(self)` otherwise.
    #[must_use]
    pub const fn to_option(self) -> Option<Self> {
        if self.is_none() { None } else { Some(self) }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VariableKind {
    Var,
    Let,
    Const,
}

impl VariableKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Var => "var",
            Self::Let => "let",
            Self::Const => "const",
        }
    }

    #[must_use]
    pub const fn is_block_scoped(self) -> bool {
        !matches!(self, Self::Var)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropertyKind {
    Init,
    Get,
    Set,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MethodKind {
    Constructor,
    Method,
    Get,
    Set,
}

/// A primitive copied verbatim from the parse.
#[derive(Clone, Debug, PartialEq)]
pub enum LiteralValue {
    String(Name),
    Number(f64),
    Boolean(bool),
    Null,
    RegExp { pattern: Name, flags: Name },
    BigInt(Name),
}

/// Shared slots of function declarations, function expressions and arrows.
#[derive(Clone, Debug)]
pub struct FunctionData {
    pub id: NodeIndex,
    pub params: Vec<NodeIndex>,
    pub body: NodeIndex,
    pub is_async: bool,
    pub is_generator: bool,
    pub is_arrow: bool,
    /// Arrow function whose body is an expression rather than a block.
    pub expression_body: bool,
}

#[derive(Clone, Debug)]
pub struct ClassData {
    pub id: NodeIndex,
    pub super_class: NodeIndex,
    pub body: NodeIndex,
}

#[derive(Clone, Debug)]
pub enum NodeKind {
    Program {
        body: Vec<NodeIndex>,
    },

    // Statements
    ExpressionStatement {
        expression: NodeIndex,
        directive: Option<Name>,
    },
    BlockStatement {
        body: Vec<NodeIndex>,
    },
    EmptyStatement,
    DebuggerStatement,
    ReturnStatement {
        argument: NodeIndex,
    },
    BreakStatement {
        label: NodeIndex,
    },
    ContinueStatement {
        label: NodeIndex,
    },
    LabeledStatement {
        label: NodeIndex,
        body: NodeIndex,
    },
    IfStatement {
        test: NodeIndex,
        consequent: NodeIndex,
        alternate: NodeIndex,
    },
    SwitchStatement {
        discriminant: NodeIndex,
        cases: Vec<NodeIndex>,
    },
    SwitchCase {
        test: NodeIndex,
        consequent: Vec<NodeIndex>,
    },
    ThrowStatement {
        argument: NodeIndex,
    },
    TryStatement {
        block: NodeIndex,
        handler: NodeIndex,
        finalizer: NodeIndex,
    },
    CatchClause {
        param: NodeIndex,
        body: NodeIndex,
    },
    WhileStatement {
        test: NodeIndex,
        body: NodeIndex,
    },
    DoWhileStatement {
        body: NodeIndex,
        test: NodeIndex,
    },
    ForStatement {
        init: NodeIndex,
        test: NodeIndex,
        update: NodeIndex,
        body: NodeIndex,
    },
    ForInStatement {
        left: NodeIndex,
        right: NodeIndex,
        body: NodeIndex,
    },
    ForOfStatement {
        left: NodeIndex,
        right: NodeIndex,
        body: NodeIndex,
        is_await: bool,
    },

    // Declarations
    FunctionDeclaration(FunctionData),
    VariableDeclaration {
        kind: VariableKind,
        declarations: Vec<NodeIndex>,
    },
    VariableDeclarator {
        id: NodeIndex,
        init: NodeIndex,
    },
    ClassDeclaration(ClassData),

    // Module declarations
    ImportDeclaration {
        specifiers: Vec<NodeIndex>,
        source: NodeIndex,
    },
    ImportSpecifier {
        imported: NodeIndex,
        local: NodeIndex,
    },
    ImportDefaultSpecifier {
        local: NodeIndex,
    },
    ImportNamespaceSpecifier {
        local: NodeIndex,
    },
    ExportNamedDeclaration {
        declaration: NodeIndex,
        specifiers: Vec<NodeIndex>,
        source: NodeIndex,
    },
    ExportSpecifier {
        local: NodeIndex,
        exported: NodeIndex,
    },
    ExportDefaultDeclaration {
        declaration: NodeIndex,
    },
    ExportAllDeclaration {
        exported: NodeIndex,
        source: NodeIndex,
    },

    // Expressions
    Identifier {
        name: Name,
    },
    Literal {
        value: LiteralValue,
    },
    ThisExpression,
    Super,
    ArrayExpression {
        elements: Vec<NodeIndex>,
    },
    ObjectExpression {
        properties: Vec<NodeIndex>,
    },
    Property {
        key: NodeIndex,
        value: NodeIndex,
        kind: PropertyKind,
        computed: bool,
        shorthand: bool,
        method: bool,
    },
    FunctionExpression(FunctionData),
    ArrowFunctionExpression(FunctionData),
    ClassExpression(ClassData),
    ClassBody {
        body: Vec<NodeIndex>,
    },
    MethodDefinition {
        key: NodeIndex,
        value: NodeIndex,
        kind: MethodKind,
        computed: bool,
        is_static: bool,
    },
    UnaryExpression {
        operator: UnaryOperator,
        argument: NodeIndex,
    },
    UpdateExpression {
        operator: UpdateOperator,
        prefix: bool,
        argument: NodeIndex,
    },
    BinaryExpression {
        operator: BinaryOperator,
        left: NodeIndex,
        right: NodeIndex,
    },
    LogicalExpression {
        operator: LogicalOperator,
        left: NodeIndex,
        right: NodeIndex,
    },
    AssignmentExpression {
        operator: AssignmentOperator,
        left: NodeIndex,
        right: NodeIndex,
    },
    ConditionalExpression {
        test: NodeIndex,
        consequent: NodeIndex,
        alternate: NodeIndex,
    },
    CallExpression {
        callee: NodeIndex,
        arguments: Vec<NodeIndex>,
        optional: bool,
    },
    NewExpression {
        callee: NodeIndex,
        arguments: Vec<NodeIndex>,
    },
    MemberExpression {
        object: NodeIndex,
        property: NodeIndex,
        computed: bool,
        optional: bool,
    },
    ChainExpression {
        expression: NodeIndex,
    },
    SequenceExpression {
        expressions: Vec<NodeIndex>,
    },
    TemplateLiteral {
        quasis: Vec<NodeIndex>,
        expressions: Vec<NodeIndex>,
    },
    TemplateElement {
        cooked: Option<Name>,
        tail: bool,
    },
    TaggedTemplateExpression {
        tag: NodeIndex,
        quasi: NodeIndex,
    },
    SpreadElement {
        argument: NodeIndex,
    },
    YieldExpression {
        argument: NodeIndex,
        delegate: bool,
    },
    AwaitExpression {
        argument: NodeIndex,
    },
    MetaProperty {
        meta: NodeIndex,
        property: NodeIndex,
    },
    ImportExpression {
        source: NodeIndex,
    },

    // Patterns
    ArrayPattern {
        elements: Vec<NodeIndex>,
    },
    ObjectPattern {
        properties: Vec<NodeIndex>,
    },
    AssignmentPattern {
        left: NodeIndex,
        right: NodeIndex,
    },
    RestElement {
        argument: NodeIndex,
    },
}

impl NodeKind {
    /// The ESTree `type` name of this variant.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Program { .. } => "Program",
            Self::ExpressionStatement { .. } => "ExpressionStatement",
            Self::BlockStatement { .. } => "BlockStatement",
            Self::EmptyStatement => "EmptyStatement",
            Self::DebuggerStatement => "DebuggerStatement",
            Self::ReturnStatement { .. } => "ReturnStatement",
            Self::BreakStatement { .. } => "BreakStatement",
            Self::ContinueStatement { .. } => "ContinueStatement",
            Self::LabeledStatement { .. } => "LabeledStatement",
            Self::IfStatement { .. } => "IfStatement",
            Self::SwitchStatement { .. } => "SwitchStatement",
            Self::SwitchCase { .. } => "SwitchCase",
            Self::ThrowStatement { .. } => "ThrowStatement",
            Self::TryStatement { .. } => "TryStatement",
            Self::CatchClause { .. } => "CatchClause",
            Self::WhileStatement { .. } => "WhileStatement",
            Self::DoWhileStatement { .. } => "DoWhileStatement",
            Self::ForStatement { .. } => "ForStatement",
            Self::ForInStatement { .. } => "ForInStatement",
            Self::ForOfStatement { .. } => "ForOfStatement",
            Self::FunctionDeclaration(_) => "FunctionDeclaration",
            Self::VariableDeclaration { .. } => "VariableDeclaration",
            Self::VariableDeclarator { .. } => "VariableDeclarator",
            Self::ClassDeclaration(_) => "ClassDeclaration",
            Self::ImportDeclaration { .. } => "ImportDeclaration",
            Self::ImportSpecifier { .. } => "ImportSpecifier",
            Self::ImportDefaultSpecifier { .. } => "ImportDefaultSpecifier",
            Self::ImportNamespaceSpecifier { .. } => "ImportNamespaceSpecifier",
            Self::ExportNamedDeclaration { .. } => "ExportNamedDeclaration",
            Self::ExportSpecifier { .. } => "ExportSpecifier",
            Self::ExportDefaultDeclaration { .. } => "ExportDefaultDeclaration",
            Self::ExportAllDeclaration { .. } => "ExportAllDeclaration",
            Self::Identifier { .. } => "Identifier",
            Self::Literal { .. } => "Literal",
            Self::ThisExpression => "ThisExpression",
            Self::Super => "Super",
            Self::ArrayExpression { .. } => "ArrayExpression",
            Self::ObjectExpression { .. } => "ObjectExpression",
            Self::Property { .. } => "Property",
            Self::FunctionExpression(_) => "FunctionExpression",
            Self::ArrowFunctionExpression(_) => "ArrowFunctionExpression",
            Self::ClassExpression(_) => "ClassExpression",
            Self::ClassBody { .. } => "ClassBody",
            Self::MethodDefinition { .. } => "MethodDefinition",
            Self::UnaryExpression { .. } => "UnaryExpression",
            Self::UpdateExpression { .. } => "UpdateExpression",
            Self::BinaryExpression { .. } => "BinaryExpression",
            Self::LogicalExpression { .. } => "LogicalExpression",
            Self::AssignmentExpression { .. } => "AssignmentExpression",
            Self::ConditionalExpression { .. } => "ConditionalExpression",
            Self::CallExpression { .. } => "CallExpression",
            Self::NewExpression { .. } => "NewExpression",
            Self::MemberExpression { .. } => "MemberExpression",
            Self::ChainExpression { .. } => "ChainExpression",
            Self::SequenceExpression { .. } => "SequenceExpression",
            Self::TemplateLiteral { .. } => "TemplateLiteral",
            Self::TemplateElement { .. } => "TemplateElement",
            Self::TaggedTemplateExpression { .. } => "TaggedTemplateExpression",
            Self::SpreadElement { .. } => "SpreadElement",
            Self::YieldExpression { .. } => "YieldExpression",
            Self::AwaitExpression { .. } => "AwaitExpression",
            Self::MetaProperty { .. } => "MetaProperty",
            Self::ImportExpression { .. } => "ImportExpression",
            Self::ArrayPattern { .. } => "ArrayPattern",
            Self::ObjectPattern { .. } => "ObjectPattern",
            Self::AssignmentPattern { .. } => "AssignmentPattern",
            Self::RestElement { .. } => "RestElement",
        }
    }

    #[must_use]
    pub const fn function_data(&self) -> Option<&FunctionData> {
        match self {
            Self::FunctionDeclaration(data)
            | Self::FunctionExpression(data)
            | Self::ArrowFunctionExpression(data) => Some(data),
            _ => None,
        }
    }

    #[must_use]
    pub const fn class_data(&self) -> Option<&ClassData> {
        match self {
            Self::ClassDeclaration(data) | Self::ClassExpression(data) => Some(data),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_loop(&self) -> bool {
        matches!(
            self,
            Self::WhileStatement { .. }
                | Self::DoWhileStatement { .. }
                | Self::ForStatement { .. }
                | Self::ForInStatement { .. }
                | Self::ForOfStatement { .. }
        )
    }

    /// Nodes whose children form a statement list rendered line by line.
    #[must_use]
    pub fn statement_list(&self) -> Option<&[NodeIndex]> {
        match self {
            Self::Program { body } | Self::BlockStatement { body } => Some(body),
            Self::SwitchCase { consequent, .. } => Some(consequent),
            _ => None,
        }
    }
}

/// One syntax element.
#[derive(Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub span: ByteSpan,
    pub parent: NodeIndex,
    /// Index of the module this node was built for.
    pub file: u32,
    included: Cell<bool>,
}

impl Node {
    #[must_use]
    pub const fn new(kind: NodeKind, span: ByteSpan, parent: NodeIndex, file: u32) -> Self {
        Self {
            kind,
            span,
            parent,
            file,
            included: Cell::new(false),
        }
    }

    #[must_use]
    pub fn is_included(&self) -> bool {
        self.included.get()
    }

    /// Mark the node included. Returns `true` if it was not included before.
    pub fn include(&self) -> bool {
        !self.included.replace(true)
    }

    #[must_use]
    pub const fn start(&self) -> u32 {
        self.span.start
    }

    #[must_use]
    pub const fn end(&self) -> u32 {
        self.span.end
    }
}
