//! Arena-allocated syntax tree for the shaker bundler core.
//!
//! Nodes of every module live in one `NodeArena` and are addressed by
//! `NodeIndex`. The tree is immutable in shape once built; the only mutable
//! state on a node is its monotonic `included` flag.
//!
//! Trees are constructed from ESTree JSON (as produced by acorn) by
//! [`estree::build_program`].

pub mod arena;
pub mod estree;
pub mod node;
pub mod operators;

pub use arena::NodeArena;
pub use estree::{AstError, build_program};
pub use node::{
    ClassData, FunctionData, LiteralValue, MethodKind, Node, NodeIndex, NodeKind, PropertyKind,
    VariableKind,
};
pub use operators::{
    AssignmentOperator, BinaryOperator, LogicalOperator, UnaryOperator, UpdateOperator,
};
