//! Values the analysis reasons about.

use shaker_ast::NodeIndex;
use shaker_binder::VariableId;

/// Primitive produced by a known built-in member call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    String,
    Number,
    Boolean,
}

/// Anything a query can be asked about: an expression node, a variable, or
/// one of the synthetic stand-ins for values the analysis cannot see.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Entity {
    Node(NodeIndex),
    Variable(VariableId),
    /// Any value; every member access, assignment and call is effectful.
    Unknown,
    /// A fresh object of unknown shape (the result of `new`, or `this`
    /// inside a constructor call). Its own members are safe to touch.
    UnknownObject,
    /// The value `undefined`.
    Undefined,
    /// A primitive of known type but unknown value.
    Primitive(PrimitiveType),
}

impl Entity {
    /// `Node` for a present slot, `Undefined` for an absent one.
    #[must_use]
    pub const fn node_or_undefined(idx: NodeIndex) -> Self {
        if idx.is_none() {
            Self::Undefined
        } else {
            Self::Node(idx)
        }
    }
}
