//! Scope and variable binding for the shaker bundler core.
//!
//! The binder owns the whole module graph of a build: the node arena, every
//! scope and variable, and the import/export tables of each module. Binding
//! runs in two passes:
//!
//! 1. [`ModuleGraph::add_module`] builds a module's tree and declares its
//!    bindings into freshly created scopes (`declare.rs`).
//! 2. [`ModuleGraph::link`] resolves module sources, computes star exports,
//!    traces export names across modules and binds every identifier
//!    occurrence to its variable (`resolve.rs`, `namespace.rs`).

pub mod declare;
pub mod graph;
pub mod module;
pub mod namespace;
pub mod resolve;
pub mod scope;
pub mod variables;

pub use graph::ModuleGraph;
pub use module::{
    ExportDescription, ExternalId, ExternalModule, ImportDescription, Module, ModuleId,
    ModuleInput, ModuleRef, ReexportDescription,
};
pub use namespace::MemberResolution;
pub use scope::{FunctionScopeData, Scope, ScopeArena, ScopeId, ScopeKind};
pub use variables::{Variable, VariableArena, VariableId, VariableKind};
