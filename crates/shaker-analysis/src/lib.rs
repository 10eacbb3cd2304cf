//! Effect and value analysis for the shaker bundler core.
//!
//! The [`Analyzer`] answers four families of questions about expressions,
//! each parameterised by a property path and an [`AnalysisContext`]:
//!
//! - does evaluating a node have an observable effect ([`Analyzer::has_effects`]),
//! - does accessing, assigning or calling a member reached by a path have an
//!   effect ([`Analyzer::accessed_at`], [`Analyzer::assigned_at`],
//!   [`Analyzer::called_at`]),
//! - what constant does a value fold to ([`Analyzer::literal_at`]),
//! - what can calling a value return ([`Analyzer::some_return_expression`]).
//!
//! Every query consults the context's visit memo before recursing and answers
//! the conservative default on a revisit, which is what makes the analysis
//! terminate on cyclic value flow. Inclusion ([`Analyzer::run_inclusion`])
//! repeats passes over all modules until nothing new is marked.

pub mod analyzer;
pub mod context;
pub mod effects;
pub mod entity;
pub mod globals;
pub mod include;
pub mod literals;
pub mod members;
pub mod paths;
pub mod reassign;
pub mod returns;
pub mod values;

pub use analyzer::Analyzer;
pub use context::{AnalysisContext, CallOptions, ContextFlags, VisitKind};
pub use entity::{Entity, PrimitiveType};
pub use include::InclusionStats;
pub use values::JsValue;

#[cfg(test)]
#[path = "../tests/support/mod.rs"]
pub(crate) mod test_support;
