//! Static resolution of namespace member accesses (`ns.name`).

use crate::graph::ModuleGraph;
use crate::module::ModuleId;
use crate::variables::{VariableId, VariableKind};
use shaker_ast::{NodeArena, NodeIndex, NodeKind};
use shaker_common::{Diagnostic, DiagnosticCode};

/// What a `ns.name` member expression statically refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberResolution {
    /// The exported binding; the member renders as that binding's name.
    Variable(VariableId),
    /// Not exported by the namespace's module; renders as `undefined`.
    Missing,
}

impl ModuleGraph {
    /// The module whose namespace object `expression` denotes, if any.
    pub(crate) fn namespace_module(&self, arena: &NodeArena, expression: NodeIndex) -> Option<ModuleId> {
        let variable = match arena.kind(expression)? {
            NodeKind::Identifier { .. } => self.reference(expression)?,
            NodeKind::MemberExpression { .. } => match self.member_resolution(expression)? {
                MemberResolution::Variable(variable) => variable,
                MemberResolution::Missing => return None,
            },
            _ => return None,
        };
        match self.variable(variable).kind {
            VariableKind::Namespace { module } => Some(module),
            _ => None,
        }
    }

    /// Resolve a member expression whose object is an internal namespace and
    /// whose key is static. Computed dynamic keys leave the namespace object
    /// in use as a whole.
    pub(crate) fn resolve_namespace_member(
        &mut self,
        arena: &NodeArena,
        member: NodeIndex,
        importer: ModuleId,
    ) -> Option<VariableId> {
        let Some(NodeKind::MemberExpression { object, .. }) = arena.kind(member) else {
            return None;
        };
        let target = self.namespace_module(arena, *object)?;
        let key = arena.member_key(member)?;
        match self.export_binding(target, &key) {
            Some(variable) => {
                self.member_resolutions
                    .insert(member, MemberResolution::Variable(variable));
                Some(variable)
            }
            None => {
                let exporter = &self.module(target).id;
                self.warn(
                    Diagnostic::new(DiagnosticCode::MissingExport, &[&*key, exporter.as_str()])
                        .at(&self.module(importer).id, arena.span(member).start),
                );
                self.member_resolutions.insert(member, MemberResolution::Missing);
                None
            }
        }
    }
}
