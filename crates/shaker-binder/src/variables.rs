//! Variables: named bindings held by scopes.

use crate::module::{ExternalId, ModuleId};
use crate::scope::ScopeId;
use shaker_ast::NodeIndex;
use shaker_common::Name;
use std::cell::Cell;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableId(pub u32);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VariableKind {
    /// `var`/`let`/`const`, function and class ids, catch parameters.
    Local,
    Parameter,
    /// The array-like `arguments` object of a non-arrow function.
    Arguments,
    /// `this` of a non-arrow function; its value is substituted per call.
    This,
    /// A free name, resolved against the host environment.
    Global,
    /// A binding imported from a module outside the build.
    External { module: ExternalId },
    /// The binding behind `export default`. When the default export is a
    /// named declaration or a plain identifier, `original` is that binding.
    ExportDefault {
        original: Option<VariableId>,
        has_id: bool,
    },
    /// The namespace object of a module (`import * as ns`).
    Namespace { module: ModuleId },
}

#[derive(Debug)]
pub struct Variable {
    pub name: Name,
    pub kind: VariableKind,
    pub scope: ScopeId,
    pub module: Option<ModuleId>,
    /// Declaring identifier nodes.
    pub declarations: Vec<NodeIndex>,
    /// Initialiser expression (function/class node for ids, the exported
    /// expression for default exports); `NONE` when unknown.
    pub init: NodeIndex,
    /// Declared as the id of a function or class declaration.
    pub is_id: bool,
    is_reassigned: Cell<bool>,
    included: Cell<bool>,
}

impl Variable {
    #[must_use]
    pub fn new(name: Name, kind: VariableKind, scope: ScopeId, module: Option<ModuleId>) -> Self {
        let included = matches!(kind, VariableKind::Global);
        Self {
            name,
            kind,
            scope,
            module,
            declarations: Vec::new(),
            init: NodeIndex::NONE,
            is_id: false,
            is_reassigned: Cell::new(false),
            included: Cell::new(included),
        }
    }

    #[must_use]
    pub fn is_reassigned(&self) -> bool {
        self.is_reassigned.get()
    }

    /// Mark the binding reassigned. Returns `true` on the first call.
    pub fn mark_reassigned(&self) -> bool {
        !self.is_reassigned.replace(true)
    }

    #[must_use]
    pub fn is_included(&self) -> bool {
        self.included.get()
    }

    /// Returns `true` if the variable was not included before.
    pub fn include(&self) -> bool {
        !self.included.replace(true)
    }

    #[must_use]
    pub const fn is_namespace(&self) -> bool {
        matches!(self.kind, VariableKind::Namespace { .. })
    }

    #[must_use]
    pub const fn is_external(&self) -> bool {
        matches!(self.kind, VariableKind::External { .. })
    }

    #[must_use]
    pub const fn is_global(&self) -> bool {
        matches!(self.kind, VariableKind::Global)
    }

    #[must_use]
    pub const fn is_default(&self) -> bool {
        matches!(self.kind, VariableKind::ExportDefault { .. })
    }

    /// Synthetic per-function bindings that never get renamed.
    #[must_use]
    pub const fn is_synthetic(&self) -> bool {
        matches!(self.kind, VariableKind::This | VariableKind::Arguments)
    }
}

#[derive(Debug, Default)]
pub struct VariableArena {
    variables: Vec<Variable>,
}

impl VariableArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, variable: Variable) -> VariableId {
        let id = VariableId(self.variables.len() as u32);
        self.variables.push(variable);
        id
    }

    #[must_use]
    pub fn get(&self, id: VariableId) -> Option<&Variable> {
        self.variables.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: VariableId) -> Option<&mut Variable> {
        self.variables.get_mut(id.0 as usize)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VariableId, &Variable)> {
        self.variables
            .iter()
            .enumerate()
            .map(|(i, v)| (VariableId(i as u32), v))
    }
}

impl std::ops::Index<VariableId> for VariableArena {
    type Output = Variable;

    fn index(&self, id: VariableId) -> &Variable {
        &self.variables[id.0 as usize]
    }
}
