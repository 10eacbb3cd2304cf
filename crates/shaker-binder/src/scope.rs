//! Lexical scopes.
//!
//! Scope nesting mirrors the lexical nesting of scope-introducing nodes.
//! Lookup walks parent links; `var` and function-scoped declarations are
//! hoisted to the nearest function or module scope.

use crate::module::ModuleId;
use crate::variables::VariableId;
use indexmap::{IndexMap, IndexSet};
use shaker_ast::NodeIndex;
use shaker_common::Name;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Module,
    Function,
    Block,
    Catch,
    Class,
}

/// Extra state of function scopes.
#[derive(Debug, Default)]
pub struct FunctionScopeData {
    pub is_arrow: bool,
    pub is_async: bool,
    pub is_generator: bool,
    pub this_variable: Option<VariableId>,
    pub parameters: Vec<VariableId>,
    /// Argument of every `return` in the body; `NONE` for a bare `return;`.
    pub return_expressions: Vec<NodeIndex>,
}

#[derive(Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    /// The node that introduced the scope (`NONE` for the global scope).
    pub node: NodeIndex,
    pub module: Option<ModuleId>,
    pub variables: IndexMap<Name, VariableId>,
    pub children: Vec<ScopeId>,
    /// Variables declared outside this scope but referenced from inside it.
    pub accessed_outside: IndexSet<VariableId>,
    pub function: Option<FunctionScopeData>,
}

impl Scope {
    #[must_use]
    pub const fn is_hoisting_target(&self) -> bool {
        matches!(
            self.kind,
            ScopeKind::Function | ScopeKind::Module | ScopeKind::Global
        )
    }
}

#[derive(Debug, Default)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
}

impl ScopeArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(
        &mut self,
        kind: ScopeKind,
        parent: Option<ScopeId>,
        node: NodeIndex,
        module: Option<ModuleId>,
    ) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            kind,
            parent,
            node,
            module,
            variables: IndexMap::new(),
            children: Vec::new(),
            accessed_outside: IndexSet::new(),
            function: (kind == ScopeKind::Function).then(FunctionScopeData::default),
        });
        if let Some(parent) = parent
            && let Some(parent_scope) = self.scopes.get_mut(parent.0 as usize)
        {
            parent_scope.children.push(id);
        }
        id
    }

    #[must_use]
    pub fn get(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: ScopeId) -> Option<&mut Scope> {
        self.scopes.get_mut(id.0 as usize)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// The nearest function/module/global scope at or above `id`.
    #[must_use]
    pub fn hoisting_target(&self, mut id: ScopeId) -> ScopeId {
        while let Some(scope) = self.get(id) {
            if scope.is_hoisting_target() {
                return id;
            }
            match scope.parent {
                Some(parent) => id = parent,
                None => break,
            }
        }
        id
    }

    /// The nearest function scope at or above `id`, if any.
    #[must_use]
    pub fn enclosing_function(&self, mut id: ScopeId) -> Option<ScopeId> {
        loop {
            let scope = self.get(id)?;
            if scope.kind == ScopeKind::Function {
                return Some(id);
            }
            id = scope.parent?;
        }
    }

    /// The nearest non-arrow function scope, which supplies `this`.
    #[must_use]
    pub fn this_scope(&self, mut id: ScopeId) -> Option<ScopeId> {
        loop {
            let scope = self.get(id)?;
            if let Some(function) = &scope.function
                && !function.is_arrow
            {
                return Some(id);
            }
            id = scope.parent?;
        }
    }

    /// Look `name` up in `id` and its ancestors, stopping below the global
    /// scope. Returns the variable and the scope that holds it.
    #[must_use]
    pub fn lookup_local(&self, mut id: ScopeId, name: &str) -> Option<(VariableId, ScopeId)> {
        loop {
            let scope = self.get(id)?;
            if scope.kind == ScopeKind::Global {
                return None;
            }
            if let Some(&variable) = scope.variables.get(name) {
                return Some((variable, id));
            }
            id = scope.parent?;
        }
    }

    /// Record that `variable`, declared in `owner`, is referenced from `from`.
    pub fn mark_accessed_outside(&mut self, from: ScopeId, owner: Option<ScopeId>, variable: VariableId) {
        let mut current = Some(from);
        while let Some(id) = current {
            if Some(id) == owner {
                break;
            }
            let Some(scope) = self.get_mut(id) else { break };
            if scope.kind == ScopeKind::Global {
                break;
            }
            scope.accessed_outside.insert(variable);
            current = scope.parent;
        }
    }

    /// The enclosing module scope of `id`.
    #[must_use]
    pub fn module_scope(&self, mut id: ScopeId) -> Option<ScopeId> {
        loop {
            let scope = self.get(id)?;
            if scope.kind == ScopeKind::Module {
                return Some(id);
            }
            id = scope.parent?;
        }
    }
}

impl std::ops::Index<ScopeId> for ScopeArena {
    type Output = Scope;

    fn index(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }
}
