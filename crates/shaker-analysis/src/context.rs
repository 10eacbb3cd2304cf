//! Analysis contexts and call options.
//!
//! An [`AnalysisContext`] is immutable. Every `with_*` method returns a new
//! context that shares its tail with the old one, so sibling branches of a
//! query never observe each other's visit markers.

use crate::entity::Entity;
use bitflags::bitflags;
use shaker_ast::NodeIndex;
use shaker_binder::VariableId;
use shaker_common::{Name, ObjectPath, PathKey};
use std::rc::Rc;

/// Snapshot of one call site.
#[derive(Clone, Debug)]
pub struct CallOptions {
    pub is_new: bool,
    pub arguments: Rc<[NodeIndex]>,
    /// The call expression; identity only, used for recursion-guard keys.
    pub caller: NodeIndex,
}

impl CallOptions {
    #[must_use]
    pub fn new(is_new: bool, arguments: &[NodeIndex], caller: NodeIndex) -> Self {
        Self {
            is_new,
            arguments: Rc::from(arguments),
            caller,
        }
    }

    /// A call with no arguments and no caller, used for callbacks handed to
    /// known built-in methods.
    #[must_use]
    pub fn synthetic() -> Self {
        Self::new(false, &[], NodeIndex::NONE)
    }
}

/// What a memo entry guards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VisitKind {
    Access,
    Assign,
    Call,
    Literal,
    Return,
}

#[derive(Debug)]
struct Visit {
    kind: VisitKind,
    target: Entity,
    path: ObjectPath,
    caller: NodeIndex,
    next: Option<Rc<Visit>>,
}

#[derive(Debug)]
struct Link<T> {
    value: T,
    next: Option<Rc<Link<T>>>,
}

fn iter_links<T>(mut link: Option<&Rc<Link<T>>>) -> impl Iterator<Item = &T> {
    std::iter::from_fn(move || {
        let current = link?;
        link = current.next.as_ref();
        Some(&current.value)
    })
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ContextFlags: u8 {
        /// `break`/`continue` without a label leave only the enclosing loop.
        const IGNORE_BREAK = 1 << 0;
        /// `return`/`await`/`yield` inside an analysed call body.
        const IGNORE_RETURN_AWAIT_YIELD = 1 << 1;
    }
}

#[derive(Clone, Debug, Default)]
pub struct AnalysisContext {
    flags: ContextFlags,
    visits: Option<Rc<Visit>>,
    ignored_labels: Option<Rc<Link<Name>>>,
    replaced_inits: Option<Rc<Link<(VariableId, Entity)>>>,
    arguments: Option<Rc<[Entity]>>,
}

impl AnalysisContext {
    /// A fresh context: no visits, no substitutions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn flags(&self) -> ContextFlags {
        self.flags
    }

    #[must_use]
    pub const fn ignores_break(&self) -> bool {
        self.flags.contains(ContextFlags::IGNORE_BREAK)
    }

    #[must_use]
    pub const fn ignores_return_await_yield(&self) -> bool {
        self.flags.contains(ContextFlags::IGNORE_RETURN_AWAIT_YIELD)
    }

    #[must_use]
    pub fn with_ignore_break(&self) -> Self {
        let mut next = self.clone();
        next.flags.insert(ContextFlags::IGNORE_BREAK);
        next
    }

    #[must_use]
    pub fn with_ignored_label(&self, label: Name) -> Self {
        let mut next = self.clone();
        next.ignored_labels = Some(Rc::new(Link {
            value: label,
            next: self.ignored_labels.clone(),
        }));
        next
    }

    #[must_use]
    pub fn ignores_label(&self, label: &str) -> bool {
        iter_links(self.ignored_labels.as_ref()).any(|l| &**l == label)
    }

    /// Memo entry for `(kind, target, path, caller)`.
    #[must_use]
    pub fn with_visited(&self, kind: VisitKind, target: Entity, path: &[PathKey], caller: NodeIndex) -> Self {
        let mut next = self.clone();
        next.visits = Some(Rc::new(Visit {
            kind,
            target,
            path: path.iter().cloned().collect(),
            caller,
            next: self.visits.clone(),
        }));
        next
    }

    #[must_use]
    pub fn has_visited(&self, kind: VisitKind, target: Entity, path: &[PathKey], caller: NodeIndex) -> bool {
        let mut visit = self.visits.as_ref();
        while let Some(current) = visit {
            if current.kind == kind
                && current.target == target
                && current.caller == caller
                && current.path.as_slice() == path
            {
                return true;
            }
            visit = current.next.as_ref();
        }
        false
    }

    /// Substitute the value of a replaceable binding such as `this`.
    #[must_use]
    pub fn with_replaced_init(&self, variable: VariableId, init: Entity) -> Self {
        let mut next = self.clone();
        next.replaced_inits = Some(Rc::new(Link {
            value: (variable, init),
            next: self.replaced_inits.clone(),
        }));
        next
    }

    #[must_use]
    pub fn replaced_init(&self, variable: VariableId) -> Option<Entity> {
        iter_links(self.replaced_inits.as_ref())
            .find(|(v, _)| *v == variable)
            .map(|(_, init)| *init)
    }

    /// Arguments of the call currently being analysed, if any.
    #[must_use]
    pub fn arguments(&self) -> Option<&[Entity]> {
        self.arguments.as_deref()
    }

    /// The context for analysing the body of a function called with `call`.
    ///
    /// Visit memos carry over; loop and label state does not, and `return`
    /// stops counting as an effect.
    #[must_use]
    pub fn for_called_function(&self, this_variable: Option<VariableId>, call: &CallOptions) -> Self {
        let mut next = Self {
            flags: ContextFlags::IGNORE_RETURN_AWAIT_YIELD,
            visits: self.visits.clone(),
            ignored_labels: None,
            replaced_inits: self.replaced_inits.clone(),
            arguments: Some(call.arguments.iter().map(|&arg| Entity::Node(arg)).collect()),
        };
        if let Some(this) = this_variable {
            let init = if call.is_new {
                Entity::UnknownObject
            } else {
                Entity::Unknown
            };
            next = next.with_replaced_init(this, init);
        }
        next
    }

    /// The context for a nested call made while analysing a call body:
    /// visit memos and substitutions survive, flags reset.
    #[must_use]
    pub fn for_nested_call(&self) -> Self {
        Self {
            flags: ContextFlags::empty(),
            visits: self.visits.clone(),
            ignored_labels: None,
            replaced_inits: self.replaced_inits.clone(),
            arguments: self.arguments.clone(),
        }
    }
}

#[cfg(test)]
#[path = "../tests/context.rs"]
mod tests;
