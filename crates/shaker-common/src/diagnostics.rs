//! Diagnostic types, message templates and the warning sink.
//!
//! Every diagnostic carries a stable machine-readable code, a human message
//! and, when raised from a node, the originating byte offset. The driver maps
//! offsets to a `Location` before handing diagnostics to the caller.

use crate::position::{LineMap, Location};
use serde::Serialize;
use std::cell::RefCell;
use std::fmt;

/// Diagnostic category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Warning = 0,
    Error = 1,
}

/// Stable diagnostic codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    UnusedExternalImport,
    MissingExport,
    Eval,
    ThisIsUndefined,
    IllegalReassignment,
    IllegalNamespaceReassignment,
    CannotCallNamespace,
    SourcemapBroken,
    CircularDependency,
    NamespaceConflict,
    EmptyBundle,
    UnresolvedImport,
    UnresolvedEntry,
    ParseError,
    InvalidOption,
}

/// A diagnostic message definition with category and message template.
#[derive(Clone, Copy, Debug)]
pub struct DiagnosticMessage {
    pub code: DiagnosticCode,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

pub const DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
    DiagnosticMessage {
        code: DiagnosticCode::UnusedExternalImport,
        category: DiagnosticCategory::Warning,
        message: "{0} imported from external module '{1}' but never used",
    },
    DiagnosticMessage {
        code: DiagnosticCode::MissingExport,
        category: DiagnosticCategory::Warning,
        message: "'{0}' is not exported by '{1}'",
    },
    DiagnosticMessage {
        code: DiagnosticCode::Eval,
        category: DiagnosticCategory::Warning,
        message: "Use of eval is strongly discouraged, as it poses security risks and may cause issues with minification",
    },
    DiagnosticMessage {
        code: DiagnosticCode::ThisIsUndefined,
        category: DiagnosticCategory::Warning,
        message: "The 'this' keyword is equivalent to 'undefined' at the top level of an ES module, and has been rewritten",
    },
    DiagnosticMessage {
        code: DiagnosticCode::IllegalReassignment,
        category: DiagnosticCategory::Error,
        message: "Illegal reassignment to import '{0}'",
    },
    DiagnosticMessage {
        code: DiagnosticCode::IllegalNamespaceReassignment,
        category: DiagnosticCategory::Error,
        message: "Illegal reassignment to import '{0}'",
    },
    DiagnosticMessage {
        code: DiagnosticCode::CannotCallNamespace,
        category: DiagnosticCategory::Error,
        message: "Cannot call a namespace ('{0}')",
    },
    DiagnosticMessage {
        code: DiagnosticCode::SourcemapBroken,
        category: DiagnosticCategory::Error,
        message: "Broken source map for '{0}': {1}",
    },
    DiagnosticMessage {
        code: DiagnosticCode::CircularDependency,
        category: DiagnosticCategory::Warning,
        message: "Circular dependency: {0}",
    },
    DiagnosticMessage {
        code: DiagnosticCode::NamespaceConflict,
        category: DiagnosticCategory::Warning,
        message: "Conflicting namespaces: {0} re-exports '{1}' from both {2} and {3} (will be ignored)",
    },
    DiagnosticMessage {
        code: DiagnosticCode::EmptyBundle,
        category: DiagnosticCategory::Warning,
        message: "Generated an empty bundle",
    },
    DiagnosticMessage {
        code: DiagnosticCode::UnresolvedImport,
        category: DiagnosticCategory::Warning,
        message: "'{0}' is imported by {1}, but could not be resolved - treating it as an external dependency",
    },
    DiagnosticMessage {
        code: DiagnosticCode::UnresolvedEntry,
        category: DiagnosticCategory::Error,
        message: "Could not resolve entry module '{0}'",
    },
    DiagnosticMessage {
        code: DiagnosticCode::ParseError,
        category: DiagnosticCategory::Error,
        message: "Invalid syntax tree for '{0}': {1}",
    },
    DiagnosticMessage {
        code: DiagnosticCode::InvalidOption,
        category: DiagnosticCategory::Error,
        message: "{0}",
    },
];

impl DiagnosticCode {
    /// The stable `SCREAMING_SNAKE` identifier of this code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnusedExternalImport => "UNUSED_EXTERNAL_IMPORT",
            Self::MissingExport => "MISSING_EXPORT",
            Self::Eval => "EVAL",
            Self::ThisIsUndefined => "THIS_IS_UNDEFINED",
            Self::IllegalReassignment => "ILLEGAL_REASSIGNMENT",
            Self::IllegalNamespaceReassignment => "ILLEGAL_NAMESPACE_REASSIGNMENT",
            Self::CannotCallNamespace => "CANNOT_CALL_NAMESPACE",
            Self::SourcemapBroken => "SOURCEMAP_BROKEN",
            Self::CircularDependency => "CIRCULAR_DEPENDENCY",
            Self::NamespaceConflict => "NAMESPACE_CONFLICT",
            Self::EmptyBundle => "EMPTY_BUNDLE",
            Self::UnresolvedImport => "UNRESOLVED_IMPORT",
            Self::UnresolvedEntry => "UNRESOLVED_ENTRY",
            Self::ParseError => "PARSE_ERROR",
            Self::InvalidOption => "INVALID_OPTION",
        }
    }

    fn definition(self) -> &'static DiagnosticMessage {
        // Every code has exactly one entry; the fallback is unreachable in practice.
        DIAGNOSTIC_MESSAGES
            .iter()
            .find(|m| m.code == self)
            .unwrap_or(&DIAGNOSTIC_MESSAGES[DIAGNOSTIC_MESSAGES.len() - 1])
    }

    #[must_use]
    pub fn category(self) -> DiagnosticCategory {
        self.definition().category
    }

    #[must_use]
    pub fn template(self) -> &'static str {
        self.definition().message
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A warning or error raised by the bundler core.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub category: DiagnosticCategory,
    pub message: String,
    /// Id of the module the diagnostic was raised in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    /// Byte offset into the module's source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl Diagnostic {
    /// Create a diagnostic from its code's template.
    #[must_use]
    pub fn new(code: DiagnosticCode, args: &[&str]) -> Self {
        Self {
            code,
            category: code.category(),
            message: format_message(code.template(), args),
            module: None,
            pos: None,
            location: None,
        }
    }

    /// Attach the originating module and byte offset.
    #[must_use]
    pub fn at(mut self, module: &str, pos: u32) -> Self {
        self.module = Some(module.to_string());
        self.pos = Some(pos);
        self
    }

    #[must_use]
    pub fn in_module(mut self, module: &str) -> Self {
        self.module = Some(module.to_string());
        self
    }

    /// Resolve `pos` into a line/column location.
    pub fn locate(&mut self, line_map: &LineMap) {
        if let Some(pos) = self.pos {
            self.location = Some(line_map.locate(pos));
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) ", self.code)?;
        if let Some(module) = &self.module {
            f.write_str(module)?;
            if let Some(loc) = self.location {
                write!(f, " ({}:{})", loc.line, loc.column)?;
            }
            f.write_str(": ")?;
        }
        f.write_str(&self.message)
    }
}

/// Format a diagnostic message by replacing {0}, {1}, etc. with arguments.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

/// Accumulates recoverable diagnostics.
///
/// Analysis queries take `&self`, so the sink uses interior mutability.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl DiagnosticSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, diagnostic: Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.diagnostics.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.borrow().is_empty()
    }

    /// Whether any diagnostic with `code` has been recorded.
    #[must_use]
    pub fn contains(&self, code: DiagnosticCode) -> bool {
        self.diagnostics.borrow().iter().any(|d| d.code == code)
    }

    /// Drain all accumulated diagnostics.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.borrow_mut())
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }
}

#[cfg(test)]
#[path = "../tests/diagnostics.rs"]
mod tests;
