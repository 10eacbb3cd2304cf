//! Fatal build errors.

use crate::diagnostics::{Diagnostic, DiagnosticCode};
use thiserror::Error;

/// A fatal error that aborts the current build.
#[derive(Debug, Clone, Error)]
pub enum BuildError {
    /// A diagnostic of error severity raised by one of the pipeline stages.
    #[error("{0}")]
    Fatal(Box<Diagnostic>),
}

impl BuildError {
    #[must_use]
    pub fn new(code: DiagnosticCode, args: &[&str]) -> Self {
        Self::Fatal(Box::new(Diagnostic::new(code, args)))
    }

    #[must_use]
    pub fn diagnostic(&self) -> &Diagnostic {
        match self {
            Self::Fatal(diagnostic) => diagnostic,
        }
    }

    #[must_use]
    pub fn diagnostic_mut(&mut self) -> &mut Diagnostic {
        match self {
            Self::Fatal(diagnostic) => diagnostic,
        }
    }

    #[must_use]
    pub fn code(&self) -> DiagnosticCode {
        self.diagnostic().code
    }
}

impl From<Diagnostic> for BuildError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self::Fatal(Box::new(diagnostic))
    }
}
