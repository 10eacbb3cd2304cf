//! Human-readable diagnostic output.

use colored::Colorize;
use shaker_common::{Diagnostic, DiagnosticCategory};

pub struct Reporter {
    color: bool,
}

impl Reporter {
    #[must_use]
    pub const fn new(color: bool) -> Self {
        Self { color }
    }

    #[must_use]
    pub fn render(&self, diagnostics: &[Diagnostic]) -> String {
        let mut out = String::new();
        for (index, diagnostic) in diagnostics.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            out.push_str(&self.format_diagnostic(diagnostic));
        }
        out
    }

    /// `lib.js:3:4 - warning MISSING_EXPORT: 'x' is not exported by 'lib.js'`
    #[must_use]
    pub fn format_diagnostic(&self, diagnostic: &Diagnostic) -> String {
        let mut output = String::new();
        match (&diagnostic.module, diagnostic.location) {
            (Some(module), Some(location)) => {
                output.push_str(&self.format_location(&format!("{module}:{}:{}", location.line, location.column + 1)));
            }
            (Some(module), None) => output.push_str(&self.format_location(module)),
            (None, _) => output.push_str("<bundle>"),
        }
        output.push_str(" - ");
        output.push_str(&self.format_category(diagnostic.category));
        output.push(' ');
        output.push_str(&self.format_code(diagnostic));
        output.push_str(": ");
        output.push_str(&diagnostic.message);
        output
    }

    fn format_location(&self, location: &str) -> String {
        if self.color {
            location.cyan().to_string()
        } else {
            location.to_string()
        }
    }

    fn format_category(&self, category: DiagnosticCategory) -> String {
        let label = match category {
            DiagnosticCategory::Error => "error",
            DiagnosticCategory::Warning => "warning",
        };
        if !self.color {
            return label.to_string();
        }
        match category {
            DiagnosticCategory::Error => label.red().bold().to_string(),
            DiagnosticCategory::Warning => label.yellow().bold().to_string(),
        }
    }

    fn format_code(&self, diagnostic: &Diagnostic) -> String {
        let label = diagnostic.code.as_str();
        if self.color {
            label.bright_blue().to_string()
        } else {
            label.to_string()
        }
    }
}

#[cfg(test)]
#[path = "../tests/reporter.rs"]
mod tests;
