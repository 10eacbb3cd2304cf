//! Output format and tree-shaking options consumed by the core.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target module format of a rendered chunk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    #[serde(alias = "esm", alias = "module")]
    Es,
    #[serde(alias = "commonjs")]
    Cjs,
    Amd,
    #[serde(alias = "systemjs")]
    System,
}

impl OutputFormat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Es => "es",
            Self::Cjs => "cjs",
            Self::Amd => "amd",
            Self::System => "system",
        }
    }

    /// Names the format's wrapper or runtime binds in the chunk's top scope.
    #[must_use]
    pub const fn reserved_names(self) -> &'static [&'static str] {
        match self {
            Self::Es => &[],
            Self::Cjs => &["exports", "module", "require", "_interopDefault"],
            Self::Amd => &["exports", "module", "require", "define", "_interopDefault"],
            Self::System => &["exports", "module", "_setter", "_starExcludes", "_$p"],
        }
    }

    /// Whether imports and exports are written as ES module syntax bindings,
    /// so external and cross-chunk imports get local names.
    #[must_use]
    pub const fn uses_local_import_names(self) -> bool {
        matches!(self, Self::Es | Self::System)
    }

    /// Whether exported mutable bindings need explicit `exports('x', …)` updates.
    #[must_use]
    pub const fn has_system_bindings(self) -> bool {
        matches!(self, Self::System)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "es" | "esm" | "module" => Ok(Self::Es),
            "cjs" | "commonjs" => Ok(Self::Cjs),
            "amd" => Ok(Self::Amd),
            "system" | "systemjs" => Ok(Self::System),
            other => Err(format!(
                "Invalid format: {other} - valid options are amd, cjs, system, es"
            )),
        }
    }
}

/// Tree-shaking behaviour switches.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TreeshakeOptions {
    /// Treat reading a property of an unknown value as potentially effectful
    /// (it might hit a getter or throw on `undefined`).
    pub property_read_side_effects: bool,
    /// External module ids whose imports have no side effects when unused.
    pub pure_external_modules: Vec<String>,
}

impl Default for TreeshakeOptions {
    fn default() -> Self {
        Self {
            property_read_side_effects: true,
            pure_external_modules: Vec::new(),
        }
    }
}

impl TreeshakeOptions {
    #[must_use]
    pub fn is_pure_external(&self, id: &str) -> bool {
        self.pure_external_modules.iter().any(|m| m == id)
    }
}
