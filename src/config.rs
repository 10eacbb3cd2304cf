//! JSON build configuration.
//!
//! A config file lists the modules of the build (source text and acorn
//! ESTree JSON on disk, plus how each import specifier resolves), the entry
//! modules and the output options. Keys are camelCase; relative paths are
//! resolved against the config file's directory.

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use serde::Deserialize;
use shaker_binder::ModuleInput;
use shaker_common::{BuildError, DiagnosticCode, OutputFormat, TreeshakeOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::bundle::BuildOptions;

/// `treeshake` accepts `true`, `false` or an options object.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum TreeshakeConfig {
    Enabled(bool),
    Options(TreeshakeOptions),
}

impl Default for TreeshakeConfig {
    fn default() -> Self {
        Self::Enabled(true)
    }
}

impl TreeshakeConfig {
    #[must_use]
    pub fn resolve(&self) -> Option<TreeshakeOptions> {
        match self {
            Self::Enabled(true) => Some(TreeshakeOptions::default()),
            Self::Enabled(false) => None,
            Self::Options(options) => Some(options.clone()),
        }
    }
}

/// One module of the build.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ModuleManifest {
    pub id: String,
    /// Path of the source text.
    pub code: PathBuf,
    /// Path of the ESTree JSON of the source.
    pub ast: PathBuf,
    /// Import specifier → module id.
    #[serde(default)]
    pub resolve: FxHashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ShakerConfig {
    #[serde(default)]
    pub modules: Vec<ModuleManifest>,
    #[serde(default)]
    pub entries: Vec<String>,
    #[serde(default)]
    pub out_dir: Option<PathBuf>,
    /// Kept as text so an unknown format is reported as a build error.
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub treeshake: TreeshakeConfig,
    #[serde(default)]
    pub paths: FxHashMap<String, String>,
    #[serde(default)]
    pub freeze: Option<bool>,
    #[serde(default)]
    pub prefer_const: Option<bool>,
    #[serde(default)]
    pub interop: Option<bool>,
    #[serde(default)]
    pub strict: Option<bool>,
    #[serde(default)]
    pub inline_dynamic_imports: bool,
    #[serde(default)]
    pub banner: Option<String>,
    #[serde(default)]
    pub footer: Option<String>,
    #[serde(default)]
    pub intro: Option<String>,
    #[serde(default)]
    pub outro: Option<String>,
}

pub fn parse_format(value: &str) -> Result<OutputFormat, BuildError> {
    value
        .parse()
        .map_err(|message: String| BuildError::new(DiagnosticCode::InvalidOption, &[message.as_str()]))
}

impl ShakerConfig {
    /// Build options with every unset value at its default.
    pub fn build_options(&self) -> Result<BuildOptions, BuildError> {
        let defaults = BuildOptions::default();
        let format = match self.format.as_deref() {
            Some(format) => parse_format(format)?,
            None => defaults.format,
        };
        Ok(BuildOptions {
            entries: self.entries.clone(),
            format,
            treeshake: self.treeshake.resolve(),
            paths: self.paths.clone(),
            freeze: self.freeze.unwrap_or(defaults.freeze),
            prefer_const: self.prefer_const.unwrap_or(defaults.prefer_const),
            interop: self.interop.unwrap_or(defaults.interop),
            strict: self.strict.unwrap_or(defaults.strict),
            inline_dynamic_imports: self.inline_dynamic_imports,
            banner: self.banner.clone().unwrap_or_default(),
            footer: self.footer.clone().unwrap_or_default(),
            intro: self.intro.clone().unwrap_or_default(),
            outro: self.outro.clone().unwrap_or_default(),
        })
    }

    /// Read the source text and tree of every listed module.
    pub fn load_inputs(&self, base_dir: &Path) -> Result<Vec<ModuleInput>> {
        self.modules
            .iter()
            .map(|manifest| load_module(manifest, base_dir))
            .collect()
    }
}

fn load_module(manifest: &ModuleManifest, base_dir: &Path) -> Result<ModuleInput> {
    let code_path = base_dir.join(&manifest.code);
    let code = std::fs::read_to_string(&code_path)
        .with_context(|| format!("failed to read module source: {}", code_path.display()))?;
    let ast_path = base_dir.join(&manifest.ast);
    let ast_text = std::fs::read_to_string(&ast_path)
        .with_context(|| format!("failed to read module tree: {}", ast_path.display()))?;
    let ast = serde_json::from_str(&ast_text)
        .with_context(|| format!("failed to parse module tree JSON: {}", ast_path.display()))?;
    let mut input = ModuleInput::new(manifest.id.clone(), code, ast);
    for (specifier, id) in &manifest.resolve {
        input = input.resolve(specifier, id);
    }
    Ok(input)
}

pub fn parse_config(source: &str) -> Result<ShakerConfig> {
    serde_json::from_str(source).context("failed to parse config JSON")
}

pub fn load_config(path: &Path) -> Result<ShakerConfig> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    let config =
        parse_config(&source).with_context(|| format!("failed to parse config: {}", path.display()))?;
    debug!(
        path = %path.display(),
        modules = config.modules.len(),
        entries = config.entries.len(),
        "loaded config"
    );
    Ok(config)
}

#[cfg(test)]
#[path = "../tests/config.rs"]
mod tests;
