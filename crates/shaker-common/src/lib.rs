//! Common types and utilities for the shaker bundler core.
//!
//! This crate provides the vocabulary shared by every pipeline stage:
//! - Source spans (`ByteSpan`) and line/column mapping (`LineMap`, `Location`)
//! - Property paths used by the analysis queries (`PathKey`, `ObjectPath`)
//! - Analysis limits and thresholds
//! - Diagnostics, the warning sink and the fatal `BuildError`
//! - Output formats and tree-shaking options
//! - Identifier helpers (legal names, reserved words, rename suffixes)

use std::rc::Rc;

/// Shared, cheaply clonable identifier or property name.
pub type Name = Rc<str>;

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::ByteSpan;

// Position types for line/column source locations
pub mod position;
pub use position::{LineMap, Location, Utf16Offsets};

// Centralized limits and thresholds
pub mod limits;

// Property paths
pub mod paths;
pub use paths::{ObjectPath, PathKey, UNKNOWN_PATH};

// Diagnostics and errors
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticCode, DiagnosticSink};
pub mod error;
pub use error::BuildError;

// Build options
pub mod options;
pub use options::{OutputFormat, TreeshakeOptions};

// Identifier helpers
pub mod identifiers;
