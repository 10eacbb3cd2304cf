//! Property paths threaded through the analysis queries.
//!
//! A path is the sequence of member keys reached from a value: `a.b.c`
//! accessed from `a` is the path `[b, c]`. Keys that cannot be resolved
//! statically (computed members with unknown values) are `PathKey::Unknown`.

use crate::Name;
use crate::limits::MAX_PATH_DEPTH;
use smallvec::SmallVec;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathKey {
    Name(Name),
    Unknown,
}

impl PathKey {
    #[must_use]
    pub fn name(name: &str) -> Self {
        Self::Name(Name::from(name))
    }

    #[must_use]
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            Self::Unknown => None,
        }
    }

    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Unknown => f.write_str("<unknown>"),
        }
    }
}

pub type ObjectPath = SmallVec<[PathKey; 4]>;

/// The path used when a value escapes to code that may touch any member.
pub const UNKNOWN_PATH: &[PathKey] = &[PathKey::Unknown];

/// Build `[key, ...rest]`.
#[must_use]
pub fn prepend(key: PathKey, rest: &[PathKey]) -> ObjectPath {
    let mut path = ObjectPath::with_capacity(rest.len() + 1);
    path.push(key);
    path.extend(rest.iter().cloned());
    path
}

/// Whether a path is too deep to analyse.
#[must_use]
pub const fn exceeds_depth(path: &[PathKey]) -> bool {
    path.len() > MAX_PATH_DEPTH
}

/// Render a path as `a.b.<unknown>` for tracing output.
#[must_use]
pub fn display_path(path: &[PathKey]) -> String {
    let mut out = String::new();
    for (i, key) in path.iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        out.push_str(&key.to_string());
    }
    out
}
