//! Known members of the host environment.
//!
//! Calls to the functions listed here are treated as free of side effects,
//! and reading a member of a listed object never throws.

use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;
use shaker_common::PathKey;

const PURE_FUNCTIONS: &[&str] = &[
    "Array",
    "Array.isArray",
    "Array.of",
    "ArrayBuffer",
    "ArrayBuffer.isView",
    "Boolean",
    "DataView",
    "Date",
    "Date.UTC",
    "Date.now",
    "Date.parse",
    "Error",
    "EvalError",
    "RangeError",
    "ReferenceError",
    "SyntaxError",
    "TypeError",
    "URIError",
    "Float32Array",
    "Float64Array",
    "Int16Array",
    "Int32Array",
    "Int8Array",
    "Uint16Array",
    "Uint32Array",
    "Uint8Array",
    "Uint8ClampedArray",
    "Intl.Collator",
    "Intl.DateTimeFormat",
    "Intl.NumberFormat",
    "JSON.parse",
    "JSON.stringify",
    "Map",
    "Math.abs",
    "Math.acos",
    "Math.acosh",
    "Math.asin",
    "Math.asinh",
    "Math.atan",
    "Math.atan2",
    "Math.atanh",
    "Math.cbrt",
    "Math.ceil",
    "Math.clz32",
    "Math.cos",
    "Math.cosh",
    "Math.exp",
    "Math.expm1",
    "Math.floor",
    "Math.fround",
    "Math.hypot",
    "Math.imul",
    "Math.log",
    "Math.log10",
    "Math.log1p",
    "Math.log2",
    "Math.max",
    "Math.min",
    "Math.pow",
    "Math.random",
    "Math.round",
    "Math.sign",
    "Math.sin",
    "Math.sinh",
    "Math.sqrt",
    "Math.tan",
    "Math.tanh",
    "Math.trunc",
    "Number",
    "Number.isFinite",
    "Number.isInteger",
    "Number.isNaN",
    "Number.isSafeInteger",
    "Number.parseFloat",
    "Number.parseInt",
    "Object",
    "Object.create",
    "Object.entries",
    "Object.getOwnPropertyDescriptor",
    "Object.getOwnPropertyNames",
    "Object.getOwnPropertySymbols",
    "Object.getPrototypeOf",
    "Object.is",
    "Object.isExtensible",
    "Object.isFrozen",
    "Object.isSealed",
    "Object.keys",
    "Object.values",
    "Promise",
    "Promise.all",
    "Promise.race",
    "Promise.reject",
    "Promise.resolve",
    "RegExp",
    "Set",
    "String",
    "String.fromCharCode",
    "String.fromCodePoint",
    "String.raw",
    "Symbol",
    "Symbol.for",
    "Symbol.keyFor",
    "WeakMap",
    "WeakSet",
    "decodeURI",
    "decodeURIComponent",
    "encodeURI",
    "encodeURIComponent",
    "escape",
    "isFinite",
    "isNaN",
    "parseFloat",
    "parseInt",
    "unescape",
];

/// Non-function members that are safe to read.
const KNOWN_VALUES: &[&str] = &[
    "Atomics",
    "Intl",
    "JSON",
    "Math",
    "Math.E",
    "Math.LN10",
    "Math.LN2",
    "Math.LOG10E",
    "Math.LOG2E",
    "Math.PI",
    "Math.SQRT1_2",
    "Math.SQRT2",
    "Number.EPSILON",
    "Number.MAX_SAFE_INTEGER",
    "Number.MAX_VALUE",
    "Number.MIN_SAFE_INTEGER",
    "Number.MIN_VALUE",
    "Number.NEGATIVE_INFINITY",
    "Number.POSITIVE_INFINITY",
    "Reflect",
    "Symbol.asyncIterator",
    "Symbol.hasInstance",
    "Symbol.iterator",
    "Symbol.toPrimitive",
    "Symbol.toStringTag",
    "console",
];

static PURE: Lazy<FxHashSet<&'static str>> = Lazy::new(|| PURE_FUNCTIONS.iter().copied().collect());

static KNOWN: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    PURE_FUNCTIONS
        .iter()
        .chain(KNOWN_VALUES)
        .copied()
        .collect()
});

/// `name.a.b` for a path of static keys; `None` if any key is unknown.
fn dotted(name: &str, path: &[PathKey]) -> Option<String> {
    let mut joined = name.to_string();
    for key in path {
        joined.push('.');
        joined.push_str(key.as_name()?);
    }
    Some(joined)
}

/// Whether calling the global `name` at `path` is free of side effects.
#[must_use]
pub fn is_pure_call(name: &str, path: &[PathKey]) -> bool {
    dotted(name, path).is_some_and(|joined| PURE.contains(joined.as_str()))
}

/// Whether reading the member at `path` of the global `name` is free of
/// side effects: every object read through must be a known global.
#[must_use]
pub fn is_known_access(name: &str, path: &[PathKey]) -> bool {
    match path.split_last() {
        None => true,
        Some((_, objects)) => {
            dotted(name, objects).is_some_and(|joined| KNOWN.contains(joined.as_str()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(keys: &[&str]) -> Vec<PathKey> {
        keys.iter().map(|k| PathKey::name(k)).collect()
    }

    #[test]
    fn math_members_are_pure() {
        assert!(is_pure_call("Math", &path(&["floor"])));
        assert!(is_pure_call("parseInt", &[]));
        assert!(!is_pure_call("Math", &path(&["floor", "call"])));
        assert!(!is_pure_call("Object", &path(&["defineProperty"])));
        assert!(!is_pure_call("Math", &[PathKey::Unknown]));
    }

    #[test]
    fn reads_through_known_objects_only() {
        assert!(is_known_access("Math", &path(&["PI"])));
        assert!(is_known_access("Symbol", &path(&["iterator"])));
        assert!(!is_known_access("Math", &path(&["PI", "x", "y"])));
        assert!(!is_known_access("window", &path(&["foo"])));
        assert!(is_known_access("window", &[]));
    }
}
