//! Identifier helpers: reserved words, legal names and rename suffixes.

use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;

pub const RESERVED_WORDS: &[&str] = &[
    "break", "case", "class", "catch", "const", "continue", "debugger", "default", "delete", "do",
    "else", "export", "extends", "finally", "for", "function", "if", "import", "in", "instanceof",
    "let", "new", "return", "super", "switch", "this", "throw", "try", "typeof", "var", "void",
    "while", "with", "yield", "enum", "await", "implements", "package", "protected", "static",
    "interface", "private", "public",
];

/// Built-in globals that a generated name must never shadow.
pub const BUILTINS: &[&str] = &[
    "Infinity", "NaN", "undefined", "null", "true", "false", "eval", "uneval", "isFinite",
    "isNaN", "parseFloat", "parseInt", "decodeURI", "decodeURIComponent", "encodeURI",
    "encodeURIComponent", "escape", "unescape", "Object", "Function", "Boolean", "Symbol",
    "Error", "EvalError", "InternalError", "RangeError", "ReferenceError", "SyntaxError",
    "TypeError", "URIError", "Number", "Math", "Date", "String", "RegExp", "Array", "Int8Array",
    "Uint8Array", "Uint8ClampedArray", "Int16Array", "Uint16Array", "Int32Array", "Uint32Array",
    "Float32Array", "Float64Array", "Map", "Set", "WeakMap", "WeakSet", "SIMD", "ArrayBuffer",
    "DataView", "JSON", "Promise", "Generator", "GeneratorFunction", "Reflect", "Proxy", "Intl",
];

static BLACKLISTED: Lazy<FxHashSet<&'static str>> =
    Lazy::new(|| RESERVED_WORDS.iter().chain(BUILTINS).copied().collect());

#[must_use]
pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

/// Turn an arbitrary string (usually a file base name) into a legal,
/// non-reserved identifier: `my-lib.js` becomes `myLib_js`.
#[must_use]
pub fn make_legal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 1);
    let mut chars = value.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '-'
            && let Some(&next) = chars.peek()
            && (next.is_ascii_alphanumeric() || next == '_')
        {
            out.extend(next.to_uppercase());
            chars.next();
            continue;
        }
        if ch.is_ascii_alphanumeric() || ch == '$' || ch == '_' {
            out.push(ch);
        } else {
            out.push('_');
        }
    }
    if out.is_empty()
        || out.as_bytes()[0].is_ascii_digit()
        || BLACKLISTED.contains(out.as_str())
    {
        out.insert(0, '_');
    }
    out
}

/// Strip directories and the extension from a module id.
#[must_use]
pub fn basename_without_extension(id: &str) -> &str {
    let base = id.rsplit(['/', '\\']).next().unwrap_or(id);
    match base.rfind('.') {
        Some(dot) if dot > 0 => &base[..dot],
        _ => base,
    }
}

const SUFFIX_ALPHABET: &[u8; 64] =
    b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_$";

/// Encode a rename counter in the compact 64-character suffix alphabet.
#[must_use]
pub fn to_base64(mut value: u32) -> String {
    let mut digits = Vec::new();
    loop {
        digits.push(SUFFIX_ALPHABET[(value % 64) as usize]);
        value /= 64;
        if value == 0 {
            break;
        }
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// Whether `name` is a syntactically valid identifier name usable as a
/// binding (ASCII subset; anything else is quoted where it is emitted).
#[must_use]
pub fn is_legal_identifier(name: &str) -> bool {
    let mut bytes = name.bytes();
    match bytes.next() {
        Some(b) if b.is_ascii_alphabetic() || b == b'_' || b == b'$' => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'$') && !is_reserved_word(name)
}

#[cfg(test)]
#[path = "../tests/identifiers.rs"]
mod tests;
