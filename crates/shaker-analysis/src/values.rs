//! Constant folding with JavaScript coercion semantics.
//!
//! Folded values only ever steer inclusion decisions (which branch of an
//! `if` survives); they are never written into the output.

use shaker_ast::{BinaryOperator, LiteralValue, UnaryOperator};
use shaker_common::Name;

/// A primitive value known at bundle time.
#[derive(Clone, Debug, PartialEq)]
pub enum JsValue {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Name),
}

impl JsValue {
    /// The folded value of a literal; regular expressions and bigints are
    /// not folded.
    #[must_use]
    pub fn from_literal(value: &LiteralValue) -> Option<Self> {
        match value {
            LiteralValue::String(s) => Some(Self::String(s.clone())),
            LiteralValue::Number(n) => Some(Self::Number(*n)),
            LiteralValue::Boolean(b) => Some(Self::Bool(*b)),
            LiteralValue::Null => Some(Self::Null),
            LiteralValue::RegExp { .. } | LiteralValue::BigInt(_) => None,
        }
    }

    #[must_use]
    pub fn string(value: &str) -> Self {
        Self::String(Name::from(value))
    }

    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Undefined | Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
        }
    }

    #[must_use]
    pub const fn is_nullish(&self) -> bool {
        matches!(self, Self::Undefined | Self::Null)
    }

    #[must_use]
    pub fn to_number(&self) -> f64 {
        match self {
            Self::Undefined => f64::NAN,
            Self::Null => 0.0,
            Self::Bool(b) => f64::from(u8::from(*b)),
            Self::Number(n) => *n,
            Self::String(s) => string_to_number(s),
        }
    }

    #[must_use]
    pub fn to_js_string(&self) -> Name {
        match self {
            Self::Undefined => Name::from("undefined"),
            Self::Null => Name::from("null"),
            Self::Bool(b) => Name::from(if *b { "true" } else { "false" }),
            Self::Number(n) => Name::from(number_to_string(*n).as_str()),
            Self::String(s) => s.clone(),
        }
    }

    #[must_use]
    pub const fn type_of(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "object",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
        }
    }

    /// `===`
    #[must_use]
    pub fn strict_equals(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            _ => false,
        }
    }

    /// `==`
    #[must_use]
    pub fn loose_equals(&self, other: &Self) -> bool {
        match (self, other) {
            (a, b) if a.is_nullish() || b.is_nullish() => a.is_nullish() && b.is_nullish(),
            (Self::Number(_), Self::String(_)) | (Self::String(_), Self::Number(_)) => {
                self.to_number() == other.to_number()
            }
            (Self::Bool(_), _) => Self::Number(self.to_number()).loose_equals(other),
            (_, Self::Bool(_)) => self.loose_equals(&Self::Number(other.to_number())),
            _ => self.strict_equals(other),
        }
    }
}

/// JavaScript `ToNumber` on a string.
fn string_to_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    let radix = |digits: &str, radix: u32| {
        u64::from_str_radix(digits, radix).map_or(f64::NAN, |v| v as f64)
    };
    if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        return radix(hex, 16);
    }
    if let Some(octal) = trimmed.strip_prefix("0o").or_else(|| trimmed.strip_prefix("0O")) {
        return radix(octal, 8);
    }
    if let Some(binary) = trimmed.strip_prefix("0b").or_else(|| trimmed.strip_prefix("0B")) {
        return radix(binary, 2);
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    let numeric = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !numeric {
        return f64::NAN;
    }
    trimmed.parse().unwrap_or(f64::NAN)
}

/// JavaScript `Number.prototype.toString()` for radix 10.
#[must_use]
pub fn number_to_string(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let magnitude = value.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let formatted = format!("{value:e}");
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => formatted,
        };
    }
    format!("{value}")
}

fn to_int32(value: f64) -> i32 {
    if !value.is_finite() {
        return 0;
    }
    let wrapped = value.trunc().rem_euclid(4_294_967_296.0);
    wrapped as u32 as i32
}

fn to_uint32(value: f64) -> u32 {
    to_int32(value) as u32
}

fn compare_strings(a: &str, b: &str) -> std::cmp::Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}

/// Abstract relational comparison `left < right`; `None` when undefined
/// (a `NaN` operand).
fn less_than(left: &JsValue, right: &JsValue) -> Option<bool> {
    if let (JsValue::String(a), JsValue::String(b)) = (left, right) {
        return Some(compare_strings(a, b).is_lt());
    }
    let (a, b) = (left.to_number(), right.to_number());
    if a.is_nan() || b.is_nan() {
        return None;
    }
    Some(a < b)
}

fn power(base: f64, exponent: f64) -> f64 {
    if exponent.is_nan() || (base.abs() == 1.0 && exponent.is_infinite()) {
        return f64::NAN;
    }
    base.powf(exponent)
}

/// Fold a binary operator over two known operands.
#[must_use]
pub fn fold_binary(operator: BinaryOperator, left: &JsValue, right: &JsValue) -> Option<JsValue> {
    use BinaryOperator as Op;
    let number = |f: fn(f64, f64) -> f64| Some(JsValue::Number(f(left.to_number(), right.to_number())));
    let int32 = |f: fn(i32, i32) -> i32| {
        Some(JsValue::Number(f64::from(f(
            to_int32(left.to_number()),
            to_int32(right.to_number()),
        ))))
    };
    match operator {
        Op::Add => {
            if matches!(left, JsValue::String(_)) || matches!(right, JsValue::String(_)) {
                let mut joined = left.to_js_string().to_string();
                joined.push_str(&right.to_js_string());
                Some(JsValue::string(&joined))
            } else {
                number(|a, b| a + b)
            }
        }
        Op::Subtract => number(|a, b| a - b),
        Op::Multiply => number(|a, b| a * b),
        Op::Divide => number(|a, b| a / b),
        Op::Remainder => number(|a, b| a % b),
        Op::Exponent => number(power),
        Op::Equal => Some(JsValue::Bool(left.loose_equals(right))),
        Op::NotEqual => Some(JsValue::Bool(!left.loose_equals(right))),
        Op::StrictEqual => Some(JsValue::Bool(left.strict_equals(right))),
        Op::StrictNotEqual => Some(JsValue::Bool(!left.strict_equals(right))),
        Op::Less => Some(JsValue::Bool(less_than(left, right).unwrap_or(false))),
        Op::Greater => Some(JsValue::Bool(less_than(right, left).unwrap_or(false))),
        Op::LessEqual => Some(JsValue::Bool(less_than(right, left).is_some_and(|gt| !gt))),
        Op::GreaterEqual => Some(JsValue::Bool(less_than(left, right).is_some_and(|lt| !lt))),
        Op::BitOr => int32(|a, b| a | b),
        Op::BitXor => int32(|a, b| a ^ b),
        Op::BitAnd => int32(|a, b| a & b),
        Op::ShiftLeft => int32(|a, b| a.wrapping_shl(b as u32 & 31)),
        Op::ShiftRight => int32(|a, b| a.wrapping_shr(b as u32 & 31)),
        Op::ShiftRightUnsigned => {
            let shifted = to_uint32(left.to_number()) >> (to_uint32(right.to_number()) & 31);
            Some(JsValue::Number(f64::from(shifted)))
        }
        Op::In | Op::InstanceOf => None,
    }
}

/// Fold a unary operator over a known operand. `delete` is never folded.
#[must_use]
pub fn fold_unary(operator: UnaryOperator, value: &JsValue) -> Option<JsValue> {
    match operator {
        UnaryOperator::Minus => Some(JsValue::Number(-value.to_number())),
        UnaryOperator::Plus => Some(JsValue::Number(value.to_number())),
        UnaryOperator::Not => Some(JsValue::Bool(!value.is_truthy())),
        UnaryOperator::BitNot => Some(JsValue::Number(f64::from(!to_int32(value.to_number())))),
        UnaryOperator::TypeOf => Some(JsValue::string(value.type_of())),
        UnaryOperator::Void => Some(JsValue::Undefined),
        UnaryOperator::Delete => None,
    }
}

#[cfg(test)]
#[path = "../tests/values.rs"]
mod tests;
