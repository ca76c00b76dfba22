#![forbid(unsafe_code)]

//! Value classification and strict equality.
//!
//! Change propagation only needs to know three things about an incoming
//! value: is it a plain object (decompose it key by key), an array (compare
//! by identity, which an owned value never shares), or a scalar (compare by
//! value). [`Kind`] is that discriminator.

use serde_json::{Number, Value};

/// Coarse shape of a JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// `null`, booleans, numbers and strings.
    Scalar,
    /// A JSON array.
    Array,
    /// A JSON object.
    PlainObject,
}

impl Kind {
    /// Classify `value`.
    #[must_use]
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::PlainObject,
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => Self::Scalar,
        }
    }

    /// Stable lowercase name, for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Array => "array",
            Self::PlainObject => "object",
        }
    }
}

/// Strict equality between a stored value and an incoming one.
///
/// Scalars compare by value, with numbers compared numerically (`1 == 1.0`).
/// Arrays and objects never compare equal: an owned value handed to a write
/// is always a fresh reference, even when its contents match.
#[must_use]
pub fn strict_eq(current: &Value, incoming: &Value) -> bool {
    match (current, incoming) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => number_eq(a, b),
        _ => false,
    }
}

fn number_eq(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}
