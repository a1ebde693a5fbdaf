//! The [`Value`] sum type: everything that can appear on the right of `=`.

#[cfg(test)]
#[path = "./value_tests.rs"]
mod tests;

use crate::key::Key;
use crate::time::Datetime;
use std::fmt;

/// A parsed TOML value.
///
/// Numeric payloads are stored as `f64` regardless of the tag; the tag
/// decides how they serialize. Floats additionally carry the digit count
/// after the decimal point and whether an exponent was present, so the
/// source presentation survives re-serialization.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// An integer (decimal, hex, octal or binary in the source).
    Integer(f64),
    /// A float.
    Float {
        /// The numeric value.
        value: f64,
        /// Digits after the decimal point in the source (0 when none).
        precision: usize,
        /// True when the source spelled an exponent.
        scientific: bool,
    },
    /// A boolean.
    Boolean(bool),
    /// A string (all four source flavors decode to this).
    String(String),
    /// An array of values.
    Array(Vec<Value>),
    /// An inline-table sub-root: a [`Key`] whose children are the pairs.
    /// Also the shape of each array-of-tables entry.
    InlineTable(Box<Key>),
    /// A datetime in one of the four temporal kinds.
    Datetime(Datetime),
}

impl Value {
    /// Gets the type of the value as a string.
    pub fn type_str(&self) -> &'static str {
        match self {
            Self::Integer(..) => "integer",
            Self::Float { .. } => "float",
            Self::Boolean(..) => "boolean",
            Self::String(..) => "string",
            Self::Array(..) => "array",
            Self::InlineTable(..) => "table",
            Self::Datetime(..) => "datetime",
        }
    }

    /// Returns the integer payload if this is an integer value.
    #[inline]
    pub fn as_integer(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns an `f64` if this is a float value.
    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// Returns a `bool` if this is a boolean value.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns a borrowed string if this is a string value.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the elements if this is an array value.
    #[inline]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the sub-root if this is an inline-table value.
    #[inline]
    pub fn as_table(&self) -> Option<&Key> {
        match self {
            Self::InlineTable(key) => Some(key),
            _ => None,
        }
    }

    /// Returns the datetime if this is a datetime value.
    #[inline]
    pub fn as_datetime(&self) -> Option<&Datetime> {
        match self {
            Self::Datetime(dt) => Some(dt),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn as_table_mut(&mut self) -> Option<&mut Key> {
        match self {
            Self::InlineTable(key) => Some(key),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::ser::dump_value(self))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Value {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Value::Integer(v) => {
                // Integral payloads within i64 range serialize as integers.
                if v.fract() == 0.0 && *v >= i64::MIN as f64 && *v <= i64::MAX as f64 {
                    ser.serialize_i64(*v as i64)
                } else {
                    ser.serialize_f64(*v)
                }
            }
            Value::Float { value, .. } => ser.serialize_f64(*value),
            Value::Boolean(b) => ser.serialize_bool(*b),
            Value::String(s) => ser.serialize_str(s),
            Value::Array(items) => {
                use serde::ser::SerializeSeq;
                let mut seq = ser.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::InlineTable(key) => key.serialize(ser),
            Value::Datetime(dt) => ser.serialize_str(&dt.render()),
        }
    }
}
