//! Typed-JSON serialization of a parsed tree, used for cross-implementation
//! conformance testing.
//!
//! Every scalar becomes `{"type": <tag>, "value": "<stringified>"}`, arrays
//! become JSON arrays, tables become JSON objects keyed by identifier, and
//! array-of-tables become arrays of entry objects. Numbers are formatted
//! from the stored precision/scientific flags and datetimes through their
//! recorded render format, so the output is canonical for the source
//! presentation. Child-key ordering is unspecified.

#[cfg(test)]
#[path = "./ser_tests.rs"]
mod tests;

use crate::key::{Key, KeyKind};
use crate::time::DatetimeKind;
use crate::value::Value;
use std::fmt::{self, Write as _};
use std::io;

/// A growable output buffer: format-and-append, reallocating as needed.
///
/// This is the primitive the dump functions assemble output with; it is
/// public so callers can interleave their own text with dumped fragments.
#[derive(Default)]
pub struct Buffer {
    out: String,
}

impl Buffer {
    /// Creates an empty buffer.
    pub fn new() -> Buffer {
        Buffer::default()
    }

    /// Appends literal text.
    #[inline]
    pub fn append(&mut self, text: &str) {
        self.out.push_str(text);
    }

    /// Formats into the buffer, growing it as needed.
    #[inline]
    pub fn append_fmt(&mut self, args: fmt::Arguments<'_>) {
        // Writing into a String cannot fail.
        let _ = self.out.write_fmt(args);
    }

    /// The accumulated text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.out
    }

    /// Number of bytes accumulated.
    #[inline]
    pub fn len(&self) -> usize {
        self.out.len()
    }

    /// True when nothing has been appended.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    /// Consumes the buffer, returning the text.
    #[inline]
    pub fn into_string(self) -> String {
        self.out
    }
}

impl fmt::Write for Buffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.out.push_str(s);
        Ok(())
    }
}

/// Serializes a tree to its typed-JSON form. Called on the root this emits
/// the children object directly, without a wrapper key.
pub fn dumps(key: &Key) -> String {
    let mut buf = Buffer::new();
    write_key(&mut buf, key);
    buf.into_string()
}

/// Serializes a single value to its typed-JSON form.
pub fn dump_value(value: &Value) -> String {
    let mut buf = Buffer::new();
    write_value(&mut buf, value);
    buf.into_string()
}

/// Serializes a tree and writes it to `writer`.
pub fn dump_to<W: io::Write>(key: &Key, writer: &mut W) -> io::Result<()> {
    writer.write_all(dumps(key).as_bytes())
}

/// Appends the typed-JSON encoding of `key` (its value, entry array, or
/// children object) to `buf`.
pub fn write_key(buf: &mut Buffer, key: &Key) {
    if key.kind() == KeyKind::ArrayTable {
        let entries = key.get_array().unwrap_or(&[]);
        buf.append("[");
        for (i, entry) in entries.iter().enumerate() {
            if i > 0 {
                buf.append(", ");
            }
            write_value(buf, entry);
        }
        buf.append("]");
        return;
    }
    if let Some(value) = key.value() {
        write_value(buf, value);
        return;
    }
    write_table(buf, key);
}

fn write_table(buf: &mut Buffer, key: &Key) {
    buf.append("{");
    let mut first = true;
    for child in key.children() {
        if !first {
            buf.append(", ");
        }
        write_escaped(buf, child.id());
        buf.append(": ");
        write_key(buf, child);
        first = false;
    }
    buf.append("}");
}

/// Appends the typed-JSON encoding of one value.
pub fn write_value(buf: &mut Buffer, value: &Value) {
    match value {
        Value::String(s) => {
            buf.append("{\"type\": \"string\", \"value\": ");
            write_escaped(buf, s);
            buf.append("}");
        }
        Value::Integer(v) => {
            buf.append_fmt(format_args!(
                "{{\"type\": \"integer\", \"value\": \"{v:.0}\"}}"
            ));
        }
        Value::Float {
            value,
            precision,
            scientific,
        } => {
            buf.append("{\"type\": \"float\", \"value\": \"");
            buf.append(&float_repr(*value, *precision, *scientific));
            buf.append("\"}");
        }
        Value::Boolean(b) => {
            buf.append_fmt(format_args!("{{\"type\": \"bool\", \"value\": \"{b}\"}}"));
        }
        Value::Datetime(dt) => {
            let tag = match dt.kind() {
                DatetimeKind::OffsetDatetime => "datetime",
                DatetimeKind::LocalDatetime => "datetime-local",
                DatetimeKind::LocalDate => "date-local",
                DatetimeKind::LocalTime => "time-local",
            };
            buf.append_fmt(format_args!(
                "{{\"type\": \"{tag}\", \"value\": \"{}\"}}",
                dt.render()
            ));
        }
        Value::Array(items) => {
            buf.append("[");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    buf.append(", ");
                }
                write_value(buf, item);
            }
            buf.append("]");
        }
        Value::InlineTable(key) => {
            write_table(buf, key);
        }
    }
}

/// JSON string escaping: `\b \n \r \t \f \\ \"` get escape spellings, every
/// other character is copied verbatim (the parser already guarantees valid
/// UTF-8 and rejects unescaped controls).
fn write_escaped(buf: &mut Buffer, text: &str) {
    buf.append("\"");
    for c in text.chars() {
        match c {
            '\u{8}' => buf.append("\\b"),
            '\n' => buf.append("\\n"),
            '\r' => buf.append("\\r"),
            '\t' => buf.append("\\t"),
            '\u{c}' => buf.append("\\f"),
            '\\' => buf.append("\\\\"),
            '"' => buf.append("\\\""),
            _ => buf.append_fmt(format_args!("{c}")),
        }
    }
    buf.append("\"");
}

fn float_repr(value: f64, precision: usize, scientific: bool) -> String {
    if value == f64::INFINITY {
        return String::from("inf");
    }
    if value == f64::NEG_INFINITY {
        return String::from("-inf");
    }
    if value.is_nan() {
        return String::from("nan");
    }
    if scientific {
        return scientific_repr(value, precision);
    }
    if value == 0.0 {
        return String::from("0.0");
    }
    format!("{value:.precision$}")
}

/// `mantissa e±XX` with `precision` digits after the mantissa's decimal
/// point and a two-digit (minimum) exponent: `5e+02`, `1.5e-03`.
fn scientific_repr(value: f64, precision: usize) -> String {
    if value == 0.0 {
        return format!("{:.precision$}e+00", 0.0);
    }
    let negative = value < 0.0;
    let magnitude = value.abs();
    let mut exp = magnitude.log10().floor() as i32;
    let raw = magnitude / 10f64.powi(exp);
    // Rounding at the requested precision can carry the mantissa to 10.
    let mut mantissa: f64 = format!("{raw:.precision$}").parse().unwrap_or(raw);
    if mantissa >= 10.0 {
        mantissa /= 10.0;
        exp += 1;
    }
    format!(
        "{}{mantissa:.precision$}e{}{:02}",
        if negative { "-" } else { "" },
        if exp < 0 { '-' } else { '+' },
        exp.abs()
    )
}
