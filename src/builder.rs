//! Programmatic tree construction.
//!
//! Thin constructors over the same [`Key`]/[`Value`] types the parser
//! builds, plus an indented pretty-printer for inspection. Trees built here
//! serialize through [`ser`](crate::ser) exactly like parsed ones.

#[cfg(test)]
#[path = "./builder_tests.rs"]
mod tests;

use crate::key::{Key, KeyKind};
use crate::value::Value;
use std::fmt;

impl Value {
    /// A string value.
    pub fn string(text: impl Into<String>) -> Value {
        Value::String(text.into())
    }

    /// An integer value.
    pub fn integer(value: i64) -> Value {
        Value::Integer(value as f64)
    }

    /// A float value. Presentation (digit count, exponent form) is derived
    /// from the shortest display of `value`.
    pub fn float(value: f64) -> Value {
        let text = format!("{value}");
        if let Some(epos) = text.find(['e', 'E']) {
            let mantissa = &text[..epos];
            let precision = mantissa
                .find('.')
                .map(|dot| mantissa.len() - dot - 1)
                .unwrap_or(0);
            Value::Float {
                value,
                precision,
                scientific: true,
            }
        } else {
            // A whole-number float still prints one fractional digit.
            let precision = text.find('.').map(|dot| text.len() - dot - 1).unwrap_or(1);
            Value::Float {
                value,
                precision,
                scientific: false,
            }
        }
    }

    /// A boolean value.
    pub fn boolean(value: bool) -> Value {
        Value::Boolean(value)
    }

    /// An array value.
    pub fn array(items: Vec<Value>) -> Value {
        Value::Array(items)
    }

    /// An inline-table value over a built sub-tree.
    pub fn table(sub: Key) -> Value {
        Value::InlineTable(Box::new(sub))
    }
}

impl Key {
    /// An empty root table, equivalent to parsing an empty document.
    pub fn root() -> Key {
        Key::new(KeyKind::Table, String::from("root"))
    }

    /// A free-standing table key for building nested structures.
    pub fn table(id: impl Into<String>) -> Key {
        Key::new(KeyKind::TableLeaf, id.into())
    }

    /// Inserts (or replaces) a value under `id`, returning the new leaf.
    pub fn insert_value(&mut self, id: impl Into<String>, value: Value) -> &mut Key {
        let id = id.into();
        let mut leaf = Key::new(KeyKind::KeyLeaf, id.clone());
        leaf.value = Some(value);
        self.children.insert(id.clone(), leaf);
        self.children.get_mut(&id).expect("just inserted")
    }

    /// Inserts (or replaces) an empty subtable under `id`, returning it for
    /// further building.
    pub fn insert_table(&mut self, id: impl Into<String>) -> &mut Key {
        let id = id.into();
        self.children
            .insert(id.clone(), Key::new(KeyKind::TableLeaf, id.clone()));
        self.children.get_mut(&id).expect("just inserted")
    }

    /// Inserts (or replaces) a built subtree under its own identifier.
    pub fn insert_key(&mut self, key: Key) -> &mut Key {
        let id = key.id.clone();
        self.children.insert(id.clone(), key);
        self.children.get_mut(&id).expect("just inserted")
    }

    /// Removes and returns the direct child `id`.
    pub fn remove(&mut self, id: &str) -> Option<Key> {
        self.children.remove(id)
    }

    /// An indented, human-oriented rendering of the subtree.
    pub fn pretty(&self) -> Pretty<'_> {
        Pretty { key: self }
    }
}

/// Display adapter returned by [`Key::pretty`].
pub struct Pretty<'a> {
    key: &'a Key,
}

impl fmt::Display for Pretty<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_key(f, self.key, 0)
    }
}

fn pad(f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
    for _ in 0..indent {
        f.write_str("  ")?;
    }
    Ok(())
}

fn write_key(f: &mut fmt::Formatter<'_>, key: &Key, indent: usize) -> fmt::Result {
    if let Some(value) = key.value() {
        return write_value(f, value, indent);
    }
    writeln!(f, "{{")?;
    for child in key.children() {
        pad(f, indent + 1)?;
        write!(f, "{} = ", child.id())?;
        write_key(f, child, indent + 1)?;
        writeln!(f)?;
    }
    pad(f, indent)?;
    write!(f, "}}")
}

fn write_value(f: &mut fmt::Formatter<'_>, value: &Value, indent: usize) -> fmt::Result {
    match value {
        Value::String(s) => write!(f, "{s:?}"),
        Value::Integer(v) => write!(f, "{v:.0}"),
        Value::Float { value, .. } => write!(f, "{value}"),
        Value::Boolean(b) => write!(f, "{b}"),
        Value::Datetime(dt) => write!(f, "{}", dt.render()),
        Value::Array(items) => {
            writeln!(f, "[")?;
            for item in items {
                pad(f, indent + 1)?;
                write_value(f, item, indent + 1)?;
                writeln!(f)?;
            }
            pad(f, indent)?;
            write!(f, "]")
        }
        Value::InlineTable(sub) => write_key(f, sub, indent),
    }
}
