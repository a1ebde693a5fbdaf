//! The key tree. Nodes are keys: a kind tag, an identifier, a map of child
//! keys, and an optional value slot.
//!
//! Child keys are stored in a hash map keyed by identifier; iteration order
//! is unspecified and nothing downstream relies on it.

#[cfg(test)]
#[path = "./key_tests.rs"]
mod tests;

use crate::time::Datetime;
use crate::value::Value;
use foldhash::HashMap;

/// How a key was introduced, which controls how it may be redefined.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum KeyKind {
    /// Intermediate segment of a dotted-key assignment (`a` in `a.b = 1`).
    Key,
    /// Intermediate segment of a table header (`a` in `[a.b]`).
    Table,
    /// Final segment of a dotted-key assignment; holds the value.
    KeyLeaf,
    /// Final segment of a table header.
    TableLeaf,
    /// Final segment of `[[t]]`; the value slot holds the entry array.
    ArrayTable,
}

/// A node in the parsed tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Key {
    pub(crate) kind: KeyKind,
    pub(crate) id: String,
    pub(crate) children: HashMap<String, Key>,
    pub(crate) value: Option<Value>,
    /// Index of the most recently opened `[[t]]` entry; `None` until the
    /// first entry exists. Only meaningful for `ArrayTable` keys.
    pub(crate) idx: Option<usize>,
}

/// Why [`Key::add_subkey`] refused an insertion.
pub(crate) enum AddError {
    /// The redefinition matrix forbids the (existing, incoming) pair.
    Conflict {
        existing: KeyKind,
        incoming: KeyKind,
    },
    /// The parent already holds the maximum number of subkeys.
    TooManySubkeys,
}

/// The redefinition matrix: may a key that exists with `existing` kind be
/// re-introduced with `incoming` kind?
///
/// | existing \ incoming | Key | Table | KeyLeaf | TableLeaf | ArrayTable |
/// |---|---|---|---|---|---|
/// | Key        | yes | yes | no | no  | no |
/// | Table      | yes | yes | no | yes | no |
/// | KeyLeaf    | no  | no  | no | no  | no |
/// | TableLeaf  | yes | yes | no | no  | no |
/// | ArrayTable | no  | yes | no | no  | yes |
///
/// `Table × TableLeaf` additionally mutates the existing node to
/// `TableLeaf`, so a second `[a]` header lands on the `TableLeaf` row and is
/// refused as a duplicate table.
pub(crate) fn compatible(existing: KeyKind, incoming: KeyKind) -> bool {
    use KeyKind::*;
    match (existing, incoming) {
        (KeyLeaf, _) => false,
        (Key, Key | Table) => true,
        (Table, Key | Table | TableLeaf) => true,
        (TableLeaf, Key | Table) => true,
        (ArrayTable, Table | ArrayTable) => true,
        _ => false,
    }
}

impl Key {
    pub(crate) fn new(kind: KeyKind, id: String) -> Key {
        Key {
            kind,
            id,
            children: HashMap::default(),
            value: None,
            idx: None,
        }
    }

    /// The kind tag of this key.
    #[inline]
    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    /// The identifier of this key (empty for the root and for array-table
    /// entry sub-roots).
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The value slot, if this key holds one.
    #[inline]
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Number of direct children.
    #[inline]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// True when this key has no children.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Iterates the direct children in unspecified order.
    pub fn children(&self) -> impl Iterator<Item = &Key> {
        self.children.values()
    }

    /// Returns a direct child by identifier, or this key itself when its own
    /// identifier matches.
    pub fn get_key(&self, id: &str) -> Option<&Key> {
        if self.id == id {
            return Some(self);
        }
        self.children.get(id)
    }

    /// The integer payload, iff this key holds an integer value.
    #[inline]
    pub fn get_int(&self) -> Option<f64> {
        self.value.as_ref()?.as_integer()
    }

    /// The boolean payload, iff this key holds a boolean value.
    #[inline]
    pub fn get_bool(&self) -> Option<bool> {
        self.value.as_ref()?.as_bool()
    }

    /// The string payload, iff this key holds a string value.
    #[inline]
    pub fn get_string(&self) -> Option<&str> {
        self.value.as_ref()?.as_str()
    }

    /// The float payload, iff this key holds a float value.
    #[inline]
    pub fn get_float(&self) -> Option<f64> {
        self.value.as_ref()?.as_float()
    }

    /// The elements, iff this key holds an array value (for `ArrayTable`
    /// keys these are the entry sub-roots).
    #[inline]
    pub fn get_array(&self) -> Option<&[Value]> {
        self.value.as_ref()?.as_array()
    }

    /// The datetime payload, iff this key holds a datetime value.
    #[inline]
    pub fn get_datetime(&self) -> Option<&Datetime> {
        self.value.as_ref()?.as_datetime()
    }

    /// The sub-root of the most recently opened `[[t]]` entry.
    pub(crate) fn current_entry_mut(&mut self) -> Option<&mut Key> {
        let idx = self.idx?;
        match self.value.as_mut()? {
            Value::Array(items) => items.get_mut(idx)?.as_table_mut(),
            _ => None,
        }
    }

    /// Attaches `child` under this key, consulting the redefinition matrix
    /// when a sibling with the same identifier already exists.
    ///
    /// On an allowed collision the existing node is returned (mutated to
    /// `TableLeaf` when the incoming kind requires it). Array-table parents
    /// attach new children under the current entry sub-root instead of the
    /// array-table key itself.
    pub(crate) fn add_subkey(
        &mut self,
        child: Key,
        max_subkeys: usize,
    ) -> Result<&mut Key, AddError> {
        if self.children.contains_key(&child.id) {
            let existing = self.children.get_mut(&child.id).unwrap();
            if !compatible(existing.kind, child.kind) {
                return Err(AddError::Conflict {
                    existing: existing.kind,
                    incoming: child.kind,
                });
            }
            // A table header landing on an implicit table claims it, once.
            if child.kind == KeyKind::TableLeaf {
                existing.kind = KeyKind::TableLeaf;
            }
            return Ok(existing);
        }
        if self.kind == KeyKind::ArrayTable {
            let entry = self
                .current_entry_mut()
                .expect("array table has a current entry by construction");
            return entry.add_subkey(child, max_subkeys);
        }
        if self.children.len() >= max_subkeys {
            return Err(AddError::TooManySubkeys);
        }
        let id = child.id.clone();
        Ok(self.children.entry(id).or_insert(child))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Key {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::{SerializeMap, SerializeSeq};

        match (self.kind, &self.value) {
            (KeyKind::ArrayTable, Some(Value::Array(entries))) => {
                let mut seq = ser.serialize_seq(Some(entries.len()))?;
                for entry in entries {
                    seq.serialize_element(entry)?;
                }
                seq.end()
            }
            (_, Some(value)) if self.children.is_empty() => value.serialize(ser),
            _ => {
                let mut map = ser.serialize_map(Some(self.children.len()))?;
                for (id, child) in &self.children {
                    map.serialize_entry(id, child)?;
                }
                map.end()
            }
        }
    }
}
