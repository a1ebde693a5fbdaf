//! A TOML v1.0.0 parser that builds a typed key tree, with lookup by key
//! path and a typed-JSON dump for cross-implementation conformance testing.
//!
//! Strings are copied out of the input: the returned tree owns all of its
//! data and stays valid after the source buffer is gone.
//!
//! # Quick start
//!
//! Use [`parse`] with a TOML string to get the root [`Key`]:
//! ```
//! # fn main() -> Result<(), toml_keytree::Error> {
//! let root = toml_keytree::parse("title = \"TOML Example\"")?;
//! assert_eq!(root.get_key("title").and_then(|k| k.get_string()), Some("TOML Example"));
//! # Ok(())
//! # }
//! ```
//!
//! Navigate with [`Key::get_key`] and the typed getters; each getter
//! returns `Some` only when the key holds a value of that type:
//! ```
//! # fn main() -> Result<(), toml_keytree::Error> {
//! let root = toml_keytree::parse("[server]\nport = 8080\nactive = true\n")?;
//! let server = root.get_key("server").unwrap();
//! assert_eq!(server.get_key("port").and_then(|k| k.get_int()), Some(8080.0));
//! assert_eq!(server.get_key("active").and_then(|k| k.get_bool()), Some(true));
//! # Ok(())
//! # }
//! ```
//!
//! Dump the tree in the typed-JSON conformance form with [`ser::dumps`]:
//! ```
//! # fn main() -> Result<(), toml_keytree::Error> {
//! let root = toml_keytree::parse("x = 0x1F")?;
//! assert_eq!(
//!     toml_keytree::ser::dumps(&root),
//!     r#"{"x": {"type": "integer", "value": "31"}}"#
//! );
//! # Ok(())
//! # }
//! ```
//!
//! Parsing is all-or-nothing: any error drops the partial tree and returns
//! an [`Error`] carrying the line and column of the failure.
//! ```
//! let err = toml_keytree::parse("a.b = 1\n[a]\n").unwrap_err();
//! assert_eq!(err.line, 2);
//! ```
//!
//! Structural caps (input size, line count, identifier and string lengths,
//! subkeys per key, array length) are configurable through [`Limits`] and
//! the `*_with` entry points.

mod error;
mod key;
mod limits;
mod parser;
mod scan;
mod span;
mod time;
mod tokenizer;
mod value;

pub mod builder;
pub mod ser;

pub use builder::Pretty;
pub use error::{Error, ErrorKind};
pub use key::{Key, KeyKind};
pub use limits::Limits;
pub use span::Span;
pub use time::{Datetime, DatetimeKind};
pub use value::Value;

use std::io::Read;
use std::path::Path;

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// An error raised before tokenization starts has no source position.
fn input_error(kind: ErrorKind) -> Error {
    Error {
        kind,
        span: Span::new(0, 0),
        line: 0,
        column: 0,
    }
}

fn parse_bytes(mut bytes: Vec<u8>, limits: &Limits) -> Result<Key, Error> {
    if bytes.len() > limits.max_file_size {
        return Err(input_error(ErrorKind::FileTooLarge));
    }
    if std::str::from_utf8(&bytes).is_err() {
        return Err(input_error(ErrorKind::InvalidUtf8));
    }
    if bytes.starts_with(UTF8_BOM) {
        bytes.drain(..UTF8_BOM.len());
    }
    parser::parse_tree(bytes.into_boxed_slice(), limits)
}

/// Parses a TOML document from an in-memory string.
pub fn parse(input: &str) -> Result<Key, Error> {
    parse_with(input, &Limits::DEFAULT)
}

/// Parses a TOML document from an in-memory string with explicit [`Limits`].
pub fn parse_with(input: &str, limits: &Limits) -> Result<Key, Error> {
    parse_bytes(input.as_bytes().to_vec(), limits)
}

/// Loads and parses a TOML file.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Key, Error> {
    parse_file_with(path, &Limits::DEFAULT)
}

/// Loads and parses a TOML file with explicit [`Limits`].
pub fn parse_file_with(path: impl AsRef<Path>, limits: &Limits) -> Result<Key, Error> {
    match std::fs::read(path) {
        Ok(bytes) => parse_bytes(bytes, limits),
        Err(err) => Err(input_error(ErrorKind::Io(err.kind()))),
    }
}

/// Reads a pre-opened stream to its end and parses the contents.
pub fn parse_reader(reader: impl Read) -> Result<Key, Error> {
    parse_reader_with(reader, &Limits::DEFAULT)
}

/// Reads a pre-opened stream to its end and parses the contents with
/// explicit [`Limits`].
pub fn parse_reader_with(mut reader: impl Read, limits: &Limits) -> Result<Key, Error> {
    let mut bytes = Vec::new();
    // Stop one byte past the cap so oversized streams fail without being
    // slurped whole.
    let cap = limits.max_file_size as u64 + 1;
    match reader.by_ref().take(cap).read_to_end(&mut bytes) {
        Ok(_) => parse_bytes(bytes, limits),
        Err(err) => Err(input_error(ErrorKind::Io(err.kind()))),
    }
}
