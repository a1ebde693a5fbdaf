use crate::Span;
use std::fmt::{self, Debug, Display};

#[cfg(test)]
#[path = "./error_tests.rs"]
mod tests;

/// Error produced when a document fails to parse.
///
/// Every parse error is fatal for the document: the partially-built tree is
/// dropped and the caller receives this diagnostic instead.
#[derive(Debug, Clone)]
pub struct Error {
    /// The error kind.
    pub kind: ErrorKind,
    /// The byte span where the error occurs.
    pub span: Span,
    /// 1-based line of the failure, taken from the tokenizer at the point of
    /// failure. Zero for errors raised before tokenization (I/O, UTF-8,
    /// file-size).
    pub line: u32,
    /// 1-based column (in bytes) of the failure.
    pub column: u32,
}

impl std::error::Error for Error {}

/// The kinds of failure a parse can report.
#[derive(Clone, PartialEq)]
pub enum ErrorKind {
    /// EOF was reached while a production still needed input.
    UnexpectedEof,

    /// The input is larger than the configured maximum size.
    FileTooLarge,

    /// The input could not be read.
    Io(std::io::ErrorKind),

    /// A source byte sequence is not valid UTF-8.
    InvalidUtf8,

    /// An invalid character not allowed in a string was found.
    InvalidCharInString(char),

    /// An invalid character was found as an escape.
    InvalidEscape(char),

    /// An invalid character was found in a unicode escape.
    InvalidHexEscape(char),

    /// A unicode escape decoded outside the unicode scalar ranges.
    InvalidEscapeValue(u32),

    /// An unexpected character was encountered, typically when looking for a
    /// value.
    Unexpected(char),

    /// EOF was found before the closing quotes of a string.
    UnterminatedString,

    /// A number failed to parse (stray separator, bad digit, leading zero,
    /// out-of-range magnitude).
    InvalidNumber,

    /// A datetime literal did not match any recognized shape, or failed
    /// calendar/clock validation.
    InvalidDatetime,

    /// A structural cap was crossed. The payload names the cap.
    OutOfRange(&'static str),

    /// Wanted one sort of token, but found another.
    Wanted {
        /// Expected token type.
        expected: &'static str,
        /// Actually found token type.
        found: &'static str,
    },

    /// A key was redefined in a way the redefinition rules forbid.
    DuplicateKey {
        /// The redefined key.
        key: String,
    },

    /// A table header was redefined.
    DuplicateTable {
        /// The name of the duplicate table.
        name: String,
    },

    /// A previously defined table was reopened as an array of tables.
    RedefineAsArray,

    /// An inline table spanned a newline.
    NewlineInInlineTable,

    /// An inline table ended with a trailing comma.
    TrailingComma,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::UnexpectedEof => "unexpected-eof",
            Self::FileTooLarge => "file-too-large",
            Self::Io(..) => "io",
            Self::InvalidUtf8 => "invalid-utf8",
            Self::InvalidCharInString(..) => "invalid-char-in-string",
            Self::InvalidEscape(..) => "invalid-escape",
            Self::InvalidHexEscape(..) => "invalid-hex-escape",
            Self::InvalidEscapeValue(..) => "invalid-escape-value",
            Self::Unexpected(..) => "unexpected",
            Self::UnterminatedString => "unterminated-string",
            Self::InvalidNumber => "invalid-number",
            Self::InvalidDatetime => "invalid-datetime",
            Self::OutOfRange(..) => "out-of-range",
            Self::Wanted { .. } => "wanted",
            Self::DuplicateKey { .. } => "duplicate-key",
            Self::DuplicateTable { .. } => "duplicate-table",
            Self::RedefineAsArray => "redefine-as-array",
            Self::NewlineInInlineTable => "newline-in-inline-table",
            Self::TrailingComma => "trailing-comma",
        };
        f.write_str(text)
    }
}

impl Debug for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

/// Renders whitespace and control characters with their escape spelling so
/// diagnostics stay on one line.
struct Escape(char);

impl fmt::Display for Escape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use std::fmt::Write as _;

        if self.0.is_whitespace() || self.0.is_control() {
            for esc in self.0.escape_default() {
                f.write_char(esc)?;
            }
            Ok(())
        } else {
            f.write_char(self.0)
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::UnexpectedEof => f.write_str("unexpected eof encountered"),
            ErrorKind::FileTooLarge => f.write_str("input exceeds the maximum file size"),
            ErrorKind::Io(kind) => write!(f, "could not read input: {kind}"),
            ErrorKind::InvalidUtf8 => f.write_str("input is not valid UTF-8"),
            ErrorKind::InvalidCharInString(c) => {
                write!(f, "invalid character in string: `{}`", Escape(*c))
            }
            ErrorKind::InvalidEscape(c) => {
                write!(f, "invalid escape character in string: `{}`", Escape(*c))
            }
            ErrorKind::InvalidHexEscape(c) => {
                write!(f, "invalid hex escape character in string: `{}`", Escape(*c))
            }
            ErrorKind::InvalidEscapeValue(v) => write!(f, "invalid escape value: `{v:#x}`"),
            ErrorKind::Unexpected(c) => {
                write!(f, "unexpected character found: `{}`", Escape(*c))
            }
            ErrorKind::UnterminatedString => f.write_str("unterminated string"),
            ErrorKind::InvalidNumber => f.write_str("invalid number"),
            ErrorKind::InvalidDatetime => f.write_str("invalid datetime"),
            ErrorKind::OutOfRange(what) => write!(f, "exceeded the maximum {what}"),
            ErrorKind::Wanted { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            ErrorKind::DuplicateKey { key } => write!(f, "duplicate key: `{key}`"),
            ErrorKind::DuplicateTable { name } => {
                write!(f, "redefinition of table `{name}`")
            }
            ErrorKind::RedefineAsArray => f.write_str("table redefined as array"),
            ErrorKind::NewlineInInlineTable => f.write_str("newline inside inline table"),
            ErrorKind::TrailingComma => {
                f.write_str("trailing comma is not allowed in inline table")
            }
        }
    }
}

impl Error {
    /// The single diagnostic line: `file:line:column: message`.
    pub fn report(&self, file: &str) -> String {
        format!("{file}:{}:{}: {self}", self.line, self.column)
    }
}

#[cfg(feature = "reporting")]
impl Error {
    /// Converts this [`Error`] into a [`codespan_reporting::diagnostic::Diagnostic`].
    pub fn to_diagnostic<FileId: Copy + PartialEq>(
        &self,
        fid: FileId,
    ) -> codespan_reporting::diagnostic::Diagnostic<FileId> {
        use codespan_reporting::diagnostic::{Diagnostic, Label};

        let diag = Diagnostic::error().with_code(self.kind.to_string());

        match &self.kind {
            ErrorKind::Wanted { expected, .. } => diag.with_labels(vec![
                Label::primary(fid, self.span).with_message(format!("expected {expected}")),
            ]),
            ErrorKind::DuplicateKey { key } => diag.with_labels(vec![
                Label::primary(fid, self.span).with_message(format!("duplicate key `{key}`")),
            ]),
            ErrorKind::DuplicateTable { name } => diag.with_labels(vec![
                Label::primary(fid, self.span).with_message(format!("duplicate table `{name}`")),
            ]),
            ErrorKind::UnterminatedString => diag.with_labels(vec![
                Label::primary(fid, self.span).with_message("string opened here"),
            ]),
            _ => diag
                .with_message(self.to_string())
                .with_labels(vec![Label::primary(fid, self.span)]),
        }
    }
}
