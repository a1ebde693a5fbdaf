//! Byte classifiers used by the tokenizer and parser.
//!
//! All input has been validated as UTF-8 up front, so working on raw bytes is
//! sound: every multi-byte sequence starts at 0x80 or above and none of the
//! predicates below match continuation bytes.

#[cfg(test)]
#[path = "./scan_tests.rs"]
mod tests;

/// Characters that terminate a numeric or datetime literal at statement scope.
pub(crate) const STATEMENT_END: &[u8] = b"# \n";
/// Characters that terminate a numeric or datetime literal inside an array.
pub(crate) const ARRAY_END: &[u8] = b"#,] \n";
/// Characters that terminate a numeric or datetime literal inside an inline table.
pub(crate) const INLINE_TABLE_END: &[u8] = b", }";

#[inline]
pub(crate) fn is_whitespace(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

#[inline]
pub(crate) fn is_digit(b: u8) -> bool {
    b.is_ascii_digit()
}

#[inline]
pub(crate) fn is_hex_digit(b: u8) -> bool {
    b.is_ascii_hexdigit()
}

/// Bare-key bytes: `[A-Za-z0-9_-]`.
#[inline]
pub(crate) fn is_bare_key_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

/// A value starting with one of these dispatches to the number/datetime path.
#[inline]
pub(crate) fn is_number_start(b: u8) -> bool {
    b == b'+' || b == b'-' || b.is_ascii_digit()
}

/// Control bytes that must be escaped in a single-line basic string.
/// Tab is permitted.
#[inline]
pub(crate) fn is_control(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0A..=0x1F | 0x7F)
}

/// Control bytes rejected inside a multi-line basic string. Tab, LF and CR
/// pass; CR is only meaningful as part of CRLF and is normalized separately.
#[inline]
pub(crate) fn is_control_multi(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0C | 0x0E..=0x1F | 0x7F)
}

/// Control bytes rejected inside literal strings (both flavors). Tab and LF
/// pass; a lone CR is an error.
#[inline]
pub(crate) fn is_control_literal(b: u8) -> bool {
    (b < 0x20 && b != 0x09 && b != 0x0A) || b == 0x7F
}

/// True if `b` is in the active number-end set.
#[inline]
pub(crate) fn is_number_end(b: u8, end: &[u8]) -> bool {
    end.contains(&b)
}

/// Value of a hex digit, or -1.
#[inline]
pub(crate) fn hex_value(b: u8) -> i8 {
    match b {
        b'0'..=b'9' => (b - b'0') as i8,
        b'A'..=b'F' => (b - b'A' + 10) as i8,
        b'a'..=b'f' => (b - b'a' + 10) as i8,
        _ => -1,
    }
}

/// Human description of the byte at an error position.
pub(crate) fn describe(b: u8) -> &'static str {
    match b {
        b'\n' => "a newline",
        b'\r' => "a carriage return",
        b' ' | b'\t' => "whitespace",
        b'#' => "a comment",
        b'=' => "an equals",
        b'.' => "a period",
        b',' => "a comma",
        b':' => "a colon",
        b'+' => "a plus",
        b'{' => "a left brace",
        b'}' => "a right brace",
        b'[' => "a left bracket",
        b']' => "a right bracket",
        b'\'' | b'"' => "a string",
        _ if is_bare_key_byte(b) => "an identifier",
        _ => "a character",
    }
}
