// Avoid `?`-driven From conversions in the hot parsing loops: every failure
// path goes through a #[cold] setter that records the diagnostic once, and
// productions propagate a zero-sized marker.

#[cfg(test)]
#[path = "./parser_tests.rs"]
mod tests;

use crate::error::{Error, ErrorKind};
use crate::key::{AddError, Key, KeyKind};
use crate::limits::Limits;
use crate::scan;
use crate::span::Span;
use crate::time::Datetime;
use crate::tokenizer::Tokenizer;
use crate::value::Value;

const MAX_RECURSION_DEPTH: i16 = 256;

/// When a method returns `Err(ParseError)`, the full error details have
/// already been written into `Parser::error`.
#[derive(Copy, Clone)]
struct ParseError;

struct Parser<'l> {
    tok: Tokenizer,
    limits: &'l Limits,
    /// First error recorded; later setters keep the innermost cause.
    error: Option<Error>,
}

/// Parses a validated UTF-8 document into a tree rooted at a `Table` key
/// named `root`.
pub(crate) fn parse_tree(bytes: Box<[u8]>, limits: &Limits) -> Result<Key, Error> {
    let Some(tok) = Tokenizer::new(bytes, limits.max_lines) else {
        return Err(Error {
            kind: ErrorKind::OutOfRange("line count"),
            span: Span::new(0, 0),
            line: 0,
            column: 0,
        });
    };
    let mut parser = Parser {
        tok,
        limits,
        error: None,
    };
    let mut root = Key::new(KeyKind::Table, String::from("root"));
    match parser.parse_document(&mut root) {
        Ok(()) => Ok(root),
        Err(ParseError) => Err(parser.take_error()),
    }
}

impl<'l> Parser<'l> {
    // ── error plumbing ──────────────────────────────────────────────

    fn fail(&mut self, kind: ErrorKind, span: Span) -> ParseError {
        if self.error.is_none() {
            self.error = Some(Error {
                kind,
                span,
                line: self.tok.line(),
                column: self.tok.col(),
            });
        }
        ParseError
    }

    #[cold]
    fn set_error(&mut self, kind: ErrorKind) -> ParseError {
        let pos = self.tok.pos() as u32;
        self.fail(kind, Span::new(pos, pos + 1))
    }

    #[cold]
    fn set_error_at(&mut self, start: usize, kind: ErrorKind) -> ParseError {
        let end = self.tok.pos().max(start + 1) as u32;
        self.fail(kind, Span::new(start as u32, end))
    }

    #[cold]
    fn wanted(&mut self, expected: &'static str) -> ParseError {
        let found = if self.tok.has_token() {
            scan::describe(self.tok.current())
        } else {
            "eof"
        };
        self.set_error(ErrorKind::Wanted { expected, found })
    }

    #[cold]
    fn subkey_error(&mut self, start: usize, id: &str, err: AddError) -> ParseError {
        match err {
            AddError::TooManySubkeys => {
                self.set_error_at(start, ErrorKind::OutOfRange("subkey count"))
            }
            AddError::Conflict { existing, incoming } => {
                let kind = match (existing, incoming) {
                    (KeyKind::Table | KeyKind::TableLeaf, KeyKind::ArrayTable) => {
                        ErrorKind::RedefineAsArray
                    }
                    (_, KeyKind::TableLeaf) => ErrorKind::DuplicateTable {
                        name: String::from(id),
                    },
                    _ => ErrorKind::DuplicateKey {
                        key: String::from(id),
                    },
                };
                self.set_error_at(start, kind)
            }
        }
    }

    fn take_error(&mut self) -> Error {
        self.error.take().expect("take_error called without error")
    }

    // ── low-level character handling ────────────────────────────────

    fn eat_whitespace(&mut self) {
        while self.tok.has_token() && scan::is_whitespace(self.tok.current()) {
            self.tok.advance();
        }
    }

    /// Consumes a LF or CRLF newline. A lone CR is put back and left for the
    /// caller to reject.
    fn eat_newline(&mut self) -> bool {
        match self.tok.current() {
            b'\n' if self.tok.has_token() => {
                self.tok.advance();
                true
            }
            b'\r' if self.tok.has_token() => {
                self.tok.advance();
                if self.tok.has_token() && self.tok.current() == b'\n' {
                    self.tok.advance();
                    true
                } else {
                    self.tok.backtrack(1);
                    false
                }
            }
            _ => false,
        }
    }

    /// Consumes a comment through its terminating newline (or EOF).
    fn parse_comment(&mut self) -> Result<(), ParseError> {
        loop {
            self.tok.advance();
            if !self.tok.has_token() {
                return Ok(());
            }
            if self.tok.current() == b'\n' || self.tok.current() == b'\r' {
                if self.eat_newline() {
                    return Ok(());
                }
                return Err(self.set_error(ErrorKind::Unexpected('\r')));
            }
            if scan::is_control(self.tok.current()) {
                return Err(self.set_error(ErrorKind::Unexpected(self.tok.current_char())));
            }
        }
    }

    fn expect_literal(&mut self, lit: &[u8], desc: &'static str) -> Result<(), ParseError> {
        for &b in lit {
            if !self.tok.has_token() || self.tok.current() != b {
                return Err(self.wanted(desc));
            }
            self.tok.advance();
        }
        Ok(())
    }

    // ── statements ──────────────────────────────────────────────────

    fn parse_document(&mut self, root: &mut Key) -> Result<(), ParseError> {
        // Identifiers of the current table or array-of-tables header; the
        // key that out-of-line assignments attach under.
        let mut header: Vec<String> = Vec::new();

        while self.tok.has_token() {
            let c = self.tok.current();
            if scan::is_whitespace(c) {
                self.eat_whitespace();
                continue;
            }
            if c == b'#' {
                self.parse_comment()?;
                continue;
            }
            if self.eat_newline() {
                continue;
            }
            if c == b'\r' {
                return Err(self.set_error(ErrorKind::Unexpected('\r')));
            }
            if c == b'[' {
                header = self.parse_header(root)?;
                continue;
            }
            // Assignments must start their own line.
            let prev = self.tok.prev();
            let at_line_start =
                prev == 0 || prev == b'\n' || (scan::is_whitespace(prev) && self.tok.fresh_line());
            if !at_line_start {
                return Err(self.set_error(ErrorKind::Unexpected(self.tok.current_char())));
            }
            let target = resolve_header(root, &header);
            self.parse_assignment(target)?;
        }
        Ok(())
    }

    /// Parses `[a.b]` or `[[a.b]]` starting at the opening bracket. Returns
    /// the header path that subsequent assignments resolve against.
    fn parse_header(&mut self, root: &mut Key) -> Result<Vec<String>, ParseError> {
        self.tok.advance();
        let array = self.tok.has_token() && self.tok.current() == b'[';
        if array {
            self.tok.advance();
        }
        let leaf_kind = if array {
            KeyKind::ArrayTable
        } else {
            KeyKind::TableLeaf
        };

        let mut path = Vec::new();
        let leaf = self.parse_key_chain(root, b']', KeyKind::Table, leaf_kind, &mut path)?;

        if array {
            // The second bracket must follow the first immediately.
            if !self.tok.has_token() || self.tok.current() != b']' {
                return Err(self.wanted("a right bracket"));
            }
            self.tok.advance();

            // Every occurrence of the header opens a fresh entry; assignments
            // and subtable headers target it until the next header.
            if leaf.value.is_none() {
                leaf.value = Some(Value::Array(Vec::new()));
            }
            let Some(Value::Array(entries)) = leaf.value.as_mut() else {
                unreachable!("array table values are arrays by construction");
            };
            if entries.len() >= self.limits.max_array_length {
                return Err(self.set_error(ErrorKind::OutOfRange("array length")));
            }
            entries.push(Value::InlineTable(Box::new(Key::new(
                KeyKind::Key,
                String::new(),
            ))));
            leaf.idx = Some(entries.len() - 1);
        }
        Ok(path)
    }

    /// Parses one dotted key path, attaching each segment under `start` with
    /// `branch`/`leaf` kinds and consuming the terminator. Segment
    /// identifiers are appended to `path`.
    fn parse_key_chain<'t>(
        &mut self,
        start: &'t mut Key,
        term: u8,
        branch: KeyKind,
        leaf: KeyKind,
        path: &mut Vec<String>,
    ) -> Result<&'t mut Key, ParseError> {
        let mut cur = start;
        loop {
            self.eat_whitespace();
            if !self.tok.has_token() {
                return Err(self.set_error(ErrorKind::UnexpectedEof));
            }
            let seg_start = self.tok.pos();
            let id = match self.tok.current() {
                b'"' => self.basic_quoted_key()?,
                b'\'' => self.literal_quoted_key()?,
                b if scan::is_bare_key_byte(b) => self.bare_key()?,
                _ => return Err(self.wanted("a key")),
            };
            self.eat_whitespace();
            if self.tok.current() == b'.' {
                self.tok.advance();
                cur = match Key::add_subkey(
                    cur,
                    Key::new(branch, id.clone()),
                    self.limits.max_subkeys,
                ) {
                    Ok(key) => key,
                    Err(e) => return Err(self.subkey_error(seg_start, &id, e)),
                };
                path.push(id);
                continue;
            }
            if self.tok.current() == term && self.tok.has_token() {
                self.tok.advance();
                let added = match Key::add_subkey(
                    cur,
                    Key::new(leaf, id.clone()),
                    self.limits.max_subkeys,
                ) {
                    Ok(key) => key,
                    Err(e) => return Err(self.subkey_error(seg_start, &id, e)),
                };
                path.push(id);
                return Ok(added);
            }
            return Err(self.wanted(if term == b'=' {
                "an equals"
            } else {
                "a right bracket"
            }));
        }
    }

    fn parse_assignment(&mut self, target: &mut Key) -> Result<(), ParseError> {
        let key_start = self.tok.pos();
        let mut scratch = Vec::new();
        let leaf =
            self.parse_key_chain(target, b'=', KeyKind::Key, KeyKind::KeyLeaf, &mut scratch)?;
        let value = self.parse_value(scan::STATEMENT_END, MAX_RECURSION_DEPTH)?;
        match value {
            Value::InlineTable(sub) => self.splice_inline(leaf, *sub, key_start)?,
            other => leaf.value = Some(other),
        }
        self.eat_whitespace();
        Ok(())
    }

    /// Moves the pairs of an inline-table literal under the assignment leaf,
    /// then locks the leaf so later statements cannot extend it.
    fn splice_inline(
        &mut self,
        leaf: &mut Key,
        sub: Key,
        key_start: usize,
    ) -> Result<(), ParseError> {
        leaf.kind = KeyKind::Key;
        for (_, child) in sub.children {
            let id = child.id.clone();
            if let Err(e) = leaf.add_subkey(child, self.limits.max_subkeys) {
                return Err(self.subkey_error(key_start, &id, e));
            }
        }
        leaf.kind = KeyKind::KeyLeaf;
        Ok(())
    }

    // ── keys ────────────────────────────────────────────────────────

    fn bare_key(&mut self) -> Result<String, ParseError> {
        let mut id = Vec::new();
        while self.tok.has_token() && scan::is_bare_key_byte(self.tok.current()) {
            if id.len() >= self.limits.max_id_length {
                return Err(self.set_error(ErrorKind::OutOfRange("identifier length")));
            }
            id.push(self.tok.current());
            self.tok.advance();
        }
        Ok(into_string(id))
    }

    fn basic_quoted_key(&mut self) -> Result<String, ParseError> {
        let start = self.tok.pos();
        self.tok.advance();
        let mut id = Vec::new();
        loop {
            if !self.tok.has_token() {
                return Err(self.set_error_at(start, ErrorKind::UnterminatedString));
            }
            if id.len() > self.limits.max_id_length {
                return Err(self.set_error_at(start, ErrorKind::OutOfRange("identifier length")));
            }
            match self.tok.current() {
                b'"' => {
                    self.tok.advance();
                    return Ok(into_string(id));
                }
                b'\n' | b'\r' => {
                    return Err(self.set_error(ErrorKind::InvalidCharInString('\n')));
                }
                b'\\' => {
                    self.tok.advance();
                    if !self.tok.has_token() {
                        return Err(self.set_error_at(start, ErrorKind::UnterminatedString));
                    }
                    self.push_escape(&mut id)?;
                }
                b if scan::is_control(b) => {
                    return Err(self.set_error(ErrorKind::InvalidCharInString(
                        self.tok.current_char(),
                    )));
                }
                b => {
                    id.push(b);
                    self.tok.advance();
                }
            }
        }
    }

    fn literal_quoted_key(&mut self) -> Result<String, ParseError> {
        let start = self.tok.pos();
        self.tok.advance();
        let mut id = Vec::new();
        loop {
            if !self.tok.has_token() {
                return Err(self.set_error_at(start, ErrorKind::UnterminatedString));
            }
            if id.len() > self.limits.max_id_length {
                return Err(self.set_error_at(start, ErrorKind::OutOfRange("identifier length")));
            }
            match self.tok.current() {
                b'\'' => {
                    self.tok.advance();
                    return Ok(into_string(id));
                }
                b'\n' => {
                    return Err(self.set_error(ErrorKind::InvalidCharInString('\n')));
                }
                b if scan::is_control_literal(b) => {
                    return Err(self.set_error(ErrorKind::InvalidCharInString(
                        self.tok.current_char(),
                    )));
                }
                b => {
                    id.push(b);
                    self.tok.advance();
                }
            }
        }
    }

    // ── values ──────────────────────────────────────────────────────

    fn parse_value(
        &mut self,
        num_end: &'static [u8],
        depth_remaining: i16,
    ) -> Result<Value, ParseError> {
        self.eat_whitespace();
        if !self.tok.has_token() {
            return Err(self.set_error(ErrorKind::UnexpectedEof));
        }
        match self.tok.current() {
            b'\n' | b'\r' => Err(self.wanted("a value")),
            b'"' => {
                self.tok.advance();
                if self.tok.has_token() && self.tok.current() == b'"' {
                    self.tok.advance();
                    if self.tok.has_token() && self.tok.current() == b'"' {
                        self.tok.advance();
                        self.eat_newline();
                        self.parse_basic_string(true).map(Value::String)
                    } else {
                        Ok(Value::String(String::new()))
                    }
                } else {
                    self.parse_basic_string(false).map(Value::String)
                }
            }
            b'\'' => {
                self.tok.advance();
                if self.tok.has_token() && self.tok.current() == b'\'' {
                    self.tok.advance();
                    if self.tok.has_token() && self.tok.current() == b'\'' {
                        self.tok.advance();
                        self.eat_newline();
                        self.parse_literal_string(true).map(Value::String)
                    } else {
                        Ok(Value::String(String::new()))
                    }
                } else {
                    self.parse_literal_string(false).map(Value::String)
                }
            }
            b'{' => {
                self.tok.advance();
                self.parse_inline_table(depth_remaining - 1)
            }
            b'[' => {
                self.tok.advance();
                self.parse_array(depth_remaining - 1)
            }
            b't' => {
                self.expect_literal(b"true", "the literal `true`")?;
                Ok(Value::Boolean(true))
            }
            b'f' => {
                self.expect_literal(b"false", "the literal `false`")?;
                Ok(Value::Boolean(false))
            }
            b'i' => {
                self.expect_literal(b"inf", "the literal `inf`")?;
                Ok(Value::Float {
                    value: f64::INFINITY,
                    precision: 0,
                    scientific: false,
                })
            }
            b'n' => {
                self.expect_literal(b"nan", "the literal `nan`")?;
                Ok(Value::Float {
                    value: f64::NAN,
                    precision: 0,
                    scientific: false,
                })
            }
            b if scan::is_number_start(b) => self.parse_number_or_datetime(num_end),
            _ => Err(self.wanted("a value")),
        }
    }

    // ── strings ─────────────────────────────────────────────────────

    fn parse_basic_string(&mut self, multi: bool) -> Result<String, ParseError> {
        let start = self.tok.pos();
        let mut out: Vec<u8> = Vec::new();
        loop {
            if !self.tok.has_token() {
                return Err(self.set_error_at(start, ErrorKind::UnterminatedString));
            }
            if out.len() > self.limits.max_string_length {
                return Err(self.set_error_at(start, ErrorKind::OutOfRange("string length")));
            }
            match self.tok.current() {
                b'"' => {
                    if !multi {
                        self.tok.advance();
                        return Ok(into_string(out));
                    }
                    // Count the quote run: three close the string, up to two
                    // more belong to the data.
                    let mut run = 1usize;
                    loop {
                        self.tok.advance();
                        if self.tok.has_token() && self.tok.current() == b'"' {
                            run += 1;
                            if run == 5 {
                                self.tok.advance();
                                break;
                            }
                        } else {
                            break;
                        }
                    }
                    if run >= 3 {
                        for _ in 0..run - 3 {
                            out.push(b'"');
                        }
                        return Ok(into_string(out));
                    }
                    for _ in 0..run {
                        out.push(b'"');
                    }
                }
                b'\n' => {
                    if !multi {
                        return Err(self.set_error(ErrorKind::InvalidCharInString('\n')));
                    }
                    out.push(b'\n');
                    self.tok.advance();
                }
                b'\r' => {
                    self.tok.advance();
                    if self.tok.has_token() && self.tok.current() == b'\n' {
                        if !multi {
                            return Err(self.set_error(ErrorKind::InvalidCharInString('\n')));
                        }
                        out.push(b'\n');
                        self.tok.advance();
                    } else if multi {
                        // A lone CR is data in a multi-line basic string.
                        out.push(b'\r');
                    } else {
                        return Err(self.set_error(ErrorKind::InvalidCharInString('\r')));
                    }
                }
                b'\\' => {
                    self.tok.advance();
                    if !self.tok.has_token() {
                        return Err(self.set_error_at(start, ErrorKind::UnterminatedString));
                    }
                    let c = self.tok.current();
                    if multi && (scan::is_whitespace(c) || c == b'\n' || c == b'\r') {
                        self.line_continuation()?;
                    } else {
                        self.push_escape(&mut out)?;
                    }
                }
                b if multi && scan::is_control_multi(b) => {
                    return Err(self.set_error(ErrorKind::InvalidCharInString(
                        self.tok.current_char(),
                    )));
                }
                b if !multi && scan::is_control(b) => {
                    return Err(self.set_error(ErrorKind::InvalidCharInString(
                        self.tok.current_char(),
                    )));
                }
                b => {
                    out.push(b);
                    self.tok.advance();
                }
            }
        }
    }

    fn parse_literal_string(&mut self, multi: bool) -> Result<String, ParseError> {
        let start = self.tok.pos();
        let mut out: Vec<u8> = Vec::new();
        loop {
            if !self.tok.has_token() {
                return Err(self.set_error_at(start, ErrorKind::UnterminatedString));
            }
            if out.len() > self.limits.max_string_length {
                return Err(self.set_error_at(start, ErrorKind::OutOfRange("string length")));
            }
            match self.tok.current() {
                b'\'' => {
                    if !multi {
                        self.tok.advance();
                        return Ok(into_string(out));
                    }
                    let mut run = 1usize;
                    loop {
                        self.tok.advance();
                        if self.tok.has_token() && self.tok.current() == b'\'' {
                            run += 1;
                            if run == 5 {
                                self.tok.advance();
                                break;
                            }
                        } else {
                            break;
                        }
                    }
                    if run >= 3 {
                        for _ in 0..run - 3 {
                            out.push(b'\'');
                        }
                        return Ok(into_string(out));
                    }
                    for _ in 0..run {
                        out.push(b'\'');
                    }
                }
                b'\n' => {
                    if !multi {
                        return Err(self.set_error(ErrorKind::InvalidCharInString('\n')));
                    }
                    out.push(b'\n');
                    self.tok.advance();
                }
                b'\r' => {
                    self.tok.advance();
                    if multi && self.tok.has_token() && self.tok.current() == b'\n' {
                        out.push(b'\n');
                        self.tok.advance();
                    } else {
                        return Err(self.set_error(ErrorKind::InvalidCharInString('\r')));
                    }
                }
                b if scan::is_control_literal(b) => {
                    return Err(self.set_error(ErrorKind::InvalidCharInString(
                        self.tok.current_char(),
                    )));
                }
                b => {
                    out.push(b);
                    self.tok.advance();
                }
            }
        }
    }

    /// `\` at the end of a line inside a multi-line basic string: elide all
    /// whitespace up to the next non-whitespace character. At least one
    /// newline must intervene.
    fn line_continuation(&mut self) -> Result<(), ParseError> {
        self.eat_whitespace();
        if !self.eat_newline() {
            return Err(self.wanted("a newline"));
        }
        loop {
            self.eat_whitespace();
            if !self.eat_newline() {
                return Ok(());
            }
        }
    }

    /// Appends one decoded escape to `out`. The cursor sits on the escape
    /// character (the byte after the backslash).
    fn push_escape(&mut self, out: &mut Vec<u8>) -> Result<(), ParseError> {
        let byte = match self.tok.current() {
            b'b' => 0x08,
            b't' => b'\t',
            b'n' => b'\n',
            b'f' => 0x0C,
            b'r' => b'\r',
            b'"' => b'"',
            b'\\' => b'\\',
            b'u' => {
                self.tok.advance();
                return self.push_unicode(out, 4);
            }
            b'U' => {
                self.tok.advance();
                return self.push_unicode(out, 8);
            }
            _ => {
                return Err(self.set_error(ErrorKind::InvalidEscape(self.tok.current_char())));
            }
        };
        out.push(byte);
        self.tok.advance();
        Ok(())
    }

    /// Reads exactly `n` hex digits, validates the scalar range, and appends
    /// the canonical UTF-8 encoding.
    fn push_unicode(&mut self, out: &mut Vec<u8>, n: usize) -> Result<(), ParseError> {
        let escape_start = self.tok.pos();
        let mut val: u32 = 0;
        for _ in 0..n {
            if !self.tok.has_token() {
                return Err(self.set_error(ErrorKind::UnterminatedString));
            }
            let digit = scan::hex_value(self.tok.current());
            if digit < 0 {
                return Err(self.set_error(ErrorKind::InvalidHexEscape(self.tok.current_char())));
            }
            val = (val << 4) | digit as u32;
            self.tok.advance();
        }
        // char::from_u32 rejects exactly the surrogate gap and values past
        // U+10FFFF, which is the valid escape range.
        match char::from_u32(val) {
            Some(c) => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                Ok(())
            }
            None => Err(self.set_error_at(escape_start, ErrorKind::InvalidEscapeValue(val))),
        }
    }

    // ── numbers and datetimes ───────────────────────────────────────

    /// A value starting with a sign or digit is a number unless the
    /// look-ahead finds `:` as the third character (time) or `-` as the
    /// fifth (date).
    fn parse_number_or_datetime(&mut self, num_end: &'static [u8]) -> Result<Value, ParseError> {
        let a = self.tok.advance() as usize;
        let b = self.tok.advance() as usize;
        if self.tok.has_token() && self.tok.current() == b':' {
            self.tok.backtrack(a + b);
            return self.parse_datetime(num_end);
        }
        if !scan::is_digit(self.tok.prev()) || !scan::is_digit(self.tok.current()) {
            if a + b > 0 {
                self.tok.backtrack(a + b);
            }
        } else {
            let c = self.tok.advance() as usize;
            let d = self.tok.advance() as usize;
            if self.tok.has_token() && self.tok.current() == b'-' {
                self.tok.backtrack(a + b + c + d);
                return self.parse_datetime(num_end);
            }
            self.tok.backtrack(a + b + c + d);
        }
        self.parse_number(num_end)
    }

    fn parse_datetime(&mut self, num_end: &'static [u8]) -> Result<Value, ParseError> {
        let start = self.tok.pos();
        let mut text: Vec<u8> = Vec::new();
        let mut spaces = 0;
        while self.tok.has_token() {
            if text.len() > self.limits.max_string_length {
                return Err(self.set_error_at(start, ErrorKind::OutOfRange("string length")));
            }
            let c = self.tok.current();
            let ws = scan::is_whitespace(c);
            // One interior space may delimit date and time; a second ends
            // the literal, as does any non-space terminator.
            if (ws && spaces > 0) || (!ws && scan::is_number_end(c, num_end)) {
                break;
            }
            if ws {
                spaces += 1;
            }
            text.push(c);
            self.tok.advance();
        }
        if text.last().is_some_and(|&b| scan::is_whitespace(b)) {
            text.pop();
        }
        match Datetime::parse(&text) {
            Some(dt) => Ok(Value::Datetime(dt)),
            None => Err(self.set_error_at(start, ErrorKind::InvalidDatetime)),
        }
    }

    fn parse_number(&mut self, num_end: &'static [u8]) -> Result<Value, ParseError> {
        let start = self.tok.pos();
        let mut buf: Vec<u8> = Vec::new();
        let mut is_float = false;
        let mut scientific = false;
        let mut precision = 0usize;
        let mut counting = false;
        loop {
            if !self.tok.has_token() {
                break;
            }
            if buf.len() > self.limits.max_string_length {
                return Err(self.set_error_at(start, ErrorKind::OutOfRange("string length")));
            }
            let c = self.tok.current();
            if scan::is_number_end(c, num_end) {
                break;
            }
            if buf.is_empty() && c == b'0' {
                self.tok.advance();
                match self.tok.current() {
                    b'x' if self.tok.has_token() => {
                        self.tok.advance();
                        return self.parse_base(16, num_end, start);
                    }
                    b'o' if self.tok.has_token() => {
                        self.tok.advance();
                        return self.parse_base(8, num_end, start);
                    }
                    b'b' if self.tok.has_token() => {
                        self.tok.advance();
                        return self.parse_base(2, num_end, start);
                    }
                    _ => {
                        buf.push(b'0');
                        continue;
                    }
                }
            }
            if c == b'.' || c == b'_' {
                if c == b'.' {
                    buf.push(b'.');
                    is_float = true;
                    counting = true;
                }
                self.tok.advance();
                // Separators need a digit on both sides; prev_prev looks
                // back across the separator itself.
                if self.tok.has_token()
                    && scan::is_digit(self.tok.current())
                    && scan::is_digit(self.tok.prev_prev())
                {
                    if counting {
                        precision += 1;
                    }
                    buf.push(self.tok.current());
                    self.tok.advance();
                    continue;
                }
                return Err(self.set_error_at(start, ErrorKind::InvalidNumber));
            }
            if c == b'i' || c == b'n' {
                if buf.len() == 1 && (self.tok.prev() == b'+' || self.tok.prev() == b'-') {
                    let negative = self.tok.prev() == b'-';
                    let value = self.parse_signed_inf_nan(negative)?;
                    return Ok(Value::Float {
                        value,
                        precision: 0,
                        scientific: false,
                    });
                }
                return Err(self.set_error_at(start, ErrorKind::InvalidNumber));
            }
            if matches!(c, b'x' | b'X' | b'b' | b'B' | b'o' | b'O') {
                return Err(self.set_error_at(start, ErrorKind::InvalidNumber));
            }
            if c == b'e' || c == b'E' {
                is_float = true;
                scientific = true;
                counting = false;
            } else if counting {
                precision += 1;
            }
            buf.push(c);
            self.tok.advance();
        }

        let text = std::str::from_utf8(&buf).expect("number buffer is ASCII");
        let Ok(value) = text.parse::<f64>() else {
            return Err(self.set_error_at(start, ErrorKind::InvalidNumber));
        };
        if is_float {
            if !value.is_finite() {
                return Err(self.set_error_at(start, ErrorKind::InvalidNumber));
            }
            return Ok(Value::Float {
                value,
                precision,
                scientific,
            });
        }
        if value != 0.0 {
            let digits = match buf.first() {
                Some(b'+' | b'-') => &buf[1..],
                _ => &buf[..],
            };
            if digits.first() == Some(&b'0') {
                return Err(self.set_error_at(start, ErrorKind::InvalidNumber));
            }
        }
        Ok(Value::Integer(value))
    }

    fn parse_base(
        &mut self,
        base: u32,
        num_end: &'static [u8],
        start: usize,
    ) -> Result<Value, ParseError> {
        let shift = base.trailing_zeros();
        let mut acc: u64 = 0;
        let mut has_digit = false;
        while self.tok.has_token() {
            let c = self.tok.current();
            if scan::is_number_end(c, num_end) {
                break;
            }
            if c == b'_' {
                self.tok.advance();
                let ok = self.tok.has_token()
                    && digit_in_base(self.tok.current(), base).is_some()
                    && digit_in_base(self.tok.prev_prev(), base).is_some();
                if !ok {
                    return Err(self.set_error_at(start, ErrorKind::InvalidNumber));
                }
                continue;
            }
            let Some(digit) = digit_in_base(c, base) else {
                return Err(self.set_error_at(start, ErrorKind::InvalidNumber));
            };
            has_digit = true;
            if acc >> (64 - shift) != 0 {
                return Err(self.set_error_at(start, ErrorKind::InvalidNumber));
            }
            acc = (acc << shift) | digit;
            self.tok.advance();
        }
        if !has_digit || acc > i64::MAX as u64 {
            return Err(self.set_error_at(start, ErrorKind::InvalidNumber));
        }
        Ok(Value::Integer(acc as f64))
    }

    /// The cursor sits on `i` or `n` right after a sign.
    fn parse_signed_inf_nan(&mut self, negative: bool) -> Result<f64, ParseError> {
        let value = if self.tok.current() == b'i' {
            self.expect_literal(b"inf", "the literal `inf`")?;
            f64::INFINITY
        } else {
            self.expect_literal(b"nan", "the literal `nan`")?;
            f64::NAN
        };
        Ok(if negative { -value } else { value })
    }

    // ── containers ──────────────────────────────────────────────────

    fn parse_array(&mut self, depth_remaining: i16) -> Result<Value, ParseError> {
        if depth_remaining < 0 {
            return Err(self.set_error(ErrorKind::OutOfRange("recursion depth")));
        }
        let mut items = Vec::new();
        // True while a value may follow (start of array or after a comma).
        let mut sep = true;
        loop {
            if !self.tok.has_token() {
                return Err(self.set_error(ErrorKind::UnexpectedEof));
            }
            let c = self.tok.current();
            if c == b']' {
                self.tok.advance();
                return Ok(Value::Array(items));
            }
            if c == b',' {
                if sep {
                    return Err(self.wanted("a value"));
                }
                sep = true;
                self.tok.advance();
                continue;
            }
            if scan::is_whitespace(c) {
                self.eat_whitespace();
                continue;
            }
            if self.eat_newline() {
                continue;
            }
            if c == b'\r' {
                return Err(self.set_error(ErrorKind::Unexpected('\r')));
            }
            if c == b'#' {
                self.parse_comment()?;
                continue;
            }
            if !sep {
                return Err(self.wanted("a comma"));
            }
            if items.len() >= self.limits.max_array_length {
                return Err(self.set_error(ErrorKind::OutOfRange("array length")));
            }
            let value = self.parse_value(scan::ARRAY_END, depth_remaining)?;
            items.push(value);
            sep = false;
        }
    }

    fn parse_inline_table(&mut self, depth_remaining: i16) -> Result<Value, ParseError> {
        if depth_remaining < 0 {
            return Err(self.set_error(ErrorKind::OutOfRange("recursion depth")));
        }
        let mut sub = Key::new(KeyKind::Table, String::new());
        let mut sep = true;
        let mut first = true;
        loop {
            if !self.tok.has_token() {
                return Err(self.set_error(ErrorKind::UnexpectedEof));
            }
            let c = self.tok.current();
            if c == b'}' {
                if sep && !first {
                    return Err(self.set_error(ErrorKind::TrailingComma));
                }
                self.tok.advance();
                return Ok(Value::InlineTable(Box::new(sub)));
            }
            if c == b',' {
                if sep {
                    return Err(self.wanted("a key-value pair"));
                }
                sep = true;
                self.tok.advance();
                continue;
            }
            if scan::is_whitespace(c) {
                self.eat_whitespace();
                continue;
            }
            if c == b'\n' || c == b'\r' {
                return Err(self.set_error(ErrorKind::NewlineInInlineTable));
            }
            if !sep {
                return Err(self.wanted("a comma"));
            }
            let key_start = self.tok.pos();
            let mut scratch = Vec::new();
            let leaf =
                self.parse_key_chain(&mut sub, b'=', KeyKind::Key, KeyKind::KeyLeaf, &mut scratch)?;
            let value = self.parse_value(scan::INLINE_TABLE_END, depth_remaining)?;
            match value {
                Value::InlineTable(nested) => self.splice_inline(leaf, *nested, key_start)?,
                other => leaf.value = Some(other),
            }
            self.eat_whitespace();
            sep = false;
            first = false;
        }
    }
}

/// Walks the header path down from the root, stepping through the current
/// entry of any array-of-tables on the way.
fn resolve_header<'t>(root: &'t mut Key, path: &[String]) -> &'t mut Key {
    let mut cur = root;
    for id in path {
        if cur.kind() == KeyKind::ArrayTable {
            cur = cur
                .current_entry_mut()
                .expect("array table has a current entry by construction");
        }
        cur = cur
            .children
            .get_mut(id)
            .expect("header path segments were validated when the header was parsed");
    }
    cur
}

fn digit_in_base(b: u8, base: u32) -> Option<u64> {
    match base {
        16 => {
            if scan::is_hex_digit(b) {
                Some(scan::hex_value(b) as u64)
            } else {
                None
            }
        }
        8 => {
            if (b'0'..=b'7').contains(&b) {
                Some((b - b'0') as u64)
            } else {
                None
            }
        }
        _ => {
            if b == b'0' || b == b'1' {
                Some((b - b'0') as u64)
            } else {
                None
            }
        }
    }
}

/// Parser buffers are built from validated UTF-8 runs split at ASCII
/// delimiters plus canonical escape encodings, so conversion cannot fail.
fn into_string(buf: Vec<u8>) -> String {
    String::from_utf8(buf).expect("parser buffer holds validated UTF-8")
}
