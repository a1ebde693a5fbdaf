//! Character tokenizer with two characters of look-back and bounded backtrack.
//!
//! The tokenizer owns the document bytes (loaded eagerly by the entry points)
//! and hands the parser one character at a time. There is no token type:
//! productions inspect [`current`](Tokenizer::current),
//! [`prev`](Tokenizer::prev) and [`prev_prev`](Tokenizer::prev_prev)
//! directly and decide locally.
//!
//! [`backtrack`](Tokenizer::backtrack) rewinds `n + 2` characters and then
//! re-advances twice; the two-character overshoot repopulates the look-back
//! pair so that after `backtrack(n)` both `prev` and `prev_prev` hold exactly
//! the values they held when the cursor was last at that position.

#[cfg(test)]
#[path = "./tokenizer_tests.rs"]
mod tests;

use crate::scan;

pub(crate) struct Tokenizer {
    /// Raw bytes of the input. Always valid UTF-8 (validated at load).
    bytes: Box<[u8]>,
    /// Byte offset of `current`; equals `bytes.len()` once exhausted.
    pos: usize,
    current: u8,
    prev: u8,
    prev_prev: u8,
    /// Set once the cursor has moved past the last byte.
    exhausted: bool,
    /// Byte offset of the start of each line; `lines[0] == 0`. Built up
    /// front so that [`backtrack`](Self::backtrack) can reseat the line and
    /// column without rescanning the input.
    lines: Box<[u32]>,
    /// Index into `lines` of the line containing `current`.
    line_idx: usize,
    /// True while only whitespace has been seen since the last newline.
    fresh_line: bool,
}

impl Tokenizer {
    /// Builds a tokenizer over validated UTF-8 bytes and positions it on the
    /// first character. Returns `None` when the document exceeds `max_lines`.
    pub(crate) fn new(bytes: Box<[u8]>, max_lines: usize) -> Option<Tokenizer> {
        let mut lines = vec![0u32];
        for (i, &b) in bytes.iter().enumerate() {
            if b == b'\n' {
                lines.push((i + 1) as u32);
            }
        }
        if lines.len() > max_lines {
            return None;
        }
        let current = bytes.first().copied().unwrap_or(0);
        let exhausted = bytes.is_empty();
        Some(Tokenizer {
            bytes,
            pos: 0,
            current,
            prev: 0,
            prev_prev: 0,
            exhausted,
            lines: lines.into_boxed_slice(),
            line_idx: 0,
            fresh_line: true,
        })
    }

    /// True while `current` holds an unconsumed character.
    #[inline]
    pub(crate) fn has_token(&self) -> bool {
        !self.exhausted
    }

    #[inline]
    pub(crate) fn current(&self) -> u8 {
        self.current
    }

    #[inline]
    pub(crate) fn prev(&self) -> u8 {
        self.prev
    }

    #[inline]
    pub(crate) fn prev_prev(&self) -> u8 {
        self.prev_prev
    }

    /// Byte offset of `current`.
    #[inline]
    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    /// True while only whitespace has been seen since the last newline.
    #[inline]
    pub(crate) fn fresh_line(&self) -> bool {
        self.fresh_line
    }

    /// 1-based line of `current`.
    #[inline]
    pub(crate) fn line(&self) -> u32 {
        self.line_idx as u32 + 1
    }

    /// 1-based column (in bytes) of `current`.
    #[inline]
    pub(crate) fn col(&self) -> u32 {
        self.pos as u32 - self.lines[self.line_idx] + 1
    }

    /// Decodes the character at the cursor for error messages. Falls back to
    /// U+FFFD when the cursor sits inside a multi-byte sequence.
    pub(crate) fn current_char(&self) -> char {
        match std::str::from_utf8(&self.bytes[self.pos.min(self.bytes.len())..]) {
            Ok(text) => text.chars().next().unwrap_or(char::REPLACEMENT_CHARACTER),
            Err(_) => char::REPLACEMENT_CHARACTER,
        }
    }

    /// Shifts current → prev → prev_prev and loads the next character.
    ///
    /// Returns `false` only when the tokenizer was already exhausted; the
    /// read that first runs off the end still counts as an advance.
    pub(crate) fn advance(&mut self) -> bool {
        if self.exhausted {
            return false;
        }
        self.prev_prev = self.prev;
        self.prev = self.current;
        if self.prev == b'\n' {
            self.line_idx += 1;
            self.fresh_line = true;
        } else if self.fresh_line && !scan::is_whitespace(self.prev) {
            self.fresh_line = false;
        }
        self.pos += 1;
        match self.bytes.get(self.pos) {
            Some(&b) => self.current = b,
            None => {
                self.current = 0;
                self.exhausted = true;
            }
        }
        true
    }

    /// Rewinds so that `current` is the character `n` positions before the
    /// one it held, with `prev`/`prev_prev` restored to the values they had
    /// at that point.
    ///
    /// `n` must be positive and must not exceed the number of characters
    /// consumed so far; the parser only ever backtracks over input it has
    /// just read.
    pub(crate) fn backtrack(&mut self, n: usize) {
        debug_assert!(n > 0, "backtrack of zero characters");
        debug_assert!(n <= self.pos, "backtrack past start of input");
        if self.pos == 0 {
            return;
        }
        let rewind = (n + 2).min(self.pos);
        self.pos -= rewind;
        self.current = self.bytes[self.pos];
        self.exhausted = false;
        while self.line_idx > 0 && self.lines[self.line_idx] as usize > self.pos {
            self.line_idx -= 1;
        }
        let line_start = self.lines[self.line_idx] as usize;
        self.fresh_line = self.bytes[line_start..self.pos]
            .iter()
            .all(|&b| scan::is_whitespace(b));
        // Overshot by up to two characters: re-advance so prev/prev_prev are
        // repopulated from the buffer rather than left stale.
        for _ in n..rewind {
            self.advance();
        }
        // Rewinds shorter than two characters cannot overshoot; reseat the
        // look-back pair directly.
        if rewind < n + 2 {
            self.prev = if self.pos > 0 {
                self.bytes[self.pos - 1]
            } else {
                0
            };
            self.prev_prev = if self.pos > 1 {
                self.bytes[self.pos - 2]
            } else {
                0
            };
        }
    }
}
