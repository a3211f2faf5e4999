//! Byte scanner over XML input

use crate::error::Pos;

/// Forward-only scanner tracking line and column
#[derive(Clone, Debug)]
pub struct Cursor<'a> {
    input: &'a [u8],
    offset: usize,
    line: u32,
    col: u32,
}

impl<'a> Cursor<'a> {
    pub const fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            offset: 0,
            line: 1,
            col: 1,
        }
    }

    /// Byte under the cursor
    pub fn current(&self) -> Option<u8> {
        self.input.get(self.offset).copied()
    }

    pub const fn position(&self) -> Pos {
        Pos::new(self.offset, self.line, self.col)
    }

    pub const fn is_eof(&self) -> bool {
        self.offset >= self.input.len()
    }

    /// Unread input
    pub fn remaining(&self) -> &'a [u8] {
        self.input.get(self.offset..).unwrap_or_default()
    }

    pub fn starts_with(&self, pattern: &[u8]) -> bool {
        self.remaining().starts_with(pattern)
    }

    pub fn advance(&mut self) {
        let Some(b) = self.current() else {
            return;
        };
        self.offset += 1;
        if b == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
    }

    /// Consume `expected` if it is the next byte
    pub fn consume(&mut self, expected: u8) -> bool {
        let hit = self.current() == Some(expected);
        if hit {
            self.advance();
        }
        hit
    }

    /// Consume `pattern` if the input continues with it
    pub fn eat(&mut self, pattern: &[u8]) -> bool {
        let hit = self.starts_with(pattern);
        if hit {
            for _ in pattern {
                self.advance();
            }
        }
        hit
    }

    /// XML whitespace: space, tab, CR and LF
    pub fn skip_whitespace(&mut self) {
        self.take_while(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'));
    }

    /// Consume bytes while `keep` holds and return them
    pub fn take_while(&mut self, keep: impl Fn(u8) -> bool) -> &'a [u8] {
        let start = self.offset;
        while self.current().is_some_and(&keep) {
            self.advance();
        }
        self.input.get(start..self.offset).unwrap_or_default()
    }

    /// Consume through the next `terminator`, returning what preceded it
    ///
    /// `None` when the input ends first; the cursor is then at end of input.
    pub fn skip_past(&mut self, terminator: &[u8]) -> Option<&'a [u8]> {
        let start = self.offset;
        while !self.is_eof() {
            let end = self.offset;
            if self.eat(terminator) {
                return self.input.get(start..end);
            }
            self.advance();
        }
        None
    }
}
