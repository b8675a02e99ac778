//! SQL lexer.
//!
//! A byte-oriented scanner over an immutable `&str` view of the input.
//! Produces one token per [`Lexer::next`] call with one-token lookahead via
//! [`Lexer::peek`]. Token text borrows the source wherever possible; only
//! escape decoding forces an owned copy. Uses memchr to skip to the next
//! interesting byte inside strings, comments, and dollar-quoted blocks.
//!
//! The scanner never fails out-of-band: unterminated strings, identifiers,
//! and block comments come back as `Illegal` tokens carrying the partial
//! text, and the parser turns those into syntax errors.

use std::borrow::Cow;

use memchr::{memchr, memchr2, memchr3};
use omnisql_ast::Pos;

use crate::keyword;
use crate::token::{Token, TokenKind};

pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    line: u32,
    /// Byte offset of the current line's first character.
    line_start: usize,
    peeked: Option<Token<'a>>,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            line_start: 0,
            peeked: None,
        }
    }

    /// Consume and return the next token.
    pub fn next(&mut self) -> Token<'a> {
        if let Some(t) = self.peeked.take() {
            return t;
        }
        self.scan()
    }

    /// Return the next token without consuming it.
    pub fn peek(&mut self) -> Token<'a> {
        if self.peeked.is_none() {
            let t = self.scan();
            self.peeked = Some(t);
        }
        self.peeked
            .clone()
            .unwrap_or_else(|| Token::new(TokenKind::Eof, "", Pos::NONE))
    }

    /// Tokenize the entire input, for tests and diagnostics.
    #[must_use]
    pub fn tokenize(src: &'a str) -> Vec<Token<'a>> {
        let mut lexer = Self::new(src);
        let mut tokens = Vec::new();
        loop {
            let tok = lexer.next();
            let done = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if done {
                break;
            }
        }
        tokens
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn bytes(&self) -> &'a [u8] {
        self.src.as_bytes()
    }

    fn at(&self, i: usize) -> Option<u8> {
        self.bytes().get(i).copied()
    }

    /// Record a newline whose `\n` byte has just been consumed.
    fn newline(&mut self) {
        self.line += 1;
        self.line_start = self.pos;
    }

    /// Position of the byte at `offset`, on the current line.
    fn here(&self, offset: usize) -> Pos {
        Pos::new(
            offset as u32,
            self.line,
            (offset - self.line_start + 1) as u32,
        )
    }

    fn token(&self, kind: TokenKind, text: &'a str, pos: Pos) -> Token<'a> {
        Token::new(kind, text, pos)
    }

    fn illegal_from(&self, pos: Pos) -> Token<'a> {
        Token::new(
            TokenKind::Illegal,
            &self.src[pos.offset as usize..self.pos],
            pos,
        )
    }

    fn skip_whitespace(&mut self) {
        while let Some(b) = self.at(self.pos) {
            match b {
                b' ' | b'\t' | b'\r' => self.pos += 1,
                b'\n' => {
                    self.pos += 1;
                    self.newline();
                }
                _ => break,
            }
        }
    }

    // -----------------------------------------------------------------------
    // Main dispatch
    // -----------------------------------------------------------------------

    #[allow(clippy::too_many_lines)]
    fn scan(&mut self) -> Token<'a> {
        self.skip_whitespace();

        let start = self.pos;
        let pos = self.here(start);

        let Some(ch) = self.at(start) else {
            return self.token(TokenKind::Eof, "", pos);
        };

        match ch {
            b'(' => self.single(TokenKind::LParen, pos),
            b')' => self.single(TokenKind::RParen, pos),
            b']' => self.single(TokenKind::RBracket, pos),
            b',' => self.single(TokenKind::Comma, pos),
            b';' => self.single(TokenKind::Semicolon, pos),
            b'+' => self.single(TokenKind::Plus, pos),
            b'*' => self.single(TokenKind::Star, pos),
            b'%' => self.single(TokenKind::Percent, pos),
            b'~' => self.single(TokenKind::BitNot, pos),
            b'^' => self.single(TokenKind::BitXor, pos),
            b'&' => self.single(TokenKind::BitAnd, pos),
            b'=' => self.single(TokenKind::Eq, pos),

            b'[' => self.scan_bracket_or_lbracket(pos),
            b'.' => {
                if self.at(start + 1).is_some_and(|b| b.is_ascii_digit()) {
                    self.scan_number(pos)
                } else {
                    self.single(TokenKind::Dot, pos)
                }
            }
            b'-' => self.scan_minus(pos),
            b'/' => self.scan_slash(pos),
            b'\'' => self.scan_string(pos),
            b'"' => self.scan_double_quoted(pos),
            b'`' => self.scan_backtick(pos),
            b'<' => self.scan_less_than(pos),
            b'>' => self.scan_greater_than(pos),
            b'!' => {
                if self.at(start + 1) == Some(b'=') {
                    self.multi(TokenKind::Ne, 2, pos)
                } else {
                    self.pos += 1;
                    self.illegal_from(pos)
                }
            }
            b'|' => {
                if self.at(start + 1) == Some(b'|') {
                    self.multi(TokenKind::Concat, 2, pos)
                } else {
                    self.single(TokenKind::BitOr, pos)
                }
            }
            b'?' => match self.at(start + 1) {
                Some(b'|') => self.multi(TokenKind::QuestionPipe, 2, pos),
                Some(b'&') => self.multi(TokenKind::QuestionAmp, 2, pos),
                _ => self.single(TokenKind::Param, pos),
            },
            b'$' => self.scan_dollar(pos),
            b':' => self.scan_colon(pos),
            b'#' => self.scan_hash(pos),
            b'@' => self.scan_at(pos),

            b'X' | b'x' if self.at(start + 1) == Some(b'\'') => self.scan_blob(pos),

            b'0'..=b'9' => self.scan_number(pos),
            b if is_ident_start(b) => self.scan_identifier_token(pos),

            _ => {
                // Consume the whole UTF-8 character so slicing stays on a
                // char boundary.
                let len = self.src[start..]
                    .chars()
                    .next()
                    .map_or(1, char::len_utf8);
                self.pos = start + len;
                self.illegal_from(pos)
            }
        }
    }

    fn single(&mut self, kind: TokenKind, pos: Pos) -> Token<'a> {
        let start = self.pos;
        self.pos += 1;
        self.token(kind, &self.src[start..self.pos], pos)
    }

    fn multi(&mut self, kind: TokenKind, len: usize, pos: Pos) -> Token<'a> {
        let start = self.pos;
        self.pos += len;
        self.token(kind, &self.src[start..self.pos], pos)
    }

    // -----------------------------------------------------------------------
    // Identifiers and numbers
    // -----------------------------------------------------------------------

    fn scan_identifier(&mut self) -> &'a str {
        let start = self.pos;
        self.pos += 1;
        while self.at(self.pos).is_some_and(is_ident_char) {
            self.pos += 1;
        }
        &self.src[start..self.pos]
    }

    fn scan_identifier_token(&mut self, pos: Pos) -> Token<'a> {
        let text = self.scan_identifier();
        let kind = keyword::lookup_ident(text);
        self.token(kind, text, pos)
    }

    fn scan_number(&mut self, pos: Pos) -> Token<'a> {
        let start = self.pos;

        // Hex literal: 0x...
        if self.at(start) == Some(b'0')
            && self
                .at(start + 1)
                .is_some_and(|b| b == b'x' || b == b'X')
        {
            self.pos += 2;
            while self.at(self.pos).is_some_and(|b| b.is_ascii_hexdigit()) {
                self.pos += 1;
            }
            return self.token(TokenKind::Int, &self.src[start..self.pos], pos);
        }

        let mut kind = TokenKind::Int;

        while self.at(self.pos).is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }

        if self.at(self.pos) == Some(b'.') {
            // `1..10` is a range: the dot ends the integer.
            if self.at(self.pos + 1) == Some(b'.') {
                return self.token(kind, &self.src[start..self.pos], pos);
            }
            kind = TokenKind::Float;
            self.pos += 1;
            while self.at(self.pos).is_some_and(|b| b.is_ascii_digit()) {
                self.pos += 1;
            }
        }

        if self.at(self.pos).is_some_and(|b| b == b'e' || b == b'E') {
            kind = TokenKind::Float;
            self.pos += 1;
            if self.at(self.pos).is_some_and(|b| b == b'+' || b == b'-') {
                self.pos += 1;
            }
            while self.at(self.pos).is_some_and(|b| b.is_ascii_digit()) {
                self.pos += 1;
            }
        }

        self.token(kind, &self.src[start..self.pos], pos)
    }

    // -----------------------------------------------------------------------
    // Quoted forms
    // -----------------------------------------------------------------------

    /// Single-quoted string. `''` embeds a quote; the C-style escapes
    /// `\n \t \r \\ \' \"` decode to the named character; any other `\X`
    /// is preserved verbatim. Returns the decoded content.
    fn scan_string(&mut self, pos: Pos) -> Token<'a> {
        self.pos += 1; // opening quote
        let mut decoded: Option<String> = None;
        let mut seg = self.pos;

        loop {
            let Some(off) = memchr3(b'\'', b'\\', b'\n', &self.bytes()[self.pos..]) else {
                self.pos = self.src.len();
                return self.illegal_from(pos);
            };
            self.pos += off;
            match self.bytes()[self.pos] {
                b'\n' => {
                    self.pos += 1;
                    self.newline();
                }
                b'\'' => {
                    if self.at(self.pos + 1) == Some(b'\'') {
                        let d = decoded.get_or_insert_with(String::new);
                        d.push_str(&self.src[seg..self.pos]);
                        d.push('\'');
                        self.pos += 2;
                        seg = self.pos;
                    } else {
                        let text: Cow<'a, str> = match decoded {
                            Some(mut d) => {
                                d.push_str(&self.src[seg..self.pos]);
                                Cow::Owned(d)
                            }
                            None => Cow::Borrowed(&self.src[seg..self.pos]),
                        };
                        self.pos += 1;
                        return Token::new(TokenKind::Str, text, pos);
                    }
                }
                _ => {
                    // backslash escape
                    let d = decoded.get_or_insert_with(String::new);
                    d.push_str(&self.src[seg..self.pos]);
                    match self.at(self.pos + 1) {
                        Some(b'n') => {
                            d.push('\n');
                            self.pos += 2;
                        }
                        Some(b't') => {
                            d.push('\t');
                            self.pos += 2;
                        }
                        Some(b'r') => {
                            d.push('\r');
                            self.pos += 2;
                        }
                        Some(b'\\') => {
                            d.push('\\');
                            self.pos += 2;
                        }
                        Some(b'\'') => {
                            d.push('\'');
                            self.pos += 2;
                        }
                        Some(b'"') => {
                            d.push('"');
                            self.pos += 2;
                        }
                        Some(b'\n') => {
                            d.push('\\');
                            d.push('\n');
                            self.pos += 2;
                            self.newline();
                        }
                        Some(_) => {
                            // Unknown escape: keep backslash and character.
                            d.push('\\');
                            self.pos += 1;
                            if let Some(c) = self.src[self.pos..].chars().next() {
                                d.push(c);
                                self.pos += c.len_utf8();
                            }
                        }
                        None => {
                            self.pos = self.src.len();
                            return self.illegal_from(pos);
                        }
                    }
                    seg = self.pos;
                }
            }
        }
    }

    /// Double-quoted identifier with `""` as the embedded-quote escape.
    fn scan_double_quoted(&mut self, pos: Pos) -> Token<'a> {
        self.pos += 1; // opening "
        let mut decoded: Option<String> = None;
        let mut seg = self.pos;

        loop {
            let Some(off) = memchr2(b'"', b'\n', &self.bytes()[self.pos..]) else {
                self.pos = self.src.len();
                return self.illegal_from(pos);
            };
            self.pos += off;
            if self.bytes()[self.pos] == b'\n' {
                self.pos += 1;
                self.newline();
                continue;
            }
            if self.at(self.pos + 1) == Some(b'"') {
                let d = decoded.get_or_insert_with(String::new);
                d.push_str(&self.src[seg..self.pos]);
                d.push('"');
                self.pos += 2;
                seg = self.pos;
            } else {
                let text: Cow<'a, str> = match decoded {
                    Some(mut d) => {
                        d.push_str(&self.src[seg..self.pos]);
                        Cow::Owned(d)
                    }
                    None => Cow::Borrowed(&self.src[seg..self.pos]),
                };
                self.pos += 1;
                return Token::new(TokenKind::Ident, text, pos);
            }
        }
    }

    /// Backtick identifier. A doubled backtick continues the identifier
    /// and stays in the content undecoded.
    fn scan_backtick(&mut self, pos: Pos) -> Token<'a> {
        let content_start = self.pos + 1;
        self.pos += 1;

        loop {
            let Some(off) = memchr2(b'`', b'\n', &self.bytes()[self.pos..]) else {
                self.pos = self.src.len();
                return self.illegal_from(pos);
            };
            self.pos += off;
            if self.bytes()[self.pos] == b'\n' {
                self.pos += 1;
                self.newline();
                continue;
            }
            if self.at(self.pos + 1) == Some(b'`') {
                self.pos += 2;
            } else {
                let text = &self.src[content_start..self.pos];
                self.pos += 1;
                return self.token(TokenKind::Ident, text, pos);
            }
        }
    }

    /// `[` starts a SQL Server bracket identifier only when the next byte
    /// could begin one (letter, underscore, `#`, `@`); everything else is
    /// the `LBracket` punctuation token, which is what lets array
    /// subscripts `arr[ idx ]` coexist with `[col name]`.
    fn scan_bracket_or_lbracket(&mut self, pos: Pos) -> Token<'a> {
        match self.at(self.pos + 1) {
            Some(b) if is_ident_start(b) || b == b'#' || b == b'@' => self.scan_bracket_ident(pos),
            _ => self.single(TokenKind::LBracket, pos),
        }
    }

    /// Bracket identifier with `]]` as the embedded-bracket escape.
    fn scan_bracket_ident(&mut self, pos: Pos) -> Token<'a> {
        self.pos += 1; // opening [
        let mut decoded: Option<String> = None;
        let mut seg = self.pos;

        loop {
            let Some(off) = memchr2(b']', b'\n', &self.bytes()[self.pos..]) else {
                self.pos = self.src.len();
                return self.illegal_from(pos);
            };
            self.pos += off;
            if self.bytes()[self.pos] == b'\n' {
                self.pos += 1;
                self.newline();
                continue;
            }
            if self.at(self.pos + 1) == Some(b']') {
                let d = decoded.get_or_insert_with(String::new);
                d.push_str(&self.src[seg..self.pos]);
                d.push(']');
                self.pos += 2;
                seg = self.pos;
            } else {
                let text: Cow<'a, str> = match decoded {
                    Some(mut d) => {
                        d.push_str(&self.src[seg..self.pos]);
                        Cow::Owned(d)
                    }
                    None => Cow::Borrowed(&self.src[seg..self.pos]),
                };
                self.pos += 1;
                return Token::new(TokenKind::Ident, text, pos);
            }
        }
    }

    /// Blob literal `X'...'`. The hex digits are kept raw; validity is the
    /// consumer's concern.
    fn scan_blob(&mut self, pos: Pos) -> Token<'a> {
        self.pos += 2; // X and '
        let content_start = self.pos;

        loop {
            let Some(off) = memchr2(b'\'', b'\n', &self.bytes()[self.pos..]) else {
                self.pos = self.src.len();
                return self.illegal_from(pos);
            };
            self.pos += off;
            if self.bytes()[self.pos] == b'\n' {
                self.pos += 1;
                self.newline();
                continue;
            }
            let text = &self.src[content_start..self.pos];
            self.pos += 1;
            return self.token(TokenKind::Blob, text, pos);
        }
    }

    // -----------------------------------------------------------------------
    // Prefixed forms: $ : # @ and comments
    // -----------------------------------------------------------------------

    /// `$N` positional parameter, or a dollar-quoted string
    /// (`$$..$$` / `$tag$..$tag$`).
    fn scan_dollar(&mut self, pos: Pos) -> Token<'a> {
        let start = self.pos;
        self.pos += 1;

        if self.at(self.pos).is_some_and(|b| b.is_ascii_digit()) {
            while self.at(self.pos).is_some_and(|b| b.is_ascii_digit()) {
                self.pos += 1;
            }
            return self.token(TokenKind::Param, &self.src[start..self.pos], pos);
        }

        match self.at(self.pos) {
            Some(b'$') => {
                self.pos += 1;
                self.scan_dollar_quoted("", pos)
            }
            Some(b) if is_ident_start(b) => {
                let tag_start = self.pos;
                while self.at(self.pos).is_some_and(is_tag_char) {
                    self.pos += 1;
                }
                if self.at(self.pos) == Some(b'$') {
                    let tag = &self.src[tag_start..self.pos];
                    self.pos += 1;
                    self.scan_dollar_quoted(tag, pos)
                } else {
                    self.pos = start + 1;
                    self.illegal_from(pos)
                }
            }
            _ => self.illegal_from(pos),
        }
    }

    fn scan_dollar_quoted(&mut self, tag: &str, pos: Pos) -> Token<'a> {
        let content_start = self.pos;
        let delim_len = tag.len() + 2;

        loop {
            let Some(off) = memchr2(b'$', b'\n', &self.bytes()[self.pos..]) else {
                self.pos = self.src.len();
                return self.illegal_from(pos);
            };
            self.pos += off;
            if self.bytes()[self.pos] == b'\n' {
                self.pos += 1;
                self.newline();
                continue;
            }
            let rest = &self.bytes()[self.pos..];
            if rest.len() >= delim_len
                && rest[delim_len - 1] == b'$'
                && &rest[1..delim_len - 1] == tag.as_bytes()
            {
                let text = &self.src[content_start..self.pos];
                self.pos += delim_len;
                return self.token(TokenKind::Str, text, pos);
            }
            self.pos += 1;
        }
    }

    /// `::` cast, `:name` parameter, or a bare colon.
    fn scan_colon(&mut self, pos: Pos) -> Token<'a> {
        let start = self.pos;
        match self.at(start + 1) {
            Some(b':') => self.multi(TokenKind::DoubleColon, 2, pos),
            Some(b) if is_ident_start(b) => {
                self.pos += 1;
                self.scan_identifier();
                self.token(TokenKind::Param, &self.src[start..self.pos], pos)
            }
            _ => self.single(TokenKind::Colon, pos),
        }
    }

    /// `@@`, `@name` parameter, or a bare `@`.
    fn scan_at(&mut self, pos: Pos) -> Token<'a> {
        let start = self.pos;
        match self.at(start + 1) {
            Some(b'@') => self.multi(TokenKind::AtAt, 2, pos),
            Some(b) if is_ident_start(b) => {
                self.pos += 1;
                self.scan_identifier();
                self.token(TokenKind::Param, &self.src[start..self.pos], pos)
            }
            _ => self.single(TokenKind::At, pos),
        }
    }

    /// `#>` / `#>>` JSON operators, `#temp` / `##temp` table identifiers,
    /// or a MySQL-style line comment.
    fn scan_hash(&mut self, pos: Pos) -> Token<'a> {
        let start = self.pos;
        match self.at(start + 1) {
            Some(b'>') => {
                if self.at(start + 2) == Some(b'>') {
                    self.multi(TokenKind::HashDoubleArrow, 3, pos)
                } else {
                    self.multi(TokenKind::HashArrow, 2, pos)
                }
            }
            Some(b'#') if self.at(start + 2).is_some_and(is_ident_start) => {
                self.pos += 2;
                self.scan_identifier();
                self.token(TokenKind::Ident, &self.src[start..self.pos], pos)
            }
            Some(b) if is_ident_start(b) => {
                self.pos += 1;
                self.scan_identifier();
                self.token(TokenKind::Ident, &self.src[start..self.pos], pos)
            }
            _ => self.scan_line_comment(pos),
        }
    }

    /// `-` family: `--` line comment, `->` / `->>` JSON operators, minus.
    fn scan_minus(&mut self, pos: Pos) -> Token<'a> {
        match self.at(self.pos + 1) {
            Some(b'-') => self.scan_line_comment(pos),
            Some(b'>') => {
                if self.at(self.pos + 2) == Some(b'>') {
                    self.multi(TokenKind::DoubleArrow, 3, pos)
                } else {
                    self.multi(TokenKind::Arrow, 2, pos)
                }
            }
            _ => self.single(TokenKind::Minus, pos),
        }
    }

    fn scan_slash(&mut self, pos: Pos) -> Token<'a> {
        if self.at(self.pos + 1) == Some(b'*') {
            self.scan_block_comment(pos)
        } else {
            self.single(TokenKind::Slash, pos)
        }
    }

    fn scan_less_than(&mut self, pos: Pos) -> Token<'a> {
        match self.at(self.pos + 1) {
            Some(b'=') => self.multi(TokenKind::Le, 2, pos),
            Some(b'>') => self.multi(TokenKind::Ne, 2, pos),
            Some(b'<') => self.multi(TokenKind::ShiftLeft, 2, pos),
            _ => self.single(TokenKind::Lt, pos),
        }
    }

    fn scan_greater_than(&mut self, pos: Pos) -> Token<'a> {
        match self.at(self.pos + 1) {
            Some(b'=') => self.multi(TokenKind::Ge, 2, pos),
            Some(b'>') => self.multi(TokenKind::ShiftRight, 2, pos),
            _ => self.single(TokenKind::Gt, pos),
        }
    }

    /// Comment running to end of line; the newline is not consumed.
    fn scan_line_comment(&mut self, pos: Pos) -> Token<'a> {
        let start = self.pos;
        match memchr(b'\n', &self.bytes()[self.pos..]) {
            Some(off) => self.pos += off,
            None => self.pos = self.src.len(),
        }
        self.token(TokenKind::Comment, &self.src[start..self.pos], pos)
    }

    /// `/* .. */` block comment; does not nest.
    fn scan_block_comment(&mut self, pos: Pos) -> Token<'a> {
        let start = self.pos;
        self.pos += 2;

        loop {
            let Some(off) = memchr2(b'*', b'\n', &self.bytes()[self.pos..]) else {
                self.pos = self.src.len();
                return self.illegal_from(pos);
            };
            self.pos += off;
            if self.bytes()[self.pos] == b'\n' {
                self.pos += 1;
                self.newline();
                continue;
            }
            if self.at(self.pos + 1) == Some(b'/') {
                self.pos += 2;
                return self.token(TokenKind::Comment, &self.src[start..self.pos], pos);
            }
            self.pos += 1;
        }
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

fn is_tag_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::tokenize(src).into_iter().map(|t| t.kind).collect()
    }

    fn texts(src: &str) -> Vec<String> {
        Lexer::tokenize(src)
            .into_iter()
            .map(|t| t.text.into_owned())
            .collect()
    }

    #[test]
    fn test_integer_and_hex() {
        assert_eq!(
            kinds("42 0 0xFF"),
            vec![TokenKind::Int, TokenKind::Int, TokenKind::Int, TokenKind::Eof]
        );
        assert_eq!(texts("0xFF")[0], "0xFF");
    }

    #[test]
    fn test_float_forms() {
        let toks = Lexer::tokenize(".5 5. 1e10 1.5e+10 3.14");
        for t in &toks[..5] {
            assert_eq!(t.kind, TokenKind::Float, "token {:?}", t.text);
        }
        assert_eq!(toks[0].text, ".5");
        assert_eq!(toks[1].text, "5.");
        assert_eq!(toks[3].text, "1.5e+10");
    }

    #[test]
    fn test_range_terminates_integer() {
        // `1..10` must lex as INT DOT DOT INT, not a float.
        assert_eq!(
            kinds("1..10"),
            vec![
                TokenKind::Int,
                TokenKind::Dot,
                TokenKind::Dot,
                TokenKind::Int,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_string_decoding() {
        assert_eq!(texts("'hello'")[0], "hello");
        assert_eq!(texts("'it''s'")[0], "it's");
        assert_eq!(texts(r"'a\nb'")[0], "a\nb");
        assert_eq!(texts(r"'a\tb'")[0], "a\tb");
        assert_eq!(texts(r"'a\\b'")[0], "a\\b");
        assert_eq!(texts(r"'a\'b'")[0], "a'b");
        // Unknown escapes are preserved as two characters.
        assert_eq!(texts(r"'a\qb'")[0], "a\\qb");
    }

    #[test]
    fn test_unterminated_string_is_illegal() {
        let toks = Lexer::tokenize("'abc");
        assert_eq!(toks[0].kind, TokenKind::Illegal);
        assert_eq!(toks[1].kind, TokenKind::Eof);
    }

    #[test]
    fn test_quoted_identifiers() {
        let toks = Lexer::tokenize("\"col name\" \"a\"\"b\" `tick` [brak] [a]]b]");
        assert_eq!(toks[0].kind, TokenKind::Ident);
        assert_eq!(toks[0].text, "col name");
        assert_eq!(toks[1].text, "a\"b");
        assert_eq!(toks[2].text, "tick");
        assert_eq!(toks[3].text, "brak");
        assert_eq!(toks[4].text, "a]b");
    }

    #[test]
    fn test_backtick_escape_is_undecoded() {
        assert_eq!(texts("`a``b`")[0], "a``b");
    }

    #[test]
    fn test_bracket_vs_subscript() {
        // `[x]` is a bracket identifier; `[ x ]` and `[1]` are subscript
        // punctuation.
        assert_eq!(kinds("[x]")[0], TokenKind::Ident);
        assert_eq!(
            kinds("[ x ]"),
            vec![
                TokenKind::LBracket,
                TokenKind::Ident,
                TokenKind::RBracket,
                TokenKind::Eof
            ]
        );
        assert_eq!(kinds("[1]")[0], TokenKind::LBracket);
        assert_eq!(kinds("[#tmp]")[0], TokenKind::Ident);
        assert_eq!(kinds("[@v]")[0], TokenKind::Ident);
    }

    #[test]
    fn test_temp_table_identifiers() {
        let toks = Lexer::tokenize("#tmp ##global");
        assert_eq!(toks[0].kind, TokenKind::Ident);
        assert_eq!(toks[0].text, "#tmp");
        assert_eq!(toks[1].kind, TokenKind::Ident);
        assert_eq!(toks[1].text, "##global");
    }

    #[test]
    fn test_hash_comment() {
        let toks = Lexer::tokenize("# not a temp table\nx");
        assert_eq!(toks[0].kind, TokenKind::Comment);
        assert_eq!(toks[1].text, "x");
    }

    #[test]
    fn test_dollar_quoted_strings() {
        assert_eq!(texts("$$hi$$")[0], "hi");
        assert_eq!(texts("$tag$a $ b$tag$")[0], "a $ b");
        assert_eq!(texts("$$'''$$")[0], "'''");
        // No escapes inside dollar quotes.
        assert_eq!(texts(r"$$\$$")[0], "\\");
    }

    #[test]
    fn test_unterminated_dollar_quote() {
        assert_eq!(kinds("$tag$oops")[0], TokenKind::Illegal);
    }

    #[test]
    fn test_parameters() {
        let toks = Lexer::tokenize("? $1 :name @name");
        for t in &toks[..4] {
            assert_eq!(t.kind, TokenKind::Param);
        }
        assert_eq!(toks[0].text, "?");
        assert_eq!(toks[1].text, "$1");
        assert_eq!(toks[2].text, ":name");
        assert_eq!(toks[3].text, "@name");
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("<= >= <> != << >> || :: -> ->> #> #>> ?| ?& @@"),
            vec![
                TokenKind::Le,
                TokenKind::Ge,
                TokenKind::Ne,
                TokenKind::Ne,
                TokenKind::ShiftLeft,
                TokenKind::ShiftRight,
                TokenKind::Concat,
                TokenKind::DoubleColon,
                TokenKind::Arrow,
                TokenKind::DoubleArrow,
                TokenKind::HashArrow,
                TokenKind::HashDoubleArrow,
                TokenKind::QuestionPipe,
                TokenKind::QuestionAmp,
                TokenKind::AtAt,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_comments_are_tokens() {
        let toks = Lexer::tokenize("select -- trailing\n1 /* block */ from");
        assert_eq!(toks[0].kind, TokenKind::KwSelect);
        assert_eq!(toks[1].kind, TokenKind::Comment);
        assert_eq!(toks[1].text, "-- trailing");
        assert_eq!(toks[2].kind, TokenKind::Int);
        assert_eq!(toks[3].kind, TokenKind::Comment);
        assert_eq!(toks[4].kind, TokenKind::KwFrom);
    }

    #[test]
    fn test_unterminated_block_comment() {
        assert_eq!(kinds("/* never ends")[0], TokenKind::Illegal);
    }

    #[test]
    fn test_blob_literal() {
        let toks = Lexer::tokenize("X'CAFE' x'00ff'");
        assert_eq!(toks[0].kind, TokenKind::Blob);
        assert_eq!(toks[0].text, "CAFE");
        assert_eq!(toks[1].kind, TokenKind::Blob);
        assert_eq!(toks[1].text, "00ff");
    }

    #[test]
    fn test_keywords_case_insensitive() {
        let toks = Lexer::tokenize("select SELECT SeLeCt");
        for t in &toks[..3] {
            assert_eq!(t.kind, TokenKind::KwSelect);
        }
        // Source spelling is preserved.
        assert_eq!(toks[0].text, "select");
        assert_eq!(toks[1].text, "SELECT");
    }

    #[test]
    fn test_line_and_column_tracking() {
        let toks = Lexer::tokenize("select\n  a,\n  b");
        assert_eq!((toks[0].pos.line, toks[0].pos.column), (1, 1));
        assert_eq!((toks[1].pos.line, toks[1].pos.column), (2, 3));
        assert_eq!((toks[2].pos.line, toks[2].pos.column), (2, 4));
        assert_eq!((toks[3].pos.line, toks[3].pos.column), (3, 3));
    }

    #[test]
    fn test_newlines_inside_strings_count() {
        let toks = Lexer::tokenize("'a\nb' x");
        assert_eq!(toks[0].kind, TokenKind::Str);
        assert_eq!(toks[1].pos.line, 2);
    }

    #[test]
    fn test_offsets_monotonic() {
        let toks = Lexer::tokenize("select a, b from t where x = 'y' -- done");
        let offsets: Vec<u32> = toks.iter().map(|t| t.pos.offset).collect();
        let mut sorted = offsets.clone();
        sorted.sort_unstable();
        assert_eq!(offsets, sorted);
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut lexer = Lexer::new("select 1");
        assert_eq!(lexer.peek().kind, TokenKind::KwSelect);
        assert_eq!(lexer.peek().kind, TokenKind::KwSelect);
        assert_eq!(lexer.next().kind, TokenKind::KwSelect);
        assert_eq!(lexer.next().kind, TokenKind::Int);
        assert_eq!(lexer.next().kind, TokenKind::Eof);
    }

    #[test]
    fn test_lexer_total_on_junk() {
        // Arbitrary bytes never panic and always reach EOF.
        for src in ["\\", "!", "!!", "$", "$x", "€", "a€b", "\u{0}", "::::"] {
            let toks = Lexer::tokenize(src);
            assert_eq!(toks.last().map(|t| t.kind), Some(TokenKind::Eof));
        }
    }
}
