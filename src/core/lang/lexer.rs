//
//  Copyright (C) 2022-2024  Chase Ruskin
//
//  This program is free software: you can redistribute it and/or modify
//  it under the terms of the GNU General Public License as published by
//  the Free Software Foundation, either version 3 of the License, or
//  (at your option) any later version.
//
//  This program is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//  GNU General Public License for more details.
//
//  You should have received a copy of the GNU General Public License
//  along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

use log::warn;
use serde_derive::Serialize;
use std::cmp::Ordering;

/// Default number of bytes scanned before the tokenizer gives up on a file.
pub const DEFAULT_SIZE_LIMIT: usize = 100_000;

/// Text of the sentinel token pushed at the end of a Verilog token stream.
pub const EOF_SENTINEL: &str = "End-Of-File";

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize)]
/// Half-open byte range `[start, end)` into the scanned source text.
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    /// Creates a new `Span` from `start` to `end`.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Creates a zero-width `Span` located at `at`.
    pub fn empty(at: usize) -> Self {
        Self { start: at, end: at }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Creates a `Span` stretching from the start of `self` to the end of `other`.
    pub fn to(&self, other: &Span) -> Span {
        Span::new(self.start, other.end.max(self.start))
    }

    /// Slices `text` with the span, returning an empty string when the span is
    /// out of bounds.
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        text.get(self.start..self.end).unwrap_or("")
    }

    /// Computes the line and column of the span's start within `text`.
    pub fn locate(&self, text: &str) -> Position {
        let mut pos = Position::new();
        text.char_indices()
            .take_while(|(i, _)| *i < self.start)
            .for_each(|(_, c)| pos.step(&c));
        pos
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

#[derive(Debug, PartialEq, Clone, Ord, Eq)]
/// (Line, Col)
pub struct Position(usize, usize);

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.0.cmp(&other.0) {
            Ordering::Equal => self.1.partial_cmp(&other.1),
            ord => Some(ord),
        }
    }
}

impl Position {
    /// Creates a new `Position` struct as line 1, col 0.
    pub fn new() -> Self {
        Position(1, 0)
    }

    /// Creates a `Position` struct at a particular location `line`:`col`.
    pub fn place(line: usize, col: usize) -> Self {
        Self(line, col)
    }

    /// Increments the column counter by 1. If the current char `c` is a newline,
    /// it will then drop down to the next line.
    pub fn step(&mut self, c: &char) {
        self.1 += 1;
        if c == &'\n' {
            self.0 += 1;
            self.1 = 0;
        }
    }

    /// Access the line (`.0`) number.
    pub fn line(&self) -> usize {
        self.0
    }

    /// Access the col (`.1`) number.
    pub fn col(&self) -> usize {
        self.1
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, ":{}:{}", self.0, self.1)
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Token<'a> {
    text: &'a str,
    span: Span,
}

impl<'a> Token<'a> {
    /// Creates a new token.
    pub fn new(text: &'a str, span: Span) -> Self {
        Self { text, span }
    }

    /// References the matched text.
    pub fn as_str(&self) -> &'a str {
        self.text
    }

    /// Returns the location in the source where the token was captured.
    pub fn locate(&self) -> &Span {
        &self.span
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Checks if the token is made only of white space (new-lines included).
    ///
    /// The empty token counts as blank.
    pub fn is_blank(&self) -> bool {
        self.text.chars().all(|c| c.is_ascii_whitespace())
    }

    pub fn is_eof(&self) -> bool {
        self.text == EOF_SENTINEL && self.span.is_empty()
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// A pattern that separates words in the source text.
pub enum Delimiter {
    /// Matches the exact character sequence.
    Literal(&'static str),
    /// Matches a run of spaces, tabs, carriage returns, vertical tabs and
    /// form feeds. New-lines are kept out so line comments can find their end.
    Blank,
}

impl Delimiter {
    /// Returns the number of bytes the pattern matches at the start of `s`, if any.
    fn match_at(&self, s: &str) -> Option<usize> {
        match self {
            Self::Literal(lit) => match s.starts_with(lit) {
                true => Some(lit.len()),
                false => None,
            },
            Self::Blank => {
                let n = s
                    .bytes()
                    .take_while(|b| matches!(b, b' ' | b'\t' | b'\r' | b'\x0b' | b'\x0c'))
                    .count();
                match n {
                    0 => None,
                    _ => Some(n),
                }
            }
        }
    }

    /// Checks if the pattern could start with byte `b`.
    fn could_start(&self, b: u8) -> bool {
        match self {
            Self::Literal(lit) => lit.as_bytes().first() == Some(&b),
            Self::Blank => matches!(b, b' ' | b'\t' | b'\r' | b'\x0b' | b'\x0c'),
        }
    }
}

/// Splits text into (text-before, delimiter) word pairs.
#[derive(Debug, PartialEq, Clone)]
pub struct Tokenizer<'p> {
    patterns: &'p [Delimiter],
    limit: Option<usize>,
    sentinel: bool,
}

impl<'p> Tokenizer<'p> {
    /// Creates a new `Tokenizer` splitting on `patterns`, where earlier patterns
    /// win ties at the same offset.
    pub fn new(patterns: &'p [Delimiter]) -> Self {
        Self {
            patterns,
            limit: Some(DEFAULT_SIZE_LIMIT),
            sentinel: false,
        }
    }

    /// Sets the size ceiling. `None` scans the whole input.
    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Replaces the empty final delimiter with the `End-Of-File` sentinel.
    pub fn sentinel(mut self, sentinel: bool) -> Self {
        self.sentinel = sentinel;
        self
    }

    /// Finds the leftmost delimiter in `s`, returning its byte offset, length
    /// and the index of the pattern that matched.
    fn find(&self, s: &str) -> Option<(usize, usize)> {
        let bytes = s.as_bytes();
        for i in 0..bytes.len() {
            // patterns only begin on a char boundary
            if s.is_char_boundary(i) == false {
                continue;
            }
            for p in self.patterns {
                if p.could_start(bytes[i]) == false {
                    continue;
                }
                if let Some(n) = p.match_at(&s[i..]) {
                    return Some((i, n));
                }
            }
        }
        None
    }

    /// Splits `text` into a flat list of tokens. Every iteration pushes the
    /// (possibly empty) text before the leftmost delimiter followed by the
    /// delimiter itself.
    pub fn tokenize<'a>(&self, text: &'a str) -> Vec<Token<'a>> {
        let mut tokens = Vec::new();
        let mut offset = 0;
        while offset < text.len() {
            if let Some(limit) = self.limit {
                if offset > limit {
                    warn!(
                        "stopped scanning at byte {} of {} (size limit is {})",
                        offset,
                        text.len(),
                        limit
                    );
                    break;
                }
            }
            let rest = &text[offset..];
            match self.find(rest) {
                Some((at, len)) => {
                    tokens.push(Token::new(&rest[..at], Span::new(offset, offset + at)));
                    tokens.push(Token::new(
                        &rest[at..at + len],
                        Span::new(offset + at, offset + at + len),
                    ));
                    offset += at + len;
                }
                None => {
                    tokens.push(Token::new(rest, Span::new(offset, text.len())));
                    if self.sentinel == false {
                        tokens.push(Token::new("", Span::empty(text.len())));
                    }
                    offset = text.len();
                }
            }
        }
        if self.sentinel == true {
            let end = offset.min(text.len());
            tokens.push(Token::new(EOF_SENTINEL, Span::empty(end)));
        }
        tokens
    }
}

/// Folds `s` to lower case without changing its byte length.
pub fn fold_case(s: &str) -> String {
    s.to_ascii_lowercase()
}

#[cfg(test)]
mod test {
    use super::*;

    const PATTERNS: &[Delimiter] = &[
        Delimiter::Literal("--"),
        Delimiter::Literal("\n"),
        Delimiter::Blank,
        Delimiter::Literal("<="),
        Delimiter::Literal("("),
        Delimiter::Literal(")"),
        Delimiter::Literal(";"),
        Delimiter::Literal("<"),
        Delimiter::Literal("="),
    ];

    fn texts<'a>(tokens: &[Token<'a>]) -> Vec<&'a str> {
        tokens.iter().map(|t| t.as_str()).collect()
    }

    #[test]
    fn pairs_of_words_and_delimiters() {
        let s = "q <= d;";
        let tokens = Tokenizer::new(PATTERNS).tokenize(s);
        assert_eq!(texts(&tokens), vec!["q", " ", "", "<=", "", " ", "d", ";"]);
        assert_eq!(tokens[3].locate(), &Span::new(2, 4));
        assert_eq!(tokens[6].locate(), &Span::new(5, 6));
    }

    #[test]
    fn earlier_pattern_wins_tie() {
        let tokens = Tokenizer::new(PATTERNS).tokenize("a<=b");
        assert_eq!(texts(&tokens), vec!["a", "<=", "b", ""]);
        // reversing the priority splits the operator apart
        let reversed = [
            Delimiter::Literal("<"),
            Delimiter::Literal("="),
            Delimiter::Literal("<="),
        ];
        let tokens = Tokenizer::new(&reversed).tokenize("a<=b");
        assert_eq!(texts(&tokens), vec!["a", "<", "", "=", "b", ""]);
    }

    #[test]
    fn leftmost_match_beats_priority() {
        // '=' starts before '--' so it is found first
        let tokens = Tokenizer::new(PATTERNS).tokenize("x=y--c");
        assert_eq!(texts(&tokens), vec!["x", "=", "y", "--", "c", ""]);
    }

    #[test]
    fn spans_slice_the_source() {
        let s = "entity e is\n  port (a : in bit);";
        let tokens = Tokenizer::new(PATTERNS).tokenize(s);
        for t in &tokens {
            assert_eq!(t.locate().slice(s), t.as_str());
        }
        assert_eq!(tokens.last().unwrap().as_str(), ";");
        assert_eq!(tokens.last().unwrap().locate().end(), s.len());
    }

    #[test]
    fn sentinel_replaces_empty_delimiter() {
        let tokens = Tokenizer::new(PATTERNS).sentinel(true).tokenize("w = 8");
        assert_eq!(texts(&tokens), vec!["w", " ", "", "=", "", " ", "8", EOF_SENTINEL]);
        assert!(tokens.last().unwrap().is_eof());
        let tokens = Tokenizer::new(PATTERNS).sentinel(true).tokenize("");
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is_eof());
    }

    #[test]
    fn size_limit_truncates() {
        let s = "a ".repeat(100);
        let tokens = Tokenizer::new(PATTERNS).limit(Some(10)).tokenize(&s);
        // iterations stop once the offset passes the limit
        let last = tokens.last().unwrap().locate().end();
        assert!(last > 10 && last <= 12);
        let tokens = Tokenizer::new(PATTERNS).limit(None).tokenize(&s);
        assert_eq!(tokens.len(), 200);
    }

    #[test]
    fn locate_line_and_col() {
        let s = "ab\ncd\nef";
        assert_eq!(Span::new(4, 5).locate(s), Position::place(2, 1));
        assert_eq!(Span::new(0, 1).locate(s), Position::place(1, 0));
    }

    #[test]
    fn multibyte_text_keeps_boundaries() {
        let s = "signal ä;";
        let tokens = Tokenizer::new(PATTERNS).tokenize(s);
        assert_eq!(texts(&tokens), vec!["signal", " ", "ä", ";"]);
        assert_eq!(fold_case("ÄB").len(), "ÄB".len());
    }
}
