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

//! Helpers shared by the region state machines.

use super::lexer::Token;

/// Accumulates token text while a region is collecting an expression.
///
/// Runs of white space collapse into a single space and leading/trailing
/// white space is dropped when the text is taken.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Capture {
    text: String,
    active: bool,
}

impl Capture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fresh capture, discarding anything collected before.
    pub fn start(&mut self) {
        self.text.clear();
        self.active = true;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Appends the token's text. Empty tokens add nothing.
    pub fn push(&mut self, t: &Token) {
        if t.is_empty() == true {
            return;
        } else if t.is_blank() == true {
            self.push_blank();
        } else {
            self.text.push_str(t.as_str());
        }
    }

    pub fn push_str(&mut self, s: &str) {
        self.text.push_str(s);
    }

    pub fn push_blank(&mut self) {
        if self.text.is_empty() == false && self.text.ends_with(' ') == false {
            self.text.push(' ');
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Ends the capture and takes the collected text.
    pub fn take(&mut self) -> String {
        self.active = false;
        let result = self.text.trim().to_string();
        self.text.clear();
        result
    }

    /// Ends the capture without keeping its text.
    pub fn cancel(&mut self) {
        self.active = false;
        self.text.clear();
    }
}

/// Finds the next token at or after `from` that is neither blank nor inside
/// a comment. `comments` lists (opener, closer) pairs.
pub fn peek_significant<'a>(
    tokens: &[Token<'a>],
    from: usize,
    comments: &[(&str, &str)],
) -> Option<Token<'a>> {
    let mut i = from;
    while let Some(t) = tokens.get(i) {
        if t.is_blank() == true {
            i += 1;
            continue;
        }
        match comments.iter().find(|(open, _)| *open == t.as_str()) {
            Some((_, close)) => {
                // jump over the comment's contents
                i += 1;
                while let Some(c) = tokens.get(i) {
                    i += 1;
                    if c.as_str() == *close {
                        break;
                    }
                }
            }
            None => return Some(*t),
        }
    }
    None
}

#[cfg(test)]
mod test {
    use super::super::lexer::{Delimiter, Tokenizer};
    use super::*;

    const PATTERNS: &[Delimiter] = &[
        Delimiter::Literal("--"),
        Delimiter::Literal("\n"),
        Delimiter::Blank,
        Delimiter::Literal("("),
        Delimiter::Literal(")"),
        Delimiter::Literal(";"),
        Delimiter::Literal(","),
    ];

    #[test]
    fn capture_collapses_white_space() {
        let s = "( 7   downto\n  0 )";
        let tokens = Tokenizer::new(PATTERNS).tokenize(s);
        let mut cap = Capture::new();
        cap.start();
        tokens.iter().for_each(|t| cap.push(t));
        assert_eq!(cap.take(), "( 7 downto 0 )");
        assert_eq!(cap.is_active(), false);
        // empty words between adjacent delimiters add nothing
        cap.start();
        Tokenizer::new(PATTERNS)
            .tokenize("f(1,(2))")
            .iter()
            .for_each(|t| cap.push(t));
        assert_eq!(cap.take(), "f(1,(2))");
    }

    #[test]
    fn peek_skips_comments() {
        let s = "end -- note\n  generate;";
        let tokens = Tokenizer::new(PATTERNS).tokenize(s);
        // index 1 is the blank after "end"
        let next = peek_significant(&tokens, 1, &[("--", "\n")]).unwrap();
        assert_eq!(next.as_str(), "generate");
        assert_eq!(peek_significant(&tokens, tokens.len(), &[]), None);
    }
}
