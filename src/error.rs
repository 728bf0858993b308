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

use colored::Colorize;
use std::{fmt::Display, path::PathBuf};

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("unknown language {0:?}{1}")]
    UnknownLanguage(String, Hint),
    #[error("cannot detect the language of {0:?}{1}")]
    UndetectedLanguage(PathBuf, Hint),
    #[error("failed to read file {0:?}: {1}")]
    FileUnreadable(PathBuf, LastError),
    #[error("failed to read configuration {0:?}: {1}")]
    ConfigUnreadable(PathBuf, LastError),
    #[error("invalid configuration {0:?}: {1}")]
    ConfigInvalid(PathBuf, LastError),
    #[error("unknown color mode {0:?}{1}")]
    UnknownColorMode(String, Hint),
    #[error("failed to serialize symbol table: {0}")]
    JsonFailed(LastError),
    #[error("{0} process(es) have incomplete or superfluous sensitivity lists")]
    SensitivityMismatch(usize),
}

#[derive(Debug, PartialEq)]
pub struct LastError(pub String);

impl Display for LastError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Error::lowerize(self.0.to_string()))
    }
}

impl Error {
    pub fn lowerize(s: String) -> String {
        let first_word = match s.split_whitespace().next() {
            Some(w) => w,
            None => return s,
        };
        // retain punctuation if the first word is all-caps and longer than 1 character
        if first_word.len() > 1
            && first_word
                .chars()
                .find(|c| c.is_ascii_lowercase() == true)
                .is_none()
        {
            s.to_string()
        } else {
            s.char_indices()
                .map(|(i, c)| if i == 0 { c.to_ascii_lowercase() } else { c })
                .collect()
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Hint {
    LanguageList,
    LangFlag,
    ColorModes,
}

impl Display for Hint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            Self::LanguageList => "supported languages are \"vhdl\" and \"verilog\"",
            Self::LangFlag => "use the \"--lang\" option to choose the language explicitly",
            Self::ColorModes => "supported color modes are \"auto\", \"always\" and \"never\"",
        };
        write!(
            f,
            "\n\n{}: {}",
            "hint".green(),
            Error::lowerize(message.to_string())
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn lowerize_messages() {
        assert_eq!(Error::lowerize("No such file".to_string()), "no such file");
        assert_eq!(Error::lowerize("TOML parse error".to_string()), "TOML parse error");
        assert_eq!(Error::lowerize(String::new()), "");
    }
}
