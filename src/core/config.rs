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

use log::debug;
use serde_derive::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::core::lang::lexer::DEFAULT_SIZE_LIMIT;
use crate::error::{Error, Hint, LastError};

pub const CONFIG_FILE: &str = "hdlscan.toml";

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum ColorMode {
    #[serde(rename = "auto")]
    Auto,
    #[serde(rename = "always")]
    Always,
    #[serde(rename = "never")]
    Never,
}

impl Default for ColorMode {
    fn default() -> Self {
        Self::Auto
    }
}

impl FromStr for ColorMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            _ => Err(Error::UnknownColorMode(s.to_string(), Hint::ColorModes)),
        }
    }
}

impl ColorMode {
    /// Forces colors on or off for the rest of the process.
    pub fn apply(&self) {
        match self {
            Self::Always => colored::control::set_override(true),
            Self::Never => colored::control::set_override(false),
            Self::Auto => (),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct Parse {
    #[serde(default)]
    allow_large_files: bool,
    #[serde(default = "Parse::default_size_limit")]
    size_limit: usize,
}

impl Default for Parse {
    fn default() -> Self {
        Self {
            allow_large_files: false,
            size_limit: Self::default_size_limit(),
        }
    }
}

impl Parse {
    fn default_size_limit() -> usize {
        DEFAULT_SIZE_LIMIT
    }
}

#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Output {
    #[serde(default)]
    color: ColorMode,
}

#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    parse: Parse,
    #[serde(default)]
    output: Output,
}

impl FromStr for Config {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s)
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the configuration stored at `path`.
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigUnreadable(path.to_path_buf(), LastError(e.to_string())))?;
        let cfg = Self::from_str(&contents)
            .map_err(|e| Error::ConfigInvalid(path.to_path_buf(), LastError(e.to_string())))?;
        debug!("loaded configuration from {:?}", path);
        Ok(cfg)
    }

    /// Reads the configuration at `path`, or the default file in the current
    /// directory when it exists.
    pub fn load(path: Option<&PathBuf>) -> Result<Self, Error> {
        match path {
            Some(p) => Self::from_file(p),
            None => {
                let local = PathBuf::from(CONFIG_FILE);
                match local.is_file() {
                    true => Self::from_file(&local),
                    false => Ok(Self::new()),
                }
            }
        }
    }

    /// Returns the size ceiling to scan with, or `None` for no ceiling.
    pub fn get_size_limit(&self) -> Option<usize> {
        match self.parse.allow_large_files {
            true => None,
            false => Some(self.parse.size_limit),
        }
    }

    pub fn get_color_mode(&self) -> ColorMode {
        self.output.color
    }

    pub fn allow_large_files(mut self, allow: bool) -> Self {
        if allow == true {
            self.parse.allow_large_files = true;
        }
        self
    }

    pub fn color_mode(mut self, mode: Option<ColorMode>) -> Self {
        if let Some(m) = mode {
            self.output.color = m;
        }
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn full_file() {
        let cfg = Config::from_str(EX1).unwrap();
        assert_eq!(cfg.get_size_limit(), Some(2048));
        assert_eq!(cfg.get_color_mode(), ColorMode::Never);
        let cfg = cfg.allow_large_files(true);
        assert_eq!(cfg.get_size_limit(), None);
    }

    #[test]
    fn empty_file_uses_defaults() {
        let cfg = Config::from_str("").unwrap();
        assert_eq!(cfg, Config::new());
        assert_eq!(cfg.get_size_limit(), Some(DEFAULT_SIZE_LIMIT));
        assert_eq!(cfg.get_color_mode(), ColorMode::Auto);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::from_str("[parse]\nlimit = 3\n").is_err());
        assert!(Config::from_str("[render]\n").is_err());
        assert!(Config::from_str("[output]\ncolor = \"sometimes\"\n").is_err());
    }

    #[test]
    fn flags_override_file() {
        let cfg = Config::from_str(EX1)
            .unwrap()
            .color_mode(Some(ColorMode::Always))
            .allow_large_files(false);
        assert_eq!(cfg.get_color_mode(), ColorMode::Always);
        assert_eq!(cfg.get_size_limit(), Some(2048));
    }

    const EX1: &str = r#"
[parse]
allow-large-files = false
size-limit = 2048

[output]
color = "never"
"#;
}
