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

pub mod highlight;
pub mod lexer;
pub mod scan;
pub mod sensitivity;
pub mod symbols;
pub mod verilog;
pub mod vhdl;

use serde_derive::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Hint};
use lexer::Span;
use sensitivity::Report;
use symbols::{Diagnostic, ProcessBlock, Query, Value};
use verilog::{VerilogRegion, VerilogTable};
use vhdl::{VhdlRegion, VhdlTable};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum Lang {
    #[serde(rename = "vhdl")]
    Vhdl,
    #[serde(rename = "verilog")]
    Verilog,
}

impl Lang {
    /// Detects the language from a file's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "vhd" | "vhdl" => Some(Self::Vhdl),
            "v" | "vh" | "sv" | "svh" => Some(Self::Verilog),
            _ => None,
        }
    }
}

impl Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Vhdl => "vhdl",
                Self::Verilog => "verilog",
            }
        )
    }
}

impl FromStr for Lang {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vhdl" | "vhd" => Ok(Self::Vhdl),
            "verilog" | "v" | "systemverilog" | "sv" => Ok(Self::Verilog),
            _ => Err(Error::UnknownLanguage(s.to_string(), Hint::LanguageList)),
        }
    }
}

/// The symbol table of either language.
#[derive(Debug, PartialEq, Clone, Serialize)]
#[serde(untagged)]
pub enum ParseResult {
    Vhdl(VhdlTable),
    Verilog(VerilogTable),
}

impl ParseResult {
    pub fn get_lang(&self) -> Lang {
        match self {
            Self::Vhdl(_) => Lang::Vhdl,
            Self::Verilog(_) => Lang::Verilog,
        }
    }

    pub fn get_processes(&self) -> &[ProcessBlock] {
        match self {
            Self::Vhdl(t) => t.get_processes(),
            Self::Verilog(t) => t.get_processes(),
        }
    }

    pub fn get_diagnostics(&self) -> &[Diagnostic] {
        match self {
            Self::Vhdl(t) => t.get_diagnostics(),
            Self::Verilog(t) => t.get_diagnostics(),
        }
    }

    /// Runs the sensitivity check on every process of the table.
    pub fn check_sensitivity(&self) -> Vec<(&ProcessBlock, Report)> {
        match self {
            Self::Vhdl(t) => t
                .get_processes()
                .iter()
                .map(|b| (b, sensitivity::check(t, b)))
                .collect(),
            Self::Verilog(t) => t
                .get_processes()
                .iter()
                .map(|b| (b, sensitivity::check(t, b)))
                .collect(),
        }
    }
}

impl Query for ParseResult {
    fn get(&self, tag: &str) -> Value<'_> {
        match self {
            Self::Vhdl(t) => t.get(tag),
            Self::Verilog(t) => t.get(tag),
        }
    }

    fn get_positions(&self, tag: &str) -> &[Span] {
        match self {
            Self::Vhdl(t) => t.get_positions(tag),
            Self::Verilog(t) => t.get_positions(tag),
        }
    }
}

/// Parses a whole design file written in `lang`.
pub fn parse(lang: Lang, text: &str, allow_large_files: bool) -> ParseResult {
    match lang {
        Lang::Vhdl => ParseResult::Vhdl(vhdl::parse(text, VhdlRegion::EntityContext, allow_large_files)),
        Lang::Verilog => ParseResult::Verilog(verilog::parse(
            text,
            VerilogRegion::ModuleContext,
            allow_large_files,
        )),
    }
}

/// Parses a whole design file written in `lang`, scanning at most about
/// `limit` bytes.
pub fn parse_with_limit(lang: Lang, text: &str, limit: Option<usize>) -> ParseResult {
    match lang {
        Lang::Vhdl => ParseResult::Vhdl(vhdl::parse_with_limit(text, VhdlRegion::EntityContext, limit)),
        Lang::Verilog => ParseResult::Verilog(verilog::parse_with_limit(
            text,
            VerilogRegion::ModuleContext,
            limit,
        )),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn detect_from_extension() {
        assert_eq!(Lang::from_path(Path::new("rtl/top.vhd")), Some(Lang::Vhdl));
        assert_eq!(Lang::from_path(Path::new("TOP.VHDL")), Some(Lang::Vhdl));
        assert_eq!(Lang::from_path(Path::new("alu.sv")), Some(Lang::Verilog));
        assert_eq!(Lang::from_path(Path::new("defs.svh")), Some(Lang::Verilog));
        assert_eq!(Lang::from_path(Path::new("notes.txt")), None);
        assert_eq!(Lang::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn parse_language_names() {
        assert_eq!(Lang::from_str("VHDL").unwrap(), Lang::Vhdl);
        assert_eq!(Lang::from_str("sv").unwrap(), Lang::Verilog);
        assert!(Lang::from_str("chisel").is_err());
        assert_eq!(Lang::Verilog.to_string(), "verilog");
    }

    #[test]
    fn entity_name_answers_for_both() {
        let vhdl = parse(Lang::Vhdl, "entity Top is end;", false);
        let verilog = parse(Lang::Verilog, "module Top; endmodule", false);
        assert_eq!(vhdl.get("entity_name"), Value::Text("top"));
        assert_eq!(verilog.get("entity_name"), Value::Text("Top"));
        assert_eq!(vhdl.get_lang(), Lang::Vhdl);
        assert_eq!(verilog.get_positions("entity_name")[0], Span::new(7, 10));
    }

    #[test]
    fn checks_every_process() {
        let s = "module m(input a, input b, output reg y, output reg z);\n  always @(a) y = a & b;\n  always @* z = b;\nendmodule";
        let result = parse(Lang::Verilog, s, false);
        let reports = result.check_sensitivity();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].1.get_missing().len(), 1);
        assert!(reports[1].1.is_clean());
    }
}
