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
use log::{debug, warn};
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use crate::commands::helps::hdlscan;
use crate::core::config::{ColorMode, Config};
use crate::core::lang;
use crate::core::lang::highlight::highlight;
use crate::core::lang::symbols::{Query, Value};
use crate::core::lang::verilog::{self, VerilogRegion};
use crate::core::lang::vhdl::{self, VhdlRegion};
use crate::core::lang::{Lang, ParseResult};
use crate::error::{Error, Hint, LastError};
use crate::util::anyerror::Fault;

use cliproc::{cli, proc, stage::*};
use cliproc::{Arg, Cli, Command, Help};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Categories printed by the plain summary, in order.
const SUMMARY_TAGS: &[&str] = &[
    "entity_name",
    "architecture_name",
    "package_declaration_name",
    "library_names",
    "package_names",
    "include_files",
    "generics_interface_names",
    "port_interface_names",
    "signal_constant_variable_names",
    "component_names",
    "subprogram_names",
    "data_type_names",
    "instance_names",
    "instance_types",
    "label_names",
];

#[derive(Debug, PartialEq)]
pub struct Hdlscan {
    version: bool,
    json: bool,
    highlight: bool,
    check: bool,
    large: bool,
    lang: Option<Lang>,
    region: Option<String>,
    config: Option<PathBuf>,
    color: Option<ColorMode>,
    file: Option<PathBuf>,
}

impl Command for Hdlscan {
    fn interpret(cli: &mut Cli<Memory>) -> cli::Result<Self> {
        cli.help(Help::with(hdlscan::HELP))?;
        Ok(Hdlscan {
            // flags
            version: cli.check(Arg::flag("version"))?,
            json: cli.check(Arg::flag("json"))?,
            highlight: cli.check(Arg::flag("highlight"))?,
            check: cli.check(Arg::flag("check"))?,
            large: cli.check(Arg::flag("large"))?,
            // options
            lang: cli.get(Arg::option("lang").value("lang"))?,
            region: cli.get(Arg::option("region").value("name"))?,
            config: cli.get(Arg::option("config").value("path"))?,
            color: cli.get(Arg::option("color").value("when"))?,
            // positionals
            file: cli.get(Arg::positional("file"))?,
        })
    }

    fn execute(self) -> proc::Result {
        if self.version == true {
            println!("hdlscan {}", VERSION);
            return Ok(());
        }
        let file = match &self.file {
            Some(f) => f,
            None => {
                println!("{}", hdlscan::HELP);
                return Ok(());
            }
        };

        let cfg = Config::load(self.config.as_ref())?
            .allow_large_files(self.large)
            .color_mode(self.color);
        cfg.get_color_mode().apply();

        let lang = match self.lang {
            Some(l) => l,
            None => match Lang::from_path(file) {
                Some(l) => l,
                None => return Err(Error::UndetectedLanguage(file.clone(), Hint::LangFlag))?,
            },
        };
        let text = fs::read_to_string(file)
            .map_err(|e| Error::FileUnreadable(file.clone(), LastError(e.to_string())))?;
        debug!("scanning {:?} as {}", file, lang);

        let result = self.scan(lang, &text, cfg.get_size_limit())?;
        for d in result.get_diagnostics() {
            warn!("{}: {}", file.display(), d);
        }

        if self.json == true {
            let json = serde_json::to_string_pretty(&result)
                .map_err(|e| Error::JsonFailed(LastError(e.to_string())))?;
            println!("{}", json);
        } else if self.highlight == true {
            print!("{}", highlight(&text, &result));
        } else {
            print!("{}", Self::summarize(&result));
        }

        if self.check == true {
            let mismatched = Self::check_sensitivity(file, &text, &result);
            if mismatched > 0 {
                return Err(Error::SensitivityMismatch(mismatched))?;
            }
        }
        Ok(())
    }
}

impl Hdlscan {
    fn scan(&self, lang: Lang, text: &str, limit: Option<usize>) -> Result<ParseResult, Fault> {
        Ok(match (&self.region, lang) {
            (None, l) => lang::parse_with_limit(l, text, limit),
            (Some(r), Lang::Vhdl) => ParseResult::Vhdl(vhdl::parse_with_limit(
                text,
                VhdlRegion::from_str(r)?,
                limit,
            )),
            (Some(r), Lang::Verilog) => ParseResult::Verilog(verilog::parse_with_limit(
                text,
                VerilogRegion::from_str(r)?,
                limit,
            )),
        })
    }

    /// Lists every non-empty category along with the clocked signals and the
    /// generate conditions they sit under.
    fn summarize(result: &ParseResult) -> String {
        let mut out = String::new();
        for tag in SUMMARY_TAGS {
            let line = match result.get(tag) {
                Value::Text(t) => t.to_string(),
                Value::List(l) => l.join(", "),
                Value::Conditions(_) => continue,
            };
            if line.is_empty() == true {
                continue;
            }
            out.push_str(&format!("{}: {}\n", tag.blue(), line));
        }
        let signals = result.get("clocked_signals").as_list().unwrap_or(&[]);
        let conditions = result
            .get("clocked_signals_generate_conditions")
            .as_conditions()
            .unwrap_or(&[]);
        if signals.is_empty() == false {
            out.push_str(&format!("{}:\n", "clocked_signals".blue()));
        }
        for (name, conds) in signals.iter().zip(conditions) {
            match conds.is_empty() {
                true => out.push_str(&format!("    {}\n", name)),
                false => out.push_str(&format!("    {} when {}\n", name, conds.join(" and "))),
            }
        }
        out
    }

    /// Prints a warning for every sensitivity list mismatch and returns the
    /// number of processes that had one.
    fn check_sensitivity(file: &PathBuf, text: &str, result: &ParseResult) -> usize {
        let mut mismatched = 0;
        for (block, report) in result.check_sensitivity() {
            if report.is_clean() == true {
                continue;
            }
            mismatched += 1;
            let name = block.get_label().unwrap_or("process");
            for w in report.get_missing() {
                println!(
                    "{}{}: {}: {:?} is read in {} but missing from its sensitivity list",
                    file.display(),
                    w.locate().locate(text),
                    "warning".yellow(),
                    w.as_str(),
                    name
                );
            }
            for w in report.get_superfluous() {
                println!(
                    "{}{}: {}: {:?} is in the sensitivity list of {} but never read",
                    file.display(),
                    w.locate().locate(text),
                    "warning".yellow(),
                    w.as_str(),
                    name
                );
            }
        }
        mismatched
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn summary_lists_clocked_conditions() {
        colored::control::set_override(false);
        let s = "architecture rtl of top is\n  signal q : bit;\nbegin\n  g: if fast generate\n    process(clk) begin if rising_edge(clk) then q <= d; end if; end process;\n  end generate;\nend;";
        let result = lang::parse(Lang::Vhdl, s, false);
        let summary = Hdlscan::summarize(&result);
        assert_eq!(
            summary,
            "architecture_name: rtl\nsignal_constant_variable_names: q\nlabel_names: g\nclocked_signals:\n    q when fast\n"
        );
    }

    #[test]
    fn scan_from_named_region() {
        let cmd = Hdlscan {
            version: false,
            json: false,
            highlight: false,
            check: false,
            large: false,
            lang: None,
            region: Some("port_list".to_string()),
            config: None,
            color: None,
            file: None,
        };
        let result = cmd.scan(Lang::Verilog, "input a, output b", None).unwrap();
        assert_eq!(
            result.get("port_interface_direction").as_list().unwrap(),
            &["input".to_string(), "output".to_string()]
        );
        let result = cmd.scan(Lang::Vhdl, "a : in bit; b : out bit", None).unwrap();
        assert_eq!(result.get("port_interface_names").as_list().unwrap().len(), 2);
        let cmd = Hdlscan {
            region: Some("nowhere".to_string()),
            ..cmd
        };
        assert!(cmd.scan(Lang::Vhdl, "", None).is_err());
    }
}
