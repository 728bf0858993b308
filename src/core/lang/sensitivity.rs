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

//! Compares the sensitivity list of a combinational process against the
//! signals its body reads.

use serde_derive::Serialize;
use std::collections::HashSet;

use super::symbols::{ProcessBlock, Word};
use super::verilog::VerilogTable;
use super::vhdl::VhdlTable;

/// Answers which names in a design unit can drive a process.
pub trait Scope {
    fn is_signal(&self, name: &str) -> bool;

    fn is_readable_port(&self, name: &str) -> bool;

    fn is_driver(&self, name: &str) -> bool {
        self.is_signal(name) || self.is_readable_port(name)
    }
}

impl Scope for VhdlTable {
    fn is_signal(&self, name: &str) -> bool {
        VhdlTable::is_signal(self, name)
    }

    fn is_readable_port(&self, name: &str) -> bool {
        VhdlTable::is_readable_port(self, name)
    }
}

impl Scope for VerilogTable {
    fn is_signal(&self, name: &str) -> bool {
        VerilogTable::is_signal(self, name)
    }

    fn is_readable_port(&self, name: &str) -> bool {
        VerilogTable::is_readable_port(self, name)
    }
}

#[derive(Debug, PartialEq, Clone, Default, Serialize)]
pub struct Report {
    /// Signals read in the body that the list leaves out.
    missing: Vec<Word>,
    /// Names in the list that the body never reads.
    superfluous: Vec<Word>,
}

impl Report {
    pub fn get_missing(&self) -> &[Word] {
        &self.missing
    }

    pub fn get_superfluous(&self) -> &[Word] {
        &self.superfluous
    }

    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.superfluous.is_empty()
    }
}

/// Checks the sensitivity list of `block` against the names it reads.
///
/// Clocked blocks and blocks sensitive to everything (`all`, `*`) always
/// produce a clean report.
pub fn check<S: Scope>(scope: &S, block: &ProcessBlock) -> Report {
    if block.is_clocked() == true || block.is_all() == true {
        return Report::default();
    }
    let targets: HashSet<&str> = block.targets().map(|w| w.base_name()).collect();

    let mut seen = HashSet::new();
    let reads: Vec<Word> = block
        .get_body()
        .iter()
        .filter(|bw| bw.is_target() == false)
        .map(|bw| bw.as_word())
        .filter(|w| targets.contains(w.base_name()) == false)
        .filter(|w| scope.is_driver(w.base_name()) == true)
        .filter(|w| seen.insert(w.base_name().to_string()) == true)
        .map(|w| Word::new(w.base_name(), *w.locate()))
        .collect();

    let declared: HashSet<&str> = block
        .get_sensitivity()
        .iter()
        .map(|w| w.base_name())
        .collect();
    let read_names: HashSet<&str> = reads.iter().map(|w| w.as_str()).collect();

    Report {
        missing: reads
            .iter()
            .filter(|w| declared.contains(w.as_str()) == false)
            .cloned()
            .collect(),
        superfluous: block
            .get_sensitivity()
            .iter()
            .filter(|w| read_names.contains(w.base_name()) == false)
            .cloned()
            .collect(),
    }
}
