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

use crate::core::lang::lexer::Span;
use crate::core::lang::symbols::{
    category, ClockedSignals, Declarations, Diagnostic, Field, ProcessBlock, Query, Value,
};

/// Everything collected from one pass over a Verilog or SystemVerilog text.
#[derive(Debug, PartialEq, Clone, Default, Serialize)]
pub struct VerilogTable {
    pub(super) module_name: Field<String>,
    pub(super) ports: Declarations,
    pub(super) parameters: Declarations,
    pub(super) objects: Declarations,
    pub(super) generic_definition: String,
    pub(super) clocked: ClockedSignals,
    pub(super) instance_names: Field<String>,
    pub(super) instance_types: Field<String>,
    pub(super) label_names: Field<String>,
    pub(super) package_names: Field<String>,
    pub(super) include_files: Field<String>,
    pub(super) comments: Field<String>,
    pub(super) keywords: Vec<Span>,
    pub(super) processes: Vec<ProcessBlock>,
    pub(super) diagnostics: Vec<Diagnostic>,
}

impl VerilogTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_module_name(&self) -> &str {
        self.module_name.first()
    }

    pub fn get_ports(&self) -> &Declarations {
        &self.ports
    }

    pub fn get_parameters(&self) -> &Declarations {
        &self.parameters
    }

    /// Nets, variables and local parameters declared in the module body.
    pub fn get_objects(&self) -> &Declarations {
        &self.objects
    }

    pub fn get_clocked_signals(&self) -> &ClockedSignals {
        &self.clocked
    }

    pub fn get_processes(&self) -> &[ProcessBlock] {
        &self.processes
    }

    pub fn get_diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn is_signal(&self, name: &str) -> bool {
        self.objects.find(name).is_some()
    }

    /// Checks if `name` is a port that can be read (`input` or `inout`).
    pub fn is_readable_port(&self, name: &str) -> bool {
        match self.ports.find(name) {
            Some(i) => self.ports.modes().get(i).map(|m| m.as_str()) != Some("output"),
            None => false,
        }
    }

    pub(super) fn align(&mut self) {
        let lists = [
            ("port_interface", &mut self.ports),
            ("generics_interface", &mut self.parameters),
            ("signal_constant_variable", &mut self.objects),
        ];
        for (name, decls) in lists {
            let padded = decls.align();
            if padded > 0 {
                warn!("padded {} incomplete entries in {}", padded, name);
                self.diagnostics.push(Diagnostic::Ragged {
                    category: name.to_string(),
                    padded,
                });
            }
        }
    }

    fn declarations<'t>(&self, tag: &'t str) -> Option<(&Declarations, &'t str)> {
        let prefixes: [(&str, &Declarations); 3] = [
            ("port_interface_", &self.ports),
            ("generics_interface_", &self.parameters),
            ("signal_constant_variable_", &self.objects),
        ];
        prefixes
            .into_iter()
            .find_map(|(p, d)| tag.strip_prefix(p).map(|attr| (d, attr)))
    }
}

impl Query for VerilogTable {
    fn get(&self, tag: &str) -> Value<'_> {
        match tag {
            "entity_name" | "module_name" => Value::Text(self.module_name.first()),
            "generic_definition" => Value::Text(&self.generic_definition),
            "clocked_signals" => Value::List(self.clocked.signals().values()),
            "clocked_signals_generate_conditions" => Value::Conditions(self.clocked.conditions()),
            "instance_names" => Value::List(self.instance_names.values()),
            "instance_types" => Value::List(self.instance_types.values()),
            "label_names" => Value::List(self.label_names.values()),
            "package_names" => Value::List(self.package_names.values()),
            "include_files" => Value::List(self.include_files.values()),
            "comment" => Value::List(self.comments.values()),
            _ => match self.declarations(tag) {
                Some((decls, attr)) => decls.get(attr),
                None => Value::Text(""),
            },
        }
    }

    fn get_positions(&self, tag: &str) -> &[Span] {
        match category(tag) {
            "entity_name" | "module_name" => self.module_name.positions(),
            "clocked_signals" => self.clocked.signals().positions(),
            "instance_names" => self.instance_names.positions(),
            "instance_types" => self.instance_types.positions(),
            "label_names" => self.label_names.positions(),
            "package_names" => self.package_names.positions(),
            "include_files" => self.include_files.positions(),
            "comment" => self.comments.positions(),
            "keyword" => &self.keywords,
            c => match self.declarations(c) {
                Some((decls, attr)) => decls.get_positions(attr),
                None => &[],
            },
        }
    }
}
