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

/// Everything collected from one pass over a VHDL text.
///
/// Names, types and expressions are stored lower case. Comments and the
/// generic clause text keep the case of the original source.
#[derive(Debug, PartialEq, Clone, Default, Serialize)]
pub struct VhdlTable {
    pub(super) entity_name: Field<String>,
    pub(super) architecture_name: Field<String>,
    pub(super) entity_name_used_in_architecture: Field<String>,
    pub(super) package_declaration_name: Field<String>,
    pub(super) library_names: Field<String>,
    pub(super) package_names: Field<String>,
    pub(super) ports: Declarations,
    pub(super) generics: Declarations,
    pub(super) objects: Declarations,
    pub(super) generic_definition: String,
    pub(super) component_names: Field<String>,
    pub(super) component_ports: Declarations,
    pub(super) component_generics: Declarations,
    pub(super) subprogram_names: Field<String>,
    pub(super) subprogram_kind: Vec<String>,
    pub(super) subprogram_parameters: Declarations,
    pub(super) data_type_names: Field<String>,
    pub(super) data_type_definitions: Vec<String>,
    pub(super) clocked: ClockedSignals,
    pub(super) instance_names: Field<String>,
    pub(super) instance_types: Field<String>,
    pub(super) instance_libraries: Vec<String>,
    pub(super) label_names: Field<String>,
    pub(super) comments: Field<String>,
    pub(super) keywords: Vec<Span>,
    pub(super) processes: Vec<ProcessBlock>,
    pub(super) diagnostics: Vec<Diagnostic>,
}

impl VhdlTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_entity_name(&self) -> &str {
        self.entity_name.first()
    }

    pub fn get_ports(&self) -> &Declarations {
        &self.ports
    }

    pub fn get_generics(&self) -> &Declarations {
        &self.generics
    }

    /// Signals, constants, variables and files declared anywhere in the text.
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

    /// Checks if `name` is declared as a signal (or any other object).
    pub fn is_signal(&self, name: &str) -> bool {
        self.objects.find(name).is_some()
    }

    /// Checks if `name` is a port that can be read (any mode except `out`).
    pub fn is_readable_port(&self, name: &str) -> bool {
        match self.ports.find(name) {
            Some(i) => self.ports.modes().get(i).map(|m| m.as_str()) != Some("out"),
            None => false,
        }
    }

    /// Pads every declaration list so its attributes line up with its names,
    /// noting each list that needed it.
    pub(super) fn align(&mut self) {
        let lists = [
            ("port_interface", &mut self.ports),
            ("generics_interface", &mut self.generics),
            ("signal_constant_variable", &mut self.objects),
            ("component_port_interface", &mut self.component_ports),
            ("component_generics_interface", &mut self.component_generics),
            ("subprogram_parameter", &mut self.subprogram_parameters),
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
        // subprogram kinds and type definitions are pushed alongside their names
        while self.subprogram_kind.len() < self.subprogram_names.len() {
            self.subprogram_kind.push(String::new());
        }
        while self.data_type_definitions.len() < self.data_type_names.len() {
            self.data_type_definitions.push(String::new());
        }
        while self.instance_libraries.len() < self.instance_names.len() {
            self.instance_libraries.push(String::new());
        }
    }

    /// Finds the declaration list addressed by a prefixed tag.
    fn declarations<'t>(&self, tag: &'t str) -> Option<(&Declarations, &'t str)> {
        let prefixes: [(&str, &Declarations); 6] = [
            ("component_port_interface_", &self.component_ports),
            ("component_generics_interface_", &self.component_generics),
            ("port_interface_", &self.ports),
            ("generics_interface_", &self.generics),
            ("signal_constant_variable_", &self.objects),
            ("subprogram_parameter_", &self.subprogram_parameters),
        ];
        prefixes
            .into_iter()
            .find_map(|(p, d)| tag.strip_prefix(p).map(|attr| (d, attr)))
    }
}

impl Query for VhdlTable {
    fn get(&self, tag: &str) -> Value<'_> {
        match tag {
            "entity_name" => Value::Text(self.entity_name.first()),
            "architecture_name" => Value::Text(self.architecture_name.first()),
            "entity_name_used_in_architecture" => {
                Value::Text(self.entity_name_used_in_architecture.first())
            }
            "package_declaration_name" => Value::Text(self.package_declaration_name.first()),
            "generic_definition" => Value::Text(&self.generic_definition),
            "library_names" => Value::List(self.library_names.values()),
            "package_names" => Value::List(self.package_names.values()),
            "component_names" => Value::List(self.component_names.values()),
            "subprogram_names" => Value::List(self.subprogram_names.values()),
            "subprogram_kind" => Value::List(&self.subprogram_kind),
            "data_type_names" => Value::List(self.data_type_names.values()),
            "data_type_definitions" => Value::List(&self.data_type_definitions),
            "clocked_signals" => Value::List(self.clocked.signals().values()),
            "clocked_signals_generate_conditions" => Value::Conditions(self.clocked.conditions()),
            "instance_names" => Value::List(self.instance_names.values()),
            "instance_types" => Value::List(self.instance_types.values()),
            "instance_libraries" => Value::List(&self.instance_libraries),
            "label_names" => Value::List(self.label_names.values()),
            "comment" => Value::List(self.comments.values()),
            _ => match self.declarations(tag) {
                Some((decls, attr)) => decls.get(attr),
                None => Value::Text(""),
            },
        }
    }

    fn get_positions(&self, tag: &str) -> &[Span] {
        match category(tag) {
            "entity_name" => self.entity_name.positions(),
            "architecture_name" => self.architecture_name.positions(),
            "entity_name_used_in_architecture" => {
                self.entity_name_used_in_architecture.positions()
            }
            "package_declaration_name" => self.package_declaration_name.positions(),
            "library_names" => self.library_names.positions(),
            "package_names" => self.package_names.positions(),
            "component_names" => self.component_names.positions(),
            "subprogram_names" => self.subprogram_names.positions(),
            "data_type_names" => self.data_type_names.positions(),
            "clocked_signals" => self.clocked.signals().positions(),
            "instance_names" => self.instance_names.positions(),
            "instance_types" => self.instance_types.positions(),
            "label_names" => self.label_names.positions(),
            "comment" => self.comments.positions(),
            "keyword" => &self.keywords,
            c => match self.declarations(c) {
                Some((decls, attr)) => decls.get_positions(attr),
                None => &[],
            },
        }
    }
}
