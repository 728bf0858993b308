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

use std::fmt::Display;
use std::str::FromStr;

use crate::util::anyerror::AnyError;

/// Where the VHDL state machine currently is.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum VhdlRegion {
    /// Between design units: context clauses and unit headers.
    EntityContext,
    LibraryClause,
    UseClause,
    ConfigurationDeclaration,
    EntityName,
    /// Generic clause, port clause and declarations of an entity.
    EntityHeader,
    EntityStatements,
    /// Waiting for the `(` that opens an interface list.
    InterfaceListOpen,
    /// Shared by ports, generics, component ports/generics and subprogram
    /// parameters; `return_region` tells where to resume.
    InterfaceDeclaration,
    /// `signal`, `constant`, `variable` and `file` declarations.
    ObjectDeclaration,
    TypeDeclaration,
    ArchitectureName,
    ArchitectureHeader,
    ArchitectureDeclarations,
    ArchitectureBody,
    ComponentName,
    ComponentHeader,
    SubprogramName,
    SubprogramHeader,
    SubprogramBody,
    PackageName,
    PackageDeclarations,
    PackageBodyName,
    PackageBody,
    ProcessSensitivity,
    ProcessDeclarations,
    ProcessBody,
    InstanceHeader,
    InstanceMap,
    GenerateHeader,
    GenerateChoice,
    /// Skips to the next `;` outside of parentheses, then resumes at
    /// `return_region`.
    SkipStatement,
    /// Entry point for the contents of a generic clause given on its own.
    GenericList,
    /// Entry point for the contents of a port clause given on its own.
    PortList,
}

impl VhdlRegion {
    /// Checks if the region may be used to start a parse.
    pub fn is_entry(&self) -> bool {
        match self {
            Self::EntityContext
            | Self::ArchitectureDeclarations
            | Self::ArchitectureBody
            | Self::PackageDeclarations
            | Self::GenericList
            | Self::PortList => true,
            _ => false,
        }
    }
}

impl Default for VhdlRegion {
    fn default() -> Self {
        Self::EntityContext
    }
}

impl FromStr for VhdlRegion {
    type Err = AnyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "entity_context" => Self::EntityContext,
            "architecture_declarations" => Self::ArchitectureDeclarations,
            "architecture_body" => Self::ArchitectureBody,
            "package_declarations" => Self::PackageDeclarations,
            "generic_list" => Self::GenericList,
            "port_list" => Self::PortList,
            _ => return Err(AnyError(format!("unknown vhdl start region {:?}", s))),
        })
    }
}

impl Display for VhdlRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
