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

/// Where the Verilog state machine currently is.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum VerilogRegion {
    /// Outside of any module.
    ModuleContext,
    ModuleName,
    /// Between the module name and the `;` that ends its header.
    ModuleHeader,
    /// Inside `#( ... )`.
    ParameterList,
    /// Inside the port list `( ... )` of a module header.
    PortList,
    ModuleBody,
    /// A port, net, variable or parameter declaration in the module body.
    Declaration,
    ImportClause,
    /// A statement starting with an identifier: an instance or a user-typed
    /// declaration.
    InstanceHeader,
    InstanceMap,
    /// The parenthesized header of a generate `if`, `for` or `case`.
    GenerateHeader,
    /// The choice of a generate `case` item, up to its `:`.
    GenerateChoice,
    /// After `always`, waiting for `@`.
    AlwaysHeader,
    SensitivityList,
    AlwaysBlock,
    ClockedAlwaysBlock,
    SkipStatement,
    /// Skips to a closing keyword such as `endfunction`.
    SkipBlock,
}

impl VerilogRegion {
    /// Checks if the region may be used to start a parse.
    pub fn is_entry(&self) -> bool {
        match self {
            Self::ModuleContext | Self::ModuleBody | Self::ParameterList | Self::PortList => true,
            _ => false,
        }
    }
}

impl Default for VerilogRegion {
    fn default() -> Self {
        Self::ModuleContext
    }
}

impl FromStr for VerilogRegion {
    type Err = AnyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "module_context" => Self::ModuleContext,
            "module_body" => Self::ModuleBody,
            "parameter_list" => Self::ParameterList,
            "port_list" => Self::PortList,
            _ => return Err(AnyError(format!("unknown verilog start region {:?}", s))),
        })
    }
}

impl Display for VerilogRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
