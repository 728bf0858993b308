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

use std::error::Error;
use std::fmt::Display;

/// A one-off error message, such as an unknown start region name.
#[derive(Debug, PartialEq)]
pub struct AnyError(pub String);

impl Error for AnyError {}

impl Display for AnyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AnyError {
    fn from(value: &str) -> Self {
        AnyError(value.to_string())
    }
}

/// Any error that a command step can pass along with `?`.
pub type Fault = Box<dyn Error>;

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::lang::verilog::VerilogRegion;
    use crate::core::lang::vhdl::VhdlRegion;
    use std::str::FromStr;

    #[test]
    fn unknown_start_regions() {
        assert_eq!(
            VhdlRegion::from_str("process_body"),
            Err(AnyError::from("unknown vhdl start region \"process_body\""))
        );
        assert_eq!(
            VerilogRegion::from_str("port_list"),
            Ok(VerilogRegion::PortList)
        );
        let fault: Fault = Box::new(AnyError::from("stop"));
        assert_eq!(fault.to_string(), "stop");
    }
}
