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

pub const HELP: &str = r#"Scan an hdl source file and report what it declares.

Usage:
    hdlscan [options] <file>

Args:
    <file>                  vhdl or verilog source file to scan

Options:
    --lang <lang>           language of the file: vhdl, verilog
    --region <name>         region to start scanning in (default: whole file)
    --json                  print the symbol table as json
    --highlight             print the source with recognized words colored
    --check                 report incomplete or superfluous sensitivity lists
    --large                 scan files larger than the size limit
    --config <path>         read settings from a toml file
    --color <when>          coloring: auto, always, never
    --version               print version information and exit
    --help, -h              print help information

Set RUST_LOG=debug to trace how the file is scanned."#;
