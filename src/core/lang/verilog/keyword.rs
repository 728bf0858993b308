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

/// Checks if `s` is a Verilog-2005 or common SystemVerilog reserved word.
pub fn is_keyword(s: &str) -> bool {
    matches!(
        s,
        "always"
            | "always_comb"
            | "always_ff"
            | "always_latch"
            | "and"
            | "assign"
            | "automatic"
            | "begin"
            | "bit"
            | "buf"
            | "byte"
            | "case"
            | "casex"
            | "casez"
            | "cell"
            | "config"
            | "deassign"
            | "default"
            | "defparam"
            | "disable"
            | "else"
            | "end"
            | "endcase"
            | "endconfig"
            | "endfunction"
            | "endgenerate"
            | "endmodule"
            | "endpackage"
            | "endprimitive"
            | "endspecify"
            | "endtable"
            | "endtask"
            | "enum"
            | "event"
            | "export"
            | "final"
            | "for"
            | "force"
            | "foreach"
            | "forever"
            | "fork"
            | "function"
            | "generate"
            | "genvar"
            | "if"
            | "import"
            | "initial"
            | "inout"
            | "input"
            | "int"
            | "integer"
            | "join"
            | "join_any"
            | "join_none"
            | "localparam"
            | "logic"
            | "longint"
            | "macromodule"
            | "module"
            | "nand"
            | "negedge"
            | "nor"
            | "not"
            | "or"
            | "output"
            | "package"
            | "packed"
            | "parameter"
            | "posedge"
            | "primitive"
            | "real"
            | "realtime"
            | "reg"
            | "release"
            | "repeat"
            | "return"
            | "shortint"
            | "shortreal"
            | "signed"
            | "specify"
            | "string"
            | "struct"
            | "supply0"
            | "supply1"
            | "table"
            | "task"
            | "time"
            | "tri"
            | "tri0"
            | "tri1"
            | "typedef"
            | "union"
            | "unique"
            | "unsigned"
            | "uwire"
            | "var"
            | "void"
            | "wait"
            | "wand"
            | "while"
            | "wire"
            | "wor"
            | "xnor"
            | "xor"
    )
}

/// Checks if `s` gives a port direction.
pub fn is_direction(s: &str) -> bool {
    matches!(s, "input" | "output" | "inout" | "ref")
}

/// Checks if `s` names a built-in net or variable type (or one of its qualifiers).
pub fn is_data_type(s: &str) -> bool {
    matches!(
        s,
        "wire"
            | "reg"
            | "logic"
            | "bit"
            | "byte"
            | "int"
            | "integer"
            | "longint"
            | "shortint"
            | "real"
            | "realtime"
            | "shortreal"
            | "time"
            | "string"
            | "genvar"
            | "signed"
            | "unsigned"
            | "tri"
            | "tri0"
            | "tri1"
            | "supply0"
            | "supply1"
            | "wand"
            | "wor"
            | "uwire"
            | "var"
    )
}

/// Checks if `s` opens a block that a later keyword closes.
pub fn is_block_open(s: &str) -> bool {
    matches!(s, "begin" | "fork" | "case" | "casex" | "casez")
}

pub fn is_block_close(s: &str) -> bool {
    matches!(s, "end" | "join" | "join_any" | "join_none" | "endcase")
}

/// Checks if `s` is a compiler directive whose arguments run to the end of the line.
pub fn is_line_directive(s: &str) -> bool {
    matches!(
        s,
        "`define"
            | "`undef"
            | "`timescale"
            | "`include"
            | "`ifdef"
            | "`ifndef"
            | "`elsif"
            | "`else"
            | "`endif"
            | "`default_nettype"
            | "`resetall"
            | "`celldefine"
            | "`endcelldefine"
            | "`pragma"
            | "`line"
            | "`unconnected_drive"
            | "`nounconnected_drive"
    )
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn classify_words() {
        assert!(is_keyword("always_ff"));
        assert_eq!(is_keyword("Module"), false);
        assert!(is_direction("inout"));
        assert!(is_data_type("signed"));
        assert_eq!(is_data_type("input"), false);
        assert!(is_block_open("casez"));
        assert!(is_block_close("join_none"));
        assert!(is_line_directive("`timescale"));
        assert_eq!(is_line_directive("`WIDTH"), false);
    }
}
