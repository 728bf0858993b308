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

/// Checks if `s` is a reserved word (VHDL-2008/2019 LRM). Expects lower case.
pub fn is_keyword(s: &str) -> bool {
    matches!(
        s,
        "abs"
            | "access"
            | "after"
            | "alias"
            | "all"
            | "and"
            | "architecture"
            | "array"
            | "assert"
            | "assume"
            | "attribute"
            | "begin"
            | "block"
            | "body"
            | "buffer"
            | "bus"
            | "case"
            | "component"
            | "configuration"
            | "constant"
            | "context"
            | "cover"
            | "default"
            | "disconnect"
            | "downto"
            | "else"
            | "elsif"
            | "end"
            | "entity"
            | "exit"
            | "fairness"
            | "file"
            | "for"
            | "force"
            | "function"
            | "generate"
            | "generic"
            | "group"
            | "guarded"
            | "if"
            | "impure"
            | "in"
            | "inertial"
            | "inout"
            | "is"
            | "label"
            | "library"
            | "linkage"
            | "literal"
            | "loop"
            | "map"
            | "mod"
            | "nand"
            | "new"
            | "next"
            | "nor"
            | "not"
            | "null"
            | "of"
            | "on"
            | "open"
            | "or"
            | "others"
            | "out"
            | "package"
            | "parameter"
            | "port"
            | "postponed"
            | "private"
            | "procedure"
            | "process"
            | "property"
            | "protected"
            | "pure"
            | "range"
            | "record"
            | "register"
            | "reject"
            | "release"
            | "rem"
            | "report"
            | "restrict"
            | "return"
            | "rol"
            | "ror"
            | "select"
            | "sequence"
            | "severity"
            | "shared"
            | "signal"
            | "sla"
            | "sll"
            | "sra"
            | "srl"
            | "strong"
            | "subtype"
            | "then"
            | "to"
            | "transport"
            | "type"
            | "unaffected"
            | "units"
            | "until"
            | "use"
            | "variable"
            | "view"
            | "vmode"
            | "vprop"
            | "vunit"
            | "wait"
            | "when"
            | "while"
            | "with"
            | "xnor"
            | "xor"
    )
}

/// Checks if `s` names an interface mode.
pub fn is_mode(s: &str) -> bool {
    matches!(s, "in" | "out" | "inout" | "buffer" | "linkage")
}

/// Checks if `s` may follow `end` without closing a design unit or subprogram.
pub fn is_compound_end(s: &str) -> bool {
    matches!(
        s,
        "if" | "loop"
            | "case"
            | "record"
            | "units"
            | "protected"
            | "block"
            | "process"
            | "generate"
            | "component"
            | "for"
    )
}

/// Checks if `s` is a function that marks an edge-triggered process.
pub fn is_edge_function(s: &str) -> bool {
    matches!(s, "rising_edge" | "falling_edge")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reserved_words() {
        assert!(is_keyword("entity"));
        assert!(is_keyword("downto"));
        assert_eq!(is_keyword("std_logic"), false);
        assert_eq!(is_keyword("Entity"), false);
        assert!(is_mode("buffer"));
        assert!(is_compound_end("generate"));
        assert_eq!(is_compound_end("function"), false);
    }
}
