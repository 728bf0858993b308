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

pub mod keyword;
pub mod parser;
pub mod region;
pub mod table;

pub use region::VerilogRegion;
pub use table::VerilogTable;

use super::lexer::{Delimiter, Tokenizer, DEFAULT_SIZE_LIMIT};
use super::symbols::Diagnostic;
use parser::VerilogParser;

/// Word separators for Verilog and SystemVerilog, longest operators first.
pub const PATTERNS: &[Delimiter] = &[
    Delimiter::Literal("//"),
    Delimiter::Literal("/*"),
    Delimiter::Literal("*/"),
    Delimiter::Literal("\n"),
    Delimiter::Blank,
    Delimiter::Literal("::"),
    Delimiter::Literal("==="),
    Delimiter::Literal("!=="),
    Delimiter::Literal("=="),
    Delimiter::Literal("!="),
    Delimiter::Literal("<="),
    Delimiter::Literal(">="),
    Delimiter::Literal("<<"),
    Delimiter::Literal(">>"),
    Delimiter::Literal("&&"),
    Delimiter::Literal("||"),
    Delimiter::Literal("("),
    Delimiter::Literal(")"),
    Delimiter::Literal("["),
    Delimiter::Literal("]"),
    Delimiter::Literal("{"),
    Delimiter::Literal("}"),
    Delimiter::Literal(";"),
    Delimiter::Literal(":"),
    Delimiter::Literal(","),
    Delimiter::Literal("="),
    Delimiter::Literal("@"),
    Delimiter::Literal("#"),
    Delimiter::Literal("?"),
    Delimiter::Literal("+"),
    Delimiter::Literal("-"),
    Delimiter::Literal("*"),
    Delimiter::Literal("/"),
    Delimiter::Literal("%"),
    Delimiter::Literal("&"),
    Delimiter::Literal("|"),
    Delimiter::Literal("^"),
    Delimiter::Literal("~"),
    Delimiter::Literal("!"),
    Delimiter::Literal("<"),
    Delimiter::Literal(">"),
    Delimiter::Literal("\""),
];

/// Parses Verilog `text` starting in `region`.
///
/// Files larger than the default size limit are only scanned up to the limit
/// unless `allow_large_files` is set.
pub fn parse(text: &str, region: VerilogRegion, allow_large_files: bool) -> VerilogTable {
    let limit = match allow_large_files {
        true => None,
        false => Some(DEFAULT_SIZE_LIMIT),
    };
    parse_with_limit(text, region, limit)
}

/// Parses Verilog `text` starting in `region`, scanning at most about `limit` bytes.
pub fn parse_with_limit(text: &str, region: VerilogRegion, limit: Option<usize>) -> VerilogTable {
    let tokens = Tokenizer::new(PATTERNS)
        .limit(limit)
        .sentinel(true)
        .tokenize(text);
    let scanned = tokens.last().map(|t| t.locate().end()).unwrap_or(0);
    let mut table = VerilogParser::new(text, &tokens, region).run();
    if scanned < text.len() {
        table.diagnostics.push(Diagnostic::Truncated {
            at: scanned,
            len: text.len(),
        });
    }
    table
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::lang::symbols::{Query, Value};

    fn list<'a>(table: &'a VerilogTable, tag: &str) -> Vec<&'a str> {
        table
            .get(tag)
            .as_list()
            .unwrap_or(&[])
            .iter()
            .map(|s| s.as_str())
            .collect()
    }

    #[test]
    fn ansi_header() {
        let s = "module top #(parameter WIDTH = 8, parameter DEPTH = 4) (input wire clk, input [WIDTH-1:0] d, output reg [WIDTH-1:0] q);\nendmodule";
        let table = parse(s, VerilogRegion::ModuleContext, false);
        assert_eq!(table.get("module_name"), Value::Text("top"));
        assert_eq!(table.get("entity_name"), Value::Text("top"));
        assert_eq!(list(&table, "generics_interface_names"), vec!["WIDTH", "DEPTH"]);
        assert_eq!(list(&table, "generics_interface_init"), vec!["8", "4"]);
        assert_eq!(
            table.get("generic_definition"),
            Value::Text("parameter WIDTH = 8, parameter DEPTH = 4")
        );
        assert_eq!(list(&table, "port_interface_names"), vec!["clk", "d", "q"]);
        assert_eq!(
            list(&table, "port_interface_direction"),
            vec!["input", "input", "output"]
        );
        assert_eq!(list(&table, "port_interface_types"), vec!["wire", "", "reg"]);
        assert_eq!(
            list(&table, "port_interface_ranges"),
            vec!["", "[WIDTH-1:0]", "[WIDTH-1:0]"]
        );
        let names = table.get_positions("port_interface_names_positions");
        assert_eq!(names[2].slice(s), "q");
        assert!(table.get_ports().is_aligned());
    }

    #[test]
    fn non_ansi_ports_take_body_declarations() {
        let s = "module m(a, b, y);\n  input a, b;\n  output [3:0] y;\n  reg [3:0] y;\n  wire t;\n  localparam N = 2;\nendmodule";
        let table = parse(s, VerilogRegion::ModuleContext, false);
        assert_eq!(list(&table, "port_interface_names"), vec!["a", "b", "y"]);
        assert_eq!(
            list(&table, "port_interface_direction"),
            vec!["input", "input", "output"]
        );
        assert_eq!(list(&table, "port_interface_types"), vec!["", "", "reg"]);
        assert_eq!(list(&table, "port_interface_ranges"), vec!["", "", "[3:0]"]);
        assert_eq!(list(&table, "signal_constant_variable_names"), vec!["t", "N"]);
        assert_eq!(
            list(&table, "signal_constant_variable_kind"),
            vec!["wire", "localparam"]
        );
        assert_eq!(list(&table, "signal_constant_variable_init"), vec!["", "2"]);
        assert_eq!(table.is_readable_port("b"), true);
        assert_eq!(table.is_readable_port("y"), false);
    }

    #[test]
    fn parameter_list_flushes_at_end_of_input() {
        let s = "parameter W = 8, parameter D = W * 2";
        let table = parse(s, VerilogRegion::ParameterList, false);
        assert_eq!(list(&table, "generics_interface_names"), vec!["W", "D"]);
        assert_eq!(list(&table, "generics_interface_init"), vec!["8", "W * 2"]);
        assert_eq!(table.get("generic_definition"), Value::Text(s));
    }

    #[test]
    fn truncated_port_list_stays_aligned() {
        let s = "module m(input a, b";
        let table = parse(s, VerilogRegion::ModuleContext, false);
        assert_eq!(list(&table, "port_interface_names"), vec!["a", "b"]);
        assert_eq!(
            list(&table, "port_interface_direction"),
            vec!["input", "input"]
        );
        assert!(table.get_ports().is_aligned());
    }

    #[test]
    fn clocked_and_combinational_blocks() {
        let s = "module c(input clk, input d, input a, input b, output reg q);\n  reg r;\n  reg y;\n  always @(posedge clk) begin\n    r <= d;\n    q <= r;\n  end\n  always @(a or b)\n    y = a & b;\nendmodule";
        let table = parse(s, VerilogRegion::ModuleContext, false);
        assert_eq!(list(&table, "clocked_signals"), vec!["r", "q"]);
        let spans = table.get_positions("clocked_signals");
        assert_eq!(spans[0].slice(s), "r");
        assert_eq!(spans[1].slice(s), "q");
        let blocks = table.get_processes();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].is_clocked(), true);
        assert_eq!(blocks[1].is_clocked(), false);
        let sens: Vec<&str> = blocks[1].get_sensitivity().iter().map(|w| w.as_str()).collect();
        assert_eq!(sens, vec!["a", "b"]);
        let targets: Vec<&str> = blocks[1].targets().map(|w| w.as_str()).collect();
        assert_eq!(targets, vec!["y"]);
    }

    #[test]
    fn concatenation_targets() {
        let s = "module c(input clk, input [1:0] d, output reg hi, output reg lo);\n  reg x, y;\n  always @(posedge clk) {hi, lo} <= d;\n  always @* {x, y} = {d[0], d[1]};\nendmodule";
        let table = parse(s, VerilogRegion::ModuleContext, false);
        assert_eq!(list(&table, "clocked_signals"), vec!["hi", "lo"]);
        assert_eq!(table.get_positions("clocked_signals")[1].slice(s), "lo");
        let blocks = table.get_processes();
        assert_eq!(blocks.len(), 2);
        let targets: Vec<&str> = blocks[1].targets().map(|w| w.as_str()).collect();
        assert_eq!(targets, vec!["x", "y"]);
        let owned = String::from("port_interface_names");
        assert_eq!(table.get(&owned).as_list().map(|l| l.len()), Some(4));
    }

    #[test]
    fn if_else_inside_clocked_block() {
        let s = "module c;\n  always @(posedge clk)\n    if (rst) q <= 0;\n    else q <= d;\n  always @* z = q;\nendmodule";
        let table = parse(s, VerilogRegion::ModuleContext, false);
        assert_eq!(list(&table, "clocked_signals"), vec!["q"]);
        let blocks = table.get_processes();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].is_all(), true);
    }

    #[test]
    fn generate_conditions_are_snapshots() {
        let s = "module g;\n  generate\n    if (A) begin\n      always @(posedge clk) p <= x;\n    end\n  endgenerate\n  generate\n    if (C) begin\n      always @(posedge clk) m <= x;\n    end else if (D) begin\n      always @(posedge clk) n <= x;\n    end else begin\n      always @(posedge clk) o <= x;\n    end\n  endgenerate\n  generate\n    if (B) begin\n      always @(posedge clk) q <= y;\n    end else begin\n      always @(posedge clk) s <= y;\n    end\n    for (i = 0; i < 4; i = i + 1) begin : gen\n      always @(posedge clk) t <= y;\n    end\n    case (MODE)\n      0: begin always @(posedge clk) u <= y; end\n      default: begin always @(posedge clk) v <= y; end\n    endcase\n  endgenerate\n  always @(posedge clk) w <= y;\nendmodule";
        let table = parse(s, VerilogRegion::ModuleContext, false);
        assert_eq!(
            list(&table, "clocked_signals"),
            vec!["p", "m", "n", "o", "q", "s", "t", "u", "v", "w"]
        );
        let conds = table.get_clocked_signals();
        assert_eq!(conds.conditions_of("p"), Some(&vec!["A".to_string()]));
        assert_eq!(conds.conditions_of("m"), Some(&vec!["C".to_string()]));
        assert_eq!(conds.conditions_of("n"), Some(&vec!["!(C) && (D)".to_string()]));
        assert_eq!(conds.conditions_of("o"), Some(&vec!["!(C) && !(D)".to_string()]));
        assert_eq!(conds.conditions_of("q"), Some(&vec!["B".to_string()]));
        assert_eq!(conds.conditions_of("s"), Some(&vec!["!(B)".to_string()]));
        assert_eq!(
            conds.conditions_of("t"),
            Some(&vec!["for (i = 0; i < 4; i = i + 1)".to_string()])
        );
        assert_eq!(conds.conditions_of("u"), Some(&vec!["MODE == 0".to_string()]));
        assert_eq!(conds.conditions_of("v"), Some(&vec!["default".to_string()]));
        assert_eq!(conds.conditions_of("w"), Some(&vec![]));
        assert_eq!(list(&table, "label_names"), vec!["gen"]);
        assert!(table.get_diagnostics().is_empty());
    }

    #[test]
    fn instances_and_user_types() {
        let s = "module top;\n  wire [7:0] a, b;\n  adder #(.W(8)) u0 (.a(a), .b(b));\n  counter u1 (clk, rst);\n  dff u2 (.d(a[0])), u3 (.d(b[0]));\n  state_t state;\nendmodule";
        let table = parse(s, VerilogRegion::ModuleContext, false);
        assert_eq!(list(&table, "instance_names"), vec!["u0", "u1", "u2", "u3"]);
        assert_eq!(
            list(&table, "instance_types"),
            vec!["adder", "counter", "dff", "dff"]
        );
        assert_eq!(table.get_positions("instance_types")[1].slice(s), "counter");
        assert_eq!(table.get_positions("instance_names")[3].slice(s), "u3");
        assert_eq!(table.get_positions("instance_types")[3].slice(s), "dff");
        assert_eq!(
            list(&table, "signal_constant_variable_names"),
            vec!["a", "b", "state"]
        );
        assert_eq!(
            list(&table, "signal_constant_variable_types"),
            vec!["wire", "wire", "state_t"]
        );
        assert_eq!(
            list(&table, "signal_constant_variable_ranges"),
            vec!["[7:0]", "[7:0]", ""]
        );
    }

    #[test]
    fn imports_includes_and_comments() {
        let s = "`timescale 1ns/1ps\n`include \"defs.vh\"\n// top module\nimport pkg::*;\nmodule m import cfg::*; (input logic a); /* done */ endmodule";
        let table = parse(s, VerilogRegion::ModuleContext, false);
        assert_eq!(list(&table, "include_files"), vec!["defs.vh"]);
        assert_eq!(table.get_positions("include_files")[0].slice(s), "defs.vh");
        assert_eq!(list(&table, "package_names"), vec!["pkg", "cfg"]);
        assert_eq!(list(&table, "comment"), vec!["// top module", "/* done */"]);
        assert_eq!(list(&table, "port_interface_types"), vec!["logic"]);
        assert_eq!(table.get("module_name"), Value::Text("m"));
    }

    #[test]
    fn unknown_tags_and_repeat_parses() {
        let s = "module m(input a); always @(posedge a) r <= ~r; endmodule";
        let first = parse(s, VerilogRegion::ModuleContext, false);
        let second = parse(s, VerilogRegion::ModuleContext, false);
        assert_eq!(first, second);
        assert_eq!(first.get("architecture_name"), Value::Text(""));
        assert_eq!(first.get_positions("flip_flop_count").len(), 0);
        for span in first.get_positions("keyword_positions") {
            assert!(keyword::is_keyword(span.slice(s)));
        }
    }

    #[test]
    fn size_limit_truncates() {
        let body = "  wire w;\n".repeat(10);
        let s = format!("module m;\n{}endmodule", body);
        let table = parse_with_limit(&s, VerilogRegion::ModuleContext, Some(30));
        assert!(table.get_objects().len() < 10);
        assert!(matches!(
            table.get_diagnostics().last(),
            Some(Diagnostic::Truncated { .. })
        ));
        let table = parse_with_limit(&s, VerilogRegion::ModuleContext, None);
        assert_eq!(table.get_objects().len(), 10);
    }
}
