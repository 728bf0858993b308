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

pub use region::VhdlRegion;
pub use table::VhdlTable;

use super::lexer::{fold_case, Delimiter, Tokenizer, DEFAULT_SIZE_LIMIT};
use super::symbols::Diagnostic;
use parser::VhdlParser;

/// Word separators for VHDL, longest operators first so they win ties.
pub const PATTERNS: &[Delimiter] = &[
    Delimiter::Literal("--"),
    Delimiter::Literal("/*"),
    Delimiter::Literal("*/"),
    Delimiter::Literal("\n"),
    Delimiter::Blank,
    Delimiter::Literal("<="),
    Delimiter::Literal(":="),
    Delimiter::Literal("=>"),
    Delimiter::Literal(">="),
    Delimiter::Literal("/="),
    Delimiter::Literal("**"),
    Delimiter::Literal("("),
    Delimiter::Literal(")"),
    Delimiter::Literal(";"),
    Delimiter::Literal(":"),
    Delimiter::Literal(","),
    Delimiter::Literal("'"),
    Delimiter::Literal("\""),
    Delimiter::Literal("<"),
    Delimiter::Literal(">"),
    Delimiter::Literal("="),
    Delimiter::Literal("+"),
    Delimiter::Literal("-"),
    Delimiter::Literal("*"),
    Delimiter::Literal("/"),
    Delimiter::Literal("&"),
    Delimiter::Literal("|"),
    Delimiter::Literal("["),
    Delimiter::Literal("]"),
];

/// Parses VHDL `text` starting in `region`.
///
/// Files larger than the default size limit are only scanned up to the limit
/// unless `allow_large_files` is set.
pub fn parse(text: &str, region: VhdlRegion, allow_large_files: bool) -> VhdlTable {
    let limit = match allow_large_files {
        true => None,
        false => Some(DEFAULT_SIZE_LIMIT),
    };
    parse_with_limit(text, region, limit)
}

/// Parses VHDL `text` starting in `region`, scanning at most about `limit` bytes.
pub fn parse_with_limit(text: &str, region: VhdlRegion, limit: Option<usize>) -> VhdlTable {
    let folded = fold_case(text);
    let tokens = Tokenizer::new(PATTERNS).limit(limit).tokenize(&folded);
    let scanned = tokens.last().map(|t| t.locate().end()).unwrap_or(0);
    let mut table = VhdlParser::new(text, &tokens, region).run();
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
    use crate::core::lang::lexer::Span;
    use crate::core::lang::symbols::{Query, Value};

    fn list<'a>(table: &'a VhdlTable, tag: &str) -> Vec<&'a str> {
        table
            .get(tag)
            .as_list()
            .unwrap_or(&[])
            .iter()
            .map(|s| s.as_str())
            .collect()
    }

    #[test]
    fn entity_with_ports() {
        let s = "entity dummy is port (a: in std_logic; b: out std_logic_vector(7 downto 0)); end entity;";
        let table = parse(s, VhdlRegion::EntityContext, false);
        assert_eq!(table.get("entity_name"), Value::Text("dummy"));
        assert_eq!(list(&table, "port_interface_names"), vec!["a", "b"]);
        assert_eq!(list(&table, "port_interface_direction"), vec!["in", "out"]);
        assert_eq!(list(&table, "port_interface_ranges"), vec!["", "(7 downto 0)"]);
        assert_eq!(
            list(&table, "port_interface_types"),
            vec!["std_logic", "std_logic_vector"]
        );
        assert!(table.get_diagnostics().is_empty());
    }

    #[test]
    fn offsets_slice_original_text() {
        let s = "ENTITY Dummy IS\n  PORT (Clk : IN std_logic;\n        Q : OUT Bit_Vector(3 DOWNTO 0));\nEND ENTITY;";
        let table = parse(s, VhdlRegion::EntityContext, false);
        let tags = ["entity_name", "port_interface_names", "port_interface_types"];
        for tag in tags {
            let values = match table.get(tag) {
                Value::Text(t) => vec![t.to_string()],
                Value::List(l) => l.to_vec(),
                Value::Conditions(_) => vec![],
            };
            let positions = table.get_positions(tag);
            assert_eq!(values.len(), positions.len());
            for (v, p) in values.iter().zip(positions) {
                assert_eq!(&p.slice(s).to_lowercase(), v);
            }
        }
        assert_eq!(list(&table, "port_interface_ranges"), vec!["", "(3 downto 0)"]);
        for span in table.get_positions("keyword_positions") {
            assert!(crate::core::lang::vhdl::keyword::is_keyword(
                &span.slice(s).to_lowercase()
            ));
        }
    }

    #[test]
    fn truncated_port_list_stays_aligned() {
        let s = "entity e is port (a, b : in bit; c : out";
        let table = parse(s, VhdlRegion::EntityContext, false);
        let ports = table.get_ports();
        assert_eq!(list(&table, "port_interface_names"), vec!["a", "b", "c"]);
        assert!(ports.is_aligned());
        assert_eq!(ports.types().values(), &["bit", "bit", ""]);
        assert_eq!(ports.types().positions()[2], Span::empty(s.len() - 6));
        assert_eq!(list(&table, "port_interface_direction"), vec!["in", "in", "out"]);
    }

    #[test]
    fn parsing_twice_is_identical() {
        let s = "library ieee; use ieee.std_logic_1164.all;\nentity e is generic (N : natural := 4); port (clk : in std_logic); end;\narchitecture rtl of e is signal r : bit; begin process(clk) begin if rising_edge(clk) then r <= not r; end if; end process; end;";
        let first = parse(s, VhdlRegion::EntityContext, false);
        let second = parse(s, VhdlRegion::EntityContext, false);
        assert_eq!(first, second);
        assert_eq!(list(&first, "library_names"), vec!["ieee"]);
        assert_eq!(list(&first, "package_names"), vec!["std_logic_1164"]);
        assert_eq!(first.get_positions("package_names")[0].slice(s), "std_logic_1164");
    }

    #[test]
    fn nested_parentheses_stay_in_range() {
        let s = "entity e is port (a : in integer range (0) to (f(1,(2))); b : in bit); end;";
        let table = parse(s, VhdlRegion::EntityContext, false);
        assert_eq!(list(&table, "port_interface_names"), vec!["a", "b"]);
        assert_eq!(
            list(&table, "port_interface_ranges"),
            vec!["range (0) to (f(1,(2)))", ""]
        );
        let s = "package p is subtype t is integer range (0) to (f(1,(2))); end package;";
        let table = parse(s, VhdlRegion::EntityContext, false);
        assert_eq!(table.get("package_declaration_name"), Value::Text("p"));
        assert_eq!(list(&table, "data_type_names"), vec!["t"]);
        assert_eq!(
            list(&table, "data_type_definitions"),
            vec!["integer range (0) to (f(1,(2)))"]
        );
    }

    #[test]
    fn generics_keep_definition_text() {
        let s = "entity e is\n  generic (N : integer := 8; -- Width\n           INIT : bit_vector(3 downto 0) := (others => '0'));\nend;";
        let table = parse(s, VhdlRegion::EntityContext, false);
        assert_eq!(list(&table, "generics_interface_names"), vec!["n", "init"]);
        assert_eq!(
            list(&table, "generics_interface_init"),
            vec!["8", "(others => '0')"]
        );
        assert_eq!(list(&table, "generics_interface_ranges"), vec!["", "(3 downto 0)"]);
        assert_eq!(
            table.get("generic_definition"),
            Value::Text(
                "N : integer := 8; -- Width\n           INIT : bit_vector(3 downto 0) := (others => '0')"
            )
        );
        assert_eq!(list(&table, "comment"), vec!["-- Width"]);
    }

    #[test]
    fn generic_list_on_its_own() {
        let s = "N : natural := 8;\nW : positive := 2 ** N";
        let table = parse(s, VhdlRegion::GenericList, false);
        assert_eq!(list(&table, "generics_interface_names"), vec!["n", "w"]);
        assert_eq!(list(&table, "generics_interface_types"), vec!["natural", "positive"]);
        assert_eq!(list(&table, "generics_interface_init"), vec!["8", "2 ** n"]);
        assert_eq!(table.get("generic_definition"), Value::Text(s));
    }

    #[test]
    fn clocked_and_combinational_processes() {
        let s = "architecture rtl of e is\n  signal q, y : std_logic;\nbegin\n  reg: process(clk)\n  begin\n    if rising_edge(clk) then\n      q <= d;\n    end if;\n  end process;\n  comb: process(a, b)\n  begin\n    y <= a and b;\n  end process;\nend architecture;";
        let table = parse(s, VhdlRegion::EntityContext, false);
        assert_eq!(list(&table, "clocked_signals"), vec!["q"]);
        assert_eq!(table.get_positions("clocked_signals")[0].slice(s), "q");
        assert_eq!(list(&table, "label_names"), vec!["reg", "comb"]);
        let procs = table.get_processes();
        assert_eq!(procs.len(), 2);
        assert_eq!(procs[0].is_clocked(), true);
        assert_eq!(procs[1].is_clocked(), false);
        assert_eq!(procs[1].get_label(), Some("comb"));
        let sens: Vec<&str> = procs[1].get_sensitivity().iter().map(|w| w.as_str()).collect();
        assert_eq!(sens, vec!["a", "b"]);
        let targets: Vec<&str> = procs[1].targets().map(|w| w.as_str()).collect();
        assert_eq!(targets, vec!["y"]);
        assert_eq!(list(&table, "signal_constant_variable_names"), vec!["q", "y"]);
        assert_eq!(
            list(&table, "signal_constant_variable_kind"),
            vec!["signal", "signal"]
        );
    }

    #[test]
    fn indexed_names_in_sensitivity_list() {
        let s = "entity e is port (a : in bit_vector(1 downto 0); b : in bit; y : out bit); end;\narchitecture rtl of e is begin\n  process (a(0), b)\n  begin\n    y <= a(0) and b;\n  end process;\nend;";
        let table = parse(s, VhdlRegion::EntityContext, false);
        let procs = table.get_processes();
        assert_eq!(procs.len(), 1);
        let sens: Vec<&str> = procs[0].get_sensitivity().iter().map(|w| w.as_str()).collect();
        assert_eq!(sens, vec!["a", "b"]);
        assert!(crate::core::lang::sensitivity::check(&table, &procs[0]).is_clean());
    }

    #[test]
    fn variables_are_not_clocked_signals() {
        let s = "architecture rtl of e is begin\n  process(clk)\n    variable cnt : natural := 0;\n  begin\n    if rising_edge(clk) then\n      cnt := cnt + 1;\n      q <= cnt;\n    end if;\n  end process;\nend;";
        let table = parse(s, VhdlRegion::EntityContext, false);
        assert_eq!(list(&table, "clocked_signals"), vec!["q"]);
        let procs = table.get_processes();
        let targets: Vec<&str> = procs[0].targets().map(|w| w.as_str()).collect();
        assert_eq!(targets, vec!["cnt", "q"]);
        let signals: Vec<&str> = procs[0].signal_targets().map(|w| w.as_str()).collect();
        assert_eq!(signals, vec!["q"]);
    }

    #[test]
    fn character_literals_are_not_brackets() {
        let s = "architecture rtl of e is\n  signal p : character := '(';\nbegin\n  process(clk) begin\n    if rising_edge(clk) then\n      if c = '(' then\n        x <= '1';\n      end if;\n      q <= d;\n    end if;\n  end process;\n  u0: entity work.sink port map (ch => ')', d => d);\n  u1: entity work.sink port map (ch => ';', d => d);\nend;";
        let table = parse(s, VhdlRegion::EntityContext, false);
        assert_eq!(list(&table, "clocked_signals"), vec!["x", "q"]);
        assert_eq!(list(&table, "signal_constant_variable_init"), vec!["'('"]);
        assert_eq!(list(&table, "instance_names"), vec!["u0", "u1"]);
        assert_eq!(list(&table, "instance_types"), vec!["sink", "sink"]);
    }

    #[test]
    fn prefixed_tags_outlive_the_tag() {
        let table = parse("entity e is port (a : in bit); end;", VhdlRegion::EntityContext, false);
        let names = {
            let tag = format!("port_interface_{}", "names");
            table.get(&tag)
        };
        assert_eq!(names, Value::List(&["a".to_string()]));
        let spans = {
            let tag = String::from("port_interface_names_positions");
            table.get_positions(&tag)
        };
        assert_eq!(spans, &[Span::new(18, 19)]);
    }

    #[test]
    fn event_attribute_marks_clocked() {
        let s = "architecture rtl of e is begin\n  process(clk) begin\n    if clk'event and clk = '1' then\n      r.valid <= '1';\n      r.data <= d;\n    end if;\n  end process;\nend;";
        let table = parse(s, VhdlRegion::EntityContext, false);
        // record fields collapse onto the record itself
        assert_eq!(list(&table, "clocked_signals"), vec!["r"]);
        assert_eq!(table.get_positions("clocked_signals")[0].slice(s), "r");
    }

    #[test]
    fn generate_conditions_are_snapshots() {
        let s = "architecture rtl of e is begin\n  g1: if a generate\n    process(clk) begin if rising_edge(clk) then p <= x; end if; end process;\n  end generate;\n  g2: if b generate\n    process(clk) begin if rising_edge(clk) then q <= y; end if; end process;\n  end generate;\n  process(clk) begin if rising_edge(clk) then z <= x; end if; end process;\nend;";
        let table = parse(s, VhdlRegion::EntityContext, false);
        assert_eq!(list(&table, "clocked_signals"), vec!["p", "q", "z"]);
        let conds = table.get_clocked_signals();
        assert_eq!(conds.conditions_of("p"), Some(&vec!["a".to_string()]));
        assert_eq!(conds.conditions_of("q"), Some(&vec!["b".to_string()]));
        assert_eq!(conds.conditions_of("z"), Some(&vec![]));
    }

    #[test]
    fn generate_alternatives() {
        let s = "architecture rtl of e is begin\n  g: if m = 1 generate\n    process(clk) begin if rising_edge(clk) then r1 <= d; end if; end process;\n  elsif m = 2 generate\n    process(clk) begin if rising_edge(clk) then r2 <= d; end if; end process;\n  else generate\n    process(clk) begin if rising_edge(clk) then r3 <= d; end if; end process;\n  end generate;\n  l: for i in 0 to 3 generate\n    c: case sel generate\n      when 0 =>\n        process(clk) begin if rising_edge(clk) then r4 <= d; end if; end process;\n    end generate;\n  end generate;\nend;";
        let table = parse(s, VhdlRegion::EntityContext, false);
        let conds = table.get("clocked_signals_generate_conditions");
        assert_eq!(
            conds,
            Value::Conditions(&[
                vec!["m = 1".to_string()],
                vec!["m = 2".to_string()],
                vec!["not (m = 1 or m = 2)".to_string()],
                vec!["for i in 0 to 3".to_string(), "sel = 0".to_string()],
            ])
        );
        assert!(table.get_diagnostics().is_empty());
    }

    #[test]
    fn instances_and_components() {
        let s = "architecture rtl of top is\n  component adder is\n    port (a : in bit; s : out bit);\n  end component;\n  signal x, y : bit := '0';\nbegin\n  u0: adder port map (a => x, s => y);\n  u1: entity work.counter(rtl) generic map (W => 4) port map (clk => clk);\n  u2: adder;\nend architecture;";
        let table = parse(s, VhdlRegion::EntityContext, false);
        assert_eq!(table.get("architecture_name"), Value::Text("rtl"));
        assert_eq!(table.get("entity_name_used_in_architecture"), Value::Text("top"));
        assert_eq!(list(&table, "component_names"), vec!["adder"]);
        assert_eq!(list(&table, "component_port_interface_names"), vec!["a", "s"]);
        assert_eq!(
            list(&table, "component_port_interface_direction"),
            vec!["in", "out"]
        );
        assert_eq!(list(&table, "instance_names"), vec!["u0", "u1", "u2"]);
        assert_eq!(list(&table, "instance_types"), vec!["adder", "counter", "adder"]);
        assert_eq!(list(&table, "instance_libraries"), vec!["", "work", ""]);
        assert_eq!(table.get_positions("instance_types")[1].slice(s), "counter");
        assert_eq!(list(&table, "signal_constant_variable_init"), vec!["'0'", "'0'"]);
    }

    #[test]
    fn package_with_subprograms() {
        let s = "package p is\n  constant W : natural := 8;\n  type state_t is (idle, run);\n  type rec is record\n    a : bit;\n  end record;\n  function f(a : integer; signal b : in bit) return integer;\nend package;\npackage body p is\n  function f(a : integer; signal b : in bit) return integer is\n    variable v : integer := 0;\n  begin\n    if a > 0 then\n      return a;\n    end if;\n    return v;\n  end function;\nend package body;";
        let table = parse(s, VhdlRegion::EntityContext, false);
        assert_eq!(list(&table, "data_type_names"), vec!["state_t", "rec"]);
        assert_eq!(
            list(&table, "data_type_definitions"),
            vec!["(idle, run)", "record a : bit; end record"]
        );
        assert_eq!(list(&table, "subprogram_names"), vec!["f", "f"]);
        assert_eq!(list(&table, "subprogram_kind"), vec!["function", "function"]);
        assert_eq!(
            list(&table, "subprogram_parameter_names"),
            vec!["a", "b", "a", "b"]
        );
        assert_eq!(list(&table, "signal_constant_variable_names"), vec!["w"]);
        assert_eq!(
            list(&table, "signal_constant_variable_kind"),
            vec!["constant"]
        );
    }

    #[test]
    fn comments_keep_original_case() {
        let s = "-- Top Level\nentity e is /* Block\nComment */ end;";
        let table = parse(s, VhdlRegion::EntityContext, false);
        assert_eq!(list(&table, "comment"), vec!["-- Top Level", "/* Block\nComment */"]);
        assert_eq!(table.get_positions("comment_positions")[0], Span::new(0, 12));
        assert_eq!(table.get_positions("keyword_positions").len(), 3);
    }

    #[test]
    fn unknown_tags_are_empty() {
        let table = parse("entity e is end;", VhdlRegion::EntityContext, false);
        assert_eq!(table.get("flip_flop_count"), Value::Text(""));
        assert_eq!(table.get_positions("flip_flop_count").len(), 0);
        assert_eq!(table.get("architecture_name"), Value::Text(""));
    }

    #[test]
    fn size_limit_truncates() {
        let body = "  signal s : bit;\n".repeat(10);
        let s = format!("architecture a of e is\n{}begin end;", body);
        let table = parse_with_limit(&s, VhdlRegion::EntityContext, Some(40));
        assert!(table.get_objects().len() < 10);
        assert!(table.get_objects().is_aligned());
        assert!(matches!(
            table.get_diagnostics().last(),
            Some(Diagnostic::Truncated { .. })
        ));
        let table = parse_with_limit(&s, VhdlRegion::EntityContext, None);
        assert_eq!(table.get_objects().len(), 10);
    }
}
