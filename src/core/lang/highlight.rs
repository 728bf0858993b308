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

use colored::ColoredString;
use colored::Colorize;
use palette::*;

use super::lexer::Span;
use super::symbols::Query;

pub type Rgb = (u8, u8, u8);

pub fn color(s: &str, hue: Rgb) -> ColoredString {
    s.truecolor(hue.0, hue.1, hue.2)
}

mod palette {
    use super::*;

    // reds
    pub const BURNT_ORANGE: Rgb = (204, 85, 0);
    pub const GOLDEN_ROD: Rgb = (0xDA, 0xA5, 0x20);
    pub const TOMATO: Rgb = (0xFF, 0x63, 0x47);

    // blues
    pub const DARK_CYAN: Rgb = (0x00, 0x8B, 0x8B);
    pub const LT_SKY_BLUE: Rgb = (135, 206, 250);
    pub const TURQUOISE: Rgb = (0x40, 0xE0, 0xD0);

    // greens
    pub const SEAFOAM_GREEN: Rgb = (159, 226, 191);
    pub const PALM_LEAF: Rgb = (0x64, 0x97, 0x50);
    pub const NATURE_GREEN: Rgb = (0x4F, 0xAD, 0x27);
}

/* span colorings, earlier entries win when spans overlap */
pub const COLORINGS: &[(&str, Rgb)] = &[
    ("comment", PALM_LEAF),
    ("include_files", BURNT_ORANGE),
    ("entity_name", NATURE_GREEN),
    ("architecture_name", NATURE_GREEN),
    ("package_declaration_name", NATURE_GREEN),
    ("clocked_signals", TOMATO),
    ("port_interface_names", LT_SKY_BLUE),
    ("generics_interface_names", GOLDEN_ROD),
    ("signal_constant_variable_names", LT_SKY_BLUE),
    ("port_interface_types", SEAFOAM_GREEN),
    ("signal_constant_variable_types", SEAFOAM_GREEN),
    ("instance_names", TURQUOISE),
    ("instance_types", NATURE_GREEN),
    ("component_names", NATURE_GREEN),
    ("label_names", GOLDEN_ROD),
    ("keyword", DARK_CYAN),
];

/// Collects the non-overlapping spans to paint, in order of appearance.
pub fn paint_spans<Q: Query>(table: &Q) -> Vec<(Span, Rgb)> {
    let mut spans: Vec<(Span, Rgb, usize)> = COLORINGS
        .iter()
        .enumerate()
        .flat_map(|(rank, (tag, hue))| {
            table
                .get_positions(tag)
                .iter()
                .filter(|s| s.is_empty() == false)
                .map(move |s| (*s, *hue, rank))
        })
        .collect();
    spans.sort_by_key(|(s, _, rank)| (s.start(), *rank));

    let mut result: Vec<(Span, Rgb)> = Vec::with_capacity(spans.len());
    let mut cursor = 0;
    for (span, hue, _) in spans {
        if span.start() < cursor {
            continue;
        }
        cursor = span.end();
        result.push((span, hue));
    }
    result
}

/// Rebuilds `text` with every recorded span colored.
pub fn highlight<Q: Query>(text: &str, table: &Q) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for (span, hue) in paint_spans(table) {
        if span.end() > text.len() {
            break;
        }
        out.push_str(&text[cursor..span.start()]);
        out.push_str(&color(span.slice(text), hue).to_string());
        cursor = span.end();
    }
    out.push_str(&text[cursor..]);
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::lang::vhdl::{self, VhdlRegion};

    #[test]
    fn spans_do_not_overlap() {
        let s = "-- entity note\nentity e is port (a : in bit); end;";
        let table = vhdl::parse(s, VhdlRegion::EntityContext, false);
        let spans = paint_spans(&table);
        assert_eq!(spans[0], (Span::new(0, 14), PALM_LEAF));
        for pair in spans.windows(2) {
            assert!(pair[0].0.end() <= pair[1].0.start());
        }
        assert!(spans.contains(&(Span::new(22, 23), NATURE_GREEN)));
    }

    #[test]
    fn plain_text_survives() {
        colored::control::set_override(false);
        let s = "entity e is port (a : in bit); end;";
        let table = vhdl::parse(s, VhdlRegion::EntityContext, false);
        assert_eq!(highlight(s, &table), s);
    }
}
