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

use log::{debug, trace};

use super::keyword::{
    is_block_close, is_block_open, is_data_type, is_direction, is_keyword, is_line_directive,
};
use super::region::VerilogRegion;
use super::table::VerilogTable;
use crate::core::lang::lexer::{Span, Token};
use crate::core::lang::scan::{peek_significant, Capture};
use crate::core::lang::symbols::{base_name, is_name_like, Diagnostic, ProcessBlock, Role, Word};

const COMMENTS: &[(&str, &str)] = &[("//", "\n"), ("/*", "*/")];

/// What a declaration item is recorded as.
#[derive(Debug, PartialEq, Clone, Copy)]
enum ItemKind {
    /// Inside `#( ... )`.
    ParameterPort,
    /// Inside the module's port list.
    Port,
    /// `input`/`output`/`inout` in the module body.
    BodyPort,
    /// Nets and variables in the module body.
    BodyNet,
    BodyParameter,
    BodyLocalparam,
}

#[derive(Debug, PartialEq, Clone, Copy)]
enum ItemPart {
    Head,
    Range,
    Value,
}

/// A comma-separated declaration whose direction, type and range carry over
/// from one name to the next.
#[derive(Debug, PartialEq, Clone)]
struct Item {
    kind: ItemKind,
    part: ItemPart,
    depth: usize,
    direction: String,
    keyword: String,
    ty: Option<(String, Span)>,
    range: String,
    name: Option<Word>,
    scoped: bool,
}

impl Item {
    fn new(kind: ItemKind) -> Self {
        Self {
            kind,
            part: ItemPart::Head,
            depth: 0,
            direction: String::new(),
            keyword: String::new(),
            ty: None,
            range: String::new(),
            name: None,
            scoped: false,
        }
    }

    /// Forgets the attributes that carry over to the next name.
    fn restart(&mut self) {
        self.keyword.clear();
        self.ty = None;
        self.range.clear();
    }

    fn is_list(&self) -> bool {
        match self.kind {
            ItemKind::ParameterPort | ItemKind::Port => true,
            _ => false,
        }
    }
}

/// A statement that starts with an identifier.
#[derive(Debug, PartialEq, Clone)]
struct Instance {
    ty: Word,
    name: Option<Word>,
    params: bool,
    depth: usize,
    scoped: bool,
}

#[derive(Debug, PartialEq, Clone, Copy)]
enum GenerateKind {
    If,
    For,
    Case,
}

/// One level of the generate-condition stack.
#[derive(Debug, PartialEq, Clone)]
struct Frame {
    text: String,
    /// Condition that a following `else` takes on.
    else_text: String,
    /// Block depth that keeps the frame alive.
    owner: usize,
    /// Covers only the next module item (no `begin`).
    single: bool,
    /// Selector of a generate `case`.
    case: Option<String>,
    /// A `case` frame is waiting for the next item's choice.
    awaiting: bool,
}

#[derive(Debug, PartialEq, Clone, Copy)]
enum Label {
    Idle,
    /// Waiting for the `:` after `begin`/`end`; records the name when set.
    Colon(bool),
    Name(bool),
}

#[derive(Debug, PartialEq, Clone, Default)]
struct Statement {
    count: usize,
    first_index: Option<usize>,
    /// Bracket depth of a `{...}` that opens the statement.
    concat: Option<usize>,
    /// Body indices of the names listed directly inside that `{...}`.
    concat_names: Vec<usize>,
}

impl Statement {
    fn reset(&mut self) {
        self.count = 0;
        self.first_index = None;
        self.concat = None;
        self.concat_names.clear();
    }

    /// Body indices of every name on the left of an assignment.
    fn targets(&self) -> Vec<usize> {
        self.first_index
            .iter()
            .chain(self.concat_names.iter())
            .copied()
            .collect()
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
enum Mode {
    Code,
    LineComment(usize),
    BlockComment(usize),
    Str,
    Directive(usize),
}

/// Walks a Verilog token list once, filling a [VerilogTable].
pub struct VerilogParser<'a> {
    source: &'a str,
    tokens: &'a [Token<'a>],
    index: usize,
    region: VerilogRegion,
    return_region: VerilogRegion,
    resume: VerilogRegion,
    closer: &'static str,
    depth: usize,
    expr: Capture,
    item: Item,
    generic_start: Option<usize>,
    hash: bool,
    statement: Statement,
    instance: Option<Instance>,
    frames: Vec<Frame>,
    generate_base: Vec<usize>,
    block_depth: usize,
    generate_kind: GenerateKind,
    pending_else: Option<String>,
    else_prefix: Option<String>,
    label: Label,
    process: Option<ProcessBlock>,
    nest: usize,
    ternary: usize,
    header_pending: bool,
    header_depth: Option<usize>,
    table: VerilogTable,
}

impl<'a> VerilogParser<'a> {
    pub fn new(source: &'a str, tokens: &'a [Token<'a>], region: VerilogRegion) -> Self {
        let mut parser = Self {
            source,
            tokens,
            index: 0,
            region: VerilogRegion::ModuleContext,
            return_region: VerilogRegion::ModuleContext,
            resume: VerilogRegion::ModuleContext,
            closer: "",
            depth: 0,
            expr: Capture::new(),
            item: Item::new(ItemKind::Port),
            generic_start: None,
            hash: false,
            statement: Statement::default(),
            instance: None,
            frames: Vec::new(),
            generate_base: Vec::new(),
            block_depth: 0,
            generate_kind: GenerateKind::If,
            pending_else: None,
            else_prefix: None,
            label: Label::Idle,
            process: None,
            nest: 0,
            ternary: 0,
            header_pending: false,
            header_depth: None,
            table: VerilogTable::new(),
        };
        match region {
            VerilogRegion::ParameterList => {
                parser.start_item(ItemKind::ParameterPort, VerilogRegion::ModuleContext);
                parser.generic_start = Some(0);
                parser.region = VerilogRegion::ParameterList;
            }
            VerilogRegion::PortList => {
                parser.start_item(ItemKind::Port, VerilogRegion::ModuleContext);
                parser.region = VerilogRegion::PortList;
            }
            r if r.is_entry() == true => parser.region = r,
            r => debug!("{} is not a start region, using {}", r, VerilogRegion::ModuleContext),
        }
        parser
    }

    /// Consumes every token and returns the completed table.
    pub fn run(mut self) -> VerilogTable {
        let mut mode = Mode::Code;
        while self.index < self.tokens.len() {
            let t = self.tokens[self.index];
            match mode {
                Mode::LineComment(start) => {
                    if t.as_str() == "\n" {
                        self.comment(start, t.locate().start());
                        mode = Mode::Code;
                    }
                }
                Mode::BlockComment(start) => {
                    if t.as_str() == "*/" {
                        self.comment(start, t.locate().end());
                        mode = Mode::Code;
                    }
                }
                Mode::Directive(start) => {
                    if t.as_str() == "\n" || t.is_eof() == true {
                        self.directive(start, t.locate().start());
                        mode = Mode::Code;
                    }
                }
                Mode::Str => {
                    self.absorb(&t);
                    if t.as_str() == "\"" && self.is_escaped() == false {
                        mode = Mode::Code;
                    }
                }
                Mode::Code => match t.as_str() {
                    "//" => mode = Mode::LineComment(t.locate().start()),
                    "/*" => mode = Mode::BlockComment(t.locate().start()),
                    "\"" => {
                        self.absorb(&t);
                        mode = Mode::Str;
                    }
                    _ if t.is_eof() == true => self.end_of_input(&t),
                    s if is_line_directive(s) == true => mode = Mode::Directive(t.locate().start()),
                    _ => match t.is_blank() {
                        true => self.absorb(&t),
                        false => {
                            if is_keyword(t.as_str()) == true {
                                self.table.keywords.push(*t.locate());
                            }
                            if self.take_label(&t) == false {
                                trace!("{} {:?}", self.region, t.as_str());
                                self.dispatch(&t);
                            }
                        }
                    },
                },
            }
            self.index += 1;
        }
        match mode {
            Mode::LineComment(start) | Mode::BlockComment(start) => {
                self.comment(start, self.source.len())
            }
            Mode::Directive(start) => self.directive(start, self.source.len()),
            _ => (),
        }
        self.finish()
    }

    fn finish(mut self) -> VerilogTable {
        match self.region {
            VerilogRegion::ParameterList | VerilogRegion::PortList => {
                self.flush_item();
                self.end_list(self.source.len());
            }
            VerilogRegion::Declaration => self.flush_item(),
            _ => (),
        }
        if let Some(block) = self.process.take() {
            self.commit_process(block, self.source.len());
        }
        if self.frames.is_empty() == false {
            self.table.diagnostics.push(Diagnostic::UnclosedGenerate {
                depth: self.frames.len(),
            });
        }
        self.table.align();
        self.table
    }

    /// Flushes the value being accumulated when the sentinel arrives.
    fn end_of_input(&mut self, t: &Token<'a>) {
        match self.region {
            VerilogRegion::ParameterList | VerilogRegion::PortList => {
                self.flush_item();
                self.end_list(t.locate().start());
            }
            VerilogRegion::Declaration => {
                self.flush_item();
                self.region = VerilogRegion::ModuleBody;
            }
            _ => (),
        }
    }

    fn is_escaped(&self) -> bool {
        self.index > 0 && self.tokens[self.index - 1].as_str().ends_with('\\')
    }

    fn comment(&mut self, start: usize, end: usize) {
        let span = Span::new(start, end);
        self.table
            .comments
            .push(span.slice(self.source).trim_end().to_string(), span);
    }

    /// Handles a compiler directive line, recording `include` file names.
    fn directive(&mut self, start: usize, end: usize) {
        let line = Span::new(start, end).slice(self.source);
        if line.starts_with("`include") == false {
            return;
        }
        if let Some(open) = line.find('"') {
            if let Some(len) = line[open + 1..].find('"') {
                let at = start + open + 1;
                self.table
                    .include_files
                    .push(line[open + 1..open + 1 + len].to_string(), Span::new(at, at + len));
            }
        }
    }

    fn absorb(&mut self, t: &Token) {
        if self.expr.is_active() == true {
            self.expr.push(t);
        }
    }

    fn peek(&self) -> Option<Token<'a>> {
        peek_significant(self.tokens, self.index + 1, COMMENTS)
    }

    /// Arms label detection when the next token is a `:`.
    fn expect_label(&mut self, record: bool) {
        if self.peek().map(|p| p.as_str()) == Some(":") {
            self.label = Label::Colon(record);
        }
    }

    /// Consumes the `: name` that follows `begin` or `end`.
    fn take_label(&mut self, t: &Token<'a>) -> bool {
        match self.label {
            Label::Colon(record) if t.as_str() == ":" => {
                self.label = Label::Name(record);
                true
            }
            Label::Name(record) if is_name_like(t.as_str()) == true => {
                if record == true {
                    self.table
                        .label_names
                        .push(t.as_str().to_string(), *t.locate());
                }
                self.label = Label::Idle;
                true
            }
            _ => {
                self.label = Label::Idle;
                false
            }
        }
    }

    fn skip_statement(&mut self, resume: VerilogRegion) {
        self.depth = 0;
        self.resume = resume;
        self.region = VerilogRegion::SkipStatement;
    }

    fn skip_block(&mut self, closer: &'static str, resume: VerilogRegion) {
        self.closer = closer;
        self.resume = resume;
        self.region = VerilogRegion::SkipBlock;
    }

    /// Returns to the module body after a module item has ended.
    fn back_to_body(&mut self) {
        self.region = VerilogRegion::ModuleBody;
        self.statement.reset();
        self.item_done();
    }

    fn resume_at(&mut self, region: VerilogRegion) {
        match region {
            VerilogRegion::ModuleBody => self.back_to_body(),
            r => self.region = r,
        }
    }

    fn dispatch(&mut self, t: &Token<'a>) {
        let s = t.as_str();
        match self.region {
            VerilogRegion::ModuleContext => match s {
                "module" | "macromodule" => self.region = VerilogRegion::ModuleName,
                "import" => {
                    self.return_region = VerilogRegion::ModuleContext;
                    self.region = VerilogRegion::ImportClause;
                }
                "package" => self.skip_block("endpackage", VerilogRegion::ModuleContext),
                _ => (),
            },
            VerilogRegion::ModuleName => {
                if is_name_like(s) == true && is_keyword(s) == false {
                    debug!("found module {}", s);
                    self.table.module_name.push(s.to_string(), *t.locate());
                    self.hash = false;
                    self.region = VerilogRegion::ModuleHeader;
                }
            }
            VerilogRegion::ModuleHeader => match s {
                "#" => self.hash = true,
                "(" if self.hash == true => {
                    self.hash = false;
                    self.generic_start = Some(t.locate().end());
                    self.start_item(ItemKind::ParameterPort, VerilogRegion::ModuleHeader);
                    self.region = VerilogRegion::ParameterList;
                }
                "(" => {
                    self.start_item(ItemKind::Port, VerilogRegion::ModuleHeader);
                    self.region = VerilogRegion::PortList;
                }
                ";" => {
                    self.block_depth = 0;
                    self.back_to_body();
                }
                "import" => {
                    self.return_region = VerilogRegion::ModuleHeader;
                    self.region = VerilogRegion::ImportClause;
                }
                _ => (),
            },
            VerilogRegion::ParameterList | VerilogRegion::PortList | VerilogRegion::Declaration => {
                self.item_token(t)
            }
            VerilogRegion::ImportClause => match s {
                ";" => self.resume_at(self.return_region),
                _ if is_name_like(s) == true => {
                    if self.peek().map(|p| p.as_str()) == Some("::") {
                        self.table.package_names.push(s.to_string(), *t.locate());
                    }
                }
                _ => (),
            },
            VerilogRegion::ModuleBody => self.module_body(t),
            VerilogRegion::InstanceHeader => self.instance_header(t),
            VerilogRegion::InstanceMap => match s {
                "(" | "[" | "{" => self.depth += 1,
                ")" | "]" | "}" => self.depth = self.depth.saturating_sub(1),
                // `dff u0 (...), u1 (...);` names more instances of the same type
                "," if self.depth == 0 && self.instance.is_some() => {
                    self.region = VerilogRegion::InstanceHeader
                }
                ";" if self.depth == 0 => {
                    self.instance = None;
                    self.back_to_body();
                }
                _ => (),
            },
            VerilogRegion::GenerateHeader => self.generate_header(t),
            VerilogRegion::GenerateChoice => match s {
                ":" if self.depth == 0 => {
                    let choice = self.expr.take();
                    if let Some(top) = self.frames.last_mut() {
                        top.text = match &top.case {
                            Some(sel) if choice != "default" => format!("{} == {}", sel, choice),
                            _ => choice,
                        };
                        top.awaiting = false;
                    }
                    self.region = VerilogRegion::ModuleBody;
                    self.statement.reset();
                }
                "(" | "[" | "{" => {
                    self.depth += 1;
                    self.expr.push(t);
                }
                ")" | "]" | "}" => {
                    self.depth = self.depth.saturating_sub(1);
                    self.expr.push(t);
                }
                _ => self.expr.push(t),
            },
            VerilogRegion::AlwaysHeader => match s {
                "@" => {
                    self.depth = 0;
                    self.region = VerilogRegion::SensitivityList;
                }
                _ => {
                    self.enter_block(false);
                    self.always_token(t);
                }
            },
            VerilogRegion::SensitivityList => self.sensitivity(t),
            VerilogRegion::AlwaysBlock | VerilogRegion::ClockedAlwaysBlock => self.always_token(t),
            VerilogRegion::SkipStatement => match s {
                "(" | "[" | "{" => self.depth += 1,
                ")" | "]" | "}" => self.depth = self.depth.saturating_sub(1),
                ";" if self.depth == 0 => self.resume_at(self.resume),
                _ => (),
            },
            VerilogRegion::SkipBlock => {
                if s == self.closer {
                    self.resume_at(self.resume);
                }
            }
        }
    }

    fn start_item(&mut self, kind: ItemKind, return_region: VerilogRegion) {
        self.item = Item::new(kind);
        self.return_region = return_region;
        self.expr.cancel();
    }

    /// Interprets a token inside a parameter list, a port list or a body
    /// declaration.
    fn item_token(&mut self, t: &Token<'a>) {
        let s = t.as_str();
        let is_list = self.item.is_list();
        match self.item.part {
            ItemPart::Range => {
                match s {
                    "[" => self.item.depth += 1,
                    "]" => self.item.depth = self.item.depth.saturating_sub(1),
                    _ => (),
                }
                self.expr.push(t);
                if s == "]" && self.item.depth == 0 {
                    let range = self.expr.take();
                    self.item.range.push_str(&range);
                    self.item.part = ItemPart::Head;
                }
            }
            ItemPart::Value => match s {
                "(" | "[" | "{" => {
                    self.item.depth += 1;
                    self.expr.push(t);
                }
                ")" if self.item.depth == 0 && is_list == true => {
                    self.flush_item();
                    self.end_list(t.locate().start());
                }
                ")" | "]" | "}" => {
                    self.item.depth = self.item.depth.saturating_sub(1);
                    self.expr.push(t);
                }
                "," if self.item.depth == 0 => self.flush_item(),
                ";" if self.item.depth == 0 => {
                    self.flush_item();
                    if is_list == false {
                        self.back_to_body();
                    }
                }
                _ => self.expr.push(t),
            },
            ItemPart::Head => match s {
                ")" if is_list == true => {
                    self.flush_item();
                    self.end_list(t.locate().start());
                }
                ";" => {
                    self.flush_item();
                    if is_list == false {
                        self.back_to_body();
                    }
                }
                "," => self.flush_item(),
                "[" => {
                    self.expr.start();
                    self.expr.push(t);
                    self.item.depth = 1;
                    self.item.part = ItemPart::Range;
                }
                "=" => {
                    self.expr.start();
                    self.item.depth = 0;
                    self.item.part = ItemPart::Value;
                }
                "::" => self.item.scoped = true,
                "parameter" | "localparam" => self.item.restart(),
                _ if is_direction(s) == true => {
                    self.item.direction = s.to_string();
                    self.item.restart();
                }
                _ if is_data_type(s) == true => {
                    if self.item.keyword.is_empty() == true {
                        self.item.keyword = s.to_string();
                    }
                    self.item.ty = match self.item.ty.take() {
                        Some((text, span)) => Some((format!("{} {}", text, s), span.to(t.locate()))),
                        None => Some((s.to_string(), *t.locate())),
                    };
                }
                _ if is_name_like(s) == true && is_keyword(s) == false => {
                    let word = Word::new(s, *t.locate());
                    match (self.item.scoped, self.item.name.take()) {
                        // `pkg::type_t name`
                        (true, Some(pkg)) => {
                            let text = format!("{}::{}", pkg.as_str(), s);
                            self.item.ty = Some((text, pkg.locate().to(t.locate())));
                            self.item.scoped = false;
                        }
                        // the previous word was a user-defined type
                        (_, Some(prev)) => {
                            if self.item.ty.is_none() {
                                self.item.ty = Some((prev.as_str().to_string(), *prev.locate()));
                            }
                            self.item.name = Some(word);
                        }
                        (_, None) => self.item.name = Some(word),
                    }
                }
                _ => (),
            },
        }
    }

    /// Records the pending name with the item's current attributes.
    fn flush_item(&mut self) {
        let value = match self.item.part {
            ItemPart::Value => self.expr.take(),
            ItemPart::Range => {
                let range = self.expr.take();
                self.item.range.push_str(&range);
                String::new()
            }
            ItemPart::Head => String::new(),
        };
        self.expr.cancel();
        self.item.part = ItemPart::Head;
        self.item.depth = 0;
        let name = match self.item.name.take() {
            Some(n) => n,
            None => return,
        };
        let ty = self.item.ty.as_ref().map(|(s, span)| (s.as_str(), *span));
        let range = self.item.range.as_str();
        let table = &mut self.table;
        match self.item.kind {
            ItemKind::ParameterPort | ItemKind::BodyParameter => {
                table.parameters.push_name(name.as_str(), *name.locate());
                table.parameters.complete("", ty, range, &value);
            }
            ItemKind::Port => {
                table.ports.push_name(name.as_str(), *name.locate());
                table.ports.complete(&self.item.direction, ty, range, &value);
            }
            ItemKind::BodyPort => match table.ports.find(name.as_str()) {
                Some(i) => table.ports.update(i, &self.item.direction, ty, range, ""),
                None => {
                    table.ports.push_name(name.as_str(), *name.locate());
                    table.ports.complete(&self.item.direction, ty, range, "");
                }
            },
            ItemKind::BodyNet => match table.ports.find(name.as_str()) {
                Some(i) => table.ports.update(i, "", ty, range, &value),
                None => {
                    table.objects.push_name(name.as_str(), *name.locate());
                    table.objects.complete(&self.item.keyword, ty, range, &value);
                }
            },
            ItemKind::BodyLocalparam => {
                table.objects.push_name(name.as_str(), *name.locate());
                table.objects.complete("localparam", ty, range, &value);
            }
        }
    }

    /// Leaves a parameter or port list whose closing parenthesis starts at `at`.
    fn end_list(&mut self, at: usize) {
        if self.item.kind == ItemKind::ParameterPort {
            if let Some(start) = self.generic_start.take() {
                self.table.generic_definition = Span::new(start, at).slice(self.source).to_string();
            }
        }
        self.region = self.return_region;
    }

    fn module_body(&mut self, t: &Token<'a>) {
        let s = t.as_str();
        let at_start = self.statement.count == 0;
        if at_start == true
            && self.awaiting_choice() == true
            && matches!(s, "end" | "endcase" | "endgenerate" | "endmodule" | "begin") == false
        {
            self.depth = 0;
            self.expr.start();
            self.region = VerilogRegion::GenerateChoice;
            self.dispatch(t);
            return;
        }
        match s {
            ";" => {
                self.statement.reset();
                self.item_done();
                return;
            }
            "begin" => {
                self.block_depth += 1;
                self.statement.reset();
                self.expect_label(true);
                return;
            }
            "end" => {
                self.end_block();
                self.statement.reset();
                self.expect_label(false);
                return;
            }
            "endcase" => {
                if let Some(i) = self.frames.iter().rposition(|f| f.case.is_some()) {
                    self.frames.truncate(i);
                }
                self.statement.reset();
                self.item_done();
                return;
            }
            "generate" => {
                self.generate_base.push(self.frames.len());
                self.statement.reset();
                return;
            }
            "endgenerate" => {
                let base = self.generate_base.pop().unwrap_or(0);
                self.frames.truncate(base);
                self.statement.reset();
                return;
            }
            "endmodule" => {
                self.frames.clear();
                self.generate_base.clear();
                self.block_depth = 0;
                self.region = VerilogRegion::ModuleContext;
                return;
            }
            _ => (),
        }
        if at_start == false {
            self.statement.count += 1;
            return;
        }
        match s {
            "input" | "output" | "inout" => self.begin_declaration(ItemKind::BodyPort, t),
            "parameter" => self.begin_declaration(ItemKind::BodyParameter, t),
            "localparam" => self.begin_declaration(ItemKind::BodyLocalparam, t),
            _ if is_data_type(s) == true => self.begin_declaration(ItemKind::BodyNet, t),
            "import" => {
                self.return_region = VerilogRegion::ModuleBody;
                self.region = VerilogRegion::ImportClause;
            }
            "always" | "always_ff" | "always_latch" | "always_comb" | "initial" | "final" => {
                self.start_always(t)
            }
            "function" => self.skip_block("endfunction", VerilogRegion::ModuleBody),
            "task" => self.skip_block("endtask", VerilogRegion::ModuleBody),
            "if" | "for" | "case" => {
                self.generate_kind = match s {
                    "if" => GenerateKind::If,
                    "for" => GenerateKind::For,
                    _ => GenerateKind::Case,
                };
                self.depth = 0;
                self.expr.cancel();
                self.region = VerilogRegion::GenerateHeader;
            }
            "else" => {
                let text = self.pending_else.take().unwrap_or_default();
                match self.peek().map(|p| p.as_str()) {
                    Some("if") => self.else_prefix = Some(text),
                    _ => self.push_frame(text, String::new()),
                }
            }
            _ if is_name_like(s) == true && is_keyword(s) == false => {
                self.instance = Some(Instance {
                    ty: Word::new(s, *t.locate()),
                    name: None,
                    params: false,
                    depth: 0,
                    scoped: false,
                });
                self.region = VerilogRegion::InstanceHeader;
            }
            // continuous assignments, typedefs and everything else
            _ => self.skip_statement(VerilogRegion::ModuleBody),
        }
    }

    fn begin_declaration(&mut self, kind: ItemKind, t: &Token<'a>) {
        self.start_item(kind, VerilogRegion::ModuleBody);
        self.region = VerilogRegion::Declaration;
        self.item_token(t);
    }

    fn awaiting_choice(&self) -> bool {
        match self.frames.last() {
            Some(top) => top.case.is_some() && top.awaiting && top.owner == self.block_depth,
            None => false,
        }
    }

    /// Pushes a generate condition that lasts for the following `begin ... end`
    /// block, or for the next module item when no block follows.
    fn push_frame(&mut self, text: String, else_text: String) {
        let single = self.peek().map(|p| p.as_str()) != Some("begin");
        let owner = match single {
            true => self.block_depth,
            false => self.block_depth + 1,
        };
        self.frames.push(Frame {
            text,
            else_text,
            owner,
            single,
            case: None,
            awaiting: false,
        });
        debug!("generate conditions: {:?}", self.conditions());
    }

    /// Closes a `begin ... end` block in the module body.
    fn end_block(&mut self) {
        self.block_depth = self.block_depth.saturating_sub(1);
        while let Some(top) = self.frames.last() {
            if top.case.is_none() && top.single == false && top.owner > self.block_depth {
                if let Some(frame) = self.frames.pop() {
                    self.pending_else = Some(frame.else_text);
                }
            } else {
                break;
            }
        }
        self.item_done();
    }

    /// Ends the frames that only covered the module item that just finished.
    fn item_done(&mut self) {
        while let Some(top) = self.frames.last() {
            if top.single == true && top.owner >= self.block_depth {
                if let Some(frame) = self.frames.pop() {
                    self.pending_else = Some(frame.else_text);
                }
            } else {
                break;
            }
        }
        let depth = self.block_depth;
        if let Some(top) = self.frames.last_mut() {
            if top.case.is_some() && top.owner == depth {
                top.awaiting = true;
            }
        }
    }

    fn conditions(&self) -> Vec<String> {
        self.frames.iter().map(|f| f.text.clone()).collect()
    }

    fn generate_header(&mut self, t: &Token<'a>) {
        match t.as_str() {
            "(" if self.expr.is_active() == false => {
                self.depth = 1;
                self.expr.start();
            }
            "(" | "[" | "{" => {
                self.depth += 1;
                self.expr.push(t);
            }
            ")" if self.depth == 1 => {
                self.depth = 0;
                let cond = self.expr.take();
                match self.generate_kind {
                    GenerateKind::If => {
                        let (text, else_text) = match self.else_prefix.take() {
                            Some(p) => (
                                format!("{} && ({})", p, cond),
                                format!("{} && !({})", p, cond),
                            ),
                            None => (cond.clone(), format!("!({})", cond)),
                        };
                        self.push_frame(text, else_text);
                    }
                    GenerateKind::For => self.push_frame(format!("for ({})", cond), String::new()),
                    GenerateKind::Case => {
                        self.frames.push(Frame {
                            text: String::new(),
                            else_text: String::new(),
                            owner: self.block_depth,
                            single: false,
                            case: Some(cond),
                            awaiting: true,
                        });
                    }
                }
                self.region = VerilogRegion::ModuleBody;
                self.statement.reset();
            }
            ")" | "]" | "}" => {
                self.depth = self.depth.saturating_sub(1);
                self.expr.push(t);
            }
            _ => {
                if self.expr.is_active() == true {
                    self.expr.push(t);
                }
            }
        }
    }

    fn instance_header(&mut self, t: &Token<'a>) {
        let s = t.as_str();
        let mut inst = match self.instance.take() {
            Some(i) => i,
            None => return self.back_to_body(),
        };
        if inst.depth > 0 {
            match s {
                "(" => inst.depth += 1,
                ")" => inst.depth -= 1,
                _ => (),
            }
            self.instance = Some(inst);
            return;
        }
        match s {
            "#" => inst.params = true,
            "(" if inst.params == true && inst.name.is_none() => {
                inst.params = false;
                inst.depth = 1;
            }
            "(" if inst.name.is_some() => {
                if let Some(name) = inst.name.take() {
                    debug!("found instance {} of {}", name.as_str(), inst.ty.as_str());
                    self.table
                        .instance_names
                        .push(name.as_str().to_string(), *name.locate());
                    self.table
                        .instance_types
                        .push(inst.ty.as_str().to_string(), *inst.ty.locate());
                }
                self.instance = Some(inst);
                self.depth = 1;
                self.region = VerilogRegion::InstanceMap;
                return;
            }
            "::" => inst.scoped = true,
            ";" | "," | "=" | "[" if inst.name.is_some() => {
                // a declaration of a user-defined type
                self.start_item(ItemKind::BodyNet, VerilogRegion::ModuleBody);
                self.item.ty = Some((inst.ty.as_str().to_string(), *inst.ty.locate()));
                self.item.name = inst.name.take();
                self.region = VerilogRegion::Declaration;
                self.item_token(t);
                return;
            }
            ";" => return self.back_to_body(),
            _ if is_name_like(s) == true && is_keyword(s) == false => {
                if inst.scoped == true {
                    let text = format!("{}::{}", inst.ty.as_str(), s);
                    inst.ty = Word::new(&text, inst.ty.locate().to(t.locate()));
                    inst.scoped = false;
                } else if inst.name.is_none() {
                    inst.name = Some(Word::new(s, *t.locate()));
                }
            }
            _ => {
                self.skip_statement(VerilogRegion::ModuleBody);
                if s == "(" {
                    self.depth = 1;
                }
                return;
            }
        }
        self.instance = Some(inst);
    }

    fn start_always(&mut self, t: &Token<'a>) {
        let block = ProcessBlock::new(None, t.locate().start());
        match t.as_str() {
            "initial" | "final" => {
                self.process = None;
                self.enter_block(false);
            }
            "always_comb" => {
                let mut block = block;
                block.set_all();
                self.process = Some(block);
                self.enter_block(false);
            }
            "always_latch" => {
                let mut block = block;
                block.set_all();
                self.process = Some(block);
                self.region = VerilogRegion::AlwaysHeader;
            }
            _ => {
                self.process = Some(block);
                self.region = VerilogRegion::AlwaysHeader;
            }
        }
    }

    fn enter_block(&mut self, clocked: bool) {
        self.nest = 0;
        self.depth = 0;
        self.ternary = 0;
        self.header_pending = false;
        self.header_depth = None;
        self.statement.reset();
        self.region = match clocked {
            true => VerilogRegion::ClockedAlwaysBlock,
            false => VerilogRegion::AlwaysBlock,
        };
    }

    fn sensitivity(&mut self, t: &Token<'a>) {
        let s = t.as_str();
        match s {
            "(" => self.depth += 1,
            ")" => {
                self.depth = self.depth.saturating_sub(1);
                if self.depth == 0 {
                    let clocked = self.process.as_ref().map(|b| b.is_clocked()) == Some(true);
                    self.enter_block(clocked);
                }
            }
            "*" => {
                if let Some(block) = self.process.as_mut() {
                    block.set_all();
                }
                if self.depth == 0 {
                    self.enter_block(false);
                }
            }
            "posedge" | "negedge" => {
                if let Some(block) = self.process.as_mut() {
                    block.set_clocked();
                }
            }
            _ if is_name_like(s) == true && is_keyword(s) == false => {
                if let Some(block) = self.process.as_mut() {
                    block.push_sensitivity(Word::new(s, *t.locate()));
                }
                // `@clk` without parentheses
                if self.depth == 0 {
                    self.enter_block(false);
                }
            }
            _ => (),
        }
    }

    fn always_token(&mut self, t: &Token<'a>) {
        let s = t.as_str();
        match s {
            "(" | "[" | "{" => {
                if s == "(" && self.header_pending == true && self.depth == 0 {
                    self.header_pending = false;
                    self.header_depth = Some(0);
                }
                self.depth += 1;
                if s == "{" && self.statement.count == 0 {
                    self.statement.concat = Some(self.depth);
                }
                self.statement.count += 1;
            }
            ")" | "]" | "}" => {
                if s == "}" && self.statement.concat == Some(self.depth) {
                    self.statement.concat = None;
                }
                self.depth = self.depth.saturating_sub(1);
                if self.header_depth == Some(self.depth) {
                    // the condition of an if/for/while/case ends here
                    self.header_depth = None;
                    self.statement.reset();
                }
            }
            _ if self.depth > 0 => self.body_word(t),
            ";" => {
                self.statement.reset();
                self.ternary = 0;
                if self.nest == 0 {
                    self.end_of_statement(t);
                }
            }
            "begin" | "fork" => {
                self.nest += 1;
                self.statement.reset();
                self.expect_label(true);
            }
            _ if is_block_open(s) == true => {
                self.nest += 1;
                self.header_pending = true;
                self.statement.count += 1;
            }
            _ if is_block_close(s) == true => {
                self.nest = self.nest.saturating_sub(1);
                self.statement.reset();
                match self.nest {
                    0 => self.end_of_statement(t),
                    _ => self.expect_label(false),
                }
            }
            "if" | "for" | "while" | "repeat" | "foreach" => {
                self.header_pending = true;
                self.statement.count += 1;
            }
            "else" => self.statement.reset(),
            "?" => self.ternary += 1,
            ":" => match self.ternary {
                0 => self.statement.reset(),
                _ => self.ternary -= 1,
            },
            "<=" | "=" => self.assignment(s == "<="),
            "@" | "#" => (),
            _ => self.body_word(t),
        }
    }

    /// Marks the statement's first word as a target, recording it as clocked
    /// for non-blocking assignments inside an edge-triggered block.
    fn assignment(&mut self, non_blocking: bool) {
        let targets = self.statement.targets();
        if targets.is_empty() == true {
            return;
        }
        let clocked = non_blocking == true && self.region == VerilogRegion::ClockedAlwaysBlock;
        let conditions = match clocked {
            true => self.conditions(),
            false => Vec::new(),
        };
        if let Some(block) = self.process.as_mut() {
            for index in targets {
                if let Some(word) = block.mark_target(index, Role::Target) {
                    if clocked == true {
                        let base = base_name(word.as_str());
                        let start = word.locate().start();
                        self.table.clocked.record(
                            base,
                            Span::new(start, start + base.len()),
                            conditions.clone(),
                        );
                    }
                }
            }
        }
        self.statement.count += 1;
    }

    fn body_word(&mut self, t: &Token<'a>) {
        let s = t.as_str();
        if is_name_like(s) == true && is_keyword(s) == false {
            if let Some(block) = self.process.as_mut() {
                let index = block.push_body(Word::new(s, *t.locate()), Role::Read);
                if self.statement.count == 0 {
                    self.statement.first_index = Some(index);
                } else if self.statement.concat == Some(self.depth) {
                    self.statement.concat_names.push(index);
                }
            }
        }
        self.statement.count += 1;
    }

    /// Ends the block at a statement boundary unless an `else` continues it.
    fn end_of_statement(&mut self, t: &Token<'a>) {
        if self.peek().map(|p| p.as_str()) == Some("else") {
            return;
        }
        if let Some(block) = self.process.take() {
            self.commit_process(block, t.locate().end());
        }
        self.back_to_body();
    }

    fn commit_process(&mut self, mut block: ProcessBlock, end: usize) {
        block.close(end);
        debug!(
            "always block at {} is {}",
            block.locate().start(),
            match block.is_clocked() {
                true => "clocked",
                false => "combinational",
            }
        );
        self.table.processes.push(block);
    }
}
