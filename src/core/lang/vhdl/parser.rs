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

use super::keyword::{is_compound_end, is_edge_function, is_keyword, is_mode};
use super::region::VhdlRegion;
use super::table::VhdlTable;
use crate::core::lang::lexer::{Span, Token};
use crate::core::lang::scan::{peek_significant, Capture};
use crate::core::lang::symbols::{
    base_name, is_name_like, Declarations, Diagnostic, ProcessBlock, Role, Word,
};

const COMMENTS: &[(&str, &str)] = &[("--", "\n"), ("/*", "*/")];

/// Which declaration list an interface or object declaration is filed under.
#[derive(Debug, PartialEq, Clone, Copy)]
enum ListKind {
    Ports,
    Generics,
    ComponentPorts,
    ComponentGenerics,
    Parameters,
    Objects,
}

impl ListKind {
    /// The mode given to elements that do not spell one out.
    fn default_mode(&self) -> &'static str {
        match self {
            Self::Ports | Self::ComponentPorts | Self::Parameters => "in",
            Self::Generics | Self::ComponentGenerics | Self::Objects => "",
        }
    }
}

/// Progress through one `names : mode type range := init` element.
#[derive(Debug, PartialEq, Clone, Copy)]
enum Part {
    Names,
    Mode,
    Type,
    AfterType,
    /// `keyword` is set for `range a to b` constraints, which only end at the
    /// element's end instead of the closing parenthesis.
    Range { keyword: bool },
    Init,
}

#[derive(Debug, PartialEq, Clone)]
struct Element {
    part: Part,
    depth: usize,
    mode: String,
    ty: Option<(String, Span)>,
    range: String,
}

impl Element {
    fn new() -> Self {
        Self {
            part: Part::Names,
            depth: 0,
            mode: String::new(),
            ty: None,
            range: String::new(),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
enum GenerateKind {
    If,
    Elsif,
    For,
    Case,
}

/// One level of the generate-condition stack.
#[derive(Debug, PartialEq, Clone)]
struct Frame {
    /// The condition currently in effect for this level.
    text: String,
    /// Conditions of the `if`/`elsif` alternatives seen so far.
    alternatives: Vec<String>,
    /// Expression of a `case ... generate`.
    selector: Option<String>,
    /// An alternative opened with `begin` and expects its own `end;`.
    begun: bool,
}

impl Frame {
    fn new(text: String) -> Self {
        Self {
            text,
            alternatives: Vec::new(),
            selector: None,
            begun: false,
        }
    }
}

/// Look-behind state for the statement currently being read.
#[derive(Debug, PartialEq, Clone, Default)]
struct Statement {
    /// Significant tokens seen since the statement started.
    count: usize,
    /// The statement's first word.
    first: Option<Word>,
    /// Index of the first word within the current process body.
    first_index: Option<usize>,
}

impl Statement {
    fn reset(&mut self) {
        self.count = 0;
        self.first = None;
        self.first_index = None;
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
enum Mode {
    Code,
    LineComment(usize),
    BlockComment(usize),
    Str,
}

/// Walks a VHDL token list once, filling a [VhdlTable].
pub struct VhdlParser<'a> {
    source: &'a str,
    tokens: &'a [Token<'a>],
    index: usize,
    region: VhdlRegion,
    /// Where interface lists and object declarations resume.
    return_region: VhdlRegion,
    /// The declarative region that owns the current component, subprogram,
    /// type or use clause.
    home: VhdlRegion,
    /// Where `SkipStatement` resumes.
    resume: VhdlRegion,
    depth: usize,
    expr: Capture,
    list: ListKind,
    element: Element,
    object_kind: &'static str,
    generic_start: Option<usize>,
    statement: Statement,
    label: Option<Word>,
    instance: Option<Word>,
    generates: Vec<Frame>,
    generate_kind: GenerateKind,
    process: Option<ProcessBlock>,
    sensitivity_open: bool,
    type_name: Option<Word>,
    type_nest: usize,
    after_end: bool,
    after_tick: bool,
    arch_of: bool,
    units: usize,
    pending_subprogram: bool,
    table: VhdlTable,
}

impl<'a> VhdlParser<'a> {
    /// Creates a parser over `tokens` taken from the case-folded copy of `source`.
    pub fn new(source: &'a str, tokens: &'a [Token<'a>], region: VhdlRegion) -> Self {
        let mut parser = Self {
            source,
            tokens,
            index: 0,
            region: VhdlRegion::EntityContext,
            return_region: VhdlRegion::EntityContext,
            home: VhdlRegion::EntityContext,
            resume: VhdlRegion::EntityContext,
            depth: 0,
            expr: Capture::new(),
            list: ListKind::Ports,
            element: Element::new(),
            object_kind: "signal",
            generic_start: None,
            statement: Statement::default(),
            label: None,
            instance: None,
            generates: Vec::new(),
            generate_kind: GenerateKind::If,
            process: None,
            sensitivity_open: false,
            type_name: None,
            type_nest: 0,
            after_end: false,
            after_tick: false,
            arch_of: false,
            units: 0,
            pending_subprogram: false,
            table: VhdlTable::new(),
        };
        match region {
            VhdlRegion::GenericList => {
                parser.enter_list(ListKind::Generics, VhdlRegion::EntityContext);
                parser.generic_start = Some(0);
            }
            VhdlRegion::PortList => parser.enter_list(ListKind::Ports, VhdlRegion::EntityContext),
            r if r.is_entry() == true => {
                parser.region = r;
                parser.home = r;
            }
            r => {
                debug!("{} is not a start region, using {}", r, VhdlRegion::EntityContext);
            }
        }
        parser
    }

    /// Consumes every token and returns the completed table.
    pub fn run(mut self) -> VhdlTable {
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
                Mode::Str => {
                    self.absorb(&t);
                    if t.as_str() == "\"" {
                        mode = Mode::Code;
                    }
                }
                Mode::Code => match t.as_str() {
                    "--" => mode = Mode::LineComment(t.locate().start()),
                    "/*" => mode = Mode::BlockComment(t.locate().start()),
                    "\"" => {
                        self.absorb(&t);
                        if self.is_char_literal() == false {
                            mode = Mode::Str;
                        }
                    }
                    // '(' and ';' are characters, not punctuation
                    "(" | ")" | ";" | "," if self.is_char_literal() == true => self.absorb(&t),
                    _ => match t.is_blank() {
                        true => self.absorb(&t),
                        false => {
                            if is_keyword(t.as_str()) == true {
                                self.table.keywords.push(*t.locate());
                            }
                            trace!("{} {:?}", self.region, t.as_str());
                            self.dispatch(&t);
                            self.after_end = t.as_str() == "end";
                            self.after_tick = t.as_str() == "'";
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
            _ => (),
        }
        self.finish()
    }

    /// Flushes anything left open when the tokens ran out.
    fn finish(mut self) -> VhdlTable {
        if self.region == VhdlRegion::InterfaceDeclaration {
            self.close_element();
            self.close_list(self.source.len());
        } else if self.region == VhdlRegion::ObjectDeclaration {
            self.close_element();
        }
        if let Some(block) = self.process.take() {
            self.commit_process(block, self.source.len());
        }
        if self.generates.is_empty() == false {
            self.table.diagnostics.push(Diagnostic::UnclosedGenerate {
                depth: self.generates.len(),
            });
        }
        self.table.align();
        self.table
    }

    /// Checks if the delimiter at the current index sits inside a character
    /// literal such as `'"'` or `'('`.
    fn is_char_literal(&self) -> bool {
        let i = self.index;
        i >= 2
            && self.tokens[i - 2].as_str() == "'"
            && self.tokens[i - 1].is_empty() == true
            && self.tokens.get(i + 1).map(|t| t.is_empty()) == Some(true)
            && self.tokens.get(i + 2).map(|t| t.as_str()) == Some("'")
    }

    fn comment(&mut self, start: usize, end: usize) {
        let span = Span::new(start, end);
        self.table
            .comments
            .push(span.slice(self.source).trim_end().to_string(), span);
    }

    /// Feeds white space and string contents to the active capture.
    fn absorb(&mut self, t: &Token) {
        if self.expr.is_active() == true {
            self.expr.push(t);
        }
    }

    fn peek(&self) -> Option<Token<'a>> {
        peek_significant(self.tokens, self.index + 1, COMMENTS)
    }

    fn skip_statement(&mut self, resume: VhdlRegion) {
        self.depth = 0;
        self.resume = resume;
        self.region = VhdlRegion::SkipStatement;
    }

    fn dispatch(&mut self, t: &Token<'a>) {
        match self.region {
            VhdlRegion::EntityContext => self.entity_context(t),
            VhdlRegion::LibraryClause => match t.as_str() {
                ";" => self.region = VhdlRegion::EntityContext,
                s if is_name_like(s) == true => {
                    self.table.library_names.push(s.to_string(), *t.locate())
                }
                _ => (),
            },
            VhdlRegion::UseClause => self.use_clause(t),
            VhdlRegion::ConfigurationDeclaration => {
                // nested `for ... end for;` blocks close with `end for`
                if t.as_str() == "end" && self.peek().map(|p| p.as_str()) != Some("for") {
                    self.skip_statement(VhdlRegion::EntityContext);
                }
            }
            VhdlRegion::EntityName => {
                if is_name_like(t.as_str()) == true {
                    self.table
                        .entity_name
                        .push(t.as_str().to_string(), *t.locate());
                    debug!("found entity {}", t.as_str());
                    self.region = VhdlRegion::EntityHeader;
                    self.home = VhdlRegion::EntityHeader;
                }
            }
            VhdlRegion::EntityHeader => match t.as_str() {
                "generic" => self.expect_list(ListKind::Generics),
                "port" => self.expect_list(ListKind::Ports),
                "begin" => self.region = VhdlRegion::EntityStatements,
                "end" => self.skip_statement(VhdlRegion::EntityContext),
                _ => self.declarative_item(t),
            },
            VhdlRegion::EntityStatements => {
                if t.as_str() == "end" {
                    self.skip_statement(VhdlRegion::EntityContext);
                }
            }
            VhdlRegion::InterfaceListOpen => match t.as_str() {
                "(" => {
                    if self.list == ListKind::Generics {
                        self.generic_start = Some(t.locate().end());
                    }
                    self.enter_list(self.list, self.return_region);
                }
                ";" => self.region = self.return_region,
                _ => (),
            },
            VhdlRegion::InterfaceDeclaration | VhdlRegion::ObjectDeclaration => {
                self.element_token(t)
            }
            VhdlRegion::TypeDeclaration => self.type_declaration(t),
            VhdlRegion::ArchitectureName => self.architecture_name(t),
            VhdlRegion::ArchitectureHeader => {
                if t.as_str() == "is" {
                    self.region = VhdlRegion::ArchitectureDeclarations;
                    self.home = VhdlRegion::ArchitectureDeclarations;
                }
            }
            VhdlRegion::ArchitectureDeclarations => match t.as_str() {
                "begin" => {
                    self.region = VhdlRegion::ArchitectureBody;
                    self.statement.reset();
                }
                _ => self.declarative_item(t),
            },
            VhdlRegion::ArchitectureBody => self.architecture_body(t),
            VhdlRegion::ComponentName => {
                if is_name_like(t.as_str()) == true {
                    self.table
                        .component_names
                        .push(t.as_str().to_string(), *t.locate());
                    self.region = VhdlRegion::ComponentHeader;
                }
            }
            VhdlRegion::ComponentHeader => match t.as_str() {
                "generic" => self.expect_list(ListKind::ComponentGenerics),
                "port" => self.expect_list(ListKind::ComponentPorts),
                "end" => self.skip_statement(self.home),
                _ => (),
            },
            VhdlRegion::SubprogramName => {
                if is_name_like(t.as_str()) == true {
                    self.table
                        .subprogram_names
                        .push(t.as_str().to_string(), *t.locate());
                    self.region = VhdlRegion::SubprogramHeader;
                }
            }
            VhdlRegion::SubprogramHeader => self.subprogram_header(t),
            VhdlRegion::SubprogramBody => self.subprogram_body(t),
            VhdlRegion::PackageName => self.package_name(t),
            VhdlRegion::PackageBodyName => {
                if t.as_str() == "is" {
                    self.region = VhdlRegion::PackageBody;
                    self.home = VhdlRegion::PackageBody;
                }
            }
            VhdlRegion::PackageDeclarations | VhdlRegion::PackageBody => match t.as_str() {
                "end" => self.skip_statement(VhdlRegion::EntityContext),
                _ => self.declarative_item(t),
            },
            VhdlRegion::ProcessSensitivity => self.process_sensitivity(t),
            VhdlRegion::ProcessDeclarations => match t.as_str() {
                "begin" => {
                    self.region = VhdlRegion::ProcessBody;
                    self.depth = 0;
                    self.statement.reset();
                }
                _ => self.declarative_item(t),
            },
            VhdlRegion::ProcessBody => self.process_body(t),
            VhdlRegion::InstanceHeader => {
                if is_name_like(t.as_str()) == true {
                    let (library, unit) = match t.as_str().rsplit_once('.') {
                        Some((l, u)) => (l, u),
                        None => ("", t.as_str()),
                    };
                    let at = t.locate().end() - unit.len();
                    let ty = Word::new(unit, Span::new(at, t.locate().end()));
                    self.commit_instance(ty, library);
                    self.depth = 0;
                    self.region = VhdlRegion::InstanceMap;
                }
            }
            VhdlRegion::InstanceMap => match t.as_str() {
                "(" => self.depth += 1,
                ")" => self.depth = self.depth.saturating_sub(1),
                ";" if self.depth == 0 => {
                    self.region = VhdlRegion::ArchitectureBody;
                    self.statement.reset();
                }
                _ => (),
            },
            VhdlRegion::GenerateHeader => self.generate_header(t),
            VhdlRegion::GenerateChoice => {
                if t.as_str() == "=>" {
                    let choice = self.expr.take();
                    if let Some(top) = self.generates.last_mut() {
                        top.text = match &top.selector {
                            Some(sel) => format!("{} = {}", sel, choice),
                            None => choice,
                        };
                    }
                    self.region = VhdlRegion::ArchitectureBody;
                    self.statement.reset();
                } else {
                    self.expr.push(t);
                }
            }
            VhdlRegion::SkipStatement => match t.as_str() {
                "(" => self.depth += 1,
                ")" => self.depth = self.depth.saturating_sub(1),
                ";" if self.depth == 0 => {
                    self.region = self.resume;
                    self.statement.reset();
                }
                _ => (),
            },
            VhdlRegion::GenericList | VhdlRegion::PortList => (),
        }
    }

    fn entity_context(&mut self, t: &Token<'a>) {
        self.home = VhdlRegion::EntityContext;
        match t.as_str() {
            "library" => self.region = VhdlRegion::LibraryClause,
            "use" => self.region = VhdlRegion::UseClause,
            "entity" => self.region = VhdlRegion::EntityName,
            "architecture" => {
                self.arch_of = false;
                self.region = VhdlRegion::ArchitectureName;
            }
            "package" => match self.peek().map(|p| p.as_str()) {
                Some("body") => self.region = VhdlRegion::PackageBodyName,
                _ => self.region = VhdlRegion::PackageName,
            },
            "configuration" => self.region = VhdlRegion::ConfigurationDeclaration,
            "context" => self.skip_statement(VhdlRegion::EntityContext),
            _ => (),
        }
    }

    /// Records the package named by a selected name such as `lib.pkg.all`.
    fn use_clause(&mut self, t: &Token<'a>) {
        match t.as_str() {
            ";" => self.region = self.home,
            s if is_name_like(s) == true => {
                let mut parts = s.split('.');
                let first = parts.next().unwrap_or("");
                if let Some(pkg) = parts.next().filter(|p| *p != "all") {
                    let at = t.locate().start() + first.len() + 1;
                    self.table
                        .package_names
                        .push(pkg.to_string(), Span::new(at, at + pkg.len()));
                }
            }
            _ => (),
        }
    }

    fn architecture_name(&mut self, t: &Token<'a>) {
        match t.as_str() {
            "of" => self.arch_of = true,
            "is" => {
                self.region = VhdlRegion::ArchitectureDeclarations;
                self.home = VhdlRegion::ArchitectureDeclarations;
            }
            s if is_name_like(s) == true => match self.arch_of {
                false => self
                    .table
                    .architecture_name
                    .push(s.to_string(), *t.locate()),
                true => {
                    self.table
                        .entity_name_used_in_architecture
                        .push(s.to_string(), *t.locate());
                    self.region = VhdlRegion::ArchitectureHeader;
                }
            },
            _ => (),
        }
    }

    fn package_name(&mut self, t: &Token<'a>) {
        match t.as_str() {
            "is" => match self.peek().map(|p| p.as_str()) {
                Some("new") => self.skip_statement(VhdlRegion::EntityContext),
                _ => {
                    self.region = VhdlRegion::PackageDeclarations;
                    self.home = VhdlRegion::PackageDeclarations;
                }
            },
            s if is_name_like(s) == true => {
                if self.table.package_declaration_name.is_empty() == true {
                    self.table
                        .package_declaration_name
                        .push(s.to_string(), *t.locate());
                }
            }
            _ => (),
        }
    }

    /// Handles a token at the start of an item in any declarative part.
    fn declarative_item(&mut self, t: &Token<'a>) {
        let here = self.region;
        match t.as_str() {
            "signal" | "constant" | "variable" | "file" => {
                self.object_kind = match t.as_str() {
                    "signal" => "signal",
                    "constant" => "constant",
                    "variable" => "variable",
                    _ => "file",
                };
                self.list = ListKind::Objects;
                self.return_region = here;
                self.element = Element::new();
                self.expr.cancel();
                self.region = VhdlRegion::ObjectDeclaration;
            }
            "type" | "subtype" => {
                self.home = here;
                self.type_name = None;
                self.type_nest = 0;
                self.depth = 0;
                self.expr.cancel();
                self.region = VhdlRegion::TypeDeclaration;
            }
            "component" => {
                self.home = here;
                self.region = VhdlRegion::ComponentName;
            }
            "function" | "procedure" => {
                self.home = here;
                self.table.subprogram_kind.push(t.as_str().to_string());
                self.region = VhdlRegion::SubprogramName;
            }
            "use" => {
                self.home = here;
                self.region = VhdlRegion::UseClause;
            }
            "attribute" | "alias" | "disconnect" | "group" | "for" => self.skip_statement(here),
            // `shared`, `pure` and `impure` only qualify the next keyword
            _ => (),
        }
    }

    fn expect_list(&mut self, kind: ListKind) {
        self.list = kind;
        self.return_region = self.region;
        self.region = VhdlRegion::InterfaceListOpen;
    }

    fn enter_list(&mut self, kind: ListKind, return_region: VhdlRegion) {
        self.list = kind;
        self.return_region = return_region;
        self.element = Element::new();
        self.expr.cancel();
        self.region = VhdlRegion::InterfaceDeclaration;
    }

    fn declarations(&mut self) -> &mut Declarations {
        match self.list {
            ListKind::Ports => &mut self.table.ports,
            ListKind::Generics => &mut self.table.generics,
            ListKind::ComponentPorts => &mut self.table.component_ports,
            ListKind::ComponentGenerics => &mut self.table.component_generics,
            ListKind::Parameters => &mut self.table.subprogram_parameters,
            ListKind::Objects => &mut self.table.objects,
        }
    }

    /// Takes the constraint text collected so far, if any.
    fn take_range(&mut self) {
        match self.element.part {
            Part::Range { .. } => self.element.range = self.expr.take(),
            Part::AfterType if self.expr.is_active() == true => {
                self.element.range = self.expr.take()
            }
            _ => (),
        }
    }

    /// Fills in the attributes of the names gathered by the current element.
    fn close_element(&mut self) {
        let init = match self.element.part {
            Part::Init => self.expr.take(),
            _ => {
                self.take_range();
                String::new()
            }
        };
        self.expr.cancel();
        let element = std::mem::replace(&mut self.element, Element::new());
        let mode = match element.mode.is_empty() {
            true => match self.list {
                ListKind::Objects => self.object_kind,
                _ => self.list.default_mode(),
            },
            false => element.mode.as_str(),
        }
        .to_string();
        let ty = element.ty.as_ref().map(|(s, span)| (s.as_str(), *span));
        self.declarations()
            .complete(&mode, ty, &element.range, &init);
    }

    /// Leaves the interface list whose closing parenthesis starts at `end`.
    fn close_list(&mut self, end: usize) {
        if self.list == ListKind::Generics {
            if let Some(start) = self.generic_start.take() {
                let span = Span::new(start, end);
                self.table.generic_definition = span.slice(self.source).to_string();
            }
        }
        self.region = self.return_region;
    }

    /// Interprets a token inside an interface element or object declaration.
    fn element_token(&mut self, t: &Token<'a>) {
        let s = t.as_str();
        let in_list = self.region == VhdlRegion::InterfaceDeclaration;
        match self.element.part {
            Part::Names => match s {
                ":" => match in_list {
                    true => self.element.part = Part::Mode,
                    false => self.element.part = Part::Type,
                },
                ")" if in_list == true => {
                    self.close_element();
                    self.close_list(t.locate().start());
                }
                ";" => self.end_element(),
                // object classes inside parameter lists
                "signal" | "constant" | "variable" | "file" | "type" | "shared" => (),
                _ if is_name_like(s) == true => self.declarations().push_name(s, *t.locate()),
                _ => (),
            },
            Part::Mode => match is_mode(s) {
                true => {
                    self.element.mode = s.to_string();
                    self.element.part = Part::Type;
                }
                false => {
                    self.element.part = Part::Type;
                    self.element_token(t);
                }
            },
            Part::Type => match s {
                ";" | ")" | ":=" => {
                    self.element.part = Part::AfterType;
                    self.element_token(t);
                }
                _ if is_name_like(s) == true && is_keyword(s) == false => {
                    self.element.ty = Some((s.to_string(), *t.locate()));
                    self.element.part = Part::AfterType;
                }
                _ => (),
            },
            Part::AfterType => match s {
                "(" => {
                    if self.expr.is_active() == false {
                        self.expr.start();
                    }
                    self.expr.push(t);
                    self.element.depth = 1;
                    self.element.part = Part::Range { keyword: false };
                }
                "range" => {
                    self.expr.start();
                    self.expr.push(t);
                    self.element.depth = 0;
                    self.element.part = Part::Range { keyword: true };
                }
                ":=" => self.begin_init(),
                ")" if in_list == true => {
                    self.close_element();
                    self.close_list(t.locate().start());
                }
                ";" => self.end_element(),
                _ => (),
            },
            Part::Range { keyword } => match s {
                "(" => {
                    self.element.depth += 1;
                    self.expr.push(t);
                }
                ")" if self.element.depth == 0 => {
                    if in_list == true {
                        self.close_element();
                        self.close_list(t.locate().start());
                    }
                }
                ")" => {
                    self.element.depth -= 1;
                    self.expr.push(t);
                    if self.element.depth == 0 && keyword == false {
                        // a second constraint may follow, keep the capture open
                        self.element.part = Part::AfterType;
                    }
                }
                ":=" if self.element.depth == 0 => self.begin_init(),
                ";" if self.element.depth == 0 => self.end_element(),
                _ => self.expr.push(t),
            },
            Part::Init => match s {
                "(" => {
                    self.element.depth += 1;
                    self.expr.push(t);
                }
                ")" if self.element.depth == 0 => {
                    if in_list == true {
                        self.close_element();
                        self.close_list(t.locate().start());
                    }
                }
                ")" => {
                    self.element.depth -= 1;
                    self.expr.push(t);
                }
                ";" if self.element.depth == 0 => self.end_element(),
                _ => self.expr.push(t),
            },
        }
    }

    fn begin_init(&mut self) {
        self.take_range();
        self.expr.start();
        self.element.depth = 0;
        self.element.part = Part::Init;
    }

    /// Handles the `;` that ends an element; object declarations end with it.
    fn end_element(&mut self) {
        self.close_element();
        if self.region == VhdlRegion::ObjectDeclaration {
            self.region = self.return_region;
        }
    }

    fn type_declaration(&mut self, t: &Token<'a>) {
        let s = t.as_str();
        if self.type_name.is_none() {
            if is_name_like(s) == true {
                self.type_name = Some(Word::new(s, *t.locate()));
            }
            return;
        }
        match s {
            "is" if self.expr.is_active() == false => self.expr.start(),
            "(" => {
                self.depth += 1;
                self.expr.push(t);
            }
            ")" => {
                self.depth = self.depth.saturating_sub(1);
                self.expr.push(t);
            }
            "record" | "units" | "protected" => {
                match self.after_end {
                    true => self.type_nest = self.type_nest.saturating_sub(1),
                    false => self.type_nest += 1,
                }
                self.expr.push(t);
            }
            ";" if self.depth == 0 && self.type_nest == 0 => {
                let definition = self.expr.take();
                if let Some(name) = self.type_name.take() {
                    self.table
                        .data_type_names
                        .push(name.as_str().to_string(), *name.locate());
                    self.table.data_type_definitions.push(definition);
                }
                self.region = self.home;
            }
            _ => self.expr.push(t),
        }
    }

    fn subprogram_header(&mut self, t: &Token<'a>) {
        match t.as_str() {
            "(" => {
                self.enter_list(ListKind::Parameters, VhdlRegion::SubprogramHeader);
            }
            ";" => self.region = self.home,
            "is" => match self.peek().map(|p| p.as_str()) {
                Some("new") => self.skip_statement(self.home),
                _ => {
                    self.units = 1;
                    self.pending_subprogram = false;
                    self.depth = 0;
                    self.region = VhdlRegion::SubprogramBody;
                }
            },
            _ => (),
        }
    }

    /// Skips a subprogram body, counting the bodies nested inside it.
    fn subprogram_body(&mut self, t: &Token<'a>) {
        match t.as_str() {
            "function" | "procedure" if self.after_end == false => {
                self.pending_subprogram = true
            }
            "is" if self.pending_subprogram == true => {
                self.pending_subprogram = false;
                self.units += 1;
            }
            "(" => self.depth += 1,
            ")" => self.depth = self.depth.saturating_sub(1),
            ";" if self.depth == 0 => self.pending_subprogram = false,
            "end" => {
                let closes = match self.peek() {
                    Some(p) => is_compound_end(p.as_str()) == false,
                    None => true,
                };
                if closes == true {
                    self.units = self.units.saturating_sub(1);
                    if self.units == 0 {
                        self.skip_statement(self.home);
                    }
                }
            }
            _ => (),
        }
    }

    fn commit_instance(&mut self, ty: Word, library: &str) {
        if let Some(label) = self.label.take() {
            debug!("found instance {} of {}", label.as_str(), ty.as_str());
            self.table
                .instance_names
                .push(label.as_str().to_string(), *label.locate());
            self.table
                .instance_types
                .push(ty.as_str().to_string(), *ty.locate());
            self.table.instance_libraries.push(library.to_string());
        }
        self.instance = None;
    }

    fn architecture_body(&mut self, t: &Token<'a>) {
        let s = t.as_str();
        // a pending implicit instance is decided by the token that follows it
        if let Some(ty) = self.instance.take() {
            match s {
                "generic" | "port" => {
                    self.commit_instance(ty, "");
                    self.depth = 0;
                    self.region = VhdlRegion::InstanceMap;
                    return;
                }
                ";" => {
                    self.commit_instance(ty, "");
                    self.statement.reset();
                    return;
                }
                _ => (),
            }
        }
        let at_start = self.statement.count == 0;
        match s {
            ":" if self.statement.count == 1 => {
                if let Some(word) = self.statement.first.take() {
                    self.table
                        .label_names
                        .push(word.as_str().to_string(), *word.locate());
                    self.label = Some(word);
                }
                self.statement.reset();
                return;
            }
            ";" => {
                self.label = None;
                self.statement.reset();
                return;
            }
            "process" if at_start == true || self.after_postponed() == true => {
                let start = match &self.label {
                    Some(w) => w.locate().start(),
                    None => t.locate().start(),
                };
                let label = self.label.take().map(|w| w.as_str().to_string());
                self.process = Some(ProcessBlock::new(label, start));
                self.sensitivity_open = false;
                self.depth = 0;
                self.region = VhdlRegion::ProcessSensitivity;
                return;
            }
            "entity" | "component" | "configuration" if at_start == true => {
                self.region = VhdlRegion::InstanceHeader;
                return;
            }
            "if" | "for" | "case" if at_start == true => {
                self.generate_kind = match s {
                    "if" => GenerateKind::If,
                    "for" => GenerateKind::For,
                    _ => GenerateKind::Case,
                };
                self.label = None;
                self.depth = 0;
                self.expr.start();
                self.region = VhdlRegion::GenerateHeader;
                return;
            }
            "elsif" if at_start == true => {
                self.generate_kind = GenerateKind::Elsif;
                self.depth = 0;
                self.expr.start();
                self.region = VhdlRegion::GenerateHeader;
                return;
            }
            "else" if at_start == true => {
                if let Some(top) = self.generates.last_mut() {
                    top.text = format!("not ({})", top.alternatives.join(" or "));
                    top.begun = false;
                }
                self.label = None;
                return;
            }
            "when" if at_start == true => {
                if self.generates.last().map(|f| f.selector.is_some()) == Some(true) {
                    if let Some(top) = self.generates.last_mut() {
                        top.begun = false;
                    }
                    self.expr.start();
                    self.region = VhdlRegion::GenerateChoice;
                    return;
                }
            }
            "generate" if at_start == true => return,
            "signal" | "constant" | "shared" | "variable" | "file" | "type" | "subtype"
            | "component" | "function" | "procedure" | "pure" | "impure" | "attribute"
            | "alias"
                if at_start == true =>
            {
                // declarations at the top of a generate body
                self.declarative_item(t);
                return;
            }
            "begin" if at_start == true => {
                if let Some(top) = self.generates.last_mut() {
                    top.begun = true;
                }
                return;
            }
            "block" => {
                self.label = None;
                self.region = VhdlRegion::ArchitectureDeclarations;
                return;
            }
            "end" if at_start == true => {
                match self.peek().map(|p| p.as_str()) {
                    Some("generate") => {
                        self.generates.pop();
                        self.skip_statement(VhdlRegion::ArchitectureBody);
                    }
                    Some("block") => self.skip_statement(VhdlRegion::ArchitectureBody),
                    _ => match self.generates.last_mut() {
                        Some(top) if top.begun == true => {
                            top.begun = false;
                            self.skip_statement(VhdlRegion::ArchitectureBody);
                        }
                        _ => {
                            self.generates.clear();
                            self.skip_statement(VhdlRegion::EntityContext);
                        }
                    },
                }
                return;
            }
            _ => (),
        }
        // the word right after a label may name a component to instantiate
        if at_start == true
            && self.label.is_some()
            && is_name_like(s) == true
            && is_keyword(s) == false
        {
            let next = self.peek().map(|p| p.as_str());
            match next {
                Some("generic") | Some("port") | Some(";") => {
                    self.instance = Some(Word::new(s, *t.locate()));
                }
                _ => (),
            }
        }
        if self.statement.count == 0 && is_name_like(s) == true {
            self.statement.first = Some(Word::new(s, *t.locate()));
        }
        self.statement.count += 1;
    }

    fn after_postponed(&self) -> bool {
        self.statement.count == 1
            && self.statement.first.as_ref().map(|w| w.as_str()) == Some("postponed")
    }

    fn generate_header(&mut self, t: &Token<'a>) {
        match t.as_str() {
            "(" => {
                self.depth += 1;
                self.expr.push(t);
            }
            ")" => {
                self.depth = self.depth.saturating_sub(1);
                self.expr.push(t);
            }
            "generate" if self.depth == 0 => {
                let cond = self.expr.take();
                match self.generate_kind {
                    GenerateKind::If => {
                        let mut frame = Frame::new(cond.clone());
                        frame.alternatives.push(cond);
                        self.generates.push(frame);
                    }
                    GenerateKind::Elsif => match self.generates.last_mut() {
                        Some(top) => {
                            top.alternatives.push(cond.clone());
                            top.text = cond;
                            top.begun = false;
                        }
                        None => self.generates.push(Frame::new(cond)),
                    },
                    GenerateKind::For => self.generates.push(Frame::new(format!("for {}", cond))),
                    GenerateKind::Case => {
                        let mut frame = Frame::new(String::new());
                        frame.selector = Some(cond);
                        self.generates.push(frame);
                    }
                }
                debug!("generate conditions: {:?}", self.conditions());
                self.region = VhdlRegion::ArchitectureBody;
                self.statement.reset();
            }
            _ => self.expr.push(t),
        }
    }

    /// Copies the texts of the active generate conditions.
    fn conditions(&self) -> Vec<String> {
        self.generates.iter().map(|f| f.text.clone()).collect()
    }

    fn process_sensitivity(&mut self, t: &Token<'a>) {
        match t.as_str() {
            "(" if self.sensitivity_open == false => {
                self.sensitivity_open = true;
                self.depth = 0;
            }
            "(" => self.depth += 1,
            ")" if self.sensitivity_open == true && self.depth > 0 => self.depth -= 1,
            ")" if self.sensitivity_open == true => {
                self.sensitivity_open = false;
                self.region = VhdlRegion::ProcessDeclarations;
            }
            // indices and slices of a listed signal
            _ if self.depth > 0 => (),
            "all" if self.sensitivity_open == true => {
                if let Some(block) = self.process.as_mut() {
                    block.set_all();
                }
            }
            s if self.sensitivity_open == true && is_name_like(s) == true => {
                if let Some(block) = self.process.as_mut() {
                    block.push_sensitivity(Word::new(s, *t.locate()));
                }
            }
            "is" => self.region = VhdlRegion::ProcessDeclarations,
            "begin" => {
                self.region = VhdlRegion::ProcessBody;
                self.depth = 0;
                self.statement.reset();
            }
            _ if self.sensitivity_open == false => {
                self.region = VhdlRegion::ProcessDeclarations;
                self.declarative_item(t);
            }
            _ => (),
        }
    }

    fn process_body(&mut self, t: &Token<'a>) {
        let s = t.as_str();
        match s {
            "(" => self.depth += 1,
            ")" => self.depth = self.depth.saturating_sub(1),
            ";" | "then" | "else" | "begin" | "loop" | "=>" | "is" => {
                self.statement.reset();
                return;
            }
            ":" if self.statement.count == 1 => {
                self.statement.reset();
                return;
            }
            "<=" | ":=" if self.depth == 0 => {
                let role = match s {
                    "<=" => Role::Target,
                    _ => Role::VariableTarget,
                };
                if let Some(i) = self.statement.first_index {
                    if let Some(block) = self.process.as_mut() {
                        block.mark_target(i, role);
                    }
                }
                return;
            }
            "end" if self.peek().map(|p| p.as_str()) == Some("process") => {
                let end = self.peek().map(|p| p.locate().end()).unwrap_or(t.locate().end());
                if let Some(block) = self.process.take() {
                    self.commit_process(block, end);
                }
                self.skip_statement(VhdlRegion::ArchitectureBody);
                return;
            }
            "event" if self.after_tick == true => {
                if let Some(block) = self.process.as_mut() {
                    block.set_clocked();
                }
            }
            _ => (),
        }
        if is_edge_function(s) == true {
            if let Some(block) = self.process.as_mut() {
                block.set_clocked();
            }
        }
        if is_name_like(s) == true && is_keyword(s) == false && self.after_tick == false {
            if let Some(block) = self.process.as_mut() {
                let index = block.push_body(Word::new(s, *t.locate()), Role::Read);
                if self.statement.count == 0 {
                    self.statement.first_index = Some(index);
                }
            }
        }
        if self.statement.count == 0 && is_name_like(s) == true {
            self.statement.first = Some(Word::new(s, *t.locate()));
        }
        self.statement.count += 1;
    }

    /// Stores a finished process, recording its signal targets when it is
    /// clocked.
    fn commit_process(&mut self, mut block: ProcessBlock, end: usize) {
        block.close(end);
        if block.is_clocked() == true {
            let conditions = self.conditions();
            for word in block.signal_targets() {
                let base = base_name(word.as_str());
                let start = word.locate().start();
                self.table.clocked.record(
                    base,
                    Span::new(start, start + base.len()),
                    conditions.clone(),
                );
            }
        }
        debug!(
            "process {} is {}",
            block.get_label().unwrap_or("(unlabeled)"),
            match block.is_clocked() {
                true => "clocked",
                false => "combinational",
            }
        );
        self.table.processes.push(block);
    }
}
