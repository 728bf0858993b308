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

use super::lexer::Span;
use serde_derive::Serialize;
use std::fmt::Display;

/// A list of values with one source span per value.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Field<T> {
    values: Vec<T>,
    positions: Vec<Span>,
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            positions: Vec::new(),
        }
    }
}

impl<T> Field<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value along with the span it was found at.
    pub fn push(&mut self, value: T, span: Span) {
        self.values.push(value);
        self.positions.push(span);
    }

    /// Overwrites the entry at `index`, doing nothing if it does not exist.
    pub fn set(&mut self, index: usize, value: T, span: Span) {
        if index < self.values.len() && index < self.positions.len() {
            self.values[index] = value;
            self.positions[index] = span;
        }
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn positions(&self) -> &[Span] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Checks that every value has exactly one position.
    pub fn is_aligned(&self) -> bool {
        self.values.len() == self.positions.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&T, &Span)> {
        self.values.iter().zip(self.positions.iter())
    }
}

impl Field<String> {
    /// Checks if `name` was already recorded.
    pub fn contains(&self, name: &str) -> bool {
        self.values.iter().any(|v| v == name)
    }

    pub fn find(&self, name: &str) -> Option<usize> {
        self.values.iter().position(|v| v == name)
    }

    /// Accesses the first value, treating the field as a scalar.
    pub fn first(&self) -> &str {
        self.values.first().map(|s| s.as_str()).unwrap_or("")
    }
}

/// An interface list or a declarative list: names with their mode, type,
/// range constraint and initial value, all index-aligned with the names.
#[derive(Debug, PartialEq, Clone, Default, Serialize)]
pub struct Declarations {
    names: Field<String>,
    modes: Vec<String>,
    types: Field<String>,
    ranges: Vec<String>,
    inits: Vec<String>,
}

impl Declarations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_name(&mut self, name: &str, span: Span) {
        self.names.push(name.to_string(), span);
    }

    /// Number of names still waiting for their attributes.
    pub fn pending(&self) -> usize {
        self.names.len().saturating_sub(self.modes.len())
    }

    /// Fills in the attributes of every name that is still pending.
    ///
    /// A missing type is recorded as an empty string located at the end of the
    /// name it belongs to.
    pub fn complete(&mut self, mode: &str, ty: Option<(&str, Span)>, range: &str, init: &str) {
        for i in self.modes.len()..self.names.len() {
            self.modes.push(mode.to_string());
            match ty {
                Some((t, span)) => self.types.push(t.to_string(), span),
                None => {
                    let at = self.names.positions()[i].end();
                    self.types.push(String::new(), Span::empty(at))
                }
            }
            self.ranges.push(range.to_string());
            self.inits.push(init.to_string());
        }
    }

    /// Overwrites the attributes of the completed entry at `index`. Empty
    /// arguments leave the existing attribute untouched.
    pub fn update(
        &mut self,
        index: usize,
        mode: &str,
        ty: Option<(&str, Span)>,
        range: &str,
        init: &str,
    ) {
        if index >= self.modes.len() {
            return;
        }
        if mode.is_empty() == false {
            self.modes[index] = mode.to_string();
        }
        if let Some((t, span)) = ty {
            self.types.set(index, t.to_string(), span);
        }
        if range.is_empty() == false {
            self.ranges[index] = range.to_string();
        }
        if init.is_empty() == false {
            self.inits[index] = init.to_string();
        }
    }

    /// Pads every attribute list to the length of the names list.
    ///
    /// Returns the number of entries that had to be padded.
    pub fn align(&mut self) -> usize {
        let missing = self.pending();
        if missing > 0 {
            self.complete("", None, "", "");
        }
        missing
    }

    pub fn is_aligned(&self) -> bool {
        let n = self.names.len();
        self.names.is_aligned()
            && self.types.is_aligned()
            && self.modes.len() == n
            && self.types.len() == n
            && self.ranges.len() == n
            && self.inits.len() == n
    }

    pub fn find(&self, name: &str) -> Option<usize> {
        self.names.find(name)
    }

    pub fn names(&self) -> &Field<String> {
        &self.names
    }

    pub fn modes(&self) -> &[String] {
        &self.modes
    }

    pub fn types(&self) -> &Field<String> {
        &self.types
    }

    pub fn ranges(&self) -> &[String] {
        &self.ranges
    }

    pub fn inits(&self) -> &[String] {
        &self.inits
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Looks up an attribute by its query suffix.
    pub fn get(&self, attr: &str) -> Value<'_> {
        match attr {
            "names" => Value::List(self.names.values()),
            "direction" | "kind" => Value::List(&self.modes),
            "types" => Value::List(self.types.values()),
            "ranges" => Value::List(&self.ranges),
            "init" => Value::List(&self.inits),
            _ => Value::Text(""),
        }
    }

    /// Looks up an attribute's spans by its query suffix.
    pub fn get_positions(&self, attr: &str) -> &[Span] {
        match attr {
            "names" => self.names.positions(),
            "types" => self.types.positions(),
            _ => &[],
        }
    }
}

/// Signals that imply flip-flop storage along with the generate conditions
/// that were active where each one was assigned.
#[derive(Debug, PartialEq, Clone, Default, Serialize)]
pub struct ClockedSignals {
    signals: Field<String>,
    conditions: Vec<Vec<String>>,
}

impl ClockedSignals {
    /// Records `name` unless it is already known. `conditions` is stored as is,
    /// so callers hand over their own copy of the generate stack.
    pub fn record(&mut self, name: &str, span: Span, conditions: Vec<String>) -> bool {
        if self.signals.contains(name) == true {
            return false;
        }
        self.signals.push(name.to_string(), span);
        self.conditions.push(conditions);
        true
    }

    pub fn signals(&self) -> &Field<String> {
        &self.signals
    }

    pub fn conditions(&self) -> &[Vec<String>] {
        &self.conditions
    }

    /// Accesses the generate conditions recorded for `name`.
    pub fn conditions_of(&self, name: &str) -> Option<&Vec<String>> {
        self.signals.find(name).and_then(|i| self.conditions.get(i))
    }
}

/// An owned word taken from the source along with where it was found.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Word {
    text: String,
    span: Span,
}

impl Word {
    pub fn new(text: &str, span: Span) -> Self {
        Self {
            text: text.to_string(),
            span,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn locate(&self) -> &Span {
        &self.span
    }

    /// Strips a record element or hierarchy suffix (`r.field` becomes `r`).
    pub fn base_name(&self) -> &str {
        base_name(&self.text)
    }
}

/// Strips everything from the first `.` onwards.
pub fn base_name(s: &str) -> &str {
    match s.find('.') {
        Some(i) => &s[..i],
        None => s,
    }
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize)]
pub enum Role {
    /// The word is the target of a signal assignment.
    Target,
    /// The word is the target of a VHDL variable assignment (`:=`).
    VariableTarget,
    /// The word is read.
    Read,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct BodyWord {
    word: Word,
    role: Role,
}

impl BodyWord {
    pub fn as_word(&self) -> &Word {
        &self.word
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_target(&self) -> bool {
        self.role != Role::Read
    }
}

/// A VHDL process or a Verilog always block.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct ProcessBlock {
    label: Option<String>,
    span: Span,
    clocked: bool,
    /// Sensitive to everything it reads (`all` or `*`).
    all: bool,
    sensitivity: Vec<Word>,
    body: Vec<BodyWord>,
}

impl ProcessBlock {
    pub fn new(label: Option<String>, start: usize) -> Self {
        Self {
            label,
            span: Span::empty(start),
            clocked: false,
            all: false,
            sensitivity: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn push_sensitivity(&mut self, word: Word) {
        self.sensitivity.push(word);
    }

    /// Appends a word of the block's body, returning its index.
    pub fn push_body(&mut self, word: Word, role: Role) -> usize {
        self.body.push(BodyWord { word, role });
        self.body.len() - 1
    }

    /// Marks the body word at `index` as an assignment target.
    pub fn mark_target(&mut self, index: usize, role: Role) -> Option<&Word> {
        let bw = self.body.get_mut(index)?;
        bw.role = role;
        Some(&bw.word)
    }

    pub fn set_clocked(&mut self) {
        self.clocked = true;
    }

    pub fn set_all(&mut self) {
        self.all = true;
    }

    /// Stretches the block's span to `end`.
    pub fn close(&mut self, end: usize) {
        self.span = Span::new(self.span.start(), end.max(self.span.start()));
    }

    pub fn get_label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn locate(&self) -> &Span {
        &self.span
    }

    pub fn is_clocked(&self) -> bool {
        self.clocked
    }

    pub fn is_all(&self) -> bool {
        self.all
    }

    pub fn get_sensitivity(&self) -> &[Word] {
        &self.sensitivity
    }

    pub fn get_body(&self) -> &[BodyWord] {
        &self.body
    }

    /// Iterates over the base names of every assignment target, in order.
    pub fn targets(&self) -> impl Iterator<Item = &Word> {
        self.body.iter().filter(|b| b.is_target()).map(|b| &b.word)
    }

    /// Iterates over the targets of signal assignments only.
    pub fn signal_targets(&self) -> impl Iterator<Item = &Word> {
        self.body
            .iter()
            .filter(|b| b.role == Role::Target)
            .map(|b| &b.word)
    }
}

/// Notes about input that could only be partially understood.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub enum Diagnostic {
    /// Scanning stopped at the size limit before reaching the end of the text.
    Truncated { at: usize, len: usize },
    /// A declaration list ended before every name received its attributes.
    Ragged { category: String, padded: usize },
    /// A generate condition was still open when the text ended.
    UnclosedGenerate { depth: usize },
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Truncated { at, len } => {
                write!(f, "scanning stopped at byte {} of {}", at, len)
            }
            Self::Ragged { category, padded } => write!(
                f,
                "{} entries in {:?} are missing attributes",
                padded, category
            ),
            Self::UnclosedGenerate { depth } => {
                write!(f, "{} generate conditions were never closed", depth)
            }
        }
    }
}

/// A value returned by a query.
#[derive(Debug, PartialEq, Clone, Copy, Serialize)]
#[serde(untagged)]
pub enum Value<'a> {
    Text(&'a str),
    List(&'a [String]),
    Conditions(&'a [Vec<String>]),
}

impl<'a> Value<'a> {
    pub fn as_text(&self) -> Option<&'a str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&'a [String]> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_conditions(&self) -> Option<&'a [Vec<String>]> {
        match self {
            Self::Conditions(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::List(l) => l.is_empty(),
            Self::Conditions(c) => c.is_empty(),
        }
    }
}

/// Permissive access to a symbol table by category name.
pub trait Query {
    /// Returns the values collected for `tag`, or an empty text value for an
    /// unknown tag.
    fn get(&self, tag: &str) -> Value<'_>;

    /// Returns the spans collected for `tag`, or an empty slice for an unknown
    /// tag. The tag may carry the `_positions` suffix.
    fn get_positions(&self, tag: &str) -> &[Span];
}

/// Removes the optional `_positions` suffix from a query tag.
pub fn category(tag: &str) -> &str {
    tag.strip_suffix("_positions").unwrap_or(tag)
}

/// Checks if the word starts like an identifier (letter or extended identifier).
pub fn is_name_like(s: &str) -> bool {
    match s.chars().next() {
        Some(c) => c.is_alphabetic() || c == '_' || c == '\\',
        None => false,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn complete_pending_names() {
        let mut decls = Declarations::new();
        decls.push_name("a", Span::new(0, 1));
        decls.push_name("b", Span::new(3, 4));
        assert_eq!(decls.pending(), 2);
        decls.complete("in", Some(("bit", Span::new(10, 13))), "", "'0'");
        assert_eq!(decls.pending(), 0);
        assert_eq!(decls.modes(), &["in", "in"]);
        assert_eq!(decls.types().positions(), &[Span::new(10, 13), Span::new(10, 13)]);
        assert_eq!(decls.inits(), &["'0'", "'0'"]);
        assert!(decls.is_aligned());
    }

    #[test]
    fn align_pads_missing_types_at_name_end() {
        let mut decls = Declarations::new();
        decls.push_name("a", Span::new(0, 1));
        decls.complete("in", Some(("bit", Span::new(5, 8))), "", "");
        decls.push_name("b", Span::new(20, 21));
        assert_eq!(decls.is_aligned(), false);
        assert_eq!(decls.align(), 1);
        assert!(decls.is_aligned());
        assert_eq!(decls.types().values(), &["bit", ""]);
        assert_eq!(decls.types().positions()[1], Span::empty(21));
        assert_eq!(decls.align(), 0);
    }

    #[test]
    fn clocked_signals_deduplicate() {
        let mut clocked = ClockedSignals::default();
        assert!(clocked.record("q", Span::new(0, 1), vec!["a".to_string()]));
        assert_eq!(clocked.record("q", Span::new(9, 10), vec![]), false);
        assert_eq!(clocked.signals().len(), 1);
        assert_eq!(clocked.conditions_of("q"), Some(&vec!["a".to_string()]));
    }

    #[test]
    fn unknown_attribute_is_empty_text() {
        let decls = Declarations::new();
        assert_eq!(decls.get("colour"), Value::Text(""));
        assert_eq!(decls.get_positions("ranges"), &[] as &[Span]);
        assert_eq!(category("port_interface_names_positions"), "port_interface_names");
        assert_eq!(category("comment"), "comment");
    }

    #[test]
    fn strip_record_suffix() {
        assert_eq!(base_name("r.field.x"), "r");
        assert_eq!(Word::new("count", Span::new(0, 5)).base_name(), "count");
    }
}
