//! A small structural selector language.
//!
//! Supports the subset of CSS needed to recognise message markup:
//! type selectors, `#id`, `.class`, `[attr]`, `[attr="value"]`, `*`,
//! the descendant combinator (whitespace) and comma-separated groups.

use std::fmt;
use std::str::FromStr;

use crate::document::{HostDocument, NodeId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: Vec<ComplexSelector>,
}

/// Compound selectors joined by descendant combinators, outermost first.
#[derive(Clone, Debug, PartialEq, Eq)]
struct ComplexSelector {
    parts: Vec<CompoundSelector>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct CompoundSelector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeSelector>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct AttributeSelector {
    name: String,
    value: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectorErrorKind {
    Empty,
    UnexpectedChar(char),
    UnexpectedEnd,
    ExpectedIdent,
    UnterminatedString,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorError {
    pub position: usize,
    pub kind: SelectorErrorKind,
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            SelectorErrorKind::Empty => write!(f, "empty selector"),
            SelectorErrorKind::UnexpectedChar(c) => {
                write!(f, "unexpected character {c:?} at offset {}", self.position)
            }
            SelectorErrorKind::UnexpectedEnd => write!(f, "selector ended unexpectedly"),
            SelectorErrorKind::ExpectedIdent => {
                write!(f, "expected identifier at offset {}", self.position)
            }
            SelectorErrorKind::UnterminatedString => {
                write!(f, "unterminated string starting before offset {}", self.position)
            }
        }
    }
}

impl std::error::Error for SelectorError {}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        if input.trim().is_empty() {
            return Err(SelectorError {
                position: 0,
                kind: SelectorErrorKind::Empty,
            });
        }
        let alternatives = Parser::new(input).parse_list()?;
        Ok(Self {
            source: input.trim().to_string(),
            alternatives,
        })
    }

    /// `[name]`
    pub fn has_attribute(name: &str) -> Self {
        Self {
            source: format!("[{name}]"),
            alternatives: vec![ComplexSelector {
                parts: vec![CompoundSelector {
                    attributes: vec![AttributeSelector {
                        name: name.to_ascii_lowercase(),
                        value: None,
                    }],
                    ..CompoundSelector::default()
                }],
            }],
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches<D: HostDocument + ?Sized>(&self, doc: &D, node: NodeId) -> bool {
        doc.is_element(node)
            && self
                .alternatives
                .iter()
                .any(|complex| complex.matches(doc, node))
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl ComplexSelector {
    fn matches<D: HostDocument + ?Sized>(&self, doc: &D, node: NodeId) -> bool {
        let Some((subject, ancestors)) = self.parts.split_last() else {
            return false;
        };
        if !subject.matches(doc, node) {
            return false;
        }
        // Greedy nearest-ancestor matching is exact for descendant-only chains.
        let mut current = doc.parent(node);
        for part in ancestors.iter().rev() {
            loop {
                let Some(candidate) = current else {
                    return false;
                };
                current = doc.parent(candidate);
                if part.matches(doc, candidate) {
                    break;
                }
            }
        }
        true
    }
}

impl CompoundSelector {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.id.is_none() && self.classes.is_empty() && self.attributes.is_empty()
    }

    fn matches<D: HostDocument + ?Sized>(&self, doc: &D, node: NodeId) -> bool {
        if !doc.is_element(node) {
            return false;
        }
        if let Some(tag) = &self.tag {
            match doc.tag_name(node) {
                Some(name) if name.eq_ignore_ascii_case(tag) => {}
                _ => return false,
            }
        }
        if let Some(id) = &self.id {
            if doc.attribute(node, "id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|class| doc.has_class(node, class)) {
            return false;
        }
        self.attributes.iter().all(|attr| match (doc.attribute(node, &attr.name), &attr.value) {
            (Some(_), None) => true,
            (Some(actual), Some(expected)) => actual == expected,
            (None, _) => false,
        })
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
        self.pos != start
    }

    fn error(&self, kind: SelectorErrorKind) -> SelectorError {
        SelectorError {
            position: self.pos,
            kind,
        }
    }

    fn unexpected(&self) -> SelectorError {
        match self.peek() {
            Some(c) => self.error(SelectorErrorKind::UnexpectedChar(c)),
            None => self.error(SelectorErrorKind::UnexpectedEnd),
        }
    }

    fn parse_list(&mut self) -> Result<Vec<ComplexSelector>, SelectorError> {
        let mut alternatives = Vec::new();
        loop {
            self.skip_whitespace();
            alternatives.push(self.parse_complex()?);
            match self.peek() {
                None => return Ok(alternatives),
                Some(',') => {
                    self.bump();
                }
                Some(_) => return Err(self.unexpected()),
            }
        }
    }

    fn parse_complex(&mut self) -> Result<ComplexSelector, SelectorError> {
        let mut parts = vec![self.parse_compound()?];
        loop {
            let separated = self.skip_whitespace();
            match self.peek() {
                None | Some(',') => break,
                Some(_) if separated => parts.push(self.parse_compound()?),
                Some(_) => return Err(self.unexpected()),
            }
        }
        Ok(ComplexSelector { parts })
    }

    fn parse_compound(&mut self) -> Result<CompoundSelector, SelectorError> {
        let start = self.pos;
        let mut compound = CompoundSelector::default();
        match self.peek() {
            Some('*') => {
                self.bump();
            }
            Some(c) if is_ident_char(c) => {
                compound.tag = Some(self.parse_ident()?.to_ascii_lowercase());
            }
            _ => {}
        }
        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    compound.id = Some(self.parse_ident()?);
                }
                Some('.') => {
                    self.bump();
                    compound.classes.push(self.parse_ident()?);
                }
                Some('[') => {
                    self.bump();
                    compound.attributes.push(self.parse_attribute()?);
                }
                _ => break,
            }
        }
        if self.pos == start && compound.is_empty() {
            return Err(self.unexpected());
        }
        Ok(compound)
    }

    fn parse_ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if is_ident_char(c)) {
            self.bump();
        }
        if start == self.pos {
            return Err(self.error(SelectorErrorKind::ExpectedIdent));
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn parse_attribute(&mut self) -> Result<AttributeSelector, SelectorError> {
        self.skip_whitespace();
        let name = self.parse_ident()?.to_ascii_lowercase();
        self.skip_whitespace();
        let value = match self.peek() {
            Some(']') => None,
            Some('=') => {
                self.bump();
                self.skip_whitespace();
                let value = self.parse_value()?;
                self.skip_whitespace();
                Some(value)
            }
            _ => return Err(self.unexpected()),
        };
        if self.peek() != Some(']') {
            return Err(self.unexpected());
        }
        self.bump();
        Ok(AttributeSelector { name, value })
    }

    fn parse_value(&mut self) -> Result<String, SelectorError> {
        let Some(quote @ ('"' | '\'')) = self.peek() else {
            return self.parse_ident();
        };
        self.bump();
        let start = self.pos;
        loop {
            match self.bump() {
                Some(c) if c == quote => break,
                Some(_) => {}
                None => return Err(self.error(SelectorErrorKind::UnterminatedString)),
            }
        }
        Ok(self.input[start..self.pos - quote.len_utf8()].to_string())
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

#[cfg(test)]
#[path = "tests/selector_tests.rs"]
mod tests;
