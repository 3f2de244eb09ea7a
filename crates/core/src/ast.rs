//! Syntax tree produced by the parser.
//!
//! Nothing here is resolved: variable references are still names and map
//! entries are still unmerged `(KeyPath, Node)` pairs in source order.
//! Substitution and merging are the evaluator's job.

use std::fmt;

use crate::scope::Bindings;

// ──────────────────────────────────────────────
// Source locations
// ──────────────────────────────────────────────

/// 1-based line and column (in characters) of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    pub line: u32,
    pub col: u32,
}

impl Span {
    pub fn new(line: u32, col: u32) -> Self {
        Span { line, col }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

// ──────────────────────────────────────────────
// Nodes
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}

impl Node {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Node { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Str(String),
    List(Vec<ListItem>),
    Map(Vec<MapItem>),
    /// `$name` in value position
    VarRef(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListItem {
    Value(Node),
    /// `..$name` -- splices the items of a list-valued variable
    Spread { name: String, span: Span },
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapItem {
    Entry { path: KeyPath, value: Node },
    /// `..$name` -- merges the keys of a map-valued variable
    Spread { name: String, span: Span },
}

/// `a.b.c` on the left of `=`. Always has at least one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPath {
    pub segments: Vec<String>,
    pub span: Span,
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl Node {
    /// Every variable name this node refers to, with the site of each
    /// reference, in source order. Spreads count as references.
    pub fn var_refs(&self) -> Vec<(&str, Span)> {
        let mut out = Vec::new();
        self.collect_var_refs(&mut out);
        out
    }

    fn collect_var_refs<'n>(&'n self, out: &mut Vec<(&'n str, Span)>) {
        match &self.kind {
            NodeKind::VarRef(name) => out.push((name.as_str(), self.span)),
            NodeKind::List(items) => {
                for item in items {
                    match item {
                        ListItem::Value(node) => node.collect_var_refs(out),
                        ListItem::Spread { name, span } => out.push((name.as_str(), *span)),
                    }
                }
            }
            NodeKind::Map(items) => {
                for item in items {
                    match item {
                        MapItem::Entry { value, .. } => value.collect_var_refs(out),
                        MapItem::Spread { name, span } => out.push((name.as_str(), *span)),
                    }
                }
            }
            NodeKind::Null
            | NodeKind::Bool(_)
            | NodeKind::Integer(_)
            | NodeKind::Float(_)
            | NodeKind::Str(_) => {}
        }
    }
}

// ──────────────────────────────────────────────
// Document
// ──────────────────────────────────────────────

/// A parsed source file: the optional `let` block and the body value.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub bindings: Bindings,
    pub body: Node,
}
