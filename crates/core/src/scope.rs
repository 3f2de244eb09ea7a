//! The binding table filled from a document's `let` block.
//!
//! Sequential, non-recursive `let`: binding `i` can only see bindings
//! `0..i`. The table stores unevaluated nodes; each use site evaluates its
//! own copy.

use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::ast::{Node, Span};

#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: String,
    pub value: Node,
    /// Location of the `$name` on the left of `=`.
    pub span: Span,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    entries: IndexMap<String, Binding>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a binding. On a duplicate name the table is left untouched and
    /// the existing binding is returned.
    pub fn insert(&mut self, name: String, value: Node, span: Span) -> Result<(), &Binding> {
        match self.entries.entry(name) {
            Entry::Occupied(existing) => Err(existing.into_mut()),
            Entry::Vacant(slot) => {
                let name = slot.key().clone();
                slot.insert(Binding { name, value, span });
                Ok(())
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Node> {
        self.entries.get(name).map(|b| &b.value)
    }

    /// Look `name` up among the first `visible` bindings only.
    pub fn lookup_before(&self, name: &str, visible: usize) -> Option<(usize, &Binding)> {
        self.entries
            .get_full(name)
            .filter(|(index, _, _)| *index < visible)
            .map(|(index, _, binding)| (index, binding))
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.entries.get(name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.get_index_of(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
