//! Parsed program representation
//!
//! The parser produces a flat sequence of terms. Quotations nest; definition
//! clauses travel inline at their source position so a redefinition only
//! takes effect from that point onward.

use serde::{Deserialize, Serialize};

/// A single parsed term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Term {
    Integer(i64),
    Float(f64),
    Char(char),
    String(String),
    Boolean(bool),
    /// Set literal as a 64-bit membership pattern (bit n set ⇔ n ∈ set).
    Set(u64),
    Quotation(Vec<Term>),
    /// A word to be resolved at execution time.
    Word(String),
    /// An inline `name == body` clause.
    Definition(Definition),
}

/// A user definition: `name == body`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    pub name: String,
    pub body: Vec<Term>,
}

/// A parsed program: the top-level term sequence.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    pub terms: Vec<Term>,
}

impl Program {
    pub fn new(terms: Vec<Term>) -> Self {
        Self { terms }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }
}
