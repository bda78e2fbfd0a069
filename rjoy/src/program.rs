//! Runtime program representation and lowering from the parsed tree.
//!
//! The parser crate produces a plain CST; the evaluator works on `Term`,
//! which can also carry runtime-built values (a file handle consed into a
//! quotation, for instance). Quotations share their term sequences through
//! `Rc`, so cloning one for a snapshot or a recursive call is cheap.

use std::fmt;
use std::rc::Rc;

use rjoy_parser::cst;

use crate::value::{JoySet, Value};

/// An immutable, shared sequence of terms.
#[derive(Debug, Clone, PartialEq)]
pub struct Quotation(Rc<Vec<Term>>);

impl Quotation {
    pub fn new(terms: Vec<Term>) -> Self {
        Self(Rc::new(terms))
    }

    pub fn empty() -> Self {
        Self(Rc::new(Vec::new()))
    }

    pub fn terms(&self) -> &[Term] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Concatenation of two quotations (`compose`, `concat` on quotations).
    pub fn join(&self, other: &Quotation) -> Quotation {
        let mut terms = self.0.as_ref().clone();
        terms.extend(other.0.iter().cloned());
        Quotation::new(terms)
    }
}

impl fmt::Display for Quotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, term) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", term)?;
        }
        write!(f, "]")
    }
}

/// A user definition: `name == body`.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub name: Rc<str>,
    pub body: Quotation,
}

/// One element of a program or quotation.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// A literal value to push.
    Literal(Value),
    /// A word to resolve at execution time.
    Word(Rc<str>),
    /// A nested quotation (pushed unevaluated).
    Quote(Quotation),
    /// An inline definition record.
    Def(Definition),
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Literal(v) => write!(f, "{}", v),
            Term::Word(w) => write!(f, "{}", w),
            Term::Quote(q) => write!(f, "{}", q),
            Term::Def(d) => write!(f, "{} == {}", d.name, d.body),
        }
    }
}

/// View a term as a value (quotation elements seen through `first`, `map`
/// and friends).
pub fn term_to_value(term: &Term) -> Value {
    match term {
        Term::Literal(v) => v.clone(),
        Term::Word(w) => Value::Symbol(w.clone()),
        Term::Quote(q) => Value::Quotation(q.clone()),
        Term::Def(d) => Value::Symbol(d.name.clone()),
    }
}

/// View a value as a term (building quotations from runtime values).
pub fn value_to_term(value: &Value) -> Term {
    match value {
        Value::Symbol(s) => Term::Word(s.clone()),
        Value::Quotation(q) => Term::Quote(q.clone()),
        other => Term::Literal(other.clone()),
    }
}

/// Lower one parsed term into its runtime form.
pub fn lower(term: &cst::Term) -> Term {
    match term {
        cst::Term::Integer(n) => Term::Literal(Value::Integer(*n)),
        cst::Term::Float(f) => Term::Literal(Value::Float(*f)),
        cst::Term::Char(c) => Term::Literal(Value::Char(*c)),
        cst::Term::String(s) => Term::Literal(Value::string(s)),
        cst::Term::Boolean(b) => Term::Literal(Value::Boolean(*b)),
        cst::Term::Set(bits) => Term::Literal(Value::Set(JoySet::from_bits(*bits))),
        cst::Term::Quotation(terms) => Term::Quote(lower_quotation(terms)),
        cst::Term::Word(name) => Term::Word(Rc::from(name.as_str())),
        cst::Term::Definition(def) => Term::Def(Definition {
            name: Rc::from(def.name.as_str()),
            body: lower_quotation(&def.body),
        }),
    }
}

fn lower_quotation(terms: &[cst::Term]) -> Quotation {
    Quotation::new(terms.iter().map(lower).collect())
}

/// Lower a whole parsed program.
pub fn lower_program(program: &cst::Program) -> Vec<Term> {
    program.terms.iter().map(lower).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lower_literals() {
        let program = rjoy_parser::parse("1 2.5 'a \"s\" true {0 1}").unwrap();
        let terms = lower_program(&program);
        assert_eq!(terms[0], Term::Literal(Value::Integer(1)));
        assert_eq!(terms[1], Term::Literal(Value::Float(2.5)));
        assert_eq!(terms[2], Term::Literal(Value::Char('a')));
        assert_eq!(terms[3], Term::Literal(Value::string("s")));
        assert_eq!(terms[4], Term::Literal(Value::Boolean(true)));
        assert_eq!(
            terms[5],
            Term::Literal(Value::Set(JoySet::from_members([0, 1]).unwrap()))
        );
    }

    #[test]
    fn test_lower_definition_inline() {
        let program = rjoy_parser::parse("DEFINE sq == dup * . 7 sq").unwrap();
        let terms = lower_program(&program);
        assert!(matches!(&terms[0], Term::Def(d) if &*d.name == "sq" && d.body.len() == 2));
        assert_eq!(terms[1], Term::Literal(Value::Integer(7)));
        assert_eq!(terms[2], Term::Word(Rc::from("sq")));
    }

    #[test]
    fn test_value_term_round_trip() {
        let q = Quotation::new(vec![Term::Word(Rc::from("dup"))]);
        let v = Value::Quotation(q.clone());
        assert_eq!(value_to_term(&v), Term::Quote(q));
        assert_eq!(term_to_value(&Term::Word(Rc::from("x"))), Value::symbol("x"));
    }

    #[test]
    fn test_quotation_join() {
        let a = Quotation::new(vec![Term::Literal(Value::Integer(1))]);
        let b = Quotation::new(vec![Term::Literal(Value::Integer(2))]);
        let joined = a.join(&b);
        assert_eq!(joined.len(), 2);
        assert_eq!(joined.to_string(), "[1 2]");
    }
}
