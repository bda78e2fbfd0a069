//! The evaluator: owns the stack and the user definitions, walks terms,
//! and dispatches symbols to primitives or user bodies.
//!
//! The builtin words live in family modules registered through
//! [`crate::registry`]. Combinators re-enter [`Evaluator::execute`] on the
//! same stack; the save/restore discipline they need is plain item-vector
//! snapshots.

pub mod aggregate;
pub mod arithmetic;
pub mod combinators;
pub mod io;
pub mod logic;
pub mod stack_ops;
pub mod system;
pub mod types_ops;

use std::collections::HashMap;
use std::io::Write as _;
use std::rc::Rc;

use crate::error::{EvalResult, JoyError};
use crate::program::{lower_program, term_to_value, value_to_term, Quotation, Term};
use crate::registry;
use crate::rng::StableRng;
use crate::stack::Stack;
use crate::value::{JoySet, Kind, Num, Value};

/// Where evaluator output goes: the process stdout, or a capture buffer
/// (used by the REPL and the tests).
#[derive(Debug)]
enum Output {
    Stdout,
    Capture(Vec<u8>),
}

/// Joy evaluator state.
#[derive(Debug)]
pub struct Evaluator {
    pub stack: Stack,
    pub definitions: HashMap<Rc<str>, Quotation>,
    /// When false, an unknown word pushes itself as a Symbol instead of
    /// failing.
    pub undef_error: bool,
    pub echo_mode: i64,
    pub autoput_mode: i64,
    /// Captured argv for `argc`/`argv`.
    pub argv: Vec<String>,
    pub(crate) rng: StableRng,
    out: Output,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            stack: Stack::new(),
            definitions: HashMap::new(),
            undef_error: true,
            echo_mode: 0,
            autoput_mode: 1,
            argv: std::env::args().collect(),
            rng: StableRng::new(0),
            out: Output::Stdout,
        }
    }

    /// Parse and execute Joy source code.
    pub fn run(&mut self, source: &str) -> EvalResult<()> {
        let program = rjoy_parser::parse(source)?;
        let terms = lower_program(&program);
        self.execute(&terms)
    }

    /// Execute a term sequence.
    pub fn execute(&mut self, terms: &[Term]) -> EvalResult<()> {
        for term in terms {
            self.execute_term(term)?;
        }
        Ok(())
    }

    /// Execute a quotation.
    pub fn execute_quotation(&mut self, quotation: &Quotation) -> EvalResult<()> {
        self.execute(quotation.terms())
    }

    fn execute_term(&mut self, term: &Term) -> EvalResult<()> {
        match term {
            Term::Def(def) => {
                self.define(def.name.clone(), def.body.clone());
                Ok(())
            }
            Term::Quote(q) => {
                self.stack.push(Value::Quotation(q.clone()));
                Ok(())
            }
            // A symbol value in term position executes; other literals push.
            Term::Literal(Value::Symbol(name)) => {
                let name = name.clone();
                self.execute_symbol(&name)
            }
            Term::Literal(value) => {
                self.stack.push(value.clone());
                Ok(())
            }
            Term::Word(name) => {
                let name = name.clone();
                self.execute_symbol(&name)
            }
        }
    }

    /// Resolve and execute a symbol: primitives first, then user
    /// definitions, then the undef-error policy.
    pub fn execute_symbol(&mut self, name: &str) -> EvalResult<()> {
        if let Some(primitive) = registry::lookup(name) {
            self.stack.require(primitive.name, primitive.arity)?;
            return (primitive.run)(self);
        }

        if let Some(body) = self.definitions.get(name).cloned() {
            return self.execute(body.terms());
        }

        if self.undef_error {
            return Err(JoyError::UndefinedWord(name.to_string()));
        }
        self.stack.push(Value::Symbol(Rc::from(name)));
        Ok(())
    }

    /// Register a user definition.
    pub fn define(&mut self, name: Rc<str>, body: Quotation) {
        self.definitions.insert(name, body);
    }

    // ---------------------------------------------------------------------
    // Output sink
    // ---------------------------------------------------------------------

    pub fn write_str(&mut self, s: &str) {
        match &mut self.out {
            Output::Stdout => {
                print!("{}", s);
                let _ = std::io::stdout().flush();
            }
            Output::Capture(buf) => buf.extend_from_slice(s.as_bytes()),
        }
    }

    pub fn writeln_str(&mut self, s: &str) {
        self.write_str(s);
        self.write_str("\n");
    }

    /// Redirect output into a capture buffer.
    pub fn capture_output(&mut self) {
        self.out = Output::Capture(Vec::new());
    }

    /// Drain the capture buffer (empty when writing to stdout).
    pub fn take_output(&mut self) -> String {
        match &mut self.out {
            Output::Capture(buf) => String::from_utf8_lossy(&std::mem::take(buf)).into_owned(),
            Output::Stdout => String::new(),
        }
    }
}

// -------------------------------------------------------------------------
// Helpers shared by the primitive families
// -------------------------------------------------------------------------

/// Extract a quotation, accepting a List as executable program text.
pub fn expect_quotation(value: &Value, op: &str) -> EvalResult<Quotation> {
    match value {
        Value::Quotation(q) => Ok(q.clone()),
        Value::List(items) => Ok(Quotation::new(items.iter().map(value_to_term).collect())),
        other => Err(JoyError::type_error(op, "QUOTATION", other.kind_name())),
    }
}

/// Aggregate contents as values: list items, quotation terms, string
/// characters, or set members in ascending order.
pub fn aggregate_values(value: &Value, op: &str) -> EvalResult<Vec<Value>> {
    match value {
        Value::List(items) => Ok(items.as_ref().clone()),
        Value::Quotation(q) => Ok(q.terms().iter().map(term_to_value).collect()),
        Value::String(s) => Ok(s.chars().map(Value::Char).collect()),
        Value::Set(set) => Ok(set.members().map(Value::Integer).collect()),
        other => Err(JoyError::type_error(op, "AGGREGATE", other.kind_name())),
    }
}

/// Rebuild an aggregate from items, following the source kind where the
/// elements still allow it: String when everything is a Char (integers
/// are taken as ordinals), Set when everything is a small Integer,
/// Quotation stays Quotation, anything else becomes a List.
pub fn rebuild_aggregate(items: Vec<Value>, kind: Kind) -> Value {
    match kind {
        Kind::String => {
            let mut out = String::with_capacity(items.len());
            for item in &items {
                match item {
                    Value::Char(c) => out.push(*c),
                    Value::Integer(n) => {
                        match u32::try_from(*n).ok().and_then(char::from_u32) {
                            Some(c) => out.push(c),
                            None => return Value::list(items),
                        }
                    }
                    _ => return Value::list(items),
                }
            }
            Value::string(out)
        }
        Kind::Set => {
            let mut bits = 0u64;
            for item in &items {
                match item {
                    Value::Integer(n) if (0..=JoySet::MAX_MEMBER).contains(n) => {
                        bits |= 1u64 << n
                    }
                    _ => return Value::list(items),
                }
            }
            Value::Set(JoySet::from_bits(bits))
        }
        Kind::Quotation => {
            Value::Quotation(Quotation::new(items.iter().map(value_to_term).collect()))
        }
        _ => Value::list(items),
    }
}

/// Rebuild for the collecting combinators (`map`, `filter`, `split`):
/// like [`rebuild_aggregate`] except a source quotation collects to a List.
pub fn rebuild_collected(items: Vec<Value>, kind: Kind) -> Value {
    match kind {
        Kind::String | Kind::Set => rebuild_aggregate(items, kind),
        _ => Value::list(items),
    }
}

/// Element equality used by membership tests and `case`: same kind compares
/// structurally, Integer/Float cross-compare numerically.
pub fn item_eq(a: &Value, b: &Value) -> bool {
    if a.kind() == b.kind() {
        return a == b;
    }
    match (a.as_number("").ok(), b.as_number("").ok()) {
        (Some(x), Some(y)) if a.is_numeric() && b.is_numeric() => Num::num_eq(x, y),
        _ => false,
    }
}
