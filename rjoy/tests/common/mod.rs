//! Shared helpers for integration tests.
#![allow(dead_code)]

use rjoy::{Evaluator, JoyError, Value};

/// Run a program and return the final stack, bottom to top.
pub fn run(source: &str) -> Vec<Value> {
    let mut eval = Evaluator::new();
    eval.run(source)
        .unwrap_or_else(|e| panic!("program failed: {}\n  source: {}", e, source));
    eval.stack.items().to_vec()
}

/// Run a program and return the top of the stack.
pub fn top(source: &str) -> Value {
    run(source)
        .pop()
        .unwrap_or_else(|| panic!("empty stack after: {}", source))
}

/// Run a program expected to fail.
pub fn fail(source: &str) -> JoyError {
    let mut eval = Evaluator::new();
    match eval.run(source) {
        Ok(()) => panic!("expected failure: {}", source),
        Err(e) => e,
    }
}

/// The stack as integers, panicking on anything else.
pub fn ints(items: &[Value]) -> Vec<i64> {
    items
        .iter()
        .map(|v| match v {
            Value::Integer(n) => *n,
            other => panic!("expected integer, got {:?}", other),
        })
        .collect()
}
