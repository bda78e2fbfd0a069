//! Rust API for running Joy code programmatically.

use crate::error::{EvalResult, JoyError};
use crate::eval::Evaluator;
use crate::value::Value;

/// Parse and execute Joy source in a fresh evaluator.
pub fn run_source(source: &str) -> EvalResult<()> {
    let mut eval = Evaluator::new();
    eval.run(source)
}

/// Run Joy source and return the final stack, bottom to top.
pub fn eval_to_stack(source: &str) -> EvalResult<Vec<Value>> {
    let mut eval = Evaluator::new();
    eval.run(source)?;
    Ok(eval.stack.items().to_vec())
}

/// Run Joy source and return everything it printed.
pub fn eval_to_output(source: &str) -> EvalResult<String> {
    let mut eval = Evaluator::new();
    eval.capture_output();
    let result = eval.run(source);
    let output = eval.take_output();
    result.map(|()| output)
}

/// Serialize the parsed program to JSON (the C backend's input form).
/// Returns None when the source does not parse.
pub fn parse_to_json(source: &str) -> Option<String> {
    let program = rjoy_parser::parse(source).ok()?;
    serde_json::to_string(&program).ok()
}

/// Map an evaluation outcome to a process exit code: 0 on success, the
/// carried code for `quit`/`abort`, 1 for any error.
pub fn exit_code(result: &EvalResult<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(JoyError::Exit(code)) => *code,
        Err(_) => 1,
    }
}
