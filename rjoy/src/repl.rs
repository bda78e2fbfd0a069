//! REPL session management.
//!
//! A session owns one evaluator whose output is captured per line. Errors
//! leave the stack exactly as it was before the line ran.

use crate::error::{EvalResult, JoyError};
use crate::eval::Evaluator;

/// Outcome of evaluating one REPL line.
#[derive(Debug)]
pub struct LineResult {
    /// Text the program printed.
    pub output: String,
    /// Rendering of the stack after the line, bottom to top.
    pub stack: String,
}

/// A persistent interactive session.
#[derive(Debug)]
pub struct ReplSession {
    eval: Evaluator,
}

impl Default for ReplSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplSession {
    pub fn new() -> Self {
        let mut eval = Evaluator::new();
        eval.capture_output();
        Self { eval }
    }

    /// Evaluate one line. On error the stack is restored to its state
    /// before the line.
    pub fn eval_line(&mut self, line: &str) -> EvalResult<LineResult> {
        let before = self.eval.stack.snapshot();
        let result = self.eval.run(line);
        let output = self.eval.take_output();

        match result {
            Ok(()) => Ok(LineResult {
                output,
                stack: self.stack_display(),
            }),
            Err(e @ JoyError::Exit(_)) => Err(e),
            Err(e) => {
                self.eval.stack.restore(before);
                Err(e)
            }
        }
    }

    /// The stack rendered bottom to top on one line.
    pub fn stack_display(&self) -> String {
        self.eval
            .stack
            .items()
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn clear_stack(&mut self) {
        self.eval.stack.clear();
    }

    /// All known words: primitives plus user definitions, sorted.
    pub fn words(&self) -> Vec<String> {
        let mut words: Vec<String> = crate::registry::REGISTRY
            .names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        words.extend(self.eval.definitions.keys().map(|k| k.to_string()));
        words.sort();
        words.dedup();
        words
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_keeps_state_across_lines() {
        let mut session = ReplSession::new();
        session.eval_line("DEFINE sq == dup * .").unwrap();
        let result = session.eval_line("6 sq").unwrap();
        assert_eq!(result.stack, "36");
    }

    #[test]
    fn test_error_leaves_stack_unchanged() {
        let mut session = ReplSession::new();
        session.eval_line("1 2").unwrap();
        let err = session.eval_line("nosuchword").unwrap_err();
        assert!(matches!(err, JoyError::UndefinedWord(_)));
        assert_eq!(session.stack_display(), "1 2");
    }

    #[test]
    fn test_output_is_captured() {
        let mut session = ReplSession::new();
        let result = session.eval_line("\"hi\" putchars").unwrap();
        assert_eq!(result.output, "hi");
    }

    #[test]
    fn test_words_include_user_definitions() {
        let mut session = ReplSession::new();
        session.eval_line("DEFINE mystery == 1 .").unwrap();
        assert!(session.words().iter().any(|w| w == "mystery"));
        assert!(session.words().iter().any(|w| w == "dup"));
    }
}
