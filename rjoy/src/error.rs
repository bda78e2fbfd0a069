//! Runtime errors raised during Joy evaluation.

use rjoy_parser::ParseError;

/// The single error taxonomy propagated up the evaluation stack.
#[derive(Debug, Clone, PartialEq)]
pub enum JoyError {
    /// Scanner or parser error (carries source line/column in its span).
    Syntax(ParseError),
    /// Set literal or set construction member outside [0, 63].
    SetMember(i64),
    /// A word found fewer operands than it needs.
    StackUnderflow {
        op: String,
        needed: usize,
        depth: usize,
    },
    /// A word found an operand of the wrong kind.
    Type {
        op: String,
        expected: String,
        found: String,
    },
    /// Unknown word while the undef-error flag is set.
    UndefinedWord(String),
    DivisionByZero {
        op: String,
    },
    /// Aggregate operation on an empty aggregate, or index out of bounds.
    EmptyAggregate {
        op: String,
        index: Option<i64>,
        size: Option<usize>,
    },
    /// `include` failure: path plus reason.
    Include {
        path: String,
        reason: String,
    },
    /// A bug surfaced to the user.
    Internal(String),
    /// From `quit`/`abort`; unwinds to the driver, not an error per se.
    Exit(i32),
}

impl JoyError {
    /// Type error naming the operation, the expected kinds and the actual kind.
    pub fn type_error(op: &str, expected: &str, found: &str) -> Self {
        Self::Type {
            op: op.to_string(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Empty-aggregate error without index information.
    pub fn empty_aggregate(op: &str) -> Self {
        Self::EmptyAggregate {
            op: op.to_string(),
            index: None,
            size: None,
        }
    }

    /// Index out of bounds for an aggregate of the given size.
    pub fn index_out_of_bounds(op: &str, index: i64, size: usize) -> Self {
        Self::EmptyAggregate {
            op: op.to_string(),
            index: Some(index),
            size: Some(size),
        }
    }
}

impl std::fmt::Display for JoyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Syntax(e) => write!(f, "{}", e),
            Self::SetMember(n) => write!(f, "set member {} outside [0, 63]", n),
            Self::StackUnderflow { op, needed, depth } => {
                write!(
                    f,
                    "{}: stack underflow (needs {}, have {})",
                    op, needed, depth
                )
            }
            Self::Type {
                op,
                expected,
                found,
            } => write!(f, "{}: expected {}, got {}", op, expected, found),
            Self::UndefinedWord(name) => write!(f, "undefined word '{}'", name),
            Self::DivisionByZero { op } => write!(f, "{}: division by zero", op),
            Self::EmptyAggregate { op, index, size } => match (index, size) {
                (Some(i), Some(s)) => {
                    write!(f, "{}: index {} out of bounds for size {}", op, i, s)
                }
                _ => write!(f, "{}: empty aggregate", op),
            },
            Self::Include { path, reason } => write!(f, "include '{}': {}", path, reason),
            Self::Internal(msg) => write!(f, "internal error: {}", msg),
            Self::Exit(code) => write!(f, "exit({})", code),
        }
    }
}

impl std::error::Error for JoyError {}

impl From<ParseError> for JoyError {
    fn from(e: ParseError) -> Self {
        match e {
            ParseError::SetMember { member, .. } => JoyError::SetMember(member),
            other => JoyError::Syntax(other),
        }
    }
}

/// Result type used throughout the evaluator.
pub type EvalResult<T> = Result<T, JoyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_underflow_message_names_word() {
        let err = JoyError::StackUnderflow {
            op: "swap".into(),
            needed: 2,
            depth: 1,
        };
        assert_eq!(err.to_string(), "swap: stack underflow (needs 2, have 1)");
    }

    #[test]
    fn test_type_error_message() {
        let err = JoyError::type_error("cons", "AGGREGATE", "INTEGER");
        assert_eq!(err.to_string(), "cons: expected AGGREGATE, got INTEGER");
    }

    #[test]
    fn test_index_error_message() {
        let err = JoyError::index_out_of_bounds("at", 5, 3);
        assert_eq!(err.to_string(), "at: index 5 out of bounds for size 3");
    }

    #[test]
    fn test_parse_set_member_maps_to_set_member() {
        let err = rjoy_parser::parse("{99}").unwrap_err();
        assert_eq!(JoyError::from(err), JoyError::SetMember(99));
    }
}
