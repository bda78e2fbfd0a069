//! Parse error types

use crate::span::Span;
use thiserror::Error;

/// Scanner/parser error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Unexpected token
    #[error("unexpected token '{found}' at {span:?}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: String,
        span: Span,
    },

    /// Unexpected end of input
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String, span: Span },

    /// Unterminated string
    #[error("unterminated string literal starting at {span:?}")]
    UnterminatedString { span: Span },

    /// Unterminated block comment
    #[error("unterminated comment starting at {span:?}")]
    UnterminatedComment { span: Span },

    /// Invalid number literal
    #[error("invalid number literal '{literal}' at {span:?}")]
    InvalidNumber { literal: String, span: Span },

    /// Invalid character literal
    #[error("invalid character literal at {span:?}")]
    InvalidCharacter { span: Span },

    /// Invalid escape sequence
    #[error("invalid escape sequence '{sequence}' at {span:?}")]
    InvalidEscape { sequence: String, span: Span },

    /// Unclosed bracket or brace
    #[error("unclosed '{bracket}' at {span:?}")]
    UnclosedBracket { bracket: char, span: Span },

    /// Set literal member outside [0, 63]
    #[error("set member {member} outside [0, 63] at {span:?}")]
    SetMember { member: i64, span: Span },

    /// Invalid syntax
    #[error("{message} at {span:?}")]
    InvalidSyntax { message: String, span: Span },

    /// Lexer error
    #[error("unrecognized token at {span:?}")]
    LexerError { span: Span },
}

impl ParseError {
    /// Get the span of the error
    pub fn span(&self) -> &Span {
        match self {
            ParseError::UnexpectedToken { span, .. } => span,
            ParseError::UnexpectedEof { span, .. } => span,
            ParseError::UnterminatedString { span } => span,
            ParseError::UnterminatedComment { span } => span,
            ParseError::InvalidNumber { span, .. } => span,
            ParseError::InvalidCharacter { span } => span,
            ParseError::InvalidEscape { span, .. } => span,
            ParseError::UnclosedBracket { span, .. } => span,
            ParseError::SetMember { span, .. } => span,
            ParseError::InvalidSyntax { span, .. } => span,
            ParseError::LexerError { span } => span,
        }
    }

    /// Create an unexpected token error
    pub fn unexpected_token(
        found: impl Into<String>,
        expected: impl Into<String>,
        span: Span,
    ) -> Self {
        ParseError::UnexpectedToken {
            found: found.into(),
            expected: expected.into(),
            span,
        }
    }

    /// Create an unexpected EOF error
    pub fn unexpected_eof(expected: impl Into<String>, span: Span) -> Self {
        ParseError::UnexpectedEof {
            expected: expected.into(),
            span,
        }
    }

    /// Create an invalid syntax error
    pub fn invalid_syntax(message: impl Into<String>, span: Span) -> Self {
        ParseError::InvalidSyntax {
            message: message.into(),
            span,
        }
    }

    /// Format error with source context
    ///
    /// Returns a string showing the source line with an error marker.
    pub fn format_with_context(&self, source: &str) -> String {
        let span = self.span();

        let lines: Vec<&str> = source.lines().collect();
        let line_idx = span.start_line.saturating_sub(1);

        if line_idx >= lines.len() {
            return String::new();
        }

        let line = lines[line_idx];
        let col = span.start_column.saturating_sub(1);
        let len = if span.start_line == span.end_line {
            span.end_column.saturating_sub(span.start_column).max(1)
        } else {
            1
        };

        let spaces = " ".repeat(col);
        let marker = "^".repeat(len.min(line.len().saturating_sub(col)).max(1));

        format!(
            "  {} | {}\n  {} | {}{}",
            span.start_line,
            line,
            " ".repeat(span.start_line.to_string().len()),
            spaces,
            marker
        )
    }
}

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_token_message() {
        let span = Span::new(0, 5, 1, 1, 1, 6);
        let err = ParseError::unexpected_token("}", "a term", span);

        assert!(err.to_string().contains('}'));
        assert!(err.to_string().contains("a term"));
    }

    #[test]
    fn test_set_member_message() {
        let span = Span::new(1, 3, 1, 1, 2, 4);
        let err = ParseError::SetMember { member: 64, span };
        assert!(err.to_string().contains("64"));
        assert_eq!(err.span().start_column, 2);
    }

    #[test]
    fn test_format_with_context() {
        let source = "1 2 [dup\n3 4";
        let span = Span::new(4, 5, 1, 1, 5, 6);
        let err = ParseError::UnclosedBracket { bracket: '[', span };

        let context = err.format_with_context(source);
        assert!(context.contains("1 2 [dup"));
        assert!(context.contains('^'));
    }
}
