//! Scanner for Joy source code
//!
//! Wraps the logos-generated lexer with the pieces Joy needs beyond plain
//! token matching: `(* ... *)` comments, shell-escape lines, and the
//! `inf`/`-inf`/`nan` lexemes that are floats only when not being defined.

use logos::Logos;

use crate::error::{ParseError, ParseResult};
use crate::span::{SourceMap, Span};
use crate::token::Token;

/// A token with its span
#[derive(Debug, Clone)]
pub struct SpannedToken<'a> {
    pub token: Token,
    pub span: Span,
    pub text: &'a str,
}

impl<'a> SpannedToken<'a> {
    pub fn new(token: Token, span: Span, text: &'a str) -> Self {
        Self { token, span, text }
    }
}

/// Joy scanner
pub struct Scanner<'a> {
    source: &'a str,
    inner: logos::Lexer<'a, Token>,
    source_map: SourceMap,
    /// Peeked token (for lookahead)
    peeked: Option<Result<SpannedToken<'a>, ParseError>>,
    /// Token buffered while deciding whether `inf`/`nan` is a float
    buffered: Option<Result<SpannedToken<'a>, ParseError>>,
    /// Offset from original source (used after restarting lexer)
    offset: usize,
    /// Forward `$`-lines to the host shell instead of just dropping them
    run_shell: bool,
}

impl<'a> std::fmt::Debug for Scanner<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("offset", &self.offset)
            .field("run_shell", &self.run_shell)
            .finish()
    }
}

impl<'a> Scanner<'a> {
    /// Create a new scanner for the given source code
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            inner: Token::lexer(source),
            source_map: SourceMap::new(source),
            peeked: None,
            buffered: None,
            offset: 0,
            run_shell: false,
        }
    }

    /// Create a scanner that forwards shell-escape lines to the host shell.
    pub fn with_shell(source: &'a str) -> Self {
        let mut scanner = Self::new(source);
        scanner.run_shell = true;
        scanner
    }

    /// Get the source code
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Get the source map
    pub fn source_map(&self) -> &SourceMap {
        &self.source_map
    }

    fn make_span(&self, start: usize, end: usize) -> Span {
        self.source_map.span(start, end)
    }

    /// Peek at the next token without consuming it
    pub fn peek(&mut self) -> Option<&Result<SpannedToken<'a>, ParseError>> {
        if self.peeked.is_none() {
            self.peeked = self.next_token_internal();
        }
        self.peeked.as_ref()
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Option<Result<SpannedToken<'a>, ParseError>> {
        if let Some(peeked) = self.peeked.take() {
            return Some(peeked);
        }
        self.next_token_internal()
    }

    fn next_token_internal(&mut self) -> Option<Result<SpannedToken<'a>, ParseError>> {
        if let Some(buffered) = self.buffered.take() {
            return Some(buffered);
        }

        let item = self.raw_next()?;

        // `inf`, `-inf` and `nan` are float literals unless a definition
        // clause follows (`inf == ...` keeps the word definable).
        if let Ok(tok) = &item {
            if tok.token == Token::Symbol && matches!(tok.text, "inf" | "-inf" | "nan") {
                let next = self.raw_next();
                let followed_by_defop =
                    matches!(&next, Some(Ok(t)) if t.token == Token::DefOp);
                self.buffered = next;
                if !followed_by_defop {
                    let tok = tok.clone();
                    return Some(Ok(SpannedToken::new(Token::Float, tok.span, tok.text)));
                }
            }
        }

        Some(item)
    }

    /// Pull the next significant token from the logos lexer, discarding
    /// comments and shell-escape lines.
    fn raw_next(&mut self) -> Option<Result<SpannedToken<'a>, ParseError>> {
        loop {
            let result = self.inner.next()?;
            let span = self.inner.span();
            let start = self.offset + span.start;
            let end = self.offset + span.end;

            match result {
                Ok(Token::CommentStart) => match self.scan_block_comment(end) {
                    Ok(comment_end) => {
                        self.restart_from(comment_end);
                        continue;
                    }
                    Err(e) => {
                        self.restart_from(self.source.len());
                        return Some(Err(e));
                    }
                },

                Ok(Token::LineComment) => continue,

                Ok(Token::ShellEscape) => {
                    let (_, column) = self.source_map.line_col(start);
                    let text = &self.source[start..end];
                    if column == 1 && !text.starts_with("$(") {
                        if self.run_shell {
                            let _ = std::process::Command::new("sh")
                                .arg("-c")
                                .arg(&text[1..])
                                .status();
                        }
                        continue;
                    }
                    // A `$` anywhere else is not Joy syntax.
                    return Some(Err(ParseError::LexerError {
                        span: self.make_span(start, start + 1),
                    }));
                }

                Ok(token) => {
                    let span = self.make_span(start, end);
                    let text = &self.source[start..end];
                    return Some(Ok(SpannedToken::new(token, span, text)));
                }

                Err(()) => {
                    let span = self.make_span(start, end);
                    if self.source.as_bytes().get(start) == Some(&b'"') {
                        return Some(Err(ParseError::UnterminatedString { span }));
                    }
                    return Some(Err(ParseError::LexerError { span }));
                }
            }
        }
    }

    /// Scan a `(* ... *)` comment, returning the offset just past `*)`.
    /// Uses memchr to jump to candidate positions.
    fn scan_block_comment(&self, start: usize) -> ParseResult<usize> {
        let bytes = self.source.as_bytes();
        let mut pos = start;

        while pos < bytes.len() {
            match memchr::memchr(b'*', &bytes[pos..]) {
                None => break,
                Some(offset) => {
                    pos += offset;
                    if bytes.get(pos + 1) == Some(&b')') {
                        return Ok(pos + 2);
                    }
                    pos += 1;
                }
            }
        }

        Err(ParseError::UnterminatedComment {
            span: self.make_span(start.saturating_sub(2), bytes.len()),
        })
    }

    /// Restart the lexer from a new position.
    /// Uses bump() to advance within the current logos lexer when possible.
    fn restart_from(&mut self, pos: usize) {
        let logos_abs_pos = self.offset + self.inner.span().end;
        if pos > logos_abs_pos && pos <= self.source.len() {
            self.inner.bump(pos - logos_abs_pos);
        } else if pos < self.source.len() {
            self.inner = Token::lexer(&self.source[pos..]);
            self.offset = pos;
        } else {
            self.inner = Token::lexer("");
            self.offset = pos;
        }
    }

    /// Collect all tokens
    pub fn collect_all(mut self) -> Vec<Result<SpannedToken<'a>, ParseError>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        tokens
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<SpannedToken<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Tokenize source code into a vector of spanned tokens
pub fn tokenize(source: &str) -> Vec<Result<SpannedToken<'_>, ParseError>> {
    Scanner::new(source).collect_all()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source)
            .into_iter()
            .filter_map(|r| r.ok())
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn test_block_comment_discarded() {
        assert_eq!(kinds("1 (* two three *) 4"), vec![Token::Integer, Token::Integer]);
    }

    #[test]
    fn test_block_comment_multiline() {
        let source = "1 (* line one\nline two *) 2";
        assert_eq!(kinds(source), vec![Token::Integer, Token::Integer]);
    }

    #[test]
    fn test_unterminated_block_comment() {
        let tokens = tokenize("1 (* oops");
        assert!(matches!(
            tokens.last(),
            Some(Err(ParseError::UnterminatedComment { .. }))
        ));
    }

    #[test]
    fn test_line_comment_discarded() {
        assert_eq!(kinds("1 # comment\n2"), vec![Token::Integer, Token::Integer]);
    }

    #[test]
    fn test_shell_escape_line_removed() {
        assert_eq!(kinds("$echo hi\n42"), vec![Token::Integer]);
    }

    #[test]
    fn test_dollar_mid_line_is_error() {
        let tokens = tokenize("42 $echo hi");
        assert!(matches!(tokens.last(), Some(Err(ParseError::LexerError { .. }))));
    }

    #[test]
    fn test_inf_is_float_unless_defined() {
        assert_eq!(kinds("inf"), vec![Token::Float]);
        assert_eq!(kinds("-inf nan"), vec![Token::Float, Token::Float]);
        assert_eq!(
            kinds("inf == 42"),
            vec![Token::Symbol, Token::DefOp, Token::Integer]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let tokens = tokenize("\"abc");
        assert!(matches!(
            tokens.first(),
            Some(Err(ParseError::UnterminatedString { .. }))
        ));
    }

    #[test]
    fn test_spans_track_lines() {
        let tokens: Vec<_> = tokenize("dup\npop").into_iter().filter_map(|r| r.ok()).collect();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].span.start_line, 1);
        assert_eq!(tokens[1].span.start_line, 2);
        assert_eq!(tokens[1].span.start_column, 1);
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut scanner = Scanner::new("a b");
        let peeked = scanner.peek().unwrap().as_ref().unwrap().text;
        assert_eq!(peeked, "a");
        let next = scanner.next_token().unwrap().unwrap();
        assert_eq!(next.text, "a");
        let next = scanner.next_token().unwrap().unwrap();
        assert_eq!(next.text, "b");
        assert!(scanner.next_token().is_none());
    }
}
