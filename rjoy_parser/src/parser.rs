//! Parser for Joy programs
//!
//! Single pass over the token stream producing a flat `Program`. Definition
//! clauses from `DEFINE`/`LIBRA`/`CONST` and `HIDE ... IN ... END` blocks are
//! emitted inline at their source position, which is what makes
//! redefinition-between-uses behave correctly.

use crate::cst::{Definition, Program, Term};
use crate::error::{ParseError, ParseResult};
use crate::lexer::{Scanner, SpannedToken};
use crate::span::Span;
use crate::token::Token;

/// Joy parser: token stream to program.
#[derive(Debug)]
pub struct Parser<'a> {
    tokens: Vec<SpannedToken<'a>>,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<SpannedToken<'a>>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn current(&self) -> Option<SpannedToken<'a>> {
        self.tokens.get(self.pos).cloned()
    }

    fn advance(&mut self) -> Option<SpannedToken<'a>> {
        let token = self.current();
        self.pos += 1;
        token
    }

    /// Parse the whole token stream into a program.
    pub fn parse_program(&mut self) -> ParseResult<Program> {
        let mut terms = Vec::new();

        while let Some(token) = self.current() {
            match token.token {
                Token::KwDefine => terms.extend(self.parse_definition_block()?),
                Token::KwHide => terms.extend(self.parse_hide_block()?),
                _ => {
                    if let Some(term) = self.parse_term()? {
                        terms.push(term);
                    }
                }
            }
        }

        Ok(Program::new(terms))
    }

    /// Parse terms until one of the terminator token kinds (not consumed).
    fn parse_terms(&mut self, terminators: &[Token]) -> ParseResult<Vec<Term>> {
        let mut terms = Vec::new();

        while let Some(token) = self.current() {
            if terminators.contains(&token.token) {
                break;
            }
            if let Some(term) = self.parse_term()? {
                terms.push(term);
            }
        }

        Ok(terms)
    }

    /// Parse a single term; returns None for skipped tokens (separators,
    /// stray keywords).
    fn parse_term(&mut self) -> ParseResult<Option<Term>> {
        let Some(token) = self.current() else {
            return Ok(None);
        };

        match token.token {
            Token::Integer => {
                self.pos += 1;
                let value = token.text.parse::<i64>().map_err(|_| ParseError::InvalidNumber {
                    literal: token.text.to_string(),
                    span: token.span,
                })?;
                Ok(Some(Term::Integer(value)))
            }

            Token::Float => {
                self.pos += 1;
                let value = match token.text {
                    "inf" => f64::INFINITY,
                    "-inf" => f64::NEG_INFINITY,
                    "nan" => f64::NAN,
                    text => text.parse::<f64>().map_err(|_| ParseError::InvalidNumber {
                        literal: text.to_string(),
                        span: token.span,
                    })?,
                };
                Ok(Some(Term::Float(value)))
            }

            Token::Str => {
                self.pos += 1;
                let inner = &token.text[1..token.text.len() - 1];
                Ok(Some(Term::String(unescape(inner, token.span)?)))
            }

            Token::CharLit => {
                self.pos += 1;
                Ok(Some(Term::Char(char_value(token.text, token.span)?)))
            }

            Token::LBracket => Ok(Some(self.parse_quotation()?)),

            Token::LBrace => Ok(Some(self.parse_set()?)),

            Token::Symbol => {
                self.pos += 1;
                Ok(Some(match token.text {
                    "true" => Term::Boolean(true),
                    "false" => Term::Boolean(false),
                    name => Term::Word(name.to_string()),
                }))
            }

            // In executable position the period is the print word.
            Token::Period => {
                self.pos += 1;
                Ok(Some(Term::Word(".".to_string())))
            }

            // Statement separator.
            Token::Semicolon => {
                self.pos += 1;
                Ok(None)
            }

            // A stray `==` outside a definition is dropped.
            Token::DefOp => {
                self.pos += 1;
                Ok(None)
            }

            // Keywords outside definition context are dropped.
            Token::KwDefine
            | Token::KwHide
            | Token::KwIn
            | Token::KwEnd
            | Token::KwModule
            | Token::KwPublic
            | Token::KwPrivate => {
                self.pos += 1;
                Ok(None)
            }

            other => Err(ParseError::unexpected_token(
                other.describe(),
                "a term",
                token.span,
            )),
        }
    }

    /// Parse a `[ ... ]` quotation.
    fn parse_quotation(&mut self) -> ParseResult<Term> {
        let opener = self.advance().map(|t| t.span).unwrap_or_else(Span::empty);

        let terms = self.parse_terms(&[Token::RBracket])?;

        match self.current() {
            Some(t) if t.token == Token::RBracket => {
                self.pos += 1;
                Ok(Term::Quotation(terms))
            }
            _ => Err(ParseError::UnclosedBracket {
                bracket: '[',
                span: opener,
            }),
        }
    }

    /// Parse a `{ ... }` set literal; members must be integers in [0, 63].
    fn parse_set(&mut self) -> ParseResult<Term> {
        let opener = self.advance().map(|t| t.span).unwrap_or_else(Span::empty);

        let terms = self.parse_terms(&[Token::RBrace])?;

        match self.current() {
            Some(t) if t.token == Token::RBrace => {
                self.pos += 1;
            }
            _ => {
                return Err(ParseError::UnclosedBracket {
                    bracket: '{',
                    span: opener,
                })
            }
        }

        let mut bits: u64 = 0;
        for term in terms {
            match term {
                Term::Integer(n) if (0..=63).contains(&n) => bits |= 1u64 << n,
                Term::Integer(n) => {
                    return Err(ParseError::SetMember {
                        member: n,
                        span: opener,
                    })
                }
                _ => {
                    return Err(ParseError::invalid_syntax(
                        "set members must be integers in range [0, 63]",
                        opener,
                    ))
                }
            }
        }

        Ok(Term::Set(bits))
    }

    /// Parse a `DEFINE`/`LIBRA`/`CONST` block:
    /// `DEFINE name1 == body1; name2 == body2 .`
    fn parse_definition_block(&mut self) -> ParseResult<Vec<Term>> {
        let block_span = self.advance().map(|t| t.span).unwrap_or_else(Span::empty);

        let mut defs = Vec::new();

        loop {
            let Some(token) = self.current() else { break };

            match token.token {
                // Visibility markers are accepted but not enforced.
                Token::KwPublic | Token::KwPrivate => {
                    self.pos += 1;
                    continue;
                }
                Token::KwEnd | Token::Period => {
                    self.pos += 1;
                    break;
                }
                Token::Symbol => {}
                other => {
                    return Err(ParseError::unexpected_token(
                        other.describe(),
                        "a name in definition",
                        token.span,
                    ))
                }
            }

            let name = token.text.to_string();
            self.pos += 1;

            match self.current() {
                Some(t) if t.token == Token::DefOp => {
                    self.pos += 1;
                }
                Some(t) => {
                    return Err(ParseError::unexpected_token(
                        t.token.describe(),
                        "'==' after name in definition",
                        t.span,
                    ))
                }
                None => {
                    return Err(ParseError::unexpected_eof(
                        "'==' after name in definition",
                        block_span,
                    ))
                }
            }

            let body = self.parse_terms(&[Token::Semicolon, Token::Period, Token::KwDefine])?;
            defs.push(Term::Definition(Definition { name, body }));

            match self.current().map(|t| t.token) {
                Some(Token::Semicolon) => {
                    self.pos += 1;
                }
                Some(Token::Period) => {
                    self.pos += 1;
                    break;
                }
                // Another DEFINE block starts; leave it for the caller.
                Some(Token::KwDefine) => break,
                None => break,
                _ => {}
            }
        }

        Ok(defs)
    }

    /// Parse clauses terminated by any of the given tokens; used for both
    /// sections of a HIDE block.
    fn parse_hide_clauses(
        &mut self,
        stop: &[Token],
        body_terminators: &[Token],
        defs: &mut Vec<Term>,
    ) -> Option<Token> {
        loop {
            let Some(token) = self.current() else { return None };

            if stop.contains(&token.token) {
                self.pos += 1;
                return Some(token.token);
            }

            if token.token != Token::Symbol {
                // Skip anything that is not a clause start.
                self.pos += 1;
                continue;
            }

            let name = token.text.to_string();
            self.pos += 1;

            match self.current() {
                Some(t) if t.token == Token::DefOp => {
                    self.pos += 1;
                }
                _ => continue,
            }

            let body = match self.parse_terms(body_terminators) {
                Ok(body) => body,
                Err(_) => continue,
            };
            defs.push(Term::Definition(Definition { name, body }));

            if let Some(t) = self.current() {
                if t.token == Token::Semicolon {
                    self.pos += 1;
                }
            }
        }
    }

    /// Parse a `HIDE ... IN ... END` block. Hidden and public clauses are
    /// both emitted; scoping of the hidden names is not enforced.
    fn parse_hide_block(&mut self) -> ParseResult<Vec<Term>> {
        self.pos += 1; // Consume HIDE

        let mut defs = Vec::new();

        let stopped_at = self.parse_hide_clauses(
            &[Token::KwIn, Token::KwEnd],
            &[Token::Semicolon, Token::KwIn, Token::KwEnd, Token::Period],
            &mut defs,
        );

        if stopped_at == Some(Token::KwIn) {
            self.parse_hide_clauses(
                &[Token::KwEnd],
                &[Token::Semicolon, Token::KwEnd, Token::Period],
                &mut defs,
            );
        }

        // Optional trailing period after END.
        if let Some(t) = self.current() {
            if t.token == Token::Period {
                self.pos += 1;
            }
        }

        Ok(defs)
    }
}

/// Process escape sequences in a string or character body.
fn unescape(s: &str, span: Span) -> ParseResult<String> {
    let mut out = String::with_capacity(s.len());
    let mut iter = s.chars().peekable();

    while let Some(c) = iter.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(e) = iter.next() else {
            out.push('\\');
            break;
        };
        match e {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            '\\' => out.push('\\'),
            '"' => out.push('"'),
            '\'' => out.push('\''),
            '0'..='7' => {
                // Octal escape, up to three digits.
                let mut value = e.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match iter.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            iter.next();
                        }
                        None => break,
                    }
                }
                match char::from_u32(value) {
                    Some(ch) => out.push(ch),
                    None => {
                        return Err(ParseError::InvalidEscape {
                            sequence: format!("\\{value:o}"),
                            span,
                        })
                    }
                }
            }
            other => out.push(other),
        }
    }

    Ok(out)
}

/// Extract the character from a character-literal token text.
fn char_value(text: &str, span: Span) -> ParseResult<char> {
    let mut content = &text[1..];
    if content.len() > 1 && content.ends_with('\'') {
        content = &content[..content.len() - 1];
    }

    let unescaped = unescape(content, span)?;
    let mut chars = unescaped.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(ParseError::InvalidCharacter { span }),
    }
}

/// Parse Joy source code into a program.
pub fn parse(source: &str) -> ParseResult<Program> {
    parse_scanner(Scanner::new(source))
}

/// Parse Joy source code, forwarding shell-escape lines to the host shell.
pub fn parse_with_shell(source: &str) -> ParseResult<Program> {
    parse_scanner(Scanner::with_shell(source))
}

fn parse_scanner(scanner: Scanner<'_>) -> ParseResult<Program> {
    let mut tokens = Vec::new();
    for item in scanner {
        tokens.push(item?);
    }
    Parser::new(tokens).parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_literals() {
        let program = parse("42 -17 3.14 \"hi\" 'a true false").unwrap();
        assert_eq!(
            program.terms,
            vec![
                Term::Integer(42),
                Term::Integer(-17),
                Term::Float(3.14),
                Term::String("hi".into()),
                Term::Char('a'),
                Term::Boolean(true),
                Term::Boolean(false),
            ]
        );
    }

    #[test]
    fn test_parse_quotation_nested() {
        let program = parse("[1 [2 3] dup]").unwrap();
        assert_eq!(
            program.terms,
            vec![Term::Quotation(vec![
                Term::Integer(1),
                Term::Quotation(vec![Term::Integer(2), Term::Integer(3)]),
                Term::Word("dup".into()),
            ])]
        );
    }

    #[test]
    fn test_parse_set_literal() {
        let program = parse("{0 1 5}").unwrap();
        assert_eq!(program.terms, vec![Term::Set(0b100011)]);
    }

    #[test]
    fn test_set_member_out_of_range() {
        let err = parse("{64}").unwrap_err();
        assert!(matches!(err, ParseError::SetMember { member: 64, .. }));
    }

    #[test]
    fn test_set_member_must_be_integer() {
        let err = parse("{1 \"x\"}").unwrap_err();
        assert!(matches!(err, ParseError::InvalidSyntax { .. }));
    }

    #[test]
    fn test_unclosed_quotation() {
        let err = parse("1 [2 3").unwrap_err();
        assert!(matches!(err, ParseError::UnclosedBracket { bracket: '[', .. }));
    }

    #[test]
    fn test_period_is_a_word_in_executable_position() {
        let program = parse("42 .").unwrap();
        assert_eq!(program.terms, vec![Term::Integer(42), Term::Word(".".into())]);
    }

    #[test]
    fn test_parse_simple_definition() {
        let program = parse("DEFINE square == dup * .").unwrap();
        assert_eq!(
            program.terms,
            vec![Term::Definition(Definition {
                name: "square".into(),
                body: vec![Term::Word("dup".into()), Term::Word("*".into())],
            })]
        );
    }

    #[test]
    fn test_parse_multiple_definitions() {
        let program = parse("DEFINE square == dup *; cube == dup dup * * .").unwrap();
        assert_eq!(program.terms.len(), 2);
        assert!(matches!(&program.terms[0], Term::Definition(d) if d.name == "square"));
        assert!(matches!(&program.terms[1], Term::Definition(d) if d.name == "cube"));
    }

    #[test]
    fn test_libra_and_const_are_define() {
        assert_eq!(parse("LIBRA double == 2 * .").unwrap().terms.len(), 1);
        assert_eq!(parse("CONST ten == 10 .").unwrap().terms.len(), 1);
    }

    #[test]
    fn test_definitions_inline_with_program() {
        let program = parse("DEFINE sq == dup * . 5 sq").unwrap();
        assert_eq!(program.terms.len(), 3);
        assert!(matches!(&program.terms[0], Term::Definition(_)));
        assert_eq!(program.terms[1], Term::Integer(5));
        assert_eq!(program.terms[2], Term::Word("sq".into()));
    }

    #[test]
    fn test_redefinition_stays_inline() {
        let program = parse("DEFINE f == 1 . f DEFINE f == 2 . f").unwrap();
        assert_eq!(program.terms.len(), 4);
        assert!(matches!(&program.terms[0], Term::Definition(d) if d.body == vec![Term::Integer(1)]));
        assert_eq!(program.terms[1], Term::Word("f".into()));
        assert!(matches!(&program.terms[2], Term::Definition(d) if d.body == vec![Term::Integer(2)]));
        assert_eq!(program.terms[3], Term::Word("f".into()));
    }

    #[test]
    fn test_empty_definition_body() {
        let program = parse("DEFINE nop == .").unwrap();
        assert!(matches!(&program.terms[0], Term::Definition(d) if d.body.is_empty()));
    }

    #[test]
    fn test_hide_block() {
        let program = parse("HIDE h == 1 IN p == h 2 + END.").unwrap();
        assert_eq!(program.terms.len(), 2);
        assert!(matches!(&program.terms[0], Term::Definition(d) if d.name == "h"));
        assert!(matches!(&program.terms[1], Term::Definition(d) if d.name == "p"));
    }

    #[test]
    fn test_char_escapes() {
        let program = parse(r"'\n '\065 '\t'").unwrap();
        assert_eq!(
            program.terms,
            vec![Term::Char('\n'), Term::Char('5'), Term::Char('\t')]
        );
    }

    #[test]
    fn test_string_escapes() {
        let program = parse(r#""a\tb\n\"q\"""#).unwrap();
        assert_eq!(program.terms, vec![Term::String("a\tb\n\"q\"".into())]);
    }

    #[test]
    fn test_special_float_literals() {
        let program = parse("inf -inf nan").unwrap();
        assert_eq!(program.terms.len(), 3);
        assert!(matches!(program.terms[0], Term::Float(f) if f.is_infinite() && f > 0.0));
        assert!(matches!(program.terms[1], Term::Float(f) if f.is_infinite() && f < 0.0));
        assert!(matches!(program.terms[2], Term::Float(f) if f.is_nan()));
    }

    #[test]
    fn test_comments_are_stripped() {
        let program = parse("1 (* comment *) 2 # rest\n3").unwrap();
        assert_eq!(
            program.terms,
            vec![Term::Integer(1), Term::Integer(2), Term::Integer(3)]
        );
    }
}
