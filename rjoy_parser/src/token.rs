//! Token definitions for the Joy lexer
//!
//! Follows the lexical surface of Joy: bracket/brace delimiters, the `==`
//! definition operator, reserved definition keywords, and the three literal
//! shapes (numbers, strings, characters). Symbols are either identifiers or
//! operator runs.

use logos::Logos;

/// Joy tokens
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")] // Whitespace only separates tokens
pub enum Token {
    // ==================== Keywords ====================
    // DEFINE, LIBRA and CONST all open a definition block.
    #[token("DEFINE")]
    #[token("LIBRA")]
    #[token("CONST")]
    KwDefine,
    #[token("HIDE")]
    KwHide,
    #[token("IN")]
    KwIn,
    #[token("END")]
    KwEnd,
    #[token("MODULE")]
    KwModule,
    #[token("PUBLIC")]
    KwPublic,
    #[token("PRIVATE")]
    KwPrivate,

    // ==================== Delimiters ====================
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,

    // ==================== Punctuation ====================
    #[token(";")]
    Semicolon,
    #[token(".")]
    Period,
    // The definition operator outranks the operator-run regex so that a
    // bare `==` never lexes as a symbol. `===` and longer runs still win
    // by length and stay symbols.
    #[token("==", priority = 10)]
    DefOp,

    // ==================== Literals ====================
    #[regex(r"-?[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?", priority = 6)]
    Float,
    #[regex(r"-?[0-9]+", priority = 5)]
    Integer,
    #[regex(r#""(?:[^"\\]|\\.)*""#)]
    Str,
    // Character literal: the closing apostrophe is optional, octal escapes
    // accepted. `' '` needs its own pattern since the open form excludes
    // whitespace.
    #[regex(r"'(?:\\[0-7]{1,3}|\\.|[^\s'])'?")]
    #[token("' '")]
    CharLit,

    // ==================== Symbols ====================
    // Identifier, identifier with a leading minus (e.g. `-foo`), or an
    // operator run. The operator run sits at the lowest priority so every
    // more specific pattern wins ties.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_\-]*")]
    #[regex(r"-[a-zA-Z_][a-zA-Z0-9_\-]*")]
    #[regex(r"[+\-*/<=>&|?@#%^~:!]+", priority = 1)]
    Symbol,

    // ==================== Trivia ====================
    // `(* ... *)` — the scanner wrapper consumes to the matching `*)`.
    #[token("(*")]
    CommentStart,
    #[regex(r"#[^\n]*", priority = 4)]
    LineComment,
    // A `$`-run to end of line; only honored as a shell escape when it
    // starts a line, see the scanner.
    #[regex(r"\$[^\n]*", priority = 4)]
    ShellEscape,
}

impl Token {
    /// Human-readable name used in diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            Token::KwDefine => "DEFINE",
            Token::KwHide => "HIDE",
            Token::KwIn => "IN",
            Token::KwEnd => "END",
            Token::KwModule => "MODULE",
            Token::KwPublic => "PUBLIC",
            Token::KwPrivate => "PRIVATE",
            Token::LBracket => "'['",
            Token::RBracket => "']'",
            Token::LBrace => "'{'",
            Token::RBrace => "'}'",
            Token::Semicolon => "';'",
            Token::Period => "'.'",
            Token::DefOp => "'=='",
            Token::Float => "float",
            Token::Integer => "integer",
            Token::Str => "string",
            Token::CharLit => "character",
            Token::Symbol => "symbol",
            Token::CommentStart => "comment",
            Token::LineComment => "comment",
            Token::ShellEscape => "shell escape",
        }
    }
}
