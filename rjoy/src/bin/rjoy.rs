//! Joy interpreter command-line interface.
//!
//! Usage:
//!   rjoy                 # Start interactive REPL
//!   rjoy file.joy        # Execute a Joy source file
//!   rjoy run file.joy    # Same, spelled out
//!   rjoy -e "1 2 + ."    # Evaluate a string and print the stack

use std::borrow::Cow;
use std::process::ExitCode;

use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Config, Context, Editor, Helper};

use rjoy::error::JoyError;
use rjoy::eval::Evaluator;
use rjoy::repl::ReplSession;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const BANNER: &str = "rjoy - Joy Programming Language Interpreter
Type 'quit' to exit, '.help' for commands.
";

const REPL_HELP: &str = "Commands:
  quit, exit   Exit the REPL
  .s, .stack   Show the stack
  .c, .clear   Clear the stack
  .w, .words   List available words
  .h, .help    Show this help
";

// ANSI colors for the line highlighter
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const STRING: &str = "\x1b[38;5;186m"; // yellow
    pub const NUMBER: &str = "\x1b[38;5;141m"; // purple
    pub const COMMENT: &str = "\x1b[38;5;243m"; // gray
    pub const BRACKET: &str = "\x1b[38;5;81m"; // cyan
    pub const KEYWORD: &str = "\x1b[38;5;204m"; // pink
    pub const PROMPT: &str = "\x1b[32m"; // green
}

const KEYWORDS: &[&str] = &[
    "DEFINE", "LIBRA", "CONST", "HIDE", "IN", "END", "MODULE", "PUBLIC", "PRIVATE", "true",
    "false",
];

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("-v") | Some("--version") => {
            println!("rjoy {}", VERSION);
            ExitCode::SUCCESS
        }
        Some("-e") | Some("--eval") => match args.get(2) {
            Some(expr) => execute_expression(expr),
            None => {
                eprintln!("Error: -e requires an expression");
                ExitCode::FAILURE
            }
        },
        Some("run") => match args.get(2) {
            Some(file) => execute_file(file),
            None => {
                eprintln!("Error: run requires a file");
                ExitCode::FAILURE
            }
        },
        Some(file) => execute_file(file),
        None => run_repl(),
    }
}

/// Evaluate an expression and print the final stack, bottom to top.
fn execute_expression(expr: &str) -> ExitCode {
    let mut eval = Evaluator::new();
    match eval.run(expr) {
        Ok(()) => {
            for item in eval.stack.items() {
                println!("{}", item);
            }
            ExitCode::SUCCESS
        }
        Err(e) => report(e),
    }
}

fn execute_file(path: &str) -> ExitCode {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: cannot read {}: {}", path, e);
            return ExitCode::FAILURE;
        }
    };

    let mut eval = Evaluator::new();
    match eval.run(&source) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(e),
    }
}

fn report(error: JoyError) -> ExitCode {
    match error {
        JoyError::Exit(code) => ExitCode::from(code.clamp(0, 255) as u8),
        other => {
            eprintln!("Error: {}", other);
            ExitCode::FAILURE
        }
    }
}

// ---------------------------------------------------------------------------
// Line editing: completion, validation, highlighting
// ---------------------------------------------------------------------------

/// True when the input still has an open quotation, set, string or
/// comment, so the editor should keep reading lines.
fn is_incomplete(input: &str) -> bool {
    let mut depth: i64 = 0;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '[' | '{' => depth += 1,
            ']' | '}' => depth -= 1,
            '"' => {
                // String: scan to the closing quote.
                loop {
                    match chars.next() {
                        Some('\\') => {
                            chars.next();
                        }
                        Some('"') => break,
                        Some(_) => {}
                        None => return true,
                    }
                }
            }
            '#' => {
                // Line comment.
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '(' if chars.peek() == Some(&'*') => {
                chars.next();
                // Block comment: scan for *).
                let mut prev = ' ';
                loop {
                    match chars.next() {
                        Some(')') if prev == '*' => break,
                        Some(c) => prev = c,
                        None => return true,
                    }
                }
            }
            _ => {}
        }
    }

    depth > 0
}

struct JoyHighlighter;

impl JoyHighlighter {
    fn highlight_line(&self, line: &str) -> String {
        let mut result = String::with_capacity(line.len() * 2);
        let chars: Vec<char> = line.chars().collect();
        let len = chars.len();
        let mut i = 0;

        while i < len {
            // (* ... *) comment
            if i + 1 < len && chars[i] == '(' && chars[i + 1] == '*' {
                result.push_str(colors::COMMENT);
                result.push_str("(*");
                i += 2;
                while i < len && !(chars[i] == '*' && i + 1 < len && chars[i + 1] == ')') {
                    result.push(chars[i]);
                    i += 1;
                }
                if i + 1 < len {
                    result.push_str("*)");
                    i += 2;
                }
                result.push_str(colors::RESET);
                continue;
            }

            // Line comment
            if chars[i] == '#' {
                result.push_str(colors::COMMENT);
                while i < len && chars[i] != '\n' {
                    result.push(chars[i]);
                    i += 1;
                }
                result.push_str(colors::RESET);
                continue;
            }

            // String
            if chars[i] == '"' {
                result.push_str(colors::STRING);
                result.push(chars[i]);
                i += 1;
                while i < len && chars[i] != '"' {
                    if chars[i] == '\\' && i + 1 < len {
                        result.push(chars[i]);
                        result.push(chars[i + 1]);
                        i += 2;
                    } else {
                        result.push(chars[i]);
                        i += 1;
                    }
                }
                if i < len {
                    result.push(chars[i]);
                    i += 1;
                }
                result.push_str(colors::RESET);
                continue;
            }

            // Number
            if chars[i].is_ascii_digit()
                || (chars[i] == '-' && i + 1 < len && chars[i + 1].is_ascii_digit())
            {
                result.push_str(colors::NUMBER);
                if chars[i] == '-' {
                    result.push(chars[i]);
                    i += 1;
                }
                while i < len
                    && (chars[i].is_ascii_digit()
                        || chars[i] == '.'
                        || chars[i] == 'e'
                        || chars[i] == 'E')
                {
                    result.push(chars[i]);
                    i += 1;
                }
                result.push_str(colors::RESET);
                continue;
            }

            // Brackets and braces
            if matches!(chars[i], '[' | ']' | '{' | '}') {
                result.push_str(colors::BRACKET);
                result.push(chars[i]);
                result.push_str(colors::RESET);
                i += 1;
                continue;
            }

            // Identifier; keywords get their own color
            if chars[i].is_alphabetic() || chars[i] == '_' {
                let start = i;
                while i < len
                    && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '-')
                {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                if KEYWORDS.contains(&word.as_str()) {
                    result.push_str(colors::KEYWORD);
                    result.push_str(&word);
                    result.push_str(colors::RESET);
                } else {
                    result.push_str(&word);
                }
                continue;
            }

            result.push(chars[i]);
            i += 1;
        }

        result
    }
}

impl Highlighter for JoyHighlighter {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Owned(self.highlight_line(line))
    }

    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        _default: bool,
    ) -> Cow<'b, str> {
        if prompt.contains("joy>") {
            Cow::Owned(format!("{}joy>{} ", colors::PROMPT, colors::RESET))
        } else {
            Cow::Borrowed(prompt)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true
    }
}

struct JoyHelper {
    highlighter: JoyHighlighter,
}

impl JoyHelper {
    fn new() -> Self {
        Self {
            highlighter: JoyHighlighter,
        }
    }
}

impl Helper for JoyHelper {}

impl Completer for JoyHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let before_cursor = &line[..pos];

        // Complete the word being typed against the registry.
        let word_start = before_cursor
            .rfind(|c: char| c.is_whitespace() || matches!(c, '[' | ']' | '{' | '}'))
            .map(|i| i + 1)
            .unwrap_or(0);
        let prefix = &before_cursor[word_start..];

        if prefix.is_empty() {
            return Ok((pos, Vec::new()));
        }

        let pairs: Vec<Pair> = rjoy::registry::REGISTRY
            .names()
            .iter()
            .filter(|name| name.starts_with(prefix))
            .map(|name| Pair {
                display: name.to_string(),
                replacement: name.to_string(),
            })
            .collect();

        Ok((word_start, pairs))
    }
}

impl Hinter for JoyHelper {
    type Hint = String;
}

impl Validator for JoyHelper {
    fn validate(&self, ctx: &mut ValidationContext<'_>) -> rustyline::Result<ValidationResult> {
        let input = ctx.input();

        if input.trim().is_empty() {
            return Ok(ValidationResult::Valid(None));
        }

        if is_incomplete(input) {
            Ok(ValidationResult::Incomplete)
        } else {
            Ok(ValidationResult::Valid(None))
        }
    }
}

impl Highlighter for JoyHelper {
    fn highlight<'l>(&self, line: &'l str, pos: usize) -> Cow<'l, str> {
        self.highlighter.highlight(line, pos)
    }

    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        default: bool,
    ) -> Cow<'b, str> {
        self.highlighter.highlight_prompt(prompt, default)
    }

    fn highlight_char(&self, line: &str, pos: usize, kind: CmdKind) -> bool {
        self.highlighter.highlight_char(line, pos, kind)
    }
}

// ---------------------------------------------------------------------------
// REPL loop
// ---------------------------------------------------------------------------

fn run_repl() -> ExitCode {
    let config = Config::builder().bracketed_paste(true).build();
    let mut rl: Editor<JoyHelper, DefaultHistory> = match Editor::with_config(config) {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("Error: cannot start line editor: {}", e);
            return ExitCode::FAILURE;
        }
    };
    rl.set_helper(Some(JoyHelper::new()));

    println!("{}", BANNER);
    let mut session = ReplSession::new();

    loop {
        let line = match rl.readline("joy> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("Interrupted. Type 'quit' to exit.");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Error: {}", e);
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(line);

        match line {
            "quit" | "exit" => break,
            ".s" | ".stack" => {
                println!("{}", session.stack_display());
                continue;
            }
            ".c" | ".clear" => {
                session.clear_stack();
                continue;
            }
            ".w" | ".words" => {
                println!("{}", session.words().join(" "));
                continue;
            }
            ".h" | ".help" => {
                println!("{}", REPL_HELP);
                continue;
            }
            _ => {}
        }

        match session.eval_line(line) {
            Ok(result) => {
                print!("{}", result.output);
                if !result.stack.is_empty() {
                    println!("{}", result.stack);
                }
            }
            Err(JoyError::Exit(code)) => {
                return ExitCode::from(code.clamp(0, 255) as u8);
            }
            Err(e) => {
                eprintln!("Error: {}", e);
            }
        }
    }

    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::is_incomplete;

    #[test]
    fn test_complete_lines() {
        assert!(!is_incomplete("1 2 +"));
        assert!(!is_incomplete("[dup *] i"));
        assert!(!is_incomplete("\"a [ b\" putchars"));
        assert!(!is_incomplete("1 # trailing [ comment"));
    }

    #[test]
    fn test_incomplete_lines() {
        assert!(is_incomplete("[1 2"));
        assert!(is_incomplete("{1 2"));
        assert!(is_incomplete("[[1] [2]"));
        assert!(is_incomplete("\"unterminated"));
        assert!(is_incomplete("(* open comment"));
    }
}
