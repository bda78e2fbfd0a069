//! Parse-time expansion of `include "path"`.
//!
//! The C-emitting backend consumes a fully expanded program, so includes
//! are resolved before lowering: the included file is parsed and its terms
//! spliced in at the include site. A path already being expanded is
//! silently skipped, which breaks include cycles.

use std::path::{Path, PathBuf};

use rjoy_parser::cst::{Program, Term};

use crate::error::{EvalResult, JoyError};

/// Expand `"path" include` occurrences in source text. Relative paths
/// resolve against `base_dir` first, then the current directory.
pub fn expand_source(source: &str, base_dir: Option<&Path>) -> EvalResult<Program> {
    let program = rjoy_parser::parse(source)?;
    let mut stack = Vec::new();
    expand_program(program, base_dir, &mut stack)
}

/// Expand a file, tracking the include stack for cycle detection.
pub fn expand_file(path: &Path) -> EvalResult<Program> {
    let mut stack = Vec::new();
    expand_one_file(path, &mut stack)
}

fn expand_one_file(path: &Path, stack: &mut Vec<PathBuf>) -> EvalResult<Program> {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    if stack.contains(&canonical) {
        // Cycle: the second entry expands to nothing.
        return Ok(Program::default());
    }

    let source = std::fs::read_to_string(path).map_err(|e| JoyError::Include {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let program = rjoy_parser::parse(&source)?;

    stack.push(canonical);
    let expanded = expand_program(program, path.parent(), stack);
    stack.pop();
    expanded
}

fn resolve(path: &str, base_dir: Option<&Path>) -> Option<PathBuf> {
    let p = Path::new(path);
    if p.is_absolute() {
        return p.exists().then(|| p.to_path_buf());
    }
    if let Some(base) = base_dir {
        let joined = base.join(p);
        if joined.exists() {
            return Some(joined);
        }
    }
    p.exists().then(|| p.to_path_buf())
}

fn expand_program(
    program: Program,
    base_dir: Option<&Path>,
    stack: &mut Vec<PathBuf>,
) -> EvalResult<Program> {
    let mut out = Vec::with_capacity(program.terms.len());
    let mut terms = program.terms.into_iter().peekable();

    while let Some(term) = terms.next() {
        let is_include_site = matches!(&term, Term::String(_))
            && matches!(terms.peek(), Some(Term::Word(w)) if w == "include");

        if is_include_site {
            let Term::String(path) = &term else { unreachable!() };
            let Some(resolved) = resolve(path, base_dir) else {
                return Err(JoyError::Include {
                    path: path.clone(),
                    reason: "file not found".to_string(),
                });
            };
            terms.next(); // consume the include word
            let included = expand_one_file(&resolved, stack)?;
            out.extend(included.terms);
            continue;
        }

        out.push(term);
    }

    Ok(Program::new(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_inlines_included_terms() {
        let dir = tempfile::tempdir().unwrap();
        let lib = dir.path().join("lib.joy");
        std::fs::write(&lib, "DEFINE sq == dup * .").unwrap();

        let source = format!("1 \"{}\" include 2", lib.display());
        let program = expand_source(&source, None).unwrap();

        assert_eq!(program.terms.len(), 3);
        assert_eq!(program.terms[0], Term::Integer(1));
        assert!(matches!(&program.terms[1], Term::Definition(d) if d.name == "sq"));
        assert_eq!(program.terms[2], Term::Integer(2));
    }

    #[test]
    fn test_expand_resolves_relative_to_including_file() {
        let dir = tempfile::tempdir().unwrap();
        let inner = dir.path().join("inner.joy");
        let outer = dir.path().join("outer.joy");
        std::fs::write(&inner, "42").unwrap();
        std::fs::write(&outer, "\"inner.joy\" include").unwrap();

        let program = expand_file(&outer).unwrap();
        assert_eq!(program.terms, vec![Term::Integer(42)]);
    }

    #[test]
    fn test_include_cycle_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.joy");
        let b = dir.path().join("b.joy");
        std::fs::write(&a, format!("1 \"{}\" include", b.display())).unwrap();
        std::fs::write(&b, format!("2 \"{}\" include", a.display())).unwrap();

        let program = expand_file(&a).unwrap();
        // a pulls in b; b's reference back to a expands to nothing.
        assert_eq!(program.terms, vec![Term::Integer(1), Term::Integer(2)]);
    }

    #[test]
    fn test_missing_include_errors() {
        let err = expand_source("\"nope.joy\" include", None).unwrap_err();
        assert!(matches!(err, JoyError::Include { .. }));
    }
}
