//! Input/output words: the print family, terminal input, and the file
//! handle primitives.
//!
//! File words follow C stdio conventions: a failed `fopen` pushes the null
//! file, stream-keeping words (`fgetch`, `fgets`, `ftell`, ...) leave the
//! stream on the stack under their result, and `fseek` pushes a Boolean
//! failure flag (false means success).

use std::io::{BufRead, Read, Seek, SeekFrom, Write};

use crate::error::{EvalResult, JoyError};
use crate::program::term_to_value;
use crate::registry::{Primitive, Registry};
use crate::value::{FileHandle, FileStream, Value};

use super::{aggregate_values, Evaluator};

pub(crate) fn install(reg: &mut Registry) {
    let words: &[(&str, usize, &str, fn(&mut Evaluator) -> EvalResult<()>)] = &[
        (".", 0, "X  ->", dot),
        ("put", 1, "X  ->", put),
        ("putln", 1, "X  ->", putln),
        ("putch", 1, "N  ->", putch),
        ("putchars", 1, "\"abc..\"  ->", putchars),
        ("newline", 0, "->", newline),
        ("get", 0, "->  F", get),
        ("getch", 0, "->  C", getch),
        ("getline", 0, "->  \"abc..\"", getline),
        ("stdin", 0, "->  S", stdin_word),
        ("stdout", 0, "->  S", stdout_word),
        ("stderr", 0, "->  S", stderr_word),
        ("fopen", 2, "P M  ->  S", fopen),
        ("fclose", 1, "S  ->", fclose),
        ("fread", 2, "S I  ->  S L", fread),
        ("fwrite", 2, "S L  ->  S", fwrite),
        ("fflush", 1, "S  ->  S", fflush),
        ("feof", 1, "S  ->  S B", feof),
        ("ferror", 1, "S  ->  S B", ferror),
        ("ftell", 1, "S  ->  S I", ftell),
        ("fseek", 3, "S P W  ->  S B", fseek),
        ("fgetch", 1, "S  ->  S C", fgetch),
        ("fputch", 2, "S C  ->  S", fputch),
        ("fgets", 1, "S  ->  S \"line\"", fgets),
        ("fputchars", 2, "S \"abc..\"  ->  S", fputchars),
        ("fputstring", 2, "S \"abc..\"  ->  S", fputstring),
        ("fput", 2, "S X  ->  S", fput),
        ("fremove", 1, "P  ->  B", fremove),
        ("frename", 2, "P1 P2  ->  B", frename),
        ("filetime", 1, "F  ->  T", filetime),
        ("finclude", 1, "P  ->", finclude),
    ];
    for &(name, arity, sig, run) in words {
        reg.register(Primitive { name, arity, sig, run });
    }
}

fn expect_file(value: &Value, op: &str) -> EvalResult<FileHandle> {
    match value {
        Value::File(h) => {
            if h.is_null() {
                Err(JoyError::type_error(op, "open FILE", "NULL file"))
            } else {
                Ok(h.clone())
            }
        }
        other => Err(JoyError::type_error(op, "FILE", other.kind_name())),
    }
}

/// Write text to a file handle; stdout routes through the evaluator's
/// output sink so captures see it.
fn stream_write(eval: &mut Evaluator, handle: &FileHandle, op: &str, data: &str) -> EvalResult<()> {
    let Some(rc) = handle.stream() else {
        return Err(JoyError::type_error(op, "open FILE", "NULL file"));
    };
    let rc = rc.clone();
    let mut stream = rc.borrow_mut();
    match &mut *stream {
        FileStream::Stdout => {
            drop(stream);
            eval.write_str(data);
            Ok(())
        }
        FileStream::Stderr => {
            let mut err = std::io::stderr();
            let _ = err.write_all(data.as_bytes());
            Ok(())
        }
        FileStream::Disk { file, .. } => {
            file.write_all(data.as_bytes())
                .map_err(|e| JoyError::Internal(format!("{}: {}", op, e)))
        }
        FileStream::Stdin => Err(JoyError::type_error(op, "writable FILE", "stdin")),
        FileStream::Closed => Err(JoyError::type_error(op, "open FILE", "closed file")),
    }
}

/// Read up to `n` bytes from a file handle.
fn stream_read(handle: &FileHandle, op: &str, n: usize) -> EvalResult<Vec<u8>> {
    let Some(rc) = handle.stream() else {
        return Err(JoyError::type_error(op, "open FILE", "NULL file"));
    };
    let mut stream = rc.borrow_mut();
    let mut buf = vec![0u8; n];
    let read = match &mut *stream {
        FileStream::Stdin => std::io::stdin()
            .read(&mut buf)
            .map_err(|e| JoyError::Internal(format!("{}: {}", op, e)))?,
        FileStream::Disk { file, .. } => file
            .read(&mut buf)
            .map_err(|e| JoyError::Internal(format!("{}: {}", op, e)))?,
        FileStream::Closed => {
            return Err(JoyError::type_error(op, "open FILE", "closed file"))
        }
        _ => return Err(JoyError::type_error(op, "readable FILE", "output stream")),
    };
    buf.truncate(read);
    Ok(buf)
}

/// Read one line (including the newline) from a file handle.
fn stream_read_line(handle: &FileHandle, op: &str) -> EvalResult<String> {
    let Some(rc) = handle.stream() else {
        return Err(JoyError::type_error(op, "open FILE", "NULL file"));
    };
    let mut stream = rc.borrow_mut();
    match &mut *stream {
        FileStream::Stdin => {
            let mut line = String::new();
            std::io::stdin()
                .lock()
                .read_line(&mut line)
                .map_err(|e| JoyError::Internal(format!("{}: {}", op, e)))?;
            Ok(line)
        }
        FileStream::Disk { file, .. } => {
            // Byte-at-a-time keeps the underlying position honest for a
            // later ftell/fseek.
            let mut bytes = Vec::new();
            let mut byte = [0u8; 1];
            loop {
                match file.read(&mut byte) {
                    Ok(0) => break,
                    Ok(_) => {
                        bytes.push(byte[0]);
                        if byte[0] == b'\n' {
                            break;
                        }
                    }
                    Err(e) => return Err(JoyError::Internal(format!("{}: {}", op, e))),
                }
            }
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
        FileStream::Closed => Err(JoyError::type_error(op, "open FILE", "closed file")),
        _ => Err(JoyError::type_error(op, "readable FILE", "output stream")),
    }
}

// -------------------------------------------------------------------------
// Output
// -------------------------------------------------------------------------

/// The print word: pop and print the top of stack. No-op on an empty
/// stack.
fn dot(eval: &mut Evaluator) -> EvalResult<()> {
    if eval.stack.depth() > 0 {
        let x = eval.stack.pop(".")?;
        eval.writeln_str(&x.to_string());
    }
    Ok(())
}

fn put(eval: &mut Evaluator) -> EvalResult<()> {
    let x = eval.stack.pop("put")?;
    eval.write_str(&x.to_string());
    Ok(())
}

fn putln(eval: &mut Evaluator) -> EvalResult<()> {
    let x = eval.stack.pop("putln")?;
    eval.writeln_str(&x.to_string());
    Ok(())
}

/// Write the character with ordinal N (or a Char directly).
fn putch(eval: &mut Evaluator) -> EvalResult<()> {
    let n = eval.stack.pop("putch")?;
    let c = match &n {
        Value::Integer(code) => char::from_u32(*code as u32).unwrap_or('\u{fffd}'),
        Value::Char(c) => *c,
        other => {
            return Err(JoyError::type_error(
                "putch",
                "INTEGER or CHAR",
                other.kind_name(),
            ))
        }
    };
    eval.write_str(&c.to_string());
    Ok(())
}

/// Write a string without its quotes.
fn putchars(eval: &mut Evaluator) -> EvalResult<()> {
    let s = eval.stack.pop("putchars")?;
    let text = s.as_str("putchars")?.to_string();
    eval.write_str(&text);
    Ok(())
}

fn newline(eval: &mut Evaluator) -> EvalResult<()> {
    eval.write_str("\n");
    Ok(())
}

// -------------------------------------------------------------------------
// Input
// -------------------------------------------------------------------------

/// Read a line and push each parsed factor.
fn get(eval: &mut Evaluator) -> EvalResult<()> {
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| JoyError::Internal(format!("get: {}", e)))?;
    let program = rjoy_parser::parse(line.trim_end_matches('\n'))?;
    let terms = crate::program::lower_program(&program);
    for term in &terms {
        eval.stack.push(term_to_value(term));
    }
    Ok(())
}

fn getch(eval: &mut Evaluator) -> EvalResult<()> {
    let mut buf = [0u8; 1];
    let read = std::io::stdin()
        .read(&mut buf)
        .map_err(|e| JoyError::Internal(format!("getch: {}", e)))?;
    if read == 0 {
        eval.stack.push(Value::Integer(-1));
    } else {
        eval.stack.push(Value::Char(buf[0] as char));
    }
    Ok(())
}

fn getline(eval: &mut Evaluator) -> EvalResult<()> {
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| JoyError::Internal(format!("getline: {}", e)))?;
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    eval.stack.push(Value::string(line));
    Ok(())
}

// -------------------------------------------------------------------------
// Standard streams
// -------------------------------------------------------------------------

fn stdin_word(eval: &mut Evaluator) -> EvalResult<()> {
    eval.stack.push(Value::File(FileHandle::stdin()));
    Ok(())
}

fn stdout_word(eval: &mut Evaluator) -> EvalResult<()> {
    eval.stack.push(Value::File(FileHandle::stdout()));
    Ok(())
}

fn stderr_word(eval: &mut Evaluator) -> EvalResult<()> {
    eval.stack.push(Value::File(FileHandle::stderr()));
    Ok(())
}

// -------------------------------------------------------------------------
// File operations
// -------------------------------------------------------------------------

/// Open pathname P in mode M; pushes the null file on failure.
fn fopen(eval: &mut Evaluator) -> EvalResult<()> {
    let (mode, path) = eval.stack.pop2("fopen")?;
    let path = path.as_str("fopen")?.to_string();
    let mode = mode.as_str("fopen")?.to_string();

    let mut options = std::fs::OpenOptions::new();
    match mode.trim_end_matches('b') {
        "r" => options.read(true),
        "r+" => options.read(true).write(true),
        "w" => options.write(true).create(true).truncate(true),
        "w+" => options.read(true).write(true).create(true).truncate(true),
        "a" => options.append(true).create(true),
        "a+" => options.read(true).append(true).create(true),
        _ => options.read(true),
    };

    match options.open(&path) {
        Ok(file) => eval.stack.push(Value::File(FileHandle::disk(file, path))),
        Err(_) => eval.stack.push(Value::File(FileHandle::null())),
    }
    Ok(())
}

/// Close a stream; closing a standard stream is a no-op.
fn fclose(eval: &mut Evaluator) -> EvalResult<()> {
    let s = eval.stack.pop("fclose")?;
    let handle = expect_file(&s, "fclose")?;
    if let Some(rc) = handle.stream() {
        let mut stream = rc.borrow_mut();
        if matches!(&*stream, FileStream::Disk { .. }) {
            *stream = FileStream::Closed;
        }
    }
    Ok(())
}

/// Read I bytes; pushes the stream back, then the bytes as a list of
/// integers.
fn fread(eval: &mut Evaluator) -> EvalResult<()> {
    let (count, stream) = eval.stack.pop2("fread")?;
    let handle = expect_file(&stream, "fread")?;
    let n = count.as_integer("fread")?.max(0) as usize;

    let bytes = stream_read(&handle, "fread", n)?;
    let items = bytes.into_iter().map(|b| Value::Integer(b as i64)).collect();
    eval.stack.push(stream);
    eval.stack.push(Value::list(items));
    Ok(())
}

/// Write a list of integers as bytes.
fn fwrite(eval: &mut Evaluator) -> EvalResult<()> {
    let (lst, stream) = eval.stack.pop2("fwrite")?;
    let handle = expect_file(&stream, "fwrite")?;
    if !lst.is_sequence() {
        return Err(JoyError::type_error("fwrite", "LIST", lst.kind_name()));
    }

    let mut data = String::new();
    for item in aggregate_values(&lst, "fwrite")? {
        match item {
            Value::Integer(n) => data.push((n & 0xFF) as u8 as char),
            Value::Char(c) => data.push(c),
            _ => {}
        }
    }
    stream_write(eval, &handle, "fwrite", &data)?;
    eval.stack.push(stream);
    Ok(())
}

fn fflush(eval: &mut Evaluator) -> EvalResult<()> {
    let stream = eval.stack.peek(0, "fflush")?.clone();
    let handle = expect_file(&stream, "fflush")?;
    if let Some(rc) = handle.stream() {
        if let FileStream::Disk { file, .. } = &mut *rc.borrow_mut() {
            let _ = file.flush();
        }
    }
    Ok(())
}

/// Test for end of file; leaves the stream, pushes the flag.
fn feof(eval: &mut Evaluator) -> EvalResult<()> {
    let stream = eval.stack.peek(0, "feof")?.clone();
    let handle = expect_file(&stream, "feof")?;

    let at_eof = match handle.stream() {
        Some(rc) => {
            let mut guard = rc.borrow_mut();
            match &mut *guard {
                FileStream::Disk { file, .. } => {
                    let pos = file.stream_position().unwrap_or(0);
                    let mut byte = [0u8; 1];
                    let read = file.read(&mut byte).unwrap_or(0);
                    if read > 0 {
                        let _ = file.seek(SeekFrom::Start(pos));
                    }
                    read == 0
                }
                FileStream::Closed => true,
                _ => false,
            }
        }
        None => true,
    };

    eval.stack.push(Value::Boolean(at_eof));
    Ok(())
}

/// Stream error flag; always false here.
fn ferror(eval: &mut Evaluator) -> EvalResult<()> {
    let stream = eval.stack.peek(0, "ferror")?.clone();
    expect_file(&stream, "ferror")?;
    eval.stack.push(Value::Boolean(false));
    Ok(())
}

fn ftell(eval: &mut Evaluator) -> EvalResult<()> {
    let stream = eval.stack.peek(0, "ftell")?.clone();
    let handle = expect_file(&stream, "ftell")?;

    let pos = match handle.stream() {
        Some(rc) => match &mut *rc.borrow_mut() {
            FileStream::Disk { file, .. } => file.stream_position().unwrap_or(0) as i64,
            _ => 0,
        },
        None => 0,
    };

    eval.stack.push(Value::Integer(pos));
    Ok(())
}

/// Seek to position P with whence W (0 = start, 1 = current, 2 = end);
/// keeps the stream and pushes a failure flag (false on success).
fn fseek(eval: &mut Evaluator) -> EvalResult<()> {
    let (whence, pos) = eval.stack.pop2("fseek")?;
    let stream = eval.stack.peek(0, "fseek")?.clone();
    let handle = expect_file(&stream, "fseek")?;
    let pos = pos.as_integer("fseek")?;
    let whence = whence.as_integer("fseek")?;

    let target = match whence {
        0 => SeekFrom::Start(pos.max(0) as u64),
        1 => SeekFrom::Current(pos),
        2 => SeekFrom::End(pos),
        _ => SeekFrom::Start(pos.max(0) as u64),
    };

    let failed = match handle.stream() {
        Some(rc) => match &mut *rc.borrow_mut() {
            FileStream::Disk { file, .. } => file.seek(target).is_err(),
            _ => true,
        },
        None => true,
    };

    eval.stack.push(Value::Boolean(failed));
    Ok(())
}

/// Read one character; leaves the stream, pushes the char (or -1 at EOF).
fn fgetch(eval: &mut Evaluator) -> EvalResult<()> {
    let stream = eval.stack.peek(0, "fgetch")?.clone();
    let handle = expect_file(&stream, "fgetch")?;

    let bytes = stream_read(&handle, "fgetch", 1)?;
    match bytes.first() {
        Some(b) => eval.stack.push(Value::Char(*b as char)),
        None => eval.stack.push(Value::Integer(-1)),
    }
    Ok(())
}

fn fputch(eval: &mut Evaluator) -> EvalResult<()> {
    let (ch, stream) = eval.stack.pop2("fputch")?;
    let handle = expect_file(&stream, "fputch")?;

    let c = match &ch {
        Value::Integer(n) => char::from_u32(*n as u32).unwrap_or('\u{fffd}'),
        Value::Char(c) => *c,
        other => {
            return Err(JoyError::type_error(
                "fputch",
                "INTEGER or CHAR",
                other.kind_name(),
            ))
        }
    };
    stream_write(eval, &handle, "fputch", &c.to_string())?;
    eval.stack.push(stream);
    Ok(())
}

/// Read one line; leaves the stream, pushes the line (with newline).
fn fgets(eval: &mut Evaluator) -> EvalResult<()> {
    let stream = eval.stack.peek(0, "fgets")?.clone();
    let handle = expect_file(&stream, "fgets")?;
    let line = stream_read_line(&handle, "fgets")?;
    eval.stack.push(Value::string(line));
    Ok(())
}

/// Write a string or a list of chars/ordinals.
fn fputchars(eval: &mut Evaluator) -> EvalResult<()> {
    let (agg, stream) = eval.stack.pop2("fputchars")?;
    let handle = expect_file(&stream, "fputchars")?;

    let data = match &agg {
        Value::String(s) => s.to_string(),
        Value::List(_) | Value::Quotation(_) => {
            let mut out = String::new();
            for item in aggregate_values(&agg, "fputchars")? {
                match item {
                    Value::Char(c) => out.push(c),
                    Value::Integer(n) => {
                        out.push(char::from_u32(n as u32).unwrap_or('\u{fffd}'))
                    }
                    _ => {}
                }
            }
            out
        }
        other => {
            return Err(JoyError::type_error(
                "fputchars",
                "STRING or LIST",
                other.kind_name(),
            ))
        }
    };

    stream_write(eval, &handle, "fputchars", &data)?;
    eval.stack.push(stream);
    Ok(())
}

fn fputstring(eval: &mut Evaluator) -> EvalResult<()> {
    let (s, stream) = eval.stack.pop2("fputstring")?;
    let handle = expect_file(&stream, "fputstring")?;
    let data = s.as_str("fputstring")?.to_string();
    stream_write(eval, &handle, "fputstring", &data)?;
    eval.stack.push(stream);
    Ok(())
}

/// Write any value's printed form.
fn fput(eval: &mut Evaluator) -> EvalResult<()> {
    let (x, stream) = eval.stack.pop2("fput")?;
    let handle = expect_file(&stream, "fput")?;
    stream_write(eval, &handle, "fput", &x.to_string())?;
    eval.stack.push(stream);
    Ok(())
}

// -------------------------------------------------------------------------
// Paths
// -------------------------------------------------------------------------

fn fremove(eval: &mut Evaluator) -> EvalResult<()> {
    let path = eval.stack.pop("fremove")?;
    let path = path.as_str("fremove")?;
    let ok = std::fs::remove_file(path).is_ok();
    eval.stack.push(Value::Boolean(ok));
    Ok(())
}

fn frename(eval: &mut Evaluator) -> EvalResult<()> {
    let (new_path, old_path) = eval.stack.pop2("frename")?;
    let old_path = old_path.as_str("frename")?;
    let new_path = new_path.as_str("frename")?;
    let ok = std::fs::rename(old_path, new_path).is_ok();
    eval.stack.push(Value::Boolean(ok));
    Ok(())
}

/// Modification time as seconds since the epoch; an empty list when the
/// path is missing.
fn filetime(eval: &mut Evaluator) -> EvalResult<()> {
    let path = eval.stack.pop("filetime")?;
    let path = path.as_str("filetime")?;

    let mtime = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_secs() as i64);

    match mtime {
        Some(t) => eval.stack.push(Value::Integer(t)),
        None => eval.stack.push(Value::empty_list()),
    }
    Ok(())
}

/// Include a Joy file; silently does nothing if the file does not exist.
fn finclude(eval: &mut Evaluator) -> EvalResult<()> {
    let filename = eval.stack.pop("finclude")?;
    let path = filename.as_str("finclude")?.to_string();

    let Some(resolved) = super::system::resolve_include(&path) else {
        return Ok(());
    };
    super::system::run_file(eval, &resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output_of(source: &str) -> String {
        let mut eval = Evaluator::new();
        eval.capture_output();
        eval.run(source).unwrap();
        eval.take_output()
    }

    #[test]
    fn test_dot_prints_and_pops() {
        let mut eval = Evaluator::new();
        eval.capture_output();
        eval.run("3 4 + .").unwrap();
        assert_eq!(eval.take_output(), "7\n");
        assert!(eval.stack.is_empty());
    }

    #[test]
    fn test_dot_on_empty_stack_is_noop() {
        assert_eq!(output_of("."), "");
    }

    #[test]
    fn test_put_family() {
        assert_eq!(output_of("42 put"), "42");
        assert_eq!(output_of("\"hi\" putln"), "\"hi\"\n");
        assert_eq!(output_of("65 putch"), "A");
        assert_eq!(output_of("'z putch"), "z");
        assert_eq!(output_of("\"hi\" putchars"), "hi");
        assert_eq!(output_of("newline"), "\n");
    }

    #[test]
    fn test_string_repr_is_quoted() {
        assert_eq!(output_of("\"hi\" put"), "\"hi\"");
    }

    #[test]
    fn test_fopen_missing_pushes_null_file() {
        let mut eval = Evaluator::new();
        eval.run("\"/no/such/path/hopefully\" \"r\" fopen").unwrap();
        assert_eq!(eval.stack.items()[0], Value::File(FileHandle::null()));
        // The null file counts as zero and false.
        eval.run("null").unwrap();
        assert_eq!(eval.stack.items()[0], Value::Boolean(true));
    }

    #[test]
    fn test_file_read_write_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let path_str = path.to_str().unwrap();

        let mut eval = Evaluator::new();
        eval.run(&format!(
            "\"{}\" \"w\" fopen \"hello\" fputstring fclose",
            path_str
        ))
        .unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");

        let mut eval = Evaluator::new();
        eval.run(&format!("\"{}\" \"r\" fopen fgets", path_str))
            .unwrap();
        assert_eq!(eval.stack.items()[1], Value::string("hello"));
    }

    #[test]
    fn test_fgetch_and_eof() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ch.txt");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"ab").unwrap();
        drop(f);

        let mut eval = Evaluator::new();
        eval.run(&format!(
            "\"{}\" \"r\" fopen fgetch swap fgetch swap fgetch",
            path.to_str().unwrap()
        ))
        .unwrap();
        let items = eval.stack.items();
        // chars then EOF marker, interleaved with the stream left below
        assert_eq!(items[0], Value::Char('a'));
        assert_eq!(items[1], Value::Char('b'));
        assert_eq!(items[3], Value::Integer(-1));
    }

    #[test]
    fn test_fseek_and_ftell() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seek.txt");
        std::fs::write(&path, "abcdef").unwrap();

        let mut eval = Evaluator::new();
        eval.run(&format!(
            "\"{}\" \"r\" fopen 2 0 fseek pop fgetch",
            path.to_str().unwrap()
        ))
        .unwrap();
        assert_eq!(eval.stack.items()[1], Value::Char('c'));
    }

    #[test]
    fn test_fseek_pushes_failure_flag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flag.txt");
        std::fs::write(&path, "x").unwrap();

        let mut eval = Evaluator::new();
        eval.run(&format!(
            "\"{}\" \"r\" fopen 0 0 fseek",
            path.to_str().unwrap()
        ))
        .unwrap();
        // stream stays below the flag; success is false
        assert_eq!(eval.stack.depth(), 2);
        assert_eq!(eval.stack.items()[1], Value::Boolean(false));
    }

    #[test]
    fn test_feof() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eof.txt");
        std::fs::write(&path, "z").unwrap();

        let mut eval = Evaluator::new();
        eval.run(&format!(
            "\"{}\" \"r\" fopen feof swap fgetch swap feof",
            path.to_str().unwrap()
        ))
        .unwrap();
        let items = eval.stack.items();
        assert_eq!(items[0], Value::Boolean(false));
        assert_eq!(items[1], Value::Char('z'));
        assert_eq!(items[3], Value::Boolean(true));
    }

    #[test]
    fn test_fread_fwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bytes.bin");
        let path_str = path.to_str().unwrap().to_string();

        let mut eval = Evaluator::new();
        eval.run(&format!(
            "\"{}\" \"w\" fopen [104 105] fwrite fclose",
            path_str
        ))
        .unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hi");

        let mut eval = Evaluator::new();
        eval.run(&format!("\"{}\" \"r\" fopen 2 fread", path_str))
            .unwrap();
        assert!(eval.stack.items()[1].deep_eq(&Value::list(vec![
            Value::Integer(104),
            Value::Integer(105)
        ])));
    }

    #[test]
    fn test_closed_file_rejects_io() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("closed.txt");
        std::fs::write(&path, "x").unwrap();

        let mut eval = Evaluator::new();
        let err = eval
            .run(&format!(
                "\"{}\" \"r\" fopen dup fclose fgetch",
                path.to_str().unwrap()
            ))
            .unwrap_err();
        assert!(matches!(err, JoyError::Type { ref op, .. } if op == "fgetch"));
    }

    #[test]
    fn test_fremove_frename() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        std::fs::write(&a, "data").unwrap();

        let mut eval = Evaluator::new();
        eval.run(&format!(
            "\"{}\" \"{}\" frename",
            a.to_str().unwrap(),
            b.to_str().unwrap()
        ))
        .unwrap();
        assert_eq!(eval.stack.items()[0], Value::Boolean(true));
        assert!(b.exists());

        let mut eval = Evaluator::new();
        eval.run(&format!("\"{}\" fremove", b.to_str().unwrap()))
            .unwrap();
        assert_eq!(eval.stack.items()[0], Value::Boolean(true));
        assert!(!b.exists());
    }

    #[test]
    fn test_finclude_missing_file_is_silent() {
        let mut eval = Evaluator::new();
        eval.run("\"/no/such/file.joy\" finclude").unwrap();
        assert!(eval.stack.is_empty());
    }

    #[test]
    fn test_stdout_writes_reach_the_capture_sink() {
        let mut eval = Evaluator::new();
        eval.capture_output();
        eval.run("stdout \"via handle\" fputstring pop").unwrap();
        assert_eq!(eval.take_output(), "via handle");
    }
}
