//! System words: time, environment, process control, formatting, string
//! conversion, inclusion and interpreter introspection.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use once_cell::sync::Lazy;

use crate::error::{EvalResult, JoyError};
use crate::program::{lower_program, Quotation};
use crate::registry::{self, Primitive, Registry};
use crate::value::{Num, Value};

use super::{aggregate_values, Evaluator};

pub(crate) fn install(reg: &mut Registry) {
    let words: &[(&str, usize, &str, fn(&mut Evaluator) -> EvalResult<()>)] = &[
        ("time", 0, "->  I", time),
        ("clock", 0, "->  I", clock),
        ("localtime", 1, "I  ->  T", localtime),
        ("gmtime", 1, "I  ->  T", gmtime_word),
        ("mktime", 1, "T  ->  I", mktime),
        ("strftime", 2, "T S1  ->  S2", strftime),
        ("getenv", 1, "\"variable\"  ->  \"value\"", getenv),
        ("system", 1, "\"command\"  ->  I", system_word),
        ("argc", 0, "->  I", argc),
        ("argv", 0, "->  A", argv),
        ("abort", 0, "->", abort),
        ("quit", 1, "I  ->", quit),
        ("gc", 0, "->", gc),
        ("format", 4, "N C I J  ->  S", format_word),
        ("formatf", 4, "F C I J  ->  S", formatf),
        ("strtol", 2, "S I  ->  J", strtol),
        ("strtod", 1, "S  ->  R", strtod),
        ("intern", 1, "\"sym\"  ->  sym", intern),
        ("name", 1, "sym  ->  \"sym\"", name_word),
        ("chr", 1, "I  ->  C", chr),
        ("ord", 1, "C  ->  I", ord),
        ("include", 1, "\"filnam.ext\"  ->", include),
        ("body", 1, "U  ->  [P]", body),
        ("assign", 2, "V U  ->", assign),
        ("maxint", 0, "->  I", maxint),
        ("setautoput", 1, "I  ->", setautoput),
        ("setundeferror", 1, "I  ->", setundeferror),
        ("setecho", 1, "I  ->", setecho),
        ("autoput", 0, "->  I", autoput),
        ("undeferror", 0, "->  I", undeferror),
        ("echo", 0, "->  I", echo),
        ("conts", 0, "->  [[P] [Q] ..]", conts),
        ("undefs", 0, "->  [..]", undefs),
        ("help", 0, "->", help),
        ("helpdetail", 1, "[S1 S2 ..]  ->", helpdetail),
        ("manual", 0, "->", manual),
    ];
    for &(name, arity, sig, run) in words {
        reg.register(Primitive { name, arity, sig, run });
    }
}

// -------------------------------------------------------------------------
// Time
// -------------------------------------------------------------------------

fn epoch_seconds() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn time(eval: &mut Evaluator) -> EvalResult<()> {
    eval.stack.push(Value::Integer(epoch_seconds()));
    Ok(())
}

static CLOCK_START: Lazy<std::time::Instant> = Lazy::new(std::time::Instant::now);

/// Elapsed process time in microseconds.
fn clock(eval: &mut Evaluator) -> EvalResult<()> {
    let micros = CLOCK_START.elapsed().as_micros() as i64;
    eval.stack.push(Value::Integer(micros));
    Ok(())
}

/// Days since 1970-01-01 for a civil date (proleptic Gregorian).
fn days_from_civil(y: i64, m: i64, d: i64) -> i64 {
    let y = y - i64::from(m <= 2);
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let mp = if m > 2 { m - 3 } else { m + 9 };
    let doy = (153 * mp + 2) / 5 + d - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146097 + doe - 719468
}

/// Civil date for days since 1970-01-01.
fn civil_from_days(z: i64) -> (i64, i64, i64) {
    let z = z + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = z - era * 146097;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    (y + i64::from(m <= 2), m, d)
}

/// Broken-down UTC time: [year mon day hour min sec isdst yday wday],
/// month and year-day 1-based, weekday Monday = 0.
fn broken_down(t: i64) -> Vec<Value> {
    let days = t.div_euclid(86400);
    let secs = t.rem_euclid(86400);
    let (year, mon, day) = civil_from_days(days);
    let yday = days - days_from_civil(year, 1, 1) + 1;
    let wday = (days + 3).rem_euclid(7); // 1970-01-01 was a Thursday
    vec![
        Value::Integer(year),
        Value::Integer(mon),
        Value::Integer(day),
        Value::Integer(secs / 3600),
        Value::Integer((secs / 60) % 60),
        Value::Integer(secs % 60),
        Value::Boolean(false),
        Value::Integer(yday),
        Value::Integer(wday),
    ]
}

/// Local time; without timezone data this is the UTC breakdown.
fn localtime(eval: &mut Evaluator) -> EvalResult<()> {
    let t = eval.stack.pop("localtime")?.as_integer("localtime")?;
    eval.stack.push(Value::list(broken_down(t)));
    Ok(())
}

fn gmtime_word(eval: &mut Evaluator) -> EvalResult<()> {
    let t = eval.stack.pop("gmtime")?.as_integer("gmtime")?;
    eval.stack.push(Value::list(broken_down(t)));
    Ok(())
}

fn time_list_fields(value: &Value, op: &str) -> EvalResult<Vec<i64>> {
    if !value.is_sequence() {
        return Err(JoyError::type_error(op, "LIST", value.kind_name()));
    }
    let items = aggregate_values(value, op)?;
    if items.len() < 9 {
        return Err(JoyError::type_error(
            op,
            "list of 9 time fields",
            "shorter list",
        ));
    }
    Ok(items
        .iter()
        .map(|v| match v {
            Value::Integer(n) => *n,
            Value::Boolean(b) => *b as i64,
            _ => 0,
        })
        .collect())
}

fn mktime(eval: &mut Evaluator) -> EvalResult<()> {
    let lst = eval.stack.pop("mktime")?;
    let f = time_list_fields(&lst, "mktime")?;
    let days = days_from_civil(f[0], f[1].clamp(1, 12), f[2].clamp(1, 31));
    let t = days * 86400 + f[3] * 3600 + f[4] * 60 + f[5];
    eval.stack.push(Value::Integer(t));
    Ok(())
}

const WEEKDAYS: [&str; 7] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"];
const MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

/// Format a broken-down time list with C strftime-style directives.
fn strftime(eval: &mut Evaluator) -> EvalResult<()> {
    let (fmt, lst) = eval.stack.pop2("strftime")?;
    let fmt = fmt.as_str("strftime")?.to_string();
    let f = time_list_fields(&lst, "strftime")?;

    let wday = f[8].rem_euclid(7) as usize;
    let mon = f[1].clamp(1, 12) as usize - 1;

    let mut out = String::new();
    let mut chars = fmt.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('Y') => out.push_str(&f[0].to_string()),
            Some('y') => out.push_str(&format!("{:02}", f[0].rem_euclid(100))),
            Some('m') => out.push_str(&format!("{:02}", f[1])),
            Some('d') => out.push_str(&format!("{:02}", f[2])),
            Some('H') => out.push_str(&format!("{:02}", f[3])),
            Some('M') => out.push_str(&format!("{:02}", f[4])),
            Some('S') => out.push_str(&format!("{:02}", f[5])),
            Some('j') => out.push_str(&format!("{:03}", f[7])),
            Some('w') => out.push_str(&f[8].to_string()),
            Some('a') => out.push_str(&WEEKDAYS[wday][..3]),
            Some('A') => out.push_str(WEEKDAYS[wday]),
            Some('b') => out.push_str(&MONTHS[mon][..3]),
            Some('B') => out.push_str(MONTHS[mon]),
            Some('p') => out.push_str(if f[3] < 12 { "AM" } else { "PM" }),
            Some('%') => out.push('%'),
            Some(other) => {
                out.push('%');
                out.push(other);
            }
            None => out.push('%'),
        }
    }

    eval.stack.push(Value::string(out));
    Ok(())
}

// -------------------------------------------------------------------------
// Environment and process
// -------------------------------------------------------------------------

fn getenv(eval: &mut Evaluator) -> EvalResult<()> {
    let name = eval.stack.pop("getenv")?;
    let name = name.as_str("getenv")?;
    let value = std::env::var(name).unwrap_or_default();
    eval.stack.push(Value::string(value));
    Ok(())
}

/// Run a shell command, pushing its exit status.
fn system_word(eval: &mut Evaluator) -> EvalResult<()> {
    let cmd = eval.stack.pop("system")?;
    let cmd = cmd.as_str("system")?;
    let status = std::process::Command::new("sh")
        .arg("-c")
        .arg(cmd)
        .status()
        .ok()
        .and_then(|s| s.code())
        .unwrap_or(-1);
    eval.stack.push(Value::Integer(status as i64));
    Ok(())
}

fn argc(eval: &mut Evaluator) -> EvalResult<()> {
    eval.stack.push(Value::Integer(eval.argv.len() as i64));
    Ok(())
}

fn argv(eval: &mut Evaluator) -> EvalResult<()> {
    let args = eval.argv.iter().map(Value::string).collect();
    eval.stack.push(Value::list(args));
    Ok(())
}

fn abort(_eval: &mut Evaluator) -> EvalResult<()> {
    Err(JoyError::Exit(1))
}

fn quit(eval: &mut Evaluator) -> EvalResult<()> {
    let code = eval.stack.pop("quit")?.as_integer("quit")?;
    Err(JoyError::Exit(code as i32))
}

fn gc(_eval: &mut Evaluator) -> EvalResult<()> {
    Ok(())
}

// -------------------------------------------------------------------------
// Formatting and string conversion
// -------------------------------------------------------------------------

/// Format number N in mode C with width I and precision J.
fn format_word(eval: &mut Evaluator) -> EvalResult<()> {
    let (j, i, c, n) = eval.stack.pop4("format")?;
    let num = n.as_number("format")?;
    let spec = match &c {
        Value::Char(c) => *c,
        Value::Integer(code) => char::from_u32(*code as u32).unwrap_or('d'),
        other => return Err(JoyError::type_error("format", "CHAR", other.kind_name())),
    };
    let width = i.as_integer("format")?.max(0) as usize;
    let prec = j.as_integer("format")?.max(0) as usize;

    let int = match num {
        Num::Int(x) => x,
        Num::Float(x) => x as i64,
    };

    let result = match spec {
        'd' | 'i' => format!("{:>width$}", int, width = width),
        'o' => format!("{:>width$o}", int, width = width),
        'x' => format!("{:>width$x}", int, width = width),
        'X' => format!("{:>width$X}", int, width = width),
        'f' => format!("{:>width$.prec$}", num.as_f64(), width = width, prec = prec),
        'e' => format!("{:>width$.prec$e}", num.as_f64(), width = width, prec = prec),
        _ => match num {
            Num::Int(x) => x.to_string(),
            Num::Float(x) => crate::value::fmt_float(x),
        },
    };

    eval.stack.push(Value::string(result));
    Ok(())
}

/// Format float F in mode C with width I and precision J.
fn formatf(eval: &mut Evaluator) -> EvalResult<()> {
    let (j, i, c, f) = eval.stack.pop4("formatf")?;
    let x = f.as_number("formatf")?.as_f64();
    let spec = match &c {
        Value::Char(c) => *c,
        other => return Err(JoyError::type_error("formatf", "CHAR", other.kind_name())),
    };
    let width = i.as_integer("formatf")?.max(0) as usize;
    let prec = j.as_integer("formatf")?.max(0) as usize;

    let result = match spec {
        'e' => format!("{:>width$.prec$e}", x, width = width, prec = prec),
        'g' => format!("{:>width$}", x, width = width),
        _ => format!("{:>width$.prec$}", x, width = width, prec = prec),
    };

    eval.stack.push(Value::string(result));
    Ok(())
}

/// Parse an integer from a string in the given base (0 = auto-detect).
fn strtol(eval: &mut Evaluator) -> EvalResult<()> {
    let (base, s) = eval.stack.pop2("strtol")?;
    let text = s.as_str("strtol")?.trim().to_string();
    let base = base.as_integer("strtol")?;

    let parsed = if base == 0 {
        let (digits, radix, neg) = if let Some(rest) = text.strip_prefix("0x") {
            (rest, 16, false)
        } else if let Some(rest) = text.strip_prefix("-0x") {
            (rest, 16, true)
        } else if let Some(rest) = text.strip_prefix("0o") {
            (rest, 8, false)
        } else {
            (text.as_str(), 10, false)
        };
        i64::from_str_radix(digits, radix).map(|v| if neg { -v } else { v })
    } else {
        i64::from_str_radix(&text, base.clamp(2, 36) as u32)
    };

    eval.stack.push(Value::Integer(parsed.unwrap_or(0)));
    Ok(())
}

fn strtod(eval: &mut Evaluator) -> EvalResult<()> {
    let s = eval.stack.pop("strtod")?;
    let parsed = s.as_str("strtod")?.trim().parse::<f64>().unwrap_or(0.0);
    eval.stack.push(Value::Float(parsed));
    Ok(())
}

/// String to symbol.
fn intern(eval: &mut Evaluator) -> EvalResult<()> {
    let s = eval.stack.pop("intern")?;
    let text = s.as_str("intern")?;
    eval.stack.push(Value::symbol(text));
    Ok(())
}

/// Symbol to string; other values print themselves.
fn name_word(eval: &mut Evaluator) -> EvalResult<()> {
    let a = eval.stack.pop("name")?;
    let text = match &a {
        Value::Symbol(s) => s.to_string(),
        other => other.to_string(),
    };
    eval.stack.push(Value::string(text));
    Ok(())
}

fn chr(eval: &mut Evaluator) -> EvalResult<()> {
    let n = eval.stack.pop("chr")?.as_integer("chr")?;
    match u32::try_from(n).ok().and_then(char::from_u32) {
        Some(c) => {
            eval.stack.push(Value::Char(c));
            Ok(())
        }
        None => Err(JoyError::type_error("chr", "valid code point", "INTEGER")),
    }
}

fn ord(eval: &mut Evaluator) -> EvalResult<()> {
    let c = eval.stack.pop("ord")?;
    let code = match &c {
        Value::Char(c) => *c as i64,
        Value::String(s) if !s.is_empty() => s.chars().next().unwrap_or('\0') as i64,
        Value::Integer(n) => *n,
        other => {
            return Err(JoyError::type_error(
                "ord",
                "CHAR or STRING",
                other.kind_name(),
            ))
        }
    };
    eval.stack.push(Value::Integer(code));
    Ok(())
}

// -------------------------------------------------------------------------
// Inclusion and definitions
// -------------------------------------------------------------------------

/// Look for an include path: absolute, as given, or under the current
/// directory.
pub(crate) fn resolve_include(path: &str) -> Option<PathBuf> {
    let p = Path::new(path);
    if p.is_absolute() {
        return p.exists().then(|| p.to_path_buf());
    }
    if p.exists() {
        return Some(p.to_path_buf());
    }
    let under_cwd = std::env::current_dir().ok()?.join(p);
    under_cwd.exists().then_some(under_cwd)
}

/// Parse and execute a Joy file in the current evaluator.
pub(crate) fn run_file(eval: &mut Evaluator, path: &Path) -> EvalResult<()> {
    let source = std::fs::read_to_string(path).map_err(|e| JoyError::Include {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let program = rjoy_parser::parse(&source)?;
    let terms = lower_program(&program);
    eval.execute(&terms)
}

fn include(eval: &mut Evaluator) -> EvalResult<()> {
    let filename = eval.stack.pop("include")?;
    let path = filename.as_str("include")?.to_string();

    match resolve_include(&path) {
        Some(resolved) => run_file(eval, &resolved),
        None => Err(JoyError::Include {
            path,
            reason: "file not found".to_string(),
        }),
    }
}

/// Body of a user-defined word; empty quotation for primitives and
/// unknowns.
fn body(eval: &mut Evaluator) -> EvalResult<()> {
    let u = eval.stack.pop("body")?;
    let name = match &u {
        Value::Symbol(s) | Value::String(s) => s.clone(),
        _ => {
            eval.stack.push(Value::Quotation(Quotation::empty()));
            return Ok(());
        }
    };

    match eval.definitions.get(name.as_ref()) {
        Some(q) => eval.stack.push(Value::Quotation(q.clone())),
        None => eval.stack.push(Value::Quotation(Quotation::empty())),
    }
    Ok(())
}

/// Bind symbol U to a quotation that pushes V.
fn assign(eval: &mut Evaluator) -> EvalResult<()> {
    let (name_val, value) = eval.stack.pop2("assign")?;
    let name: Rc<str> = match &name_val {
        Value::Symbol(s) | Value::String(s) => s.clone(),
        other => {
            return Err(JoyError::type_error(
                "assign",
                "SYMBOL or STRING",
                other.kind_name(),
            ))
        }
    };
    eval.define(
        name,
        Quotation::new(vec![crate::program::value_to_term(&value)]),
    );
    Ok(())
}

fn maxint(eval: &mut Evaluator) -> EvalResult<()> {
    eval.stack.push(Value::Integer(i64::MAX));
    Ok(())
}

// -------------------------------------------------------------------------
// Interpreter state
// -------------------------------------------------------------------------

fn setautoput(eval: &mut Evaluator) -> EvalResult<()> {
    let n = eval.stack.pop("setautoput")?.as_integer("setautoput")?;
    eval.autoput_mode = n;
    Ok(())
}

fn setundeferror(eval: &mut Evaluator) -> EvalResult<()> {
    let n = eval.stack.pop("setundeferror")?.as_integer("setundeferror")?;
    eval.undef_error = n != 0;
    Ok(())
}

fn setecho(eval: &mut Evaluator) -> EvalResult<()> {
    let n = eval.stack.pop("setecho")?.as_integer("setecho")?;
    eval.echo_mode = n;
    Ok(())
}

fn autoput(eval: &mut Evaluator) -> EvalResult<()> {
    eval.stack.push(Value::Integer(eval.autoput_mode));
    Ok(())
}

fn undeferror(eval: &mut Evaluator) -> EvalResult<()> {
    eval.stack.push(Value::Integer(eval.undef_error as i64));
    Ok(())
}

fn echo(eval: &mut Evaluator) -> EvalResult<()> {
    eval.stack.push(Value::Integer(eval.echo_mode));
    Ok(())
}

fn conts(eval: &mut Evaluator) -> EvalResult<()> {
    eval.stack.push(Value::empty_list());
    Ok(())
}

fn undefs(eval: &mut Evaluator) -> EvalResult<()> {
    eval.stack.push(Value::empty_list());
    Ok(())
}

// -------------------------------------------------------------------------
// Help
// -------------------------------------------------------------------------

fn help(eval: &mut Evaluator) -> EvalResult<()> {
    if !eval.definitions.is_empty() {
        let mut names: Vec<_> = eval.definitions.keys().cloned().collect();
        names.sort();
        eval.writeln_str("User definitions:");
        for name in names {
            eval.writeln_str(&format!("  {}", name));
        }
        eval.writeln_str("");
    }

    eval.writeln_str("Primitives:");
    for name in registry::REGISTRY.names() {
        eval.writeln_str(&format!("  {}", name));
    }
    Ok(())
}

fn helpdetail(eval: &mut Evaluator) -> EvalResult<()> {
    let symbols = eval.stack.pop("helpdetail")?;
    if !symbols.is_sequence() {
        return Err(JoyError::type_error(
            "helpdetail",
            "LIST or QUOTATION",
            symbols.kind_name(),
        ));
    }

    for item in aggregate_values(&symbols, "helpdetail")? {
        let name = match &item {
            Value::Symbol(s) | Value::String(s) => s.to_string(),
            _ => continue,
        };
        if let Some(p) = registry::lookup(&name) {
            eval.writeln_str(&format!("{} : {}", name, p.sig));
        } else if eval.definitions.contains_key(name.as_str()) {
            eval.writeln_str(&format!("{} : (user-defined)", name));
        } else {
            eval.writeln_str(&format!("{} : (undefined)", name));
        }
    }
    Ok(())
}

fn manual(eval: &mut Evaluator) -> EvalResult<()> {
    for name in registry::REGISTRY.names() {
        if let Some(p) = registry::lookup(name) {
            eval.writeln_str(&format!("{} : {}", name, p.sig));
        }
    }
    Ok(())
}
