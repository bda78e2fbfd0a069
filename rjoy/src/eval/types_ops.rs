//! Type predicates, type-directed conditionals, and casting.

use crate::error::EvalResult;
use crate::registry::{self, Primitive, Registry};
use crate::value::{JoySet, Value};

use super::{expect_quotation, Evaluator};

pub(crate) fn install(reg: &mut Registry) {
    let words: &[(&str, usize, &str, fn(&mut Evaluator) -> EvalResult<()>)] = &[
        ("integer", 1, "X  ->  B", is_integer),
        ("float", 1, "X  ->  B", is_float),
        ("char", 1, "X  ->  B", is_char),
        ("string", 1, "X  ->  B", is_string),
        ("list", 1, "X  ->  B", is_list),
        ("logical", 1, "X  ->  B", is_logical),
        ("set", 1, "X  ->  B", is_set),
        ("leaf", 1, "X  ->  B", is_leaf),
        ("file", 1, "X  ->  B", is_file),
        ("user", 1, "X  ->  B", is_user),
        ("sametype", 2, "X Y  ->  B", sametype),
        ("typeof", 1, "X  ->  I", typeof_word),
        ("casting", 2, "X T  ->  Y", casting),
        ("bitcast", 2, "X T  ->  Y", bitcast),
        ("ifinteger", 3, "X [T] [F]  ->  ...", ifinteger),
        ("ifchar", 3, "X [T] [F]  ->  ...", ifchar),
        ("iflogical", 3, "X [T] [F]  ->  ...", iflogical),
        ("ifset", 3, "X [T] [F]  ->  ...", ifset),
        ("ifstring", 3, "X [T] [F]  ->  ...", ifstring),
        ("iflist", 3, "X [T] [F]  ->  ...", iflist),
        ("iffloat", 3, "X [T] [F]  ->  ...", iffloat),
        ("iffile", 3, "X [T] [F]  ->  ...", iffile),
    ];
    for &(name, arity, sig, run) in words {
        reg.register(Primitive { name, arity, sig, run });
    }
}

fn predicate(eval: &mut Evaluator, op: &str, test: fn(&Value) -> bool) -> EvalResult<()> {
    let x = eval.stack.pop(op)?;
    eval.stack.push(Value::Boolean(test(&x)));
    Ok(())
}

fn is_integer(eval: &mut Evaluator) -> EvalResult<()> {
    predicate(eval, "integer", |v| matches!(v, Value::Integer(_)))
}

fn is_float(eval: &mut Evaluator) -> EvalResult<()> {
    predicate(eval, "float", |v| matches!(v, Value::Float(_)))
}

fn is_char(eval: &mut Evaluator) -> EvalResult<()> {
    predicate(eval, "char", |v| matches!(v, Value::Char(_)))
}

fn is_string(eval: &mut Evaluator) -> EvalResult<()> {
    predicate(eval, "string", |v| matches!(v, Value::String(_)))
}

fn is_list(eval: &mut Evaluator) -> EvalResult<()> {
    predicate(eval, "list", Value::is_sequence)
}

fn is_logical(eval: &mut Evaluator) -> EvalResult<()> {
    predicate(eval, "logical", |v| matches!(v, Value::Boolean(_)))
}

fn is_set(eval: &mut Evaluator) -> EvalResult<()> {
    predicate(eval, "set", |v| matches!(v, Value::Set(_)))
}

fn is_leaf(eval: &mut Evaluator) -> EvalResult<()> {
    predicate(eval, "leaf", |v| !v.is_sequence())
}

fn is_file(eval: &mut Evaluator) -> EvalResult<()> {
    predicate(eval, "file", |v| matches!(v, Value::File(_)))
}

/// Symbol naming a user definition.
fn is_user(eval: &mut Evaluator) -> EvalResult<()> {
    let x = eval.stack.pop("user")?;
    let result = match &x {
        Value::Symbol(name) => eval.definitions.contains_key(name.as_ref()),
        _ => false,
    };
    eval.stack.push(Value::Boolean(result));
    Ok(())
}

/// Same type. Two builtin symbols match only when they are the same
/// builtin; two user-defined words always match; two unknown symbols
/// always match; mixed symbol kinds never do.
fn sametype(eval: &mut Evaluator) -> EvalResult<()> {
    let (b, a) = eval.stack.pop2("sametype")?;

    let result = if a.kind() != b.kind() {
        false
    } else if let (Value::Symbol(x), Value::Symbol(y)) = (&a, &b) {
        let x_builtin = registry::is_builtin(x);
        let y_builtin = registry::is_builtin(y);
        let x_user = eval.definitions.contains_key(x.as_ref());
        let y_user = eval.definitions.contains_key(y.as_ref());
        if x_builtin && y_builtin {
            x == y
        } else if x_user && y_user {
            true
        } else {
            !x_builtin && !x_user && !y_builtin && !y_user
        }
    } else {
        true
    };

    eval.stack.push(Value::Boolean(result));
    Ok(())
}

/// Joy42 type codes: 2 = user symbol, 3 = builtin symbol, 4 = Boolean,
/// 5 = Char, 6 = Integer, 7 = Set, 8 = String, 9 = List, 10 = Float,
/// 11 = File.
fn typeof_word(eval: &mut Evaluator) -> EvalResult<()> {
    let x = eval.stack.pop("typeof")?;
    let code = match &x {
        Value::Symbol(name) => {
            let is_user_def = eval.definitions.contains_key(name.as_ref());
            if registry::is_builtin(name) && !is_user_def {
                3
            } else {
                2
            }
        }
        other => other.type_code(),
    };
    eval.stack.push(Value::Integer(code));
    Ok(())
}

/// Cast X to the type with the given code. Integer→Float and Integer↔Set
/// reinterpret bits; Char↔Integer is ordinal; List↔String converts chars.
fn casting(eval: &mut Evaluator) -> EvalResult<()> {
    let (t, x) = eval.stack.pop2("casting")?;
    let target = t.as_integer("casting")?;

    let result = match target {
        // BOOLEAN
        4 => Value::Boolean(x.is_truthy()),
        // CHAR
        5 => match &x {
            Value::Char(_) => x,
            Value::Integer(n) => {
                Value::Char(char::from_u32((*n & 0xFF) as u32).unwrap_or('\0'))
            }
            Value::String(s) if !s.is_empty() => {
                Value::Char(s.chars().next().unwrap_or('\0'))
            }
            _ => Value::Char('\0'),
        },
        // INTEGER
        6 => match &x {
            Value::Integer(_) => x,
            Value::Char(c) => Value::Integer(*c as i64),
            Value::Float(f) => Value::Integer(*f as i64),
            Value::Boolean(b) => Value::Integer(*b as i64),
            Value::Set(s) => Value::Integer(s.bits() as i64),
            _ => Value::Integer(0),
        },
        // SET: integer bits become membership
        7 => match &x {
            Value::Set(_) => x,
            Value::Integer(n) => Value::Set(JoySet::from_bits(*n as u64)),
            Value::List(items) => {
                let members = items.iter().filter_map(|v| match v {
                    Value::Integer(n) => Some(*n),
                    _ => None,
                });
                match JoySet::from_members(members) {
                    Ok(set) => Value::Set(set),
                    Err(e) => return Err(e),
                }
            }
            _ => Value::Set(JoySet::empty()),
        },
        // STRING
        8 => match &x {
            Value::String(_) => x,
            Value::Char(c) => Value::string(c.to_string()),
            Value::Integer(n) => Value::string(n.to_string()),
            Value::Float(f) => Value::string(crate::value::fmt_float(*f)),
            Value::List(items) => {
                let chars: String = items
                    .iter()
                    .filter_map(|v| match v {
                        Value::Char(c) => Some(*c),
                        _ => None,
                    })
                    .collect();
                Value::string(chars)
            }
            other => Value::string(other.to_string()),
        },
        // LIST
        9 => match &x {
            Value::List(_) | Value::Quotation(_) => x,
            Value::String(s) => Value::list(s.chars().map(Value::Char).collect()),
            Value::Set(s) => Value::list(s.members().map(Value::Integer).collect()),
            _ => Value::empty_list(),
        },
        // FLOAT: integer bits reinterpret as an IEEE-754 double
        10 => match &x {
            Value::Float(_) => x,
            Value::Integer(n) => Value::Float(f64::from_bits(*n as u64)),
            Value::Char(c) => Value::Float(*c as u32 as f64),
            Value::Boolean(b) => Value::Float(*b as i64 as f64),
            _ => Value::Float(0.0),
        },
        // FILE: nothing casts to a file
        11 => Value::File(crate::value::FileHandle::null()),
        _ => x,
    };

    eval.stack.push(result);
    Ok(())
}

/// Raw bit moves: 0 = integer bits to float, 1 = float bits to integer.
fn bitcast(eval: &mut Evaluator) -> EvalResult<()> {
    let (t, x) = eval.stack.pop2("bitcast")?;
    let mode = t.as_integer("bitcast")?;

    let result = match mode {
        0 => match &x {
            Value::Integer(n) => Value::Float(f64::from_bits(*n as u64)),
            Value::Float(_) => x,
            _ => Value::Float(0.0),
        },
        1 => match &x {
            Value::Float(f) => Value::Integer(f.to_bits() as i64),
            Value::Integer(_) => x,
            _ => Value::Integer(0),
        },
        _ => x,
    };

    eval.stack.push(result);
    Ok(())
}

/// The `if<kind>` combinators push the test value back, then run T or F.
fn if_kind(eval: &mut Evaluator, op: &str, test: fn(&Value) -> bool) -> EvalResult<()> {
    let (f_quot, t_quot, x) = eval.stack.pop3(op)?;
    let t = expect_quotation(&t_quot, op)?;
    let f = expect_quotation(&f_quot, op)?;
    let matched = test(&x);
    eval.stack.push(x);
    if matched {
        eval.execute_quotation(&t)
    } else {
        eval.execute_quotation(&f)
    }
}

fn ifinteger(eval: &mut Evaluator) -> EvalResult<()> {
    if_kind(eval, "ifinteger", |v| matches!(v, Value::Integer(_)))
}

fn ifchar(eval: &mut Evaluator) -> EvalResult<()> {
    if_kind(eval, "ifchar", |v| matches!(v, Value::Char(_)))
}

fn iflogical(eval: &mut Evaluator) -> EvalResult<()> {
    if_kind(eval, "iflogical", |v| matches!(v, Value::Boolean(_)))
}

fn ifset(eval: &mut Evaluator) -> EvalResult<()> {
    if_kind(eval, "ifset", |v| matches!(v, Value::Set(_)))
}

fn ifstring(eval: &mut Evaluator) -> EvalResult<()> {
    if_kind(eval, "ifstring", |v| matches!(v, Value::String(_)))
}

fn iflist(eval: &mut Evaluator) -> EvalResult<()> {
    if_kind(eval, "iflist", Value::is_sequence)
}

fn iffloat(eval: &mut Evaluator) -> EvalResult<()> {
    if_kind(eval, "iffloat", |v| matches!(v, Value::Float(_)))
}

fn iffile(eval: &mut Evaluator) -> EvalResult<()> {
    if_kind(eval, "iffile", |v| matches!(v, Value::File(_)))
}
