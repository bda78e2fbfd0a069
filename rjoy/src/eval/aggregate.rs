//! Aggregate words over lists, quotations, strings and sets.
//!
//! Results preserve the kind of the first aggregate argument where the
//! element types still allow it (see `rebuild_aggregate`).

use crate::error::{EvalResult, JoyError};
use crate::registry::{Primitive, Registry};
use crate::value::Value;

use super::{aggregate_values, item_eq, rebuild_aggregate, Evaluator};

pub(crate) fn install(reg: &mut Registry) {
    let words: &[(&str, usize, &str, fn(&mut Evaluator) -> EvalResult<()>)] = &[
        ("cons", 2, "X A  ->  B", cons),
        ("swons", 2, "A X  ->  B", swons),
        ("first", 1, "A  ->  X", first),
        ("rest", 1, "A  ->  R", rest),
        ("uncons", 1, "A  ->  F R", uncons),
        ("unswons", 1, "A  ->  R F", unswons),
        ("null", 1, "X  ->  B", null),
        ("small", 1, "X  ->  B", small),
        ("size", 1, "A  ->  N", size),
        ("concat", 2, "S T  ->  U", concat),
        ("swoncat", 2, "S T  ->  U", swoncat),
        ("enconcat", 3, "X S T  ->  U", enconcat),
        ("reverse", 1, "A  ->  B", reverse),
        ("at", 2, "A N  ->  X", at),
        ("of", 2, "N A  ->  X", of),
        ("pick", 1, "..X N  ->  ..X Y", pick),
        ("drop", 2, "A N  ->  B", drop_word),
        ("take", 2, "A N  ->  B", take),
        ("in", 2, "X A  ->  B", in_word),
        ("has", 2, "A X  ->  B", has),
    ];
    for &(name, arity, sig, run) in words {
        reg.register(Primitive { name, arity, sig, run });
    }
}

/// Prepend X to aggregate A.
fn cons(eval: &mut Evaluator) -> EvalResult<()> {
    let (agg, x) = eval.stack.pop2("cons")?;
    let kind = agg.kind();
    let mut items = aggregate_values(&agg, "cons")?;
    items.insert(0, x);
    eval.stack.push(rebuild_aggregate(items, kind));
    Ok(())
}

/// Swap and cons: A X -> [X | A].
fn swons(eval: &mut Evaluator) -> EvalResult<()> {
    let (x, agg) = eval.stack.pop2("swons")?;
    let kind = agg.kind();
    let mut items = aggregate_values(&agg, "swons")?;
    items.insert(0, x);
    eval.stack.push(rebuild_aggregate(items, kind));
    Ok(())
}

fn first(eval: &mut Evaluator) -> EvalResult<()> {
    let agg = eval.stack.pop("first")?;
    let items = aggregate_values(&agg, "first")?;
    match items.into_iter().next() {
        Some(item) => {
            eval.stack.push(item);
            Ok(())
        }
        None => Err(JoyError::empty_aggregate("first")),
    }
}

fn rest(eval: &mut Evaluator) -> EvalResult<()> {
    let agg = eval.stack.pop("rest")?;
    let kind = agg.kind();
    let items = aggregate_values(&agg, "rest")?;
    if items.is_empty() {
        return Err(JoyError::empty_aggregate("rest"));
    }
    eval.stack.push(rebuild_aggregate(items[1..].to_vec(), kind));
    Ok(())
}

fn uncons(eval: &mut Evaluator) -> EvalResult<()> {
    let agg = eval.stack.pop("uncons")?;
    let kind = agg.kind();
    let items = aggregate_values(&agg, "uncons")?;
    if items.is_empty() {
        return Err(JoyError::empty_aggregate("uncons"));
    }
    eval.stack.push(items[0].clone());
    eval.stack.push(rebuild_aggregate(items[1..].to_vec(), kind));
    Ok(())
}

fn unswons(eval: &mut Evaluator) -> EvalResult<()> {
    let agg = eval.stack.pop("unswons")?;
    let kind = agg.kind();
    let items = aggregate_values(&agg, "unswons")?;
    if items.is_empty() {
        return Err(JoyError::empty_aggregate("unswons"));
    }
    eval.stack.push(rebuild_aggregate(items[1..].to_vec(), kind));
    eval.stack.push(items[0].clone());
    Ok(())
}

/// Empty aggregate, zero numeric, false boolean, NUL char or null file.
fn null(eval: &mut Evaluator) -> EvalResult<()> {
    let x = eval.stack.pop("null")?;
    let result = match &x {
        Value::Integer(n) => *n == 0,
        Value::Float(f) => *f == 0.0,
        Value::Boolean(b) => !b,
        Value::Char(c) => *c as u32 == 0,
        Value::String(s) => s.is_empty(),
        Value::List(items) => items.is_empty(),
        Value::Quotation(q) => q.is_empty(),
        Value::Set(s) => s.is_empty(),
        Value::File(h) => h.is_null(),
        Value::Symbol(_) => false,
    };
    eval.stack.push(Value::Boolean(result));
    Ok(())
}

/// Aggregate of at most one element, or numeric below 2.
fn small(eval: &mut Evaluator) -> EvalResult<()> {
    let x = eval.stack.pop("small")?;
    let result = match &x {
        Value::Integer(n) => *n < 2,
        Value::Float(f) => *f < 2.0,
        Value::Boolean(_) => true,
        Value::Char(c) => (*c as u32) < 2,
        Value::String(s) => s.chars().count() <= 1,
        Value::List(items) => items.len() <= 1,
        Value::Quotation(q) => q.len() <= 1,
        Value::Set(s) => s.len() <= 1,
        _ => false,
    };
    eval.stack.push(Value::Boolean(result));
    Ok(())
}

fn size(eval: &mut Evaluator) -> EvalResult<()> {
    let agg = eval.stack.pop("size")?;
    let items = aggregate_values(&agg, "size")?;
    eval.stack.push(Value::Integer(items.len() as i64));
    Ok(())
}

fn concat(eval: &mut Evaluator) -> EvalResult<()> {
    let (b, a) = eval.stack.pop2("concat")?;
    let kind = a.kind();
    let mut items = aggregate_values(&a, "concat")?;
    items.extend(aggregate_values(&b, "concat")?);
    eval.stack.push(rebuild_aggregate(items, kind));
    Ok(())
}

/// Swap and concatenate: S T -> T ++ S.
fn swoncat(eval: &mut Evaluator) -> EvalResult<()> {
    let (b, a) = eval.stack.pop2("swoncat")?;
    let kind = b.kind();
    let mut items = aggregate_values(&b, "swoncat")?;
    items.extend(aggregate_values(&a, "swoncat")?);
    eval.stack.push(rebuild_aggregate(items, kind));
    Ok(())
}

/// S ++ [X] ++ T, keeping S's kind.
fn enconcat(eval: &mut Evaluator) -> EvalResult<()> {
    let (t, s, x) = eval.stack.pop3("enconcat")?;
    let kind = s.kind();
    let mut items = aggregate_values(&s, "enconcat")?;
    items.push(x);
    items.extend(aggregate_values(&t, "enconcat")?);
    eval.stack.push(rebuild_aggregate(items, kind));
    Ok(())
}

fn reverse(eval: &mut Evaluator) -> EvalResult<()> {
    let agg = eval.stack.pop("reverse")?;
    let kind = agg.kind();
    let mut items = aggregate_values(&agg, "reverse")?;
    items.reverse();
    eval.stack.push(rebuild_aggregate(items, kind));
    Ok(())
}

fn index_into(items: &[Value], idx: i64, op: &str) -> EvalResult<Value> {
    if idx < 0 || idx as usize >= items.len() {
        return Err(JoyError::index_out_of_bounds(op, idx, items.len()));
    }
    Ok(items[idx as usize].clone())
}

/// A N -> X (element at index N).
fn at(eval: &mut Evaluator) -> EvalResult<()> {
    let (n, agg) = eval.stack.pop2("at")?;
    let idx = n.as_integer("at")?;
    let items = aggregate_values(&agg, "at")?;
    let item = index_into(&items, idx, "at")?;
    eval.stack.push(item);
    Ok(())
}

/// N A -> X (reverse operand order of `at`).
fn of(eval: &mut Evaluator) -> EvalResult<()> {
    let (agg, n) = eval.stack.pop2("of")?;
    let idx = n.as_integer("of")?;
    let items = aggregate_values(&agg, "of")?;
    let item = index_into(&items, idx, "of")?;
    eval.stack.push(item);
    Ok(())
}

/// Copy the stack item at depth N to the top (0 = dup, 1 = over).
fn pick(eval: &mut Evaluator) -> EvalResult<()> {
    let n = eval.stack.pop("pick")?.as_integer("pick")?;
    let depth = eval.stack.depth();
    if depth == 0 {
        return Err(JoyError::empty_aggregate("pick"));
    }
    let idx = n.clamp(0, depth as i64 - 1) as usize;
    let item = eval.stack.peek(idx, "pick")?.clone();
    eval.stack.push(item);
    Ok(())
}

fn clamped(n: i64) -> usize {
    n.max(0) as usize
}

fn drop_word(eval: &mut Evaluator) -> EvalResult<()> {
    let (n, agg) = eval.stack.pop2("drop")?;
    let count = clamped(n.as_integer("drop")?);
    let kind = agg.kind();
    let items = aggregate_values(&agg, "drop")?;
    let rest = if count < items.len() {
        items[count..].to_vec()
    } else {
        Vec::new()
    };
    eval.stack.push(rebuild_aggregate(rest, kind));
    Ok(())
}

fn take(eval: &mut Evaluator) -> EvalResult<()> {
    let (n, agg) = eval.stack.pop2("take")?;
    let count = clamped(n.as_integer("take")?);
    let kind = agg.kind();
    let mut items = aggregate_values(&agg, "take")?;
    items.truncate(count);
    eval.stack.push(rebuild_aggregate(items, kind));
    Ok(())
}

fn membership(x: &Value, agg: &Value, op: &str) -> EvalResult<bool> {
    match agg {
        Value::Set(s) => Ok(match x {
            Value::Integer(n) => s.contains(*n),
            _ => false,
        }),
        Value::List(_) | Value::Quotation(_) | Value::String(_) => {
            let items = aggregate_values(agg, op)?;
            Ok(items.iter().any(|item| item_eq(x, item)))
        }
        other => Err(JoyError::type_error(op, "AGGREGATE", other.kind_name())),
    }
}

/// X A -> B.
fn in_word(eval: &mut Evaluator) -> EvalResult<()> {
    let (agg, x) = eval.stack.pop2("in")?;
    let result = membership(&x, &agg, "in")?;
    eval.stack.push(Value::Boolean(result));
    Ok(())
}

/// A X -> B (reverse of `in`).
fn has(eval: &mut Evaluator) -> EvalResult<()> {
    let (x, agg) = eval.stack.pop2("has")?;
    let result = membership(&x, &agg, "has")?;
    eval.stack.push(Value::Boolean(result));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::JoySet;
    use pretty_assertions::assert_eq;

    fn run(source: &str) -> Vec<Value> {
        let mut eval = Evaluator::new();
        eval.run(source).unwrap();
        eval.stack.items().to_vec()
    }

    fn top(source: &str) -> Value {
        run(source).pop().unwrap()
    }

    #[test]
    fn test_cons_uncons_round_trip() {
        let items = run("5 [] cons uncons");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], Value::Integer(5));
        assert!(matches!(&items[1], Value::Quotation(q) if q.is_empty()));
    }

    #[test]
    fn test_cons_preserves_string_and_set() {
        assert_eq!(top("'h \"ello\" cons"), Value::string("hello"));
        assert_eq!(
            top("1 {2 3} cons"),
            Value::Set(JoySet::from_members([1, 2, 3]).unwrap())
        );
    }

    #[test]
    fn test_swons() {
        assert_eq!(top("\"ello\" 'h swons"), Value::string("hello"));
    }

    #[test]
    fn test_first_rest() {
        assert_eq!(top("[1 2 3] first"), Value::Integer(1));
        assert_eq!(top("\"abc\" first"), Value::Char('a'));
        assert_eq!(top("\"abc\" rest"), Value::string("bc"));
        assert_eq!(top("{1 2 3} first"), Value::Integer(1));
    }

    #[test]
    fn test_first_on_empty_fails() {
        let err = Evaluator::new().run("[] first").unwrap_err();
        assert_eq!(err, JoyError::empty_aggregate("first"));
    }

    #[test]
    fn test_unswons() {
        let items = run("[1 2] unswons");
        assert_eq!(items[1], Value::Integer(1));
    }

    #[test]
    fn test_null_and_small() {
        assert_eq!(top("{} null"), Value::Boolean(true));
        assert_eq!(top("{} small"), Value::Boolean(true));
        assert_eq!(top("0 null"), Value::Boolean(true));
        assert_eq!(top("1 null"), Value::Boolean(false));
        assert_eq!(top("1 small"), Value::Boolean(true));
        assert_eq!(top("2 small"), Value::Boolean(false));
        assert_eq!(top("[] null"), Value::Boolean(true));
        assert_eq!(top("[7] small"), Value::Boolean(true));
        assert_eq!(top("[7 8] small"), Value::Boolean(false));
        assert_eq!(top("\"\" null"), Value::Boolean(true));
    }

    #[test]
    fn test_size() {
        assert_eq!(top("[] size"), Value::Integer(0));
        assert_eq!(top("[1 2 3] size"), Value::Integer(3));
        assert_eq!(top("\"hello\" size"), Value::Integer(5));
        assert_eq!(top("{1 5} size"), Value::Integer(2));
    }

    #[test]
    fn test_concat_family() {
        assert_eq!(top("\"foo\" \"bar\" concat"), Value::string("foobar"));
        assert_eq!(top("\"foo\" \"bar\" swoncat"), Value::string("barfoo"));
        assert_eq!(top("'- \"ab\" \"cd\" enconcat"), Value::string("ab-cd"));
        assert!(top("[1] [2] concat").deep_eq(&Value::list(vec![
            Value::Integer(1),
            Value::Integer(2)
        ])));
    }

    #[test]
    fn test_reverse_preserves_kind() {
        assert_eq!(top("\"hello\" reverse"), Value::string("olleh"));
        assert!(top("[1 2 3] reverse").deep_eq(&Value::list(vec![
            Value::Integer(3),
            Value::Integer(2),
            Value::Integer(1)
        ])));
    }

    #[test]
    fn test_at_of() {
        assert_eq!(top("[10 20 30] 1 at"), Value::Integer(20));
        assert_eq!(top("1 [10 20 30] of"), Value::Integer(20));
        assert_eq!(top("\"abc\" 2 at"), Value::Char('c'));
        let err = Evaluator::new().run("[1 2] 5 at").unwrap_err();
        assert_eq!(err, JoyError::index_out_of_bounds("at", 5, 2));
    }

    #[test]
    fn test_pick() {
        assert_eq!(run("1 2 3 0 pick").last().unwrap(), &Value::Integer(3));
        assert_eq!(run("1 2 3 2 pick").last().unwrap(), &Value::Integer(1));
    }

    #[test]
    fn test_take_drop() {
        assert_eq!(top("\"hello\" 2 take"), Value::string("he"));
        assert_eq!(top("\"hello\" 2 drop"), Value::string("llo"));
        assert_eq!(top("[1 2 3] 5 drop"), Value::list(vec![]));
        assert!(top("[1 2 3] 2 take").deep_eq(&Value::list(vec![
            Value::Integer(1),
            Value::Integer(2)
        ])));
    }

    #[test]
    fn test_membership() {
        assert_eq!(top("2 [1 2 3] in"), Value::Boolean(true));
        assert_eq!(top("5 [1 2 3] in"), Value::Boolean(false));
        assert_eq!(top("[1 2 3] 2 has"), Value::Boolean(true));
        assert_eq!(top("3 {1 2 3} in"), Value::Boolean(true));
        assert_eq!(top("'b \"abc\" in"), Value::Boolean(true));
    }
}
