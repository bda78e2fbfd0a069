//! Comparison and boolean words.
//!
//! `=` is Joy's liberal scalar equality (never structural), `equal` is the
//! recursive structural test, and the boolean connectives double as set
//! operations when both operands are sets.

use crate::error::EvalResult;
use crate::registry::{Primitive, Registry};
use crate::value::{Num, Value};

use super::Evaluator;

pub(crate) fn install(reg: &mut Registry) {
    let words: &[(&str, usize, &str, fn(&mut Evaluator) -> EvalResult<()>)] = &[
        ("<", 2, "X Y  ->  B", lt),
        (">", 2, "X Y  ->  B", gt),
        ("<=", 2, "X Y  ->  B", le),
        (">=", 2, "X Y  ->  B", ge),
        ("=", 2, "X Y  ->  B", eq),
        ("!=", 2, "X Y  ->  B", ne),
        ("equal", 2, "T U  ->  B", equal),
        ("compare", 2, "A B  ->  I", compare),
        ("and", 2, "B1 B2  ->  B", and_word),
        ("or", 2, "B1 B2  ->  B", or_word),
        ("not", 1, "B  ->  B", not_word),
        ("xor", 2, "B1 B2  ->  B", xor_word),
        ("true", 0, "->  true", true_word),
        ("false", 0, "->  false", false_word),
    ];
    for &(name, arity, sig, run) in words {
        reg.register(Primitive { name, arity, sig, run });
    }
}

/// Values both sides can be ordered by: the loose numeric view, string or
/// symbol text, or file identity. `None` means incomparable.
fn ordering(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    if let (Some(x), Some(y)) = (a.comparison_key(), b.comparison_key()) {
        return Num::compare(x, y);
    }
    let text = |v: &Value| match v {
        Value::String(s) | Value::Symbol(s) => Some(s.clone()),
        _ => None,
    };
    if let (Some(x), Some(y)) = (text(a), text(b)) {
        return Some(x.cmp(&y));
    }
    if let (Value::File(_), Value::File(_)) = (a, b) {
        return Some(a.joy_compare(b).cmp(&0));
    }
    None
}

fn relational(
    eval: &mut Evaluator,
    op: &str,
    test: fn(std::cmp::Ordering) -> bool,
) -> EvalResult<()> {
    let (b, a) = eval.stack.pop2(op)?;
    let result = ordering(&a, &b).map(test).unwrap_or(false);
    eval.stack.push(Value::Boolean(result));
    Ok(())
}

fn lt(eval: &mut Evaluator) -> EvalResult<()> {
    relational(eval, "<", |o| o.is_lt())
}

fn gt(eval: &mut Evaluator) -> EvalResult<()> {
    relational(eval, ">", |o| o.is_gt())
}

fn le(eval: &mut Evaluator) -> EvalResult<()> {
    relational(eval, "<=", |o| o.is_le())
}

fn ge(eval: &mut Evaluator) -> EvalResult<()> {
    relational(eval, ">=", |o| o.is_ge())
}

fn eq(eval: &mut Evaluator) -> EvalResult<()> {
    let (b, a) = eval.stack.pop2("=")?;
    eval.stack.push(Value::Boolean(a.joy_eq(&b)));
    Ok(())
}

fn ne(eval: &mut Evaluator) -> EvalResult<()> {
    let (b, a) = eval.stack.pop2("!=")?;
    eval.stack.push(Value::Boolean(!a.joy_eq(&b)));
    Ok(())
}

/// Recursive structural equality; List and Quotation interchangeable.
fn equal(eval: &mut Evaluator) -> EvalResult<()> {
    let (b, a) = eval.stack.pop2("equal")?;
    eval.stack.push(Value::Boolean(a.deep_eq(&b)));
    Ok(())
}

fn compare(eval: &mut Evaluator) -> EvalResult<()> {
    let (b, a) = eval.stack.pop2("compare")?;
    eval.stack.push(Value::Integer(a.joy_compare(&b)));
    Ok(())
}

fn and_word(eval: &mut Evaluator) -> EvalResult<()> {
    let (b, a) = eval.stack.pop2("and")?;
    let result = match (&a, &b) {
        (Value::Set(x), Value::Set(y)) => Value::Set(x.intersection(*y)),
        _ => Value::Boolean(a.is_truthy() && b.is_truthy()),
    };
    eval.stack.push(result);
    Ok(())
}

fn or_word(eval: &mut Evaluator) -> EvalResult<()> {
    let (b, a) = eval.stack.pop2("or")?;
    let result = match (&a, &b) {
        (Value::Set(x), Value::Set(y)) => Value::Set(x.union(*y)),
        _ => Value::Boolean(a.is_truthy() || b.is_truthy()),
    };
    eval.stack.push(result);
    Ok(())
}

fn not_word(eval: &mut Evaluator) -> EvalResult<()> {
    let a = eval.stack.pop("not")?;
    let result = match a {
        Value::Set(s) => Value::Set(s.complement()),
        other => Value::Boolean(!other.is_truthy()),
    };
    eval.stack.push(result);
    Ok(())
}

fn xor_word(eval: &mut Evaluator) -> EvalResult<()> {
    let (b, a) = eval.stack.pop2("xor")?;
    let result = match (&a, &b) {
        (Value::Set(x), Value::Set(y)) => Value::Set(x.symmetric_difference(*y)),
        _ => Value::Boolean(a.is_truthy() != b.is_truthy()),
    };
    eval.stack.push(result);
    Ok(())
}

fn true_word(eval: &mut Evaluator) -> EvalResult<()> {
    eval.stack.push(Value::Boolean(true));
    Ok(())
}

fn false_word(eval: &mut Evaluator) -> EvalResult<()> {
    eval.stack.push(Value::Boolean(false));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::JoySet;

    fn run(source: &str) -> Vec<Value> {
        let mut eval = Evaluator::new();
        eval.run(source).unwrap();
        eval.stack.items().to_vec()
    }

    fn top_bool(source: &str) -> bool {
        match run(source).pop() {
            Some(Value::Boolean(b)) => b,
            other => panic!("expected boolean, got {:?}", other),
        }
    }

    #[test]
    fn test_relational() {
        assert!(top_bool("1 2 <"));
        assert!(!top_bool("2 1 <"));
        assert!(top_bool("2 1 >"));
        assert!(top_bool("2 2 <="));
        assert!(top_bool("2 2 >="));
        assert!(top_bool("'a 'b <"));
        assert!(top_bool("\"abc\" \"abd\" <"));
    }

    #[test]
    fn test_eq_vs_equal_on_lists() {
        assert!(!top_bool("[1 2] [1 2] ="));
        assert!(top_bool("[1 2] [1 2] equal"));
        assert!(top_bool("[1 2] [1 2] !="));
        assert!(top_bool("[] [] ="));
        assert!(top_bool("[] 0 ="));
    }

    #[test]
    fn test_eq_coercions() {
        assert!(top_bool("1 true ="));
        assert!(top_bool("65 'A ="));
        assert!(top_bool("3 3.0 ="));
        assert!(top_bool("\"f\" \"f\" intern ="));
    }

    #[test]
    fn test_float_set_bit_equality_both_orders() {
        // 2.0 has exactly bit 62 set in its IEEE-754 encoding.
        assert!(top_bool("2.0 {62} ="));
        assert!(top_bool("{62} 2.0 ="));
        assert!(!top_bool("2.0 {1} ="));
    }

    #[test]
    fn test_compare_word() {
        assert_eq!(run("1 2 compare"), vec![Value::Integer(-1)]);
        assert_eq!(run("2 2 compare"), vec![Value::Integer(0)]);
        assert_eq!(run("3 2 compare"), vec![Value::Integer(1)]);
        assert_eq!(run("[1] [1] compare"), vec![Value::Integer(1)]);
    }

    #[test]
    fn test_boolean_connectives() {
        assert!(top_bool("true false or"));
        assert!(!top_bool("true false and"));
        assert!(top_bool("true false xor"));
        assert!(top_bool("false not"));
        assert!(top_bool("1 2 and")); // nonzero numbers are truthy
    }

    #[test]
    fn test_set_connectives() {
        assert_eq!(
            run("{1 2 3} {2 3 4} and"),
            vec![Value::Set(JoySet::from_members([2, 3]).unwrap())]
        );
        assert_eq!(
            run("{1} {2} or"),
            vec![Value::Set(JoySet::from_members([1, 2]).unwrap())]
        );
        assert_eq!(
            run("{1 2} {2 3} xor"),
            vec![Value::Set(JoySet::from_members([1, 3]).unwrap())]
        );
        let complement = run("{} not");
        assert_eq!(complement, vec![Value::Set(JoySet::from_bits(u64::MAX))]);
    }

    #[test]
    fn test_true_false_words() {
        assert_eq!(
            run("true false"),
            vec![Value::Boolean(true), Value::Boolean(false)]
        );
    }
}
