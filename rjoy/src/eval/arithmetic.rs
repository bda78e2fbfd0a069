//! Arithmetic and math words.
//!
//! Integer arithmetic wraps at machine-word width; anything involving a
//! float promotes to float. `/` on two integers is floored division, `rem`
//! is the matching floored modulo, and `div` pushes quotient then
//! remainder.

use crate::error::{EvalResult, JoyError};
use crate::registry::{Primitive, Registry};
use crate::rng::RngLike;
use crate::value::{Num, Value};

use super::Evaluator;

pub(crate) fn install(reg: &mut Registry) {
    let words: &[(&str, usize, &str, fn(&mut Evaluator) -> EvalResult<()>)] = &[
        ("+", 2, "N1 N2  ->  N3", add),
        ("-", 2, "N1 N2  ->  N3", sub),
        ("*", 2, "N1 N2  ->  N3", mul),
        ("/", 2, "N1 N2  ->  N3", divide),
        ("rem", 2, "N1 N2  ->  N3", rem),
        ("div", 2, "I J  ->  Q R", div_word),
        ("abs", 1, "N  ->  N", abs_word),
        ("neg", 1, "N  ->  N", neg),
        ("sign", 1, "N  ->  I", sign),
        ("succ", 1, "N  ->  N", succ),
        ("pred", 1, "N  ->  N", pred),
        ("max", 2, "N1 N2  ->  N", max_word),
        ("min", 2, "N1 N2  ->  N", min_word),
        ("sin", 1, "F  ->  G", sin),
        ("cos", 1, "F  ->  G", cos),
        ("tan", 1, "F  ->  G", tan),
        ("asin", 1, "F  ->  G", asin),
        ("acos", 1, "F  ->  G", acos),
        ("atan", 1, "F  ->  G", atan),
        ("atan2", 2, "F G  ->  H", atan2),
        ("sinh", 1, "F  ->  G", sinh),
        ("cosh", 1, "F  ->  G", cosh),
        ("tanh", 1, "F  ->  G", tanh),
        ("exp", 1, "F  ->  G", exp),
        ("log", 1, "F  ->  G", log),
        ("log10", 1, "F  ->  G", log10),
        ("sqrt", 1, "F  ->  G", sqrt),
        ("pow", 2, "F G  ->  H", pow),
        ("ceil", 1, "F  ->  G", ceil),
        ("floor", 1, "F  ->  G", floor),
        ("trunc", 1, "F  ->  G", trunc),
        ("round", 1, "F  ->  G", round),
        ("frexp", 1, "F  ->  G I", frexp_word),
        ("ldexp", 2, "F I  ->  G", ldexp),
        ("modf", 1, "F  ->  G H", modf),
        ("rand", 0, "->  I", rand_word),
        ("srand", 1, "I  ->", srand),
    ];
    for &(name, arity, sig, run) in words {
        reg.register(Primitive { name, arity, sig, run });
    }
}

fn num_value(n: Num) -> Value {
    match n {
        Num::Int(i) => Value::Integer(i),
        Num::Float(f) => Value::Float(f),
    }
}

fn binop(
    eval: &mut Evaluator,
    op: &str,
    int_op: fn(i64, i64) -> i64,
    float_op: fn(f64, f64) -> f64,
) -> EvalResult<()> {
    let (b, a) = eval.stack.pop2(op)?;
    let (a, b) = (a.as_number(op)?, b.as_number(op)?);
    let result = match (a, b) {
        (Num::Int(x), Num::Int(y)) => Num::Int(int_op(x, y)),
        _ => Num::Float(float_op(a.as_f64(), b.as_f64())),
    };
    eval.stack.push(num_value(result));
    Ok(())
}

fn unop(
    eval: &mut Evaluator,
    op: &str,
    int_op: fn(i64) -> i64,
    float_op: fn(f64) -> f64,
) -> EvalResult<()> {
    let a = eval.stack.pop(op)?.as_number(op)?;
    let result = match a {
        Num::Int(x) => Num::Int(int_op(x)),
        Num::Float(x) => Num::Float(float_op(x)),
    };
    eval.stack.push(num_value(result));
    Ok(())
}

/// Pop a float argument (integers, chars and booleans promote) and push
/// the result of a float function.
fn float_fn(eval: &mut Evaluator, op: &str, f: fn(f64) -> f64) -> EvalResult<()> {
    let a = eval.stack.pop(op)?.as_number(op)?;
    eval.stack.push(Value::Float(f(a.as_f64())));
    Ok(())
}

fn add(eval: &mut Evaluator) -> EvalResult<()> {
    binop(eval, "+", i64::wrapping_add, |x, y| x + y)
}

fn sub(eval: &mut Evaluator) -> EvalResult<()> {
    binop(eval, "-", i64::wrapping_sub, |x, y| x - y)
}

fn mul(eval: &mut Evaluator) -> EvalResult<()> {
    binop(eval, "*", i64::wrapping_mul, |x, y| x * y)
}

fn floored_div(a: i64, b: i64) -> i64 {
    let q = a.wrapping_div(b);
    let r = a.wrapping_rem(b);
    if r != 0 && (r < 0) != (b < 0) {
        q - 1
    } else {
        q
    }
}

fn floored_rem(a: i64, b: i64) -> i64 {
    let r = a.wrapping_rem(b);
    if r != 0 && (r < 0) != (b < 0) {
        r + b
    } else {
        r
    }
}

fn floored_frem(a: f64, b: f64) -> f64 {
    let r = a % b;
    if r != 0.0 && (r < 0.0) != (b < 0.0) {
        r + b
    } else {
        r
    }
}

fn check_divisor(b: Num, op: &str) -> EvalResult<()> {
    let zero = match b {
        Num::Int(y) => y == 0,
        Num::Float(y) => y == 0.0,
    };
    if zero {
        return Err(JoyError::DivisionByZero { op: op.to_string() });
    }
    Ok(())
}

fn divide(eval: &mut Evaluator) -> EvalResult<()> {
    let (b, a) = eval.stack.pop2("/")?;
    let (a, b) = (a.as_number("/")?, b.as_number("/")?);
    check_divisor(b, "/")?;
    let result = match (a, b) {
        (Num::Int(x), Num::Int(y)) => Num::Int(floored_div(x, y)),
        _ => Num::Float(a.as_f64() / b.as_f64()),
    };
    eval.stack.push(num_value(result));
    Ok(())
}

fn rem(eval: &mut Evaluator) -> EvalResult<()> {
    let (b, a) = eval.stack.pop2("rem")?;
    let (a, b) = (a.as_number("rem")?, b.as_number("rem")?);
    check_divisor(b, "rem")?;
    let result = match (a, b) {
        (Num::Int(x), Num::Int(y)) => Num::Int(floored_rem(x, y)),
        _ => Num::Float(floored_frem(a.as_f64(), b.as_f64())),
    };
    eval.stack.push(num_value(result));
    Ok(())
}

/// Integer division with remainder: pushes quotient, then remainder.
fn div_word(eval: &mut Evaluator) -> EvalResult<()> {
    let (b, a) = eval.stack.pop2("div")?;
    let (a, b) = (a.as_number("div")?, b.as_number("div")?);
    check_divisor(b, "div")?;
    match (a, b) {
        (Num::Int(x), Num::Int(y)) => {
            eval.stack.push(Value::Integer(floored_div(x, y)));
            eval.stack.push(Value::Integer(floored_rem(x, y)));
        }
        _ => {
            let (x, y) = (a.as_f64(), b.as_f64());
            eval.stack.push(Value::Integer((x / y).floor() as i64));
            eval.stack.push(Value::Float(floored_frem(x, y)));
        }
    }
    Ok(())
}

fn abs_word(eval: &mut Evaluator) -> EvalResult<()> {
    unop(eval, "abs", i64::wrapping_abs, f64::abs)
}

fn neg(eval: &mut Evaluator) -> EvalResult<()> {
    unop(eval, "neg", i64::wrapping_neg, |x| -x)
}

fn sign(eval: &mut Evaluator) -> EvalResult<()> {
    let a = eval.stack.pop("sign")?.as_number("sign")?;
    let result = match Num::compare(a, Num::Int(0)) {
        Some(std::cmp::Ordering::Less) => -1,
        Some(std::cmp::Ordering::Greater) => 1,
        _ => 0,
    };
    eval.stack.push(Value::Integer(result));
    Ok(())
}

fn succ(eval: &mut Evaluator) -> EvalResult<()> {
    unop(eval, "succ", |x| x.wrapping_add(1), |x| x + 1.0)
}

fn pred(eval: &mut Evaluator) -> EvalResult<()> {
    unop(eval, "pred", |x| x.wrapping_sub(1), |x| x - 1.0)
}

fn max_word(eval: &mut Evaluator) -> EvalResult<()> {
    let (b, a) = eval.stack.pop2("max")?;
    let (x, y) = (a.as_number("max")?, b.as_number("max")?);
    let result = match Num::compare(x, y) {
        Some(std::cmp::Ordering::Less) => y,
        _ => x,
    };
    eval.stack.push(num_value(result));
    Ok(())
}

fn min_word(eval: &mut Evaluator) -> EvalResult<()> {
    let (b, a) = eval.stack.pop2("min")?;
    let (x, y) = (a.as_number("min")?, b.as_number("min")?);
    let result = match Num::compare(x, y) {
        Some(std::cmp::Ordering::Greater) => y,
        _ => x,
    };
    eval.stack.push(num_value(result));
    Ok(())
}

fn sin(eval: &mut Evaluator) -> EvalResult<()> {
    float_fn(eval, "sin", f64::sin)
}

fn cos(eval: &mut Evaluator) -> EvalResult<()> {
    float_fn(eval, "cos", f64::cos)
}

fn tan(eval: &mut Evaluator) -> EvalResult<()> {
    float_fn(eval, "tan", f64::tan)
}

fn asin(eval: &mut Evaluator) -> EvalResult<()> {
    float_fn(eval, "asin", f64::asin)
}

fn acos(eval: &mut Evaluator) -> EvalResult<()> {
    float_fn(eval, "acos", f64::acos)
}

fn atan(eval: &mut Evaluator) -> EvalResult<()> {
    float_fn(eval, "atan", f64::atan)
}

fn atan2(eval: &mut Evaluator) -> EvalResult<()> {
    let (b, a) = eval.stack.pop2("atan2")?;
    let (y, x) = (a.as_number("atan2")?, b.as_number("atan2")?);
    eval.stack.push(Value::Float(y.as_f64().atan2(x.as_f64())));
    Ok(())
}

fn sinh(eval: &mut Evaluator) -> EvalResult<()> {
    float_fn(eval, "sinh", f64::sinh)
}

fn cosh(eval: &mut Evaluator) -> EvalResult<()> {
    float_fn(eval, "cosh", f64::cosh)
}

fn tanh(eval: &mut Evaluator) -> EvalResult<()> {
    float_fn(eval, "tanh", f64::tanh)
}

fn exp(eval: &mut Evaluator) -> EvalResult<()> {
    float_fn(eval, "exp", f64::exp)
}

fn log(eval: &mut Evaluator) -> EvalResult<()> {
    float_fn(eval, "log", f64::ln)
}

fn log10(eval: &mut Evaluator) -> EvalResult<()> {
    float_fn(eval, "log10", f64::log10)
}

fn sqrt(eval: &mut Evaluator) -> EvalResult<()> {
    float_fn(eval, "sqrt", f64::sqrt)
}

fn pow(eval: &mut Evaluator) -> EvalResult<()> {
    let (b, a) = eval.stack.pop2("pow")?;
    let (x, y) = (a.as_number("pow")?, b.as_number("pow")?);
    eval.stack.push(Value::Float(x.as_f64().powf(y.as_f64())));
    Ok(())
}

fn ceil(eval: &mut Evaluator) -> EvalResult<()> {
    float_fn(eval, "ceil", f64::ceil)
}

fn floor(eval: &mut Evaluator) -> EvalResult<()> {
    float_fn(eval, "floor", f64::floor)
}

fn trunc(eval: &mut Evaluator) -> EvalResult<()> {
    float_fn(eval, "trunc", f64::trunc)
}

fn round(eval: &mut Evaluator) -> EvalResult<()> {
    float_fn(eval, "round", f64::round)
}

/// Split into (mantissa, exponent) with mantissa in [0.5, 1).
fn frexp(x: f64) -> (f64, i32) {
    if x == 0.0 || !x.is_finite() {
        return (x, 0);
    }
    let bits = x.to_bits();
    let exp_field = ((bits >> 52) & 0x7FF) as i32;
    if exp_field == 0 {
        // Subnormal: scale into the normal range first.
        let (m, e) = frexp(x * 2f64.powi(64));
        return (m, e - 64);
    }
    let e = exp_field - 1022;
    let mantissa = f64::from_bits((bits & !(0x7FFu64 << 52)) | (1022u64 << 52));
    (mantissa, e)
}

fn frexp_word(eval: &mut Evaluator) -> EvalResult<()> {
    let a = eval.stack.pop("frexp")?.as_number("frexp")?;
    let (mantissa, exponent) = frexp(a.as_f64());
    eval.stack.push(Value::Float(mantissa));
    eval.stack.push(Value::Integer(exponent as i64));
    Ok(())
}

fn ldexp(eval: &mut Evaluator) -> EvalResult<()> {
    let (b, a) = eval.stack.pop2("ldexp")?;
    let x = a.as_number("ldexp")?.as_f64();
    let e = match b.as_number("ldexp")? {
        Num::Int(n) => n.clamp(i32::MIN as i64, i32::MAX as i64) as i32,
        Num::Float(f) => f as i32,
    };
    eval.stack.push(Value::Float(x * 2f64.powi(e)));
    Ok(())
}

/// Split into fractional and integer parts, both floats.
fn modf(eval: &mut Evaluator) -> EvalResult<()> {
    let x = eval.stack.pop("modf")?.as_number("modf")?.as_f64();
    eval.stack.push(Value::Float(x.fract()));
    eval.stack.push(Value::Float(x.trunc()));
    Ok(())
}

fn rand_word(eval: &mut Evaluator) -> EvalResult<()> {
    let n = (eval.rng.next_u64() >> 33) as i64;
    eval.stack.push(Value::Integer(n));
    Ok(())
}

fn srand(eval: &mut Evaluator) -> EvalResult<()> {
    let seed = eval.stack.pop("srand")?.as_integer("srand")?;
    eval.rng.reseed(seed as u64);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(source: &str) -> Vec<Value> {
        let mut eval = Evaluator::new();
        eval.run(source).unwrap();
        eval.stack.items().to_vec()
    }

    #[test]
    fn test_basic_arithmetic() {
        assert_eq!(run("3 4 +"), vec![Value::Integer(7)]);
        assert_eq!(run("10 4 -"), vec![Value::Integer(6)]);
        assert_eq!(run("6 7 *"), vec![Value::Integer(42)]);
        assert_eq!(run("7 2 /"), vec![Value::Integer(3)]);
    }

    #[test]
    fn test_mixed_arithmetic_promotes_to_float() {
        assert_eq!(run("1 2.5 +"), vec![Value::Float(3.5)]);
        assert_eq!(run("2.0 2 *"), vec![Value::Float(4.0)]);
        assert_eq!(run("7.0 2 /"), vec![Value::Float(3.5)]);
    }

    #[test]
    fn test_char_and_bool_coerce() {
        assert_eq!(run("'a 1 +"), vec![Value::Integer(98)]);
        assert_eq!(run("true true +"), vec![Value::Integer(2)]);
    }

    #[test]
    fn test_floored_division() {
        assert_eq!(run("-7 2 /"), vec![Value::Integer(-4)]);
        assert_eq!(run("-7 2 rem"), vec![Value::Integer(1)]);
        assert_eq!(run("7 -2 /"), vec![Value::Integer(-4)]);
        assert_eq!(
            run("7 2 div"),
            vec![Value::Integer(3), Value::Integer(1)]
        );
    }

    #[test]
    fn test_division_by_zero() {
        let mut eval = Evaluator::new();
        let err = eval.run("1 0 /").unwrap_err();
        assert_eq!(err, JoyError::DivisionByZero { op: "/".into() });
        let err = Evaluator::new().run("1 0 rem").unwrap_err();
        assert_eq!(err, JoyError::DivisionByZero { op: "rem".into() });
    }

    #[test]
    fn test_sign_succ_pred() {
        assert_eq!(run("-5 sign"), vec![Value::Integer(-1)]);
        assert_eq!(run("0 sign"), vec![Value::Integer(0)]);
        assert_eq!(run("9 sign"), vec![Value::Integer(1)]);
        assert_eq!(run("4 succ"), vec![Value::Integer(5)]);
        assert_eq!(run("4 pred"), vec![Value::Integer(3)]);
    }

    #[test]
    fn test_max_min() {
        assert_eq!(run("3 7 max"), vec![Value::Integer(7)]);
        assert_eq!(run("3 7 min"), vec![Value::Integer(3)]);
        assert_eq!(run("3 2.5 max"), vec![Value::Integer(3)]);
    }

    #[test]
    fn test_math_functions_return_floats() {
        assert_eq!(run("0 sin"), vec![Value::Float(0.0)]);
        assert_eq!(run("16.0 sqrt"), vec![Value::Float(4.0)]);
        assert_eq!(run("2.5 floor"), vec![Value::Float(2.0)]);
        assert_eq!(run("2.5 ceil"), vec![Value::Float(3.0)]);
        assert_eq!(run("2 8 pow"), vec![Value::Float(256.0)]);
    }

    #[test]
    fn test_frexp_ldexp_round_trip() {
        let items = run("6.0 frexp");
        assert_eq!(items, vec![Value::Float(0.75), Value::Integer(3)]);
        assert_eq!(run("0.75 3 ldexp"), vec![Value::Float(6.0)]);
    }

    #[test]
    fn test_modf() {
        assert_eq!(run("2.5 modf"), vec![Value::Float(0.5), Value::Float(2.0)]);
    }

    #[test]
    fn test_srand_makes_rand_deterministic() {
        let a = run("99 srand rand rand");
        let b = run("99 srand rand rand");
        assert_eq!(a, b);
    }

    #[test]
    fn test_arithmetic_type_error() {
        let err = Evaluator::new().run("\"x\" 1 +").unwrap_err();
        assert!(matches!(err, JoyError::Type { ref op, .. } if op == "+"));
    }
}
