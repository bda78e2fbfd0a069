//! Higher-order combinators.
//!
//! The arity combinators, `ifte`, `cond`, `while` and the collecting
//! iterators all run their sub-quotations against a snapshot of the stack
//! items and assign the snapshot back afterwards. `linrec` and `tailrec`
//! are iterative so deep recursions cannot blow the native stack;
//! `genrec` and the tree combinators reify the recursive call as a
//! runtime-built quotation.

use std::rc::Rc;

use crate::error::{EvalResult, JoyError};
use crate::program::{term_to_value, Quotation, Term};
use crate::registry::{Primitive, Registry};
use crate::value::Value;

use super::{aggregate_values, expect_quotation, item_eq, rebuild_collected, Evaluator};

pub(crate) fn install(reg: &mut Registry) {
    let words: &[(&str, usize, &str, fn(&mut Evaluator) -> EvalResult<()>)] = &[
        ("i", 1, "[P]  ->  ...", i_comb),
        ("x", 1, "[P]  ->  ... [P]", x_comb),
        ("dip", 2, "X [P]  ->  ... X", dip),
        ("dipd", 3, "X Y [P]  ->  ... X Y", dipd),
        ("dipdd", 4, "X Y Z [P]  ->  ... X Y Z", dipdd),
        ("keep", 2, "X [P]  ->  ... X", keep),
        ("nullary", 1, "[P]  ->  R", nullary),
        ("unary", 2, "X [P]  ->  R", unary),
        ("unary2", 3, "X1 X2 [P]  ->  R1 R2", unary2),
        ("unary3", 4, "X1 X2 X3 [P]  ->  R1 R2 R3", unary3),
        ("unary4", 5, "X1 X2 X3 X4 [P]  ->  R1 R2 R3 R4", unary4),
        ("binary", 3, "X Y [P]  ->  R", binary),
        ("ternary", 4, "X Y Z [P]  ->  R", ternary),
        ("ifte", 3, "[B] [T] [F]  ->  ...", ifte),
        ("branch", 3, "B [T] [F]  ->  ...", branch),
        ("cond", 1, "[..[[Bi] Ti]..[D]]  ->  ...", cond),
        ("case", 2, "X [..[Vi Bi]..[D]]  ->  ...", case),
        ("opcase", 2, "X [..[Vi Xs]..[D]]  ->  [Xs]", opcase),
        ("step", 2, "A [P]  ->  ...", step),
        ("each", 2, "A [P]  ->  ...", step),
        ("map", 2, "A [P]  ->  B", map_comb),
        ("filter", 2, "A [P]  ->  B", filter_comb),
        ("split", 2, "A [P]  ->  A1 A2", split),
        ("fold", 3, "A V [P]  ->  V'", fold),
        ("any", 2, "A [P]  ->  B", any_comb),
        ("all", 2, "A [P]  ->  B", all_comb),
        ("some", 2, "A [P]  ->  B", some_comb),
        ("times", 2, "N [P]  ->  ...", times),
        ("while", 2, "[B] [P]  ->  ...", while_comb),
        ("loop", 1, "[P]  ->  ...", loop_comb),
        ("bi", 3, "X [P] [Q]  ->  ...", bi),
        ("tri", 4, "X [P] [Q] [R]  ->  ...", tri),
        ("cleave", 3, "X [P1] [P2]  ->  R1 R2", cleave),
        ("spread", 1, "X1 .. Xn [[P1]..[Pn]]  ->  ...", spread),
        ("infra", 2, "L [P]  ->  L'", infra),
        ("app1", 2, "X [P]  ->  R", app1),
        ("app11", 3, "X Y [P]  ->  R", app11),
        ("app12", 4, "X Y1 Y2 [P]  ->  R1 R2", app12),
        ("app2", 3, "X1 X2 [P]  ->  R1 R2", app2),
        ("app3", 4, "X1 X2 X3 [P]  ->  R1 R2 R3", app3),
        ("app4", 5, "X1 X2 X3 X4 [P]  ->  R1 R2 R3 R4", app4),
        ("construct", 2, "[P] [[Q1]..[Qn]]  ->  R1 .. Rn", construct),
        ("compose", 2, "[P] [Q]  ->  [P Q]", compose),
        ("primrec", 3, "X [I] [C]  ->  R", primrec),
        ("linrec", 4, "[P] [T] [R1] [R2]  ->  ...", linrec),
        ("binrec", 4, "[P] [T] [R1] [R2]  ->  ...", binrec),
        ("tailrec", 3, "[P] [T] [R1]  ->  ...", tailrec),
        ("genrec", 4, "[B] [T] [R1] [R2]  ->  ...", genrec),
        ("condlinrec", 1, "[..[Ci]..[D]]  ->  ...", condlinrec),
        ("condnestrec", 1, "[..[Ci]..[D]]  ->  ...", condnestrec),
        ("treestep", 2, "T [P]  ->  ...", treestep),
        ("treerec", 3, "T [O] [C]  ->  ...", treerec),
        ("treegenrec", 4, "T [O1] [O2] [C]  ->  ...", treegenrec),
    ];
    for &(name, arity, sig, run) in words {
        reg.register(Primitive { name, arity, sig, run });
    }
}

/// Run a clause condition: quotations execute, anything else runs as a
/// plain term (words resolve, literals push).
fn run_condition(eval: &mut Evaluator, term: &Term) -> EvalResult<()> {
    match term {
        Term::Quote(q) => {
            let q = q.clone();
            eval.execute_quotation(&q)
        }
        Term::Literal(Value::Quotation(q)) => {
            let q = q.clone();
            eval.execute_quotation(&q)
        }
        other => eval.execute_term(other),
    }
}

/// Run a default clause: a lone quotation executes, anything else runs as
/// a program.
fn run_default(eval: &mut Evaluator, terms: &[Term]) -> EvalResult<()> {
    if terms.len() == 1 {
        return run_condition(eval, &terms[0]);
    }
    eval.execute(terms)
}

// -------------------------------------------------------------------------
// Execution combinators
// -------------------------------------------------------------------------

fn i_comb(eval: &mut Evaluator) -> EvalResult<()> {
    let quot = eval.stack.pop("i")?;
    let q = expect_quotation(&quot, "i")?;
    eval.execute_quotation(&q)
}

/// Execute the top quotation without popping it.
fn x_comb(eval: &mut Evaluator) -> EvalResult<()> {
    let quot = eval.stack.peek(0, "x")?.clone();
    let q = expect_quotation(&quot, "x")?;
    eval.execute_quotation(&q)
}

fn dip(eval: &mut Evaluator) -> EvalResult<()> {
    let (quot, x) = eval.stack.pop2("dip")?;
    let q = expect_quotation(&quot, "dip")?;
    eval.execute_quotation(&q)?;
    eval.stack.push(x);
    Ok(())
}

fn dipd(eval: &mut Evaluator) -> EvalResult<()> {
    let (quot, y, x) = eval.stack.pop3("dipd")?;
    let q = expect_quotation(&quot, "dipd")?;
    eval.execute_quotation(&q)?;
    eval.stack.push(x);
    eval.stack.push(y);
    Ok(())
}

fn dipdd(eval: &mut Evaluator) -> EvalResult<()> {
    let (quot, z, y, x) = eval.stack.pop4("dipdd")?;
    let q = expect_quotation(&quot, "dipdd")?;
    eval.execute_quotation(&q)?;
    eval.stack.push(x);
    eval.stack.push(y);
    eval.stack.push(z);
    Ok(())
}

fn keep(eval: &mut Evaluator) -> EvalResult<()> {
    let (quot, x) = eval.stack.pop2("keep")?;
    let q = expect_quotation(&quot, "keep")?;
    eval.stack.push(x.clone());
    eval.execute_quotation(&q)?;
    eval.stack.push(x);
    Ok(())
}

// -------------------------------------------------------------------------
// Arity combinators
// -------------------------------------------------------------------------

fn nullary(eval: &mut Evaluator) -> EvalResult<()> {
    let quot = eval.stack.pop("nullary")?;
    let q = expect_quotation(&quot, "nullary")?;
    let saved = eval.stack.snapshot();
    eval.execute_quotation(&q)?;
    let result = eval.stack.pop("nullary")?;
    eval.stack.restore(saved);
    eval.stack.push(result);
    Ok(())
}

fn unary(eval: &mut Evaluator) -> EvalResult<()> {
    let (quot, x) = eval.stack.pop2("unary")?;
    let q = expect_quotation(&quot, "unary")?;
    let saved = eval.stack.snapshot();
    eval.stack.push(x);
    eval.execute_quotation(&q)?;
    let result = eval.stack.pop("unary")?;
    eval.stack.restore(saved);
    eval.stack.push(result);
    Ok(())
}

/// Apply P independently to each argument, with the stack restored
/// between runs.
fn apply_each(eval: &mut Evaluator, op: &str, q: &Quotation, args: Vec<Value>) -> EvalResult<()> {
    let saved = eval.stack.snapshot();
    let mut results = Vec::with_capacity(args.len());
    for arg in args {
        eval.stack.restore(saved.clone());
        eval.stack.push(arg);
        eval.execute_quotation(q)?;
        results.push(eval.stack.pop(op)?);
    }
    eval.stack.restore(saved);
    for r in results {
        eval.stack.push(r);
    }
    Ok(())
}

fn unary2(eval: &mut Evaluator) -> EvalResult<()> {
    let (quot, x2, x1) = eval.stack.pop3("unary2")?;
    let q = expect_quotation(&quot, "unary2")?;
    apply_each(eval, "unary2", &q, vec![x1, x2])
}

fn unary3(eval: &mut Evaluator) -> EvalResult<()> {
    let (quot, x3, x2, x1) = eval.stack.pop4("unary3")?;
    let q = expect_quotation(&quot, "unary3")?;
    apply_each(eval, "unary3", &q, vec![x1, x2, x3])
}

fn unary4(eval: &mut Evaluator) -> EvalResult<()> {
    let (quot, x4, x3, x2, x1) = eval.stack.pop5("unary4")?;
    let q = expect_quotation(&quot, "unary4")?;
    apply_each(eval, "unary4", &q, vec![x1, x2, x3, x4])
}

fn binary(eval: &mut Evaluator) -> EvalResult<()> {
    let (quot, y, x) = eval.stack.pop3("binary")?;
    let q = expect_quotation(&quot, "binary")?;
    let saved = eval.stack.snapshot();
    eval.stack.push(x);
    eval.stack.push(y);
    eval.execute_quotation(&q)?;
    let result = eval.stack.pop("binary")?;
    eval.stack.restore(saved);
    eval.stack.push(result);
    Ok(())
}

fn ternary(eval: &mut Evaluator) -> EvalResult<()> {
    let (quot, z, y, x) = eval.stack.pop4("ternary")?;
    let q = expect_quotation(&quot, "ternary")?;
    let saved = eval.stack.snapshot();
    eval.stack.push(x);
    eval.stack.push(y);
    eval.stack.push(z);
    eval.execute_quotation(&q)?;
    let result = eval.stack.pop("ternary")?;
    eval.stack.restore(saved);
    eval.stack.push(result);
    Ok(())
}

// -------------------------------------------------------------------------
// Conditionals
// -------------------------------------------------------------------------

fn ifte(eval: &mut Evaluator) -> EvalResult<()> {
    let (f_quot, t_quot, b_quot) = eval.stack.pop3("ifte")?;
    let b = expect_quotation(&b_quot, "ifte")?;
    let t = expect_quotation(&t_quot, "ifte")?;
    let f = expect_quotation(&f_quot, "ifte")?;

    let saved = eval.stack.snapshot();
    eval.execute_quotation(&b)?;
    let test = eval.stack.pop("ifte")?;
    eval.stack.restore(saved);

    if test.is_truthy() {
        eval.execute_quotation(&t)
    } else {
        eval.execute_quotation(&f)
    }
}

fn branch(eval: &mut Evaluator) -> EvalResult<()> {
    let (f_quot, t_quot, b) = eval.stack.pop3("branch")?;
    let t = expect_quotation(&t_quot, "branch")?;
    let f = expect_quotation(&f_quot, "branch")?;

    if b.is_truthy() {
        eval.execute_quotation(&t)
    } else {
        eval.execute_quotation(&f)
    }
}

/// Multi-way conditional: each clause is `[[B] body...]`, the last clause
/// is the default.
fn cond(eval: &mut Evaluator) -> EvalResult<()> {
    let clauses_val = eval.stack.pop("cond")?;
    let clauses = aggregate_values(&clauses_val, "cond")?;
    if clauses.is_empty() {
        return Ok(());
    }

    let saved = eval.stack.snapshot();
    let last = clauses.len() - 1;

    for (idx, clause) in clauses.iter().enumerate() {
        let q = expect_quotation(clause, "cond")?;
        let terms = q.terms();
        if terms.is_empty() {
            continue;
        }

        if idx == last {
            eval.stack.restore(saved);
            return run_default(eval, terms);
        }

        eval.stack.restore(saved.clone());
        run_condition(eval, &terms[0])?;
        let test = eval.stack.pop("cond")?;

        if test.is_truthy() {
            eval.stack.restore(saved);
            return eval.execute(&terms[1..]);
        }
    }

    eval.stack.restore(saved);
    Ok(())
}

/// Dispatch on the value of X. A matched clause consumes X; the default
/// clause sees X pushed back.
fn case(eval: &mut Evaluator) -> EvalResult<()> {
    let (cases_val, x) = eval.stack.pop2("case")?;
    let clauses = aggregate_values(&cases_val, "case")?;
    if clauses.is_empty() {
        return Ok(());
    }

    let last = clauses.len() - 1;
    for clause in &clauses[..last] {
        let q = match expect_quotation(clause, "case") {
            Ok(q) => q,
            Err(_) => continue,
        };
        let terms = q.terms();
        if terms.len() < 2 {
            continue;
        }
        let candidate = term_to_value(&terms[0]);
        if item_eq(&x, &candidate) {
            return eval.execute(&terms[1..]);
        }
    }

    let default = expect_quotation(&clauses[last], "case")?;
    eval.stack.push(x);
    run_default(eval, default.terms())
}

/// Dispatch on the type tag of X; the matching tail is returned as a List,
/// not executed.
fn opcase(eval: &mut Evaluator) -> EvalResult<()> {
    let (cases_val, x) = eval.stack.pop2("opcase")?;
    let clauses = aggregate_values(&cases_val, "opcase")?;

    let as_list = |terms: &[Term]| Value::list(terms.iter().map(term_to_value).collect());

    let last = clauses.len().saturating_sub(1);
    for (idx, clause) in clauses.iter().enumerate() {
        let q = match expect_quotation(clause, "opcase") {
            Ok(q) => q,
            Err(_) => continue,
        };
        let terms = q.terms();

        if idx == last {
            // Default: the whole clause comes back.
            eval.stack.push(as_list(terms));
            return Ok(());
        }
        if terms.is_empty() {
            continue;
        }

        let pattern = term_to_value(&terms[0]);
        let matches = pattern.kind() == x.kind()
            && match (&pattern, &x) {
                (Value::Symbol(a), Value::Symbol(b)) => a == b,
                _ => true,
            };
        if matches {
            eval.stack.push(as_list(&terms[1..]));
            return Ok(());
        }
    }

    eval.stack.push(Value::empty_list());
    Ok(())
}

// -------------------------------------------------------------------------
// Iteration
// -------------------------------------------------------------------------

fn step(eval: &mut Evaluator) -> EvalResult<()> {
    let (quot, agg) = eval.stack.pop2("step")?;
    let q = expect_quotation(&quot, "step")?;
    let items = aggregate_values(&agg, "step")?;

    for item in items {
        eval.stack.push(item);
        eval.execute_quotation(&q)?;
    }
    Ok(())
}

fn map_comb(eval: &mut Evaluator) -> EvalResult<()> {
    let (quot, agg) = eval.stack.pop2("map")?;
    let q = expect_quotation(&quot, "map")?;
    let kind = agg.kind();
    let items = aggregate_values(&agg, "map")?;

    let saved = eval.stack.snapshot();
    let mut results = Vec::with_capacity(items.len());
    for item in items {
        eval.stack.restore(saved.clone());
        eval.stack.push(item);
        eval.execute_quotation(&q)?;
        results.push(eval.stack.pop("map")?);
    }
    eval.stack.restore(saved);

    eval.stack.push(rebuild_collected(results, kind));
    Ok(())
}

fn filter_comb(eval: &mut Evaluator) -> EvalResult<()> {
    let (quot, agg) = eval.stack.pop2("filter")?;
    let q = expect_quotation(&quot, "filter")?;
    let kind = agg.kind();
    let items = aggregate_values(&agg, "filter")?;

    let saved = eval.stack.snapshot();
    let mut kept = Vec::new();
    for item in items {
        eval.stack.restore(saved.clone());
        eval.stack.push(item.clone());
        eval.execute_quotation(&q)?;
        let test = eval.stack.pop("filter")?;
        if test.is_truthy() {
            kept.push(item);
        }
    }
    eval.stack.restore(saved);

    eval.stack.push(rebuild_collected(kept, kind));
    Ok(())
}

/// Partition into elements satisfying P and those that do not.
fn split(eval: &mut Evaluator) -> EvalResult<()> {
    let (quot, agg) = eval.stack.pop2("split")?;
    let q = expect_quotation(&quot, "split")?;
    let kind = agg.kind();
    let items = aggregate_values(&agg, "split")?;

    let saved = eval.stack.snapshot();
    let mut yes = Vec::new();
    let mut no = Vec::new();
    for item in items {
        eval.stack.restore(saved.clone());
        eval.stack.push(item.clone());
        eval.execute_quotation(&q)?;
        let test = eval.stack.pop("split")?;
        if test.is_truthy() {
            yes.push(item);
        } else {
            no.push(item);
        }
    }
    eval.stack.restore(saved);

    eval.stack.push(rebuild_collected(yes, kind));
    eval.stack.push(rebuild_collected(no, kind));
    Ok(())
}

/// Left fold: accumulator and element pushed before each P.
fn fold(eval: &mut Evaluator) -> EvalResult<()> {
    let (quot, init, agg) = eval.stack.pop3("fold")?;
    let q = expect_quotation(&quot, "fold")?;
    let items = aggregate_values(&agg, "fold")?;

    let mut acc = init;
    for item in items {
        eval.stack.push(acc);
        eval.stack.push(item);
        eval.execute_quotation(&q)?;
        acc = eval.stack.pop("fold")?;
    }
    eval.stack.push(acc);
    Ok(())
}

fn quantifier(
    eval: &mut Evaluator,
    op: &str,
    stop_on: bool,
    empty_pred_false: bool,
) -> EvalResult<()> {
    let (quot, agg) = eval.stack.pop2(op)?;
    let q = expect_quotation(&quot, op)?;
    let items = aggregate_values(&agg, op)?;

    if empty_pred_false && q.is_empty() {
        eval.stack.push(Value::Boolean(false));
        return Ok(());
    }

    let saved = eval.stack.snapshot();
    for item in items {
        eval.stack.restore(saved.clone());
        eval.stack.push(item);
        eval.execute_quotation(&q)?;
        let test = eval.stack.pop(op)?;
        if test.is_truthy() == stop_on {
            eval.stack.restore(saved);
            eval.stack.push(Value::Boolean(stop_on));
            return Ok(());
        }
    }
    eval.stack.restore(saved);
    eval.stack.push(Value::Boolean(!stop_on));
    Ok(())
}

fn any_comb(eval: &mut Evaluator) -> EvalResult<()> {
    quantifier(eval, "any", true, false)
}

fn all_comb(eval: &mut Evaluator) -> EvalResult<()> {
    quantifier(eval, "all", false, true)
}

fn some_comb(eval: &mut Evaluator) -> EvalResult<()> {
    quantifier(eval, "some", true, false)
}

fn times(eval: &mut Evaluator) -> EvalResult<()> {
    let (quot, n) = eval.stack.pop2("times")?;
    let q = expect_quotation(&quot, "times")?;
    let count = n.as_integer("times")?;

    for _ in 0..count.max(0) {
        eval.execute_quotation(&q)?;
    }
    Ok(())
}

fn while_comb(eval: &mut Evaluator) -> EvalResult<()> {
    let (p_quot, b_quot) = eval.stack.pop2("while")?;
    let b = expect_quotation(&b_quot, "while")?;
    let p = expect_quotation(&p_quot, "while")?;

    loop {
        let saved = eval.stack.snapshot();
        eval.execute_quotation(&b)?;
        let test = eval.stack.pop("while")?;
        eval.stack.restore(saved);

        if !test.is_truthy() {
            break;
        }
        eval.execute_quotation(&p)?;
    }
    Ok(())
}

/// Run P repeatedly; P leaves the continuation flag on top.
fn loop_comb(eval: &mut Evaluator) -> EvalResult<()> {
    let quot = eval.stack.pop("loop")?;
    let q = expect_quotation(&quot, "loop")?;

    loop {
        eval.execute_quotation(&q)?;
        let test = eval.stack.pop("loop")?;
        if !test.is_truthy() {
            break;
        }
    }
    Ok(())
}

// -------------------------------------------------------------------------
// Parallel application
// -------------------------------------------------------------------------

fn bi(eval: &mut Evaluator) -> EvalResult<()> {
    let (q_quot, p_quot, x) = eval.stack.pop3("bi")?;
    let p = expect_quotation(&p_quot, "bi")?;
    let q = expect_quotation(&q_quot, "bi")?;

    eval.stack.push(x.clone());
    eval.execute_quotation(&p)?;
    eval.stack.push(x);
    eval.execute_quotation(&q)
}

fn tri(eval: &mut Evaluator) -> EvalResult<()> {
    let (r_quot, q_quot, p_quot, x) = eval.stack.pop4("tri")?;
    let p = expect_quotation(&p_quot, "tri")?;
    let q = expect_quotation(&q_quot, "tri")?;
    let r = expect_quotation(&r_quot, "tri")?;

    eval.stack.push(x.clone());
    eval.execute_quotation(&p)?;
    eval.stack.push(x.clone());
    eval.execute_quotation(&q)?;
    eval.stack.push(x);
    eval.execute_quotation(&r)
}

/// Run each quotation with X on top, leaving both single results.
fn cleave(eval: &mut Evaluator) -> EvalResult<()> {
    let (p2_quot, p1_quot, x) = eval.stack.pop3("cleave")?;
    let p1 = expect_quotation(&p1_quot, "cleave")?;
    let p2 = expect_quotation(&p2_quot, "cleave")?;

    eval.stack.push(x.clone());
    eval.execute_quotation(&p1)?;
    let r1 = eval.stack.pop("cleave")?;

    eval.stack.push(x);
    eval.execute_quotation(&p2)?;
    let r2 = eval.stack.pop("cleave")?;

    eval.stack.push(r1);
    eval.stack.push(r2);
    Ok(())
}

/// Pair each quotation with a popped value, in order.
fn spread(eval: &mut Evaluator) -> EvalResult<()> {
    let quots_val = eval.stack.pop("spread")?;
    let quots = aggregate_values(&quots_val, "spread")?;
    if quots.is_empty() {
        return Ok(());
    }

    let mut values = eval.stack.pop_n("spread", quots.len())?;
    values.reverse(); // bottom-first, pairing X1 with P1

    for (value, quot) in values.into_iter().zip(quots.iter()) {
        let q = expect_quotation(quot, "spread")?;
        eval.stack.push(value);
        eval.execute_quotation(&q)?;
    }
    Ok(())
}

/// Treat L (top-first) as the stack, run P, return the new stack as a
/// top-first list.
fn infra(eval: &mut Evaluator) -> EvalResult<()> {
    let (quot, lst) = eval.stack.pop2("infra")?;
    let q = expect_quotation(&quot, "infra")?;
    let mut items = aggregate_values(&lst, "infra")?;

    let saved = eval.stack.snapshot();
    items.reverse();
    eval.stack.set_items(items);
    eval.execute_quotation(&q)?;
    let mut result = eval.stack.items().to_vec();
    result.reverse();
    eval.stack.restore(saved);
    eval.stack.push(Value::list(result));
    Ok(())
}

fn app1(eval: &mut Evaluator) -> EvalResult<()> {
    let (quot, x) = eval.stack.pop2("app1")?;
    let q = expect_quotation(&quot, "app1")?;
    eval.stack.push(x);
    eval.execute_quotation(&q)
}

fn app11(eval: &mut Evaluator) -> EvalResult<()> {
    let (quot, y, x) = eval.stack.pop3("app11")?;
    let q = expect_quotation(&quot, "app11")?;
    eval.stack.push(x);
    eval.stack.push(y);
    eval.execute_quotation(&q)
}

/// Apply P to (X, Y1) and (X, Y2) with per-pair snapshots.
fn app12(eval: &mut Evaluator) -> EvalResult<()> {
    let (quot, y2, y1, x) = eval.stack.pop4("app12")?;
    let q = expect_quotation(&quot, "app12")?;

    let saved = eval.stack.snapshot();
    let mut results = Vec::with_capacity(2);
    for y in [y1, y2] {
        eval.stack.restore(saved.clone());
        eval.stack.push(x.clone());
        eval.stack.push(y);
        eval.execute_quotation(&q)?;
        results.push(eval.stack.pop("app12")?);
    }
    eval.stack.restore(saved);
    for r in results {
        eval.stack.push(r);
    }
    Ok(())
}

fn app2(eval: &mut Evaluator) -> EvalResult<()> {
    let (quot, y, x) = eval.stack.pop3("app2")?;
    let q = expect_quotation(&quot, "app2")?;
    apply_each(eval, "app2", &q, vec![x, y])
}

fn app3(eval: &mut Evaluator) -> EvalResult<()> {
    let (quot, z, y, x) = eval.stack.pop4("app3")?;
    let q = expect_quotation(&quot, "app3")?;
    apply_each(eval, "app3", &q, vec![x, y, z])
}

fn app4(eval: &mut Evaluator) -> EvalResult<()> {
    let (quot, z, y, x, w) = eval.stack.pop5("app4")?;
    let q = expect_quotation(&quot, "app4")?;
    apply_each(eval, "app4", &q, vec![w, x, y, z])
}

/// Run P to build a working stack, then for each Qi restore the post-P
/// state, run Qi, and append its single result to the original stack.
fn construct(eval: &mut Evaluator) -> EvalResult<()> {
    let (quots_val, p_quot) = eval.stack.pop2("construct")?;
    let p = expect_quotation(&p_quot, "construct")?;
    let quots = aggregate_values(&quots_val, "construct")?;

    let mut original = eval.stack.snapshot();
    eval.execute_quotation(&p)?;
    let after_p = eval.stack.snapshot();

    for quot in &quots {
        let q = expect_quotation(quot, "construct")?;
        eval.stack.restore(after_p.clone());
        eval.execute_quotation(&q)?;
        original.push(eval.stack.pop("construct")?);
    }

    eval.stack.restore(original);
    Ok(())
}

fn compose(eval: &mut Evaluator) -> EvalResult<()> {
    let (q2_val, q1_val) = eval.stack.pop2("compose")?;
    let q1 = expect_quotation(&q1_val, "compose")?;
    let q2 = expect_quotation(&q2_val, "compose")?;
    eval.stack.push(Value::Quotation(q1.join(&q2)));
    Ok(())
}

// -------------------------------------------------------------------------
// Recursion combinators
// -------------------------------------------------------------------------

/// Push every member of X (N..1 for an integer, elements for aggregates),
/// run I once, then run C once per member.
fn primrec(eval: &mut Evaluator) -> EvalResult<()> {
    let (c_quot, i_quot, x) = eval.stack.pop3("primrec")?;
    let i = expect_quotation(&i_quot, "primrec")?;
    let c = expect_quotation(&c_quot, "primrec")?;

    let n = match &x {
        Value::Integer(count) => {
            for j in (1..=*count).rev() {
                eval.stack.push(Value::Integer(j));
            }
            (*count).max(0) as usize
        }
        Value::List(_) | Value::Quotation(_) | Value::String(_) | Value::Set(_) => {
            let items = aggregate_values(&x, "primrec")?;
            let len = items.len();
            for item in items {
                eval.stack.push(item);
            }
            len
        }
        other => {
            return Err(JoyError::type_error(
                "primrec",
                "INTEGER or AGGREGATE",
                other.kind_name(),
            ))
        }
    };

    eval.execute_quotation(&i)?;
    for _ in 0..n {
        eval.execute_quotation(&c)?;
    }
    Ok(())
}

/// Iterative linear recursion: count R1 runs until P holds, run T, then
/// unwind R2 that many times. Constant native stack.
fn linrec(eval: &mut Evaluator) -> EvalResult<()> {
    let (r2_quot, r1_quot, t_quot, p_quot) = eval.stack.pop4("linrec")?;
    let p = expect_quotation(&p_quot, "linrec")?;
    let t = expect_quotation(&t_quot, "linrec")?;
    let r1 = expect_quotation(&r1_quot, "linrec")?;
    let r2 = expect_quotation(&r2_quot, "linrec")?;

    let mut depth: usize = 0;
    loop {
        let saved = eval.stack.snapshot();
        eval.execute_quotation(&p)?;
        let test = eval.stack.pop("linrec")?;
        eval.stack.restore(saved);

        if test.is_truthy() {
            eval.execute_quotation(&t)?;
            break;
        }
        eval.execute_quotation(&r1)?;
        depth += 1;
    }

    for _ in 0..depth {
        eval.execute_quotation(&r2)?;
    }
    Ok(())
}

fn binrec_aux(
    eval: &mut Evaluator,
    p: &Quotation,
    t: &Quotation,
    r1: &Quotation,
    r2: &Quotation,
) -> EvalResult<()> {
    let saved = eval.stack.snapshot();
    eval.execute_quotation(p)?;
    let test = eval.stack.pop("binrec")?;
    eval.stack.restore(saved);

    if test.is_truthy() {
        return eval.execute_quotation(t);
    }

    eval.execute_quotation(r1)?;
    let first_arg = eval.stack.pop("binrec")?;
    binrec_aux(eval, p, t, r1, r2)?;
    let first_result = eval.stack.pop("binrec")?;
    eval.stack.push(first_arg);
    binrec_aux(eval, p, t, r1, r2)?;
    eval.stack.push(first_result);
    eval.execute_quotation(r2)
}

/// Binary recursion (divide and conquer); native recursion depth tracks
/// the tree depth.
fn binrec(eval: &mut Evaluator) -> EvalResult<()> {
    let (r2_quot, r1_quot, t_quot, p_quot) = eval.stack.pop4("binrec")?;
    let p = expect_quotation(&p_quot, "binrec")?;
    let t = expect_quotation(&t_quot, "binrec")?;
    let r1 = expect_quotation(&r1_quot, "binrec")?;
    let r2 = expect_quotation(&r2_quot, "binrec")?;

    binrec_aux(eval, &p, &t, &r1, &r2)
}

fn tailrec(eval: &mut Evaluator) -> EvalResult<()> {
    let (r1_quot, t_quot, p_quot) = eval.stack.pop3("tailrec")?;
    let p = expect_quotation(&p_quot, "tailrec")?;
    let t = expect_quotation(&t_quot, "tailrec")?;
    let r1 = expect_quotation(&r1_quot, "tailrec")?;

    loop {
        let saved = eval.stack.snapshot();
        eval.execute_quotation(&p)?;
        let test = eval.stack.pop("tailrec")?;
        eval.stack.restore(saved);

        if test.is_truthy() {
            return eval.execute_quotation(&t);
        }
        eval.execute_quotation(&r1)?;
    }
}

/// General recursion: the recursive call is reified as the quotation
/// `[[B] [T] [R1] [R2] genrec]` pushed for R2 to use.
fn genrec(eval: &mut Evaluator) -> EvalResult<()> {
    let (r2_quot, r1_quot, t_quot, b_quot) = eval.stack.pop4("genrec")?;
    let b = expect_quotation(&b_quot, "genrec")?;
    let t = expect_quotation(&t_quot, "genrec")?;
    let r1 = expect_quotation(&r1_quot, "genrec")?;
    let r2 = expect_quotation(&r2_quot, "genrec")?;

    let saved = eval.stack.snapshot();
    eval.execute_quotation(&b)?;
    let test = eval.stack.pop("genrec")?;
    eval.stack.restore(saved);

    if test.is_truthy() {
        return eval.execute_quotation(&t);
    }

    eval.execute_quotation(&r1)?;
    let rec = Quotation::new(vec![
        Term::Quote(b),
        Term::Quote(t),
        Term::Quote(r1),
        Term::Quote(r2.clone()),
        Term::Word(Rc::from("genrec")),
    ]);
    eval.stack.push(Value::Quotation(rec));
    eval.execute_quotation(&r2)
}

/// Run one part of a condlinrec clause.
fn run_part(eval: &mut Evaluator, term: &Term) -> EvalResult<()> {
    run_condition(eval, term)
}

fn condlinrec_aux(eval: &mut Evaluator, clauses: &[Value]) -> EvalResult<()> {
    let saved = eval.stack.snapshot();

    let last = clauses.len() - 1;
    let mut matched_idx = last;
    let mut matched = false;

    for (idx, clause) in clauses[..last].iter().enumerate() {
        let q = match expect_quotation(clause, "condlinrec") {
            Ok(q) => q,
            Err(_) => continue,
        };
        let terms = q.terms();
        if terms.len() < 2 {
            continue;
        }

        eval.stack.restore(saved.clone());
        run_condition(eval, &terms[0])?;
        let test = eval.stack.pop("condlinrec")?;
        if test.is_truthy() {
            matched = true;
            matched_idx = idx;
            break;
        }
    }

    eval.stack.restore(saved);

    let clause = match expect_quotation(&clauses[matched_idx], "condlinrec") {
        Ok(q) => q,
        Err(_) => return Ok(()),
    };
    let terms = clause.terms();
    let start = usize::from(matched);
    let parts = &terms[start..];
    if parts.is_empty() {
        return Ok(());
    }

    run_part(eval, &parts[0])?;
    for part in &parts[1..] {
        condlinrec_aux(eval, clauses)?;
        run_part(eval, part)?;
    }
    Ok(())
}

/// Conditional linear recursion: each clause is `[[B] [T]]` (terminal) or
/// `[[B] [R1] [R2]...]` (recurse between the trailing parts); the last
/// clause is the default.
fn condlinrec(eval: &mut Evaluator) -> EvalResult<()> {
    let clauses_val = eval.stack.pop("condlinrec")?;
    let clauses = aggregate_values(&clauses_val, "condlinrec")?;
    if clauses.is_empty() {
        return Ok(());
    }
    condlinrec_aux(eval, &clauses)
}

/// Run clause body terms, re-entering the combinator wherever the bare
/// word `condnestrec` appears.
fn exec_nestrec_body(eval: &mut Evaluator, terms: &[Term], clauses: &[Value]) -> EvalResult<()> {
    for term in terms {
        match term {
            Term::Word(w) if &**w == "condnestrec" => condnestrec_aux(eval, clauses)?,
            Term::Quote(q) => eval.stack.push(Value::Quotation(q.clone())),
            other => eval.execute_term(other)?,
        }
    }
    Ok(())
}

fn condnestrec_aux(eval: &mut Evaluator, clauses: &[Value]) -> EvalResult<()> {
    let saved = eval.stack.snapshot();
    let last = clauses.len() - 1;

    for (idx, clause) in clauses.iter().enumerate() {
        let q = match expect_quotation(clause, "condnestrec") {
            Ok(q) => q,
            Err(_) => continue,
        };
        let terms = q.terms();

        if idx == last {
            // Default clause: no condition, whole body runs.
            eval.stack.restore(saved);
            if terms.len() == 1 {
                return match &terms[0] {
                    Term::Word(w) if &**w == "condnestrec" => condnestrec_aux(eval, clauses),
                    Term::Quote(inner) => {
                        let inner = inner.clone();
                        exec_nestrec_body(eval, inner.terms(), clauses)
                    }
                    other => eval.execute_term(other),
                };
            }
            return exec_nestrec_body(eval, terms, clauses);
        }

        if terms.len() < 2 {
            continue;
        }

        eval.stack.restore(saved.clone());
        run_condition(eval, &terms[0])?;
        let test = eval.stack.pop("condnestrec")?;

        if test.is_truthy() {
            eval.stack.restore(saved);
            return exec_nestrec_body(eval, &terms[1..], clauses);
        }
    }

    eval.stack.restore(saved);
    Ok(())
}

fn condnestrec(eval: &mut Evaluator) -> EvalResult<()> {
    let clauses_val = eval.stack.pop("condnestrec")?;
    let clauses = aggregate_values(&clauses_val, "condnestrec")?;
    if clauses.is_empty() {
        return Ok(());
    }
    condnestrec_aux(eval, &clauses)
}

// -------------------------------------------------------------------------
// Tree combinators
// -------------------------------------------------------------------------

fn treestep_aux(eval: &mut Evaluator, node: &Value, q: &Quotation) -> EvalResult<()> {
    if node.is_sequence() {
        for item in aggregate_values(node, "treestep")? {
            treestep_aux(eval, &item, q)?;
        }
        return Ok(());
    }
    eval.stack.push(node.clone());
    eval.execute_quotation(q)
}

/// Traverse the tree; at each leaf push it and run P.
fn treestep(eval: &mut Evaluator) -> EvalResult<()> {
    let (quot, tree) = eval.stack.pop2("treestep")?;
    let q = expect_quotation(&quot, "treestep")?;
    treestep_aux(eval, &tree, &q)
}

/// If T is a leaf run O; else push T and the reified `[[O] [C] treerec]`
/// and run C.
fn treerec(eval: &mut Evaluator) -> EvalResult<()> {
    let (c_quot, o_quot, tree) = eval.stack.pop3("treerec")?;
    let o = expect_quotation(&o_quot, "treerec")?;
    let c = expect_quotation(&c_quot, "treerec")?;

    if tree.is_sequence() {
        eval.stack.push(tree);
        let rec = Quotation::new(vec![
            Term::Quote(o),
            Term::Quote(c.clone()),
            Term::Word(Rc::from("treerec")),
        ]);
        eval.stack.push(Value::Quotation(rec));
        eval.execute_quotation(&c)
    } else {
        eval.stack.push(tree);
        eval.execute_quotation(&o)
    }
}

/// If T is a leaf run O1; else run O2, push `[[O1] [O2] [C] treegenrec]`,
/// and run C.
fn treegenrec(eval: &mut Evaluator) -> EvalResult<()> {
    let (c_quot, o2_quot, o1_quot, tree) = eval.stack.pop4("treegenrec")?;
    let o1 = expect_quotation(&o1_quot, "treegenrec")?;
    let o2 = expect_quotation(&o2_quot, "treegenrec")?;
    let c = expect_quotation(&c_quot, "treegenrec")?;

    if tree.is_sequence() {
        eval.stack.push(tree);
        eval.execute_quotation(&o2)?;
        let rec = Quotation::new(vec![
            Term::Quote(o1),
            Term::Quote(o2),
            Term::Quote(c.clone()),
            Term::Word(Rc::from("treegenrec")),
        ]);
        eval.stack.push(Value::Quotation(rec));
        eval.execute_quotation(&c)
    } else {
        eval.stack.push(tree);
        eval.execute_quotation(&o1)
    }
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

    fn ints(items: &[Value]) -> Vec<i64> {
        items
            .iter()
            .map(|v| match v {
                Value::Integer(n) => *n,
                other => panic!("expected integer, got {:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_i_and_x() {
        assert_eq!(ints(&run("[1 2 +] i")), vec![3]);
        let items = run("[dup] x");
        assert_eq!(items.len(), 2); // quotation kept, dup copied it
    }

    #[test]
    fn test_dip_family() {
        assert_eq!(ints(&run("1 2 [dup] dip")), vec![1, 1, 2]);
        assert_eq!(ints(&run("1 2 3 [dup] dipd")), vec![1, 1, 2, 3]);
        assert_eq!(ints(&run("1 2 3 4 [dup] dipdd")), vec![1, 1, 2, 3, 4]);
    }

    #[test]
    fn test_keep() {
        assert_eq!(ints(&run("5 [dup *] keep")), vec![25, 5]);
    }

    #[test]
    fn test_nullary_restores_stack() {
        assert_eq!(ints(&run("1 2 3 [+] nullary")), vec![1, 2, 3, 5]);
    }

    #[test]
    fn test_unary_binary_ternary() {
        assert_eq!(ints(&run("10 5 [dup *] unary")), vec![10, 25]);
        assert_eq!(ints(&run("100 3 4 [+] binary")), vec![100, 7]);
        assert_eq!(ints(&run("9 1 2 3 [+ +] ternary")), vec![9, 6]);
    }

    #[test]
    fn test_unary2() {
        assert_eq!(ints(&run("2 3 [dup *] unary2")), vec![4, 9]);
    }

    #[test]
    fn test_app_words() {
        assert_eq!(ints(&run("3 [dup *] app1")), vec![9]);
        assert_eq!(ints(&run("2 3 [dup *] app2")), vec![4, 9]);
        assert_eq!(ints(&run("2 3 4 [dup *] app3")), vec![4, 9, 16]);
        assert_eq!(ints(&run("10 1 2 [+] app12")), vec![11, 12]);
    }

    #[test]
    fn test_ifte() {
        assert_eq!(ints(&run("5 [0 >] [dup *] [neg] ifte")), vec![25]);
        assert_eq!(ints(&run("-5 [0 >] [dup *] [neg] ifte")), vec![5]);
        // The condition runs on a snapshot; the branch sees the original.
        assert_eq!(ints(&run("10 [pop true] [dup] [pop] ifte")), vec![10, 10]);
    }

    #[test]
    fn test_branch() {
        assert_eq!(ints(&run("5 true [dup *] [neg] branch")), vec![25]);
        assert_eq!(ints(&run("5 false [dup *] [neg] branch")), vec![-5]);
    }

    #[test]
    fn test_cond() {
        let items = run("2 [[[dup 1 =] \"one\"] [[dup 2 =] \"two\"] [\"other\"]] cond");
        assert_eq!(items[0], Value::Integer(2));
        assert_eq!(items[1], Value::string("two"));

        let items = run("9 [[[dup 1 =] \"one\"] [[dup 2 =] \"two\"] [\"other\"]] cond");
        assert_eq!(items[1], Value::string("other"));
    }

    #[test]
    fn test_case_consumes_on_match() {
        let items = run("2 [[1 \"one\"] [2 \"two\"] [\"other\"]] case");
        assert_eq!(items, vec![Value::string("two")]);
        // No match: X is pushed back before the default body runs.
        let items = run("9 [[1 \"one\"] [pop \"other\"]] case");
        assert_eq!(items, vec![Value::string("other")]);
    }

    #[test]
    fn test_opcase_returns_tail_as_list() {
        let items = run("42 [[1 \"int\"] ['a \"char\"] [\"default\"]] opcase");
        assert_eq!(items, vec![Value::list(vec![Value::string("int")])]);
        let items = run("'x [[1 \"int\"] [\"default\"]] opcase");
        assert_eq!(items, vec![Value::list(vec![Value::string("default")])]);
    }

    #[test]
    fn test_step_and_fold() {
        assert_eq!(ints(&run("0 [1 2 3] [+] step")), vec![6]);
        assert_eq!(ints(&run("[1 2 3 4 5] 0 [+] fold")), vec![15]);
    }

    #[test]
    fn test_map_preserves_kind() {
        let items = run("[1 2 3] [dup *] map");
        assert!(items[0].deep_eq(&Value::list(vec![
            Value::Integer(1),
            Value::Integer(4),
            Value::Integer(9)
        ])));
        assert_eq!(run("\"abc\" [succ] map"), vec![Value::string("bcd")]);
        assert_eq!(run("{1 2} [succ] map"), run("{2 3}"));
    }

    #[test]
    fn test_map_runs_on_snapshots() {
        // A deeper stack is visible but restored per element.
        assert_eq!(ints(&run("10 [1 2] [pop 0] map pop")), vec![10]);
    }

    #[test]
    fn test_filter_and_split() {
        let items = run("[1 2 3 4 5] [2 rem 0 =] filter 0 [+] fold");
        assert_eq!(ints(&items), vec![6]);

        let items = run("[1 2 3 4] [2 <] split");
        assert!(items[0].deep_eq(&Value::list(vec![Value::Integer(1)])));
        assert!(items[1].deep_eq(&Value::list(vec![
            Value::Integer(2),
            Value::Integer(3),
            Value::Integer(4)
        ])));
    }

    #[test]
    fn test_quantifiers() {
        assert_eq!(run("[1 2 3] [2 >] any"), vec![Value::Boolean(true)]);
        assert_eq!(run("[1 2 3] [5 >] any"), vec![Value::Boolean(false)]);
        assert_eq!(run("[1 2 3] [0 >] all"), vec![Value::Boolean(true)]);
        assert_eq!(run("[1 2 3] [2 >] all"), vec![Value::Boolean(false)]);
        assert_eq!(run("[1 2 3] [2 =] some"), vec![Value::Boolean(true)]);
    }

    #[test]
    fn test_times() {
        assert_eq!(ints(&run("1 5 [2 *] times")), vec![32]);
        assert_eq!(ints(&run("1 0 [2 *] times")), vec![1]);
    }

    #[test]
    fn test_while() {
        assert_eq!(ints(&run("100 [10 >] [2 /] while")), vec![6]);
    }

    #[test]
    fn test_loop() {
        // Count down from 3, continuing while positive.
        assert_eq!(ints(&run("3 [1 - dup 0 >] loop")), vec![0]);
    }

    #[test]
    fn test_bi_tri_cleave() {
        assert_eq!(ints(&run("5 [1 +] [2 *] bi")), vec![6, 10]);
        assert_eq!(ints(&run("5 [1 +] [2 *] [3 -] tri")), vec![6, 10, 2]);
        assert_eq!(ints(&run("5 [1 +] [2 *] cleave")), vec![6, 10]);
    }

    #[test]
    fn test_spread() {
        assert_eq!(ints(&run("1 2 [[10 +] [20 +]] spread")), vec![11, 22]);
    }

    #[test]
    fn test_infra() {
        // [1 2 3] is top-first: the sub-stack has 1 on top.
        let items = run("[1 2 3] [+] infra");
        assert!(items[0].deep_eq(&Value::list(vec![Value::Integer(3), Value::Integer(3)])));
    }

    #[test]
    fn test_construct() {
        // P builds a working stack; each Qi result lands on the original.
        let items = run("1 [2 3] [[+] [-]] construct");
        assert_eq!(ints(&items), vec![1, 5, -1]);
    }

    #[test]
    fn test_compose() {
        assert_eq!(ints(&run("[1 +] [2 *] compose 5 swap i")), vec![12]);
    }

    #[test]
    fn test_primrec_factorial() {
        assert_eq!(ints(&run("5 [1] [*] primrec")), vec![120]);
        assert_eq!(ints(&run("0 [1] [*] primrec")), vec![1]);
    }

    #[test]
    fn test_primrec_over_aggregates() {
        assert_eq!(ints(&run("[1 2 3] [0] [+] primrec")), vec![6]);
    }

    #[test]
    fn test_linrec_factorial() {
        assert_eq!(ints(&run("5 [0 =] [pop 1] [dup 1 -] [*] linrec")), vec![120]);
    }

    #[test]
    fn test_linrec_is_iterative_for_large_inputs() {
        // Thousands of recursion steps must not overflow the native stack.
        let items = run("5000 [0 =] [pop 0] [dup 1 -] [+] linrec");
        assert_eq!(ints(&items), vec![5000i64 * 5001 / 2]);
    }

    #[test]
    fn test_binrec_fibonacci() {
        assert_eq!(
            ints(&run("10 [small] [] [pred dup pred] [+] binrec")),
            vec![55]
        );
    }

    #[test]
    fn test_tailrec_gcd() {
        assert_eq!(
            ints(&run("48 18 [dup 0 =] [pop] [dup rollup rem] tailrec")),
            vec![6]
        );
    }

    #[test]
    fn test_genrec_factorial() {
        assert_eq!(
            ints(&run("5 [null] [succ] [dup pred] [i *] genrec")),
            vec![120]
        );
    }

    #[test]
    fn test_condlinrec_factorial() {
        assert_eq!(
            ints(&run("5 [[[null] [succ]] [[dup pred] [*]]] condlinrec")),
            vec![120]
        );
    }

    #[test]
    fn test_condnestrec_factorial() {
        assert_eq!(
            ints(&run(
                "5 [[[null] pop 1] [dup pred condnestrec *]] condnestrec"
            )),
            vec![120]
        );
    }

    #[test]
    fn test_treestep_sums_leaves() {
        assert_eq!(ints(&run("0 [1 [2 [3 4]] 5] [+] treestep")), vec![15]);
    }

    #[test]
    fn test_treerec_increments_leaves() {
        // Branches map the reified recursive quotation over their elements;
        // leaves run [succ].
        let mut eval = Evaluator::new();
        eval.run("[1 [2 3]] [succ] [map] treerec").unwrap();
        let expected = Value::list(vec![
            Value::Integer(2),
            Value::list(vec![Value::Integer(3), Value::Integer(4)]),
        ]);
        assert!(eval.stack.items()[0].deep_eq(&expected));
    }

    #[test]
    fn test_treegenrec_sums_leaves() {
        // O2 is a no-op; the combining step maps the recursion over the
        // branch, then the caller folds.
        let mut eval = Evaluator::new();
        eval.run("[1 [2 3] 4] [] [] [map] treegenrec").unwrap();
        let expected = Value::list(vec![
            Value::Integer(1),
            Value::list(vec![Value::Integer(2), Value::Integer(3)]),
            Value::Integer(4),
        ]);
        assert!(eval.stack.items()[0].deep_eq(&expected));
    }
}
