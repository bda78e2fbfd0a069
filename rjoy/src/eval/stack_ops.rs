//! Stack manipulation words.
//!
//! dup, pop, swap, over, the rotate/roll family and their -d variants,
//! stack/unstack and choice.

use crate::error::{EvalResult, JoyError};
use crate::registry::{Primitive, Registry};
use crate::value::Value;

use super::{aggregate_values, Evaluator};

pub(crate) fn install(reg: &mut Registry) {
    let words: &[(&str, usize, &str, fn(&mut Evaluator) -> EvalResult<()>)] = &[
        ("dup", 1, "X  ->  X X", dup),
        ("dup2", 2, "X Y  ->  X Y X Y", dup2),
        ("pop", 1, "X  ->", pop),
        ("id", 0, "->", id),
        ("swap", 2, "X Y  ->  Y X", swap),
        ("over", 2, "X Y  ->  X Y X", over),
        ("rotate", 3, "X Y Z  ->  Z Y X", rotate),
        ("rotated", 4, "X Y Z W  ->  Z Y X W", rotated),
        ("rollup", 3, "X Y Z  ->  Z X Y", rollup),
        ("rolldown", 3, "X Y Z  ->  Y Z X", rolldown),
        ("rollupd", 4, "X Y Z W  ->  Z X Y W", rollupd),
        ("rolldownd", 4, "X Y Z W  ->  Y Z X W", rolldownd),
        ("dupd", 2, "X Y  ->  X X Y", dupd),
        ("popd", 2, "X Y  ->  Y", popd),
        ("swapd", 3, "X Y Z  ->  Y X Z", swapd),
        ("choice", 3, "B T F  ->  X", choice),
        ("stack", 0, ".. X Y Z  ->  .. X Y Z [Z Y X ..]", stack_word),
        ("unstack", 1, "[X Y ..]  ->  ..Y X", unstack),
    ];
    for &(name, arity, sig, run) in words {
        reg.register(Primitive { name, arity, sig, run });
    }
}

fn dup(eval: &mut Evaluator) -> EvalResult<()> {
    let top = eval.stack.peek(0, "dup")?.clone();
    eval.stack.push(top);
    Ok(())
}

fn dup2(eval: &mut Evaluator) -> EvalResult<()> {
    let y = eval.stack.peek(0, "dup2")?.clone();
    let x = eval.stack.peek(1, "dup2")?.clone();
    eval.stack.push(x);
    eval.stack.push(y);
    Ok(())
}

fn pop(eval: &mut Evaluator) -> EvalResult<()> {
    eval.stack.pop("pop")?;
    Ok(())
}

fn id(_eval: &mut Evaluator) -> EvalResult<()> {
    Ok(())
}

fn swap(eval: &mut Evaluator) -> EvalResult<()> {
    let (b, a) = eval.stack.pop2("swap")?;
    eval.stack.push(b);
    eval.stack.push(a);
    Ok(())
}

fn over(eval: &mut Evaluator) -> EvalResult<()> {
    let second = eval.stack.peek(1, "over")?.clone();
    eval.stack.push(second);
    Ok(())
}

fn rotate(eval: &mut Evaluator) -> EvalResult<()> {
    let (z, y, x) = eval.stack.pop3("rotate")?;
    eval.stack.push(z);
    eval.stack.push(y);
    eval.stack.push(x);
    Ok(())
}

fn rotated(eval: &mut Evaluator) -> EvalResult<()> {
    let (w, z, y, x) = eval.stack.pop4("rotated")?;
    eval.stack.push(z);
    eval.stack.push(y);
    eval.stack.push(x);
    eval.stack.push(w);
    Ok(())
}

fn rollup(eval: &mut Evaluator) -> EvalResult<()> {
    let (z, y, x) = eval.stack.pop3("rollup")?;
    eval.stack.push(z);
    eval.stack.push(x);
    eval.stack.push(y);
    Ok(())
}

fn rolldown(eval: &mut Evaluator) -> EvalResult<()> {
    let (z, y, x) = eval.stack.pop3("rolldown")?;
    eval.stack.push(y);
    eval.stack.push(z);
    eval.stack.push(x);
    Ok(())
}

fn rollupd(eval: &mut Evaluator) -> EvalResult<()> {
    let (w, z, y, x) = eval.stack.pop4("rollupd")?;
    eval.stack.push(z);
    eval.stack.push(x);
    eval.stack.push(y);
    eval.stack.push(w);
    Ok(())
}

fn rolldownd(eval: &mut Evaluator) -> EvalResult<()> {
    let (w, z, y, x) = eval.stack.pop4("rolldownd")?;
    eval.stack.push(y);
    eval.stack.push(z);
    eval.stack.push(x);
    eval.stack.push(w);
    Ok(())
}

fn dupd(eval: &mut Evaluator) -> EvalResult<()> {
    let (y, x) = eval.stack.pop2("dupd")?;
    eval.stack.push(x.clone());
    eval.stack.push(x);
    eval.stack.push(y);
    Ok(())
}

fn popd(eval: &mut Evaluator) -> EvalResult<()> {
    let (y, _x) = eval.stack.pop2("popd")?;
    eval.stack.push(y);
    Ok(())
}

fn swapd(eval: &mut Evaluator) -> EvalResult<()> {
    let (z, y, x) = eval.stack.pop3("swapd")?;
    eval.stack.push(y);
    eval.stack.push(x);
    eval.stack.push(z);
    Ok(())
}

fn choice(eval: &mut Evaluator) -> EvalResult<()> {
    let (f, t, b) = eval.stack.pop3("choice")?;
    eval.stack.push(if b.is_truthy() { t } else { f });
    Ok(())
}

/// Push a list of the current stack contents, top-first.
fn stack_word(eval: &mut Evaluator) -> EvalResult<()> {
    let mut items = eval.stack.items().to_vec();
    items.reverse();
    eval.stack.push(Value::list(items));
    Ok(())
}

/// Replace the stack with the contents of a top-first list.
fn unstack(eval: &mut Evaluator) -> EvalResult<()> {
    let top = eval.stack.pop("unstack")?;
    if !top.is_sequence() {
        return Err(JoyError::type_error(
            "unstack",
            "LIST or QUOTATION",
            top.kind_name(),
        ));
    }
    let mut items = aggregate_values(&top, "unstack")?;
    // List is top-first; the stack stores bottom-first.
    items.reverse();
    eval.stack.set_items(items);
    Ok(())
}
