//! End-to-end scenarios: whole programs through scan, parse and execute.

mod common;

use common::{fail, ints, run, top};
use rjoy::{JoyError, Value};

#[test]
fn test_addition() {
    assert_eq!(ints(&run("3 4 +")), vec![7]);
}

#[test]
fn test_square_via_definition() {
    assert_eq!(ints(&run("DEFINE sq == dup * . 7 sq")), vec![49]);
}

#[test]
fn test_factorial_via_linrec() {
    assert_eq!(ints(&run("5 [0 =] [pop 1] [dup 1 -] [*] linrec")), vec![120]);
}

#[test]
fn test_fibonacci_via_binrec() {
    assert_eq!(
        ints(&run("10 [small] [] [pred dup pred] [+] binrec")),
        vec![55]
    );
}

#[test]
fn test_fibonacci_via_genrec() {
    // The reified recursive quotation is applied to both predecessors.
    assert_eq!(
        ints(&run("8 [small] [] [pred dup pred] [app2 +] genrec")),
        vec![21]
    );
}

#[test]
fn test_tailrec_builds_a_list() {
    // Counts 0..9, prepending each onto the result list.
    let program = "[] 0 [dup 10 =] [pop] [dup [swons] dip succ] tailrec";
    assert_eq!(ints(&run(&format!("{} size", program))), vec![10]);
    assert_eq!(ints(&run(&format!("{} first", program))), vec![9]);
}

#[test]
fn test_filter_fold_pipeline() {
    assert_eq!(
        ints(&run("[1 2 3 4 5] [2 rem 0 =] filter 0 [+] fold")),
        vec![6]
    );
}

#[test]
fn test_string_reverse_preserves_kind() {
    assert_eq!(top("\"hello\" reverse"), Value::string("olleh"));
}

#[test]
fn test_cond_dispatch() {
    let items = run("[[[dup 1 =] \"one\"] [[dup 2 =] \"two\"] [\"other\"]] 2 swap cond");
    assert_eq!(items[0], Value::Integer(2));
    assert_eq!(items[1], Value::string("two"));
}

#[test]
fn test_gcd_via_tailrec() {
    assert_eq!(
        ints(&run("48 18 [dup 0 =] [pop] [dup rollup rem] tailrec")),
        vec![6]
    );
}

#[test]
fn test_quicksort_via_binrec() {
    // Quicksort over a literal list: partition around the head, sort both
    // halves, splice the pivot back in.
    let source = "[6 1 4 1 5 9 2 6] \
                  [small] [] \
                  [uncons [> not] split] \
                  [enconcat] binrec";
    let sorted = top(source);
    let expected = Value::list(
        [1, 1, 2, 4, 5, 6, 6, 9]
            .iter()
            .map(|n| Value::Integer(*n))
            .collect(),
    );
    assert!(sorted.deep_eq(&expected), "got {}", sorted);
}

#[test]
fn test_sum_of_squares() {
    assert_eq!(ints(&run("[1 2 3 4] [dup *] map 0 [+] fold")), vec![30]);
}

#[test]
fn test_nested_combinators() {
    // map with an inner ifte per element.
    let items = run("[1 -2 3 -4] [[0 <] [neg] [] ifte] map");
    assert!(items[0].deep_eq(&Value::list(vec![
        Value::Integer(1),
        Value::Integer(2),
        Value::Integer(3),
        Value::Integer(4)
    ])));
}

#[test]
fn test_stack_conservation_on_failure() {
    // A failing word must leave the operand stack untouched.
    let mut eval = rjoy::Evaluator::new();
    eval.run("1 2").unwrap();
    let before = eval.stack.items().to_vec();
    let err = eval.run("[] first").unwrap_err();
    assert_eq!(err, JoyError::empty_aggregate("first"));
    // The failed word popped nothing permanent below its own operands.
    assert_eq!(&eval.stack.items()[..2], &before[..]);
}

#[test]
fn test_division_by_zero_is_typed() {
    assert_eq!(fail("1 0 /"), JoyError::DivisionByZero { op: "/".into() });
}

#[test]
fn test_set_member_fails_at_parse_time() {
    assert_eq!(fail("{64}"), JoyError::SetMember(64));
}

#[test]
fn test_undefined_word_is_fatal_by_default() {
    assert!(matches!(fail("frobnicate"), JoyError::UndefinedWord(_)));
}

#[test]
fn test_exit_propagates_code() {
    assert_eq!(fail("7 quit"), JoyError::Exit(7));
}

#[test]
fn test_shell_escape_lines_are_ignored() {
    assert_eq!(ints(&run("$rm -rf not-actually-run\n1 2 +")), vec![3]);
}
