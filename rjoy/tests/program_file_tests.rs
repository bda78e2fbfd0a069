//! Runs the sample programs under tests/programs/ and checks their output.

use rjoy::Evaluator;

fn run_program(name: &str) -> String {
    let path = format!(
        "{}/tests/programs/{}",
        env!("CARGO_MANIFEST_DIR"),
        name
    );
    let source = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read {}: {}", path, e));

    let mut eval = Evaluator::new();
    eval.capture_output();
    eval.run(&source)
        .unwrap_or_else(|e| panic!("{} failed: {}", name, e));
    assert!(
        eval.stack.is_empty(),
        "{} left {} items on the stack",
        name,
        eval.stack.depth()
    );
    eval.take_output()
}

#[test]
fn test_factorial_program() {
    assert_eq!(run_program("factorial.joy"), "[1 2 6 24 120 720]\n");
}

#[test]
fn test_fibs_program() {
    assert_eq!(
        run_program("fibs.joy"),
        "0\n1\n1\n2\n3\n5\n8\n13\n21\n34\n"
    );
}

#[test]
fn test_gcd_program() {
    assert_eq!(run_program("gcd.joy"), "21\n6\n");
}

#[test]
fn test_aggregates_program() {
    assert_eq!(
        run_program("aggregates.joy"),
        "\"reverof\"\n[9 1 16 1 25]\n{2 3}\n55\n"
    );
}

#[test]
fn test_redefinition_program() {
    assert_eq!(run_program("redefinition.joy"), "10\n50\n");
}
