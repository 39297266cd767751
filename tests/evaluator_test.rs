use proptest::prelude::*;

use macaque::interpreter::context::BufferedContext;
use macaque::{evaluate_with_context, parse, Environment, Value};

fn evaluate_in(environment: &Environment, input: &str) -> (Value, String) {
    let result = parse(input);
    assert!(
        result.is_ok(),
        "unexpected parser errors for {input:?}: {:?}",
        result.errors
    );
    let mut context = BufferedContext::new();
    let value = evaluate_with_context(&result.program, environment, &mut context);
    (value, context.into_data())
}

fn evaluate(input: &str) -> Value {
    evaluate_in(&Environment::new(), input).0
}

fn check_integers(cases: &[(&str, i64)]) {
    for (input, expected) in cases {
        assert_eq!(evaluate(input), Value::Integer(*expected), "evaluating {input:?}");
    }
}

fn check_booleans(cases: &[(&str, bool)]) {
    for (input, expected) in cases {
        assert_eq!(evaluate(input), Value::Boolean(*expected), "evaluating {input:?}");
    }
}

fn check_errors(cases: &[(&str, &str)]) {
    for (input, expected) in cases {
        match evaluate(input) {
            Value::Error(error) => assert_eq!(error.message(), *expected, "evaluating {input:?}"),
            value => panic!("expected an error from {input:?} but got {value}"),
        }
    }
}

fn check_rendered(cases: &[(&str, &str)]) {
    for (input, expected) in cases {
        assert_eq!(evaluate(input).to_string(), *expected, "evaluating {input:?}");
    }
}

#[test]
fn test_integer_arithmetic() {
    check_integers(&[
        ("5", 5),
        ("-10", -10),
        ("11 * 5", 55),
        ("0 - 10", -10),
        ("-20 * 5", -100),
        ("(1 + 2) * 4", 12),
        ("50 / 2 * 2 + 10", 60),
        ("-7 / 2", -3),
        ("7 / -2", -3),
        ("9223372036854775807 + 1", i64::MIN),
    ]);
}

#[test]
fn test_boolean_expressions() {
    check_booleans(&[
        ("true", true),
        ("1 > 2", false),
        ("1 + 1 == 2", true),
        ("(1 - 2) * 4 < 10", true),
        ("true == true", true),
        ("false != true", true),
        ("(1 > 2) == true", false),
        ("\"a\" < \"b\"", true),
        ("\"abc\" == \"abc\"", true),
        ("\"abc\" != \"abd\"", true),
        ("1 == true", false),
        ("1 != \"1\"", true),
    ]);
}

#[test]
fn test_bang_only_inverts_booleans() {
    check_booleans(&[
        ("!true", false),
        ("!false", true),
        ("!5", false),
        ("!0", false),
        ("!!5", true),
        ("!!!false", true),
        ("!\"\"", false),
    ]);
}

#[test]
fn test_truthiness_in_conditions() {
    assert_eq!(evaluate("if (1 > 2) { 5 }"), Value::Null);
    check_integers(&[
        ("if (0) { 5 } else { 1 }", 1),
        ("if (-1) { 5 } else { 1 }", 1),
        ("if (3) { 5 } else { 1 }", 5),
        ("if (\"text\") { 5 } else { 1 }", 1),
        ("if ([1]) { 5 } else { 1 }", 1),
        ("if (1 > 2) { 5 } else if (2 > 1) { 15 } else { 1 }", 15),
        ("if (1 > 2) { 5 } else if (2 == 1) { 15 } else if (2 > 1) { 25 } else { 1 }", 25),
    ]);
}

#[test]
fn test_return_statements() {
    check_integers(&[
        ("return 5", 5),
        ("return 10; 5", 10),
        ("5; return 2 * 5; 5", 10),
        ("if (2 > 1) { if (2 > 1) { return 10 } return 1 }", 10),
    ]);
}

#[test]
fn test_let_and_assignment() {
    check_integers(&[
        ("let x = 5; x", 5),
        ("let y = 15 + 5; y", 20),
        ("let z = -11 * (10 * -1); let zz = z + z; zz", 220),
        ("let z = -11 * (10 * -1); let zz = z + z; zz = 10; zz", 10),
        ("let x = 1; if (true) { let x = 2; }; x", 1),
        ("let x = 1; if (true) { x = 2; }; x", 2),
        ("let x = 1; let x = 3; x", 3),
    ]);
    assert_eq!(evaluate("let x = 1"), Value::Null);
    assert_eq!(evaluate("let x = 1; x = 2"), Value::Null);
}

#[test]
fn test_runtime_errors() {
    check_errors(&[
        ("5 + true", "type mismatch: INTEGER + BOOLEAN"),
        ("5 + true; 5", "type mismatch: INTEGER + BOOLEAN"),
        ("\"a\" + 1", "type mismatch: STRING + INTEGER"),
        ("-true", "unknown operator: -BOOLEAN"),
        ("-\"a\"", "unknown operator: -STRING"),
        ("true + false", "unknown operator: BOOLEAN + BOOLEAN"),
        ("5; true + false; 5", "unknown operator: BOOLEAN + BOOLEAN"),
        ("if (2 > 1) { true + false }", "unknown operator: BOOLEAN + BOOLEAN"),
        (
            "if (2 > 1) { if (2 > 1) { true + false } return 1 }",
            "unknown operator: BOOLEAN + BOOLEAN",
        ),
        ("\"a\" - \"b\"", "unknown operator: STRING - STRING"),
        ("[1] + [2]", "unknown operator: ARRAY + ARRAY"),
        ("z", "identifier not found: z"),
        ("1 / 0", "division by zero"),
        ("5()", "not a function: 5"),
        ("let f = fn(a, b) { return b }; f(1)", "identifier not found: b"),
    ]);
}

#[test]
fn test_error_stops_evaluation() {
    let (value, output) = evaluate_in(&Environment::new(), "log(1); missing; log(2)");
    assert!(value.is_error());
    assert_eq!(output, "1\n");

    let (value, output) = evaluate_in(
        &Environment::new(),
        "let f = fn() { log(\"before\"); 1 + true; log(\"after\") }; f(); log(\"end\")",
    );
    assert!(value.is_error());
    assert_eq!(output, "before\n");
}

#[test]
fn test_error_inside_array_literal_short_circuits() {
    let (value, output) = evaluate_in(&Environment::new(), "[log(1), missing, log(2)]");
    assert_eq!(value.to_string(), "ERROR: identifier not found: missing");
    assert_eq!(output, "1\n");
}

#[test]
fn test_function_values() {
    check_rendered(&[
        ("fn(x) { return x + 2 }", "fn(x) { return x + 2 }"),
        ("fn(x, y) { return x * y }", "fn(x, y) { return x * y }"),
        ("len", "builtin function"),
    ]);
}

#[test]
fn test_function_calls() {
    check_integers(&[
        ("let add = fn(x) { return x + 2 }; add(2)", 4),
        ("let mul = fn(x, y) { return x * y }; mul(3, 3)", 9),
        ("fn(x) { return x; }(5)", 5),
        ("let f = fn(a, b) { return b }; f(1, 2, 3)", 2),
        (
            "let fib = fn(n) { if (n < 2) { return n } return fib(n - 1) + fib(n - 2) }; fib(15)",
            610,
        ),
    ]);
}

#[test]
fn test_function_without_return_yields_null() {
    assert_eq!(evaluate("let f = fn() { 5 }; f()"), Value::Null);
    assert_eq!(evaluate("fn() {}()"), Value::Null);
}

#[test]
fn test_closures() {
    check_integers(&[
        (
            "let adder = fn(x) { return fn(y) { return x + y } }; let addTwo = adder(2); addTwo(3)",
            5,
        ),
        (
            "let counter = fn() { let count = 0; return fn() { count = count + 1; return count } };
             let next = counter(); next(); next(); next()",
            3,
        ),
    ]);
}

#[test]
fn test_while_loops() {
    check_integers(&[
        ("let i = 0; let sum = 0; while (i < 5) { i = i + 1; sum = sum + i; }; sum", 15),
        (
            "let f = fn() { let i = 0; while (true) { i = i + 1; if (i > 3) { return i } } }; f()",
            4,
        ),
    ]);
    assert_eq!(evaluate("while (false) { 1 }"), Value::Null);
    check_errors(&[
        ("while (1) { }", "while condition must be BOOLEAN: got INTEGER"),
        (
            "let i = 0; while (i < 3) { i = i + 1; i + true }",
            "type mismatch: INTEGER + BOOLEAN",
        ),
    ]);
}

#[test]
fn test_assignment_errors() {
    check_errors(&[
        ("x = 1", "identifier not found: x"),
        ("len = 1", "cannot assign to unbound identifier: len"),
        ("1 = 2", "cannot assign value to: INTEGER"),
        ("let f = fn() { return 1 }; f() = 2", "cannot assign value to: INTEGER"),
    ]);
}

#[test]
fn test_string_values() {
    check_rendered(&[
        ("\"hello\"", "hello"),
        ("let x = \"hello \" + \"world\"; x", "hello world"),
    ]);
}

#[test]
fn test_builtins() {
    check_integers(&[
        ("len(\"\")", 0),
        ("len(\"four\")", 4),
        ("len([1, 2, 3, 4])", 4),
        ("len(\"größe\")", 5),
        ("let l = len; l(\"abc\")", 3),
        ("let len = fn(x) { return 0 }; len(\"abc\")", 0),
    ]);
    check_errors(&[
        ("len(1)", "argument type is not supported: got INTEGER"),
        ("len(\"four\", \"three\")", "wrong number of arguments: got=2, want=1"),
        ("shift(1)", "argument type is not supported: got INTEGER"),
        ("append([1])", "wrong number of arguments: got=1, want>=2"),
    ]);
    check_rendered(&[
        ("shift([1, 2, 3])", "[2, 3]"),
        ("shift([])", "[]"),
        ("let a = [1, 2]; let b = shift(a); a", "[1, 2]"),
        ("append([1], 2, 3)", "[1, 2, 3]"),
        ("append([], 1)", "[]"),
        ("let a = [1]; let b = append(a, 2); a", "[1]"),
    ]);
}

#[test]
fn test_empty_shift_returns_same_array() {
    check_booleans(&[
        ("let a = []; shift(a) == a", true),
        ("let a = [1]; shift(a) == a", false),
        ("let a = []; append(a, 1) == a", true),
    ]);
}

#[test]
fn test_log_writes_rendered_arguments() {
    let (value, output) = evaluate_in(
        &Environment::new(),
        "log(\"total:\", 1 + 2, [1, \"b\"], {\"k\": true}); log()",
    );
    assert_eq!(value, Value::Null);
    assert_eq!(output, "total: 3 [1, \"b\"] {\"k\": true}\n\n");
}

#[test]
fn test_arrays() {
    check_rendered(&[
        ("[1, 2 * 2, 3 + 3]", "[1, 4, 6]"),
        ("[\"hello\", \"world\"]", "[\"hello\", \"world\"]"),
        ("[]", "[]"),
    ]);
    check_integers(&[
        ("let x = [1, 2, 3]; x[1]", 2),
        ("let y = [10, 22, 33]; y[1 + 1]", 33),
        ("[[1, 2], [3, 4]][1][0]", 3),
    ]);
    check_errors(&[
        ("[1, 2, 3][3]", "index out of bounds: got=3"),
        ("[1, 2, 3][-1]", "index out of bounds: got=-1"),
        ("[1][\"a\"]", "access expression is not integer: got STRING"),
        ("1[0]", "access by expression is not supported for this type: got INTEGER"),
    ]);
}

#[test]
fn test_hashes() {
    check_integers(&[
        ("{\"world\": 2}[\"world\"]", 2),
        ("let hello = \"variable\"; {hello: 1 + 1 * 100, \"world\": 2}[\"variable\"]", 101),
        ("let key = \"a\"; let h = {\"a\": 5}; h[key]", 5),
    ]);
    assert_eq!(evaluate("{\"world\": 2}[\"missing\"]"), Value::Null);
    check_rendered(&[("{\"b\": 2, \"a\": [1]}", "{\"a\": [1], \"b\": 2}"), ("{}", "{}")]);
    check_errors(&[
        ("{}[1]", "keys in hash tables must be strings: got INTEGER"),
        ("let k = 1; {k: 2}", "keys in hash tables must be strings: got INTEGER"),
        ("{missing: 1}", "identifier not found: missing"),
    ]);
}

#[test]
fn test_index_assignment_mutates_in_place() {
    check_rendered(&[
        ("let a = [1, 2]; a[0] = 5; a", "[5, 2]"),
        ("let h = {}; h[\"k\"] = 1; h", "{\"k\": 1}"),
        ("let h = {\"k\": [1]}; h[\"k\"][0] = 2; h", "{\"k\": [2]}"),
    ]);
    check_integers(&[
        ("let a = [1]; let b = a; b[0] = 9; a[0]", 9),
        ("let h = {}; let f = fn(m) { m[\"seen\"] = 1 }; f(h); h[\"seen\"]", 1),
    ]);
    check_errors(&[("let a = [1]; a[1] = 2", "index out of bounds: got=1")]);
}

#[test]
fn test_collection_equality_is_identity() {
    check_booleans(&[
        ("[1] == [1]", false),
        ("let a = [1]; a == a", true),
        ("let a = {}; let b = a; a != b", false),
        ("let f = fn() {}; f == f", true),
    ]);
}

#[test]
fn test_environment_persists_between_evaluations() {
    let environment = Environment::new();
    let (value, _) = evaluate_in(&environment, "let x = 5; let inc = fn() { x = x + 1 }");
    assert_eq!(value, Value::Null);
    evaluate_in(&environment, "inc(); inc()");
    let (value, _) = evaluate_in(&environment, "x");
    assert_eq!(value, Value::Integer(7));
}

proptest! {
    #[test]
    fn integer_literals_evaluate_to_themselves(value in 0..=i64::MAX) {
        prop_assert_eq!(evaluate(&value.to_string()), Value::Integer(value));
    }

    #[test]
    fn negated_literals_evaluate_to_negatives(value in 0..=i64::MAX) {
        prop_assert_eq!(evaluate(&format!("-{value}")), Value::Integer(-value));
    }

    #[test]
    fn integer_comparison_matches_host(lhs in any::<i32>(), rhs in any::<i32>()) {
        prop_assert_eq!(evaluate(&format!("{lhs} < {rhs}")), Value::Boolean(lhs < rhs));
    }
}
