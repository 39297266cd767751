use macaque::{
    interpreter::context::BufferedContext,
    repl::{LineOutcome, Session},
    Value,
};

#[test]
fn test_bindings_persist_between_lines() {
    let mut session = Session::new(BufferedContext::new());
    assert!(matches!(
        session.evaluate_line("let x = 5;"),
        LineOutcome::Value(Value::Null)
    ));
    assert!(matches!(
        session.evaluate_line("x * 2"),
        LineOutcome::Value(Value::Integer(10))
    ));
}

#[test]
fn test_parse_errors_skip_evaluation() {
    let mut session = Session::new(BufferedContext::new());
    let outcome = session.evaluate_line("let y = ; log(1)");
    assert!(matches!(outcome, LineOutcome::ParseErrors(ref errors) if errors.len() == 1));
    assert_eq!(session.get_context().get_data(), "");
    assert!(!session.get_environment().contains("y"));
}

#[test]
fn test_errors_do_not_end_session() {
    let mut session = Session::new(BufferedContext::new());
    assert!(matches!(
        session.evaluate_line("missing"),
        LineOutcome::Value(Value::Error(_))
    ));
    assert!(matches!(
        session.evaluate_line("1 + 1"),
        LineOutcome::Value(Value::Integer(2))
    ));
    assert!(matches!(session.evaluate_line("   "), LineOutcome::Empty));
}

#[test]
fn test_log_output_accumulates_in_session() {
    let mut session = Session::new(BufferedContext::new());
    let outcome = session.evaluate_line("log(\"a\"); log(1, true)");
    assert!(matches!(outcome, LineOutcome::Value(ref value) if value.is_null()));
    assert_eq!(session.get_context().get_data(), "a\n1 true\n");
}
