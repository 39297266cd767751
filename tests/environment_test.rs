use macaque::{
    environment::native::{lookup_builtin, BUILTINS},
    interpreter::context::BufferedContext,
    value::{error::RuntimeError, NativeFunction},
    Environment, Value,
};

#[test]
fn test_access_walks_outwards() {
    let globals = Environment::new();
    globals.declare("x", Value::Integer(1));
    let inner = globals.new_scope().new_scope();
    assert_eq!(inner.access("x"), Some(Value::Integer(1)));
    assert_eq!(inner.access("y"), None);
}

#[test]
fn test_declare_shadows() {
    let globals = Environment::new();
    globals.declare("x", Value::Integer(1));
    let inner = globals.new_scope();
    inner.declare("x", Value::Integer(2));
    assert_eq!(inner.access("x"), Some(Value::Integer(2)));
    assert_eq!(globals.access("x"), Some(Value::Integer(1)));
}

#[test]
fn test_assign_updates_nearest_binding() {
    let globals = Environment::new();
    globals.declare("x", Value::Integer(1));
    let inner = globals.new_scope();
    assert!(inner.assign("x", Value::Integer(5)).is_ok());
    assert_eq!(globals.access("x"), Some(Value::Integer(5)));
    assert!(!inner.contains("y"));
}

#[test]
fn test_assign_unbound_fails() {
    let globals = Environment::new();
    let inner = globals.new_scope();
    assert_eq!(
        inner.assign("missing", Value::Null),
        Err(Value::Null)
    );
    assert!(!globals.contains("missing"));
}

#[test]
fn test_shared_handles_see_updates() {
    let globals = Environment::new();
    let alias = globals.clone();
    globals.declare("x", Value::Boolean(true));
    assert_eq!(alias.access("x"), Some(Value::Boolean(true)));
}

fn call(name: &str, arguments: &[Value]) -> Result<Value, RuntimeError> {
    let mut context = BufferedContext::new();
    BUILTINS[name].call(arguments, &mut context)
}

#[test]
fn test_registry_names() {
    for name in ["len", "shift", "append", "log"] {
        assert!(lookup_builtin(name).is_some(), "missing {name}");
    }
    assert!(lookup_builtin("print").is_none());
}

#[test]
fn test_len_counts_characters() {
    assert_eq!(call("len", &[Value::string("héllo")]), Ok(Value::Integer(5)));
}

#[test]
fn test_shift_empty_returns_same_array() {
    let empty = Value::array(Vec::new());
    let Ok(Value::Array(result)) = call("shift", &[empty.clone()]) else {
        panic!("shift should return an array");
    };
    let Value::Array(original) = empty else {
        unreachable!()
    };
    assert!(std::rc::Rc::ptr_eq(&result, &original));
}

#[test]
fn test_append_does_not_mutate() {
    let source = Value::array(vec![Value::Integer(1)]);
    let result = call("append", &[source.clone(), Value::Integer(2), Value::Integer(3)]);
    assert_eq!(
        result,
        Ok(Value::array(vec![
            Value::Integer(1),
            Value::Integer(2),
            Value::Integer(3)
        ]))
    );
    assert_eq!(source, Value::array(vec![Value::Integer(1)]));
}

#[test]
fn test_append_arity() {
    let error = call("append", &[Value::array(Vec::new())]).unwrap_err();
    assert_eq!(error.to_string(), "wrong number of arguments: got=1, want>=2");
}

#[test]
fn test_log_writes_joined_arguments() {
    let mut context = BufferedContext::new();
    let result = BUILTINS["log"].call(
        &[Value::string("a"), Value::Integer(1), Value::Boolean(true)],
        &mut context,
    );
    assert_eq!(result, Ok(Value::Null));
    assert_eq!(context.into_data(), "a 1 true\n");
}
