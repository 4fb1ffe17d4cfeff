use weft_core::{Callback, Component, EvalError, Value};

#[test]
fn truthiness_follows_script_rules() {
    assert!(!Value::Null.is_truthy());
    assert!(!Value::Bool(false).is_truthy());
    assert!(!Value::Number(0.0).is_truthy());
    assert!(!Value::Number(f64::NAN).is_truthy());
    assert!(!Value::from("").is_truthy());

    assert!(Value::Bool(true).is_truthy());
    assert!(Value::Number(-1.0).is_truthy());
    assert!(Value::from("0").is_truthy());
}

#[test]
fn display_renders_integers_without_fraction() {
    assert_eq!(Value::Number(3.0).to_string(), "3");
    assert_eq!(Value::Number(2.5).to_string(), "2.5");
    assert_eq!(Value::Null.to_string(), "");
    assert_eq!(Value::Bool(true).to_string(), "true");
}

#[test]
fn parse_literal() {
    assert_eq!(Value::parse_literal("true"), Value::Bool(true));
    assert_eq!(Value::parse_literal("12"), Value::Number(12.0));
    assert_eq!(Value::parse_literal("null"), Value::Null);
    assert_eq!(Value::parse_literal("Ann"), Value::from("Ann"));
}

#[test]
fn unbound_callback_cannot_be_called() {
    let cb = Callback::new(|_, _| Ok(Value::Null));
    assert!(!cb.is_bound());
    assert_eq!(cb.call(&[]), Err(EvalError::Detached));
}

#[test]
fn bound_callback_runs_against_owner() {
    let owner = Component::new("list").with_prop("selected", "").into_ref();
    let cb = Callback::new(|c, args| {
        let picked = args.first().cloned().unwrap_or_default();
        c.set("selected", picked.clone());
        Ok(picked)
    });
    let bound = cb.bind(&owner);

    assert_eq!(bound.call(&[Value::from("b")]), Ok(Value::from("b")));
    assert_eq!(owner.borrow().get("selected"), &Value::from("b"));
    assert!(owner.borrow().pending().contains("selected"));
}

#[test]
fn bound_callback_reports_dropped_owner() {
    let owner = Component::new("gone").into_ref();
    let bound = Callback::new(|_, _| Ok(Value::Null)).bind(&owner);
    drop(owner);
    assert_eq!(bound.call(&[]), Err(EvalError::Detached));
}

#[test]
fn bound_callback_reports_busy_owner() {
    let owner = Component::new("busy").into_ref();
    let bound = Callback::new(|_, _| Ok(Value::Null)).bind(&owner);
    let _guard = owner.borrow_mut();
    assert_eq!(bound.call(&[]), Err(EvalError::Busy));
}

#[test]
fn callback_equality_is_identity() {
    let owner = Component::new("o").into_ref();
    let a = Callback::new(|_, _| Ok(Value::Null));
    let b = a.clone();
    assert_eq!(Value::Callback(a.clone()), Value::Callback(b));
    assert_ne!(Value::Callback(a.bind(&owner)), Value::Callback(a));
}
