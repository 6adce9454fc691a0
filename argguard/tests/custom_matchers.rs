use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use argguard::{
    Guard, GuardConfig, GuardResult, LogAssertion, MatcherSet, Schema, Schemas, Value,
    schema,
    value::OpaqueObject,
};

#[derive(Debug)]
struct Foo {
    #[allow(dead_code)]
    name: &'static str,
}

impl OpaqueObject for Foo {}

fn foo() -> Value {
    Value::opaque(Foo { name: "FooType" })
}

fn is_foo(value: &Value) -> bool {
    match value {
        Value::Opaque(object) => object.downcast_ref::<Foo>().is_some(),
        _ => false,
    }
}

fn custom_matchers() -> MatcherSet {
    MatcherSet::new()
        .predicate("Name", |value| match value {
            Value::String(name) => {
                name.chars().count() > 1 && name.chars().next().is_some_and(char::is_uppercase)
            }
            _ => false,
        })
        .predicate("Foo", is_foo)
        .alias("foo", "Foo")
}

fn foo_schema() -> Schemas {
    schema! { one: "Foo", tow: "opt num or foo", three: "opt Foo" }.into()
}

#[test]
fn with_rejects_non_record_matcher_sets() {
    for thing in [
        Value::Undefined,
        Value::Null,
        1.into(),
        "str".into(),
        Value::Array(vec![]),
    ] {
        let err = MatcherSet::from_value(&thing).unwrap_err();
        assert!(err.is_usage());
        assert!(err.to_string().contains("`checkers` argument must to be an object"));
    }

    let empty = MatcherSet::from_value(&Value::Object(Default::default())).unwrap();
    assert!(empty.is_empty());
    let _ = Guard::new().with(&empty);
}

#[test]
fn custom_type_with_alias() {
    let parent = Guard::new();
    let custom = parent.with(&custom_matchers());
    let values = Value::Array(vec![foo(), foo(), foo()]);

    let parsed = custom.check_strict(&values, &foo_schema()).unwrap();
    assert_eq!(parsed.len(), 3);
    assert!(parsed.values().all(is_foo));

    let err = parent.check_strict(&values, &foo_schema()).unwrap_err();
    assert_eq!(err.reason(), Some("`one` is not Foo"));

    let other = Value::Array(vec!["str".into(), 10.into(), Value::Object(Default::default())]);
    let err = custom.check_strict(&other, &foo_schema()).unwrap_err();
    assert_eq!(err.reason(), Some("`one` is not Foo"));
}

#[test]
fn predicates_see_the_raw_value() {
    let custom = Guard::new().with(&custom_matchers());
    let schema: Schemas = schema! { name: "opt Name", rest: "str" }.into();

    let parsed = custom
        .check(&Value::Array(vec!["Jake".into(), "x".into()]), &schema)
        .unwrap();
    assert_eq!(parsed["name"], Value::from("Jake"));

    let parsed = custom
        .check(&Value::Array(vec!["jake".into()]), &schema)
        .unwrap();
    assert!(!parsed.contains_key("name"));
    assert_eq!(parsed["rest"], Value::from("jake"));
}

#[test]
fn extension_overrides_builtins_for_the_child_only() {
    let parent = Guard::new();
    let child = parent.with(
        &MatcherSet::new().predicate("s|str|string", |v| matches!(v, Value::String(s) if !s.is_empty())),
    );
    let schema: Schemas = schema! { str: "str" }.into();
    let empty = Value::Array(vec!["".into()]);

    assert!(parent.check(&empty, &schema).is_ok());
    assert_eq!(
        child.check(&empty, &schema).unwrap_err().reason(),
        Some("`str` is not str")
    );
}

#[test]
fn overriding_array_changes_array_suffix() {
    let guard = Guard::new().with(
        &MatcherSet::new().predicate("array", |v| v.is_array() || v.is_arguments()),
    );
    let values = Value::Array(vec![Value::arguments([1.into(), 2.into()])]);
    let schema: Schemas = schema! { nums: "num array" }.into();

    assert!(guard.check(&values, &schema).is_ok());
    assert_eq!(
        Guard::new().check(&values, &schema).unwrap_err().reason(),
        Some("`nums` is not array")
    );
}

#[test]
fn assertion_strategy_is_replaceable() {
    let calls = Arc::new(AtomicUsize::new(0));
    let spy = {
        let calls = Arc::clone(&calls);
        move |_: &str| -> GuardResult<()> {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    };

    let mut guard = Guard::new();
    let previous = guard.set_assertion(Arc::new(spy));
    let values = Value::Array(vec![123.into()]);
    let schema: Schemas = schema! { one: "string" }.into();

    assert!(guard.check(&values, &schema).is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    guard.set_assertion(previous);
    assert!(guard.check(&values, &schema).is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // Extensions share the strategy of their parent.
    let soft = Guard::new().with_assertion(LogAssertion);
    assert!(soft.with(&MatcherSet::new()).check(&values, &schema).is_ok());
}

#[test]
fn guard_from_config() {
    let config = GuardConfig::from_toml_str(
        r#"
        strict = true
        max_alias_hops = 4

        [aliases]
        "int|integer" = "number"
        "#,
        "<inline>",
    )
    .unwrap();
    let guard = Guard::from_config(&config);
    assert!(guard.is_strict());
    assert_eq!(guard.registry().max_alias_hops(), 4);

    let schema: Schemas = Schema::new().arg("count", "int").arg("more", "opt integer").into();
    let parsed = guard.check(&Value::Array(vec![3.into()]), &schema).unwrap();
    assert_eq!(parsed["count"], Value::from(3));

    let err = guard
        .check(&Value::Array(vec![3.into(), 4.into(), "x".into()]), &schema)
        .unwrap_err();
    assert_eq!(err.reason(), Some("Unexpected argument \"x\""));

    let soft = Guard::from_config(&GuardConfig {
        soft_fail: true,
        ..GuardConfig::default()
    });
    assert!(soft.check(&Value::Array(vec![]), &schema).is_ok());
}
