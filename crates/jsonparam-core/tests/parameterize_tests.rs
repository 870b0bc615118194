use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use jsonparam_core::{parameterize, ErrorKind, ParameterSet};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn params(value: Value) -> ParameterSet {
    ParameterSet::from_json(value).expect("params must be an object")
}

#[test]
fn empty_case() {
    assert_eq!(parameterize(&json!({}), &ParameterSet::new()).unwrap(), json!({}));
}

#[test]
fn string_extraction() {
    let input = json!({
        "key1": "${'Hello World'}",
        "key2": "${   'Hello World'   }",
        "key3": "${\"Hello World\"}",
        "key4": "${  \"Hello World\"   }"
    });
    let expected = json!({"key1": "Hello World", "key2": "Hello World", "key3": "Hello World", "key4": "Hello World"});
    assert_eq!(parameterize(&input, &ParameterSet::new()).unwrap(), expected);
}

#[test]
fn substitute_strings_in() {
    let input = json!({"key1": "${param1}", "key2": "${param2}"});
    let p = params(json!({"param1": "PAR1", "param2": "PAR2"}));
    assert_eq!(parameterize(&input, &p).unwrap(), json!({"key1": "PAR1", "key2": "PAR2"}));
}

#[test]
fn substitute_functions_in() {
    let input = json!({"key1": "${param1()}", "key2": "${param2()}"});
    let p = ParameterSet::new().with_fn0("param1", || Ok(json!("PAR1")))
                               .with_fn0("param2", || Ok(json!(format!("PAR{}", 1 + 1))));
    assert_eq!(parameterize(&input, &p).unwrap(), json!({"key1": "PAR1", "key2": "PAR2"}));
}

#[test]
fn substitute_objects_in() {
    let input = json!({"key1": {"$eval": "param1"}, "key2": {"$eval": "param2"}});
    let p = params(json!({"param1": {"my": "dictionary"}, "param2": [1, 2, 3, 4]}));
    assert_eq!(parameterize(&input, &p).unwrap(), json!({"key1": {"my": "dictionary"}, "key2": [1, 2, 3, 4]}));
}

#[test]
fn objects_in_key_position_keep_the_key() {
    let input = json!({"${param1}": {"$eval": "param2"}});
    let p = params(json!({"param1": {"my": "dictionary"}, "param2": [1, 2, 3, 4]}));
    assert_eq!(parameterize(&input, &p).unwrap(), json!({"${param1}": [1, 2, 3, 4]}));
}

#[test]
fn objects_cannot_be_spliced_into_text() {
    let input = json!({"key": "prefix-${param1}"});
    let p = params(json!({"param1": {"my": "dictionary"}}));
    let err = parameterize(&input, &p).unwrap_err();
    assert_eq!(err.kind(),
               &ErrorKind::TypeMismatch { expression: "param1".into(), fragment: "prefix-${param1}".into(), found: "object" });
}

fn case_params() -> ParameterSet {
    ParameterSet::new().with_fn1("toUpper", |v| Ok(json!(v.as_str().unwrap_or_default().to_uppercase())))
                       .with_fn1("toLower", |v| Ok(json!(v.as_str().unwrap_or_default().to_lowercase())))
                       .with_value("text", json!("hello World"))
}

#[test]
fn modify_string() {
    let input = json!({
        "key1": "${ toUpper( 'hello world') }",
        "key2": "${  toLower(toUpper('hello world'))   }",
        "key3": "${   toLower(  toUpper(  text))  }"
    });
    let expected = json!({"key1": "HELLO WORLD", "key2": "hello world", "key3": "hello world"});
    assert_eq!(parameterize(&input, &case_params()).unwrap(), expected);
}

#[test]
fn substitute_into_a_key() {
    let input = json!({"${prefix}Key": "Value"});
    assert_eq!(parameterize(&input, &params(json!({"prefix": "Some"}))).unwrap(), json!({"SomeKey": "Value"}));
}

fn if_input() -> Value {
    json!({"value": {"$if": "a > b", "then": "a is greater than b", "else": "a is less than or equal to b"}})
}

#[test]
fn if_then() {
    let out = parameterize(&if_input(), &params(json!({"a": 2, "b": 1}))).unwrap();
    assert_eq!(out, json!({"value": "a is greater than b"}));
}

#[test]
fn if_else() {
    let out = parameterize(&if_input(), &params(json!({"a": 1, "b": 2}))).unwrap();
    assert_eq!(out, json!({"value": "a is less than or equal to b"}));
}

#[test]
fn conditional_property_true() {
    let input = json!({"value": {"$if": "a > b", "then": "Value only if a > b"}});
    let out = parameterize(&input, &params(json!({"a": 2, "b": 1}))).unwrap();
    assert_eq!(out, json!({"value": "Value only if a > b"}));
}

#[test]
fn conditional_property_false() {
    let input = json!({"value": {"$if": "a > b", "then": "Value only if a > b"}});
    let out = parameterize(&input, &params(json!({"a": 1, "b": 2}))).unwrap();
    assert!(out.get("value").is_none(), "value must be removed, not set to null");
    assert_eq!(out, json!({}));
}

#[test]
fn if_nested_eval() {
    let input = json!({"value": {"$if": "a > b", "then": {"$eval": "a + b"}}});
    assert_eq!(parameterize(&input, &params(json!({"a": 2, "b": 1}))).unwrap(), json!({"value": 3}));
}

#[test]
fn switch_matching_case() {
    let input = json!({"value": {"$switch": "\"case\" + a", "caseA": "Got case A", "caseB": "Got case B"}});
    assert_eq!(parameterize(&input, &params(json!({"a": "A"}))).unwrap(), json!({"value": "Got case A"}));
}

#[test]
fn switch_without_match_is_absent() {
    let input = json!({"value": {"$switch": "\"case\" + a"}});
    assert_eq!(parameterize(&input, &params(json!({"a": "A"}))).unwrap(), json!({}));
}

#[test]
fn switch_nested_eval() {
    let input = json!({"value": {"$switch": "\"case\" + a", "caseA": {"$eval": "a + b"}, "caseB": "Got case B"}});
    assert_eq!(parameterize(&input, &params(json!({"a": "A", "b": "B"}))).unwrap(), json!({"value": "AB"}));
}

#[test]
fn integral_float_parameters_select_integer_labels() {
    let input = json!({"value": {"$switch": "x", "1": "one", "1.0": "float one"}, "text": "n=${x}"});
    assert_eq!(parameterize(&input, &params(json!({"x": 1.0}))).unwrap(), json!({"value": "one", "text": "n=1"}));
}

#[test]
fn function_as_parameter() {
    let calls = Arc::new(AtomicI64::new(0));
    let counter = Arc::clone(&calls);
    let p = ParameterSet::new().with_fn1("func", move |x| {
                                   let i = counter.fetch_add(1, Ordering::SeqCst) + 1;
                                   Ok(json!(x.as_i64().unwrap_or_default() + i))
                               });
    let input = json!({"value": [
        {"$eval": "func(0)"},
        {"$eval": "func(0)"},
        {"$eval": "func(-1)"},
        {"$eval": "func(-2)"},
        {"$eval": "func(0)"},
        {"$eval": "func(0)"},
        {"$eval": "func(0)"},
        {"$eval": "func(0)"},
        {"$eval": "func(0)"},
        {"$eval": "func(1+1)"}
    ]});
    assert_eq!(parameterize(&input, &p).unwrap(), json!({"value": [1, 2, 2, 2, 5, 6, 7, 8, 9, 12]}));
    assert_eq!(calls.load(Ordering::SeqCst), 10);
}

#[test]
fn eval_output_is_not_substituted_again() {
    let p = params(json!({"tpl": {"x": "${a}"}, "a": 1}));
    assert_eq!(parameterize(&json!({"$eval": "tpl"}), &p).unwrap(), json!({"x": "${a}"}));
}
