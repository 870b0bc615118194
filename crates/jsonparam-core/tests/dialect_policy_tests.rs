use std::sync::Arc;
use std::time::Duration;

use jsonparam_core::{Delimiters, Dialect, ErrorKind, EvalError, Evaluator, IsolatedEvaluator, ParameterSet, ParameterizeConfig,
                     Parameterizer};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn pipeline() -> Parameterizer {
    Parameterizer::new(ParameterizeConfig::default().with_dialect(Dialect::Pipeline))
}

fn pipeline_params() -> ParameterSet {
    ParameterSet::from_json(json!({"name": "ada", "count": 3})).unwrap()
                                                                .with_standard_filters()
                                                                .with_fn0("host", || Ok(json!("db.local")))
}

#[test]
fn pipeline_literals_names_and_filters() {
    let input = json!({
        "lit": "{{ 'x' | upper }}",
        "chain": "{{name|upper|lower}}",
        "call": "postgres://{{ host }}:5432",
        "num": "{{count}}",
        "key-{{name}}": true
    });
    let expected = json!({
        "lit": "X",
        "chain": "ada",
        "call": "postgres://db.local:5432",
        "num": "3",
        "key-ada": true
    });
    assert_eq!(pipeline().parameterize(&input, &pipeline_params()).unwrap(), expected);
}

#[test]
fn pipeline_unknown_filter_strict_vs_lenient() {
    let input = json!({"v": "hi {{ name | shout }}"});
    let err = pipeline().parameterize(&input, &pipeline_params()).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::UnresolvedReference { name: "shout".into(), fragment: "hi {{ name | shout }}".into() });
    assert_eq!(err.path_string(), "$.v");

    let lenient = Parameterizer::new(ParameterizeConfig::default().with_dialect(Dialect::Pipeline).lenient());
    assert_eq!(lenient.parameterize(&input, &pipeline_params()).unwrap(), input);
}

#[test]
fn pipeline_filter_must_be_callable() {
    let err = pipeline().parameterize(&json!("{{ name | count }}"), &pipeline_params()).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::InvalidFilterTarget { name, .. } if name == "count"));
}

#[test]
fn directives_still_use_the_evaluator_in_pipeline_dialect() {
    let input = json!({"v": {"$if": "count > 2", "then": "{{name | upper}}"}});
    assert_eq!(pipeline().parameterize(&input, &pipeline_params()).unwrap(), json!({"v": "ADA"}));
}

#[test]
fn custom_delimiters() {
    let config = ParameterizeConfig::default().with_delimiters(Delimiters::new("<<", ">>").unwrap());
    let engine = Parameterizer::new(config);
    let p = ParameterSet::from_json(json!({"port": 8080})).unwrap();
    let input = json!({"port": "<< port >>", "url": "http://x:<<port>>/${port}"});
    assert_eq!(engine.parameterize(&input, &p).unwrap(), json!({"port": 8080, "url": "http://x:8080/${port}"}));
}

#[test]
fn lenient_mode_never_fails() {
    let engine = Parameterizer::new(ParameterizeConfig::default().lenient());
    let p = ParameterSet::from_json(json!({"a": 1, "list": [1, 2]})).unwrap();
    let input = json!({
        "text": "a=${a}, b=${b}",
        "whole": "${ 1 + }",
        "splice": "list=${list}",
        "cond": {"$if": "missing", "then": 1},
        "ok": {"$if": "a", "then": "yes"}
    });
    let expected = json!({
        "text": "a=1, b=${b}",
        "whole": "${ 1 + }",
        "splice": "list=${list}",
        "cond": {"$if": "missing", "then": 1},
        "ok": "yes"
    });
    assert_eq!(engine.parameterize(&input, &p).unwrap(), expected);
}

struct Sleepy;

impl Evaluator for Sleepy {
    fn evaluate(&self, _: &str, _: &ParameterSet, _: Duration) -> Result<Option<Value>, EvalError> {
        std::thread::sleep(Duration::from_millis(250));
        Ok(Some(json!("too late")))
    }
}

#[test]
fn isolated_evaluator_times_out() {
    let config = ParameterizeConfig::default().with_timeout(Duration::from_millis(25));
    let engine = Parameterizer::new(config).with_evaluator(Arc::new(IsolatedEvaluator::new(Sleepy)));
    let err = engine.parameterize(&json!({"slow": ["${anything}"]}), &ParameterSet::new()).unwrap_err();
    assert_eq!(err.kind(),
               &ErrorKind::EvaluationTimeout { expression: "anything".into(),
                                               fragment: "${anything}".into(),
                                               timeout: Duration::from_millis(25) });
    assert_eq!(err.to_string(), "evaluation of `anything` in `${anything}` exceeded 25ms (at $.slow[0])");
}

#[test]
fn timeouts_are_recoverable_in_lenient_mode() {
    let config = ParameterizeConfig::default().with_timeout(Duration::from_millis(25)).lenient();
    let engine = Parameterizer::new(config).with_evaluator(Arc::new(IsolatedEvaluator::new(Sleepy)));
    let out = engine.parameterize(&json!({"v": "${x}", "w": {"$eval": "x"}}), &ParameterSet::new()).unwrap();
    assert_eq!(out, json!({"v": "${x}", "w": {"$eval": "x"}}));
}

#[test]
fn config_from_lookup_rejects_bad_values() {
    let bad_dialect = ParameterizeConfig::from_lookup(|name| (name == "JSONPARAM_DIALECT").then(|| "jinja".to_string()));
    assert!(bad_dialect.is_err());
    let bad_timeout = ParameterizeConfig::from_lookup(|name| (name == "JSONPARAM_TIMEOUT_MS").then(|| "soon".to_string()));
    assert!(bad_timeout.unwrap_err().to_string().contains("JSONPARAM_TIMEOUT_MS"));
    let empty_open = ParameterizeConfig::from_lookup(|name| (name == "JSONPARAM_OPEN").then(String::new));
    assert!(empty_open.is_err());
}
