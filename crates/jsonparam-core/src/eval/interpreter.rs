//! `ExpressionEvaluator`: intérprete del lenguaje de expresiones por defecto.
//!
//! Sólo ve los `bindings` recibidos; no hay variables globales ni acceso al
//! host. El timeout se aplica como deadline cooperativo, comprobado en cada
//! nodo y tras cada llamada a una función de los parámetros.

use std::cmp::Ordering;
use std::time::{Duration, Instant};

use log::trace;
use serde_json::{Map, Value};

use super::ops::{self, loose_eq, truthy};
use super::parser::{parse, BinaryOp, Expr, UnaryOp};
use super::{EvalError, Evaluator};
use crate::params::{Binding, ParameterSet};

#[derive(Debug, Clone, Copy, Default)]
pub struct ExpressionEvaluator;

impl ExpressionEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for ExpressionEvaluator {
    fn evaluate(&self, expression: &str, bindings: &ParameterSet, timeout: Duration) -> Result<Option<Value>, EvalError> {
        let started = Instant::now();
        let ast = parse(expression)?;
        let interp = Interp { bindings, deadline: started.checked_add(timeout), timeout };
        let result = interp.eval(&ast);
        trace!("eval `{expression}` -> {result:?} ({:?})", started.elapsed());
        result
    }
}

struct Interp<'a> {
    bindings: &'a ParameterSet,
    deadline: Option<Instant>,
    timeout: Duration,
}

impl Interp<'_> {
    fn check_deadline(&self) -> Result<(), EvalError> {
        match self.deadline {
            Some(deadline) if Instant::now() > deadline => Err(EvalError::Timeout(self.timeout)),
            _ => Ok(()),
        }
    }

    /// Evalúa exigiendo un valor presente.
    fn value(&self, expr: &Expr, what: &str) -> Result<Value, EvalError> {
        self.eval(expr)?.ok_or_else(|| EvalError::Runtime(format!("{what} is undefined")))
    }

    fn eval(&self, expr: &Expr) -> Result<Option<Value>, EvalError> {
        self.check_deadline()?;
        match expr {
            Expr::Literal(v) => Ok(Some(v.clone())),
            Expr::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.value(item, "array item")?);
                }
                Ok(Some(Value::Array(out)))
            }
            Expr::Object(entries) => {
                let mut out = Map::new();
                for (key, item) in entries {
                    if let Some(v) = self.eval(item)? {
                        out.insert(key.clone(), v);
                    }
                }
                Ok(Some(Value::Object(out)))
            }
            Expr::Name(name) => match self.bindings.get(name) {
                Some(Binding::Value(v)) => Ok(Some(v.clone())),
                Some(Binding::Callable(_)) => Err(EvalError::Runtime(format!("`{name}` is a function, call it as `{name}(...)`"))),
                None => Err(EvalError::UndefinedName(name.clone())),
            },
            Expr::Call { callee, args } => self.call(callee, args).map(Some),
            Expr::Member(target, property) => {
                let target = self.eval(target)?;
                member(target.as_ref(), property)
            }
            Expr::Index(target, index) => {
                let target = self.eval(target)?;
                let index = self.value(index, "index")?;
                match (&target, &index) {
                    (Some(Value::Array(items)), Value::Number(n)) => {
                        Ok(n.as_u64().and_then(|i| usize::try_from(i).ok()).and_then(|i| items.get(i)).cloned())
                    }
                    (Some(_), Value::String(key)) => member(target.as_ref(), key),
                    (Some(Value::Null) | None, _) => Err(EvalError::Runtime(format!("cannot index {} with {index}", describe_opt(target.as_ref())))),
                    _ => Ok(None),
                }
            }
            Expr::Unary(op, operand) => {
                let v = self.eval(operand)?;
                match op {
                    UnaryOp::Not => Ok(Some(Value::Bool(!truthy(v.as_ref())))),
                    UnaryOp::Neg => ops::negate(&require(v, "operand of `-`")?).map(Some),
                    UnaryOp::Plus => ops::unary_plus(&require(v, "operand of `+`")?).map(Some),
                }
            }
            Expr::Binary(op, left, right) => {
                let l = self.eval(left)?;
                let r = self.eval(right)?;
                binary(*op, l, r).map(Some)
            }
            Expr::And(left, right) => {
                let l = self.eval(left)?;
                if truthy(l.as_ref()) { self.eval(right) } else { Ok(l) }
            }
            Expr::Or(left, right) => {
                let l = self.eval(left)?;
                if truthy(l.as_ref()) { Ok(l) } else { self.eval(right) }
            }
            Expr::Conditional(cond, then, otherwise) => {
                if truthy(self.eval(cond)?.as_ref()) {
                    self.eval(then)
                } else {
                    self.eval(otherwise)
                }
            }
        }
    }

    /// Una invocación por evaluación del nodo; argumentos de izquierda a
    /// derecha.
    fn call(&self, callee: &str, args: &[Expr]) -> Result<Value, EvalError> {
        let callable = match self.bindings.get(callee) {
            Some(Binding::Callable(c)) => c,
            Some(Binding::Value(_)) => return Err(EvalError::Runtime(format!("`{callee}` is not a function"))),
            None => return Err(EvalError::UndefinedName(callee.to_string())),
        };
        let mut values = Vec::with_capacity(args.len());
        for (i, arg) in args.iter().enumerate() {
            values.push(self.value(arg, &format!("argument {} of `{callee}`", i + 1))?);
        }
        let out = callable.call(&values).map_err(|msg| EvalError::Runtime(format!("`{callee}` failed: {msg}")))?;
        self.check_deadline()?;
        Ok(out)
    }
}

fn require(value: Option<Value>, what: &str) -> Result<Value, EvalError> {
    value.ok_or_else(|| EvalError::Runtime(format!("{what} is undefined")))
}

fn describe_opt(value: Option<&Value>) -> &'static str {
    value.map_or("undefined", crate::params::filters::type_name)
}

fn member(target: Option<&Value>, property: &str) -> Result<Option<Value>, EvalError> {
    match target {
        Some(Value::Object(map)) => Ok(map.get(property).cloned()),
        Some(Value::Array(items)) if property == "length" => Ok(Some(Value::from(items.len()))),
        Some(Value::String(s)) if property == "length" => Ok(Some(Value::from(s.chars().count()))),
        Some(Value::Null) | None => Err(EvalError::Runtime(format!("cannot read property `{property}` of {}", describe_opt(target)))),
        Some(_) => Ok(None),
    }
}

fn binary(op: BinaryOp, left: Option<Value>, right: Option<Value>) -> Result<Value, EvalError> {
    match op {
        BinaryOp::Eq => Ok(Value::Bool(loose_eq(left.as_ref(), right.as_ref()))),
        BinaryOp::NotEq => Ok(Value::Bool(!loose_eq(left.as_ref(), right.as_ref()))),
        _ => {
            let l = require(left, "left operand")?;
            let r = require(right, "right operand")?;
            match op {
                BinaryOp::Arith(a) => ops::arithmetic(a, &l, &r),
                BinaryOp::Lt => ops::compare(&l, &r).map(|o| Value::Bool(o == Ordering::Less)),
                BinaryOp::Le => ops::compare(&l, &r).map(|o| Value::Bool(o != Ordering::Greater)),
                BinaryOp::Gt => ops::compare(&l, &r).map(|o| Value::Bool(o == Ordering::Greater)),
                BinaryOp::Ge => ops::compare(&l, &r).map(|o| Value::Bool(o != Ordering::Less)),
                BinaryOp::Eq | BinaryOp::NotEq => unreachable!("handled above"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicI64, Ordering as AtomicOrdering};
    use std::sync::Arc;

    const BUDGET: Duration = Duration::from_millis(500);

    fn eval(expr: &str, params: &ParameterSet) -> Result<Option<Value>, EvalError> {
        ExpressionEvaluator::new().evaluate(expr, params, BUDGET)
    }

    fn params() -> ParameterSet {
        ParameterSet::from_json(json!({"a": 2, "b": 1, "s": "A", "obj": {"k": [10, 20]}, "none": null})).unwrap()
    }

    #[test]
    fn arithmetic_and_comparison() {
        let p = params();
        assert_eq!(eval("a + b", &p), Ok(Some(json!(3))));
        assert_eq!(eval("a > b", &p), Ok(Some(json!(true))));
        assert_eq!(eval("(a - b) * -3", &p), Ok(Some(json!(-3))));
        assert_eq!(eval("\"case\" + s", &p), Ok(Some(json!("caseA"))));
        assert_eq!(eval("a == 2.0 && s != 'B'", &p), Ok(Some(json!(true))));
    }

    #[test]
    fn members_and_indexes() {
        let p = params();
        assert_eq!(eval("obj.k[1]", &p), Ok(Some(json!(20))));
        assert_eq!(eval("obj['k'].length", &p), Ok(Some(json!(2))));
        assert_eq!(eval("obj.missing", &p), Ok(None));
        assert_eq!(eval("obj.k[9]", &p), Ok(None));
        assert!(matches!(eval("none.x", &p), Err(EvalError::Runtime(_))));
        assert!(matches!(eval("obj.missing.x", &p), Err(EvalError::Runtime(_))));
    }

    #[test]
    fn logical_operators_return_operands() {
        let p = params();
        assert_eq!(eval("none || s", &p), Ok(Some(json!("A"))));
        assert_eq!(eval("a && s", &p), Ok(Some(json!("A"))));
        assert_eq!(eval("!obj.missing", &p), Ok(Some(json!(true))));
        assert_eq!(eval("a < b ? 'x' : 'y'", &p), Ok(Some(json!("y"))));
        // cortocircuito: el nombre indefinido no se evalúa
        assert_eq!(eval("false && nope", &p), Ok(Some(json!(false))));
    }

    #[test]
    fn literals() {
        let p = ParameterSet::new();
        assert_eq!(eval("[1, 'a', null, {x: true}]", &p), Ok(Some(json!([1, "a", null, {"x": true}]))));
    }

    #[test]
    fn undefined_names_and_non_functions() {
        let p = params();
        assert_eq!(eval("nope + 1", &p), Err(EvalError::UndefinedName("nope".into())));
        assert!(matches!(eval("a()", &p), Err(EvalError::Runtime(m)) if m.contains("not a function")));
    }

    #[test]
    fn callables_run_once_per_call_in_order() {
        let counter = Arc::new(AtomicI64::new(0));
        let c = Arc::clone(&counter);
        let p = ParameterSet::new().with_fn1("func", move |x| {
                                       let i = c.fetch_add(1, AtomicOrdering::SeqCst) + 1;
                                       Ok(json!(x.as_i64().unwrap_or(0) + i))
                                   });
        assert_eq!(eval("[func(0), func(-1), func(1+1)]", &p), Ok(Some(json!([1, 1, 5]))));
        assert_eq!(counter.load(AtomicOrdering::SeqCst), 3);
        assert!(matches!(eval("func()", &p), Err(EvalError::Runtime(m)) if m.contains("expected 1 argument")));
    }

    #[test]
    fn callable_errors_are_runtime_errors() {
        let p = ParameterSet::new().with_fn0("boom", || Err("kaput".to_string()));
        assert_eq!(eval("boom()", &p), Err(EvalError::Runtime("`boom` failed: kaput".into())));
    }

    #[test]
    fn deadline_is_checked_after_slow_callables() {
        let p = ParameterSet::new().with_fn0("slow", || {
                                       std::thread::sleep(Duration::from_millis(30));
                                       Ok(json!(1))
                                   });
        let out = ExpressionEvaluator::new().evaluate("slow() + slow()", &p, Duration::from_millis(10));
        assert_eq!(out, Err(EvalError::Timeout(Duration::from_millis(10))));
    }
}
