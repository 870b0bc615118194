//! Semántica de valores: veracidad, aritmética, comparación y conversión a
//! texto. Compartida por el intérprete, el interpolador y las directivas.

use std::cmp::Ordering;

use serde_json::{Number, Value};

use super::EvalError;
use crate::params::filters::type_name;

// 2^53: por encima los f64 dejan de representar enteros de forma exacta.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// `null`, `false`, `0`, `""` y ausente son falsos; todo lo demás verdadero.
pub fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map_or(true, |f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Texto de un escalar para insertarlo dentro de una cadena. Arrays y
/// objetos no tienen representación escalar. Los flotantes enteros se
/// escriben sin decimales (`1.0` da `"1"`).
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(_) | Value::Object(_) => None,
        Value::Number(n) if n.is_f64() => Some(n.as_f64().and_then(number_from_f64).unwrap_or_else(|| n.clone()).to_string()),
        other => Some(other.to_string()),
    }
}

/// Convierte un `f64` en `Number`, normalizando los enteros exactos.
pub fn number_from_f64(f: f64) -> Option<Number> {
    if !f.is_finite() {
        return None;
    }
    if f.fract() == 0.0 && f.abs() < MAX_SAFE_INTEGER {
        return Some(Number::from(f as i64));
    }
    Number::from_f64(f)
}

#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn of(value: &Value) -> Option<Num> {
        let Value::Number(n) = value else { return None };
        n.as_i64().map(Num::Int).or_else(|| n.as_f64().map(Num::Float))
    }

    fn as_f64(self) -> f64 {
        match self {
            Num::Int(i) => i as f64,
            Num::Float(f) => f,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arith {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl Arith {
    fn symbol(self) -> &'static str {
        match self {
            Arith::Add => "+",
            Arith::Sub => "-",
            Arith::Mul => "*",
            Arith::Div => "/",
            Arith::Rem => "%",
        }
    }
}

fn float_value(f: f64) -> Result<Value, EvalError> {
    number_from_f64(f).map(Value::Number)
                      .ok_or_else(|| EvalError::Runtime("arithmetic produced a non-finite number".into()))
}

/// `+` concatena si alguno de los operandos es cadena; el resto de
/// operaciones exigen números.
pub fn arithmetic(op: Arith, left: &Value, right: &Value) -> Result<Value, EvalError> {
    if op == Arith::Add && (left.is_string() || right.is_string()) {
        return Ok(Value::String(format!("{}{}", concat_text(left), concat_text(right))));
    }
    let (Some(a), Some(b)) = (Num::of(left), Num::of(right)) else {
        return Err(EvalError::Runtime(format!("cannot apply `{}` to {} and {}", op.symbol(), type_name(left), type_name(right))));
    };
    if matches!(op, Arith::Div | Arith::Rem) && b.as_f64() == 0.0 {
        return Err(EvalError::Runtime("division by zero".into()));
    }
    if let (Num::Int(x), Num::Int(y)) = (a, b) {
        let exact = match op {
            Arith::Add => x.checked_add(y),
            Arith::Sub => x.checked_sub(y),
            Arith::Mul => x.checked_mul(y),
            Arith::Div => x.checked_rem(y).filter(|r| *r == 0).and_then(|_| x.checked_div(y)),
            Arith::Rem => x.checked_rem(y),
        };
        if let Some(v) = exact {
            return Ok(Value::from(v));
        }
    }
    let (x, y) = (a.as_f64(), b.as_f64());
    float_value(match op {
                    Arith::Add => x + y,
                    Arith::Sub => x - y,
                    Arith::Mul => x * y,
                    Arith::Div => x / y,
                    Arith::Rem => x % y,
                })
}

fn concat_text(value: &Value) -> String {
    scalar_text(value).unwrap_or_else(|| value.to_string())
}

pub fn negate(value: &Value) -> Result<Value, EvalError> {
    match Num::of(value) {
        Some(Num::Int(i)) => Ok(i.checked_neg().map(Value::from).unwrap_or_else(|| Value::from(-(i as f64)))),
        Some(Num::Float(f)) => float_value(-f),
        None => Err(EvalError::Runtime(format!("cannot negate {}", type_name(value)))),
    }
}

pub fn unary_plus(value: &Value) -> Result<Value, EvalError> {
    match value {
        Value::Number(_) => Ok(value.clone()),
        other => Err(EvalError::Runtime(format!("unary `+` expects a number, got {}", type_name(other)))),
    }
}

/// Orden entre números o entre cadenas; otras combinaciones son error.
pub fn compare(left: &Value, right: &Value) -> Result<Ordering, EvalError> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Ok(a.cmp(b)),
        _ => match (Num::of(left), Num::of(right)) {
            (Some(Num::Int(a)), Some(Num::Int(b))) => Ok(a.cmp(&b)),
            (Some(a), Some(b)) => a.as_f64()
                                   .partial_cmp(&b.as_f64())
                                   .ok_or_else(|| EvalError::Runtime("numbers are not comparable".into())),
            _ => Err(EvalError::Runtime(format!("cannot compare {} with {}", type_name(left), type_name(right)))),
        },
    }
}

/// Igualdad estructural; los números se comparan por valor (`1 == 1.0`).
pub fn loose_eq(left: Option<&Value>, right: Option<&Value>) -> bool {
    match (left, right) {
        (None, None) => true,
        (Some(a), Some(b)) => values_eq(a, b),
        _ => false,
    }
}

fn values_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(_), Value::Number(_)) => matches!(compare(a, b), Ok(Ordering::Equal)),
        (Value::Array(xs), Value::Array(ys)) => xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_eq(x, y)),
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len() && xs.iter().all(|(k, x)| ys.get(k).is_some_and(|y| values_eq(x, y)))
        }
        _ => a == b,
    }
}
