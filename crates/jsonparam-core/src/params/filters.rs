//! Filtros estándar de un argumento, listos para registrar en un
//! `ParameterSet` (útiles sobre todo con el dialecto pipeline y el CLI).

use serde_json::Value;

use super::set::ParameterSet;

impl ParameterSet {
    /// Añade `upper`, `lower`, `trim`, `length` y `json`. Un parámetro con el
    /// mismo nombre ya existente se reemplaza.
    pub fn with_standard_filters(self) -> Self {
        self.with_fn1("upper", |v| map_str(v, "upper", str::to_uppercase))
            .with_fn1("lower", |v| map_str(v, "lower", str::to_lowercase))
            .with_fn1("trim", |v| map_str(v, "trim", |s| s.trim().to_string()))
            .with_fn1("length", length)
            .with_fn1("json", |v| serde_json::to_string(v).map(Value::String).map_err(|e| e.to_string()))
    }
}

fn map_str(value: &Value, name: &str, f: impl Fn(&str) -> String) -> Result<Value, String> {
    match value {
        Value::String(s) => Ok(Value::String(f(s))),
        other => Err(format!("{name} expects a string, got {}", type_name(other))),
    }
}

fn length(value: &Value) -> Result<Value, String> {
    let n = match value {
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        other => return Err(format!("length expects a string, array or object, got {}", type_name(other))),
    };
    Ok(Value::from(n))
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
