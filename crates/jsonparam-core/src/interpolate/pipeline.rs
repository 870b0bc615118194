//! Dialecto pipeline: `{{ cabeza | filtro | filtro }}`.
//!
//! La cabeza es un literal entre comillas o un nombre. Un nombre ligado a un
//! valor da ese valor; ligado a una función sin argumentos, su resultado.
//! Cada filtro debe ser una función de un argumento.

use serde_json::Value;

use crate::errors::{ErrorKind, ParameterizeError};
use crate::eval::EvalError;
use crate::params::{Binding, ParameterSet};

/// Ejecuta el cuerpo de un marcador pipeline. `fragment` es la cadena que
/// lo contiene, para los errores.
pub fn run(body: &str, fragment: &str, params: &ParameterSet) -> Result<Value, ParameterizeError> {
    let mut stages = split_stages(body).into_iter();
    let head = stages.next().unwrap_or_default().trim();
    let mut value = resolve_head(head, fragment, params)?;
    for stage in stages {
        let name = stage.trim();
        let filter = match params.get(name) {
            Some(Binding::Callable(c)) if c.arity() == 1 => c,
            Some(_) => return Err(ErrorKind::InvalidFilterTarget { name: name.to_string(), fragment: fragment.to_string() }.into()),
            None => return Err(unresolved(name, fragment)),
        };
        value = filter.call(std::slice::from_ref(&value))
                      .map_err(|msg| ParameterizeError::from_eval(body.trim(), fragment, EvalError::Runtime(format!("`{name}` failed: {msg}"))))?;
    }
    Ok(value)
}

fn resolve_head(head: &str, fragment: &str, params: &ParameterSet) -> Result<Value, ParameterizeError> {
    if let Some(literal) = quoted(head) {
        return Ok(Value::String(literal.to_string()));
    }
    match params.get(head) {
        Some(Binding::Value(v)) => Ok(v.clone()),
        Some(Binding::Callable(c)) if c.arity() == 0 => {
            c.call(&[])
             .map_err(|msg| ParameterizeError::from_eval(head, fragment, EvalError::Runtime(format!("`{head}` failed: {msg}"))))
        }
        _ => Err(unresolved(head, fragment)),
    }
}

fn unresolved(name: &str, fragment: &str) -> ParameterizeError {
    ErrorKind::UnresolvedReference { name: name.to_string(), fragment: fragment.to_string() }.into()
}

/// Contenido de `'..'` o `".."` si `text` es exactamente eso.
fn quoted(text: &str) -> Option<&str> {
    let first = text.chars().next()?;
    if text.len() >= 2 && (first == '\'' || first == '"') && text.ends_with(first) {
        Some(&text[1..text.len() - 1])
    } else {
        None
    }
}

/// Parte por `|` fuera de comillas.
fn split_stages(body: &str) -> Vec<&str> {
    let mut stages = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, ch) in body.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(ch),
            (None, '|') => {
                stages.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    stages.push(&body[start..]);
    stages
}
