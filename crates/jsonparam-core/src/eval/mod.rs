//! Capacidad de evaluación de expresiones.
//!
//! El motor sólo depende del trait `Evaluator`. Se incluyen dos
//! implementaciones: `ExpressionEvaluator` (lenguaje de expresiones pequeño,
//! sin bucles, acotado por un deadline) e `IsolatedEvaluator`, que ejecuta
//! cualquier evaluador en un hilo aparte y corta por reloj.

pub mod interpreter;
pub mod isolated;
pub mod lexer;
pub mod ops;
pub mod parser;

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::params::ParameterSet;

pub use interpreter::ExpressionEvaluator;
pub use isolated::IsolatedEvaluator;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    #[error("syntax error at offset {offset}: {message}")]
    Syntax { message: String, offset: usize },
    #[error("undefined name `{0}`")]
    UndefinedName(String),
    #[error("{0}")]
    Runtime(String),
    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
}

/// Evalúa una expresión contra los parámetros.
///
/// `Ok(None)` representa un resultado ausente (p.ej. acceder a una propiedad
/// inexistente); el motor lo convierte en borrado de la entrada. Las
/// implementaciones no deben exceder `timeout` y no deben exponer a la
/// expresión nada más allá de `bindings`.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, expression: &str, bindings: &ParameterSet, timeout: Duration) -> Result<Option<Value>, EvalError>;
}
