//! Entradas de un `ParameterSet`: valores planos o funciones invocables.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// Firma de una función expuesta como parámetro.
pub type CallableFn = dyn Fn(&[Value]) -> Result<Value, String> + Send + Sync;

/// Función con aridad fija. Puede tener efectos (p.ej. contadores), por eso
/// el motor garantiza una invocación por aparición y en orden textual.
#[derive(Clone)]
pub struct Callable {
    arity: usize,
    func: Arc<CallableFn>,
}

impl Callable {
    pub fn new<F>(arity: usize, func: F) -> Self
        where F: Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static
    {
        Self { arity, func: Arc::new(func) }
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Invoca la función comprobando antes la aridad.
    pub fn call(&self, args: &[Value]) -> Result<Value, String> {
        if args.len() != self.arity {
            return Err(format!("expected {} argument(s), got {}", self.arity, args.len()));
        }
        (self.func)(args)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable").field("arity", &self.arity).finish_non_exhaustive()
    }
}

/// Valor asociado a un nombre dentro del conjunto de parámetros.
#[derive(Clone, Debug)]
pub enum Binding {
    Value(Value),
    Callable(Callable),
}

impl Binding {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Binding::Value(v) => Some(v),
            Binding::Callable(_) => None,
        }
    }

    pub fn as_callable(&self) -> Option<&Callable> {
        match self {
            Binding::Callable(c) => Some(c),
            Binding::Value(_) => None,
        }
    }
}

impl From<Value> for Binding {
    fn from(value: Value) -> Self {
        Binding::Value(value)
    }
}

impl From<Callable> for Binding {
    fn from(callable: Callable) -> Self {
        Binding::Callable(callable)
    }
}
