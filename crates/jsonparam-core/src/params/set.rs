//! `ParameterSet`: nombres -> `Binding`, de sólo lectura durante una llamada.
//!
//! Internamente se guarda detrás de un `Arc` para que clonar el conjunto sea
//! barato: el evaluador aislado lo mueve a un hilo worker por expresión.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::binding::{Binding, Callable};

#[derive(Clone, Debug, Default)]
pub struct ParameterSet {
    entries: Arc<IndexMap<String, Binding>>,
}

impl ParameterSet {
    /// Crea un conjunto vacío.
    pub fn new() -> Self {
        Self::default()
    }

    /// Construye un conjunto a partir de un objeto JSON (cada clave es un
    /// valor plano). Devuelve `None` si `value` no es un objeto.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self::from_map(map)),
            _ => None,
        }
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        let entries = map.into_iter().map(|(k, v)| (k, Binding::Value(v))).collect();
        Self { entries: Arc::new(entries) }
    }

    pub fn insert(&mut self, name: impl Into<String>, binding: impl Into<Binding>) {
        Arc::make_mut(&mut self.entries).insert(name.into(), binding.into());
    }

    pub fn with(mut self, name: impl Into<String>, binding: impl Into<Binding>) -> Self {
        self.insert(name, binding);
        self
    }

    pub fn with_value(self, name: impl Into<String>, value: Value) -> Self {
        self.with(name, Binding::Value(value))
    }

    /// Registra una función sin argumentos.
    pub fn with_fn0<F>(self, name: impl Into<String>, f: F) -> Self
        where F: Fn() -> Result<Value, String> + Send + Sync + 'static
    {
        self.with(name, Callable::new(0, move |_| f()))
    }

    /// Registra una función de un argumento (filtro en el dialecto pipeline).
    pub fn with_fn1<F>(self, name: impl Into<String>, f: F) -> Self
        where F: Fn(&Value) -> Result<Value, String> + Send + Sync + 'static
    {
        self.with(name, Callable::new(1, move |args| f(&args[0])))
    }

    pub fn with_fn<F>(self, name: impl Into<String>, arity: usize, f: F) -> Self
        where F: Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static
    {
        self.with(name, Callable::new(arity, f))
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl FromIterator<(String, Binding)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (String, Binding)>>(iter: I) -> Self {
        Self { entries: Arc::new(iter.into_iter().collect()) }
    }
}
