//! Recorrido recursivo del árbol de entrada.
//!
//! Cadenas y claves pasan por el `Interpolator`; arrays y objetos se
//! reconstruyen; los objetos directiva se resuelven antes de recurrir. Un
//! resultado ausente borra la entrada o el elemento del contenedor padre.
//! El orden de evaluación es el textual: clave antes que valor, entradas en
//! orden de iteración, elementos por índice.

pub mod directive;

use std::sync::Arc;

use log::debug;
use serde_json::{Map, Value};

use crate::config::ParameterizeConfig;
use crate::constants::{ELSE_KEY, SWITCH_KEY, THEN_KEY};
use crate::errors::{ParameterizeError, PathSegment};
use crate::eval::{ops, Evaluator, ExpressionEvaluator, IsolatedEvaluator};
use crate::interpolate::{splice_text, Interpolator};
use crate::params::ParameterSet;
pub use directive::Directive;

/// Motor de parametrización: configuración + evaluador.
///
/// Por defecto cada expresión se evalúa en un `IsolatedEvaluator`, de modo
/// que un callable bloqueado no retiene al llamante más allá del timeout.
#[derive(Clone)]
pub struct Parameterizer {
    config: ParameterizeConfig,
    evaluator: Arc<dyn Evaluator>,
}

impl Default for Parameterizer {
    fn default() -> Self {
        Self::new(ParameterizeConfig::default())
    }
}

impl std::fmt::Debug for Parameterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parameterizer").field("config", &self.config).finish_non_exhaustive()
    }
}

impl Parameterizer {
    pub fn new(config: ParameterizeConfig) -> Self {
        Self { config, evaluator: Arc::new(IsolatedEvaluator::default()) }
    }

    /// Evalúa en el hilo del llamante con deadline cooperativo, sin hilo
    /// worker. Un callable que bloquea retiene al llamante hasta que vuelve.
    pub fn cooperative(config: ParameterizeConfig) -> Self {
        Self::new(config).with_evaluator(Arc::new(ExpressionEvaluator::new()))
    }

    /// Sustituye el evaluador por defecto.
    pub fn with_evaluator(mut self, evaluator: Arc<dyn Evaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn config(&self) -> &ParameterizeConfig {
        &self.config
    }

    pub fn interpolator(&self) -> Interpolator<'_> {
        Interpolator::new(&self.config, self.evaluator.as_ref())
    }

    /// Parametriza `input`. Un resultado ausente en la raíz se devuelve como
    /// `null`.
    pub fn parameterize(&self, input: &Value, params: &ParameterSet) -> Result<Value, ParameterizeError> {
        Ok(self.substitute(input, params)?.unwrap_or(Value::Null))
    }

    pub fn substitute(&self, value: &Value, params: &ParameterSet) -> Result<Option<Value>, ParameterizeError> {
        let walker = Walker { interp: self.interpolator(), lenient: self.config.is_lenient(), params };
        walker.walk(value)
    }
}

struct Walker<'a> {
    interp: Interpolator<'a>,
    lenient: bool,
    params: &'a ParameterSet,
}

impl Walker<'_> {
    fn walk(&self, value: &Value) -> Result<Option<Value>, ParameterizeError> {
        match value {
            Value::String(text) => self.interp.interpolate(text, self.params),
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    if let Some(v) = self.walk(item).map_err(|e| e.at(PathSegment::Index(i)))? {
                        out.push(v);
                    }
                }
                Ok(Some(Value::Array(out)))
            }
            Value::Object(map) => {
                let directive = Directive::classify(map);
                match self.directive(&directive, map) {
                    Err(err) if self.lenient => {
                        debug!("{} directive treated as plain data: {err}", directive.key().unwrap_or("mapping"));
                        self.mapping(map).map(Some)
                    }
                    other => other,
                }
            }
            scalar => Ok(Some(scalar.clone())),
        }
    }

    fn mapping(&self, map: &Map<String, Value>) -> Result<Value, ParameterizeError> {
        let mut out = Map::with_capacity(map.len());
        for (key, value) in map {
            let at = |e: ParameterizeError| e.at(PathSegment::Key(key.clone()));
            let new_key = self.key(key).map_err(at)?;
            if let Some(v) = self.walk(value).map_err(at)? {
                out.insert(new_key, v);
            }
        }
        Ok(Value::Object(out))
    }

    /// Una clave cuya interpolación no da una cadena conserva su texto.
    fn key(&self, key: &str) -> Result<String, ParameterizeError> {
        match self.interp.interpolate(key, self.params)? {
            Some(Value::String(s)) => Ok(s),
            other => {
                debug!("key `{key}` interpolated to {other:?}, keeping original text");
                Ok(key.to_string())
            }
        }
    }

    fn directive(&self, directive: &Directive<'_>, map: &Map<String, Value>) -> Result<Option<Value>, ParameterizeError> {
        let own_key = |e: ParameterizeError| e.at(PathSegment::Key(directive.key().unwrap_or_default().to_string()));
        match *directive {
            Directive::Conditional { condition, then, otherwise } => {
                let value = self.expression(condition).map_err(own_key)?;
                let (branch, label) = if ops::truthy(value.as_ref()) { (then, THEN_KEY) } else { (otherwise, ELSE_KEY) };
                match branch {
                    Some(b) => self.walk(b).map_err(|e| e.at(PathSegment::Key(label.to_string()))),
                    None => Ok(None),
                }
            }
            Directive::Switch { selector, cases } => {
                let Some(value) = self.expression(selector).map_err(own_key)? else {
                    return Ok(None);
                };
                let source = selector.as_str().unwrap_or_default();
                let label = splice_text(Some(&value), source, source).map_err(own_key)?;
                match cases.get(&label) {
                    Some(case) if label != SWITCH_KEY => self.walk(case).map_err(|e| e.at(PathSegment::Key(label.clone()))),
                    _ => Ok(None),
                }
            }
            // el resultado es dato, no plantilla: no se vuelve a sustituir
            Directive::RawEval { expression } => self.expression(expression).map_err(own_key),
            Directive::Plain => self.mapping(map).map(Some),
        }
    }

    /// Campos no textuales pasan sin evaluar.
    fn expression(&self, field: &Value) -> Result<Option<Value>, ParameterizeError> {
        match field {
            Value::String(expr) => self.interp.evaluate(expr, expr, self.params),
            literal => Ok(Some(literal.clone())),
        }
    }
}
