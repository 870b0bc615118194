//! Interpolación de cadenas: resuelve los marcadores de un string.
//!
//! Con el dialecto de expresiones, una cadena que es exactamente un marcador
//! devuelve el valor evaluado con su tipo; en cualquier otro caso cada
//! marcador se inserta como texto.

pub mod pipeline;
pub mod scanner;

use log::debug;
use serde_json::Value;

use crate::config::{Dialect, ParameterizeConfig};
use crate::errors::{ErrorKind, ParameterizeError};
use crate::eval::{ops, Evaluator};
use crate::params::filters::type_name;
use crate::params::ParameterSet;
use scanner::{scan, single_marker, Segment};

pub struct Interpolator<'a> {
    config: &'a ParameterizeConfig,
    evaluator: &'a dyn Evaluator,
}

impl<'a> Interpolator<'a> {
    pub fn new(config: &'a ParameterizeConfig, evaluator: &'a dyn Evaluator) -> Self {
        Self { config, evaluator }
    }

    /// `Ok(None)` sólo es posible con el dialecto de expresiones, cuando la
    /// cadena entera es un marcador cuyo resultado está ausente.
    pub fn interpolate(&self, text: &str, params: &ParameterSet) -> Result<Option<Value>, ParameterizeError> {
        let segments = scan(text, &self.config.delimiters);
        if !segments.iter().any(|s| matches!(s, Segment::Marker { .. })) {
            return Ok(Some(Value::String(text.to_string())));
        }

        if self.config.dialect == Dialect::Expression {
            if let Some((raw, body)) = single_marker(&segments) {
                return match self.evaluate(body.trim(), text, params) {
                    Err(err) if self.config.is_lenient() => {
                        debug!("keeping `{raw}`: {err}");
                        Ok(Some(Value::String(raw.to_string())))
                    }
                    other => other,
                };
            }
        }

        let mut out = String::with_capacity(text.len());
        for segment in segments {
            match segment {
                Segment::Literal(s) => out.push_str(s),
                Segment::Marker { raw, body } => match self.splice(body, text, params) {
                    Ok(s) => out.push_str(&s),
                    Err(err) if self.config.is_lenient() => {
                        debug!("keeping `{raw}`: {err}");
                        out.push_str(raw);
                    }
                    Err(err) => return Err(err),
                },
            }
        }
        Ok(Some(Value::String(out)))
    }

    /// Evalúa una expresión con el evaluador configurado y su timeout.
    pub(crate) fn evaluate(&self, expression: &str, fragment: &str, params: &ParameterSet) -> Result<Option<Value>, ParameterizeError> {
        self.evaluator
            .evaluate(expression, params, self.config.timeout())
            .map_err(|cause| ParameterizeError::from_eval(expression, fragment, cause))
    }

    fn splice(&self, body: &str, fragment: &str, params: &ParameterSet) -> Result<String, ParameterizeError> {
        let expression = body.trim();
        let value = match self.config.dialect {
            Dialect::Expression => self.evaluate(expression, fragment, params)?,
            Dialect::Pipeline => Some(pipeline::run(body, fragment, params)?),
        };
        splice_text(value.as_ref(), expression, fragment)
    }
}

/// Texto de un resultado para insertarlo en una cadena.
pub(crate) fn splice_text(value: Option<&Value>, expression: &str, fragment: &str) -> Result<String, ParameterizeError> {
    value.and_then(ops::scalar_text).ok_or_else(|| {
                                         ErrorKind::TypeMismatch { expression: expression.to_string(),
                                                                   fragment: fragment.to_string(),
                                                                   found: value.map_or("undefined", type_name) }.into()
                                     })
}
