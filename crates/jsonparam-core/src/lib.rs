//! jsonparam-core: parametrización de árboles JSON.
//!
//! Sustituye referencias y expresiones embebidas en un documento JSON a
//! partir de un `ParameterSet`, resolviendo además las directivas `$if`,
//! `$switch` y `$eval`. El evaluador de expresiones es una capacidad
//! inyectable (`Evaluator`).

pub mod config;
pub mod constants;
pub mod errors;
pub mod eval;
pub mod interpolate;
pub mod params;
pub mod substitute;

pub use config::{ConfigError, Delimiters, Dialect, FailurePolicy, ParameterizeConfig};
pub use errors::{ErrorKind, ParameterizeError, PathSegment};
pub use eval::{EvalError, Evaluator, ExpressionEvaluator, IsolatedEvaluator};
pub use interpolate::Interpolator;
pub use params::{Binding, Callable, ParameterSet};
pub use substitute::{Directive, Parameterizer};

use serde_json::Value;

/// Parametriza `input` con la configuración por defecto (dialecto de
/// expresiones `${..}`, modo estricto, 500 ms por expresión, evaluación
/// aislada).
pub fn parameterize(input: &Value, params: &ParameterSet) -> Result<Value, ParameterizeError> {
    Parameterizer::default().parameterize(input, params)
}
