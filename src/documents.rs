//! Carga de documentos (plantilla y parámetros) y render completo.

use std::fs;
use std::path::Path;

use jsonparam_core::{ParameterSet, ParameterizeConfig, Parameterizer};
use log::debug;
use serde_json::Value;

use crate::errors::CoreError;

/// Lee y parsea un documento JSON completo.
pub fn load_document(path: impl AsRef<Path>) -> Result<Value, CoreError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let value = serde_json::from_str(&text)?;
    debug!("documento cargado: {}", path.display());
    Ok(value)
}

/// Convierte un objeto JSON en `ParameterSet` con los filtros estándar
/// (`upper`, `lower`, `trim`, `length`, `json`). Los valores del documento
/// tienen prioridad sobre los filtros con el mismo nombre.
pub fn params_from_value(value: Value) -> Result<ParameterSet, CoreError> {
    let Value::Object(map) = value else {
        return Err(CoreError::Internal("el documento de parámetros debe ser un objeto JSON".into()));
    };
    let mut params = ParameterSet::new().with_standard_filters();
    for (name, v) in map {
        params.insert(name, v);
    }
    Ok(params)
}

pub fn load_params(path: impl AsRef<Path>) -> Result<ParameterSet, CoreError> {
    params_from_value(load_document(path)?)
}

/// Parametriza `template` con `params` según `config`.
pub fn render(template: &Value, params: &ParameterSet, config: ParameterizeConfig) -> Result<Value, CoreError> {
    Ok(Parameterizer::new(config).parameterize(template, params)?)
}
