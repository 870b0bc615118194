//! Serialización del documento resultante.
//!
//! `Canonical` produce claves ordenadas y sin espacios, útil para comparar
//! salidas de distintas plantillas independientemente del orden de origen.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde_json::Value;

use crate::errors::CoreError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
    Canonical,
}

impl FromStr for OutputFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(OutputFormat::Pretty),
            "compact" => Ok(OutputFormat::Compact),
            "canonical" => Ok(OutputFormat::Canonical),
            other => Err(CoreError::Internal(format!("formato de salida desconocido: {other}"))),
        }
    }
}

pub fn to_text(value: &Value, format: OutputFormat) -> Result<String, CoreError> {
    Ok(match format {
        OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        OutputFormat::Compact => serde_json::to_string(value)?,
        OutputFormat::Canonical => to_canonical_json(value),
    })
}

/// Representación canónica: objetos con claves ordenadas, sin espacios.
pub fn to_canonical_json(value: &Value) -> String {
    match value {
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(to_canonical_json).collect();
            format!("[{}]", items.join(","))
        }
        Value::Object(map) => {
            let tree: BTreeMap<&String, String> = map.iter().map(|(k, v)| (k, to_canonical_json(v))).collect();
            let items: Vec<String> = tree.into_iter()
                                         .map(|(k, v)| format!("{}:{}", Value::String(k.clone()), v))
                                         .collect();
            format!("{{{}}}", items.join(","))
        }
        scalar => scalar.to_string(),
    }
}
