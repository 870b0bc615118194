use jsonparam_core::{ConfigError, ParameterizeError};
use thiserror::Error;

/// Errores de la aplicación (carga de documentos + parametrización).
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Error interno: {0}")]
    Internal(String),
    #[error("Error en IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("Documento JSON inválido: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Error de configuración: {0}")]
    Config(#[from] ConfigError),
    #[error("Parametrización fallida: {0}")]
    Parameterize(#[from] ParameterizeError),
}

impl CoreError {
    /// Código de salida del binario `jsonparam` para este error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CoreError::Config(_) => 2,
            CoreError::Json(_) | CoreError::Internal(_) => 3,
            CoreError::Parameterize(_) => 4,
            CoreError::Io(_) => 5,
        }
    }
}
