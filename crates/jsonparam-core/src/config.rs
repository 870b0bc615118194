//! Configuración del motor: dialecto, delimitadores, política de fallos y
//! timeout por expresión.
//!
//! Se puede construir en código (`Default` + setters), deserializar desde
//! JSON o cargar desde variables de entorno (`from_env`, con `.env`
//! opcional cargado una única vez).

use std::env;
use std::str::FromStr;
use std::time::Duration;

use dotenvy::dotenv;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{DEFAULT_TIMEOUT_MS, EXPRESSION_CLOSE, EXPRESSION_OPEN, PIPELINE_CLOSE, PIPELINE_OPEN};

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

pub const ENV_DIALECT: &str = "JSONPARAM_DIALECT";
pub const ENV_OPEN: &str = "JSONPARAM_OPEN";
pub const ENV_CLOSE: &str = "JSONPARAM_CLOSE";
pub const ENV_POLICY: &str = "JSONPARAM_POLICY";
pub const ENV_TIMEOUT_MS: &str = "JSONPARAM_TIMEOUT_MS";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value `{value}` for {field}: expected {expected}")]
    InvalidValue { field: String, value: String, expected: &'static str },
    #[error("delimiter tokens must not be empty")]
    EmptyDelimiter,
}

/// Gramática de los marcadores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// El cuerpo del marcador es una expresión para el `Evaluator`.
    #[default]
    Expression,
    /// `valor | filtro | filtro`, resuelto directamente contra los parámetros.
    Pipeline,
}

impl Dialect {
    pub fn default_delimiters(self) -> Delimiters {
        match self {
            Dialect::Expression => Delimiters { open: EXPRESSION_OPEN.into(), close: EXPRESSION_CLOSE.into() },
            Dialect::Pipeline => Delimiters { open: PIPELINE_OPEN.into(), close: PIPELINE_CLOSE.into() },
        }
    }
}

impl FromStr for Dialect {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "expression" => Ok(Dialect::Expression),
            "pipeline" => Ok(Dialect::Pipeline),
            _ => Err(ConfigError::InvalidValue { field: "dialect".into(),
                                                 value: s.into(),
                                                 expected: "`expression` or `pipeline`" }),
        }
    }
}

/// Qué hacer ante un fallo de resolución. Se aplica a toda la llamada.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// El primer fallo aborta la llamada completa.
    #[default]
    Strict,
    /// Modo de compatibilidad: se conserva el texto/directiva original y la
    /// llamada nunca falla.
    Lenient,
}

impl FromStr for FailurePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(FailurePolicy::Strict),
            "lenient" => Ok(FailurePolicy::Lenient),
            _ => Err(ConfigError::InvalidValue { field: "policy".into(),
                                                 value: s.into(),
                                                 expected: "`strict` or `lenient`" }),
        }
    }
}

/// Par apertura/cierre de los marcadores. Sólo se construye validado
/// (`new`, o deserializando a través de `new`): ningún token es vacío.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDelimiters")]
pub struct Delimiters {
    open: String,
    close: String,
}

#[derive(Deserialize)]
struct RawDelimiters {
    open: String,
    close: String,
}

impl TryFrom<RawDelimiters> for Delimiters {
    type Error = ConfigError;

    fn try_from(raw: RawDelimiters) -> Result<Self, Self::Error> {
        Delimiters::new(raw.open, raw.close)
    }
}

impl Delimiters {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Result<Self, ConfigError> {
        let (open, close) = (open.into(), close.into());
        if open.is_empty() || close.is_empty() {
            return Err(ConfigError::EmptyDelimiter);
        }
        Ok(Self { open, close })
    }

    pub fn open(&self) -> &str {
        &self.open
    }

    pub fn close(&self) -> &str {
        &self.close
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Dialect::default().default_delimiters()
    }
}

/// Al deserializar, si faltan `delimiters` se usan los del dialecto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawConfig")]
pub struct ParameterizeConfig {
    pub dialect: Dialect,
    pub delimiters: Delimiters,
    pub policy: FailurePolicy,
    /// Presupuesto por expresión, en milisegundos.
    pub timeout_ms: u64,
}

impl Default for ParameterizeConfig {
    fn default() -> Self {
        Self { dialect: Dialect::Expression,
               delimiters: Dialect::Expression.default_delimiters(),
               policy: FailurePolicy::Strict,
               timeout_ms: DEFAULT_TIMEOUT_MS }
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct RawConfig {
    dialect: Dialect,
    delimiters: Option<Delimiters>,
    policy: FailurePolicy,
    timeout_ms: u64,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self { dialect: Dialect::default(), delimiters: None, policy: FailurePolicy::default(), timeout_ms: DEFAULT_TIMEOUT_MS }
    }
}

impl From<RawConfig> for ParameterizeConfig {
    fn from(raw: RawConfig) -> Self {
        let config = Self::default().with_dialect(raw.dialect).with_policy(raw.policy);
        let config = match raw.delimiters {
            Some(delimiters) => config.with_delimiters(delimiters),
            None => config,
        };
        Self { timeout_ms: raw.timeout_ms, ..config }
    }
}

impl ParameterizeConfig {
    /// Cambia el dialecto y restablece sus delimitadores por defecto.
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self.delimiters = dialect.default_delimiters();
        self
    }

    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = delimiters;
        self
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Atajo para el modo de compatibilidad.
    pub fn lenient(self) -> Self {
        self.with_policy(FailurePolicy::Lenient)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn is_lenient(&self) -> bool {
        self.policy == FailurePolicy::Lenient
    }

    /// Lee `JSONPARAM_*` del entorno (tras cargar `.env` si existe).
    pub fn from_env() -> Result<Self, ConfigError> {
        // asegura que .env se haya cargado
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Igual que `from_env` pero con una fuente de variables arbitraria.
    /// Las variables ausentes toman el valor por defecto; las inválidas son
    /// error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
        where F: Fn(&str) -> Option<String>
    {
        let dialect = match lookup(ENV_DIALECT) {
            Some(v) => v.parse()?,
            None => Dialect::default(),
        };
        let mut config = Self::default().with_dialect(dialect);
        if let Some(v) = lookup(ENV_POLICY) {
            config.policy = v.parse()?;
        }
        if let Some(v) = lookup(ENV_TIMEOUT_MS) {
            config.timeout_ms = v.trim().parse().map_err(|_| ConfigError::InvalidValue { field: ENV_TIMEOUT_MS.into(),
                                                                                          value: v.clone(),
                                                                                          expected: "a number of milliseconds" })?;
        }
        let open = lookup(ENV_OPEN).unwrap_or_else(|| config.delimiters.open().to_string());
        let close = lookup(ENV_CLOSE).unwrap_or_else(|| config.delimiters.close().to_string());
        config.delimiters = Delimiters::new(open, close)?;
        Ok(config)
    }
}
