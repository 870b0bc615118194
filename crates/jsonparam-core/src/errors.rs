//! Errores de parametrización.
//!
//! `ParameterizeError` es inmutable: cada nivel de la recursión que lo deja
//! pasar devuelve un error nuevo con su segmento de ruta antepuesto (`at`),
//! nunca modifica una instancia compartida.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::eval::EvalError;

/// Segmento de ruta dentro del árbol de entrada.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(i) => write!(f, "[{i}]"),
            PathSegment::Key(k) if is_plain_key(k) => write!(f, ".{k}"),
            PathSegment::Key(k) => write!(f, "[{}]", serde_json::Value::String(k.clone())),
        }
    }
}

fn is_plain_key(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn render_path(path: &[PathSegment]) -> String {
    path.iter().fold(String::from("$"), |mut acc, seg| {
        acc.push_str(&seg.to_string());
        acc
    })
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ErrorKind {
    #[error("unresolved reference `{name}` in `{fragment}`")]
    UnresolvedReference { name: String, fragment: String },
    #[error("`{name}` is not a one-argument function (used as filter in `{fragment}`)")]
    InvalidFilterTarget { name: String, fragment: String },
    #[error("failed to evaluate `{expression}` in `{fragment}`: {cause}")]
    Evaluation {
        expression: String,
        fragment: String,
        #[source]
        cause: EvalError,
    },
    #[error("evaluation of `{expression}` in `{fragment}` exceeded {}ms", .timeout.as_millis())]
    EvaluationTimeout { expression: String, fragment: String, timeout: Duration },
    #[error("cannot splice {found} result of `{expression}` into `{fragment}`")]
    TypeMismatch { expression: String, fragment: String, found: &'static str },
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind} (at {})", render_path(.path))]
pub struct ParameterizeError {
    #[source]
    kind: ErrorKind,
    path: Vec<PathSegment>,
}

impl ParameterizeError {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, path: Vec::new() }
    }

    /// Traduce un fallo del evaluador: el timeout tiene su propia variante.
    pub fn from_eval(expression: &str, fragment: &str, cause: EvalError) -> Self {
        let (expression, fragment) = (expression.to_string(), fragment.to_string());
        let kind = match cause {
            EvalError::Timeout(timeout) => ErrorKind::EvaluationTimeout { expression, fragment, timeout },
            cause => ErrorKind::Evaluation { expression, fragment, cause },
        };
        Self::new(kind)
    }

    /// Devuelve el mismo error ubicado bajo `segment`.
    pub fn at(mut self, segment: PathSegment) -> Self {
        self.path.insert(0, segment);
        self
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }

    /// Ruta estilo JSONPath (`$.a[2].b`) del nodo que falló.
    pub fn path_string(&self) -> String {
        render_path(&self.path)
    }

    /// Texto de la expresión o referencia que originó el error.
    pub fn expression(&self) -> &str {
        match &self.kind {
            ErrorKind::UnresolvedReference { name, .. } | ErrorKind::InvalidFilterTarget { name, .. } => name,
            ErrorKind::Evaluation { expression, .. }
            | ErrorKind::EvaluationTimeout { expression, .. }
            | ErrorKind::TypeMismatch { expression, .. } => expression,
        }
    }

    /// Literal que contenía la expresión.
    pub fn fragment(&self) -> &str {
        match &self.kind {
            ErrorKind::UnresolvedReference { fragment, .. }
            | ErrorKind::InvalidFilterTarget { fragment, .. }
            | ErrorKind::Evaluation { fragment, .. }
            | ErrorKind::EvaluationTimeout { fragment, .. }
            | ErrorKind::TypeMismatch { fragment, .. } => fragment,
        }
    }
}

impl From<ErrorKind> for ParameterizeError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}
