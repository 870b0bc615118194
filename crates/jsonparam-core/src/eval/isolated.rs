//! Evaluador aislado: ejecuta otro evaluador en un hilo worker y corta por
//! reloj.
//!
//! El worker recibe su propia copia de la expresión y un clon del
//! `ParameterSet` (compartido por `Arc`, de sólo lectura). Si no responde a
//! tiempo se abandona; su resultado tardío se descarta.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::warn;
use serde_json::Value;

use super::{EvalError, Evaluator, ExpressionEvaluator};
use crate::params::ParameterSet;

#[derive(Clone)]
pub struct IsolatedEvaluator {
    inner: Arc<dyn Evaluator>,
}

impl IsolatedEvaluator {
    pub fn new<E: Evaluator + 'static>(inner: E) -> Self {
        Self { inner: Arc::new(inner) }
    }

    pub fn from_arc(inner: Arc<dyn Evaluator>) -> Self {
        Self { inner }
    }
}

impl Default for IsolatedEvaluator {
    fn default() -> Self {
        Self::new(ExpressionEvaluator::new())
    }
}

impl std::fmt::Debug for IsolatedEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IsolatedEvaluator").finish_non_exhaustive()
    }
}

impl Evaluator for IsolatedEvaluator {
    fn evaluate(&self, expression: &str, bindings: &ParameterSet, timeout: Duration) -> Result<Option<Value>, EvalError> {
        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let owned_expr = expression.to_string();
        let bindings = bindings.clone();
        thread::Builder::new().name("jsonparam-eval".into())
                              .spawn(move || {
                                  // el receptor puede haberse ido ya (timeout)
                                  let _ = tx.send(inner.evaluate(&owned_expr, &bindings, timeout));
                              })
                              .map_err(|e| EvalError::Runtime(format!("could not spawn evaluator thread: {e}")))?;
        match rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                warn!("evaluation of `{expression}` abandoned after {}ms", timeout.as_millis());
                Err(EvalError::Timeout(timeout))
            }
            Err(RecvTimeoutError::Disconnected) => Err(EvalError::Runtime("evaluator worker terminated unexpectedly".into())),
        }
    }
}
