//! Constantes del motor de parametrización.
//!
//! Este módulo agrupa las claves reservadas de las directivas y los valores
//! por defecto de la configuración. Cambiar una clave reservada cambia qué
//! mapas se interpretan como directiva, por lo que forman parte del
//! contrato público del formato de plantillas.

/// Clave que convierte un mapa en una directiva condicional.
pub const IF_KEY: &str = "$if";
/// Rama evaluada cuando la condición es verdadera.
pub const THEN_KEY: &str = "then";
/// Rama evaluada cuando la condición es falsa.
pub const ELSE_KEY: &str = "else";
/// Clave que convierte un mapa en una selección multi-rama.
pub const SWITCH_KEY: &str = "$switch";
/// Clave que convierte un mapa en una evaluación cruda.
pub const EVAL_KEY: &str = "$eval";

/// Delimitadores por defecto del dialecto de expresiones.
pub const EXPRESSION_OPEN: &str = "${";
pub const EXPRESSION_CLOSE: &str = "}";

/// Delimitadores por defecto del dialecto pipeline.
pub const PIPELINE_OPEN: &str = "{{";
pub const PIPELINE_CLOSE: &str = "}}";

/// Presupuesto de tiempo por expresión (ms).
pub const DEFAULT_TIMEOUT_MS: u64 = 500;

/// Profundidad máxima de anidamiento aceptada por el evaluador por defecto.
pub const MAX_EXPRESSION_DEPTH: usize = 128;
