//! jsonparam: aplicación sobre `jsonparam-core`.
//!
//! - `documents` carga plantillas y parámetros desde disco y ejecuta el
//!   render.
//! - `errors` agrupa los errores de IO, JSON, configuración y
//!   parametrización.
//! - `output` serializa el resultado (pretty, compacto o canónico).
//!
//! El binario `jsonparam` (`main.rs`) es una capa fina sobre estos módulos.

pub mod documents;
pub mod errors;
pub mod output;

pub use documents::{load_document, load_params, render};
pub use errors::CoreError;
pub use output::OutputFormat;
