//! Conjunto de parámetros que recibe `parameterize`.

pub mod binding;
pub mod filters;
pub mod set;

pub use binding::{Binding, Callable, CallableFn};
pub use set::ParameterSet;
