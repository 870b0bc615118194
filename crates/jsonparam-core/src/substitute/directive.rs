//! Reconocimiento de objetos directiva (`$if`, `$switch`, `$eval`).
//!
//! La presencia de la clave reservada es el único discriminante. Si hay
//! varias, gana `$if`, luego `$switch`, luego `$eval`.

use serde_json::{Map, Value};

use crate::constants::{ELSE_KEY, EVAL_KEY, IF_KEY, SWITCH_KEY, THEN_KEY};

#[derive(Debug, Clone, PartialEq)]
pub enum Directive<'a> {
    Conditional { condition: &'a Value, then: Option<&'a Value>, otherwise: Option<&'a Value> },
    /// `cases` es el propio objeto; la clave `$switch` nunca es un caso.
    Switch { selector: &'a Value, cases: &'a Map<String, Value> },
    RawEval { expression: &'a Value },
    Plain,
}

impl<'a> Directive<'a> {
    pub fn classify(map: &'a Map<String, Value>) -> Self {
        if let Some(condition) = map.get(IF_KEY) {
            return Directive::Conditional { condition, then: map.get(THEN_KEY), otherwise: map.get(ELSE_KEY) };
        }
        if let Some(selector) = map.get(SWITCH_KEY) {
            return Directive::Switch { selector, cases: map };
        }
        match map.get(EVAL_KEY) {
            Some(expression) => Directive::RawEval { expression },
            None => Directive::Plain,
        }
    }

    /// Clave reservada que identifica la directiva.
    pub fn key(&self) -> Option<&'static str> {
        match self {
            Directive::Conditional { .. } => Some(IF_KEY),
            Directive::Switch { .. } => Some(SWITCH_KEY),
            Directive::RawEval { .. } => Some(EVAL_KEY),
            Directive::Plain => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: &Value) -> &Map<String, Value> {
        value.as_object().unwrap()
    }

    #[test]
    fn conditional_with_branches() {
        let v = json!({"$if": "a > b", "then": 1});
        assert_eq!(Directive::classify(object(&v)),
                   Directive::Conditional { condition: &json!("a > b"), then: Some(&json!(1)), otherwise: None });
    }

    #[test]
    fn priority_is_if_switch_eval() {
        let v = json!({"$eval": "x", "$switch": "y", "$if": "z"});
        assert_eq!(Directive::classify(object(&v)).key(), Some(IF_KEY));
        let v = json!({"$eval": "x", "$switch": "y"});
        assert_eq!(Directive::classify(object(&v)).key(), Some(SWITCH_KEY));
        let v = json!({"$eval": 3});
        assert_eq!(Directive::classify(object(&v)), Directive::RawEval { expression: &json!(3) });
    }

    #[test]
    fn plain_mappings() {
        let v = json!({"if": 1, "then": 2, "eval": 3});
        assert_eq!(Directive::classify(object(&v)), Directive::Plain);
        assert_eq!(Directive::classify(&Map::new()), Directive::Plain);
    }
}
