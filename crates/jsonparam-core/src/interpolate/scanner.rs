//! Troceado de una cadena en literales y marcadores.
//!
//! El cierre sólo cuenta fuera de comillas y con los corchetes del cuerpo
//! equilibrados, así `${ {a: 1}.a }` o `${ '}' }` son un único marcador.

use crate::config::Delimiters;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    /// `raw` incluye los delimitadores; `body` es lo de dentro, sin recortar.
    Marker { raw: &'a str, body: &'a str },
}

/// Segmentos de `text` en orden. Un delimitador de apertura sin cierre se
/// trata como texto literal.
pub fn scan<'a>(text: &'a str, delimiters: &Delimiters) -> Vec<Segment<'a>> {
    let (open, close) = (delimiters.open(), delimiters.close());
    let mut segments = Vec::new();
    if open.is_empty() {
        if !text.is_empty() {
            segments.push(Segment::Literal(text));
        }
        return segments;
    }
    let mut literal_start = 0;
    let mut cursor = 0;
    while let Some(found) = text[cursor..].find(open) {
        let start = cursor + found;
        let body_start = start + open.len();
        match find_close(&text[body_start..], close) {
            Some(len) => {
                if literal_start < start {
                    segments.push(Segment::Literal(&text[literal_start..start]));
                }
                let end = body_start + len + close.len();
                segments.push(Segment::Marker { raw: &text[start..end], body: &text[body_start..body_start + len] });
                literal_start = end;
                cursor = end;
            }
            // `open` no es vacío: el cursor siempre avanza
            None => cursor = body_start,
        }
    }
    if literal_start < text.len() {
        segments.push(Segment::Literal(&text[literal_start..]));
    }
    segments
}

/// Longitud del cuerpo hasta el primer `close` a profundidad cero.
fn find_close(body: &str, close: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, ch) in body.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        if depth == 0 && body[i..].starts_with(close) {
            return Some(i);
        }
        match ch {
            '\'' | '"' => quote = Some(ch),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    None
}

/// Marcador único si la cadena completa es exactamente un marcador.
pub fn single_marker<'a>(segments: &[Segment<'a>]) -> Option<(&'a str, &'a str)> {
    match segments {
        [Segment::Marker { raw, body }] => Some((*raw, *body)),
        _ => None,
    }
}
