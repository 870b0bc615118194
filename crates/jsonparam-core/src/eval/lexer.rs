//! Tokenizador del lenguaje de expresiones.

use serde_json::Number;

use super::{ops, EvalError};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(Number),
    Str(String),
    Ident(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Dot,
    Colon,
    Question,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    Lt,
    Le,
    Gt,
    Ge,
    EqEq,
    NotEq,
    AndAnd,
    OrOr,
    Eof,
}

/// Token con su offset (en bytes) dentro de la expresión.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub offset: usize,
}

pub fn tokenize(input: &str) -> Result<Vec<Spanned>, EvalError> {
    let mut lexer = Lexer { input, pos: 0 };
    let mut out = Vec::new();
    loop {
        let spanned = lexer.next_token()?;
        let done = spanned.token == Token::Eof;
        out.push(spanned);
        if done {
            return Ok(out);
        }
    }
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> EvalError {
        EvalError::Syntax { message: message.into(), offset }
    }

    fn next_token(&mut self) -> Result<Spanned, EvalError> {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
        let offset = self.pos;
        let Some(ch) = self.bump() else {
            return Ok(Spanned { token: Token::Eof, offset });
        };
        let token = match ch {
            '(' => Token::LParen,
            ')' => Token::RParen,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            ',' => Token::Comma,
            ':' => Token::Colon,
            '?' => Token::Question,
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '%' => Token::Percent,
            '.' if matches!(self.peek(), Some(c) if c.is_ascii_digit()) => self.number(offset)?,
            '.' => Token::Dot,
            '<' => if self.eat('=') { Token::Le } else { Token::Lt },
            '>' => if self.eat('=') { Token::Ge } else { Token::Gt },
            '!' => {
                if self.eat('=') {
                    self.eat('=');
                    Token::NotEq
                } else {
                    Token::Bang
                }
            }
            '=' => {
                if !self.eat('=') {
                    return Err(self.error(offset, "assignment is not supported, use `==`"));
                }
                self.eat('=');
                Token::EqEq
            }
            '&' if self.eat('&') => Token::AndAnd,
            '|' if self.eat('|') => Token::OrOr,
            '\'' | '"' => Token::Str(self.string(ch, offset)?),
            c if c.is_ascii_digit() => self.number(offset)?,
            c if c.is_alphabetic() || c == '_' || c == '$' => {
                while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_' || c == '$') {
                    self.bump();
                }
                Token::Ident(self.input[offset..self.pos].to_string())
            }
            other => return Err(self.error(offset, format!("unexpected character `{other}`"))),
        };
        Ok(Spanned { token, offset })
    }

    /// Consume el resto de un número cuyo primer carácter ya se leyó.
    fn number(&mut self, offset: usize) -> Result<Token, EvalError> {
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.bump();
        }
        if self.peek() == Some('.') && matches!(self.peek_at(1), Some(c) if c.is_ascii_digit()) {
            self.bump();
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.bump();
            }
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let sign = usize::from(matches!(self.peek_at(1), Some('+' | '-')));
            if matches!(self.peek_at(1 + sign), Some(c) if c.is_ascii_digit()) {
                for _ in 0..=sign {
                    self.bump();
                }
                while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                    self.bump();
                }
            }
        }
        let text = &self.input[offset..self.pos];
        if let Ok(i) = text.parse::<i64>() {
            return Ok(Token::Number(i.into()));
        }
        text.parse::<f64>()
            .ok()
            .and_then(ops::number_from_f64)
            .map(Token::Number)
            .ok_or_else(|| self.error(offset, format!("invalid number `{text}`")))
    }

    fn string(&mut self, quote: char, offset: usize) -> Result<String, EvalError> {
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error(offset, "unterminated string literal")),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => {
                    let esc_at = self.pos;
                    match self.bump() {
                        Some('n') => out.push('\n'),
                        Some('t') => out.push('\t'),
                        Some('r') => out.push('\r'),
                        Some('u') => out.push(self.unicode_escape(esc_at)?),
                        Some(c @ ('\\' | '\'' | '"' | '/')) => out.push(c),
                        Some(c) => return Err(self.error(esc_at, format!("unknown escape `\\{c}`"))),
                        None => return Err(self.error(offset, "unterminated string literal")),
                    }
                }
                Some(c) => out.push(c),
            }
        }
    }

    fn unicode_escape(&mut self, offset: usize) -> Result<char, EvalError> {
        let hex = self.input.get(self.pos..self.pos + 4).ok_or_else(|| self.error(offset, "truncated \\u escape"))?;
        let code = u32::from_str_radix(hex, 16).map_err(|_| self.error(offset, format!("invalid \\u escape `{hex}`")))?;
        self.pos += 4;
        char::from_u32(code).ok_or_else(|| self.error(offset, format!("invalid code point `{hex}`")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        tokenize(input).unwrap().into_iter().map(|s| s.token).collect()
    }

    #[test]
    fn operators_and_literals() {
        assert_eq!(kinds("a >= 1.5 && !b"),
                   vec![Token::Ident("a".into()),
                        Token::Ge,
                        Token::Number(Number::from_f64(1.5).unwrap()),
                        Token::AndAnd,
                        Token::Bang,
                        Token::Ident("b".into()),
                        Token::Eof]);
        assert_eq!(kinds("x === 'y' !== z"),
                   vec![Token::Ident("x".into()), Token::EqEq, Token::Str("y".into()), Token::NotEq, Token::Ident("z".into()), Token::Eof]);
    }

    #[test]
    fn integers_stay_integers() {
        assert_eq!(kinds("42"), vec![Token::Number(42.into()), Token::Eof]);
        assert_eq!(kinds("1e3"), vec![Token::Number(1000.into()), Token::Eof]);
        assert_eq!(kinds("2.50"), vec![Token::Number(Number::from_f64(2.5).unwrap()), Token::Eof]);
    }

    #[test]
    fn string_escapes() {
        assert_eq!(kinds(r#""a\"b\né""#), vec![Token::Str("a\"b\né".into()), Token::Eof]);
    }

    #[test]
    fn errors_carry_offsets() {
        assert_eq!(tokenize("a = 1"), Err(EvalError::Syntax { message: "assignment is not supported, use `==`".into(), offset: 2 }));
        assert!(matches!(tokenize("'open"), Err(EvalError::Syntax { offset: 0, .. })));
        assert!(matches!(tokenize("a # b"), Err(EvalError::Syntax { offset: 2, .. })));
    }
}
