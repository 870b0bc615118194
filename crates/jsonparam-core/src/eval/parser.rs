//! Parser descendente recursivo del lenguaje de expresiones.
//!
//! Precedencia (de menor a mayor): `?:`, `||`, `&&`, `== !=`,
//! `< <= > >=`, `+ -`, `* / %`, unarios, postfijos (`()`, `.`, `[]`).

use serde_json::Value;

use super::lexer::{tokenize, Spanned, Token};
use super::ops::Arith;
use super::EvalError;
use crate::constants::MAX_EXPRESSION_DEPTH;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Array(Vec<Expr>),
    Object(Vec<(String, Expr)>),
    Name(String),
    Call { callee: String, args: Vec<Expr> },
    Member(Box<Expr>, String),
    Index(Box<Expr>, Box<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Conditional(Box<Expr>, Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    Plus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Arith(Arith),
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
}

pub fn parse(input: &str) -> Result<Expr, EvalError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0, depth: 0 };
    let expr = parser.expression()?;
    match parser.peek() {
        Token::Eof => Ok(expr),
        other => Err(parser.error(format!("unexpected {} after expression", describe(other)))),
    }
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
}

fn describe(token: &Token) -> String {
    match token {
        Token::Number(n) => format!("number `{n}`"),
        Token::Str(s) => format!("string {:?}", s),
        Token::Ident(name) => format!("`{name}`"),
        Token::Eof => "end of expression".to_string(),
        other => format!("{other:?}"),
    }
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)].token
    }

    fn offset(&self) -> usize {
        self.tokens[self.pos.min(self.tokens.len() - 1)].offset
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == token {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token, what: &str) -> Result<(), EvalError> {
        if self.eat(&token) {
            Ok(())
        } else {
            Err(self.error(format!("expected {what}, found {}", describe(self.peek()))))
        }
    }

    fn error(&self, message: impl Into<String>) -> EvalError {
        EvalError::Syntax { message: message.into(), offset: self.offset() }
    }

    fn enter(&mut self) -> Result<(), EvalError> {
        self.depth += 1;
        if self.depth > MAX_EXPRESSION_DEPTH {
            return Err(self.error("expression nested too deeply"));
        }
        Ok(())
    }

    fn expression(&mut self) -> Result<Expr, EvalError> {
        self.enter()?;
        let expr = self.conditional();
        self.depth -= 1;
        expr
    }

    fn conditional(&mut self) -> Result<Expr, EvalError> {
        let cond = self.or()?;
        if !self.eat(&Token::Question) {
            return Ok(cond);
        }
        let then = self.expression()?;
        self.expect(Token::Colon, "`:` in conditional expression")?;
        let otherwise = self.expression()?;
        Ok(Expr::Conditional(Box::new(cond), Box::new(then), Box::new(otherwise)))
    }

    // Las cadenas asociativas (`a + b + c ...`) también cuentan como
    // anidamiento: cada operador añade un nivel al árbol.
    fn or(&mut self) -> Result<Expr, EvalError> {
        let mark = self.depth;
        let mut left = self.and()?;
        while self.eat(&Token::OrOr) {
            self.enter()?;
            let right = self.and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        self.depth = mark;
        Ok(left)
    }

    fn and(&mut self) -> Result<Expr, EvalError> {
        let mark = self.depth;
        let mut left = self.equality()?;
        while self.eat(&Token::AndAnd) {
            self.enter()?;
            let right = self.equality()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        self.depth = mark;
        Ok(left)
    }

    fn equality(&mut self) -> Result<Expr, EvalError> {
        let mark = self.depth;
        let mut left = self.comparison()?;
        loop {
            let op = match self.peek() {
                Token::EqEq => BinaryOp::Eq,
                Token::NotEq => BinaryOp::NotEq,
                _ => break,
            };
            self.advance();
            self.enter()?;
            let right = self.comparison()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        self.depth = mark;
        Ok(left)
    }

    fn comparison(&mut self) -> Result<Expr, EvalError> {
        let mark = self.depth;
        let mut left = self.additive()?;
        loop {
            let op = match self.peek() {
                Token::Lt => BinaryOp::Lt,
                Token::Le => BinaryOp::Le,
                Token::Gt => BinaryOp::Gt,
                Token::Ge => BinaryOp::Ge,
                _ => break,
            };
            self.advance();
            self.enter()?;
            let right = self.additive()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        self.depth = mark;
        Ok(left)
    }

    fn additive(&mut self) -> Result<Expr, EvalError> {
        let mark = self.depth;
        let mut left = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                Token::Plus => Arith::Add,
                Token::Minus => Arith::Sub,
                _ => break,
            };
            self.advance();
            self.enter()?;
            let right = self.multiplicative()?;
            left = Expr::Binary(BinaryOp::Arith(op), Box::new(left), Box::new(right));
        }
        self.depth = mark;
        Ok(left)
    }

    fn multiplicative(&mut self) -> Result<Expr, EvalError> {
        let mark = self.depth;
        let mut left = self.unary()?;
        loop {
            let op = match self.peek() {
                Token::Star => Arith::Mul,
                Token::Slash => Arith::Div,
                Token::Percent => Arith::Rem,
                _ => break,
            };
            self.advance();
            self.enter()?;
            let right = self.unary()?;
            left = Expr::Binary(BinaryOp::Arith(op), Box::new(left), Box::new(right));
        }
        self.depth = mark;
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr, EvalError> {
        let op = match self.peek() {
            Token::Bang => UnaryOp::Not,
            Token::Minus => UnaryOp::Neg,
            Token::Plus => UnaryOp::Plus,
            _ => return self.postfix(),
        };
        self.advance();
        self.enter()?;
        let operand = self.unary();
        self.depth -= 1;
        Ok(Expr::Unary(op, Box::new(operand?)))
    }

    fn postfix(&mut self) -> Result<Expr, EvalError> {
        let mark = self.depth;
        let mut expr = self.primary()?;
        loop {
            if matches!(self.peek(), Token::LParen | Token::Dot | Token::LBracket) {
                self.enter()?;
            }
            match self.peek() {
                Token::LParen => {
                    let Expr::Name(callee) = expr else {
                        return Err(self.error("only named functions can be called"));
                    };
                    self.advance();
                    let args = self.list(Token::RParen, "`)` after arguments")?;
                    expr = Expr::Call { callee, args };
                }
                Token::Dot => {
                    self.advance();
                    match self.advance() {
                        Token::Ident(name) => expr = Expr::Member(Box::new(expr), name),
                        other => return Err(self.error(format!("expected property name after `.`, found {}", describe(&other)))),
                    }
                }
                Token::LBracket => {
                    self.advance();
                    let index = self.expression()?;
                    self.expect(Token::RBracket, "`]`")?;
                    expr = Expr::Index(Box::new(expr), Box::new(index));
                }
                _ => break,
            }
        }
        self.depth = mark;
        Ok(expr)
    }

    /// Lista separada por comas hasta `close` (ya consumido el delimitador
    /// de apertura). Admite coma final.
    fn list(&mut self, close: Token, what: &str) -> Result<Vec<Expr>, EvalError> {
        let mut items = Vec::new();
        while !self.eat(&close) {
            items.push(self.expression()?);
            if !self.eat(&Token::Comma) {
                self.expect(close, what)?;
                break;
            }
        }
        Ok(items)
    }

    fn primary(&mut self) -> Result<Expr, EvalError> {
        match self.advance() {
            Token::Number(n) => Ok(Expr::Literal(Value::Number(n))),
            Token::Str(s) => Ok(Expr::Literal(Value::String(s))),
            Token::Ident(name) => Ok(match name.as_str() {
                "true" => Expr::Literal(Value::Bool(true)),
                "false" => Expr::Literal(Value::Bool(false)),
                "null" => Expr::Literal(Value::Null),
                _ => Expr::Name(name),
            }),
            Token::LParen => {
                let inner = self.expression()?;
                self.expect(Token::RParen, "`)`")?;
                Ok(inner)
            }
            Token::LBracket => Ok(Expr::Array(self.list(Token::RBracket, "`]` after array items")?)),
            Token::LBrace => self.object(),
            other => {
                // apunta al token consumido
                self.pos = self.pos.saturating_sub(usize::from(other != Token::Eof));
                Err(self.error(format!("unexpected {}", describe(&other))))
            }
        }
    }

    fn object(&mut self) -> Result<Expr, EvalError> {
        let mut entries = Vec::new();
        while !self.eat(&Token::RBrace) {
            let key = match self.advance() {
                Token::Ident(name) | Token::Str(name) => name,
                Token::Number(n) => n.to_string(),
                other => return Err(self.error(format!("expected object key, found {}", describe(&other)))),
            };
            self.expect(Token::Colon, "`:` after object key")?;
            entries.push((key, self.expression()?));
            if !self.eat(&Token::Comma) {
                self.expect(Token::RBrace, "`}` after object entries")?;
                break;
            }
        }
        Ok(Expr::Object(entries))
    }
}
