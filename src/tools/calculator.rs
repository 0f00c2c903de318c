//! Arithmetic evaluator exposed as the `calculator` tool.
//!
//! Supports integer and decimal literals, `+ - * / **`, unary signs and
//! parentheses. Integer arithmetic stays integral; `/` always produces a
//! decimal result.

use serde_json::{json, Value};

use super::Tool;
use crate::error::ToolError;

/// The `calculator` tool.
#[derive(Debug, Clone, Copy, Default)]
pub struct Calculator;

impl Tool for Calculator {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Evaluate math expressions"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "expression": {
                    "type": "string",
                    "description": "Arithmetic expression using + - * / ** and parentheses, e.g. '12 * (7 + 3)'"
                }
            },
            "required": ["expression"]
        })
    }

    fn call(&self, arguments: &Value) -> Result<String, ToolError> {
        let expression = match arguments {
            Value::String(expr) => expr.as_str(),
            Value::Object(map) => map
                .get("expression")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    ToolError::InvalidArguments("expected a string field 'expression'".to_string())
                })?,
            other => {
                return Err(ToolError::InvalidArguments(format!(
                    "expected an object with 'expression', got {other}"
                )))
            }
        };
        evaluate(expression)
    }
}

/// Evaluate an arithmetic expression and format the result as text.
pub fn evaluate(expr: &str) -> Result<String, ToolError> {
    let expr = expr.trim();
    if expr.is_empty() {
        return Err(invalid("empty expression"));
    }

    let tokens = tokenize(expr)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    if let Some(token) = parser.peek() {
        return Err(invalid(format!("unexpected {token:?} in {expr:?}")));
    }
    Ok(value.to_string())
}

fn invalid(message: impl Into<String>) -> ToolError {
    ToolError::InvalidExpression(message.into())
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    fn checked_float(value: f64) -> Result<Number, ToolError> {
        if value.is_nan() {
            Err(invalid("result is not a real number"))
        } else if value.is_infinite() {
            Err(invalid("numerical result out of range"))
        } else {
            Ok(Number::Float(value))
        }
    }

    fn int_op(
        self,
        rhs: Number,
        int: fn(i64, i64) -> Option<i64>,
        float: fn(f64, f64) -> f64,
    ) -> Result<Number, ToolError> {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => int(a, b)
                .map(Number::Int)
                .ok_or_else(|| invalid("integer overflow")),
            (a, b) => Number::checked_float(float(a.as_f64(), b.as_f64())),
        }
    }

    fn add(self, rhs: Number) -> Result<Number, ToolError> {
        self.int_op(rhs, i64::checked_add, |a, b| a + b)
    }

    fn sub(self, rhs: Number) -> Result<Number, ToolError> {
        self.int_op(rhs, i64::checked_sub, |a, b| a - b)
    }

    fn mul(self, rhs: Number) -> Result<Number, ToolError> {
        self.int_op(rhs, i64::checked_mul, |a, b| a * b)
    }

    fn div(self, rhs: Number) -> Result<Number, ToolError> {
        if rhs.as_f64() == 0.0 {
            return Err(invalid("division by zero"));
        }
        Number::checked_float(self.as_f64() / rhs.as_f64())
    }

    fn pow(self, rhs: Number) -> Result<Number, ToolError> {
        match (self, rhs) {
            (Number::Int(base), Number::Int(exp)) if exp >= 0 => u32::try_from(exp)
                .ok()
                .and_then(|exp| base.checked_pow(exp))
                .map(Number::Int)
                .ok_or_else(|| invalid("integer overflow")),
            (base, exp) => {
                if base.as_f64() == 0.0 && exp.as_f64() < 0.0 {
                    return Err(invalid("zero cannot be raised to a negative power"));
                }
                Number::checked_float(base.as_f64().powf(exp.as_f64()))
            }
        }
    }

    fn neg(self) -> Result<Number, ToolError> {
        match self {
            Number::Int(i) => i
                .checked_neg()
                .map(Number::Int)
                .ok_or_else(|| invalid("integer overflow")),
            Number::Float(f) => Ok(Number::Float(-f)),
        }
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{i}"),
            // Whole decimals keep a trailing ".0" so they read as decimals
            Number::Float(x) if x.fract() == 0.0 && x.abs() < 1e16 => write!(f, "{x:.1}"),
            Number::Float(x) => write!(f, "{x}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(Number),
    Plus,
    Minus,
    Star,
    Slash,
    Pow,
    LParen,
    RParen,
}

fn tokenize(expr: &str) -> Result<Vec<Token>, ToolError> {
    let chars: Vec<char> = expr.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' if chars.get(i + 1) == Some(&'*') => {
                tokens.push(Token::Pow);
                i += 2;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                let mut is_float = false;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    is_float |= chars[i] == '.';
                    i += 1;
                }
                if i < chars.len() && matches!(chars[i], 'e' | 'E') {
                    let mut j = i + 1;
                    if j < chars.len() && matches!(chars[j], '+' | '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].is_ascii_digit() {
                        while j < chars.len() && chars[j].is_ascii_digit() {
                            j += 1;
                        }
                        is_float = true;
                        i = j;
                    }
                }

                let literal: String = chars[start..i].iter().collect();
                let number = if is_float {
                    literal
                        .parse::<f64>()
                        .map(Number::Float)
                        .map_err(|_| invalid(format!("invalid number {literal:?}")))?
                } else {
                    literal
                        .parse::<i64>()
                        .map(Number::Int)
                        .map_err(|_| invalid(format!("integer literal too large: {literal}")))?
                };
                tokens.push(Token::Num(number));
            }
            other => return Err(invalid(format!("unsupported character {other:?}"))),
        }
    }

    Ok(tokens)
}

/// Maximum nesting of parentheses, unary signs and exponents.
const MAX_DEPTH: usize = 256;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<Number, ToolError> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    value = value.add(self.term()?)?;
                }
                Some(Token::Minus) => {
                    self.pos += 1;
                    value = value.sub(self.term()?)?;
                }
                _ => return Ok(value),
            }
        }
    }

    // term := factor (('*' | '/') factor)*
    fn term(&mut self) -> Result<Number, ToolError> {
        let mut value = self.factor()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    value = value.mul(self.factor()?)?;
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    value = value.div(self.factor()?)?;
                }
                _ => return Ok(value),
            }
        }
    }

    // factor := ('+' | '-') factor | power
    // Every recursive path passes through here, so the depth is bounded here.
    fn factor(&mut self) -> Result<Number, ToolError> {
        if self.depth >= MAX_DEPTH {
            return Err(invalid("expression nested too deeply"));
        }
        self.depth += 1;
        let value = self.signed();
        self.depth -= 1;
        value
    }

    fn signed(&mut self) -> Result<Number, ToolError> {
        match self.peek() {
            Some(Token::Plus) => {
                self.pos += 1;
                self.factor()
            }
            Some(Token::Minus) => {
                self.pos += 1;
                self.factor()?.neg()
            }
            _ => self.power(),
        }
    }

    // power := atom ('**' factor)?   (right-associative, binds tighter than unary minus)
    fn power(&mut self) -> Result<Number, ToolError> {
        let base = self.atom()?;
        if self.peek() == Some(&Token::Pow) {
            self.pos += 1;
            let exponent = self.factor()?;
            return base.pow(exponent);
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Number, ToolError> {
        match self.next() {
            Some(Token::Num(n)) => Ok(n),
            Some(Token::LParen) => {
                let value = self.expr()?;
                match self.next() {
                    Some(Token::RParen) => Ok(value),
                    _ => Err(invalid("missing closing parenthesis")),
                }
            }
            Some(token) => Err(invalid(format!("unexpected {token:?}"))),
            None => Err(invalid("unexpected end of expression")),
        }
    }
}
