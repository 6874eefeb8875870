//! Arithmetic expression evaluator.
//!
//! Supports `+ - * / % ^`, parentheses and unary minus. `^` binds tighter
//! than unary minus and associates to the right.

use anyhow::{Result, bail};
use async_trait::async_trait;
use nanoreact_core::tools::str_param;
use nanoreact_core::{Parameters, Tool};

/// Deepest nesting of parentheses, signs and exponents accepted.
const MAX_DEPTH: usize = 64;

pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &'static str {
        "calculator"
    }

    fn description(&self) -> &'static str {
        "Evaluate an arithmetic expression. Expects {\"expression\": \"(2 + 3) * 4\"}; \
         supports + - * / % ^ and parentheses."
    }

    async fn execute(&self, params: Parameters) -> Result<String> {
        let Some(expression) = str_param(&params, "expression") else {
            bail!("Missing required parameter: expression");
        };
        let value = evaluate(expression)?;
        Ok(format_number(value))
    }
}

pub fn evaluate(expression: &str) -> Result<f64> {
    let tokens = tokenize(expression)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    if parser.pos != parser.tokens.len() {
        bail!("Unexpected token at position {} in '{expression}'", parser.pos + 1);
    }
    if !value.is_finite() {
        bail!("Result is not a finite number");
    }
    Ok(value)
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "only integral values below 1e15 are cast"
)]
fn format_number(value: f64) -> String {
    if value.fract().abs() < f64::EPSILON && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Num(f64),
    Op(char),
    Open,
    Close,
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '0'..='9' | '.' => {
                let mut literal = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        literal.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| anyhow::anyhow!("Invalid number: {literal}"))?;
                tokens.push(Token::Num(value));
            }
            '+' | '-' | '*' | '/' | '%' | '^' => {
                tokens.push(Token::Op(c));
                chars.next();
            }
            '×' => {
                tokens.push(Token::Op('*'));
                chars.next();
            }
            '÷' => {
                tokens.push(Token::Op('/'));
                chars.next();
            }
            '(' | '（' => {
                tokens.push(Token::Open);
                chars.next();
            }
            ')' | '）' => {
                tokens.push(Token::Close);
                chars.next();
            }
            other => bail!("Unsupported character: '{other}'"),
        }
    }

    if tokens.is_empty() {
        bail!("Empty expression");
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek();
        self.pos += 1;
        token
    }

    /// Run `f` one nesting level deeper, refusing input that would exhaust the stack.
    fn nested(&mut self, f: impl FnOnce(&mut Self) -> Result<f64>) -> Result<f64> {
        if self.depth >= MAX_DEPTH {
            bail!("Expression nested too deeply (max {MAX_DEPTH} levels)");
        }
        self.depth += 1;
        let value = f(self);
        self.depth -= 1;
        value
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<f64> {
        let mut value = self.term()?;
        while let Some(Token::Op(op @ ('+' | '-'))) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == '+' { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    // term := unary (('*' | '/' | '%') unary)*
    fn term(&mut self) -> Result<f64> {
        let mut value = self.unary()?;
        while let Some(Token::Op(op @ ('*' | '/' | '%'))) = self.peek() {
            self.pos += 1;
            let rhs = self.unary()?;
            if rhs.abs() < f64::EPSILON && op != '*' {
                bail!("Division by zero");
            }
            value = match op {
                '*' => value * rhs,
                '/' => value / rhs,
                _ => value % rhs,
            };
        }
        Ok(value)
    }

    // unary := '-' unary | power
    fn unary(&mut self) -> Result<f64> {
        match self.peek() {
            Some(Token::Op('-')) => {
                self.pos += 1;
                Ok(-self.nested(Self::unary)?)
            }
            Some(Token::Op('+')) => {
                self.pos += 1;
                self.nested(Self::unary)
            }
            _ => self.power(),
        }
    }

    // power := atom ('^' unary)?
    fn power(&mut self) -> Result<f64> {
        let base = self.atom()?;
        if let Some(Token::Op('^')) = self.peek() {
            self.pos += 1;
            let exponent = self.nested(Self::unary)?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<f64> {
        match self.advance() {
            Some(Token::Num(value)) => Ok(value),
            Some(Token::Open) => {
                let value = self.nested(Self::expr)?;
                match self.advance() {
                    Some(Token::Close) => Ok(value),
                    _ => bail!("Missing closing parenthesis"),
                }
            }
            Some(token) => bail!("Unexpected token: {token:?}"),
            None => bail!("Unexpected end of expression"),
        }
    }
}
