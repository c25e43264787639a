//! Expression parser for point and variable expressions.
//!
//! Supports:
//! - Numbers (integers, decimals, scientific notation)
//! - Variable references by bare name (`waist`, `hip_depth`)
//! - Arithmetic operators (+, -, *, /) with the usual precedence
//! - Unary minus
//! - Parentheses for grouping

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

/// Parse error with location info
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parse error at position {}: {}", self.position, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Expression AST node.
///
/// Serialized as its source text so stored drawings stay readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Expr {
    /// Numeric literal
    Number(f64),
    /// Variable reference
    Variable(String),
    /// Binary operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Unary operation (negation)
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOperator {
    fn precedence(self) -> u8 {
        match self {
            Self::Add | Self::Sub => 1,
            Self::Mul | Self::Div => 2,
        }
    }

    fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Neg,
}

const UNARY_PRECEDENCE: u8 = 3;
const ATOM_PRECEDENCE: u8 = 4;

impl Expr {
    pub fn number(value: f64) -> Self {
        Self::Number(value)
    }

    pub fn variable(name: &str) -> Self {
        Self::Variable(name.to_string())
    }

    /// Names of all variables this expression references, in first-use order,
    /// without duplicates.
    pub fn variables(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables(&self, names: &mut Vec<String>) {
        match self {
            Self::Number(_) => {}
            Self::Variable(name) => {
                if !names.iter().any(|n| n == name) {
                    names.push(name.clone());
                }
            }
            Self::BinaryOp { left, right, .. } => {
                left.collect_variables(names);
                right.collect_variables(names);
            }
            Self::UnaryOp { operand, .. } => operand.collect_variables(names),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Self::Number(n) if *n < 0.0 => UNARY_PRECEDENCE,
            Self::Number(_) | Self::Variable(_) => ATOM_PRECEDENCE,
            Self::BinaryOp { op, .. } => op.precedence(),
            Self::UnaryOp { .. } => UNARY_PRECEDENCE,
        }
    }

    fn fmt_child(&self, f: &mut fmt::Formatter<'_>, parenthesize: bool) -> fmt::Result {
        if parenthesize {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Variable(name) => write!(f, "{}", name),
            Self::BinaryOp { op, left, right } => {
                let prec = op.precedence();
                left.fmt_child(f, left.precedence() < prec)?;
                write!(f, " {} ", op.symbol())?;
                // Left associative: an equal-precedence right child keeps its parens
                right.fmt_child(f, right.precedence() <= prec)
            }
            Self::UnaryOp { op: UnaryOperator::Neg, operand } => {
                write!(f, "-")?;
                operand.fmt_child(f, operand.precedence() < UNARY_PRECEDENCE)
            }
        }
    }
}

impl From<Expr> for String {
    fn from(expr: Expr) -> Self {
        expr.to_string()
    }
}

impl TryFrom<String> for Expr {
    type Error = ParseError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        parse_expression(&text)
    }
}

impl std::str::FromStr for Expr {
    type Err = ParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        parse_expression(text)
    }
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Identifier(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Eof,
}

/// Tokenizer
struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    position: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            position: 0,
        }
    }

    fn next_token(&mut self) -> Result<(Token, usize), ParseError> {
        self.skip_whitespace();

        let pos = self.position;
        let token = match self.chars.peek() {
            None => Token::Eof,
            Some(&c) => match c {
                '+' => self.single(Token::Plus),
                '-' => self.single(Token::Minus),
                '*' => self.single(Token::Star),
                '/' => self.single(Token::Slash),
                '(' => self.single(Token::LParen),
                ')' => self.single(Token::RParen),
                c if c.is_ascii_digit() || c == '.' => self.read_number()?,
                c if c.is_ascii_alphabetic() || c == '_' => Token::Identifier(self.read_identifier()),
                _ => {
                    return Err(ParseError {
                        message: format!("Unexpected character: '{}'", c),
                        position: pos,
                    })
                }
            },
        };
        Ok((token, pos))
    }

    fn single(&mut self, token: Token) -> Token {
        self.advance();
        token
    }

    fn advance(&mut self) -> Option<char> {
        self.position += 1;
        self.chars.next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_number(&mut self) -> Result<Token, ParseError> {
        let pos = self.position;
        let mut num_str = String::new();
        let mut has_dot = false;

        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() {
                num_str.push(c);
                self.advance();
            } else if c == '.' && !has_dot {
                has_dot = true;
                num_str.push(c);
                self.advance();
            } else {
                break;
            }
        }

        // Scientific notation (1e3, 2.5E-2)
        if let Some(&c) = self.chars.peek() {
            if c == 'e' || c == 'E' {
                num_str.push(c);
                self.advance();
                if let Some(&sign) = self.chars.peek() {
                    if sign == '+' || sign == '-' {
                        num_str.push(sign);
                        self.advance();
                    }
                }
                while let Some(&c) = self.chars.peek() {
                    if c.is_ascii_digit() {
                        num_str.push(c);
                        self.advance();
                    } else {
                        break;
                    }
                }
            }
        }

        let value = num_str.parse::<f64>().map_err(|_| ParseError {
            message: format!("Invalid number: '{}'", num_str),
            position: pos,
        })?;
        // Non-finite values have no literal form to print back
        if !value.is_finite() {
            return Err(ParseError {
                message: format!("Number out of range: '{}'", num_str),
                position: pos,
            });
        }
        Ok(Token::Number(value))
    }

    fn read_identifier(&mut self) -> String {
        let mut name = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                name.push(c);
                self.advance();
            } else {
                break;
            }
        }
        name
    }
}

/// Deepest expression tree (and parenthesis/minus nesting) accepted
const MAX_DEPTH: usize = 256;

/// Parser for expressions
struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    /// Start position of `current`
    position: usize,
    /// Open parentheses and unary minus signs on the current path
    nesting: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(input);
        let (current, position) = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            position,
            nesting: 0,
        })
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        let (token, position) = self.lexer.next_token()?;
        self.current = token;
        self.position = position;
        Ok(())
    }

    fn error(&self, message: String) -> ParseError {
        ParseError {
            message,
            position: self.position,
        }
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        self.nesting += 1;
        if self.nesting > MAX_DEPTH {
            return Err(self.error("Expression nested too deeply".to_string()));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.nesting -= 1;
    }

    fn check_depth(&self, depth: usize) -> Result<usize, ParseError> {
        if depth > MAX_DEPTH {
            return Err(self.error("Expression nested too deeply".to_string()));
        }
        Ok(depth)
    }

    fn parse(&mut self) -> Result<Expr, ParseError> {
        let (expr, _) = self.parse_additive()?;
        if self.current != Token::Eof {
            return Err(self.error(format!("Unexpected token after expression: {:?}", self.current)));
        }
        Ok(expr)
    }

    // Additive: term (('+' | '-') term)*
    // Each parse_* returns the expression with its tree depth.
    fn parse_additive(&mut self) -> Result<(Expr, usize), ParseError> {
        let (mut left, mut depth) = self.parse_multiplicative()?;

        loop {
            let op = match &self.current {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Sub,
                _ => break,
            };
            self.advance()?;
            let (right, right_depth) = self.parse_multiplicative()?;
            depth = self.check_depth(1 + depth.max(right_depth))?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok((left, depth))
    }

    // Multiplicative: unary (('*' | '/') unary)*
    fn parse_multiplicative(&mut self) -> Result<(Expr, usize), ParseError> {
        let (mut left, mut depth) = self.parse_unary()?;

        loop {
            let op = match &self.current {
                Token::Star => BinaryOperator::Mul,
                Token::Slash => BinaryOperator::Div,
                _ => break,
            };
            self.advance()?;
            let (right, right_depth) = self.parse_unary()?;
            depth = self.check_depth(1 + depth.max(right_depth))?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok((left, depth))
    }

    // Unary: '-' unary | primary
    fn parse_unary(&mut self) -> Result<(Expr, usize), ParseError> {
        if self.current == Token::Minus {
            self.enter()?;
            self.advance()?;
            let (operand, depth) = self.parse_unary()?;
            self.leave();
            let expr = Expr::UnaryOp {
                op: UnaryOperator::Neg,
                operand: Box::new(operand),
            };
            Ok((expr, self.check_depth(depth + 1)?))
        } else {
            self.parse_primary()
        }
    }

    // Primary: number | variable | '(' expr ')'
    fn parse_primary(&mut self) -> Result<(Expr, usize), ParseError> {
        match &self.current {
            Token::Number(n) => {
                let val = *n;
                self.advance()?;
                Ok((Expr::Number(val), 1))
            }
            Token::Identifier(name) => {
                let name = name.clone();
                self.advance()?;
                Ok((Expr::Variable(name), 1))
            }
            Token::LParen => {
                self.enter()?;
                self.advance()?;
                let inner = self.parse_additive()?;
                if self.current != Token::RParen {
                    return Err(self.error("Expected ')'".to_string()));
                }
                self.advance()?;
                self.leave();
                Ok(inner)
            }
            Token::Eof => Err(self.error("Unexpected end of expression".to_string())),
            _ => Err(self.error(format!("Unexpected token: {:?}", self.current))),
        }
    }
}

/// Parse an expression string into an AST
pub fn parse_expression(input: &str) -> Result<Expr, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError {
            message: "Empty expression".to_string(),
            position: 0,
        });
    }
    let mut parser = Parser::new(input)?;
    parser.parse()
}

/// Whether `name` is usable as a variable name in expressions.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
