//! Expression lexer, AST, and recursive-descent parser.
//!
//! The grammar is a small, side-effect-free slice of familiar C-family
//! expression syntax: literals, identifiers, member access, calls, indexing,
//! arithmetic, comparison, boolean operators and the ternary conditional.
//! There is no assignment, no statement syntax and no function definition.
//!
//! Operator precedence (lowest → highest):
//!   ternary  →  or  →  and  →  equality  →  relational  →
//!   additive  →  multiplicative  →  unary  →  postfix  →  primary

use std::fmt;
use std::str::FromStr;

use super::value::Value;
use crate::error::{Error, Result};

// ── Token ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Num(f64),
    Str(String),
    Ident(String),

    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,

    // Comparison
    StrictEq, // ===
    StrictNe, // !==
    Eq,       // ==
    Ne,       // !=
    Lt,
    Le,
    Gt,
    Ge,

    // Logical
    And, // &&
    Or,  // ||

    // Misc
    Question,
    Colon,
    Comma,
    Dot,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Token::Num(x) => return write!(f, "number {}", Value::Num(*x)),
            Token::Str(s) => return write!(f, "string {s:?}"),
            Token::Ident(name) => return write!(f, "identifier '{name}'"),
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::Bang => "!",
            Token::StrictEq => "===",
            Token::StrictNe => "!==",
            Token::Eq => "==",
            Token::Ne => "!=",
            Token::Lt => "<",
            Token::Le => "<=",
            Token::Gt => ">",
            Token::Ge => ">=",
            Token::And => "&&",
            Token::Or => "||",
            Token::Question => "?",
            Token::Colon => ":",
            Token::Comma => ",",
            Token::Dot => ".",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::Eof => return f.write_str("end of expression"),
        };
        write!(f, "'{s}'")
    }
}

// ── Lexer ─────────────────────────────────────────────────────────────────────

struct Lexer {
    src: Vec<char>,
    pos: usize,
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

impl Lexer {
    fn new(src: &str) -> Self {
        Lexer {
            src: src.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.src.get(self.pos).copied()
    }

    fn peek2(&self) -> Option<char> {
        self.src.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn take_while(&mut self, s: &mut String, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.peek().filter(|&c| pred(c)) {
            s.push(c);
            self.pos += 1;
        }
    }

    fn read_number(&mut self, first: char) -> Result<Token> {
        let mut s = String::new();
        s.push(first);

        // Hex literal
        if first == '0' && matches!(self.peek(), Some('x' | 'X')) {
            self.pos += 1;
            let mut hex = String::new();
            self.take_while(&mut hex, |c| c.is_ascii_hexdigit());
            return u64::from_str_radix(&hex, 16)
                .map(|n| Token::Num(n as f64))
                .map_err(|_| Error::Syntax(format!("invalid hex literal '0x{hex}'")));
        }

        self.take_while(&mut s, |c| c.is_ascii_digit());
        if self.peek() == Some('.') && self.peek2().is_some_and(|c| c.is_ascii_digit()) {
            s.push('.');
            self.pos += 1;
            self.take_while(&mut s, |c| c.is_ascii_digit());
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let sign = matches!(self.peek2(), Some('+' | '-'));
            let digit_at = if sign { self.pos + 2 } else { self.pos + 1 };
            if self.src.get(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                s.push('e');
                self.pos += 1;
                if sign {
                    s.extend(self.advance());
                }
                self.take_while(&mut s, |c| c.is_ascii_digit());
            }
        }
        if self.peek().is_some_and(is_ident_start) {
            return Err(Error::Syntax(format!(
                "identifier starts immediately after number '{s}'"
            )));
        }

        s.parse()
            .map(Token::Num)
            .map_err(|_| Error::Syntax(format!("invalid number '{s}'")))
    }

    fn read_string(&mut self, quote: char) -> Result<Token> {
        let mut s = String::new();
        loop {
            match self.advance() {
                None => return Err(Error::Syntax("unterminated string literal".into())),
                Some('\\') => match self.advance() {
                    Some('n') => s.push('\n'),
                    Some('t') => s.push('\t'),
                    Some('r') => s.push('\r'),
                    Some('0') => s.push('\0'),
                    Some(c) => s.push(c),
                    None => return Err(Error::Syntax("unterminated string literal".into())),
                },
                Some(c) if c == quote => break,
                Some(c) => s.push(c),
            }
        }
        Ok(Token::Str(s))
    }

    fn read_ident(&mut self, first: char) -> Token {
        let mut s = String::new();
        s.push(first);
        self.take_while(&mut s, is_ident_continue);
        Token::Ident(s)
    }

    fn next_token(&mut self) -> Result<Token> {
        self.skip_ws();
        let ch = match self.advance() {
            None => return Ok(Token::Eof),
            Some(c) => c,
        };

        Ok(match ch {
            '0'..='9' => return self.read_number(ch),
            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => {
                // `.5`
                self.pos -= 1;
                return self.read_number('0');
            }
            '"' | '\'' => return self.read_string(ch),
            c if is_ident_start(c) => self.read_ident(c),
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '%' => Token::Percent,
            '!' => {
                if self.eat('=') {
                    if self.eat('=') {
                        Token::StrictNe
                    } else {
                        Token::Ne
                    }
                } else {
                    Token::Bang
                }
            }
            '=' => {
                if self.eat('=') {
                    if self.eat('=') {
                        Token::StrictEq
                    } else {
                        Token::Eq
                    }
                } else {
                    return Err(Error::Syntax(
                        "assignment is not supported; use '===' to compare".into(),
                    ));
                }
            }
            '<' => {
                if self.eat('=') {
                    Token::Le
                } else {
                    Token::Lt
                }
            }
            '>' => {
                if self.eat('=') {
                    Token::Ge
                } else {
                    Token::Gt
                }
            }
            '&' if self.eat('&') => Token::And,
            '|' if self.eat('|') => Token::Or,
            '?' => Token::Question,
            ':' => Token::Colon,
            ',' => Token::Comma,
            '.' => Token::Dot,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            c => return Err(Error::Syntax(format!("unexpected character '{c}'"))),
        })
    }

    fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let t = self.next_token()?;
            let done = matches!(t, Token::Eof);
            tokens.push(t);
            if done {
                break;
            }
        }
        Ok(tokens)
    }
}

// ── AST ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    StrictEq,
    StrictNe,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// `&&` and `||`, which evaluate their right side only when needed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogicOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    /// A bare name, resolved through the scope.
    Ident(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Logical(LogicOp, Box<Expr>, Box<Expr>),
    Ternary(Box<Expr>, Box<Expr>, Box<Expr>),
    /// `name(args…)`: invoke the scope binding `name`.
    Call(String, Vec<Expr>),
    /// `object.name`
    Member(Box<Expr>, String),
    /// `object.name(args…)`
    MethodCall(Box<Expr>, String, Vec<Expr>),
    /// `object[index]`
    Index(Box<Expr>, Box<Expr>),
}

// ── Parser ────────────────────────────────────────────────────────────────────

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let t = self.tokens.get(self.pos).cloned().unwrap_or(Token::Eof);
        self.pos += 1;
        t
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == expected {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token, context: &str) -> Result<()> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(Error::Syntax(format!(
                "expected {expected} {context}, found {}",
                self.peek()
            )))
        }
    }

    // ── Grammar ───────────────────────────────────────────────────────────────

    fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_ternary()
    }

    fn parse_ternary(&mut self) -> Result<Expr> {
        let cond = self.parse_or()?;
        if self.eat(&Token::Question) {
            let then = self.parse_ternary()?;
            self.expect(&Token::Colon, "in conditional expression")?;
            let else_ = self.parse_ternary()?;
            Ok(Expr::Ternary(
                Box::new(cond),
                Box::new(then),
                Box::new(else_),
            ))
        } else {
            Ok(cond)
        }
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_and()?;
        while self.eat(&Token::Or) {
            let rhs = self.parse_and()?;
            lhs = Expr::Logical(LogicOp::Or, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_equality()?;
        while self.eat(&Token::And) {
            let rhs = self.parse_equality()?;
            lhs = Expr::Logical(LogicOp::And, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_equality(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_relational()?;
        loop {
            let op = match self.peek() {
                Token::StrictEq => BinOp::StrictEq,
                Token::StrictNe => BinOp::StrictNe,
                Token::Eq => BinOp::Eq,
                Token::Ne => BinOp::Ne,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_relational()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_relational(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Token::Lt => BinOp::Lt,
                Token::Le => BinOp::Le,
                Token::Gt => BinOp::Gt,
                Token::Ge => BinOp::Ge,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_additive()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_multiplicative()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                Token::Percent => BinOp::Rem,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        match self.peek() {
            Token::Minus => {
                self.pos += 1;
                Ok(Expr::Unary(UnaryOp::Neg, Box::new(self.parse_unary()?)))
            }
            Token::Bang => {
                self.pos += 1;
                Ok(Expr::Unary(UnaryOp::Not, Box::new(self.parse_unary()?)))
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> Result<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.eat(&Token::Dot) {
                let name = match self.advance() {
                    Token::Ident(name) => name,
                    other => {
                        return Err(Error::Syntax(format!(
                            "expected member name after '.', found {other}"
                        )))
                    }
                };
                if self.eat(&Token::LParen) {
                    let args = self.parse_args(&name)?;
                    expr = Expr::MethodCall(Box::new(expr), name, args);
                } else {
                    expr = Expr::Member(Box::new(expr), name);
                }
            } else if self.eat(&Token::LBracket) {
                let index = self.parse_expr()?;
                self.expect(&Token::RBracket, "after index")?;
                expr = Expr::Index(Box::new(expr), Box::new(index));
            } else {
                break;
            }
        }
        Ok(expr)
    }

    /// Parse a call's argument list; the opening `(` is already consumed.
    fn parse_args(&mut self, callee: &str) -> Result<Vec<Expr>> {
        let mut args = Vec::new();
        if self.peek() != &Token::RParen {
            args.push(self.parse_expr()?);
            while self.eat(&Token::Comma) {
                args.push(self.parse_expr()?);
            }
        }
        self.expect(&Token::RParen, &format!("after arguments to {callee}"))?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let tok = self.advance();
        match tok {
            Token::Num(x) => Ok(Expr::Literal(Value::Num(x))),
            Token::Str(s) => Ok(Expr::Literal(Value::Str(s))),
            Token::Ident(name) => match name.as_str() {
                "true" => Ok(Expr::Literal(Value::Bool(true))),
                "false" => Ok(Expr::Literal(Value::Bool(false))),
                "null" => Ok(Expr::Literal(Value::Null)),
                _ if self.eat(&Token::LParen) => {
                    let args = self.parse_args(&name)?;
                    Ok(Expr::Call(name, args))
                }
                _ => Ok(Expr::Ident(name)),
            },
            Token::LParen => {
                let inner = self.parse_expr()?;
                self.expect(&Token::RParen, "to close '('")?;
                Ok(inner)
            }
            Token::Eof => Err(Error::Syntax("unexpected end of expression".into())),
            other => Err(Error::Syntax(format!("unexpected {other}"))),
        }
    }
}

/// Parse an expression string into an AST.
pub fn parse_expr(src: &str) -> Result<Expr> {
    let tokens = Lexer::new(src).tokenize()?;
    let mut parser = Parser::new(tokens);
    let expr = parser.parse_expr()?;
    match parser.peek() {
        Token::Eof => Ok(expr),
        other => Err(Error::Syntax(format!("unexpected {other}"))),
    }
}

// ── Expression ────────────────────────────────────────────────────────────────

/// A parsed expression, reusable across any number of scopes.
///
/// The tree is immutable once built; evaluating it never changes it.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    root: Expr,
}

impl Expression {
    pub fn parse(src: &str) -> Result<Self> {
        Ok(Expression {
            root: parse_expr(src)?,
        })
    }

    pub fn root(&self) -> &Expr {
        &self.root
    }
}

impl FromStr for Expression {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Expression::parse(s)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Expr {
        parse_expr(src).expect("parse failed")
    }

    fn lit(x: f64) -> Box<Expr> {
        Box::new(Expr::Literal(Value::Num(x)))
    }

    fn ident(name: &str) -> Box<Expr> {
        Box::new(Expr::Ident(name.into()))
    }

    #[test]
    #[allow(clippy::approx_constant)]
    fn literals() {
        assert_eq!(parse("42"), Expr::Literal(Value::Num(42.0)));
        assert_eq!(parse("3.14"), Expr::Literal(Value::Num(3.14)));
        assert_eq!(parse(".5"), Expr::Literal(Value::Num(0.5)));
        assert_eq!(parse("1e3"), Expr::Literal(Value::Num(1000.0)));
        assert_eq!(parse("0xff"), Expr::Literal(Value::Num(255.0)));
        assert_eq!(parse("\"hi\""), Expr::Literal(Value::from("hi")));
        assert_eq!(parse("'it\\'s'"), Expr::Literal(Value::from("it's")));
        assert_eq!(parse("true"), Expr::Literal(Value::Bool(true)));
        assert_eq!(parse("null"), Expr::Literal(Value::Null));
    }

    #[test]
    fn non_ascii_strings_survive() {
        assert_eq!(parse("\"héllo ✓\""), Expr::Literal(Value::from("héllo ✓")));
    }

    #[test]
    fn precedence() {
        assert_eq!(
            parse("1 + 2 * 3"),
            Expr::Binary(
                BinOp::Add,
                lit(1.0),
                Box::new(Expr::Binary(BinOp::Mul, lit(2.0), lit(3.0)))
            )
        );
        assert_eq!(
            parse("a < 1 === b"),
            Expr::Binary(
                BinOp::StrictEq,
                Box::new(Expr::Binary(BinOp::Lt, ident("a"), lit(1.0))),
                ident("b")
            )
        );
    }

    #[test]
    fn dollar_is_an_identifier() {
        assert_eq!(parse("$"), Expr::Ident("$".into()));
        assert_eq!(
            parse("$.indexOf(\"b\")"),
            Expr::MethodCall(ident("$"), "indexOf".into(), vec![Expr::Literal(Value::from("b"))])
        );
    }

    #[test]
    fn bare_call_and_member_chain() {
        assert_eq!(parse("toUpperCase()"), Expr::Call("toUpperCase".into(), vec![]));
        assert_eq!(
            parse("split(\",\").length"),
            Expr::Member(
                Box::new(Expr::Call("split".into(), vec![Expr::Literal(Value::from(","))])),
                "length".into()
            )
        );
    }

    #[test]
    fn index() {
        assert_eq!(
            parse("3 * array[i]"),
            Expr::Binary(
                BinOp::Mul,
                lit(3.0),
                Box::new(Expr::Index(ident("array"), ident("i")))
            )
        );
    }

    #[test]
    fn ternary_is_right_associative() {
        let e = parse("a ? 1 : b ? 2 : 3");
        assert!(matches!(e, Expr::Ternary(_, _, ref rest) if matches!(**rest, Expr::Ternary(..))));
    }

    #[test]
    fn syntax_errors() {
        for src in [
            "", "1 +", "(1", "a[1", "a ? b", "\"open", "x = 1", "a & b", "1 2", "#", "a.", "f(1,",
        ] {
            let err = parse_expr(src).unwrap_err();
            assert!(matches!(err, Error::Syntax(_)), "{src:?} gave {err:?}");
        }
    }

    #[test]
    fn logical_operators_bind_looser_than_comparison() {
        assert_eq!(
            parse("a || b && c === 1"),
            Expr::Logical(
                LogicOp::Or,
                ident("a"),
                Box::new(Expr::Logical(
                    LogicOp::And,
                    ident("b"),
                    Box::new(Expr::Binary(BinOp::StrictEq, ident("c"), lit(1.0)))
                ))
            )
        );
    }

    #[test]
    fn expression_from_str() {
        let e: Expression = "length === 3".parse().unwrap();
        assert!(matches!(e.root(), Expr::Binary(BinOp::StrictEq, ..)));
    }
}
