//! Lexer for TKML expressions.
//!
//! Tokenizes the text captured between the braces of `attr={...}` or
//! `<Label>{...}</Label>`. Operates on a single expression string; the
//! surrounding markup never reaches this module.
//!
//! # Examples
//!
//! ```
//! use tkml_expr::lexer::{ExprLexer, TokenKind};
//!
//! let tokens = ExprLexer::tokenize("var + 1").unwrap();
//! assert_eq!(tokens[0].kind, TokenKind::Identifier);
//! assert_eq!(tokens[1].kind, TokenKind::Plus);
//! assert_eq!(tokens[2].kind, TokenKind::Int);
//! ```

use crate::ast::Span;
use crate::EvalError;

/// A token produced by the expression lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub value: TokenValue,
}

/// Token classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Literals
    Int,
    Float,
    String,
    Boolean,
    Null,

    Identifier,

    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    // Comparison
    EqEq,
    NotEq,
    Lt,
    Gt,
    Lte,
    Gte,

    // Logical
    And,
    Or,
    Not,

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,

    // Punctuation
    Dot,
    Comma,
    Colon,
    Question,

    Eof,
}

/// The value carried by a token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    None,
    Int(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Identifier(String),
}

/// TKML expression lexer.
pub struct ExprLexer {
    chars: Vec<char>,
    pos: usize,
}

impl ExprLexer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    /// Tokenize the entire source into a vector of tokens ending with `Eof`.
    pub fn tokenize(source: &str) -> Result<Vec<Token>, EvalError> {
        let mut lexer = ExprLexer::new(source);
        let mut tokens = Vec::new();

        loop {
            let token = lexer.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        Ok(tokens)
    }

    /// Read the next token from the source.
    pub fn next_token(&mut self) -> Result<Token, EvalError> {
        self.skip_whitespace();

        if self.is_at_end() {
            return Ok(self.token(TokenKind::Eof, self.pos, TokenValue::None));
        }

        let start = self.pos;
        let ch = self.current();

        match ch {
            '0'..='9' => self.read_number(start),
            '\'' | '"' => self.read_string(start),
            c if c.is_alphabetic() || c == '_' => Ok(self.read_identifier(start)),

            // Two-character operators
            '=' if self.peek() == Some('=') => Ok(self.two(TokenKind::EqEq, start)),
            '!' if self.peek() == Some('=') => Ok(self.two(TokenKind::NotEq, start)),
            '<' if self.peek() == Some('=') => Ok(self.two(TokenKind::Lte, start)),
            '>' if self.peek() == Some('=') => Ok(self.two(TokenKind::Gte, start)),
            '&' if self.peek() == Some('&') => Ok(self.two(TokenKind::And, start)),
            '|' if self.peek() == Some('|') => Ok(self.two(TokenKind::Or, start)),

            // Single-character tokens
            '+' => Ok(self.one(TokenKind::Plus, start)),
            '-' => Ok(self.one(TokenKind::Minus, start)),
            '*' => Ok(self.one(TokenKind::Star, start)),
            '/' => Ok(self.one(TokenKind::Slash, start)),
            '%' => Ok(self.one(TokenKind::Percent, start)),
            '!' => Ok(self.one(TokenKind::Not, start)),
            '<' => Ok(self.one(TokenKind::Lt, start)),
            '>' => Ok(self.one(TokenKind::Gt, start)),
            '(' => Ok(self.one(TokenKind::LParen, start)),
            ')' => Ok(self.one(TokenKind::RParen, start)),
            '[' => Ok(self.one(TokenKind::LBracket, start)),
            ']' => Ok(self.one(TokenKind::RBracket, start)),
            '{' => Ok(self.one(TokenKind::LBrace, start)),
            '}' => Ok(self.one(TokenKind::RBrace, start)),
            '.' => Ok(self.one(TokenKind::Dot, start)),
            ',' => Ok(self.one(TokenKind::Comma, start)),
            ':' => Ok(self.one(TokenKind::Colon, start)),
            '?' => Ok(self.one(TokenKind::Question, start)),

            _ => Err(EvalError::UnexpectedCharacter { ch, offset: start }),
        }
    }

    // --- Private helpers ---

    fn read_number(&mut self, start: usize) -> Result<Token, EvalError> {
        let mut is_float = false;
        while !self.is_at_end() {
            let c = self.current();
            if c.is_ascii_digit() {
                self.advance();
            } else if c == '.' && !is_float && self.peek().is_some_and(|n| n.is_ascii_digit()) {
                // `1.foo` stays a member access on an integer
                is_float = true;
                self.advance();
            } else {
                break;
            }
        }

        let text: String = self.chars[start..self.pos].iter().collect();
        let invalid = || EvalError::InvalidNumber {
            text: text.clone(),
            offset: start,
        };

        if is_float {
            let value: f64 = text.parse().map_err(|_| invalid())?;
            Ok(self.token(TokenKind::Float, start, TokenValue::Float(value)))
        } else {
            let value: i64 = text.parse().map_err(|_| invalid())?;
            Ok(self.token(TokenKind::Int, start, TokenValue::Int(value)))
        }
    }

    fn read_string(&mut self, start: usize) -> Result<Token, EvalError> {
        let quote = self.current();
        self.advance(); // skip opening quote

        let mut value = String::new();

        while !self.is_at_end() && self.current() != quote {
            if self.current() == '\\' {
                self.advance();
                if self.is_at_end() {
                    break;
                }
                match self.current() {
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    'r' => value.push('\r'),
                    '\\' => value.push('\\'),
                    '\'' => value.push('\''),
                    '"' => value.push('"'),
                    c => {
                        value.push('\\');
                        value.push(c);
                    }
                }
            } else {
                value.push(self.current());
            }
            self.advance();
        }

        if self.is_at_end() {
            return Err(EvalError::UnterminatedString { offset: start });
        }

        self.advance(); // skip closing quote

        Ok(self.token(TokenKind::String, start, TokenValue::String(value)))
    }

    fn read_identifier(&mut self, start: usize) -> Token {
        while !self.is_at_end() && (self.current().is_alphanumeric() || self.current() == '_') {
            self.advance();
        }

        let text: String = self.chars[start..self.pos].iter().collect();

        match text.as_str() {
            "true" => self.token(TokenKind::Boolean, start, TokenValue::Boolean(true)),
            "false" => self.token(TokenKind::Boolean, start, TokenValue::Boolean(false)),
            "null" => self.token(TokenKind::Null, start, TokenValue::None),
            _ => self.token(TokenKind::Identifier, start, TokenValue::Identifier(text)),
        }
    }

    fn one(&mut self, kind: TokenKind, start: usize) -> Token {
        self.advance();
        self.token(kind, start, TokenValue::None)
    }

    fn two(&mut self, kind: TokenKind, start: usize) -> Token {
        self.advance();
        self.advance();
        self.token(kind, start, TokenValue::None)
    }

    fn token(&self, kind: TokenKind, start: usize, value: TokenValue) -> Token {
        Token {
            kind,
            span: Span::new(start, self.pos),
            value,
        }
    }

    fn current(&self) -> char {
        self.chars[self.pos]
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.current().is_whitespace() {
            self.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tokenize(source: &str) -> Vec<Token> {
        ExprLexer::tokenize(source).unwrap()
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    // --- Literals ---

    #[test]
    fn test_integer() {
        let tokens = tokenize("42");
        assert_eq!(tokens[0].kind, TokenKind::Int);
        assert_eq!(tokens[0].value, TokenValue::Int(42));
    }

    #[test]
    fn test_float() {
        let tokens = tokenize("0.3048");
        assert_eq!(tokens[0].kind, TokenKind::Float);
        assert_eq!(tokens[0].value, TokenValue::Float(0.3048));
    }

    #[test]
    fn test_integer_member_access_is_not_float() {
        assert_eq!(
            kinds("1.x"),
            vec![TokenKind::Int, TokenKind::Dot, TokenKind::Identifier, TokenKind::Eof]
        );
    }

    #[test]
    fn test_string_single_quotes() {
        let tokens = tokenize("'W E'");
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].value, TokenValue::String("W E".into()));
    }

    #[test]
    fn test_string_escapes() {
        let tokens = tokenize(r#""a\"b\n""#);
        assert_eq!(tokens[0].value, TokenValue::String("a\"b\n".into()));
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            kinds("true false null"),
            vec![
                TokenKind::Boolean,
                TokenKind::Boolean,
                TokenKind::Null,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unicode_identifier() {
        let tokens = tokenize("größe");
        assert_eq!(tokens[0].value, TokenValue::Identifier("größe".into()));
        assert_eq!(tokens[0].span, Span::new(0, 5));
    }

    // --- Operators ---

    #[test]
    fn test_arithmetic() {
        assert_eq!(
            kinds("a + b - c * d / e % f"),
            vec![
                TokenKind::Identifier,
                TokenKind::Plus,
                TokenKind::Identifier,
                TokenKind::Minus,
                TokenKind::Identifier,
                TokenKind::Star,
                TokenKind::Identifier,
                TokenKind::Slash,
                TokenKind::Identifier,
                TokenKind::Percent,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comparison_and_logic() {
        assert_eq!(
            kinds("a == b != c <= d >= e && !f || g < h > i"),
            vec![
                TokenKind::Identifier,
                TokenKind::EqEq,
                TokenKind::Identifier,
                TokenKind::NotEq,
                TokenKind::Identifier,
                TokenKind::Lte,
                TokenKind::Identifier,
                TokenKind::Gte,
                TokenKind::Identifier,
                TokenKind::And,
                TokenKind::Not,
                TokenKind::Identifier,
                TokenKind::Or,
                TokenKind::Identifier,
                TokenKind::Lt,
                TokenKind::Identifier,
                TokenKind::Gt,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_map_literal() {
        assert_eq!(
            kinds("{ padx: 5 }"),
            vec![
                TokenKind::LBrace,
                TokenKind::Identifier,
                TokenKind::Colon,
                TokenKind::Int,
                TokenKind::RBrace,
                TokenKind::Eof,
            ]
        );
    }

    // --- Errors ---

    #[test]
    fn test_unterminated_string() {
        let err = ExprLexer::tokenize("'hello").unwrap_err();
        assert_eq!(err, EvalError::UnterminatedString { offset: 0 });
    }

    #[test]
    fn test_unexpected_character() {
        let err = ExprLexer::tokenize("count # 5").unwrap_err();
        assert_eq!(err, EvalError::UnexpectedCharacter { ch: '#', offset: 6 });
    }

    #[test]
    fn test_integer_overflow_literal() {
        let err = ExprLexer::tokenize("99999999999999999999").unwrap_err();
        assert!(matches!(err, EvalError::InvalidNumber { .. }));
    }

    #[test]
    fn test_empty_input() {
        let tokens = tokenize("");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
    }

    #[test]
    fn test_span_tracking() {
        let tokens = tokenize("a + b");
        assert_eq!(tokens[0].span, Span::new(0, 1));
        assert_eq!(tokens[1].span, Span::new(2, 3));
        assert_eq!(tokens[2].span, Span::new(4, 5));
    }
}
