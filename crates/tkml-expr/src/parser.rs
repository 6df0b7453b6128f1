//! Expression parser for TKML.
//!
//! Parses expression token streams (from `lexer`) into `Expression` AST nodes
//! using recursive descent with Pratt binding powers for operator precedence.

use crate::ast::{BinaryOp, ExprKind, Expression, Span, UnaryOp};
use crate::lexer::{ExprLexer, Token, TokenKind, TokenValue};
use crate::EvalError;

// Binding powers, lowest first. Infix operators bind (left, left + 1) so they
// associate to the left; the ternary alternate re-enters at TERNARY to nest right.
const TERNARY: u8 = 2;
const OR: u8 = 3;
const AND: u8 = 5;
const EQUALITY: u8 = 7;
const COMPARISON: u8 = 9;
const ADDITIVE: u8 = 11;
const MULTIPLICATIVE: u8 = 13;
const PREFIX: u8 = 15;
const POSTFIX: u8 = 17;

/// TKML expression parser.
pub struct ExprParser {
    tokens: Vec<Token>,
    pos: usize,
}

impl ExprParser {
    /// Create a new expression parser for the given tokens.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parse a complete expression from a source string.
    ///
    /// The whole input must form one expression; leftover tokens are an error.
    pub fn parse(source: &str) -> Result<Expression, EvalError> {
        let tokens = ExprLexer::tokenize(source)?;
        let mut parser = ExprParser::new(tokens);
        let expr = parser.parse_expression(0)?;

        if parser.peek().kind != TokenKind::Eof {
            return Err(parser.error("unexpected token after expression"));
        }

        Ok(expr)
    }

    fn parse_expression(&mut self, min_bp: u8) -> Result<Expression, EvalError> {
        let mut left = self.parse_prefix()?;

        loop {
            let kind = self.peek().kind;

            if let Some(op) = binary_op(kind) {
                let l_bp = infix_binding_power(op);
                if l_bp < min_bp {
                    break;
                }
                self.advance();
                let right = self.parse_expression(l_bp + 1)?;
                let span = left.span.to(right.span);
                left = Expression::new(
                    ExprKind::Binary {
                        left: Box::new(left),
                        op,
                        right: Box::new(right),
                    },
                    span,
                );
                continue;
            }

            match kind {
                TokenKind::Question if TERNARY >= min_bp => {
                    self.advance();
                    let consequent = self.parse_expression(0)?;
                    self.expect(TokenKind::Colon, "expected ':' in conditional expression")?;
                    let alternate = self.parse_expression(TERNARY)?;
                    let span = left.span.to(alternate.span);
                    left = Expression::new(
                        ExprKind::Ternary {
                            condition: Box::new(left),
                            consequent: Box::new(consequent),
                            alternate: Box::new(alternate),
                        },
                        span,
                    );
                }
                TokenKind::Dot | TokenKind::LBracket | TokenKind::LParen if POSTFIX >= min_bp => {
                    left = self.parse_postfix(left)?;
                }
                _ => break,
            }
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Expression, EvalError> {
        let token = self.peek().clone();
        let span = token.span;

        match token.kind {
            TokenKind::Not | TokenKind::Minus => {
                self.advance();
                let op = if token.kind == TokenKind::Not {
                    UnaryOp::Not
                } else {
                    UnaryOp::Neg
                };
                let operand = self.parse_expression(PREFIX)?;
                let span = span.to(operand.span);
                Ok(Expression::new(
                    ExprKind::Unary {
                        op,
                        operand: Box::new(operand),
                    },
                    span,
                ))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression(0)?;
                self.expect(TokenKind::RParen, "expected ')'")?;
                Ok(inner)
            }
            TokenKind::LBracket => self.parse_list(),
            TokenKind::LBrace => self.parse_map(),
            _ => {
                let kind = match token.value {
                    TokenValue::Int(n) => ExprKind::Int(n),
                    TokenValue::Float(n) => ExprKind::Float(n),
                    TokenValue::String(s) => ExprKind::Str(s),
                    TokenValue::Boolean(b) => ExprKind::Bool(b),
                    TokenValue::Identifier(name) => ExprKind::Identifier(name),
                    TokenValue::None if token.kind == TokenKind::Null => ExprKind::Null,
                    TokenValue::None => return Err(self.error("expected expression")),
                };
                self.advance();
                Ok(Expression::new(kind, span))
            }
        }
    }

    fn parse_postfix(&mut self, object: Expression) -> Result<Expression, EvalError> {
        let token = self.peek().clone();
        self.advance();

        match token.kind {
            TokenKind::Dot => {
                let name = self.peek().clone();
                let TokenValue::Identifier(property) = name.value else {
                    return Err(self.error("expected member name after '.'"));
                };
                self.advance();
                let span = object.span.to(name.span);
                Ok(Expression::new(
                    ExprKind::Member {
                        object: Box::new(object),
                        property,
                    },
                    span,
                ))
            }
            TokenKind::LBracket => {
                let index = self.parse_expression(0)?;
                let end = self.expect(TokenKind::RBracket, "expected ']'")?;
                let span = object.span.to(end);
                Ok(Expression::new(
                    ExprKind::Index {
                        object: Box::new(object),
                        index: Box::new(index),
                    },
                    span,
                ))
            }
            _ => {
                let (arguments, end) = self.parse_sequence(TokenKind::RParen)?;
                let span = object.span.to(end);
                Ok(Expression::new(
                    ExprKind::Call {
                        callee: Box::new(object),
                        arguments,
                    },
                    span,
                ))
            }
        }
    }

    fn parse_list(&mut self) -> Result<Expression, EvalError> {
        let start = self.peek().span;
        self.advance(); // consume [
        let (items, end) = self.parse_sequence(TokenKind::RBracket)?;
        Ok(Expression::new(ExprKind::List(items), start.to(end)))
    }

    /// Comma-separated expressions up to `close`; a trailing comma is allowed.
    fn parse_sequence(&mut self, close: TokenKind) -> Result<(Vec<Expression>, Span), EvalError> {
        let mut items = Vec::new();

        while self.peek().kind != close {
            items.push(self.parse_expression(0)?);
            if self.peek().kind == TokenKind::Comma {
                self.advance();
            } else {
                break;
            }
        }

        let end = self.expect(close, "unclosed argument or item list")?;
        Ok((items, end))
    }

    fn parse_map(&mut self) -> Result<Expression, EvalError> {
        let start = self.peek().span;
        self.advance(); // consume {

        let mut entries = Vec::new();
        while self.peek().kind != TokenKind::RBrace {
            let key = match self.peek().value.clone() {
                TokenValue::Identifier(name) => name,
                TokenValue::String(s) => s,
                _ => return Err(self.error("expected map key")),
            };
            self.advance();
            self.expect(TokenKind::Colon, "expected ':' after map key")?;
            let value = self.parse_expression(0)?;
            entries.push((key, value));

            if self.peek().kind == TokenKind::Comma {
                self.advance();
            } else {
                break;
            }
        }

        let end = self.expect(TokenKind::RBrace, "expected '}'")?;
        Ok(Expression::new(ExprKind::Map(entries), start.to(end)))
    }

    // =========================================================================
    // Token navigation helpers
    // =========================================================================

    fn peek(&self) -> &Token {
        // tokenize always ends the stream with Eof
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> Result<Span, EvalError> {
        if self.peek().kind == kind {
            let span = self.peek().span;
            self.advance();
            Ok(span)
        } else {
            Err(self.error(message))
        }
    }

    fn error(&self, message: &str) -> EvalError {
        EvalError::Syntax {
            message: message.to_string(),
            offset: self.peek().span.start,
        }
    }
}

fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    Some(match kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Mod,
        TokenKind::EqEq => BinaryOp::Eq,
        TokenKind::NotEq => BinaryOp::Neq,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::Lte => BinaryOp::Lte,
        TokenKind::Gte => BinaryOp::Gte,
        TokenKind::And => BinaryOp::And,
        TokenKind::Or => BinaryOp::Or,
        _ => return None,
    })
}

fn infix_binding_power(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Or => OR,
        BinaryOp::And => AND,
        BinaryOp::Eq | BinaryOp::Neq => EQUALITY,
        BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Lte | BinaryOp::Gte => COMPARISON,
        BinaryOp::Add | BinaryOp::Sub => ADDITIVE,
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => MULTIPLICATIVE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> ExprKind {
        ExprParser::parse(source).unwrap().kind
    }

    fn binary(kind: &ExprKind) -> (&ExprKind, BinaryOp, &ExprKind) {
        match kind {
            ExprKind::Binary { left, op, right } => (&left.kind, *op, &right.kind),
            other => panic!("Expected binary expression, got {other:?}"),
        }
    }

    // =========================================================================
    // Literals
    // =========================================================================

    #[test]
    fn test_literals() {
        assert_eq!(parse("null"), ExprKind::Null);
        assert_eq!(parse("true"), ExprKind::Bool(true));
        assert_eq!(parse("10"), ExprKind::Int(10));
        assert_eq!(parse("2.5"), ExprKind::Float(2.5));
        assert_eq!(parse("'feet'"), ExprKind::Str("feet".into()));
        assert_eq!(parse("meters"), ExprKind::Identifier("meters".into()));
    }

    #[test]
    fn test_list_with_trailing_comma() {
        match parse("[1, 2,]") {
            ExprKind::List(items) => assert_eq!(items.len(), 2),
            other => panic!("Expected list, got {other:?}"),
        }
    }

    #[test]
    fn test_map_keys() {
        match parse("{ padx: 5, 'pady': 3 }") {
            ExprKind::Map(entries) => {
                let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
                assert_eq!(keys, vec!["padx", "pady"]);
            }
            other => panic!("Expected map, got {other:?}"),
        }
    }

    // =========================================================================
    // Precedence
    // =========================================================================

    #[test]
    fn test_multiplication_binds_tighter() {
        let kind = parse("1 + 2 * 3");
        let (left, op, right) = binary(&kind);
        assert_eq!(op, BinaryOp::Add);
        assert_eq!(*left, ExprKind::Int(1));
        assert_eq!(binary(right).1, BinaryOp::Mul);
    }

    #[test]
    fn test_left_associative_subtraction() {
        let kind = parse("10 - 3 - 2");
        let (left, op, right) = binary(&kind);
        assert_eq!(op, BinaryOp::Sub);
        assert_eq!(binary(left).1, BinaryOp::Sub);
        assert_eq!(*right, ExprKind::Int(2));
    }

    #[test]
    fn test_logical_precedence() {
        let kind = parse("a || b && c");
        let (_, op, right) = binary(&kind);
        assert_eq!(op, BinaryOp::Or);
        assert_eq!(binary(right).1, BinaryOp::And);
    }

    #[test]
    fn test_parentheses_override() {
        let kind = parse("(1 + 2) * 3");
        let (left, op, _) = binary(&kind);
        assert_eq!(op, BinaryOp::Mul);
        assert_eq!(binary(left).1, BinaryOp::Add);
    }

    #[test]
    fn test_unary_binds_tighter_than_binary() {
        let kind = parse("-a + b");
        let (left, op, _) = binary(&kind);
        assert_eq!(op, BinaryOp::Add);
        assert!(matches!(left, ExprKind::Unary { op: UnaryOp::Neg, .. }));
    }

    #[test]
    fn test_ternary_nests_right() {
        match parse("a ? 1 : b ? 2 : 3") {
            ExprKind::Ternary { alternate, .. } => {
                assert!(matches!(alternate.kind, ExprKind::Ternary { .. }));
            }
            other => panic!("Expected ternary, got {other:?}"),
        }
    }

    // =========================================================================
    // Postfix
    // =========================================================================

    #[test]
    fn test_member_index_call_chain() {
        match parse("widgets.rows[0](1, 2)") {
            ExprKind::Call { callee, arguments } => {
                assert_eq!(arguments.len(), 2);
                match callee.kind {
                    ExprKind::Index { object, .. } => {
                        assert!(matches!(
                            object.kind,
                            ExprKind::Member { ref property, .. } if property == "rows"
                        ));
                    }
                    other => panic!("Expected index, got {other:?}"),
                }
            }
            other => panic!("Expected call, got {other:?}"),
        }
    }

    #[test]
    fn test_span_covers_expression() {
        let expr = ExprParser::parse("var + 1").unwrap();
        assert_eq!(expr.span, Span::new(0, 7));
    }

    // =========================================================================
    // Errors
    // =========================================================================

    #[test]
    fn test_trailing_tokens() {
        let err = ExprParser::parse("1 2").unwrap_err();
        assert!(matches!(err, EvalError::Syntax { offset: 2, .. }));
    }

    #[test]
    fn test_missing_operand() {
        assert!(matches!(
            ExprParser::parse("1 +").unwrap_err(),
            EvalError::Syntax { .. }
        ));
    }

    #[test]
    fn test_unclosed_call() {
        assert!(ExprParser::parse("f(1, 2").is_err());
    }

    #[test]
    fn test_empty_expression() {
        assert!(matches!(
            ExprParser::parse("   ").unwrap_err(),
            EvalError::Syntax { offset: 3, .. }
        ));
    }
}
