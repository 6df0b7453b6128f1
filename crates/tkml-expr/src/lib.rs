//! TKML expressions
//!
//! The small, closed expression language embedded in TKML markup between
//! `{` and `}`. It resolves names through a two-tier [`Scope`] (inner
//! environment shadows outer) and never executes anything the host did not
//! bind: calls are only possible on [`Value::Function`] values supplied by
//! the caller.
//!
//! The markup parser only depends on the [`Evaluator`] trait, so hosts with
//! their own expression engine can plug it in instead of [`ExprEvaluator`].
//!
//! # Example
//!
//! ```
//! use tkml_expr::{Env, Evaluator, ExprEvaluator, Scope, Value};
//!
//! let outer = Env::new().with("var", 1);
//! let inner = Env::new();
//! let value = ExprEvaluator.evaluate("var + 1", &Scope::new(&outer, &inner)).unwrap();
//! assert_eq!(value, Value::Int(2));
//! ```

pub mod ast;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod scope;
pub mod value;

pub use parser::ExprParser;
pub use scope::{Env, Scope};
pub use value::{HostValue, NativeFunction, Value};

/// Expression syntax or evaluation failure.
///
/// Offsets are character positions inside the expression text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("unexpected character '{ch}' at position {offset}")]
    UnexpectedCharacter { ch: char, offset: usize },

    #[error("unterminated string starting at position {offset}")]
    UnterminatedString { offset: usize },

    #[error("invalid number '{text}' at position {offset}")]
    InvalidNumber { text: String, offset: usize },

    #[error("{message} at position {offset}")]
    Syntax { message: String, offset: usize },

    #[error("name '{name}' is not defined")]
    UnknownName { name: String },

    #[error("cannot apply `{operator}` to {left} and {right}")]
    TypeMismatch {
        operator: &'static str,
        left: &'static str,
        right: &'static str,
    },

    #[error("cannot apply `{operator}` to {operand}")]
    BadOperand {
        operator: &'static str,
        operand: &'static str,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow in `{operator}`")]
    Overflow { operator: &'static str },

    #[error("{value} has no member '{member}'")]
    NoMember { value: &'static str, member: String },

    #[error("index {index} out of range for list of length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("cannot index {value} with {index}")]
    BadIndex {
        value: &'static str,
        index: &'static str,
    },

    #[error("{value} is not callable")]
    NotCallable { value: &'static str },

    /// Raised by host functions.
    #[error("{0}")]
    Native(String),
}

/// Turns the text of one `{...}` block into a value.
pub trait Evaluator {
    fn evaluate(&self, source: &str, scope: &Scope<'_>) -> Result<Value, EvalError>;
}

impl<F> Evaluator for F
where
    F: Fn(&str, &Scope<'_>) -> Result<Value, EvalError>,
{
    fn evaluate(&self, source: &str, scope: &Scope<'_>) -> Result<Value, EvalError> {
        self(source, scope)
    }
}

/// The built-in evaluator: parse with [`ExprParser`], then interpret.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExprEvaluator;

impl Evaluator for ExprEvaluator {
    fn evaluate(&self, source: &str, scope: &Scope<'_>) -> Result<Value, EvalError> {
        let expr = ExprParser::parse(source)?;
        let value = eval::eval(&expr, scope)?;
        tracing::debug!(source, value = ?value, "evaluated expression");
        Ok(value)
    }
}
