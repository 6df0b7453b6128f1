//! TKML Parser
//!
//! Parses TKML markup, an XML/JSX-like notation for describing widget trees,
//! into a [`Tree`] of [`Element`]s:
//!
//! ```text
//! <Frame padding="3 3 12 12" sticky="N W E S">
//!     <Entry width={7} textvariable={feet} />
//!     <Label>feet</Label>
//!     <Button command={calculate}>Calculate</Button>
//! </Frame>
//! ```
//!
//! Attribute values are quoted text, bare text, or `{expressions}` evaluated
//! against a two-tier [`Scope`](tkml_expr::Scope). An element holds either
//! child elements, a single expression, or raw text, never a mix.

pub mod entities;
pub mod options;
mod parser;
pub mod scanner;
pub mod tree;

pub use options::ParseOptions;
pub use tree::{AttrValue, Body, ClosingTag, Element, NodeId, Tree};

use parser::MarkupParser;
use tkml_expr::{EvalError, Evaluator, Scope};

/// Markup parse failure.
///
/// Offsets are character positions in the input text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("opening tag at char {offset} left unclosed")]
    UnterminatedOpeningTag { offset: usize },

    #[error("closing tag at char {offset} left unclosed")]
    UnterminatedClosingTag { offset: usize },

    #[error("self-closing tag at char {offset} left unclosed")]
    UnterminatedSelfClosingTag { offset: usize },

    #[error("attribute value at char {offset} left unclosed")]
    UnterminatedAttributeValue { offset: usize },

    #[error("expression at char {offset} left unclosed")]
    UnterminatedExpression { offset: usize },

    #[error("'{name}' tag at char {offset} left unclosed")]
    UnterminatedTag { name: String, offset: usize },

    #[error("illegal '{found}' in self-closing tag at char {offset}")]
    IllegalSelfClosingTag { found: char, offset: usize },

    /// `expected` is `None` when the document itself starts with a closing tag.
    #[error("unexpected closing '{found}' tag at char {offset}")]
    UnexpectedClosingTag {
        expected: Option<String>,
        found: String,
        offset: usize,
    },

    #[error("unexpected '{found}' tag at char {offset}, expected closing '{expected}' tag")]
    UnexpectedTag {
        expected: String,
        found: String,
        offset: usize,
    },

    #[error("unexpected '{found}' at char {offset}")]
    UnexpectedCharacter { found: char, offset: usize },

    #[error("malformed document: expected '<' at char {offset}")]
    MalformedDocument { offset: usize },

    #[error("unexpected content after root element at char {offset}")]
    TrailingContent { offset: usize },

    #[error("elements nested deeper than {limit} levels at char {offset}")]
    NestingTooDeep { limit: usize, offset: usize },

    #[error("expression at char {offset}: {source}")]
    Evaluation { offset: usize, source: EvalError },
}

impl ParseError {
    pub fn offset(&self) -> usize {
        match self {
            ParseError::UnterminatedOpeningTag { offset }
            | ParseError::UnterminatedClosingTag { offset }
            | ParseError::UnterminatedSelfClosingTag { offset }
            | ParseError::UnterminatedAttributeValue { offset }
            | ParseError::UnterminatedExpression { offset }
            | ParseError::UnterminatedTag { offset, .. }
            | ParseError::IllegalSelfClosingTag { offset, .. }
            | ParseError::UnexpectedClosingTag { offset, .. }
            | ParseError::UnexpectedTag { offset, .. }
            | ParseError::UnexpectedCharacter { offset, .. }
            | ParseError::MalformedDocument { offset }
            | ParseError::TrailingContent { offset }
            | ParseError::NestingTooDeep { offset, .. }
            | ParseError::Evaluation { offset, .. } => *offset,
        }
    }
}

/// 1-based line and column of a character offset in `source`.
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for c in source.chars().take(offset) {
        if c == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

/// Parse `text` with default options.
pub fn parse<E>(text: &str, scope: &Scope<'_>, evaluator: &E) -> Result<Tree, ParseError>
where
    E: Evaluator + ?Sized,
{
    parse_with(text, scope, evaluator, &ParseOptions::default())
}

/// Parse `text`, applying `options`.
pub fn parse_with<E>(
    text: &str,
    scope: &Scope<'_>,
    evaluator: &E,
    options: &ParseOptions,
) -> Result<Tree, ParseError>
where
    E: Evaluator + ?Sized,
{
    MarkupParser::new(text, *scope, evaluator, options).parse()
}
