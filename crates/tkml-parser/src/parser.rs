//! Recursive-descent markup parser.
//!
//! Parses a single root element into a [`Tree`]. Each element picks exactly one
//! content mode from the first non-whitespace character after its opening tag:
//! `<` for child elements, `{` for a single expression, anything else for raw
//! text.

use indexmap::IndexMap;
use tkml_expr::{Evaluator, Scope, Value};
use tracing::{debug, trace};

use crate::entities;
use crate::options::ParseOptions;
use crate::scanner::{expression_end, find_char, skip_while, skip_ws};
use crate::tree::{AttrValue, Body, ClosingTag, Element, NodeId, Tree, TreeBuilder};
use crate::ParseError;

/// Result of parsing from just past a `<`.
#[derive(Debug)]
enum Parsed {
    Element(NodeId),
    Closing(ClosingTag),
}

/// Markup parser over one document.
pub struct MarkupParser<'a, E: ?Sized> {
    chars: Vec<char>,
    scope: Scope<'a>,
    evaluator: &'a E,
    options: &'a ParseOptions,
    tree: TreeBuilder,
    depth: usize,
}

impl<'a, E: Evaluator + ?Sized> MarkupParser<'a, E> {
    /// Create a parser for `source`. Trailing whitespace is dropped; leading
    /// whitespace is kept so that offsets index into `source`.
    pub fn new(
        source: &str,
        scope: Scope<'a>,
        evaluator: &'a E,
        options: &'a ParseOptions,
    ) -> Self {
        let mut chars: Vec<char> = source.chars().collect();
        let len = chars
            .iter()
            .rposition(|c| !c.is_whitespace())
            .map_or(0, |i| i + 1);
        chars.truncate(len);

        Self {
            chars,
            scope,
            evaluator,
            options,
            tree: TreeBuilder::default(),
            depth: 0,
        }
    }

    /// Parse the whole document.
    pub fn parse(mut self) -> Result<Tree, ParseError> {
        let start = skip_ws(&self.chars, 0);
        if self.peek_at(start) != Some('<') {
            return Err(ParseError::MalformedDocument { offset: start });
        }

        let (end, root) = match self.parse_element(start + 1)? {
            (end, Parsed::Element(id)) => (end, id),
            (_, Parsed::Closing(closing)) => {
                return Err(ParseError::UnexpectedClosingTag {
                    expected: None,
                    found: closing.name,
                    offset: start,
                })
            }
        };

        let rest = skip_ws(&self.chars, end);
        if rest < self.chars.len() {
            if !self.options.allow_trailing {
                return Err(ParseError::TrailingContent { offset: rest });
            }
            trace!(offset = rest, "ignoring content after root element");
        }

        let tree = self.tree.finish(root);
        debug!(nodes = tree.len(), "parsed markup");
        Ok(tree)
    }

    // =========================================================================
    // Elements
    // =========================================================================

    /// Parse a tag starting just past its `<`. Returns the position after the
    /// element (or closing tag) and what was found.
    fn parse_element(&mut self, start: usize) -> Result<(usize, Parsed), ParseError> {
        let tag = start - 1;

        if self.peek_at(start) == Some('/') {
            let end = find_char(&self.chars, start + 1, '>')
                .ok_or(ParseError::UnterminatedClosingTag { offset: tag })?;
            let name = self.slice(start + 1, end);
            trace!(name = %name, offset = tag, "closing tag");
            return Ok((end + 1, Parsed::Closing(ClosingTag { name })));
        }

        if let Some(limit) = self.options.max_depth {
            if self.depth >= limit {
                return Err(ParseError::NestingTooDeep { limit, offset: tag });
            }
        }
        self.depth += 1;
        let result = self.parse_opening(start, tag);
        self.depth -= 1;
        result
    }

    fn parse_opening(&mut self, start: usize, tag: usize) -> Result<(usize, Parsed), ParseError> {
        let len = self.chars.len();
        let mut end = skip_while(&self.chars, start, |c| {
            c != '/' && c != '>' && !c.is_whitespace()
        });
        if end >= len {
            return Err(ParseError::UnterminatedOpeningTag { offset: tag });
        }
        let name = self.slice(start, end);
        trace!(name = %name, offset = tag, depth = self.depth, "opening tag");

        let mut attrs = IndexMap::new();
        end = skip_ws(&self.chars, end);
        while end < len && self.chars[end] != '/' && self.chars[end] != '>' {
            let (next, attr, value) = self.parse_attribute(end, tag)?;
            if !attr.is_empty() {
                attrs.insert(attr, value);
            }
            end = skip_ws(&self.chars, next);
        }
        if end >= len {
            return Err(ParseError::UnterminatedOpeningTag { offset: tag });
        }

        if self.chars[end] == '/' {
            end = skip_ws(&self.chars, end + 1);
            return match self.peek_at(end) {
                Some('>') => {
                    let id = self.tree.push(Element::new(name, attrs, Body::Empty));
                    Ok((end + 1, Parsed::Element(id)))
                }
                Some(found) => Err(ParseError::IllegalSelfClosingTag { found, offset: end }),
                None => Err(ParseError::UnterminatedSelfClosingTag { offset: tag }),
            };
        }

        end = skip_ws(&self.chars, end + 1);
        let (end, body) = match self.peek_at(end) {
            None => return Err(ParseError::UnterminatedOpeningTag { offset: tag }),
            Some('<') => {
                trace!(name = %name, "children content");
                self.parse_children(end, &name, tag)?
            }
            Some('{') => {
                trace!(name = %name, "expression content");
                let (value, next) = self.parse_expression(end + 1)?;
                (self.expect_closing(next, &name, tag)?, Body::Expr(value))
            }
            Some(_) => {
                trace!(name = %name, "text content");
                let lt = find_char(&self.chars, end, '<').ok_or_else(|| {
                    ParseError::UnterminatedTag {
                        name: name.clone(),
                        offset: tag,
                    }
                })?;
                let text = entities::decode(&self.slice(end, lt));
                (self.expect_closing(lt, &name, tag)?, Body::Text(text))
            }
        };

        let id = self.tree.push(Element::new(name, attrs, body));
        Ok((end, Parsed::Element(id)))
    }

    /// Child elements up to the matching closing tag. `end` is at a `<`.
    fn parse_children(
        &mut self,
        mut end: usize,
        name: &str,
        tag: usize,
    ) -> Result<(usize, Body), ParseError> {
        let mut children = Vec::new();
        loop {
            match self.parse_element(end + 1)? {
                (next, Parsed::Closing(closing)) if closing.name == name => {
                    let body = if children.is_empty() {
                        Body::Empty
                    } else {
                        Body::Children(children)
                    };
                    return Ok((next, body));
                }
                (_, Parsed::Closing(closing)) => {
                    return Err(ParseError::UnexpectedClosingTag {
                        expected: Some(name.to_string()),
                        found: closing.name,
                        offset: end,
                    })
                }
                (next, Parsed::Element(id)) => {
                    children.push(id);
                    end = skip_ws(&self.chars, next);
                }
            }

            match self.peek_at(end) {
                Some('<') => {}
                Some(found) => return Err(ParseError::UnexpectedCharacter { found, offset: end }),
                None => {
                    return Err(ParseError::UnterminatedTag {
                        name: name.to_string(),
                        offset: tag,
                    })
                }
            }
        }
    }

    /// After expression or text content: the next tag must close `name`.
    fn expect_closing(&mut self, pos: usize, name: &str, tag: usize) -> Result<usize, ParseError> {
        let at = skip_ws(&self.chars, pos);
        if self.peek_at(at) != Some('<') {
            return Err(ParseError::UnterminatedTag {
                name: name.to_string(),
                offset: tag,
            });
        }

        let found = match self.parse_element(at + 1)? {
            (next, Parsed::Closing(closing)) if closing.name == name => return Ok(next),
            (_, Parsed::Closing(closing)) => format!("/{}", closing.name),
            (_, Parsed::Element(id)) => self.tree.name(id).to_string(),
        };
        Err(ParseError::UnexpectedTag {
            expected: name.to_string(),
            found,
            offset: at,
        })
    }

    // =========================================================================
    // Attributes and expressions
    // =========================================================================

    /// One `name` or `name=value` pair starting at `start`.
    fn parse_attribute(
        &mut self,
        start: usize,
        tag: usize,
    ) -> Result<(usize, String, AttrValue), ParseError> {
        let end = skip_while(&self.chars, start, |c| {
            c != '>' && c != '=' && !c.is_whitespace()
        });
        if end >= self.chars.len() {
            return Err(ParseError::UnterminatedOpeningTag { offset: tag });
        }
        let name = self.slice(start, end);
        if self.chars[end] != '=' {
            return Ok((end, name, AttrValue::Flag));
        }

        let value_start = end + 1;
        match self.peek_at(value_start) {
            None => Err(ParseError::UnterminatedAttributeValue { offset: value_start }),
            Some('"') => {
                let close = find_char(&self.chars, value_start + 1, '"').ok_or(
                    ParseError::UnterminatedAttributeValue {
                        offset: value_start,
                    },
                )?;
                let text = entities::decode(&self.slice(value_start + 1, close));
                Ok((close + 1, name, AttrValue::Text(text)))
            }
            Some('{') => {
                let (value, next) = self.parse_expression(value_start + 1)?;
                Ok((next, name, AttrValue::Value(value)))
            }
            Some(_) => {
                let end = skip_while(&self.chars, value_start, |c| {
                    c != '>' && !c.is_whitespace()
                });
                let text = entities::decode(&self.slice(value_start, end));
                Ok((end, name, AttrValue::Text(text)))
            }
        }
    }

    /// Evaluate the expression starting just past a `{`. Returns the value and
    /// the position after the closing `}`.
    fn parse_expression(&mut self, start: usize) -> Result<(Value, usize), ParseError> {
        let brace = start - 1;
        let end = expression_end(&self.chars, start)
            .ok_or(ParseError::UnterminatedExpression { offset: brace })?;
        let source = self.slice(start, end);
        let value = self
            .evaluator
            .evaluate(&source, &self.scope)
            .map_err(|source| ParseError::Evaluation {
                offset: brace,
                source,
            })?;
        Ok((value, end + 1))
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn peek_at(&self, pos: usize) -> Option<char> {
        self.chars.get(pos).copied()
    }

    fn slice(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().collect()
    }
}
