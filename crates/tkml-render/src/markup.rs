//! Markup serializer.
//!
//! Writes a [`Tree`] back out as TKML, one child element per line with
//! two-space indentation. Text attributes and text content are escaped;
//! evaluated values are written as `{literal}` using their `Debug` form, so
//! host objects and functions do not survive a second parse.

use std::fmt;

use tkml_parser::entities::{escape, escape_text};
use tkml_parser::{AttrValue, Body, NodeId, Tree};

/// Serialize the whole tree.
pub fn to_markup(tree: &Tree) -> String {
    Markup::new(tree, tree.root()).to_string()
}

/// A displayable view of one subtree.
pub struct Markup<'a> {
    tree: &'a Tree,
    id: NodeId,
}

impl<'a> Markup<'a> {
    pub fn new(tree: &'a Tree, id: NodeId) -> Self {
        Self { tree, id }
    }

    fn write_element(&self, f: &mut fmt::Formatter<'_>, id: NodeId, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        let element = self.tree.get(id);

        write!(f, "{indent}<{}", element.name)?;
        for (name, value) in &element.attrs {
            match value {
                AttrValue::Text(text) => write!(f, " {name}=\"{}\"", escape(text))?,
                AttrValue::Flag => write!(f, " {name}")?,
                AttrValue::Value(value) => write!(f, " {name}={{{value:?}}}")?,
            }
        }

        match element.body() {
            Body::Empty => return f.write_str(" />"),
            Body::Children(children) => {
                f.write_str(">\n")?;
                for &child in children {
                    self.write_element(f, child, depth + 1)?;
                    f.write_str("\n")?;
                }
                f.write_str(&indent)?;
            }
            Body::Expr(value) => write!(f, ">{{{value:?}}}")?,
            Body::Text(text) => write!(f, ">{}", escape_text(text))?,
        }
        write!(f, "</{}>", element.name)
    }
}

impl fmt::Display for Markup<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_element(f, self.id, 0)
    }
}
