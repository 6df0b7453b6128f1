//! Tree model produced by the markup parser.
//!
//! Nodes live in a flat arena and refer to each other by [`NodeId`]. Children
//! are pushed before their parent during the single parse pass, so the root is
//! always the last node in the arena; parent links are non-owning indices.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use tkml_expr::Value;

/// Index of a node inside its [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// An attribute value as written in the markup.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// `name="literal"` or `name=bare`, entity-decoded.
    Text(String),
    /// Bare `name`, meaning `true`.
    Flag,
    /// `name={expr}`, already evaluated.
    Value(Value),
}

impl AttrValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The attribute as an expression value; flags become `true`.
    pub fn to_value(&self) -> Value {
        match self {
            AttrValue::Text(s) => Value::Str(s.clone()),
            AttrValue::Flag => Value::Bool(true),
            AttrValue::Value(v) => v.clone(),
        }
    }
}

impl Serialize for AttrValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AttrValue::Text(s) => serializer.serialize_str(s),
            AttrValue::Flag => serializer.serialize_bool(true),
            AttrValue::Value(v) => v.serialize(serializer),
        }
    }
}

/// What sits between an element's opening and closing tags. Fixed when the
/// element is built.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// `<name ... />`, or an element with nothing between its tags.
    Empty,
    /// One or more child elements, in document order.
    Children(Vec<NodeId>),
    /// A single `{expr}`.
    Expr(Value),
    /// Raw text, entity-decoded.
    Text(String),
}

/// A `</name>` seen while parsing. Never stored in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosingTag {
    pub name: String,
}

/// One parsed tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    /// Source order; a repeated name keeps its first position and its last value.
    pub attrs: IndexMap<String, AttrValue>,
    body: Body,
    parent: Option<NodeId>,
}

impl Element {
    pub fn new(name: impl Into<String>, attrs: IndexMap<String, AttrValue>, body: Body) -> Self {
        Self {
            name: name.into(),
            attrs,
            body,
            parent: None,
        }
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child ids; empty unless the body is [`Body::Children`].
    pub fn children(&self) -> &[NodeId] {
        match &self.body {
            Body::Children(ids) => ids,
            _ => &[],
        }
    }

    /// Expression or text content, as a value.
    pub fn content(&self) -> Option<Value> {
        match &self.body {
            Body::Expr(v) => Some(v.clone()),
            Body::Text(s) => Some(Value::Str(s.clone())),
            _ => None,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name)
    }
}

/// A parsed document.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Element>,
    root: NodeId,
}

impl Tree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_element(&self) -> &Element {
        &self.nodes[self.root.0]
    }

    pub fn get(&self, id: NodeId) -> &Element {
        &self.nodes[id.0]
    }

    /// Mutable access for consumers that annotate nodes after parsing.
    pub fn get_mut(&mut self, id: NodeId) -> &mut Element {
        &mut self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes[id.0].children()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node ids in document order, root first.
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder {
            tree: self,
            stack: vec![self.root],
        }
    }

    fn subtree_eq(&self, a: NodeId, other: &Tree, b: NodeId) -> bool {
        let (x, y) = (self.get(a), other.get(b));
        if x.name != y.name || !x.attrs.iter().eq(y.attrs.iter()) {
            return false;
        }
        match (&x.body, &y.body) {
            (Body::Children(xs), Body::Children(ys)) => {
                xs.len() == ys.len()
                    && xs
                        .iter()
                        .zip(ys)
                        .all(|(&cx, &cy)| self.subtree_eq(cx, other, cy))
            }
            (Body::Children(_), _) | (_, Body::Children(_)) => false,
            (bx, by) => bx == by,
        }
    }
}

/// Structural equality: same shape, names, attribute order and contents,
/// regardless of arena layout.
impl PartialEq for Tree {
    fn eq(&self, other: &Self) -> bool {
        self.subtree_eq(self.root, other, other.root)
    }
}

/// Pre-order iterator over a [`Tree`].
pub struct PreOrder<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl Iterator for PreOrder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack.extend(self.tree.children(id).iter().rev());
        Some(id)
    }
}

/// Serializes the nested form: `{name, attrs, children | content | text}`.
impl Serialize for Tree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        NodeRef {
            tree: self,
            id: self.root,
        }
        .serialize(serializer)
    }
}

struct NodeRef<'a> {
    tree: &'a Tree,
    id: NodeId,
}

impl Serialize for NodeRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let element = self.tree.get(self.id);
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("name", &element.name)?;
        map.serialize_entry("attrs", &element.attrs)?;
        match &element.body {
            Body::Empty => {}
            Body::Children(ids) => map.serialize_entry(
                "children",
                &Children {
                    tree: self.tree,
                    ids,
                },
            )?,
            Body::Expr(value) => map.serialize_entry("content", value)?,
            Body::Text(text) => map.serialize_entry("text", text)?,
        }
        map.end()
    }
}

struct Children<'a> {
    tree: &'a Tree,
    ids: &'a [NodeId],
}

impl Serialize for Children<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.ids.len()))?;
        for &id in self.ids {
            seq.serialize_element(&NodeRef {
                tree: self.tree,
                id,
            })?;
        }
        seq.end()
    }
}

/// Arena under construction. Children are pushed first; pushing a parent
/// links them back to it.
#[derive(Debug, Default)]
pub(crate) struct TreeBuilder {
    nodes: Vec<Element>,
}

impl TreeBuilder {
    pub(crate) fn push(&mut self, element: Element) -> NodeId {
        let id = NodeId(self.nodes.len());
        for &child in element.children() {
            self.nodes[child.0].parent = Some(id);
        }
        self.nodes.push(element);
        id
    }

    pub(crate) fn name(&self, id: NodeId) -> &str {
        &self.nodes[id.0].name
    }

    pub(crate) fn finish(self, root: NodeId) -> Tree {
        Tree {
            nodes: self.nodes,
            root,
        }
    }
}
