//! Tag name → constructor dispatch.
//!
//! A [`Registry`] maps element names to factory functions and builds one value
//! per node, parents before children. It does not look at attributes; the
//! factories decide what they mean.

use std::collections::HashMap;

use tkml_parser::{Element, NodeId, Tree};
use tracing::{debug, trace};

use crate::BindError;

type Factory<T> = Box<dyn Fn(&BuildContext<'_, T>, &Element) -> Result<T, BindError>>;

/// What a factory knows about the node it is building.
pub struct BuildContext<'a, T> {
    pub tree: &'a Tree,
    pub id: NodeId,
    /// The value built for the parent node, `None` at the root.
    pub parent: Option<&'a T>,
    /// Position among the parent's children.
    pub index: usize,
}

/// Values built from a tree, addressable by the tree's node ids.
#[derive(Debug)]
pub struct Built<T> {
    root_id: NodeId,
    root: T,
    nodes: Vec<Option<T>>,
}

impl<T> Built<T> {
    pub fn root(&self) -> &T {
        &self.root
    }

    pub fn into_root(self) -> T {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&T> {
        if id == self.root_id {
            Some(&self.root)
        } else {
            self.nodes.get(id.index()).and_then(Option::as_ref)
        }
    }
}

pub struct Registry<T> {
    factories: HashMap<String, Factory<T>>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the factory for `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&BuildContext<'_, T>, &Element) -> Result<T, BindError> + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Build every node of `tree`, parents first.
    pub fn build(&self, tree: &Tree) -> Result<Built<T>, BindError> {
        let mut nodes: Vec<Option<T>> = (0..tree.len()).map(|_| None).collect();
        let root = self.build_node(tree, tree.root(), None, 0, &mut nodes)?;
        debug!(nodes = tree.len(), "built tree");
        Ok(Built {
            root_id: tree.root(),
            root,
            nodes,
        })
    }

    fn build_node(
        &self,
        tree: &Tree,
        id: NodeId,
        parent: Option<&T>,
        index: usize,
        nodes: &mut Vec<Option<T>>,
    ) -> Result<T, BindError> {
        let element = tree.get(id);
        let factory = self
            .factories
            .get(&element.name)
            .ok_or_else(|| BindError::UnknownTag {
                name: element.name.clone(),
            })?;

        trace!(name = %element.name, index, "building element");
        let ctx = BuildContext {
            tree,
            id,
            parent,
            index,
        };
        let value = factory(&ctx, element)?;

        for (i, &child) in element.children().iter().enumerate() {
            let built = self.build_node(tree, child, Some(&value), i, nodes)?;
            nodes[child.index()] = Some(built);
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tkml_expr::{Env, ExprEvaluator, Scope, Value};
    use tkml_parser::{parse, AttrValue};

    #[derive(Debug, Clone, PartialEq)]
    struct Widget {
        kind: String,
        path: String,
        text: Option<String>,
        row: Option<String>,
    }

    fn widget(ctx: &BuildContext<'_, Widget>, element: &Element) -> Result<Widget, BindError> {
        let parent = ctx.parent.map_or("", |p| p.path.as_str());
        Ok(Widget {
            kind: element.name.clone(),
            path: format!("{parent}.{}{}", element.name.to_lowercase(), ctx.index),
            text: element.content().and_then(|v| v.as_str().map(String::from)),
            row: element.attr("row").and_then(AttrValue::as_text).map(String::from),
        })
    }

    fn registry() -> Registry<Widget> {
        let mut registry = Registry::new();
        registry
            .register("Frame", widget)
            .register("Label", widget)
            .register("Entry", |ctx: &BuildContext<'_, Widget>, element: &Element| {
                match element.attr("width").map(AttrValue::to_value) {
                    Some(Value::Int(_)) | None => widget(ctx, element),
                    Some(_) => Err(BindError::Factory {
                        name: element.name.clone(),
                        message: "width must be an integer".into(),
                    }),
                }
            });
        registry
    }

    fn tree(source: &str) -> Tree {
        let outer = Env::new().with("unit", "meters");
        let inner = Env::new();
        parse(source, &Scope::new(&outer, &inner), &ExprEvaluator).unwrap()
    }

    #[test]
    fn test_builds_parents_first() {
        let tree = tree("<Frame><Entry width={7}/><Frame><Label>{unit}</Label></Frame></Frame>");
        let built = registry().build(&tree).unwrap();

        let paths: Vec<&str> = tree
            .iter()
            .map(|id| built.get(id).unwrap().path.as_str())
            .collect();
        assert_eq!(
            paths,
            vec![".frame0", ".frame0.entry0", ".frame0.frame1", ".frame0.frame1.label0"]
        );

        let label = tree.iter().last().unwrap();
        assert_eq!(built.get(label).unwrap().text.as_deref(), Some("meters"));
        assert_eq!(built.root().kind, "Frame");
    }

    #[test]
    fn test_flag_width_rejected() {
        let err = registry()
            .build(&tree("<Frame><Entry width /></Frame>"))
            .unwrap_err();
        assert_eq!(
            err,
            BindError::Factory {
                name: "Entry".into(),
                message: "width must be an integer".into(),
            }
        );
    }

    #[test]
    fn test_annotations_reach_factories() {
        let mut tree = tree("<Frame><Label>a</Label><Label>b</Label></Frame>");
        let labels = tree.children(tree.root()).to_vec();
        for (row, id) in labels.iter().enumerate() {
            tree.get_mut(*id)
                .attrs
                .insert("row".into(), AttrValue::Text(row.to_string()));
        }

        let built = registry().build(&tree).unwrap();
        let rows: Vec<Option<&str>> = labels
            .iter()
            .map(|&id| built.get(id).unwrap().row.as_deref())
            .collect();
        assert_eq!(rows, vec![Some("0"), Some("1")]);
        assert_eq!(built.root().row, None);
    }

    #[test]
    fn test_unknown_tag() {
        let err = registry().build(&tree("<Frame><Canvas/></Frame>")).unwrap_err();
        assert_eq!(
            err,
            BindError::UnknownTag {
                name: "Canvas".into()
            }
        );
        assert_eq!(err.to_string(), "no factory registered for 'Canvas'");
    }

    #[test]
    fn test_factory_error() {
        let err = registry()
            .build(&tree(r#"<Frame><Entry width="wide"/></Frame>"#))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to build 'Entry': width must be an integer"
        );
    }

    #[test]
    fn test_contains_and_replace() {
        let mut registry = registry();
        assert!(registry.contains("Label"));
        assert!(!registry.contains("Button"));

        registry.register("Label", |_: &BuildContext<'_, Widget>, _: &Element| {
            Err(BindError::Factory {
                name: "Label".into(),
                message: "disabled".into(),
            })
        });
        assert!(registry.build(&tree("<Label>x</Label>")).is_err());
    }
}
