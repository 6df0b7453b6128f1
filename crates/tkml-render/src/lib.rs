//! TKML Render
//!
//! Consumers of a parsed [`Tree`](tkml_parser::Tree): the markup serializer and
//! the [`Registry`] that hands each node to a host-supplied constructor.

pub mod markup;
pub mod registry;

pub use markup::{to_markup, Markup};
pub use registry::{BuildContext, Built, Registry};

/// Failure while building values from a tree.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BindError {
    #[error("no factory registered for '{name}'")]
    UnknownTag { name: String },

    #[error("failed to build '{name}': {message}")]
    Factory { name: String, message: String },
}
