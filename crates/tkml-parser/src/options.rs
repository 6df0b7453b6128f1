/// Knobs for [`parse_with`](crate::parse_with).
///
/// The default accepts everything [`parse`](crate::parse) accepts: no depth
/// limit, and text after the root element is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Deepest allowed element nesting; the root is level 1.
    pub max_depth: Option<usize>,
    /// Ignore anything after the root element's closing tag.
    pub allow_trailing: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            allow_trailing: true,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn allow_trailing(mut self, allow: bool) -> Self {
        self.allow_trailing = allow;
        self
    }

    /// Reject trailing content.
    pub fn strict(self) -> Self {
        self.allow_trailing(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builder() {
        let options = ParseOptions::new().max_depth(8).strict();
        assert_eq!(
            options,
            ParseOptions {
                max_depth: Some(8),
                allow_trailing: false,
            }
        );
        assert_eq!(ParseOptions::default().max_depth, None);
        assert!(ParseOptions::default().allow_trailing);
    }
}
