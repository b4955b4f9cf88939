//! Path-part setters, one per tree node, looked up by name.
//!
//! Every node yields a [`PathPartSetter`] registered under each of its names.
//! Dynamic setters write the caller's value at the node's level. Literal
//! setters write their own text and, when the node has exactly one dynamic
//! child, forward an optional value to that child's level in the same call.

use crate::{RouteError, RouteTreeNode};
use indexmap::IndexMap;
use tracing::debug;

/// What a named setter does to a handler's path state.
///
/// ```
/// use pathwright::PathPartSetter;
///
/// let setter = PathPartSetter::Literal {
///     level: 2,
///     literal: "revisions".into(),
///     dynamic_child: Some(3),
/// };
/// let writes = setter.assignments("revisions", Some("52".into())).unwrap();
/// assert_eq!(writes, vec![(2, "revisions".to_owned()), (3, "52".to_owned())]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPartSetter {
    /// Writes the caller's value at `level`.
    Dynamic {
        /// Level the value lands on.
        level: usize,
    },
    /// Writes `literal` at `level`, plus an optional value at `dynamic_child`.
    Literal {
        /// Level of the literal segment.
        level: usize,
        /// The segment text.
        literal: String,
        /// Level of the node's only dynamic child; `None` when it has zero or
        /// several, which disables forwarding.
        dynamic_child: Option<usize>,
    },
}

impl PathPartSetter {
    /// Derive the setter for one node.
    #[must_use]
    pub fn for_node(node: &RouteTreeNode) -> Self {
        if node.is_dynamic() {
            return Self::Dynamic { level: node.level() };
        }

        let mut dynamic = node.dynamic_children();
        let dynamic_child = match (dynamic.next(), dynamic.next()) {
            (Some(only), None) => Some(only.level()),
            (Some(_), Some(_)) => {
                debug!(
                    component = node.component(),
                    level = node.level(),
                    "several dynamic children; value forwarding disabled"
                );
                None
            }
            _ => None,
        };

        Self::Literal {
            level: node.level(),
            literal: node.component().to_owned(),
            dynamic_child,
        }
    }

    /// Level this setter primarily writes.
    #[must_use]
    pub fn level(&self) -> usize {
        match self {
            Self::Dynamic { level } | Self::Literal { level, .. } => *level,
        }
    }

    /// Level → value writes for one call, in ascending level order.
    ///
    /// `name` is only used for error messages.
    ///
    /// # Errors
    ///
    /// - [`RouteError::MissingValue`] — a dynamic setter was called without a value
    /// - [`RouteError::UnexpectedValue`] — a literal setter without a single
    ///   dynamic child was given a value
    pub fn assignments(
        &self,
        name: &str,
        value: Option<String>,
    ) -> Result<Vec<(usize, String)>, RouteError> {
        match (self, value) {
            (Self::Dynamic { level }, Some(value)) => Ok(vec![(*level, value)]),
            (Self::Dynamic { .. }, None) => Err(RouteError::MissingValue {
                setter: name.to_owned(),
            }),
            (Self::Literal { level, literal, .. }, None) => Ok(vec![(*level, literal.clone())]),
            (
                Self::Literal {
                    level,
                    literal,
                    dynamic_child: Some(child),
                },
                Some(value),
            ) => Ok(vec![(*level, literal.clone()), (*child, value)]),
            (
                Self::Literal {
                    dynamic_child: None,
                    ..
                },
                Some(value),
            ) => Err(RouteError::UnexpectedValue {
                setter: name.to_owned(),
                value,
            }),
        }
    }
}

/// Setter name → setter for one resource.
///
/// Built once per resource by walking its tree depth-first in insertion order.
/// When two nodes claim the same name, the first one visited keeps it.
#[derive(Debug, Clone, Default)]
pub struct SetterTable {
    setters: IndexMap<String, PathPartSetter>,
}

impl SetterTable {
    /// Collect the setters of a resource tree.
    ///
    /// A literal root is skipped: handlers preset level 0 with the resource name.
    #[must_use]
    pub fn from_tree(root: &RouteTreeNode) -> Self {
        let mut setters: IndexMap<String, PathPartSetter> = IndexMap::new();
        root.visit(&mut |node| {
            if node.level() == 0 && !node.is_dynamic() {
                return;
            }
            let setter = PathPartSetter::for_node(node);
            for name in node.names() {
                match setters.get(name) {
                    Some(existing) if existing != &setter => {
                        debug!(
                            name = name.as_str(),
                            kept = existing.level(),
                            dropped = setter.level(),
                            "setter name already claimed"
                        );
                    }
                    Some(_) => {}
                    None => {
                        setters.insert(name.clone(), setter.clone());
                    }
                }
            }
        });
        Self { setters }
    }

    /// Look up a setter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PathPartSetter> {
        self.setters.get(name)
    }

    /// Setter names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.setters.keys().map(String::as_str)
    }

    /// Iterate over `(name, setter)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PathPartSetter)> {
        self.setters.iter().map(|(name, setter)| (name.as_str(), setter))
    }

    /// Number of setters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.setters.len()
    }

    /// Returns `true` if the resource has no setters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.setters.is_empty()
    }
}
