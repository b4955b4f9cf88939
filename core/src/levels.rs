//! Level table — flattened per-depth validators for one resource.
//!
//! The builder collects a descriptor for every tree node at each depth. Render
//! time validation consults the table rather than walking the tree: a value at
//! level `n` is valid if *any* node at depth `n` accepts it. The table is built
//! once per resource and shared read-only by every handler.

use crate::{
    trace::{LevelStatus, LevelStep, RenderTrace},
    Method, RouteError, RouteTreeNode, SegmentMatcher,
};
use std::collections::BTreeMap;

/// One candidate validator at a level.
#[derive(Debug, Clone)]
pub struct LevelDescriptor {
    component: String,
    names: Vec<String>,
    matcher: SegmentMatcher,
    methods: Option<Vec<Method>>,
}

impl LevelDescriptor {
    fn from_node(node: &RouteTreeNode) -> Self {
        Self {
            component: node.matcher().source().to_owned(),
            names: node.names().to_vec(),
            matcher: node.matcher().clone(),
            methods: node.methods().map(<[Method]>::to_vec),
        }
    }

    /// Literal text or inner pattern accepted by this descriptor.
    #[must_use]
    pub fn component(&self) -> &str {
        &self.component
    }

    /// Setter names of the node this descriptor came from.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Methods of the route(s) ending at this node, or `None` for an
    /// interior-only node.
    #[must_use]
    pub fn methods(&self) -> Option<&[Method]> {
        self.methods.as_deref()
    }

    /// Validate a candidate value.
    #[must_use]
    pub fn validate(&self, value: &str) -> bool {
        self.matcher.matches(value)
    }
}

/// Level index → candidate validators.
#[derive(Debug, Clone, Default)]
pub struct LevelTable {
    levels: Vec<Vec<LevelDescriptor>>,
}

impl LevelTable {
    /// Flatten a resource tree.
    #[must_use]
    pub fn from_tree(root: &RouteTreeNode) -> Self {
        let mut levels: Vec<Vec<LevelDescriptor>> = Vec::new();
        root.visit(&mut |node| {
            if levels.len() <= node.level() {
                levels.resize_with(node.level() + 1, Vec::new);
            }
            levels[node.level()].push(LevelDescriptor::from_node(node));
        });
        Self { levels }
    }

    /// Number of levels (deepest level + 1).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Candidate validators at `level` (empty past the deepest level).
    #[must_use]
    pub fn descriptors(&self, level: usize) -> &[LevelDescriptor] {
        self.levels.get(level).map_or(&[][..], Vec::as_slice)
    }

    /// Check one value against its level.
    ///
    /// # Errors
    ///
    /// - [`RouteError::UnknownLevel`] — no route reaches `level`
    /// - [`RouteError::InvalidComponent`] — no descriptor at `level` accepts `value`
    pub fn check(&self, level: usize, value: &str) -> Result<(), RouteError> {
        let descriptors = self.descriptors(level);
        if descriptors.is_empty() {
            return Err(RouteError::UnknownLevel {
                level,
                deepest: self.depth().saturating_sub(1),
            });
        }
        if descriptors.iter().any(|d| d.validate(value)) {
            return Ok(());
        }
        Err(RouteError::InvalidComponent {
            level,
            value: value.to_owned(),
            expected: self.components(level),
        })
    }

    /// Human-readable stand-in for a missing level, e.g. `{id|parent}`.
    #[must_use]
    pub fn placeholder(&self, level: usize) -> String {
        let mut names: Vec<&str> = Vec::new();
        for name in self.descriptors(level).iter().flat_map(|d| d.names()) {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
        if names.is_empty() {
            return "{?}".to_owned();
        }
        format!("{{{}}}", names.join("|"))
    }

    /// Validate path state and join it into a path.
    ///
    /// Levels `0..=max` are considered, where `max` is the highest level
    /// holding a value. Any gap yields [`RouteError::IncompletePath`], rendered
    /// with a placeholder at every gap, whatever else is wrong with the path.
    /// A complete path then fails with [`RouteError::UnknownLevel`] if it runs
    /// deeper than any route, or with [`RouteError::InvalidComponent`] for the
    /// lowest value no descriptor accepts.
    ///
    /// # Errors
    ///
    /// See above.
    pub fn render(&self, path: &BTreeMap<usize, String>) -> Result<String, RouteError> {
        let max = path.keys().next_back().copied().unwrap_or(0);

        let missing: Vec<usize> = (0..=max).filter(|level| !path.contains_key(level)).collect();
        if !missing.is_empty() {
            let parts: Vec<String> = (0..=max)
                .map(|level| match path.get(&level) {
                    Some(value) => value.clone(),
                    None => self.placeholder(level),
                })
                .collect();
            return Err(RouteError::IncompletePath {
                path: parts.join("/"),
                missing,
            });
        }

        if max >= self.depth() {
            return Err(RouteError::UnknownLevel {
                level: max,
                deepest: self.depth().saturating_sub(1),
            });
        }
        for (level, value) in path {
            self.check(*level, value)?;
        }
        Ok(path.values().map(String::as_str).collect::<Vec<_>>().join("/"))
    }

    /// Like [`render`](Self::render), but reports every level.
    ///
    /// # INV: `trace(path).result == render(path)`
    #[must_use]
    pub fn trace(&self, path: &BTreeMap<usize, String>) -> RenderTrace {
        let max = path.keys().next_back().copied().unwrap_or(0);
        let steps = (0..=max)
            .map(|level| {
                let value = path.get(&level).cloned();
                let status = match &value {
                    None => LevelStatus::Missing,
                    Some(v) if self.check(level, v).is_ok() => LevelStatus::Valid,
                    Some(_) => LevelStatus::Invalid,
                };
                LevelStep {
                    level,
                    value,
                    candidates: self.components(level),
                    status,
                }
            })
            .collect();

        RenderTrace {
            result: self.render(path),
            steps,
        }
    }

    fn components(&self, level: usize) -> Vec<String> {
        let mut components: Vec<String> = Vec::new();
        for descriptor in self.descriptors(level) {
            if !components.iter().any(|c| c == descriptor.component()) {
                components.push(descriptor.component().to_owned());
            }
        }
        components
    }
}
