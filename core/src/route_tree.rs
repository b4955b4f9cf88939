//! Route tree — folds route strings into one tree of segments per resource.
//!
//! Each route string is stripped of its `/{namespace}/` prefix and split into
//! components. The first component names the resource and becomes the level-0
//! root; the rest become levels `1..N`. Children are keyed by pattern identity
//! ([`NodeKey`]), so routes that differ only in capture-group names share nodes.

use crate::{
    named_group::{opens_group, split_path, NamedGroup},
    Method, RouteConfig, RouteError, SegmentMatcher, MAX_LEVELS, MAX_PATTERN_LENGTH,
};
use indexmap::map::Entry;
use indexmap::IndexMap;
use tracing::{debug, trace, warn};

// ═══════════════════════════════════════════════════════════════════════════════
// RouteDefinition
// ═══════════════════════════════════════════════════════════════════════════════

/// One physical API route.
///
/// ```
/// use pathwright::{Method, RouteDefinition};
///
/// let route = RouteDefinition::new(r"/wp/v2/posts/(?P<id>[\d]+)", "wp/v2")
///     .with_methods([Method::Get, Method::Post, Method::Get])
///     .with_title("post");
/// assert_eq!(route.methods, vec![Method::Get, Method::Post]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDefinition {
    /// The full route string, e.g. `/wp/v2/posts/(?P<id>[\d]+)`.
    pub route: String,
    /// The namespace the route belongs to, e.g. `wp/v2`.
    pub namespace: String,
    /// Supported methods, deduplicated in first-seen order.
    pub methods: Vec<Method>,
    /// Display title from the route's schema.
    pub title: Option<String>,
}

impl RouteDefinition {
    /// Create a route with no methods and no title.
    pub fn new(route: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            namespace: namespace.into(),
            methods: Vec::new(),
            title: None,
        }
    }

    /// Add supported methods (duplicates are ignored).
    #[must_use]
    pub fn with_methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        for method in methods {
            if !self.methods.contains(&method) {
                self.methods.push(method);
            }
        }
        self
    }

    /// Set the schema display title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Convert one entry of a [`RouteTableConfig`](crate::RouteTableConfig).
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidConfig`] if a method name is not an HTTP verb.
    pub fn from_config(route: &str, config: &RouteConfig) -> Result<Self, RouteError> {
        let methods = config
            .methods
            .iter()
            .map(|m| {
                m.parse::<Method>().map_err(|e| RouteError::InvalidConfig {
                    reason: format!("route \"{route}\": {e}"),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut definition = Self::new(route, config.namespace.as_str()).with_methods(methods);
        definition.title = config.schema.as_ref().and_then(|s| s.title.clone());
        Ok(definition)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RouteTreeNode
// ═══════════════════════════════════════════════════════════════════════════════

/// Identity of a child node within its parent.
///
/// Literal segments are keyed by their text, dynamic segments by their inner
/// pattern. A literal `foo` and a pattern `foo` are distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKey {
    /// A literal segment's text.
    Literal(String),
    /// A named group's inner pattern.
    Pattern(String),
}

/// One segment position in a resource's route tree.
///
/// A node *terminates* a route when some route string ends at it; only
/// terminating nodes carry [`methods`](Self::methods). A node may terminate one
/// route and have children from longer routes at the same time.
#[derive(Debug, Clone)]
pub struct RouteTreeNode {
    level: usize,
    component: String,
    matcher: SegmentMatcher,
    names: Vec<String>,
    children: IndexMap<NodeKey, RouteTreeNode>,
    methods: Option<Vec<Method>>,
    title: Option<String>,
}

impl RouteTreeNode {
    fn new(level: usize, component: &str, matcher: SegmentMatcher) -> Self {
        Self {
            level,
            component: component.to_owned(),
            matcher,
            names: Vec::new(),
            children: IndexMap::new(),
            methods: None,
            title: None,
        }
    }

    /// Depth within the resource (0 = resource root).
    #[must_use]
    pub fn level(&self) -> usize {
        self.level
    }

    /// The segment text that created this node, as written in the route table.
    #[must_use]
    pub fn component(&self) -> &str {
        &self.component
    }

    /// Returns `true` if this node comes from a named group.
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        self.matcher.is_dynamic()
    }

    /// Every setter name that addresses this node, in first-seen order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The validator for values at this node.
    #[must_use]
    pub fn matcher(&self) -> &SegmentMatcher {
        &self.matcher
    }

    /// Validate a candidate value for this node.
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        self.matcher.matches(value)
    }

    /// Child nodes in insertion order.
    pub fn children(&self) -> impl Iterator<Item = &RouteTreeNode> {
        self.children.values()
    }

    /// Look up a child by key.
    #[must_use]
    pub fn child(&self, key: &NodeKey) -> Option<&RouteTreeNode> {
        self.children.get(key)
    }

    /// Children that come from named groups.
    pub fn dynamic_children(&self) -> impl Iterator<Item = &RouteTreeNode> {
        self.children().filter(|child| child.is_dynamic())
    }

    /// Returns `true` if no route continues past this node.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Methods of the route(s) terminating here, or `None` if no route does.
    #[must_use]
    pub fn methods(&self) -> Option<&[Method]> {
        self.methods.as_deref()
    }

    /// Schema title of the route(s) terminating here.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Visit this node and all descendants depth-first, in insertion order.
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a RouteTreeNode)) {
        f(self);
        for child in self.children.values() {
            child.visit(f);
        }
    }

    /// Nodes reached by matching `values` level by level, starting at this node.
    ///
    /// Every branch whose validators accept the values is followed, so an
    /// ambiguous path can resolve to several nodes.
    #[must_use]
    pub fn resolve(&self, values: &[&str]) -> Vec<&RouteTreeNode> {
        let mut found = Vec::new();
        self.collect_resolved(values, &mut found);
        found
    }

    fn collect_resolved<'a>(&'a self, values: &[&str], found: &mut Vec<&'a RouteTreeNode>) {
        let Some((first, rest)) = values.split_first() else {
            return;
        };
        if !self.matcher.matches(first) {
            return;
        }
        if rest.is_empty() {
            found.push(self);
            return;
        }
        for child in self.children.values() {
            child.collect_resolved(rest, found);
        }
    }

    fn add_name(&mut self, name: &str) {
        if !self.names.iter().any(|n| n == name) {
            self.names.push(name.to_owned());
        }
    }

    /// Record that a route ends at this node.
    ///
    /// Methods are unioned in first-seen order; the first title wins.
    fn terminate(&mut self, route: &str, methods: &[Method], title: Option<&str>) {
        match &mut self.methods {
            Some(existing) => {
                debug!(route, level = self.level, "route ends on an existing endpoint; merging methods");
                for method in methods {
                    if !existing.contains(method) {
                        existing.push(*method);
                    }
                }
            }
            None => {
                if !self.children.is_empty() {
                    debug!(route, level = self.level, "endpoint also has child routes");
                }
                self.methods = Some(methods.to_vec());
            }
        }
        if self.title.is_none() {
            self.title = title.map(str::to_owned);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Segment classification
// ═══════════════════════════════════════════════════════════════════════════════

enum Segment<'a> {
    Literal(&'a str),
    Dynamic(NamedGroup<'a>),
}

impl<'a> Segment<'a> {
    fn classify(route: &str, component: &'a str) -> Result<Self, RouteError> {
        match NamedGroup::find(component) {
            Some(group) => Ok(Self::Dynamic(group)),
            None if opens_group(component) => Err(RouteError::InvalidGroup {
                route: route.to_owned(),
                segment: component.to_owned(),
            }),
            None => Ok(Self::Literal(component)),
        }
    }

    fn key(&self) -> NodeKey {
        match self {
            Self::Literal(text) => NodeKey::Literal((*text).to_owned()),
            Self::Dynamic(group) => NodeKey::Pattern(group.pattern.to_owned()),
        }
    }

    fn name(&self) -> &'a str {
        match self {
            Self::Literal(text) => text,
            Self::Dynamic(group) => group.name,
        }
    }

    fn matcher(&self, route: &str) -> Result<SegmentMatcher, RouteError> {
        let pattern = match self {
            Self::Literal(text) => return Ok(SegmentMatcher::literal(*text)),
            Self::Dynamic(group) => group.pattern,
        };
        if pattern.len() > MAX_PATTERN_LENGTH {
            return Err(RouteError::PatternTooLong {
                route: route.to_owned(),
                len: pattern.len(),
                max: MAX_PATTERN_LENGTH,
            });
        }
        SegmentMatcher::pattern(pattern).map_err(|e| RouteError::InvalidPattern {
            route: route.to_owned(),
            pattern: pattern.to_owned(),
            reason: e.to_string(),
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RouteTreeBuilder
// ═══════════════════════════════════════════════════════════════════════════════

/// Per-namespace, per-resource route trees, in first-seen order.
pub type ResourceTrees = IndexMap<String, IndexMap<String, RouteTreeNode>>;

/// Accumulates route definitions into per-resource trees.
///
/// ```
/// use pathwright::{RouteDefinition, RouteTreeBuilder};
///
/// let mut builder = RouteTreeBuilder::new();
/// builder.insert(&RouteDefinition::new(r"/wp/v2/posts/(?P<id>[\d]+)", "wp/v2")).unwrap();
/// builder.insert(&RouteDefinition::new(r"/wp/v2/posts/(?P<parent>[\d]+)/revisions", "wp/v2")).unwrap();
///
/// let trees = builder.finish();
/// let posts = &trees["wp/v2"]["posts"];
/// let item = posts.children().next().unwrap();
/// assert_eq!(item.names(), ["id", "parent"]);
/// ```
#[derive(Debug, Default)]
pub struct RouteTreeBuilder {
    namespaces: ResourceTrees,
}

impl RouteTreeBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one route into the trees.
    ///
    /// Returns `Ok(false)` if the route carries no resource structure and was
    /// skipped: no namespace, the namespace index route itself, or a route
    /// outside its declared namespace.
    ///
    /// # Errors
    ///
    /// - [`RouteError::InvalidGroup`] — a segment opens a named group that does not parse
    /// - [`RouteError::InvalidPattern`] — a group's pattern does not compile
    /// - [`RouteError::PatternTooLong`] — a group's pattern exceeds [`MAX_PATTERN_LENGTH`]
    /// - [`RouteError::DepthExceeded`] — the route has more than [`MAX_LEVELS`] levels
    pub fn insert(&mut self, definition: &RouteDefinition) -> Result<bool, RouteError> {
        let route = definition.route.as_str();
        let namespace = definition.namespace.trim_matches('/');

        if namespace.is_empty() {
            trace!(route, "route has no namespace; skipped");
            return Ok(false);
        }
        if route.trim_end_matches('/') == format!("/{namespace}") {
            trace!(route, "namespace index route; skipped");
            return Ok(false);
        }
        let Some(rest) = route.strip_prefix(&format!("/{namespace}/")) else {
            warn!(route, namespace, "route does not start with its namespace; skipped");
            return Ok(false);
        };

        let components = split_path(rest);
        let Some((resource, levels)) = components.split_first() else {
            return Ok(false);
        };
        if components.len() > MAX_LEVELS {
            return Err(RouteError::DepthExceeded {
                route: route.to_owned(),
                depth: components.len(),
                max: MAX_LEVELS,
            });
        }

        // classify and compile everything before touching the tree, so a
        // failing route leaves no partial branch behind
        let root_segment = Segment::classify(route, resource)?;
        let segments = levels
            .iter()
            .map(|component| Segment::classify(route, component))
            .collect::<Result<Vec<_>, _>>()?;
        let mut pending = self
            .pending_matchers(namespace, resource, &root_segment, &segments, route)?
            .into_iter();

        let resources = self.namespaces.entry(namespace.to_owned()).or_default();
        let root_matcher = pending.next().flatten();
        let mut node = match resources.entry((*resource).to_owned()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let matcher = match root_matcher {
                    Some(matcher) => matcher,
                    None => root_segment.matcher(route)?,
                };
                entry.insert(RouteTreeNode::new(0, resource, matcher))
            }
        };
        node.add_name(root_segment.name());

        for (index, (component, segment)) in levels.iter().zip(&segments).enumerate() {
            trace!(route, level = index + 1, component, "segment");
            let new_matcher = pending.next().flatten();
            node = match node.children.entry(segment.key()) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    let matcher = match new_matcher {
                        Some(matcher) => matcher,
                        None => segment.matcher(route)?,
                    };
                    entry.insert(RouteTreeNode::new(index + 1, component, matcher))
                }
            };
            node.add_name(segment.name());
        }

        node.terminate(route, &definition.methods, definition.title.as_deref());
        Ok(true)
    }

    /// Compile a matcher for every segment that has no node yet.
    ///
    /// Returns one entry per segment, root first; `None` where the node exists.
    fn pending_matchers(
        &self,
        namespace: &str,
        resource: &str,
        root: &Segment<'_>,
        segments: &[Segment<'_>],
        route: &str,
    ) -> Result<Vec<Option<SegmentMatcher>>, RouteError> {
        let mut node = self
            .namespaces
            .get(namespace)
            .and_then(|resources| resources.get(resource));
        let mut matchers = Vec::with_capacity(segments.len() + 1);
        matchers.push(match node {
            Some(_) => None,
            None => Some(root.matcher(route)?),
        });
        for segment in segments {
            node = node.and_then(|parent| parent.children.get(&segment.key()));
            matchers.push(match node {
                Some(_) => None,
                None => Some(segment.matcher(route)?),
            });
        }
        Ok(matchers)
    }

    /// Finish building and return the trees.
    #[must_use]
    pub fn finish(self) -> ResourceTrees {
        self.namespaces
    }
}
