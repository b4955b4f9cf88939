//! Route index — build route trees once, freeze, share read-only.
//!
//! [`RouteIndexBuilder`] collects [`RouteDefinition`]s (by hand or from a
//! [`RouteTableConfig`]) and [`build`](RouteIndexBuilder::build)s them into a
//! [`RouteIndex`]: namespace → resource → [`ResourceSpec`]. Each spec bundles a
//! resource's tree with its level table and setter table and sits behind an
//! `Arc`, so any number of [`ResourceHandler`]s can borrow it concurrently.
//!
//! # Lifecycle
//!
//! ```text
//! RouteTableConfig ──from_config──► RouteIndexBuilder ──build──► RouteIndex
//!                                                                   │
//!                                               handler(ns, name) ◄─┘ (fresh per chain)
//! ```
//!
//! # Example
//!
//! ```
//! use pathwright::{Method, RouteIndex};
//!
//! let index = RouteIndex::builder()
//!     .register_route("myplugin/v1", r"author/(?P<id>\d+)", [Method::Get])
//!     .build()
//!     .unwrap();
//!
//! let mut author = index.handler("myplugin/v1", "author").unwrap();
//! author.set("id", 7).unwrap();
//! assert_eq!(author.render_path().unwrap(), "author/7");
//! ```

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::{
    LevelTable, Method, ResourceHandler, RouteDefinition, RouteError, RouteTableConfig,
    RouteTreeBuilder, RouteTreeNode, SetterTable,
};

// ═══════════════════════════════════════════════════════════════════════════════
// ResourceSpec
// ═══════════════════════════════════════════════════════════════════════════════

/// Everything a handler needs to know about one resource.
///
/// Immutable after [`RouteIndexBuilder::build`].
#[derive(Debug)]
pub struct ResourceSpec {
    namespace: String,
    name: String,
    tree: RouteTreeNode,
    levels: LevelTable,
    setters: SetterTable,
}

impl ResourceSpec {
    fn new(namespace: &str, name: &str, tree: RouteTreeNode) -> Self {
        let levels = LevelTable::from_tree(&tree);
        let setters = SetterTable::from_tree(&tree);
        Self {
            namespace: namespace.to_owned(),
            name: name.to_owned(),
            tree,
            levels,
            setters,
        }
    }

    /// Namespace the resource belongs to.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Resource name (the level-0 component).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The resource's route tree.
    #[must_use]
    pub fn tree(&self) -> &RouteTreeNode {
        &self.tree
    }

    /// Per-level validators.
    #[must_use]
    pub fn levels(&self) -> &LevelTable {
        &self.levels
    }

    /// Named setters.
    #[must_use]
    pub fn setters(&self) -> &SetterTable {
        &self.setters
    }

    /// Setter names in registration order.
    #[must_use]
    pub fn setter_names(&self) -> Vec<&str> {
        self.setters.names().collect()
    }

    /// First schema title found in the tree, if any.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        let mut title = None;
        self.tree.visit(&mut |node| {
            if title.is_none() {
                title = node.title();
            }
        });
        title
    }

    /// Returns `true` if level 0 is a named group rather than the resource name.
    #[must_use]
    pub fn has_dynamic_root(&self) -> bool {
        self.tree.is_dynamic()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RouteIndexBuilder
// ═══════════════════════════════════════════════════════════════════════════════

/// Collects routes; [`build`](Self::build) compiles them into a [`RouteIndex`].
#[derive(Debug, Default)]
pub struct RouteIndexBuilder {
    routes: Vec<RouteDefinition>,
}

impl RouteIndexBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one route.
    #[must_use]
    pub fn route(mut self, definition: RouteDefinition) -> Self {
        self.routes.push(definition);
        self
    }

    /// Add several routes, in order.
    #[must_use]
    pub fn routes(mut self, definitions: impl IntoIterator<Item = RouteDefinition>) -> Self {
        self.routes.extend(definitions);
        self
    }

    /// Add a route given relative to its namespace, e.g. `author/(?P<id>\d+)`
    /// in `myplugin/v1`.
    #[must_use]
    pub fn register_route(
        self,
        namespace: &str,
        route: &str,
        methods: impl IntoIterator<Item = Method>,
    ) -> Self {
        let namespace = namespace.trim_matches('/');
        let route = route.trim_start_matches('/');
        self.route(
            RouteDefinition::new(format!("/{namespace}/{route}"), namespace).with_methods(methods),
        )
    }

    /// Add every route of a route table, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidConfig`] if a route lists an unknown HTTP verb.
    pub fn from_config(config: &RouteTableConfig) -> Result<Self, RouteError> {
        Ok(Self::new().routes(config.definitions()?))
    }

    /// Compile every route and freeze the result.
    ///
    /// # Errors
    ///
    /// The first grammar error encountered, naming the offending route. See
    /// [`RouteTreeBuilder::insert`].
    pub fn build(self) -> Result<RouteIndex, RouteError> {
        let mut trees = RouteTreeBuilder::new();
        let mut skipped = 0usize;
        for definition in &self.routes {
            if !trees.insert(definition)? {
                skipped += 1;
            }
        }

        let namespaces: IndexMap<String, IndexMap<String, Arc<ResourceSpec>>> = trees
            .finish()
            .into_iter()
            .map(|(namespace, resources)| {
                let specs = resources
                    .into_iter()
                    .map(|(name, tree)| {
                        let spec = ResourceSpec::new(&namespace, &name, tree);
                        (name, Arc::new(spec))
                    })
                    .collect();
                (namespace, specs)
            })
            .collect();

        let index = RouteIndex { namespaces };
        debug!(
            routes = self.routes.len(),
            skipped,
            namespaces = index.namespaces.len(),
            resources = index.len(),
            "route index built"
        );
        Ok(index)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RouteIndex
// ═══════════════════════════════════════════════════════════════════════════════

/// Frozen namespace → resource → [`ResourceSpec`] map.
///
/// Cheap to share: wrap in an `Arc` (as [`Client`](crate::Client) does) and
/// hand out handlers from any thread.
#[derive(Debug, Default)]
pub struct RouteIndex {
    namespaces: IndexMap<String, IndexMap<String, Arc<ResourceSpec>>>,
}

impl RouteIndex {
    /// Start building an index.
    #[must_use]
    pub fn builder() -> RouteIndexBuilder {
        RouteIndexBuilder::new()
    }

    /// Build an index straight from a route table.
    ///
    /// # Errors
    ///
    /// Config conversion or route grammar errors.
    pub fn from_config(config: &RouteTableConfig) -> Result<Self, RouteError> {
        RouteIndexBuilder::from_config(config)?.build()
    }

    /// Namespaces, in first-seen order.
    #[must_use]
    pub fn namespaces(&self) -> Vec<&str> {
        self.namespaces.keys().map(String::as_str).collect()
    }

    /// Resources of a namespace, in first-seen order.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::UnknownNamespace`] if the namespace is not registered.
    pub fn resources(&self, namespace: &str) -> Result<Vec<&Arc<ResourceSpec>>, RouteError> {
        Ok(self.namespace(namespace)?.values().collect())
    }

    /// Look up one resource.
    ///
    /// # Errors
    ///
    /// - [`RouteError::UnknownNamespace`] — the namespace is not registered
    /// - [`RouteError::UnknownResource`] — the namespace has no such resource
    pub fn resource(&self, namespace: &str, name: &str) -> Result<&Arc<ResourceSpec>, RouteError> {
        let resources = self.namespace(namespace)?;
        resources.get(name).ok_or_else(|| RouteError::UnknownResource {
            namespace: namespace.to_owned(),
            resource: name.to_owned(),
            available: resources.keys().cloned().collect(),
        })
    }

    /// A fresh handler for one resource.
    ///
    /// # Errors
    ///
    /// Same as [`resource`](Self::resource).
    pub fn handler(&self, namespace: &str, name: &str) -> Result<ResourceHandler, RouteError> {
        Ok(ResourceHandler::new(Arc::clone(self.resource(namespace, name)?)))
    }

    /// Total number of resources across all namespaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.namespaces.values().map(IndexMap::len).sum()
    }

    /// Returns `true` if no resource was built.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn namespace(&self, namespace: &str) -> Result<&IndexMap<String, Arc<ResourceSpec>>, RouteError> {
        let key = namespace.trim_matches('/');
        self.namespaces
            .get(key)
            .ok_or_else(|| RouteError::UnknownNamespace {
                namespace: namespace.to_owned(),
                available: self.namespaces.keys().cloned().collect(),
            })
    }
}
