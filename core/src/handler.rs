//! ResourceHandler — per-chain path state for one resource.
//!
//! A handler starts with level 0 set to the resource name (unless the resource
//! root is a named group), accumulates values through named setters, and
//! renders them into a path once every level up to the deepest one set is
//! filled and valid.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::Arc;

use tracing::trace;

use crate::{Method, PreparedRequest, RenderTrace, ResourceSpec, RouteError, Transport};

/// Chainable path builder for one resource.
///
/// Handlers are cheap: they hold an `Arc` to the frozen [`ResourceSpec`] plus
/// their own path state. Get a fresh one per request from
/// [`RouteIndex::handler`](crate::RouteIndex::handler) or
/// [`Client::resource`](crate::Client::resource).
///
/// # States
///
/// ```text
/// Empty ──set/select──► Partial ──render_path──► Ok(path)
///                          │                 └─► Err(IncompletePath | InvalidComponent | UnknownLevel)
///                          └─set same level──► Err(LevelAlreadySet)
/// ```
///
/// # INV: levels never overwrite
///
/// Once a level holds a value, any write to it fails with
/// [`RouteError::LevelAlreadySet`]. A setter that writes two levels checks both
/// before writing either.
///
/// # Example
///
/// ```ignore
/// let mut posts = index.handler("wp/v2", "posts")?;
/// posts.set("id", 4)?.select("revisions")?;
/// assert_eq!(posts.render_path()?, "posts/4/revisions");
/// ```
#[derive(Debug)]
pub struct ResourceHandler {
    spec: Arc<ResourceSpec>,
    path: BTreeMap<usize, String>,
    query: BTreeMap<String, String>,
    endpoint: Option<String>,
}

impl ResourceHandler {
    /// Create a handler with only level 0 filled in.
    #[must_use]
    pub fn new(spec: Arc<ResourceSpec>) -> Self {
        let mut path = BTreeMap::new();
        if !spec.has_dynamic_root() {
            path.insert(0, spec.name().to_owned());
        }
        Self {
            spec,
            path,
            query: BTreeMap::new(),
            endpoint: None,
        }
    }

    /// Set the API root that [`render_uri`](Self::render_uri) prefixes.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// The frozen resource this handler builds paths for.
    #[must_use]
    pub fn spec(&self) -> &Arc<ResourceSpec> {
        &self.spec
    }

    /// Namespace of the resource.
    #[must_use]
    pub fn namespace(&self) -> &str {
        self.spec.namespace()
    }

    /// Resource name.
    #[must_use]
    pub fn resource(&self) -> &str {
        self.spec.name()
    }

    /// Value currently held at `level`.
    #[must_use]
    pub fn path_part(&self, level: usize) -> Option<&str> {
        self.path.get(&level).map(String::as_str)
    }

    /// Write one level directly.
    ///
    /// Values are validated at render time, not here.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::LevelAlreadySet`] if `level` already holds a value.
    pub fn set_path_part(
        &mut self,
        level: usize,
        value: impl Display,
    ) -> Result<&mut Self, RouteError> {
        let value = value.to_string();
        self.ensure_unset(level, &value)?;
        trace!(resource = self.spec.name(), level, value = value.as_str(), "set path part");
        self.path.insert(level, value);
        Ok(self)
    }

    /// Call a named setter with a value.
    ///
    /// # Errors
    ///
    /// See [`apply`](Self::apply).
    pub fn set(&mut self, name: &str, value: impl Display) -> Result<&mut Self, RouteError> {
        self.apply(name, Some(value.to_string()))
    }

    /// Call a named setter without a value (select a literal segment).
    ///
    /// # Errors
    ///
    /// See [`apply`](Self::apply).
    pub fn select(&mut self, name: &str) -> Result<&mut Self, RouteError> {
        self.apply(name, None)
    }

    /// Call a named setter.
    ///
    /// # Errors
    ///
    /// - [`RouteError::UnknownSetter`] — the resource has no setter called `name`
    /// - [`RouteError::MissingValue`] — a dynamic setter got no value
    /// - [`RouteError::UnexpectedValue`] — a literal setter cannot forward the value
    /// - [`RouteError::LevelAlreadySet`] — a level the setter writes already holds a value;
    ///   nothing is written in that case
    pub fn apply(&mut self, name: &str, value: Option<String>) -> Result<&mut Self, RouteError> {
        let setter = self
            .spec
            .setters()
            .get(name)
            .ok_or_else(|| RouteError::UnknownSetter {
                resource: self.spec.name().to_owned(),
                name: name.to_owned(),
                available: self.spec.setters().names().map(str::to_owned).collect(),
            })?;
        let writes = setter.assignments(name, value)?;

        for (level, value) in &writes {
            self.ensure_unset(*level, value)?;
        }
        for (level, value) in writes {
            trace!(resource = self.spec.name(), setter = name, level, value = value.as_str(), "set path part");
            self.path.insert(level, value);
        }
        Ok(self)
    }

    /// Add a query-string parameter. A repeated key keeps the last value.
    pub fn param(&mut self, key: impl Into<String>, value: impl Display) -> &mut Self {
        self.query.insert(key.into(), value.to_string());
        self
    }

    /// Check the path state without rendering it.
    ///
    /// # Errors
    ///
    /// Same as [`render_path`](Self::render_path).
    pub fn validate(&self) -> Result<(), RouteError> {
        self.render_path().map(|_| ())
    }

    /// Validate and join the path, e.g. `posts/4/revisions/52`.
    ///
    /// # Errors
    ///
    /// - [`RouteError::IncompletePath`] — a level below the deepest set level is empty
    /// - [`RouteError::InvalidComponent`] — a value matches none of its level's validators
    /// - [`RouteError::UnknownLevel`] — a value sits deeper than any route reaches
    pub fn render_path(&self) -> Result<String, RouteError> {
        self.spec.levels().render(&self.path)
    }

    /// Render the full request URI: endpoint, namespace, path, query string.
    ///
    /// Without an endpoint the result starts at `/{namespace}`.
    ///
    /// # Errors
    ///
    /// Same as [`render_path`](Self::render_path).
    pub fn render_uri(&self) -> Result<String, RouteError> {
        let path = self.render_path()?;
        let endpoint = self.endpoint.as_deref().unwrap_or("").trim_end_matches('/');
        let mut uri = format!("{endpoint}/{}/{path}", self.namespace());
        if !self.query.is_empty() {
            let query: Vec<String> = self
                .query
                .iter()
                .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                .collect();
            uri.push('?');
            uri.push_str(&query.join("&"));
        }
        Ok(uri)
    }

    /// Render with a per-level report.
    ///
    /// # INV: `trace().result == render_path()`
    #[must_use]
    pub fn trace(&self) -> RenderTrace {
        self.spec.levels().trace(&self.path)
    }

    /// Methods the rendered path accepts.
    ///
    /// The path is resolved through the tree; if several branches accept it,
    /// their methods are unioned. `HEAD` is listed wherever `GET` is. A path
    /// that ends on a node no route terminates at accepts nothing.
    ///
    /// # Errors
    ///
    /// Same as [`render_path`](Self::render_path).
    pub fn allowed_methods(&self) -> Result<Vec<Method>, RouteError> {
        self.render_path()?;
        let values: Vec<&str> = self.path.values().map(String::as_str).collect();

        let mut allowed: Vec<Method> = Vec::new();
        for node in self.spec.tree().resolve(&values) {
            for method in node.methods().unwrap_or_default() {
                if !allowed.contains(method) {
                    allowed.push(*method);
                }
            }
        }
        if allowed.contains(&Method::Get) && !allowed.contains(&Method::Head) {
            allowed.push(Method::Head);
        }
        Ok(allowed)
    }

    /// Validate the path and check `method` against [`allowed_methods`](Self::allowed_methods).
    ///
    /// # Errors
    ///
    /// Render errors, or [`RouteError::MethodNotAllowed`].
    pub fn prepare(&self, method: Method) -> Result<PreparedRequest, RouteError> {
        let allowed = self.allowed_methods()?;
        if !allowed.contains(&method) {
            return Err(RouteError::MethodNotAllowed {
                method,
                path: self.render_path()?,
                allowed,
            });
        }

        Ok(PreparedRequest {
            method,
            url: self.render_uri()?,
            path: format!("/{}/{}", self.namespace(), self.render_path()?),
        })
    }

    /// Prepare the request and hand it to `transport`.
    ///
    /// # Errors
    ///
    /// Anything [`prepare`](Self::prepare) rejects, converted into the
    /// transport's error type, or the transport's own error.
    pub fn execute<T: Transport>(
        &self,
        transport: &T,
        method: Method,
    ) -> Result<T::Response, T::Error> {
        let request = self.prepare(method)?;
        trace!(request = %request, "execute");
        transport.execute(&request)
    }

    fn ensure_unset(&self, level: usize, value: &str) -> Result<(), RouteError> {
        match self.path.get(&level) {
            Some(existing) => Err(RouteError::LevelAlreadySet {
                level,
                existing: existing.clone(),
                value: value.to_owned(),
            }),
            None => Ok(()),
        }
    }
}
