//! Client — an endpoint bound to a frozen route index.

use std::sync::Arc;

use crate::{ClientConfig, ResourceHandler, RouteError, RouteIndex, RouteTableConfig};

/// Hands out endpoint-aware [`ResourceHandler`]s.
///
/// Cloning a client is cheap; clones share one [`RouteIndex`].
///
/// ```
/// use pathwright::{Client, ClientConfig, RouteTableConfig};
///
/// let routes = RouteTableConfig::from_json(r#"{ "routes": {
///     "/wp/v2/posts/(?P<id>[\\d]+)": { "namespace": "wp/v2", "methods": ["GET"] }
/// } }"#).unwrap();
/// let client = Client::from_routes(ClientConfig::new("https://example.com/wp-json"), &routes).unwrap();
///
/// let mut posts = client.resource("posts").unwrap();
/// posts.set("id", 1).unwrap();
/// assert_eq!(posts.render_uri().unwrap(), "https://example.com/wp-json/wp/v2/posts/1");
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    endpoint: String,
    namespace: String,
    index: Arc<RouteIndex>,
}

impl Client {
    /// Bind a config to an already-built index.
    #[must_use]
    pub fn new(config: ClientConfig, index: Arc<RouteIndex>) -> Self {
        Self {
            endpoint: config.endpoint,
            namespace: config.namespace.trim_matches('/').to_owned(),
            index,
        }
    }

    /// Build the index from a route table and bind it.
    ///
    /// # Errors
    ///
    /// Config conversion or route grammar errors.
    pub fn from_routes(config: ClientConfig, routes: &RouteTableConfig) -> Result<Self, RouteError> {
        Ok(Self::new(config, Arc::new(RouteIndex::from_config(routes)?)))
    }

    /// API root URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Namespace used by [`resource`](Self::resource).
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The shared route index.
    #[must_use]
    pub fn index(&self) -> &Arc<RouteIndex> {
        &self.index
    }

    /// A fresh handler for a resource in the default namespace.
    ///
    /// # Errors
    ///
    /// [`RouteError::UnknownNamespace`] or [`RouteError::UnknownResource`].
    pub fn resource(&self, name: &str) -> Result<ResourceHandler, RouteError> {
        self.handler(&self.namespace, name)
    }

    /// A fresh handler for a resource in any namespace.
    ///
    /// # Errors
    ///
    /// [`RouteError::UnknownNamespace`] or [`RouteError::UnknownResource`].
    pub fn handler(&self, namespace: &str, name: &str) -> Result<ResourceHandler, RouteError> {
        Ok(self
            .index
            .handler(namespace, name)?
            .with_endpoint(self.endpoint.as_str()))
    }
}
