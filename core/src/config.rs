//! Config types for route tables and clients.
//!
//! These types mirror the JSON an API index publishes under `routes` and are
//! serde-deserializable from JSON or YAML. Unknown fields (`endpoints`, `_links`,
//! the index's `name`/`description`) are ignored, so a full API index document
//! loads as a [`RouteTableConfig`] directly.
//!
//! # Relationship to runtime types
//!
//! | Config type | Runtime type | Loader |
//! |-------------|-------------|--------|
//! | [`RouteTableConfig`] | [`RouteIndex`](crate::RouteIndex) | `RouteIndex::from_config()` |
//! | [`RouteConfig`] | [`RouteDefinition`](crate::RouteDefinition) | `RouteDefinition::from_config()` |
//! | [`ClientConfig`] | [`Client`](crate::Client) | `Client::new()` |

use crate::{RouteDefinition, RouteError, DEFAULT_NAMESPACE};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

/// A route table: route string → route description, in document order.
///
/// ```
/// use pathwright::RouteTableConfig;
///
/// let table = RouteTableConfig::from_json(r#"{
///     "routes": {
///         "/wp/v2": { "namespace": "wp/v2", "methods": ["GET"] },
///         "/wp/v2/posts": { "namespace": "wp/v2", "methods": ["GET", "POST"] }
///     }
/// }"#).unwrap();
/// assert_eq!(table.routes.len(), 2);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteTableConfig {
    /// Route string → route description.
    #[serde(default)]
    pub routes: IndexMap<String, RouteConfig>,
}

/// Description of one route.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteConfig {
    /// Namespace the route belongs to (empty for the API root).
    #[serde(default)]
    pub namespace: String,

    /// HTTP verbs, any case.
    #[serde(default)]
    pub methods: Vec<String>,

    /// Optional schema carrying the route's display title.
    #[serde(default)]
    pub schema: Option<SchemaConfig>,
}

/// The part of a route's schema pathwright reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaConfig {
    /// Display title of the described resource, e.g. `post`.
    #[serde(default)]
    pub title: Option<String>,
}

/// Client configuration.
///
/// ```yaml
/// endpoint: https://example.com/wp-json
/// namespace: wp/v2
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// API root URL that rendered paths are appended to.
    pub endpoint: String,

    /// Namespace used by [`Client::resource`](crate::Client::resource).
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl ClientConfig {
    /// Create a config for `endpoint` with the default namespace.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            namespace: default_namespace(),
        }
    }
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_owned()
}

impl RouteTableConfig {
    /// Parse a route table from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidConfig`] on malformed JSON.
    pub fn from_json(json: &str) -> Result<Self, RouteError> {
        serde_json::from_str(json).map_err(|e| RouteError::InvalidConfig {
            reason: format!("JSON parse error: {e}"),
        })
    }

    /// Parse a route table from YAML.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidConfig`] on malformed YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, RouteError> {
        serde_yaml::from_str(yaml).map_err(|e| RouteError::InvalidConfig {
            reason: format!("YAML parse error: {e}"),
        })
    }

    /// Load a route table from a file: JSON for `.json`, YAML otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidConfig`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RouteError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| RouteError::InvalidConfig {
            reason: format!("failed to read \"{}\": {e}", path.display()),
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        }
    }

    /// Convert every entry into a [`RouteDefinition`], in document order.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidConfig`] if a route lists an unknown HTTP verb.
    pub fn definitions(&self) -> Result<Vec<RouteDefinition>, RouteError> {
        self.routes
            .iter()
            .map(|(route, config)| RouteDefinition::from_config(route, config))
            .collect()
    }
}
