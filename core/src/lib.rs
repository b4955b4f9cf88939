//! pathwright - Chainable path builders compiled from REST route tables
//!
//! A REST API describes its endpoints as route templates with named,
//! regex-constrained segments (`/wp/v2/posts/(?P<id>[\d]+)`). pathwright compiles
//! such a table into one tree per resource and hands out chainable handlers whose
//! named setters fill in path segments, validate them, and render a request path.
//!
//! # Architecture
//!
//! - [`NamedGroup`] — Recognizes `(?P<name>pattern)` inside one route segment
//! - [`RouteTreeBuilder`] — Folds route definitions into per-resource [`RouteTreeNode`] trees
//! - [`PathPartSetter`] — Setter synthesized per tree node, collected in a [`SetterTable`]
//! - [`LevelTable`] — Flattened per-level validators shared by every handler of a resource
//! - [`ResourceHandler`] — Per-chain path state: set, validate, render
//! - [`RouteIndex`] — Frozen namespace → resource → [`ResourceSpec`] map
//!
//! # Key Design Insights
//!
//! 1. **Pattern identity, not name**: nodes are keyed by their inner pattern, so
//!    `(?P<id>[\d]+)` and `(?P<parent>[\d]+)` at the same depth are one node with
//!    two setter names.
//!
//! 2. **Build once, share read-only**: [`RouteIndexBuilder::build`] consumes the
//!    builder. Trees, level tables and setter tables sit behind `Arc` and are never
//!    mutated; each request chain owns a fresh [`ResourceHandler`].
//!
//! 3. **Levels never overwrite**: setting a level twice is a usage error
//!    ([`RouteError::LevelAlreadySet`]), distinct from render-time validation errors.
//!
//! # Example
//!
//! ```
//! use pathwright::prelude::*;
//!
//! let index = RouteIndex::builder()
//!     .route(RouteDefinition::new("/wp/v2/posts", "wp/v2").with_methods([Method::Get, Method::Post]))
//!     .route(RouteDefinition::new(r"/wp/v2/posts/(?P<id>[\d]+)", "wp/v2").with_methods([Method::Get]))
//!     .route(RouteDefinition::new(r"/wp/v2/posts/(?P<parent>[\d]+)/revisions", "wp/v2").with_methods([Method::Get]))
//!     .route(RouteDefinition::new(r"/wp/v2/posts/(?P<parent>[\d]+)/revisions/(?P<id>[\d]+)", "wp/v2").with_methods([Method::Get]))
//!     .build()
//!     .unwrap();
//!
//! let mut posts = index.handler("wp/v2", "posts").unwrap();
//! posts.set("id", 4).unwrap().set("revisions", 52).unwrap();
//! assert_eq!(posts.render_path().unwrap(), "posts/4/revisions/52");
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod client;
mod config;
mod handler;
mod index;
mod levels;
mod method;
mod named_group;
mod route_tree;
mod segment_matcher;
mod setter;
mod trace;
mod transport;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Route grammar
pub use named_group::{opens_group, split_path, NamedGroup};
pub use segment_matcher::SegmentMatcher;

// Tree construction
pub use route_tree::{NodeKey, ResourceTrees, RouteDefinition, RouteTreeBuilder, RouteTreeNode};

// Handler synthesis
pub use index::{ResourceSpec, RouteIndex, RouteIndexBuilder};
pub use levels::{LevelDescriptor, LevelTable};
pub use setter::{PathPartSetter, SetterTable};

// Runtime
pub use client::Client;
pub use handler::ResourceHandler;
pub use method::Method;
pub use transport::{PreparedRequest, Transport};

// Config
pub use config::{ClientConfig, RouteConfig, RouteTableConfig, SchemaConfig};

// Trace types
pub use trace::{LevelStatus, LevelStep, RenderTrace};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use pathwright::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Runtime
        Client,
        ClientConfig,
        Method,
        PreparedRequest,
        // Trace types
        RenderTrace,
        ResourceHandler,
        ResourceSpec,
        // Config types
        RouteConfig,
        RouteDefinition,
        // Errors
        RouteError,
        RouteIndex,
        RouteIndexBuilder,
        RouteTableConfig,
        Transport,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum number of levels (resource name included) a single route may have.
///
/// Checked at build time by [`RouteTreeBuilder::insert`].
pub const MAX_LEVELS: usize = 32;

/// Maximum length of the inner pattern of a named group.
///
/// Regex compilation cost grows with pattern size even with the linear-time
/// `regex` crate; route tables never need patterns anywhere near this long.
pub const MAX_PATTERN_LENGTH: usize = 4096;

/// Namespace used by [`Client::resource`] when [`ClientConfig`] names none.
pub const DEFAULT_NAMESPACE: &str = "wp/v2";

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from route compilation, path assembly and rendering.
///
/// Grammar and config errors surface while building a [`RouteIndex`]; fix the
/// route table and rebuild. State errors surface while chaining setters and point
/// at a bug in the calling code. Render errors surface from
/// [`ResourceHandler::render_path`] and friends.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// A segment opens a named group that does not parse.
    #[error("route \"{route}\": segment \"{segment}\" opens a named group but is not of the form (?P<name>pattern)")]
    InvalidGroup {
        /// The route string containing the segment.
        route: String,
        /// The offending segment.
        segment: String,
    },

    /// A named group's inner pattern does not compile.
    #[error("route \"{route}\": invalid pattern \"{pattern}\": {reason}")]
    InvalidPattern {
        /// The route string containing the pattern.
        route: String,
        /// The inner pattern that failed to compile.
        pattern: String,
        /// The underlying regex error message.
        reason: String,
    },

    /// A named group's inner pattern exceeds [`MAX_PATTERN_LENGTH`].
    #[error("route \"{route}\": pattern length is {len}, but maximum allowed is {max}")]
    PatternTooLong {
        /// The route string containing the pattern.
        route: String,
        /// Actual length of the pattern.
        len: usize,
        /// Maximum allowed length.
        max: usize,
    },

    /// A route has more levels than [`MAX_LEVELS`].
    #[error("route \"{route}\" has {depth} levels, but maximum allowed is {max}")]
    DepthExceeded {
        /// The route string.
        route: String,
        /// Number of levels in the route.
        depth: usize,
        /// Maximum allowed.
        max: usize,
    },

    /// Route table deserialization or conversion failed.
    #[error("invalid route table: {reason}")]
    InvalidConfig {
        /// The underlying error message.
        reason: String,
    },

    /// A path level already holds a value.
    #[error("path level {level} is already set to \"{existing}\"; refusing to overwrite it with \"{value}\"")]
    LevelAlreadySet {
        /// The level that was set twice.
        level: usize,
        /// The value already stored.
        existing: String,
        /// The value that was rejected.
        value: String,
    },

    /// No setter with this name exists on the resource.
    #[error("resource \"{resource}\" has no setter \"{name}\" (available: {})", list(.available))]
    UnknownSetter {
        /// The resource the setter was looked up on.
        resource: String,
        /// The requested setter name.
        name: String,
        /// Setter names that do exist.
        available: Vec<String>,
    },

    /// A dynamic setter was called without a value.
    #[error("setter \"{setter}\" selects a dynamic segment and needs a value")]
    MissingValue {
        /// The setter name.
        setter: String,
    },

    /// A literal setter with no unambiguous dynamic child was given a value.
    #[error("setter \"{setter}\" has no single dynamic child segment to receive \"{value}\"")]
    UnexpectedValue {
        /// The setter name.
        setter: String,
        /// The value that had nowhere to go.
        value: String,
    },

    /// Levels between 0 and the highest set level are missing.
    #[error("incomplete path \"{path}\": no value for level(s) {}", list(.missing))]
    IncompletePath {
        /// The partial path, with placeholders at each gap.
        path: String,
        /// The missing levels, ascending.
        missing: Vec<usize>,
    },

    /// A set value matches none of its level's validators.
    #[error("invalid path component \"{value}\" at level {level}: expected {}", one_of(.expected))]
    InvalidComponent {
        /// The level holding the value.
        level: usize,
        /// The rejected value.
        value: String,
        /// Components accepted at this level (literals or patterns).
        expected: Vec<String>,
    },

    /// A value was set deeper than any route of the resource reaches.
    #[error("path level {level} does not exist; the deepest level of this resource is {deepest}")]
    UnknownLevel {
        /// The level that was set.
        level: usize,
        /// The deepest level any route reaches.
        deepest: usize,
    },

    /// The namespace is not part of the route table.
    #[error("unknown namespace \"{namespace}\" (available: {})", list(.available))]
    UnknownNamespace {
        /// The requested namespace.
        namespace: String,
        /// Namespaces that are registered.
        available: Vec<String>,
    },

    /// The resource is not part of the namespace.
    #[error("namespace \"{namespace}\" has no resource \"{resource}\" (available: {})", list(.available))]
    UnknownResource {
        /// The namespace searched.
        namespace: String,
        /// The requested resource.
        resource: String,
        /// Resources that are registered in the namespace.
        available: Vec<String>,
    },

    /// The rendered path does not accept this HTTP method.
    #[error("{method} is not allowed on \"{path}\" (allowed: {})", list(.allowed))]
    MethodNotAllowed {
        /// The requested method.
        method: Method,
        /// The rendered path.
        path: String,
        /// Methods the path's route accepts.
        allowed: Vec<Method>,
    },
}

fn list<T: std::fmt::Display>(items: &[T]) -> String {
    if items.is_empty() {
        return "none".to_owned();
    }
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn one_of(items: &[String]) -> String {
    match items {
        [] => "nothing".to_owned(),
        [single] => format!("\"{single}\""),
        _ => format!(
            "one of {}",
            items
                .iter()
                .map(|item| format!("\"{item}\""))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_setter_lists_available() {
        let err = RouteError::UnknownSetter {
            resource: "posts".into(),
            name: "slug".into(),
            available: vec!["id".into(), "revisions".into()],
        };
        assert_eq!(
            err.to_string(),
            "resource \"posts\" has no setter \"slug\" (available: id, revisions)"
        );
    }

    #[test]
    fn invalid_component_names_candidates() {
        let single = RouteError::InvalidComponent {
            level: 1,
            value: "12a".into(),
            expected: vec![r"[\d]+".into()],
        };
        assert!(single.to_string().ends_with(r#"expected "[\d]+""#));

        let several = RouteError::InvalidComponent {
            level: 2,
            value: "x".into(),
            expected: vec!["revisions".into(), "autosaves".into()],
        };
        assert!(several
            .to_string()
            .ends_with(r#"expected one of "revisions", "autosaves""#));
    }

    #[test]
    fn method_not_allowed_with_no_methods() {
        let err = RouteError::MethodNotAllowed {
            method: Method::Delete,
            path: "posts".into(),
            allowed: vec![],
        };
        assert_eq!(
            err.to_string(),
            "delete is not allowed on \"posts\" (allowed: none)"
        );
    }
}
