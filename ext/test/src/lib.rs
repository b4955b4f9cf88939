//! pathwright-test: Test doubles and conformance fixtures for pathwright
//!
//! Provides a WordPress-shaped route table and a [`RecordingTransport`] that
//! captures prepared requests instead of sending them.
//!
//! # Example
//!
//! ```
//! use pathwright_test::prelude::*;
//!
//! let client = wp_client("https://example.com/wp-json");
//! let transport = RecordingTransport::new();
//!
//! let mut post = client.resource("posts").unwrap();
//! post.set("id", 4).unwrap();
//! post.execute(&transport, Method::Delete).unwrap();
//!
//! assert_eq!(transport.urls(), ["https://example.com/wp-json/wp/v2/posts/4"]);
//! ```

use pathwright::prelude::*;
use std::sync::{Arc, Mutex, PoisonError};

#[cfg(feature = "fixtures")]
pub mod fixture;

/// The bundled WordPress route table, as YAML.
pub const WP_V2_ROUTES: &str = include_str!("../data/wp_v2.yaml");

/// Parse [`WP_V2_ROUTES`].
///
/// # Panics
///
/// Never in practice; the table is checked by this crate's tests.
#[must_use]
pub fn wp_routes() -> RouteTableConfig {
    RouteTableConfig::from_yaml(WP_V2_ROUTES).unwrap_or_else(|e| panic!("bundled route table: {e}"))
}

/// Build an index from [`WP_V2_ROUTES`].
#[must_use]
pub fn wp_index() -> RouteIndex {
    RouteIndex::from_config(&wp_routes()).unwrap_or_else(|e| panic!("bundled route table: {e}"))
}

/// A client for `endpoint` backed by [`wp_index`].
#[must_use]
pub fn wp_client(endpoint: &str) -> Client {
    Client::new(ClientConfig::new(endpoint), Arc::new(wp_index()))
}

/// Transport that records every request and answers with its sequence number.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<PreparedRequest>>,
}

impl RecordingTransport {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<PreparedRequest> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// URLs of every request received so far.
    #[must_use]
    pub fn urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }
}

impl Transport for RecordingTransport {
    type Response = usize;
    type Error = RouteError;

    fn execute(&self, request: &PreparedRequest) -> Result<usize, RouteError> {
        let mut sent = self.sent.lock().unwrap_or_else(PoisonError::into_inner);
        sent.push(request.clone());
        Ok(sent.len())
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{wp_client, wp_index, wp_routes, RecordingTransport, WP_V2_ROUTES};
    pub use pathwright::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_table_builds() {
        let index = wp_index();
        assert_eq!(index.namespaces(), ["oembed/1.0", "wp/v2"]);
        assert!(index.resource("wp/v2", "posts").is_ok());
        assert!(index.resource("oembed/1.0", "embed").is_ok());
    }

    #[test]
    fn recorder_counts_requests() {
        let transport = RecordingTransport::new();
        let client = wp_client("http://localhost");
        let tags = client.resource("tags").unwrap();
        assert_eq!(tags.execute(&transport, Method::Get).unwrap(), 1);
        assert_eq!(tags.execute(&transport, Method::Post).unwrap(), 2);
        assert_eq!(transport.requests()[1].method, Method::Post);
    }
}
