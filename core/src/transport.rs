//! Transport seam: the boundary where a rendered request leaves pathwright.
//!
//! pathwright never performs I/O. [`ResourceHandler::execute`](crate::ResourceHandler::execute)
//! validates the path, checks the method against the route, and hands a
//! [`PreparedRequest`] to a caller-supplied [`Transport`]. Authentication,
//! retries and response decoding live on the other side of this trait.

use crate::{Method, RouteError};
use std::fmt;

/// A validated request, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    /// The HTTP method, already checked against the route.
    pub method: Method,
    /// Endpoint + namespace + path + query string.
    pub url: String,
    /// `/{namespace}/{path}`, without endpoint or query string.
    pub path: String,
}

impl fmt::Display for PreparedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method.as_http(), self.url)
    }
}

/// Executes prepared requests.
///
/// `Error` must absorb [`RouteError`] so that path and method failures
/// surface through the same channel as transport failures.
///
/// # Example
///
/// ```ignore
/// #[derive(Debug)]
/// struct Curl;
///
/// impl Transport for Curl {
///     type Response = String;
///     type Error = MyError;
///
///     fn execute(&self, request: &PreparedRequest) -> Result<String, MyError> {
///         run_curl(request.method.as_http(), &request.url)
///     }
/// }
/// ```
pub trait Transport: Send + Sync + fmt::Debug {
    /// What a successful request yields.
    type Response;

    /// What a failed request yields.
    type Error: From<RouteError>;

    /// Send one request.
    ///
    /// # Errors
    ///
    /// Implementation-defined.
    fn execute(&self, request: &PreparedRequest) -> Result<Self::Response, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_wire_verb() {
        let request = PreparedRequest {
            method: Method::Delete,
            url: "https://example.com/wp-json/wp/v2/posts/4".into(),
            path: "/wp/v2/posts/4".into(),
        };
        assert_eq!(
            request.to_string(),
            "DELETE https://example.com/wp-json/wp/v2/posts/4"
        );
    }
}
