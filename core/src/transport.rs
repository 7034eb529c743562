//! The HTTP execution boundary this crate depends on but does not implement.
//!
//! # Design
//! The client core never opens a socket. Every fetch goes through the
//! [`Transport`] trait: given a method, a path, and query parameters, an
//! implementation returns decoded JSON or fails with
//! [`Error::Transport`](crate::Error::Transport) (the network call itself
//! failed) or [`Error::Api`](crate::Error::Api) (the remote rejected the
//! call). Keeping the boundary this narrow makes the proxy layer fully
//! deterministic under test: the integration tests supply a `ureq`-backed
//! implementation, the unit tests a canned one.

use serde_json::Value;

use crate::error::Error;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub const fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// Executes one HTTP round-trip against the remote service.
///
/// `path` is service-relative (`/cards/c1`); `params` carries the query
/// string, credentials included. Implementations must distinguish network
/// failures (`Error::Transport`) from remote rejections (`Error::Api`) and
/// must not retry; retry policy belongs to the implementation's caller,
/// not to the proxy layer above it.
pub trait Transport {
    fn request(&self, method: Method, path: &str, params: &[(String, String)])
        -> Result<Value, Error>;
}
