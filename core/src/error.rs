//! Error types for the board API client.
//!
//! # Design
//! Local validation failures (`InvalidId`, `UnknownField`, `WrongShape`)
//! are raised before any I/O and are kept distinct from the two failure
//! modes of the transport collaborator: `Transport` for network-level
//! errors and `Api` for well-formed remote rejections. Both propagate to
//! the caller unchanged; the proxy layer never retries and never caches
//! a value for a failed fetch.

use thiserror::Error;

use crate::schema::EntityKind;

/// Errors surfaced by connections, entity proxies, and collections.
#[derive(Debug, Error)]
pub enum Error {
    /// The id is empty or contains a path separator. Raised before any I/O.
    #[error("invalid id {0:?}: ids must be non-empty and contain no '/'")]
    InvalidId(String),

    /// The field name is not declared for this entity type. Usually a typo
    /// or an unmapped remote field. Raised before any I/O.
    #[error("{kind} has no declared field {field:?}")]
    UnknownField { kind: EntityKind, field: String },

    /// A typed accessor was applied to a field declared with a different
    /// shape, e.g. `related` on a scalar. Raised before any I/O.
    #[error("field {field:?} is not a {expected} field")]
    WrongShape {
        field: String,
        expected: &'static str,
    },

    /// A credential environment variable is unset.
    #[error("missing credential environment variable {0}")]
    MissingCredentials(&'static str),

    /// The network call itself failed (DNS, connection refused, timeout).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The remote service returned a well-formed error response.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The response parsed as JSON but did not have the declared shape.
    #[error("malformed response for {path}: {detail}")]
    Decode { path: String, detail: String },
}
