//! Lazy client for a board-service REST API.
//!
//! # Overview
//! Exposes the remote resource graph (boards, lists, cards, members, ...)
//! as interconnected, lazily-populated proxies. Reading a field triggers at
//! most one fetch; fetched documents are cached for the proxy's lifetime,
//! and related ids materialize into further unfetched proxies.
//!
//! # Design
//! - `Connection` holds the credentials and the `Transport` collaborator;
//!   no network I/O happens until a proxy is asked for data.
//! - `Entity` is the lazy proxy. Its first scalar access issues one
//!   canonical GET that satisfies every scalar field of the type at once.
//! - `schema` declares, per entity type, which JSON keys are plain values
//!   and which resolve to other entities. New remote fields are added as
//!   table rows, not code paths.
//! - `Collection` defers its relation-endpoint GET until first use and then
//!   behaves like an ordered slice.
//! - Proxies are `Rc`-based with `RefCell`/`OnceCell` state, so they are
//!   neither `Send` nor `Sync`: one proxy, one logical flow.

pub mod collection;
pub mod connection;
pub mod entity;
pub mod error;
pub mod schema;
pub mod transport;

pub use collection::Collection;
pub use connection::Connection;
pub use entity::{Entity, FieldValue};
pub use error::Error;
pub use schema::{EntityKind, FieldDescriptor, FieldKind};
pub use transport::{Method, Transport};
