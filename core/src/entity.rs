//! The lazy entity proxy.
//!
//! # Overview
//! An [`Entity`] stands in for one remote resource, identified by a kind
//! and an id, before any fetch has happened. Field access consults the
//! declared table for the kind and resolves the value through one of the
//! strategies in [`FieldKind`](crate::schema::FieldKind), fetching at most
//! once per proxy instance.
//!
//! # Caching
//! A proxy carries two layers of write-once state, shared by all clones of
//! the handle:
//! - the raw core JSON document, set by the first canonical GET (or at
//!   construction, when the proxy was built from a relation payload that
//!   already contained the full object). One fetch satisfies every scalar
//!   and every embedded id of the type at once.
//! - a memo of resolved field values, so relationship fields materialize
//!   their target proxies once and collections keep their identity across
//!   repeated reads.
//!
//! A failed fetch populates neither layer; the next access retries. There
//! is no invalidation; staleness is accepted for a read-mostly,
//! short-lived client session.
//!
//! Proxies are `!Send`/`!Sync`; concurrent use of one instance from
//! several threads is ruled out at compile time rather than locked around.

use std::cell::{OnceCell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::trace;

use crate::collection::Collection;
use crate::connection::Connection;
use crate::error::Error;
use crate::schema::{EntityKind, FieldKind};
use crate::transport::Method;

/// Resolved value of one declared field.
#[derive(Debug, Clone)]
pub enum FieldValue {
    Scalar(Value),
    Related(Entity),
    RelatedMany(Vec<Entity>),
    Collection(Collection),
}

/// Lazy stand-in for one remote resource. Cheap to clone; clones share
/// the fetched state.
#[derive(Clone)]
pub struct Entity {
    inner: Rc<EntityInner>,
}

struct EntityInner {
    kind: EntityKind,
    id: String,
    conn: Connection,
    doc: OnceCell<Map<String, Value>>,
    resolved: RefCell<HashMap<&'static str, FieldValue>>,
}

impl Entity {
    pub(crate) fn new(conn: Connection, kind: EntityKind, id: String) -> Self {
        Self {
            inner: Rc::new(EntityInner {
                kind,
                id,
                conn,
                doc: OnceCell::new(),
                resolved: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// Proxy pre-populated with a document the caller already holds, so
    /// its scalar reads cost no further fetch.
    pub(crate) fn with_doc(
        conn: Connection,
        kind: EntityKind,
        id: String,
        doc: Map<String, Value>,
    ) -> Self {
        let entity = Self::new(conn, kind, id);
        let _ = entity.inner.doc.set(doc);
        entity
    }

    pub fn kind(&self) -> EntityKind {
        self.inner.kind
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub(crate) fn connection(&self) -> &Connection {
        &self.inner.conn
    }

    /// Canonical path of this resource, e.g. `/cards/c1`.
    pub(crate) fn path(&self) -> String {
        format!("/{}/{}", self.inner.kind.segment(), self.inner.id)
    }

    /// Resolve one declared field, fetching on the first miss.
    pub fn get(&self, field: &str) -> Result<FieldValue, Error> {
        if let Some(value) = self.inner.resolved.borrow().get(field) {
            trace!(field, "field memo hit");
            return Ok(value.clone());
        }
        let desc = self
            .inner
            .kind
            .field(field)
            .ok_or_else(|| Error::UnknownField {
                kind: self.inner.kind,
                field: field.to_string(),
            })?;
        let value = match desc.kind {
            FieldKind::Scalar => FieldValue::Scalar(self.doc_value(desc.name, desc.name)?),
            FieldKind::BelongsTo { key, target } => {
                let id = self.id_from(desc.name, self.doc_value(desc.name, key)?)?;
                FieldValue::Related(Entity::new(self.inner.conn.clone(), target, id))
            }
            FieldKind::BelongsToVia { target } => {
                let path = format!("{}/{}", self.path(), desc.name);
                let response = self.inner.conn.fetch(Method::Get, &path)?;
                FieldValue::Related(entity_from_element(
                    &self.inner.conn,
                    target,
                    &path,
                    &response,
                )?)
            }
            FieldKind::IdList { key, target } => {
                let raw = self.doc_value(desc.name, key)?;
                let ids = raw.as_array().ok_or_else(|| Error::Decode {
                    path: self.path(),
                    detail: format!("key {key:?} is not an array of ids"),
                })?;
                let related = ids
                    .iter()
                    .map(|v| {
                        let id = self.id_from(desc.name, v.clone())?;
                        Ok(Entity::new(self.inner.conn.clone(), target, id))
                    })
                    .collect::<Result<Vec<_>, Error>>()?;
                FieldValue::RelatedMany(related)
            }
            FieldKind::Sublist { target } => {
                FieldValue::Collection(Collection::new(self.clone(), desc.name, target))
            }
        };
        self.inner
            .resolved
            .borrow_mut()
            .insert(desc.name, value.clone());
        Ok(value)
    }

    /// Scalar field as raw JSON.
    pub fn scalar(&self, field: &str) -> Result<Value, Error> {
        match self.get(field)? {
            FieldValue::Scalar(value) => Ok(value),
            _ => Err(Error::WrongShape {
                field: field.to_string(),
                expected: "scalar",
            }),
        }
    }

    pub fn string(&self, field: &str) -> Result<String, Error> {
        let value = self.scalar(field)?;
        match value.as_str() {
            Some(s) => Ok(s.to_string()),
            None => Err(self.coerce_err(field, "a JSON string", &value)),
        }
    }

    pub fn boolean(&self, field: &str) -> Result<bool, Error> {
        let value = self.scalar(field)?;
        value
            .as_bool()
            .ok_or_else(|| self.coerce_err(field, "a JSON boolean", &value))
    }

    pub fn integer(&self, field: &str) -> Result<i64, Error> {
        let value = self.scalar(field)?;
        value
            .as_i64()
            .ok_or_else(|| self.coerce_err(field, "a JSON integer", &value))
    }

    /// Scalar field parsed as an RFC 3339 timestamp.
    pub fn datetime(&self, field: &str) -> Result<DateTime<Utc>, Error> {
        let raw = self.string(field)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| Error::Decode {
                path: self.path(),
                detail: format!("field {field:?} is not an RFC 3339 timestamp: {e}"),
            })
    }

    /// Single related entity (belongs-to field).
    pub fn related(&self, field: &str) -> Result<Entity, Error> {
        match self.get(field)? {
            FieldValue::Related(entity) => Ok(entity),
            _ => Err(Error::WrongShape {
                field: field.to_string(),
                expected: "single related entity",
            }),
        }
    }

    /// Related entities materialized from an embedded id list.
    pub fn related_many(&self, field: &str) -> Result<Vec<Entity>, Error> {
        match self.get(field)? {
            FieldValue::RelatedMany(entities) => Ok(entities),
            _ => Err(Error::WrongShape {
                field: field.to_string(),
                expected: "embedded id list",
            }),
        }
    }

    /// Lazy collection under a relation endpoint.
    pub fn collection(&self, field: &str) -> Result<Collection, Error> {
        match self.get(field)? {
            FieldValue::Collection(collection) => Ok(collection),
            _ => Err(Error::WrongShape {
                field: field.to_string(),
                expected: "relation collection",
            }),
        }
    }

    /// Core document, fetched from the canonical endpoint on first use.
    fn doc(&self) -> Result<&Map<String, Value>, Error> {
        if let Some(doc) = self.inner.doc.get() {
            return Ok(doc);
        }
        let path = self.path();
        let response = self.inner.conn.fetch(Method::Get, &path)?;
        let doc = match response {
            Value::Object(map) => map,
            other => {
                return Err(Error::Decode {
                    path,
                    detail: format!("expected a JSON object, got {other}"),
                })
            }
        };
        Ok(self.inner.doc.get_or_init(|| doc))
    }

    fn doc_value(&self, field: &str, key: &str) -> Result<Value, Error> {
        let doc = self.doc()?;
        doc.get(key).cloned().ok_or_else(|| Error::Decode {
            path: self.path(),
            detail: format!("declared field {field:?} (key {key:?}) missing from response"),
        })
    }

    fn id_from(&self, field: &str, value: Value) -> Result<String, Error> {
        match value {
            Value::String(id) => Ok(id),
            other => Err(Error::Decode {
                path: self.path(),
                detail: format!("field {field:?} expected a string id, got {other}"),
            }),
        }
    }

    fn coerce_err(&self, field: &str, expected: &str, got: &Value) -> Error {
        Error::Decode {
            path: self.path(),
            detail: format!("field {field:?} expected {expected}, got {got}"),
        }
    }
}

/// Build a proxy from one relation-endpoint element: a bare id string, or
/// a full object carrying at least an `id` (which then pre-populates the
/// new proxy's document).
pub(crate) fn entity_from_element(
    conn: &Connection,
    kind: EntityKind,
    path: &str,
    element: &Value,
) -> Result<Entity, Error> {
    match element {
        Value::String(id) => Ok(Entity::new(conn.clone(), kind, id.clone())),
        Value::Object(doc) => {
            let id = doc
                .get("id")
                .and_then(Value::as_str)
                .ok_or_else(|| Error::Decode {
                    path: path.to_string(),
                    detail: "relation element has no string \"id\"".to_string(),
                })?;
            Ok(Entity::with_doc(
                conn.clone(),
                kind,
                id.to_string(),
                doc.clone(),
            ))
        }
        other => Err(Error::Decode {
            path: path.to_string(),
            detail: format!("relation element is neither an id nor an object: {other}"),
        }),
    }
}

/// Identity is (kind, id); field contents never enter the comparison.
impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.inner.kind == other.inner.kind && self.inner.id == other.inner.id
    }
}

impl Eq for Entity {}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("kind", &self.inner.kind)
            .field("id", &self.inner.id)
            .field("fetched", &self.inner.doc.get().is_some())
            .finish()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self
            .inner
            .doc
            .get()
            .and_then(|doc| doc.get("name"))
            .and_then(Value::as_str);
        match name {
            Some(name) => write!(f, "<{}: {}>", self.inner.kind, name),
            None => write!(f, "<{}: {}>", self.inner.kind, self.inner.id),
        }
    }
}
