//! Lazy ordered view of the entities under one relation endpoint.
//!
//! # Design
//! A [`Collection`] is created without I/O when a sub-list field is first
//! accessed. Its own first read issues exactly one GET against
//! `/<parent-segment>/<parent-id>/<relation>` and materializes one proxy
//! per element; the response array may carry bare id strings or full
//! objects, and objects pre-populate each new proxy's document. The item
//! vector is write-once; later reads reuse it, and a failed fetch leaves
//! it unset so the next read retries instead of serving an empty list.

use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

use crate::entity::{entity_from_element, Entity};
use crate::error::Error;
use crate::schema::EntityKind;
use crate::transport::Method;

/// Handle to a lazily-fetched relation. Cheap to clone; clones share the
/// fetched items.
#[derive(Clone)]
pub struct Collection {
    inner: Rc<CollectionInner>,
}

struct CollectionInner {
    parent: Entity,
    relation: &'static str,
    target: EntityKind,
    items: OnceCell<Vec<Entity>>,
}

impl Collection {
    pub(crate) fn new(parent: Entity, relation: &'static str, target: EntityKind) -> Self {
        Self {
            inner: Rc::new(CollectionInner {
                parent,
                relation,
                target,
                items: OnceCell::new(),
            }),
        }
    }

    /// The cached item slice, fetched on first use.
    pub fn items(&self) -> Result<&[Entity], Error> {
        if let Some(items) = self.inner.items.get() {
            return Ok(items);
        }
        let path = format!("{}/{}", self.inner.parent.path(), self.inner.relation);
        let conn = self.inner.parent.connection();
        let response = conn.fetch(Method::Get, &path)?;
        let elements = response.as_array().ok_or_else(|| Error::Decode {
            path: path.clone(),
            detail: format!("expected a JSON array, got {response}"),
        })?;
        let items = elements
            .iter()
            .map(|element| entity_from_element(conn, self.inner.target, &path, element))
            .collect::<Result<Vec<_>, Error>>()?;
        Ok(self.inner.items.get_or_init(|| items))
    }

    pub fn len(&self) -> Result<usize, Error> {
        Ok(self.items()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.items()?.is_empty())
    }

    /// Element at `index`; `None` when out of range, like `slice::get`.
    pub fn get(&self, index: usize) -> Result<Option<Entity>, Error> {
        Ok(self.items()?.get(index).cloned())
    }

    pub fn iter(&self) -> Result<std::slice::Iter<'_, Entity>, Error> {
        Ok(self.items()?.iter())
    }
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("parent", &self.inner.parent)
            .field("relation", &self.inner.relation)
            .field("fetched", &self.inner.items.get().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::connection::Connection;
    use crate::transport::stub::StubTransport;

    fn connection(stub: &StubTransport) -> Connection {
        Connection::new("k", "t", Box::new(stub.clone()))
    }

    #[test]
    fn construction_is_lazy() {
        let stub = StubTransport::new();
        let list = connection(&stub).get_list("l1").unwrap();

        let cards = list.collection("cards").unwrap();
        assert_eq!(stub.calls(), 0);
        drop(cards);
        assert_eq!(stub.calls(), 0);
    }

    #[test]
    fn id_elements_fetch_once_and_index_like_a_slice() {
        let stub = StubTransport::new();
        stub.respond("/lists/l1/cards", json!(["a1", "a2", "a3"]));
        let list = connection(&stub).get_list("l1").unwrap();
        let cards = list.collection("cards").unwrap();

        assert_eq!(cards.len().unwrap(), 3);
        assert_eq!(stub.calls(), 1);

        let third = cards.get(2).unwrap().unwrap();
        assert_eq!(third.id(), "a3");
        assert_eq!(stub.calls(), 1);

        assert!(cards.get(3).unwrap().is_none());
        assert_eq!(stub.calls(), 1);
    }

    #[test]
    fn repeated_relation_access_shares_one_fetch() {
        let stub = StubTransport::new();
        stub.respond("/lists/l1/cards", json!(["a1", "a2"]));
        let list = connection(&stub).get_list("l1").unwrap();

        let first: Vec<String> = list
            .collection("cards")
            .unwrap()
            .iter()
            .unwrap()
            .map(|card| card.id().to_string())
            .collect();
        // A second field access returns the memoized collection handle,
        // which still holds the fetched items.
        let second: Vec<String> = list
            .collection("cards")
            .unwrap()
            .iter()
            .unwrap()
            .map(|card| card.id().to_string())
            .collect();

        assert_eq!(first, second);
        assert_eq!(stub.calls(), 1);
    }

    #[test]
    fn object_elements_prepopulate_their_proxies() {
        let stub = StubTransport::new();
        stub.respond(
            "/boards/b1/lists",
            json!([
                {"id": "l1", "name": "Todo", "idBoard": "b1"},
                {"id": "l2", "name": "Doing", "idBoard": "b1"},
            ]),
        );
        let board = connection(&stub).get_board("b1").unwrap();
        let lists = board.collection("lists").unwrap();

        let doing = lists.get(1).unwrap().unwrap();
        assert_eq!(doing.string("name").unwrap(), "Doing");
        assert_eq!(stub.calls(), 1);

        // The embedded idBoard also came along for free.
        assert_eq!(doing.related("board").unwrap().id(), "b1");
        assert_eq!(stub.calls(), 1);
    }

    #[test]
    fn fetch_failure_is_not_cached() {
        let stub = StubTransport::new();
        let list = connection(&stub).get_list("l1").unwrap();
        let cards = list.collection("cards").unwrap();

        assert!(matches!(cards.len(), Err(Error::Api { status: 404, .. })));
        assert_eq!(stub.calls(), 1);

        stub.respond("/lists/l1/cards", json!(["a1"]));
        assert_eq!(cards.len().unwrap(), 1);
        assert_eq!(stub.calls(), 2);
    }

    #[test]
    fn malformed_relation_payload_is_a_decode_error() {
        let stub = StubTransport::new();
        stub.respond("/lists/l1/cards", json!({"not": "an array"}));
        let list = connection(&stub).get_list("l1").unwrap();
        let cards = list.collection("cards").unwrap();

        assert!(matches!(cards.len(), Err(Error::Decode { .. })));

        stub.respond("/lists/l2/cards", json!([42]));
        let list = connection(&stub).get_list("l2").unwrap();
        let cards = list.collection("cards").unwrap();
        assert!(matches!(cards.items(), Err(Error::Decode { .. })));
    }
}
