//! Connection handle: credentials, the transport collaborator, and the
//! per-connection current-user cache.
//!
//! # Design
//! `Connection` is a cheap-clone handle over shared state; every proxy
//! created through it carries a clone, so one transport configuration
//! serves the whole graph. Looking an entity up never performs I/O, it
//! only validates the id and hands back an unfetched proxy. The one
//! exception with network access of its own is [`Connection::me`], which
//! resolves the authenticated member once and pins it for the connection's
//! lifetime.

use std::cell::OnceCell;
use std::env;
use std::rc::Rc;

use serde_json::Value;
use tracing::debug;

use crate::entity::Entity;
use crate::error::Error;
use crate::schema::EntityKind;
use crate::transport::{Method, Transport};

const KEY_VAR: &str = "BOARD_API_KEY";
const TOKEN_VAR: &str = "BOARD_API_TOKEN";

#[derive(Clone)]
pub struct Connection {
    inner: Rc<ConnInner>,
}

struct ConnInner {
    key: String,
    token: String,
    transport: Box<dyn Transport>,
    me: OnceCell<Entity>,
}

impl Connection {
    /// Build a connection from the two opaque credential strings and the
    /// transport that will execute its requests. No I/O happens here.
    pub fn new(api_key: &str, token: &str, transport: Box<dyn Transport>) -> Self {
        Self {
            inner: Rc::new(ConnInner {
                key: api_key.to_string(),
                token: token.to_string(),
                transport,
                me: OnceCell::new(),
            }),
        }
    }

    /// Build a connection with credentials read from `BOARD_API_KEY` and
    /// `BOARD_API_TOKEN`.
    pub fn from_env(transport: Box<dyn Transport>) -> Result<Self, Error> {
        let key = env::var(KEY_VAR).map_err(|_| Error::MissingCredentials(KEY_VAR))?;
        let token = env::var(TOKEN_VAR).map_err(|_| Error::MissingCredentials(TOKEN_VAR))?;
        Ok(Self::new(&key, &token, transport))
    }

    /// Unfetched proxy for any declared entity type. Never performs I/O;
    /// fails only on a malformed id.
    pub fn entity(&self, kind: EntityKind, id: &str) -> Result<Entity, Error> {
        if id.is_empty() || id.contains('/') {
            return Err(Error::InvalidId(id.to_string()));
        }
        Ok(Entity::new(self.clone(), kind, id.to_string()))
    }

    pub fn get_board(&self, id: &str) -> Result<Entity, Error> {
        self.entity(EntityKind::Board, id)
    }

    pub fn get_card(&self, id: &str) -> Result<Entity, Error> {
        self.entity(EntityKind::Card, id)
    }

    pub fn get_checklist(&self, id: &str) -> Result<Entity, Error> {
        self.entity(EntityKind::Checklist, id)
    }

    pub fn get_list(&self, id: &str) -> Result<Entity, Error> {
        self.entity(EntityKind::List, id)
    }

    pub fn get_member(&self, id: &str) -> Result<Entity, Error> {
        self.entity(EntityKind::Member, id)
    }

    pub fn get_notification(&self, id: &str) -> Result<Entity, Error> {
        self.entity(EntityKind::Notification, id)
    }

    pub fn get_organization(&self, id: &str) -> Result<Entity, Error> {
        self.entity(EntityKind::Organization, id)
    }

    /// The member whose credentials this connection carries.
    ///
    /// The first call issues `GET /members/me` and pins the result for the
    /// connection's lifetime; identity cannot change mid-session, so this
    /// caches harder than ordinary fields. Later calls return a clone of
    /// the same proxy without I/O.
    pub fn me(&self) -> Result<Entity, Error> {
        if let Some(me) = self.inner.me.get() {
            return Ok(me.clone());
        }
        let path = "/members/me";
        let response = self.fetch(Method::Get, path)?;
        let doc = match response {
            Value::Object(map) => map,
            other => {
                return Err(Error::Decode {
                    path: path.to_string(),
                    detail: format!("expected a JSON object, got {other}"),
                })
            }
        };
        let id = doc
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Decode {
                path: path.to_string(),
                detail: "member document has no string \"id\"".to_string(),
            })?
            .to_string();
        let me = Entity::with_doc(self.clone(), EntityKind::Member, id, doc);
        Ok(self.inner.me.get_or_init(|| me).clone())
    }

    /// Issue one request through the transport with the credentials
    /// attached as query parameters.
    pub(crate) fn fetch(&self, method: Method, path: &str) -> Result<Value, Error> {
        let params = [
            ("key".to_string(), self.inner.key.clone()),
            ("token".to_string(), self.inner.token.clone()),
        ];
        debug!(method = method.as_str(), path, "issuing request");
        self.inner.transport.request(method, path, &params)
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::transport::stub::StubTransport;

    fn connection(stub: &StubTransport) -> Connection {
        Connection::new("k", "t", Box::new(stub.clone()))
    }

    #[test]
    fn entity_lookup_is_local() {
        let stub = StubTransport::new();
        let conn = connection(&stub);
        let board = conn.get_board("b1").unwrap();
        assert_eq!(board.id(), "b1");
        assert_eq!(board.kind(), EntityKind::Board);
        assert_eq!(stub.calls(), 0);
    }

    #[test]
    fn malformed_ids_are_rejected_before_io() {
        let stub = StubTransport::new();
        let conn = connection(&stub);
        assert!(matches!(conn.get_card(""), Err(Error::InvalidId(_))));
        assert!(matches!(conn.get_card("c1/bogus"), Err(Error::InvalidId(_))));
        assert_eq!(stub.calls(), 0);
    }

    #[test]
    fn me_fetches_once_and_is_prepopulated() {
        let stub = StubTransport::new();
        stub.respond(
            "/members/me",
            json!({"id": "m1", "username": "ada", "fullName": "Ada Lovelace"}),
        );
        let conn = connection(&stub);

        let me = conn.me().unwrap();
        assert_eq!(me.id(), "m1");
        assert_eq!(stub.calls(), 1);

        // Second call reuses the pinned proxy.
        let again = conn.me().unwrap();
        assert_eq!(again, me);
        assert_eq!(stub.calls(), 1);

        // The who-am-I response pre-populated the scalar cache.
        assert_eq!(me.string("username").unwrap(), "ada");
        assert_eq!(stub.calls(), 1);
    }

    #[test]
    fn me_failure_is_not_pinned() {
        let stub = StubTransport::new();
        let conn = connection(&stub);

        assert!(matches!(conn.me(), Err(Error::Api { status: 404, .. })));
        assert_eq!(stub.calls(), 1);

        stub.respond("/members/me", json!({"id": "m1", "username": "ada"}));
        assert_eq!(conn.me().unwrap().id(), "m1");
        assert_eq!(stub.calls(), 2);
    }

    #[test]
    fn credentials_ride_along_as_params() {
        let stub = StubTransport::new();
        stub.respond("/members/me", json!({"id": "m1"}));
        connection(&stub).me().unwrap();

        let params = stub.last_params();
        assert!(params.contains(&("key".to_string(), "k".to_string())));
        assert!(params.contains(&("token".to_string(), "t".to_string())));
    }

    #[test]
    fn from_env_requires_both_credentials() {
        env::remove_var(KEY_VAR);
        env::remove_var(TOKEN_VAR);
        let err = Connection::from_env(Box::new(StubTransport::new())).unwrap_err();
        assert!(matches!(err, Error::MissingCredentials(var) if var == KEY_VAR));

        env::set_var(KEY_VAR, "k");
        env::set_var(TOKEN_VAR, "t");
        let conn = Connection::from_env(Box::new(StubTransport::new())).unwrap();
        assert_eq!(conn.get_board("b1").unwrap().id(), "b1");
        env::remove_var(KEY_VAR);
        env::remove_var(TOKEN_VAR);
    }
}
