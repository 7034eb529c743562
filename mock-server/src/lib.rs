//! Mock board service serving a seeded resource graph.
//!
//! # Design
//! The read surface of the remote API, backed by the fixture graph in
//! `fixtures/seed.json`: canonical documents at `/{kind}/{id}`, relation
//! payloads at `/{kind}/{id}/{relation}` (full documents embedded, the way
//! the real service answers relation endpoints), and the authenticated
//! member at `/members/me`. Credentials arrive as query parameters and are
//! ignored; auth is out of scope for the tests this server backs.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::net::TcpListener;

const SEED: &str = include_str!("../../fixtures/seed.json");

/// Seeded resource graph: documents keyed by `kind/id`, relation
/// membership keyed by `kind/id/relation` with `kind/id` references.
#[derive(Deserialize)]
pub struct Graph {
    me: String,
    entities: HashMap<String, Map<String, Value>>,
    relations: HashMap<String, Vec<String>>,
}

impl Graph {
    pub fn seeded() -> Self {
        let graph: Graph = serde_json::from_str(SEED).expect("seed fixture parses");
        let me_key = format!("members/{}", graph.me);
        assert!(graph.entities.contains_key(&me_key), "seed has no me document");
        graph
    }

    fn document(&self, key: &str) -> Option<Value> {
        self.entities.get(key).cloned().map(Value::Object)
    }
}

type SharedGraph = Arc<Graph>;

pub fn app() -> Router {
    let graph: SharedGraph = Arc::new(Graph::seeded());
    Router::new()
        .route("/members/me", get(get_me))
        .route("/{kind}/{id}", get(get_entity))
        .route("/{kind}/{id}/{relation}", get(get_relation))
        .with_state(graph)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn get_me(State(graph): State<SharedGraph>) -> Result<Json<Value>, StatusCode> {
    graph
        .document(&format!("members/{}", graph.me))
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn get_entity(
    State(graph): State<SharedGraph>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<Value>, StatusCode> {
    graph
        .document(&format!("{kind}/{id}"))
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn get_relation(
    State(graph): State<SharedGraph>,
    Path((kind, id, relation)): Path<(String, String, String)>,
) -> Result<Json<Value>, StatusCode> {
    let refs = graph
        .relations
        .get(&format!("{kind}/{id}/{relation}"))
        .ok_or(StatusCode::NOT_FOUND)?;
    let items = refs
        .iter()
        .map(|r| graph.document(r).ok_or(StatusCode::INTERNAL_SERVER_ERROR))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(Value::Array(items)))
}
