use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::app;
use serde_json::Value;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(uri: &str) -> axum::response::Response {
    app()
        .oneshot(Request::builder().uri(uri).body(String::new()).unwrap())
        .await
        .unwrap()
}

// --- me ---

#[tokio::test]
async fn me_returns_the_seeded_member() {
    let resp = get("/members/me").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let me = body_json(resp).await;
    assert_eq!(me["id"], "m1");
    assert_eq!(me["username"], "ada");
}

// --- canonical documents ---

#[tokio::test]
async fn entity_document_found() {
    let resp = get("/cards/c1").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let card = body_json(resp).await;
    assert_eq!(card["name"], "Build lib");
    assert_eq!(card["idList"], "l2");
}

#[tokio::test]
async fn entity_document_not_found() {
    let resp = get("/cards/zzz").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_kind_not_found() {
    let resp = get("/widgets/w1").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn credentials_in_the_query_string_are_ignored() {
    let resp = get("/boards/b1?key=k&token=t").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let board = body_json(resp).await;
    assert_eq!(board["name"], "Product build");
}

// --- relation payloads ---

#[tokio::test]
async fn relation_embeds_full_documents() {
    let resp = get("/boards/b1/lists").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let lists = body_json(resp).await;
    let lists = lists.as_array().unwrap();
    assert_eq!(lists.len(), 2);
    assert_eq!(lists[0]["id"], "l1");
    assert_eq!(lists[1]["id"], "l2");
    assert_eq!(lists[1]["name"], "Doing");
}

#[tokio::test]
async fn relation_documents_point_back_at_the_parent() {
    let resp = get("/lists/l2/cards").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cards = body_json(resp).await;
    for card in cards.as_array().unwrap() {
        assert_eq!(card["idList"], "l2");
    }
}

#[tokio::test]
async fn relation_not_found() {
    let resp = get("/boards/zzz/lists").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
