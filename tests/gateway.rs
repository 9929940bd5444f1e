mod common;

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use bookshelf_app::gateway::transport::{handle_event, TransportEvent};
use bookshelf_app::Gateway;
use bookshelf_db::MemoryStore;
use bookshelf_http::AppError;
use bookshelf_kernel::settings::Settings;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{gateway, settings, FaultyStore, API_KEY};

async fn call(gw: &Gateway, request: Value) -> Result<Value, AppError> {
    gw.handle(Some(API_KEY), request.to_string().as_bytes()).await
}

async fn ok(gw: &Gateway, request: Value) -> Value {
    call(gw, request).await.unwrap()["data"].clone()
}

#[tokio::test]
async fn health_reports_ok() {
    let gw = gateway(Arc::new(MemoryStore::new()));
    assert_eq!(ok(&gw, json!({"operation": "health"})).await, json!("OK"));
}

#[tokio::test]
async fn missing_or_wrong_key_is_unauthenticated() {
    let gw = gateway(Arc::new(MemoryStore::new()));
    let body = json!({"operation": "health"}).to_string();

    let err = gw.handle(None, body.as_bytes()).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(err.code(), "unauthenticated");

    let err = gw.handle(Some("nope"), body.as_bytes()).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(err.to_body()["error"]["message"], "Invalid API key provided.");
}

#[tokio::test]
async fn key_check_precedes_parsing() {
    let gw = gateway(Arc::new(MemoryStore::new()));
    let err = gw.handle(None, b"not json").await.unwrap_err();
    assert_eq!(err.status(), StatusCode::UNAUTHORIZED);

    let err = gw.handle(Some(API_KEY), b"not json").await.unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_operation_is_bad_request() {
    let gw = gateway(Arc::new(MemoryStore::new()));
    let err = call(&gw, json!({"operation": "dropEverything"}))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "bad_request");
}

#[tokio::test]
async fn create_list_and_resolve_through_gateway() {
    let gw = gateway(Arc::new(MemoryStore::new()));

    let author = ok(
        &gw,
        json!({"operation": "createAuthor", "arguments": {"input": {"name": "Jane Austen"}}}),
    )
    .await;
    let author_id = author["id"].as_str().unwrap().to_string();
    assert!(author.get("updatedAt").is_none());

    let created = ok(
        &gw,
        json!({
            "operation": "createBook",
            "arguments": {"input": {"title": "Emma", "authorIds": [author_id]}}
        }),
    )
    .await;
    assert_eq!(created["description"], "");
    assert_eq!(created["createdAt"], created["updatedAt"]);
    let book_id = created["id"].as_str().unwrap().to_string();

    let page = ok(
        &gw,
        json!({
            "operation": "listBooks",
            "arguments": {"filter": {"authorId": author_id}, "limit": 5}
        }),
    )
    .await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["id"], book_id.as_str());

    let authors = ok(
        &gw,
        json!({"operation": "resolveAuthorsOfBook", "arguments": {"id": book_id}}),
    )
    .await;
    assert_eq!(authors[0]["name"], "Jane Austen");

    let books = ok(
        &gw,
        json!({"operation": "resolveBooksOfAuthor", "arguments": {"id": author_id}}),
    )
    .await;
    assert_eq!(books[0]["title"], "Emma");

    assert_eq!(
        ok(&gw, json!({"operation": "deleteAuthor", "arguments": {"id": author_id}})).await,
        json!(true)
    );
    let authors = ok(
        &gw,
        json!({"operation": "resolveAuthorsOfBook", "arguments": {"id": book_id}}),
    )
    .await;
    assert_eq!(authors, json!([]));
}

#[tokio::test]
async fn absent_entities_are_null_not_errors() {
    let gw = gateway(Arc::new(MemoryStore::new()));
    assert_eq!(
        ok(&gw, json!({"operation": "getBook", "arguments": {"id": "missing"}})).await,
        Value::Null
    );
    assert_eq!(
        ok(
            &gw,
            json!({"operation": "updateBook", "arguments": {"id": "missing", "input": {"title": "X"}}})
        )
        .await,
        Value::Null
    );
    assert_eq!(
        ok(
            &gw,
            json!({"operation": "updateAuthor", "arguments": {"id": "missing", "input": {"name": "X"}}})
        )
        .await,
        Value::Null
    );
    assert_eq!(
        ok(&gw, json!({"operation": "deleteBook", "arguments": {"id": "missing"}})).await,
        json!(true)
    );
}

#[tokio::test]
async fn resolving_relations_of_unknown_entity_is_not_found() {
    let gw = gateway(Arc::new(MemoryStore::new()));
    let err = call(
        &gw,
        json!({"operation": "resolveAuthorsOfBook", "arguments": {"id": "missing"}}),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        err.to_body()["error"]["message"],
        "Book with ID \"missing\" not found."
    );
}

#[tokio::test]
async fn resolving_relations_degrades_when_lookup_fails() {
    let store = Arc::new(FaultyStore::new());
    let gw = gateway(store.clone());

    let author = ok(
        &gw,
        json!({"operation": "createAuthor", "arguments": {"input": {"name": "Ursula Le Guin"}}}),
    )
    .await;
    let book = ok(
        &gw,
        json!({
            "operation": "createBook",
            "arguments": {"input": {"title": "The Dispossessed", "authorIds": [author["id"]]}}
        }),
    )
    .await;

    store.fail_gets_of("Authors");
    let books = ok(
        &gw,
        json!({"operation": "resolveBooksOfAuthor", "arguments": {"id": author["id"]}}),
    )
    .await;
    assert_eq!(books, json!([]));

    store.fail_gets_of("Books");
    let authors = ok(
        &gw,
        json!({"operation": "resolveAuthorsOfBook", "arguments": {"id": book["id"]}}),
    )
    .await;
    assert_eq!(authors, json!([]));
}

#[tokio::test]
async fn error_kinds_map_to_statuses() {
    let gw = gateway(Arc::new(MemoryStore::new()));

    let err = call(
        &gw,
        json!({"operation": "createBook", "arguments": {"input": {"title": " ", "authorIds": []}}}),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(err.to_body()["error"]["message"], "Book title cannot be empty.");

    ok(
        &gw,
        json!({"operation": "createBook", "arguments": {"input": {"title": "Dune", "authorIds": []}}}),
    )
    .await;
    let err = call(
        &gw,
        json!({"operation": "createBooks", "arguments": {"inputs": [{"title": "DUNE", "authorIds": []}]}}),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::CONFLICT);
    assert_eq!(err.code(), "conflict");
}

#[tokio::test]
async fn store_failure_on_write_is_internal_but_reads_stay_empty() {
    let store = Arc::new(FaultyStore::new());
    let gw = gateway(store.clone());
    store.go_down();

    let page = ok(&gw, json!({"operation": "listBooks"})).await;
    assert_eq!(page, json!({"items": [], "total": 0}));
    assert_eq!(
        ok(&gw, json!({"operation": "searchBooks", "arguments": {"query": "x"}})).await,
        json!([])
    );

    let err = call(
        &gw,
        json!({"operation": "createBook", "arguments": {"input": {"title": "Dune", "authorIds": []}}}),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let err = call(&gw, json!({"operation": "getBook", "arguments": {"id": "b1"}}))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "internal_error");
}

#[tokio::test]
async fn configured_tables_are_used() {
    let store = Arc::new(FaultyStore::new());
    let mut settings = settings();
    settings.database.books_table = "books-test".into();
    let gw = Gateway::from_settings(store.clone(), &settings);

    ok(
        &gw,
        json!({"operation": "createBook", "arguments": {"input": {"title": "Emma", "authorIds": []}}}),
    )
    .await;
    assert_eq!(store.count("books-test").await, 1);
    assert_eq!(store.count("Books").await, 0);
}

#[tokio::test]
async fn unconfigured_api_key_rejects_everything() {
    let gw = Gateway::from_settings(Arc::new(MemoryStore::new()), &Settings::default());
    let err = gw
        .handle(Some("anything"), br#"{"operation":"health"}"#)
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn http_route_dispatches_operations() {
    let settings = settings();
    let registry = bookshelf_app::build_registry(&settings, Arc::new(MemoryStore::new()));
    let router = bookshelf_http::build_router(&registry, &settings);

    let response = router
        .clone()
        .oneshot(
            Request::post("/api/catalog")
                .header("x-api-key", API_KEY)
                .header("content-type", "application/json")
                .body(Body::from(r#"{"operation":"health"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body, json!({"data": "OK"}));

    let response = router
        .oneshot(
            Request::post("/api/catalog")
                .body(Body::from(r#"{"operation":"health"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"]["code"], "unauthenticated");
}

#[tokio::test]
async fn transport_event_round_trip() {
    let gw = gateway(Arc::new(MemoryStore::new()));

    let event: TransportEvent = serde_json::from_value(json!({
        "rawPath": "/graphql",
        "requestContext": {"http": {"method": "POST"}},
        "headers": {"X-Api-Key": API_KEY},
        "body": r#"{"operation":"createAuthor","arguments":{"input":{"name":"Mary Shelley"}}}"#
    }))
    .unwrap();
    let response = handle_event(&gw, event).await;
    assert_eq!(response.status_code, 200);
    assert_eq!(response.headers["content-type"], "application/json");
    let body: Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(body["data"]["name"], "Mary Shelley");

    let event: TransportEvent = serde_json::from_value(json!({
        "headers": {},
        "body": {"operation": "listAuthors"}
    }))
    .unwrap();
    let response = handle_event(&gw, event).await;
    assert_eq!(response.status_code, 401);
    let body: Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(
        body["error"]["message"],
        "Missing API key. Please provide x-api-key header."
    );
}
