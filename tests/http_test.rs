use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use vendomat::application::engine::VendingEngine;
use vendomat::infrastructure::in_memory::InMemoryMachineStore;
use vendomat::interfaces::http::router;

fn app() -> Router {
    router(Arc::new(VendingEngine::new(Box::new(
        InMemoryMachineStore::new(),
    ))))
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_purchase_over_http() {
    let app = app();

    let (status, body) = call(&app, "POST", "/insert-coin", Some(r#"{"value": 1.00}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["insertedAmount"], json!(1.0));

    call(&app, "POST", "/insert-coin", Some(r#"{"value": 0.25}"#)).await;

    let (status, body) = call(&app, "POST", "/select-item", Some(r#"{"item": "Water"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["item"], "Water");
    assert_eq!(body["data"]["change"], json!([0.25, 0.25, 0.1]));

    let (_, body) = call(&app, "GET", "/inserted-amount", None).await;
    assert_eq!(body["data"]["insertedAmount"], json!(0.0));

    let (_, body) = call(&app, "GET", "/inventory", None).await;
    assert_eq!(body["data"]["items"]["WATER"]["quantity"], 4);
}

#[tokio::test]
async fn test_failures_keep_envelope() {
    let app = app();

    let (status, body) = call(&app, "POST", "/insert-coin", Some(r#"{"value": 0.03}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"success": false, "message": "Invalid coin: 0.03", "data": {}})
    );

    let (status, body) = call(&app, "POST", "/return-coins", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No coins to return.");
}

#[tokio::test]
async fn test_near_denomination_coin_is_rejected() {
    let app = app();

    let (status, body) = call(
        &app,
        "POST",
        "/insert-coin",
        Some(r#"{"value": 0.25000000000000001}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid coin: 0.25000000000000001");

    let (_, body) = call(&app, "GET", "/inserted-amount", None).await;
    assert_eq!(body["data"]["insertedAmount"], json!(0.0));

    let (status, body) = call(&app, "POST", "/insert-coin", Some(r#"{"value": "0.25"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["insertedAmount"], json!(0.25));
}

#[tokio::test]
async fn test_malformed_body_is_failure_outcome() {
    let app = app();

    let (status, body) = call(&app, "POST", "/insert-coin", Some("{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["data"], json!({}));
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid request body:")
    );
}

#[tokio::test]
async fn test_restock_change_config_over_http() {
    let app = app();

    let (status, body) = call(
        &app,
        "POST",
        "/restock",
        Some(r#"{"item": "soda", "amount": 2, "changeConfig": {"0.25": 2, "0.05": 1}}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["item"], "Soda");
    assert_eq!(body["data"]["quantity"], 7);
    assert_eq!(body["data"]["availableChange"], json!([0.25, 0.25, 0.05]));

    let (status, body) = call(&app, "POST", "/restock", Some("{}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No restock or change configuration provided.");
}
