//! Backend API Integration Tests
//!
//! Drives the Axum router with `Router::oneshot` against the scripted mock
//! engine, so no real Stockfish is needed.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use backend::{api, RelayConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use stockfish_session::mock::{mock_engine_config, BLACK_TO_MOVE_FEN, MATED_FEN, STALLING_FEN};
use stockfish_session::EngineSession;
use tokio::sync::Mutex;
use tower::ServiceExt;

fn test_config() -> RelayConfig {
    RelayConfig {
        move_time: Duration::from_millis(500),
        ..RelayConfig::default()
    }
}

/// Helper to create a router backed by a running mock engine
async fn test_router() -> Router {
    let session = EngineSession::start(mock_engine_config())
        .await
        .expect("Failed to start mock engine");
    api::router(Arc::new(Mutex::new(session)), &test_config())
}

/// Helper to create a router whose engine never started
fn dead_engine_router() -> Router {
    let session = EngineSession::new(mock_engine_config());
    api::router(Arc::new(Mutex::new(session)), &test_config())
}

fn get_move_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/get-move")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_omitted_fen_uses_starting_position() {
    let app = test_router().await;

    let response = app.oneshot(get_move_request(json!({}))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["move"], "e2e4");
    let elapsed = body["calculation_time"].as_f64().unwrap();
    assert!(elapsed >= 0.0, "calculation_time should be non-negative");
}

#[tokio::test]
async fn test_given_fen_is_used() {
    let app = test_router().await;

    let response = app
        .oneshot(get_move_request(json!({ "fen": BLACK_TO_MOVE_FEN })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["move"], "e7e5");
}

#[tokio::test]
async fn test_mated_position_returns_null_move() {
    let app = test_router().await;

    let response = app
        .oneshot(get_move_request(json!({ "fen": MATED_FEN })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert!(body["move"].is_null());
    assert!(body["calculation_time"].is_number());
}

#[tokio::test]
async fn test_malformed_fen_then_valid_request() {
    let app = test_router().await;

    let response = app
        .clone()
        .oneshot(get_move_request(json!({ "fen": "rnbqkbnr/pppppppp w" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = json_body(response).await;
    let error = body["error"].as_str().unwrap();
    assert!(!error.is_empty());
    assert!(body.get("move").is_none());

    // Shared engine must still be usable
    let response = app.oneshot(get_move_request(json!({}))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["move"], "e2e4");
}

#[tokio::test]
async fn test_malformed_json_is_a_server_error() {
    let app = test_router().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/get-move")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().starts_with("Malformed request"));
}

#[tokio::test]
async fn test_missing_content_type_is_a_server_error() {
    let app = test_router().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/get-move")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json_body(response).await.get("error").is_some());
}

#[tokio::test]
async fn test_concurrent_requests_get_their_own_moves() {
    let app = test_router().await;

    let white = app.clone().oneshot(get_move_request(json!({})));
    let black = app
        .clone()
        .oneshot(get_move_request(json!({ "fen": BLACK_TO_MOVE_FEN })));
    let mated = app.oneshot(get_move_request(json!({ "fen": MATED_FEN })));

    let (white, black, mated) = tokio::join!(white, black, mated);

    assert_eq!(json_body(white.unwrap()).await["move"], "e2e4");
    assert_eq!(json_body(black.unwrap()).await["move"], "e7e5");
    assert!(json_body(mated.unwrap()).await["move"].is_null());
}

#[tokio::test]
async fn test_client_hanging_up_does_not_corrupt_next_request() {
    let app = test_router().await;

    // Engine stalls on this position until the watchdog sends `stop`
    let abandoned = tokio::time::timeout(
        Duration::from_millis(100),
        app.clone()
            .oneshot(get_move_request(json!({ "fen": STALLING_FEN }))),
    )
    .await;
    assert!(abandoned.is_err(), "stalled search should still be running");

    // Waits for the abandoned search, then must get its own move
    let response = app
        .clone()
        .oneshot(get_move_request(json!({ "fen": BLACK_TO_MOVE_FEN })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["move"], "e7e5");

    let response = app.oneshot(get_move_request(json!({}))).await.unwrap();
    assert_eq!(json_body(response).await["move"], "e2e4");
}

#[tokio::test]
async fn test_options_returns_empty_ok() {
    let app = test_router().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/get-move")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_options_works_with_engine_down() {
    let app = dead_engine_router();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/get-move")
                .header("origin", "http://localhost:3000")
                .header("access-control-request-method", "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://localhost:3000"
    );
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_unknown_origin_gets_no_cors_header() {
    let app = test_router().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/get-move")
                .header("origin", "https://elsewhere.example")
                .header("access-control-request-method", "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response
        .headers()
        .get("access-control-allow-origin")
        .is_none());
}

#[tokio::test]
async fn test_dead_engine_get_move_is_a_server_error() {
    let app = dead_engine_router();

    let response = app.oneshot(get_move_request(json!({}))).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Engine unavailable"));
}

#[tokio::test]
async fn test_health_reports_engine_state() {
    let app = test_router().await;
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({ "status": "ok", "engine": "ready" })
    );

    let app = dead_engine_router();
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(response).await["engine"], "uninitialized");
}
