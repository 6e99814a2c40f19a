//! # Tally Server
//!
//! HTTP/JSON API for shared-bill splitting.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Tally Server                                    │
//! │                                                                         │
//! │  Client ───► HTTP/JSON (8080) ───► handlers ───► tally-core             │
//! │                                        │         (split engine,         │
//! │                                        │          receipt extractor)    │
//! │                                        ▼                                │
//! │                                    tally-db ───► SQLite (WAL)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod state;

use std::net::SocketAddr;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tally_db::{Database, DbConfig};

use crate::config::AppConfig;
use crate::state::AppState;

/// Builds the application router. Separate from `main` so tests can drive
/// it without binding a socket.
fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/bills",
            get(handlers::bills::list_bills).post(handlers::bills::create_bill),
        )
        .route(
            "/api/bills/{id}",
            get(handlers::bills::get_bill).delete(handlers::bills::delete_bill),
        )
        .route("/api/bills/{id}/items", post(handlers::bills::add_item))
        .route("/api/bills/{id}/split", get(handlers::bills::get_split))
        .route("/api/receipts/parse", post(handlers::receipts::parse_receipt))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };
    info!(
        port = config.port,
        db_path = %config.database_path.display(),
        "configuration loaded"
    );

    let db = match Database::new(DbConfig::new(&config.database_path)).await {
        Ok(db) => db,
        Err(e) => {
            error!(error = %e, "failed to open database");
            std::process::exit(1);
        }
    };

    let app = router(AppState::new(db));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on {addr}");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, "failed to bind on {addr}");
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server error");
        std::process::exit(1);
    }
}

// =============================================================================
// Router Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    async fn test_app() -> Router {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        router(AppState::new(db))
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app().await;
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_then_split_over_http() {
        let app = test_app().await;

        let create = json_request(
            "POST",
            "/api/bills",
            serde_json::json!({
                "title": "Lunch",
                "tip_policy": { "type": "percentage", "rate_bps": 1000 },
                "participants": [
                    { "id": "p1", "name": "Alice" },
                    { "id": "p2", "name": "Bob" },
                    { "id": "p3", "name": "Carol" }
                ],
                "items": [
                    { "name": "Pasta", "price": 10.0 }
                ]
            }),
        );

        let response = app.clone().oneshot(create).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let bill: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let bill_id = bill["id"].as_str().unwrap();

        let response = app
            .oneshot(
                Request::get(format!("/api/bills/{bill_id}/split"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let split: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(split["grand_total"], 1100);
        assert_eq!(split["shares"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_validation_error_body() {
        let app = test_app().await;

        let create = json_request(
            "POST",
            "/api/bills",
            serde_json::json!({ "title": "", "participants": [] }),
        );

        let response = app.oneshot(create).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(error["code"], "validation_failed");
        assert!(error["errors"].as_array().unwrap().len() >= 2);
    }

    #[tokio::test]
    async fn test_unknown_bill_is_404() {
        let app = test_app().await;
        let response = app
            .oneshot(
                Request::get("/api/bills/bill_nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_parse_receipt_endpoint() {
        let app = test_app().await;
        let response = app
            .oneshot(json_request(
                "POST",
                "/api/receipts/parse",
                serde_json::json!({ "text": "Coffee 3.50\nTotal 3.50" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["items"].as_array().unwrap().len(), 1);
        assert_eq!(parsed["items"][0]["name"], "Coffee");
    }
}
