//! # Request Handlers
//!
//! One module per resource:
//! - [`bills`] - bill CRUD and split computation
//! - [`receipts`] - receipt text parsing
//!
//! Handlers stay thin: decode JSON, call into tally-core/tally-db, map
//! errors through [`crate::error::ApiError`].

pub mod bills;
pub mod receipts;

use axum::extract::State;
use axum::http::StatusCode;

use crate::state::AppState;

/// Liveness endpoint with a database ping.
pub async fn health(State(state): State<AppState>) -> Result<&'static str, StatusCode> {
    if state.db.health_check().await {
        Ok("OK")
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}
