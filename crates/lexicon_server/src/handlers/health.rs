//! Unauthenticated health probe.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// `present` or `not set`; never the key itself.
    #[serde(rename = "apiKey")]
    pub api_key: &'static str,
    /// `ok` when the store answers a trivial query, `unavailable` otherwise.
    pub database: &'static str,
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = state
        .with_connection(|conn| {
            conn.query_row("SELECT 1;", [], |row| row.get::<_, i64>(0))
                .map_err(|err| ApiError::Storage(err.to_string()))
        })
        .await
        .map_or("unavailable", |_| "ok");

    Json(HealthResponse {
        status: lexicon_core::ping(),
        version: lexicon_core::core_version(),
        api_key: if state.config().api_key.is_some() {
            "present"
        } else {
            "not set"
        },
        database,
    })
}
