//! Axum router configuration.
//!
//! ```text
//! /words                    POST create, GET search     (API key)
//! /words/count              GET count                   (API key)
//! /words/first              GET earliest entry          (API key)
//! /reviews/:id/increment    POST record review          (API key)
//! /health                   GET probe                   (open)
//! ```
//!
//! The API-key layer wraps each core route including its method fallback,
//! so an unauthenticated request is rejected before method dispatch.

use crate::auth::require_api_key;
use crate::error::method_not_allowed;
use crate::handlers::health::health;
use crate::handlers::reviews::increment_review;
use crate::handlers::words::{count_words, create_word, first_word, list_words};
use crate::state::AppState;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

/// Builds the complete router over the given state.
pub fn build_router(state: AppState) -> Router {
    let core = Router::new()
        .route(
            "/words",
            post(create_word)
                .get(list_words)
                .fallback(method_not_allowed),
        )
        .route(
            "/words/count",
            get(count_words).fallback(method_not_allowed),
        )
        .route(
            "/words/first",
            get(first_word).fallback(method_not_allowed),
        )
        .route(
            "/reviews/:id/increment",
            post(increment_review).fallback(method_not_allowed),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    Router::new()
        .merge(core)
        .route("/health", get(health))
        .with_state(state)
}
