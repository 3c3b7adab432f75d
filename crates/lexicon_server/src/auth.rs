//! Shared-key admission check for core routes.
//!
//! Runs before any handler, so a rejected request never reaches the backend.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use log::{debug, warn};

pub const API_KEY_HEADER: &str = "x-api-key";

/// Middleware that admits a request only when `X-API-Key` matches the
/// configured key. No configured key means nothing is admitted.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.config().api_key.as_deref() else {
        warn!("event=auth module=http status=rejected reason=key_not_configured");
        return Err(ApiError::Unauthorized);
    };

    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    match provided {
        Some(key) if key == expected => Ok(next.run(request).await),
        Some(_) => {
            warn!(
                "event=auth module=http status=rejected reason=key_mismatch path={}",
                request.uri().path()
            );
            Err(ApiError::Unauthorized)
        }
        None => {
            debug!(
                "event=auth module=http status=rejected reason=key_missing path={}",
                request.uri().path()
            );
            Err(ApiError::Unauthorized)
        }
    }
}
