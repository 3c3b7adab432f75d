//! `/reviews/{id}/increment` handler.

use crate::error::ApiError;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use lexicon_core::{ReviewService, SqliteReviewRepository, WordId};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct IncrementResponse {
    pub ok: bool,
    pub id: WordId,
    #[serde(rename = "reviewCount")]
    pub review_count: u32,
    #[serde(rename = "lastReviewedAt")]
    pub last_reviewed_at: DateTime<Utc>,
}

/// `POST /reviews/{id}/increment`
///
/// An id that is not a valid word identifier cannot name a stored word and
/// is answered as not found.
pub async fn increment_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<IncrementResponse>, ApiError> {
    let word_id = Uuid::parse_str(id.trim())
        .map_err(|_| ApiError::NotFound("word not found".to_string()))?;
    let correct = parse_correct(&body);

    let outcome = state
        .with_connection(move |conn| {
            let service = ReviewService::new(SqliteReviewRepository::try_new(conn)?);
            Ok(service.record_review(word_id, correct)?)
        })
        .await?;

    Ok(Json(IncrementResponse {
        ok: true,
        id: outcome.id,
        review_count: outcome.review_count,
        last_reviewed_at: outcome.last_review,
    }))
}

/// Reads `correct` from a JSON body, defaulting to `false` for anything
/// other than a JSON boolean, including unparseable bodies.
fn parse_correct(body: &[u8]) -> bool {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|value| value.get("correct").and_then(Value::as_bool))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::parse_correct;

    #[test]
    fn correct_flag_is_read_defensively() {
        assert!(parse_correct(br#"{"correct": true}"#));
        assert!(!parse_correct(br#"{"correct": false}"#));
        assert!(!parse_correct(br#"{"correct": "yes"}"#));
        assert!(!parse_correct(br#"{"correct": 1}"#));
        assert!(!parse_correct(br#"{}"#));
        assert!(!parse_correct(b""));
        assert!(!parse_correct(b"{not json"));
        assert!(!parse_correct(b"[true]"));
    }
}
