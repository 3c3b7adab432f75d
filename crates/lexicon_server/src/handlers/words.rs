//! `/words` handlers: create, search, count, earliest entry.

use super::{LIST_CACHE_CONTROL, NO_STORE};
use crate::error::ApiError;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{header, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use lexicon_core::{
    CountWordsRequest, FindWordsRequest, NewWordInput, SqliteWordRepository, Word, WordService,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const SEARCH_STRATEGY_HEADER: HeaderName = HeaderName::from_static("x-search-strategy");

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub relevance: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CountParams {
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub relevance: Option<String>,
}

#[derive(Serialize)]
struct ItemResponse {
    item: Word,
}

#[derive(Serialize)]
struct ListResponse {
    items: Vec<Word>,
    #[serde(rename = "nbHits")]
    nb_hits: u64,
}

#[derive(Serialize)]
struct CountResponse {
    total: u64,
}

/// `POST /words`
pub async fn create_word(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let input = parse_new_word_body(&body)?;

    let word = state
        .with_connection(move |conn| {
            let service = WordService::new(SqliteWordRepository::try_new(conn)?);
            Ok(service.create_word(input)?)
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        [(header::CACHE_CONTROL, NO_STORE)],
        Json(ItemResponse { item: word }),
    )
        .into_response())
}

/// `GET /words?q&type&relevance&limit`
pub async fn list_words(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params?;
    let request = FindWordsRequest {
        q: params.q,
        kind: params.kind,
        relevance: params.relevance,
        limit: params.limit,
    };

    let page = state
        .with_connection(move |conn| {
            let service = WordService::new(SqliteWordRepository::try_new(conn)?);
            Ok(service.find_words(&request)?)
        })
        .await?;

    Ok((
        [
            (header::CACHE_CONTROL, LIST_CACHE_CONTROL),
            (SEARCH_STRATEGY_HEADER, page.strategy.as_str()),
        ],
        Json(ListResponse {
            items: page.items,
            nb_hits: page.nb_hits,
        }),
    )
        .into_response())
}

/// `GET /words/count?q&type&relevance`
pub async fn count_words(
    State(state): State<AppState>,
    params: Result<Query<CountParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params?;
    let request = CountWordsRequest {
        q: params.q,
        kind: params.kind,
        relevance: params.relevance,
    };

    let total = state
        .with_connection(move |conn| {
            let service = WordService::new(SqliteWordRepository::try_new(conn)?);
            Ok(service.count_words(&request)?)
        })
        .await?;

    Ok((
        [(header::CACHE_CONTROL, LIST_CACHE_CONTROL)],
        Json(CountResponse { total }),
    )
        .into_response())
}

/// `GET /words/first`
///
/// Responds with `{id, word, createdAt}` or JSON `null` for an empty store.
pub async fn first_word(State(state): State<AppState>) -> Result<Response, ApiError> {
    let first = state
        .with_connection(|conn| {
            let service = WordService::new(SqliteWordRepository::try_new(conn)?);
            Ok(service.first_word()?)
        })
        .await?;

    Ok(([(header::CACHE_CONTROL, LIST_CACHE_CONTROL)], Json(first)).into_response())
}

/// Parses a create body into raw input.
///
/// An empty body counts as `{}`. A JSON value that is not an object carries
/// no fields, so it fails later on the missing `word`.
fn parse_new_word_body(body: &[u8]) -> Result<NewWordInput, ApiError> {
    let fields = if body.iter().all(u8::is_ascii_whitespace) {
        Map::new()
    } else {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(fields)) => fields,
            Ok(_) => Map::new(),
            Err(_) => return Err(ApiError::InvalidBody),
        }
    };

    Ok(NewWordInput {
        word: text_field(&fields, "word"),
        description: text_field(&fields, "description"),
        example: text_field(&fields, "example"),
        kind: text_field(&fields, "type"),
        relevance: text_field(&fields, "relevance"),
        conjugations: text_field(&fields, "conjugations"),
        collocations: text_field(&fields, "collocations"),
        last_review: text_field(&fields, "last_review"),
    })
}

/// Reads a scalar field as text. Numbers and booleans are rendered; null,
/// arrays and objects count as absent.
fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::parse_new_word_body;
    use crate::error::ApiError;

    #[test]
    fn empty_body_parses_as_empty_input() {
        let input = parse_new_word_body(b"  ").unwrap();
        assert_eq!(input.word, None);
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = parse_new_word_body(b"{\"word\":").unwrap_err();
        assert!(matches!(err, ApiError::InvalidBody));
    }

    #[test]
    fn scalar_fields_are_coerced_to_text() {
        let input = parse_new_word_body(
            br#"{"word": 42, "type": true, "description": null, "example": ["x"], "review_count": 9}"#,
        )
        .unwrap();
        assert_eq!(input.word.as_deref(), Some("42"));
        assert_eq!(input.kind.as_deref(), Some("true"));
        assert_eq!(input.description, None);
        assert_eq!(input.example, None);
    }

    #[test]
    fn non_object_json_carries_no_fields() {
        let input = parse_new_word_body(b"[\"word\"]").unwrap();
        assert_eq!(input.word, None);
    }
}
