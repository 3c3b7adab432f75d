//! SQLite FTS5-based ranked word search.
//!
//! # Responsibility
//! - Provide relevance-ranked lookup over `word`, `description` and `example`.
//! - Return fully materialized words so callers can use hits directly.
//!
//! # Invariants
//! - Result ordering is deterministic: `bm25`, then creation time, then rowid.
//! - Every query term is quoted, so user text cannot inject FTS5 operators.

use crate::db::DbError;
use crate::model::word::Word;
use crate::repo::word_repo::{parse_word_row, RepoError, WORD_COLUMNS_QUALIFIED};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type for search APIs.
pub type SearchResult<T> = Result<T, SearchError>;

/// Search-layer error for DB interaction and result decoding.
#[derive(Debug)]
pub enum SearchError {
    Db(DbError),
    InvalidData(String),
}

impl Display for SearchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid search row: {message}"),
        }
    }
}

impl Error for SearchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for SearchError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SearchError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<RepoError> for SearchError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Db(err) => Self::Db(err),
            other => Self::InvalidData(other.to_string()),
        }
    }
}

/// Search options for ranked lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Cleaned user query text.
    pub text: String,
    /// Optional exact `type` filter.
    pub kind: Option<String>,
    /// Optional exact `relevance` filter.
    pub relevance: Option<String>,
    /// Maximum number of hits to return.
    pub limit: u32,
}

impl SearchQuery {
    /// Creates a query with default limit and no filters.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: None,
            relevance: None,
            limit: 20,
        }
    }
}

/// Searches words via FTS5 and returns ranked results.
///
/// Returns an empty list for blank queries or a zero limit.
pub fn search_words(conn: &Connection, query: &SearchQuery) -> SearchResult<Vec<Word>> {
    let Some(match_expr) = build_match_expression(query) else {
        return Ok(Vec::new());
    };

    if query.limit == 0 {
        return Ok(Vec::new());
    }

    let mut sql = format!(
        "SELECT {WORD_COLUMNS_QUALIFIED}
         FROM words_fts
         JOIN words ON words.rowid = words_fts.rowid
         WHERE words_fts MATCH ?"
    );
    let mut bind_values: Vec<Value> = vec![Value::Text(match_expr)];

    if let Some(kind) = query.kind.as_deref() {
        sql.push_str(" AND words.type = ?");
        bind_values.push(Value::Text(kind.to_string()));
    }

    if let Some(relevance) = query.relevance.as_deref() {
        sql.push_str(" AND words.relevance = ?");
        bind_values.push(Value::Text(relevance.to_string()));
    }

    sql.push_str(" ORDER BY bm25(words_fts), words.created_at ASC, words.rowid ASC LIMIT ?");
    bind_values.push(Value::Integer(i64::from(query.limit)));

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut hits = Vec::new();

    while let Some(row) = rows.next()? {
        hits.push(parse_word_row(row)?);
    }

    Ok(hits)
}

/// Builds the FTS5 MATCH expression for a query.
///
/// Each whitespace-separated term becomes a quoted prefix phrase and terms
/// are joined with `AND`, so `run fast` matches `running faster`.
fn build_match_expression(query: &SearchQuery) -> Option<String> {
    let text = query.text.trim();
    if text.is_empty() {
        return None;
    }

    let terms = text
        .split_whitespace()
        .map(escape_fts_term)
        .collect::<Vec<_>>();

    if terms.is_empty() {
        return None;
    }

    Some(terms.join(" AND "))
}

fn escape_fts_term(raw: &str) -> String {
    let escaped = raw.replace('"', "\"\"");
    format!("\"{escaped}\"*")
}
