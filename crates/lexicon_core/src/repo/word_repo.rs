//! Word repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide creation, lookup and filtered listing over canonical `words` storage.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths accept only normalized [`NewWord`] values.
//! - `word_key` uniqueness is enforced by the schema; a violation surfaces as
//!   [`RepoError::Conflict`] carrying the id of the entry that won.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::word::{
    description_key, word_key, NewWord, Relevance, Word, WordId, WordSummary,
};
use crate::search::fts::{search_words, SearchQuery, SearchResult};
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Column list shared by every query that materializes a [`Word`].
pub(crate) const WORD_COLUMNS: &str = "id,
    word,
    description,
    example,
    type,
    relevance,
    conjugations,
    collocations,
    review_count,
    last_review,
    created_at,
    updated_at";

/// [`WORD_COLUMNS`] qualified with the table name, for joins with `words_fts`.
pub(crate) const WORD_COLUMNS_QUALIFIED: &str = "words.id AS id,
    words.word AS word,
    words.description AS description,
    words.example AS example,
    words.type AS type,
    words.relevance AS relevance,
    words.conjugations AS conjugations,
    words.collocations AS collocations,
    words.review_count AS review_count,
    words.last_review AS last_review,
    words.created_at AS created_at,
    words.updated_at AS updated_at";

/// SQL expression for the current time in epoch milliseconds.
pub(crate) const NOW_MS_SQL: &str = "CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER)";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for word and review persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(WordId),
    /// Another entry already owns the same case-insensitive word.
    Conflict(WordId),
    MissingRequiredTable(&'static str),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "word not found: {id}"),
            Self::Conflict(id) => write!(f, "word already exists: {id}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing; run migrations first")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted word data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Substring and exact-match filters for the pattern listing path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordFilter {
    /// Case-insensitive substring matched against `word` OR `description`.
    pub text: Option<String>,
    /// Exact `type` match.
    pub kind: Option<String>,
    /// Exact `relevance` match.
    pub relevance: Option<String>,
}

/// One bounded page of filtered words plus the unbounded match count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredWords {
    pub items: Vec<Word>,
    pub total: u64,
}

/// Repository interface for word persistence and retrieval.
pub trait WordRepository {
    /// Case-insensitive exact match on `word`.
    fn find_by_word(&self, word: &str) -> RepoResult<Option<Word>>;
    /// Inserts a new entry with a zero review counter.
    fn insert_word(&self, word: &NewWord) -> RepoResult<Word>;
    /// Backend-ranked full-text search. Callers may fall back on error.
    fn ranked_search(&self, query: &SearchQuery) -> SearchResult<Vec<Word>>;
    /// Substring/exact-filter listing ordered by creation time ascending.
    fn list_filtered(&self, filter: &WordFilter, limit: u32) -> RepoResult<FilteredWords>;
    fn count_filtered(&self, filter: &WordFilter) -> RepoResult<u64>;
    /// Earliest-created entry, if any.
    fn first_word(&self) -> RepoResult<Option<WordSummary>>;
}

/// SQLite-backed word repository.
pub struct SqliteWordRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteWordRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - [`RepoError::MissingRequiredTable`] when migrations were not applied.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables_exist(conn, &["words", "words_fts"])?;
        Ok(Self { conn })
    }
}

impl WordRepository for SqliteWordRepository<'_> {
    fn find_by_word(&self, word: &str) -> RepoResult<Option<Word>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {WORD_COLUMNS} FROM words WHERE word_key = ?1;"))?;
        let mut rows = stmt.query([word_key(word)])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_word_row(row)?)),
            None => Ok(None),
        }
    }

    fn insert_word(&self, word: &NewWord) -> RepoResult<Word> {
        let id = Uuid::new_v4();
        let inserted = self.conn.query_row(
            &format!(
                "INSERT INTO words (
                    id,
                    word,
                    word_key,
                    description,
                    example,
                    type,
                    relevance,
                    conjugations,
                    collocations,
                    review_count,
                    last_review,
                    description_key
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0, ?10, ?11)
                RETURNING {WORD_COLUMNS};"
            ),
            params![
                id.to_string(),
                word.word.as_str(),
                word.key(),
                word.description.as_deref(),
                word.example.as_deref(),
                word.kind.as_deref(),
                word.relevance.as_str(),
                word.conjugations.as_deref(),
                word.collocations.as_deref(),
                word.last_review.map(|ts| ts.timestamp_millis()),
                word.description_key(),
            ],
            |row| Ok(parse_word_row(row)),
        );

        match inserted {
            Ok(parsed) => parsed,
            Err(err) => {
                let err = DbError::from(err);
                if !err.is_unique_violation() {
                    return Err(err.into());
                }
                match self.find_by_word(&word.word)? {
                    Some(existing) => Err(RepoError::Conflict(existing.id)),
                    None => Err(err.into()),
                }
            }
        }
    }

    fn ranked_search(&self, query: &SearchQuery) -> SearchResult<Vec<Word>> {
        search_words(self.conn, query)
    }

    fn list_filtered(&self, filter: &WordFilter, limit: u32) -> RepoResult<FilteredWords> {
        let clause = build_filter_clause(filter);

        let mut sql = format!("SELECT {WORD_COLUMNS} FROM words WHERE 1 = 1{}", clause.sql);
        sql.push_str(" ORDER BY words.created_at ASC, words.rowid ASC LIMIT ?");
        let mut bind_values = clause.bind_values.clone();
        bind_values.push(Value::Integer(i64::from(limit)));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_word_row(row)?);
        }

        let total = count_with_clause(self.conn, &clause)?;
        Ok(FilteredWords { items, total })
    }

    fn count_filtered(&self, filter: &WordFilter) -> RepoResult<u64> {
        count_with_clause(self.conn, &build_filter_clause(filter))
    }

    fn first_word(&self) -> RepoResult<Option<WordSummary>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, word, created_at
                 FROM words
                 ORDER BY created_at ASC, rowid ASC
                 LIMIT 1;",
                [],
                |row| {
                    Ok((
                        row.get::<_, String>("id")?,
                        row.get::<_, String>("word")?,
                        row.get::<_, i64>("created_at")?,
                    ))
                },
            )
            .optional()?;

        let Some((id_text, word, created_at)) = row else {
            return Ok(None);
        };

        Ok(Some(WordSummary {
            id: parse_word_id(&id_text)?,
            word,
            created_at: millis_to_datetime(created_at, "created_at")?,
        }))
    }
}

struct FilterClause {
    sql: String,
    bind_values: Vec<Value>,
}

fn build_filter_clause(filter: &WordFilter) -> FilterClause {
    let mut sql = String::new();
    let mut bind_values = Vec::new();

    if let Some(text) = filter.text.as_deref().filter(|text| !text.is_empty()) {
        // Both key columns are stored Unicode-lower-cased; fold the pattern
        // the same way since `LIKE` only folds ASCII.
        let pattern = format!("%{}%", escape_like_pattern(&description_key(text)));
        sql.push_str(
            " AND (words.word_key LIKE ? ESCAPE '\\' OR words.description_key LIKE ? ESCAPE '\\')",
        );
        bind_values.push(Value::Text(pattern.clone()));
        bind_values.push(Value::Text(pattern));
    }

    if let Some(kind) = filter.kind.as_deref() {
        sql.push_str(" AND words.type = ?");
        bind_values.push(Value::Text(kind.to_string()));
    }

    if let Some(relevance) = filter.relevance.as_deref() {
        sql.push_str(" AND words.relevance = ?");
        bind_values.push(Value::Text(relevance.to_string()));
    }

    FilterClause { sql, bind_values }
}

fn count_with_clause(conn: &Connection, clause: &FilterClause) -> RepoResult<u64> {
    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM words WHERE 1 = 1{};", clause.sql),
        params_from_iter(clause.bind_values.iter()),
        |row| row.get(0),
    )?;
    u64::try_from(count).map_err(|_| RepoError::InvalidData(format!("negative count {count}")))
}

/// Escapes LIKE metacharacters so caller text matches literally.
///
/// Uses `\` as the escape character; queries must declare `ESCAPE '\'`.
pub fn escape_like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

pub(crate) fn parse_word_row(row: &Row<'_>) -> RepoResult<Word> {
    let id_text: String = row.get("id")?;
    let id = parse_word_id(&id_text)?;

    let relevance_text: String = row.get("relevance")?;
    let relevance = Relevance::parse(&relevance_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid relevance `{relevance_text}` in words.relevance"
        ))
    })?;

    let review_count_raw: i64 = row.get("review_count")?;
    let review_count = u32::try_from(review_count_raw).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid review_count `{review_count_raw}` in words.review_count"
        ))
    })?;

    let last_review = match row.get::<_, Option<i64>>("last_review")? {
        Some(ms) => Some(millis_to_datetime(ms, "last_review")?),
        None => None,
    };

    Ok(Word {
        id,
        word: row.get("word")?,
        description: row.get("description")?,
        example: row.get("example")?,
        kind: row.get("type")?,
        relevance,
        conjugations: row.get("conjugations")?,
        collocations: row.get("collocations")?,
        review_count,
        last_review,
        created_at: millis_to_datetime(row.get("created_at")?, "created_at")?,
        updated_at: millis_to_datetime(row.get("updated_at")?, "updated_at")?,
    })
}

pub(crate) fn parse_word_id(value: &str) -> RepoResult<WordId> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid word id `{value}`")))
}

pub(crate) fn millis_to_datetime(ms: i64, column: &str) -> RepoResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid timestamp `{ms}` in {column}")))
}

pub(crate) fn ensure_tables_exist(conn: &Connection, tables: &[&'static str]) -> RepoResult<()> {
    for &table in tables {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::escape_like_pattern;

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(escape_like_pattern("100%"), "100\\%");
        assert_eq!(escape_like_pattern("a_b"), "a\\_b");
        assert_eq!(escape_like_pattern("c:\\dir"), "c:\\\\dir");
    }

    #[test]
    fn commas_and_plain_text_pass_through() {
        assert_eq!(escape_like_pattern("run, ran"), "run, ran");
    }
}
