//! Review repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Record one review attempt as a counter bump plus one immutable event.
//! - Expose the append-only review log for reconciliation and tests.
//!
//! # Invariants
//! - The counter update and the event insert commit together or not at all.
//! - The counter is advanced by a single `review_count + 1` statement; it is
//!   never computed from a previously read value.
//! - Review events are never updated or deleted.

use crate::model::review::{ReviewEvent, ReviewOutcome};
use crate::model::word::WordId;
use crate::repo::word_repo::{
    ensure_tables_exist, millis_to_datetime, parse_word_id, RepoError, RepoResult, NOW_MS_SQL,
};
use rusqlite::{params, Connection, Transaction, TransactionBehavior};

/// Repository interface for review recording.
pub trait ReviewRepository {
    /// Advances the word's counter, stamps `last_review`, and appends one event.
    ///
    /// # Errors
    /// - [`RepoError::NotFound`] when no word has this id; nothing is written.
    fn record_review(&self, word_id: WordId, correct: bool) -> RepoResult<ReviewOutcome>;
    /// Lists review events for one word, oldest first.
    fn list_reviews(&self, word_id: WordId) -> RepoResult<Vec<ReviewEvent>>;
}

/// SQLite-backed review repository.
pub struct SqliteReviewRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteReviewRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables_exist(conn, &["words", "reviews"])?;
        Ok(Self { conn })
    }
}

impl ReviewRepository for SqliteReviewRepository<'_> {
    fn record_review(&self, word_id: WordId, correct: bool) -> RepoResult<ReviewOutcome> {
        let id_text = word_id.to_string();
        // Write lock is held from the existence check through commit.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        if !word_exists_in_tx(&tx, &id_text)? {
            return Err(RepoError::NotFound(word_id));
        }

        let (returned_id, review_count, last_review) = tx.query_row(
            &format!(
                "UPDATE words
                 SET
                    review_count = COALESCE(review_count, 0) + 1,
                    last_review = {NOW_MS_SQL},
                    updated_at = {NOW_MS_SQL}
                 WHERE id = ?1
                 RETURNING id, review_count, last_review;"
            ),
            [id_text.as_str()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            },
        )?;

        tx.execute(
            "INSERT INTO reviews (word_id, correct) VALUES (?1, ?2);",
            params![id_text.as_str(), correct],
        )?;
        tx.commit()?;

        Ok(ReviewOutcome {
            id: parse_word_id(&returned_id)?,
            review_count: u32::try_from(review_count).map_err(|_| {
                RepoError::InvalidData(format!("invalid review_count `{review_count}`"))
            })?,
            last_review: millis_to_datetime(last_review, "last_review")?,
        })
    }

    fn list_reviews(&self, word_id: WordId) -> RepoResult<Vec<ReviewEvent>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, word_id, correct, created_at
             FROM reviews
             WHERE word_id = ?1
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([word_id.to_string()])?;
        let mut events = Vec::new();

        while let Some(row) = rows.next()? {
            let word_id_text: String = row.get("word_id")?;
            let correct = match row.get::<_, i64>("correct")? {
                0 => false,
                1 => true,
                other => {
                    return Err(RepoError::InvalidData(format!(
                        "invalid correct value `{other}` in reviews.correct"
                    )));
                }
            };
            events.push(ReviewEvent {
                id: row.get("id")?,
                word_id: parse_word_id(&word_id_text)?,
                correct,
                created_at: millis_to_datetime(row.get("created_at")?, "created_at")?,
            });
        }

        Ok(events)
    }
}

fn word_exists_in_tx(tx: &Transaction<'_>, word_id: &str) -> RepoResult<bool> {
    let exists: i64 = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM words WHERE id = ?1);",
        [word_id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
