//! SQLite migration registry and executor.
//!
//! # Responsibility
//! - Register schema migrations in strictly increasing order.
//! - Apply pending migrations atomically.
//!
//! # Invariants
//! - `version` values must remain monotonic.
//! - Applied migration version is mirrored to `PRAGMA user_version`.
//! - Each migration runs inside the same transaction as its version bump.
//! - Data backfills that need Rust-side logic run right after their SQL, in
//!   the same transaction.

use crate::db::{DbError, DbResult};
use crate::model::word::description_key;
use log::info;
use rusqlite::{params, Connection, Transaction};

#[derive(Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
    backfill: Option<fn(&Transaction<'_>) -> DbResult<()>>,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        sql: include_str!("0001_init.sql"),
        backfill: None,
    },
    Migration {
        version: 2,
        sql: include_str!("0002_words_fts.sql"),
        backfill: None,
    },
    Migration {
        version: 3,
        sql: include_str!("0003_words_description_key.sql"),
        backfill: Some(backfill_description_keys),
    },
];

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Applies all pending migrations on the provided connection.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let current_version = current_user_version(conn)?;
    let latest = latest_version();

    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: latest,
        });
    }

    if current_version == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in pending_migrations(current_version) {
        info!(
            "event=db_migrate module=db status=apply from={} to={}",
            current_version, migration.version
        );
        tx.execute_batch(migration.sql)?;
        if let Some(backfill) = migration.backfill {
            backfill(&tx)?;
        }
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
    }
    tx.commit()?;

    Ok(())
}

fn pending_migrations(current_version: u32) -> impl Iterator<Item = &'static Migration> {
    MIGRATIONS
        .iter()
        .filter(move |migration| migration.version > current_version)
}

/// Fills `description_key` for rows written before the column existed.
///
/// SQLite's `lower()` folds ASCII only, so folding happens here.
fn backfill_description_keys(tx: &Transaction<'_>) -> DbResult<()> {
    let rows = {
        let mut stmt = tx.prepare(
            "SELECT rowid, description
             FROM words
             WHERE description IS NOT NULL AND description_key IS NULL;",
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        rows
    };

    let mut update = tx.prepare("UPDATE words SET description_key = ?1 WHERE rowid = ?2;")?;
    for (rowid, description) in &rows {
        update.execute(params![description_key(description), rowid])?;
    }
    info!(
        "event=db_migrate module=db status=backfill column=description_key rows={}",
        rows.len()
    );
    Ok(())
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::{latest_version, pending_migrations, MIGRATIONS};

    #[test]
    fn migration_versions_are_strictly_increasing() {
        for pair in MIGRATIONS.windows(2) {
            assert!(pair[0].version < pair[1].version);
        }
    }

    #[test]
    fn pending_migrations_skip_applied_versions() {
        assert_eq!(pending_migrations(0).count(), MIGRATIONS.len());
        assert_eq!(pending_migrations(1).count(), MIGRATIONS.len() - 1);
        assert_eq!(pending_migrations(latest_version()).count(), 0);
    }
}
