use lexicon_core::db::migrations::{apply_migrations, latest_version};
use lexicon_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "words");
    assert_table_exists(&conn, "reviews");
    assert_table_exists(&conn, "words_fts");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lexicon.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute_batch(
            "INSERT INTO words (id, word, word_key)
             VALUES ('11111111-2222-4333-8444-555555555555', 'Haus', 'haus');",
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let count: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM words;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn fts_migration_indexes_words_created_before_it() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(include_str!("../src/db/migrations/0001_init.sql"))
        .unwrap();
    conn.execute_batch(
        "INSERT INTO words (id, word, word_key, description)
         VALUES ('11111111-2222-4333-8444-555555555555', 'Gedächtnis', 'gedächtnis', 'memory');",
    )
    .unwrap();
    conn.execute_batch("PRAGMA user_version = 1;").unwrap();

    apply_migrations(&mut conn).unwrap();
    assert_eq!(schema_version(&conn), latest_version());

    let hits: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM words_fts WHERE words_fts MATCH 'memory';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(hits, 1);
}

#[test]
fn description_key_migration_folds_existing_descriptions() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(include_str!("../src/db/migrations/0001_init.sql"))
        .unwrap();
    conn.execute_batch(include_str!("../src/db/migrations/0002_words_fts.sql"))
        .unwrap();
    conn.execute_batch(
        "INSERT INTO words (id, word, word_key, description)
         VALUES ('11111111-2222-4333-8444-555555555555', 'Fleiß', 'fleiß', 'Übung macht den Meister');
         INSERT INTO words (id, word, word_key)
         VALUES ('22222222-3333-4444-8555-666666666666', 'leer', 'leer');
         PRAGMA user_version = 2;",
    )
    .unwrap();

    apply_migrations(&mut conn).unwrap();
    assert_eq!(schema_version(&conn), latest_version());

    let keys: Vec<Option<String>> = conn
        .prepare("SELECT description_key FROM words ORDER BY rowid;")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(
        keys,
        vec![Some("übung macht den meister".to_string()), None]
    );
}

#[test]
fn reviews_require_an_existing_word() {
    let conn = open_db_in_memory().unwrap();
    let err = conn
        .execute(
            "INSERT INTO reviews (word_id, correct) VALUES ('missing', 1);",
            [],
        )
        .unwrap_err();
    assert!(err.to_string().to_lowercase().contains("foreign key"));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
