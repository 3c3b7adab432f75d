use lexicon_core::db::open_db_in_memory;
use lexicon_core::{
    NewWord, NewWordInput, Relevance, RepoError, SqliteWordRepository, WordFilter, WordRepository,
};
use rusqlite::Connection;

fn new_word(word: &str, description: Option<&str>) -> NewWord {
    NewWord::from_input(NewWordInput {
        word: Some(word.to_string()),
        description: description.map(str::to_string),
        ..NewWordInput::default()
    })
    .unwrap()
}

#[test]
fn insert_and_find_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWordRepository::try_new(&conn).unwrap();

    let mut input = new_word("laufen", Some("to run"));
    input.kind = Some("verb".to_string());
    input.relevance = Relevance::High;
    let stored = repo.insert_word(&input).unwrap();

    let loaded = repo.find_by_word("laufen").unwrap().unwrap();
    assert_eq!(loaded, stored);
    assert_eq!(loaded.word, "laufen");
    assert_eq!(loaded.kind.as_deref(), Some("verb"));
    assert_eq!(loaded.relevance, Relevance::High);
    assert_eq!(loaded.review_count, 0);
    assert_eq!(loaded.last_review, None);
    assert!(loaded.updated_at >= loaded.created_at);
}

#[test]
fn find_by_word_is_case_insensitive() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWordRepository::try_new(&conn).unwrap();
    let stored = repo.insert_word(&new_word("Über", None)).unwrap();

    let found = repo.find_by_word("  über ").unwrap().unwrap();
    assert_eq!(found.id, stored.id);
    assert!(repo.find_by_word("uber").unwrap().is_none());
}

#[test]
fn duplicate_insert_maps_unique_violation_to_conflict() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWordRepository::try_new(&conn).unwrap();
    let first = repo.insert_word(&new_word("Haus", None)).unwrap();

    let err = repo.insert_word(&new_word("HAUS", None)).unwrap_err();
    assert!(matches!(err, RepoError::Conflict(id) if id == first.id));
    assert_eq!(repo.count_filtered(&WordFilter::default()).unwrap(), 1);
}

#[test]
fn list_filtered_orders_by_creation_and_reports_total_before_limit() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWordRepository::try_new(&conn).unwrap();
    let a = repo.insert_word(&new_word("alpha", None)).unwrap();
    let b = repo.insert_word(&new_word("beta", None)).unwrap();
    repo.insert_word(&new_word("gamma", None)).unwrap();

    let page = repo.list_filtered(&WordFilter::default(), 2).unwrap();
    let ids: Vec<_> = page.items.iter().map(|word| word.id).collect();
    assert_eq!(ids, vec![a.id, b.id]);
    assert_eq!(page.total, 3);
}

#[test]
fn list_filtered_matches_word_or_description_substring() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWordRepository::try_new(&conn).unwrap();
    let by_word = repo.insert_word(&new_word("Rennen", None)).unwrap();
    let by_description = repo
        .insert_word(&new_word("laufen", Some("to RUN slowly")))
        .unwrap();
    repo.insert_word(&new_word("sitzen", Some("to sit"))).unwrap();

    let filter = WordFilter {
        text: Some("ren".to_string()),
        ..WordFilter::default()
    };
    let page = repo.list_filtered(&filter, 10).unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, by_word.id);

    let filter = WordFilter {
        text: Some("run".to_string()),
        ..WordFilter::default()
    };
    let page = repo.list_filtered(&filter, 10).unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, by_description.id);
}

#[test]
fn list_filtered_treats_pattern_characters_and_commas_literally() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWordRepository::try_new(&conn).unwrap();
    let literal = repo
        .insert_word(&new_word("ganz, ganz", Some("100% sure")))
        .unwrap();
    repo.insert_word(&new_word("ganzheit", Some("1000 sure"))).unwrap();

    for text in ["z, g", "100%", "0_"] {
        let filter = WordFilter {
            text: Some(text.to_string()),
            ..WordFilter::default()
        };
        let page = repo.list_filtered(&filter, 10).unwrap();
        let expected = usize::from(text != "0_");
        assert_eq!(page.items.len(), expected, "query `{text}`");
        if expected == 1 {
            assert_eq!(page.items[0].id, literal.id);
        }
    }
}

#[test]
fn list_filtered_applies_exact_type_and_relevance_filters() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWordRepository::try_new(&conn).unwrap();

    let mut verb = new_word("gehen", None);
    verb.kind = Some("verb".to_string());
    verb.relevance = Relevance::High;
    let verb = repo.insert_word(&verb).unwrap();

    let mut noun = new_word("Gang", None);
    noun.kind = Some("noun".to_string());
    repo.insert_word(&noun).unwrap();

    let filter = WordFilter {
        text: Some("g".to_string()),
        kind: Some("verb".to_string()),
        relevance: Some("high".to_string()),
    };
    let page = repo.list_filtered(&filter, 10).unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, verb.id);

    let filter = WordFilter {
        kind: Some("Verb".to_string()),
        ..WordFilter::default()
    };
    assert_eq!(repo.count_filtered(&filter).unwrap(), 0);
}

#[test]
fn first_word_returns_earliest_entry_or_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWordRepository::try_new(&conn).unwrap();
    assert!(repo.first_word().unwrap().is_none());

    let first = repo.insert_word(&new_word("eins", None)).unwrap();
    repo.insert_word(&new_word("zwei", None)).unwrap();

    let summary = repo.first_word().unwrap().unwrap();
    assert_eq!(summary.id, first.id);
    assert_eq!(summary.word, "eins");
    assert_eq!(summary.created_at, first.created_at);
}

#[test]
fn try_new_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteWordRepository::try_new(&conn).err().unwrap();
    assert!(matches!(err, RepoError::MissingRequiredTable("words")));
}

#[test]
fn description_substring_match_folds_non_ascii_case() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWordRepository::try_new(&conn).unwrap();
    let stored = repo
        .insert_word(&new_word("Fleiß", Some("Übung macht den Meister")))
        .unwrap();
    repo.insert_word(&new_word("Ordnung", Some("ist das halbe Leben")))
        .unwrap();

    for text in ["übung", "Übung", "ÜBUNG MACHT", "meister"] {
        let filter = WordFilter {
            text: Some(text.to_string()),
            ..WordFilter::default()
        };
        let page = repo.list_filtered(&filter, 10).unwrap();
        assert_eq!(page.total, 1, "filter `{text}`");
        assert_eq!(page.items[0].id, stored.id);
        assert_eq!(repo.count_filtered(&filter).unwrap(), 1);
    }
    assert_eq!(
        stored.description.as_deref(),
        Some("Übung macht den Meister")
    );
}
