//! Core domain logic for the lexicon store.
//! This crate is the single source of truth for word and review invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::review::{ReviewEvent, ReviewOutcome};
pub use model::word::{
    NewWord, NewWordInput, Relevance, Word, WordId, WordSummary, WordValidationError,
};
pub use repo::review_repo::{ReviewRepository, SqliteReviewRepository};
pub use repo::word_repo::{
    FilteredWords, RepoError, RepoResult, SqliteWordRepository, WordFilter, WordRepository,
};
pub use search::fts::{search_words, SearchError, SearchQuery, SearchResult};
pub use service::review_service::ReviewService;
pub use service::word_service::{
    clamp_limit, clean_query, CountWordsRequest, FindWordsRequest, SearchStrategy, ServiceError,
    ServiceResult, WordPage, WordService,
};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
