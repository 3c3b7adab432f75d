//! Word use-case service.
//!
//! # Responsibility
//! - Create entries with normalization and duplicate detection.
//! - Resolve search requests into ranked or fallback retrieval.
//! - Serve count and earliest-entry lookups.
//!
//! # Invariants
//! - A blank cleaned query never reaches ranked search.
//! - A ranked-search failure is logged and answered by the fallback path;
//!   only a fallback failure is surfaced to the caller.
//! - The applied limit always lies within `[MIN_LIMIT, MAX_LIMIT]`.

use crate::model::word::{NewWord, NewWordInput, Word, WordId, WordSummary, WordValidationError};
use crate::repo::word_repo::{RepoError, WordFilter, WordRepository};
use crate::search::fts::SearchQuery;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub const DEFAULT_LIMIT: u32 = 20;
pub const MIN_LIMIT: u32 = 1;
pub const MAX_LIMIT: u32 = 100;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error shared by word and review use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Required input missing or unusable.
    Validation(WordValidationError),
    /// Referenced word does not exist.
    NotFound(WordId),
    /// A word with the same case-insensitive text already exists.
    Conflict(WordId),
    /// Persistence-layer failure, surfaced with its message.
    Storage(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(_) => write!(f, "word not found"),
            Self::Conflict(_) => write!(f, "already exists"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<WordValidationError> for ServiceError {
    fn from(value: WordValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Conflict(id) => Self::Conflict(id),
            other => Self::Storage(other),
        }
    }
}

/// Which retrieval path produced a result page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
    /// Backend full-text search ordered by relevance.
    Ranked,
    /// Case-insensitive substring match ordered by creation time.
    Fallback,
}

impl SearchStrategy {
    /// Initial strategy for a cleaned query.
    ///
    /// Non-empty queries start ranked; empty ones go straight to fallback.
    pub fn initial(cleaned_query: &str) -> Self {
        if cleaned_query.is_empty() {
            Self::Fallback
        } else {
            Self::Ranked
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ranked => "ranked",
            Self::Fallback => "fallback",
        }
    }
}

/// Raw search request as received from a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindWordsRequest {
    pub q: Option<String>,
    pub kind: Option<String>,
    pub relevance: Option<String>,
    pub limit: Option<String>,
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordPage {
    pub items: Vec<Word>,
    /// Ranked: rows returned. Fallback: total matches before the limit.
    pub nb_hits: u64,
    pub strategy: SearchStrategy,
}

/// Raw count request as received from a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountWordsRequest {
    pub q: Option<String>,
    pub kind: Option<String>,
    pub relevance: Option<String>,
}

/// Use-case service for word creation and retrieval.
pub struct WordService<R: WordRepository> {
    repo: R,
}

impl<R: WordRepository> WordService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates, normalizes and stores a new word.
    ///
    /// # Contract
    /// - Missing `word` → [`ServiceError::Validation`].
    /// - Case-insensitive duplicate → [`ServiceError::Conflict`] with the
    ///   existing id; nothing is inserted.
    /// - Stored counter starts at zero whatever the caller sent.
    pub fn create_word(&self, input: NewWordInput) -> ServiceResult<Word> {
        let started_at = Instant::now();
        let new_word = NewWord::from_input(input)?;

        if let Some(existing) = self.repo.find_by_word(&new_word.word)? {
            info!(
                "event=word_create module=service status=conflict existing_id={} duration_ms={}",
                existing.id,
                started_at.elapsed().as_millis()
            );
            return Err(ServiceError::Conflict(existing.id));
        }

        // The unique index still guards the window between check and insert.
        let word = self.repo.insert_word(&new_word)?;
        info!(
            "event=word_create module=service status=ok id={} duration_ms={}",
            word.id,
            started_at.elapsed().as_millis()
        );
        Ok(word)
    }

    /// Resolves a search request into one page of words.
    ///
    /// # Contract
    /// - Query is cleaned by [`clean_query`]; limit by [`clamp_limit`].
    /// - Non-empty query: ranked search first; its success is final even
    ///   when empty. On ranked error: fallback.
    /// - Empty query: fallback only.
    pub fn find_words(&self, request: &FindWordsRequest) -> ServiceResult<WordPage> {
        let started_at = Instant::now();
        let cleaned = clean_query(request.q.as_deref().unwrap_or_default());
        let limit = clamp_limit(request.limit.as_deref());
        let kind = normalize_filter(request.kind.as_deref());
        let relevance = normalize_filter(request.relevance.as_deref());

        if SearchStrategy::initial(&cleaned) == SearchStrategy::Ranked {
            let query = SearchQuery {
                text: cleaned.clone(),
                kind: kind.clone(),
                relevance: relevance.clone(),
                limit,
            };
            match self.repo.ranked_search(&query) {
                Ok(items) => {
                    info!(
                        "event=word_search module=service status=ok strategy=ranked hits={} limit={} duration_ms={}",
                        items.len(),
                        limit,
                        started_at.elapsed().as_millis()
                    );
                    return Ok(WordPage {
                        nb_hits: items.len() as u64,
                        items,
                        strategy: SearchStrategy::Ranked,
                    });
                }
                Err(err) => {
                    warn!(
                        "event=word_search module=service status=fallback strategy=ranked error={}",
                        err
                    );
                }
            }
        }

        let filter = WordFilter {
            text: Some(cleaned).filter(|text| !text.is_empty()),
            kind,
            relevance,
        };
        let page = self.repo.list_filtered(&filter, limit)?;
        info!(
            "event=word_search module=service status=ok strategy=fallback hits={} total={} limit={} duration_ms={}",
            page.items.len(),
            page.total,
            limit,
            started_at.elapsed().as_millis()
        );

        Ok(WordPage {
            items: page.items,
            nb_hits: page.total,
            strategy: SearchStrategy::Fallback,
        })
    }

    /// Counts words matching the substring/filter rules of the fallback path.
    pub fn count_words(&self, request: &CountWordsRequest) -> ServiceResult<u64> {
        let cleaned = clean_query(request.q.as_deref().unwrap_or_default());
        let filter = WordFilter {
            text: Some(cleaned).filter(|text| !text.is_empty()),
            kind: normalize_filter(request.kind.as_deref()),
            relevance: normalize_filter(request.relevance.as_deref()),
        };
        Ok(self.repo.count_filtered(&filter)?)
    }

    /// Returns the earliest-created word, if any.
    pub fn first_word(&self) -> ServiceResult<Option<WordSummary>> {
        Ok(self.repo.first_word()?)
    }
}

/// Trims a query and strips one pair of wrapping double quotes.
///
/// Stripping is not recursive: `""run""` becomes `"run"`.
pub fn clean_query(raw: &str) -> String {
    let trimmed = raw.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(trimmed);
    unquoted.to_string()
}

/// Parses and clamps a requested page size.
///
/// The leading integer is read and trailing text ignored, so `10.5` is 10 and
/// `12abc` is 12. Input without a leading integer yields [`DEFAULT_LIMIT`];
/// parsed values are clamped to `[MIN_LIMIT, MAX_LIMIT]`.
pub fn clamp_limit(raw: Option<&str>) -> u32 {
    let Some(parsed) = raw.and_then(parse_leading_integer) else {
        return DEFAULT_LIMIT;
    };
    // In range after clamping, so the cast is lossless.
    parsed.clamp(i64::from(MIN_LIMIT), i64::from(MAX_LIMIT)) as u32
}

fn parse_leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let digits_end = unsigned
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(unsigned.len());
    if digits_end == 0 {
        return None;
    }

    // Digits that overflow still clamp to the nearest bound.
    let magnitude = unsigned[..digits_end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

fn normalize_filter(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::{clamp_limit, clean_query, SearchStrategy, DEFAULT_LIMIT, MAX_LIMIT, MIN_LIMIT};

    #[test]
    fn clean_query_strips_exactly_one_pair_of_quotes() {
        assert_eq!(clean_query("  \"run\"  "), "run");
        assert_eq!(clean_query("\"\"run\"\""), "\"run\"");
        assert_eq!(clean_query("run"), "run");
        assert_eq!(clean_query("\"run"), "\"run");
        assert_eq!(clean_query("\"\""), "");
    }

    #[test]
    fn lone_quote_is_not_stripped() {
        assert_eq!(clean_query("\""), "\"");
    }

    #[test]
    fn clamp_limit_defaults_and_clamps() {
        assert_eq!(clamp_limit(Some("9999")), MAX_LIMIT);
        assert_eq!(clamp_limit(Some("-5")), MIN_LIMIT);
        assert_eq!(clamp_limit(Some("0")), MIN_LIMIT);
        assert_eq!(clamp_limit(Some("abc")), DEFAULT_LIMIT);
        assert_eq!(clamp_limit(None), DEFAULT_LIMIT);
        assert_eq!(clamp_limit(Some(" 42 ")), 42);
    }

    #[test]
    fn clamp_limit_reads_leading_integer_only() {
        assert_eq!(clamp_limit(Some("10.5")), 10);
        assert_eq!(clamp_limit(Some("12abc")), 12);
        assert_eq!(clamp_limit(Some("+7")), 7);
        assert_eq!(clamp_limit(Some("-")), DEFAULT_LIMIT);
        assert_eq!(clamp_limit(Some(".5")), DEFAULT_LIMIT);
        assert_eq!(clamp_limit(Some("99999999999999999999999")), MAX_LIMIT);
        assert_eq!(clamp_limit(Some("-99999999999999999999999")), MIN_LIMIT);
    }

    #[test]
    fn strategy_transition_depends_on_query_emptiness() {
        assert_eq!(SearchStrategy::initial(""), SearchStrategy::Fallback);
        assert_eq!(SearchStrategy::initial("run"), SearchStrategy::Ranked);
    }
}
