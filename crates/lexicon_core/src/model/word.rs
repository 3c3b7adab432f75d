//! Word domain model.
//!
//! # Responsibility
//! - Define the canonical lexicon entry and its creation input.
//! - Normalize caller input into a storable shape.
//!
//! # Invariants
//! - `word` is never empty after trimming.
//! - Optional text fields are `None` rather than empty strings.
//! - `relevance` is always one of `low|medium|high`.
//! - `review_count` starts at zero and only review recording advances it.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a word entry.
pub type WordId = Uuid;

/// Review priority attached to a word.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relevance {
    Low,
    #[default]
    Medium,
    High,
}

impl Relevance {
    /// Coerces caller input into a relevance value.
    ///
    /// Input is trimmed and lower-cased. Anything outside `low|medium|high`,
    /// including absent input, becomes [`Relevance::Medium`].
    pub fn normalize(raw: Option<&str>) -> Self {
        raw.and_then(|value| Self::parse(&value.trim().to_lowercase()))
            .unwrap_or_default()
    }

    /// Parses the exact stored representation.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Canonical stored lexicon entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub id: WordId,
    pub word: String,
    pub description: Option<String>,
    pub example: Option<String>,
    /// Serialized as `type` to match the external schema naming.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub relevance: Relevance,
    pub conjugations: Option<String>,
    pub collocations: Option<String>,
    pub review_count: u32,
    pub last_review: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Minimal projection of the earliest entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordSummary {
    pub id: WordId,
    pub word: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Raw creation input as supplied by a caller.
///
/// Every field is optional here; [`NewWord::from_input`] decides what is
/// required and how the rest is normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewWordInput {
    pub word: Option<String>,
    pub description: Option<String>,
    pub example: Option<String>,
    pub kind: Option<String>,
    pub relevance: Option<String>,
    pub conjugations: Option<String>,
    pub collocations: Option<String>,
    pub last_review: Option<String>,
}

/// Validated and normalized creation input, ready for persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWord {
    pub word: String,
    pub description: Option<String>,
    pub example: Option<String>,
    pub kind: Option<String>,
    pub relevance: Relevance,
    pub conjugations: Option<String>,
    pub collocations: Option<String>,
    pub last_review: Option<DateTime<Utc>>,
}

/// Validation error for word creation input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordValidationError {
    /// `word` is absent or blank after trimming.
    MissingWord,
}

impl Display for WordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingWord => write!(f, "word is required"),
        }
    }
}

impl Error for WordValidationError {}

impl NewWord {
    /// Validates and normalizes raw caller input.
    ///
    /// # Contract
    /// - `word` is required after trimming.
    /// - Other text fields are trimmed; blank values become `None`.
    /// - Unknown relevance values coerce to `medium`.
    /// - Unparseable `last_review` values are dropped, never rejected.
    pub fn from_input(input: NewWordInput) -> Result<Self, WordValidationError> {
        let word = normalize_text(input.word).ok_or(WordValidationError::MissingWord)?;

        Ok(Self {
            word,
            description: normalize_text(input.description),
            example: normalize_text(input.example),
            kind: normalize_text(input.kind),
            relevance: Relevance::normalize(input.relevance.as_deref()),
            conjugations: normalize_text(input.conjugations),
            collocations: normalize_text(input.collocations),
            last_review: input.last_review.as_deref().and_then(parse_timestamp),
        })
    }

    /// Case-insensitive uniqueness key for this entry.
    pub fn key(&self) -> String {
        word_key(&self.word)
    }

    /// Case-folded description used for substring matching.
    pub fn description_key(&self) -> Option<String> {
        self.description.as_deref().map(description_key)
    }
}

/// Returns the case-insensitive uniqueness key for a word.
pub fn word_key(word: &str) -> String {
    word.trim().to_lowercase()
}

/// Returns the case-folded form of a description.
///
/// Folding is Unicode-aware, unlike SQLite's built-in `lower()` and `LIKE`.
pub fn description_key(description: &str) -> String {
    description.to_lowercase()
}

/// Trims text and maps blank values to `None`.
pub fn normalize_text(value: Option<String>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.len() == value.len() {
        return Some(value);
    }
    Some(trimmed.to_string())
}

/// Parses a caller-supplied date-time.
///
/// Accepted forms:
/// - RFC 3339 (`2024-05-01T10:00:00Z`, `2024-05-01T12:00:00+02:00`)
/// - `YYYY-MM-DD HH:MM:SS[.fff]` or `YYYY-MM-DDTHH:MM:SS[.fff]`, read as UTC
/// - `YYYY-MM-DD`, read as UTC midnight
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}
