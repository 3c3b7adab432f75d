//! Review event model.

use crate::model::word::WordId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One immutable review attempt recorded against a word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEvent {
    /// Backend-assigned row id.
    pub id: i64,
    pub word_id: WordId,
    pub correct: bool,
    pub created_at: DateTime<Utc>,
}

/// Word state after one successful review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewOutcome {
    pub id: WordId,
    pub review_count: u32,
    pub last_review: DateTime<Utc>,
}
