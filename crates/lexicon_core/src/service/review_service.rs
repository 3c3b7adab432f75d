//! Review use-case service.
//!
//! # Responsibility
//! - Record one review attempt against an existing word.
//!
//! # Invariants
//! - A missing word yields `NotFound` and writes nothing.
//! - A storage failure means neither the counter nor the event was kept.

use crate::model::review::{ReviewEvent, ReviewOutcome};
use crate::model::word::WordId;
use crate::repo::review_repo::ReviewRepository;
use crate::service::word_service::ServiceResult;
use log::{info, warn};
use std::time::Instant;

/// Use-case service wrapper for review recording.
pub struct ReviewService<R: ReviewRepository> {
    repo: R,
}

impl<R: ReviewRepository> ReviewService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Records one review attempt and returns the word's new review state.
    pub fn record_review(&self, word_id: WordId, correct: bool) -> ServiceResult<ReviewOutcome> {
        let started_at = Instant::now();
        match self.repo.record_review(word_id, correct) {
            Ok(outcome) => {
                info!(
                    "event=review_record module=service status=ok id={} review_count={} correct={} duration_ms={}",
                    outcome.id,
                    outcome.review_count,
                    correct,
                    started_at.elapsed().as_millis()
                );
                Ok(outcome)
            }
            Err(err) => {
                warn!(
                    "event=review_record module=service status=error id={} duration_ms={} error={}",
                    word_id,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err.into())
            }
        }
    }

    /// Lists the review log of one word, oldest first.
    pub fn list_reviews(&self, word_id: WordId) -> ServiceResult<Vec<ReviewEvent>> {
        Ok(self.repo.list_reviews(word_id)?)
    }
}
