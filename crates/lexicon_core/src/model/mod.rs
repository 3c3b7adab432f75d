//! Domain model for the lexicon store.
//!
//! # Responsibility
//! - Define canonical word and review-event records used by core logic.
//! - Own input normalization rules shared by every write path.
//!
//! # Invariants
//! - Every word is identified by a stable `WordId`.
//! - Review events are append-only facts; nothing in core mutates them.

pub mod review;
pub mod word;
