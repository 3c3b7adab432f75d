//! Full-text search entry points.
//!
//! # Responsibility
//! - Expose ranked word lookup backed by the SQLite FTS5 index.
//! - Keep match-expression building inside core.

pub mod fts;
