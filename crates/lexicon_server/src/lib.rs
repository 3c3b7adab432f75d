//! HTTP surface for the lexicon store.
//!
//! Wires the core services behind an API-key gate and maps their results to
//! JSON responses.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use config::ServerConfig;
pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
