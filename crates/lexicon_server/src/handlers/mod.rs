//! Request handlers, one module per resource.

pub mod health;
pub mod reviews;
pub mod words;

/// Cache directive for list-style responses.
pub const LIST_CACHE_CONTROL: &str = "s-maxage=60, stale-while-revalidate=600";
/// Cache directive for freshly written records.
pub const NO_STORE: &str = "no-store";
