//! Shared constants for the book catalog.
//!
//! Centralizes magic numbers that would otherwise be duplicated across crates.

/// Default number of rows per search page when the caller supplies none.
pub const DEFAULT_PAGE_SIZE: i64 = 15;

/// Lowest valid rating bucket / range bound.
pub const RATING_MIN: i16 = 1;

/// Highest valid rating bucket / range bound.
pub const RATING_MAX: i16 = 5;

/// pg_trgm similarity score a title must exceed to count as a fuzzy match.
pub const TITLE_SIMILARITY_THRESHOLD: f64 = 0.45;

/// PostgreSQL connection pool: maximum connections.
pub const PG_POOL_MAX_CONNECTIONS: u32 = 20;

/// PostgreSQL connection pool: acquire timeout in seconds.
pub const PG_POOL_ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// PostgreSQL connection pool: idle timeout in seconds.
pub const PG_POOL_IDLE_TIMEOUT_SECS: u64 = 300;
