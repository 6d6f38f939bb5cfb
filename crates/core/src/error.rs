use thiserror::Error;

/// Request rejected before any SQL was built.
///
/// Callers render these as bad-request responses; none of them ever reach
/// the store as a malformed statement.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Keyword contained a character outside the allowed set
    /// (alphanumerics, whitespace, hyphen, double-quote).
    #[error("keyword contains forbidden character {0:?}")]
    ForbiddenKeywordChar(char),

    /// Identifier filter containing anything but digits.
    #[error("identifier must be numeric: {0:?}")]
    NonNumericIsbn(String),

    /// Non-keyword search with no active filter.
    #[error("search request has no active filters")]
    NoPredicates,

    /// Rating range with min above max after clamping into [1,5].
    #[error("rating range is empty: min {min} > max {max}")]
    EmptyRatingRange { min: i16, max: i16 },

    /// Rating bucket outside 1..=5.
    #[error("invalid rating bucket {0}, expected 1..=5")]
    InvalidBucket(i16),

    /// Rating update value must be non-negative.
    #[error("invalid rating value {0}, expected >= 0")]
    NegativeValue(i64),
}
