//! Rating buckets, update modes, and the derived rating aggregate.

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// One of the five star buckets a book accumulates ratings in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
pub enum RatingBucket {
    One,
    Two,
    Three,
    Four,
    Five,
}

impl RatingBucket {
    pub fn new(stars: i16) -> Result<Self, ValidationError> {
        match stars {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            4 => Ok(Self::Four),
            5 => Ok(Self::Five),
            other => Err(ValidationError::InvalidBucket(other)),
        }
    }

    /// Star value, also the weight used for the weighted average.
    pub fn stars(self) -> i64 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
            Self::Five => 5,
        }
    }

    /// Column holding this bucket's counter.
    ///
    /// Returned from a fixed set so it is safe to interpolate into
    /// statement text; never derived from caller input directly.
    pub fn column(self) -> &'static str {
        match self {
            Self::One => "ratings_1",
            Self::Two => "ratings_2",
            Self::Three => "ratings_3",
            Self::Four => "ratings_4",
            Self::Five => "ratings_5",
        }
    }
}

impl TryFrom<i16> for RatingBucket {
    type Error = ValidationError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RatingBucket> for i16 {
    #[allow(clippy::cast_possible_truncation, reason = "stars is 1..=5")]
    fn from(bucket: RatingBucket) -> Self {
        bucket.stars() as Self
    }
}

/// How a rating update changes the targeted bucket counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingMode {
    /// Add the value to the counter.
    Increase,
    /// Subtract the value from the counter.
    Decrease,
    /// Replace the counter with the value.
    Set,
}

/// Derived rating aggregate for one book.
///
/// `total` and `average` are caches: always exactly recomputable from the
/// five bucket counters via [`RatingSummary::from_buckets`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub average: f64,
    pub total: i64,
    /// Counters for 1-star through 5-star, in order.
    pub buckets: [i64; 5],
}

impl RatingSummary {
    /// Recompute the derived fields from the authoritative bucket counters.
    ///
    /// The average is round(Σ i·bucket_i / total, 2), or 0 when no ratings
    /// exist at all.
    pub fn from_buckets(buckets: [i64; 5]) -> Self {
        let total: i64 = buckets.iter().sum();
        let average = if total == 0 {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss, reason = "rating counts fit in f64")]
            let weighted: i64 = buckets
                .iter()
                .zip(1i64..)
                .map(|(count, stars)| count * stars)
                .sum();
            #[allow(clippy::cast_precision_loss, reason = "rating counts fit in f64")]
            round2(weighted as f64 / total as f64)
        };
        Self { average, total, buckets }
    }
}

/// Round to two decimal places, the precision the catalog stores averages at.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_rejects_out_of_range() {
        assert!(RatingBucket::new(0).is_err());
        assert!(RatingBucket::new(6).is_err());
        assert_eq!(RatingBucket::new(3).unwrap(), RatingBucket::Three);
    }

    #[test]
    fn bucket_columns_are_fixed() {
        let columns: Vec<&str> = (1..=5)
            .map(|s| RatingBucket::new(s).unwrap().column())
            .collect();
        assert_eq!(
            columns,
            ["ratings_1", "ratings_2", "ratings_3", "ratings_4", "ratings_5"]
        );
    }

    #[test]
    fn summary_recomputes_total_and_average() {
        let summary = RatingSummary::from_buckets([10, 20, 31, 40, 50]);
        assert_eq!(summary.total, 151);
        // (10 + 40 + 93 + 160 + 250) / 151 = 3.6622... -> 3.66
        assert_eq!(summary.average, 3.66);
    }

    #[test]
    fn summary_of_empty_book_is_zero() {
        let summary = RatingSummary::from_buckets([0; 5]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.average, 0.0);
    }

    #[test]
    fn average_rounds_half_up() {
        // 1*1 + 1*2 = 3 / 2 = 1.5
        let summary = RatingSummary::from_buckets([1, 1, 0, 0, 0]);
        assert_eq!(summary.average, 1.5);
        assert_eq!(round2(3.664), 3.66);
        assert_eq!(round2(3.666), 3.67);
    }
}
