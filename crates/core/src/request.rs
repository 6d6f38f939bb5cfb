//! Caller-facing request shapes and their normalization.
//!
//! [`SearchQuery::plan`] is the single place a search request is inspected:
//! it validates, clamps, and branches exactly once into either the rank
//! (keyword) strategy or the filter-composition strategy. Storage only ever
//! sees the normalized [`SearchPlan`].

use serde::{Deserialize, Serialize};

use crate::{
    DEFAULT_PAGE_SIZE, RATING_MAX, RATING_MIN, RatingBucket, RatingMode, ValidationError,
};

/// Sort key for filtered search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderBy {
    #[default]
    Title,
    Author,
    Year,
}

impl OrderBy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::Year => "year",
        }
    }
}

/// Sort direction for filtered search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// SQL keyword. Drawn from a fixed set, safe to interpolate.
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Raw search request as received from a caller, fields already reduced to
/// primitives by the transport layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    /// Free-text keyword; when present it takes precedence over every
    /// other filter.
    pub keyword: Option<String>,
    pub isbn: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub min_rating: Option<i16>,
    pub max_rating: Option<i16>,
    pub order_by: OrderBy,
    pub direction: SortDirection,
    pub page_size: i64,
    pub page: i64,
}

/// Normalized, validated search strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchPlan {
    /// Rank rows by full-text relevance against the keyword; whole result
    /// set, no pagination window.
    Keyword(String),
    /// AND-combine the active filters, order, and paginate.
    Filtered(FilterSet),
}

/// The active predicates and window of a filtered search.
///
/// Invariant: at least one of `isbn`, `title`, `author`, `rating_range`
/// is present; `isbn` is all digits; `page >= 1`; `page_size >= 1`;
/// `rating_range` is clamped into `[1,5]` with min <= max.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSet {
    pub isbn: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub rating_range: Option<(i16, i16)>,
    pub order_by: OrderBy,
    pub direction: SortDirection,
    pub page_size: i64,
    pub page: i64,
}

impl SearchQuery {
    /// Validate and normalize this request into a [`SearchPlan`].
    ///
    /// Nothing past this point touches raw caller input: rejected requests
    /// never reach the store.
    pub fn plan(&self) -> Result<SearchPlan, ValidationError> {
        if let Some(keyword) = self.keyword.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
            validate_keyword(keyword)?;
            return Ok(SearchPlan::Keyword(keyword.to_owned()));
        }

        let isbn = non_empty(self.isbn.as_deref());
        if let Some(isbn) = &isbn {
            if !isbn.chars().all(|c| c.is_ascii_digit()) {
                return Err(ValidationError::NonNumericIsbn(isbn.clone()));
            }
        }
        let title = non_empty(self.title.as_deref());
        let author = non_empty(self.author.as_deref());
        let rating_range = match (self.min_rating, self.max_rating) {
            (None, None) => None,
            (min, max) => {
                let min = clamp_rating(min.unwrap_or(RATING_MIN));
                let max = clamp_rating(max.unwrap_or(RATING_MAX));
                if min > max {
                    return Err(ValidationError::EmptyRatingRange { min, max });
                }
                Some((min, max))
            },
        };

        if isbn.is_none() && title.is_none() && author.is_none() && rating_range.is_none() {
            return Err(ValidationError::NoPredicates);
        }

        Ok(SearchPlan::Filtered(FilterSet {
            isbn,
            title,
            author,
            rating_range,
            order_by: self.order_by,
            direction: self.direction,
            page_size: if self.page_size < 1 { DEFAULT_PAGE_SIZE } else { self.page_size },
            page: self.page.max(1),
        }))
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_owned)
}

fn clamp_rating(value: i16) -> i16 {
    value.clamp(RATING_MIN, RATING_MAX)
}

/// Reject keyword text containing anything beyond alphanumerics,
/// whitespace, hyphen, and double-quote.
pub fn validate_keyword(keyword: &str) -> Result<(), ValidationError> {
    match keyword
        .chars()
        .find(|c| !(c.is_alphanumeric() || c.is_whitespace() || *c == '-' || *c == '"'))
    {
        Some(bad) => Err(ValidationError::ForbiddenKeywordChar(bad)),
        None => Ok(()),
    }
}

/// Rating update request: which bucket of which book changes, and how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingUpdate {
    pub isbn: String,
    /// Star bucket, 1..=5.
    pub bucket: i16,
    pub mode: RatingMode,
    pub value: i64,
}

impl RatingUpdate {
    /// Validate bucket and value, yielding the typed bucket.
    pub fn normalize(&self) -> Result<RatingBucket, ValidationError> {
        if self.value < 0 {
            return Err(ValidationError::NegativeValue(self.value));
        }
        RatingBucket::new(self.bucket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> SearchQuery {
        SearchQuery::default()
    }

    #[test]
    fn keyword_takes_precedence_over_filters() {
        let q = SearchQuery {
            keyword: Some("hunger games".into()),
            title: Some("ignored".into()),
            isbn: Some("9780439023480".into()),
            ..query()
        };
        assert_eq!(q.plan().unwrap(), SearchPlan::Keyword("hunger games".into()));
    }

    #[test]
    fn keyword_allows_hyphen_and_quotes() {
        let q = SearchQuery { keyword: Some(r#"spider-man "homecoming""#.into()), ..query() };
        assert!(matches!(q.plan().unwrap(), SearchPlan::Keyword(_)));
    }

    #[test]
    fn keyword_rejects_forbidden_characters() {
        let q = SearchQuery { keyword: Some("robert'); drop table".into()), ..query() };
        assert_eq!(q.plan(), Err(ValidationError::ForbiddenKeywordChar('\'')));
    }

    #[test]
    fn blank_keyword_falls_through_to_filters() {
        let q = SearchQuery { keyword: Some("   ".into()), title: Some("dune".into()), ..query() };
        assert!(matches!(q.plan().unwrap(), SearchPlan::Filtered(_)));
    }

    #[test]
    fn zero_predicates_rejected_before_any_sql() {
        assert_eq!(query().plan(), Err(ValidationError::NoPredicates));
        let blank =
            SearchQuery { title: Some("".into()), author: Some("  ".into()), ..query() };
        assert_eq!(blank.plan(), Err(ValidationError::NoPredicates));
    }

    #[test]
    fn non_numeric_isbn_rejected() {
        let q = SearchQuery { isbn: Some("97804-39023480".into()), ..query() };
        assert_eq!(
            q.plan(),
            Err(ValidationError::NonNumericIsbn("97804-39023480".into()))
        );
    }

    #[test]
    fn rating_bounds_clamp_into_one_to_five() {
        let q = SearchQuery { min_rating: Some(-3), max_rating: Some(9), ..query() };
        let SearchPlan::Filtered(f) = q.plan().unwrap() else { panic!("expected filters") };
        assert_eq!(f.rating_range, Some((1, 5)));
    }

    #[test]
    fn missing_rating_bound_defaults_to_extreme() {
        let q = SearchQuery { min_rating: Some(3), ..query() };
        let SearchPlan::Filtered(f) = q.plan().unwrap() else { panic!("expected filters") };
        assert_eq!(f.rating_range, Some((3, 5)));

        let q = SearchQuery { max_rating: Some(2), ..query() };
        let SearchPlan::Filtered(f) = q.plan().unwrap() else { panic!("expected filters") };
        assert_eq!(f.rating_range, Some((1, 2)));
    }

    #[test]
    fn inverted_rating_range_rejected() {
        let q = SearchQuery { min_rating: Some(4), max_rating: Some(2), ..query() };
        assert_eq!(q.plan(), Err(ValidationError::EmptyRatingRange { min: 4, max: 2 }));
    }

    #[test]
    fn page_defaults_applied() {
        let q = SearchQuery { isbn: Some("9780439023480".into()), ..query() };
        let SearchPlan::Filtered(f) = q.plan().unwrap() else { panic!("expected filters") };
        assert_eq!(f.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(f.page, 1);

        let q = SearchQuery { isbn: Some("9780439023480".into()), page_size: -4, page: -2, ..query() };
        let SearchPlan::Filtered(f) = q.plan().unwrap() else { panic!("expected filters") };
        assert_eq!(f.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(f.page, 1);
    }

    #[test]
    fn query_deserializes_with_defaults() {
        let q: SearchQuery =
            serde_json::from_str(r#"{"title": "dune", "direction": "desc"}"#).unwrap();
        assert_eq!(q.title.as_deref(), Some("dune"));
        assert_eq!(q.direction, SortDirection::Desc);
        assert_eq!(q.order_by, OrderBy::Title);
        assert_eq!(q.page, 0);

        let SearchPlan::Filtered(f) = q.plan().unwrap() else { panic!("expected filters") };
        assert_eq!(f.page, 1);
        assert_eq!(f.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn rating_update_normalization() {
        let upd = RatingUpdate { isbn: "9780439023480".into(), bucket: 3, mode: RatingMode::Increase, value: 1 };
        assert_eq!(upd.normalize().unwrap(), RatingBucket::Three);

        let bad = RatingUpdate { bucket: 9, ..upd.clone() };
        assert_eq!(bad.normalize(), Err(ValidationError::InvalidBucket(9)));

        let negative = RatingUpdate { value: -1, ..upd };
        assert_eq!(negative.normalize(), Err(ValidationError::NegativeValue(-1)));
    }
}
