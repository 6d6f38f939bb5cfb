//! Keyword rank search over the stored `search_vec` tsvector.

use book_catalog_core::BookSearchRow;

use crate::catalog::{Catalog, SEARCH_COLUMNS, SEARCH_JOINS, row_to_search_row};
use crate::error::StorageError;

/// Rank the whole catalog by relevance against the keyword, descending.
/// No pagination window; the keyword path returns the full match set.
pub(crate) async fn rank_search(
    catalog: &Catalog,
    keyword: &str,
) -> Result<Vec<BookSearchRow>, StorageError> {
    let Some(tsquery) = build_tsquery(keyword) else {
        return Ok(Vec::new());
    };
    let sql = format!(
        "SELECT {SEARCH_COLUMNS},
                ts_rank_cd(b.search_vec, to_tsquery('english', $1))::float8 AS rank
         {SEARCH_JOINS}
         WHERE b.search_vec @@ to_tsquery('english', $1)
         GROUP BY b.id
         ORDER BY rank DESC"
    );
    let rows = sqlx::query(&sql).bind(&tsquery).fetch_all(&catalog.pool).await?;
    rows.iter().map(row_to_search_row).collect()
}

/// Build a prefix-matching tsquery from already-validated keyword text.
/// Quotes and hyphens are stripped per word; an all-punctuation keyword
/// yields `None`.
pub(crate) fn build_tsquery(keyword: &str) -> Option<String> {
    let result = keyword
        .split_whitespace()
        .filter_map(|word| {
            let sanitized: String = word.chars().filter(|c| c.is_alphanumeric()).collect();
            if sanitized.is_empty() { None } else { Some(format!("{sanitized}:*")) }
        })
        .collect::<Vec<_>>()
        .join(" & ");
    if result.is_empty() { None } else { Some(result) }
}

#[cfg(test)]
mod tests {
    use super::build_tsquery;

    #[test]
    fn tsquery_joins_prefix_terms() {
        assert_eq!(build_tsquery("hunger games"), Some("hunger:* & games:*".into()));
    }

    #[test]
    fn tsquery_strips_quotes_and_hyphens() {
        assert_eq!(build_tsquery(r#""spider-man""#), Some("spiderman:*".into()));
    }

    #[test]
    fn tsquery_of_punctuation_only_is_none() {
        assert_eq!(build_tsquery(r#"-- "" -"#), None);
        assert_eq!(build_tsquery("   "), None);
    }
}
