//! Pool construction and shared row mapping for the catalog store.

use std::time::Duration;

use book_catalog_core::{
    BookSearchRow, PG_POOL_ACQUIRE_TIMEOUT_SECS, PG_POOL_IDLE_TIMEOUT_SECS,
    PG_POOL_MAX_CONNECTIONS, RatingSummary,
};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};

use crate::error::StorageError;
use crate::migrations::run_migrations;

/// The catalog store: a thin handle over a shared connection pool.
///
/// Constructed once at startup and passed to callers explicitly; there is
/// no process-wide singleton, so tests can build their own instance against
/// a scratch database.
#[derive(Clone, Debug)]
pub struct Catalog {
    pub(crate) pool: PgPool,
}

impl Catalog {
    /// Connect and bring the schema up to [`crate::LATEST_VERSION`].
    ///
    /// A migration failure here is fatal: callers must abort startup rather
    /// than serve traffic against an unknown schema.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(PG_POOL_MAX_CONNECTIONS)
            .acquire_timeout(Duration::from_secs(PG_POOL_ACQUIRE_TIMEOUT_SECS))
            .idle_timeout(Duration::from_secs(PG_POOL_IDLE_TIMEOUT_SECS))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;
        run_migrations(&pool).await?;
        tracing::info!("catalog storage initialized");
        Ok(Self { pool })
    }

    /// Wrap an existing pool whose schema is already migrated (tests).
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escape LIKE wildcards in caller-supplied fragments.
pub(crate) fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

/// Column list every search projection selects, aggregated authors included.
pub(crate) const SEARCH_COLUMNS: &str =
    "b.id, b.isbn, COALESCE(string_agg(a.name, ', ' ORDER BY a.name), '') AS authors,
     b.publication_year, b.original_title, b.title,
     b.average_rating, b.ratings_count,
     b.ratings_1, b.ratings_2, b.ratings_3, b.ratings_4, b.ratings_5,
     b.image_url, b.small_image_url";

/// Join clause pairing every book with its (possibly absent) authors.
pub(crate) const SEARCH_JOINS: &str =
    "FROM books b
     LEFT JOIN book_authors ba ON ba.book_id = b.id
     LEFT JOIN authors a ON a.id = ba.author_id";

pub(crate) fn row_to_search_row(row: &sqlx::postgres::PgRow) -> Result<BookSearchRow, StorageError> {
    let buckets = [
        row.try_get::<i64, _>("ratings_1")?,
        row.try_get::<i64, _>("ratings_2")?,
        row.try_get::<i64, _>("ratings_3")?,
        row.try_get::<i64, _>("ratings_4")?,
        row.try_get::<i64, _>("ratings_5")?,
    ];
    Ok(BookSearchRow {
        id: row.try_get("id")?,
        isbn: row.try_get("isbn")?,
        authors: row.try_get("authors")?,
        publication_year: row.try_get("publication_year")?,
        original_title: row.try_get("original_title")?,
        title: row.try_get("title")?,
        rating: RatingSummary {
            average: row.try_get("average_rating")?,
            total: row.try_get("ratings_count")?,
            buckets,
        },
        image_url: row.try_get("image_url")?,
        small_image_url: row.try_get("small_image_url")?,
    })
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn escape_like_neutralizes_wildcards() {
        assert_eq!(escape_like("100% _real_"), "100\\% \\_real\\_");
        assert_eq!(escape_like(r"back\slash"), r"back\\slash");
    }
}
