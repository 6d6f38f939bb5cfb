//! Transactional rating update pipeline.
//!
//! Five dependent steps in one transaction: adjust the targeted bucket,
//! verify exactly one row matched, verify no counter went negative, then
//! rewrite the derived total and weighted average. Any failure rolls the
//! whole unit back; partial application is never observable.

use async_trait::async_trait;
use book_catalog_core::{RatingBucket, RatingMode, RatingSummary};
use sqlx::Row;

use crate::catalog::Catalog;
use crate::error::StorageError;
use crate::traits::RatingStore;

#[async_trait]
impl RatingStore for Catalog {
    async fn update_rating(
        &self,
        isbn: &str,
        bucket: RatingBucket,
        mode: RatingMode,
        value: i64,
    ) -> Result<(), StorageError> {
        let column = bucket.column();
        // Column name and operator come from fixed enums; the value and
        // isbn are the only caller inputs and both are bound.
        let expr = match mode {
            RatingMode::Increase => format!("{column} + $2"),
            RatingMode::Decrease => format!("{column} - $2"),
            RatingMode::Set => "$2".to_owned(),
        };
        let adjust_sql = format!(
            "UPDATE books SET {column} = {expr} WHERE isbn = $1
             RETURNING ratings_1, ratings_2, ratings_3, ratings_4, ratings_5"
        );

        let mut tx = self.pool.begin().await?;

        let rows = sqlx::query(&adjust_sql)
            .bind(isbn)
            .bind(value)
            .fetch_all(&mut *tx)
            .await?;

        // Exactly one row must have matched. Zero means an unknown isbn;
        // more than one means the uniqueness invariant is broken upstream.
        let row = match rows.as_slice() {
            [] => {
                tx.rollback().await?;
                return Err(StorageError::NotFound { entity: "book", id: isbn.to_owned() });
            },
            [row] => row,
            _ => {
                tx.rollback().await?;
                return Err(StorageError::Inconsistent(format!(
                    "isbn {isbn} matches {} rows",
                    rows.len()
                )));
            },
        };

        let buckets = [
            row.try_get::<i64, _>(0)?,
            row.try_get::<i64, _>(1)?,
            row.try_get::<i64, _>(2)?,
            row.try_get::<i64, _>(3)?,
            row.try_get::<i64, _>(4)?,
        ];
        if buckets.iter().any(|count| *count < 0) {
            tx.rollback().await?;
            return Err(StorageError::NegativeBucket { isbn: isbn.to_owned() });
        }

        let summary = RatingSummary::from_buckets(buckets);
        sqlx::query("UPDATE books SET ratings_count = $2, average_rating = $3 WHERE isbn = $1")
            .bind(isbn)
            .bind(summary.total)
            .bind(summary.average)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::debug!(
            isbn,
            bucket = bucket.stars(),
            total = summary.total,
            average = summary.average,
            "rating updated"
        );
        Ok(())
    }
}
