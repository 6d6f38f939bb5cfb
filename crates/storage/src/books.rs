//! Catalog maintenance: insertion, metadata rewrite, deletion, lookup.

use async_trait::async_trait;
use book_catalog_core::{
    Book, BookMetadata, BookSearchRow, NewBook, RatingSummary, normalize_author_name,
};
use sqlx::PgTransaction;

use crate::catalog::{Catalog, SEARCH_COLUMNS, SEARCH_JOINS, row_to_search_row};
use crate::error::StorageError;
use crate::traits::BookStore;

/// Find an author by normalized name or create one.
///
/// Matching is on trimmed lowercase name so one real author does not
/// fragment into several records across book insertions.
async fn find_or_create_author(
    tx: &mut PgTransaction<'_>,
    name: &str,
) -> Result<i64, StorageError> {
    let normalized = normalize_author_name(name);
    let existing: Option<i64> =
        sqlx::query_scalar("SELECT id FROM authors WHERE LOWER(TRIM(name)) = $1")
            .bind(&normalized)
            .fetch_optional(&mut **tx)
            .await?;
    if let Some(id) = existing {
        return Ok(id);
    }
    let id: i64 = sqlx::query_scalar("INSERT INTO authors (name) VALUES ($1) RETURNING id")
        .bind(name.trim())
        .fetch_one(&mut **tx)
        .await?;
    Ok(id)
}

#[async_trait]
impl BookStore for Catalog {
    async fn insert_book(&self, book: &NewBook) -> Result<Book, StorageError> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO books (isbn, title, original_title, publication_year,
                                image_url, small_image_url)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id",
        )
        .bind(&book.isbn)
        .bind(&book.title)
        .bind(&book.original_title)
        .bind(book.publication_year)
        .bind(&book.image_url)
        .bind(&book.small_image_url)
        .fetch_one(&mut *tx)
        .await?;

        for name in &book.authors {
            let author_id = find_or_create_author(&mut tx, name).await?;
            // ON CONFLICT keeps the (book, author) pair unique when the
            // same author is listed twice on one request.
            sqlx::query(
                "INSERT INTO book_authors (book_id, author_id) VALUES ($1, $2)
                 ON CONFLICT (book_id, author_id) DO NOTHING",
            )
            .bind(id)
            .bind(author_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::info!(isbn = %book.isbn, id, "book inserted");
        Ok(Book {
            id,
            isbn: book.isbn.clone(),
            title: book.title.clone(),
            original_title: book.original_title.clone(),
            publication_year: book.publication_year,
            rating: RatingSummary::from_buckets([0; 5]),
            image_url: book.image_url.clone(),
            small_image_url: book.small_image_url.clone(),
        })
    }

    async fn update_book_metadata(
        &self,
        isbn: &str,
        metadata: &BookMetadata,
    ) -> Result<(), StorageError> {
        let result = sqlx::query(
            "UPDATE books SET title = $2, original_title = $3, publication_year = $4,
                              image_url = $5, small_image_url = $6
             WHERE isbn = $1",
        )
        .bind(isbn)
        .bind(&metadata.title)
        .bind(&metadata.original_title)
        .bind(metadata.publication_year)
        .bind(&metadata.image_url)
        .bind(&metadata.small_image_url)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound { entity: "book", id: isbn.to_owned() });
        }
        Ok(())
    }

    async fn delete_book(&self, isbn: &str) -> Result<(), StorageError> {
        // book_authors rows go via ON DELETE CASCADE; authors stay.
        let result =
            sqlx::query("DELETE FROM books WHERE isbn = $1").bind(isbn).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound { entity: "book", id: isbn.to_owned() });
        }
        tracing::info!(isbn, "book deleted");
        Ok(())
    }

    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<BookSearchRow>, StorageError> {
        let sql = format!(
            "SELECT {SEARCH_COLUMNS} {SEARCH_JOINS} WHERE b.isbn = $1 GROUP BY b.id"
        );
        let row = sqlx::query(&sql).bind(isbn).fetch_optional(&self.pool).await?;
        row.as_ref().map(row_to_search_row).transpose()
    }
}
