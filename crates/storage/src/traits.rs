//! Store traits at the storage seam.
//!
//! The service layer depends on these rather than on [`crate::Catalog`]
//! directly, so tests can substitute a fake store.

use async_trait::async_trait;
use book_catalog_core::{
    Book, BookMetadata, BookSearchRow, NewBook, OrderBy, RatingBucket, RatingMode, SearchPlan,
    SortDirection,
};

use crate::error::StorageError;

/// The query composer: multi-predicate search and unfiltered browsing.
#[async_trait]
pub trait SearchStore {
    /// Execute a normalized search plan. Keyword plans rank the whole
    /// catalog by relevance; filtered plans AND-combine predicates and
    /// return one clamped page.
    async fn search(&self, plan: &SearchPlan) -> Result<Vec<BookSearchRow>, StorageError>;

    /// Unfiltered paged listing. A catalog with zero rows here is an
    /// inconsistent-state error, not an empty page.
    async fn browse(
        &self,
        order_by: OrderBy,
        direction: SortDirection,
        page_size: i64,
        page: i64,
    ) -> Result<Vec<BookSearchRow>, StorageError>;
}

/// The transactional rating update pipeline.
#[async_trait]
pub trait RatingStore {
    /// Apply a bucket change and recompute the derived total and weighted
    /// average as one all-or-nothing unit.
    async fn update_rating(
        &self,
        isbn: &str,
        bucket: RatingBucket,
        mode: RatingMode,
        value: i64,
    ) -> Result<(), StorageError>;
}

/// Catalog maintenance: insertion, metadata rewrite, physical deletion.
#[async_trait]
pub trait BookStore {
    async fn insert_book(&self, book: &NewBook) -> Result<Book, StorageError>;

    async fn update_book_metadata(
        &self,
        isbn: &str,
        metadata: &BookMetadata,
    ) -> Result<(), StorageError>;

    /// Physical removal; relation rows go with it via cascade.
    async fn delete_book(&self, isbn: &str) -> Result<(), StorageError>;

    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<BookSearchRow>, StorageError>;
}
