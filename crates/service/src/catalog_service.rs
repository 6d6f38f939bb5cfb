//! The catalog service: validates requests, delegates to storage.
//!
//! Transport adapters (HTTP handlers, CLI) call these methods with
//! already-authorized, type-level-valid input; everything domain-specific
//! (filter composition, clamping, rating invariants) is decided here or in
//! the storage engine.

use std::sync::Arc;

use book_catalog_core::{
    Book, BookMetadata, BookSearchRow, NewBook, OrderBy, RatingUpdate, SearchQuery, SortDirection,
};
use book_catalog_storage::{BookStore, Catalog, RatingStore, SearchStore};

use crate::ServiceError;

pub struct CatalogService {
    storage: Arc<Catalog>,
}

impl CatalogService {
    #[must_use]
    pub fn new(storage: Arc<Catalog>) -> Self {
        Self { storage }
    }

    /// Search the catalog.
    ///
    /// The request is normalized into a [`book_catalog_core::SearchPlan`]
    /// first; a keyword plan ranks by relevance, a filtered plan composes
    /// predicates. Rejected requests never reach the store.
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<BookSearchRow>, ServiceError> {
        let plan = query
            .plan()
            .inspect_err(|err| tracing::debug!(%err, "search request rejected"))?;
        Ok(self.storage.search(&plan).await?)
    }

    /// Unfiltered paged listing of the whole catalog.
    pub async fn browse(
        &self,
        order_by: OrderBy,
        direction: SortDirection,
        page_size: i64,
        page: i64,
    ) -> Result<Vec<BookSearchRow>, ServiceError> {
        Ok(self.storage.browse(order_by, direction, page_size, page).await?)
    }

    /// Apply a rating change atomically.
    pub async fn update_rating(&self, update: &RatingUpdate) -> Result<(), ServiceError> {
        let bucket = update
            .normalize()
            .inspect_err(|err| tracing::debug!(%err, "rating update rejected"))?;
        self.storage.update_rating(&update.isbn, bucket, update.mode, update.value).await?;
        Ok(())
    }

    pub async fn add_book(&self, book: &NewBook) -> Result<Book, ServiceError> {
        Ok(self.storage.insert_book(book).await?)
    }

    pub async fn update_book_metadata(
        &self,
        isbn: &str,
        metadata: &BookMetadata,
    ) -> Result<(), ServiceError> {
        Ok(self.storage.update_book_metadata(isbn, metadata).await?)
    }

    pub async fn delete_book(&self, isbn: &str) -> Result<(), ServiceError> {
        Ok(self.storage.delete_book(isbn).await?)
    }

    pub async fn find_by_isbn(
        &self,
        isbn: &str,
    ) -> Result<Option<BookSearchRow>, ServiceError> {
        Ok(self.storage.find_by_isbn(isbn).await?)
    }
}
