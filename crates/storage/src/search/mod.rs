//! The query composer.
//!
//! One entry point, one explicit branch: a [`SearchPlan::Keyword`] runs the
//! rank strategy, a [`SearchPlan::Filtered`] runs predicate composition.

mod filtered;
mod predicates;
mod rank;

use async_trait::async_trait;
use book_catalog_core::{
    BookSearchRow, DEFAULT_PAGE_SIZE, FilterSet, OrderBy, SearchPlan, SortDirection,
};

use crate::catalog::Catalog;
use crate::error::StorageError;
use crate::traits::SearchStore;

#[async_trait]
impl SearchStore for Catalog {
    async fn search(&self, plan: &SearchPlan) -> Result<Vec<BookSearchRow>, StorageError> {
        match plan {
            SearchPlan::Keyword(keyword) => rank::rank_search(self, keyword).await,
            SearchPlan::Filtered(filters) => filtered::filtered_search(self, filters).await,
        }
    }

    async fn browse(
        &self,
        order_by: OrderBy,
        direction: SortDirection,
        page_size: i64,
        page: i64,
    ) -> Result<Vec<BookSearchRow>, StorageError> {
        filtered::browse(self, &browse_filters(order_by, direction, page_size, page)).await
    }
}

/// Predicate-less filter set for browsing, with the same pagination defaults
/// as [`book_catalog_core::SearchQuery::plan`].
fn browse_filters(
    order_by: OrderBy,
    direction: SortDirection,
    page_size: i64,
    page: i64,
) -> FilterSet {
    FilterSet {
        isbn: None,
        title: None,
        author: None,
        rating_range: None,
        order_by,
        direction,
        page_size: if page_size < 1 { DEFAULT_PAGE_SIZE } else { page_size },
        page: page.max(1),
    }
}

/// A clamped LIMIT/OFFSET window.
///
/// The page number is clamped into `[1, ceil(total / page_size)]`; the
/// offset is always `(page - 1) * page_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageWindow {
    pub limit: i64,
    pub offset: i64,
    pub page: i64,
}

impl PageWindow {
    pub(crate) fn clamp(page: i64, page_size: i64, total: i64) -> Self {
        let limit = page_size.max(1);
        let max_page = ((total + limit - 1) / limit).max(1);
        let page = page.clamp(1, max_page);
        Self { limit, offset: (page - 1) * limit, page }
    }
}

#[cfg(test)]
mod tests {
    use book_catalog_core::{DEFAULT_PAGE_SIZE, OrderBy, SortDirection};

    use super::{PageWindow, browse_filters};

    #[test]
    fn browse_applies_default_page_size_when_not_positive() {
        let filters = browse_filters(OrderBy::Title, SortDirection::Asc, 0, 1);
        assert_eq!(filters.page_size, DEFAULT_PAGE_SIZE);
        let filters = browse_filters(OrderBy::Title, SortDirection::Asc, -3, 0);
        assert_eq!(filters.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(filters.page, 1);
    }

    #[test]
    fn browse_keeps_explicit_page_size() {
        let filters = browse_filters(OrderBy::Year, SortDirection::Desc, 7, 4);
        assert_eq!(filters.page_size, 7);
        assert_eq!(filters.page, 4);
        assert!(filters.isbn.is_none() && filters.title.is_none() && filters.author.is_none());
    }

    #[test]
    fn offset_is_page_minus_one_times_size() {
        let window = PageWindow::clamp(3, 15, 100);
        assert_eq!(window, PageWindow { limit: 15, offset: 30, page: 3 });
    }

    #[test]
    fn page_below_one_clamps_to_one() {
        let window = PageWindow::clamp(0, 15, 100);
        assert_eq!(window.page, 1);
        assert_eq!(window.offset, 0);
    }

    #[test]
    fn page_above_maximum_clamps_to_last_page() {
        // 100 rows at 15 per page -> 7 pages
        let window = PageWindow::clamp(50, 15, 100);
        assert_eq!(window.page, 7);
        assert_eq!(window.offset, 90);
    }

    #[test]
    fn exact_multiple_has_no_phantom_page() {
        let window = PageWindow::clamp(10, 10, 30);
        assert_eq!(window.page, 3);
        assert_eq!(window.offset, 20);
    }

    #[test]
    fn degenerate_page_size_floors_to_one() {
        let window = PageWindow::clamp(2, 0, 5);
        assert_eq!(window, PageWindow { limit: 1, offset: 1, page: 2 });
    }
}
