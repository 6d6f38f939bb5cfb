//! Filter-composition search: AND-combined predicates, ordering, and a
//! clamped pagination window.

use book_catalog_core::{BookSearchRow, FilterSet};
use sqlx::Row;

use crate::catalog::{Catalog, SEARCH_COLUMNS, SEARCH_JOINS, row_to_search_row};
use crate::error::StorageError;

use super::PageWindow;
use super::predicates::{Bind, bind_values, order_clause, render};

pub(crate) async fn filtered_search(
    catalog: &Catalog,
    filters: &FilterSet,
) -> Result<Vec<BookSearchRow>, StorageError> {
    let rendered = render(filters);

    // Count matching rows first so the requested page can be clamped into
    // the range the result set actually has.
    let count_sql = format!(
        "SELECT COUNT(*) FROM (SELECT b.id {SEARCH_JOINS} {} GROUP BY b.id {}) matched",
        rendered.where_sql, rendered.having_sql
    );
    let total: i64 = bind_values(sqlx::query(&count_sql), &rendered.binds)
        .fetch_one(&catalog.pool)
        .await?
        .try_get(0)?;
    if total == 0 {
        return Ok(Vec::new());
    }

    let window = PageWindow::clamp(filters.page, filters.page_size, total);
    let mut binds = rendered.binds;
    binds.push(Bind::Int(window.limit));
    let limit_param = binds.len();
    binds.push(Bind::Int(window.offset));
    let sql = format!(
        "SELECT {SEARCH_COLUMNS}
         {SEARCH_JOINS}
         {}
         GROUP BY b.id
         {}
         ORDER BY {}
         LIMIT ${limit_param} OFFSET ${}",
        rendered.where_sql,
        rendered.having_sql,
        order_clause(filters.order_by, filters.direction),
        binds.len(),
    );

    let rows = bind_values(sqlx::query(&sql), &binds).fetch_all(&catalog.pool).await?;
    rows.iter().map(row_to_search_row).collect()
}

/// Unfiltered paged listing. Zero total rows here means the catalog is in
/// an impossible state for a browse request and is surfaced as an error,
/// unlike the filtered path where an empty match set is a valid result.
pub(crate) async fn browse(
    catalog: &Catalog,
    filters: &FilterSet,
) -> Result<Vec<BookSearchRow>, StorageError> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
        .fetch_one(&catalog.pool)
        .await?;
    if total == 0 {
        return Err(StorageError::Inconsistent("browse over an empty catalog".into()));
    }

    let window = PageWindow::clamp(filters.page, filters.page_size, total);
    let sql = format!(
        "SELECT {SEARCH_COLUMNS}
         {SEARCH_JOINS}
         GROUP BY b.id
         ORDER BY {}
         LIMIT $1 OFFSET $2",
        order_clause(filters.order_by, filters.direction),
    );
    let rows = sqlx::query(&sql)
        .bind(window.limit)
        .bind(window.offset)
        .fetch_all(&catalog.pool)
        .await?;
    rows.iter().map(row_to_search_row).collect()
}
