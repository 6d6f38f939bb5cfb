//! The predicate catalog: named filter fragments and their bind rules.
//!
//! Predicates accumulate into an ordered list and placeholder indices are
//! assigned in a single pass over that final list, so an index can never
//! drift from the bind it belongs to.

use book_catalog_core::{FilterSet, OrderBy, SortDirection, TITLE_SIMILARITY_THRESHOLD};
use sqlx::Postgres;
use sqlx::postgres::PgArguments;

use crate::catalog::escape_like;

/// A value bound into a composed statement, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Bind {
    Int(i64),
    Real(f64),
    Text(String),
}

/// WHERE/HAVING fragments plus their binds, ready to splice into a
/// statement. The author predicate lands in HAVING because it matches the
/// aggregated author string.
#[derive(Debug, Default)]
pub(crate) struct Rendered {
    pub where_sql: String,
    pub having_sql: String,
    pub binds: Vec<Bind>,
}

/// Render the active predicates of a filter set.
///
/// Every caller value is a bind; only fragment text from this fixed catalog
/// reaches the statement.
pub(crate) fn render(filters: &FilterSet) -> Rendered {
    let mut where_parts: Vec<String> = Vec::new();
    let mut having_parts: Vec<String> = Vec::new();
    let mut binds: Vec<Bind> = Vec::new();

    if let Some(isbn) = &filters.isbn {
        binds.push(Bind::Text(isbn.clone()));
        where_parts.push(format!("b.isbn = ${}", binds.len()));
    }

    if let Some(title) = &filters.title {
        // Case-sensitive contains, first-letter-capitalized contains, and
        // trigram similarity, OR-combined.
        binds.push(Bind::Text(format!("%{}%", escape_like(title))));
        let raw = binds.len();
        binds.push(Bind::Text(format!("%{}%", escape_like(&capitalize_first(title)))));
        let capitalized = binds.len();
        binds.push(Bind::Text(title.clone()));
        let fuzzy = binds.len();
        where_parts.push(format!(
            "(b.title LIKE ${raw} OR b.title LIKE ${capitalized} \
             OR similarity(b.title, ${fuzzy}) > {TITLE_SIMILARITY_THRESHOLD})"
        ));
    }

    if let Some((min, max)) = filters.rating_range {
        binds.push(Bind::Real(f64::from(min)));
        let low = binds.len();
        binds.push(Bind::Real(f64::from(max)));
        where_parts.push(format!("b.average_rating BETWEEN ${low} AND ${}", binds.len()));
    }

    if let Some(author) = &filters.author {
        binds.push(Bind::Text(format!("%{}%", escape_like(author))));
        // Same aggregate expression as the projection, ordering included, so
        // the substring sees the exact author string callers get back.
        having_parts
            .push(format!("string_agg(a.name, ', ' ORDER BY a.name) ILIKE ${}", binds.len()));
    }

    Rendered {
        where_sql: if where_parts.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", where_parts.join(" AND "))
        },
        having_sql: if having_parts.is_empty() {
            String::new()
        } else {
            format!("HAVING {}", having_parts.join(" AND "))
        },
        binds,
    }
}

/// ORDER BY clause from the fixed order/direction enums. Year ordering
/// breaks ties by title in the same direction.
pub(crate) fn order_clause(order_by: OrderBy, direction: SortDirection) -> String {
    let dir = direction.as_sql();
    match order_by {
        OrderBy::Title => format!("b.title {dir}"),
        OrderBy::Author => format!("authors {dir}"),
        OrderBy::Year => format!("b.publication_year {dir}, b.title {dir}"),
    }
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Apply the accumulated binds to a query in list order.
pub(crate) fn bind_values<'q>(
    mut query: sqlx::query::Query<'q, Postgres, PgArguments>,
    binds: &'q [Bind],
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
    for bind in binds {
        query = match bind {
            Bind::Int(value) => query.bind(*value),
            Bind::Real(value) => query.bind(*value),
            Bind::Text(value) => query.bind(value.as_str()),
        };
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filters() -> FilterSet {
        FilterSet {
            isbn: None,
            title: None,
            author: None,
            rating_range: None,
            order_by: OrderBy::Title,
            direction: SortDirection::Asc,
            page_size: 15,
            page: 1,
        }
    }

    #[test]
    fn isbn_predicate_is_exact_match() {
        let rendered = render(&FilterSet { isbn: Some("9780439023480".into()), ..filters() });
        assert_eq!(rendered.where_sql, "WHERE b.isbn = $1");
        assert_eq!(rendered.binds, vec![Bind::Text("9780439023480".into())]);
        assert!(rendered.having_sql.is_empty());
    }

    #[test]
    fn title_predicate_ors_three_alternatives() {
        let rendered = render(&FilterSet { title: Some("hunger".into()), ..filters() });
        assert_eq!(
            rendered.where_sql,
            "WHERE (b.title LIKE $1 OR b.title LIKE $2 \
             OR similarity(b.title, $3) > 0.45)"
        );
        assert_eq!(
            rendered.binds,
            vec![
                Bind::Text("%hunger%".into()),
                Bind::Text("%Hunger%".into()),
                Bind::Text("hunger".into()),
            ]
        );
    }

    #[test]
    fn author_predicate_lands_in_having() {
        let rendered = render(&FilterSet { author: Some("collins".into()), ..filters() });
        assert!(rendered.where_sql.is_empty());
        assert_eq!(
            rendered.having_sql,
            "HAVING string_agg(a.name, ', ' ORDER BY a.name) ILIKE $1"
        );
        assert_eq!(rendered.binds, vec![Bind::Text("%collins%".into())]);
    }

    #[test]
    fn placeholder_indices_follow_final_bind_order() {
        let rendered = render(&FilterSet {
            isbn: Some("9780441172719".into()),
            title: Some("dune".into()),
            author: Some("herbert".into()),
            rating_range: Some((2, 4)),
            ..filters()
        });
        assert_eq!(
            rendered.where_sql,
            "WHERE b.isbn = $1 AND (b.title LIKE $2 OR b.title LIKE $3 \
             OR similarity(b.title, $4) > 0.45) AND b.average_rating BETWEEN $5 AND $6"
        );
        assert_eq!(
            rendered.having_sql,
            "HAVING string_agg(a.name, ', ' ORDER BY a.name) ILIKE $7"
        );
        assert_eq!(rendered.binds.len(), 7);
        assert_eq!(rendered.binds[4], Bind::Real(2.0));
        assert_eq!(rendered.binds[5], Bind::Real(4.0));
    }

    #[test]
    fn having_aggregate_mirrors_projection_aggregate() {
        let rendered = render(&FilterSet { author: Some("rowling".into()), ..filters() });
        let aggregate = "string_agg(a.name, ', ' ORDER BY a.name)";
        assert!(rendered.having_sql.contains(aggregate));
        assert!(crate::catalog::SEARCH_COLUMNS.contains(aggregate));
    }

    #[test]
    fn like_wildcards_in_fragments_are_escaped() {
        let rendered = render(&FilterSet { title: Some("100%".into()), ..filters() });
        assert_eq!(rendered.binds[0], Bind::Text("%100\\%%".into()));
    }

    #[test]
    fn order_clause_from_fixed_enums() {
        assert_eq!(order_clause(OrderBy::Title, SortDirection::Asc), "b.title ASC");
        assert_eq!(order_clause(OrderBy::Author, SortDirection::Desc), "authors DESC");
        assert_eq!(
            order_clause(OrderBy::Year, SortDirection::Desc),
            "b.publication_year DESC, b.title DESC"
        );
    }
}
