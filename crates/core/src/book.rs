//! Catalog records: books, authors, and the search projection.

use serde::{Deserialize, Serialize};

use crate::RatingSummary;

/// A stored book row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Catalog identifier, assigned by the store.
    pub id: i64,
    /// 13-digit ISBN; unique across the catalog.
    pub isbn: String,
    pub title: String,
    pub original_title: Option<String>,
    pub publication_year: Option<i32>,
    pub rating: RatingSummary,
    pub image_url: Option<String>,
    pub small_image_url: Option<String>,
}

/// A stored author row.
///
/// Authors are created implicitly the first time a name is seen during book
/// insertion, looked up by trimmed lowercase name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    pub name: String,
}

/// Input for catalog insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBook {
    pub isbn: String,
    pub title: String,
    pub original_title: Option<String>,
    pub publication_year: Option<i32>,
    pub authors: Vec<String>,
    pub image_url: Option<String>,
    pub small_image_url: Option<String>,
}

/// Attribute rewrite for an existing book; ratings are untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookMetadata {
    pub title: String,
    pub original_title: Option<String>,
    pub publication_year: Option<i32>,
    pub image_url: Option<String>,
    pub small_image_url: Option<String>,
}

/// Read-only search projection: a book joined with its aggregated,
/// comma-joined author display string. Produced fresh per query, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSearchRow {
    pub id: i64,
    pub isbn: String,
    /// All author names joined with `", "`, alphabetical.
    pub authors: String,
    pub publication_year: Option<i32>,
    pub original_title: Option<String>,
    pub title: String,
    pub rating: RatingSummary,
    pub image_url: Option<String>,
    pub small_image_url: Option<String>,
}

/// Normalize an author name for look-up-or-create: trimmed, case-folded.
pub fn normalize_author_name(name: &str) -> String {
    name.trim().to_lowercase()
}
