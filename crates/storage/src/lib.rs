//! PostgreSQL data-access engine for the book catalog.
//!
//! Three subsystems: the query composer (behind [`SearchStore`]), the
//! transactional rating update pipeline ([`RatingStore`]), and the
//! versioned migration engine run at [`Catalog::connect`] time.

mod books;
mod catalog;
mod error;
mod migrations;
mod ratings;
mod search;
pub mod traits;

pub use catalog::Catalog;
pub use error::StorageError;
pub use migrations::LATEST_VERSION;
pub use traits::{BookStore, RatingStore, SearchStore};
