//! Business logic layer for the book catalog.

mod catalog_service;
mod error;

pub use catalog_service::CatalogService;
pub use error::ServiceError;
