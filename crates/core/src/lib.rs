//! Core types for the book catalog
//!
//! This crate contains domain types shared across all other crates:
//! books, authors, rating aggregates, and normalized search/update requests.

mod book;
mod constants;
mod error;
mod rating;
mod request;

pub use book::*;
pub use constants::*;
pub use error::*;
pub use rating::*;
pub use request::*;
