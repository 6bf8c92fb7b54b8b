//! Common types shared across handlers

pub mod pagination;

pub use pagination::PaginationParams;
