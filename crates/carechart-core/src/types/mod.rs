//! Core type definitions used across the CareChart workspace.

pub mod pagination;

pub use pagination::{PageRequest, PageResponse};
