//! Custom Axum extractors.

pub mod auth;
pub mod client;
pub mod pagination;

pub use auth::{AuthUser, SessionUser};
pub use client::ClientInfo;
pub use pagination::PaginationParams;
