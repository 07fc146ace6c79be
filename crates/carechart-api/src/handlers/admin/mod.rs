//! Administrator-only handlers.

pub mod accounts;
pub mod audit;
