//! # carechart-entity
//!
//! Domain entity models for CareChart. Every struct in this crate
//! represents a database table row or a domain value object. All entities
//! derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and database
//! entities additionally derive `sqlx::FromRow`.

pub mod account;
pub mod audit;
pub mod history;
pub mod patient;
pub mod record;
pub mod session;
