//! Account use cases: administration and self-service.

pub mod admin;
pub mod service;

pub use admin::{AdminAccountService, CreateAccountRequest};
pub use service::{AccountService, ChangePasswordRequest};
