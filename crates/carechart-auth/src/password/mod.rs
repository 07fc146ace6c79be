//! Password hashing and complexity policy.

pub mod hasher;
pub mod validator;

pub use hasher::PasswordHasher;
pub use validator::{PasswordCheck, PasswordRule, PasswordValidator};
