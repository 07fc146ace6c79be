//! # carechart-auth
//!
//! Authentication and authorization for CareChart.
//!
//! ## Modules
//!
//! - `password`: Argon2id hashing and the password complexity policy
//! - `token`: signed session token creation and validation
//! - `lockout`: failed-login counting policy and its error messages
//! - `session`: login, logout and per-request session validation
//! - `rbac`: role checks for clinical and administrative operations
//! - `audit`: best-effort security audit writer

pub mod audit;
pub mod lockout;
pub mod password;
pub mod rbac;
pub mod session;
pub mod token;

pub use audit::{ClientOrigin, SecurityAudit};
pub use lockout::LockoutPolicy;
pub use password::{PasswordCheck, PasswordHasher, PasswordRule, PasswordValidator};
pub use rbac::RbacEnforcer;
pub use session::{LoginResult, SessionIdentity, SessionManager};
pub use token::{Claims, TokenDecoder, TokenEncoder};
