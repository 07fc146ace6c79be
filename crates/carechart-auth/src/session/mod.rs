//! Login, logout and session validation.

pub mod identity;
pub mod manager;

pub use identity::SessionIdentity;
pub use manager::{LoginResult, SessionManager};
