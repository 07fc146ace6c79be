//! Account domain entities.

pub mod model;
pub mod role;

pub use model::{Account, AccountFilter, CreateAccount, UpdateAccount};
pub use role::AccountRole;
