//! Account role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Clinical and administrative roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "account_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    /// System administrator.
    Admin,
    /// Physician; may author medical records.
    Physician,
    /// Nurse; may author monitoring records.
    Nurse,
    /// Front-desk and support staff.
    Staff,
}

impl AccountRole {
    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Physician => "physician",
            Self::Nurse => "nurse",
            Self::Staff => "staff",
        }
    }

    /// Whether this role alone grants administrative privilege.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Roles allowed to write clinical records.
    pub fn clinical() -> &'static [AccountRole] {
        &[Self::Physician, Self::Nurse]
    }
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AccountRole {
    type Err = carechart_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "physician" => Ok(Self::Physician),
            "nurse" => Ok(Self::Nurse),
            "staff" => Ok(Self::Staff),
            _ => Err(carechart_core::AppError::validation(format!(
                "Invalid account role: '{s}'. Expected one of: admin, physician, nurse, staff"
            ))),
        }
    }
}
