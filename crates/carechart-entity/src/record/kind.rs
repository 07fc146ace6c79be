//! Clinical record kind enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The two kinds of clinical record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "record_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// Visit notes, diagnoses, medications, lab results.
    Medical,
    /// Vital-sign observations.
    Monitoring,
}

impl RecordKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Medical => "medical",
            Self::Monitoring => "monitoring",
        }
    }

    /// Prefix of server-generated external identifiers.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Self::Medical => "MR",
            Self::Monitoring => "MON",
        }
    }

    /// Generate a new external identifier, e.g. `MR-4F1A09C2B7DE`.
    pub fn generate_external_id(&self) -> String {
        let raw = Uuid::new_v4().simple().to_string().to_uppercase();
        format!("{}-{}", self.id_prefix(), &raw[..12])
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = carechart_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "medical" => Ok(Self::Medical),
            "monitoring" => Ok(Self::Monitoring),
            _ => Err(carechart_core::AppError::validation(format!(
                "Invalid record kind: '{s}'. Expected one of: medical, monitoring"
            ))),
        }
    }
}
