//! User roles

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Role of the logged-in user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Staff,
    Admin,
}

impl Role {
    /// All roles, in menu-table order
    pub const ALL: [Role; 3] = [Role::Student, Role::Staff, Role::Admin];

    /// Lenient parse used for stored and server-provided values.
    ///
    /// Absent or unrecognised roles fall back to `Student`.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                debug!(role = raw, "Unrecognised role, falling back to student");
                Role::Student
            }),
            None => Role::Student,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Staff => "staff",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "staff" => Ok(Role::Staff),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}
