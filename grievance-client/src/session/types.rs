//! Session data types

use crate::auth::Role;
use serde::{Deserialize, Serialize};

/// Identity fields as delivered by the login endpoint and written to storage.
///
/// Values are kept as the server sent them; nothing checks that the role and
/// register number are consistent with each other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionFields {
    pub name: String,
    pub phone: String,
    pub role: String,
    pub register_no: String,
}

impl SessionFields {
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        role: impl Into<String>,
        register_no: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            role: role.into(),
            register_no: register_no.into(),
        }
    }
}

/// The authenticated identity as read back from the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub name: String,
    pub phone: String,
    pub role: Role,
    pub register_no: String,
}

impl Session {
    /// Display string for logs and the CLI
    pub fn display_string(&self) -> String {
        if self.name.is_empty() {
            format!("{} ({})", self.register_no, self.role)
        } else {
            format!("{} [{}] ({})", self.name, self.register_no, self.role)
        }
    }
}
