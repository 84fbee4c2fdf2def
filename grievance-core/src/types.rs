//! Core configuration types

use serde::{Deserialize, Serialize};

/// Top-level client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api: ApiConfig,
    pub shell: ShellConfig,
    pub storage: StorageConfig,
}

/// Location of the external grievance REST API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL, e.g. `http://localhost:5000`
    pub base_url: String,
    /// Login endpoint path relative to `base_url`
    pub login_path: String,
    /// Registration endpoint path relative to `base_url`
    pub register_path: String,
}

/// Routing configuration for the shell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Unauthenticated entry point (the login view)
    pub entry_route: String,
    /// Where a successful login lands
    pub dashboard_route: String,
    /// How navigation outside the role's menu is treated
    pub guard_mode: GuardMode,
}

/// Tab-scoped session persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one session file per tab
    pub session_dir: String,
}

/// Route guard behaviour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuardMode {
    /// Menus only decide which links are shown; every shell route stays reachable.
    Advisory,
    /// Shell routes are reachable only when listed in the role's menu.
    #[default]
    Enforced,
}

impl std::fmt::Display for GuardMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GuardMode::Advisory => write!(f, "advisory"),
            GuardMode::Enforced => write!(f, "enforced"),
        }
    }
}

impl std::str::FromStr for GuardMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "advisory" => Ok(GuardMode::Advisory),
            "enforced" => Ok(GuardMode::Enforced),
            _ => Err(format!("Unknown guard mode: {}", s)),
        }
    }
}
